use std::collections::BTreeMap;

use botpoly::{
    Polynomial, Variable, VariablePool, geometry,
    parser::{parse_branches, parse_polynomial},
};
use num_bigint::BigInt;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

fn random_polynomial(rng: &mut impl Rng, vars: u32, terms: usize) -> Polynomial {
    (0..terms)
        .map(|_| {
            let degree = rng.random_range(0..=3);
            let mut term = Polynomial::constant(rng.random_range(-5i64..=5));
            for _ in 0..degree {
                term = &term * &Polynomial::var(Variable(rng.random_range(1..=vars)));
            }
            term
        })
        .sum()
}

#[test]
fn canonical_text_is_parsed_back_to_the_same_polynomial() {
    let mut rng = ChaCha20Rng::seed_from_u64(0x5eed);
    for _ in 0..64 {
        let p = random_polynomial(&mut rng, 6, 8);
        let text = p.to_string();
        let parsed = parse_polynomial(&text).expect("canonical text must parse");
        assert_eq!(parsed, p, "text `{}` did not read back", text);
    }
}

#[test]
fn ring_laws_hold_on_random_samples() {
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    for _ in 0..32 {
        let a = random_polynomial(&mut rng, 4, 5);
        let b = random_polynomial(&mut rng, 4, 5);
        let c = random_polynomial(&mut rng, 4, 5);
        assert_eq!(&a * &(&b + &c), &(&a * &b) + &(&a * &c));
        assert_eq!(&a * &b, &b * &a);
        assert!((&(&a + &b) - &b - a).is_zero());
    }
}

#[test]
fn substitution_commutes_with_evaluation() {
    let mut rng = ChaCha20Rng::seed_from_u64(99);
    let p = random_polynomial(&mut rng, 3, 10);
    let values: BTreeMap<Variable, BigInt> = [(Variable(1), 2), (Variable(2), -1), (Variable(3), 5)]
        .into_iter()
        .map(|(v, c)| (v, BigInt::from(c)))
        .collect();
    let as_polys: BTreeMap<Variable, Polynomial> = values
        .iter()
        .map(|(v, c)| (*v, Polynomial::constant(c.clone())))
        .collect();
    assert_eq!(p.substitute_values(&values), p.substitute_all(&as_polys));
    assert!(p.substitute_values(&values).is_constant());
}

#[test]
fn circumcenter_equations_vanish_on_a_concrete_triangle() {
    let pool = VariablePool::new();
    let (a, b, c, o) = (pool.fresh_pair(), pool.fresh_pair(), pool.fresh_pair(), pool.fresh_pair());
    let values: BTreeMap<Variable, BigInt> = [
        (a, (0, 0)),
        (b, (4, 0)),
        (c, (0, 2)),
        (o, (2, 1)),
    ]
    .into_iter()
    .flat_map(|(p, (x, y))| [(p[0], BigInt::from(x)), (p[1], BigInt::from(y))])
    .collect();

    assert!(geometry::equidistant(a, o, b).substitute_values(&values).is_zero());
    assert!(geometry::equidistant(a, o, c).substitute_values(&values).is_zero());
    assert!(!geometry::collinear(a, b, c).substitute_values(&values).is_zero());
}

#[test]
fn elimination_answers_are_read_as_branches() {
    let answer = "[[v3*v5-v4*v6, 2], [v1 - v2]]";
    let branches = parse_branches(answer).expect("answer should parse");
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0][0].to_string(), "v3*v5-v4*v6");
    assert_eq!(branches[0][1].constant_value(), Some(BigInt::from(2)));
    assert_eq!(branches[1][0].variables().len(), 2);
}
