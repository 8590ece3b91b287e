use std::collections::BTreeSet;

use botcore::{
    backend::scripted::ScriptedElimination,
    construction::ObjectId,
    provers::dimension::DimensionEstimator,
    statement::{AlgebraicStatement, LabelledPoint, Owner, fixation},
};
use botpoly::{Polynomial, Variable};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Partition matroid: variable `i` belongs to group `groups[i - 1]`, and a set
/// is independent when no group holds more than its capacity.
fn partition_oracle(groups: Vec<usize>, capacities: Vec<usize>) -> ScriptedElimination {
    ScriptedElimination::new().with_handler(move |request| {
        let mut used = vec![0; capacities.len()];
        for v in &request.free_variables {
            used[groups[v.id() as usize - 1]] += 1;
        }
        let independent = used.iter().zip(&capacities).all(|(u, c)| u <= c);
        Some(if independent { "[[0]]" } else { "[[v1]]" }.to_string())
    })
}

fn statement_over(count: u32) -> AlgebraicStatement {
    let mut st = AlgebraicStatement::new(ObjectId(1));
    for i in 1..=count {
        st.add_polynomial(Owner::Condition, Polynomial::var(Variable(i)).pow(2));
    }
    st
}

#[test]
fn dimension_matches_the_rank_of_random_partitions() {
    let mut rng = ChaCha20Rng::seed_from_u64(0xd1a);
    for _ in 0..24 {
        let count = rng.random_range(1..=6u32);
        let group_count = rng.random_range(1..=3usize);
        let groups: Vec<usize> = (0..count).map(|_| rng.random_range(0..group_count)).collect();
        let capacities: Vec<usize> = (0..group_count).map(|_| rng.random_range(0..=2)).collect();
        let rank: usize = (0..group_count)
            .map(|g| groups.iter().filter(|x| **x == g).count().min(capacities[g]))
            .sum();

        let service = partition_oracle(groups, capacities);
        let st = statement_over(count);
        let mut estimator = DimensionEstimator::new(&st, &service);
        assert_eq!(estimator.compute().unwrap(), rank);
        let maximal = estimator.maximal_set().cloned().unwrap_or_default();
        assert_eq!(maximal.len(), rank);

        for min in 0..=count as usize {
            let mut estimator = DimensionEstimator::new(&st, &service);
            assert_eq!(estimator.is_dim_greater_than(min).unwrap(), rank > min);
        }
    }
}

#[test]
fn dimension_is_monotone_in_the_hypotheses() {
    // Dropping a variable from every independent set can only lower the rank.
    let groups = vec![0, 0, 1, 1, 2];
    let wide = partition_oracle(groups.clone(), vec![2, 1, 1]);
    let narrow = partition_oracle(groups, vec![1, 1, 1]);
    let st = statement_over(5);
    let wide_dim = DimensionEstimator::new(&st, &wide).compute().unwrap();
    let narrow_dim = DimensionEstimator::new(&st, &narrow).compute().unwrap();
    assert_eq!(wide_dim, 4);
    assert_eq!(narrow_dim, 3);
}

fn with_free_points(count: u32) -> AlgebraicStatement {
    let mut st = AlgebraicStatement::new(ObjectId(100));
    for i in 0..count {
        let coords = [Variable(2 * i + 1), Variable(2 * i + 2)];
        st.declare_free(coords[0]);
        st.declare_free(coords[1]);
        st.free_points.push(LabelledPoint {
            id: ObjectId(i + 1),
            label: format!("P{}", i),
            coords,
        });
    }
    st
}

#[test]
fn fixation_never_touches_more_than_two_points() {
    let mut rng = ChaCha20Rng::seed_from_u64(0xf1c);
    for _ in 0..32 {
        let points = rng.random_range(0..=4u32);
        let coords = rng.random_range(0..=6usize);
        let mut st = with_free_points(points);
        let subs = fixation::fix_values(&mut st, coords);

        let expected = coords.min(4).min(2 * points.min(2) as usize);
        assert_eq!(subs.len(), expected);
        assert_eq!(st.substitutions, subs);
        let touched: BTreeSet<u32> = subs.keys().map(|v| (v.id() - 1) / 2).collect();
        assert!(touched.iter().all(|p| *p < 2));

        let equal = st.ndg_candidates.iter().any(|c| c.condition == "AreEqual");
        assert_eq!(equal, expected == 4);
    }
}
