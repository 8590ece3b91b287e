//! Botana building blocks.
//!
//! Points are pairs of variables `[x, y]`. Every function returns the
//! polynomial(s) whose common vanishing encodes the geometric relation.
use crate::{polynomial::Polynomial, variable::Variable};

/// Coordinates of a point.
pub type Coords = [Variable; 2];

fn x(p: Coords) -> Polynomial {
    Polynomial::var(p[0])
}

fn y(p: Coords) -> Polynomial {
    Polynomial::var(p[1])
}

/// Determinant vanishing iff `a`, `b` and `c` are collinear.
pub fn collinear(a: Coords, b: Coords, c: Coords) -> Polynomial {
    &(&(x(a) - x(c)) * &(y(b) - y(c))) - &(&(x(b) - x(c)) * &(y(a) - y(c)))
}

/// Signed doubled area of the triangle `abc`, used for orientation
/// conditions. Equal to [`collinear`] as a polynomial.
pub fn triplet_sign(a: Coords, b: Coords, c: Coords) -> Polynomial {
    collinear(a, b, c)
}

/// Squared distance `|ab|^2`.
pub fn sqr_distance(a: Coords, b: Coords) -> Polynomial {
    &(x(a) - x(b)).pow(2) + &(y(a) - y(b)).pow(2)
}

/// `|ao| = |bo|`.
pub fn equidistant(a: Coords, o: Coords, b: Coords) -> Polynomial {
    sqr_distance(a, o) - sqr_distance(b, o)
}

/// `ab ⟂ cd`.
pub fn perpendicular(a: Coords, b: Coords, c: Coords, d: Coords) -> Polynomial {
    &(&(x(a) - x(b)) * &(x(c) - x(d))) + &(&(y(a) - y(b)) * &(y(c) - y(d)))
}

/// `ab ∥ cd`.
pub fn parallel(a: Coords, b: Coords, c: Coords, d: Coords) -> Polynomial {
    &(&(x(a) - x(b)) * &(y(c) - y(d))) - &(&(y(a) - y(b)) * &(x(c) - x(d)))
}

/// `m` is the midpoint of `ab`.
pub fn midpoint(m: Coords, a: Coords, b: Coords) -> [Polynomial; 2] {
    [
        &(x(m) * Polynomial::constant(2)) - &(x(a) + x(b)),
        &(y(m) * Polynomial::constant(2)) - &(y(a) + y(b)),
    ]
}

/// `d` is the image of `a` under the quarter turn around `c`.
pub fn rotation_90(d: Coords, c: Coords, a: Coords) -> [Polynomial; 2] {
    [
        &(x(d) - x(c)) + &(y(a) - y(c)),
        &(y(d) - y(c)) - &(x(a) - x(c)),
    ]
}

/// Perpendicular bisector of `ab` described by the helper points `c`
/// (midpoint) and `d` (rotation of `a` around `c`).
pub fn line_bisector(a: Coords, b: Coords, c: Coords, d: Coords) -> [Polynomial; 4] {
    let [m1, m2] = midpoint(c, a, b);
    let [r1, r2] = rotation_90(d, c, a);
    [m1, m2, r1, r2]
}

/// Determinant of a square matrix, by Laplace expansion along the first row.
pub fn determinant(rows: &[Vec<Polynomial>]) -> Polynomial {
    match rows.len() {
        0 => Polynomial::one(),
        1 => rows[0][0].clone(),
        n => (0..n)
            .map(|col| {
                let minor: Vec<Vec<Polynomial>> = rows[1..]
                    .iter()
                    .map(|row| {
                        row.iter()
                            .enumerate()
                            .filter(|(j, _)| *j != col)
                            .map(|(_, p)| p.clone())
                            .collect()
                    })
                    .collect();
                let term = &rows[0][col] * &determinant(&minor);
                if col % 2 == 0 { term } else { -term }
            })
            .sum(),
    }
}

/// Vanishes iff `a`, `b`, `c` and `d` lie on a common circle (or line).
pub fn concyclic(a: Coords, b: Coords, c: Coords, d: Coords) -> Polynomial {
    let rows: Vec<Vec<Polynomial>> = [a, b, c, d]
        .into_iter()
        .map(|p| {
            vec![
                &x(p).pow(2) + &y(p).pow(2),
                x(p),
                y(p),
                Polynomial::one(),
            ]
        })
        .collect();
    determinant(&rows)
}

/// Rabinowitsch form `p*z - 1`, vanishing iff `p` is invertible.
pub fn rabinowitsch(p: &Polynomial, z: Variable) -> Polynomial {
    &(p * &Polynomial::var(z)) - &Polynomial::one()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use num_bigint::BigInt;

    use super::*;

    fn assign(points: &[(Coords, (i64, i64))]) -> BTreeMap<Variable, BigInt> {
        points
            .iter()
            .flat_map(|(p, (a, b))| [(p[0], BigInt::from(*a)), (p[1], BigInt::from(*b))])
            .collect()
    }

    const A: Coords = [Variable(1), Variable(2)];
    const B: Coords = [Variable(3), Variable(4)];
    const C: Coords = [Variable(5), Variable(6)];
    const D: Coords = [Variable(7), Variable(8)];

    #[test]
    fn collinear_vanishes_on_a_line() {
        let on_line = assign(&[(A, (0, 0)), (B, (1, 1)), (C, (3, 3))]);
        assert!(collinear(A, B, C).substitute_values(&on_line).is_zero());
        let off_line = assign(&[(A, (0, 0)), (B, (1, 1)), (C, (3, 4))]);
        assert!(!collinear(A, B, C).substitute_values(&off_line).is_zero());
    }

    #[test]
    fn fixed_points_reduce_collinearity_to_one_coordinate() {
        let fixed = assign(&[(A, (0, 0)), (B, (0, 1))]);
        let reduced = collinear(A, B, C).substitute_values(&fixed);
        assert_eq!(reduced.primitive(), Polynomial::var(C[0]));
    }

    #[test]
    fn bisector_helpers_are_consistent() {
        // a = (0,0), b = (2,0): c = (1,0), d = (1,-1) (a turned around c by +90 degrees)
        let values = assign(&[(A, (0, 0)), (B, (2, 0)), (C, (1, 0)), (D, (1, -1))]);
        for p in line_bisector(A, B, C, D) {
            assert!(p.substitute_values(&values).is_zero(), "{p} should vanish");
        }
        assert!(perpendicular(A, B, C, D).substitute_values(&values).is_zero());
        assert!(equidistant(A, D, B).substitute_values(&values).is_zero());
    }

    #[test]
    fn concyclic_points() {
        let circle = assign(&[(A, (1, 0)), (B, (0, 1)), (C, (-1, 0)), (D, (0, -1))]);
        assert!(concyclic(A, B, C, D).substitute_values(&circle).is_zero());
        let off = assign(&[(A, (2, 0)), (B, (0, 1)), (C, (-1, 0)), (D, (0, -1))]);
        assert!(!concyclic(A, B, C, D).substitute_values(&off).is_zero());
    }

    #[test]
    fn rabinowitsch_shape() {
        let p = Polynomial::var(Variable(1));
        assert_eq!(rabinowitsch(&p, Variable(9)).to_string(), "v1*v9-1");
    }
}
