//! Recognition of elimination factors as geometric predicates.
//!
//! [`StandardNdgDetector`] tabulates the primitive parts of the usual
//! predicates over the points of a statement (after coordinate fixation) and
//! looks factors up in that table. A factor matching several predicates is
//! reported as the most readable one.
use std::collections::{BTreeMap, HashMap};

use botpoly::{
    Polynomial, Variable,
    geometry::{self, Coords},
};
use log::debug;
use num_bigint::BigInt;

use crate::ndg::{NdgCondition, names};

/// Readability of a condition on a single coordinate.
const COORDINATE_READABILITY: f64 = 2.0;

pub trait NdgDetector: Send + Sync {
    /// Readable condition whose failure is described by `factor`.
    fn detect(&self, factor: &Polynomial) -> Option<NdgCondition>;
}

pub struct StandardNdgDetector {
    table: HashMap<Polynomial, NdgCondition>,
}

impl StandardNdgDetector {
    /// Detector over labelled points, with `substitutions` applied to every
    /// candidate predicate.
    pub fn new(points: &[(String, Coords)], substitutions: &BTreeMap<Variable, i64>) -> Self {
        let values: BTreeMap<Variable, BigInt> = substitutions
            .iter()
            .map(|(v, c)| (*v, BigInt::from(*c)))
            .collect();
        let mut detector = Self {
            table: HashMap::new(),
        };
        let mut add = |poly: Polynomial, condition: NdgCondition| {
            detector.insert(poly.substitute_values(&values), condition)
        };

        let n = points.len();
        for i in 0..n {
            for j in i + 1..n {
                let ((a, pa), (b, pb)) = (&points[i], &points[j]);
                let dx = Polynomial::var(pa[0]) - Polynomial::var(pb[0]);
                let dy = Polynomial::var(pa[1]) - Polynomial::var(pb[1]);
                add(
                    dx,
                    NdgCondition::new(names::X_ARE_EQUAL, [a, b])
                        .with_readability(COORDINATE_READABILITY),
                );
                add(
                    dy,
                    NdgCondition::new(names::Y_ARE_EQUAL, [a, b])
                        .with_readability(COORDINATE_READABILITY),
                );
                add(
                    geometry::sqr_distance(*pa, *pb),
                    NdgCondition::new(names::ARE_EQUAL, [a, b]),
                );
                for k in j + 1..n {
                    let (c, pc) = &points[k];
                    add(
                        geometry::collinear(*pa, *pb, *pc),
                        NdgCondition::new(names::ARE_COLLINEAR, [a, b, c]),
                    );
                }
                // right angle at a third point
                for (k, (c, pc)) in points.iter().enumerate() {
                    if k != i && k != j {
                        add(
                            geometry::perpendicular(*pa, *pc, *pc, *pb),
                            NdgCondition::new(names::ARE_PERPENDICULAR, [a, b, c]),
                        );
                    }
                }
            }
        }

        let pairs: Vec<(usize, usize)> = (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
            .collect();
        for (idx, &(i, j)) in pairs.iter().enumerate() {
            for &(k, l) in &pairs[idx + 1..] {
                if k == i || k == j || l == i || l == j {
                    continue;
                }
                let (a, b, c, d) = (&points[i], &points[j], &points[k], &points[l]);
                let labels = [&a.0, &b.0, &c.0, &d.0];
                add(
                    geometry::parallel(a.1, b.1, c.1, d.1),
                    NdgCondition::new(names::ARE_PARALLEL, labels),
                );
                add(
                    geometry::perpendicular(a.1, b.1, c.1, d.1),
                    NdgCondition::new(names::ARE_PERPENDICULAR, labels),
                );
                add(
                    geometry::sqr_distance(a.1, b.1) - geometry::sqr_distance(c.1, d.1),
                    NdgCondition::new(names::ARE_CONGRUENT, labels),
                );
            }
        }
        debug!("NDG detector knows {} predicates", detector.table.len());
        detector
    }

    fn insert(&mut self, poly: Polynomial, condition: NdgCondition) {
        if poly.is_constant() {
            return;
        }
        let key = poly.primitive();
        match self.table.get(&key) {
            Some(known) if known.readability <= condition.readability => {}
            _ => {
                self.table.insert(key, condition.with_polynomials(vec![poly]));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl NdgDetector for StandardNdgDetector {
    fn detect(&self, factor: &Polynomial) -> Option<NdgCondition> {
        let found = self.table.get(&factor.primitive()).cloned();
        match &found {
            Some(condition) => debug!("{} is {}", factor, condition),
            None => debug!("{} is not a known predicate", factor),
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<(String, Coords)> {
        vec![
            ("A".to_string(), [Variable(1), Variable(2)]),
            ("B".to_string(), [Variable(3), Variable(4)]),
            ("C".to_string(), [Variable(5), Variable(6)]),
        ]
    }

    #[test]
    fn fixed_collinearity_beats_coordinate_equality() {
        // A = (0,0), B = (0,1): collinear(A,B,C) reduces to a multiple of v5
        let subs = BTreeMap::from([
            (Variable(1), 0),
            (Variable(2), 0),
            (Variable(3), 0),
            (Variable(4), 1),
        ]);
        let detector = StandardNdgDetector::new(&points(), &subs);
        let factor = Polynomial::var(Variable(5)) * Polynomial::constant(-3);
        let condition = detector.detect(&factor).unwrap();
        assert_eq!(condition.to_string(), "AreCollinear(A,B,C)");
    }

    #[test]
    fn coordinate_equalities_and_unknown_factors() {
        let detector = StandardNdgDetector::new(&points(), &BTreeMap::new());
        let factor = Polynomial::var(Variable(6)) - Polynomial::var(Variable(4));
        let condition = detector.detect(&factor).unwrap();
        assert_eq!(condition.to_string(), "yAreEqual(B,C)");
        assert_eq!(condition.readability, 2.0);

        let unknown = &Polynomial::var(Variable(1)) * &Polynomial::var(Variable(6)) + Polynomial::one();
        assert!(detector.detect(&unknown).is_none());
    }
}
