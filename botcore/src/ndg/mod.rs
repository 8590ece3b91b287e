//! Readable non-degeneracy conditions.
//!
//! A proof that holds "generically" holds outside of a degenerate locus. The
//! elimination answer describes that locus by polynomial factors; the
//! [`detector`] maps each factor back to a geometric predicate over object
//! labels, such as `AreCollinear(A,B,C)`.
use std::{cmp::Ordering, fmt::Display};

use botpoly::Polynomial;

pub mod detector;

/// Names of the conditions produced by this crate.
pub mod names {
    pub const ARE_COLLINEAR: &str = "AreCollinear";
    pub const ARE_EQUAL: &str = "AreEqual";
    pub const X_ARE_EQUAL: &str = "xAreEqual";
    pub const Y_ARE_EQUAL: &str = "yAreEqual";
    pub const ARE_PARALLEL: &str = "AreParallel";
    pub const ARE_PERPENDICULAR: &str = "ArePerpendicular";
    pub const ARE_CONGRUENT: &str = "AreCongruent";
    pub const DEGENERATE_POLYGON: &str = "DegeneratePolygon";
}

/// A geometric predicate whose failure makes the statement true.
#[derive(Debug, Clone)]
pub struct NdgCondition {
    pub condition: String,
    /// Labels of the objects the predicate is about.
    pub objects: Vec<String>,
    /// Polynomials witnessing the condition, if known.
    pub polynomials: Vec<Polynomial>,
    /// Lower is more readable; never negative.
    pub readability: f64,
}

impl NdgCondition {
    pub fn new(condition: &str, objects: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            condition: condition.to_string(),
            objects: objects.into_iter().map(Into::into).collect(),
            polynomials: Vec::new(),
            readability: 1.0,
        }
    }

    pub fn with_polynomials(mut self, polynomials: Vec<Polynomial>) -> Self {
        self.polynomials = polynomials;
        self
    }

    pub fn with_readability(mut self, readability: f64) -> Self {
        self.readability = readability.max(0.0);
        self
    }

    /// Bring the condition to its canonical form.
    ///
    /// Symmetric predicates get their objects sorted by label. Conditions over
    /// four points are read as conditions over the lines (segments for
    /// `AreCongruent`) `P1P2` and `P3P4`; `ArePerpendicular` over three points
    /// is read over the lines `P1P3` and `P3P2`.
    pub fn rewrite(&mut self) {
        use names::*;

        let through = |a: &str, b: &str| {
            let mut pair = [a.to_string(), b.to_string()];
            pair.sort();
            pair.concat()
        };
        match (self.condition.as_str(), self.objects.len()) {
            (ARE_COLLINEAR | DEGENERATE_POLYGON, _) => self.objects.sort(),
            (ARE_PERPENDICULAR, 3) => {
                let o = &self.objects;
                self.objects = vec![through(&o[0], &o[2]), through(&o[2], &o[1])];
                self.objects.sort();
            }
            (ARE_EQUAL | ARE_PERPENDICULAR | ARE_PARALLEL | ARE_CONGRUENT, 4) => {
                let o = &self.objects;
                self.objects = vec![through(&o[0], &o[1]), through(&o[2], &o[3])];
                self.objects.sort();
            }
            (ARE_EQUAL | ARE_PERPENDICULAR | ARE_PARALLEL | ARE_CONGRUENT, 2)
            | (X_ARE_EQUAL | Y_ARE_EQUAL, 2) => self.objects.sort(),
            _ => {}
        }
    }
}

impl Display for NdgCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.condition, self.objects.join(","))
    }
}

impl PartialEq for NdgCondition {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NdgCondition {}

impl PartialOrd for NdgCondition {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NdgCondition {
    fn cmp(&self, other: &Self) -> Ordering {
        self.readability
            .total_cmp(&other.readability)
            .then_with(|| self.condition.cmp(&other.condition))
            .then_with(|| self.to_string().cmp(&other.to_string()))
    }
}
