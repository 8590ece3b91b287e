//! Removal of the similarity freedom of a construction.
//!
//! A statement that holds for some configuration holds for all its images
//! under translation, rotation and scaling. Fixing the first free point at
//! `(0,0)` and the second at `(0,1)` removes that freedom, at the price of the
//! condition that the two points differ.
use std::collections::BTreeMap;

use botpoly::Variable;
use log::debug;

use crate::{
    magic::FIX_COORDINATES,
    ndg::{NdgCondition, names},
    statement::AlgebraicStatement,
};

/// Fix at most `coords` coordinates of the first two free points.
///
/// The substitution map is stored in the statement and returned. When both
/// points are fully fixed, `AreEqual` over them is recorded as an NDG
/// candidate.
pub fn fix_values(st: &mut AlgebraicStatement, coords: usize) -> BTreeMap<Variable, i64> {
    let limit = coords.min(FIX_COORDINATES.len());
    let mut substitutions = BTreeMap::new();
    let mut fixed_points = Vec::new();

    for point in st.free_points.iter().take(2) {
        let mut complete = true;
        for v in point.coords {
            let index = substitutions.len();
            if index >= limit {
                complete = false;
                break;
            }
            debug!("Fixing {} ({}) to {}", v, point.label, FIX_COORDINATES[index]);
            substitutions.insert(v, FIX_COORDINATES[index]);
        }
        if complete {
            fixed_points.push(point.label.clone());
        }
    }

    if let [a, b] = &fixed_points[..] {
        let mut condition = NdgCondition::new(names::ARE_EQUAL, [a.clone(), b.clone()]);
        condition.rewrite();
        st.add_ndg_candidate(condition);
    }
    st.substitutions = substitutions.clone();
    substitutions
}
