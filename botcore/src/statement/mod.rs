//! Algebraic form of a statement.
//!
//! An [`AlgebraicStatement`] is rebuilt for every proof attempt. It collects
//! the hypothesis polynomials of the statement's predecessors (see
//! [`collector`]), the side conditions required for soundness (see
//! [`nondegeneracy`]), the thesis and its negation (see [`thesis`]) and the
//! coordinates fixed to remove spurious freedom (see [`fixation`]).
//!
//! The hypothesis set is deduplicated on the canonical text of its
//! polynomials. Every polynomial remembers its [`Owner`], which is how the
//! thesis is swapped in and out during the decision procedure.
use std::collections::{BTreeMap, BTreeSet, HashSet};

use bitflags::bitflags;
use botpoly::{Polynomial, Variable, geometry::Coords};
use log::debug;
use strum::{Display, EnumIs};

use crate::{
    backend::{EliminationMode, EliminationRequest},
    base::ProverContext,
    construction::{ConstructionGraph, ObjectId},
    ndg::NdgCondition,
    provers::ProofResult,
    utils::error::BotResult,
};

pub mod collector;
pub mod expression;
pub mod fixation;
pub mod nondegeneracy;
pub mod thesis;

/// Role of a variable in the elimination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
pub enum VarClass {
    /// Coordinate of an unconstrained point, or a free parameter.
    Free,
    /// Free in the generic case, but yields to the free variables: the first
    /// coordinate of a point on a path, the value of a number.
    AlmostFree,
    /// Determined by the hypotheses.
    Dependent,
}

bitflags! {
    /// How the verdict of the decision procedure is to be read.
    #[derive(Default, Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct StatementFlags: u8 {
        /// A refuted statement is reported as unknown.
        const INTERPRET_FALSE_AS_UNDEFINED = 1 << 0;

        /// A proven statement is reported as unknown (angles, conic membership).
        const INTERPRET_TRUE_AS_UNDEFINED = 1 << 1;

        /// At most the first point may be fixed (circle with a given radius).
        const DISALLOW_FIX_SECOND_POINT = 1 << 2;
    }
}

/// Where a hypothesis polynomial comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    /// Encoding of a construction object.
    Object(ObjectId),
    /// Side condition, or a non-negated part of the thesis.
    Condition,
    /// The thesis itself, negated or not.
    Thesis,
}

/// A point of the statement, as known to the NDG detector and the fixation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelledPoint {
    pub id: ObjectId,
    pub label: String,
    pub coords: Coords,
}

#[derive(Debug, Clone)]
pub struct AlgebraicStatement {
    pub statement: ObjectId,
    polynomials: Vec<(Owner, Polynomial)>,
    known: HashSet<Polynomial>,
    classes: BTreeMap<Variable, VarClass>,
    pub substitutions: BTreeMap<Variable, i64>,

    /// Thesis branches; the last polynomial of each branch is negated.
    pub thesis_branches: Vec<Vec<Polynomial>>,
    pub thesis_factors: Vec<Polynomial>,
    pub negated_thesis: Option<Polynomial>,
    pub thesis_inequality: Option<String>,

    pub inequalities: Vec<String>,
    pub positive_variables: Vec<String>,
    /// Positive helper variables standing for segment lengths.
    pub extra_variables: Vec<String>,
    pub external_variables: Vec<String>,
    pub external_polynomials: Vec<String>,

    pub flags: StatementFlags,
    pub max_fixcoords: Option<usize>,
    pub ndg_candidates: Vec<NdgCondition>,
    /// Verdict known without elimination.
    pub result: Option<ProofResult>,

    /// Points among the predecessors, in construction order.
    pub points: Vec<LabelledPoint>,
    /// Free points among the predecessors, in construction order.
    pub free_points: Vec<LabelledPoint>,
}

impl AlgebraicStatement {
    pub fn new(statement: ObjectId) -> Self {
        Self {
            statement,
            polynomials: Vec::new(),
            known: HashSet::new(),
            classes: BTreeMap::new(),
            substitutions: BTreeMap::new(),
            thesis_branches: Vec::new(),
            thesis_factors: Vec::new(),
            negated_thesis: None,
            thesis_inequality: None,
            inequalities: Vec::new(),
            positive_variables: Vec::new(),
            extra_variables: Vec::new(),
            external_variables: Vec::new(),
            external_polynomials: Vec::new(),
            flags: StatementFlags::empty(),
            max_fixcoords: None,
            ndg_candidates: Vec::new(),
            result: None,
            points: Vec::new(),
            free_points: Vec::new(),
        }
    }

    /// Collect the hypotheses of `statement` and set up its thesis.
    ///
    /// `moving_point`, when given, is described by the closed-form equation
    /// of its path instead of the path's construction.
    pub fn build(
        ctx: &ProverContext,
        graph: &dyn ConstructionGraph,
        statement: ObjectId,
        moving_point: Option<ObjectId>,
    ) -> BotResult<Self> {
        let mut st = Self::new(statement);
        collector::collect(&mut st, ctx, graph, moving_point)?;
        if st.result.is_none() {
            thesis::set_thesis(&mut st, ctx, graph)?;
        }
        debug!(
            "Statement {} has {} hypotheses over {} variables",
            graph.label(statement),
            st.polynomials.len(),
            st.classes.len()
        );
        Ok(st)
    }

    /// Add a polynomial unless an identical one is already present.
    pub fn add_polynomial(&mut self, owner: Owner, poly: Polynomial) -> bool {
        if self.known.contains(&poly) {
            debug!("Ignoring existing poly {}", poly);
            return false;
        }
        for v in poly.variables() {
            self.classes.entry(v).or_insert(VarClass::Dependent);
        }
        debug!("Adding poly #{}: {}", self.polynomials.len() + 1, poly);
        self.known.insert(poly.clone());
        self.polynomials.push((owner, poly));
        true
    }

    /// Remove every polynomial of `owner`.
    pub fn remove_owned(&mut self, owner: Owner) {
        let known = &mut self.known;
        self.polynomials.retain(|(o, p)| {
            if *o == owner {
                known.remove(p);
                false
            } else {
                true
            }
        });
    }

    pub fn polynomials(&self) -> impl Iterator<Item = &Polynomial> {
        self.polynomials.iter().map(|(_, p)| p)
    }

    pub fn owned(&self, owner: Owner) -> impl Iterator<Item = &Polynomial> {
        self.polynomials
            .iter()
            .filter(move |(o, _)| *o == owner)
            .map(|(_, p)| p)
    }

    pub fn polynomial_count(&self) -> usize {
        self.polynomials.len()
    }

    pub fn add_inequality(&mut self, inequality: impl Into<String>) -> bool {
        push_unique(&mut self.inequalities, inequality.into(), "ineq")
    }

    pub fn add_positive_variable(&mut self, name: impl Into<String>) -> bool {
        push_unique(&mut self.positive_variables, name.into(), "posVar")
    }

    pub fn add_external_variable(&mut self, name: impl Into<String>) -> bool {
        push_unique(&mut self.external_variables, name.into(), "extVar")
    }

    pub fn add_external_polynomial(&mut self, poly: impl Into<String>) -> bool {
        push_unique(&mut self.external_polynomials, poly.into(), "external poly")
    }

    pub fn add_ndg_candidate(&mut self, condition: NdgCondition) {
        debug!("Recording NDG candidate {}", condition);
        self.ndg_candidates.push(condition);
    }

    /// Lower the coordinate fixation limit.
    pub fn limit_fixcoords(&mut self, limit: usize) {
        self.max_fixcoords = Some(self.max_fixcoords.map_or(limit, |m| m.min(limit)));
    }

    pub fn declare_free(&mut self, v: Variable) {
        let class = self.classes.entry(v).or_insert(VarClass::Free);
        if class.is_dependent() {
            *class = VarClass::Free;
        }
        debug!("{} is free", v);
    }

    pub fn declare_almost_free(&mut self, v: Variable) {
        self.classes.insert(v, VarClass::AlmostFree);
        debug!("{} is almost free", v);
    }

    pub fn class(&self, v: Variable) -> VarClass {
        self.classes.get(&v).copied().unwrap_or(VarClass::Dependent)
    }

    fn with_class(&self, keep: impl Fn(&VarClass) -> bool) -> BTreeSet<Variable> {
        self.classes
            .iter()
            .filter(|(_, c)| keep(c))
            .map(|(v, _)| *v)
            .collect()
    }

    /// Free and almost free variables.
    pub fn free_variables(&self) -> BTreeSet<Variable> {
        self.with_class(|c| !c.is_dependent())
    }

    pub fn almost_free_variables(&self) -> BTreeSet<Variable> {
        self.with_class(VarClass::is_almost_free)
    }

    pub fn free_without_almost_free(&self) -> BTreeSet<Variable> {
        self.with_class(VarClass::is_free)
    }

    /// Dependent variables, plus the almost free ones.
    pub fn dependent_with_almost_free(&self) -> BTreeSet<Variable> {
        self.with_class(|c| !c.is_free())
    }

    /// Variables of the hypotheses.
    pub fn variables(&self) -> BTreeSet<Variable> {
        self.polynomials().flat_map(|p| p.variables()).collect()
    }

    /// Drop the thesis, negated or not.
    pub fn remove_thesis(&mut self) {
        debug!("Removing the thesis");
        self.remove_owned(Owner::Thesis);
    }

    /// Restore the negated thesis.
    pub fn add_negated_thesis(&mut self) {
        if let Some(negated) = self.negated_thesis.clone() {
            self.add_polynomial(Owner::Thesis, negated);
        }
    }

    /// Add the thesis factors themselves, to check the thesis is consistent
    /// with the hypotheses.
    pub fn add_thesis_factors(&mut self) {
        for factor in self.thesis_factors.clone() {
            self.add_polynomial(Owner::Thesis, factor);
        }
    }

    /// Request over the current polynomials, with the free variables kept.
    pub fn elimination_request(&self, mode: EliminationMode, permutation: usize) -> EliminationRequest {
        let mut request = EliminationRequest::new(mode, self.polynomials().cloned().collect());
        request.substitutions = self.substitutions.clone();
        request.free_variables = self.free_variables();
        request.permutation = permutation;
        request
    }
}

fn push_unique(list: &mut Vec<String>, item: String, what: &str) -> bool {
    if list.contains(&item) {
        debug!("Ignoring existing {} {}", what, item);
        return false;
    }
    debug!("Adding {} #{}: {}", what, list.len() + 1, item);
    list.push(item);
    true
}
