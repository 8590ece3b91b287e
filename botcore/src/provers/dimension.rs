//! Hilbert dimension estimates of the hypothesis ideal.
//!
//! A set of variables is independent when the hypotheses imply no relation
//! among them, that is when eliminating every other variable leaves the zero
//! ideal. The dimension is the size of the largest independent set.
use std::collections::{BTreeMap, BTreeSet};

use botpoly::{
    Polynomial, Variable,
    parser::{parse_branches, parse_initials},
};
use log::debug;

use crate::{
    backend::{EliminationMode, EliminationRequest, EliminationService},
    base::settings::{DimensionStrategy, ProverSettings},
    statement::AlgebraicStatement,
    utils::error::{BotError, BotResult},
};

pub struct DimensionEstimator<'a> {
    polynomials: Vec<Polynomial>,
    variables: BTreeSet<Variable>,
    /// Geometrically free variables that are not substituted.
    free: BTreeSet<Variable>,
    substitutions: BTreeMap<Variable, i64>,
    service: &'a dyn EliminationService,
    maximal_set: Option<BTreeSet<Variable>>,
    calls: usize,
}

impl<'a> DimensionEstimator<'a> {
    /// Estimator over the current hypotheses of `st`, substituted variables
    /// excluded.
    pub fn new(st: &AlgebraicStatement, service: &'a dyn EliminationService) -> Self {
        let variables = st
            .variables()
            .into_iter()
            .filter(|v| !st.substitutions.contains_key(v))
            .collect();
        let free = st
            .free_variables()
            .into_iter()
            .filter(|v| !st.substitutions.contains_key(v))
            .collect();
        Self {
            polynomials: st.polynomials().cloned().collect(),
            variables,
            free,
            substitutions: st.substitutions.clone(),
            service,
            maximal_set: None,
            calls: 0,
        }
    }

    /// Largest independent set met by the last estimate.
    pub fn maximal_set(&self) -> Option<&BTreeSet<Variable>> {
        self.maximal_set.as_ref()
    }

    /// Number of requests sent to the elimination service.
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Whether the dimension exceeds `min_dim`, growing independent sets.
    ///
    /// Stops at the first independent set larger than `min_dim`.
    pub fn is_dim_greater_than(&mut self, min_dim: usize) -> BotResult<bool> {
        Ok(self.walk(Some(min_dim))? > min_dim)
    }

    /// Dimension, growing independent sets until none is left.
    pub fn compute(&mut self) -> BotResult<usize> {
        self.walk(None)
    }

    /// Whether the dimension exceeds `min_dim`, searching independent sets
    /// against the Groebner initials.
    pub fn is_dim_greater_than_by_initials(&mut self, min_dim: usize) -> BotResult<bool> {
        let request = self.request(EliminationMode::Initials, self.free.clone());
        self.calls += 1;
        let answer = self.service.groebner_initials(&request)?;
        debug!("Groebner initials: {}", answer);
        let initials = parse_initials(answer.trim()).map_err(|_| self.unparseable(&answer))?;

        // The free variables stand in when the naive dimension is exact.
        self.maximal_set = Some(self.free.clone());
        let variables: Vec<Variable> = self.variables.iter().copied().collect();
        for dim in min_dim + 1..=variables.len() {
            let found = first_subset(&variables, dim, &|set| {
                !initials.iter().any(|initial| initial.is_subset(set))
            });
            match found {
                Some(set) => {
                    debug!("Independent set of size {}: {:?}", dim, set);
                    self.maximal_set = Some(set);
                }
                None => return Ok(dim > min_dim + 1),
            }
        }
        Ok(variables.len() > min_dim)
    }

    /// [`Self::is_dim_greater_than`] or [`Self::is_dim_greater_than_by_initials`],
    /// as configured.
    pub fn is_dim_greater_than_with(
        &mut self,
        settings: &ProverSettings,
        min_dim: usize,
    ) -> BotResult<bool> {
        let by_initials = match settings.dimension_strategy {
            DimensionStrategy::IndependentSets => false,
            DimensionStrategy::Initials => true,
            DimensionStrategy::Auto => self.variables.len() > settings.auto_independent_sets_limit,
        };
        let greater = if by_initials {
            self.is_dim_greater_than_by_initials(min_dim)?
        } else {
            self.is_dim_greater_than(min_dim)?
        };
        debug!(
            "Dimension greater than {}: {} ({} calls)",
            min_dim, greater, self.calls
        );
        Ok(greater)
    }

    fn walk(&mut self, early_exit: Option<usize>) -> BotResult<usize> {
        let mut level: Vec<BTreeSet<Variable>> = self
            .variables
            .iter()
            .map(|v| BTreeSet::from([*v]))
            .collect();
        let mut dimension = 0;

        while !level.is_empty() {
            let mut kept = Vec::new();
            for set in level {
                if !self.is_independent(&set)? {
                    continue;
                }
                if early_exit.is_some_and(|min| set.len() > min) {
                    dimension = set.len();
                    self.maximal_set = Some(set);
                    return Ok(dimension);
                }
                kept.push(set);
            }
            let Some(first) = kept.first() else {
                break;
            };
            dimension = first.len();
            self.maximal_set = Some(first.clone());

            let mut next = BTreeSet::new();
            for (i, a) in kept.iter().enumerate() {
                for b in &kept[i + 1..] {
                    let union: BTreeSet<Variable> = a.union(b).copied().collect();
                    if union.len() == dimension + 1 {
                        next.insert(union);
                    }
                }
            }
            level = next.into_iter().collect();
        }
        Ok(dimension)
    }

    fn is_independent(&mut self, set: &BTreeSet<Variable>) -> BotResult<bool> {
        let request = self.request(EliminationMode::Eliminate, set.clone());
        self.calls += 1;
        let answer = self.service.eliminate(&request)?;
        let branches = parse_branches(answer.trim()).map_err(|_| self.unparseable(&answer))?;
        let independent = branches.iter().flatten().any(Polynomial::is_zero);
        debug!("{:?} independent: {}", set, independent);
        Ok(independent)
    }

    fn request(&self, mode: EliminationMode, free: BTreeSet<Variable>) -> EliminationRequest {
        let mut request = EliminationRequest::new(mode, self.polynomials.clone());
        request.substitutions = self.substitutions.clone();
        request.free_variables = free;
        request
    }

    fn unparseable(&self, answer: &str) -> BotError {
        BotError::Unparseable {
            backend: self.service.name().to_string(),
            answer: answer.to_string(),
        }
    }
}

/// First subset of `items` of the given size accepted by `accept`, in
/// lexicographic order.
fn first_subset(
    items: &[Variable],
    size: usize,
    accept: &dyn Fn(&BTreeSet<Variable>) -> bool,
) -> Option<BTreeSet<Variable>> {
    fn extend(
        items: &[Variable],
        size: usize,
        chosen: &mut Vec<Variable>,
        accept: &dyn Fn(&BTreeSet<Variable>) -> bool,
    ) -> Option<BTreeSet<Variable>> {
        if chosen.len() == size {
            let set: BTreeSet<Variable> = chosen.iter().copied().collect();
            return accept(&set).then_some(set);
        }
        let missing = size - chosen.len();
        for (i, v) in items.iter().enumerate() {
            if items.len() - i < missing {
                break;
            }
            chosen.push(*v);
            let found = extend(&items[i + 1..], size, chosen, accept);
            chosen.pop();
            if found.is_some() {
                return found;
            }
        }
        None
    }
    extend(items, size, &mut Vec::with_capacity(size), accept)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        backend::scripted::ScriptedElimination, construction::ObjectId, statement::Owner,
    };

    fn v(id: u32) -> Polynomial {
        Polynomial::var(Variable(id))
    }

    /// Hypotheses over `v1..v4` with `v3 = v1 + v2` and `v4 = v1`.
    fn statement() -> AlgebraicStatement {
        let mut st = AlgebraicStatement::new(ObjectId(1));
        st.add_polynomial(Owner::Condition, &v(3) - &(&v(1) + &v(2)));
        st.add_polynomial(Owner::Condition, &v(4) - &v(1));
        st
    }

    /// Independent iff the set has at most two variables and is not `{v1,v4}`.
    fn oracle() -> ScriptedElimination {
        ScriptedElimination::new().with_handler(|request| {
            let free = &request.free_variables;
            let ids: BTreeSet<u32> = free.iter().map(|v| v.id()).collect();
            let dependent = ids.len() > 2 || ids == BTreeSet::from([1, 4]);
            Some(if dependent { "[[v1]]" } else { "[[0]]" }.to_string())
        })
    }

    #[test]
    fn lattice_walk_finds_the_dimension() {
        let service = oracle();
        let st = statement();
        let mut estimator = DimensionEstimator::new(&st, &service);
        assert_eq!(estimator.compute().unwrap(), 2);
        assert_eq!(estimator.maximal_set().map(BTreeSet::len), Some(2));

        let mut estimator = DimensionEstimator::new(&st, &service);
        assert!(estimator.is_dim_greater_than(1).unwrap());
        let mut estimator = DimensionEstimator::new(&st, &service);
        assert!(!estimator.is_dim_greater_than(2).unwrap());
    }

    #[test]
    fn early_exit_saves_calls() {
        let service = oracle();
        let st = statement();
        let mut full = DimensionEstimator::new(&st, &service);
        full.compute().unwrap();
        let mut early = DimensionEstimator::new(&st, &service);
        assert!(early.is_dim_greater_than(0).unwrap());
        assert_eq!(early.calls(), 1);
        assert!(full.calls() > early.calls());
    }

    #[test]
    fn substituted_variables_are_not_candidates() {
        let service = ScriptedElimination::new().with_handler(|_| Some("[[0]]".to_string()));
        let mut st = statement();
        st.substitutions.insert(Variable(1), 0);
        let mut estimator = DimensionEstimator::new(&st, &service);
        assert_eq!(estimator.compute().unwrap(), 3);
        assert!(service.requests().iter().all(|r| !r.free_variables.contains(&Variable(1))));
    }

    #[test]
    fn initials_bound_the_independent_sets() {
        let service = ScriptedElimination::new();
        service.push(EliminationMode::Initials, "{{v3},{v4}}");
        let st = statement();
        let mut estimator = DimensionEstimator::new(&st, &service);
        assert!(estimator.is_dim_greater_than_by_initials(1).unwrap());
        assert_eq!(
            estimator.maximal_set(),
            Some(&BTreeSet::from([Variable(1), Variable(2)]))
        );

        service.push(EliminationMode::Initials, "{{v3},{v4}}");
        let mut estimator = DimensionEstimator::new(&st, &service);
        assert!(!estimator.is_dim_greater_than_by_initials(2).unwrap());
    }

    #[test]
    fn initials_are_asked_over_the_unsubstituted_free_variables() {
        let service = ScriptedElimination::new();
        service.push(EliminationMode::Initials, "{{v3},{v4}}");
        let mut st = statement();
        st.declare_free(Variable(1));
        st.declare_free(Variable(2));
        st.substitutions.insert(Variable(2), 0);
        let mut estimator = DimensionEstimator::new(&st, &service);
        // The only triple left, `{v1,v3,v4}`, holds both initials.
        assert!(!estimator.is_dim_greater_than_by_initials(2).unwrap());
        assert_eq!(
            service.requests()[0].free_variables,
            BTreeSet::from([Variable(1)])
        );
        assert_eq!(estimator.maximal_set(), Some(&BTreeSet::from([Variable(1)])));
    }

    #[test]
    fn strategy_follows_the_settings() {
        let service = Arc::new(oracle());
        service.push(EliminationMode::Initials, "{{v3},{v4}}");
        let st = statement();
        let settings = ProverSettings {
            dimension_strategy: DimensionStrategy::Auto,
            auto_independent_sets_limit: 3,
            ..ProverSettings::default()
        };
        let mut estimator = DimensionEstimator::new(&st, service.as_ref());
        assert!(estimator.is_dim_greater_than_with(&settings, 1).unwrap());
        assert!(service.requests()[0].mode.is_initials());
    }

    #[test]
    fn unparseable_initials() {
        let service = ScriptedElimination::new();
        service.push(EliminationMode::Initials, "GIAC ERROR");
        let st = statement();
        let mut estimator = DimensionEstimator::new(&st, &service);
        assert!(estimator.is_dim_greater_than_by_initials(0).unwrap_err().is_unparseable());
    }
}
