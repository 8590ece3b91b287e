//! Decision of equational theses by elimination.
//!
//! The hypotheses and the negated thesis are handed to the elimination
//! service with the dependent variables to eliminate. A zero factor means
//! the negated thesis is consistent with the generic construction, so the
//! statement is not generally true. Otherwise every branch of the answer is
//! a candidate set of NDG conditions and the most readable one is reported.
use std::{cmp::Ordering, collections::BTreeSet};

use botpoly::{Polynomial, Variable, parser::parse_branches};
use log::{debug, info};

use crate::{
    backend::{EliminationMode, EliminationService},
    base::ProverContext,
    magic::MERGED_EQUALITY_READABILITY,
    ndg::{
        NdgCondition,
        detector::{NdgDetector, StandardNdgDetector},
        names,
    },
    provers::{
        ProofMode, ProofOutcome, ProofResult, SearchBudget, SearchStatus,
        dimension::DimensionEstimator,
    },
    statement::{AlgebraicStatement, StatementFlags, fixation, nondegeneracy},
    utils::error::{BotError, BotResult},
};

/// Reading of one elimination or solvability answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    /// The system is consistent on the generic construction.
    Degenerate,
    /// It is not.
    Generic,
    /// The service could not tell.
    Undecided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavour {
    Eliminate,
    Solvable,
}

/// A readable branch of an elimination answer.
#[derive(Debug, Clone)]
struct Candidate {
    score: f64,
    rendered: Vec<String>,
    conditions: Vec<NdgCondition>,
}

impl Candidate {
    fn new(mut conditions: Vec<NdgCondition>) -> Self {
        conditions.sort();
        Self {
            score: conditions.iter().map(|c| c.readability).sum(),
            rendered: conditions.iter().map(ToString::to_string).collect(),
            conditions,
        }
    }

    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.rendered.cmp(&other.rendered))
    }
}

/// Decide `st`, whose thesis is already negated.
pub fn prove(
    st: &mut AlgebraicStatement,
    ctx: &ProverContext,
    mode: ProofMode,
) -> BotResult<ProofOutcome> {
    let service = ctx.backends.elimination.as_ref();
    let settings = &ctx.settings;
    let details = mode.is_details() || !service.supports_transcendental_extension();

    let mut fixcoords = settings.fix_coordinates(details);
    if let Some(max) = st.max_fixcoords {
        fixcoords = fixcoords.min(max);
    }
    if st.flags.contains(StatementFlags::DISALLOW_FIX_SECOND_POINT) {
        fixcoords = fixcoords.min(2);
    }
    if settings.free_points_never_collinear {
        nondegeneracy::free_points_never_collinear(st, &ctx.pool);
    }
    let substitutions = fixation::fix_values(st, fixcoords);
    debug!("Substitutions: {:?}", substitutions);

    let outcome = if details {
        prove_details(st, ctx)?
    } else {
        prove_yes_no(st, ctx)?
    };
    Ok(finish(st, ctx, outcome))
}

fn finish(st: &AlgebraicStatement, ctx: &ProverContext, mut outcome: ProofOutcome) -> ProofOutcome {
    if outcome.result.is_true() && st.flags.contains(StatementFlags::INTERPRET_TRUE_AS_UNDEFINED) {
        info!("Interpreting TRUE as UNKNOWN");
        return ProofOutcome::new(ProofResult::Unknown);
    }
    if ctx.settings.return_extra_ndgs && outcome.result.yes_no() == Some(true) {
        outcome.ndgs.extend(st.ndg_candidates.iter().cloned());
    }
    outcome
}

fn prove_details(st: &mut AlgebraicStatement, ctx: &ProverContext) -> BotResult<ProofOutcome> {
    let service = ctx.backends.elimination.as_ref();
    let rounds = if service.supports_permutations() {
        ctx.settings.max_permutations
    } else {
        1
    };
    let points: Vec<_> = st
        .points
        .iter()
        .map(|p| (p.label.clone(), p.coords))
        .collect();
    let detector = StandardNdgDetector::new(&points, &st.substitutions);

    let mut budget = SearchBudget::new(rounds);
    while let Some(permutation) = budget.next_round() {
        let branches = eliminate(st, service, None, permutation)?;
        if has_zero_factor(&branches) {
            return not_generally_true(st, ctx, &mut budget, Flavour::Eliminate);
        }
        match read_branches(st, &detector, &branches) {
            SearchStatus::Done(outcome) => return Ok(outcome),
            SearchStatus::Continue => debug!("No readable branch with permutation {}", permutation),
        }
    }
    info!(
        "No readable NDG set after {} elimination calls",
        budget.used()
    );
    Ok(ProofOutcome::new(ProofResult::TrueNdgUnreadable))
}

fn prove_yes_no(st: &mut AlgebraicStatement, ctx: &ProverContext) -> BotResult<ProofOutcome> {
    let mut budget = SearchBudget::new(1);
    let permutation = budget.next_round().unwrap_or_default();
    match probe(st, ctx, Flavour::Solvable, None, permutation)? {
        Verdict::Generic => Ok(ProofOutcome::new(ProofResult::True)),
        Verdict::Undecided => Ok(ProofOutcome::new(ProofResult::Unknown)),
        Verdict::Degenerate if !ctx.settings.transcendental_extension => {
            debug!("Solvable, but transcendental extensions are disabled");
            Ok(ProofOutcome::new(ProofResult::Unknown))
        }
        Verdict::Degenerate => not_generally_true(st, ctx, &mut budget, Flavour::Solvable),
    }
}

/// The negated thesis is consistent. Decide whether the thesis is
/// consistent too, and on how much of the construction.
fn not_generally_true(
    st: &mut AlgebraicStatement,
    ctx: &ProverContext,
    budget: &mut SearchBudget,
    flavour: Flavour,
) -> BotResult<ProofOutcome> {
    info!("Statement is not generally true");
    st.remove_thesis();
    st.add_thesis_factors();
    match probe(st, ctx, flavour, None, budget.follow_up())? {
        Verdict::Generic => {
            info!("Statement is generally false");
            if st.flags.contains(StatementFlags::INTERPRET_FALSE_AS_UNDEFINED) {
                info!("Interpreting FALSE as UNKNOWN");
                return Ok(ProofOutcome::new(ProofResult::Unknown));
            }
            return Ok(ProofOutcome::new(ProofResult::False));
        }
        Verdict::Undecided => return Ok(ProofOutcome::new(ProofResult::Unknown)),
        Verdict::Degenerate => {}
    }

    st.remove_thesis();
    let naive = st
        .free_variables()
        .len()
        .saturating_sub(st.substitutions.len());
    debug!("Naive dimension = {}", naive);
    let service = ctx.backends.elimination.as_ref();
    let mut estimator = DimensionEstimator::new(st, service);
    if !estimator.is_dim_greater_than_with(&ctx.settings, naive)? {
        info!("Statement is not generally false");
        return Ok(ProofOutcome::new(ProofResult::TrueOnComponents));
    }
    if !ctx.settings.investigate_maximal_independent_set {
        return Ok(ProofOutcome::new(ProofResult::Unknown));
    }
    let Some(maximal) = estimator.maximal_set().cloned() else {
        return Ok(ProofOutcome::new(ProofResult::Unknown));
    };

    debug!("Checking again over the maximal independent set {:?}", maximal);
    st.add_thesis_factors();
    Ok(match probe(st, ctx, flavour, Some(&maximal), budget.follow_up())? {
        Verdict::Degenerate => ProofOutcome::new(ProofResult::TrueOnComponents),
        Verdict::Generic => ProofOutcome::new(ProofResult::False),
        Verdict::Undecided => ProofOutcome::new(ProofResult::Unknown),
    })
}

fn has_zero_factor(branches: &[Vec<Polynomial>]) -> bool {
    branches.iter().flatten().any(Polynomial::is_zero)
}

fn eliminate(
    st: &AlgebraicStatement,
    service: &dyn EliminationService,
    free: Option<&BTreeSet<Variable>>,
    permutation: usize,
) -> BotResult<Vec<Vec<Polynomial>>> {
    let mut request = st.elimination_request(EliminationMode::Eliminate, permutation);
    if let Some(free) = free {
        request.free_variables = free.clone();
    }
    debug!("Eliminating: {}", request.render());
    let answer = service.eliminate(&request)?;
    debug!("Elimination answer: {}", answer);
    let branches = parse_branches(answer.trim()).map_err(|_| BotError::Unparseable {
        backend: service.name().to_string(),
        answer: answer.clone(),
    })?;
    if branches.is_empty() {
        return Err(BotError::Unparseable {
            backend: service.name().to_string(),
            answer,
        });
    }
    Ok(branches)
}

fn probe(
    st: &AlgebraicStatement,
    ctx: &ProverContext,
    flavour: Flavour,
    free: Option<&BTreeSet<Variable>>,
    permutation: usize,
) -> BotResult<Verdict> {
    let service = ctx.backends.elimination.as_ref();
    match flavour {
        Flavour::Eliminate => Ok(if has_zero_factor(&eliminate(st, service, free, permutation)?) {
            Verdict::Degenerate
        } else {
            Verdict::Generic
        }),
        Flavour::Solvable => {
            let mut request = st.elimination_request(EliminationMode::Solvable, permutation);
            if let Some(free) = free {
                request.free_variables = free.clone();
            }
            request.transcendental_extension = ctx.settings.transcendental_extension;
            debug!("Solvability: {}", request.render());
            let answer = service.solvable(&request)?;
            debug!("Solvability answer: {}", answer);
            Ok(match answer.trim() {
                "true" => Verdict::Degenerate,
                "false" => Verdict::Generic,
                _ => Verdict::Undecided,
            })
        }
    }
}

/// Pick the most readable branch. `Continue` when no branch is readable.
fn read_branches(
    st: &AlgebraicStatement,
    detector: &dyn NdgDetector,
    branches: &[Vec<Polynomial>],
) -> SearchStatus {
    let constant = |f: &Polynomial| f.is_constant();
    if st.flags.contains(StatementFlags::INTERPRET_TRUE_AS_UNDEFINED)
        && !branches.iter().flatten().all(constant)
    {
        info!("Interpreting TRUE as UNKNOWN");
        return SearchStatus::Done(ProofOutcome::new(ProofResult::Unknown));
    }

    let mut readable: Vec<Vec<NdgCondition>> = Vec::new();
    for branch in branches {
        let conditions: Option<Vec<NdgCondition>> = branch
            .iter()
            .filter(|f| !f.is_constant())
            .map(|f| {
                detector.detect(f).map(|mut c| {
                    c.rewrite();
                    c
                })
            })
            .collect();
        match conditions {
            Some(conditions) => readable.push(conditions),
            None => debug!("Unreadable branch [{}]", botpoly::fmt::join(branch, ",")),
        }
    }
    if let Some(merged) = merge_coordinates(branches, &readable) {
        readable = vec![vec![merged]];
    }

    let best = readable
        .into_iter()
        .map(Candidate::new)
        .min_by(Candidate::cmp);
    match best {
        Some(best) => {
            info!("NDG conditions: [{}]", best.rendered.join(", "));
            SearchStatus::Done(
                ProofOutcome::new(ProofResult::True).with_ndgs(best.conditions),
            )
        }
        None => SearchStatus::Continue,
    }
}

/// `xAreEqual(M,N)` and `yAreEqual(M,N)` as the only two alternatives mean
/// `AreEqual(M,N)`. The answer itself must be two single factors.
fn merge_coordinates(
    branches: &[Vec<Polynomial>],
    readable: &[Vec<NdgCondition>],
) -> Option<NdgCondition> {
    if branches.len() != 2 || branches.iter().any(|b| b.len() != 1) {
        return None;
    }
    let [first, second] = readable else {
        return None;
    };
    let ([x], [y]) = (&first[..], &second[..]) else {
        return None;
    };
    let (x, y) = match (x.condition.as_str(), y.condition.as_str()) {
        (names::X_ARE_EQUAL, names::Y_ARE_EQUAL) => (x, y),
        (names::Y_ARE_EQUAL, names::X_ARE_EQUAL) => (y, x),
        _ => return None,
    };
    if x.objects != y.objects {
        return None;
    }
    debug!("Merging {} and {}", x, y);
    let mut merged = NdgCondition::new(names::ARE_EQUAL, x.objects.clone())
        .with_readability(MERGED_EQUALITY_READABILITY);
    merged.rewrite();
    Some(merged)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use botpoly::geometry::Coords;

    use super::*;
    use crate::{
        backend::{
            Backends,
            scripted::{ScriptedCas, ScriptedElimination},
        },
        base::settings::{DimensionStrategy, ProverSettings},
        construction::ObjectId,
        statement::{LabelledPoint, Owner},
    };

    fn context(elimination: Arc<ScriptedElimination>, settings: ProverSettings) -> ProverContext {
        ProverContext::new(settings, Backends::new(Arc::new(ScriptedCas::new()), elimination))
    }

    /// Three free points `A`, `B`, `C` over `v1..v6` and a thesis `v5-v6`.
    fn statement() -> AlgebraicStatement {
        let mut st = AlgebraicStatement::new(ObjectId(10));
        for i in 0..3u32 {
            let coords: Coords = [Variable(2 * i + 1), Variable(2 * i + 2)];
            st.declare_free(coords[0]);
            st.declare_free(coords[1]);
            let point = LabelledPoint {
                id: ObjectId(i + 1),
                label: ((b'A' + i as u8) as char).to_string(),
                coords,
            };
            st.points.push(point.clone());
            st.free_points.push(point);
        }
        let thesis = Polynomial::var(Variable(5)) - Polynomial::var(Variable(6));
        st.thesis_factors = vec![thesis.clone()];
        st.negated_thesis = Some(botpoly::geometry::rabinowitsch(&thesis, Variable(7)));
        st.add_negated_thesis();
        st
    }

    #[test]
    fn constant_branch_is_true_without_conditions() {
        let elimination = Arc::new(ScriptedElimination::new());
        elimination.push(EliminationMode::Eliminate, "[[1]]");
        let ctx = context(elimination.clone(), ProverSettings::default());
        let mut st = statement();

        let outcome = prove(&mut st, &ctx, ProofMode::Details).unwrap();
        assert_eq!(outcome.result, ProofResult::True);
        assert!(outcome.ndgs.is_empty());
        assert_eq!(elimination.calls(), 1);
    }

    #[test]
    fn coordinate_conditions_are_merged() {
        let elimination = Arc::new(ScriptedElimination::new());
        elimination.push(EliminationMode::Eliminate, "[[v1-v5],[v6-v2]]");
        let settings = ProverSettings {
            fix_coordinates_prove_details: 0,
            ..ProverSettings::default()
        };
        let ctx = context(elimination, settings);
        let mut st = statement();

        let outcome = prove(&mut st, &ctx, ProofMode::Details).unwrap();
        assert_eq!(outcome.result, ProofResult::True);
        let ndgs: Vec<String> = outcome.ndgs.iter().map(ToString::to_string).collect();
        assert_eq!(ndgs, vec!["AreEqual(A,C)"]);
        assert_eq!(
            outcome.ndgs.iter().next().unwrap().readability,
            MERGED_EQUALITY_READABILITY
        );
    }

    #[test]
    fn coordinates_are_merged_only_for_two_single_factors() {
        let elimination = Arc::new(ScriptedElimination::new());
        elimination.push(EliminationMode::Eliminate, "[[v1-v5],[v6-v2],[v5^3+v6^3+7]]");
        let settings = ProverSettings {
            fix_coordinates_prove_details: 0,
            ..ProverSettings::default()
        };
        let ctx = context(elimination.clone(), settings.clone());
        let mut st = statement();
        let outcome = prove(&mut st, &ctx, ProofMode::Details).unwrap();
        assert_eq!(outcome.result, ProofResult::True);
        assert!(outcome.ndgs.iter().all(|c| c.condition != names::ARE_EQUAL));

        // A constant factor still counts as a factor of the answer.
        elimination.push(EliminationMode::Eliminate, "[[v1-v5],[2,v6-v2]]");
        let mut st = statement();
        let outcome = prove(&mut st, &ctx, ProofMode::Details).unwrap();
        assert_eq!(outcome.ndgs.len(), 1);
        assert!(outcome.ndgs.iter().all(|c| c.condition != names::ARE_EQUAL));
    }

    #[test]
    fn maximal_independent_set_recheck_uses_the_thesis() {
        let elimination =
            Arc::new(ScriptedElimination::new().with_handler(|_| Some("[[0]]".to_string())));
        let settings = ProverSettings {
            dimension_strategy: DimensionStrategy::IndependentSets,
            investigate_maximal_independent_set: true,
            ..ProverSettings::default()
        };
        let ctx = context(elimination.clone(), settings);
        let mut st = statement();
        let v = |id| Polynomial::var(Variable(id));
        st.add_polynomial(Owner::Condition, v(8) - v(5));
        st.add_polynomial(Owner::Condition, v(9) - v(5));

        let outcome = prove(&mut st, &ctx, ProofMode::Details).unwrap();
        assert_eq!(outcome.result, ProofResult::TrueOnComponents);
        let requests = elimination.requests();
        let recheck = requests.last().unwrap();
        assert!(recheck.polynomials.contains(&st.thesis_factors[0]));
        let negated = st.negated_thesis.clone().unwrap();
        assert!(!recheck.polynomials.contains(&negated));
        assert_eq!(
            recheck.free_variables,
            BTreeSet::from([Variable(5), Variable(8), Variable(9)])
        );
    }

    #[test]
    fn unreadable_answers_exhaust_the_permutations() {
        let elimination = Arc::new(
            ScriptedElimination::new()
                .with_handler(|_| Some("[[v5^3+v6^3+7]]".to_string())),
        );
        let settings = ProverSettings {
            max_permutations: 3,
            ..ProverSettings::default()
        };
        let ctx = context(elimination.clone(), settings);
        let mut st = statement();

        let outcome = prove(&mut st, &ctx, ProofMode::Details).unwrap();
        assert_eq!(outcome.result, ProofResult::TrueNdgUnreadable);
        let permutations: Vec<usize> = elimination
            .requests()
            .iter()
            .map(|r| r.permutation)
            .collect();
        assert_eq!(permutations, vec![0, 1, 2]);
    }

    #[test]
    fn single_round_without_permutation_support() {
        let elimination = Arc::new(
            ScriptedElimination::new()
                .with_permutations(false)
                .with_handler(|_| Some("[[v5^3+v6^3+7]]".to_string())),
        );
        let ctx = context(elimination.clone(), ProverSettings::default());
        let mut st = statement();
        let outcome = prove(&mut st, &ctx, ProofMode::Details).unwrap();
        assert_eq!(outcome.result, ProofResult::TrueNdgUnreadable);
        assert_eq!(elimination.calls(), 1);
    }

    #[test]
    fn zero_branch_then_generic_recheck_is_false() {
        let elimination = Arc::new(ScriptedElimination::new());
        elimination.push(EliminationMode::Eliminate, "[[0]]");
        elimination.push(EliminationMode::Eliminate, "[[v5]]");
        let ctx = context(elimination.clone(), ProverSettings::default());
        let mut st = statement();

        let outcome = prove(&mut st, &ctx, ProofMode::Details).unwrap();
        assert_eq!(outcome.result, ProofResult::False);
        let recheck = &elimination.requests()[1];
        assert!(recheck.polynomials.contains(&st.thesis_factors[0]));
        assert_eq!(recheck.permutation, 1);

        let elimination = Arc::new(ScriptedElimination::new());
        elimination.push(EliminationMode::Eliminate, "[[0]]");
        elimination.push(EliminationMode::Eliminate, "[[v5]]");
        let ctx = context(elimination, ProverSettings::default());
        let mut st = statement();
        st.flags |= StatementFlags::INTERPRET_FALSE_AS_UNDEFINED;
        let outcome = prove(&mut st, &ctx, ProofMode::Details).unwrap();
        assert_eq!(outcome.result, ProofResult::Unknown);
    }

    #[test]
    fn interpret_true_as_undefined() {
        let elimination = Arc::new(ScriptedElimination::new());
        elimination.push(EliminationMode::Eliminate, "[[v5]]");
        let ctx = context(elimination, ProverSettings::default());
        let mut st = statement();
        st.flags |= StatementFlags::INTERPRET_TRUE_AS_UNDEFINED;
        let outcome = prove(&mut st, &ctx, ProofMode::Details).unwrap();
        assert_eq!(outcome.result, ProofResult::Unknown);
    }

    #[test]
    fn yes_no_uses_solvability() {
        let elimination = Arc::new(ScriptedElimination::new());
        elimination.push(EliminationMode::Solvable, "false");
        let ctx = context(elimination.clone(), ProverSettings::default());
        let mut st = statement();
        let outcome = prove(&mut st, &ctx, ProofMode::YesNo).unwrap();
        assert_eq!(outcome.result, ProofResult::True);
        assert!(elimination.requests()[0].mode.is_solvable());

        elimination.push(EliminationMode::Solvable, "?");
        let mut st = statement();
        let outcome = prove(&mut st, &ctx, ProofMode::YesNo).unwrap();
        assert_eq!(outcome.result, ProofResult::Unknown);
    }

    #[test]
    fn yes_no_falls_back_to_details() {
        let elimination = Arc::new(
            ScriptedElimination::new().with_transcendental_extension(false),
        );
        elimination.push(EliminationMode::Eliminate, "[[1]]");
        let ctx = context(elimination.clone(), ProverSettings::default());
        let mut st = statement();
        let outcome = prove(&mut st, &ctx, ProofMode::YesNo).unwrap();
        assert_eq!(outcome.result, ProofResult::True);
        assert!(elimination.requests()[0].mode.is_eliminate());
    }

    #[test]
    fn extra_candidates_are_reported_on_request() {
        let elimination = Arc::new(ScriptedElimination::new());
        elimination.push(EliminationMode::Eliminate, "[[1]]");
        let settings = ProverSettings {
            return_extra_ndgs: true,
            ..ProverSettings::default()
        };
        let ctx = context(elimination, settings);
        let mut st = statement();
        let outcome = prove(&mut st, &ctx, ProofMode::Details).unwrap();
        let ndgs: Vec<String> = outcome.ndgs.iter().map(ToString::to_string).collect();
        assert_eq!(ndgs, vec!["AreEqual(A,B)"]);
    }

    #[test]
    fn garbage_answer_is_an_error() {
        let elimination = Arc::new(ScriptedElimination::new());
        elimination.push(EliminationMode::Eliminate, "GIAC ERROR");
        let ctx = context(elimination, ProverSettings::default());
        let mut st = statement();
        let e = prove(&mut st, &ctx, ProofMode::Details).unwrap_err();
        assert!(e.is_unparseable());
        assert_eq!(e.proof_result(), ProofResult::Unknown);
    }
}
