//! Decision of order relations by real quantifier elimination.
//!
//! The hypotheses travel as an ampersand delimited package to a real
//! geometry service, remote when one is available and the local Tarski
//! replacement otherwise. The answer is the condition under which the
//! negated thesis is satisfiable: `false` proves the statement, anything
//! else is inspected to tell a refutation from a statement that holds on a
//! large enough set.
use log::{debug, info};

use crate::{
    backend::{
        local::LocalRealGeom,
        params::{RealGeomParameters, encode_value},
        strip_sentinels, tarski_output,
    },
    base::ProverContext,
    magic::{LOCAL_QE_FIXCOORDS, REALGEOM_COMMAND},
    ndg::{NdgCondition, names},
    provers::{ProofOutcome, ProofResult, SearchBudget, SearchStatus},
    statement::{AlgebraicStatement, nondegeneracy},
    utils::error::{BotError, BotResult},
};

const RELATIONS: [&str; 5] = [" = ", " > ", " < ", " >= ", " <= "];
const INEQUALITIES: [&str; 5] = [" > ", " < ", " >= ", " <= ", " /= "];
const AND: &str = " /\\ ";
const OR: &str = " \\/ ";
const NOT_EQUAL: &str = " /= ";

/// Simplification rounds of the negated answer.
const SIMPLIFICATIONS: [&str; 2] = ["t-neg", "qepcad-api-call"];

/// Parameter package of `st`, without the thesis.
///
/// Forbids collinear free points first, so the package carries those
/// conditions too.
pub fn rg_parameters(st: &mut AlgebraicStatement, ctx: &ProverContext) -> RealGeomParameters {
    nondegeneracy::free_points_never_collinear(st, &ctx.pool);

    let present = st.variables();
    let free_set = st.free_without_almost_free();
    let free: Vec<String> = free_set
        .intersection(&present)
        .map(ToString::to_string)
        .collect();
    let mut vars = free.join(",");
    if !vars.is_empty() {
        let eliminated: Vec<String> = present
            .difference(&free_set)
            .map(ToString::to_string)
            .collect();
        if !eliminated.is_empty() {
            vars.push(',');
            vars.push_str(&eliminated.join(","));
        }
    }
    for external in &st.external_variables {
        if !vars.is_empty() {
            vars.push(',');
        }
        vars.push_str(external);
    }

    let positive: Vec<&str> = st
        .extra_variables
        .iter()
        .chain(&st.positive_variables)
        .map(String::as_str)
        .collect();
    let polys: Vec<String> = st
        .polynomials()
        .map(ToString::to_string)
        .chain(st.external_polynomials.iter().cloned())
        .collect();

    let mut params = RealGeomParameters::new();
    params
        .push("vars", vars)
        .push("posvariables", positive.join(","))
        .push("polys", polys.join(","));
    if !st.inequalities.is_empty() {
        let ineqs: Vec<String> = st.inequalities.iter().map(|ie| encode_value(ie)).collect();
        params.push("ineqs", ineqs.join(","));
    }
    if let Some(service) = ctx.backends.available_realgeom() {
        params.push("cas", service.cas());
    }
    params
}

/// Decide the thesis inequality of `st`.
pub fn prove_inequality(st: &mut AlgebraicStatement, ctx: &ProverContext) -> BotResult<ProofOutcome> {
    let Some(thesis) = st.thesis_inequality.clone() else {
        return Ok(ProofOutcome::new(ProofResult::Unknown));
    };
    match thesis.as_str() {
        "true" => return Ok(ProofOutcome::new(ProofResult::True)),
        "false" => return Ok(ProofOutcome::new(ProofResult::False)),
        _ => {}
    }

    let mut params = rg_parameters(st, ctx);
    params
        .push("ineq", encode_value(&thesis))
        .push("mode", "prove");
    debug!("Real geometry package: {}", params);

    let answer = match ctx.backends.available_realgeom() {
        Some(service) => service.direct_command(REALGEOM_COMMAND, &params.render())?,
        None => {
            let tarski = ctx.backends.tarski.clone().ok_or_else(|| BotError::Backend {
                backend: "local realgeom".to_string(),
                message: "no Tarski evaluator".to_string(),
            })?;
            let max_fixcoords = st.max_fixcoords.unwrap_or(LOCAL_QE_FIXCOORDS);
            debug!("Local QE with maxfixcoords = {}", max_fixcoords);
            if max_fixcoords == LOCAL_QE_FIXCOORDS {
                if let [a, b, ..] = &st.free_points[..] {
                    let mut condition =
                        NdgCondition::new(names::ARE_EQUAL, [a.label.clone(), b.label.clone()]);
                    condition.rewrite();
                    st.add_ndg_candidate(condition);
                }
            }
            LocalRealGeom::new(tarski).prove(&params, max_fixcoords)?
        }
    };
    let result = classify(st, ctx, strip_sentinels(&answer))?;
    info!("Real geometry answer `{}` means {}", answer, result);
    let outcome = ProofOutcome::new(result);
    if result.yes_no() == Some(true) {
        return Ok(outcome.with_ndgs(st.ndg_candidates.iter().cloned()));
    }
    Ok(outcome)
}

/// Read the answer of a `prove` request.
fn classify(st: &AlgebraicStatement, ctx: &ProverContext, answer: &str) -> BotResult<ProofResult> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Ok(ProofResult::Unknown);
    }
    match answer {
        "false" => return Ok(ProofResult::True),
        "true" => return Ok(ProofResult::False),
        _ => {}
    }
    // A conjunction of disequalities: the thesis holds outside a set of
    // lower dimension only.
    if !RELATIONS.iter().chain([&OR]).any(|r| answer.contains(*r)) {
        return Ok(ProofResult::False);
    }
    if !answer.contains(AND) && answer.contains(NOT_EQUAL) {
        return Ok(ProofResult::False);
    }
    if !st.inequalities.is_empty() {
        debug!("Inequality hypotheses prevent negating the answer");
        return Ok(ProofResult::Unknown);
    }

    let Some(tarski) = ctx.backends.tarski.as_ref() else {
        return Ok(ProofResult::Unknown);
    };
    let mut budget = SearchBudget::new(SIMPLIFICATIONS.len());
    let mut formula = answer.to_string();
    while let Some(round) = budget.next_round() {
        let output = tarski.eval(&format!("({} [{}])", SIMPLIFICATIONS[round], formula))?;
        formula = unwrap_output(&output);
        debug!("{}: {}", SIMPLIFICATIONS[round], formula);
        if let SearchStatus::Done(outcome) = inspect(&formula) {
            return Ok(outcome.result);
        }
    }
    Ok(ProofResult::Unknown)
}

fn unwrap_output(output: &str) -> String {
    let last = output.lines().filter(|l| !l.trim().is_empty()).last();
    match last {
        Some(line) if line.contains(':') => tarski_output(line.trim()),
        Some(line) => line.trim().to_string(),
        None => String::new(),
    }
}

/// A formula free of conjunctions, or of disjunctions, that still contains
/// an inequality describes a large enough set.
fn inspect(formula: &str) -> SearchStatus {
    let has_inequality = INEQUALITIES.iter().any(|r| formula.contains(*r));
    if has_inequality && (!formula.contains(AND) || !formula.contains(OR)) {
        SearchStatus::Done(ProofOutcome::new(ProofResult::TrueOnComponents))
    } else {
        SearchStatus::Continue
    }
}
