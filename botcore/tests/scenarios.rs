mod common;

use botcore::{
    backend::{EliminationMode, scripted::ScriptedElimination},
    base::settings::{DimensionStrategy, ProverSettings},
    construction::{ObjectKind, StepKind, graph::Construction},
    provers::{ProofMode, ProofResult},
};
use common::{Harness, triangle};

fn ndg_names(outcome: &botcore::provers::ProofOutcome) -> Vec<String> {
    outcome.ndgs.iter().map(ToString::to_string).collect()
}

#[test]
fn generic_counterexample_is_false() {
    let mut cons = Construction::new();
    let a = cons.free_point("A");
    let b = cons.free_point("B");
    let m = cons.midpoint("M", a, b).unwrap();
    let c = cons.free_point("C");
    let s = cons
        .statement("s", StepKind::AreCollinear { a, b: m, c })
        .unwrap();

    let h = Harness::new(ProverSettings::default());
    h.elimination.push(EliminationMode::Eliminate, "[[0]]");
    h.elimination.push(EliminationMode::Eliminate, "[[v7]]");

    let outcome = h.prover.prove(&cons, s);
    assert_eq!(outcome.result, ProofResult::False);
    assert!(outcome.ndgs.is_empty());
    assert_eq!(h.elimination.calls(), 2);
}

#[test]
fn degenerate_components_are_reported() {
    let mut cons = Construction::new();
    let [a, b, c] = triangle(&mut cons);
    let s = cons
        .statement("s", StepKind::AreCollinear { a, b, c })
        .unwrap();

    let settings = ProverSettings {
        dimension_strategy: DimensionStrategy::IndependentSets,
        ..ProverSettings::default()
    };
    let elimination = ScriptedElimination::new().with_handler(|request| {
        let independent = request.free_variables.len() <= 1;
        Some(if independent { "[[0]]" } else { "[[v5]]" }.to_string())
    });
    let h = Harness::with_elimination(settings, elimination);
    h.elimination.push(EliminationMode::Eliminate, "[[0]]");
    h.elimination.push(EliminationMode::Eliminate, "[[0]]");

    assert_eq!(h.prover.prove(&cons, s).result, ProofResult::TrueOnComponents);
}

#[test]
fn constructed_midpoint_is_the_midpoint() {
    let mut cons = Construction::new();
    let a = cons.free_point("A");
    let b = cons.free_point("B");
    let m = cons.midpoint("M", a, b).unwrap();
    let n = cons.midpoint("N", b, a).unwrap();
    let s = cons.statement("s", StepKind::AreEqual { a: m, b: n }).unwrap();

    let h = Harness::new(ProverSettings::default());
    h.elimination.push(EliminationMode::Eliminate, "[[1]]");

    let outcome = h.prover.prove(&cons, s);
    assert_eq!(outcome.result, ProofResult::True);
    assert!(outcome.ndgs.is_empty());

    let request = &h.elimination.requests()[0];
    assert_eq!(request.substitutions.len(), 4);
    assert_eq!(request.permutation, 0);
}

#[test]
fn circumcenter_is_equidistant_from_non_collinear_vertices() {
    let mut cons = Construction::new();
    let [a, b, c] = triangle(&mut cons);
    let p = cons.perpendicular_bisector("p", a, b).unwrap();
    let q = cons.perpendicular_bisector("q", a, c).unwrap();
    let o = cons.intersect("O", p, q).unwrap();
    let f = cons.segment("f", o, b).unwrap();
    let g = cons.segment("g", o, c).unwrap();
    let s = cons
        .statement("s", StepKind::AreCongruent { a: f, b: g })
        .unwrap();

    let h = Harness::new(ProverSettings::default());
    h.elimination.push(EliminationMode::Eliminate, "[[v5]]");

    let outcome = h.prover.prove(&cons, s);
    assert_eq!(outcome.result, ProofResult::True);
    assert_eq!(ndg_names(&outcome), vec!["AreCollinear(A,B,C)"]);
}

#[test]
fn equal_lengths_are_rendered_as_an_equation() {
    let mut cons = Construction::new();
    let [a, b, c] = triangle(&mut cons);
    let f = cons.segment("segment1", a, b).unwrap();
    let g = cons.segment("segment2", a, c).unwrap();

    let h = Harness::with_realgeom(ProverSettings::default(), "mathematica");
    let realgeom = h.realgeom.clone().unwrap();
    realgeom.push("m==1");

    assert_eq!(h.prover.compare(&cons, f, g), "segment1 = segment2");
    // The direct elimination was tried first and gave no answer.
    assert_eq!(h.cas.requests().len(), 1);
    assert_eq!(realgeom.requests().len(), 1);
}

#[test]
fn outcomes_are_memoized_until_redefinition() {
    let mut cons = Construction::new();
    let [a, b, c] = triangle(&mut cons);
    let m = cons.midpoint("M", a, b).unwrap();
    let n = cons.midpoint("N", b, a).unwrap();
    let s = cons.statement("s", StepKind::AreEqual { a: m, b: n }).unwrap();

    let h = Harness::new(ProverSettings::default());
    h.elimination.push(EliminationMode::Eliminate, "[[1]]");
    assert_eq!(h.prover.prove(&cons, s).result, ProofResult::True);
    assert_eq!(h.prover.prove(&cons, s).result, ProofResult::True);
    assert_eq!(h.elimination.calls(), 1);

    let stale = cons
        .redefine(n, Some(StepKind::Midpoint { a, b: c }))
        .unwrap();
    h.prover.invalidate(&stale);
    h.elimination.push(EliminationMode::Eliminate, "[[0]]");
    h.elimination.push(EliminationMode::Eliminate, "[[v5]]");
    assert_eq!(h.prover.prove(&cons, s).result, ProofResult::False);
    assert_eq!(h.elimination.calls(), 3);
}

#[test]
fn yes_no_questions_use_solvability() {
    let mut cons = Construction::new();
    let [a, b, c] = triangle(&mut cons);
    let s = cons
        .statement("s", StepKind::AreCollinear { a, b, c })
        .unwrap();

    let h = Harness::new(ProverSettings::default());
    h.elimination.push(EliminationMode::Solvable, "true");
    h.elimination.push(EliminationMode::Solvable, "false");
    assert_eq!(h.prover.prove_yes_no(&cons, s), Some(false));
    assert!(h.elimination.requests().iter().all(|r| r.mode.is_solvable()));

    // Details are asked for separately.
    h.elimination.push(EliminationMode::Eliminate, "[[1]]");
    let outcome = h.prover.prove_with(&cons, s, ProofMode::Details, None);
    assert_eq!(outcome.result, ProofResult::True);
}

#[test]
fn unloaded_cas_means_processing() {
    let mut cons = Construction::new();
    let [a, b, c] = triangle(&mut cons);
    let s = cons
        .statement("s", StepKind::AreCollinear { a, b, c })
        .unwrap();

    let h = Harness::new(ProverSettings::default());
    h.cas.set_loaded(false);
    assert_eq!(h.prover.prove(&cons, s).result, ProofResult::Processing);
    assert_eq!(h.elimination.calls(), 0);

    // Processing is not remembered.
    h.cas.set_loaded(true);
    h.elimination.push(EliminationMode::Eliminate, "[[1]]");
    assert_eq!(h.prover.prove(&cons, s).result, ProofResult::True);
}

#[test]
fn non_statements_are_unknown() {
    let mut cons = Construction::new();
    let [a, b, _] = triangle(&mut cons);
    let m = cons.midpoint("M", a, b).unwrap();
    let x = cons.add("x", ObjectKind::Numeric, None).unwrap();

    let h = Harness::new(ProverSettings::default());
    assert_eq!(h.prover.prove(&cons, m).result, ProofResult::Unknown);
    assert_eq!(h.prover.prove(&cons, x).result, ProofResult::Unknown);
    assert_eq!(h.elimination.calls(), 0);
}
