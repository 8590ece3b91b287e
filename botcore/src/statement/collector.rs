//! Hypotheses of a statement, collected from its predecessors.
//!
//! Predecessors are visited in construction order. Each one is either encoded
//! symbolically (through the encoding cache), skipped (free numbers, the
//! numerical path of a moving point) or rejected, in which case the whole
//! proof attempt is unsupported.
//!
//! A *moving point* lies on a path known only through its closed-form
//! equation. That path is the *numerical object*: instead of its
//! construction, the equation evaluated by the algebra system is registered
//! as a hypothesis on the moving point.
use std::collections::{BTreeSet, VecDeque};

use botpoly::{Polynomial, parser::parse_polynomial_with};
use log::{debug, info};

use crate::{
    backend::CasEvaluator,
    base::ProverContext,
    construction::{ConstructionGraph, ObjectId, ObjectKind, StepKind},
    magic::CAS_FAILURE,
    statement::{
        AlgebraicStatement, LabelledPoint, Owner, StatementFlags,
        nondegeneracy::{InjectionSite, injector_for},
    },
    utils::error::{BotError, BotResult},
};

/// Collect the hypotheses of `st.statement` into `st`.
pub(crate) fn collect(
    st: &mut AlgebraicStatement,
    ctx: &ProverContext,
    graph: &dyn ConstructionGraph,
    moving_point: Option<ObjectId>,
) -> BotResult<()> {
    let statement = st.statement;
    let scope = ctx.scope(graph);

    let mut predecessors = graph.predecessors(statement);
    predecessors.sort();

    let numerical = moving_point.and_then(|p| numerical_object(graph, p));
    if let Some(n) = numerical {
        let kept = kept_elements(graph, n, statement);
        predecessors.retain(|p| kept.contains(p));
        debug!(
            "Numerical object {}, keeping {} predecessors",
            graph.label(n),
            predecessors.len()
        );
    }

    collect_objects(st, ctx, graph, &predecessors, numerical)?;

    if let (Some(n), Some(p)) = (numerical, moving_point) {
        let coords = scope.point(p)?;
        let formula = graph.formula(n).ok_or_else(|| scope.unsupported(n))?;
        let poly = numerical_polynomial(ctx.backends.cas.as_ref(), &formula, |name| match name {
            "x" => Some(Polynomial::var(coords[0])),
            "y" => Some(Polynomial::var(coords[1])),
            _ => None,
        })?;
        info!("Numerical object {} described by {}", graph.label(n), poly);
        st.add_polynomial(Owner::Object(p), poly);
    }
    Ok(())
}

/// Register the hypotheses of `objects`, in the given order.
///
/// `numerical` is the path of the moving point, if any: it is not encoded,
/// and the point's own construction is superseded by the path's equation.
pub(crate) fn collect_objects(
    st: &mut AlgebraicStatement,
    ctx: &ProverContext,
    graph: &dyn ConstructionGraph,
    objects: &[ObjectId],
    numerical: Option<ObjectId>,
) -> BotResult<()> {
    let scope = ctx.scope(graph);
    for &id in objects {
        if Some(id) == numerical {
            continue;
        }
        let kind = scope.kind(id)?;
        let step = graph.step(id);
        if kind.is_numeric() && matches!(step, None | Some(StepKind::DependentNumber { .. })) {
            debug!("Skipping number {}", graph.label(id));
            continue;
        }
        if let Some(StepKind::FixedSlopeLine) = step {
            info!("Unsupported construction: {} has a fixed slope", graph.label(id));
            return Err(scope.unsupported(id));
        }
        let Some(encoding) = scope.try_encoding(id)? else {
            info!("Unsupported construction: {}", graph.describe(id));
            return Err(scope.unsupported(id));
        };

        match step {
            Some(StepKind::PointOnPath { .. }) => declare_first_almost_free(st, &encoding.variables),
            _ if kind.is_numeric() => declare_first_almost_free(st, &encoding.variables),
            Some(StepKind::DynamicCoordinates { .. }) | None => {
                for v in &encoding.variables {
                    st.declare_free(*v);
                }
            }
            _ => {}
        }

        if let Some(StepKind::CirclePointRadius { .. }) = step {
            st.flags |= StatementFlags::DISALLOW_FIX_SECOND_POINT;
        }
        if let Some(StepKind::PointOnPath { path }) = step {
            if scope.kind(*path)?.is_linear() {
                st.limit_fixcoords(2);
            }
        }

        if let Some(step) = step {
            if let Some(inject) = injector_for(step) {
                let site = InjectionSite {
                    object: id,
                    step,
                    encoding: &encoding,
                    scope: &scope,
                    cas: ctx.backends.cas.as_ref(),
                };
                inject(st, &site)?;
            }
        }

        let superseded = match step {
            // The equation of the path replaces the construction of the point.
            Some(StepKind::PointOnPath { path }) => Some(*path) == numerical,
            Some(
                StepKind::ParabolaPointLine { .. }
                | StepKind::EllipseFociPoint { .. }
                | StepKind::HyperbolaFociPoint { .. },
            ) => numerical.is_none(),
            _ => false,
        };
        if superseded {
            debug!("Not using the polynomials of {}", graph.label(id));
        } else {
            for poly in &encoding.polynomials {
                st.add_polynomial(Owner::Object(id), poly.clone());
            }
        }

        if kind.is_point() {
            if let Some(coords) = encoding.coords(0) {
                let point = LabelledPoint {
                    id,
                    label: graph.label(id),
                    coords,
                };
                if step.is_none() {
                    st.free_points.push(point.clone());
                }
                st.points.push(point);
            }
        }
    }
    Ok(())
}

fn declare_first_almost_free(st: &mut AlgebraicStatement, variables: &[botpoly::Variable]) {
    if let Some(first) = variables.first() {
        st.declare_free(*first);
        st.declare_almost_free(*first);
    }
}

/// Path of the moving point, if it can be described numerically.
fn numerical_object(graph: &dyn ConstructionGraph, moving_point: ObjectId) -> Option<ObjectId> {
    let path = *graph.inputs(moving_point).first()?;
    if matches!(
        graph.kind(path)?,
        ObjectKind::Segment | ObjectKind::ConicPart
    ) {
        return None;
    }
    let only_points_on_it = graph
        .dependents(path)
        .into_iter()
        .all(|d| matches!(graph.step(d), Some(StepKind::PointOnPath { .. })));
    only_points_on_it.then_some(path)
}

/// Objects reachable from `statement` without going through `numerical`.
fn kept_elements(
    graph: &dyn ConstructionGraph,
    numerical: ObjectId,
    statement: ObjectId,
) -> BTreeSet<ObjectId> {
    let mut kept = BTreeSet::from([statement]);
    let mut queue = VecDeque::from([statement]);
    while let Some(current) = queue.pop_front() {
        if current == numerical {
            continue;
        }
        for input in graph.inputs(current) {
            if kept.insert(input) {
                queue.push_back(input);
            }
        }
    }
    kept
}

/// Polynomial form of the closed-form equation `formula`, with integer
/// coefficients, in the identifiers bound by `resolve`.
pub(crate) fn numerical_polynomial<R>(
    cas: &dyn CasEvaluator,
    formula: &str,
    resolve: R,
) -> BotResult<Polynomial>
where
    R: Fn(&str) -> Option<Polynomial> + Clone,
{
    let evaluate = |input: String| -> BotResult<String> {
        let output = cas.evaluate(&input)?;
        if output.contains(CAS_FAILURE) || output.trim().is_empty() {
            return Err(BotError::Unparseable {
                backend: "cas".to_string(),
                answer: format!("{} => {}", input, output),
            });
        }
        Ok(output)
    };
    let equation = evaluate(formula.to_string())?;
    let difference = evaluate(format!("lhs({0})-rhs({0})", equation))?;
    let lcm = evaluate(format!("lcm(denom(coeff({})))", difference))?;
    let expanded = evaluate(format!("expand(({})*{})", difference, lcm))?;
    Ok(parse_polynomial_with(&expanded, resolve)?)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        backend::{
            Backends,
            scripted::{ScriptedCas, ScriptedElimination},
        },
        base::settings::ProverSettings,
        construction::graph::Construction,
    };

    fn context(cas: Arc<ScriptedCas>) -> ProverContext {
        ProverContext::new(
            ProverSettings::default(),
            Backends::new(cas, Arc::new(ScriptedElimination::new())),
        )
    }

    #[test]
    fn midpoint_hypotheses() {
        let mut cons = Construction::new();
        let a = cons.free_point("A");
        let b = cons.free_point("B");
        let m = cons.midpoint("M", a, b).unwrap();
        let s = cons.statement("s", StepKind::AreEqual { a: m, b: a }).unwrap();

        let ctx = context(Arc::new(ScriptedCas::new()));
        let mut st = AlgebraicStatement::new(s);
        collect(&mut st, &ctx, &cons, None).unwrap();

        assert_eq!(st.polynomial_count(), 2);
        assert_eq!(st.free_variables().len(), 4);
        assert_eq!(st.dependent_with_almost_free().len(), 2);
        let labels: Vec<_> = st.free_points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B"]);
        assert_eq!(st.points.len(), 3);
    }

    #[test]
    fn points_on_lines_limit_the_fixation() {
        let mut cons = Construction::new();
        let a = cons.free_point("A");
        let b = cons.free_point("B");
        let l = cons.line("f", a, b).unwrap();
        let p = cons.point_on("P", l).unwrap();
        let s = cons
            .statement("s", StepKind::AreCollinear { a, b, c: p })
            .unwrap();

        let ctx = context(Arc::new(ScriptedCas::new()));
        let mut st = AlgebraicStatement::new(s);
        collect(&mut st, &ctx, &cons, None).unwrap();
        assert_eq!(st.max_fixcoords, Some(2));
        assert_eq!(st.almost_free_variables().len(), 1);
    }

    #[test]
    fn fixed_slope_lines_are_unsupported() {
        let mut cons = Construction::new();
        let axis = cons
            .add("xAxis", ObjectKind::Line, Some(StepKind::FixedSlopeLine))
            .unwrap();
        let p = cons.point_on("P", axis).unwrap();
        let a = cons.free_point("A");
        let s = cons
            .statement("s", StepKind::AreEqual { a: p, b: a })
            .unwrap();

        let ctx = context(Arc::new(ScriptedCas::new()));
        let mut st = AlgebraicStatement::new(s);
        let err = collect(&mut st, &ctx, &cons, None).unwrap_err();
        assert!(err.is_unsupported_construction());
    }

    #[test]
    fn moving_point_on_a_curve() {
        let mut cons = Construction::new();
        let c = cons.curve("c", "x^2+y^2=4");
        let p = cons.point_on("P", c).unwrap();
        let a = cons.free_point("A");
        let b = cons.free_point("B");
        let s = cons
            .statement("s", StepKind::AreCollinear { a, b, c: p })
            .unwrap();

        let cas = Arc::new(ScriptedCas::new());
        cas.push("x^2+y^2=4");
        cas.push("x^2+y^2-4");
        cas.push("1");
        cas.push("x^2+y^2-4");
        let ctx = context(cas.clone());
        let mut st = AlgebraicStatement::new(s);
        collect(&mut st, &ctx, &cons, Some(p)).unwrap();

        assert_eq!(
            cas.requests(),
            vec![
                "x^2+y^2=4",
                "lhs(x^2+y^2=4)-rhs(x^2+y^2=4)",
                "lcm(denom(coeff(x^2+y^2-4)))",
                "expand((x^2+y^2-4)*1)",
            ]
        );
        let coords = ctx.scope(&cons).point(p).unwrap();
        let expected = Polynomial::var(coords[0]).pow(2) + Polynomial::var(coords[1]).pow(2)
            - Polynomial::constant(4);
        assert_eq!(st.owned(Owner::Object(p)).collect::<Vec<_>>(), vec![&expected]);
        assert!(st.class(coords[0]).is_almost_free());
        assert!(st.class(coords[1]).is_dependent());
    }

    #[test]
    fn failed_evaluation_is_an_error() {
        let mut cons = Construction::new();
        let c = cons.curve("c", "x^3=y");
        let p = cons.point_on("P", c).unwrap();
        let a = cons.free_point("A");
        let s = cons.statement("s", StepKind::AreEqual { a, b: p }).unwrap();

        let ctx = context(Arc::new(ScriptedCas::new()));
        let mut st = AlgebraicStatement::new(s);
        assert!(collect(&mut st, &ctx, &cons, Some(p)).unwrap_err().is_unparseable());
    }
}
