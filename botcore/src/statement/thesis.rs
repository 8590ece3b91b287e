//! Thesis of a statement and its refutation form.
//!
//! The thesis is a list of branches. Every branch is a conjunction whose last
//! polynomial is the one to be negated; the other polynomials are plain
//! hypotheses. The statement holds when every branch holds, so its negation
//! is the product of the Rabinowitsch forms `f*z-1` of the last polynomials,
//! all sharing one fresh `z`.
use std::collections::{BTreeMap, BTreeSet};

use botpoly::{Polynomial, geometry};
use log::{debug, info};

use crate::{
    base::ProverContext,
    construction::{
        ConstructionGraph, ObjectId, ObjectKind, StepKind,
        encoder::{EncodingScope, conic_copy, conic_point_helpers},
    },
    provers::ProofResult,
    statement::{
        AlgebraicStatement, Owner, StatementFlags,
        expression::{Comparison, Expr, parse_comparison},
    },
    utils::error::BotResult,
};

/// Build the thesis of `st.statement`, register its non-negated parts and
/// its negation.
///
/// Statements without a polynomial thesis end with `st.result` set, or with
/// a textual thesis inequality for the real geometry path.
pub(crate) fn set_thesis(
    st: &mut AlgebraicStatement,
    ctx: &ProverContext,
    graph: &dyn ConstructionGraph,
) -> BotResult<()> {
    let scope = ctx.scope(graph);
    let statement = st.statement;

    let branches = match graph.step(statement) {
        None => match graph.boolean_value(statement) {
            Some(true) => vec![vec![Polynomial::zero()]],
            Some(false) => vec![vec![Polynomial::one()]],
            None => {
                info!("{} is not a statement", graph.label(statement));
                st.result = Some(ProofResult::Unknown);
                return Ok(());
            }
        },
        Some(StepKind::AreCollinear { a, b, c }) => {
            let (a, b, c) = (scope.point(*a)?, scope.point(*b)?, scope.point(*c)?);
            vec![vec![geometry::collinear(a, b, c)]]
        }
        Some(StepKind::AreParallel { a, b }) => {
            let ([a1, a2], [b1, b2]) = (scope.line(*a)?, scope.line(*b)?);
            vec![vec![geometry::parallel(a1, a2, b1, b2)]]
        }
        Some(StepKind::ArePerpendicular { a, b }) => {
            let ([a1, a2], [b1, b2]) = (scope.line(*a)?, scope.line(*b)?);
            vec![vec![geometry::perpendicular(a1, a2, b1, b2)]]
        }
        Some(StepKind::AreEqual { a, b }) => equal_objects(st, &scope, *a, *b)?,
        Some(StepKind::AreCongruent { a, b }) => match (scope.kind(*a)?, scope.kind(*b)?) {
            (ObjectKind::Segment, ObjectKind::Segment) => {
                let ([a1, a2], [b1, b2]) = (scope.line(*a)?, scope.line(*b)?);
                vec![vec![
                    geometry::sqr_distance(a1, a2) - geometry::sqr_distance(b1, b2),
                ]]
            }
            (ObjectKind::Angle, ObjectKind::Angle) => {
                st.flags |= StatementFlags::INTERPRET_TRUE_AS_UNDEFINED;
                vec![vec![equal_angles(&scope, *a, *b)?]]
            }
            _ => return Err(scope.unsupported(statement)),
        },
        Some(StepKind::AreConcyclic { a, b, c, d }) => {
            let points = [
                scope.point(*a)?,
                scope.point(*b)?,
                scope.point(*c)?,
                scope.point(*d)?,
            ];
            vec![vec![geometry::concyclic(
                points[0], points[1], points[2], points[3],
            )]]
        }
        Some(StepKind::IsOnPath { point, path }) => {
            let p = scope.point(*point)?;
            match scope.kind(*path)? {
                kind if kind.is_linear() => {
                    let [a, b] = scope.line(*path)?;
                    vec![vec![geometry::collinear(p, a, b)]]
                }
                ObjectKind::Circle => {
                    let [c, q] = scope.circle(*path)?;
                    vec![vec![geometry::equidistant(p, c, q)]]
                }
                kind @ (ObjectKind::Parabola | ObjectKind::Ellipse | ObjectKind::Hyperbola) => {
                    if !kind.is_parabola() {
                        st.flags |= StatementFlags::INTERPRET_TRUE_AS_UNDEFINED;
                    }
                    let conic = scope.encoding(*path)?;
                    vec![conic_copy(&conic, p, conic_point_helpers(kind), scope.pool)]
                }
                _ => return Err(scope.unsupported(statement)),
            }
        }
        Some(StepKind::Expression { text, inputs }) => {
            match expression_thesis(st, &scope, text, inputs)? {
                Some(branches) => branches,
                None => return Ok(()),
            }
        }
        Some(step) => {
            info!(
                "{} ({}) is not a supported statement",
                graph.label(statement),
                step.name()
            );
            st.result = Some(ProofResult::Unknown);
            return Ok(());
        }
    };

    if st.flags.contains(StatementFlags::DISALLOW_FIX_SECOND_POINT) {
        st.limit_fixcoords(2);
    }
    negate(st, ctx, branches);
    Ok(())
}

/// Register the thesis branches and their negation.
fn negate(st: &mut AlgebraicStatement, ctx: &ProverContext, branches: Vec<Vec<Polynomial>>) {
    let z = ctx.pool.fresh();
    let mut factors = Vec::with_capacity(branches.len());
    for branch in &branches {
        let Some((last, rest)) = branch.split_last() else {
            continue;
        };
        for poly in rest {
            st.add_polynomial(Owner::Condition, poly.clone());
        }
        factors.push(last.clone());
    }
    let negated: Polynomial = factors
        .iter()
        .map(|f| geometry::rabinowitsch(f, z))
        .product();
    debug!("Thesis reductio ad absurdum (denied statement), product of factors: {}", negated);

    st.thesis_branches = branches;
    st.thesis_factors = factors;
    st.negated_thesis = Some(negated);
    st.add_negated_thesis();
}

fn equal_objects(
    st: &mut AlgebraicStatement,
    scope: &EncodingScope<'_>,
    a: ObjectId,
    b: ObjectId,
) -> BotResult<Vec<Vec<Polynomial>>> {
    let var = Polynomial::var;
    Ok(match (scope.kind(a)?, scope.kind(b)?) {
        (ObjectKind::Point, ObjectKind::Point) => {
            let (p, q) = (scope.point(a)?, scope.point(b)?);
            vec![vec![var(p[0]) - var(q[0])], vec![var(p[1]) - var(q[1])]]
        }
        (ka, kb) if ka.is_linear() && kb.is_linear() => {
            let ([a1, a2], [b1, b2]) = (scope.line(a)?, scope.line(b)?);
            vec![
                vec![geometry::collinear(b1, a1, a2)],
                vec![geometry::collinear(b2, a1, a2)],
            ]
        }
        (ObjectKind::Circle, ObjectKind::Circle) => {
            let ([c1, p1], [c2, p2]) = (scope.circle(a)?, scope.circle(b)?);
            vec![
                vec![var(c1[0]) - var(c2[0])],
                vec![var(c1[1]) - var(c2[1])],
                vec![geometry::sqr_distance(c1, p1) - geometry::sqr_distance(c2, p2)],
            ]
        }
        (ObjectKind::Numeric, ObjectKind::Numeric) => {
            let (x, y) = (number(st, scope, a)?, number(st, scope, b)?);
            vec![vec![x - y]]
        }
        (ObjectKind::Angle, ObjectKind::Angle) => {
            st.flags |= StatementFlags::INTERPRET_TRUE_AS_UNDEFINED;
            vec![vec![equal_angles(scope, a, b)?]]
        }
        _ => return Err(scope.unsupported(st.statement)),
    })
}

/// Value of a number; free numbers are free parameters of the thesis.
fn number(
    st: &mut AlgebraicStatement,
    scope: &EncodingScope<'_>,
    id: ObjectId,
) -> BotResult<Polynomial> {
    let encoding = scope.encoding(id)?;
    let v = *encoding.variables.first().ok_or_else(|| scope.unsupported(id))?;
    if scope.graph.step(id).is_none() {
        st.declare_free(v);
    }
    Ok(Polynomial::var(v))
}

/// Equal tangents of the angles `a` and `b`: with `u`, `v` the legs of an
/// angle, `cross(u1,v1)*dot(u2,v2) - cross(u2,v2)*dot(u1,v1)`.
fn equal_angles(scope: &EncodingScope<'_>, a: ObjectId, b: ObjectId) -> BotResult<Polynomial> {
    let legs = |id: ObjectId| -> BotResult<(Polynomial, Polynomial)> {
        let encoding = scope.encoding(id)?;
        let point = |i: usize| encoding.coords(i).ok_or_else(|| scope.unsupported(id));
        let (p, vertex, q) = (point(0)?, point(1)?, point(2)?);
        let var = Polynomial::var;
        let u = [var(p[0]) - var(vertex[0]), var(p[1]) - var(vertex[1])];
        let v = [var(q[0]) - var(vertex[0]), var(q[1]) - var(vertex[1])];
        let cross = &(&u[0] * &v[1]) - &(&u[1] * &v[0]);
        let dot = &(&u[0] * &v[0]) + &(&u[1] * &v[1]);
        Ok((cross, dot))
    };
    let ((c1, d1), (c2, d2)) = (legs(a)?, legs(b)?);
    Ok(&(&c1 * &d2) - &(&c2 * &d1))
}

/// What a label of an expression stands for.
enum Binding {
    /// Segment with the length variable and its defining polynomial.
    Length(Polynomial, Polynomial),
    Number(Polynomial, Option<i64>),
}

/// Thesis of an expression statement. `None` when the statement is decided
/// without elimination or goes to the real geometry path.
fn expression_thesis(
    st: &mut AlgebraicStatement,
    scope: &EncodingScope<'_>,
    text: &str,
    inputs: &[ObjectId],
) -> BotResult<Option<Vec<Vec<Polynomial>>>> {
    let comparison = match parse_comparison(text) {
        Ok(comparison) => comparison,
        Err(e) => {
            info!("Unsupported expression `{}`: {}", text, e);
            st.result = Some(ProofResult::Unknown);
            return Ok(None);
        }
    };
    st.limit_fixcoords(2);

    let labelled: BTreeMap<String, ObjectId> = inputs
        .iter()
        .map(|id| (scope.graph.label(*id), *id))
        .collect();

    if let (Expr::Ident(l), Expr::Ident(r)) = (&comparison.lhs, &comparison.rhs) {
        let angles = [l, r].map(|name| {
            labelled
                .get(name.as_str())
                .filter(|id| scope.graph.kind(**id) == Some(ObjectKind::Angle))
                .copied()
        });
        if let ([Some(a), Some(b)], true) = (angles, comparison.relation.is_equal()) {
            st.flags |= StatementFlags::INTERPRET_TRUE_AS_UNDEFINED;
            return Ok(Some(vec![vec![equal_angles(scope, a, b)?]]));
        }
    }

    let mut bindings = BTreeMap::new();
    for name in comparison.identifiers() {
        let id = *labelled
            .get(&name)
            .ok_or_else(|| scope.unsupported(st.statement))?;
        let binding = match scope.kind(id)? {
            ObjectKind::Segment => {
                let [a, b] = scope.line(id)?;
                let w = Polynomial::var(scope.pool.fresh());
                let definition = geometry::sqr_distance(a, b) - w.pow(2);
                Binding::Length(w, definition)
            }
            ObjectKind::Numeric => {
                let weight = match scope.graph.step(id) {
                    Some(StepKind::Distance { .. }) => Some(1),
                    _ => None,
                };
                Binding::Number(number(st, scope, id)?, weight)
            }
            _ => return Err(scope.unsupported(id)),
        };
        bindings.insert(name, binding);
    }
    let resolve = |name: &str| -> Option<Polynomial> {
        match bindings.get(name)? {
            Binding::Length(w, _) | Binding::Number(w, _) => Some(w.clone()),
        }
    };

    if comparison.relation.is_order() || comparison.has_sqrt() || !st.inequalities.is_empty() {
        for binding in bindings.values() {
            if let Binding::Length(w, definition) = binding {
                let name = w.to_string();
                if !st.extra_variables.contains(&name) {
                    st.extra_variables.push(name);
                }
                st.add_external_polynomial(definition.to_string());
            }
        }
        set_thesis_inequality(st, scope, &comparison, &resolve);
        return Ok(None);
    }

    let weight = |name: &str| match bindings.get(name)? {
        Binding::Length(..) => Some(1),
        Binding::Number(_, degree) => *degree,
    };
    if !comparison.is_homogeneous(&weight) {
        info!("`{}` is not homogeneous", text);
        st.result = Some(ProofResult::False);
        return Ok(None);
    }
    for binding in bindings.values() {
        if let Binding::Length(_, definition) = binding {
            st.add_polynomial(Owner::Condition, definition.clone());
        }
    }
    let Some(difference) = comparison.difference(&resolve, &BTreeMap::new()) else {
        st.result = Some(ProofResult::Unknown);
        return Ok(None);
    };
    Ok(Some(vec![vec![difference.numerator]]))
}

/// Textual thesis of an order relation; square roots of integers become
/// positive variables.
fn set_thesis_inequality(
    st: &mut AlgebraicStatement,
    scope: &EncodingScope<'_>,
    comparison: &Comparison,
    resolve: &dyn Fn(&str) -> Option<Polynomial>,
) {
    let mut radicands = BTreeSet::new();
    let supported = comparison
        .lhs
        .radicands(&mut radicands)
        .and_then(|_| comparison.rhs.radicands(&mut radicands));
    if supported.is_none() {
        info!("Only square roots of integers are supported");
        st.result = Some(ProofResult::Unknown);
        return;
    }
    let mut roots = BTreeMap::new();
    for n in radicands {
        let root = scope.pool.fresh();
        st.add_positive_variable(root.to_string());
        st.add_inequality(format!("{}^2={}", root, n));
        roots.insert(n, Polynomial::var(root));
    }
    match comparison.difference(resolve, &roots) {
        Some(difference) => {
            let thesis = format!("{}{}0", difference.sign_polynomial(), comparison.relation);
            debug!("Thesis inequality: {}", thesis);
            st.thesis_inequality = Some(thesis);
        }
        None => st.result = Some(ProofResult::Unknown),
    }
}
