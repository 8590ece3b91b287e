//! Relation between two lengths.
//!
//! Both inputs (segments, distances, or numbers defined over segments) are
//! bound to positive variables `L` and `R`. The ratio `m = L/R` is first
//! solved for directly by elimination in the algebra system; when that gives
//! no single value the real geometry service explores the possible ratios.
//! Answers are rendered as relations between the input labels, such as
//! `f = (√2) · g` or `(1/2) · g < f ≤ g`.
use std::collections::{BTreeMap, BTreeSet, HashMap};

use botpoly::{Polynomial, Variable, fmt::join, geometry};
use chumsky::prelude::*;
use either::Either;
use log::{debug, info};
use parking_lot::Mutex;

use crate::{
    backend::{params::RealGeomParameters, strip_sentinels},
    base::ProverContext,
    construction::{ConstructionGraph, ObjectId, ObjectKind, StepKind, encoder::EncodingScope},
    magic::{CAS_FAILURE, COMPARE_FIX_COORDINATES, REALGEOM_COMMAND},
    statement::{
        AlgebraicStatement, Owner, collector,
        expression::{Degree, parse_expression},
        nondegeneracy,
    },
    utils::error::BotResult,
};

type Extra<'src> = extra::Err<Rich<'src, char>>;

/// Answers are memoized on the fingerprints of both inputs.
#[derive(Default)]
pub struct Compare {
    memo: Mutex<HashMap<String, String>>,
}

/// One input, bound to a positive variable.
#[derive(Debug, Clone)]
struct Side {
    var: Variable,
    label: String,
    /// Degree in lengths.
    degree: i64,
}

/// Range of the ratio `m = L/R` in one case of an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Bound {
    Equal(String),
    Above(String, bool),
    Below(String, bool),
    Between {
        low: String,
        low_inclusive: bool,
        high: String,
        high_inclusive: bool,
    },
}

/// Syntax of the real geometry answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    /// `m == 1 || Inequality[0, Less, m, LessEqual, 2]`
    Mathematica,
    /// `m=1,((m>0) and (m<=2))`
    Qepcad,
}

impl Compare {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relation between `lhs` and `rhs`; empty when nothing could be said.
    pub fn compare(
        &self,
        ctx: &ProverContext,
        graph: &dyn ConstructionGraph,
        lhs: ObjectId,
        rhs: ObjectId,
    ) -> String {
        let key = format!("{}\n--\n{}", graph.fingerprint(lhs), graph.fingerprint(rhs));
        if let Some(known) = self.memo.lock().get(&key) {
            debug!("Reusing comparison of {} and {}", graph.label(lhs), graph.label(rhs));
            return known.clone();
        }
        match attempt(ctx, graph, lhs, rhs) {
            Ok(answer) => {
                info!(
                    "Comparing {} and {}: `{}`",
                    graph.label(lhs),
                    graph.label(rhs),
                    answer
                );
                self.memo.lock().insert(key, answer.clone());
                answer
            }
            Err(e) => {
                info!("Cannot compare {} and {}: {}", graph.label(lhs), graph.label(rhs), e);
                String::new()
            }
        }
    }
}

fn attempt(
    ctx: &ProverContext,
    graph: &dyn ConstructionGraph,
    lhs: ObjectId,
    rhs: ObjectId,
) -> BotResult<String> {
    let mut objects: BTreeSet<ObjectId> = graph
        .predecessors(lhs)
        .into_iter()
        .chain(graph.predecessors(rhs))
        .collect();
    objects.extend([lhs, rhs]);
    let objects: Vec<ObjectId> = objects.into_iter().collect();

    let mut st = AlgebraicStatement::new(lhs);
    collector::collect_objects(&mut st, ctx, graph, &objects, None)?;

    let scope = ctx.scope(graph);
    let mut lengths = BTreeMap::new();
    let (Some(left), Some(right)) = (
        side(&mut st, &scope, &mut lengths, lhs)?,
        side(&mut st, &scope, &mut lengths, rhs)?,
    ) else {
        return Ok(String::new());
    };

    let lcm = num_integer::lcm(left.degree, right.degree);
    let [left, right] = [left, right].map(|s| {
        let exponent = lcm / s.degree;
        raise(&mut st, &scope, s, exponent)
    });

    nondegeneracy::free_points_never_collinear(&mut st, &ctx.pool);
    let free = st.free_without_almost_free();
    let present = st.variables();
    let vars: Vec<String> = free
        .iter()
        .chain(present.difference(&free))
        .map(ToString::to_string)
        .collect();
    let polys = join(st.polynomials(), ",");

    let mut fallback = String::new();
    if ctx.settings.realgeom.use_giac_elimination {
        let substitutions = free
            .iter()
            .zip(COMPARE_FIX_COORDINATES)
            .map(|(v, c)| format!("{}={}", v, c))
            .collect::<Vec<_>>()
            .join(",");
        let program = format!(
            "[assume(m>0),solve(eliminate(subst([{polys},{r}*m-({l}),({r})*n-1],[{subs}]),[{vars},n])[0],m)][1]",
            polys = polys,
            l = left.var,
            r = right.var,
            subs = substitutions,
            vars = vars.join(","),
        );
        debug!("Direct elimination: {}", program);
        match ctx.backends.cas.evaluate(&program) {
            Ok(answer) => {
                let answer = answer.trim();
                if !answer.is_empty() && answer != CAS_FAILURE && answer != "{}" {
                    let values: Vec<String> = answer
                        .trim_start_matches('{')
                        .trim_end_matches('}')
                        .split(',')
                        .map(|v| v.replace("m=", ""))
                        .collect();
                    let cases: Vec<Bound> = values.into_iter().map(Bound::Equal).collect();
                    fallback = render_cases(&cases, &left.label, &right.label);
                    if cases.len() == 1 {
                        return Ok(fallback);
                    }
                    debug!("{} ratios, asking the real geometry service", cases.len());
                }
            }
            Err(e) => debug!("Direct elimination failed: {}", e),
        }
    }

    let Some(service) = ctx.backends.available_realgeom() else {
        debug!("No real geometry service to explore with");
        return Ok(fallback);
    };
    let cas = service.cas();
    let positive: Vec<&str> = st
        .extra_variables
        .iter()
        .chain(&st.positive_variables)
        .map(String::as_str)
        .collect();
    let mut params = RealGeomParameters::new();
    params
        .push("lhs", left.var)
        .push("rhs", right.var)
        .push("polys", polys)
        .push("vars", vars.join(","))
        .push("posvariables", positive.join(","))
        .push("mode", "explore")
        .push("cas", &cas);
    debug!("Exploring: {}", params);

    let answer = match service.direct_command(REALGEOM_COMMAND, &params.render()) {
        Ok(answer) => answer,
        Err(e) => {
            debug!("Exploration failed: {}", e);
            return Ok(fallback);
        }
    };
    let answer = strip_sentinels(&answer).trim();
    let dialect = match cas.as_str() {
        "mathematica" => Dialect::Mathematica,
        "qepcad" | "tarski" => Dialect::Qepcad,
        _ => return Ok(fallback),
    };
    if answer.is_empty() || (dialect == Dialect::Qepcad && answer == "[]") {
        return Ok(fallback);
    }
    Ok(render(dialect, answer, &left.label, &right.label))
}

/// Bind `id` to a variable. `None` when it is not a length.
fn side(
    st: &mut AlgebraicStatement,
    scope: &EncodingScope<'_>,
    lengths: &mut BTreeMap<ObjectId, Variable>,
    id: ObjectId,
) -> BotResult<Option<Side>> {
    let graph = scope.graph;
    let label = graph.label(id);
    match (scope.kind(id)?, graph.step(id)) {
        (ObjectKind::Segment, _) => Ok(Some(Side {
            var: length(st, scope, lengths, id)?,
            label,
            degree: 1,
        })),
        (ObjectKind::Numeric, Some(StepKind::Distance { .. })) => {
            let encoding = scope.encoding(id)?;
            let Some(&var) = encoding.variables.first() else {
                return Ok(None);
            };
            push_extra(st, var);
            Ok(Some(Side {
                var,
                label,
                degree: 1,
            }))
        }
        (ObjectKind::Numeric, Some(StepKind::DependentNumber { inputs })) => {
            let mut names = BTreeMap::new();
            for input in inputs {
                if scope.kind(*input)? != ObjectKind::Segment {
                    debug!("{} depends on {}, which is not a segment", label, graph.label(*input));
                    return Ok(None);
                }
                names.insert(graph.label(*input), length(st, scope, lengths, *input)?);
            }
            let Some(text) = graph.formula(id) else {
                return Ok(None);
            };
            let expr = match parse_expression(&text) {
                Ok(expr) => expr,
                Err(e) => {
                    debug!("Cannot read `{}`: {}", text, e);
                    return Ok(None);
                }
            };
            let degree = match expr.degree(&|name| names.contains_key(name).then_some(1)) {
                Degree::Halves(h) if h > 0 && h % 2 == 0 => h / 2,
                degree => {
                    debug!("`{}` has degree {:?}", text, degree);
                    return Ok(None);
                }
            };
            let resolve = |name: &str| names.get(name).map(|v| Polynomial::var(*v));
            let Some(value) = expr.evaluate(&resolve, &BTreeMap::new()) else {
                return Ok(None);
            };
            let w = scope.pool.fresh();
            let definition = &(&Polynomial::var(w) * &value.denominator) - &value.numerator;
            st.add_polynomial(Owner::Condition, definition);
            push_extra(st, w);
            let label = if label.is_empty() {
                format!("({})", text)
            } else {
                label
            };
            Ok(Some(Side {
                var: w,
                label,
                degree,
            }))
        }
        _ => Ok(None),
    }
}

/// Length variable of a segment, shared by every use of the segment.
fn length(
    st: &mut AlgebraicStatement,
    scope: &EncodingScope<'_>,
    lengths: &mut BTreeMap<ObjectId, Variable>,
    segment: ObjectId,
) -> BotResult<Variable> {
    if let Some(v) = lengths.get(&segment) {
        return Ok(*v);
    }
    let [a, b] = scope.line(segment)?;
    let w = scope.pool.fresh();
    st.add_polynomial(
        Owner::Condition,
        geometry::sqr_distance(a, b) - Polynomial::var(w).pow(2),
    );
    push_extra(st, w);
    lengths.insert(segment, w);
    Ok(w)
}

fn push_extra(st: &mut AlgebraicStatement, v: Variable) {
    let name = v.to_string();
    if !st.extra_variables.contains(&name) {
        st.extra_variables.push(name);
    }
}

/// Side standing for `side^exponent`.
fn raise(st: &mut AlgebraicStatement, scope: &EncodingScope<'_>, side: Side, exponent: i64) -> Side {
    if exponent <= 1 {
        return side;
    }
    let power = u32::try_from(exponent).unwrap_or(u32::MAX);
    let u = scope.pool.fresh();
    st.add_polynomial(
        Owner::Condition,
        Polynomial::var(u) - Polynomial::var(side.var).pow(power),
    );
    push_extra(st, u);
    Side {
        var: u,
        label: format!("({})^{}", side.label, exponent),
        degree: side.degree * exponent,
    }
}

fn render(dialect: Dialect, answer: &str, lhs: &str, rhs: &str) -> String {
    let cases = match dialect {
        Dialect::Mathematica => Either::Left(answer.split("||")),
        Dialect::Qepcad => Either::Right(split_top_level(answer).into_iter()),
    };
    let mut rendered = Vec::new();
    for case in cases {
        let case = case.replace("&& m > 0", "");
        let case = case.trim();
        // QEPCAD drops `m=` when the ratio is a single value.
        let completed = format!("m={}", case);
        let parsed = match dialect {
            Dialect::Mathematica => mathematica_case().parse(case).into_result().ok(),
            Dialect::Qepcad if !case.contains('m') => {
                qepcad_case().parse(completed.as_str()).into_result().ok()
            }
            Dialect::Qepcad => qepcad_case().parse(case).into_result().ok(),
        };
        match parsed {
            Some(Bound::Above(v, false)) if v == "0" => {}
            Some(bound) => rendered.push(render_bound(&bound, lhs, rhs)),
            None => {
                debug!("Keeping unread case `{}`", case);
                rendered.push(case.replace('*', "·"));
            }
        }
    }
    rendered.join(" or ")
}

fn render_cases(cases: &[Bound], lhs: &str, rhs: &str) -> String {
    cases
        .iter()
        .map(|b| render_bound(b, lhs, rhs))
        .collect::<Vec<_>>()
        .join(" or ")
}

fn render_bound(bound: &Bound, lhs: &str, rhs: &str) -> String {
    let scaled = |v: &str| format!("({}) · {}", pretty(v), rhs);
    let less = |inclusive: bool| if inclusive { "≤" } else { "<" };
    let text = match bound {
        Bound::Equal(v) => format!("{} = {}", lhs, scaled(v)),
        Bound::Above(v, inclusive) => {
            format!("{} {} {}", lhs, if *inclusive { "≥" } else { ">" }, scaled(v))
        }
        Bound::Below(v, inclusive) => format!("{} {} {}", lhs, less(*inclusive), scaled(v)),
        Bound::Between {
            low,
            low_inclusive,
            high,
            high_inclusive,
        } => {
            let upper = format!("{} {} {}", lhs, less(*high_inclusive), scaled(high));
            if low.trim() == "0" && !low_inclusive {
                upper
            } else {
                format!("{} {} {}", scaled(low), less(*low_inclusive), upper)
            }
        }
    };
    text.replace("(1) · ", "")
}

/// Readable form of a value: square roots, algebraic roots and products.
fn pretty(value: &str) -> String {
    let mut text = value.trim().to_string();
    while let Some((start, inner, end)) = bracket_call(&text, "Sqrt[") {
        let root = if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()) {
            format!("√{}", inner)
        } else {
            format!("√({})", inner)
        };
        text = format!("{}{}{}", &text[..start], root, &text[end..]);
    }
    while let Some((start, inner, end)) = bracket_call(&text, "Root[") {
        let parts = split_top_level(&inner);
        let root = match parts.as_slice() {
            [poly, index, ..] => format!(
                "{}. root of {}",
                index.trim(),
                poly.trim().trim_end_matches('&').trim()
            ),
            _ => inner.clone(),
        };
        text = format!("{}{}{}", &text[..start], root, &text[end..]);
    }
    text.replace("sqrt", "√")
        .replace("#1", "x")
        .replace('*', "·")
        .replace("( ", "(")
        .replace(" )", ")")
}

/// First `head...]` call in `text`: start offset, content, end offset.
fn bracket_call(text: &str, head: &str) -> Option<(usize, String, usize)> {
    let start = text.find(head)?;
    let open = start + head.len();
    let mut depth = 1;
    for (i, c) in text[open..].char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    let close = open + i;
                    return Some((start, text[open..close].to_string(), close + 1));
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas outside of brackets.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut from = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[from..i]);
                from = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[from..]);
    parts
}

/// Text with balanced brackets, commas allowed inside brackets only.
fn value<'src>() -> impl Parser<'src, &'src str, String, Extra<'src>> + Clone {
    let balanced = recursive(|balanced| {
        let group = |open: char, close: char| balanced.clone().delimited_by(just(open), just(close));
        choice((
            none_of("()[]{}").ignored(),
            group('(', ')'),
            group('[', ']'),
            group('{', '}'),
        ))
        .repeated()
    });
    let group = |open: char, close: char| balanced.clone().delimited_by(just(open), just(close));
    choice((
        none_of("()[]{},").ignored(),
        group('(', ')'),
        group('[', ']'),
        group('{', '}'),
    ))
    .repeated()
    .at_least(1)
    .to_slice()
    .map(|s: &str| s.trim().to_string())
}

fn mathematica_case<'src>() -> impl Parser<'src, &'src str, Bound, Extra<'src>> {
    let relation = choice((just("LessEqual").to(true), just("Less").to(false)));
    let comma = || just(',').padded();
    let between = just("Inequality[")
        .ignore_then(value())
        .then_ignore(comma())
        .then(relation.clone())
        .then_ignore(comma())
        .then_ignore(just('m'))
        .then_ignore(comma())
        .then(relation)
        .then_ignore(comma())
        .then(value())
        .then_ignore(just(']'))
        .map(|(((low, low_inclusive), high_inclusive), high)| Bound::Between {
            low,
            low_inclusive,
            high,
            high_inclusive,
        });
    let simple = just('m')
        .ignore_then(
            choice((
                just("==").to(0),
                just(">=").to(1),
                just(">").to(2),
                just("<=").to(3),
                just("<").to(4),
            ))
            .padded(),
        )
        .then(value())
        .map(|(op, v)| simple_bound(op, v));
    choice((between, simple)).padded().then_ignore(end())
}

fn qepcad_case<'src>() -> impl Parser<'src, &'src str, Bound, Extra<'src>> {
    let clause = |ops| {
        just('(')
            .ignore_then(just('m'))
            .ignore_then(ops)
            .then(value())
            .then_ignore(just(')'))
    };
    let lower = choice((just(">=").to(true), just(">").to(false)));
    let upper = choice((just("<=").to(true), just("<").to(false)));
    let between = clause(lower)
        .then_ignore(just("and").padded())
        .then(clause(upper))
        .delimited_by(just('('), just(')'))
        .map(|((low_inclusive, low), (high_inclusive, high))| Bound::Between {
            low,
            low_inclusive,
            high,
            high_inclusive,
        });
    let simple = just('m')
        .ignore_then(choice((
            just(">=").to(1),
            just(">").to(2),
            just("<=").to(3),
            just("<").to(4),
            just("=").to(0),
        )))
        .then(value())
        .map(|(op, v)| simple_bound(op, v));
    choice((between, simple)).padded().then_ignore(end())
}

fn simple_bound(op: u8, v: String) -> Bound {
    match op {
        0 => Bound::Equal(v),
        1 => Bound::Above(v, true),
        2 => Bound::Above(v, false),
        3 => Bound::Below(v, true),
        _ => Bound::Below(v, false),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        backend::{
            Backends,
            scripted::{ScriptedCas, ScriptedElimination, ScriptedRealGeom},
        },
        base::settings::ProverSettings,
        construction::graph::Construction,
    };

    #[test]
    fn mathematica_answers() {
        let r = |answer| render(Dialect::Mathematica, answer, "f", "g");
        assert_eq!(r("m == 1"), "f = g");
        assert_eq!(r("m >= 1/2"), "f ≥ (1/2) · g");
        assert_eq!(r("m == Sqrt[2]"), "f = (√2) · g");
        assert_eq!(r("m == Sqrt[2 + Sqrt[3]]"), "f = (√(2 + √3)) · g");
        assert_eq!(r("Inequality[0, Less, m, LessEqual, 2]"), "f ≤ (2) · g");
        assert_eq!(
            r("Inequality[1/2, LessEqual, m, Less, 2]"),
            "(1/2) · g ≤ f < (2) · g"
        );
        assert_eq!(r("m > 0 || m == 1 && m > 0"), "f = g");
        assert_eq!(
            r("m == Root[1 - #1 - 2*#1^2 + #1^3 & , 2, 0]"),
            "f = (2. root of 1 - x - 2·x^2 + x^3) · g"
        );
    }

    #[test]
    fn qepcad_answers() {
        let r = |answer| render(Dialect::Qepcad, answer, "f", "g");
        assert_eq!(r("m=1"), "f = g");
        assert_eq!(r("2"), "f = (2) · g");
        assert_eq!(r("((m>=1) and (m<=(sqrt2)))"), "g ≤ f ≤ ((√2)) · g");
        assert_eq!(r("((m>0) and (m<2))"), "f < (2) · g");
        assert_eq!(r("m>0,m=3"), "f = (3) · g");
        assert_eq!(r("m=1,m=2"), "f = g or f = (2) · g");
    }

    #[test]
    fn qepcad_bare_values_are_ratios() {
        let r = |answer| render(Dialect::Qepcad, answer, "f", "g");
        assert_eq!(r("3/2"), "f = (3/2) · g");
        assert_eq!(r("(sqrt2)"), "f = ((√2)) · g");
        assert_eq!(r("1,m=2"), "f = g or f = (2) · g");
    }

    #[test]
    fn balanced_values_stop_at_top_level_commas() {
        let parsed = value()
            .then_ignore(just(','))
            .then(value())
            .parse("Root[#1^2-2 & , 2, 0], 3")
            .into_result()
            .unwrap();
        assert_eq!(parsed, ("Root[#1^2-2 & , 2, 0]".to_string(), "3".to_string()));
        assert_eq!(split_top_level("m=1,((m>0) and (m<2))"), vec!["m=1", "((m>0) and (m<2))"]);
    }

    fn triangle() -> (Construction, ObjectId, ObjectId) {
        let mut cons = Construction::new();
        let a = cons.free_point("A");
        let b = cons.free_point("B");
        let c = cons.free_point("C");
        let f = cons.segment("f", a, b).unwrap();
        let g = cons.segment("g", a, c).unwrap();
        (cons, f, g)
    }

    #[test]
    fn direct_elimination_with_a_single_ratio() {
        let cas = Arc::new(ScriptedCas::new());
        cas.push("{2}");
        let ctx = ProverContext::new(
            ProverSettings::default(),
            Backends::new(cas.clone(), Arc::new(ScriptedElimination::new())),
        );
        let (cons, f, g) = triangle();
        let compare = Compare::new();
        assert_eq!(compare.compare(&ctx, &cons, f, g), "f = (2) · g");

        let program = &cas.requests()[0];
        assert!(program.starts_with("[assume(m>0),solve(eliminate(subst(["));
        assert!(program.contains("[v1=0,v2=0,v3=1,v4=0]"));
        assert!(program.ends_with(",n])[0],m)][1]"));

        // Memoized: no second request.
        assert_eq!(compare.compare(&ctx, &cons, f, g), "f = (2) · g");
        assert_eq!(cas.requests().len(), 1);
    }

    #[test]
    fn several_ratios_without_exploration() {
        let cas = Arc::new(ScriptedCas::new());
        cas.push("{1,2}");
        let ctx = ProverContext::new(
            ProverSettings::default(),
            Backends::new(cas, Arc::new(ScriptedElimination::new())),
        );
        let (cons, f, g) = triangle();
        assert_eq!(Compare::new().compare(&ctx, &cons, f, g), "f = g or f = (2) · g");
    }

    #[test]
    fn exploration_over_qepcad() {
        let realgeom = Arc::new(ScriptedRealGeom::new("qepcad"));
        realgeom.push("((m>0) and (m<=1))");
        let ctx = ProverContext::new(
            ProverSettings::default(),
            Backends::new(Arc::new(ScriptedCas::new()), Arc::new(ScriptedElimination::new()))
                .with_realgeom(realgeom.clone()),
        );
        let (cons, f, g) = triangle();
        assert_eq!(Compare::new().compare(&ctx, &cons, f, g), "f ≤ g");

        let params = RealGeomParameters::parse(&realgeom.requests()[0].1);
        assert_eq!(params.get("mode"), "explore");
        assert_eq!(params.get("cas"), "qepcad");
        assert_eq!(params.list("posvariables").len(), 2);
        assert!(params.list("vars").contains(&params.get("lhs")));
    }

    #[test]
    fn numbers_over_segments_get_exponents() {
        let realgeom = Arc::new(ScriptedRealGeom::new("mathematica"));
        realgeom.push("m >= 4");
        let settings = ProverSettings {
            realgeom: crate::base::settings::RealGeomSettings {
                use_giac_elimination: false,
                ..Default::default()
            },
            ..ProverSettings::default()
        };
        let ctx = ProverContext::new(
            settings,
            Backends::new(Arc::new(ScriptedCas::new()), Arc::new(ScriptedElimination::new()))
                .with_realgeom(realgeom),
        );
        let (mut cons, f, g) = triangle();
        let area = cons
            .add(
                "p",
                ObjectKind::Numeric,
                Some(StepKind::DependentNumber { inputs: vec![f, g] }),
            )
            .unwrap();
        cons.set_formula(area, "f*g").unwrap();
        assert_eq!(Compare::new().compare(&ctx, &cons, area, f), "p ≥ (4) · (f)^2");
    }

    #[test]
    fn constant_numbers_are_not_compared() {
        let ctx = ProverContext::new(
            ProverSettings::default(),
            Backends::new(Arc::new(ScriptedCas::new()), Arc::new(ScriptedElimination::new())),
        );
        let (mut cons, f, g) = triangle();
        let ratio = cons
            .add(
                "r",
                ObjectKind::Numeric,
                Some(StepKind::DependentNumber { inputs: vec![f, g] }),
            )
            .unwrap();
        cons.set_formula(ratio, "f/g").unwrap();
        assert_eq!(Compare::new().compare(&ctx, &cons, ratio, f), "");
    }
}
