//! Botana encoding of construction steps.
//!
//! Every object is described by a list of variables and a list of polynomials
//! in those variables (and in the variables of its inputs). Variable layouts
//! are fixed per kind:
//!
//! | kind                     | variables                                  |
//! |--------------------------|--------------------------------------------|
//! | point                    | `x, y`                                     |
//! | line, segment            | two points on the line                     |
//! | circle                   | center, then a point on the circle         |
//! | parabola                 | generic point `t`                          |
//! | ellipse, hyperbola       | generic point `t`, distances `d1, d2, e1, e2` |
//! | polygon                  | the vertices, in order                     |
//! | angle                    | the three defining points                  |
//! | number                   | its value                                  |
use std::sync::Arc;

use botpoly::{
    Polynomial, Variable, VariablePool,
    geometry::{self, Coords},
};
use log::debug;
use smallvec::SmallVec;

use crate::{
    construction::{ConstructionGraph, ObjectId, ObjectKind, StepKind, cache::EncodingCache},
    utils::error::{BotError, BotResult},
};

/// Variables and polynomials of one object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encoding {
    pub variables: SmallVec<[Variable; 6]>,
    pub polynomials: Vec<Polynomial>,
}

impl Encoding {
    pub fn new(variables: impl IntoIterator<Item = Variable>, polynomials: Vec<Polynomial>) -> Self {
        Self {
            variables: variables.into_iter().collect(),
            polynomials,
        }
    }

    /// Coordinates stored at positions `2*index` and `2*index+1`.
    pub fn coords(&self, index: usize) -> Option<Coords> {
        Some([
            *self.variables.get(2 * index)?,
            *self.variables.get(2 * index + 1)?,
        ])
    }
}

/// Produces the encoding of one object.
///
/// Implementations must be idempotent: the result is cached until the object
/// is invalidated. `Ok(None)` means that no symbolic encoding exists.
pub trait BotanaEncoder: Send + Sync {
    fn encode(&self, scope: &EncodingScope<'_>, id: ObjectId) -> BotResult<Option<Encoding>>;
}

/// Everything an encoder needs: the graph, the variable pool and cached
/// access to the encodings of other objects.
pub struct EncodingScope<'a> {
    pub graph: &'a dyn ConstructionGraph,
    pub pool: &'a VariablePool,
    cache: &'a EncodingCache,
    encoder: &'a dyn BotanaEncoder,
}

impl<'a> EncodingScope<'a> {
    pub fn new(
        graph: &'a dyn ConstructionGraph,
        pool: &'a VariablePool,
        cache: &'a EncodingCache,
        encoder: &'a dyn BotanaEncoder,
    ) -> Self {
        Self {
            graph,
            pool,
            cache,
            encoder,
        }
    }

    /// Cached encoding of `id`, `None` when the object has no symbolic encoding.
    pub fn try_encoding(&self, id: ObjectId) -> BotResult<Option<Arc<Encoding>>> {
        self.cache
            .get_or_encode(id, || self.encoder.encode(self, id))
    }

    /// Cached encoding of `id`; a missing encoding is an unsupported construction.
    pub fn encoding(&self, id: ObjectId) -> BotResult<Arc<Encoding>> {
        self.try_encoding(id)?
            .ok_or_else(|| self.unsupported(id))
    }

    pub fn kind(&self, id: ObjectId) -> BotResult<ObjectKind> {
        self.graph.kind(id).ok_or(BotError::MissingObject(id))
    }

    pub fn unsupported(&self, id: ObjectId) -> BotError {
        let kind = match self.graph.step(id) {
            Some(step) => step.name().to_string(),
            None => self
                .graph
                .kind(id)
                .map(|k| k.to_string())
                .unwrap_or_default(),
        };
        BotError::UnsupportedConstruction { object: id, kind }
    }

    pub fn point(&self, id: ObjectId) -> BotResult<Coords> {
        if !self.kind(id)?.is_point() {
            return Err(self.unsupported(id));
        }
        self.encoding(id)?.coords(0).ok_or_else(|| self.unsupported(id))
    }

    /// Two points spanning a line or segment.
    pub fn line(&self, id: ObjectId) -> BotResult<[Coords; 2]> {
        if !self.kind(id)?.is_linear() {
            return Err(self.unsupported(id));
        }
        let encoding = self.encoding(id)?;
        match (encoding.coords(0), encoding.coords(1)) {
            (Some(a), Some(b)) => Ok([a, b]),
            _ => Err(self.unsupported(id)),
        }
    }

    /// Center and a point of a circle.
    pub fn circle(&self, id: ObjectId) -> BotResult<[Coords; 2]> {
        if !self.kind(id)?.is_circle() {
            return Err(self.unsupported(id));
        }
        let encoding = self.encoding(id)?;
        match (encoding.coords(0), encoding.coords(1)) {
            (Some(c), Some(p)) => Ok([c, p]),
            _ => Err(self.unsupported(id)),
        }
    }

    /// Vertices of a polygon.
    pub fn vertices(&self, id: ObjectId) -> BotResult<Vec<Coords>> {
        let encoding = self.encoding(id)?;
        let count = match self.graph.step(id) {
            Some(StepKind::Polygon { vertices }) => vertices.len(),
            Some(StepKind::RegularPolygon { n, .. }) => *n as usize,
            _ => return Err(self.unsupported(id)),
        };
        (0..count)
            .map(|i| encoding.coords(i).ok_or_else(|| self.unsupported(id)))
            .collect()
    }

    fn number(&self, id: ObjectId) -> BotResult<Variable> {
        self.encoding(id)?
            .variables
            .first()
            .copied()
            .ok_or_else(|| self.unsupported(id))
    }
}

fn p(v: Variable) -> Polynomial {
    Polynomial::var(v)
}

fn flatten(points: &[Coords]) -> SmallVec<[Variable; 6]> {
    points.iter().flat_map(|c| c.iter().copied()).collect()
}

/// Substitute the generic point (and the per-point helpers) of a conic encoding.
pub(crate) fn conic_copy(
    conic: &Encoding,
    point: Coords,
    helpers: usize,
    pool: &VariablePool,
) -> Vec<Polynomial> {
    let mut map = std::collections::BTreeMap::new();
    map.insert(conic.variables[0], p(point[0]));
    map.insert(conic.variables[1], p(point[1]));
    for helper in conic.variables.iter().skip(2).take(helpers) {
        map.insert(*helper, p(pool.fresh()));
    }
    conic
        .polynomials
        .iter()
        .map(|q| q.substitute_all(&map))
        .collect()
}

/// Number of per-point helper variables following the generic point of a conic.
pub fn conic_point_helpers(kind: ObjectKind) -> usize {
    match kind {
        ObjectKind::Ellipse | ObjectKind::Hyperbola => 2,
        _ => 0,
    }
}

/// Encoder for the step kinds of [`StepKind`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardEncoder;

impl StandardEncoder {
    fn encode_step(
        &self,
        scope: &EncodingScope<'_>,
        id: ObjectId,
        step: &StepKind,
    ) -> BotResult<Option<Encoding>> {
        let pool = scope.pool;
        let encoding = match step {
            StepKind::DynamicCoordinates { .. } | StepKind::PointInRegion { .. } => {
                Encoding::new(pool.fresh_pair(), vec![])
            }
            StepKind::PointOnPath { path } => {
                let point = pool.fresh_pair();
                let kind = scope.kind(*path)?;
                let polys = match kind {
                    ObjectKind::Line | ObjectKind::Segment => {
                        let [a, b] = scope.line(*path)?;
                        vec![geometry::collinear(point, a, b)]
                    }
                    ObjectKind::Circle => {
                        let [c, q] = scope.circle(*path)?;
                        vec![geometry::equidistant(point, c, q)]
                    }
                    ObjectKind::Parabola | ObjectKind::Ellipse | ObjectKind::Hyperbola => {
                        let conic = scope.encoding(*path)?;
                        conic_copy(&conic, point, conic_point_helpers(kind), pool)
                    }
                    // Described numerically by the collector, if at all.
                    _ => vec![],
                };
                Encoding::new(point, polys)
            }
            StepKind::Midpoint { a, b } => {
                let m = pool.fresh_pair();
                let polys = geometry::midpoint(m, scope.point(*a)?, scope.point(*b)?);
                Encoding::new(m, polys.into())
            }
            StepKind::LineThroughPoints { a, b } | StepKind::Segment { a, b } => {
                Encoding::new(flatten(&[scope.point(*a)?, scope.point(*b)?]), vec![])
            }
            StepKind::PerpendicularBisector { a, b } => {
                let (c, d) = (pool.fresh_pair(), pool.fresh_pair());
                let polys = geometry::line_bisector(scope.point(*a)?, scope.point(*b)?, c, d);
                Encoding::new(flatten(&[c, d]), polys.into())
            }
            StepKind::PerpendicularLine { point, line } | StepKind::ParallelLine { point, line } => {
                let q = scope.point(*point)?;
                let [a, b] = scope.line(*line)?;
                let d = pool.fresh_pair();
                let (dx, dy) = (p(b[0]) - p(a[0]), p(b[1]) - p(a[1]));
                let polys = if step.is_perpendicular_line() {
                    vec![&(p(d[0]) - p(q[0])) + &dy, &(p(d[1]) - p(q[1])) - &dx]
                } else {
                    vec![&(p(d[0]) - p(q[0])) - &dx, &(p(d[1]) - p(q[1])) - &dy]
                };
                Encoding::new(flatten(&[q, d]), polys)
            }
            StepKind::IntersectLines { a, b } => {
                let [a1, a2] = scope.line(*a)?;
                let [b1, b2] = scope.line(*b)?;
                let x = pool.fresh_pair();
                Encoding::new(
                    x,
                    vec![geometry::collinear(x, a1, a2), geometry::collinear(x, b1, b2)],
                )
            }
            StepKind::CircleCenterPoint { center, through } => Encoding::new(
                flatten(&[scope.point(*center)?, scope.point(*through)?]),
                vec![],
            ),
            StepKind::CirclePointRadius { center, radius } => {
                let c = scope.point(*center)?;
                let q = pool.fresh_pair();
                let first = match scope.kind(*radius)? {
                    ObjectKind::Segment => {
                        let [a, b] = scope.line(*radius)?;
                        geometry::sqr_distance(q, c) - geometry::sqr_distance(a, b)
                    }
                    ObjectKind::Numeric => {
                        let r = scope.number(*radius)?;
                        &(p(q[0]) - p(c[0])) - &p(r)
                    }
                    _ => return Ok(None),
                };
                Encoding::new(flatten(&[c, q]), vec![first, p(q[1]) - p(c[1])])
            }
            StepKind::ParabolaPointLine { focus, directrix } => {
                let f = scope.point(*focus)?;
                let [a, b] = scope.line(*directrix)?;
                let t = pool.fresh_pair();
                let poly = &geometry::sqr_distance(t, f) * &geometry::sqr_distance(a, b)
                    - geometry::collinear(a, b, t).pow(2);
                Encoding::new(t, vec![poly])
            }
            StepKind::EllipseFociPoint { f1, f2, point }
            | StepKind::HyperbolaFociPoint { f1, f2, point } => {
                let (f1, f2, q) = (scope.point(*f1)?, scope.point(*f2)?, scope.point(*point)?);
                let t = pool.fresh_pair();
                let [d1, d2] = pool.fresh_pair();
                let [e1, e2] = pool.fresh_pair();
                let sum = if step.is_ellipse_foci_point() {
                    &(&(p(d1) + p(d2)) - &p(e1)) - &p(e2)
                } else {
                    &(&(p(d1) - p(d2)) - &p(e1)) + &p(e2)
                };
                let polys = vec![
                    p(d1).pow(2) - geometry::sqr_distance(t, f1),
                    p(d2).pow(2) - geometry::sqr_distance(t, f2),
                    p(e1).pow(2) - geometry::sqr_distance(q, f1),
                    p(e2).pow(2) - geometry::sqr_distance(q, f2),
                    sum,
                ];
                Encoding::new([t[0], t[1], d1, d2, e1, e2], polys)
            }
            StepKind::Polygon { vertices } => {
                let points = vertices
                    .iter()
                    .map(|v| scope.point(*v))
                    .collect::<BotResult<Vec<_>>>()?;
                Encoding::new(flatten(&points), vec![])
            }
            StepKind::RegularPolygon { a, b, n } => {
                match regular_polygon(scope.point(*a)?, scope.point(*b)?, *n, pool) {
                    Some(encoding) => encoding,
                    None => return Ok(None),
                }
            }
            StepKind::PolygonVertex { polygon, index } => {
                let encoding = scope.encoding(*polygon)?;
                match encoding.coords(*index) {
                    Some(c) => Encoding::new(c, vec![]),
                    None => return Ok(None),
                }
            }
            StepKind::IncircleCenter { a, b, c } => {
                let (a, b, c) = (scope.point(*a)?, scope.point(*b)?, scope.point(*c)?);
                let i = pool.fresh_pair();
                let bisects = |v: Coords, s: Coords, t: Coords| {
                    &geometry::collinear(v, s, i).pow(2) * &geometry::sqr_distance(v, t)
                        - &geometry::collinear(v, t, i).pow(2) * &geometry::sqr_distance(v, s)
                };
                Encoding::new(i, vec![bisects(a, b, c), bisects(b, a, c)])
            }
            StepKind::AngularBisector { a, b, c } => {
                let (a, b, c) = (scope.point(*a)?, scope.point(*b)?, scope.point(*c)?);
                let m = pool.fresh_pair();
                let h = pool.fresh_pair();
                let polys = vec![
                    geometry::collinear(h, b, a),
                    geometry::sqr_distance(h, b) - geometry::sqr_distance(c, b),
                    &(&(p(m[0]) - p(h[0])) - &p(c[0])) + &p(b[0]),
                    &(&(p(m[1]) - p(h[1])) - &p(c[1])) + &p(b[1]),
                ];
                Encoding::new(flatten(&[m, b, h]), polys)
            }
            StepKind::Angle { a, b, c } => Encoding::new(
                flatten(&[scope.point(*a)?, scope.point(*b)?, scope.point(*c)?]),
                vec![],
            ),
            StepKind::Distance { a, b } => {
                let w = pool.fresh();
                let poly = p(w).pow(2) - geometry::sqr_distance(scope.point(*a)?, scope.point(*b)?);
                Encoding::new([w], vec![poly])
            }
            StepKind::FixedSlopeLine | StepKind::DependentNumber { .. } => return Ok(None),
            statement if statement.is_statement() => Encoding::default(),
            _ => return Ok(None),
        };

        debug!(
            "Encoded {} ({}) with {} variables and {} polynomials",
            scope.graph.label(id),
            step.name(),
            encoding.variables.len(),
            encoding.polynomials.len()
        );
        Ok(Some(encoding))
    }
}

/// Regular polygons with an exact rational description (3, 4 and 6 vertices).
fn regular_polygon(a: Coords, b: Coords, n: u32, pool: &VariablePool) -> Option<Encoding> {
    let lin = |target: Coords, terms: [(i64, Coords); 3]| -> [Polynomial; 2] {
        let combine = |axis: usize| {
            terms.iter().fold(p(target[axis]), |acc, (k, c)| {
                &acc - &(&Polynomial::constant(*k) * &p(c[axis]))
            })
        };
        [combine(0), combine(1)]
    };
    let side = geometry::sqr_distance(a, b);

    match n {
        3 => {
            let c = pool.fresh_pair();
            Some(Encoding::new(
                flatten(&[a, b, c]),
                vec![
                    geometry::sqr_distance(c, a) - side.clone(),
                    geometry::sqr_distance(c, b) - side,
                ],
            ))
        }
        4 => {
            let (c, d) = (pool.fresh_pair(), pool.fresh_pair());
            let mut polys: Vec<Polynomial> = geometry::rotation_90(c, b, a).into();
            // d = a + c - b
            polys.extend(lin(d, [(1, a), (1, c), (-1, b)]));
            Some(Encoding::new(flatten(&[a, b, c, d]), polys))
        }
        6 => {
            let o = pool.fresh_pair();
            let [c, d, e, f] = [
                pool.fresh_pair(),
                pool.fresh_pair(),
                pool.fresh_pair(),
                pool.fresh_pair(),
            ];
            let mut polys = vec![
                geometry::sqr_distance(o, a) - side.clone(),
                geometry::sqr_distance(o, b) - side,
            ];
            polys.extend(lin(c, [(1, b), (1, o), (-1, a)]));
            polys.extend(lin(d, [(2, o), (-1, a), (0, a)]));
            polys.extend(lin(e, [(2, o), (-1, b), (0, b)]));
            polys.extend(lin(f, [(1, a), (1, o), (-1, b)]));
            Some(Encoding::new(flatten(&[a, b, c, d, e, f, o]), polys))
        }
        _ => None,
    }
}

impl BotanaEncoder for StandardEncoder {
    fn encode(&self, scope: &EncodingScope<'_>, id: ObjectId) -> BotResult<Option<Encoding>> {
        let kind = scope.kind(id)?;
        match scope.graph.step(id) {
            Some(step) => self.encode_step(scope, id, step),
            None => Ok(match kind {
                ObjectKind::Point => Some(Encoding::new(scope.pool.fresh_pair(), vec![])),
                ObjectKind::Numeric => Some(Encoding::new([scope.pool.fresh()], vec![])),
                ObjectKind::Boolean => Some(Encoding::default()),
                _ => None,
            }),
        }
    }
}
