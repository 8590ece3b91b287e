//! Construction graph contract and its algebraic encoding.
//!
//! A construction is a DAG of objects. Every object has an [`ObjectKind`]
//! and, unless it is free, a defining [`StepKind`] naming its inputs. The
//! prover only reads the graph through [`ConstructionGraph`]; the crate ships
//! [`graph::Construction`] as an in-memory implementation.
//!
//! Core concepts:
//! - **Step kinds** are a closed tagged enumeration fixed at ingestion time.
//!   Statements (`AreCollinear`, `AreEqual`, ...) are steps too; their object
//!   is of kind [`ObjectKind::Boolean`].
//! - **Encodings** ([`encoder::Encoding`]) are the Botana variables and
//!   polynomials of one object. They are produced by a
//!   [`encoder::BotanaEncoder`] and memoized in an [`cache::EncodingCache`].
use std::collections::{BTreeSet, VecDeque};

use strum::{Display, EnumIs, IntoStaticStr};

pub mod cache;
pub mod encoder;
pub mod graph;

/// Identifier of an object of the construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Geometric type of an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIs, Display, IntoStaticStr)]
pub enum ObjectKind {
    Point,
    Line,
    Segment,
    Circle,
    ConicPart,
    Parabola,
    Ellipse,
    Hyperbola,
    /// Curve known only through its closed-form equation.
    Curve,
    Polygon,
    Numeric,
    Angle,
    Boolean,
}

impl ObjectKind {
    /// Objects along which a point can move.
    pub fn is_path(&self) -> bool {
        matches!(
            self,
            ObjectKind::Line
                | ObjectKind::Segment
                | ObjectKind::Circle
                | ObjectKind::ConicPart
                | ObjectKind::Parabola
                | ObjectKind::Ellipse
                | ObjectKind::Hyperbola
                | ObjectKind::Curve
        )
    }

    /// Lines in the wide sense (segments included).
    pub fn is_linear(&self) -> bool {
        matches!(self, ObjectKind::Line | ObjectKind::Segment)
    }
}

/// Defining step of an object.
///
/// Objects without a step are free (free points, sliders, boolean constants).
#[derive(Clone, Debug, PartialEq, Eq, Hash, EnumIs, IntoStaticStr)]
pub enum StepKind {
    /// Point whose coordinates are taken from elsewhere, free for the prover.
    DynamicCoordinates { source: ObjectId },
    PointOnPath { path: ObjectId },
    PointInRegion { region: ObjectId },
    Midpoint { a: ObjectId, b: ObjectId },
    LineThroughPoints { a: ObjectId, b: ObjectId },
    Segment { a: ObjectId, b: ObjectId },
    PerpendicularBisector { a: ObjectId, b: ObjectId },
    PerpendicularLine { point: ObjectId, line: ObjectId },
    ParallelLine { point: ObjectId, line: ObjectId },
    IntersectLines { a: ObjectId, b: ObjectId },
    CircleCenterPoint { center: ObjectId, through: ObjectId },
    CirclePointRadius { center: ObjectId, radius: ObjectId },
    ParabolaPointLine { focus: ObjectId, directrix: ObjectId },
    EllipseFociPoint { f1: ObjectId, f2: ObjectId, point: ObjectId },
    HyperbolaFociPoint { f1: ObjectId, f2: ObjectId, point: ObjectId },
    Polygon { vertices: Vec<ObjectId> },
    RegularPolygon { a: ObjectId, b: ObjectId, n: u32 },
    /// Vertex `index` (zero based) of a polygon.
    PolygonVertex { polygon: ObjectId, index: usize },
    IncircleCenter { a: ObjectId, b: ObjectId, c: ObjectId },
    /// Bisector of the angle `abc`, vertex `b`.
    AngularBisector { a: ObjectId, b: ObjectId, c: ObjectId },
    /// Angle `abc`, vertex `b`.
    Angle { a: ObjectId, b: ObjectId, c: ObjectId },
    Distance { a: ObjectId, b: ObjectId },
    /// Axis or line given by a fixed slope.
    FixedSlopeLine,
    /// Number defined by an arithmetic expression over other numbers.
    DependentNumber { inputs: Vec<ObjectId> },

    AreCollinear { a: ObjectId, b: ObjectId, c: ObjectId },
    AreParallel { a: ObjectId, b: ObjectId },
    ArePerpendicular { a: ObjectId, b: ObjectId },
    AreEqual { a: ObjectId, b: ObjectId },
    AreCongruent { a: ObjectId, b: ObjectId },
    AreConcyclic { a: ObjectId, b: ObjectId, c: ObjectId, d: ObjectId },
    IsOnPath { point: ObjectId, path: ObjectId },
    /// Boolean expression over labelled objects, such as `f == g` or `f + g > h`.
    Expression { text: String, inputs: Vec<ObjectId> },
}

impl StepKind {
    /// Direct inputs of the step, in definition order.
    pub fn inputs(&self) -> Vec<ObjectId> {
        use StepKind::*;
        match self {
            FixedSlopeLine => vec![],
            DynamicCoordinates { source } => vec![*source],
            PointOnPath { path } => vec![*path],
            PointInRegion { region } => vec![*region],
            Midpoint { a, b }
            | LineThroughPoints { a, b }
            | Segment { a, b }
            | PerpendicularBisector { a, b }
            | IntersectLines { a, b }
            | RegularPolygon { a, b, .. }
            | Distance { a, b }
            | AreParallel { a, b }
            | ArePerpendicular { a, b }
            | AreEqual { a, b }
            | AreCongruent { a, b } => vec![*a, *b],
            PerpendicularLine { point, line } | ParallelLine { point, line } => {
                vec![*point, *line]
            }
            CircleCenterPoint { center, through } => vec![*center, *through],
            CirclePointRadius { center, radius } => vec![*center, *radius],
            ParabolaPointLine { focus, directrix } => vec![*focus, *directrix],
            EllipseFociPoint { f1, f2, point } | HyperbolaFociPoint { f1, f2, point } => {
                vec![*f1, *f2, *point]
            }
            Polygon { vertices } => vertices.clone(),
            PolygonVertex { polygon, .. } => vec![*polygon],
            IncircleCenter { a, b, c }
            | AngularBisector { a, b, c }
            | Angle { a, b, c }
            | AreCollinear { a, b, c } => vec![*a, *b, *c],
            DependentNumber { inputs } | Expression { inputs, .. } => inputs.clone(),
            AreConcyclic { a, b, c, d } => vec![*a, *b, *c, *d],
            IsOnPath { point, path } => vec![*point, *path],
        }
    }

    /// True for the steps that define a boolean statement.
    pub fn is_statement(&self) -> bool {
        use StepKind::*;
        matches!(
            self,
            AreCollinear { .. }
                | AreParallel { .. }
                | ArePerpendicular { .. }
                | AreEqual { .. }
                | AreCongruent { .. }
                | AreConcyclic { .. }
                | IsOnPath { .. }
                | Expression { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Read access to a construction, as required by the prover.
pub trait ConstructionGraph {
    /// Kind of an object, `None` if the object does not exist.
    fn kind(&self, id: ObjectId) -> Option<ObjectKind>;

    /// Defining step, `None` for free objects.
    fn step(&self, id: ObjectId) -> Option<&StepKind>;

    /// Display label (`A`, `f`, `segment1`, ...).
    fn label(&self, id: ObjectId) -> String;

    /// Value of a boolean object without a defining step.
    fn boolean_value(&self, id: ObjectId) -> Option<bool>;

    /// Closed-form equation of a path (`x^2+y^2=4`), used for numerical objects.
    fn formula(&self, id: ObjectId) -> Option<String>;

    /// Objects whose defining step uses `id` directly.
    fn dependents(&self, id: ObjectId) -> Vec<ObjectId>;

    /// Every object of the construction, in construction order.
    fn objects(&self) -> Vec<ObjectId>;

    fn inputs(&self, id: ObjectId) -> Vec<ObjectId> {
        self.step(id).map(StepKind::inputs).unwrap_or_default()
    }

    /// Transitive predecessors of `id` (excluding `id`), breadth first.
    fn predecessors(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut seen = BTreeSet::from([id]);
        let mut queue = VecDeque::from([id]);
        let mut out = Vec::new();
        while let Some(current) = queue.pop_front() {
            for input in self.inputs(current) {
                if seen.insert(input) {
                    out.push(input);
                    queue.push_back(input);
                }
            }
        }
        out
    }

    /// Stable one-line description of an object and its definition.
    fn describe(&self, id: ObjectId) -> String {
        let kind = self
            .kind(id)
            .map(|k| k.to_string())
            .unwrap_or_else(|| "?".to_string());
        let definition = match self.step(id) {
            Some(step) => format!(
                "{}[{}]",
                step.name(),
                self.inputs(id)
                    .into_iter()
                    .map(|i| self.label(i))
                    .collect::<Vec<_>>()
                    .join(",")
            ),
            None => match self.boolean_value(id) {
                Some(value) => value.to_string(),
                None => "free".to_string(),
            },
        };
        let extra = match self.step(id) {
            Some(StepKind::Expression { text, .. }) => format!(" `{}`", text),
            Some(StepKind::RegularPolygon { n, .. }) => format!(" n={}", n),
            Some(StepKind::PolygonVertex { index, .. }) => format!(" index={}", index),
            _ => String::new(),
        };
        let formula = self
            .formula(id)
            .map(|f| format!(" : {}", f))
            .unwrap_or_default();
        format!("{} {} = {}{}{}", kind, self.label(id), definition, extra, formula)
    }

    /// Text that changes whenever the statement or one of its predecessors changes.
    fn fingerprint(&self, id: ObjectId) -> String {
        let mut objects = self.predecessors(id);
        objects.sort();
        objects.push(id);
        objects
            .into_iter()
            .map(|o| self.describe(o))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
