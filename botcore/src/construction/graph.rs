//! In-memory construction graph.
//!
//! Objects are stored in insertion order; the dependency structure lives in a
//! petgraph [`DiGraphMap`] with an edge from every input to the objects that
//! use it. Redefining an object reports every object whose cached encoding
//! must be invalidated.
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use log::debug;
use petgraph::{Direction, prelude::DiGraphMap};

use crate::{
    construction::{ConstructionGraph, ObjectId, ObjectKind, StepKind},
    utils::error::{BotError, BotResult},
};

#[derive(Debug, Clone)]
struct ObjectData {
    kind: ObjectKind,
    label: String,
    step: Option<StepKind>,
    value: Option<bool>,
    formula: Option<String>,
}

/// Construction built step by step.
#[derive(Debug, Default, Clone)]
pub struct Construction {
    objects: BTreeMap<ObjectId, ObjectData>,
    dag: DiGraphMap<ObjectId, ()>,
    next_id: u32,
}

impl Construction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object; every input of `step` must already exist.
    pub fn add(
        &mut self,
        label: impl Into<String>,
        kind: ObjectKind,
        step: Option<StepKind>,
    ) -> BotResult<ObjectId> {
        if let Some(step) = &step {
            if let Some(missing) = step.inputs().into_iter().find(|i| !self.objects.contains_key(i)) {
                return Err(BotError::MissingObject(missing));
            }
        }

        self.next_id += 1;
        let id = ObjectId(self.next_id);
        let label = label.into();
        debug!("Adding {} {} as {}", kind, label, id);

        self.dag.add_node(id);
        if let Some(step) = &step {
            for input in step.inputs() {
                self.dag.add_edge(input, id, ());
            }
        }
        self.objects.insert(
            id,
            ObjectData {
                kind,
                label,
                step,
                value: None,
                formula: None,
            },
        );
        Ok(id)
    }

    pub fn free_point(&mut self, label: &str) -> ObjectId {
        self.insert_free(label, ObjectKind::Point)
    }

    /// Free number (slider).
    pub fn number(&mut self, label: &str) -> ObjectId {
        self.insert_free(label, ObjectKind::Numeric)
    }

    /// Boolean constant, used as a trivial statement.
    pub fn boolean(&mut self, label: &str, value: bool) -> ObjectId {
        let id = self.insert_free(label, ObjectKind::Boolean);
        if let Some(data) = self.objects.get_mut(&id) {
            data.value = Some(value);
        }
        id
    }

    /// Curve given by its closed-form equation, such as `x^2+y^2=4`.
    pub fn curve(&mut self, label: &str, formula: &str) -> ObjectId {
        let id = self.insert_free(label, ObjectKind::Curve);
        if let Some(data) = self.objects.get_mut(&id) {
            data.formula = Some(formula.to_string());
        }
        id
    }

    fn insert_free(&mut self, label: &str, kind: ObjectKind) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        debug!("Adding free {} {} as {}", kind, label, id);
        self.dag.add_node(id);
        self.objects.insert(
            id,
            ObjectData {
                kind,
                label: label.to_string(),
                step: None,
                value: None,
                formula: None,
            },
        );
        id
    }

    /// Attach a closed-form equation to an existing path.
    pub fn set_formula(&mut self, id: ObjectId, formula: &str) -> BotResult<()> {
        let data = self.objects.get_mut(&id).ok_or(BotError::MissingObject(id))?;
        data.formula = Some(formula.to_string());
        Ok(())
    }

    /// Replace the definition of `id`. Returns `id` and all its transitive
    /// dependents, whose encodings are stale from now on.
    pub fn redefine(&mut self, id: ObjectId, step: Option<StepKind>) -> BotResult<Vec<ObjectId>> {
        if !self.objects.contains_key(&id) {
            return Err(BotError::MissingObject(id));
        }
        if let Some(step) = &step {
            for input in step.inputs() {
                if !self.objects.contains_key(&input) {
                    return Err(BotError::MissingObject(input));
                }
                if input == id || self.descendants(id).contains(&input) {
                    return Err(BotError::Unknown(format!(
                        "redefining {} over {} would create a cycle",
                        id, input
                    )));
                }
            }
        }

        let old_inputs: Vec<_> = self
            .dag
            .neighbors_directed(id, Direction::Incoming)
            .collect();
        for input in old_inputs {
            self.dag.remove_edge(input, id);
        }
        if let Some(step) = &step {
            for input in step.inputs() {
                self.dag.add_edge(input, id, ());
            }
        }
        if let Some(data) = self.objects.get_mut(&id) {
            data.step = step;
        }

        let mut stale = vec![id];
        stale.extend(self.descendants(id));
        Ok(stale)
    }

    fn descendants(&self, id: ObjectId) -> BTreeSet<ObjectId> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            for next in self.dag.neighbors_directed(current, Direction::Outgoing) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    pub fn by_label(&self, label: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, data)| data.label == label)
            .map(|(id, _)| *id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl ConstructionGraph for Construction {
    fn kind(&self, id: ObjectId) -> Option<ObjectKind> {
        self.objects.get(&id).map(|d| d.kind)
    }

    fn step(&self, id: ObjectId) -> Option<&StepKind> {
        self.objects.get(&id).and_then(|d| d.step.as_ref())
    }

    fn label(&self, id: ObjectId) -> String {
        self.objects
            .get(&id)
            .map(|d| d.label.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn boolean_value(&self, id: ObjectId) -> Option<bool> {
        self.objects.get(&id).and_then(|d| d.value)
    }

    fn formula(&self, id: ObjectId) -> Option<String> {
        self.objects.get(&id).and_then(|d| d.formula.clone())
    }

    fn dependents(&self, id: ObjectId) -> Vec<ObjectId> {
        if !self.dag.contains_node(id) {
            return vec![];
        }
        let mut out: Vec<_> = self
            .dag
            .neighbors_directed(id, Direction::Outgoing)
            .collect();
        out.sort();
        out
    }

    fn objects(&self) -> Vec<ObjectId> {
        self.objects.keys().copied().collect()
    }
}

/// Shorthands for the usual construction steps.
impl Construction {
    pub fn midpoint(&mut self, label: &str, a: ObjectId, b: ObjectId) -> BotResult<ObjectId> {
        self.add(label, ObjectKind::Point, Some(StepKind::Midpoint { a, b }))
    }

    pub fn line(&mut self, label: &str, a: ObjectId, b: ObjectId) -> BotResult<ObjectId> {
        self.add(label, ObjectKind::Line, Some(StepKind::LineThroughPoints { a, b }))
    }

    pub fn segment(&mut self, label: &str, a: ObjectId, b: ObjectId) -> BotResult<ObjectId> {
        self.add(label, ObjectKind::Segment, Some(StepKind::Segment { a, b }))
    }

    pub fn perpendicular_bisector(
        &mut self,
        label: &str,
        a: ObjectId,
        b: ObjectId,
    ) -> BotResult<ObjectId> {
        self.add(
            label,
            ObjectKind::Line,
            Some(StepKind::PerpendicularBisector { a, b }),
        )
    }

    pub fn intersect(&mut self, label: &str, a: ObjectId, b: ObjectId) -> BotResult<ObjectId> {
        self.add(label, ObjectKind::Point, Some(StepKind::IntersectLines { a, b }))
    }

    pub fn circle(&mut self, label: &str, center: ObjectId, through: ObjectId) -> BotResult<ObjectId> {
        self.add(
            label,
            ObjectKind::Circle,
            Some(StepKind::CircleCenterPoint { center, through }),
        )
    }

    pub fn point_on(&mut self, label: &str, path: ObjectId) -> BotResult<ObjectId> {
        self.add(label, ObjectKind::Point, Some(StepKind::PointOnPath { path }))
    }

    /// Add a statement object defined by `step`.
    pub fn statement(&mut self, label: &str, step: StepKind) -> BotResult<ObjectId> {
        self.add(label, ObjectKind::Boolean, Some(step))
    }
}
