//! Backends replaying canned answers.
//!
//! Every request is recorded, so that callers can check how many round-trips
//! a proof needed and what was sent. Answers are taken from a queue; the
//! general evaluator also knows exact `input => output` pairs.
use std::{
    collections::{HashMap, VecDeque},
    sync::atomic::{AtomicBool, Ordering},
};

use parking_lot::Mutex;

use crate::{
    backend::{
        CasEvaluator, EliminationMode, EliminationRequest, EliminationService, RealGeomService,
        TarskiEvaluator,
    },
    magic::{CAS_FAILURE, CAS_PROBE},
    utils::error::{BotError, BotResult},
};

fn exhausted(backend: &str, request: &str) -> BotError {
    BotError::Backend {
        backend: backend.to_string(),
        message: format!("no scripted answer for `{}`", request),
    }
}

pub struct ScriptedCas {
    loaded: AtomicBool,
    answers: Mutex<HashMap<String, String>>,
    queue: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<String>>,
}

impl Default for ScriptedCas {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedCas {
    /// A loaded evaluator answering the readiness probe.
    pub fn new() -> Self {
        let cas = Self {
            loaded: AtomicBool::new(true),
            answers: Mutex::new(HashMap::new()),
            queue: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        };
        cas.answer(CAS_PROBE.0, CAS_PROBE.1);
        cas
    }

    pub fn set_loaded(&self, loaded: bool) {
        self.loaded.store(loaded, Ordering::Release);
    }

    /// Answer `output` whenever `input` is evaluated.
    pub fn answer(&self, input: &str, output: &str) {
        self.answers
            .lock()
            .insert(input.to_string(), output.to_string());
    }

    /// Answer `output` to the next input without an exact answer.
    pub fn push(&self, output: &str) {
        self.queue.lock().push_back(output.to_string());
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

impl CasEvaluator for ScriptedCas {
    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    fn evaluate(&self, input: &str) -> BotResult<String> {
        self.requests.lock().push(input.to_string());
        if let Some(output) = self.answers.lock().get(input) {
            return Ok(output.clone());
        }
        Ok(self
            .queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| CAS_FAILURE.to_string()))
    }
}

type Handler = Box<dyn Fn(&EliminationRequest) -> Option<String> + Send + Sync>;

pub struct ScriptedElimination {
    queues: Mutex<HashMap<EliminationMode, VecDeque<String>>>,
    handler: Option<Handler>,
    requests: Mutex<Vec<EliminationRequest>>,
    permutations: bool,
    transcendental_extension: bool,
}

impl Default for ScriptedElimination {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedElimination {
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            handler: None,
            requests: Mutex::new(Vec::new()),
            permutations: true,
            transcendental_extension: true,
        }
    }

    /// Compute answers that were not queued.
    pub fn with_handler(
        mut self,
        handler: impl Fn(&EliminationRequest) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    pub fn with_permutations(mut self, supported: bool) -> Self {
        self.permutations = supported;
        self
    }

    pub fn with_transcendental_extension(mut self, supported: bool) -> Self {
        self.transcendental_extension = supported;
        self
    }

    pub fn push(&self, mode: EliminationMode, answer: &str) {
        self.queues
            .lock()
            .entry(mode)
            .or_default()
            .push_back(answer.to_string());
    }

    pub fn requests(&self) -> Vec<EliminationRequest> {
        self.requests.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    fn reply(&self, request: &EliminationRequest) -> BotResult<String> {
        self.requests.lock().push(request.clone());
        let queued = self
            .queues
            .lock()
            .get_mut(&request.mode)
            .and_then(VecDeque::pop_front);
        queued
            .or_else(|| self.handler.as_ref().and_then(|h| h(request)))
            .ok_or_else(|| exhausted("scripted elimination", &request.render()))
    }
}

impl EliminationService for ScriptedElimination {
    fn name(&self) -> &str {
        "scripted elimination"
    }

    fn eliminate(&self, request: &EliminationRequest) -> BotResult<String> {
        self.reply(request)
    }

    fn solvable(&self, request: &EliminationRequest) -> BotResult<String> {
        self.reply(request)
    }

    fn groebner_initials(&self, request: &EliminationRequest) -> BotResult<String> {
        self.reply(request)
    }

    fn supports_permutations(&self) -> bool {
        self.permutations
    }

    fn supports_transcendental_extension(&self) -> bool {
        self.transcendental_extension
    }
}

pub struct ScriptedRealGeom {
    available: AtomicBool,
    cas: String,
    queue: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<(String, String)>>,
}

impl ScriptedRealGeom {
    pub fn new(cas: &str) -> Self {
        Self {
            available: AtomicBool::new(true),
            cas: cas.to_string(),
            queue: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Release);
    }

    pub fn push(&self, answer: &str) {
        self.queue.lock().push_back(answer.to_string());
    }

    /// Recorded `(command, parameters)` pairs.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().clone()
    }
}

impl RealGeomService for ScriptedRealGeom {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::Acquire)
    }

    fn cas(&self) -> String {
        self.cas.clone()
    }

    fn direct_command(&self, command: &str, parameters: &str) -> BotResult<String> {
        self.requests
            .lock()
            .push((command.to_string(), parameters.to_string()));
        self.queue
            .lock()
            .pop_front()
            .ok_or_else(|| exhausted("scripted realgeom", command))
    }
}

#[derive(Default)]
pub struct ScriptedTarski {
    queue: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTarski {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, answer: &str) {
        self.queue.lock().push_back(answer.to_string());
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

impl TarskiEvaluator for ScriptedTarski {
    fn eval(&self, program: &str) -> BotResult<String> {
        self.requests.lock().push(program.to_string());
        self.queue
            .lock()
            .pop_front()
            .ok_or_else(|| exhausted("scripted tarski", program))
    }
}
