//! Contracts of the external algebra services.
//!
//! The prover never computes Groebner bases or performs quantifier
//! elimination itself. It talks to four services:
//!
//! - a general algebra evaluator ([`CasEvaluator`]) answering textual
//!   expressions, `?` meaning "could not evaluate";
//! - an elimination service ([`EliminationService`]) returning factor
//!   branches, solvability verdicts or Groebner initials;
//! - a real geometry service ([`RealGeomService`]) taking ampersand
//!   delimited parameter strings;
//! - a Tarski evaluator ([`TarskiEvaluator`]) used for negate-and-simplify
//!   rounds and by the local replacement of the real geometry service.
//!
//! All calls are synchronous round-trips.
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use botpoly::{Polynomial, Variable, fmt::join};
use strum::{Display, EnumIs};

use crate::utils::error::BotResult;

pub mod local;
pub mod params;
pub mod scripted;
pub mod webservice;

pub trait CasEvaluator: Send + Sync {
    /// False while the evaluator is still starting up.
    fn is_loaded(&self) -> bool;

    fn evaluate(&self, input: &str) -> BotResult<String>;
}

/// Flavour of an elimination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
pub enum EliminationMode {
    /// Eliminate the dependent variables and factor the result.
    Eliminate,
    /// Decide whether the system has a solution.
    Solvable,
    /// Leading term variables of a Groebner basis.
    Initials,
}

/// One request to the elimination service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EliminationRequest {
    pub mode: EliminationMode,
    pub polynomials: Vec<Polynomial>,
    /// Variables fixed to integer values before elimination.
    pub substitutions: BTreeMap<Variable, i64>,
    /// Variables kept by the elimination; all others are eliminated.
    pub free_variables: BTreeSet<Variable>,
    /// Index of the variable permutation to use.
    pub permutation: usize,
    /// Work over a transcendental extension of the rationals (solvability only).
    pub transcendental_extension: bool,
}

impl EliminationRequest {
    pub fn new(mode: EliminationMode, polynomials: Vec<Polynomial>) -> Self {
        Self {
            mode,
            polynomials,
            substitutions: BTreeMap::new(),
            free_variables: BTreeSet::new(),
            permutation: 0,
            transcendental_extension: false,
        }
    }

    /// Variables that are eliminated: every variable of the polynomials that
    /// is neither kept nor substituted.
    pub fn eliminated_variables(&self) -> BTreeSet<Variable> {
        self.polynomials
            .iter()
            .flat_map(|p| p.variables())
            .filter(|v| !self.free_variables.contains(v) && !self.substitutions.contains_key(v))
            .collect()
    }

    /// Stable single-line rendering, used for logging and scripted replay.
    pub fn render(&self) -> String {
        format!(
            "{}[polys=[{}];subs=[{}];free=[{}];elim=[{}];perm={}]",
            self.mode,
            join(&self.polynomials, ","),
            join(
                self.substitutions.iter().map(|(v, c)| format!("{}={}", v, c)),
                ","
            ),
            join(&self.free_variables, ","),
            join(self.eliminated_variables(), ","),
            self.permutation
        )
    }
}

pub trait EliminationService: Send + Sync {
    fn name(&self) -> &str {
        "elimination"
    }

    /// Factor branches of the elimination ideal, as `[[f,g],[h]]`.
    fn eliminate(&self, request: &EliminationRequest) -> BotResult<String>;

    /// `true`, `false` or `?`.
    fn solvable(&self, request: &EliminationRequest) -> BotResult<String>;

    /// Groebner initials, as `{{v1,v2},{v3}}`.
    fn groebner_initials(&self, request: &EliminationRequest) -> BotResult<String>;

    fn supports_permutations(&self) -> bool {
        true
    }

    fn supports_transcendental_extension(&self) -> bool {
        true
    }
}

pub trait RealGeomService: Send + Sync {
    fn is_available(&self) -> bool;

    /// Name of the algebra system used by the service (`tarski`, `qepcad`, `mathematica`).
    fn cas(&self) -> String;

    /// Send `command` with ampersand delimited `parameters`.
    fn direct_command(&self, command: &str, parameters: &str) -> BotResult<String>;
}

pub trait TarskiEvaluator: Send + Sync {
    fn eval(&self, program: &str) -> BotResult<String>;
}

/// The services available to a prover context.
#[derive(Clone)]
pub struct Backends {
    pub cas: Arc<dyn CasEvaluator>,
    pub elimination: Arc<dyn EliminationService>,
    pub realgeom: Option<Arc<dyn RealGeomService>>,
    pub tarski: Option<Arc<dyn TarskiEvaluator>>,
}

impl Backends {
    pub fn new(cas: Arc<dyn CasEvaluator>, elimination: Arc<dyn EliminationService>) -> Self {
        Self {
            cas,
            elimination,
            realgeom: None,
            tarski: None,
        }
    }

    pub fn with_realgeom(mut self, realgeom: Arc<dyn RealGeomService>) -> Self {
        self.realgeom = Some(realgeom);
        self
    }

    pub fn with_tarski(mut self, tarski: Arc<dyn TarskiEvaluator>) -> Self {
        self.tarski = Some(tarski);
        self
    }

    /// Remote real geometry service, if it is reachable.
    pub fn available_realgeom(&self) -> Option<&Arc<dyn RealGeomService>> {
        self.realgeom.as_ref().filter(|rg| rg.is_available())
    }
}

/// Replace the error sentinels of the real geometry services by the empty answer.
pub fn strip_sentinels(answer: &str) -> &str {
    if crate::magic::REALGEOM_ERROR_SENTINELS.contains(&answer.trim()) {
        ""
    } else {
        answer
    }
}

/// Unwrap one line of Tarski output: `[formula]:type` becomes `formula`,
/// errors (`...:err`) become empty.
pub fn tarski_output(line: &str) -> String {
    if line.ends_with(":err") {
        return String::new();
    }
    match line.find(':') {
        Some(colon) => {
            let content = &line[..colon];
            match content.strip_prefix(|c: char| c == '[' || c == '"') {
                Some(inner) => {
                    let mut chars = inner.chars();
                    chars.next_back();
                    chars.as_str().to_string()
                }
                None => content.to_string(),
            }
        }
        None => String::new(),
    }
}

/// Drop `length` characters at both ends, if the text is long enough.
pub fn remove_head_tail(input: &str, length: usize) -> &str {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    if chars.len() < 2 * length {
        return input;
    }
    let start = chars.get(length).map(|(i, _)| *i).unwrap_or(input.len());
    let end = chars
        .get(chars.len() - length)
        .map(|(i, _)| *i)
        .unwrap_or(input.len());
    &input[start..end.max(start)]
}
