//! Local replacement of the real geometry service.
//!
//! Proves an inequality over the hypotheses with a single Tarski call: the
//! first coordinates are fixed to `(0,0)` and `(1,0)`, every hypothesis, side
//! condition and the negated thesis are conjoined, and the dependent
//! variables are existentially quantified. The answer `false` means that the
//! thesis cannot fail.
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use botpoly::parser::parse_polynomial;
use log::debug;

use crate::{
    backend::{RealGeomService, TarskiEvaluator, params::RealGeomParameters, tarski_output},
    magic::{LOCAL_QE_FIXCOORDS, REALGEOM_COMMAND},
    utils::{
        error::{BotError, BotResult},
        text::{identifiers, replace_identifiers, to_tarski},
    },
};

/// Tarski definitions of `process`, `expand` and `epc` (expand, process,
/// combine). `epc` takes a prenex formula whose only free variable is `m` and
/// returns a quantifier-free equivalent.
pub const EPC_DEFINITION: &str = concat!(
    "(def process (lambda (F) (def L (getargs F)) (def V (get L 0 0 1)) (def B (bbwb (get L 1)))",
    " (if (equal? (get B 0) 'UNSAT) [false] ((lambda () (def G (qfr (t-ex V (get B 1))))",
    " (if (equal? (t-type G) 1) G (if (equal? (t-type G) 6) (qepcad-api-call G 'T)",
    " (if (equal? (t-type G) 5) (qepcad-api-call (bin-reduce t-or (map (lambda (H) (qepcad-api-call",
    " (exclose H '(m)) 'T)) (getargs G))) 'T) (qepcad-api-call G 'T))))))))) ",
    "(def expand (lambda (F)",
    "      (def A (getargs F))",
    "      (def V (get A 0 0 1))",
    "      (def G (get A 1))",
    "      (def X (dnf G))",
    "      (def L (if (equal? (t-type X) 5) (getargs X) (list X)))",
    "      (map (lambda (f) (exclose f '(m))) L) ))",
    "(def epc (lambda (F) (normalize (bin-reduce t-or (map (lambda (G) (if (equal? (t-type G) 6) (process G) G)) (expand F))))))",
);

/// Values given to the first fixed coordinates: `(0,0)` and `(1,0)`.
const LOCAL_FIX_VALUES: [&str; 4] = ["0", "0", "1", "0"];

/// Conjunction of Tarski formulas, every member in parentheses.
#[derive(Debug, Default)]
struct Conjunction(Vec<String>);

impl Conjunction {
    fn push(&mut self, formula: &str) {
        if formula.is_empty() {
            return;
        }
        self.0.push(format!("({})", to_tarski(formula)));
    }

    fn render(&self) -> String {
        self.0.join(" /\\ ")
    }
}

/// Simplify a polynomial text when it only mentions `v<id>` variables.
fn normalize_polynomial(text: &str) -> String {
    match parse_polynomial(text) {
        Ok(p) => p.to_string(),
        Err(_) => text.to_string(),
    }
}

pub struct LocalRealGeom {
    tarski: Arc<dyn TarskiEvaluator>,
    max_fixcoords: usize,
}

impl LocalRealGeom {
    pub fn new(tarski: Arc<dyn TarskiEvaluator>) -> Self {
        Self {
            tarski,
            max_fixcoords: LOCAL_QE_FIXCOORDS,
        }
    }

    /// Coordinates fixed by [`RealGeomService::direct_command`].
    pub fn with_max_fixcoords(mut self, max_fixcoords: usize) -> Self {
        self.max_fixcoords = max_fixcoords;
        self
    }

    /// Tarski program deciding the package, or `None` when the thesis is
    /// trivially `true`.
    pub fn program(&self, params: &RealGeomParameters, max_fixcoords: usize) -> Option<String> {
        let substitutions: BTreeMap<String, &str> = params
            .list("vars")
            .into_iter()
            .take(max_fixcoords)
            .zip(LOCAL_FIX_VALUES)
            .collect();
        debug!("Local QE substitutions: {:?}", substitutions);
        let substitute = |text: &str| {
            replace_identifiers(text, |name| substitutions.get(name).map(|v| v.to_string()))
        };

        let polys: Vec<String> = params
            .list("polys")
            .iter()
            .map(|p| normalize_polynomial(&substitute(p)))
            .filter(|p| p != "0")
            .collect();
        let ineqs: Vec<String> = params.list("ineqs").iter().map(|ie| substitute(ie)).collect();
        let ineq = substitute(&params.get("ineq"));
        if ineq == "true" {
            return None;
        }

        let mut vars = BTreeSet::new();
        let mut formulas = Conjunction::default();
        for poly in &polys {
            vars.extend(identifiers(poly));
        }
        for pos in params.list("posvariables") {
            formulas.push(&format!("{}>0", pos));
            vars.insert(pos);
        }
        vars.extend(identifiers(&ineq));
        for ie in &ineqs {
            vars.extend(identifiers(ie));
            formulas.push(ie);
        }
        formulas.push(&format!("~({})", ineq));
        for poly in &polys {
            formulas.push(&format!("{}=0", poly));
        }

        let vars = vars.into_iter().collect::<Vec<_>>().join(",");
        Some(format!(
            "{} (epc [ex {} [{}]])",
            EPC_DEFINITION,
            vars,
            formulas.render()
        ))
    }

    /// Decide the package. `false` means that the thesis always holds.
    pub fn prove(&self, params: &RealGeomParameters, max_fixcoords: usize) -> BotResult<String> {
        let Some(program) = self.program(params, max_fixcoords) else {
            return Ok("false".to_string());
        };
        let output = self.tarski.eval(&program)?;
        debug!("Local QE answer: {}", output);
        if output.contains('\n') {
            let last = output.lines().filter(|l| !l.trim().is_empty()).last().unwrap_or("");
            Ok(tarski_output(last))
        } else {
            Ok(output.trim().to_string())
        }
    }
}

impl RealGeomService for LocalRealGeom {
    fn is_available(&self) -> bool {
        true
    }

    fn cas(&self) -> String {
        "tarski".to_string()
    }

    fn direct_command(&self, command: &str, parameters: &str) -> BotResult<String> {
        let params = RealGeomParameters::parse(parameters);
        if command != REALGEOM_COMMAND || params.get("mode") != "prove" {
            return Err(BotError::Backend {
                backend: "local realgeom".to_string(),
                message: format!("unsupported request `{}` ({})", command, params.get("mode")),
            });
        }
        self.prove(&params, self.max_fixcoords)
    }
}
