#![allow(dead_code)]

use std::sync::Arc;

use botcore::{
    backend::{
        Backends,
        scripted::{ScriptedCas, ScriptedElimination, ScriptedRealGeom, ScriptedTarski},
    },
    base::{ProverContext, settings::ProverSettings},
    construction::{ObjectId, graph::Construction},
    provers::Prover,
};

pub struct Harness {
    pub cas: Arc<ScriptedCas>,
    pub elimination: Arc<ScriptedElimination>,
    pub realgeom: Option<Arc<ScriptedRealGeom>>,
    pub tarski: Arc<ScriptedTarski>,
    pub prover: Prover,
}

impl Harness {
    pub fn new(settings: ProverSettings) -> Self {
        Self::build(settings, ScriptedElimination::new(), None)
    }

    pub fn with_elimination(settings: ProverSettings, elimination: ScriptedElimination) -> Self {
        Self::build(settings, elimination, None)
    }

    pub fn with_realgeom(settings: ProverSettings, cas: &str) -> Self {
        Self::build(
            settings,
            ScriptedElimination::new(),
            Some(Arc::new(ScriptedRealGeom::new(cas))),
        )
    }

    fn build(
        settings: ProverSettings,
        elimination: ScriptedElimination,
        realgeom: Option<Arc<ScriptedRealGeom>>,
    ) -> Self {
        let cas = Arc::new(ScriptedCas::new());
        let elimination = Arc::new(elimination);
        let tarski = Arc::new(ScriptedTarski::new());
        let mut backends =
            Backends::new(cas.clone(), elimination.clone()).with_tarski(tarski.clone());
        if let Some(realgeom) = &realgeom {
            backends = backends.with_realgeom(realgeom.clone());
        }
        Self {
            cas,
            elimination,
            realgeom,
            tarski,
            prover: Prover::new(ProverContext::new(settings, backends)),
        }
    }
}

/// Free points `A`, `B`, `C`, encoded over `v1..v6` when proved first.
pub fn triangle(cons: &mut Construction) -> [ObjectId; 3] {
    [cons.free_point("A"), cons.free_point("B"), cons.free_point("C")]
}
