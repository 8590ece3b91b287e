//! Decision procedures and the prover front.
//!
//! [`Prover`] owns a [`ProverContext`] and answers proof requests over a
//! construction graph. Equational theses go through the
//! [`elimination`] procedure (with the [`dimension`] estimators as a
//! subroutine); order relations go through the [`realgeom`] path. Outcomes
//! are memoized per statement on the fingerprint of the statement and its
//! predecessors.
use std::collections::{BTreeSet, HashMap};

use log::{debug, info};
use parking_lot::Mutex;
use strum::{Display, EnumIs};

use crate::{
    base::ProverContext,
    construction::{ConstructionGraph, ObjectId},
    magic::CAS_PROBE,
    ndg::NdgCondition,
    statement::AlgebraicStatement,
    utils::error::{BotError, BotResult},
};

pub mod compare;
pub mod dimension;
pub mod elimination;
pub mod realgeom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ProofResult {
    True,
    False,
    /// True on some components of the construction, false on others.
    TrueOnComponents,
    /// True, but no readable set of NDG conditions was found.
    TrueNdgUnreadable,
    Unknown,
    /// The algebra services are not ready yet; ask again later.
    Processing,
}

impl ProofResult {
    /// Yes/no projection, `None` when there is no answer.
    pub fn yes_no(self) -> Option<bool> {
        match self {
            ProofResult::True | ProofResult::TrueNdgUnreadable | ProofResult::TrueOnComponents => {
                Some(true)
            }
            ProofResult::False => Some(false),
            ProofResult::Unknown | ProofResult::Processing => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofOutcome {
    pub result: ProofResult,
    pub ndgs: BTreeSet<NdgCondition>,
}

impl ProofOutcome {
    pub fn new(result: ProofResult) -> Self {
        Self {
            result,
            ndgs: BTreeSet::new(),
        }
    }

    pub fn with_ndgs(mut self, ndgs: impl IntoIterator<Item = NdgCondition>) -> Self {
        self.ndgs.extend(ndgs);
        self
    }
}

impl From<ProofResult> for ProofOutcome {
    fn from(result: ProofResult) -> Self {
        Self::new(result)
    }
}

/// What the caller wants to know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIs)]
pub enum ProofMode {
    /// The verdict and a readable set of NDG conditions.
    #[default]
    Details,
    /// Only the verdict.
    YesNo,
}

/// Bounded budget of backend rounds.
///
/// Permutation searches and simplification rounds draw their round index
/// from here, so the number of calls they make is known in advance.
#[derive(Debug, Clone)]
pub struct SearchBudget {
    next: usize,
    limit: usize,
}

impl SearchBudget {
    /// At least one round is always granted.
    pub fn new(limit: usize) -> Self {
        Self {
            next: 0,
            limit: limit.max(1),
        }
    }

    /// Index of the next round, `None` once the budget is spent.
    pub fn next_round(&mut self) -> Option<usize> {
        if self.next >= self.limit {
            return None;
        }
        self.next += 1;
        Some(self.next - 1)
    }

    /// Index for a re-check inside the current round. Always granted.
    pub fn follow_up(&mut self) -> usize {
        self.next += 1;
        self.next - 1
    }

    pub fn used(&self) -> usize {
        self.next
    }
}

/// State of a bounded search after one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    Continue,
    Done(ProofOutcome),
}

type MemoKey = (ObjectId, ProofMode, Option<ObjectId>);

pub struct Prover {
    ctx: ProverContext,
    memo: Mutex<HashMap<MemoKey, (String, ProofOutcome)>>,
    compare: compare::Compare,
}

impl Prover {
    pub fn new(ctx: ProverContext) -> Self {
        Self {
            ctx,
            memo: Mutex::new(HashMap::new()),
            compare: compare::Compare::new(),
        }
    }

    pub fn context(&self) -> &ProverContext {
        &self.ctx
    }

    /// Forget the encodings of redefined objects.
    pub fn invalidate(&self, objects: &[ObjectId]) {
        self.ctx.invalidate(objects);
    }

    /// Prove `statement` with NDG conditions.
    pub fn prove(&self, graph: &dyn ConstructionGraph, statement: ObjectId) -> ProofOutcome {
        self.prove_with(graph, statement, ProofMode::Details, None)
    }

    pub fn prove_yes_no(&self, graph: &dyn ConstructionGraph, statement: ObjectId) -> Option<bool> {
        self.prove_with(graph, statement, ProofMode::YesNo, None)
            .result
            .yes_no()
    }

    /// Prove `statement`. `moving_point`, when given, lies on a path known
    /// through its closed-form equation.
    ///
    /// Never fails: errors end as [`ProofResult::Unknown`], or as
    /// [`ProofResult::Processing`] when a service is not ready.
    pub fn prove_with(
        &self,
        graph: &dyn ConstructionGraph,
        statement: ObjectId,
        mode: ProofMode,
        moving_point: Option<ObjectId>,
    ) -> ProofOutcome {
        let fingerprint = graph.fingerprint(statement);
        let key = (statement, mode, moving_point);
        if let Some((known, outcome)) = self.memo.lock().get(&key) {
            if *known == fingerprint {
                debug!("Reusing the outcome of {}", graph.label(statement));
                return outcome.clone();
            }
        }

        let outcome = match self.attempt(graph, statement, mode, moving_point) {
            Ok(outcome) => outcome,
            Err(e) => {
                info!("Proof of {} failed: {}", graph.label(statement), e);
                ProofOutcome::new(e.proof_result())
            }
        };
        info!("{} is {}", graph.label(statement), outcome.result);
        if !outcome.result.is_processing() {
            self.memo.lock().insert(key, (fingerprint, outcome.clone()));
        }
        outcome
    }

    /// Relation between two lengths, as text; empty when nothing is known.
    pub fn compare(&self, graph: &dyn ConstructionGraph, lhs: ObjectId, rhs: ObjectId) -> String {
        self.compare.compare(&self.ctx, graph, lhs, rhs)
    }

    fn attempt(
        &self,
        graph: &dyn ConstructionGraph,
        statement: ObjectId,
        mode: ProofMode,
        moving_point: Option<ObjectId>,
    ) -> BotResult<ProofOutcome> {
        let is_statement = match graph.step(statement) {
            Some(step) => step.is_statement(),
            None => graph.boolean_value(statement).is_some(),
        };
        if !is_statement {
            info!("{} is not a statement", graph.label(statement));
            return Ok(ProofOutcome::new(ProofResult::Unknown));
        }
        self.check_cas()?;

        let mut st = AlgebraicStatement::build(&self.ctx, graph, statement, moving_point)?;
        if let Some(result) = st.result {
            debug!("Result known without elimination: {}", result);
            return Ok(ProofOutcome::new(result));
        }
        if st.thesis_inequality.is_some() {
            return realgeom::prove_inequality(&mut st, &self.ctx);
        }
        elimination::prove(&mut st, &self.ctx, mode)
    }

    fn check_cas(&self) -> BotResult<()> {
        let cas = &self.ctx.backends.cas;
        let (probe, expected) = CAS_PROBE;
        let ready = cas.is_loaded()
            && cas
                .evaluate(probe)
                .is_ok_and(|answer| answer.trim() == expected);
        if !ready {
            info!("CAS is not ready");
            return Err(BotError::BackendNotReady("cas".to_string()));
        }
        Ok(())
    }
}
