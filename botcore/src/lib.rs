//! Botana-method prover core.
//!
//! The crate turns a construction graph (points, lines, circles, polygons and
//! the statements relating them) into polynomial systems and decides the
//! statements with the help of external algebra services. Embedders usually
//! build a [`base::ProverContext`], wrap it in a [`provers::Prover`] and call
//! [`provers::Prover::prove`].
//!
//! Layout:
//! - [`construction`]: the graph contract, a petgraph backed reference graph,
//!   the per-object Botana encoder and its cache;
//! - [`statement`]: hypothesis collection, non-degeneracy injection, thesis
//!   construction and coordinate fixation;
//! - [`ndg`]: readable non-degeneracy conditions and their detection;
//! - [`provers`]: the elimination decision procedure, the Hilbert dimension
//!   estimators and the real geometry path;
//! - [`backend`]: contracts of the algebra services and their clients.

pub mod backend;
pub mod base;
pub mod construction;
pub mod magic;
pub mod ndg;
pub mod provers;
pub mod statement;
pub mod utils;
