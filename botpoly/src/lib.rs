//! Polynomial and variable model for Botana-style geometry encodings.
//!
//! Every scalar unknown of a construction (a point coordinate, a slider value,
//! an auxiliary helper) is a [`Variable`]. Geometric facts become
//! [`Polynomial`]s over those variables with arbitrary precision integer
//! coefficients. The crate is intentionally small:
//!
//! - [`variable`]: typed variable identifiers and the allocating pool;
//! - [`polynomial`]: sparse polynomials, ring operations and substitution;
//! - [`geometry`]: the classic Botana building blocks (collinearity,
//!   equidistance, midpoints, ...);
//! - [`parser`]: parsers for the textual answers returned by algebra
//!   services (polynomials, factor branches, Groebner initials).
//!
//! The canonical text of a polynomial is its [`std::fmt::Display`] rendering.
//! Two polynomials are equal if and only if their canonical texts are equal.

pub mod fmt;
pub mod geometry;
#[cfg(feature = "chumsky")]
pub mod parser;
pub mod polynomial;
pub mod utils;
pub mod variable;

pub use polynomial::{Monomial, Polynomial};
pub use utils::Error;
pub use variable::{Variable, VariablePool};
