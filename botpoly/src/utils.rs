use strum::{EnumIs, EnumTryAs};
use thiserror::Error;

/// Errors raised while building or reading polynomials.
///
/// These mostly surface when an algebra service answers with text that does
/// not fit the expected polynomial grammar, or names a variable that the
/// caller cannot resolve.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs, Error)]
pub enum Error {
    /// An identifier appeared in polynomial text but the resolver does not know it.
    #[error(
        "Unknown identifier `{name}` in polynomial text. Only identifiers bound by the caller (by default `v<id>`) may appear in a polynomial."
    )]
    UnknownIdentifier { name: String },

    /// Generic parse failure, carrying the rendered diagnostics.
    #[error("Failed to parse `{input}`: {message}")]
    ParseFailure { input: String, message: String },

    /// A polynomial was expected to be a single variable (Groebner initials, kept variables).
    #[error("The polynomial `{polynomial}` is not a single variable.")]
    NotAVariable { polynomial: String },
}
