//! Variables of the polynomial ring.
//!
//! A variable is an opaque, totally ordered identifier. Its canonical text is
//! `v<id>` which is also what algebra services read and write back.
use std::{
    str::FromStr,
    sync::atomic::{AtomicU32, Ordering},
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::utils::Error;

/// Scalar unknown of a Botana encoding.
///
/// Identifiers are allocated by a [`VariablePool`] and are never reused
/// within one pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Variable(pub u32);

impl Variable {
    /// Returns the raw identifier.
    pub fn id(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if f.alternate() {
            write!(f, "v_{{{}}}", self.0)
        } else {
            write!(f, "v{}", self.0)
        }
    }
}

impl FromStr for Variable {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('v')
            .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|digits| digits.parse().ok())
            .map(Variable)
            .ok_or_else(|| Error::UnknownIdentifier {
                name: s.to_string(),
            })
    }
}

/// Monotonic, thread-safe allocator of fresh variables.
///
/// The first variable handed out is `v1`.
#[derive(Debug)]
pub struct VariablePool {
    next: AtomicU32,
}

impl Default for VariablePool {
    fn default() -> Self {
        Self::new()
    }
}

impl VariablePool {
    pub const fn new() -> Self {
        Self {
            next: AtomicU32::new(1),
        }
    }

    /// Allocate one fresh variable.
    pub fn fresh(&self) -> Variable {
        Variable(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Allocate the two coordinates of a point.
    pub fn fresh_pair(&self) -> [Variable; 2] {
        [self.fresh(), self.fresh()]
    }

    /// Number of variables handed out so far.
    pub fn allocated(&self) -> u32 {
        self.next.load(Ordering::Relaxed) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variables_render_and_parse_back() {
        let v = Variable(42);
        assert_eq!(v.to_string(), "v42");
        assert_eq!(format!("{v:#}"), "v_{42}");
        assert_eq!("v42".parse::<Variable>(), Ok(v));
        assert!("x".parse::<Variable>().is_err());
        assert!("v".parse::<Variable>().is_err());
        assert!("v1a".parse::<Variable>().is_err());
    }

    #[test]
    fn pool_is_monotonic() {
        let pool = VariablePool::new();
        let [a, b] = pool.fresh_pair();
        let c = pool.fresh();
        assert!(a < b && b < c);
        assert_eq!(pool.allocated(), 3);
    }
}
