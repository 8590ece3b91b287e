//! Canonical text rendering.
//!
//! The rendering is the form understood by the elimination services:
//! `v1*v4-v2*v3+1`. Terms appear in descending monomial order, unit
//! coefficients are elided and powers use `^`.
use std::fmt::{Display, Formatter, Result};

use num_traits::{One, Signed};

use crate::polynomial::{Monomial, Polynomial};

impl Display for Monomial {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.is_one() {
            return write!(f, "1");
        }
        for (idx, (v, e)) in self.powers().enumerate() {
            if idx > 0 {
                write!(f, "*")?;
            }
            match e {
                1 => write!(f, "{}", v)?,
                _ => write!(f, "{}^{}", v, e)?,
            }
        }
        Ok(())
    }
}

impl Display for Polynomial {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        for (idx, (m, c)) in self.terms().enumerate() {
            let magnitude = c.abs();
            match (idx, c.is_negative()) {
                (0, true) => write!(f, "-")?,
                (0, false) => {}
                (_, true) => write!(f, "-")?,
                (_, false) => write!(f, "+")?,
            }
            match (m.is_one(), magnitude.is_one()) {
                (true, _) => write!(f, "{}", magnitude)?,
                (false, true) => write!(f, "{}", m)?,
                (false, false) => write!(f, "{}*{}", magnitude, m)?,
            }
        }
        Ok(())
    }
}

/// Render a list of polynomials as `a,b,c`, the shape used in service requests.
pub fn join(polys: impl IntoIterator<Item = impl Display>, separator: &str) -> String {
    polys
        .into_iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(separator)
}
