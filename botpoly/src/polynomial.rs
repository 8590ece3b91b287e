//! Sparse multivariate polynomials over the integers.
//!
//! A [`Polynomial`] maps [`Monomial`]s to non-zero [`BigInt`] coefficients.
//! Monomials are ordered by total degree first and then lexicographically
//! with `v1 > v2 > ...`, so the last entry of the underlying map is the
//! leading term. The representation is kept canonical at all times (no zero
//! coefficients, no zero exponents), which makes structural equality and
//! canonical text equality coincide.
use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    iter::{Product, Sum},
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
};

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::variable::Variable;

/// Power product of variables, stored as `(variable, exponent)` pairs sorted by variable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Monomial(SmallVec<[(Variable, u32); 4]>);

impl Monomial {
    /// The empty power product.
    pub fn one() -> Self {
        Self(SmallVec::new())
    }

    pub fn var(v: Variable) -> Self {
        Self(smallvec::smallvec![(v, 1)])
    }

    /// Build a monomial from arbitrary `(variable, exponent)` pairs. Repeated
    /// variables are merged and zero exponents dropped.
    pub fn from_powers(powers: impl IntoIterator<Item = (Variable, u32)>) -> Self {
        let mut merged: BTreeMap<Variable, u32> = BTreeMap::new();
        for (v, e) in powers {
            *merged.entry(v).or_default() += e;
        }
        Self(merged.into_iter().filter(|(_, e)| *e != 0).collect())
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    /// Total degree.
    pub fn degree(&self) -> u32 {
        self.0.iter().map(|(_, e)| e).sum()
    }

    /// Exponent of `v` in this monomial (zero when absent).
    pub fn exponent(&self, v: Variable) -> u32 {
        self.0
            .binary_search_by(|(w, _)| w.cmp(&v))
            .map(|idx| self.0[idx].1)
            .unwrap_or(0)
    }

    pub fn powers(&self) -> impl Iterator<Item = (Variable, u32)> + '_ {
        self.0.iter().copied()
    }

    pub fn variables(&self) -> impl Iterator<Item = Variable> + '_ {
        self.0.iter().map(|(v, _)| *v)
    }

    /// Product of two monomials.
    pub fn mul(&self, other: &Monomial) -> Monomial {
        let mut out = SmallVec::with_capacity(self.0.len() + other.0.len());
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            let (a, b) = (self.0[i], other.0[j]);
            match a.0.cmp(&b.0) {
                Ordering::Less => {
                    out.push(a);
                    i += 1;
                }
                Ordering::Greater => {
                    out.push(b);
                    j += 1;
                }
                Ordering::Equal => {
                    out.push((a.0, a.1 + b.1));
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend_from_slice(&self.0[i..]);
        out.extend_from_slice(&other.0[j..]);
        Monomial(out)
    }

    /// Split the monomial into the part over variables accepted by `pred` and the rest.
    fn partition(&self, mut pred: impl FnMut(Variable) -> bool) -> (Monomial, Monomial) {
        let (a, b): (SmallVec<_>, SmallVec<_>) = self.0.iter().copied().partition(|(v, _)| pred(*v));
        (Monomial(a), Monomial(b))
    }
}

impl Ord for Monomial {
    fn cmp(&self, other: &Self) -> Ordering {
        self.degree().cmp(&other.degree()).then_with(|| {
            for (a, b) in self.0.iter().zip(other.0.iter()) {
                if a.0 != b.0 {
                    // The monomial holding the smaller variable id is the larger one.
                    return b.0.cmp(&a.0);
                }
                if a.1 != b.1 {
                    return a.1.cmp(&b.1);
                }
            }
            self.0.len().cmp(&other.0.len())
        })
    }
}

impl PartialOrd for Monomial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Element of ℤ[v1, v2, ...].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polynomial {
    terms: BTreeMap<Monomial, BigInt>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::constant(1)
    }

    pub fn constant(c: impl Into<BigInt>) -> Self {
        Self::term(c, Monomial::one())
    }

    pub fn var(v: Variable) -> Self {
        Self::term(1, Monomial::var(v))
    }

    /// Single term `c * m`.
    pub fn term(c: impl Into<BigInt>, m: Monomial) -> Self {
        let mut p = Self::zero();
        p.add_term(m, c.into());
        p
    }

    /// Build a polynomial from terms, combining like monomials.
    pub fn from_terms(terms: impl IntoIterator<Item = (Monomial, BigInt)>) -> Self {
        let mut p = Self::zero();
        for (m, c) in terms {
            p.add_term(m, c);
        }
        p
    }

    fn add_term(&mut self, m: Monomial, c: BigInt) {
        if c.is_zero() {
            return;
        }
        match self.terms.entry(m) {
            std::collections::btree_map::Entry::Vacant(entry) => {
                entry.insert(c);
            }
            std::collections::btree_map::Entry::Occupied(mut entry) => {
                *entry.get_mut() += c;
                if entry.get().is_zero() {
                    entry.remove();
                }
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// True for every polynomial without variables, zero included.
    pub fn is_constant(&self) -> bool {
        self.terms.keys().all(Monomial::is_one)
    }

    /// Value of a constant polynomial.
    pub fn constant_value(&self) -> Option<BigInt> {
        if !self.is_constant() {
            return None;
        }
        Some(
            self.terms
                .get(&Monomial::one())
                .cloned()
                .unwrap_or_else(BigInt::zero),
        )
    }

    /// Number of non-zero terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_zero()
    }

    /// Terms in descending monomial order (leading term first).
    pub fn terms(&self) -> impl DoubleEndedIterator<Item = (&Monomial, &BigInt)> {
        self.terms.iter().rev()
    }

    pub fn leading_term(&self) -> Option<(&Monomial, &BigInt)> {
        self.terms.iter().next_back()
    }

    pub fn variables(&self) -> BTreeSet<Variable> {
        self.terms.keys().flat_map(|m| m.variables()).collect()
    }

    pub fn contains(&self, v: Variable) -> bool {
        self.terms.keys().any(|m| m.exponent(v) != 0)
    }

    /// Total degree, zero for constants (and for the zero polynomial).
    pub fn total_degree(&self) -> u32 {
        self.terms.keys().map(Monomial::degree).max().unwrap_or(0)
    }

    /// Common degree of all terms, if the polynomial is homogeneous and non-zero.
    pub fn homogeneous_degree(&self) -> Option<u32> {
        let mut degrees = self.terms.keys().map(Monomial::degree);
        let first = degrees.next()?;
        degrees.all(|d| d == first).then_some(first)
    }

    /// Returns the variable if the polynomial is exactly `v`.
    pub fn as_variable(&self) -> Option<Variable> {
        match self.terms.iter().next() {
            Some((m, c)) if self.terms.len() == 1 && c.is_one() => {
                let mut powers = m.powers();
                match (powers.next(), powers.next()) {
                    (Some((v, 1)), None) => Some(v),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    pub fn pow(&self, mut e: u32) -> Polynomial {
        let mut base = self.clone();
        let mut acc = Polynomial::one();
        while e > 0 {
            if e & 1 == 1 {
                acc = &acc * &base;
            }
            e >>= 1;
            if e > 0 {
                base = &base * &base;
            }
        }
        acc
    }

    pub fn scale(&self, c: &BigInt) -> Polynomial {
        if c.is_zero() {
            return Polynomial::zero();
        }
        Polynomial {
            terms: self
                .terms
                .iter()
                .map(|(m, k)| (m.clone(), k * c))
                .collect(),
        }
    }

    /// Exact division by a non-zero constant, `None` when some coefficient is not divisible.
    pub fn div_exact(&self, c: &BigInt) -> Option<Polynomial> {
        if c.is_zero() {
            return None;
        }
        let mut terms = BTreeMap::new();
        for (m, k) in &self.terms {
            let (q, r) = k.div_rem(c);
            if !r.is_zero() {
                return None;
            }
            terms.insert(m.clone(), q);
        }
        Some(Polynomial { terms })
    }

    /// Replace every occurrence of `v` by `with`.
    pub fn substitute(&self, v: Variable, with: &Polynomial) -> Polynomial {
        let mut map = BTreeMap::new();
        map.insert(v, with.clone());
        self.substitute_all(&map)
    }

    /// Simultaneously replace the variables of `map` by their polynomials.
    pub fn substitute_all(&self, map: &BTreeMap<Variable, Polynomial>) -> Polynomial {
        let mut out = Polynomial::zero();
        for (m, c) in &self.terms {
            let (replaced, kept) = m.partition(|v| map.contains_key(&v));
            if replaced.is_one() {
                out.add_term(m.clone(), c.clone());
                continue;
            }
            let mut factor = Polynomial::term(c.clone(), kept);
            for (v, e) in replaced.powers() {
                if let Some(p) = map.get(&v) {
                    factor = &factor * &p.pow(e);
                }
            }
            out += &factor;
        }
        out
    }

    /// Replace variables by integer values.
    pub fn substitute_values(&self, values: &BTreeMap<Variable, BigInt>) -> Polynomial {
        let mut out = Polynomial::zero();
        for (m, c) in &self.terms {
            let (replaced, kept) = m.partition(|v| values.contains_key(&v));
            let mut coeff = c.clone();
            for (v, e) in replaced.powers() {
                if let Some(value) = values.get(&v) {
                    coeff *= num_traits::pow(value.clone(), e as usize);
                }
            }
            out.add_term(kept, coeff);
        }
        out
    }

    /// Greatest common divisor of all coefficients (zero for the zero polynomial).
    pub fn content(&self) -> BigInt {
        self.terms
            .values()
            .fold(BigInt::zero(), |acc, c| acc.gcd(c))
    }

    /// Primitive part with a positive leading coefficient.
    ///
    /// Two polynomials that differ by a non-zero integer factor share the same
    /// primitive part, which is what factor comparison relies on.
    pub fn primitive(&self) -> Polynomial {
        let mut content = self.content();
        if content.is_zero() {
            return Polynomial::zero();
        }
        if self.leading_term().is_some_and(|(_, c)| c.is_negative()) {
            content = -content;
        }
        self.div_exact(&content).unwrap_or_else(|| self.clone())
    }
}

impl From<Variable> for Polynomial {
    fn from(v: Variable) -> Self {
        Polynomial::var(v)
    }
}

impl From<i64> for Polynomial {
    fn from(c: i64) -> Self {
        Polynomial::constant(c)
    }
}

impl From<BigInt> for Polynomial {
    fn from(c: BigInt) -> Self {
        Polynomial::constant(c)
    }
}

impl<'a> AddAssign<&'a Polynomial> for Polynomial {
    fn add_assign(&mut self, rhs: &'a Polynomial) {
        for (m, c) in &rhs.terms {
            self.add_term(m.clone(), c.clone());
        }
    }
}

impl<'a> SubAssign<&'a Polynomial> for Polynomial {
    fn sub_assign(&mut self, rhs: &'a Polynomial) {
        for (m, c) in &rhs.terms {
            self.add_term(m.clone(), -c);
        }
    }
}

impl<'a, 'b> Add<&'b Polynomial> for &'a Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &'b Polynomial) -> Polynomial {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl<'a, 'b> Sub<&'b Polynomial> for &'a Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &'b Polynomial) -> Polynomial {
        let mut out = self.clone();
        out -= rhs;
        out
    }
}

impl<'a, 'b> Mul<&'b Polynomial> for &'a Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &'b Polynomial) -> Polynomial {
        let mut out = Polynomial::zero();
        for (ma, ca) in &self.terms {
            for (mb, cb) in &rhs.terms {
                out.add_term(ma.mul(mb), ca * cb);
            }
        }
        out
    }
}

macro_rules! forward_owned_binop {
    ($($trait:ident :: $method:ident),* $(,)?) => {
        $(
            impl $trait<Polynomial> for Polynomial {
                type Output = Polynomial;

                fn $method(self, rhs: Polynomial) -> Polynomial {
                    (&self).$method(&rhs)
                }
            }

            impl<'a> $trait<&'a Polynomial> for Polynomial {
                type Output = Polynomial;

                fn $method(self, rhs: &'a Polynomial) -> Polynomial {
                    (&self).$method(rhs)
                }
            }

            impl<'a> $trait<Polynomial> for &'a Polynomial {
                type Output = Polynomial;

                fn $method(self, rhs: Polynomial) -> Polynomial {
                    self.$method(&rhs)
                }
            }
        )*
    };
}

forward_owned_binop!(Add::add, Sub::sub, Mul::mul);

impl Neg for &Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        Polynomial {
            terms: self.terms.iter().map(|(m, c)| (m.clone(), -c)).collect(),
        }
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        -&self
    }
}

impl Sum for Polynomial {
    fn sum<I: Iterator<Item = Polynomial>>(iter: I) -> Self {
        iter.fold(Polynomial::zero(), |mut acc, p| {
            acc += &p;
            acc
        })
    }
}

impl<'a> Sum<&'a Polynomial> for Polynomial {
    fn sum<I: Iterator<Item = &'a Polynomial>>(iter: I) -> Self {
        iter.fold(Polynomial::zero(), |mut acc, p| {
            acc += p;
            acc
        })
    }
}

impl Product for Polynomial {
    fn product<I: Iterator<Item = Polynomial>>(iter: I) -> Self {
        iter.fold(Polynomial::one(), |acc, p| &acc * &p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(id: u32) -> Polynomial {
        Polynomial::var(Variable(id))
    }

    #[test]
    fn monomial_order_is_graded_lexicographic() {
        let x = Monomial::var(Variable(1));
        let y = Monomial::var(Variable(2));
        let y2 = Monomial::from_powers([(Variable(2), 2)]);
        assert!(x > y);
        assert!(y2 > x);
        assert!(Monomial::one() < y);
        assert_eq!(x.mul(&y), Monomial::from_powers([(Variable(2), 1), (Variable(1), 1)]));
    }

    #[test]
    fn arithmetic_cancels_terms() {
        let p = &v(1) + &v(2);
        let q = &v(1) - &v(2);
        let prod = &p * &q;
        assert_eq!(prod, &v(1).pow(2) - &v(2).pow(2));
        assert!((&prod - &prod).is_zero());
        assert_eq!(-(-prod.clone()), prod);
    }

    #[test]
    fn substitution_by_values_and_polynomials() {
        let p = &(&v(1) * &v(2)) + &Polynomial::constant(3);
        let mut values = BTreeMap::new();
        values.insert(Variable(1), BigInt::from(2));
        assert_eq!(p.substitute_values(&values), &(&v(2) * &Polynomial::constant(2)) + &Polynomial::constant(3));
        let q = p.substitute(Variable(2), &(&v(3) + &Polynomial::one()));
        assert_eq!(q, &(&(&v(1) * &v(3)) + &v(1)) + &Polynomial::constant(3));
    }

    #[test]
    fn primitive_part_normalizes_sign_and_content() {
        let p = &(&v(1) * &Polynomial::constant(-4)) + &Polynomial::constant(6);
        assert_eq!(p.content(), BigInt::from(2));
        assert_eq!(p.primitive(), &(&v(1) * &Polynomial::constant(2)) - &Polynomial::constant(3));
        assert_eq!(p.primitive(), (-p).primitive());
    }

    #[test]
    fn structural_queries() {
        let p = &v(3).pow(2) + &(&v(1) * &v(2));
        assert_eq!(p.total_degree(), 2);
        assert_eq!(p.homogeneous_degree(), Some(2));
        assert_eq!((&p + &v(1)).homogeneous_degree(), None);
        assert_eq!(v(7).as_variable(), Some(Variable(7)));
        assert_eq!((&v(7) * &Polynomial::constant(2)).as_variable(), None);
        assert_eq!(Polynomial::zero().constant_value(), Some(BigInt::zero()));
        assert!(p.contains(Variable(3)) && !p.contains(Variable(4)));
    }
}
