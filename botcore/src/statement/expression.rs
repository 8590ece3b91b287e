//! Comparisons between lengths and numbers.
//!
//! An expression statement such as `f + g > h` or `sqrt(2)*a == b` is parsed
//! into a [`Comparison`]. Identifiers are object labels; they are bound to
//! polynomials by the thesis builder. Evaluation works over fractions of
//! polynomials so that divisions never need to be exact.
use std::collections::{BTreeMap, BTreeSet};

use botpoly::{Polynomial, parser::bigint_parser};
use chumsky::prelude::*;
use num_bigint::BigInt;
use strum::{Display, EnumIs};

use crate::utils::error::{BotError, BotResult};

type Extra<'src> = extra::Err<Rich<'src, char>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIs)]
pub enum Relation {
    #[strum(serialize = "=")]
    Equal,
    #[strum(serialize = "<")]
    Less,
    #[strum(serialize = "<=")]
    LessEqual,
    #[strum(serialize = ">")]
    Greater,
    #[strum(serialize = ">=")]
    GreaterEqual,
}

impl Relation {
    /// Order relations go to the real geometry path.
    pub fn is_order(&self) -> bool {
        !self.is_equal()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Number(BigInt),
    Ident(String),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, u32),
    Sqrt(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub lhs: Expr,
    pub relation: Relation,
    pub rhs: Expr,
}

/// Degree of an expression in the lengths, counted in halves so that square
/// roots stay integral.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degree {
    Halves(i64),
    /// Some identifier has no known degree.
    Unknown,
    /// A sum of terms of different degrees.
    Mixed,
}

impl Degree {
    fn same(self, other: Degree) -> Degree {
        match (self, other) {
            (Degree::Mixed, _) | (_, Degree::Mixed) => Degree::Mixed,
            (Degree::Halves(a), Degree::Halves(b)) if a == b => Degree::Halves(a),
            (Degree::Halves(_), Degree::Halves(_)) => Degree::Mixed,
            _ => Degree::Unknown,
        }
    }

    fn map(self, f: impl FnOnce(i64) -> Option<i64>) -> Degree {
        match self {
            Degree::Halves(d) => f(d).map_or(Degree::Unknown, Degree::Halves),
            other => other,
        }
    }

    fn combine(self, other: Degree, f: impl FnOnce(i64, i64) -> i64) -> Degree {
        match (self, other) {
            (Degree::Mixed, _) | (_, Degree::Mixed) => Degree::Mixed,
            (Degree::Halves(a), Degree::Halves(b)) => Degree::Halves(f(a, b)),
            _ => Degree::Unknown,
        }
    }
}

/// Quotient of two polynomials; the denominator is never zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fraction {
    pub numerator: Polynomial,
    pub denominator: Polynomial,
}

impl Fraction {
    pub fn new(numerator: Polynomial) -> Self {
        Self {
            numerator,
            denominator: Polynomial::one(),
        }
    }

    fn add(&self, other: &Fraction) -> Fraction {
        if self.denominator == other.denominator {
            return Fraction {
                numerator: &self.numerator + &other.numerator,
                denominator: self.denominator.clone(),
            };
        }
        Fraction {
            numerator: &(&self.numerator * &other.denominator)
                + &(&other.numerator * &self.denominator),
            denominator: &self.denominator * &other.denominator,
        }
    }

    fn neg(&self) -> Fraction {
        Fraction {
            numerator: -&self.numerator,
            denominator: self.denominator.clone(),
        }
    }

    fn mul(&self, other: &Fraction) -> Fraction {
        Fraction {
            numerator: &self.numerator * &other.numerator,
            denominator: &self.denominator * &other.denominator,
        }
    }

    fn div(&self, other: &Fraction) -> Option<Fraction> {
        if other.numerator.is_zero() {
            return None;
        }
        Some(Fraction {
            numerator: &self.numerator * &other.denominator,
            denominator: &self.denominator * &other.numerator,
        })
    }

    fn pow(&self, e: u32) -> Fraction {
        Fraction {
            numerator: self.numerator.pow(e),
            denominator: self.denominator.pow(e),
        }
    }

    /// A polynomial with the sign of the fraction.
    pub fn sign_polynomial(&self) -> Polynomial {
        if self.denominator == Polynomial::one() {
            self.numerator.clone()
        } else {
            &self.numerator * &self.denominator
        }
    }
}

impl Expr {
    /// Labels mentioned by the expression.
    pub fn identifiers(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Number(_) => {}
            Expr::Ident(name) => {
                out.insert(name.clone());
            }
            Expr::Neg(e) | Expr::Pow(e, _) | Expr::Sqrt(e) => e.identifiers(out),
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) => {
                a.identifiers(out);
                b.identifiers(out);
            }
        }
    }

    /// Radicands of the square roots. `None` when a square root is taken of
    /// something other than an integer.
    pub fn radicands(&self, out: &mut BTreeSet<BigInt>) -> Option<()> {
        match self {
            Expr::Number(_) | Expr::Ident(_) => Some(()),
            Expr::Sqrt(e) => match e.as_ref() {
                Expr::Number(n) => {
                    out.insert(n.clone());
                    Some(())
                }
                _ => None,
            },
            Expr::Neg(e) | Expr::Pow(e, _) => e.radicands(out),
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) => {
                a.radicands(out)?;
                b.radicands(out)
            }
        }
    }

    pub fn has_sqrt(&self) -> bool {
        match self {
            Expr::Number(_) | Expr::Ident(_) => false,
            Expr::Sqrt(_) => true,
            Expr::Neg(e) | Expr::Pow(e, _) => e.has_sqrt(),
            Expr::Add(a, b) | Expr::Sub(a, b) | Expr::Mul(a, b) | Expr::Div(a, b) => {
                a.has_sqrt() || b.has_sqrt()
            }
        }
    }

    /// Degree in halves, given the degree (in whole units) of every label.
    pub fn degree(&self, weight: &dyn Fn(&str) -> Option<i64>) -> Degree {
        match self {
            Expr::Number(_) => Degree::Halves(0),
            Expr::Ident(name) => weight(name).map_or(Degree::Unknown, |w| Degree::Halves(2 * w)),
            Expr::Neg(e) => e.degree(weight),
            Expr::Add(a, b) | Expr::Sub(a, b) => a.degree(weight).same(b.degree(weight)),
            Expr::Mul(a, b) => a.degree(weight).combine(b.degree(weight), |x, y| x + y),
            Expr::Div(a, b) => a.degree(weight).combine(b.degree(weight), |x, y| x - y),
            Expr::Pow(e, k) => e.degree(weight).map(|d| Some(d * i64::from(*k))),
            Expr::Sqrt(e) => e.degree(weight).map(|d| (d % 2 == 0).then_some(d / 2)),
        }
    }

    /// Value of the expression. Labels are bound by `resolve`, square roots of
    /// integers by `roots`.
    pub fn evaluate(
        &self,
        resolve: &dyn Fn(&str) -> Option<Polynomial>,
        roots: &BTreeMap<BigInt, Polynomial>,
    ) -> Option<Fraction> {
        Some(match self {
            Expr::Number(n) => Fraction::new(Polynomial::constant(n.clone())),
            Expr::Ident(name) => Fraction::new(resolve(name)?),
            Expr::Neg(e) => e.evaluate(resolve, roots)?.neg(),
            Expr::Add(a, b) => a.evaluate(resolve, roots)?.add(&b.evaluate(resolve, roots)?),
            Expr::Sub(a, b) => a
                .evaluate(resolve, roots)?
                .add(&b.evaluate(resolve, roots)?.neg()),
            Expr::Mul(a, b) => a.evaluate(resolve, roots)?.mul(&b.evaluate(resolve, roots)?),
            Expr::Div(a, b) => a.evaluate(resolve, roots)?.div(&b.evaluate(resolve, roots)?)?,
            Expr::Pow(e, k) => e.evaluate(resolve, roots)?.pow(*k),
            Expr::Sqrt(e) => match e.as_ref() {
                Expr::Number(n) => Fraction::new(roots.get(n)?.clone()),
                _ => return None,
            },
        })
    }
}

impl Comparison {
    pub fn identifiers(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.lhs.identifiers(&mut out);
        self.rhs.identifiers(&mut out);
        out
    }

    pub fn has_sqrt(&self) -> bool {
        self.lhs.has_sqrt() || self.rhs.has_sqrt()
    }

    /// `lhs - rhs` as a single fraction.
    pub fn difference(
        &self,
        resolve: &dyn Fn(&str) -> Option<Polynomial>,
        roots: &BTreeMap<BigInt, Polynomial>,
    ) -> Option<Fraction> {
        let lhs = self.lhs.evaluate(resolve, roots)?;
        let rhs = self.rhs.evaluate(resolve, roots)?;
        Some(lhs.add(&rhs.neg()))
    }

    /// False when the two sides scale differently.
    pub fn is_homogeneous(&self, weight: &dyn Fn(&str) -> Option<i64>) -> bool {
        !matches!(
            self.lhs.degree(weight).same(self.rhs.degree(weight)),
            Degree::Mixed
        )
    }
}

fn expression_parser<'src>() -> impl Parser<'src, &'src str, Expr, Extra<'src>> + Clone {
    recursive(|expr| {
        let number = bigint_parser().map(Expr::Number);
        let parens = expr
            .clone()
            .delimited_by(just('(').padded(), just(')').padded());
        let root = just('√')
            .padded()
            .ignore_then(choice((number.clone(), parens.clone())))
            .map(|e| Expr::Sqrt(Box::new(e)));
        let named = text::ascii::ident()
            .then(parens.clone().or_not())
            .try_map(|(name, arg): (&str, Option<Expr>), span| match (name, arg) {
                ("sqrt", Some(arg)) => Ok(Expr::Sqrt(Box::new(arg))),
                (name, None) => Ok(Expr::Ident(name.to_string())),
                (name, Some(_)) => Err(Rich::custom(span, format!("unknown function `{}`", name))),
            });
        let atom = choice((number, root, named, parens)).padded();

        let exponent = just('^').padded().ignore_then(
            text::int(10)
                .to_slice()
                .try_map(|digits: &str, span| {
                    digits
                        .parse::<u32>()
                        .map_err(|_| Rich::custom(span, "exponent is out of range"))
                }),
        );
        let power = atom.then(exponent.or_not()).map(|(base, e)| match e {
            Some(e) => Expr::Pow(Box::new(base), e),
            None => base,
        });

        let signed = just('-')
            .padded()
            .repeated()
            .count()
            .then(power)
            .map(|(minus, e)| {
                if minus % 2 == 1 {
                    Expr::Neg(Box::new(e))
                } else {
                    e
                }
            });

        let product = signed.clone().foldl(
            one_of("*/").padded().then(signed).repeated(),
            |acc, (op, rhs)| match op {
                '*' => Expr::Mul(Box::new(acc), Box::new(rhs)),
                _ => Expr::Div(Box::new(acc), Box::new(rhs)),
            },
        );

        product.clone().foldl(
            one_of("+-").padded().then(product).repeated(),
            |acc, (op, rhs)| match op {
                '+' => Expr::Add(Box::new(acc), Box::new(rhs)),
                _ => Expr::Sub(Box::new(acc), Box::new(rhs)),
            },
        )
    })
    .labelled("expression")
}

fn comparison_parser<'src>() -> impl Parser<'src, &'src str, Comparison, Extra<'src>> {
    let relation = choice((
        just("==").to(Relation::Equal),
        just("<=").to(Relation::LessEqual),
        just("≤").to(Relation::LessEqual),
        just(">=").to(Relation::GreaterEqual),
        just("≥").to(Relation::GreaterEqual),
        just("<").to(Relation::Less),
        just(">").to(Relation::Greater),
        just("=").to(Relation::Equal),
    ))
    .padded();
    expression_parser()
        .then(relation)
        .then(expression_parser())
        .map(|((lhs, relation), rhs)| Comparison { lhs, relation, rhs })
        .padded()
        .then_ignore(end())
}

fn into_error(text: &str, errors: Vec<Rich<'_, char>>) -> BotError {
    BotError::Polynomial(botpoly::Error::ParseFailure {
        input: text.to_string(),
        message: errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; "),
    })
}

pub fn parse_comparison(text: &str) -> BotResult<Comparison> {
    comparison_parser()
        .parse(text)
        .into_result()
        .map_err(|errors| into_error(text, errors))
}

/// Parse the definition of a dependent number, such as `f+2*g`.
pub fn parse_expression(text: &str) -> BotResult<Expr> {
    expression_parser()
        .padded()
        .then_ignore(end())
        .parse(text)
        .into_result()
        .map_err(|errors| into_error(text, errors))
}
