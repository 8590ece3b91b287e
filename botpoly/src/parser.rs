//! Parsers for the textual answers of algebra services.
//!
//! Three shapes are understood:
//!
//! - a polynomial expression (`3*v1^2-v2*(v3+1)`), with identifiers resolved
//!   through a caller supplied closure;
//! - a list of factor branches (`[[v1,v2-1],[v3]]`, or with braces);
//! - a list of Groebner initials (`{{v1,v2},{v3}}`).
//!
//! Division is accepted only when the divisor is a non-zero integer constant
//! that divides every coefficient exactly.
use std::{collections::BTreeSet, str::FromStr};

use chumsky::{prelude::*, text::digits};
use num_bigint::BigInt;

use crate::{polynomial::Polynomial, utils::Error, variable::Variable};

type Extra<'src> = extra::Err<Rich<'src, char>>;

pub fn bigint_parser<'src>() -> impl Parser<'src, &'src str, BigInt, Extra<'src>> + Clone {
    digits(10)
        .to_slice()
        .try_map(|digits: &str, span| {
            BigInt::from_str(digits)
                .map_err(|_| Rich::custom(span, format!("invalid integer literal: {}", digits)))
        })
        .labelled("integer")
}

fn exponent_parser<'src>() -> impl Parser<'src, &'src str, u32, Extra<'src>> + Clone {
    just('^').padded().ignore_then(
        digits(10)
            .to_slice()
            .try_map(|digits: &str, span| {
                digits.parse::<u32>().map_err(|_| {
                    Rich::custom(span, format!("exponent {} is out of range", digits))
                })
            })
            .labelled("exponent"),
    )
}

/// Polynomial expression parser. `resolve` maps identifiers to polynomials
/// (usually single variables) and returns `None` for unknown names.
pub fn polynomial_parser<'src, R>(
    resolve: R,
) -> impl Parser<'src, &'src str, Polynomial, Extra<'src>> + Clone
where
    R: Fn(&str) -> Option<Polynomial> + Clone + 'src,
{
    recursive(move |expr| {
        let number = bigint_parser().map(Polynomial::constant);
        let identifier = text::ascii::ident()
            .try_map(move |name: &str, span| {
                resolve(name)
                    .ok_or_else(|| Rich::custom(span, format!("unknown identifier `{}`", name)))
            })
            .labelled("identifier");
        let atom = choice((
            number,
            identifier,
            expr.delimited_by(just('(').padded(), just(')').padded()),
        ))
        .padded();

        let power = atom
            .then(exponent_parser().or_not())
            .map(|(base, exponent)| match exponent {
                Some(e) => base.pow(e),
                None => base,
            });

        let signed = one_of("+-")
            .padded()
            .repeated()
            .collect::<Vec<char>>()
            .then(power)
            .map(|(signs, p)| {
                if signs.iter().filter(|c| **c == '-').count() % 2 == 1 {
                    -p
                } else {
                    p
                }
            });

        let product = signed
            .clone()
            .then(one_of("*/").padded().then(signed).repeated().collect::<Vec<_>>())
            .try_map(|(first, rest), span| {
                let mut acc = first;
                for (op, rhs) in rest {
                    acc = match op {
                        '*' => &acc * &rhs,
                        _ => match rhs.constant_value().and_then(|c| acc.div_exact(&c)) {
                            Some(q) => q,
                            None => {
                                return Err(Rich::custom(
                                    span,
                                    format!("cannot divide {} by {}", acc, rhs),
                                ));
                            }
                        },
                    };
                }
                Ok(acc)
            });

        product
            .clone()
            .then(one_of("+-").padded().then(product).repeated().collect::<Vec<_>>())
            .map(|(first, rest)| {
                rest.into_iter().fold(first, |acc, (op, rhs)| match op {
                    '+' => &acc + &rhs,
                    _ => &acc - &rhs,
                })
            })
    })
    .labelled("polynomial")
}

/// Factor branches: `[[f1,f2],[g1]]` or `{{f1,f2},{g1}}`.
pub fn branches_parser<'src, R>(
    resolve: R,
) -> impl Parser<'src, &'src str, Vec<Vec<Polynomial>>, Extra<'src>> + Clone
where
    R: Fn(&str) -> Option<Polynomial> + Clone + 'src,
{
    let poly = polynomial_parser(resolve);
    let factors = |open: char, close: char| {
        poly.clone()
            .separated_by(just(',').padded())
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(open).padded(), just(close).padded())
    };
    let branch = choice((factors('[', ']'), factors('{', '}')));
    let branches = |open: char, close: char| {
        branch
            .clone()
            .separated_by(just(',').padded())
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(just(open).padded(), just(close).padded())
    };
    choice((branches('[', ']'), branches('{', '}')))
        .padded()
        .then_ignore(end())
        .labelled("factor branches")
}

/// Default resolver accepting only `v<id>` identifiers.
pub fn resolve_variable(name: &str) -> Option<Polynomial> {
    name.parse::<Variable>().ok().map(Polynomial::var)
}

fn into_error(input: &str, errors: Vec<Rich<'_, char>>) -> Error {
    Error::ParseFailure {
        input: input.to_string(),
        message: errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; "),
    }
}

/// Parse a polynomial whose identifiers are all `v<id>`.
pub fn parse_polynomial(input: &str) -> Result<Polynomial, Error> {
    parse_polynomial_with(input, resolve_variable)
}

pub fn parse_polynomial_with<'a, R>(input: &'a str, resolve: R) -> Result<Polynomial, Error>
where
    R: Fn(&str) -> Option<Polynomial> + Clone + 'a,
{
    polynomial_parser(resolve)
        .padded()
        .then_ignore(end())
        .parse(input)
        .into_result()
        .map_err(|errors| into_error(input, errors))
}

/// Parse the factor branches returned by an elimination request.
pub fn parse_branches(input: &str) -> Result<Vec<Vec<Polynomial>>, Error> {
    branches_parser(resolve_variable)
        .parse(input)
        .into_result()
        .map_err(|errors| into_error(input, errors))
}

/// Parse Groebner initials, every entry being a set of variables.
pub fn parse_initials(input: &str) -> Result<Vec<BTreeSet<Variable>>, Error> {
    parse_branches(input)?
        .into_iter()
        .map(|branch| {
            branch
                .iter()
                .map(|p| {
                    p.as_variable().ok_or_else(|| Error::NotAVariable {
                        polynomial: p.to_string(),
                    })
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_precedence_and_signs() {
        let p = parse_polynomial("-v1^2 + 2*v2*(v3-1) - -3").expect("valid polynomial");
        assert_eq!(p.to_string(), "-v1^2+2*v2*v3-2*v2+3");
    }

    #[test]
    fn exact_division_only() {
        assert_eq!(
            parse_polynomial("(4*v1+2)/2").expect("divisible").to_string(),
            "2*v1+1"
        );
        assert!(parse_polynomial("(4*v1+1)/2").is_err());
        assert!(parse_polynomial("v1/v2").is_err());
    }

    #[test]
    fn rejects_unknown_identifiers() {
        assert!(parse_polynomial("x+1").is_err());
        let bound = parse_polynomial_with("x^2+y", |name: &str| match name {
            "x" => Some(Polynomial::var(Variable(10))),
            "y" => Some(Polynomial::var(Variable(11))),
            _ => None,
        })
        .expect("x and y are bound");
        assert_eq!(bound.to_string(), "v10^2+v11");
    }

    #[test]
    fn parses_branch_lists() {
        let branches = parse_branches("[[v1,v2-1],[1]]").expect("valid branches");
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0][1].to_string(), "v2-1");
        assert!(branches[1][0].is_constant());

        let braces = parse_branches("{{0}}").expect("valid branches");
        assert!(braces[0][0].is_zero());
        assert_eq!(parse_branches("[]").expect("empty"), Vec::<Vec<Polynomial>>::new());
        assert!(parse_branches("[[v1]").is_err());
    }

    #[test]
    fn parses_initials() {
        let initials = parse_initials("{{v1,v2},{v3}}").expect("valid initials");
        assert_eq!(initials.len(), 2);
        assert!(initials[0].contains(&Variable(2)));
        assert!(parse_initials("{{v1*v2}}").unwrap_err().is_not_a_variable());
    }
}
