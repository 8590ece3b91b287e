//! Token-aware rewriting of formula text.
//!
//! Formulas exchanged with the real geometry services are plain text mixing
//! polynomials, comparisons and boolean connectives. Identifiers are
//! rewritten as whole tokens so that `v1` never matches inside `v12`.
use std::collections::BTreeSet;

use chumsky::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Ident(&'a str),
    Other(&'a str),
}

fn tokens_parser<'src>()
-> impl Parser<'src, &'src str, Vec<Token<'src>>, extra::Err<Rich<'src, char>>> {
    let number = text::digits(10).to_slice().map(Token::Other);
    let ident = text::ascii::ident().map(Token::Ident);
    let other = any().to_slice().map(Token::Other);
    choice((number, ident, other)).repeated().collect()
}

fn tokens(text: &str) -> Vec<Token<'_>> {
    tokens_parser()
        .parse(text)
        .into_result()
        .unwrap_or_else(|_| vec![Token::Other(text)])
}

/// Words that are connectives or constants, not variables.
const KEYWORDS: [&str; 8] = ["and", "or", "AND", "OR", "true", "false", "ex", "all"];

/// Variable-like identifiers of `text`, sorted.
pub fn identifiers(text: &str) -> BTreeSet<String> {
    tokens(text)
        .into_iter()
        .filter_map(|t| match t {
            Token::Ident(name) if !KEYWORDS.contains(&name) => Some(name.to_string()),
            _ => None,
        })
        .collect()
}

/// Replace whole identifiers for which `replace` answers `Some`.
pub fn replace_identifiers(text: &str, replace: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(text.len());
    for token in tokens(text) {
        match token {
            Token::Ident(name) => match replace(name) {
                Some(with) => out.push_str(&with),
                None => out.push_str(name),
            },
            Token::Other(s) => out.push_str(s),
        }
    }
    out
}

/// Rewrite connectives into Tarski syntax: `and`, `AND` and `&&` become `/\`,
/// `or`, `OR` and `||` become `\/`, products become juxtaposition.
pub fn to_tarski(text: &str) -> String {
    replace_identifiers(text, |name| match name {
        "and" | "AND" => Some("/\\".to_string()),
        "or" | "OR" => Some("\\/".to_string()),
        _ => None,
    })
    .replace("&&", "/\\")
    .replace("||", "\\/")
    .replace('*', " ")
}
