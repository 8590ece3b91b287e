//! Ampersand delimited parameter packages of the real geometry services.
//!
//! `=` is reserved by the transport, so values travel with `=` written as
//! `E`, `>=` as `≥` and `<=` as `≤`. [`RealGeomParameters::get`] decodes.
use std::fmt::Display;

/// Ordered `key=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RealGeomParameters {
    entries: Vec<(String, String)>,
}

/// Make a formula safe for transport.
pub fn encode_value(value: &str) -> String {
    value
        .replace(">=", "≥")
        .replace("<=", "≤")
        .replace('=', "E")
}

/// Inverse of [`encode_value`]. An `E` inside a word such as `Exp` or
/// `TRUE` is kept.
pub fn decode_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut decoded = String::with_capacity(value.len());
    for (i, c) in chars.iter().enumerate() {
        match c {
            '≥' => decoded.push_str(">="),
            '≤' => decoded.push_str("<="),
            'E' if is_separator(&chars, i) => decoded.push('='),
            _ => decoded.push(*c),
        }
    }
    decoded
}

fn is_separator(chars: &[char], i: usize) -> bool {
    let next = chars.get(i + 1);
    let previous = i.checked_sub(1).and_then(|p| chars.get(p));
    !next.is_some_and(char::is_ascii_alphabetic)
        && !previous.is_some_and(char::is_ascii_uppercase)
}

impl RealGeomParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw (already encoded) value.
    pub fn push(&mut self, key: &str, value: impl Display) -> &mut Self {
        self.entries.push((key.to_string(), value.to_string()));
        self
    }

    /// Split a rendered package. Entries without `=` are ignored.
    pub fn parse(text: &str) -> Self {
        Self {
            entries: text
                .split('&')
                .filter_map(|entry| entry.split_once('='))
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Decoded value of the first entry named `key`, empty if there is none.
    pub fn get(&self, key: &str) -> String {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| decode_value(v))
            .unwrap_or_default()
    }

    /// Decoded comma separated list, without empty items.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .split(',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl Display for RealGeomParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_transport() {
        let mut params = RealGeomParameters::new();
        params
            .push("vars", "v1,v2")
            .push("ineqs", encode_value("v1>=0,v2=1"))
            .push("mode", "prove");
        let text = params.render();
        assert_eq!(text, "vars=v1,v2&ineqs=v1≥0,v2E1&mode=prove");

        let back = RealGeomParameters::parse(&text);
        assert_eq!(back.list("ineqs"), vec!["v1>=0", "v2=1"]);
        assert_eq!(back.list("posvariables"), Vec::<String>::new());
        assert!(back.contains("mode"));
    }

    #[test]
    fn only_encoded_equalities_are_decoded() {
        assert_eq!(decode_value("mE2"), "m=2");
        assert_eq!(decode_value("Exp(v1)E1"), "Exp(v1)=1");
        assert_eq!(decode_value("TRUE"), "TRUE");
        assert_eq!(decode_value("v1≥0"), "v1>=0");

        let mut params = RealGeomParameters::new();
        params.push("ineq", encode_value("Exp(v1)=1"));
        assert_eq!(params.render(), "ineq=Exp(v1)E1");
        assert_eq!(params.get("ineq"), "Exp(v1)=1");
    }
}
