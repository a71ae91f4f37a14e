//! Placeholder extraction for translated strings.
//!
//! Two families are recognized:
//! - printf-style tokens (`%d`, `%1$@`, `%ld`), with Apple object tokens
//!   normalized to `s`;
//! - named parameters in any of the accepted syntaxes: `{name}`,
//!   `{{name}}`, `%{name}`, `${name}` and `%(name)s`.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NAMED_PARAMETER: Regex =
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.]*)\s*\}\}|[%$]?\{\s*([A-Za-z_][A-Za-z0-9_.]*)\s*\}|%\(([A-Za-z_][A-Za-z0-9_.]*)\)[a-z]")
            .unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Placeholder {
    /// printf-style token; `kind` is the canonical conversion letter.
    Positional { index: Option<usize>, kind: char },
    Named(String),
}

impl Placeholder {
    pub fn to_signature(&self) -> String {
        match self {
            Placeholder::Positional {
                index: Some(i),
                kind,
            } => format!("{}${}", i, kind),
            Placeholder::Positional { index: None, kind } => kind.to_string(),
            Placeholder::Named(name) => format!("{{{}}}", name),
        }
    }
}

/// Every placeholder in `input`, printf tokens first, each group in
/// occurrence order.
pub fn extract_placeholders(input: &str) -> Vec<Placeholder> {
    let mut out = extract_printf(input);
    out.extend(named_parameters(input).into_iter().map(Placeholder::Named));
    out
}

/// Names of the named parameters in `input`, in occurrence order.
pub fn named_parameters(input: &str) -> Vec<String> {
    NAMED_PARAMETER
        .captures_iter(input)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)).or_else(|| caps.get(3)))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// True when `name` appears through any accepted parameter syntax.
pub fn mentions_parameter(input: &str, name: &str) -> bool {
    named_parameters(input).iter().any(|found| found == name)
}

/// Order-insensitive placeholder signature used to compare a translation
/// with its reference text.
pub fn signature(input: &str) -> Vec<String> {
    let mut sig: Vec<String> = extract_placeholders(input)
        .iter()
        .map(Placeholder::to_signature)
        .collect();
    sig.sort();
    sig
}

fn extract_printf(input: &str) -> Vec<Placeholder> {
    let bytes = input.as_bytes();
    let mut i = 0;
    let mut out = Vec::new();

    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        if bytes.get(i + 1) == Some(&b'%') {
            i += 2;
            continue;
        }

        let mut j = i + 1;
        let mut index = None;
        let digits_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > digits_start && bytes.get(j) == Some(&b'$') {
            index = input[digits_start..j].parse::<usize>().ok();
            j += 1;
        } else {
            j = i + 1;
        }

        while bytes.get(j) == Some(&b'l') {
            j += 1;
        }

        // `%{name}` and `%(name)s` belong to the named family.
        match bytes.get(j) {
            Some(&ch) if ch.is_ascii_alphabetic() || ch == b'@' => {
                let kind = match ch {
                    b'@' => 's',
                    b'u' | b'i' => 'd',
                    other => (other as char).to_ascii_lowercase(),
                };
                out.push(Placeholder::Positional { index, kind });
                i = j + 1;
            }
            _ => i += 1,
        }
    }

    out
}
