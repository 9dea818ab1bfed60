//! Identifier conversion for generated declarations.
use once_cell::sync::Lazy;
use regex::Regex;

static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("invalid separator regex"));

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod",
    "move", "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait",
    "true", "try", "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do",
    "final", "macro", "override", "priv", "typeof", "unsized", "virtual", "yield",
];

/// Keywords that cannot be written as raw identifiers either.
const NON_RAW_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

/// Split on separators and on lower→upper / acronym→word case boundaries.
pub fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    for chunk in SEPARATORS.split(input).filter(|c| !c.is_empty()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();
        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && !current.is_empty() && c.is_ascii_uppercase() {
                let prev = chars[i - 1];
                let next = chars.get(i + 1).copied();
                let camel = prev.is_ascii_lowercase() || prev.is_ascii_digit();
                let acronym_end = prev.is_ascii_uppercase() && next.is_some_and(|n| n.is_ascii_lowercase());
                if camel || acronym_end {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(c);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}

/// UpperCamelCase; the tail of each word is kept as written (`HTTPServer` stays).
pub fn to_type_name(input: &str) -> String {
    let mut out = String::new();
    for word in split_words(input) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.extend(chars);
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// snake_case. Empty input becomes `value`.
pub fn to_field_name(input: &str) -> String {
    let mut out = split_words(input)
        .iter()
        .map(|w| w.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("_");
    if out.is_empty() {
        out.push_str("value");
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// `foo_bar` → `FooBarAsync`.
pub fn to_function_name(operation: &str) -> String {
    format!("{}Async", to_type_name(operation))
}

pub fn is_keyword(ident: &str) -> bool {
    RUST_KEYWORDS.contains(&ident)
}

pub fn is_raw_capable(ident: &str) -> bool {
    !NON_RAW_KEYWORDS.contains(&ident)
}

/// Strip a leading interface marker (`ICw20` → `Cw20`), else append `Implementation`.
pub fn implementation_name(interface: &str) -> String {
    let mut chars = interface.chars();
    match (chars.next(), chars.next()) {
        (Some('I'), Some(second)) if second.is_ascii_uppercase() => interface[1..].to_string(),
        _ => format!("{interface}Implementation"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_split_on_case_and_separators() {
        assert_eq!(split_words("all_accounts"), ["all", "accounts"]);
        assert_eq!(split_words("HTTPServer"), ["HTTP", "Server"]);
        assert_eq!(split_words("cw20Balance-info"), ["cw20", "Balance", "info"]);
        assert!(split_words("--").is_empty());
    }

    #[test]
    fn type_names_are_upper_camel() {
        assert_eq!(to_type_name("balance"), "Balance");
        assert_eq!(to_type_name("BalanceResponse"), "BalanceResponse");
        assert_eq!(to_type_name("token_info"), "TokenInfo");
        assert_eq!(to_type_name("1st place"), "_1stPlace");
        assert_eq!(to_type_name(""), "");
    }

    #[test]
    fn field_names_are_snake() {
        assert_eq!(to_field_name("minterAddress"), "minter_address");
        assert_eq!(to_field_name("start_after"), "start_after");
        assert_eq!(to_field_name("$"), "value");
        assert_eq!(to_field_name("24h"), "_24h");
    }

    #[test]
    fn function_names_get_async_suffix() {
        assert_eq!(to_function_name("foo_bar"), "FooBarAsync");
        assert_eq!(to_function_name("balance"), "BalanceAsync");
    }

    #[test]
    fn implementation_names() {
        assert_eq!(implementation_name("ICw20"), "Cw20");
        assert_eq!(implementation_name("Cw20"), "Cw20Implementation");
        assert_eq!(implementation_name("Index"), "IndexImplementation");
        assert_eq!(implementation_name("I"), "IImplementation");
    }

    #[test]
    fn keywords() {
        assert!(is_keyword("type"));
        assert!(is_raw_capable("type"));
        assert!(!is_raw_capable("self"));
        assert!(!is_keyword("amount"));
    }
}
