//! Naming helpers shared by resolution and emission.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::spec::SCHEMA_REF_PREFIX;

/// Rust keywords that need a raw identifier when used as names.
pub static RUST_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "as", "async", "await", "break", "const", "continue", "dyn", "else", "enum", "extern",
        "false", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "match", "mod", "move",
        "mut", "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe",
        "use", "where", "while", "abstract", "become", "box", "do", "final", "macro", "override",
        "priv", "try", "typeof", "unsized", "virtual", "yield",
    ]
    .into_iter()
    .collect()
});

/// Keywords that cannot be raw identifiers either.
const NON_RAW_KEYWORDS: [&str; 4] = ["self", "Self", "super", "crate"];

/// Type identifier for a schema reference.
///
/// Keeps the last dot-separated segment, drops a leading `Destiny2` or
/// `Destiny` and a trailing `Enum` or `Enums`, and appends `Body` to names
/// ending in `Request` so they stay clear of generated request structs.
pub fn normalize_ident(reference: &str) -> String {
    let name = reference.strip_prefix(SCHEMA_REF_PREFIX).unwrap_or(reference);
    let name = name.rsplit('.').next().unwrap_or(name);
    let name = name.strip_prefix("Destiny2").unwrap_or(name);
    let name = name.strip_prefix("Destiny").unwrap_or(name);
    let name = name.strip_suffix("Enum").unwrap_or(name);
    let name = name.strip_suffix("Enums").unwrap_or(name);
    if name.ends_with("Request") {
        format!("{name}Body")
    } else {
        name.to_string()
    }
}

/// Convert camelCase / PascalCase (acronyms included) to snake_case.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_ascii_alphanumeric() {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
            continue;
        }
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(char::is_ascii_lowercase);
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_lower);
            if boundary && !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
        }
        result.push(c.to_ascii_lowercase());
    }
    while result.ends_with('_') {
        result.pop();
    }
    result
}

/// SCREAMING_SNAKE name for an associated constant.
pub fn to_screaming_snake(s: &str) -> String {
    let name = to_snake_case(s).to_ascii_uppercase();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("V_{name}")
    } else {
        name
    }
}

/// A valid Rust field or function name for a wire name.
pub fn sanitize_rust_ident(name: &str) -> String {
    let mut ident = to_snake_case(name);
    if ident.is_empty() {
        return "_empty".to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if NON_RAW_KEYWORDS.contains(&ident.as_str()) {
        ident.push('_');
    } else if RUST_RESERVED_WORDS.contains(ident.as_str()) {
        ident.insert_str(0, "r#");
    }
    ident
}

/// Render a description as `///` lines at the given indent.
pub fn doc_comment(text: Option<&str>, indent: &str) -> String {
    let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
        return String::new();
    };
    text.lines()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                format!("{indent}///\n")
            } else {
                format!("{indent}/// {line}\n")
            }
        })
        .collect()
}
