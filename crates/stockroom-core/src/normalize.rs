//! Title-case normalization for display fields.
//!
//! Every `name`, `category` and `location` goes through [`normalize_field`]
//! before it reaches a store, so stored values never keep the user's raw
//! casing or outer whitespace.
//!
//! # Rules
//!
//! 1. Trim leading and trailing whitespace.
//! 2. Lowercase the whole string.
//! 3. Uppercase every character that starts a word. A word character is
//!    alphanumeric or `_`; a word starts at the beginning of the string or
//!    right after any non-word character. A word start whose uppercase
//!    form is not a single character (`ß`, `ﬁ`) stays lowercase.
//!
//! Internal whitespace runs are left alone, and apostrophes or hyphens end
//! a word just like spaces do:
//!
//! ```
//! use stockroom_core::normalize::title_case;
//!
//! assert_eq!(title_case("  hello   world  "), "Hello   World");
//! assert_eq!(title_case("o'brien's CAFE"), "O'Brien'S Cafe");
//! ```

use serde_json::Value;

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// The single-character uppercase form of a lowercased word start, if it has
/// one that lowercases back to a word character with the same uppercase.
///
/// Characters such as `ß` or `ﬁ` uppercase to several characters; they are
/// left lowercase so that a second pass produces the same text.
fn word_start_upper(c: char) -> Option<char> {
    let mut upper = c.to_uppercase();
    let u = upper.next()?;
    if upper.next().is_some() {
        return None;
    }

    let mut lower = u.to_lowercase();
    let m = lower.next()?;
    if lower.next().is_some() || !is_word_char(m) {
        return None;
    }

    let mut again = m.to_uppercase();
    (again.next() == Some(u) && again.next().is_none()).then_some(u)
}

/// Convert `input` to its canonical display form.
pub fn title_case(input: &str) -> String {
    let lowered = input.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut in_word = false;

    for c in lowered.chars() {
        let word = is_word_char(c);
        if word && !in_word {
            out.push(word_start_upper(c).unwrap_or(c));
        } else {
            out.push(c);
        }
        in_word = word;
    }

    out
}

/// Normalize an optional form field.
///
/// Absent and empty values pass through unchanged.
pub fn normalize_field(input: Option<String>) -> Option<String> {
    match input {
        Some(s) if !s.is_empty() => Some(title_case(&s)),
        other => other,
    }
}

/// Normalize an arbitrary JSON value.
///
/// Only non-empty strings are rewritten; `null`, numbers, booleans, arrays,
/// objects and `""` are returned as-is.
pub fn normalize_value(input: Value) -> Value {
    match input {
        Value::String(s) if !s.is_empty() => Value::String(title_case(&s)),
        other => other,
    }
}
