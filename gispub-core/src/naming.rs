//! Identifier transforms shared by synthesis, resolution, and mapping.
//!
//! Words are runs of ASCII letters and digits; every other character,
//! accented letters included, separates words. A lowercase letter or digit
//! followed by an uppercase letter also starts a new word. The first word is
//! lowercased and every following word is capitalised, except that a word
//! directly after a single capital is lowercased so the capital never runs
//! into another one. Every capital in the output therefore follows a
//! lowercase letter or digit, splitting the output again yields the same
//! words, and [`camel_case`] is idempotent.
//!
//! # Examples
//! ```
//! use gispub_core::naming::{camel_case, identifier, pascal_case};
//!
//! assert_eq!(camel_case("land_use-type"), "landUseType");
//! assert_eq!(camel_case("AREA"), "area");
//! assert_eq!(camel_case("ríos"), "rOs");
//! assert_eq!(pascal_case("parcel"), "Parcel");
//! assert_eq!(identifier("2024"), "dir2024");
//! ```

/// Prefix given to identifiers whose camelCase form does not start with a
/// letter.
pub const IDENTIFIER_PREFIX: &str = "dir";

/// Convert `raw` to lowerCamelCase.
#[must_use]
pub fn camel_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for (index, word) in split_words(raw).into_iter().enumerate() {
        let after_capital = out.ends_with(|ch: char| ch.is_ascii_uppercase());
        if index == 0 || after_capital {
            out.push_str(&word.to_ascii_lowercase());
        } else {
            push_capitalised(&mut out, word);
        }
    }
    out
}

/// Convert `raw` to UpperCamelCase (PascalCase).
#[must_use]
pub fn pascal_case(raw: &str) -> String {
    let mut camel = camel_case(raw);
    if let Some(first) = camel.get_mut(..1) {
        first.make_ascii_uppercase();
    }
    camel
}

/// camelCase identifier for `raw` that always starts with an ASCII letter.
///
/// Names that are empty or start with a digit once camel-cased are prefixed
/// with [`IDENTIFIER_PREFIX`].
#[must_use]
pub fn identifier(raw: &str) -> String {
    let camel = camel_case(raw);
    if camel.starts_with(|ch: char| ch.is_ascii_alphabetic()) {
        camel
    } else {
        format!("{IDENTIFIER_PREFIX}{}", pascal_case(raw))
    }
}

fn push_capitalised(out: &mut String, word: &str) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        out.push(first.to_ascii_uppercase());
        out.push_str(&chars.as_str().to_ascii_lowercase());
    }
}

fn split_words(raw: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    let mut previous: Option<char> = None;

    for (offset, ch) in raw.char_indices() {
        if !ch.is_ascii_alphanumeric() {
            if let Some(begin) = start.take() {
                words.extend(raw.get(begin..offset));
            }
            previous = None;
            continue;
        }
        let hump = ch.is_ascii_uppercase()
            && previous.is_some_and(|prev| prev.is_ascii_lowercase() || prev.is_ascii_digit());
        if hump && let Some(begin) = start.replace(offset) {
            words.extend(raw.get(begin..offset));
        }
        start.get_or_insert(offset);
        previous = Some(ch);
    }
    if let Some(begin) = start {
        words.extend(raw.get(begin..));
    }
    words
}
