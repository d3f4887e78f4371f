//! Reusable string transforms.
//!
//! Plain functions, so they slot straight into
//! [`StringSchema::transform`](crate::StringSchema::transform) and can be
//! named from descriptors.

/// Removes leading and trailing whitespace.
pub fn trim(s: String) -> String {
    s.trim().to_string()
}

pub fn lowercase(s: String) -> String {
    s.to_lowercase()
}

pub fn uppercase(s: String) -> String {
    s.to_uppercase()
}

/// Upper-cases the first letter of every word and lower-cases the rest.
///
/// Words are separated by whitespace; runs of whitespace collapse into a
/// single space and the ends are trimmed.
///
/// ```rust
/// use formcheck::transform::capitalize_words;
///
/// assert_eq!(capitalize_words("ada  LOVELACE ".to_string()), "Ada Lovelace");
/// ```
pub fn capitalize_words(s: String) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Looks up a transform by the name descriptors use.
pub fn by_name(name: &str) -> Option<fn(String) -> String> {
    match name {
        "trim" => Some(trim),
        "lowercase" => Some(lowercase),
        "uppercase" => Some(uppercase),
        "capitalize_words" => Some(capitalize_words),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize_words("ada lovelace".into()), "Ada Lovelace");
        assert_eq!(capitalize_words("  grace   HOPPER".into()), "Grace Hopper");
        assert_eq!(capitalize_words("élodie".into()), "Élodie");
        assert_eq!(capitalize_words("".into()), "");
    }

    #[test]
    fn test_capitalize_is_idempotent() {
        let once = capitalize_words("jean-luc picard".into());
        assert_eq!(capitalize_words(once.clone()), once);
    }

    #[test]
    fn test_by_name() {
        assert_eq!(by_name("trim").unwrap()("  x ".into()), "x");
        assert_eq!(by_name("lowercase").unwrap()("AbC".into()), "abc");
        assert!(by_name("reverse").is_none());
    }
}
