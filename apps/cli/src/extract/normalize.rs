//! Text normalization helpers shared by the extraction strategies.

use regex::Regex;
use std::sync::OnceLock;

/// Decodes the small fixed set of HTML entities the source markup uses.
/// `&amp;` is decoded last so already-escaped entities are not double-decoded.
pub fn decode_html_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Decodes `\uXXXX` escape sequences by codepoint substitution.
/// Invalid codepoints are left untouched.
pub fn decode_unicode_escapes(s: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\\u([0-9a-fA-F]{4})").unwrap());

    re.replace_all(s, |caps: &regex::Captures| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

/// Maps free-text language proficiency to one of six canonical display bands.
/// Ordered case-insensitive substring checks; first match wins; unmatched
/// input is passed through verbatim.
pub fn map_proficiency(proficiency: &str) -> String {
    let lower = proficiency.to_lowercase();
    if lower.contains("native") || lower.contains("bilingual") {
        "Native".into()
    } else if lower.contains("full professional") || lower.contains("fluent") {
        "Fluent (C1-C2)".into()
    } else if lower.contains("professional working") {
        "Professional (B2)".into()
    } else if lower.contains("limited working") {
        "Intermediate (B1)".into()
    } else if lower.contains("elementary") {
        "Elementary (A2)".into()
    } else {
        proficiency.to_string()
    }
}

/// Uppercases the first character and lowercases the remainder.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_html_entities() {
        assert_eq!(
            decode_html_entities("R&amp;D &lt;team&gt; &quot;core&quot; &#39;x&#39;"),
            "R&D <team> \"core\" 'x'"
        );
    }

    #[test]
    fn test_decode_html_entities_no_double_decode() {
        assert_eq!(decode_html_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_decode_unicode_escapes() {
        assert_eq!(decode_unicode_escapes("caf\\u00e9"), "café");
        assert_eq!(decode_unicode_escapes("\\u003Cbr\\u003E"), "<br>");
    }

    #[test]
    fn test_decode_unicode_escapes_leaves_plain_text() {
        assert_eq!(decode_unicode_escapes("no escapes here"), "no escapes here");
    }

    #[test]
    fn test_map_proficiency_bands() {
        assert_eq!(map_proficiency("Native or bilingual proficiency"), "Native");
        assert_eq!(map_proficiency("Full professional proficiency"), "Fluent (C1-C2)");
        assert_eq!(map_proficiency("Professional working proficiency"), "Professional (B2)");
        assert_eq!(map_proficiency("Limited working proficiency"), "Intermediate (B1)");
        assert_eq!(map_proficiency("Elementary proficiency"), "Elementary (A2)");
    }

    #[test]
    fn test_map_proficiency_first_match_wins() {
        // "bilingual" outranks "full professional" because it is checked first
        assert_eq!(map_proficiency("Bilingual, full professional"), "Native");
    }

    #[test]
    fn test_map_proficiency_passthrough() {
        assert_eq!(map_proficiency("Conversational"), "Conversational");
    }

    #[test]
    fn test_capitalize_first() {
        assert_eq!(capitalize_first("john"), "John");
        assert_eq!(capitalize_first("DOE"), "Doe");
        assert_eq!(capitalize_first(""), "");
    }
}
