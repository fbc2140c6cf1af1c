//! Text clean-up shared by all the extractors.
//!
//! Every paragraph of text that ends up in a parsed CSV goes through [normalize_string].

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static MULTIPLE_SPACES : Lazy<Regex> = Lazy::new(||Regex::new(" +").unwrap());
static ALPHABETIC : Lazy<Regex> = Lazy::new(||Regex::new("[A-Za-zΑ-Ωα-ω\u{0410}-\u{044F}]").unwrap());
/// `<title> NAME (PARTY): text`. The title and party are optional.
static SPEAKER_LINE : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?:(?:Hr|Fr|Dr|Herr|Frau|Mrs|Mr|Ms|Mme|M)\.?\s+)*(?P<name>[^():]+?)\s*(?:\((?P<party>[^()]*)\))?\s*:\s*(?P<text>.*)$").unwrap());

/// Remove newlines, surrounding white space and leading commas and full stops, collapse
/// runs of spaces and apply Unicode NFKC normalization.
///
/// Applying it to its own output changes nothing.
pub fn normalize_string(s:&str) -> String {
    let without_newlines : String = s.chars().filter(|&c|c!='\n').collect();
    let normalized : String = without_newlines.nfkc().collect();
    let trimmed = normalized.trim_end().trim_start_matches(|c:char|c.is_whitespace()||c==','||c=='.');
    MULTIPLE_SPACES.replace_all(trimmed," ").to_string()
}

/// Like [normalize_string], but carriage returns and tabs count as spaces first. Useful for sources with CRLF line endings.
pub fn normalize_whitespace(s:&str) -> String {
    let spaced : String = s.chars().map(|c| if c=='\r' || c=='\t' { ' ' } else { c }).collect();
    normalize_string(&spaced)
}

pub fn remove_soft_hyphens(s:&str) -> String {
    s.replace('\u{00AD}',"")
}

/// Whether the text contains at least one Latin, Greek or Cyrillic letter.
pub fn has_alphabetic(s:&str) -> bool {
    ALPHABETIC.is_match(s)
}

/// Split a line of the form `Hr. MUSTERMANN (SPD): Ich bin dagegen.` into speaker, party and text.
/// Returns None if there is no colon after a plausible name.
pub fn split_speaker_line(line:&str) -> Option<(String,String,String)> {
    let line = normalize_whitespace(line);
    let cap = SPEAKER_LINE.captures(&line)?;
    let name = cap["name"].trim().to_string();
    if name.is_empty() { return None }
    let party = cap.name("party").map(|m|m.as_str().trim().to_string()).unwrap_or_default();
    Some((name,party,cap["text"].trim().to_string()))
}

/// First letter upper case, the rest lower case.
pub fn capitalize(s:&str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c|c.to_lowercase())).collect(),
        None => String::new(),
    }
}

/// Upper case the first letter of every run of letters, lower case everything else.
pub fn title_case(s:&str) -> String {
    let mut res = String::with_capacity(s.len());
    let mut previous_was_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if previous_was_letter { res.extend(c.to_lowercase()) } else { res.extend(c.to_uppercase()) }
            previous_was_letter = true;
        } else {
            res.push(c);
            previous_was_letter = false;
        }
    }
    res
}

/// Whether all the letters in the string are upper case (and there is at least one).
pub fn is_upper(s:&str) -> bool {
    s.chars().any(|c|c.is_alphabetic()) && !s.chars().any(|c|c.is_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_string() {
        assert_eq!("Ich bin dagegen.", normalize_string("  Ich   bin\n dagegen.  "));
        assert_eq!("first point", normalize_string(", . first point"));
        assert_eq!("fi", normalize_string("\u{FB01}")); // ligature
        assert_eq!("a b", normalize_string("a\u{00A0}\u{00A0}b"));
        assert_eq!("", normalize_string(" \n "));
    }

    #[test]
    fn test_normalize_string_idempotent() {
        for s in ["  Hr.   MUSTERMANN (SPD):   Ich   bin\r\n dagegen.  ", ",\tx", "\u{FE50} text", "e\n\u{0301}", "Διάβασμα  της  ημερήσιας", "  .  ,. ", "Ⅻ  ﬀ \u{2003} end "] {
            let once = normalize_string(s);
            assert_eq!(once, normalize_string(&once), "not idempotent for {:?}", s);
            let once = normalize_whitespace(s);
            assert_eq!(once, normalize_whitespace(&once), "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn test_split_speaker_line() {
        assert_eq!(Some(("MUSTERMANN".to_string(),"SPD".to_string(),"Ich bin dagegen.".to_string())), split_speaker_line("  Hr.   MUSTERMANN (SPD):   Ich   bin\r\n dagegen.  "));
        assert_eq!(Some(("Anna Schmidt".to_string(),"".to_string(),"Gut.".to_string())), split_speaker_line("Frau Anna Schmidt: Gut."));
        assert_eq!(None, split_speaker_line("No colon here"));
    }

    #[test]
    fn test_letter_helpers() {
        assert!(has_alphabetic("12 Ωx"));
        assert!(has_alphabetic("Добро"));
        assert!(!has_alphabetic("12, 13 -- (...)"));
        assert_eq!("Jean-Marie Le Pen", title_case("JEAN-MARIE LE PEN"));
        assert_eq!("Abela", capitalize("ABELA"));
        assert!(is_upper("ΠΡΟΕΔΡΟΣ:"));
        assert!(!is_upper("Mr Speaker"));
        assert!(!is_upper("123"));
        assert_eq!("Trennung", remove_soft_hyphens("Tren\u{00AD}nung"));
    }
}
