//! The static description of each parliament that has an extractor, and the language of
//! each country's corpus.

use anyhow::anyhow;
use crate::national;
use crate::parse_util::SourceDocument;
use crate::record::SpeechParagraph;

/// Parse one source document into rows.
pub type Extractor = fn(&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>>;

pub struct CountryConfig {
    /// The name of the country. [country_folder] gives the folder under `national/` holding its data.
    pub name : &'static str,
    pub parliament : &'static str,
    pub iso3country : &'static str,
    pub language : &'static str,
    /// Glob matched against file names in a year's `source` folder.
    pub source_pattern : &'static str,
    /// The columns of the parsed CSV, in order.
    pub fieldnames : &'static [&'static str],
    pub extractor : Extractor,
}

impl std::fmt::Debug for CountryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f,"{} ({})",self.name,self.parliament)
    }
}

/// The columns most extractors write.
pub const STANDARD_FIELDNAMES : &[&str] = &["date","agenda","speechnumber","paragraphnumber","speaker","party","text","parliament","iso3country"];
pub const STANDARD_FIELDNAMES_WITH_ROLE : &[&str] = &["date","agenda","speechnumber","paragraphnumber","speaker","speakerrole","party","text","parliament","iso3country"];

pub static COUNTRIES : &[&CountryConfig] = &[
    &national::germany::GERMANY,
    &national::ireland::IRELAND,
    &national::ep::EP,
    &national::poland::POLAND,
    &national::austria::AUSTRIA,
    &national::denmark::DENMARK,
    &national::france::FRANCE,
    &national::united_kingdom::UNITED_KINGDOM,
    &national::sweden::SWEDEN,
    &national::estonia::ESTONIA,
    &national::hungary::HUNGARY,
    &national::bulgaria::BULGARIA,
    &national::portugal::PORTUGAL,
    &national::greece::GREECE,
    &national::slovakia::SLOVAKIA,
    &national::malta::MALTA,
    &national::cyprus::CYPRUS,
    &national::belgium::BELGIUM,
    &national::finland::FINLAND,
    &national::lithuania::LITHUANIA,
    &national::romania::ROMANIA,
];

/// Names that have been used for a country's folder in the past.
fn canonical_name(name:&str) -> &str {
    match name {
        "sweeden" => "sweden",
        "uk" => "united_kingdom",
        _ => name,
    }
}

/// The folder under `national/` holding a country's data. Sweden's folder keeps its old spelling.
pub fn country_folder(name:&str) -> &str {
    match canonical_name(name) {
        "sweden" => "sweeden",
        name => name,
    }
}

pub fn country_config(name:&str) -> anyhow::Result<&'static CountryConfig> {
    let name = canonical_name(name);
    COUNTRIES.iter().copied().find(|c|c.name==name).ok_or_else(||anyhow!("No extractor for country {}",name))
}

/// Countries whose corpus is built only from CSVs produced by other means, and their languages.
const LEGACY_ONLY_LANGUAGES : &[(&str,&str)] = &[
    ("czechia","cs"),
    ("spain","es"),
    ("netherland","nl"),
    ("slovenia","sl"),
    ("croatia","hr"),
    ("italy","it"),
    ("latvia","lv"),
    ("norway","no"),
];

/// The language of a country's corpus. For the European Parliament, which has a corpus per
/// language, the language must be given; `cy` is taken to mean Greek.
pub fn corpus_language(country:&str,language:Option<&str>) -> anyhow::Result<String> {
    let country = canonical_name(country);
    if country=="ep" {
        let language = language.ok_or_else(||anyhow!("A language is needed for the European Parliament corpus"))?;
        return Ok(if language=="cy" { "el".to_string() } else { language.to_string() });
    }
    if let Some(config) = COUNTRIES.iter().find(|c|c.name==country) { return Ok(config.language.to_string()) }
    LEGACY_ONLY_LANGUAGES.iter().find(|(c,_)|*c==country).map(|(_,l)|l.to_string()).ok_or_else(||anyhow!("Unknown country {}",country))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!("SE-Riksdagen",country_config("sweeden").unwrap().parliament);
        assert_eq!("GER",country_config("germany").unwrap().iso3country);
        assert!(country_config("atlantis").is_err());
        assert_eq!("LTU",country_config("lithuania").unwrap().iso3country);
        assert_eq!("*.pdf",country_config("belgium").unwrap().source_pattern);
        let mut names : Vec<_> = COUNTRIES.iter().map(|c|c.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(COUNTRIES.len(),names.len());
    }

    #[test]
    fn test_languages() {
        assert_eq!("el",corpus_language("cyprus",None).unwrap());
        assert_eq!("ga",corpus_language("ireland",None).unwrap());
        assert_eq!("ro",corpus_language("romania",None).unwrap());
        assert_eq!("el",corpus_language("ep",Some("cy")).unwrap());
        assert_eq!("de",corpus_language("ep",Some("de")).unwrap());
        assert!(corpus_language("ep",None).is_err());
        assert!(corpus_language("atlantis",None).is_err());
        assert_eq!("fi",corpus_language("finland",None).unwrap());
        assert_eq!("hr",corpus_language("croatia",None).unwrap());
    }

    #[test]
    fn test_country_folder() {
        assert_eq!("sweeden",country_folder("sweden"));
        assert_eq!("sweeden",country_folder("sweeden"));
        assert_eq!("united_kingdom",country_folder("uk"));
        assert_eq!("germany",country_folder("germany"));
        assert_eq!("croatia",country_folder("croatia"));
    }
}
