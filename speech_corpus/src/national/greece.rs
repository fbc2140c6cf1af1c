//! Πρακτικά of the Hellenic Parliament, as Word documents. A speech starts with a paragraph
//! `ΝΙΚΟΛΑΟΣ ΠΑΠΠΑΣ (Υπουργός Ψηφιακής Πολιτικής): ...`; the chair is written the other way
//! round, `ΠΡΟΕΔΡΕΥΩΝ (Γεώργιος Βαρεμένος): ...`.

use once_cell::sync::Lazy;
use regex::Regex;
use crate::country::CountryConfig;
use crate::docx_util::{read_docx_paragraphs, DocxParagraph};
use crate::error::StructureError;
use crate::normalize::normalize_string;
use crate::parse_util::{find_date_with_month_names, find_numeric_date, SourceDocument, GREEK_MONTHS};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};

pub const GREECE : CountryConfig = CountryConfig {
    name: "greece",
    parliament: "hellenic parliament",
    iso3country: "GRC",
    language: "el",
    source_pattern: "*.docx",
    fieldnames: &["date","agenda","speechnumber","paragraphnumber","speaker_name","party","text","parliament","iso3country","partyname","speakerrole","period","session","sitting"],
    extractor: parse_greek_parliament,
};

static SPEECH_START : Lazy<Regex> = Lazy::new(||Regex::new(r"^[Α-Ω]{3,}.*:").unwrap());
static APPLAUSE : Lazy<Regex> = Lazy::new(||Regex::new(r"^\(").unwrap());
static CHAIR : Lazy<Regex> = Lazy::new(||Regex::new(r"^(ΠΡΟΕΔΡΕΥΟΥΣΑ|ΠΡΟΕΔΡΕΥΩΝ)").unwrap());
static NAME_AND_BRACKETS : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?P<outer>[^(]*)\((?P<inner>.*)\)$").unwrap());
static PERIOD : Lazy<Regex> = Lazy::new(||Regex::new(r"^[Α-Ω]{1,3}\S?\s+ΠΕΡΙΟΔΟΣ").unwrap());
static SESSION : Lazy<Regex> = Lazy::new(||Regex::new(r"^ΣΥΝΟΔΟΣ").unwrap());
static SITTING : Lazy<Regex> = Lazy::new(||Regex::new(r"^ΣΥΝΕΔΡΙΑΣΗ").unwrap());

pub fn parse_greek_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    let paragraphs : Vec<String> = read_docx_paragraphs(&doc.path)?.iter().map(DocxParagraph::text).collect();
    let date = paragraphs.iter().find_map(|p|find_date_with_month_names(&normalize_string(p),&GREEK_MONTHS))
        .or_else(||find_numeric_date(&doc.stem()))
        .ok_or(StructureError::MissingAnchor("the date of the sitting"))?;
    Ok(parse_paragraphs(&paragraphs,&date))
}

/// The parliamentary period (`ΙΗ΄`), session and sitting numbers from the heading of the minutes.
#[derive(Debug,Default,PartialEq)]
struct SittingNumbers {
    period : String,
    session : String,
    sitting : String,
}

impl SittingNumbers {
    fn find(paragraphs:&[String]) -> SittingNumbers {
        let word = |p:&str,n:usize|p.split_whitespace().nth(n).unwrap_or("").to_string();
        let mut res = SittingNumbers::default();
        for p in paragraphs.iter().map(|p|p.trim()) {
            if res.period.is_empty() && PERIOD.is_match(p) { res.period = word(p,0); }
            if res.session.is_empty() && SESSION.is_match(p) { res.session = word(p,1); }
            if res.sitting.is_empty() && SITTING.is_match(p) { res.sitting = word(p,1); }
            if !(res.period.is_empty() || res.session.is_empty() || res.sitting.is_empty()) { break }
        }
        res
    }
}

/// `ΝΙΚΟΛΑΟΣ ΠΑΠΠΑΣ (Υπουργός)` → (`ΝΙΚΟΛΑΟΣ ΠΑΠΠΑΣ`, `Υπουργός`), with the chair the other way round.
fn speaker_and_role(announcement:&str) -> (String,String) {
    let announcement = announcement.trim();
    match NAME_AND_BRACKETS.captures(announcement) {
        Some(cap) if CHAIR.is_match(announcement) => (cap["inner"].trim().to_string(),cap["outer"].trim().to_string()),
        Some(cap) => (cap["outer"].trim().to_string(),cap["inner"].trim().to_string()),
        None => (announcement.to_string(),String::new()),
    }
}

fn parse_paragraphs(paragraphs:&[String],date:&str) -> Vec<SpeechParagraph> {
    let numbers = SittingNumbers::find(paragraphs);
    let mut sitting = SittingRecords::new(&GREECE,date);
    let mut state = SpeakerState::default();
    for paragraph in paragraphs {
        let mut text = paragraph.as_str();
        if SPEECH_START.is_match(paragraph) {
            if let Some((announcement,rest)) = paragraph.split_once(':') {
                let (speaker,role) = speaker_and_role(announcement);
                state = state.with_speaker(speaker).with_role(role);
                sitting.start_speech();
                text = rest;
            }
        }
        if !state.has_speaker() || APPLAUSE.is_match(text.trim_start()) { continue }
        if let Some(row) = sitting.push(&state,text) {
            let speaker_name = row.speaker.clone();
            row.set_extra("speaker_name",speaker_name)
                .set_extra("partyname","")
                .set_extra("period",numbers.period.as_str())
                .set_extra("session",numbers.session.as_str())
                .set_extra("sitting",numbers.sitting.as_str());
        }
    }
    sitting.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx_util::parse_document_xml;
    use crate::docx_util::tests::simple_paragraphs;
    use crate::speaker_state::assert_numbering;

    const MINUTES : &[&str] = &[
        "ΠΡΑΚΤΙΚΑ ΒΟΥΛΗΣ",
        "ΙΗ΄ ΠΕΡΙΟΔΟΣ ΠΡΟΕΔΡΕΥΟΜΕΝΗΣ ΚΟΙΝΟΒΟΥΛΕΥΤΙΚΗΣ ΔΗΜΟΚΡΑΤΙΑΣ",
        "ΣΥΝΟΔΟΣ Δ΄",
        "ΣΥΝΕΔΡΙΑΣΗ ΡΙΓ΄",
        "Τετάρτη 13 Μαρτίου 2019",
        "ΠΡΟΕΔΡΕΥΩΝ (Γεώργιος Βαρεμένος): Κυρίες και κύριοι συνάδελφοι, αρχίζει η συνεδρίαση.",
        "(Χειροκροτήματα)",
        "Το λόγο έχει ο κ. Παππάς.",
        "ΝΙΚΟΛΑΟΣ ΠΑΠΠΑΣ (Υπουργός Ψηφιακής Πολιτικής): Ευχαριστώ, κύριε Πρόεδρε.",
        "ΚΩΝΣΤΑΝΤΙΝΟΣ ΤΑΣΟΥΛΑΣ: Ο λόγος.",
    ];

    fn paragraphs() -> Vec<String> {
        parse_document_xml(&simple_paragraphs(MINUTES)).unwrap().iter().map(DocxParagraph::text).collect()
    }

    #[test]
    fn test_parse_paragraphs() {
        let paragraphs = paragraphs();
        let date = paragraphs.iter().find_map(|p|find_date_with_month_names(p,&GREEK_MONTHS)).unwrap();
        assert_eq!("2019-03-13",date);
        let records = parse_paragraphs(&paragraphs,&date);
        assert_numbering(&records);
        assert_eq!(4,records.len());
        assert_eq!(("Γεώργιος Βαρεμένος","ΠΡΟΕΔΡΕΥΩΝ",1,1),(records[0].speaker.as_str(),records[0].speakerrole.as_str(),records[0].speechnumber,records[0].paragraphnumber));
        assert_eq!(("Το λόγο έχει ο κ. Παππάς.",2),(records[1].text.as_str(),records[1].paragraphnumber));
        assert_eq!(("ΝΙΚΟΛΑΟΣ ΠΑΠΠΑΣ","Υπουργός Ψηφιακής Πολιτικής","Ευχαριστώ, κύριε Πρόεδρε."),(records[2].field("speaker_name").as_str(),records[2].speakerrole.as_str(),records[2].text.as_str()));
        assert_eq!(("ΚΩΝΣΤΑΝΤΙΝΟΣ ΤΑΣΟΥΛΑΣ","",3),(records[3].speaker.as_str(),records[3].speakerrole.as_str(),records[3].speechnumber));
        assert_eq!(("ΙΗ΄","Δ΄","ΡΙΓ΄"),(records[3].field("period").as_str(),records[3].field("session").as_str(),records[3].field("sitting").as_str()));
    }
}
