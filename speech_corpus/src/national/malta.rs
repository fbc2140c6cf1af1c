//! Kamra tad-Deputati debates, as Word documents.
//!
//! A speech starts with `ONOR. ROBERT ABELA (Prim Ministru): ...`, or, for parliamentary
//! questions, `12345. ONOR. ...:`; the question's topic is the upper case paragraph before it.
//! Stage directions are paragraphs entirely in italics.

use std::collections::HashSet;
use once_cell::sync::Lazy;
use regex::Regex;
use crate::country::CountryConfig;
use crate::docx_util::{read_docx_paragraphs, DocxParagraph};
use crate::error::StructureError;
use crate::normalize::{capitalize, is_upper, normalize_string};
use crate::parse_util::{find_numeric_date, SourceDocument};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};

pub const MALTA : CountryConfig = CountryConfig {
    name: "malta",
    parliament: "MT-Kamra tad-Deputati",
    iso3country: "MLT",
    language: "mt",
    source_pattern: "*.docx",
    fieldnames: &["date","parliament","iso3country","speaker","speechnumber","paragraphnumber","agenda","text"],
    extractor: parse_maltese_parliament,
};

static SPEECH_START : Lazy<Regex> = Lazy::new(||Regex::new(r"^([A-Z]{2,}|\d+\.).*:").unwrap());
static QUESTION : Lazy<Regex> = Lazy::new(||Regex::new(r"^\d+\.").unwrap());
static NAMED_SPEAKER : Lazy<Regex> = Lazy::new(||Regex::new(r"^[A-Z]{2,}.*:").unwrap());
static QUOTE_START : Lazy<Regex> = Lazy::new(||Regex::new(r#"^["'“]"#).unwrap());
static QUOTE_END : Lazy<Regex> = Lazy::new(||Regex::new(r"”\.?$").unwrap());

pub fn parse_maltese_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    let stem = doc.stem();
    let date = find_numeric_date(stem.get(..10).unwrap_or(&stem)).ok_or(StructureError::MissingAnchor("the date at the start of the file name"))?;
    parse_paragraphs(&read_docx_paragraphs(&doc.path)?,&date)
}

/// Italic paragraphs that are neither quotations nor headings.
fn is_stage_direction(p:&DocxParagraph) -> bool {
    let text = p.text();
    p.all_italic() && !QUOTE_START.is_match(&text) && !QUOTE_END.is_match(&text) && !p.runs.iter().all(|r|is_upper(&r.text))
}

/// `12345. ONOR. DR ROBERT ABELA (Prim Ministru)` → `Dr Robert Abela`
fn speaker_name(announcement:&str) -> String {
    let announcement = announcement.replace('.',"");
    let announcement = announcement.split('(').next().unwrap_or("");
    announcement.split_whitespace()
        .filter(|t|!t.chars().all(|c|c.is_ascii_digit()))
        .take_while(|t|is_upper(t))
        .filter(|t|!t.to_lowercase().contains("onor"))
        .map(capitalize)
        .collect::<Vec<_>>().join(" ")
}

fn parse_paragraphs(docx:&[DocxParagraph],date:&str) -> anyhow::Result<Vec<SpeechParagraph>> {
    let stage_directions : HashSet<String> = docx.iter().filter(|p|is_stage_direction(p)).map(|p|p.text()).collect();
    let paragraphs : Vec<String> = docx.iter().map(|p|p.text()).filter(|t|!stage_directions.contains(t)).map(|t|t.trim().to_string()).filter(|t|!t.is_empty()).collect();
    let start = paragraphs.iter().position(|p|SPEECH_START.is_match(p)).ok_or(StructureError::MissingAnchor("the first speech"))?;
    let mut sitting = SittingRecords::new(&MALTA,date);
    let mut state = SpeakerState::default();
    for i in start..paragraphs.len() {
        let paragraph = &paragraphs[i];
        let previous = if i>0 { paragraphs[i-1].as_str() } else { "" };
        if (QUESTION.is_match(paragraph) || NAMED_SPEAKER.is_match(paragraph)) && is_upper(previous) {
            state = state.with_agenda(capitalize(previous));
        }
        let mut text = paragraph.as_str();
        if SPEECH_START.is_match(paragraph) {
            if let Some((announcement,rest)) = paragraph.split_once(':') {
                state = state.with_speaker(speaker_name(announcement));
                sitting.start_speech();
                text = rest;
            }
        }
        if is_upper(text) { continue }
        sitting.push(&state,&normalize_string(text));
    }
    Ok(sitting.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx_util::parse_document_xml;
    use crate::docx_util::tests::document_xml;
    use crate::speaker_state::assert_numbering;

    fn paragraph(text:&str,italic:bool) -> String {
        let properties = if italic { "<w:rPr><w:i/></w:rPr>" } else { "" };
        format!(r#"<w:p><w:r>{}<w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,properties,text)
    }

    #[test]
    fn test_parse_paragraphs() {
        let body = [
            paragraph("IL-KAMRA TAD-DEPUTATI",false),
            paragraph("Seduta Numru 12",false),
            paragraph("ONOR. SPEAKER: Il-Kamra hija miftuħa.",false),
            paragraph("(Il-Membri jieqfu)",true),
            paragraph("MISTOQSIJIET",false),
            paragraph("TOROQ FIL-GŻEJJER",false),
            paragraph("12345. ONOR. DAVID AGIUS (PN) staqsa lill-Ministru:",false),
            paragraph("Jista’ jgħid x’inhu l-pjan?",false),
            paragraph("“Dan hu kwot.”",true),
            paragraph("ONOR. DR ROBERT ABELA (Prim Ministru): Grazzi.",false),
        ].concat();
        let docx = parse_document_xml(&document_xml(&body)).unwrap();
        let records = parse_paragraphs(&docx,"2015-03-04").unwrap();
        assert_numbering(&records);
        assert_eq!(4,records.len());
        assert_eq!(("Speaker","Il-Kamra hija miftuħa.",""),(records[0].speaker.as_str(),records[0].text.as_str(),records[0].agenda.as_str()));
        assert_eq!(("David Agius","Jista’ jgħid x’inhu l-pjan?","Toroq fil-gżejjer",2,1),(records[1].speaker.as_str(),records[1].text.as_str(),records[1].agenda.as_str(),records[1].speechnumber,records[1].paragraphnumber));
        assert_eq!(("“Dan hu kwot.”",2),(records[2].text.as_str(),records[2].paragraphnumber));
        assert_eq!(("Dr Robert Abela","Grazzi.",3),(records[3].speaker.as_str(),records[3].text.as_str(),records[3].speechnumber));
    }

    #[test]
    fn test_speaker_name() {
        assert_eq!("Robert Abela",speaker_name("12345. ONOR. ROBERT ABELA (Prim Ministru)"));
        assert_eq!("Speaker",speaker_name("ONOR. SPEAKER"));
    }
}
