//! Diário da Assembleia da República, published as PDF.
//!
//! The text is read line by line with its position. A speech starts with a line such as
//! `O Sr. João Oliveira (PCP): — Sr. Presidente, ...`; a line starting at the paragraph indent
//! starts a new paragraph, other lines continue the previous one. Stage directions are set in
//! italics, which the PDF does not tell us, so they are taken from the `.docx` version of the
//! same document when it was downloaded too.

use std::collections::HashSet;
use std::path::Path;
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use crate::country::{CountryConfig, STANDARD_FIELDNAMES_WITH_ROLE};
use crate::docx_util::read_docx_paragraphs;
use crate::error::StructureError;
use crate::parse_pdf_util::{parse_pdf_to_lines, PdfLine};
use crate::parse_util::{find_date_with_month_names, SourceDocument, PORTUGUESE_MONTHS};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};

pub const PORTUGAL : CountryConfig = CountryConfig {
    name: "portugal",
    parliament: "PT-Assembleia da República",
    iso3country: "PRT",
    language: "pt",
    source_pattern: "*.pdf",
    fieldnames: STANDARD_FIELDNAMES_WITH_ROLE,
    extractor: parse_portuguese_parliament,
};

static SPEAKER_LINE : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?:O\s+Sr\.|A\s+Sr\.[aª]|Sr\.)\s+.*[.:]\s{0,3}—").unwrap());
static SPEAKER_SPLIT : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?P<meta>.*?)[.:]\s*—\s*(?P<text>.*)$").unwrap());
static SALUTATION : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?:O\s+Sr\.|A\s+Sr\.[aª]|Sr\.)\s*").unwrap());
static NAME_AND_PARTY : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?P<name>[^(]*)\((?P<party>.*)\)").unwrap());
static ROLES : Lazy<Regex> = Lazy::new(||Regex::new(r"^(Secretário|Secretária|Presidente|Ministro)").unwrap());
static DATE_LINE : Lazy<Regex> = Lazy::new(||Regex::new(r"^\d+\s+DE\s+\p{Lu}+").unwrap());
static PAGE_NUMBER : Lazy<Regex> = Lazy::new(||Regex::new(r"^\d+$").unwrap());
static CROWD : Lazy<Regex> = Lazy::new(||Regex::new(r"^Vozes\s{0,3}.*:").unwrap());
static ATTENDANCE : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?:Srs\.\s+)?Deputados presentes à sessão").unwrap());
static NEXT_SPEAKER : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?:O\s+Sr\.|A\s+Sr\.[aª])").unwrap());
static PUNCTUATION : Lazy<Regex> = Lazy::new(||Regex::new(r"[^\w\s]").unwrap());
/// The president's formulas for ending the sitting, and the editorial notes printed after it.
static CLOSING : Lazy<Regex> = Lazy::new(||Regex::new(concat!(
    r"encerrada a sessão|terminado este debate|[Ee]stá encerrada sessão|concluídos os nossos trabalhos|terminada a sessão|",
    r"encerrada a reunião|[Dd]eclaro encerrada|terminámos nos nossos trabalhos|estão encerrados os nossos trabalhos|",
    r"A DIVISÃO DE REDAÇÃO")).unwrap());

const INDENT_TOLERANCE : f32 = 1.0;

pub fn parse_portuguese_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    let docx = doc.path.with_extension("docx");
    let stage_directions = if docx.is_file() { italic_lines(&docx)? } else { HashSet::new() };
    parse_lines(parse_pdf_to_lines(&doc.path)?,&stage_directions)
}

fn without_punctuation(s:&str) -> String { PUNCTUATION.replace_all(s.trim(),"").to_string() }

/// The italic runs of the Word version of a document, without punctuation.
fn italic_lines(path:&Path) -> anyhow::Result<HashSet<String>> {
    let paragraphs = read_docx_paragraphs(path)?;
    Ok(paragraphs.iter().flat_map(|p|p.runs.iter()).filter(|r|r.italic)
        .map(|r|r.text.trim())
        .filter(|t|!t.is_empty() && !ATTENDANCE.is_match(t))
        .map(without_punctuation)
        .collect())
}

/// `O Sr. Secretário (Duarte Pacheco)` → (speaker, role, party)
fn speaker_of(meta:&str) -> (String,String,String) {
    let meta = SALUTATION.replace(meta.trim(),"");
    let (name,party) = match NAME_AND_PARTY.captures(&meta) {
        Some(cap) => (cap["name"].trim().to_string(),cap["party"].trim().to_string()),
        None => (meta.trim().to_string(),String::new()),
    };
    if ROLES.is_match(&name) {
        let speaker = if party.is_empty() { name.clone() } else { party };
        (speaker,name,String::new())
    } else {
        (name,String::new(),party)
    }
}

/// Drop the list of deputies present, which runs from its heading to the next speaker.
fn remove_attendance_list(lines:&mut Vec<PdfLine>) {
    if let Some(start) = lines.iter().position(|l|ATTENDANCE.is_match(&l.text)) {
        if let Some(end) = lines[start+1..].iter().position(|l|NEXT_SPEAKER.is_match(&l.text)) {
            lines.drain(start..start+1+end);
        }
    }
}

fn parse_lines(lines:Vec<PdfLine>,stage_directions:&HashSet<String>) -> anyhow::Result<Vec<SpeechParagraph>> {
    let mut lines : Vec<PdfLine> = lines.into_iter()
        .filter(|l|!stage_directions.contains(&without_punctuation(&l.text)))
        .filter(|l|!PAGE_NUMBER.is_match(l.text.trim()))
        .collect();
    let date = lines.iter().filter(|l|DATE_LINE.is_match(l.text.trim())).find_map(|l|find_date_with_month_names(&l.text,&PORTUGUESE_MONTHS))
        .ok_or(StructureError::MissingAnchor("the date of the sitting"))?;
    lines.retain(|l|!DATE_LINE.is_match(l.text.trim()));
    let first_speech = lines.iter().position(|l|SPEAKER_LINE.is_match(&l.text)).ok_or(StructureError::MissingAnchor("the first speech"))?;
    let mut lines : Vec<PdfLine> = lines.split_off(first_speech).into_iter()
        .filter(|l|!l.text.trim().is_empty() && !l.text.contains("SÉRIE —") && !CROWD.is_match(&l.text))
        .collect();
    remove_attendance_list(&mut lines);
    let indent = lines.first().map(|l|l.x).unwrap_or_default();
    let mut sitting = SittingRecords::new(&PORTUGAL,date);
    let mut state = SpeakerState::default();
    for line in &lines {
        if SPEAKER_LINE.is_match(&line.text) {
            if let Some(cap) = SPEAKER_SPLIT.captures(&line.text) {
                let (speaker,role,party) = speaker_of(&cap["meta"]);
                state = state.with_speaker(speaker).with_role(role).with_party(party);
                sitting.start_speech();
                sitting.push(&state,&cap["text"]);
                continue;
            }
        }
        if (line.x-indent).abs()<INDENT_TOLERANCE {
            sitting.push(&state,&line.text);
        } else {
            sitting.append_to_last(&state,&line.text);
        }
    }
    let mut records = sitting.finish();
    match records.iter().position(|r|CLOSING.is_match(&r.text)) {
        Some(closing) => records.truncate(closing),
        None => info!("No closing phrase on {}",records.first().map(|r|r.date.as_str()).unwrap_or("")),
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speaker_state::assert_numbering;

    fn line(x:f32,text:&str) -> PdfLine { PdfLine{ page: 0, x, y: 0.0, text: text.to_string() } }

    fn sitting() -> Vec<PdfLine> {
        vec![
            line(50.0,"I SÉRIE — NÚMERO 1"),
            line(50.0,"3 DE MARÇO DE 2016"),
            line(60.0,"Srs. Deputados, está aberta a sessão."),
            line(60.0,"O Sr. Presidente: — Srs. Deputados, temos quórum."),
            line(60.0,"Eram 15 horas e 5 minutos."),
            line(60.0,"Srs. Deputados presentes à sessão:"),
            line(60.0,"Ana Silva"),
            line(60.0,"O Sr. João Oliveira (PCP): — Sr. Presidente, o Governo"),
            line(50.0,"tem de responder."),
            line(50.0,"12"),
            line(60.0,"Aplausos do PCP."),
            line(60.0,"Vozes do PS: — Muito bem!"),
            line(60.0,"Segundo parágrafo."),
            line(60.0,"A Sr.ª Secretária (Emília Santos): — Deu entrada na Mesa o projeto."),
            line(60.0,"O Sr. Presidente: — Está encerrada a sessão."),
            line(60.0,"Depois do fim."),
        ]
    }

    #[test]
    fn test_parse_lines() {
        let stage_directions : HashSet<String> = [without_punctuation("Aplausos do PCP.")].into_iter().collect();
        let records = parse_lines(sitting(),&stage_directions).unwrap();
        assert_numbering(&records);
        assert_eq!(5,records.len());
        assert_eq!("2016-03-03",records[0].date);
        assert_eq!(("Presidente","Presidente","Srs. Deputados, temos quórum."),(records[0].speaker.as_str(),records[0].speakerrole.as_str(),records[0].text.as_str()));
        assert_eq!(("Eram 15 horas e 5 minutos.",1,2),(records[1].text.as_str(),records[1].speechnumber,records[1].paragraphnumber));
        assert_eq!(("João Oliveira","PCP","Sr. Presidente, o Governo tem de responder."),(records[2].speaker.as_str(),records[2].party.as_str(),records[2].text.as_str()));
        assert_eq!(("Segundo parágrafo.",2,2),(records[3].text.as_str(),records[3].speechnumber,records[3].paragraphnumber));
        assert_eq!(("Emília Santos","Secretária",""),(records[4].speaker.as_str(),records[4].speakerrole.as_str(),records[4].party.as_str()));
    }

    #[test]
    fn test_missing_date() {
        let lines = sitting().into_iter().filter(|l|!l.text.contains("MARÇO")).collect();
        let err = parse_lines(lines,&HashSet::new()).unwrap_err();
        assert!(err.downcast_ref::<StructureError>().is_some());
    }

    #[test]
    fn test_speaker_of() {
        assert_eq!(("João Oliveira".to_string(),"".to_string(),"PCP".to_string()),speaker_of("O Sr. João Oliveira (PCP)"));
        assert_eq!(("Augusto Santos Silva".to_string(),"Ministro dos Negócios Estrangeiros".to_string(),"".to_string()),speaker_of("O Sr. Ministro dos Negócios Estrangeiros (Augusto Santos Silva)"));
    }
}
