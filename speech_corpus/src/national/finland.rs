//! Pöytäkirjat of the Eduskunta, published as PDF.
//!
//! The document is read as rows of text with empty rows between paragraphs. Agenda items are
//! numbered (`2. Hallituksen esitys ...`) and run until the item with the next number. Within an
//! item a speech starts after an empty row with the speaker and a colon, e.g.
//! `14.05 Ben Zyskowicz kok: Arvoisa puhemies!` or `Puhemies Maria Lohela: ...`, and runs until
//! the next speaker.

use once_cell::sync::Lazy;
use regex::Regex;
use crate::country::CountryConfig;
use crate::error::StructureError;
use crate::parse_pdf_util::{parse_pdf_to_lines, text_rows, PdfLine};
use crate::parse_util::{iso_date, SourceDocument};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};

pub const FINLAND : CountryConfig = CountryConfig {
    name: "finland",
    parliament: "Eduskunta",
    iso3country: "FIN",
    language: "fi",
    source_pattern: "*.pdf",
    fieldnames: &["date","session","agenda","speechnumber","paragraphnumber","speaker","party","text","parliament","iso3country"],
    extractor: parse_finnish_parliament,
};

const PARTIES : &[&str] = &["sdp","ps","kok","kesk","vihr","vas","rkp","kd","liik","sd","r"];
/// Paragraphs this short are page furniture rather than speech.
const MIN_PARAGRAPH_LENGTH : usize = 10;

static AGENDA : Lazy<Regex> = Lazy::new(||Regex::new(r"^(\d{1,2})\. .{5,}$").unwrap());
static SPEAKER : Lazy<Regex> = Lazy::new(||Regex::new(concat!(
    r"^\d{1,2}\.\d{2} [A-ZÀ-Ÿ][a-zÀ-ÿA-ZÀ-Ÿ\-\.]+\s+(?:[A-Za-zÀ-ÿ\-\.]{2,}\s+){0,5}[A-Za-zÀ-ÿ\-]{2,}(?:\s+(?:sdp|ps|kok|kesk|vihr|vas|rkp|kd|liik|sd|r)*\s*\(.*\))*:(?:\s+|$)",
    r"|(?:puhemies |Puhemies )(?:[A-ZÀ-Ÿ\-\.][a-zÀ-ÿA-ZÀ-Ÿ\-\.]+\s*)+:(?:\s+|$)",
    r"|^(?:[A-ZÀ-Ÿ\-][a-zÀ-ÿA-ZÀ-Ÿ\-\.]+\s*)+(?:sdp|ps|kok|kesk|vihr|vas|rkp|kd|liik|sd|r):(?:\s+|$)",
    r"|(?:[A-ZÀ-Ÿ][a-zÀ-ÿA-ZÀ-Ÿ\-\.]+\s+){1,3}:")).unwrap());
static TIME : Lazy<Regex> = Lazy::new(||Regex::new(r"^\d{2}\.\d{2} ").unwrap());
static DATE : Lazy<Regex> = Lazy::new(||Regex::new(r"(\d{1,2})\.(\d{1,2})\.(\d{4})").unwrap());
static HEADLINE : Lazy<Regex> = Lazy::new(||Regex::new(r"Pöytäkirja PTK|Valmis").unwrap());
static PAGE_NUMBER : Lazy<Regex> = Lazy::new(||Regex::new(r"^\d+$").unwrap());
static DISCUSSION : Lazy<Regex> = Lazy::new(||Regex::new(r"^Keskustelu\s*$").unwrap());

pub fn parse_finnish_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    let lines : Vec<PdfLine> = parse_pdf_to_lines(&doc.path)?.into_iter()
        .filter(|l|!HEADLINE.is_match(&l.text) && !PAGE_NUMBER.is_match(l.text.trim()))
        .collect();
    parse_rows(&text_rows(&lines),&doc.stem())
}

/// Join rows into text. A row ending in a hyphen is a word split over two rows.
fn join_rows<'a>(rows:impl IntoIterator<Item=&'a str>) -> String {
    let mut res = String::new();
    for row in rows {
        match row.strip_suffix('-') {
            Some(start) => res.push_str(start),
            None => { res.push_str(row); res.push(' '); }
        }
    }
    res.trim().to_string()
}

fn sitting_date(rows:&[String]) -> anyhow::Result<String> {
    let cap = rows.iter().take(30).find_map(|r|DATE.captures(r)).ok_or(StructureError::MissingAnchor("the date of the sitting"))?;
    iso_date(cap[3].parse()?,cap[2].parse()?,cap[1].parse()?)
}

struct AgendaItem {
    title : String,
    start : usize,
    end : usize,
}

fn agenda_number(row:&str) -> Option<u32> { AGENDA.captures(row).and_then(|c|c[1].parse().ok()) }

/// Agenda items start with a numbered row after an empty row, and end where the item with the
/// next number starts (a numbered row followed by another is a list, not an item).
fn agenda_items(rows:&[String],from:usize) -> Vec<AgendaItem> {
    let mut items = vec![];
    let mut i = from.max(1);
    while i<rows.len() {
        let Some(number) = agenda_number(&rows[i]).filter(|_|rows[i-1].is_empty()) else { i+=1; continue };
        let title_end = rows[i..].iter().position(|r|r.is_empty()).map(|p|i+p).unwrap_or(rows.len());
        let title = join_rows(rows[i..title_end].iter().map(|r|r.as_str()));
        let end = (i+1..rows.len()).find(|&j|agenda_number(&rows[j])==Some(number+1) && rows.get(j+1).and_then(|r|agenda_number(r)).is_none()).unwrap_or(rows.len());
        items.push(AgendaItem{ title, start: i, end });
        i = end;
    }
    items
}

/// The row at `i`, with the next row appended when a timed speaker line is broken before its colon.
fn speaker_row(rows:&[String],i:usize) -> String {
    let row = &rows[i];
    match rows.get(i+1) {
        Some(next) if TIME.is_match(row) && !row.contains(':') => format!("{} {}",row,next),
        _ => row.clone(),
    }
}

/// `14.05 Ben Zyskowicz kok` → (`Ben Zyskowicz`, `kok`)
fn speaker_and_party(row:&str) -> (String,String) {
    let mut speaker = row.split(':').next().unwrap_or("").trim();
    if speaker.ends_with(')') { speaker = speaker.split('(').next().unwrap_or("").trim(); }
    if TIME.is_match(speaker) { speaker = speaker[5..].trim(); }
    match speaker.rsplit_once(' ') {
        Some((name,party)) if PARTIES.contains(&party) => (name.trim().to_string(),party.to_string()),
        _ => (speaker.to_string(),String::new()),
    }
}

/// Split rows into paragraphs at empty rows.
fn paragraphs(rows:&[String]) -> Vec<String> {
    rows.split(|r|r.is_empty()).filter(|p|!p.is_empty()).map(|p|join_rows(p.iter().map(|r|r.as_str()))).collect()
}

fn parse_rows(rows:&[String],session:&str) -> anyhow::Result<Vec<SpeechParagraph>> {
    let date = sitting_date(rows)?;
    let start = rows.iter().position(|r|r.contains("Nimenhuuto")).unwrap_or(0);
    let mut sitting = SittingRecords::new(&FINLAND,date);
    for item in agenda_items(rows,start) {
        let speakers : Vec<usize> = (item.start+1..item.end).filter(|&i|rows[i-1].is_empty() && SPEAKER.is_match(&speaker_row(rows,i))).collect();
        for &speech_start in &speakers {
            let speech_end = (speech_start+1..item.end).find(|&k|SPEAKER.is_match(&speaker_row(rows,k))).unwrap_or(item.end);
            let header = speaker_row(rows,speech_start);
            let (speaker,party) = speaker_and_party(&header);
            let state = SpeakerState::default().with_agenda(item.title.as_str()).with_speaker(speaker).with_party(party);
            sitting.start_speech();
            // The speech begins after the colon of the speaker row.
            let first_row = header.split_once(':').map(|(_,t)|t.trim().to_string()).unwrap_or_default();
            let body_start = if header==rows[speech_start] { speech_start+1 } else { speech_start+2 };
            let body : Vec<String> = std::iter::once(first_row).chain(rows[body_start.min(speech_end)..speech_end].iter().cloned()).collect();
            for (n,paragraph) in paragraphs(&body).into_iter().enumerate() {
                if n>0 && (paragraph.chars().count()<=MIN_PARAGRAPH_LENGTH || DISCUSSION.is_match(&paragraph)) { continue }
                if let Some(row) = sitting.push(&state,&paragraph) { row.set_extra("session",session); }
            }
        }
    }
    Ok(sitting.finish())
}
