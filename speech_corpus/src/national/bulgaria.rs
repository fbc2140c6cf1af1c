//! Стенограми of the Народно събрание. The sitting text is one block of lines; a speech starts
//! with a line `ПРЕДСЕДАТЕЛ ЦЕЦКА ЦАЧЕВА: ...` (role words, then the name, both upper case, an
//! optional party in parentheses and a colon) and agenda items are lines entirely in capitals.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node, Selector};
use crate::country::CountryConfig;
use crate::error::StructureError;
use crate::normalize::normalize_whitespace;
use crate::parse_util::{find_date_with_month_names, read_html, reformat_date, SourceDocument, BULGARIAN_MONTHS};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};

pub const BULGARIA : CountryConfig = CountryConfig {
    name: "bulgaria",
    parliament: "BG-Narodno sabranie",
    iso3country: "BGR",
    language: "bg",
    source_pattern: "*.html",
    fieldnames: &["date","title","agenda","speechnumber","paragraphnumber","speaker","speakerrole","party","text","parliament","iso3country"],
    extractor: parse_bulgarian_parliament,
};

static SPEAKER : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?P<speaker>(?:(?:[А-Я]{2,}|[А-Я]\.)(?:\s*-\s*[А-Я]{2,})?\s+)+[А-Я]+(?:\s*-\s*[А-Я]{2,})?)\s*(?:\((?P<party>[^()]+?)\))?\s*:(?P<text>.*)$").unwrap());
static AGENDA : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?:[А-Я\d]+[.?!,;\-\s]+)+[А-Я\d]+[.?!]?$").unwrap());
/// The longer role names first, so that `ЗАМЕСТНИК-ПРЕДСЕДАТЕЛ` is not read as `ЗАМЕСТНИК`.
static ROLE : Lazy<Regex> = Lazy::new(||Regex::new(r"^(ЗАМЕСТНИК МИНИСТЪР\s*-\s*ПРЕДСЕДАТЕЛ|МИНИСТЪР-ПРЕДСЕДАТЕЛ|ЗАМЕСТНИК-ПРЕДСЕДАТЕЛ|ЗАМЕСТНИК-МИНИСТЪР|ЗАМЕСТНИК|ПРЕДСЕДАТЕЛ|ДОКЛАДЧИК|МИНИСТЪР)\s+").unwrap());

static HEADER : Lazy<Selector> = Lazy::new(||Selector::parse("div.mb-3").unwrap());
static HEADER_TITLE : Lazy<Selector> = Lazy::new(||Selector::parse("h2").unwrap());
static BODY : Lazy<Selector> = Lazy::new(||Selector::parse("div.mt-4").unwrap());

pub fn parse_bulgarian_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    parse_transcript(&read_html(&doc.path)?)
}

/// The sitting date is written `13/07/2012` next to the title, older pages spell out the month in the title itself.
fn date_and_title(html:&Html) -> anyhow::Result<(String,String)> {
    let header = html.select(&HEADER).next().ok_or(StructureError::MissingAnchor("the header of the transcript"))?;
    let title = header.select(&HEADER_TITLE).next().map(|h|normalize_whitespace(&h.text().collect::<Vec<_>>().join(" "))).unwrap_or_default();
    let header_text = normalize_whitespace(&header.children().filter_map(|c|match c.value() { Node::Text(t) => Some(t.to_string()), _ => None }).collect::<Vec<_>>().join(" "));
    let date = match reformat_date(&header_text,"%d/%m/%Y") {
        Ok(date) => date,
        Err(_) => find_date_with_month_names(&title,&BULGARIAN_MONTHS).ok_or(StructureError::MissingAnchor("the date of the sitting"))?,
    };
    Ok((date,title))
}

/// `ЗАМЕСТНИК-ПРЕДСЕДАТЕЛ ЯВОР НОТЕВ` → (`ЯВОР НОТЕВ`, `ЗАМЕСТНИК-ПРЕДСЕДАТЕЛ`)
fn split_role(speaker:&str) -> (String,String) {
    match ROLE.find(speaker) {
        Some(m) => (speaker[m.end()..].trim().to_string(),m.as_str().trim().to_string()),
        None => (speaker.trim().to_string(),String::new()),
    }
}

fn parse_transcript(html:&Html) -> anyhow::Result<Vec<SpeechParagraph>> {
    let (date,title) = date_and_title(html)?;
    let body = html.select(&BODY).next().ok_or(StructureError::MissingAnchor("the text of the transcript"))?;
    let text = body.text().collect::<Vec<_>>().join(" ");
    let mut sitting = SittingRecords::new(&BULGARIA,date);
    let mut state = SpeakerState::default();
    for line in text.split(['\n','\r']).map(normalize_whitespace).filter(|l|!l.is_empty()) {
        if let Some(cap) = SPEAKER.captures(&line) {
            let (speaker,role) = split_role(&cap["speaker"]);
            let party = cap.name("party").map(|p|p.as_str().split(',').next().unwrap_or("").to_string()).unwrap_or_default();
            state = state.with_speaker(speaker).with_role(role).with_party(party);
            sitting.start_speech();
            if let Some(row) = sitting.push(&state,&cap["text"]) { row.set_extra("title",title.as_str()); }
        } else if AGENDA.is_match(&line) {
            state = state.with_agenda(line);
        } else if state.has_speaker() {
            if let Some(row) = sitting.push(&state,&line) { row.set_extra("title",title.as_str()); }
        }
    }
    Ok(sitting.finish())
}
