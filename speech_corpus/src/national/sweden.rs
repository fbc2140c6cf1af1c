//! Riksdag protocols. Each speech starts with an unclassed `h2` such as
//! `Anf. 12 Statsrådet ANNIKA STRANDHÄLL (S):` and its paragraphs are the following
//! `p.NormalIndent` siblings up to the next heading. Agenda headings (`p.Kantrubrik`) float
//! in styled divs between the paragraphs.

use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use crate::country::{CountryConfig, STANDARD_FIELDNAMES_WITH_ROLE};
use crate::error::StructureError;
use crate::normalize::{normalize_string, title_case};
use crate::parse_util::{iso_date, read_html, SourceDocument, SWEDISH_MONTHS};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};

pub const SWEDEN : CountryConfig = CountryConfig {
    name: "sweden",
    parliament: "SE-Riksdagen",
    iso3country: "SWE",
    language: "sv",
    source_pattern: "*.html",
    fieldnames: STANDARD_FIELDNAMES_WITH_ROLE,
    extractor: parse_swedish_parliament,
};

const PARTIES : &[&str] = &["S","M","SD","C","V","KD","L","MP"];

static PROTOCOL_NUMBER : Lazy<Regex> = Lazy::new(||Regex::new(r"Protokoll\s+\d{4}_\d{2}_\d{0,3}").unwrap());
static DAY_AND_MONTH : Lazy<Regex> = Lazy::new(||Regex::new(r"(?i)(\d{1,2})\s+([a-zåäö]+)").unwrap());
static UPPERCASE_WORD : Lazy<Regex> = Lazy::new(||Regex::new(r"\b[A-ZÅÄÖ\-]+\b").unwrap());

static H2 : Lazy<Selector> = Lazy::new(||Selector::parse("h2").unwrap());
static RUBRIC : Lazy<Selector> = Lazy::new(||Selector::parse("p.Kantrubrik").unwrap());

pub fn parse_swedish_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    let html = read_html(&doc.path)?;
    if !html.root_element().text().any(|t|t.contains("Anf.")) {
        info!("No speeches in {}",doc.path.display());
        return Ok(vec![]);
    }
    let date = date_from_file_name(&doc.stem(),doc.year)?;
    parse_protocol(&html,&date)
}

/// `Protokoll 2014_15_45 Onsdagen den 4 mars` in the folder for 2015 → `2015-03-04`
fn date_from_file_name(stem:&str,year:i32) -> anyhow::Result<String> {
    let after_number = PROTOCOL_NUMBER.splitn(stem,2).nth(1).ok_or(StructureError::MissingAnchor("the protocol number in the file name"))?;
    for cap in DAY_AND_MONTH.captures_iter(after_number) {
        let month_name = cap[2].to_lowercase();
        if let Some(month) = SWEDISH_MONTHS.iter().position(|m|*m==month_name) {
            return iso_date(year,month as u32+1,cap[1].parse()?);
        }
    }
    Err(StructureError::MissingAnchor("the date in the file name").into())
}

/// (name, role, party) from a speech heading.
fn speaker_of(heading:&str) -> (String,String,String) {
    let text = heading.replace("Anf.","").replace(':',"");
    let words : Vec<&str> = UPPERCASE_WORD.find_iter(&text).map(|m|m.as_str()).collect();
    let name = title_case(&words.iter().filter(|w|!PARTIES.contains(*w)).copied().collect::<Vec<_>>().join(" "));
    let party = words.last().filter(|w|PARTIES.contains(*w)).map(|w|w.to_string()).unwrap_or_default();
    let role = text.split_whitespace().take_while(|w|!words.contains(w)).filter(|w|!w.chars().all(|c|c.is_ascii_digit())).collect::<Vec<_>>().join(" ");
    (name,role,party)
}

fn text_of(e:&ElementRef) -> String { e.text().collect::<String>() }

fn parse_protocol(html:&Html,date:&str) -> anyhow::Result<Vec<SpeechParagraph>> {
    let first_agenda = html.select(&RUBRIC).map(|r|normalize_string(&text_of(&r))).find(|t|!t.is_empty()).ok_or(StructureError::MissingAnchor("Kantrubrik"))?;
    let mut sitting = SittingRecords::new(&SWEDEN,date);
    let mut agenda = first_agenda;
    for heading in html.select(&H2).filter(|h|h.value().attr("class").is_none()) {
        let (name,role,party) = speaker_of(&text_of(&heading));
        let mut paragraphs = vec![];
        let mut floating_agenda = None;
        for sibling in heading.next_siblings().filter_map(ElementRef::wrap).take_while(|e|!matches!(e.value().name(),"h1"|"h2")) {
            if sibling.value().classes().next()==Some("NormalIndent") && !text_of(&sibling).trim().is_empty() {
                paragraphs.push(text_of(&sibling));
            }
            if floating_agenda.is_none() && sibling.value().name()=="div" && sibling.value().attr("style").is_some() {
                floating_agenda = sibling.select(&RUBRIC).next().map(|r|normalize_string(&text_of(&r))).filter(|t|!t.is_empty());
            }
        }
        if let Some(a) = floating_agenda { agenda = a; }
        let state = SpeakerState::default().with_agenda(&agenda).with_speaker(&name).with_role(&role).with_party(&party);
        sitting.start_speech();
        for p in paragraphs { sitting.push(&state,&p); }
    }
    Ok(sitting.finish())
}
