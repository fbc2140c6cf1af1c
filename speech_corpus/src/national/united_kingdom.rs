//! House of Commons debates from Hansard.
//!
//! Contributions give the speaker in `.primary-text` and, the first time someone speaks,
//! either `(Constituency) (Party)` or, for office holders, `(Name)` in `.secondary-text`.
//! Later contributions only repeat the short form (`Mr Smith`, `The Prime Minister`), so what
//! was learned from the long forms is used to fill them in.

use std::collections::HashMap;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use crate::country::{CountryConfig, STANDARD_FIELDNAMES_WITH_ROLE};
use crate::error::StructureError;
use crate::normalize::normalize_whitespace;
use crate::parse_util::{find_date_with_month_names, read_html, SourceDocument, ENGLISH_MONTHS};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};

pub const UNITED_KINGDOM : CountryConfig = CountryConfig {
    name: "united_kingdom",
    parliament: "UK-HouseOfCommons",
    iso3country: "GBR",
    language: "en",
    source_pattern: "*.html",
    fieldnames: STANDARD_FIELDNAMES_WITH_ROLE,
    extractor: parse_uk_parliament,
};

/// The name used for the Speaker of the House, as in other datasets.
pub const CHAIR : &str = "CHAIR";

static CONSTITUENCY_AND_PARTY : Lazy<Regex> = Lazy::new(||Regex::new(r"\(.*\)\s+\((?P<party>[^()]*)\)").unwrap());
static NAME_IN_BRACKETS : Lazy<Regex> = Lazy::new(||Regex::new(r"\((?P<name>.*)\)").unwrap());
static TITLE : Lazy<Regex> = Lazy::new(||Regex::new(r"^\s*(Mrs|Mr|Ms|Dr)\s*").unwrap());
static SIR : Lazy<Regex> = Lazy::new(||Regex::new(r"^Sir\s").unwrap());
static SPACED_HYPHEN : Lazy<Regex> = Lazy::new(||Regex::new(r"\s?-\s?").unwrap());

static DATE : Lazy<Selector> = Lazy::new(||Selector::parse(r#"div[data-tag="hs_6fDate"]"#).unwrap());
static PAGE_TITLE : Lazy<Selector> = Lazy::new(||Selector::parse("title").unwrap());
static DEBATE : Lazy<Selector> = Lazy::new(||Selector::parse("div.child-debate").unwrap());
static DEBATE_TITLE : Lazy<Selector> = Lazy::new(||Selector::parse("h2").unwrap());
static CONTRIBUTION : Lazy<Selector> = Lazy::new(||Selector::parse("div.debate-item-contributiondebateitem").unwrap());
static PRIMARY : Lazy<Selector> = Lazy::new(||Selector::parse(".header .primary-text").unwrap());
static SECONDARY : Lazy<Selector> = Lazy::new(||Selector::parse(".header .secondary-text").unwrap());
static CONTENT : Lazy<Selector> = Lazy::new(||Selector::parse("div.content").unwrap());
static PARAGRAPH : Lazy<Selector> = Lazy::new(||Selector::parse("p").unwrap());

pub fn parse_uk_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    parse_debates(&read_html(&doc.path)?)
}

fn text_of(e:&ElementRef) -> String { normalize_whitespace(&e.text().collect::<Vec<_>>().join(" ")) }

fn selected_text(e:&ElementRef,selector:&Selector) -> Option<String> {
    let parts : Vec<String> = e.select(selector).map(|s|text_of(&s)).collect();
    if parts.is_empty() { None } else { Some(normalize_whitespace(&parts.join(" "))) }
}

/// Party abbreviations as used in other datasets.
fn align_party(party:String) -> String {
    match party.as_str() {
        "PC" => "PlaidCymru".to_string(),
        "Green" => "GPEW".to_string(),
        "LD" => "LibDem".to_string(),
        "Lab/Co-op" => "Lab".to_string(),
        "Alliance" => "APNI".to_string(),
        _ => party,
    }
}

fn tidy_name(name:&str) -> String {
    let name = SPACED_HYPHEN.replace_all(name,"-");
    normalize_whitespace(&SIR.replace(&name,""))
}

/// What the long form of a contribution header told us about a short name.
enum Known {
    /// The short name is a role, held by this person.
    RoleOf(String),
    /// The short name is a member of this party.
    Party(String),
}

#[derive(Default)]
struct Speakers {
    known : HashMap<String,Known>,
}

impl Speakers {
    /// Work out (speaker, role, party) from a contribution header.
    fn resolve(&mut self,primary:&str,secondary:Option<&str>) -> (String,String,String) {
        let (mut speaker,mut role,mut party) = (primary.to_string(),String::new(),String::new());
        if let Some(secondary) = secondary {
            if let Some(cap) = CONSTITUENCY_AND_PARTY.captures(secondary) {
                party = normalize_whitespace(&cap["party"]);
            } else if let Some(cap) = NAME_IN_BRACKETS.captures(secondary) {
                role = speaker;
                speaker = cap["name"].to_string();
            }
            speaker = tidy_name(&TITLE.replace(&speaker,""));
            if !role.is_empty() {
                self.known.entry(role.clone()).or_insert_with(||Known::RoleOf(speaker.clone()));
            } else {
                self.known.insert(speaker.clone(),Known::Party(party.clone()));
            }
        } else {
            if speaker.contains("Speaker") { speaker = CHAIR.to_string(); }
            speaker = tidy_name(&speaker);
            if TITLE.is_match(&speaker) {
                let last_name = TITLE.replace(&speaker,"").trim().to_string();
                let matching : Vec<&String> = self.known.keys().filter(|k|k.contains(&last_name)).collect();
                match matching.len() {
                    1 => speaker = matching[0].clone(),
                    0 => {}
                    _ => debug!("{} could be any of {:?}",speaker,matching),
                }
            }
            match self.known.get(&speaker) {
                Some(Known::RoleOf(name)) => { role = speaker; speaker = name.clone(); }
                Some(Known::Party(p)) => party = p.clone(),
                None => {}
            }
        }
        (speaker.replace('.',""),role,align_party(party))
    }
}

fn parse_debates(html:&Html) -> anyhow::Result<Vec<SpeechParagraph>> {
    let date_line = html.select(&DATE).next().map(|d|text_of(&d)).or_else(||html.select(&PAGE_TITLE).next().map(|t|text_of(&t))).unwrap_or_default();
    let date = find_date_with_month_names(&date_line,&ENGLISH_MONTHS).ok_or(StructureError::MissingAnchor("the date of the sitting"))?;
    let mut sitting = SittingRecords::new(&UNITED_KINGDOM,date);
    let mut speakers = Speakers::default();
    for debate in html.select(&DEBATE) {
        let agenda = debate.select(&DEBATE_TITLE).next().map(|h|text_of(&h)).unwrap_or_default();
        for contribution in debate.select(&CONTRIBUTION) {
            let primary = selected_text(&contribution,&PRIMARY).unwrap_or_default();
            let (speaker,role,party) = speakers.resolve(&primary,selected_text(&contribution,&SECONDARY).as_deref());
            let state = SpeakerState::default().with_agenda(&agenda).with_speaker(speaker).with_role(role).with_party(party);
            sitting.start_speech();
            for content in contribution.select(&CONTENT) {
                let paragraphs : Vec<ElementRef> = content.select(&PARAGRAPH).collect();
                if paragraphs.is_empty() {
                    sitting.push(&state,&text_of(&content));
                } else {
                    for p in paragraphs { sitting.push(&state,&text_of(&p)); }
                }
            }
        }
    }
    Ok(sitting.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speaker_state::assert_numbering;

    fn contribution(primary:&str,secondary:Option<&str>,paragraphs:&[&str]) -> String {
        let secondary = secondary.map(|s|format!(r#"<div class="secondary-text">{}</div>"#,s)).unwrap_or_default();
        let content : String = paragraphs.iter().map(|p|format!("<p>{}</p>",p)).collect();
        format!(r#"<div class="debate-item debate-item-contributiondebateitem"><div class="header"><div class="primary-text">{}</div>{}</div><div class="content">{}</div></div>"#,primary,secondary,content)
    }

    #[test]
    fn test_parse_debates() {
        let html = format!(r#"<html><body><div data-tag="hs_6fDate">Wednesday 4 March 2015</div><div class="child-debate"><h2>Engagements</h2>{}{}{}{}{}{}</div></body></html>"#,
            contribution("Mr Speaker",None,&["Order."]),
            contribution("Jonathan Edwards",Some("(Carmarthen East and Dinefwr) (PC)"),&["Question one.","Part two."]),
            contribution("The Prime Minister",Some("(David Cameron)"),&["Answer."]),
            contribution("The Prime Minister",None,&["Another answer."]),
            contribution("Mr Edwards",None,&["Follow up."]),
            contribution("Mr Speaker",None,&[" "]));
        let records = parse_debates(&Html::parse_document(&html)).unwrap();
        assert_numbering(&records);
        assert_eq!(6,records.len());
        assert_eq!("2015-03-04",records[0].date);
        assert_eq!((CHAIR,"Engagements"),(records[0].speaker.as_str(),records[0].agenda.as_str()));
        assert_eq!(("Jonathan Edwards","PlaidCymru",2,2),(records[2].speaker.as_str(),records[2].party.as_str(),records[2].speechnumber,records[2].paragraphnumber));
        assert_eq!(("David Cameron","The Prime Minister"),(records[3].speaker.as_str(),records[3].speakerrole.as_str()));
        assert_eq!(("David Cameron","The Prime Minister"),(records[4].speaker.as_str(),records[4].speakerrole.as_str()));
        assert_eq!(("Jonathan Edwards","PlaidCymru","Follow up."),(records[5].speaker.as_str(),records[5].party.as_str(),records[5].text.as_str()));
    }
}
