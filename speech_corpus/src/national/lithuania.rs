//! Stenogramos of the Seimas, exported from Word to HTML.
//!
//! The speech paragraphs start after the first `p.Roman` holding an `i` (or a `p.Pertrauka`)
//! and end at the footnotes (`div#ftn1`). A paragraph with a `b` child starts a new speech
//! when the bold text looks like a name (`A. KUBILIUS`, `PIRMININKĖ (I. DEGUTIENĖ)`); the party
//! follows in the first `i`. The chair is often only named once, so the name and party of
//! whoever chairs are remembered per role. Agenda items are `p.Roman12`.

use std::collections::HashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use crate::country::CountryConfig;
use crate::error::StructureError;
use crate::normalize::{normalize_string, remove_soft_hyphens};
use crate::parse_util::{iso_date, read_html, SourceDocument, MonthNames, LITHUANIAN_MONTHS};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};

pub const LITHUANIA : CountryConfig = CountryConfig {
    name: "lithuania",
    parliament: "LT-Seimas",
    iso3country: "LTU",
    language: "lt",
    source_pattern: "*.html",
    fieldnames: &["date","term","sitting","agenda","speechnumber","paragraphnumber","speaker","speakerrole","party","text","parliament","iso3country"],
    extractor: parse_lithuanian_parliament,
};

const TERM : &str = "6";
const CHAIR_ROLES : &[&str] = &["PIRMININKĖ","PIRMININKAS"];

static SITTING : Lazy<Regex> = Lazy::new(||Regex::new(r"Nr\.\s(\d{1,3})").unwrap());
static DATE_MARKERS : Lazy<Regex> = Lazy::new(||Regex::new(r"m\s*\.|d\.").unwrap());
static PARENTHESISED : Lazy<Regex> = Lazy::new(||Regex::new(r"\(.*?\)").unwrap());
/// An initial, as in `A. KUBILIUS`, possibly in brackets after a role.
static INITIAL : Lazy<Regex> = Lazy::new(||Regex::new(r"\(?\s*.\.\s*.*?\)?").unwrap());
static LOWER_CASE : Lazy<Regex> = Lazy::new(||Regex::new(r"[a-z]").unwrap());

static TOPIC : Lazy<Selector> = Lazy::new(||Selector::parse("p.Topic").unwrap());
static TITLE_OR_NORMAL : Lazy<Selector> = Lazy::new(||Selector::parse("p.MsoTitle, p.MsoNormal").unwrap());
static NUMBERED_HEADING : Lazy<Selector> = Lazy::new(||Selector::parse("p.MsoNormal, p.Roman, h3, h6, h4").unwrap());
static ALL_ELEMENTS : Lazy<Selector> = Lazy::new(||Selector::parse("*").unwrap());
static PARAGRAPHS_AND_FOOTNOTES : Lazy<Selector> = Lazy::new(||Selector::parse("p, div#ftn1").unwrap());
static ITALIC : Lazy<Selector> = Lazy::new(||Selector::parse("i").unwrap());
static BOLD : Lazy<Selector> = Lazy::new(||Selector::parse("b").unwrap());

pub fn parse_lithuanian_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    let sitting = SITTING.captures(&doc.stem()).map(|c|c[1].to_string()).ok_or(StructureError::MissingAnchor("the sitting number in the file name"))?;
    parse_stenogram(&read_html(&doc.path)?,&sitting)
}

fn has_class(e:&ElementRef,class:&str) -> bool { e.value().classes().any(|c|c==class) }

fn children_named<'a>(e:ElementRef<'a>,name:&'a str) -> impl Iterator<Item=ElementRef<'a>> + 'a {
    e.children().filter_map(ElementRef::wrap).filter(move |c|c.value().name()==name)
}

fn joined_text(e:&ElementRef) -> String { e.text().collect::<Vec<_>>().join(" ") }

/// The text of the element following `e` in document order, skipping its own descendants.
fn following_text(html:&Html,e:&ElementRef) -> Option<String> {
    let mut all = html.select(&ALL_ELEMENTS).skip_while(|x|x.id()!=e.id());
    all.next();
    all.find(|x|!x.ancestors().any(|a|a.id()==e.id())).map(|x|joined_text(&x))
}

fn year_first_date(text:&str,months:&MonthNames) -> anyhow::Result<String> {
    let cleaned = normalize_string(&DATE_MARKERS.replace_all(text,""));
    let words : Vec<&str> = cleaned.split_whitespace().collect();
    let (year,month,day) = match words.as_slice() {
        [year,month,day,..] => (*year,*month,*day),
        _ => return Err(StructureError::unexpected(format!("date {}",text)).into()),
    };
    let month = months.iter().position(|m|m.split('|').any(|alt|alt==month.to_lowercase()))
        .ok_or_else(||StructureError::unexpected(format!("month {}",month)))? as u32 + 1;
    let year = year.parse().map_err(|_|StructureError::unexpected(format!("year {}",year)))?;
    let day = day.parse().map_err(|_|StructureError::unexpected(format!("day {}",day)))?;
    iso_date(year,month,day)
}

/// The date is in a `p.Topic`, or in the paragraph after the `STENOGRAMA` title, or after the first heading containing `Nr.`.
fn sitting_date(html:&Html) -> anyhow::Result<String> {
    let topic = html.select(&TOPIC).map(|p|joined_text(&p)).collect::<Vec<_>>().join(" ");
    let text = Some(topic).filter(|t|!t.trim().is_empty())
        .or_else(||html.select(&TITLE_OR_NORMAL)
            .skip_while(|p|!(has_class(p,"MsoTitle") && children_named(*p,"span").any(|s|joined_text(&s).contains("STENOGRAMA"))))
            .find(|p|has_class(p,"MsoNormal"))
            .map(|p|joined_text(&p)))
        .or_else(||{
            let headings : Vec<ElementRef> = html.select(&NUMBERED_HEADING).collect();
            let with_number = |names:&[&str],parent:&str| headings.iter().find(|h|names.contains(&h.value().name()) && (h.value().name()!="p" || has_class(h,"MsoNormal") || has_class(h,"Roman"))
                && children_named(**h,parent).any(|c|if parent=="b" { children_named(c,"span").any(|s|joined_text(&s).contains("Nr.")) } else { joined_text(&c).contains("Nr.") })).copied();
            with_number(&["p"],"b").or_else(||with_number(&["h3"],"span")).or_else(||with_number(&["h6"],"span")).or_else(||with_number(&["h4"],"span"))
                .and_then(|h|following_text(html,&h))
        })
        .filter(|t|!t.trim().is_empty())
        .ok_or(StructureError::MissingAnchor("the date of the sitting"))?;
    year_first_date(&text,&LITHUANIAN_MONTHS)
}

/// The text in the `span` children, leaving out text directly inside `i`.
fn paragraph_text(p:&ElementRef) -> String {
    let mut parts = vec![];
    for span in children_named(*p,"span") {
        for node in span.descendants() {
            if let Node::Text(t) = node.value() {
                let in_italics = node.parent().and_then(|n|n.value().as_element().map(|e|e.name()=="i")).unwrap_or(false);
                if !in_italics { parts.push(t.to_string()); }
            }
        }
    }
    let text = remove_soft_hyphens(&parts.join(" ").replace('\n'," "));
    normalize_string(&PARENTHESISED.replace_all(&text,""))
}

/// The bold text, if it names a speaker.
fn real_speaker(bold:&str) -> Option<String> {
    let speaker = remove_soft_hyphens(normalize_string(bold).trim_end_matches('.'));
    if LOWER_CASE.is_match(&speaker) {
        if !INITIAL.is_match(&speaker) { return None }
        Some(LOWER_CASE.replace_all(&speaker,"").trim_end_matches(['.',' ']).to_string())
    } else {
        Some(speaker)
    }
}

/// Who chairs, per role, with their party.
#[derive(Default)]
struct Chairs {
    names : HashMap<&'static str,String>,
    parties : HashMap<&'static str,String>,
}

impl Chairs {
    /// Split `PIRMININKĖ (I. DEGUTIENĖ)` into speaker and role, filling in the remembered chair for a bare role.
    fn speaker_and_role(&mut self,speaker:&str) -> (String,String) {
        let Some(&role) = CHAIR_ROLES.iter().find(|r|speaker.contains(**r)) else { return (speaker.to_string(),String::new()) };
        if let Some(m) = INITIAL.find(speaker) {
            let name = speaker[m.start()..].trim_matches(['(',')',' ','.']).to_string();
            self.names.insert(role,name.clone());
            return (name,speaker[..m.start()].trim().to_string());
        }
        (self.names.get(role).cloned().unwrap_or_default(),role.to_string())
    }

    /// The party in italics, which is upper case, or else the remembered party of the chair.
    fn party(&mut self,italic:Option<String>,role:&str) -> String {
        let role = CHAIR_ROLES.iter().copied().find(|r|*r==role);
        match italic.filter(|p|!p.trim().is_empty() && !LOWER_CASE.is_match(p)) {
            Some(raw) => {
                let party = match normalize_string(&remove_soft_hyphens(&raw)).trim_matches(['(',')',' ']) {
                    "L" => "LiCSF".to_string(),
                    "J" => "J(LiCS ir TPP)F".to_string(),
                    other => other.to_string(),
                };
                if let Some(role) = role { self.parties.insert(role,party.clone()); }
                party
            }
            None => role.and_then(|r|self.parties.get(r).cloned()).unwrap_or_default(),
        }
    }
}

fn parse_stenogram(html:&Html,sitting_number:&str) -> anyhow::Result<Vec<SpeechParagraph>> {
    let date = sitting_date(html)?;
    let mut sitting = SittingRecords::new(&LITHUANIA,date);
    let mut state = SpeakerState::default();
    let mut chairs = Chairs::default();
    let mut started = false;
    for e in html.select(&PARAGRAPHS_AND_FOOTNOTES) {
        if e.value().name()=="div" { break }
        if has_class(&e,"Roman12") {
            state = state.with_agenda(normalize_string(&remove_soft_hyphens(&joined_text(&e).replace('\n'," "))));
            continue;
        }
        if !started {
            started = (has_class(&e,"Roman") && children_named(e,"i").next().is_some()) || has_class(&e,"Pertrauka");
            continue;
        }
        if !["Roman","MsoNormal","MsoBodyTextIndent"].iter().any(|c|has_class(&e,c)) || children_named(e,"span").next().is_none() { continue }
        let text = paragraph_text(&e);
        if text.is_empty() { continue }
        let speaker = if children_named(e,"b").next().is_some() { real_speaker(&e.select(&BOLD).map(|b|joined_text(&b)).collect::<Vec<_>>().join(" ")) } else { None };
        match speaker {
            Some(speaker) => {
                let (speaker,role) = chairs.speaker_and_role(&speaker);
                let party = chairs.party(e.select(&ITALIC).next().map(|i|joined_text(&i)),&role);
                state = state.with_speaker(speaker).with_role(role).with_party(party);
                sitting.start_speech();
            }
            None if sitting.is_empty() => return Err(StructureError::MissingAnchor("the speaker of the first speech").into()),
            None => {}
        }
        if let Some(row) = sitting.push(&state,&text) { row.set_extra("term",TERM).set_extra("sitting",sitting_number); }
    }
    Ok(sitting.finish())
}
