//! Plenary protocols of the German Bundestag, in the `dbtplenarprotokoll` XML format.
//!
//! The sitting is divided into `tagesordnungspunkt` sections. Speakers are announced either by a
//! `p klasse="redner"` containing a structured `name`, by a bare `name` element (usually the chair),
//! or by a `p klasse="N"`. Interjections are in `kommentar` elements; those of the form
//! `Name [City] [Party]: text` are kept as one paragraph speeches.

use once_cell::sync::Lazy;
use regex::Regex;
use crate::country::{CountryConfig, STANDARD_FIELDNAMES_WITH_ROLE};
use crate::error::StructureError;
use crate::normalize::normalize_string;
use crate::parse_util::{reformat_date, SourceDocument};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};
use roxmltree::Node;
use crate::xml_util::{with_xml_file, NodeExt};

pub const GERMANY : CountryConfig = CountryConfig {
    name: "germany",
    parliament: "DE-Bundestag",
    iso3country: "GER",
    language: "de",
    source_pattern: "*.xml",
    fieldnames: STANDARD_FIELDNAMES_WITH_ROLE,
    extractor: parse_german_parliament,
};

static PARTY_IN_BRACKETS : Lazy<Regex> = Lazy::new(||Regex::new(r"\(([^)]*)\)").unwrap());
static INTERJECTION : Lazy<Regex> = Lazy::new(||Regex::new(r"(?P<name>[a-zA-ZßüÜäÄöÖ\s.\-]*)\[(?P<brackets>.*)\]:(?P<text>.*)").unwrap());
static CHAIR_ROLE : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?P<role>(?:Alters|Vize)?[Pp]räsident(?:in)?)\s+(?P<name>.*)$").unwrap());

pub fn parse_german_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    with_xml_file(&doc.path,parse_protocol)
}

/// A speaker as announced in the protocol, e.g. `Dr. Anna Schmidt (SPD)` or `Vizepräsidentin Petra Pau`.
#[derive(Debug,Clone,PartialEq)]
struct Announcement {
    /// The announcement as written, used to tell whether the speaker changed.
    raw : String,
    speaker : String,
    party : String,
    role : String,
}

impl Announcement {
    fn parse(raw:&str,role:Option<String>) -> Option<Announcement> {
        let raw = normalize_string(raw).trim_matches(|c:char|c==' '||c==':').to_string();
        if raw.is_empty() { return None }
        let party = PARTY_IN_BRACKETS.captures_iter(&raw).last().map(|c|c[1].trim().to_string()).unwrap_or_default();
        let without_party = PARTY_IN_BRACKETS.replace_all(&raw,"").trim().to_string();
        let (role,speaker) = match (role,CHAIR_ROLE.captures(&without_party)) {
            (Some(role),_) => (role,without_party.clone()),
            (None,Some(cap)) => (cap["role"].to_string(),cap["name"].to_string()),
            (None,None) => (String::new(),without_party.clone()),
        };
        Some(Announcement{ raw, speaker, party, role })
    }

    /// From the structured `redner/name` element, used when the paragraph has no text of its own.
    fn from_name_element(name:Node) -> Option<Announcement> {
        let part = |n:&str|name.child(n).map(|e|normalize_string(&e.all_text())).unwrap_or_default();
        let full = [part("titel"),part("vorname"),part("namenszusatz"),part("nachname")].into_iter().filter(|s|!s.is_empty()).collect::<Vec<_>>().join(" ");
        let fraktion = part("fraktion");
        let raw = if fraktion.is_empty() { full } else { format!("{} ({})",full,fraktion) };
        Announcement::parse(&raw,role_of(name))
    }

    fn state(&self,agenda:&str) -> SpeakerState {
        SpeakerState::default().with_agenda(agenda).with_speaker(&self.speaker).with_party(&self.party).with_role(&self.role)
    }
}

fn role_of(name:Node) -> Option<String> {
    let rolle = name.child("rolle")?;
    let role = rolle.child("rolle_lang").or_else(||rolle.child("rolle_kurz")).map(|e|e.all_text()).unwrap_or_else(||rolle.all_text());
    let role = normalize_string(&role);
    if role.is_empty() { None } else { Some(role) }
}

fn klasse<'a>(e:Node<'a,'_>) -> &'a str { e.attr("klasse").unwrap_or("") }

fn parse_protocol(root:Node) -> anyhow::Result<Vec<SpeechParagraph>> {
    let date = root.attr("sitzung-datum").ok_or(StructureError::MissingAnchor("sitzung-datum"))?;
    let date = reformat_date(date,"%d.%m.%Y")?;
    let proceedings = root.find("sitzungsverlauf").unwrap_or(root);
    let sections = proceedings.descendants_named("tagesordnungspunkt");
    if sections.is_empty() { return Err(StructureError::MissingAnchor("tagesordnungspunkt").into()) }
    let mut sitting = SittingRecords::new(&GERMANY,date);
    let mut current : Option<Announcement> = None;
    for section in sections {
        let title = section.children_named("p").next().filter(|p|klasse(*p)=="T_fett").map(|p|normalize_string(&p.text_nodes().join(" "))).unwrap_or_default();
        let agenda = if title.is_empty() { section.attr("top-id").unwrap_or("").to_string() } else { title };
        if agenda.is_empty() { return Err(StructureError::unexpected("agenda item without title or top-id").into()) }
        // Each agenda item starts a new speech, even if the speaker stays the same.
        let mut previous_raw = String::new();
        for e in section.descendants() {
            if e.is("name") {
                if let Some(a) = Announcement::parse(&e.direct_text(),role_of(e)) { current=Some(a); }
            } else if e.is("p") {
                match klasse(e) {
                    "T_fett" => {}
                    "redner" => {
                        let announced = Announcement::parse(&e.direct_text(),e.find("name").and_then(role_of)).or_else(||e.find("name").and_then(Announcement::from_name_element));
                        if announced.is_some() { current=announced; }
                    }
                    "N" => { if let Some(a) = Announcement::parse(&e.all_text(),None) { current=Some(a); } }
                    _ => {
                        let speaker = current.as_ref().ok_or(StructureError::MissingAnchor("a speaker before the first paragraph"))?;
                        if speaker.raw!=previous_raw {
                            sitting.start_speech();
                            previous_raw=speaker.raw.clone();
                        }
                        sitting.push(&speaker.state(&agenda),&e.text_nodes().join(" "));
                    }
                }
            } else if e.is("kommentar") {
                let text = normalize_string(&e.text_nodes().join(" "));
                if !(text.contains("]:") && text.contains('[')) { continue }
                for part in text.split(" – ") {
                    if let Some(cap) = INTERJECTION.captures(part) {
                        let brackets : Vec<&str> = cap["brackets"].split("] [").collect();
                        let party = brackets.last().map(|s|s.trim()).unwrap_or("");
                        let speaker = cap["name"].trim_matches(|c:char|c=='('||c.is_whitespace()).to_string();
                        let state = SpeakerState::default().with_agenda(&agenda).with_speaker(&speaker).with_party(party);
                        sitting.start_speech();
                        sitting.push(&state,cap["text"].trim().trim_end_matches(')'));
                        previous_raw=format!("{} [{}]",speaker,&cap["brackets"]);
                    }
                }
            }
        }
    }
    Ok(sitting.finish())
}
