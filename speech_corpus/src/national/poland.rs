//! Sejm sittings from the Polish Parliamentary Corpus, in TEI XML.
//!
//! Each sitting comes as two files, `<sitting>_text_structure.xml` with the utterances and
//! `<sitting>_header.xml` with the date, numbering and the list of people.

use std::path::PathBuf;
use once_cell::sync::Lazy;
use regex::Regex;
use crate::country::CountryConfig;
use crate::error::StructureError;
use crate::normalize::normalize_string;
use crate::parse_util::{reformat_date, SourceDocument};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};
use roxmltree::Node;
use crate::xml_util::{with_xml_file, NodeExt};

pub const POLAND : CountryConfig = CountryConfig {
    name: "poland",
    parliament: "PL-Zgromadzenie Narodowe",
    iso3country: "POL",
    language: "pl",
    source_pattern: "*text_structure.xml",
    fieldnames: &["date","title","term","session","sitting","agenda","speechnumber","paragraphnumber","speaker","speaker_uri","party","text","parliament","iso3country","system"],
    extractor: parse_polish_parliament,
};

static STAGE_DIRECTION : Lazy<Regex> = Lazy::new(||Regex::new(r"^\(.*\)").unwrap());

fn header_path(text_path:&std::path::Path) -> anyhow::Result<PathBuf> {
    let name = text_path.file_name().map(|n|n.to_string_lossy().to_string()).unwrap_or_default();
    if !name.ends_with("text_structure.xml") { return Err(StructureError::unexpected(format!("{} is not a text_structure.xml file",name)).into()) }
    Ok(text_path.with_file_name(name.replace("text_structure.xml","header.xml")))
}

pub fn parse_polish_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    with_xml_file(&header_path(&doc.path)?,|header|with_xml_file(&doc.path,|text|parse_sitting(text,header)))
}

fn joined(elements:Vec<Node>) -> String {
    normalize_string(&elements.iter().flat_map(|e|e.text_nodes()).collect::<Vec<_>>().join(" "))
}

/// The text of `bibl/note[@type=...]` in the header.
fn note(header:Node,note_type:&str) -> String {
    joined(header.descendants_named("bibl").into_iter().flat_map(|b|b.children_named("note").filter(|n|n.attr("type")==Some(note_type)).collect::<Vec<_>>()).collect())
}

struct Person {
    name : String,
    uri : String,
}

fn person(header:Node,id:&str) -> Option<Person> {
    let p = header.descendants_named("person").into_iter().find(|p|p.attr("id")==Some(id))?;
    let name = joined(p.children_named("persName").collect());
    let target = p.children_named("linkGrp").flat_map(|l|l.children_named("ptr")).filter_map(|ptr|ptr.attr("target")).collect::<Vec<_>>().join(" ");
    let uri = target.split_once("owl").map(|(_,after)|after.to_string()).unwrap_or_default();
    Some(Person{ name, uri })
}

fn parse_sitting(text:Node,header:Node) -> anyhow::Result<Vec<SpeechParagraph>> {
    let date = joined(header.descendants_named("date"));
    if date.is_empty() { return Err(StructureError::MissingAnchor("date in the header").into()) }
    let date = reformat_date(&date,"%Y-%m-%d")?;
    let title = joined(header.descendants_named("titleStmt"));
    let (system,term,session,day) = (note(header,"system"),note(header,"termNo"),note(header,"sessionNo"),note(header,"dayNo"));
    let mut sitting = SittingRecords::new(&POLAND,date);
    for div in text.descendants_named("div") {
        sitting.start_speech();
        for u in div.descendants_named("u") {
            let utterance = normalize_string(&u.text_nodes().join(" "));
            if STAGE_DIRECTION.is_match(&utterance) { continue }
            let who = u.attr("who").unwrap_or("").trim_start_matches('#');
            let person = person(header,who).unwrap_or(Person{ name: String::new(), uri: String::new() });
            let state = SpeakerState::default().with_speaker(person.name);
            if let Some(row) = sitting.push(&state,&utterance) {
                row.set_extra("title",title.as_str())
                    .set_extra("term",term.as_str())
                    .set_extra("session",session.as_str())
                    .set_extra("sitting",day.as_str())
                    .set_extra("speaker_uri",person.uri)
                    .set_extra("system",system.as_str());
            }
        }
    }
    Ok(sitting.finish())
}
