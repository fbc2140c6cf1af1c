//! Πρακτικά of the Βουλή των Αντιπροσώπων, as OCR'd text files named
//! `YYYY-MM-DD_<term>_<session>_<sitting>.txt`.
//!
//! A speech starts with a line holding just the speaker in capitals, `ΠΡΟΕΔΡΟΣ:`. When that is
//! a role, the next line may give the name in brackets, `(ΔΗΜΗΤΡΗΣ ΣΥΛΛΟΥΡΗΣ)`; later speeches
//! by the same role do not repeat it. The text of a speech is the rest of its lines, split into
//! a new paragraph where written material inserted into the record starts.

use std::collections::HashMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use crate::country::CountryConfig;
use crate::error::StructureError;
use crate::normalize::{normalize_string, title_case};
use crate::parse_util::{read_text, reformat_date, SourceDocument};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};

pub const CYPRUS : CountryConfig = CountryConfig {
    name: "cyprus",
    parliament: "CY-Temsilciler Meclisi",
    iso3country: "CYP",
    language: "el",
    source_pattern: "*.txt",
    fieldnames: &["date","title","agenda","speechnumber","paragraphnumber","speaker","speakerrole","party","text","written","term","session","sitting","parliament","iso3country"],
    extractor: parse_cypriot_parliament,
};

/// Capital letters, including some the OCR produces for them.
macro_rules! greek { () => { r"[Α-ΩὉΪᾺ\x{1FEA}]" } }

static WHITESPACE : Lazy<Regex> = Lazy::new(||Regex::new(r"\s+").unwrap());
static PAGE_NUMBER : Lazy<Regex> = Lazy::new(||Regex::new(r"^\d{1,3}$").unwrap());
static CHAPTER : Lazy<Regex> = Lazy::new(||Regex::new(r"^ΚΕΦΑΛΑΙΟ\s.*?:").unwrap());
static END_OF_SITTING : Lazy<Regex> = Lazy::new(||Regex::new(r"^[({]Ώρα (?:λήξης)?.*?[)}]$").unwrap());
static SPEAKER : Lazy<Regex> = Lazy::new(||Regex::new(concat!("^(?:",greek!(),r"+\x{0342}?:|",greek!(),r"+(?:(?:-\.|\.|-)?[\s\-]",greek!(),r"+)+(?:\x{0342}?:|\.))$")).unwrap());
static NAME_IN_BRACKETS : Lazy<Regex> = Lazy::new(||Regex::new(concat!(r"^\(",greek!(),r"+(?:(?:-\.|\.|-)?[\s\-]",greek!(),r"+)*(?:Ὶ\)|\)|Ὶ)?$")).unwrap());
static NOISE_AFTER_SPEAKER : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?:ΤΊ|\d+)$").unwrap());
static WRITTEN : Lazy<Regex> = Lazy::new(||Regex::new(r"\(Η σχετική ἐκθεση\)|\(Οι ερωτήσεις των βουλευτών\)|\(Η σχετική τροπολογία\)|\(Οι σχετικές τροπολογίες\)|\(Οι σχετικές εκθέσεις\)|\(Η κατάθεση νομοσχεδίων και ἐεγγράφων\)").unwrap());
static REMARK : Lazy<Regex> = Lazy::new(||Regex::new(r"^\(.*?\)$").unwrap());

#[derive(Debug,Clone,PartialEq)]
struct FileNameParts {
    date : String,
    term : String,
    session : String,
    sitting : String,
}

impl FileNameParts {
    fn parse(stem:&str) -> anyhow::Result<FileNameParts> {
        let parts : Vec<&str> = stem.split('_').collect();
        if parts.len()<4 { return Err(StructureError::unexpected(format!("file name {} is not <date>_<term>_<session>_<sitting>",stem)).into()) }
        Ok(FileNameParts{ date: reformat_date(parts[0],"%Y-%m-%d")?, term: parts[1].to_string(), session: parts[2].to_string(), sitting: parts[3].to_string() })
    }
}

pub fn parse_cypriot_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    let stem = doc.stem();
    parse_transcript(&read_text(&doc.path)?,&stem,&FileNameParts::parse(&stem)?)
}

/// Collects the lines of the current paragraph of a speech.
struct Paragraph<'a> {
    lines : Vec<String>,
    written : bool,
    title : &'a str,
    parts : &'a FileNameParts,
}

impl <'a> Paragraph<'a> {
    fn add(&mut self,line:&str) {
        if REMARK.is_match(line) { self.lines.push(format!("<<<{}>>>",line)) } else { self.lines.push(line.to_string()) }
    }

    /// Emit the collected lines as a row, and start a new paragraph.
    fn flush(&mut self,sitting:&mut SittingRecords,state:&SpeakerState,written_next:bool) {
        let text = normalize_string(&self.lines.join(" "));
        if state.has_speaker() {
            if let Some(row) = sitting.push(state,&text) {
                row.set_extra("title",self.title)
                    .set_extra("written",if self.written { "True" } else { "False" })
                    .set_extra("term",self.parts.term.as_str())
                    .set_extra("session",self.parts.session.as_str())
                    .set_extra("sitting",self.parts.sitting.as_str());
            }
        }
        self.lines.clear();
        self.written = written_next;
    }
}

fn parse_transcript(text:&str,title:&str,parts:&FileNameParts) -> anyhow::Result<Vec<SpeechParagraph>> {
    let mut lines : Vec<String> = text.lines()
        .map(|l|WHITESPACE.replace_all(l," ").trim().to_string())
        .filter(|l|!l.is_empty() && !PAGE_NUMBER.is_match(l))
        .map(|l|CHAPTER.replace(&l,|cap:&Captures|title_case(&cap[0])).to_string())
        .collect();
    let end = lines.iter().rposition(|l|END_OF_SITTING.is_match(l)).ok_or(StructureError::MissingAnchor("the end of the sitting (Ώρα λήξης)"))?;
    lines.truncate(end);
    let mut sitting = SittingRecords::new(&CYPRUS,parts.date.as_str());
    let mut role_to_speaker : HashMap<String,String> = HashMap::new();
    let mut state = SpeakerState::default();
    let mut paragraph = Paragraph{ lines: vec![], written: false, title, parts };
    let mut i = 0;
    while i<lines.len() {
        let line = &lines[i];
        i+=1;
        if SPEAKER.is_match(line) {
            paragraph.flush(&mut sitting,&state,false);
            let mut speaker = normalize_string(line.trim_matches([' ','.',':','\u{0342}']));
            let mut role = String::new();
            if lines.get(i).map(|l|NOISE_AFTER_SPEAKER.is_match(l)).unwrap_or(false) { i+=1; }
            if let Some(name) = lines.get(i).filter(|l|NAME_IN_BRACKETS.is_match(l)) {
                role = speaker;
                speaker = normalize_string(name.trim_matches(['(',')',' ','Ὶ']));
                role_to_speaker.insert(role.clone(),speaker.clone());
                i+=1;
            } else if let Some(name) = role_to_speaker.get(&speaker) {
                role = std::mem::replace(&mut speaker,name.clone());
            }
            state = state.with_speaker(speaker).with_role(role);
            sitting.start_speech();
            continue;
        }
        match WRITTEN.find(line) {
            Some(m) => {
                paragraph.add(&line[..m.start()]);
                paragraph.flush(&mut sitting,&state,true);
                paragraph.add(&line[m.start()..]);
            }
            None => paragraph.add(line),
        }
    }
    paragraph.flush(&mut sitting,&state,false);
    Ok(sitting.finish())
}
