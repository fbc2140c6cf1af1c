//! Národná rada transcripts, as Word documents named `x_<legislature>_<meeting>_YYYYMMDD`.
//!
//! Paragraphs are separated by blank lines. From the fifth legislature on, a speech starts
//! with a paragraph of its own `Pellegrini, Peter, predseda NR SR`; in the fourth the speaker
//! is given at the start of the first paragraph, `P. Hrušovský, predseda NR SR: Text`.

use once_cell::sync::Lazy;
use regex::Regex;
use crate::country::CountryConfig;
use crate::docx_util::{docx_text, read_docx_paragraphs};
use crate::error::StructureError;
use crate::normalize::has_alphabetic;
use crate::parse_util::{reformat_date, SourceDocument};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};

pub const SLOVAKIA : CountryConfig = CountryConfig {
    name: "slovakia",
    parliament: "SK-Národná rada",
    iso3country: "SVK",
    language: "sk",
    source_pattern: "*.docx",
    fieldnames: &["date","agenda","speechnumber","paragraphnumber","speaker","speakerrole","party","text","legislature","meeting","parliament","iso3country"],
    extractor: parse_slovakian_parliament,
};

const INITIAL_AND_SURNAME_LEGISLATURE : u32 = 4;

static BLANK_LINE : Lazy<Regex> = Lazy::new(||Regex::new(r"\n\s*\n").unwrap());
/// `P. Hrušovský, predseda NR SR: `
static INITIAL_AND_SURNAME : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?P<speaker>\p{Lu}\p{Ll}?\.\s+\p{Lu}[^,]*?),\s+(?P<role>.*?):\s+").unwrap());
/// `Pellegrini, Peter, predseda NR SR`
static SURNAME_AND_NAME : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?P<speaker>\p{Lu}\p{Ll}+(?:[-\s]\p{Lu}\p{Ll}+)?,\s+\p{Lu}\p{Ll}+(?:[-\s]\p{Lu}\p{Ll}+)?),\s+(?P<role>[^\n]*)$").unwrap());
static BRACKETED : Lazy<Regex> = Lazy::new(||Regex::new(r"(?s)\(.*?\)").unwrap());

/// Legislature, meeting and date from the file name.
fn file_name_parts(stem:&str) -> anyhow::Result<(u32,String,String)> {
    let parts : Vec<&str> = stem.split('_').collect();
    if parts.len()<4 { return Err(StructureError::unexpected(format!("file name {} is not x_<legislature>_<meeting>_<date>",stem)).into()) }
    Ok((parts[1].parse()?,parts[2].to_string(),reformat_date(parts[3],"%Y%m%d")?))
}

pub fn parse_slovakian_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    let (legislature,meeting,date) = file_name_parts(&doc.stem())?;
    let text = docx_text(&read_docx_paragraphs(&doc.path)?);
    Ok(parse_text(&text,legislature,&meeting,&date))
}

fn parse_text(text:&str,legislature:u32,meeting:&str,date:&str) -> Vec<SpeechParagraph> {
    let mut sitting = SittingRecords::new(&SLOVAKIA,date);
    let mut state = SpeakerState::default();
    let legislature_column = legislature.to_string();
    for block in BLANK_LINE.split(&text.replace('\r',"")) {
        let block = block.trim();
        let mut paragraph = block;
        if legislature==INITIAL_AND_SURNAME_LEGISLATURE {
            if let Some(cap) = INITIAL_AND_SURNAME.captures(block) {
                state = state.with_speaker(&cap["speaker"]).with_role(&cap["role"]);
                sitting.start_speech();
                paragraph = &block[cap.get(0).map(|m|m.end()).unwrap_or(0)..];
            }
        } else if let Some(cap) = SURNAME_AND_NAME.captures(block) {
            state = state.with_speaker(&cap["speaker"]).with_role(cap["role"].trim_end_matches([' ',':']));
            sitting.start_speech();
            continue;
        }
        if !state.has_speaker() { continue }
        let paragraph = BRACKETED.replace_all(paragraph,"");
        if !has_alphabetic(&paragraph) { continue }
        if let Some(row) = sitting.push(&state,&paragraph) {
            row.set_extra("legislature",legislature_column.as_str()).set_extra("meeting",meeting);
        }
    }
    sitting.finish()
}
