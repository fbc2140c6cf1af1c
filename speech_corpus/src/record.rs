//! The common output record of all the national extractors, and writing them to CSV.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use anyhow::Context;
use serde::{Serialize,Deserialize};

/// One paragraph of one speech in one sitting.
#[derive(Debug,Clone,Default,PartialEq,Serialize,Deserialize)]
pub struct SpeechParagraph {
    pub date : String,
    pub agenda : String,
    pub speechnumber : u32,
    pub paragraphnumber : u32,
    pub speaker : String,
    pub speakerrole : String,
    pub party : String,
    pub text : String,
    pub parliament : String,
    pub iso3country : String,
    /// Country specific columns, e.g. term, sitting, mep_id.
    #[serde(default)]
    pub extra : BTreeMap<String,String>,
}

impl SpeechParagraph {
    /// The value to write in the given CSV column. Unknown columns are empty.
    pub fn field(&self,name:&str) -> String {
        match name {
            "date" => self.date.clone(),
            "agenda" => self.agenda.clone(),
            "speechnumber" => self.speechnumber.to_string(),
            "paragraphnumber" => self.paragraphnumber.to_string(),
            "speaker" => self.speaker.clone(),
            "speakerrole" => self.speakerrole.clone(),
            "party" => self.party.clone(),
            "text" => self.text.clone(),
            "parliament" => self.parliament.clone(),
            "iso3country" => self.iso3country.clone(),
            _ => self.extra.get(name).cloned().unwrap_or_default(),
        }
    }

    pub fn set_extra(&mut self,name:&str,value:impl Into<String>) -> &mut Self {
        self.extra.insert(name.to_string(),value.into());
        self
    }
}

/// Write the records to a CSV file with the given columns, header first.
pub fn write_csv(path:&Path,records:&[SpeechParagraph],fieldnames:&[&str]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(File::create(path).with_context(||format!("Could not create {}",path.display()))?);
    writer.write_record(fieldnames)?;
    for record in records {
        writer.write_record(fieldnames.iter().map(|f|record.field(f)))?;
    }
    writer.flush()?;
    Ok(())
}

/// The name of the parsed CSV for a source document, `<stem>_parsed.csv`.
pub fn parsed_file_name(source:&Path) -> String {
    let stem = source.file_stem().map(|s|s.to_string_lossy().to_string()).unwrap_or_default();
    format!("{}_parsed.csv",stem)
}
