//! Assemble the parsed documents of a country (and any corpus CSVs obtained elsewhere) into a
//! single corpus with one row per sentence.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};
use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};
use punkt::params::Standard;
use punkt::{SentenceTokenizer, TrainingData};
use unicode_segmentation::UnicodeSegmentation;
use crate::country::corpus_language;
use crate::normalize::has_alphabetic;
use crate::parse_util::open_csv;

/// The first columns of every corpus, in this order. Any other columns follow, sorted.
pub const CORPUS_FIELDNAMES : &[&str] = &["instance_id","date","agenda","speechnumber","paragraphnumber","sentencenumber","speaker","party","text","parliament","iso3country"];

/// The columns of the ParlSpeech style data sets some countries' corpora are combined with.
const PARLSPEECH_FIELDNAMES : &[&str] = &["id","title","from","to","house","term","session","meeting","sitting","agenda","subcorpus","speakerrole","speaker_type","party","speaker_party_name","party_status","speaker","speaker_gender","speaker_birth","text","date","speechnumber"];

/// Columns that a country's corpus always has, whether or not the files seen contain them.
fn extra_schema(country:&str) -> &'static [&'static str] {
    match country {
        "lithuania" => &["speaker_party","speaker_name","paragraphnumber","parliament","iso3country"],
        "poland" => &["day","paragraphnumber","speaker_uri","parliament","iso3country","system"],
        "slovenia" => &["term_slv","types_slv","types_eng","speaker_id","death","speakerrole_slv","speaker_type_slv","speaker_party_name_eng","notes","gaps","names","segs","sents","words","tokens"],
        "bulgaria" => &["paragraphnumber","parliament","iso3country"],
        "croatia" => &["legislature","agenda_no","data_url","is_in_agenda","discussion_id","paragraphnumber"],
        _ => &[],
    }
}

fn has_parlspeech_schema(country:&str) -> bool {
    matches!(country,"lithuania"|"poland"|"slovenia"|"bulgaria"|"croatia")
}

/// Split a paragraph into sentences.
pub trait SentenceSplitter {
    /// The sentences of the text, trimmed, in order. Empty sentences are left out.
    fn split(&self,text:&str) -> Vec<String>;
}

/// Splits with the Punkt model trained for the language, which knows its abbreviations and ordinals.
pub struct PunktSentenceSplitter {
    data : TrainingData,
}

impl PunktSentenceSplitter {
    /// None if there is no model for the language.
    pub fn new(language:&str) -> Option<Self> {
        let data = match language {
            "cs" => TrainingData::czech(),
            "da" => TrainingData::danish(),
            "de" => TrainingData::german(),
            "el" => TrainingData::greek(),
            "en" => TrainingData::english(),
            "es" => TrainingData::spanish(),
            "et" => TrainingData::estonian(),
            "fi" => TrainingData::finnish(),
            "fr" => TrainingData::french(),
            "it" => TrainingData::italian(),
            "nl" => TrainingData::dutch(),
            "no" => TrainingData::norwegian(),
            "pl" => TrainingData::polish(),
            "pt" => TrainingData::portuguese(),
            "sl" => TrainingData::slovene(),
            "sv" => TrainingData::swedish(),
            "tr" => TrainingData::turkish(),
            _ => return None,
        };
        Some(PunktSentenceSplitter{ data })
    }
}

impl SentenceSplitter for PunktSentenceSplitter {
    fn split(&self,text:&str) -> Vec<String> {
        SentenceTokenizer::<Standard>::new(text,&self.data).map(|s|s.trim()).filter(|s|!s.is_empty()).map(|s|s.to_string()).collect()
    }
}

/// Splits at Unicode sentence boundaries (UAX #29), for languages without a Punkt model.
pub struct UnicodeSentenceSplitter;

impl SentenceSplitter for UnicodeSentenceSplitter {
    fn split(&self,text:&str) -> Vec<String> {
        text.unicode_sentences().map(|s|s.trim()).filter(|s|!s.is_empty()).map(|s|s.to_string()).collect()
    }
}

/// The best splitter available for the language.
pub fn sentence_splitter(language:&str) -> Box<dyn SentenceSplitter> {
    match PunktSentenceSplitter::new(language) {
        Some(splitter) => Box::new(splitter),
        None => {
            debug!("No Punkt model for {}, splitting at Unicode sentence boundaries",language);
            Box::new(UnicodeSentenceSplitter)
        }
    }
}

/// Which rows to use.
#[derive(Debug,Clone)]
pub struct CorpusOptions {
    pub first_year : i32,
    pub last_year : i32,
    /// Stop after this many paragraphs, for trying things out. Previously assembled corpora contribute at most half.
    pub num_paragraphs : Option<usize>,
}

/// A CSV file that is read into the corpus.
#[derive(Debug,Clone,PartialEq)]
struct CorpusInput {
    path : PathBuf,
    /// A corpus assembled previously by other means, rather than the output of an extractor.
    legacy : bool,
}

/// The name of the corpus file written for a country. `language` is only used for the European Parliament.
pub fn corpus_file_name(country:&str,language:Option<&str>,options:&CorpusOptions) -> String {
    match (country,language) {
        ("ep",Some(language)) => format!("ep_corpus_{}_{}_{}.csv",options.first_year,options.last_year,language),
        _ => format!("{}_corpus_{}_{}.csv",country,options.first_year,options.last_year),
    }
}

fn sorted_csv_files(dir:&Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in glob::glob(&dir.join("*.csv").to_string_lossy())? {
        files.push(entry?);
    }
    files.sort();
    Ok(files)
}

fn corpus_inputs(country:&str,language:Option<&str>,country_dir:&Path,options:&CorpusOptions) -> anyhow::Result<Vec<CorpusInput>> {
    let legacy = if country=="ep" {
        let path = country_dir.join(format!("ep_speeches_2009_2019_{}.csv",language.unwrap_or("")));
        if path.is_file() { vec![path] } else { vec![] }
    } else { sorted_csv_files(country_dir)? };
    if legacy.is_empty() { warn!("Could not find existing corpus for {}. Assume that the crawled data is complete.",country); }
    let mut inputs : Vec<CorpusInput> = legacy.into_iter().map(|path|CorpusInput{ path, legacy: true }).collect();
    if country!="ep" {
        for year in options.first_year..=options.last_year {
            let year_dir = country_dir.join(year.to_string());
            if !year_dir.is_dir() { continue }
            inputs.extend(sorted_csv_files(&year_dir)?.into_iter().map(|path|CorpusInput{ path, legacy: false }));
        }
    }
    Ok(inputs)
}

/// All the columns of the corpus, the fixed ones first.
fn corpus_fieldnames(country:&str,inputs:&[CorpusInput]) -> anyhow::Result<Vec<String>> {
    let mut others : BTreeSet<String> = BTreeSet::new();
    for input in inputs {
        let mut reader = open_csv(&input.path)?;
        others.extend(reader.headers()?.iter().map(|h|h.to_string()));
    }
    others.extend(extra_schema(country).iter().map(|s|s.to_string()));
    if has_parlspeech_schema(country) { others.extend(PARLSPEECH_FIELDNAMES.iter().map(|s|s.to_string())); }
    for f in CORPUS_FIELDNAMES { others.remove(*f); }
    Ok(CORPUS_FIELDNAMES.iter().map(|s|s.to_string()).chain(others).collect())
}

/// Rows from before `first_year` in previously assembled corpora are left out.
fn is_recent_enough(date:&str,first_year:i32) -> bool {
    match NaiveDate::parse_from_str(date.get(..10).unwrap_or(date),"%Y-%m-%d") {
        Ok(date) => date.year()>=first_year,
        Err(_) => { debug!("Ignoring row with date {}",date); false }
    }
}

/// Counts for the log.
#[derive(Debug,Default,Clone,PartialEq)]
pub struct CorpusSummary {
    pub paragraphs : usize,
    pub sentences : usize,
}

fn column<'a>(row:&'a csv::StringRecord,columns:&HashMap<String,usize>,name:&str) -> &'a str {
    columns.get(name).and_then(|&i|row.get(i)).unwrap_or("")
}

/// Read the inputs and write the corpus to `output`.
fn write_corpus(inputs:&[CorpusInput],fieldnames:&[String],output:&Path,options:&CorpusOptions,splitter:&dyn SentenceSplitter) -> anyhow::Result<CorpusSummary> {
    let mut writer = csv::Writer::from_writer(File::create(output).with_context(||format!("Could not create {}",output.display()))?);
    writer.write_record(fieldnames)?;
    let mut summary = CorpusSummary::default();
    let legacy_limit = options.num_paragraphs.map(|n|(n/2).max(1));
    for input in inputs {
        let limit = if input.legacy { legacy_limit } else { options.num_paragraphs };
        if limit.map(|l|summary.paragraphs>=l).unwrap_or(false) { continue }
        info!("Start collecting {}",input.path.display());
        let mut reader = open_csv(&input.path)?;
        let columns : HashMap<String,usize> = reader.headers()?.iter().enumerate().map(|(i,h)|(h.to_string(),i)).collect();
        for row in reader.records() {
            let row = row.with_context(||format!("Could not read {}",input.path.display()))?;
            let text = column(&row,&columns,"text");
            if !has_alphabetic(text) { continue }
            if input.legacy && !is_recent_enough(column(&row,&columns,"date"),options.first_year) { continue }
            summary.paragraphs+=1;
            for (i,sentence) in splitter.split(text).iter().enumerate() {
                if !has_alphabetic(sentence) { continue }
                summary.sentences+=1;
                let sentencenumber = (i+1).to_string();
                let instance_id = summary.sentences.to_string();
                writer.write_record(fieldnames.iter().map(|f|match f.as_str() {
                    "instance_id" => instance_id.as_str(),
                    "sentencenumber" => sentencenumber.as_str(),
                    "text" => sentence.as_str(),
                    _ => column(&row,&columns,f),
                }))?;
            }
            if limit.map(|l|summary.paragraphs>=l).unwrap_or(false) { break }
        }
    }
    writer.flush()?;
    Ok(summary)
}

/// Build the corpus of a country from the data in `country_dir`, writing it into `corpus_dir`.
/// For the European Parliament `language` selects which language's speeches are used.
pub fn build_corpus(country:&str,language:Option<&str>,country_dir:&Path,corpus_dir:&Path,options:&CorpusOptions) -> anyhow::Result<PathBuf> {
    let splitter = sentence_splitter(&corpus_language(country,language)?);
    build_corpus_with_splitter(country,language,country_dir,corpus_dir,options,splitter.as_ref())
}

pub fn build_corpus_with_splitter(country:&str,language:Option<&str>,country_dir:&Path,corpus_dir:&Path,options:&CorpusOptions,splitter:&dyn SentenceSplitter) -> anyhow::Result<PathBuf> {
    let inputs = corpus_inputs(country,language,country_dir,options)?;
    let fieldnames = corpus_fieldnames(country,&inputs)?;
    std::fs::create_dir_all(corpus_dir).with_context(||format!("Could not create {}",corpus_dir.display()))?;
    let output = corpus_dir.join(corpus_file_name(country,language,options));
    let summary = write_corpus(&inputs,&fieldnames,&output,options,splitter)?;
    info!("{} corpus has {} sentences from {} paragraphs",country,summary.sentences,summary.paragraphs);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> CorpusOptions { CorpusOptions{ first_year: 2009, last_year: 2019, num_paragraphs: None } }

    fn write(path:&Path,contents:&str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path,contents).unwrap();
    }

    #[test]
    fn test_unicode_splitter() {
        assert_eq!(vec!["Guten Tag.","Wie geht es?","42."],UnicodeSentenceSplitter.split("Guten Tag.  Wie geht es? 42."));
        assert!(UnicodeSentenceSplitter.split("   ").is_empty());
    }

    #[test]
    fn test_punkt_splitter() {
        let splitter = PunktSentenceSplitter::new("en").unwrap();
        assert_eq!(vec!["Mr. Smith went to Washington.","He arrived on Monday."],splitter.split("Mr. Smith went to Washington.  He arrived on Monday."));
        assert!(splitter.split("").is_empty());
        assert!(PunktSentenceSplitter::new("ga").is_none());
        assert!(PunktSentenceSplitter::new("de").is_some());
        assert_eq!(vec!["Tá.","Níl."],sentence_splitter("ga").split("Tá. Níl."));
    }

    #[test]
    fn test_build_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let country_dir = dir.path().join("germany");
        write(&country_dir.join("germany_legacy.csv"),"date,speaker,text,subcorpus\n2008-12-31,Alt,Zu alt.,x\n2010-01-05,Neu,Noch da.,y\n");
        write(&country_dir.join("2015").join("a_parsed.csv"),"date,agenda,speechnumber,paragraphnumber,speaker,party,text,parliament,iso3country\n2015-03-04,TOP 1,1,1,Merkel,CDU,Guten Tag. 42. Danke.,DE-Bundestag,GER\n2015-03-04,TOP 1,1,2,Merkel,CDU,123,DE-Bundestag,GER\n");
        write(&country_dir.join("2021").join("b_parsed.csv"),"date,text\n2021-01-01,Zu neu.\n");
        let output = build_corpus_with_splitter("germany",None,&country_dir,&dir.path().join("corpus"),&options(),&UnicodeSentenceSplitter).unwrap();
        assert!(output.ends_with("germany_corpus_2009_2019.csv"));
        let csv = std::fs::read_to_string(&output).unwrap();
        let lines : Vec<&str> = csv.lines().collect();
        assert_eq!("instance_id,date,agenda,speechnumber,paragraphnumber,sentencenumber,speaker,party,text,parliament,iso3country,subcorpus",lines[0]);
        assert_eq!(vec![
            "1,2010-01-05,,,,1,Neu,,Noch da.,,,y",
            "2,2015-03-04,TOP 1,1,1,1,Merkel,CDU,Guten Tag.,DE-Bundestag,GER,",
            "3,2015-03-04,TOP 1,1,1,3,Merkel,CDU,Danke.,DE-Bundestag,GER,",
        ],lines[1..].to_vec());
    }

    #[test]
    fn test_paragraph_limit() {
        let dir = tempfile::tempdir().unwrap();
        let country_dir = dir.path().join("malta");
        write(&country_dir.join("2012").join("a_parsed.csv"),"date,text\n2012-01-01,Wieħed.\n2012-01-01,Tnejn.\n2012-01-01,Tlieta.\n");
        let options = CorpusOptions{ num_paragraphs: Some(2), ..options() };
        let output = build_corpus("malta",None,&country_dir,&dir.path().join("corpus"),&options).unwrap();
        assert_eq!(3,std::fs::read_to_string(&output).unwrap().lines().count());
    }

    #[test]
    fn test_legacy_limit_with_one_paragraph() {
        let dir = tempfile::tempdir().unwrap();
        let country_dir = dir.path().join("malta");
        write(&country_dir.join("malta_legacy.csv"),"date,text\n2010-01-01,Qadim.\n2010-01-02,Qadim ukoll.\n");
        write(&country_dir.join("2012").join("a_parsed.csv"),"date,text\n2012-01-01,Ġdid.\n");
        let options = CorpusOptions{ num_paragraphs: Some(1), ..options() };
        let output = build_corpus("malta",None,&country_dir,&dir.path().join("corpus"),&options).unwrap();
        let csv = std::fs::read_to_string(&output).unwrap();
        assert_eq!(2,csv.lines().count());
        assert!(csv.contains("Qadim."));
    }

    #[test]
    fn test_ep_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let country_dir = dir.path().join("ep");
        write(&country_dir.join("ep_speeches_2009_2019_cy.csv"),"date,text,mep_id\n2014-01-01,Ευχαριστώ.,12\n");
        write(&country_dir.join("2014").join("x_parsed.csv"),"date,text\n2014-01-01,Not used.\n");
        let output = build_corpus("ep",Some("cy"),&country_dir,dir.path(),&options()).unwrap();
        assert!(output.ends_with("ep_corpus_2009_2019_cy.csv"));
        let csv = std::fs::read_to_string(&output).unwrap();
        assert_eq!(2,csv.lines().count());
        assert!(csv.contains("Ευχαριστώ."));
        assert!(csv.lines().next().unwrap().ends_with(",mep_id"));
    }

    #[test]
    fn test_extra_schema() {
        let fieldnames = corpus_fieldnames("bulgaria",&[]).unwrap();
        assert_eq!(CORPUS_FIELDNAMES,&fieldnames[..CORPUS_FIELDNAMES.len()]);
        assert!(fieldnames.contains(&"speaker_gender".to_string()));
        assert_eq!(1,fieldnames.iter().filter(|f|*f=="title").count());
    }
}
