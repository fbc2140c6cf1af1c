//! Changes listed in acts that amend other acts.
//!
//! Such acts have no articles worth comparing; they are lists of instructions like
//! `(3) Article 5 is replaced by the following:` followed by the new text in quotation marks.
//! Both are extracted, from the direct text of every element of the document.

use std::fs::File;
use std::path::{Path, PathBuf};
use anyhow::Context;
use log::{error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};
use serde::Serialize;
use crate::legislative_changes::{eu_cases, Annotations, DocType, EuCase, CLOSING_PHRASE, OPENING_PHRASE};
use crate::normalize::normalize_string;
use crate::parse_util::read_html;

const KEY_WORDS : &[&str] = &["replaced","inserted","deleted","amended","added","amending","numbered","renumbered"];
/// Instructions are short; longer texts containing a key word are ordinary provisions.
const MAX_INSTRUCTION_LENGTH : usize = 150;
const END_QUOTATIONS : &[&str] = &["”","\"","’","’;","\".","'","';","'.","’.","ʼ","”;","”.","\"*","ˮ","\";","'; and"];

static PARENTHESISED : Lazy<Regex> = Lazy::new(||Regex::new(r"^\(.*\)$").unwrap());
static LIST_ITEM : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?:\(.*\)|\d|[a-z]\)|–)|^In\s.*following:").unwrap());
static START_QUOTATION : Lazy<Regex> = Lazy::new(||Regex::new(r#"^[ʻ“"‘']"#).unwrap());

/// One row of the output.
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct NestedChange {
    pub year : String,
    pub cod : String,
    pub doc_type : &'static str,
    pub change_type : String,
    pub change_text : String,
}

fn direct_text(e:ElementRef) -> String {
    e.children().filter_map(|c|c.value().as_text()).map(|t|&**t).collect::<String>().trim().to_string()
}

/// The non empty direct texts of all elements, in document order. A number in parentheses that
/// sits in its own element is prepended to the text after it.
pub fn element_texts(html:&Html) -> Vec<String> {
    let mut texts : Vec<String> = html.root_element().descendants().filter_map(ElementRef::wrap).map(direct_text).filter(|t|!t.is_empty()).collect();
    for i in 1..texts.len() {
        if PARENTHESISED.is_match(&texts[i-1]) {
            texts[i] = format!("{} {}",texts[i-1],texts[i]);
        }
    }
    texts
}

pub fn is_change_instruction(text:&str) -> bool {
    KEY_WORDS.iter().any(|w|text.contains(w))
        && LIST_ITEM.is_match(text)
        && text.chars().count()<MAX_INSTRUCTION_LENGTH
        && !text.contains("added tax")
}

fn ends_with_quotation(text:&str) -> bool {
    let text = text.trim_end();
    END_QUOTATIONS.iter().any(|q|text.ends_with(q))
}

/// The quoted text following the instruction at `i`, running until a text that ends with a
/// closing quotation mark. Empty if the next text is not quoted.
fn quoted_change(texts:&[String],i:usize) -> String {
    let mut parts : Vec<&str> = vec![];
    if texts.get(i+1).map(|t|START_QUOTATION.is_match(t.trim())).unwrap_or(false) {
        for text in &texts[i+1..] {
            parts.push(text);
            if ends_with_quotation(text) { break }
        }
    }
    parts.join(" ")
}

/// The instructions with their quoted text. None if the document has no adoption formula.
pub fn nested_changes(texts:&[String]) -> Option<Vec<(String,String)>> {
    let opening = texts.iter().position(|t|OPENING_PHRASE.is_match(t))?;
    let texts = &texts[opening+1..];
    let mut res = vec![];
    for (i,text) in texts.iter().enumerate() {
        if CLOSING_PHRASE.is_match(text) { break }
        if is_change_instruction(text) {
            res.push((normalize_string(text),normalize_string(&quoted_change(texts,i))));
        }
    }
    Some(res)
}

/// The changes in one document of a procedure, if it is annotated as a hard case.
pub fn extract_changes(case:&EuCase,doc_type:DocType,annotations:&Annotations) -> anyhow::Result<Vec<NestedChange>> {
    let path = case.document(doc_type);
    if !annotations.is_hard_case(&case.doc_key(),doc_type) || !path.is_file() { return Ok(vec![]) }
    let texts = element_texts(&read_html(&path)?);
    match nested_changes(&texts) {
        Some(changes) => Ok(changes.into_iter().map(|(change_type,change_text)|NestedChange{
            year: case.year.clone(),
            cod: case.cod.clone(),
            doc_type: doc_type.label(),
            change_type,
            change_text,
        }).collect()),
        None => {
            warn!("Opening phrase not detected in {}",path.display());
            Ok(vec![])
        }
    }
}

/// Where the changes for one document type are written.
pub fn nested_changes_file(output_dir:&Path,doc_type:DocType) -> PathBuf {
    output_dir.join("nested").join(doc_type.doc_name()).join("nested_structure_changes.csv")
}

/// Extract the changes from every hard case under `eu_dir`. Returns the file written.
pub fn parse_nested_structure(eu_dir:&Path,annotations:&Annotations,doc_type:DocType,output_dir:&Path) -> anyhow::Result<PathBuf> {
    let mut changes = vec![];
    let mut year = String::new();
    for case in eu_cases(eu_dir)? {
        if case.year!=year {
            info!("Parsing {} year ({})",case.year,doc_type.doc_name());
            year = case.year.clone();
        }
        match extract_changes(&case,doc_type,annotations) {
            Ok(found) => changes.extend(found),
            Err(e) => error!("Could not parse {} : {:#}",case.doc_key(),e),
        }
    }
    let path = nested_changes_file(output_dir,doc_type);
    if let Some(dir) = path.parent() { std::fs::create_dir_all(dir).with_context(||format!("Could not create {}",dir.display()))?; }
    let mut writer = csv::Writer::from_writer(File::create(&path).with_context(||format!("Could not create {}",path.display()))?);
    writer.write_record(["year","cod","doc_type","change_type","change_text"])?;
    for change in &changes {
        writer.write_record([change.year.as_str(),change.cod.as_str(),change.doc_type,change.change_type.as_str(),change.change_text.as_str()])?;
    }
    writer.flush()?;
    info!("{} changes written to {}",changes.len(),path.display());
    Ok(path)
}
