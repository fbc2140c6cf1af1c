//! Comparing EU legislative proposals with the final acts adopted from them.
//!
//! The raw documents live in `eu/<year>/<procedure>/full/source/`, e.g.
//! `eu/2016/0280(COD)/full/source/full_final_act_1.html`, each with a json file of metadata
//! next to it. [eu_documents] splits both kinds of documents into articles, [docutoads_input]
//! prepares pairs of them for DocuToads, [edit_triples] turns the DocuToads output into
//! changes with context, and [nested_changes] handles acts that consist of amendments to other
//! acts, for which comparing articles makes no sense.

pub mod eu_documents;
pub mod docutoads_input;
pub mod edit_triples;
pub mod nested_changes;

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use anyhow::{anyhow, Context};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use crate::parse_util::open_csv;

/// The formula after the recitals, after which the articles start.
pub static OPENING_PHRASE : Lazy<Regex> = Lazy::new(||Regex::new(r"(?:HAS|HAVE)\s*ADOPTED|(?:HAS|HAVE)\s*DECIDED|HAS\s*HAVE\s*ADOPTED|HAS\s*Ö\s*HAVE\s*Õ\s*ADOPTED").unwrap());
/// `Done at Brussels, ...`, after the last article.
pub static CLOSING_PHRASE : Lazy<Regex> = Lazy::new(||Regex::new(r"^\s*Done\s+at").unwrap());

/// One article of a proposal or final act.
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct Article {
    pub celex : String,
    pub art_no : u32,
    pub text : String,
}

/// The two documents of a procedure that are compared.
#[derive(Debug,Clone,Copy,PartialEq,Eq)]
pub enum DocType {
    Proposal,
    FinalAct,
}

impl DocType {
    /// The file name, without `.html`.
    pub fn doc_name(self) -> &'static str {
        match self {
            DocType::Proposal => "full_legislative_proposal_1",
            DocType::FinalAct => "full_final_act_1",
        }
    }
    pub fn label(self) -> &'static str {
        match self {
            DocType::Proposal => "proposal",
            DocType::FinalAct => "final_act",
        }
    }
}

impl FromStr for DocType {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_legislative_proposal_1" | "proposal" => Ok(DocType::Proposal),
            "full_final_act_1" | "final_act" => Ok(DocType::FinalAct),
            _ => Err(anyhow!("Unknown document type {}. Choose one of full_final_act_1, full_legislative_proposal_1",s)),
        }
    }
}

/// The CELEX number of a document, from the first entry of the json file saved next to it.
pub fn read_celex(html_path:&Path) -> anyhow::Result<String> {
    let json_path = html_path.with_extension("json");
    let meta : serde_json::Value = serde_json::from_reader(File::open(&json_path).with_context(||format!("Could not open {}",json_path.display()))?)?;
    let first = match &meta {
        serde_json::Value::Object(map) => map.values().next(),
        serde_json::Value::Array(list) => list.first(),
        _ => None,
    };
    first.and_then(|v|v.get("celex")).and_then(|v|v.as_str()).map(|s|s.to_string()).ok_or_else(||anyhow!("No celex number in {}",json_path.display()))
}

/// Articles are expected to be numbered 1, 2, 3... An article whose number does not continue the
/// sequence is taken to be part of the previous one.
pub fn merge_out_of_sequence(articles:Vec<Article>) -> Vec<Article> {
    let mut res : Vec<Article> = Vec::with_capacity(articles.len());
    for article in articles {
        let expected_no = res.len()+1;
        match res.last_mut() {
            Some(previous) if article.art_no as usize!=expected_no => {
                previous.text.push(' ');
                previous.text.push_str(&article.text);
            }
            _ => res.push(article),
        }
    }
    res
}

/// One legislative procedure, `eu/<year>/<procedure>`.
#[derive(Debug,Clone,PartialEq)]
pub struct EuCase {
    pub year : String,
    pub cod : String,
    pub source_dir : PathBuf,
}

impl EuCase {
    /// How the procedure is referred to in the annotations, e.g. `20160280(COD)`.
    pub fn doc_key(&self) -> String { format!("{}{}",self.year,self.cod) }
    pub fn document(&self,doc_type:DocType) -> PathBuf { self.source_dir.join(format!("{}.html",doc_type.doc_name())) }
}

fn sorted_subdirectories(dir:&Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut res = vec![];
    for entry in std::fs::read_dir(dir).with_context(||format!("Could not read directory {}",dir.display()))? {
        let path = entry?.path();
        if path.is_dir() { res.push(path) }
    }
    res.sort();
    Ok(res)
}

/// All the procedures under `eu_dir`, by year.
pub fn eu_cases(eu_dir:&Path) -> anyhow::Result<Vec<EuCase>> {
    let name = |p:&Path|p.file_name().map(|n|n.to_string_lossy().to_string()).unwrap_or_default();
    let mut res = vec![];
    for year in sorted_subdirectories(eu_dir)? {
        for cod in sorted_subdirectories(&year)? {
            res.push(EuCase{ year: name(&year), cod: name(&cod), source_dir: cod.join("full").join("source") });
        }
    }
    Ok(res)
}

#[derive(Debug,Deserialize)]
struct AnnotationRow {
    doc_key : String,
    annot_final_act : u8,
    annot_proposal : u8,
}

/// Which documents consist of amendments to other acts ("hard cases"), from a CSV with columns
/// `doc_key`, `annot_final_act` and `annot_proposal` (1 for a hard case).
#[derive(Debug,Default)]
pub struct Annotations {
    by_key : HashMap<String,Vec<(bool,bool)>>,
}

impl Annotations {
    pub fn load(path:&Path) -> anyhow::Result<Annotations> {
        let mut res = Annotations::default();
        for row in open_csv(path)?.deserialize() {
            let row : AnnotationRow = row.with_context(||format!("Could not read {}",path.display()))?;
            res.by_key.entry(row.doc_key).or_default().push((row.annot_final_act==1,row.annot_proposal==1));
        }
        Ok(res)
    }

    /// Annotated, with neither document a hard case.
    pub fn is_regular(&self,doc_key:&str) -> bool {
        self.by_key.get(doc_key).map(|v|v.iter().any(|(f,p)|!f && !p)).unwrap_or(false)
    }

    pub fn is_hard_case(&self,doc_key:&str,doc_type:DocType) -> bool {
        self.by_key.get(doc_key).map(|v|v.iter().any(|(f,p)|match doc_type { DocType::FinalAct => *f, DocType::Proposal => *p })).unwrap_or(false)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn article(art_no:u32,text:&str) -> Article {
        Article{ celex: "52016PC0280".to_string(), art_no, text: text.to_string() }
    }

    #[test]
    fn test_merge_out_of_sequence() {
        let merged = merge_out_of_sequence(vec![article(1,"a"),article(2,"b"),article(7,"c"),article(3,"d"),article(2,"e")]);
        assert_eq!(vec![article(1,"a"),article(2,"b c"),article(3,"d e")],merged);
    }

    #[test]
    fn test_read_celex() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("full_final_act_1.json"),r#"{"full_final_act_1": {"celex": "32019R1150", "url": "https://eur-lex.europa.eu/"}}"#).unwrap();
        assert_eq!("32019R1150",read_celex(&dir.path().join("full_final_act_1.html")).unwrap());
        assert!(read_celex(&dir.path().join("full_legislative_proposal_1.html")).is_err());
    }

    #[test]
    fn test_annotations_and_cases() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("annotations.csv"),"doc_key,annot_final_act,annot_proposal\n20160280(COD),0,0\n20170001(COD),1,0\n").unwrap();
        let annotations = Annotations::load(&dir.path().join("annotations.csv")).unwrap();
        assert!(annotations.is_regular("20160280(COD)"));
        assert!(!annotations.is_regular("20170001(COD)"));
        assert!(!annotations.is_regular("20180001(COD)"));
        assert!(annotations.is_hard_case("20170001(COD)",DocType::FinalAct));
        assert!(!annotations.is_hard_case("20170001(COD)",DocType::Proposal));
        std::fs::create_dir_all(dir.path().join("eu").join("2016").join("0280(COD)")).unwrap();
        std::fs::create_dir_all(dir.path().join("eu").join("2016").join("0179(COD)")).unwrap();
        let cases = eu_cases(&dir.path().join("eu")).unwrap();
        assert_eq!(vec!["20160179(COD)","20160280(COD)"],cases.iter().map(|c|c.doc_key()).collect::<Vec<_>>());
        assert!(cases[1].document(DocType::FinalAct).ends_with("2016/0280(COD)/full/source/full_final_act_1.html"));
    }
}
