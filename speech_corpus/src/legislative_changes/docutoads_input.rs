//! Prepare proposal / final act pairs for DocuToads.
//!
//! For each procedure whose documents are both ordinary (not amending acts), the articles of
//! both documents are written as plain text next to the sources, and a case describing the pair
//! is added to the caselist: the two text files, the procedure, the article numbers and, per
//! article, the positions of its words in the text.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use anyhow::Context;
use itertools::Itertools;
use log::{error, info};
use serde::Serialize;
use crate::legislative_changes::eu_documents::{parse_final_act, parse_proposal};
use crate::legislative_changes::{eu_cases, Annotations, Article, DocType, EuCase};
use crate::normalize::normalize_string;

/// Procedures that parse but give nonsense.
const SKIPPED_PROCEDURES : &[&str] = &["20110153(COD)"];

/// Keep only printable ASCII (letters, digits, punctuation and white space), then normalize.
pub fn clean_text(text:&str) -> String {
    let printable : String = text.chars().filter(|c|c.is_ascii_graphic() || matches!(c,' '|'\t'|'\n'|'\r'|'\x0b'|'\x0c')).collect();
    normalize_string(&printable)
}

/// A document as DocuToads wants it.
#[derive(Debug,Clone,PartialEq)]
pub struct DocuToadsText {
    pub text : String,
    /// For the n-th article (from 1), the 1-based positions of its words in the text.
    pub indices : BTreeMap<usize,Vec<usize>>,
    /// The article numbers.
    pub articles : Vec<String>,
}

pub fn remove_empty_articles(articles:Vec<Article>) -> Vec<Article> {
    articles.into_iter().filter(|a|!a.text.is_empty()).collect()
}

pub fn convert_to_docutoads(articles:&[Article]) -> DocuToadsText {
    let text = clean_text(&articles.iter().map(|a|a.text.as_str()).join(" "));
    let mut indices = BTreeMap::new();
    let mut last = 0;
    for (i,article) in articles.iter().enumerate() {
        let words = article.text.split_whitespace().count();
        indices.insert(i+1,(last+1..=last+words).collect());
        last+=words;
    }
    DocuToadsText{ text, indices, articles: articles.iter().map(|a|a.art_no.to_string()).collect() }
}

/// One entry of the caselist.
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct Case {
    pub proposal_path : PathBuf,
    pub final_act_path : PathBuf,
    pub proposal_label : &'static str,
    pub final_act_label : &'static str,
    pub doc_key : String,
    pub proposal_articles : Vec<String>,
    pub final_act_articles : Vec<String>,
    pub proposal_indices : BTreeMap<usize,Vec<usize>>,
    pub final_act_indices : BTreeMap<usize,Vec<usize>>,
}

fn write_text(path:&Path,text:&str) -> anyhow::Result<()> {
    std::fs::write(path,text).with_context(||format!("Could not write {}",path.display()))
}

/// Convert the documents of one procedure, writing the texts. None if the proposal has no articles.
pub fn prepare_case(case:&EuCase) -> anyhow::Result<Option<Case>> {
    let proposal_source = case.document(DocType::Proposal);
    let proposal = match parse_proposal(&proposal_source)? {
        Some(articles) => convert_to_docutoads(&remove_empty_articles(articles)),
        None => return Ok(None),
    };
    let final_act = convert_to_docutoads(&remove_empty_articles(parse_final_act(&case.document(DocType::FinalAct))?.articles));
    let proposal_path = case.source_dir.join(format!("{}.txt",DocType::Proposal.doc_name()));
    let final_act_path = case.source_dir.join(format!("{}.txt",DocType::FinalAct.doc_name()));
    write_text(&proposal_path,&proposal.text)?;
    write_text(&final_act_path,&final_act.text)?;
    Ok(Some(Case{
        proposal_path,
        final_act_path,
        proposal_label: DocType::Proposal.label(),
        final_act_label: DocType::FinalAct.label(),
        doc_key: case.doc_key(),
        proposal_articles: proposal.articles,
        final_act_articles: final_act.articles,
        proposal_indices: proposal.indices,
        final_act_indices: final_act.indices,
    }))
}

/// Prepare every procedure under `eu_root` that is annotated as ordinary and has both documents.
/// `exclude` tells which source files are known to be bad.
pub fn create_caselist(eu_root:&Path,annotations:&Annotations,exclude:impl Fn(&Path)->bool) -> anyhow::Result<Vec<Case>> {
    let mut caselist = vec![];
    for case in eu_cases(eu_root)? {
        let doc_key = case.doc_key();
        if !annotations.is_regular(&doc_key) || SKIPPED_PROCEDURES.contains(&doc_key.as_str()) { continue }
        let proposal = case.document(DocType::Proposal);
        if !proposal.is_file() || !case.document(DocType::FinalAct).is_file() || exclude(&proposal) { continue }
        match prepare_case(&case) {
            Ok(Some(c)) => caselist.push(c),
            Ok(None) => info!("Proposal of {} has no articles",doc_key),
            Err(e) => error!("Could not prepare {} : {:#}",doc_key,e),
        }
    }
    info!("{} cases for DocuToads",caselist.len());
    Ok(caselist)
}

pub fn write_caselist(path:&Path,caselist:&[Case]) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() { std::fs::create_dir_all(dir)?; }
    let file = File::create(path).with_context(||format!("Could not create {}",path.display()))?;
    serde_json::to_writer_pretty(file,caselist)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legislative_changes::tests::article;

    #[test]
    fn test_clean_text() {
        assert_eq!("The Member States shall ensure compliance.",clean_text("The Member States shall ensure compliance.\u{00A0}”"));
        assert_eq!("Article 3 a",clean_text("Article 3 — a"));
    }

    #[test]
    fn test_convert() {
        let articles = remove_empty_articles(vec![article(1,"This Regulation applies."),article(2,""),article(3,"It enters into force.")]);
        let converted = convert_to_docutoads(&articles);
        assert_eq!("This Regulation applies. It enters into force.",converted.text);
        assert_eq!(vec!["1","3"],converted.articles);
        assert_eq!(vec![1,2,3],converted.indices[&1]);
        assert_eq!(vec![4,5,6,7],converted.indices[&2]);
    }

    #[test]
    fn test_create_caselist() {
        let dir = tempfile::tempdir().unwrap();
        let eu = dir.path().join("eu");
        let write_case = |cod:&str| {
            let source = eu.join("2016").join(cod).join("full").join("source");
            std::fs::create_dir_all(&source).unwrap();
            std::fs::write(source.join("full_legislative_proposal_1.html"),"<body><p>HAVE ADOPTED THIS REGULATION:</p><p>Article 1</p><p>Member States shall act.</p><p>Done at Brussels</p></body>").unwrap();
            std::fs::write(source.join("full_legislative_proposal_1.json"),r#"{"a":{"celex":"52016PC0001"}}"#).unwrap();
            std::fs::write(source.join("full_final_act_1.html"),"<body><p>2017</p><p class=\"oj-ti-art\">Article 1</p><p>Member States shall act quickly.</p></body>").unwrap();
            std::fs::write(source.join("full_final_act_1.json"),r#"{"a":{"celex":"32017R0001"}}"#).unwrap();
            source
        };
        let source = write_case("0001(COD)");
        write_case("0002(COD)");
        write_case("0003(COD)");
        std::fs::write(dir.path().join("annotations.csv"),"doc_key,annot_final_act,annot_proposal\n20160001(COD),0,0\n20160002(COD),1,0\n20160003(COD),0,0\n").unwrap();
        let annotations = Annotations::load(&dir.path().join("annotations.csv")).unwrap();
        let caselist = create_caselist(&eu,&annotations,|p|p.to_string_lossy().contains("0003(COD)")).unwrap();
        assert_eq!(1,caselist.len());
        assert_eq!(("20160001(COD)",vec!["1".to_string()]),(caselist[0].doc_key.as_str(),caselist[0].final_act_articles.clone()));
        assert_eq!(vec![1,2,3,4,5],caselist[0].final_act_indices[&1]);
        assert_eq!("Member States shall act.",std::fs::read_to_string(source.join("full_legislative_proposal_1.txt")).unwrap());
        let path = dir.path().join("out").join("caselist.json");
        write_caselist(&path,&caselist).unwrap();
        let json : serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!("proposal",json[0]["proposal_label"]);
        assert_eq!(serde_json::json!([1,2,3,4]),json[0]["proposal_indices"]["1"]);
    }
}
