//! Reading paragraphs out of Word .docx files.
//!
//! A .docx is a zip archive; the body text lives in `word/document.xml` as `w:p` paragraphs
//! made of `w:r` runs, each of which may be bold or italic.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use anyhow::{anyhow, Context};
use roxmltree::Node;
use crate::xml_util::{parse_xml_str, NodeExt};

#[derive(Debug,Clone,Default,PartialEq)]
pub struct DocxRun {
    pub text : String,
    pub bold : bool,
    pub italic : bool,
}

#[derive(Debug,Clone,Default,PartialEq)]
pub struct DocxParagraph {
    pub runs : Vec<DocxRun>,
}

impl DocxParagraph {
    pub fn text(&self) -> String { self.runs.iter().map(|r|r.text.as_str()).collect() }
    /// All runs with text are italic (and there is at least one).
    pub fn all_italic(&self) -> bool {
        let mut with_text = self.runs.iter().filter(|r|!r.text.is_empty()).peekable();
        with_text.peek().is_some() && with_text.all(|r|r.italic)
    }
}

/// Whether a `w:b` or `w:i` property element is switched on.
fn toggled(properties:Option<Node>,name:&str) -> bool {
    properties.and_then(|p|p.child(name)).map(|e|!matches!(e.attr("w:val"),Some("0")|Some("false"))).unwrap_or(false)
}

fn parse_run(run:Node) -> DocxRun {
    let properties = run.child("w:rPr");
    let mut text = String::new();
    for e in run.elements() {
        match e.tag_name().name() {
            "t" => text.push_str(&e.all_text()),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            _ => {}
        }
    }
    DocxRun{ text, bold: toggled(properties,"w:b"), italic: toggled(properties,"w:i") }
}

/// Paragraphs of the body of a `word/document.xml`, not including those inside tables.
pub fn parse_document_xml(xml:&str) -> anyhow::Result<Vec<DocxParagraph>> {
    let document = parse_xml_str(xml)?;
    let body = document.root_element().child("w:body").ok_or_else(||anyhow!("No w:body in document.xml"))?;
    Ok(body.children_named("w:p").map(|p|{
        DocxParagraph{ runs: p.descendants_named("w:r").into_iter().map(parse_run).collect() }
    }).collect())
}

fn read_document_xml<R:Read+Seek>(archive:&mut zip::ZipArchive<R>) -> anyhow::Result<String> {
    let mut document = archive.by_name("word/document.xml").context("Cannot find word/document.xml")?;
    let mut xml = String::new();
    document.read_to_string(&mut xml)?;
    Ok(xml)
}

pub fn read_docx_paragraphs(path:&Path) -> anyhow::Result<Vec<DocxParagraph>> {
    let file = File::open(path).with_context(||format!("Could not open {}",path.display()))?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file)).with_context(||format!("{} is not a docx file",path.display()))?;
    parse_document_xml(&read_document_xml(&mut archive)?)
}

/// The whole text of the document, paragraphs separated by blank lines.
pub fn docx_text(paragraphs:&[DocxParagraph]) -> String {
    paragraphs.iter().map(|p|p.text()).collect::<Vec<_>>().join("\n\n")
}
