//! Navigating XML documents parsed with roxmltree.
//!
//! The XML transcripts (Bundestag, Oireachtas, European Parliament, TEI) are navigated by
//! structure - sections containing speeches containing paragraphs - so they are read into a
//! [roxmltree::Document]. Names given to the helpers here may carry a namespace prefix
//! (`w:p`); only the local part is compared.

use std::path::Path;
use anyhow::Context;
use roxmltree::{Document, Node, ParsingOptions};
use crate::parse_util::read_text;

fn local(name:&str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

/// Element lookups by local name, and text collection.
pub trait NodeExt<'a,'input:'a> : Sized {
    /// Whether this is an element with the given local name.
    fn is(self,name:&str) -> bool;
    fn attr(self,name:&str) -> Option<&'a str>;
    /// Child elements, ignoring text.
    fn elements(self) -> impl Iterator<Item=Node<'a,'input>>;
    fn children_named(self,name:&str) -> impl Iterator<Item=Node<'a,'input>>;
    fn child(self,name:&str) -> Option<Node<'a,'input>>;
    /// Elements below this one with the given name, in document order.
    fn descendants_named(self,name:&str) -> Vec<Node<'a,'input>>;
    /// The first element below this one with the given name.
    fn find(self,name:&str) -> Option<Node<'a,'input>>;
    /// Every text node below this one, in document order.
    fn text_nodes(self) -> Vec<&'a str>;
    fn all_text(self) -> String { self.text_nodes().concat() }
    /// Only the text nodes that are direct children.
    fn direct_text(self) -> String;
}

impl<'a,'input:'a> NodeExt<'a,'input> for Node<'a,'input> {
    fn is(self,name:&str) -> bool {
        self.is_element() && self.tag_name().name()==local(name)
    }

    fn attr(self,name:&str) -> Option<&'a str> {
        let name = local(name);
        self.attributes().find(|a|a.name()==name).map(|a|a.value())
    }

    fn elements(self) -> impl Iterator<Item=Node<'a,'input>> {
        self.children().filter(|n|n.is_element())
    }

    fn children_named(self,name:&str) -> impl Iterator<Item=Node<'a,'input>> {
        let name = local(name).to_string();
        self.children().filter(move |n|n.is(&name))
    }

    fn child(self,name:&str) -> Option<Node<'a,'input>> {
        self.children().find(|n|n.is(name))
    }

    fn descendants_named(self,name:&str) -> Vec<Node<'a,'input>> {
        self.descendants().skip(1).filter(|n|n.is(name)).collect()
    }

    fn find(self,name:&str) -> Option<Node<'a,'input>> {
        self.descendants().skip(1).find(|n|n.is(name))
    }

    fn text_nodes(self) -> Vec<&'a str> {
        self.descendants().filter(|n|n.is_text()).filter_map(|n|n.text()).collect()
    }

    fn direct_text(self) -> String {
        self.children().filter(|n|n.is_text()).filter_map(|n|n.text()).collect()
    }
}

/// Parse a whole XML document. A document type declaration is allowed, as the Bundestag protocols start with one.
pub fn parse_xml_str(xml:&str) -> anyhow::Result<Document<'_>> {
    Ok(Document::parse_with_options(xml,ParsingOptions{ allow_dtd: true, ..ParsingOptions::default() })?)
}

/// Read and parse an XML file, handing its root element to `f`.
pub fn with_xml_file<T>(path:&Path,f:impl FnOnce(Node) -> anyhow::Result<T>) -> anyhow::Result<T> {
    let xml = read_text(path)?;
    let document = parse_xml_str(&xml).with_context(||format!("Could not parse {}",path.display()))?;
    f(document.root_element())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE : &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<doc xmlns:w="urn:x"><section id="creitem3" title="3. Votes"><w:p w:val="b">Fish &amp; chips<br/>and <i>peas</i></w:p></section><section id="creitem4"/><![CDATA[raw <text>]]></doc>"#;

    #[test]
    fn test_parse_and_navigate() {
        let document = parse_xml_str(SAMPLE).unwrap();
        let root = document.root_element();
        assert!(root.is("doc"));
        let sections : Vec<_> = root.children_named("section").collect();
        assert_eq!(2,sections.len());
        assert_eq!(Some("creitem3"),sections[0].attr("id"));
        assert_eq!(None,sections[1].attr("title"));
        let p = root.find("w:p").unwrap();
        assert_eq!(Some("urn:x"),p.tag_name().namespace());
        assert_eq!(Some("b"),p.attr("val"));
        assert_eq!("Fish & chipsand peas",p.all_text());
        assert_eq!(vec!["Fish & chips","and ","peas"],p.text_nodes());
        assert_eq!("Fish & chipsand ",p.direct_text());
        assert_eq!(vec!["br","i"],p.elements().map(|e|e.tag_name().name()).collect::<Vec<_>>());
        assert!(root.find("doc").is_none());
        assert_eq!(2,root.descendants_named("section").len());
        assert!(root.direct_text().contains("raw <text>"));
    }

    #[test]
    fn test_doctype() {
        let document = parse_xml_str("<?xml version=\"1.0\"?>\n<!DOCTYPE dbtplenarprotokoll SYSTEM \"dbtplenarprotokoll.dtd\">\n<dbtplenarprotokoll sitzung-datum=\"04.03.2015\"/>").unwrap();
        assert_eq!(Some("04.03.2015"),document.root_element().attr("sitzung-datum"));
    }

    #[test]
    fn test_malformed() {
        assert!(parse_xml_str("<a><b></a>").is_err());
        assert!(parse_xml_str("").is_err());
    }

    #[test]
    fn test_with_xml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.xml");
        std::fs::write(&path,"<meps><mep/><mep/></meps>").unwrap();
        assert_eq!(2,with_xml_file(&path,|root|Ok(root.descendants_named("mep").len())).unwrap());
        std::fs::write(&path,"<meps>").unwrap();
        assert!(with_xml_file(&path,|_|Ok(())).is_err());
    }
}
