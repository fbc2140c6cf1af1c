//! Split EUR-Lex proposals and final acts into their articles.
//!
//! Proposals come in two layouts. Older ones are flat sequences of `p` elements; the articles
//! start after the adoption formula (`HAVE ADOPTED THIS REGULATION:`) with a paragraph
//! `Article 1` (or `Sole Article`). Newer ones are wrapped in `div.contentWrapper`, with each
//! article starting at a `p.Titrearticle`, and the text of an article may continue in the next
//! container element.
//!
//! Final acts also come in two layouts: article titles `p.oj-ti-art` directly in `body`
//! followed by the text, or a `div` per article with the article number as its id.

use std::fs::File;
use std::path::Path;
use anyhow::Context;
use log::{error, info};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use crate::error::StructureError;
use crate::legislative_changes::{eu_cases, merge_out_of_sequence, read_celex, Article, DocType, CLOSING_PHRASE, OPENING_PHRASE};
use crate::normalize::normalize_string;
use crate::parse_util::read_html;

static CONTENT_WRAPPER : Lazy<Selector> = Lazy::new(||Selector::parse("div.contentWrapper").unwrap());
static P : Lazy<Selector> = Lazy::new(||Selector::parse("p").unwrap());
static TITRE_ARTICLE : Lazy<Selector> = Lazy::new(||Selector::parse("p.Titrearticle").unwrap());
static DOC_TITLE : Lazy<Selector> = Lazy::new(||Selector::parse("p.oj-doc-ti, p.doc-ti").unwrap());

static FIRST_ARTICLE : Lazy<Regex> = Lazy::new(||Regex::new(r"^\s*Article\s*1|Sole Article").unwrap());
static ARTICLE_HEADING : Lazy<Regex> = Lazy::new(||Regex::new(r"^\s*Article").unwrap());
static NUMBERED_ARTICLE_TITLE : Lazy<Regex> = Lazy::new(||Regex::new(r"^\s*Article\s+(\d+)").unwrap());
static ARTICLE_REFERENCE : Lazy<Regex> = Lazy::new(||Regex::new(r"Article\s+\d+").unwrap());
static DONE_AT : Lazy<Regex> = Lazy::new(||Regex::new(r"Done\s+at").unwrap());
static ARTICLE_ONE_TITLE : Lazy<Regex> = Lazy::new(||Regex::new(r"^\s*Article\s*1\s*$").unwrap());
static FINAL_ACT_ARTICLE_CLASS : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?:oj-ti-art|ti-art)").unwrap());
static NUMBER : Lazy<Regex> = Lazy::new(||Regex::new(r"\d+").unwrap());
static YEAR : Lazy<Regex> = Lazy::new(||Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());
static CORRELATION_TABLE : Lazy<Regex> = Lazy::new(||Regex::new(r"CORRELATION\s+TABLE").unwrap());

fn text_of(e:ElementRef) -> String { e.text().collect::<String>() }

fn first_class(e:ElementRef) -> Option<String> {
    e.value().attr("class").and_then(|c|c.split_whitespace().next()).map(|c|c.to_string())
}

fn next_element(e:ElementRef) -> Option<ElementRef> {
    e.next_siblings().find_map(ElementRef::wrap)
}

/// The next element in reading order for the formatted layout: the next sibling, or else the
/// first element inside the parent's next sibling.
fn next_in_flow(e:ElementRef) -> Option<ElementRef> {
    next_element(e).or_else(||{
        let parent = e.parent().and_then(ElementRef::wrap)?;
        next_element(parent)?.descendants().skip(1).find_map(ElementRef::wrap)
    })
}

fn first_number(text:&str) -> Option<u32> {
    NUMBER.find(text).and_then(|m|m.as_str().parse().ok())
}

/// `Article 3` → 3. Anything else, such as `Article 3a`, has no number.
fn article_heading_number(heading:&str) -> Option<u32> {
    let heading = heading.trim();
    heading.split_whitespace().nth(1).and_then(|n|n.parse().ok())
        .or_else(||heading.replace("Article","").trim().parse().ok())
}

fn is_heading_of(text:&str,art_no:u32) -> bool {
    text.trim_start().strip_prefix("Article").map(|rest|rest.trim_start().starts_with(&art_no.to_string())).unwrap_or(false)
}

/// Whether a proposal is in the newer layout.
pub fn is_formatted(html:&Html) -> bool {
    html.select(&CONTENT_WRAPPER).next().is_some()
}

/// Whether the document contains an adoption formula. Documents without one have no articles.
pub fn has_opening_phrase(html:&Html) -> bool {
    html.root_element().text().any(|t|OPENING_PHRASE.is_match(t))
}

/// Parse a proposal. None if it has no articles.
pub fn parse_proposal(path:&Path) -> anyhow::Result<Option<Vec<Article>>> {
    let html = read_html(path)?;
    if !has_opening_phrase(&html) { return Ok(None) }
    let celex = read_celex(path)?;
    let articles = if is_formatted(&html) { parse_formatted_proposal(&html,&celex) } else { parse_flat_proposal(&html,&celex)? };
    Ok(Some(articles))
}

/// The text of the siblings following an article heading, up to the heading of the next article or
/// the closing formula. Also returns whether the closing formula was reached.
fn flat_article_text(heading:ElementRef,art_no:u32) -> (String,bool) {
    let mut text = String::new();
    for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
        let sibling_text = text_of(sibling);
        if CLOSING_PHRASE.is_match(&sibling_text) { return (text,true) }
        if is_heading_of(&sibling_text,art_no+1) { return (text,false) }
        text.push(' ');
        text.push_str(&sibling_text);
    }
    (text,false)
}

fn parse_flat_proposal(html:&Html,celex:&str) -> anyhow::Result<Vec<Article>> {
    let opening = html.select(&P).find(|p|OPENING_PHRASE.is_match(&text_of(*p))).ok_or(StructureError::MissingAnchor("the adoption formula in a paragraph"))?;
    let is_p = |e:&ElementRef|e.value().name()=="p";
    let first = opening.next_siblings().filter_map(ElementRef::wrap).filter(is_p).find(|p|FIRST_ARTICLE.is_match(&text_of(*p))).ok_or(StructureError::MissingAnchor("Article 1"))?;
    let article = |art_no:u32,text:&str|Article{ celex: celex.to_string(), art_no, text: normalize_string(text) };
    let (text,mut closed) = flat_article_text(first,1);
    let mut articles = vec![article(1,&text)];
    for heading in first.next_siblings().filter_map(ElementRef::wrap).filter(is_p) {
        if closed { break }
        let heading_text = text_of(heading);
        if !ARTICLE_HEADING.is_match(&heading_text) { continue }
        let expected = articles.len() as u32+1;
        if article_heading_number(&heading_text)==Some(expected) {
            let (text,end) = flat_article_text(heading,expected);
            articles.push(article(expected,&text));
            closed = end;
        }
    }
    Ok(articles)
}

fn parse_formatted_proposal(html:&Html,celex:&str) -> Vec<Article> {
    let mut articles = vec![];
    for heading in html.select(&TITRE_ARTICLE) {
        let art_no = match NUMBERED_ARTICLE_TITLE.captures(&text_of(heading)).and_then(|cap|cap[1].parse().ok()) {
            Some(n) => n,
            None => continue,
        };
        let mut text = String::new();
        let mut current = next_in_flow(heading);
        while let Some(e) = current {
            let class = match first_class(e) { Some(c) => c, None => break };
            let e_text = text_of(e);
            if (class=="Titrearticle" && ARTICLE_REFERENCE.is_match(&e_text)) || DONE_AT.is_match(&e_text) { break }
            text.push(' ');
            text.push_str(&e_text);
            current = next_in_flow(e);
        }
        articles.push(Article{ celex: celex.to_string(), art_no, text: normalize_string(&text) });
    }
    merge_out_of_sequence(articles)
}

/// An adopted act, split into articles.
#[derive(Debug,Clone,PartialEq)]
pub struct FinalAct {
    pub celex : String,
    /// From the heading of the document.
    pub year : Option<i32>,
    /// The kind of act, e.g. `REGULATION`.
    pub title : String,
    pub has_correlation_table : bool,
    pub articles : Vec<Article>,
}

pub fn parse_final_act(path:&Path) -> anyhow::Result<FinalAct> {
    parse_final_act_html(&read_html(path)?,read_celex(path)?)
}

fn final_act_title(html:&Html) -> String {
    match html.select(&DOC_TITLE).next() {
        Some(p) => match p.descendants().skip(1).find_map(ElementRef::wrap) {
            Some(child) => text_of(child).trim().to_string(),
            None => text_of(p).split_whitespace().next().unwrap_or("").to_string(),
        },
        None => { info!("Title of final act not found"); String::new() }
    }
}

fn final_act_year(html:&Html) -> Option<i32> {
    let first = html.select(&P).next()?;
    YEAR.find(&text_of(first)).and_then(|m|m.as_str().parse().ok())
}

/// Articles whose titles are children of `body`, each followed by its text up to the next title.
fn articles_in_body(body:ElementRef) -> Vec<(u32,String)> {
    let is_title = |e:&ElementRef|e.value().attr("class").map(|c|c.split_whitespace().any(|c|FINAL_ACT_ARTICLE_CLASS.is_match(c))).unwrap_or(false);
    let mut res = vec![];
    for title in body.children().filter_map(ElementRef::wrap).filter(|e|e.value().name()=="p" && is_title(e)) {
        let art_no = match first_number(&text_of(title)) { Some(n) => n, None => continue };
        let content : Vec<String> = title.next_siblings().filter_map(ElementRef::wrap)
            .take_while(|e|!matches!(first_class(*e).as_deref(),Some("ti-art"|"oj-ti-art"|"final")))
            .map(|e|normalize_string(&text_of(e)))
            .collect();
        res.push((art_no,content.join(" ")));
    }
    res
}

/// Articles in a `div` each, with ids such as `001`.
fn articles_in_divs(first:ElementRef) -> Vec<(u32,String)> {
    let numbered = |e:&ElementRef|e.value().name()=="div" && e.value().attr("id").map(|id|id.starts_with(|c:char|c.is_ascii_digit())).unwrap_or(false);
    let divs = std::iter::once(first).chain(first.next_siblings().filter_map(ElementRef::wrap).filter(numbered));
    let mut res = vec![];
    for div in divs {
        let art_no = match div.value().attr("id").and_then(first_number) { Some(n) => n, None => continue };
        let texts : Vec<String> = div.text().map(normalize_string).filter(|t|!t.is_empty())
            .skip_while(|t|NUMBERED_ARTICLE_TITLE.is_match(t))
            .collect();
        res.push((art_no,texts.join(" ")));
    }
    res
}

fn parse_final_act_html(html:&Html,celex:String) -> anyhow::Result<FinalAct> {
    let first_title = html.root_element().descendants()
        .find(|n|n.value().as_text().map(|t|ARTICLE_ONE_TITLE.is_match(t)).unwrap_or(false))
        .and_then(|n|n.parent()).and_then(ElementRef::wrap)
        .ok_or(StructureError::MissingAnchor("the title of Article 1"))?;
    let container = first_title.parent().and_then(ElementRef::wrap).ok_or(StructureError::MissingAnchor("the element containing Article 1"))?;
    let articles = match container.value().name() {
        "body" => articles_in_body(container),
        "div" => articles_in_divs(container),
        other => return Err(StructureError::unexpected(format!("Article 1 is inside {}",other)).into()),
    };
    let articles = articles.into_iter().map(|(art_no,text)|Article{ celex: celex.clone(), art_no, text: normalize_string(&text) }).collect();
    Ok(FinalAct{
        year: final_act_year(html),
        title: final_act_title(html),
        has_correlation_table: html.root_element().text().any(|t|CORRELATION_TABLE.is_match(t)),
        articles: merge_out_of_sequence(articles),
        celex,
    })
}

pub const FINAL_ACT_FIELDNAMES : &[&str] = &["celex","year","title","art_no","text","has_correlation_table"];

#[derive(Serialize)]
struct FinalActRow<'a> {
    celex : &'a str,
    year : Option<i32>,
    title : &'a str,
    art_no : u32,
    text : &'a str,
    has_correlation_table : bool,
}

fn write_final_acts(path:&Path,acts:&[FinalAct]) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(File::create(path).with_context(||format!("Could not create {}",path.display()))?);
    writer.write_record(FINAL_ACT_FIELDNAMES)?;
    for act in acts {
        for article in &act.articles {
            writer.serialize(FinalActRow{ celex: &act.celex, year: act.year, title: &act.title, art_no: article.art_no, text: &article.text, has_correlation_table: act.has_correlation_table })?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Parse the final act of every procedure under `eu_dir` into `output_dir`: either one CSV per
/// procedure in `<year>/<procedure>/`, or all of them in one CSV. Returns the number of acts parsed.
pub fn parse_final_acts(eu_dir:&Path,output_dir:&Path,preserve_structure:bool) -> anyhow::Result<usize> {
    let doc_name = DocType::FinalAct.doc_name();
    let mut all = vec![];
    let mut count = 0;
    for case in eu_cases(eu_dir)? {
        let path = case.document(DocType::FinalAct);
        if !path.is_file() { info!("For {} / {} file not found.",case.year,case.cod); continue }
        let act = match parse_final_act(&path) {
            Ok(act) => act,
            Err(e) => { error!("Could not parse {} : {:#}",path.display(),e); continue }
        };
        count+=1;
        if preserve_structure {
            let dir = output_dir.join(&case.year).join(&case.cod);
            std::fs::create_dir_all(&dir)?;
            write_final_acts(&dir.join(format!("{}_parsed.csv",doc_name)),&[act])?;
        } else {
            all.push(act);
        }
    }
    if !preserve_structure {
        std::fs::create_dir_all(output_dir)?;
        write_final_acts(&output_dir.join(format!("{}_parsed.csv",doc_name)),&all)?;
    }
    info!("Parsed {} final acts",count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT_PROPOSAL : &str = r#"<html><body>
<p>Having regard to the Treaty,</p>
<p>HAVE ADOPTED THIS REGULATION:</p>
<p>Article 1</p>
<p>Subject matter</p>
<p>This Regulation lays down rules.</p>
<p>Article 2</p>
<p>Definitions apply.</p>
<p>Article 4</p>
<p>Out of order.</p>
<p>Article 3</p>
<p>Entry into force.</p>
<p>Done at Brussels,</p>
<p>Article 4</p>
</body></html>"#;

    #[test]
    fn test_flat_proposal() {
        let html = Html::parse_document(FLAT_PROPOSAL);
        assert!(!is_formatted(&html));
        assert!(has_opening_phrase(&html));
        let articles = parse_flat_proposal(&html,"52016PC0280").unwrap();
        assert_eq!(vec![1,2,3],articles.iter().map(|a|a.art_no).collect::<Vec<_>>());
        assert_eq!("Subject matter This Regulation lays down rules.",articles[0].text);
        assert_eq!("Definitions apply. Article 4 Out of order.",articles[1].text);
        assert_eq!("Entry into force.",articles[2].text);
    }

    #[test]
    fn test_sole_article() {
        let html = Html::parse_document("<body><p>HAS ADOPTED THIS DECISION:</p><p>Sole Article</p><p>The agreement is approved.</p><p>Done at Strasbourg</p></body>");
        let articles = parse_flat_proposal(&html,"x").unwrap();
        assert_eq!(1,articles.len());
        assert_eq!("The agreement is approved.",articles[0].text);
    }

    const FORMATTED_PROPOSAL : &str = r#"<html><body><div class="contentWrapper">
<div class="content"><p class="Formuledadoption">HAVE ADOPTED THIS REGULATION:</p>
<p class="Titrearticle">  Article 1</p>
<p class="Normal">This Regulation applies.</p></div>
<div class="content"><p class="Normal">It continues here.</p>
<p class="Titrearticle">  Article 2</p>
<p class="Normal">Second.</p>
<p class="Fait">Done at Brussels,</p></div>
</div></body></html>"#;

    #[test]
    fn test_formatted_proposal() {
        let html = Html::parse_document(FORMATTED_PROPOSAL);
        assert!(is_formatted(&html));
        let articles = parse_formatted_proposal(&html,"52016PC0280");
        assert_eq!(2,articles.len());
        assert_eq!("This Regulation applies. It continues here.",articles[0].text);
        assert_eq!("Second.",articles[1].text);
    }

    #[test]
    fn test_final_act_in_body() {
        let html = Html::parse_document(r#"<html><body>
<p class="oj-hd-date">11.7.2019</p>
<p class="oj-doc-ti"><span>REGULATION</span> (EU) 2019/1150 OF THE EUROPEAN PARLIAMENT</p>
<p class="oj-ti-art">Article 1</p>
<p class="oj-normal">Subject matter.</p>
<p>Untitled paragraph.</p>
<p class="oj-ti-art">Article 2</p>
<p class="oj-normal">Definitions.</p>
<p class="final">Done at Brussels</p>
<p class="oj-ti-tbl">CORRELATION TABLE</p>
</body></html>"#);
        let act = parse_final_act_html(&html,"32019R1150".to_string()).unwrap();
        assert_eq!((Some(2019),"REGULATION",true),(act.year,act.title.as_str(),act.has_correlation_table));
        assert_eq!(vec![(1,"Subject matter. Untitled paragraph."),(2,"Definitions.")],act.articles.iter().map(|a|(a.art_no,a.text.as_str())).collect::<Vec<_>>());
    }

    #[test]
    fn test_final_act_in_divs() {
        let html = Html::parse_document(r#"<html><body><p>L 186/57 of 2019</p><p class="doc-ti">DIRECTIVE (EU) 2019/1</p>
<div id="001"><p class="ti-art">Article 1</p>
<p class="sti-art">Scope</p><p>Applies.</p></div>
<div id="002"><p class="ti-art">Article 2</p><p>Second.</p></div>
<div id="enc_1"><p>Annex</p></div>
</body></html>"#);
        let act = parse_final_act_html(&html,"x".to_string()).unwrap();
        assert_eq!((Some(2019),"DIRECTIVE",false),(act.year,act.title.as_str(),act.has_correlation_table));
        assert_eq!(vec![(1,"Scope Applies."),(2,"Second.")],act.articles.iter().map(|a|(a.art_no,a.text.as_str())).collect::<Vec<_>>());
    }

    #[test]
    fn test_parse_final_acts() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("eu").join("2019").join("0001(COD)").join("full").join("source");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("full_final_act_1.html"),"<html><body><p>2019</p><p class=\"oj-ti-art\">Article 1</p><p>Text.</p></body></html>").unwrap();
        std::fs::write(source.join("full_final_act_1.json"),r#"{"x":{"celex":"32019R0001"}}"#).unwrap();
        std::fs::create_dir_all(dir.path().join("eu").join("2019").join("0002(COD)")).unwrap();
        assert_eq!(1,parse_final_acts(&dir.path().join("eu"),&dir.path().join("out"),true).unwrap());
        let csv = std::fs::read_to_string(dir.path().join("out").join("2019").join("0001(COD)").join("full_final_act_1_parsed.csv")).unwrap();
        assert_eq!("celex,year,title,art_no,text,has_correlation_table\n32019R0001,2019,,1,Text.,false\n",csv);
    }
}
