//! Comptes rendus intégraux of the Assemblée nationale.
//!
//! Agenda items are `h2.titre1` headings. Each speech paragraph starts with the speaker in bold
//! (`M. Jean Dupont, ministre de l'intérieur.`); paragraphs without a bold speaker continue the
//! previous speech. A paragraph may hold several paragraphs separated by `<br>`.

use ego_tree::NodeRef;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use crate::country::{CountryConfig, STANDARD_FIELDNAMES_WITH_ROLE};
use crate::error::StructureError;
use crate::normalize::normalize_string;
use crate::parse_util::{find_date_with_month_names, read_html, SourceDocument, FRENCH_MONTHS};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};

pub const FRANCE : CountryConfig = CountryConfig {
    name: "france",
    parliament: "FR-Assemblee-Nationale",
    iso3country: "FRA",
    language: "fr",
    source_pattern: "*.html",
    fieldnames: STANDARD_FIELDNAMES_WITH_ROLE,
    extractor: parse_french_parliament,
};

const SALUTATIONS : &[&str] = &["M.","Mme","Mlle","MM.","Mmes"];

static HEADINGS_AND_PARAGRAPHS : Lazy<Selector> = Lazy::new(||Selector::parse("h1, h2, p").unwrap());
static TITLE : Lazy<Selector> = Lazy::new(||Selector::parse("title").unwrap());
static AGENDA_HEADING : Lazy<Selector> = Lazy::new(||Selector::parse("h2.titre1").unwrap());

pub fn parse_french_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    parse_report(&read_html(&doc.path)?)
}

fn text_of(e:&ElementRef) -> String { normalize_string(&e.text().collect::<Vec<_>>().join(" ")) }

fn is_within(e:&ElementRef,test:impl Fn(&ElementRef)->bool) -> bool {
    e.ancestors().filter_map(ElementRef::wrap).any(|a|test(&a))
}

fn is_summary(e:&ElementRef) -> bool { is_within(e,|a|a.value().id()==Some("somjo")) }

/// `M. Jean Dupont, ministre de l'intérieur.` → (`Jean Dupont`, `ministre de l'intérieur`)
fn split_speaker(bold:&str) -> (String,String) {
    let bold = normalize_string(bold);
    let bold = bold.trim_end_matches(|c:char|c=='.'||c==' ');
    let without_salutation = match bold.split_once(' ') {
        Some((first,rest)) if SALUTATIONS.contains(&first) => rest,
        _ => bold,
    };
    match without_salutation.split_once(',') {
        Some((name,role)) => (name.trim().to_string(),role.trim().trim_end_matches('.').to_string()),
        None => (without_salutation.trim().to_string(),String::new()),
    }
}

/// The leading bold text of a paragraph, i.e. the speaker announcement, if any.
fn leading_bold(p:&ElementRef) -> Option<String> {
    let first = p.children().find(|c|match c.value() {
        Node::Text(t) => !t.trim().is_empty(),
        Node::Element(_) => true,
        _ => false,
    })?;
    let bold = ElementRef::wrap(first).filter(|e|e.value().name()=="b")?;
    let text = bold.text().collect::<String>();
    if text.trim().is_empty() { None } else { Some(text) }
}

/// The text of a paragraph without the bold speaker, split at `<br>`.
fn paragraph_segments(p:&ElementRef) -> Vec<String> {
    let mut segments = vec![String::new()];
    fn walk(node:NodeRef<Node>,segments:&mut Vec<String>,skip_bold:&mut bool) {
        for child in node.children() {
            match child.value() {
                Node::Text(t) => { if let Some(s) = segments.last_mut() { s.push_str(t); s.push(' '); } }
                Node::Element(e) if e.name()=="br" => segments.push(String::new()),
                Node::Element(e) if e.name()=="b" && *skip_bold => { *skip_bold=false; }
                Node::Element(_) => walk(child,segments,skip_bold),
                _ => {}
            }
        }
    }
    let mut skip_bold = leading_bold(p).is_some();
    walk(**p,&mut segments,&mut skip_bold);
    segments
}

fn parse_report(html:&Html) -> anyhow::Result<Vec<SpeechParagraph>> {
    let title = html.select(&TITLE).next().map(|t|text_of(&t)).unwrap_or_default();
    let date = html.select(&HEADINGS_AND_PARAGRAPHS).filter(|e|e.value().name()=="h1" && !is_summary(e)).find_map(|h|find_date_with_month_names(&text_of(&h),&FRENCH_MONTHS))
        .or_else(||find_date_with_month_names(&title,&FRENCH_MONTHS))
        .ok_or(StructureError::MissingAnchor("the date of the sitting"))?;
    let has_agenda_headings = html.select(&AGENDA_HEADING).next().is_some();
    let mut sitting = SittingRecords::new(&FRANCE,date);
    let mut state = SpeakerState::default().with_agenda(&title);
    let mut started = !has_agenda_headings;
    for e in html.select(&HEADINGS_AND_PARAGRAPHS) {
        if is_summary(&e) { continue }
        match e.value().name() {
            "h1" if !started => { let t = text_of(&e); if !t.is_empty() { state = state.with_agenda(t); } }
            "h2" => {
                let is_agenda = e.value().classes().any(|c|c=="titre1") || !has_agenda_headings;
                let t = text_of(&e);
                if is_agenda && !t.is_empty() { state = state.with_agenda(t); started=true; }
            }
            "p" if started => {
                if is_within(&e,|a|a.value().name()=="ul") { continue }
                let bold = leading_bold(&e);
                if bold.is_none() && e.value().attr("class").is_some() { continue }
                if let Some(bold) = bold {
                    let (speaker,role) = split_speaker(&bold);
                    if speaker.is_empty() { continue }
                    state = state.with_speaker(speaker).with_role(role);
                    sitting.start_speech();
                }
                if !state.has_speaker() { continue }
                for segment in paragraph_segments(&e) {
                    sitting.push(&state,&segment);
                }
            }
            _ => {}
        }
    }
    if sitting.is_empty() { return Err(StructureError::MissingAnchor("speech paragraphs").into()) }
    Ok(sitting.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speaker_state::assert_numbering;

    const REPORT : &str = r#"<html><head><title>Assemblée nationale ~ Deuxième séance du mardi 3 février 2015</title></head><body>
<div id="somjo"><h1>Sommaire du 12 janvier 2015</h1><p><b>M. le président.</b> ignored</p></div>
<div id="englobe">
<h1>Présidence de M. Claude Bartolone</h1>
<h1>Deuxième séance du mardi 3 février 2015</h1>
<p><b>M. le président.</b> La séance est ouverte.</p>
<h2 class="titre1">Questions au Gouvernement</h2>
<p><b>M. Jean Dupont, ministre de l’intérieur.</b> Monsieur le député,<br>nous agissons.</p>
<p>Nous continuerons.</p>
<ul><li><p>Liste</p></li></ul>
<p class="sompdf">Not speech</p>
<p><b>Mme Marie Martin.</b> Très bien !</p>
</div></body></html>"#;

    #[test]
    fn test_parse_report() {
        let records = parse_report(&Html::parse_document(REPORT)).unwrap();
        assert_numbering(&records);
        assert_eq!(4,records.len());
        assert_eq!("2015-02-03",records[0].date);
        assert_eq!(("Questions au Gouvernement","Jean Dupont","ministre de l’intérieur","Monsieur le député,"),(records[0].agenda.as_str(),records[0].speaker.as_str(),records[0].speakerrole.as_str(),records[0].text.as_str()));
        assert_eq!(("nous agissons.",1,2),(records[1].text.as_str(),records[1].speechnumber,records[1].paragraphnumber));
        assert_eq!(("Nous continuerons.",1,3),(records[2].text.as_str(),records[2].speechnumber,records[2].paragraphnumber));
        assert_eq!(("Marie Martin","","Très bien !",2),(records[3].speaker.as_str(),records[3].speakerrole.as_str(),records[3].text.as_str(),records[3].speechnumber));
    }

    #[test]
    fn test_split_speaker() {
        assert_eq!(("le président".to_string(),"".to_string()),split_speaker("M. le président."));
        assert_eq!(("Jean Dupont".to_string(),"rapporteur".to_string()),split_speaker("M. Jean Dupont, rapporteur."));
    }
}
