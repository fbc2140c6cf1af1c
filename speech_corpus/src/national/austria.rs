//! Stenographic protocols of the Austrian Nationalrat (HTML exported from Word).
//!
//! The protocol starts with a table of contents; the sitting itself starts at the first
//! `p.SB`. Agenda items are `p.ZM` paragraphs with a `TOP_` anchor, possibly followed by
//! further `p.ZM` lines continuing the title. A speaker is announced by a bold run containing
//! a link, followed by `(Party):` or, for someone resuming, `(fortsetzend):`. Paragraphs are
//! split at page breaks, so a paragraph that does not end a sentence continues in the next one.

use std::collections::HashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use crate::country::{CountryConfig, STANDARD_FIELDNAMES};
use crate::error::StructureError;
use crate::normalize::{normalize_whitespace, remove_soft_hyphens};
use crate::parse_util::{find_date_with_month_names, read_html, SourceDocument, GERMAN_MONTHS};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};

pub const AUSTRIA : CountryConfig = CountryConfig {
    name: "austria",
    parliament: "AT-Nationalrat",
    iso3country: "AUT",
    language: "de",
    source_pattern: "*.html",
    fieldnames: STANDARD_FIELDNAMES,
    extractor: parse_austrian_parliament,
};

/// Agenda points that are not marked up as such but are used as agenda titles nevertheless.
const RECURRING_AGENDA_POINTS : &[&str] = &["Beginn der Sitzung","Aktuelle Stunde","Einlauf und Zuweisungen","Behandlung der Tagesordnung","Fragestunde","Aktuelle Europastunde"];
/// The agenda before the first agenda heading.
const INTRODUCTION : &str = "Einleitung";
const CONTENT_CLASSES : &[&str] = &["MsoNormal","StandardRB","MsoBodyText","StandardRE"];

static TIMESTAMP : Lazy<Regex> = Lazy::new(||Regex::new(r"\d{2}\.\d{2}\.\d{2}\s?").unwrap());
static PARTY : Lazy<Regex> = Lazy::new(||Regex::new(r"^\s*\((\w+)\)\s?:").unwrap());
static CONTINUING : Lazy<Regex> = Lazy::new(||Regex::new(r"^\s*\(fortsetzend\)\s?:").unwrap());
static SENTENCE_END : Lazy<Regex> = Lazy::new(||Regex::new(r"[.?!“;]$").unwrap());

static P : Lazy<Selector> = Lazy::new(||Selector::parse("p").unwrap());
static BOLD : Lazy<Selector> = Lazy::new(||Selector::parse("b").unwrap());
static LINK : Lazy<Selector> = Lazy::new(||Selector::parse("a").unwrap());

pub fn parse_austrian_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    parse_protocol(&read_html(&doc.path)?)
}

fn clean(text:&str) -> String { normalize_whitespace(&remove_soft_hyphens(text)) }

fn has_class(e:&ElementRef,class:&str) -> bool {
    e.value().attr("class").map(|c|c.split_whitespace().any(|x|x==class)).unwrap_or(false)
}

fn in_word_section(e:&ElementRef) -> bool {
    e.ancestors().filter_map(ElementRef::wrap).any(|a|a.value().name()=="div" && a.value().attr("class").map(|c|c.contains("WordSection")).unwrap_or(false))
}

fn has_anchor(e:&ElementRef,name_part:&str) -> bool {
    e.select(&LINK).any(|a|a.value().attr("name").map(|n|n.contains(name_part)).unwrap_or(false))
}

/// The text of the paragraph, without italic stage directions (italic inside bold is kept, it is part of a name).
fn speech_text(p:&ElementRef) -> String {
    let mut parts = vec![];
    for node in p.descendants() {
        if let Some(text) = node.value().as_text() {
            let in_stage_direction = node.ancestors().take_while(|a|a.id()!=p.id()).any(|a|{
                let italic = a.value().as_element().map(|e|e.name()=="i").unwrap_or(false);
                let in_bold = a.parent().and_then(|parent|parent.value().as_element().map(|e|e.name()=="b")).unwrap_or(false);
                italic && !in_bold
            });
            if !in_stage_direction { parts.push(&**text); }
        }
    }
    clean(&parts.join(" "))
}

/// The speaker announced at the start of a paragraph, if any.
fn announced_speaker(p:&ElementRef) -> Option<String> {
    let names : Vec<String> = p.select(&BOLD).filter(|b|b.select(&LINK).next().is_some()).map(|b|b.text().collect::<Vec<_>>().join(" ")).collect();
    if names.is_empty() { return None }
    let speaker = clean(&names.join(" ")).trim_matches(|c:char|c==' '||c==':').to_string();
    if speaker.is_empty() { None } else { Some(speaker) }
}

/// The agenda title given by a heading line, or None if the line is only a timestamp or separator.
fn agenda_title(text:&str) -> Option<String> {
    if let Some(point) = RECURRING_AGENDA_POINTS.iter().find(|p|text.starts_with(*p)) { return Some(point.to_string()) }
    let title = clean(&TIMESTAMP.replace_all(text,""));
    if title.is_empty() || title.contains("*****") { None } else { Some(title) }
}

fn parse_protocol(html:&Html) -> anyhow::Result<Vec<SpeechParagraph>> {
    let date_line = html.select(&P).skip_while(|p|!(has_class(p,"ZM") && p.text().collect::<String>().contains("Dauer der Sitzung"))).nth(1)
        .ok_or(StructureError::MissingAnchor("Dauer der Sitzung"))?;
    let date = find_date_with_month_names(&clean(&date_line.text().collect::<String>()),&GERMAN_MONTHS).ok_or(StructureError::MissingAnchor("the date of the sitting"))?;
    let mut sitting = SittingRecords::new(&AUSTRIA,date);
    let mut state = SpeakerState::default().with_agenda(INTRODUCTION);
    let mut parties : HashMap<String,String> = HashMap::new();
    let mut started = false;
    // The previous line was an agenda heading that may continue on this line.
    let mut in_agenda_heading = false;
    let mut rows_in_speech = 0;
    for p in html.select(&P) {
        let text = clean(&p.text().collect::<String>());
        if has_class(&p,"SB") {
            started = true;
            if let Some(title) = agenda_title(&text) { state = state.with_agenda(title); }
            in_agenda_heading = false;
            continue;
        }
        if !started { continue }
        if has_class(&p,"ZM") {
            if has_anchor(&p,"TOP_") {
                if let Some(title) = agenda_title(&text) { state = state.with_agenda(title); }
                in_agenda_heading = true;
            } else if let Some(title) = agenda_title(&text) {
                if RECURRING_AGENDA_POINTS.contains(&title.as_str()) || !in_agenda_heading {
                    state = state.with_agenda(title);
                } else {
                    let combined = format!("{} {}",state.agenda,title);
                    state = state.with_agenda(combined);
                }
            } else {
                in_agenda_heading = false;
            }
            continue;
        }
        if !CONTENT_CLASSES.iter().any(|c|has_class(&p,c)) || !in_word_section(&p) || has_anchor(&p,"TEXTOBJ") { continue }
        in_agenda_heading = false;
        let mut speech = speech_text(&p);
        if let Some(speaker) = announced_speaker(&p) {
            speech = speech.replacen(&speaker,"",1);
            let party = if CONTINUING.is_match(&speech) {
                speech = CONTINUING.replace(&speech,"").to_string();
                parties.get(&speaker).cloned().unwrap_or_default()
            } else if let Some(party) = PARTY.captures(&speech).map(|cap|cap[1].to_string()) {
                speech = PARTY.replace(&speech,"").to_string();
                party
            } else { String::new() };
            parties.insert(speaker.clone(),party.clone());
            state = state.with_speaker(speaker).with_party(party);
            sitting.start_speech();
            rows_in_speech = 0;
        }
        let speech = speech.trim_start_matches(|c:char|c==' '||c==':').trim_end().to_string();
        if speech.is_empty() { continue }
        if !state.has_speaker() { continue }
        let continues_previous = rows_in_speech>0 && sitting.last().map(|last|!SENTENCE_END.is_match(&last.text)).unwrap_or(false);
        if continues_previous {
            sitting.append_to_last(&state,&speech);
        } else if sitting.push(&state,&speech).is_some() {
            rows_in_speech+=1;
        }
    }
    Ok(sitting.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speaker_state::assert_numbering;

    const PROTOCOL : &str = r#"<html><body>
<div class="WordSection1">
<p class="ZM">Dauer der Sitzung</p>
<p class="ZM">Dienstag, 4. März 2014: 9.05 Uhr – 19.48 Uhr</p>
<p class="MsoNormal">Inhaltsverzeichnis</p>
<p class="SB">Beginn der Sitzung: 9.05 Uhr</p>
<p class="MsoNormal"><b><a href="/WWER/PAD_1">Präsidentin Doris Bures</a>:</b> Ich eröffne die Sitzung.</p>
</div>
<div class="WordSection2">
<p class="ZM"><a name="TOP_1"></a>1. Punkt</p>
<p class="ZM">Bericht des Budgetausschusses</p>
<p class="MsoNormal"><b><a href="/WWER/PAD_2">Abgeordneter Mag. Andreas Schieder</a></b> (SPÖ): Frau Präsidentin! Die Bundes­regierung hat</p>
<p class="MsoNormal">einen Plan. <i>(Beifall bei der SPÖ.)</i></p>
<p class="MsoNormal">Zweiter Absatz.</p>
<p class="MsoNormal"><a name="TEXTOBJ_1"></a>10.15.32</p>
<p class="ZM">*****</p>
<p class="MsoNormal"><b><a href="/WWER/PAD_1">Präsidentin Doris Bures</a></b>: Danke.</p>
<p class="MsoNormal"><b><a href="/WWER/PAD_2">Abgeordneter Mag. Andreas Schieder</a></b> (fortsetzend): Noch etwas.</p>
</div>
</body></html>"#;

    #[test]
    fn test_parse_protocol() {
        let records = parse_protocol(&Html::parse_document(PROTOCOL)).unwrap();
        assert_numbering(&records);
        assert_eq!(5,records.len());
        assert_eq!("2014-03-04",records[0].date);
        assert_eq!(("Beginn der Sitzung","Präsidentin Doris Bures","Ich eröffne die Sitzung."),(records[0].agenda.as_str(),records[0].speaker.as_str(),records[0].text.as_str()));
        assert_eq!("1. Punkt Bericht des Budgetausschusses",records[1].agenda);
        assert_eq!(("SPÖ","Frau Präsidentin! Die Bundesregierung hat einen Plan."),(records[1].party.as_str(),records[1].text.as_str()));
        assert_eq!((2,2,"Zweiter Absatz."),(records[2].speechnumber,records[2].paragraphnumber,records[2].text.as_str()));
        assert_eq!("1. Punkt Bericht des Budgetausschusses",records[3].agenda);
        assert_eq!(("Abgeordneter Mag. Andreas Schieder","SPÖ","Noch etwas."),(records[4].speaker.as_str(),records[4].party.as_str(),records[4].text.as_str()));
    }

    #[test]
    fn test_missing_date() {
        assert!(parse_protocol(&Html::parse_document("<html><body><p class=\"SB\">Beginn</p></body></html>")).is_err());
    }
}
