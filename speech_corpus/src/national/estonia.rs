//! Riigikogu verbatim records. Each speech is a `div.speech-area` with the speaker in `h4` and
//! the text in a `div`, paragraphs separated by `<br>`. The agenda item is the `h3` of the
//! enclosing `article`.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use crate::country::CountryConfig;
use crate::error::StructureError;
use crate::normalize::normalize_string;
use crate::parse_util::{find_numeric_date, read_html, text_split_at_line_breaks, SourceDocument};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};

pub const ESTONIA : CountryConfig = CountryConfig {
    name: "estonia",
    parliament: "EE-Riigikogu",
    iso3country: "EST",
    language: "et",
    source_pattern: "*.html",
    fieldnames: &["date","title","agenda","speechnumber","paragraphnumber","speaker","speakerrole","party","text","parliament","iso3country"],
    extractor: parse_estonian_parliament,
};

/// Roles that precede the speaker's name: (aseesimees / esimees), ministers, chancellors and government advisers.
static ROLE : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?P<role>.*?simees|.*?minister|.*?kantsler|Valitsuse nõunik)\s+(?P<name>.*)$").unwrap());
static TRAILING_REMARK : Lazy<Regex> = Lazy::new(||Regex::new(r"\([^()]*\)$").unwrap());

static TITLE : Lazy<Selector> = Lazy::new(||Selector::parse("header.steno-header h2").unwrap());
static SPEECH : Lazy<Selector> = Lazy::new(||Selector::parse("div.speech-area").unwrap());

pub fn parse_estonian_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    let date = find_numeric_date(&doc.stem()).or_else(||doc.meta.as_ref().and_then(|m|m.get("date")).and_then(find_numeric_date))
        .ok_or(StructureError::MissingAnchor("a date in the file name"))?;
    parse_record(&read_html(&doc.path)?,&date)
}

/// `Esimees Eiki Nestor` → (`Eiki Nestor`, `Esimees`)
fn split_role(speaker:&str) -> (String,String) {
    match ROLE.captures(speaker) {
        Some(cap) => (normalize_string(&cap["name"]),normalize_string(&cap["role"])),
        None => (speaker.to_string(),String::new()),
    }
}

fn children_named<'a>(e:ElementRef<'a>,name:&'a str) -> impl Iterator<Item=ElementRef<'a>> + 'a {
    e.children().filter_map(ElementRef::wrap).filter(move |c|c.value().name()==name)
}

fn parse_record(html:&Html,date:&str) -> anyhow::Result<Vec<SpeechParagraph>> {
    let title = html.select(&TITLE).next().map(|h|text_split_at_line_breaks(&h).into_iter().filter(|s|!s.is_empty()).collect::<Vec<_>>().join(", ")).unwrap_or_default();
    let mut sitting = SittingRecords::new(&ESTONIA,date);
    for speech in html.select(&SPEECH) {
        let agenda = speech.parent().and_then(ElementRef::wrap).filter(|p|p.value().name()=="article")
            .and_then(|article|children_named(article,"h3").next().map(|h|normalize_string(&h.text().collect::<Vec<_>>().join(" "))))
            .unwrap_or_default();
        let paragraphs : Vec<String> = children_named(speech,"div").flat_map(|d|text_split_at_line_breaks(&d)).collect();
        if paragraphs.iter().all(|p|p.is_empty()) { continue }
        let speaker = children_named(speech,"h4").next().map(|h|normalize_string(&h.text().collect::<Vec<_>>().join(" "))).filter(|s|!s.is_empty())
            .ok_or(StructureError::MissingAnchor("the speaker of a speech"))?;
        let (speaker,role) = split_role(&speaker);
        let state = SpeakerState::default().with_agenda(&agenda).with_speaker(speaker).with_role(role);
        sitting.start_speech();
        for paragraph in paragraphs {
            let text = TRAILING_REMARK.replace(&paragraph,"");
            if let Some(row) = sitting.push(&state,&text) { row.set_extra("title",title.as_str()); }
        }
    }
    Ok(sitting.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speaker_state::assert_numbering;

    const RECORD : &str = r#"<html><body>
<header class="steno-header"><h2>XIII Riigikogu stenogramm<br/>V istungjärk</h2></header>
<article><h3>1. Eelnõu 123 esimene lugemine</h3>
<div class="pb-4 speech-area"><h4>Esimees Eiki Nestor</h4><div>Austatud Riigikogu!<br/>Alustame. (Juhataja helistab kella.)</div></div>
<div class="pb-4 speech-area"><h4>Rahandusminister Sven Sester</h4><div>Aitäh!</div></div>
<div class="pb-4 speech-area"><h4>Jüri Ratas</h4><div>(Naer saalis.)</div></div>
<div class="pb-4 speech-area"><h4>Jüri Ratas</h4><div>Tänan.</div></div>
</article></body></html>"#;

    #[test]
    fn test_parse_record() {
        let records = parse_record(&Html::parse_document(RECORD),"2015-03-04").unwrap();
        assert_numbering(&records);
        assert_eq!(4,records.len());
        assert_eq!(("Eiki Nestor","Esimees","1. Eelnõu 123 esimene lugemine"),(records[0].speaker.as_str(),records[0].speakerrole.as_str(),records[0].agenda.as_str()));
        assert_eq!("XIII Riigikogu stenogramm, V istungjärk",records[0].field("title"));
        assert_eq!(("Alustame.",1,2),(records[1].text.as_str(),records[1].speechnumber,records[1].paragraphnumber));
        assert_eq!(("Sven Sester","Rahandusminister"),(records[2].speaker.as_str(),records[2].speakerrole.as_str()));
        assert_eq!(("Jüri Ratas","",3),(records[3].speaker.as_str(),records[3].speakerrole.as_str(),records[3].speechnumber));
    }

    #[test]
    fn test_speech_without_speaker() {
        let html = Html::parse_document(r#"<div class="speech-area"><div>Text</div></div>"#);
        assert!(parse_record(&html,"2015-03-04").is_err());
    }
}
