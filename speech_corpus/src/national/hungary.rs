//! Országgyűlés sitting summaries. The spoken text follows the `h3` "A felszólalás szövege";
//! each paragraph that starts with an upper case name (`DR. KOVÁCS JÁNOS (Fidesz):`) opens a
//! new speech, all other paragraphs continue the current one.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use crate::country::{CountryConfig, STANDARD_FIELDNAMES_WITH_ROLE};
use crate::error::StructureError;
use crate::normalize::{is_upper, normalize_string};
use crate::parse_util::{find_numeric_date, read_html, SourceDocument};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};

pub const HUNGARY : CountryConfig = CountryConfig {
    name: "hungary",
    parliament: "HU-Országgyűlés",
    iso3country: "HUN",
    language: "hu",
    source_pattern: "*.html",
    fieldnames: STANDARD_FIELDNAMES_WITH_ROLE,
    extractor: parse_hungarian_parliament,
};

/// Parties active 2009-2019.
const PARTIES : &[&str] = &["DKP","DEMP","MDF","SZDSZ","SZKT","MDNP","HP","4K!","Együtt","ÖP","MoMa","Fidesz","KDNP","Jobbik","MSZP","DK","LMP","Párbeszéd","Momentum","Mi Hazánk","PV","ISZOMM","Liberálisok","ÚK"];

const OPENING_PHRASE : &str = "A felszólalás szövege";
const CLOSING_PHRASES : &[&str] = &["Az ülésnapot bezárom","Az ülést bezárom"];
/// The presiding officer is the only speaker named with a single word.
const CHAIR : &str = "ELNÖK";

static BRACKETED : Lazy<Regex> = Lazy::new(||Regex::new(r"\((.*?)\)").unwrap());
static ONLY_BRACKETED : Lazy<Regex> = Lazy::new(||Regex::new(r"^\(.*?\)$").unwrap());

static H3 : Lazy<Selector> = Lazy::new(||Selector::parse("h3").unwrap());

pub fn parse_hungarian_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    let date = find_numeric_date(&doc.stem()).ok_or(StructureError::MissingAnchor("the date in the file name"))?;
    parse_summary(&read_html(&doc.path)?,&date)
}

/// The upper case name at the start of the speaker data, without `DR.`. Empty if there is none.
fn name_of(speaker_data:&str) -> String {
    let tokens : Vec<&str> = speaker_data.split_whitespace().collect();
    let is_name_token = |t:&&str|is_upper(t) && !t.starts_with('(') && t.chars().count()>1;
    if !tokens.first().map(is_name_token).unwrap_or(false) { return String::new() }
    let name = tokens.iter().copied().take_while(|t|is_name_token(t)).collect::<Vec<_>>().join(" ");
    let name = name.replace("DR.","").trim().to_string();
    if (name.split_whitespace().count()<=1 && name!=CHAIR) || name=="„M25 MOST”" { String::new() } else { normalize_string(&name) }
}

#[derive(Debug,PartialEq)]
struct Announcement {
    name : String,
    party : String,
    role : String,
    text : String,
}

/// Split a paragraph into speaker data and spoken text if it starts with a speaker's name.
/// The speaker data usually ends with a colon, occasionally with a full stop.
fn announcement(paragraph:&str) -> Option<Announcement> {
    let (speaker_data,text) = match paragraph.split_once(':') {
        Some((data,text)) => (data,text),
        None => paragraph.split_once('.').unwrap_or((paragraph,"")),
    };
    let speaker_data = speaker_data.replace(',',"");
    let name = name_of(&speaker_data);
    if name.is_empty() { return None }
    let mut party = BRACKETED.captures(&speaker_data).map(|cap|cap[1].trim().to_string()).unwrap_or_default();
    let mut role = String::new();
    if party.is_empty() {
        if let Some(last) = name.split_whitespace().last() {
            role = speaker_data.split_once(last).map(|(_,after)|after.trim().to_string()).unwrap_or_default();
        }
        if let Some(p) = role.split_whitespace().find(|t|PARTIES.contains(t)) {
            party = p.to_string();
            role = String::new();
        }
    }
    Some(Announcement{ name, party, role, text: text.trim().to_string() })
}

fn parse_summary(html:&Html,date:&str) -> anyhow::Result<Vec<SpeechParagraph>> {
    let start = html.select(&H3).find(|h|h.text().collect::<String>().contains(OPENING_PHRASE)).ok_or(StructureError::MissingAnchor(OPENING_PHRASE))?;
    let mut sitting = SittingRecords::new(&HUNGARY,date);
    let mut state = SpeakerState::default();
    for sibling in start.next_siblings().filter_map(ElementRef::wrap) {
        let mut text = normalize_string(&sibling.text().collect::<Vec<_>>().join(" "));
        if CLOSING_PHRASES.iter().any(|phrase|text.contains(phrase)) { break }
        if text.is_empty() { continue }
        if let Some(a) = announcement(&text) {
            state = state.with_speaker(a.name).with_party(a.party).with_role(a.role);
            sitting.start_speech();
            text = a.text;
        }
        if ONLY_BRACKETED.is_match(&text) { continue }
        sitting.push(&state,&text);
    }
    Ok(sitting.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speaker_state::assert_numbering;

    const SUMMARY : &str = r#"<html><body><h1>139. ülésnap</h1>
<h3>A felszólalás szövege</h3>
<p>ELNÖK: Tisztelt Országgyűlés! Megnyitom az ülést.</p>
<p>DR. KOVÁCS JÁNOS (Fidesz): Köszönöm a szót.</p>
<p>Második bekezdés.</p>
<p>(Taps a kormánypártok soraiban.)</p>
<p>SZABÓ PÉTER, az MSZP képviselőcsoportja részéről. Nem értünk egyet.</p>
<p>NAGY ANNA államtitkár: Válaszolok.</p>
<p>ELNÖK: Az ülésnapot bezárom.</p>
<p>NAGY ANNA: Ez már nem része.</p>
</body></html>"#;

    #[test]
    fn test_parse_summary() {
        let records = parse_summary(&Html::parse_document(SUMMARY),"2011-11-22").unwrap();
        assert_numbering(&records);
        assert_eq!(5,records.len());
        assert_eq!(("ELNÖK","Tisztelt Országgyűlés! Megnyitom az ülést."),(records[0].speaker.as_str(),records[0].text.as_str()));
        assert_eq!(("KOVÁCS JÁNOS","Fidesz",2,1),(records[1].speaker.as_str(),records[1].party.as_str(),records[1].speechnumber,records[1].paragraphnumber));
        assert_eq!(("Második bekezdés.",2),(records[2].text.as_str(),records[2].paragraphnumber));
        assert_eq!(("SZABÓ PÉTER","MSZP","Nem értünk egyet."),(records[3].speaker.as_str(),records[3].party.as_str(),records[3].text.as_str()));
        assert_eq!(("NAGY ANNA","államtitkár",""),(records[4].speaker.as_str(),records[4].speakerrole.as_str(),records[4].party.as_str()));
        assert_eq!("HU-Országgyűlés",records[4].parliament);
    }

    #[test]
    fn test_name_of() {
        assert_eq!("KOVÁCS JÁNOS",name_of("DR. KOVÁCS JÁNOS (Fidesz)"));
        assert_eq!("",name_of("Tisztelt Képviselőtársaim"));
        assert_eq!("",name_of("A"));
        assert_eq!("",name_of("„M25 MOST”"));
    }

    #[test]
    fn test_missing_opening_phrase() {
        assert!(parse_summary(&Html::parse_document("<h3>Napirend</h3><p>ELNÖK: x</p>"),"2011-11-22").is_err());
    }
}
