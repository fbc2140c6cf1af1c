//! Folketinget minutes. The HTML is a flat sequence of `meta` markers and paragraphs: an agenda
//! item starts with a `Start MetaFTAgendaItem` marker, a speech with `Start MetaSpeakerMP`
//! followed by metas describing the speaker, and the text paragraphs follow `End MetaSpeechSegment`.

use scraper::{ElementRef, Html, Selector};
use once_cell::sync::Lazy;
use crate::country::CountryConfig;
use crate::error::StructureError;
use crate::parse_util::{reformat_date, read_html, SourceDocument};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};

pub const DENMARK : CountryConfig = CountryConfig {
    name: "denmark",
    parliament: "DK-Folketinget",
    iso3country: "DNK",
    language: "da",
    source_pattern: "*.html",
    fieldnames: &["parliament","iso2country","iso3country","date","agenda","speechnumber","speaker_first_name","speaker_last_name","speaker","speakerrole","party_abbreviation","party","paragraphnumber","text"],
    extractor: parse_danish_parliament,
};

const TEXT_CLASSES : &[&str] = &["Tekst","TekstIndryk","TekstLuft"];
/// The marker used for the end of the sitting, which has no text.
const END_OF_SITTING : &str = "MødeSlut";
/// Agenda point 0 is the announcements before the debate.
const ANNOUNCEMENTS : &str = "Punkt 0";

static MARKERS : Lazy<Selector> = Lazy::new(||Selector::parse("meta, p, hr").unwrap());
static DATE_OF_SITTING : Lazy<Selector> = Lazy::new(||Selector::parse(r#"meta[name="DateOfSitting"]"#).unwrap());

fn party_name(abbreviation:&str) -> &'static str {
    match abbreviation {
        "V" => "Venstre, Danmarks Liberale Parti",
        "S" => "Socialdemokratiet i Danmark",
        "DF" => "Dansk Folkeparti",
        "RV" => "Det Radikale Venstre",
        "SF" => "Socialistisk Folkeparti",
        "EL" => "Enhedslisten - De Rød-Grønne",
        "KF" => "Det Konservative Folkeparti",
        "A" | "ALT" => "Alternativet",
        "NB" => "Nye Borgerlige",
        "LA" => "Liberal Alliance",
        "KD" => "Kristendemokraterne",
        _ => "",
    }
}

pub fn parse_danish_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    parse_minutes(&read_html(&doc.path)?)
}

#[derive(Default)]
struct Orator {
    first_name : String,
    last_name : String,
    party_abbreviation : String,
    role : String,
}

fn parse_minutes(html:&Html) -> anyhow::Result<Vec<SpeechParagraph>> {
    let date = html.select(&DATE_OF_SITTING).next().and_then(|m|m.value().attr("content")).ok_or(StructureError::MissingAnchor("DateOfSitting"))?;
    let date = reformat_date(date.get(..10).unwrap_or(date),"%Y-%m-%d")?;
    let mut sitting = SittingRecords::new(&DENMARK,date);
    let mut agenda : Option<String> = None;
    let mut awaiting_title = false;
    let mut orator = Orator::default();
    let mut in_text = false;
    for e in html.select(&MARKERS) {
        let element = e.value();
        match element.name() {
            "hr" => { agenda=None; in_text=false; }
            "p" => {
                let is_text = element.attr("class").map(|c|c.split_whitespace().any(|c|TEXT_CLASSES.contains(&c))).unwrap_or(false);
                if !is_text { in_text=false; continue }
                if !in_text { continue }
                let state = SpeakerState::default()
                    .with_agenda(agenda.as_deref().unwrap_or(""))
                    .with_speaker(format!("{} {}",orator.first_name,orator.last_name))
                    .with_role(&orator.role)
                    .with_party(party_name(&orator.party_abbreviation));
                if let Some(row) = sitting.push(&state,&text_of(&e)) {
                    row.set_extra("iso2country","DK")
                        .set_extra("speaker_first_name",orator.first_name.as_str())
                        .set_extra("speaker_last_name",orator.last_name.as_str())
                        .set_extra("party_abbreviation",orator.party_abbreviation.as_str());
                }
            }
            _ => {
                in_text = false;
                let content = element.attr("content").unwrap_or("").to_string();
                match element.attr("name").unwrap_or("") {
                    "Start MetaFTAgendaItem" => { awaiting_title=true; agenda=Some(String::new()); }
                    "ShortTitle" if awaiting_title => { agenda=Some(content); awaiting_title=false; }
                    "Start MetaSpeakerMP" => { orator=Orator::default(); sitting.start_speech(); }
                    "OratorFirstName" => orator.first_name=content,
                    "OratorLastName" => orator.last_name=content,
                    "GroupNameShort" => orator.party_abbreviation=content,
                    "OratorRole" => orator.role=content,
                    "End MetaSpeechSegment" => {
                        in_text = matches!(&agenda,Some(a) if a!=ANNOUNCEMENTS) && orator.first_name!=END_OF_SITTING;
                    }
                    _ => {}
                }
            }
        }
    }
    Ok(sitting.finish())
}

fn text_of(e:&ElementRef) -> String { e.text().collect::<String>() }
