//! Compte rendu intégral of the Chambre, published as a two column PDF with the French and the
//! Dutch text side by side.
//!
//! The French column is the one in which the sitting is opened (`La séance est ouverte`); lines
//! of the other column are dropped by their position. The remaining lines are read from the first
//! agenda item (`01 Ordre du jour`) on. A speech starts with a numbered intervention
//! (`01.02 Koen Geens, ministre: ...`) or with `Le président:`; text in an agenda item before its
//! first speech is kept without a speaker.

use once_cell::sync::Lazy;
use regex::Regex;
use crate::country::{CountryConfig, STANDARD_FIELDNAMES};
use crate::error::StructureError;
use crate::normalize::normalize_string;
use crate::parse_pdf_util::{parse_pdf_to_lines, text_rows, PdfLine};
use crate::parse_util::{find_numeric_date, reformat_date, SourceDocument};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};

pub const BELGIUM : CountryConfig = CountryConfig {
    name: "belgium",
    parliament: "BE-De Kamer",
    iso3country: "BEL",
    language: "fr",
    source_pattern: "*.pdf",
    fieldnames: STANDARD_FIELDNAMES,
    extractor: parse_belgian_parliament,
};

static OPENING : Lazy<Regex> = Lazy::new(||Regex::new(r"La\s*séance\s*est\s*ouverte|La\s*réunion\s*publique\s*est\s*ouverte|La\s*séance\s*d'hommage\s*est\s*ouverte|La\s*séance\s*est\s*repris").unwrap());
static FOOTER : Lazy<Regex> = Lazy::new(||Regex::new(r"CHAMBRE.\d[A-Z]\s*SESSION\s*DE\s*LA\s*\d{2}[A-Z]").unwrap());
static HEADER : Lazy<Regex> = Lazy::new(||Regex::new(r"CRABV\s*\d{2}\s*PLEN\s*\d{3}").unwrap());
static PAGE_NUMBER : Lazy<Regex> = Lazy::new(||Regex::new(r"^\d+$").unwrap());
static VOTE_TABLE : Lazy<Regex> = Lazy::new(||Regex::new(concat!(
    r"\(Stemming/vote\s*?\d{1,4}|Ja\s*?\d{1,3}\s*?Oui|Nee\s*?\d{1,3}\s*?Non|Onthoudingen\s*?\d{1,3}\s*?Abstentions|",
    r"Totaal\s*?\d{1,3}\s*?Total|Stemmen\s*?\d{1,3}\s*?Votants|Blanco\s*?of\s*ongeldig\s*\d{1,3}\s*?Blancs\s*?ou\s*nuls|",
    r"Geldig\s*\d{1,3}\s*?Valables|Volstrekte\s*\d{1,3}\s*?Majorité|meerderheid\s*meerderheid")).unwrap());
/// Two digits and a capitalised word, optionally after a short code: `01 Ordre du jour`.
static AGENDA : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?:[a-z\-]*|[A-Z\-]*)\s*(?P<title>\d{2}\s*[A-ZÉÀÈÙÂÊÎÔÛ](?:[^A-ZÉÀÈÙÂÊÎÔÛ].*)?)$").unwrap());
static SPEECH_START : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?:\d{2}\.\d{2,3}\s|Le\s*président\s*[(:])").unwrap());
static NUMBERED_SPEECH : Lazy<Regex> = Lazy::new(||Regex::new(r"^\d{2}\.\d{2,3}\s+(?P<meta>.*?)\s*:(?P<text>.*)$").unwrap());
static PRESIDENT_SPEECH : Lazy<Regex> = Lazy::new(||Regex::new(r"^(?P<meta>Le\s*président\s*(?:\([^)]*\))?)\s*:(?P<text>.*)$").unwrap());
static PARENTHESISED : Lazy<Regex> = Lazy::new(||Regex::new(r"\(([^()]*)\)").unwrap());
static TRAILING_REMARK : Lazy<Regex> = Lazy::new(||Regex::new(r"\([^()]*\)\s*$").unwrap());

pub fn parse_belgian_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    parse_lines(&parse_pdf_to_lines(&doc.path)?,&sitting_date(doc)?)
}

/// The metadata has a `full_title` starting with the date, `20150304_...`, stored under the file's stem.
fn sitting_date(doc:&SourceDocument) -> anyhow::Result<String> {
    let stem = doc.stem();
    let full_title = doc.meta.as_ref().and_then(|m|m.0.get(&stem).and_then(|v|v.get("full_title")).and_then(|v|v.as_str()).or_else(||m.get("full_title")));
    match full_title {
        Some(title) => reformat_date(title.split('_').next().unwrap_or(title),"%Y%m%d"),
        None => find_numeric_date(&stem).ok_or_else(||StructureError::MissingAnchor("the date of the sitting").into()),
    }
}

/// The lines of the French column, from the opening of the sitting on, without running headers and footers.
fn french_lines(lines:&[PdfLine]) -> anyhow::Result<Vec<PdfLine>> {
    let opening = lines.iter().position(|l|OPENING.is_match(&l.text)).ok_or(StructureError::MissingAnchor("the opening of the sitting"))?;
    let lines = &lines[opening..];
    let min_x = lines.iter().map(|l|l.x).fold(f32::INFINITY,f32::min);
    let max_x = lines.iter().map(|l|l.x).fold(f32::NEG_INFINITY,f32::max);
    let middle = (min_x+max_x)/2.0;
    let french_left = lines[0].x<middle;
    Ok(lines.iter()
        .filter(|l|(l.x<middle)==french_left)
        .filter(|l|{
            let text = l.text.trim();
            !(text.is_empty() || FOOTER.is_match(text) || HEADER.is_match(text) || PAGE_NUMBER.is_match(text) || VOTE_TABLE.is_match(text))
        })
        .cloned().collect())
}

/// Group rows into paragraphs, which end at an empty row or before the start of a speech.
/// Punctuation at the start of a continuation row is what is left of the other column.
fn paragraphs(rows:&[String]) -> Vec<String> {
    let mut res : Vec<Vec<&str>> = vec![];
    let mut open = false;
    for row in rows {
        if row.is_empty() { open = false; continue }
        if !open || SPEECH_START.is_match(row) { res.push(vec![]); open = true; }
        if let Some(paragraph) = res.last_mut() {
            paragraph.push(if paragraph.is_empty() { row.as_str() } else { row.trim_start_matches(['.','!','?']) });
        }
    }
    res.into_iter().map(|p|normalize_string(&p.join(" "))).collect()
}

/// The speaker and party of `01.01 Peter Dedecker (N-VA)` or `Le président (André Flahaut)`. A
/// party is only taken when there is no comma, as in `Koen Geens, ministre de la Justice`.
fn speaker_and_party(meta:&str,numbered:bool) -> (String,String) {
    let bracket = if meta.contains(',') { None } else { PARENTHESISED.captures(meta) };
    let party = bracket.as_ref().filter(|_|numbered).map(|c|normalize_string(&c[1])).unwrap_or_default();
    let speaker = if numbered {
        meta.split('(').next().unwrap_or(meta).to_string()
    } else {
        bracket.map(|c|meta.replace(&c[0],"")).unwrap_or_else(||meta.to_string())
    };
    (normalize_string(&speaker),party)
}

fn parse_lines(lines:&[PdfLine],date:&str) -> anyhow::Result<Vec<SpeechParagraph>> {
    let paragraphs = paragraphs(&text_rows(&french_lines(lines)?));
    let first_agenda = paragraphs.iter().position(|p|AGENDA.is_match(p)).ok_or(StructureError::MissingAnchor("the first agenda item"))?;
    let mut sitting = SittingRecords::new(&BELGIUM,date);
    let mut state = SpeakerState::default();
    for paragraph in &paragraphs[first_agenda..] {
        if let Some(cap) = AGENDA.captures(paragraph) {
            state = state.with_agenda(&cap["title"]).with_speaker("");
            sitting.start_speech();
            continue;
        }
        let speech = NUMBERED_SPEECH.captures(paragraph).map(|c|(c,true)).or_else(||PRESIDENT_SPEECH.captures(paragraph).map(|c|(c,false)));
        let text = match speech {
            Some((cap,numbered)) => {
                let (speaker,party) = speaker_and_party(&cap["meta"],numbered);
                state = state.with_speaker(speaker).with_party(party);
                sitting.start_speech();
                cap.name("text").map(|t|t.as_str()).unwrap_or("")
            }
            None => paragraph.as_str(),
        };
        sitting.push(&state,&TRAILING_REMARK.replace(text,""));
    }
    Ok(sitting.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_util::SourceMeta;
    use crate::speaker_state::assert_numbering;

    fn line(page:usize,x:f32,y:f32,text:&str) -> PdfLine { PdfLine{ page, x, y, text: text.to_string() } }

    fn sitting() -> Vec<PdfLine> {
        vec![
            line(0,50.0,800.0,"CRABV 54 PLEN 033"),
            line(0,50.0,760.0,"La séance est ouverte à 14.19 heures et présidée par"),
            line(0,50.0,748.0,"M. Siegfried Bracke."),
            line(0,50.0,724.0,"01 Ordre du jour"),
            line(0,50.0,700.0,"Le président: Chers collègues, nous"),
            line(0,50.0,688.0,"commençons nos travaux."),
            line(0,50.0,664.0,"Deuxième paragraphe du"),
            line(0,50.0,652.0,"président."),
            line(0,50.0,640.0,"01.01 Peter Dedecker (N-VA): Monsieur le"),
            line(0,50.0,628.0,"ministre, ma question."),
            line(0,50.0,616.0,"(Applaudissements)"),
            line(0,50.0,604.0,"01.02 Koen Geens, ministre: Je réponds"),
            line(0,50.0,592.0,". volontiers."),
            line(0,50.0,568.0,"02 Projet de loi portant des dispositions diverses"),
            line(0,50.0,544.0,"Le rapporteur se réfère au rapport"),
            line(0,50.0,532.0,"écrit."),
            line(0,50.0,40.0,"CHAMBRE-4E SESSION DE LA 54E LEGISLATURE"),
            line(0,300.0,760.0,"De vergadering wordt geopend om 14.19 uur"),
            line(0,300.0,724.0,"01 Agenda"),
            line(0,300.0,700.0,"De voorzitter: Beste collega's,"),
            line(1,50.0,800.0,"CRABV 54 PLEN 033"),
            line(1,50.0,790.0,"Ja 76 Oui"),
            line(1,50.0,780.0,"La discussion est close."),
            line(1,300.0,780.0,"De bespreking is gesloten."),
        ]
    }

    #[test]
    fn test_parse_lines() {
        let records = parse_lines(&sitting(),"2015-03-04").unwrap();
        assert_numbering(&records);
        assert_eq!(6,records.len());
        assert_eq!(("Le président","","01 Ordre du jour","Chers collègues, nous commençons nos travaux."),(records[0].speaker.as_str(),records[0].party.as_str(),records[0].agenda.as_str(),records[0].text.as_str()));
        assert_eq!(("Deuxième paragraphe du président.",1,2),(records[1].text.as_str(),records[1].speechnumber,records[1].paragraphnumber));
        assert_eq!(("Peter Dedecker","N-VA","Monsieur le ministre, ma question."),(records[2].speaker.as_str(),records[2].party.as_str(),records[2].text.as_str()));
        assert_eq!(("Koen Geens, ministre","","Je réponds volontiers.",3),(records[3].speaker.as_str(),records[3].party.as_str(),records[3].text.as_str(),records[3].speechnumber));
        assert_eq!(("","02 Projet de loi portant des dispositions diverses","Le rapporteur se réfère au rapport écrit.",4),(records[4].speaker.as_str(),records[4].agenda.as_str(),records[4].text.as_str(),records[4].speechnumber));
        assert_eq!(("La discussion est close.",4,2),(records[5].text.as_str(),records[5].speechnumber,records[5].paragraphnumber));
        assert!(records.iter().all(|r|r.date=="2015-03-04" && r.parliament=="BE-De Kamer"));
    }

    #[test]
    fn test_dutch_column_first() {
        let lines : Vec<PdfLine> = sitting().into_iter().map(|l|PdfLine{ x: 350.0-l.x, ..l }).collect();
        let records = parse_lines(&lines,"2015-03-04").unwrap();
        assert_eq!(6,records.len());
        assert_eq!("Peter Dedecker",records[2].speaker);
    }

    #[test]
    fn test_missing_anchors() {
        let no_opening : Vec<PdfLine> = sitting().into_iter().filter(|l|!l.text.starts_with("La séance")).collect();
        assert!(parse_lines(&no_opening,"2015-03-04").unwrap_err().downcast_ref::<StructureError>().is_some());
        let no_agenda : Vec<PdfLine> = sitting().into_iter().filter(|l|!l.text.starts_with("01 ") && !l.text.starts_with("02 ")).collect();
        assert!(parse_lines(&no_agenda,"2015-03-04").is_err());
    }

    #[test]
    fn test_speaker_and_party() {
        assert_eq!(("Le président".to_string(),"".to_string()),speaker_and_party("Le président (André Flahaut)",false));
        assert_eq!(("Peter Dedecker".to_string(),"N-VA".to_string()),speaker_and_party("Peter Dedecker (N-VA)",true));
    }

    #[test]
    fn test_sitting_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ip033.pdf");
        let mut meta = serde_json::Map::new();
        meta.insert("ip033".to_string(),serde_json::json!({"full_title":"20150304_Plenum"}));
        let doc = SourceDocument{ path: path.clone(), year: 2015, meta: Some(SourceMeta(meta)) };
        assert_eq!("2015-03-04",sitting_date(&doc).unwrap());
        let doc = SourceDocument{ path: dir.path().join("plen_2016-01-28.pdf"), year: 2016, meta: None };
        assert_eq!("2016-01-28",sitting_date(&doc).unwrap());
        assert!(sitting_date(&SourceDocument{ path, year: 2015, meta: None }).is_err());
    }
}
