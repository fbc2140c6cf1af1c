//! Utilities shared by the national extractors: source documents and their metadata,
//! reading files in whatever encoding they come in, and dates in various languages.

use std::fs::File;
use std::path::{Path, PathBuf};
use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use encoding_rs::{Encoding, UTF_8};
use encoding_rs_io::DecodeReaderBytesBuilder;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

/// A raw document to be parsed, with the metadata json that was saved next to it (if any).
#[derive(Debug,Clone)]
pub struct SourceDocument {
    pub path : PathBuf,
    pub year : i32,
    pub meta : Option<SourceMeta>,
}

impl SourceDocument {
    /// Create, loading `<stem>.json` next to the file if it exists.
    pub fn load(path:&Path,year:i32) -> anyhow::Result<SourceDocument> {
        let meta_path = path.with_extension("json");
        let meta = if meta_path.is_file() { Some(SourceMeta::load(&meta_path)?) } else { None };
        Ok(SourceDocument{ path: path.to_path_buf(), year, meta })
    }

    pub fn stem(&self) -> String {
        self.path.file_stem().map(|s|s.to_string_lossy().to_string()).unwrap_or_default()
    }

    pub fn url(&self) -> Option<&str> { self.meta.as_ref().and_then(|m|m.url()) }
}

/// The json metadata saved by the crawler next to a source document. Contains at least `URL`.
#[derive(Debug,Clone,Default)]
pub struct SourceMeta(pub Map<String,Value>);

impl SourceMeta {
    pub fn load(path:&Path) -> anyhow::Result<SourceMeta> {
        let raw : Value = serde_json::from_reader(File::open(path).with_context(||format!("Could not open {}",path.display()))?).with_context(||format!("Could not parse {}",path.display()))?;
        match raw {
            Value::Object(map) => Ok(SourceMeta(map)),
            _ => Err(anyhow!("Metadata file {} is not a json object",path.display())),
        }
    }
    pub fn get(&self,field:&str) -> Option<&str> { self.0.get(field).and_then(|v|v.as_str()) }
    pub fn url(&self) -> Option<&str> { self.get("URL") }
}

static CHARSET : Lazy<Regex> = Lazy::new(||Regex::new(r#"(?i)charset\s*=\s*["']?([A-Za-z0-9_\-]+)"#).unwrap());

/// Decode raw bytes, using a byte order mark or a `charset=` declaration near the start if present, otherwise UTF-8.
pub fn decode_bytes(bytes:&[u8]) -> String {
    let encoding = Encoding::for_bom(bytes).map(|(e,_)|e).or_else(||{
        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(2048)]);
        CHARSET.captures(&head).and_then(|cap|Encoding::for_label(cap[1].as_bytes()))
    }).unwrap_or(UTF_8);
    let (text,_,_) = encoding.decode(bytes);
    text.into_owned()
}

pub fn read_text(path:&Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(path).with_context(||format!("Could not read {}",path.display()))?;
    Ok(decode_bytes(&bytes))
}

pub fn read_html(path:&Path) -> anyhow::Result<scraper::Html> {
    Ok(scraper::Html::parse_document(&read_text(path)?))
}

/// Open a CSV file for reading with headers. A UTF-8 byte order mark is skipped.
pub fn open_csv(path:&Path) -> anyhow::Result<csv::Reader<impl std::io::Read>> {
    let file = File::open(path).with_context(||format!("Could not open {}",path.display()))?;
    let decoded = DecodeReaderBytesBuilder::new().encoding(Some(UTF_8)).bom_sniffing(true).build(file);
    Ok(csv::ReaderBuilder::new().flexible(true).from_reader(decoded))
}

pub fn iso_date(year:i32,month:u32,day:u32) -> anyhow::Result<String> {
    let date = NaiveDate::from_ymd_opt(year,month,day).ok_or_else(||anyhow!("Invalid date {}-{}-{}",year,month,day))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Parse a date in the given chrono format and return it as `YYYY-MM-DD`.
pub fn reformat_date(text:&str,format:&str) -> anyhow::Result<String> {
    let date = NaiveDate::parse_from_str(text.trim(),format).with_context(||format!("Could not parse date {} as {}",text,format))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Month names, January first. Several spellings for a month may be given, separated by `|`.
pub type MonthNames = [&'static str;12];

pub const FRENCH_MONTHS : MonthNames = ["janvier","février|fevrier","mars","avril","mai","juin","juillet","août|aout","septembre","octobre","novembre","décembre|decembre"];
pub const GERMAN_MONTHS : MonthNames = ["januar|jänner","februar|feber","märz","april","mai","juni","juli","august","september","oktober","november","dezember"];
pub const SWEDISH_MONTHS : MonthNames = ["januari","februari","mars","april","maj","juni","juli","augusti","september","oktober","november","december"];
pub const PORTUGUESE_MONTHS : MonthNames = ["janeiro","fevereiro","março|marco","abril","maio","junho","julho","agosto","setembro","outubro","novembro","dezembro"];
pub const ENGLISH_MONTHS : MonthNames = ["january","february","march","april","may","june","july","august","september","october","november","december"];
pub const BULGARIAN_MONTHS : MonthNames = ["януари","февруари","март","април","май","юни","юли","август","септември","октомври","ноември","декември"];
/// Genitive, as in dates. Headings are often in capitals without accents.
pub const GREEK_MONTHS : MonthNames = ["ιανουαρίου|ιανουαριου","φεβρουαρίου|φεβρουαριου","μαρτίου|μαρτιου","απριλίου|απριλιου","μαΐου|μαϊου|μαιου","ιουνίου|ιουνιου","ιουλίου|ιουλιου","αυγούστου|αυγουστου","σεπτεμβρίου|σεπτεμβριου","οκτωβρίου|οκτωβριου","νοεμβρίου|νοεμβριου","δεκεμβρίου|δεκεμβριου"];

/// Genitive, as in `2010 m. vasario 4 d.`.
pub const LITHUANIAN_MONTHS : MonthNames = ["sausio","vasario","kovo","balandžio","gegužės","birželio","liepos","rugpjūčio","rugsėjo","spalio","lapkričio","gruodžio"];

/// Find `<day> <month name> <year>` in the text (e.g. `mardi 3 février 2015`, `4. März 2015`, `3 de março de 2015`) and return it as `YYYY-MM-DD`.
pub fn find_date_with_month_names(text:&str,months:&MonthNames) -> Option<String> {
    let alternatives = months.iter().map(|m|m.to_string()).collect::<Vec<_>>().join("|");
    let re = Regex::new(&format!(r"(?i)(\d{{1,2}})(?:er)?\.?\s+(?:de\s+)?({})\s+(?:de\s+)?(\d{{4}})",alternatives)).ok()?;
    for cap in re.captures_iter(text) {
        let day : u32 = cap[1].parse().ok()?;
        let month_name = cap[2].to_lowercase();
        let month = months.iter().position(|m|m.split('|').any(|alt|alt==month_name))? as u32 + 1;
        let year : i32 = cap[3].parse().ok()?;
        if let Ok(date) = iso_date(year,month,day) { return Some(date) }
    }
    None
}

static DIGIT_DATE : Lazy<Regex> = Lazy::new(||Regex::new(r"(\d{4})[-_.]?(\d{2})[-_.]?(\d{2})").unwrap());

/// Find a date written with digits, year first (`20150304`, `2015-03-04`, `2015.03.04.`), in a file name or similar.
pub fn find_numeric_date(text:&str) -> Option<String> {
    DIGIT_DATE.captures_iter(text).find_map(|cap|iso_date(cap[1].parse().ok()?,cap[2].parse().ok()?,cap[3].parse().ok()?).ok())
}

/// The direct text of a scraper element, all text nodes concatenated.
pub fn element_text(e:&scraper::ElementRef) -> String {
    e.text().collect::<String>()
}

/// The text of an element split into segments at each `<br>`, each segment normalized. Empty segments are kept.
pub fn text_split_at_line_breaks(e:&scraper::ElementRef) -> Vec<String> {
    fn walk(node:ego_tree::NodeRef<scraper::Node>,segments:&mut Vec<String>) {
        for child in node.children() {
            match child.value() {
                scraper::Node::Text(t) => { if let Some(s) = segments.last_mut() { s.push_str(t); s.push(' '); } }
                scraper::Node::Element(e) if e.name()=="br" => segments.push(String::new()),
                scraper::Node::Element(_) => walk(child,segments),
                _ => {}
            }
        }
    }
    let mut segments = vec![String::new()];
    walk(**e,&mut segments);
    segments.iter().map(|s|crate::normalize::normalize_string(s)).collect()
}

pub fn relative_url(base_url:&str,url:&str) -> anyhow::Result<String> {
    let base = reqwest::Url::parse(base_url)?;
    let res = base.join(url)?;
    Ok(res.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_name_dates() {
        assert_eq!(Some("2015-02-03".to_string()),find_date_with_month_names("Séance du mardi 3 février 2015",&FRENCH_MONTHS));
        assert_eq!(Some("2015-03-01".to_string()),find_date_with_month_names("Compte rendu du 1er mars 2015",&FRENCH_MONTHS));
        assert_eq!(Some("2014-03-04".to_string()),find_date_with_month_names("Dauer der Sitzung: Dienstag, 4. März 2014: 9.05 Uhr",&GERMAN_MONTHS));
        assert_eq!(Some("2012-01-12".to_string()),find_date_with_month_names("12 Jänner 2012",&GERMAN_MONTHS));
        assert_eq!(Some("2016-03-03".to_string()),find_date_with_month_names("Reunião plenária de 3 de março de 2016",&PORTUGUESE_MONTHS));
        assert_eq!(Some("2012-07-13".to_string()),find_date_with_month_names("София, петък, 13 юли 2012",&BULGARIAN_MONTHS));
        assert_eq!(Some("2019-03-13".to_string()),find_date_with_month_names("Τετάρτη 13 Μαρτίου 2019",&GREEK_MONTHS));
        assert_eq!(Some("2019-05-02".to_string()),find_date_with_month_names("ΠΕΜΠΤΗ 2 ΜΑΪΟΥ 2019",&GREEK_MONTHS));
        assert_eq!(None,find_date_with_month_names("31 februari 2015",&SWEDISH_MONTHS));
    }

    #[test]
    fn test_numeric_dates() {
        assert_eq!(Some("2015-03-04".to_string()),find_numeric_date("dail20150304"));
        assert_eq!(Some("2013-11-05".to_string()),find_numeric_date("x_6_24_2013.11.05"));
        assert_eq!(Some("2013-11-05".to_string()),find_numeric_date("ülésnap (2013.11.05.)"));
        assert_eq!(None,find_numeric_date("session_72"));
    }

    #[test]
    fn test_split_at_line_breaks() {
        let html = scraper::Html::parse_fragment("<div>First <i>line</i><br>second<br/><br><span>third</span></div>");
        let div = html.select(&scraper::Selector::parse("div").unwrap()).next().unwrap();
        assert_eq!(vec!["First line","second","","third"],text_split_at_line_breaks(&div));
    }

    #[test]
    fn test_decode_bytes() {
        assert_eq!("été",decode_bytes("été".as_bytes()));
        let (latin1,_,_) = encoding_rs::WINDOWS_1252.encode("<meta charset=\"windows-1252\"><p>été</p>");
        assert!(decode_bytes(&latin1).contains("été"));
        let mut with_bom = vec![0xEF,0xBB,0xBF];
        with_bom.extend_from_slice("x".as_bytes());
        assert_eq!("x",decode_bytes(&with_bom));
    }

    #[test]
    fn test_source_meta() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("session_72.json"),r#"{"URL":"https://example.org/72","title":"x"}"#).unwrap();
        std::fs::write(dir.path().join("session_72.html"),"<html></html>").unwrap();
        let doc = SourceDocument::load(&dir.path().join("session_72.html"),2015).unwrap();
        assert_eq!(Some("https://example.org/72"),doc.url());
        assert_eq!("session_72",doc.stem());
        let doc = SourceDocument::load(&dir.path().join("session_73.html"),2015).unwrap();
        assert!(doc.meta.is_none());
    }
}
