//! Stenograme of the Camera Deputaților. Each block of the sitting is a `td.textn` cell; a cell
//! whose first `p` opens with a bold name (`Domnul Valeriu Zgonea`) starts a speech, with the
//! role in italics after the name. Cells without a speaker continue the previous speech.

use std::collections::HashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use crate::country::CountryConfig;
use crate::error::StructureError;
use crate::normalize::normalize_string;
use crate::parse_util::{read_html, reformat_date, SourceDocument};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};

pub const ROMANIA : CountryConfig = CountryConfig {
    name: "romania",
    parliament: "RO-Camera Deputaților",
    iso3country: "ROU",
    language: "ro",
    source_pattern: "*.html",
    fieldnames: &["date","sitting","title","agenda","speechnumber","paragraphnumber","speaker","speakerrole","party","text","parliament","iso3country"],
    extractor: parse_romanian_parliament,
};

static DATE : Lazy<Regex> = Lazy::new(||Regex::new(r"\d{2}-\d{2}-\d{4}").unwrap());
static SITTING : Lazy<Regex> = Lazy::new(||Regex::new(r"\s(\d)$").unwrap());
/// Two capitalised words, which tells a name apart from bold words in the text.
static NAME : Lazy<Regex> = Lazy::new(||Regex::new(r"^[A-ZĂÂÎȘȚŞŢ][a-zăâîșțşţ]*\s+[A-ZĂÂÎȘȚŞŢ][a-zăâîșțşţ]*").unwrap());
static SALUTATION : Lazy<Regex> = Lazy::new(||Regex::new(r"Domnul\s*|Doamna\s*").unwrap());

static PATH : Lazy<Selector> = Lazy::new(||Selector::parse("td.cale2").unwrap());
static HEADLINE : Lazy<Selector> = Lazy::new(||Selector::parse("span.headline").unwrap());
static CELL : Lazy<Selector> = Lazy::new(||Selector::parse(r#"td.textn[width="100%"]"#).unwrap());
static ITALIC : Lazy<Selector> = Lazy::new(||Selector::parse("i").unwrap());

pub fn parse_romanian_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    // A second sitting on the same day has ` 2` at the end of the file name.
    let sitting = SITTING.captures(&doc.stem()).map(|c|c[1].to_string()).unwrap_or_else(||"1".to_string());
    parse_stenogram(&read_html(&doc.path)?,&sitting)
}

fn children_named<'a>(e:ElementRef<'a>,name:&'a str) -> impl Iterator<Item=ElementRef<'a>> + 'a {
    e.children().filter_map(ElementRef::wrap).filter(move |c|c.value().name()==name)
}

fn joined_text(e:&ElementRef) -> String { normalize_string(&e.text().collect::<Vec<_>>().join(" ")) }

/// The date in the breadcrumb, `... > 04-03-2015`.
fn sitting_date(html:&Html) -> anyhow::Result<String> {
    let path = html.select(&PATH).map(|td|td.children().filter_map(|c|c.value().as_text().map(|t|t.to_string())).collect::<Vec<_>>().join(" ")).collect::<Vec<_>>().join(" ");
    let date = DATE.find(&path).ok_or(StructureError::MissingAnchor("the date of the sitting"))?;
    reformat_date(date.as_str(),"%d-%m-%Y")
}

/// The text below the cell, in document order, except the text directly in the cell and in italics.
fn cell_text(cell:&ElementRef) -> String {
    let mut parts = vec![];
    for node in cell.descendants() {
        if let Node::Text(t) = node.value() {
            let parent = node.parent().and_then(ElementRef::wrap);
            if parent.map(|p|p.id()==cell.id() || p.value().name()=="i").unwrap_or(true) { continue }
            parts.push(t.to_string());
        }
    }
    normalize_string(&parts.join(" ")).trim_matches('*').trim().to_string()
}

/// The bold name at the start of a cell and the role in italics after it.
fn speaker_of(cell:&ElementRef) -> Option<(String,String)> {
    let bold = children_named(*cell,"p").flat_map(|p|children_named(p,"b")).map(|b|joined_text(&b)).find(|t|!t.is_empty())?;
    if !NAME.is_match(&bold) { return None }
    let role = children_named(*cell,"p").find(|p|!joined_text(p).is_empty())
        .map(|p|p.select(&ITALIC).map(|i|joined_text(&i)).collect::<Vec<_>>().join(" "))
        .map(|r|normalize_string(&r).trim_matches([')','(',':',' ']).to_string())
        .unwrap_or_default();
    Some((bold,role))
}

fn parse_stenogram(html:&Html,sitting_number:&str) -> anyhow::Result<Vec<SpeechParagraph>> {
    let date = sitting_date(html)?;
    let title = html.select(&HEADLINE).next().map(|h|joined_text(&h)).unwrap_or_default();
    let mut sitting = SittingRecords::new(&ROMANIA,date);
    let mut state = SpeakerState::default();
    let mut roles : HashMap<String,String> = HashMap::new();
    for cell in html.select(&CELL).filter(|c|children_named(*c,"i").next().is_none()) {
        let text = cell_text(&cell);
        if text.is_empty() { continue }
        match speaker_of(&cell) {
            Some((bold,role)) => {
                let text = text.strip_prefix(bold.as_str()).unwrap_or(text.as_str()).trim_start().trim_start_matches(':').trim();
                let speaker = SALUTATION.replace_all(&bold,"").trim_matches([':',' ']).to_string();
                if !role.is_empty() { roles.insert(speaker.clone(),role.clone()); }
                let role = if role.is_empty() { roles.get(&speaker).cloned().unwrap_or_default() } else { role };
                state = state.with_speaker(speaker).with_role(role);
                sitting.start_speech();
                if let Some(row) = sitting.push(&state,text) { row.set_extra("sitting",sitting_number).set_extra("title",title.as_str()); }
            }
            // Introductory text before the first speaker is left out.
            None if sitting.is_empty() => {}
            None => sitting.append_to_last(&state,&text),
        }
    }
    Ok(sitting.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speaker_state::assert_numbering;

    const STENOGRAM : &str = r#"<html><body>
<table><tr><td class="cale2">Stenograme &gt; 04-03-2015 &gt;</td></tr></table>
<span class="headline">Ședința Camerei Deputaților din 4 martie 2015</span>
<table>
<tr><td class="textn" width="100%"><p>Ședința a început la ora 9,00.</p></td></tr>
<tr><td class="textn" width="100%"><p><b>Domnul Valeriu Zgonea</b> <i>(președintele Camerei)</i>: Bună dimineața.</p></td></tr>
<tr><td class="textn" width="100%"><p>Începem lucrările.</p></td></tr>
<tr><td class="textn" width="100%"><p><b>Doamna Ana Birchall</b>: Mulțumesc.*</p></td></tr>
<tr><td class="textn" width="100%"><p><b>Vot</b> deschis.</p></td></tr>
<tr><td class="textn" width="100%"><i>Notă</i><p>Nu se preia.</p></td></tr>
<tr><td class="textn" width="100%"><p><b>Domnul Valeriu Zgonea:</b> Vă mulțumesc.</p></td></tr>
</table></body></html>"#;

    #[test]
    fn test_parse_stenogram() {
        let records = parse_stenogram(&Html::parse_document(STENOGRAM),"2").unwrap();
        assert_numbering(&records);
        assert_eq!(3,records.len());
        assert_eq!("2015-03-04",records[0].date);
        assert_eq!(("Valeriu Zgonea","președintele Camerei","Bună dimineața. Începem lucrările."),(records[0].speaker.as_str(),records[0].speakerrole.as_str(),records[0].text.as_str()));
        assert_eq!(("2","Ședința Camerei Deputaților din 4 martie 2015"),(records[0].field("sitting").as_str(),records[0].field("title").as_str()));
        assert_eq!(("Ana Birchall","","Mulțumesc. Vot deschis."),(records[1].speaker.as_str(),records[1].speakerrole.as_str(),records[1].text.as_str()));
        assert_eq!(("Valeriu Zgonea","președintele Camerei","Vă mulțumesc.",3),(records[2].speaker.as_str(),records[2].speakerrole.as_str(),records[2].text.as_str(),records[2].speechnumber));
    }

    #[test]
    fn test_missing_date() {
        let err = parse_stenogram(&Html::parse_document(r#"<td class="textn" width="100%"><p>Text</p></td>"#),"1").unwrap_err();
        assert!(err.downcast_ref::<StructureError>().is_some());
    }
}
