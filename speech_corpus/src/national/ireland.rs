//! Dáil Éireann debates, in Akoma Ntoso XML as published by the Houses of the Oireachtas.

use once_cell::sync::Lazy;
use regex::Regex;
use crate::country::CountryConfig;
use crate::error::StructureError;
use crate::normalize::normalize_string;
use crate::parse_util::{find_numeric_date, SourceDocument};
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};
use roxmltree::Node;
use crate::xml_util::{with_xml_file, NodeExt};

pub const IRELAND : CountryConfig = CountryConfig {
    name: "ireland",
    parliament: "IE-House-of-the-Oireachtas",
    iso3country: "IRE",
    language: "ga",
    source_pattern: "*.xml",
    fieldnames: &["date","agenda","speechnumber","paragraphnumber","speaker","speaker_uri","text","parliament","iso3country"],
    extractor: parse_irish_parliament,
};

/// Sections that are not debate.
const SKIPPED_SECTIONS : &[&str] = &["prelude","WrittenAnswers","writtenAnswer"];

static CAMEL_CASE_WORD : Lazy<Regex> = Lazy::new(||Regex::new(r"[A-Z][^A-Z]*").unwrap());

pub fn parse_irish_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    let date = find_numeric_date(&doc.stem()).ok_or(StructureError::MissingAnchor("a date in the file name"))?;
    with_xml_file(&doc.path,|root|parse_debate(root,&date))
}

/// `#MichealMartin` → `Micheal Martin`
fn split_camel_case(id:&str) -> String {
    let id = id.trim_start_matches('#');
    let words : Vec<&str> = CAMEL_CASE_WORD.find_iter(id).map(|m|m.as_str()).collect();
    if words.is_empty() { id.to_string() } else { words.join(" ") }
}

fn heading_of(section:Node) -> String {
    section.child("heading").map(|h|normalize_string(&h.text_nodes().join(" "))).unwrap_or_default()
}

fn parse_debate(root:Node,date:&str) -> anyhow::Result<Vec<SpeechParagraph>> {
    let people : Vec<Node> = root.descendants_named("TLCPerson");
    let lookup_person = |id:&str| people.iter().find(|p|p.attr("eId")==Some(id)).copied();
    let sections : Vec<Node> = root.descendants_named("debateSection").into_iter().filter(|s|!SKIPPED_SECTIONS.contains(&s.attr("name").unwrap_or(""))).collect();
    let mut sitting = SittingRecords::new(&IRELAND,date);
    // The speaker that summaries are attributed to, with their uri.
    let mut previous : Option<(SpeakerState,String)> = None;
    for (index,&section) in sections.iter().enumerate() {
        let mut agenda = heading_of(section);
        if agenda.is_empty() { agenda = previous.as_ref().map(|(s,_)|s.agenda.clone()).unwrap_or_default(); }
        if agenda.is_empty() && index>0 { agenda = heading_of(sections[index-1]); }
        if agenda.is_empty() { agenda = section.descendants_named("summary").iter().map(|s|s.text_nodes().join(" ")).collect::<Vec<_>>().join(" "); }
        let agenda = normalize_string(&agenda);
        for item in section.elements() {
            if item.is("summary") && item.attr("by").is_none() {
                if let Some((state,uri)) = &previous {
                    if agenda.is_empty() { return Err(StructureError::MissingAnchor("an agenda title").into()) }
                    let state = state.clone().with_agenda(&agenda);
                    if let Some(row) = sitting.push(&state,&item.text_nodes().join(" ")) { row.set_extra("speaker_uri",uri.as_str()); }
                }
            } else if let Some(by) = item.attr("by") {
                let (mut speaker,mut uri) = (String::new(),String::new());
                if by!="#" {
                    let person = lookup_person(by.trim_start_matches('#')).ok_or_else(||StructureError::unexpected(format!("No TLCPerson for {}",by)))?;
                    speaker = person.attr("showAs").unwrap_or("").to_string();
                    uri = person.attr("href").unwrap_or("").to_string();
                }
                if speaker.is_empty() {
                    speaker = match item.child("from") {
                        Some(from) => normalize_string(&from.all_text()),
                        None => split_camel_case(by),
                    };
                }
                if speaker.is_empty() { return Err(StructureError::unexpected(format!("No speaker name for {}",by)).into()) }
                let paragraphs = item.descendants_named("p");
                if paragraphs.is_empty() { return Err(StructureError::unexpected(format!("Speech by {} without paragraphs",by)).into()) }
                if agenda.is_empty() { return Err(StructureError::MissingAnchor("an agenda title").into()) }
                let state = SpeakerState::default().with_agenda(&agenda).with_speaker(speaker);
                sitting.start_speech();
                for p in paragraphs {
                    if let Some(row) = sitting.push(&state,&p.text_nodes().join(" ")) { row.set_extra("speaker_uri",uri.as_str()); }
                }
                previous = Some((state,uri));
            }
        }
    }
    Ok(sitting.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speaker_state::assert_numbering;
    use crate::xml_util::parse_xml_str;

    const DEBATE : &str = r##"<akomaNtoso xmlns="http://docs.oasis-open.org/legaldocml/ns/akn/3.0/CSD13"><debate>
<meta><references>
<TLCPerson eId="MichealMartin" href="/ie/oireachtas/member/id/Micheál-Martin.D.1989-07-12" showAs="Micheál Martin"/>
<TLCPerson eId="LeoVaradkar" href="/ie/oireachtas/member/id/Leo-Varadkar.D.2007-06-14" showAs="Leo Varadkar"/>
<TLCPerson eId="AnCeannComhairle" href="" showAs=""/>
</references></meta>
<debateBody>
<debateSection name="prelude"><p>Chuaigh an Ceann Comhairle i gceannas.</p></debateSection>
<debateSection name="debate" eId="dbsect_1"><heading>Leaders' Questions</heading>
<speech by="#MichealMartin" eId="spk_1"><from>Deputy Micheál Martin</from><p>The housing crisis continues.</p><p>What will the Taoiseach do?</p></speech>
<summary>Interruptions.</summary>
<speech by="#LeoVaradkar" eId="spk_2"><p>We are building houses.</p></speech>
<speech by="#AnCeannComhairle" eId="spk_3"><p>Time is up.</p></speech>
</debateSection>
<debateSection name="debate" eId="dbsect_2">
<speech by="#" eId="spk_4"><from>A Deputy</from><p>Hear, hear.</p></speech>
</debateSection>
</debateBody></debate></akomaNtoso>"##;

    #[test]
    fn test_parse_debate() {
        let records = parse_debate(parse_xml_str(DEBATE).unwrap().root_element(),"2015-03-04").unwrap();
        assert_numbering(&records);
        assert_eq!(6,records.len());
        assert_eq!(("Micheál Martin","Leaders' Questions",1,2),(records[1].speaker.as_str(),records[1].agenda.as_str(),records[1].speechnumber,records[1].paragraphnumber));
        assert_eq!("/ie/oireachtas/member/id/Micheál-Martin.D.1989-07-12",records[0].field("speaker_uri"));
        assert_eq!(("Micheál Martin","Interruptions.",1,3),(records[2].speaker.as_str(),records[2].text.as_str(),records[2].speechnumber,records[2].paragraphnumber));
        assert_eq!("Leo Varadkar",records[3].speaker);
        assert!(records[4].field("speaker_uri").is_empty());
        assert_eq!("A Deputy",records[5].speaker);
        assert_eq!("Leaders' Questions",records[5].agenda);
    }

    #[test]
    fn test_unknown_person() {
        let xml = r##"<akomaNtoso><debateSection name="debate"><heading>X</heading><speech by="#Nobody"><p>x</p></speech></debateSection></akomaNtoso>"##;
        assert!(parse_debate(parse_xml_str(xml).unwrap().root_element(),"2015-03-04").is_err());
    }

    #[test]
    fn test_split_camel_case() {
        assert_eq!("An Ceann Comhairle",split_camel_case("#AnCeannComhairle"));
    }
}
