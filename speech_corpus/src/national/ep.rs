//! Verbatim reports of European Parliament plenary sittings (CRE XML).
//!
//! Each `section` is an agenda item and each `intervention` in it one speech. Only
//! interventions by members are kept. Party and language are filled in later by
//! [ep_enrichment](crate::ep_enrichment).

use once_cell::sync::Lazy;
use regex::Regex;
use crate::country::CountryConfig;
use crate::error::StructureError;
use crate::normalize::normalize_whitespace;
use crate::parse_util::SourceDocument;
use crate::record::SpeechParagraph;
use crate::speaker_state::{SittingRecords, SpeakerState};
use roxmltree::Node;
use crate::xml_util::{with_xml_file, NodeExt};

pub const EP_FIELDNAMES : &[&str] = &["date","agenda_id","agendanumber","agenda","speech_id","speechnumber","paragraphnumber","speaker","party","national_party","mep_id","text","mode","language","parliament","iso3country"];

pub const EP : CountryConfig = CountryConfig {
    name: "ep",
    parliament: "EU-Parliament",
    iso3country: "EUR",
    language: "en",
    source_pattern: "*.xml",
    fieldnames: EP_FIELDNAMES,
    extractor: parse_ep_parliament,
};

static ITEM_NUMBER : Lazy<Regex> = Lazy::new(||Regex::new(r"^\s*\d*\.\s?").unwrap());

pub fn parse_ep_parliament(doc:&SourceDocument) -> anyhow::Result<Vec<SpeechParagraph>> {
    with_xml_file(&doc.path,parse_report)
}

fn parse_report(root:Node) -> anyhow::Result<Vec<SpeechParagraph>> {
    let header = if root.is("text") { Some(root) } else { root.find("text") };
    let date = header.and_then(|t|t.attr("date")).ok_or(StructureError::MissingAnchor("text@date"))?.to_string();
    let mut sitting = SittingRecords::new(&EP,date.as_str());
    for section in root.descendants_named("section") {
        let agendanumber = section.attr("id").unwrap_or("").replace("creitem","");
        let agenda_id = format!("en.{}.{}",date.replace('-',""),agendanumber);
        let agenda = ITEM_NUMBER.replace(section.attr("title").unwrap_or(""),"").to_string();
        for intervention in section.descendants_named("intervention") {
            if intervention.attr("is_mep")==Some("False") { continue }
            let state = SpeakerState::default().with_agenda(&agenda).with_speaker(intervention.attr("name").unwrap_or(""));
            let intervention_id = intervention.attr("id").unwrap_or("");
            sitting.start_speech();
            if let Some(row) = sitting.push(&state,&normalize_whitespace(&intervention.text_nodes().join(" "))) {
                row.set_extra("agenda_id",agenda_id.as_str())
                    .set_extra("agendanumber",agendanumber.as_str())
                    .set_extra("speech_id",format!("{}.{}",agenda_id,intervention_id))
                    .set_extra("mep_id",intervention.attr("speaker_id").unwrap_or(""))
                    .set_extra("mode",intervention.attr("mode").unwrap_or(""))
                    .set_extra("national_party","")
                    .set_extra("language",intervention.attr("language").unwrap_or(""));
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

    const REPORT : &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<text date="2015-03-11">
<section id="creitem3" title="3. Situation in Ukraine (debate)">
<intervention id="5" is_mep="True" speaker_id="96766" mode="spoken" name="Elmar Brok">Mr President,&#13;
 the situation   is serious.</intervention>
<intervention id="6" is_mep="False" speaker_id="" mode="spoken" name="Federica Mogherini">Thank you.</intervention>
<intervention id="7" is_mep="True" speaker_id="1" mode="written" name="Empty">  </intervention>
<intervention id="8" is_mep="True" speaker_id="28224" mode="written" name="Jean-Luc Mélenchon" language="fr"><p>Par écrit.</p><p>Je vote contre.</p></intervention>
</section>
</text>"#;

    #[test]
    fn test_parse_report() {
        let records = parse_report(parse_xml_str(REPORT).unwrap().root_element()).unwrap();
        assert_numbering(&records);
        assert_eq!(2,records.len());
        let brok = &records[0];
        assert_eq!("Situation in Ukraine (debate)",brok.agenda);
        assert_eq!("en.20150311.3",brok.field("agenda_id"));
        assert_eq!("3",brok.field("agendanumber"));
        assert_eq!("en.20150311.3.5",brok.field("speech_id"));
        assert_eq!("96766",brok.field("mep_id"));
        assert_eq!("Mr President, the situation is serious.",brok.text);
        assert_eq!("EUR",brok.iso3country);
        assert_eq!(("Jean-Luc Mélenchon","Par écrit. Je vote contre.","written","fr",2),(records[1].speaker.as_str(),records[1].text.as_str(),records[1].field("mode").as_str(),records[1].field("language").as_str(),records[1].speechnumber));
    }
}
