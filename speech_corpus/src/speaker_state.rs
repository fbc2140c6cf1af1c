//! Who is currently speaking, and the numbering of speeches and paragraphs in a sitting.
//!
//! Transcripts mostly only name a speaker when the speaker changes, so extractors carry the
//! last known speaker forward. [SpeakerState] is that carried value. It is passed along
//! (and replaced) as the extractor walks through the paragraphs of a document.
//!
//! [SittingRecords] accumulates the rows for one document. It is responsible for the
//! numbering: speech numbers start at 1 and never decrease, paragraph numbers start at 1 for
//! each speech and go up by one for each row, and no row has empty text.

use crate::country::CountryConfig;
use crate::normalize::normalize_string;
use crate::record::SpeechParagraph;

#[derive(Debug,Clone,Default,PartialEq,Eq)]
pub struct SpeakerState {
    pub speaker : String,
    pub speakerrole : String,
    pub party : String,
    pub agenda : String,
}

impl SpeakerState {
    /// A new speaker, forgetting the role and party of the previous one. The agenda is kept.
    pub fn with_speaker(self,speaker:impl Into<String>) -> Self {
        SpeakerState{ speaker: speaker.into(), speakerrole: String::new(), party: String::new(), agenda: self.agenda }
    }
    pub fn with_role(self,speakerrole:impl Into<String>) -> Self {
        SpeakerState{ speakerrole: speakerrole.into(), ..self }
    }
    pub fn with_party(self,party:impl Into<String>) -> Self {
        SpeakerState{ party: party.into(), ..self }
    }
    pub fn with_agenda(self,agenda:impl Into<String>) -> Self {
        SpeakerState{ agenda: agenda.into(), ..self }
    }
    pub fn has_speaker(&self) -> bool { !self.speaker.is_empty() }
}

/// The rows produced from one source document.
pub struct SittingRecords {
    parliament : &'static str,
    iso3country : &'static str,
    date : String,
    speechnumber : u32,
    paragraphnumber : u32,
    /// the next row starts a new speech
    new_speech_pending : bool,
    records : Vec<SpeechParagraph>,
}

impl SittingRecords {
    pub fn new(country:&CountryConfig,date:impl Into<String>) -> Self {
        SittingRecords{ parliament: country.parliament, iso3country: country.iso3country, date: date.into(), speechnumber: 0, paragraphnumber: 0, new_speech_pending: true, records: vec![] }
    }

    pub fn set_date(&mut self,date:impl Into<String>) { self.date = date.into(); }

    /// The next row pushed will be paragraph 1 of a new speech. Calling this several times
    /// without pushing anything in between only starts one speech.
    pub fn start_speech(&mut self) { self.new_speech_pending = true; }

    /// Add a paragraph spoken by the given speaker. The text is normalized; if nothing remains, no row is added and None is returned.
    /// Otherwise the new row is returned so that country specific columns can be set.
    pub fn push(&mut self,state:&SpeakerState,text:&str) -> Option<&mut SpeechParagraph> {
        let text = normalize_string(text);
        if text.is_empty() { return None }
        if self.new_speech_pending || self.speechnumber==0 {
            self.speechnumber+=1;
            self.paragraphnumber=0;
            self.new_speech_pending=false;
        }
        self.paragraphnumber+=1;
        self.records.push(SpeechParagraph{
            date: self.date.clone(),
            agenda: normalize_string(&state.agenda),
            speechnumber: self.speechnumber,
            paragraphnumber: self.paragraphnumber,
            speaker: normalize_string(&state.speaker),
            speakerrole: normalize_string(&state.speakerrole),
            party: normalize_string(&state.party),
            text,
            parliament: self.parliament.to_string(),
            iso3country: self.iso3country.to_string(),
            extra: Default::default(),
        });
        self.records.last_mut()
    }

    /// Append text to the last row, e.g. when a paragraph was split by a page break. If there is no last row, start one.
    pub fn append_to_last(&mut self,state:&SpeakerState,text:&str) {
        let text = normalize_string(text);
        if text.is_empty() { return }
        if let Some(last) = self.records.last_mut() {
            last.text = normalize_string(&(last.text.clone()+" "+&text));
        } else {
            self.push(state,&text);
        }
    }

    pub fn last(&self) -> Option<&SpeechParagraph> { self.records.last() }
    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    pub fn finish(self) -> Vec<SpeechParagraph> { self.records }
}

/// Check the numbering properties every parsed document satisfies. Used by the extractor tests.
#[cfg(test)]
pub(crate) fn assert_numbering(records:&[SpeechParagraph]) {
    let mut previous : Option<&SpeechParagraph> = None;
    for r in records {
        assert!(!r.text.trim().is_empty(),"Empty text in {:?}",r);
        match previous {
            None => { assert_eq!(1,r.speechnumber); assert_eq!(1,r.paragraphnumber); }
            Some(p) if p.speechnumber==r.speechnumber => assert_eq!(p.paragraphnumber+1,r.paragraphnumber,"{:?}",r),
            Some(p) => { assert!(r.speechnumber>p.speechnumber,"{:?}",r); assert_eq!(1,r.paragraphnumber,"{:?}",r); }
        }
        previous=Some(r);
    }
}
