//! One module per parliament, each turning a raw transcript into [SpeechParagraph](crate::record::SpeechParagraph) rows.

pub mod germany;
pub mod ireland;
pub mod ep;
pub mod poland;
pub mod austria;
pub mod denmark;
pub mod france;
pub mod united_kingdom;
pub mod sweden;
pub mod estonia;
pub mod hungary;
pub mod bulgaria;
pub mod portugal;
pub mod greece;
pub mod slovakia;
pub mod malta;
pub mod cyprus;
pub mod belgium;
pub mod finland;
pub mod lithuania;
pub mod romania;
