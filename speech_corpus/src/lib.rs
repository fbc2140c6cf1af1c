pub mod config;
pub mod country;
pub mod error;
pub mod normalize;
pub mod record;
pub mod speaker_state;
pub mod parse_util;
mod xml_util;
mod docx_util;
mod parse_pdf_util;
pub mod national;
pub mod parse_national;
pub mod corpus;
pub mod ep_enrichment;
pub mod legislative_changes;
pub mod fetch;
