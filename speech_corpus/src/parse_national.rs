//! Run a country's extractor over every source document of the requested years, writing
//! `<stem>_parsed.csv` next to each year's `source` folder.

use std::path::{Path, PathBuf};
use anyhow::Context;
use log::{debug, error, info, warn};
use crate::country::CountryConfig;
use crate::parse_util::SourceDocument;
use crate::record::{parsed_file_name, write_csv};

/// What happened to the documents of a run.
#[derive(Debug,Default,Clone,PartialEq)]
pub struct ParseSummary {
    pub parsed : usize,
    pub failed : usize,
    pub rows : usize,
}

/// The source documents of one year, in file name order.
pub fn source_files(country_dir:&Path,year:i32,pattern:&str) -> anyhow::Result<Vec<PathBuf>> {
    let source_dir = country_dir.join(year.to_string()).join("source");
    if !source_dir.is_dir() { return Ok(vec![]) }
    let pattern = source_dir.join(pattern);
    let mut files = vec![];
    for entry in glob::glob(&pattern.to_string_lossy())? {
        files.push(entry?);
    }
    files.sort();
    Ok(files)
}

/// Parse one document and write its CSV into `year_dir`. Returns the number of rows written.
pub fn parse_document(country:&CountryConfig,path:&Path,year:i32,year_dir:&Path) -> anyhow::Result<usize> {
    let doc = SourceDocument::load(path,year)?;
    let records = (country.extractor)(&doc)?;
    if records.is_empty() { warn!("No speeches found in {}",path.display()); }
    write_csv(&year_dir.join(parsed_file_name(path)),&records,country.fieldnames)?;
    Ok(records.len())
}

/// Parse all the years of a country. A document that cannot be parsed is logged and skipped;
/// only failing to write output stops the run.
pub fn parse_country(country:&CountryConfig,country_dir:&Path,years:impl IntoIterator<Item=i32>) -> anyhow::Result<ParseSummary> {
    let mut summary = ParseSummary::default();
    for year in years {
        info!("Started with {} {}",country.name,year);
        let year_dir = country_dir.join(year.to_string());
        let files = source_files(country_dir,year,country.source_pattern)?;
        if files.is_empty() { continue }
        std::fs::create_dir_all(&year_dir).with_context(||format!("Could not create {}",year_dir.display()))?;
        for path in files {
            match parse_document(country,&path,year,&year_dir) {
                Ok(rows) => {
                    debug!("Parsed {} rows from {}",rows,path.display());
                    summary.parsed+=1;
                    summary.rows+=rows;
                }
                Err(e) => {
                    error!("Could not parse {} : {:#}",path.display(),e);
                    summary.failed+=1;
                }
            }
        }
    }
    if summary.failed>0 { warn!("{} documents of {} could not be parsed",summary.failed,country.name); }
    info!("Parsed {} documents of {} into {} rows",summary.parsed,country.name,summary.rows);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::national::cyprus::CYPRUS;

    const TRANSCRIPT : &str = "ΠΡΟΕΔΡΟΣ:\n(ΔΗΜΗΤΡΗΣ ΣΥΛΛΟΥΡΗΣ)\nΑρχίζει η συνεδρία.\n(Ώρα λήξης: 6.30 μ.μ.)\n";

    #[test]
    fn test_parse_country() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("2015").join("source");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("2015-03-04_10_4_12.txt"),TRANSCRIPT).unwrap();
        std::fs::write(source.join("2015-03-05_10_4_13.txt"),"no end of sitting here").unwrap();
        std::fs::write(source.join("2015-03-04_10_4_12.json"),r#"{"URL":"https://example.org/12"}"#).unwrap();
        let summary = parse_country(&CYPRUS,dir.path(),2014..=2015).unwrap();
        assert_eq!(ParseSummary{ parsed: 1, failed: 1, rows: 1 },summary);
        let csv = std::fs::read_to_string(dir.path().join("2015").join("2015-03-04_10_4_12_parsed.csv")).unwrap();
        let mut lines = csv.lines();
        assert_eq!(Some(CYPRUS.fieldnames.join(",").as_str()),lines.next());
        assert!(lines.next().unwrap().contains("Αρχίζει η συνεδρία."));
        assert!(!dir.path().join("2015").join("2015-03-05_10_4_13_parsed.csv").exists());
        assert!(!dir.path().join("2014").exists());
    }
}
