//! Download a single source document into the national tree.
//!
//! The document is only kept if the country's extractor can parse it, so a changed page layout
//! or an error page never lands in `source/`.

use std::path::{Path, PathBuf};
use anyhow::{anyhow, Context};
use log::info;
use serde_json::json;
use crate::config::CONFIG;
use crate::country::CountryConfig;
use crate::parse_util::SourceDocument;

/// Where a fetched document was stored, and how many rows the extractor found in it.
#[derive(Debug,Clone,PartialEq)]
pub struct FetchedDocument {
    pub path : PathBuf,
    pub rows : usize,
}

/// The last segment of the URL's path, which becomes the name of the source file.
pub fn file_name_from_url(url:&str) -> anyhow::Result<String> {
    let parsed = url::Url::parse(url).with_context(||format!("Invalid URL {}",url))?;
    let name = parsed.path_segments().and_then(|s|s.filter(|s|!s.is_empty()).last()).ok_or_else(||anyhow!("No file name in {}",url))?;
    let name = name.replace("%20"," ");
    Ok(name)
}

pub async fn download(url:&str) -> anyhow::Result<Vec<u8>> {
    info!("Downloading {}",url);
    let client = reqwest::Client::builder().user_agent(CONFIG.user_agent.as_str()).build()?;
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

/// Write the document and its metadata into a scratch folder, check that the extractor can
/// parse it, and then move both into `<country_dir>/<year>/source/`.
pub fn check_and_store(country:&CountryConfig,country_dir:&Path,year:i32,file_name:&str,url:&str,content:&[u8]) -> anyhow::Result<FetchedDocument> {
    if !glob::Pattern::new(country.source_pattern)?.matches(file_name) {
        return Err(anyhow!("{} does not look like a {} source document ({})",file_name,country.name,country.source_pattern));
    }
    let year_dir = country_dir.join(year.to_string());
    let source_dir = year_dir.join("source");
    std::fs::create_dir_all(&source_dir).with_context(||format!("Could not create {}",source_dir.display()))?;
    let scratch = tempfile::Builder::new().prefix(".fetch").tempdir_in(&year_dir)?;
    let document = scratch.path().join(file_name);
    let meta = document.with_extension("json");
    std::fs::write(&document,content).with_context(||format!("Could not write {}",document.display()))?;
    std::fs::write(&meta,serde_json::to_string_pretty(&json!({"URL":url}))?)?;
    let rows = (country.extractor)(&SourceDocument::load(&document,year)?).with_context(||format!("Downloaded {} but could not parse it",url))?.len();
    let path = source_dir.join(file_name);
    std::fs::rename(&document,&path).with_context(||format!("Could not move {} to {}",document.display(),path.display()))?;
    let meta_path = path.with_extension("json");
    std::fs::rename(&meta,&meta_path).with_context(||format!("Could not move {} to {}",meta.display(),meta_path.display()))?;
    info!("Stored {} ({} rows)",path.display(),rows);
    Ok(FetchedDocument{ path, rows })
}

pub async fn fetch_source_document(country:&CountryConfig,country_dir:&Path,year:i32,url:&str) -> anyhow::Result<FetchedDocument> {
    let file_name = file_name_from_url(url)?;
    let content = download(url).await?;
    check_and_store(country,country_dir,year,&file_name,url,&content)
}
