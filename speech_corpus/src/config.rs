use once_cell::sync::Lazy;
use std::fs;
use std::path::{Path, PathBuf};
use serde::Deserialize;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Where things live on disk. Read from config.toml in the working directory; every entry has a default.
#[derive(Deserialize,Debug,Clone)]
#[serde(default)]
pub struct Config {
    /// The directory containing `national/` and `eu/`.
    pub data_dir : PathBuf,
    /// Where the assembled corpora are written.
    pub corpus_dir : PathBuf,
    /// Years parsed by default.
    pub first_year : i32,
    pub last_year : i32,
    /// Years included in a national corpus.
    pub corpus_first_year : i32,
    pub corpus_last_year : i32,
    /// EU source documents (relative to `data_dir/eu`) that are known to be bad downloads.
    pub eu_exclude : Vec<String>,
    /// CSV telling which EU documents are amending acts (`doc_key,annot_final_act,annot_proposal`).
    pub annotations : PathBuf,
    pub user_agent : String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("spiders/data"),
            corpus_dir: PathBuf::from("party_positioning/data"),
            first_year: 2009,
            last_year: 2021,
            corpus_first_year: 2009,
            corpus_last_year: 2019,
            eu_exclude: vec!["2016/0380(COD)/full/source/full_legislative_proposal_1.html".to_string()],
            annotations: PathBuf::from("annotations/final_act_proposal_annotations.csv"),
            user_agent: "speech-corpus/0.1".to_string(),
        }
    }
}

impl Config {
    pub fn national_dir(&self) -> PathBuf { self.data_dir.join("national") }
    pub fn country_dir(&self,country:&str) -> PathBuf { self.national_dir().join(country) }
    pub fn eu_dir(&self) -> PathBuf { self.data_dir.join("eu") }
    pub fn parsed_eu_dir(&self) -> PathBuf { self.data_dir.join("parsed_data") }
    pub fn is_eu_excluded(&self,path:&Path) -> bool {
        self.eu_exclude.iter().any(|e|path.ends_with(e))
    }
}

pub static CONFIG : Lazy<Config> = Lazy::new(|| {
    match fs::read_to_string(CONFIG_FILE_NAME) {
        Ok(file) => toml::de::from_str(&file).expect("Could not parse config.toml"),
        Err(_) => Config::default(),
    }
});
