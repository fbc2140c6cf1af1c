//! Turn the parsed European Parliament sittings into one file of speeches per language, adding
//! the political group and name of members where the verbatim reports lack them.
//!
//! Group membership comes from `meta_data/MEPsBio.csv` (one row per membership of a member in
//! some body, dates as `dd/mm/yyyy`, `...` for memberships that had not ended) and, for the 2019
//! term, from the lists of members in `meta_data/MEPs_2019.xml` and `meta_data/MEPs_2019_outgoing.xml`.
//! Older speeches of the Talk of Europe project are put in front of our own where available.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};
use anyhow::Context;
use chrono::NaiveDate;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use crate::normalize::title_case;
use crate::parse_util::open_csv;
use roxmltree::Node;
use crate::xml_util::{with_xml_file, NodeExt};

/// Used for memberships that had not ended, and for the end of the 2019 lists.
const END_OF_PERIOD : (i32,u32,u32) = (2019,12,31);
/// When the members of the 2019 list took their seats, unless the list says otherwise.
const START_OF_2019_TERM : (i32,u32,u32) = (2019,7,2);

static SPEAKER_WITH_ARTICLE : Lazy<Regex> = Lazy::new(||Regex::new(r"^(La|Le|El|Il|Der|Die)\s").unwrap());

/// The short names of the political groups, by the names used in the member data.
const GROUP_ABBREVIATIONS : &[(&str,&str)] = &[
    ("Group of the European People's Party (Christian Democrats)","EPP"),
    ("Group of the European People's Party (Christian Democrats) and European Democrats","EPP"),
    ("Group of the Alliance of Liberals and Democrats for Europe","ALDE"),
    ("Group of the Progressive Alliance of Socialists and Democrats in the European Parliament","S&D"),
    ("Socialist Group in the European Parliament","S&D"),
    ("European Conservatives and Reformists Group","ECR"),
    ("Group of the Greens/European Free Alliance","Greens/EFA"),
    ("Group of the European United Left - Nordic Green Left","GUE/NGL"),
    ("Confederal Group of the European United Left - Nordic Green Left","GUE/NGL"),
    ("The Left group in the European Parliament - GUE/NGL","GUE/NGL"),
    ("Non-attached Members","NI"),
    ("Europe of Freedom and Direct Democracy Group","EFDD"),
    ("Europe of freedom and democracy Group","EFD"),
    ("Europe of Nations and Freedom Group","ENF"),
    ("Renew Europe Group","Renew"),
    ("Identity and Democracy Group","ID"),
    ("Union for Europe of the Nations Group","UEN"),
    ("Independence/Democracy Group","IND/DEM"),
];

pub fn abbreviate_group(name:&str) -> &str {
    let name = name.trim();
    GROUP_ABBREVIATIONS.iter().find(|(full,_)|*full==name).map(|(_,short)|*short).unwrap_or(name)
}

fn date(ymd:(i32,u32,u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(ymd.0,ymd.1,ymd.2).unwrap_or_default()
}

/// Ids are sometimes written as floats (`96766.0`) by other tools.
fn normalize_mep_id(id:&str) -> &str {
    let id = id.trim();
    id.strip_suffix(".0").unwrap_or(id)
}

/// A period during which a member belonged to a political group.
#[derive(Debug,Clone,PartialEq)]
pub struct GroupMembership {
    pub mep_id : String,
    pub name : String,
    /// Abbreviated.
    pub group : String,
    pub joined : NaiveDate,
    pub left : NaiveDate,
}

fn parse_day_first(s:&str,default:NaiveDate) -> anyhow::Result<NaiveDate> {
    let s = s.trim();
    if s.is_empty() || s=="..." { return Ok(default) }
    NaiveDate::parse_from_str(s,"%d/%m/%Y").with_context(||format!("Could not parse date {}",s))
}

/// The `Parliament Group` memberships in MEPsBio.csv.
pub fn load_meps_bio(path:&Path) -> anyhow::Result<Vec<GroupMembership>> {
    let mut reader = open_csv(path)?;
    let columns : HashMap<String,usize> = reader.headers()?.iter().enumerate().map(|(i,h)|(h.to_string(),i)).collect();
    let mut res = vec![];
    for row in reader.records() {
        let row = row?;
        let get = |name:&str|columns.get(name).and_then(|&i|row.get(i)).unwrap_or("").to_string();
        if get("type")!="Parliament Group" { continue }
        res.push(GroupMembership{
            mep_id: normalize_mep_id(&get("id")).to_string(),
            name: get("name"),
            group: abbreviate_group(&get("inst")).to_string(),
            joined: parse_day_first(&get("joined"),date(START_OF_2019_TERM))?,
            left: parse_day_first(&get("left"),date(END_OF_PERIOD))?,
        });
    }
    Ok(res)
}

/// The `<mep>` entries of a list of members (`fullName`, `id`, `politicalGroup`, optionally `mandate-start` and `mandate-end`).
pub fn memberships_from_mep_list(root:Node) -> anyhow::Result<Vec<GroupMembership>> {
    let mut res = vec![];
    for mep in root.descendants_named("mep") {
        let get = |name:&str|mep.child(name).map(|e|e.all_text().trim().to_string()).unwrap_or_default();
        res.push(GroupMembership{
            mep_id: normalize_mep_id(&get("id")).to_string(),
            name: get("fullName"),
            group: abbreviate_group(&get("politicalGroup")).to_string(),
            joined: parse_day_first(&get("mandate-start"),date(START_OF_2019_TERM))?,
            left: parse_day_first(&get("mandate-end"),date(END_OF_PERIOD))?,
        });
    }
    Ok(res)
}

/// All the known group memberships, most recently joined first.
pub struct MepDirectory {
    memberships : Vec<GroupMembership>,
}

impl MepDirectory {
    pub fn new(mut memberships:Vec<GroupMembership>) -> Self {
        memberships.sort_by(|a,b|b.joined.cmp(&a.joined));
        MepDirectory{ memberships }
    }

    pub fn load(meta_data_dir:&Path) -> anyhow::Result<Self> {
        let mut memberships = load_meps_bio(&meta_data_dir.join("MEPsBio.csv"))?;
        for file in ["MEPs_2019.xml","MEPs_2019_outgoing.xml"] {
            let path = meta_data_dir.join(file);
            if path.is_file() { memberships.extend(with_xml_file(&path,memberships_from_mep_list)?) } else { warn!("No list of members {}",path.display()) }
        }
        Ok(MepDirectory::new(memberships))
    }

    /// The group the member belonged to on the given day.
    pub fn group_at(&self,mep_id:&str,on:NaiveDate) -> Option<&str> {
        let mep_id = normalize_mep_id(mep_id);
        self.memberships.iter().find(|m|m.mep_id==mep_id && m.joined<=on && on<=m.left).map(|m|m.group.as_str())
    }

    pub fn name_of(&self,mep_id:&str) -> Option<&str> {
        let mep_id = normalize_mep_id(mep_id);
        self.memberships.iter().find(|m|m.mep_id==mep_id).map(|m|m.name.as_str())
    }
}

/// Rows of CSV files with possibly different columns.
#[derive(Debug,Default)]
pub struct CsvTable {
    /// In order of first appearance.
    pub fieldnames : Vec<String>,
    pub rows : Vec<HashMap<String,String>>,
}

impl CsvTable {
    pub fn append_file(&mut self,path:&Path) -> anyhow::Result<()> {
        let mut reader = open_csv(path)?;
        let headers : Vec<String> = reader.headers()?.iter().map(|h|h.to_string()).collect();
        for h in &headers {
            if !self.fieldnames.contains(h) { self.fieldnames.push(h.clone()) }
        }
        for row in reader.records() {
            let row = row.with_context(||format!("Could not read {}",path.display()))?;
            self.rows.push(headers.iter().cloned().zip(row.iter().map(|v|v.to_string())).collect());
        }
        Ok(())
    }

    pub fn add_fieldnames(&mut self,fieldnames:&[String]) {
        for f in fieldnames {
            if !self.fieldnames.contains(f) { self.fieldnames.push(f.clone()) }
        }
    }

    pub fn write(&self,path:&Path) -> anyhow::Result<()> {
        let mut writer = csv::Writer::from_writer(File::create(path).with_context(||format!("Could not create {}",path.display()))?);
        writer.write_record(&self.fieldnames)?;
        for row in &self.rows {
            writer.write_record(self.fieldnames.iter().map(|f|row.get(f).map(|v|v.as_str()).unwrap_or("")))?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn field<'a>(row:&'a HashMap<String,String>,name:&str) -> &'a str {
    row.get(name).map(|v|v.as_str()).unwrap_or("")
}

/// Whether the speaker column should be replaced by the name from the member data.
fn needs_name(row:&HashMap<String,String>) -> bool {
    let speaker = field(row,"speaker");
    speaker.trim().is_empty() || !speaker.contains(' ') || SPEAKER_WITH_ARTICLE.is_match(speaker) || matches!(field(row,"language"),"bg"|"el")
}

/// Fill in the group and name of members where missing.
pub fn enrich_row(row:&mut HashMap<String,String>,directory:&MepDirectory) {
    let mep_id = field(row,"mep_id").to_string();
    if normalize_mep_id(&mep_id).trim_start_matches('0').is_empty() { return }
    if field(row,"party").trim().is_empty() {
        if let Ok(on) = NaiveDate::parse_from_str(field(row,"date"),"%Y-%m-%d") {
            if let Some(group) = directory.group_at(&mep_id,on) { row.insert("party".to_string(),group.to_string()); }
        }
    }
    if needs_name(row) {
        if let Some(name) = directory.name_of(&mep_id) { row.insert("speaker".to_string(),title_case(name)); }
    }
}

/// Group the speeches of the given years by language and write `ep_speeches_2009_2019_<language>.csv`
/// for each into `ep_dir`. Returns the files written.
pub fn postprocess_ep_speeches(ep_dir:&Path,years:impl IntoIterator<Item=i32>) -> anyhow::Result<Vec<PathBuf>> {
    let mut speeches = CsvTable::default();
    for year in years {
        let year_dir = ep_dir.join(year.to_string());
        if !year_dir.is_dir() { continue }
        let mut files : Vec<PathBuf> = glob::glob(&year_dir.join("*.csv").to_string_lossy())?.collect::<Result<_,_>>()?;
        files.sort();
        for file in files { speeches.append_file(&file)?; }
    }
    info!("Read {} speech paragraphs",speeches.rows.len());
    let directory = MepDirectory::load(&ep_dir.join("meta_data"))?;
    let mut by_language : BTreeMap<String,Vec<HashMap<String,String>>> = BTreeMap::new();
    for row in speeches.rows {
        let language = match field(&row,"language").trim() { "" => "und".to_string(), l => l.to_string() };
        by_language.entry(language).or_default().push(row);
    }
    let mut written = vec![];
    for (language,rows) in by_language {
        let mut table = CsvTable::default();
        let talk_of_europe = ep_dir.join("talk_of_europe").join(format!("talk_of_europe_2009_2017_{}.csv",language));
        if talk_of_europe.is_file() { table.append_file(&talk_of_europe)? } else { warn!("No Talk of Europe speeches for {}",language) }
        table.add_fieldnames(&speeches.fieldnames);
        table.rows.extend(rows);
        for row in table.rows.iter_mut() { enrich_row(row,&directory); }
        let path = ep_dir.join(format!("ep_speeches_2009_2019_{}.csv",language));
        table.write(&path)?;
        info!("Wrote {} rows to {}",table.rows.len(),path.display());
        written.push(path);
    }
    Ok(written)
}
