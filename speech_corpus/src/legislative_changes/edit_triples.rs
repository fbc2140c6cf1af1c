//! Turn DocuToads output into changes with their context.
//!
//! DocuToads writes one row per token with the edit operation applied to it. A change is taken
//! to be a run of edited tokens between two runs of unchanged ones, so the rows are cut into
//! runs, and every four consecutive runs unchanged, changed, unchanged, changed give one
//! change: the first three runs, once with the words of the proposal and once with the words of
//! the final act.

use std::fs::File;
use std::path::{Path, PathBuf};
use anyhow::Context;
use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize};

const EDIT_OPERATIONS : &[&str] = &["substitution","addition","deletion","transposition"];

/// One token of the DocuToads output.
#[derive(Debug,Clone,Default,PartialEq,Deserialize)]
pub struct EditRow {
    #[serde(rename = "Edit operation", default)]
    pub operation : String,
    #[serde(rename = "Removed or substituted word", default)]
    pub removed : String,
    #[serde(rename = "Word in both texts", default)]
    pub both : String,
    #[serde(rename = "Added or substituted word", default)]
    pub added : String,
}

impl EditRow {
    pub fn is_change(&self) -> bool { EDIT_OPERATIONS.contains(&self.operation.trim()) }
}

/// A change with the unchanged text around it, as it reads in each document.
#[derive(Debug,Clone,PartialEq,Serialize)]
pub struct EditTriple {
    pub proposal : String,
    pub final_act : String,
}

pub fn read_docutoads_output(path:&Path) -> anyhow::Result<Vec<EditRow>> {
    let file = File::open(path).with_context(||format!("Could not open {}",path.display()))?;
    let mut reader = csv::ReaderBuilder::new().delimiter(b';').flexible(true).from_reader(file);
    let mut rows = vec![];
    for row in reader.deserialize() {
        rows.push(row.with_context(||format!("Could not read {}",path.display()))?);
    }
    Ok(rows)
}

/// The index of the first row of each run of changed or unchanged rows, and whether it is changed.
fn run_starts(rows:&[EditRow]) -> Vec<(usize,bool)> {
    let mut res : Vec<(usize,bool)> = vec![];
    for (i,row) in rows.iter().enumerate() {
        let change = row.is_change();
        if res.last().map(|(_,c)|*c!=change).unwrap_or(true) { res.push((i,change)) }
    }
    res
}

fn join_words<'a>(words:impl Iterator<Item=&'a str>) -> String {
    words.map(|w|w.trim()).filter(|w|!w.is_empty()).join(" ")
}

pub fn edit_triples(rows:&[EditRow]) -> Vec<EditTriple> {
    let starts = run_starts(rows);
    let mut res = vec![];
    for window in starts.windows(4) {
        if window.iter().map(|(_,c)|*c).collect::<Vec<_>>()!=[false,true,false,true] { continue }
        let (c0,c1,c2,c3) = (window[0].0,window[1].0,window[2].0,window[3].0);
        let before = join_words(rows[c0..c1].iter().map(|r|r.both.as_str()));
        let old = join_words(rows[c1..c2].iter().map(|r|r.removed.as_str()));
        let new = join_words(rows[c1..c2].iter().map(|r|r.added.as_str()));
        let after = join_words(rows[c2..c3].iter().map(|r|r.both.as_str()));
        res.push(EditTriple{
            proposal: join_words([before.as_str(),old.as_str(),after.as_str()].into_iter()),
            final_act: join_words([before.as_str(),new.as_str(),after.as_str()].into_iter()),
        });
    }
    res
}

/// The output file for a DocuToads output: named after the procedure, which the first 13 characters of its name are.
pub fn output_file_name(input:&Path) -> String {
    let stem = input.file_stem().map(|s|s.to_string_lossy().to_string()).unwrap_or_default();
    format!("{}.csv",stem.chars().take(13).collect::<String>())
}

pub fn write_triples(path:&Path,triples:&[EditTriple]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(File::create(path).with_context(||format!("Could not create {}",path.display()))?);
    for triple in triples { writer.serialize(triple)?; }
    if triples.is_empty() { writer.write_record(["proposal","final_act"])?; }
    writer.flush()?;
    Ok(())
}

/// Process every file in `data_dir`, writing the changes into `output_dir`.
pub fn parse_docutoads_output(data_dir:&Path,output_dir:&Path) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir).with_context(||format!("Could not create {}",output_dir.display()))?;
    let mut inputs : Vec<PathBuf> = std::fs::read_dir(data_dir).with_context(||format!("Could not read directory {}",data_dir.display()))?
        .map(|e|e.map(|e|e.path())).collect::<Result<_,_>>()?;
    inputs.retain(|p|p.is_file());
    inputs.sort();
    let mut written = vec![];
    for input in inputs {
        let triples = edit_triples(&read_docutoads_output(&input)?);
        let output = output_dir.join(output_file_name(&input));
        write_triples(&output,&triples)?;
        info!("{} changes in {}",triples.len(),input.display());
        written.push(output);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(operation:&str,removed:&str,both:&str,added:&str) -> EditRow {
        EditRow{ operation: operation.to_string(), removed: removed.to_string(), both: both.to_string(), added: added.to_string() }
    }

    fn example() -> Vec<EditRow> {
        vec![
            row("","","The",""),
            row("","","cat",""),
            row("substitution","sat","","stood"),
            row("deletion","quietly","",""),
            row("","","on",""),
            row("","","the",""),
            row("addition","","","big"),
            row("addition","","","mat"),
        ]
    }

    #[test]
    fn test_run_starts() {
        assert_eq!(vec![(0,false),(2,true),(4,false),(6,true)],run_starts(&example()));
    }

    #[test]
    fn test_edit_triples() {
        assert_eq!(vec![EditTriple{ proposal: "The cat sat quietly on the".to_string(), final_act: "The cat stood on the".to_string() }],edit_triples(&example()));
        assert!(edit_triples(&example()[2..]).is_empty());
    }

    #[test]
    fn test_parse_output_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("20160280(COD)_docutoads.csv"),"Edit operation;Removed or substituted word;Word in both texts;Added or substituted word\n;;The;\n;;cat;\nsubstitution;sat;;stood\n;;on;\nsubstitution;mat;;rug\n").unwrap();
        let written = parse_docutoads_output(&input,&dir.path().join("out")).unwrap();
        assert_eq!(vec![dir.path().join("out").join("20160280(COD).csv")],written);
        assert_eq!("proposal,final_act\nThe cat sat on,The cat stood on\n",std::fs::read_to_string(&written[0]).unwrap());
    }
}
