use std::path::PathBuf;
use clap::Parser;
use speech_corpus::config::CONFIG;
use speech_corpus::legislative_changes::{Annotations, DocType};
use speech_corpus::legislative_changes::nested_changes::parse_nested_structure;

/// Extract the changes listed in EU documents that amend other acts.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// One of full_final_act_1, full_legislative_proposal_1.
    doc_name: DocType,
    #[clap(short, long)]
    /// The CSV telling which documents are amending acts. Defaults to the configured one.
    annotations: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let annotations = Annotations::load(args.annotations.as_ref().unwrap_or(&CONFIG.annotations))?;
    let path = parse_nested_structure(&CONFIG.eu_dir(),&annotations,args.doc_name,&CONFIG.parsed_eu_dir())?;
    println!("Wrote {}",path.display());
    Ok(())
}
