use std::path::PathBuf;
use clap::Parser;
use speech_corpus::config::CONFIG;
use speech_corpus::legislative_changes::Annotations;
use speech_corpus::legislative_changes::docutoads_input::{create_caselist, write_caselist};

/// Write the articles of every ordinary proposal / final act pair as text, and the caselist DocuToads runs on.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(short, long)]
    /// The CSV telling which documents are amending acts. Defaults to the configured one.
    annotations: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let annotations = Annotations::load(args.annotations.as_ref().unwrap_or(&CONFIG.annotations))?;
    let caselist = create_caselist(&CONFIG.eu_dir(),&annotations,|path|CONFIG.is_eu_excluded(path))?;
    let path = CONFIG.parsed_eu_dir().join("caselist.json");
    write_caselist(&path,&caselist)?;
    println!("Wrote {} cases to {}",caselist.len(),path.display());
    Ok(())
}
