use std::path::PathBuf;
use clap::Parser;
use speech_corpus::config::CONFIG;
use speech_corpus::legislative_changes::edit_triples::parse_docutoads_output;

/// Turn the DocuToads output files into proposal / final act pairs of changed text.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// The folder holding the DocuToads output, one file per procedure.
    data_dir: PathBuf,
    #[clap(short, long)]
    /// Where to write the changes. Defaults to edit_triples/ in the parsed EU data.
    output_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let output_dir = args.output_dir.unwrap_or_else(||CONFIG.parsed_eu_dir().join("edit_triples"));
    let written = parse_docutoads_output(&args.data_dir,&output_dir)?;
    println!("Wrote {} files to {}",written.len(),output_dir.display());
    Ok(())
}
