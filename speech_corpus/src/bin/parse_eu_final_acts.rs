use clap::Parser;
use speech_corpus::config::CONFIG;
use speech_corpus::legislative_changes::eu_documents::parse_final_acts;

/// Split the EU final acts into articles.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(short, long, action)]
    /// Write a CSV per procedure, in the same folder structure as the sources, instead of one CSV.
    preserve_structure: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let count = parse_final_acts(&CONFIG.eu_dir(),&CONFIG.parsed_eu_dir(),args.preserve_structure)?;
    println!("Parsed {} final acts",count);
    Ok(())
}
