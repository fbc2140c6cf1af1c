use clap::Parser;
use speech_corpus::config::CONFIG;
use speech_corpus::corpus::{build_corpus, CorpusOptions};
use speech_corpus::country::country_folder;

/// Assemble the sentence level corpus of a country from its parsed CSVs.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// The country folder under national/.
    country: String,
    #[clap(short, long)]
    /// For ep, the language of the speeches to use.
    language: Option<String>,
    #[clap(short, long)]
    /// Stop after this many paragraphs. For debugging.
    num_paragraphs: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let options = CorpusOptions{ first_year: CONFIG.corpus_first_year, last_year: CONFIG.corpus_last_year, num_paragraphs: args.num_paragraphs };
    let output = build_corpus(&args.country,args.language.as_deref(),&CONFIG.country_dir(country_folder(&args.country)),&CONFIG.corpus_dir,&options)?;
    println!("Wrote {}",output.display());
    Ok(())
}
