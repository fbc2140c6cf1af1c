use clap::Parser;
use speech_corpus::config::CONFIG;
use speech_corpus::country::{country_config, country_folder};
use speech_corpus::parse_national::parse_country;

/// Parse the source documents of a national parliament into one CSV per document.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// The country folder under national/, e.g. germany or ep.
    country: String,
    #[clap(short, long)]
    /// Only parse this year. By default all the configured years are parsed.
    year: Option<i32>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let country = country_config(&args.country)?;
    let years = match args.year {
        Some(year) => year..=year,
        None => CONFIG.first_year..=CONFIG.last_year,
    };
    let summary = parse_country(country,&CONFIG.country_dir(country_folder(country.name)),years)?;
    println!("Parsed {} documents, {} failed",summary.parsed,summary.failed);
    Ok(())
}
