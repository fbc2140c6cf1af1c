use clap::Parser;
use speech_corpus::config::CONFIG;
use speech_corpus::country::{country_config, country_folder};
use speech_corpus::fetch::fetch_source_document;

/// Download one sitting into national/<country>/<year>/source, keeping it only if it can be parsed.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    country: String,
    year: i32,
    url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let country = country_config(&args.country)?;
    let fetched = fetch_source_document(country,&CONFIG.country_dir(country_folder(country.name)),args.year,&args.url).await?;
    println!("Stored {} ({} rows)",fetched.path.display(),fetched.rows);
    Ok(())
}
