use speech_corpus::config::CONFIG;
use speech_corpus::ep_enrichment::postprocess_ep_speeches;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let written = postprocess_ep_speeches(&CONFIG.country_dir("ep"),CONFIG.first_year..=CONFIG.last_year)?;
    println!("Wrote speeches in {} languages",written.len());
    Ok(())
}
