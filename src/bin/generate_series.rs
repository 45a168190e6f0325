use anyhow::Result;
use rand_pcg::Mcg128Xsl64;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rust_rnn::data::SyntheticSeries;

const DATA_PATH: &str = "aritificial_timeseries_data.npz";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let mut random = Mcg128Xsl64::new(1);
    let pair = SyntheticSeries::default().generate(&mut random)?;
    pair.save(DATA_PATH)?;
    info!(
        path = DATA_PATH,
        examples = pair.len(),
        sequence_length = pair.sequence_length(),
        "wrote series"
    );
    Ok(())
}
