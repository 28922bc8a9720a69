//! Loader selection for the runner.
//!
//! Maps the `[data]` config section to a concrete `PriceLoader`. The `auto`
//! source implements the fallback policy:
//! 1. CSV file under the data directory → use it
//! 2. Otherwise → Yahoo Finance
//! 3. Otherwise → synthetic random walk (logged as a warning)
//!
//! Synthetic data is a developer/offline mode only.

use signallab_core::data::{
    CsvLoader, DataError, FallbackLoader, PriceLoader, SyntheticLoader, YahooLoader,
};
use tracing::warn;

use crate::config::{DataConfig, DataSource};

/// Build the loader described by `data`.
pub fn build_loader(data: &DataConfig) -> Result<Box<dyn PriceLoader>, DataError> {
    match data.source {
        DataSource::Csv => Ok(Box::new(CsvLoader::new(&data.dir))),
        DataSource::Yahoo => Ok(Box::new(YahooLoader::new()?)),
        DataSource::Synthetic => {
            warn!("using synthetic prices; results do not reflect any real market");
            Ok(Box::new(SyntheticLoader::new()))
        }
        DataSource::Auto => {
            let mut chain: Vec<Box<dyn PriceLoader>> = vec![Box::new(CsvLoader::new(&data.dir))];
            match YahooLoader::new() {
                Ok(yahoo) => chain.push(Box::new(yahoo)),
                Err(e) => warn!(error = %e, "yahoo loader unavailable, skipping"),
            }
            chain.push(Box::new(SyntheticLoader::new()));
            Ok(Box::new(FallbackLoader::new(chain)))
        }
    }
}
