//! Runtime settings pulled from the environment at startup.

use anyhow::{Context, Result};
use tracing::warn;
use url::Url;

use crate::grid::GridError;

const DEFAULT_API_URL: &str = "http://localhost:3001";
const DEFAULT_ROW_HEIGHT: f64 = 350.0;
const DEFAULT_OVERSCAN: usize = 5;

/// Settings the shell threads through to the service client and the grid.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the aggregator service.
    pub api_url: Url,
    /// Fixed per-row height estimate used by the windower, in pixels.
    pub estimated_row_height: f64,
    /// Extra rows materialized above and below the visible range.
    pub overscan: usize,
}

impl Config {
    /// Reads `FEEDGRID_API_URL`, `FEEDGRID_ROW_HEIGHT` and
    /// `FEEDGRID_OVERSCAN`.
    ///
    /// Unparseable numeric overrides fall back to the defaults with a
    /// warning; values that parse but violate grid invariants (zero or
    /// non-finite row height, negative overscan) are configuration errors.
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("FEEDGRID_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(&api_url)
            .with_context(|| format!("FEEDGRID_API_URL is not a valid URL: {api_url}"))?;

        let estimated_row_height = match env_parsed::<f64>("FEEDGRID_ROW_HEIGHT") {
            Some(height) if height.is_finite() && height > 0.0 => height,
            Some(height) => return Err(GridError::InvalidRowHeight(height).into()),
            None => DEFAULT_ROW_HEIGHT,
        };

        let overscan = match env_parsed::<i64>("FEEDGRID_OVERSCAN") {
            Some(overscan) if overscan >= 0 => overscan as usize,
            Some(overscan) => return Err(GridError::InvalidOverscan(overscan).into()),
            None => DEFAULT_OVERSCAN,
        };

        Ok(Self {
            api_url,
            estimated_row_height,
            overscan,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            estimated_row_height: DEFAULT_ROW_HEIGHT,
            overscan: DEFAULT_OVERSCAN,
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(%name, %raw, "Ignoring unparseable override");
            None
        }
    }
}
