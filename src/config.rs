use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "eci_results";
const ENV_PREFIX: &str = "ECI";

const DEFAULT_BASE_URL: &str = "https://results.eci.gov.in/PcResultGenJune2024/";
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Run-wide settings. Defaults reproduce the hardcoded values of the
/// June 2024 results site; file and `ECI_*` env sources override them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub index_page: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub party_table: String,
    pub candidate_table: String,
    pub out_dir: PathBuf,
    pub report_file: String,
    pub db_path: PathBuf,
    pub analysis: Thresholds,
}

/// Cut-offs used by the aggregation pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Parties below this share of seats are folded into "Others".
    pub others_share: f64,
    /// Parties strictly above this share of seats count as relevant.
    pub major_share: f64,
    /// Parties with strictly more seats than this are "large".
    pub large_party_seats: u64,
    pub top_parties: usize,
    pub dominance_windows: Vec<usize>,
    pub margin_rank: usize,
    /// How many of the biggest parties get a per-party margin breakdown.
    pub margin_parties: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            base_url: DEFAULT_BASE_URL.to_string(),
            index_page: "index.htm".to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            party_table: "table.table".to_string(),
            candidate_table: "table.table-striped".to_string(),
            out_dir: PathBuf::from("."),
            report_file: "election_insights.txt".to_string(),
            db_path: PathBuf::from("data/eci_results.sqlite"),
            analysis: Thresholds::default(),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            others_share: 0.01,
            major_share: 0.05,
            large_party_seats: 10,
            top_parties: 5,
            dominance_windows: vec![5, 10],
            margin_rank: 5,
            margin_parties: 10,
        }
    }
}

impl Settings {
    /// Layer defaults, `eci_results.toml` (optional) and `ECI_*` variables.
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("analysis.dominance_windows")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read settings")?;

        settings
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn index_url(&self) -> String {
        format!("{}{}", self.base_url, self.index_page)
    }

    /// Point the run at a different index page; its directory becomes the base.
    pub fn set_index_url(&mut self, url: &str) {
        match url.rfind('/') {
            Some(pos) => {
                self.base_url = url[..=pos].to_string();
                self.index_page = url[pos + 1..].to_string();
            }
            None => self.index_page = url.to_string(),
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.out_dir.join(&self.report_file)
    }
}
