use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Settings;
use crate::db::{CandidateResult, PageRow, PartyResult};
use crate::fetch::{join_url, FetchError, PageSource};
use crate::parser::{extract, CandidateShape, ExtractError, PartyShape};

/// Why a party's candidate page contributed no rows.
#[derive(Debug, Error)]
pub enum EmptyReason {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("candidate table not found")]
    TableNotFound,
    #[error(transparent)]
    Parse(ExtractError),
    #[error("no rows in candidate table")]
    NoRows,
}

impl From<ExtractError> for EmptyReason {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::TableNotFound(_) => EmptyReason::TableNotFound,
            other => EmptyReason::Parse(other),
        }
    }
}

/// Result of reading one party's page. Never aborts the run.
#[derive(Debug)]
pub enum PartyPage {
    Loaded(Vec<CandidateResult>),
    Empty(EmptyReason),
}

/// Everything the candidate tier produced: the merged table plus one
/// outcome per party, in party order.
pub struct CandidateLoad {
    pub candidates: Vec<CandidateResult>,
    pub pages: Vec<PageRow>,
}

impl CandidateLoad {
    pub fn loaded(&self) -> usize {
        self.pages.iter().filter(|p| p.loaded).count()
    }

    pub fn empty(&self) -> usize {
        self.pages.len() - self.loaded()
    }
}

/// Fetch and parse the party-wise summary. Any failure here is fatal.
pub async fn load_parties<S: PageSource>(source: &S, settings: &Settings) -> Result<Vec<PartyResult>> {
    let url = settings.index_url();
    info!("Fetching party summary: {}", url);

    let markup = source
        .fetch(&url)
        .await
        .with_context(|| format!("Failed to fetch data from {}", url))?;
    let parties = extract(&markup, &settings.party_table, &PartyShape)
        .with_context(|| format!("Could not read the results table on {}", url))?;

    info!("Parties in summary: {}", parties.len());
    Ok(parties)
}

/// Fetch one party's winners page and tag every row with the party name.
pub async fn load_candidates<S: PageSource>(
    source: &S,
    settings: &Settings,
    party: &PartyResult,
) -> PartyPage {
    let url = match join_url(&settings.base_url, &party.link) {
        Ok(url) => url,
        Err(e) => return PartyPage::Empty(e.into()),
    };
    info!(party = %party.party, url = %url, "Scraping candidate data");

    let markup = match source.fetch(&url).await {
        Ok(markup) => markup,
        Err(e) => return PartyPage::Empty(e.into()),
    };

    let shape = CandidateShape { party: &party.party };
    match extract(&markup, &settings.candidate_table, &shape) {
        Ok(rows) if rows.is_empty() => PartyPage::Empty(EmptyReason::NoRows),
        Ok(rows) => PartyPage::Loaded(rows),
        Err(e) => PartyPage::Empty(e.into()),
    }
}

/// Load every party's page, one request at a time.
pub async fn load_all_candidates<S: PageSource>(
    source: &S,
    settings: &Settings,
    parties: &[PartyResult],
) -> CandidateLoad {
    let pb = ProgressBar::new(parties.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=> "));
    }

    let mut candidates = Vec::new();
    let mut pages = Vec::with_capacity(parties.len());

    for party in parties {
        pb.set_message(party.party.clone());
        let page = match load_candidates(source, settings, party).await {
            PartyPage::Loaded(rows) => {
                let row = PageRow {
                    party: party.party.clone(),
                    loaded: true,
                    reason: None,
                    rows: rows.len(),
                };
                candidates.extend(rows);
                row
            }
            PartyPage::Empty(reason) => {
                warn!(party = %party.party, reason = %reason, "No data found for party");
                PageRow {
                    party: party.party.clone(),
                    loaded: false,
                    reason: Some(reason.to_string()),
                    rows: 0,
                }
            }
        };
        pages.push(page);
        pb.inc(1);
    }

    pb.finish_and_clear();
    let load = CandidateLoad { candidates, pages };
    info!(
        "Candidate pages: {} loaded, {} empty ({} candidates)",
        load.loaded(),
        load.empty(),
        load.candidates.len()
    );
    load
}
