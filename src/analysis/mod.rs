pub mod candidates;
pub mod parties;
pub mod rank;
pub mod text;

use rayon::prelude::*;
use tracing::info;

use crate::chart::Chart;
use crate::config::Thresholds;
use crate::db::{CandidateResult, PartyResult};
use candidates::End;

/// Output of one analysis: the text block for the report and its chart.
#[derive(Debug, Clone)]
pub struct Insight {
    pub summary: String,
    pub chart: Chart,
}

/// The two scraped tables, read-only for the whole pipeline.
#[derive(Clone, Copy)]
pub struct Tables<'a> {
    pub parties: &'a [PartyResult],
    pub candidates: &'a [CandidateResult],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analysis {
    TopParties,
    SeatShare,
    SingleSeat,
    Dominance,
    PartyCount,
    MajorParties,
    LargeParties,
    TopMargins,
    TopMarginsByParty,
    LeastMargins,
    LeastMarginsByParty,
}

impl Analysis {
    /// Report order.
    pub const ALL: [Analysis; 11] = [
        Analysis::TopParties,
        Analysis::SeatShare,
        Analysis::SingleSeat,
        Analysis::Dominance,
        Analysis::PartyCount,
        Analysis::MajorParties,
        Analysis::LargeParties,
        Analysis::TopMargins,
        Analysis::TopMarginsByParty,
        Analysis::LeastMargins,
        Analysis::LeastMarginsByParty,
    ];

    pub fn needs_candidates(self) -> bool {
        matches!(
            self,
            Analysis::TopMargins
                | Analysis::TopMarginsByParty
                | Analysis::LeastMargins
                | Analysis::LeastMarginsByParty
        )
    }

    pub fn run(self, tables: Tables, t: &Thresholds) -> Insight {
        let Tables { parties: p, candidates: c } = tables;
        match self {
            Analysis::TopParties => parties::top_parties(p, t),
            Analysis::SeatShare => parties::seat_share(p, t),
            Analysis::SingleSeat => parties::single_seat(p, t),
            Analysis::Dominance => parties::dominance(p, t),
            Analysis::PartyCount => parties::party_count(p, t),
            Analysis::MajorParties => parties::major_parties(p, t),
            Analysis::LargeParties => parties::large_parties(p, t),
            Analysis::TopMargins => candidates::margins(c, t, End::Largest),
            Analysis::TopMarginsByParty => candidates::margins_by_party(p, c, t, End::Largest),
            Analysis::LeastMargins => candidates::margins(c, t, End::Smallest),
            Analysis::LeastMarginsByParty => candidates::margins_by_party(p, c, t, End::Smallest),
        }
    }
}

/// Run every applicable analysis. Candidate analyses are left out entirely
/// when no candidate rows were loaded. Output is in [`Analysis::ALL`] order.
pub fn run_all(tables: Tables, t: &Thresholds) -> Vec<Insight> {
    let with_candidates = !tables.candidates.is_empty();
    if !with_candidates {
        info!("No candidate rows; skipping candidate analyses");
    }

    Analysis::ALL
        .as_slice()
        .par_iter()
        .filter(|a| with_candidates || !a.needs_candidates())
        .map(|a| a.run(tables, t))
        .collect()
}
