use super::rank::{bottom_n, top_n};
use super::text::{grouped, TextTable};
use super::Insight;
use crate::chart::{Chart, Point};
use crate::config::Thresholds;
use crate::db::{CandidateResult, PartyResult};

/// Which end of the margin ranking to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum End {
    Largest,
    Smallest,
}

impl End {
    fn pick<'a>(self, candidates: &'a [CandidateResult], n: usize) -> Vec<&'a CandidateResult> {
        match self {
            End::Largest => top_n(candidates, n, |c| c.margin),
            End::Smallest => bottom_n(candidates, n, |c| c.margin),
        }
    }

    fn word(self) -> &'static str {
        match self {
            End::Largest => "Top",
            End::Smallest => "Least",
        }
    }
}

/// Extreme winning margins across every loaded candidate.
pub fn margins(candidates: &[CandidateResult], t: &Thresholds, end: End) -> Insight {
    let picked = end.pick(candidates, t.margin_rank);

    let mut table = TextTable::new(&["Winning Candidate", "Party", "Constituency", "Margin"]);
    for c in &picked {
        table.row(vec![
            c.winning_candidate.clone(),
            c.party.clone(),
            c.constituency.clone(),
            c.margin.to_string(),
        ]);
    }

    let name = match end {
        End::Largest => "top_5_candidates_by_margin",
        End::Smallest => "least_5_candidates_by_margin",
    };
    let title = format!("{} {} Candidates by Winning Margin", end.word(), t.margin_rank);

    Insight {
        summary: format!(
            "{} {} candidates by winning margin:\n{}",
            end.word(),
            t.margin_rank,
            table.render()
        ),
        chart: Chart::bar(name, &title, "Margin", &margin_points(&picked)),
    }
}

/// Extreme margins within each of the largest parties, ranked per party.
pub fn margins_by_party(
    parties: &[PartyResult],
    candidates: &[CandidateResult],
    t: &Thresholds,
    end: End,
) -> Insight {
    let leaders = top_n(parties, t.margin_parties, |p| p.total);

    let mut sections = Vec::with_capacity(leaders.len());
    let mut groups = Vec::with_capacity(leaders.len());
    for party in leaders {
        let own: Vec<CandidateResult> = candidates
            .iter()
            .filter(|c| c.party == party.party)
            .cloned()
            .collect();
        let picked = end.pick(&own, t.margin_rank);

        let mut table = TextTable::new(&["Winning Candidate", "Constituency", "Margin"]);
        for c in &picked {
            table.row(vec![
                c.winning_candidate.clone(),
                c.constituency.clone(),
                c.margin.to_string(),
            ]);
        }
        sections.push(format!("\n{}:\n{}", party.party, table.render()));
        groups.push((party.party.clone(), margin_points(&picked)));
    }

    let name = match end {
        End::Largest => "top_5_candidates_by_margin_top_10_parties",
        End::Smallest => "least_5_candidates_by_margin_top_10_parties",
    };
    let heading = format!(
        "{} {} candidates by margin for each top {} party:",
        end.word(),
        t.margin_rank,
        t.margin_parties
    );

    Insight {
        summary: format!("{}{}", heading, sections.join("\n")),
        chart: Chart::faceted_bars(name, heading.trim_end_matches(':'), "Margin", &groups),
    }
}

fn margin_points(picked: &[&CandidateResult]) -> Vec<Point> {
    picked
        .iter()
        .map(|c| Point::new(&c.winning_candidate, c.margin as f64, grouped(c.margin)))
        .collect()
}
