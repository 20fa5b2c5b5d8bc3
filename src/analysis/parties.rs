use super::rank::{grand_total, ratio, top_n};
use super::text::{percent, threshold_label, TextTable};
use super::Insight;
use crate::chart::{Chart, Point};
use crate::config::Thresholds;
use crate::db::PartyResult;

pub fn top_parties(parties: &[PartyResult], t: &Thresholds) -> Insight {
    let total = grand_total(parties);
    let top = top_n(parties, t.top_parties, |p| p.total);

    let mut table = TextTable::new(&["Party", "Total", "Percentage"]);
    let mut points = Vec::with_capacity(top.len());
    for p in top {
        let pct = ratio(p.total, total) * 100.0;
        table.row(vec![p.party.clone(), p.total.to_string(), format!("{:.2}", pct)]);
        points.push(Point::new(&p.party, pct, format!("{:.1}%", pct)));
    }

    Insight {
        summary: format!("Top {} parties analysis:\n{}", t.top_parties, table.render()),
        chart: Chart::bar(
            "top_5_parties_analysis",
            &format!("Top {} Parties Analysis", t.top_parties),
            "Percentage of Total Seats",
            &points,
        ),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShareRow {
    pub party: String,
    pub share: f64,
}

/// Each party's fraction of all seats, with everything under `others_share`
/// folded into a trailing "Others" row.
pub fn seat_shares(parties: &[PartyResult], others_share: f64) -> Vec<ShareRow> {
    let total = grand_total(parties);
    let mut rows = Vec::with_capacity(parties.len());
    let mut others = 0.0;
    let mut merged = 0usize;

    for p in parties {
        let share = ratio(p.total, total);
        if share < others_share {
            others += share;
            merged += 1;
        } else {
            rows.push(ShareRow {
                party: p.party.clone(),
                share,
            });
        }
    }
    if merged > 0 {
        rows.push(ShareRow {
            party: "Others".to_string(),
            share: others,
        });
    }
    rows
}

pub fn seat_share(parties: &[PartyResult], t: &Thresholds) -> Insight {
    let rows = seat_shares(parties, t.others_share);

    let mut table = TextTable::new(&["Party", "Seat Share"]);
    for r in &rows {
        table.row(vec![r.party.clone(), format!("{:.4}", r.share)]);
    }
    let points: Vec<Point> = rows
        .iter()
        .map(|r| Point::new(&r.party, r.share, format!("{:.1}%", r.share * 100.0)))
        .collect();

    Insight {
        summary: format!("Seat Share Analysis:\n{}", table.render()),
        chart: Chart::pie("seat_share_analysis", "Seat Share Analysis", &points),
    }
}

pub fn single_seat(parties: &[PartyResult], _t: &Thresholds) -> Insight {
    let single: Vec<&PartyResult> = parties.iter().filter(|p| p.total == 1).collect();

    let names = if single.is_empty() {
        "(none)".to_string()
    } else {
        single.iter().map(|p| p.party.as_str()).collect::<Vec<_>>().join("\n")
    };
    let points: Vec<Point> = single
        .iter()
        .map(|p| Point::new(&p.party, p.total as f64, p.total.to_string()))
        .collect();

    Insight {
        summary: format!("Number of single-seat parties: {}\n{}", single.len(), names),
        chart: Chart::bar("single_seat_parties", "Single-Seat Parties", "Number of Seats", &points)
            .with_y_domain(0.0, 1.2),
    }
}

/// Share of all seats held by the `window` largest parties.
pub fn dominance_ratio(parties: &[PartyResult], window: usize) -> f64 {
    let held: u64 = top_n(parties, window, |p| p.total)
        .iter()
        .map(|p| p.total)
        .sum();
    ratio(held, grand_total(parties))
}

pub fn dominance(parties: &[PartyResult], t: &Thresholds) -> Insight {
    let mut lines = vec!["Dominance of top parties:".to_string()];
    let mut points = Vec::with_capacity(t.dominance_windows.len());
    for &window in &t.dominance_windows {
        let share = dominance_ratio(parties, window);
        lines.push(format!("Top {} parties hold {} of seats", window, percent(share)));
        points.push(Point::new(format!("Top {} Parties", window), share, percent(share)));
    }

    Insight {
        summary: lines.join("\n"),
        chart: Chart::bar(
            "dominance_of_top_parties",
            "Dominance of Top Parties",
            "Share of Total Seats",
            &points,
        )
        .with_y_domain(0.0, 1.0),
    }
}

pub fn party_count(parties: &[PartyResult], _t: &Thresholds) -> Insight {
    let n = parties.len();
    Insight {
        summary: format!("Total number of parties: {}", n),
        chart: Chart::bar(
            "total_number_of_parties",
            "Total Number of Parties",
            "Parties",
            &[Point::new("Total Parties", n as f64, n.to_string())],
        ),
    }
}

pub fn major_parties(parties: &[PartyResult], t: &Thresholds) -> Insight {
    let cutoff = grand_total(parties) as f64 * t.major_share;
    let relevant: Vec<&PartyResult> = parties
        .iter()
        .filter(|p| p.total as f64 > cutoff)
        .collect();
    let label = threshold_label(t.major_share);

    Insight {
        summary: format!(
            "Number of relevant parties (>{}% of seats): {}\n{}",
            label,
            relevant.len(),
            seats_table(&relevant)
        ),
        chart: Chart::bar(
            "parties_with_minimum_5percent_seats",
            &format!("Parties with More than {}% of Seats", label),
            "Number of Seats",
            &seat_points(&relevant),
        ),
    }
}

pub fn large_parties(parties: &[PartyResult], t: &Thresholds) -> Insight {
    let large: Vec<&PartyResult> = parties
        .iter()
        .filter(|p| p.total > t.large_party_seats)
        .collect();

    Insight {
        summary: format!(
            "Parties with more than {} seats:\n{}",
            t.large_party_seats,
            seats_table(&large)
        ),
        chart: Chart::bar(
            "parties_with_more_than_10_seats",
            &format!("Parties with More Than {} Seats", t.large_party_seats),
            "Number of Seats",
            &seat_points(&large),
        ),
    }
}

fn seats_table(parties: &[&PartyResult]) -> String {
    let mut table = TextTable::new(&["Party", "Total"]);
    for p in parties {
        table.row(vec![p.party.clone(), p.total.to_string()]);
    }
    table.render()
}

fn seat_points(parties: &[&PartyResult]) -> Vec<Point> {
    parties
        .iter()
        .map(|p| Point::new(&p.party, p.total as f64, p.total.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parties(spec: &[(&str, u64)]) -> Vec<PartyResult> {
        spec.iter()
            .map(|&(name, total)| PartyResult {
                party: name.to_string(),
                won: total,
                leading: 0,
                total,
                link: format!("{}.htm", name),
            })
            .collect()
    }

    fn example() -> Vec<PartyResult> {
        parties(&[("A", 300), ("B", 240), ("C", 50), ("D", 10), ("E", 5), ("F", 1)])
    }

    fn names(summary: &str) -> Vec<&str> {
        summary.lines().skip(2).map(|l| l.split_whitespace().next().unwrap()).collect()
    }

    #[test]
    fn dominance_example() {
        let ps = example();
        assert!((dominance_ratio(&ps, 5) - 605.0 / 606.0).abs() < 1e-12);
        assert_eq!(dominance_ratio(&ps, 10), 1.0);

        let insight = dominance(&ps, &Thresholds::default());
        assert_eq!(
            insight.summary,
            "Dominance of top parties:\nTop 5 parties hold 99.83% of seats\nTop 10 parties hold 100.00% of seats"
        );
    }

    #[test]
    fn top_five_never_exceeds_top_ten() {
        let many: Vec<(String, u64)> = (0..15).map(|i| (format!("P{}", i), (i * 7 % 11 + 1) as u64)).collect();
        let spec: Vec<(&str, u64)> = many.iter().map(|(n, t)| (n.as_str(), *t)).collect();
        let ps = parties(&spec);
        assert!(dominance_ratio(&ps, 5) <= dominance_ratio(&ps, 10));
    }

    #[test]
    fn single_and_large_filters() {
        let ps = example();
        let t = Thresholds::default();

        let single = single_seat(&ps, &t);
        assert_eq!(single.summary, "Number of single-seat parties: 1\nF");

        let large = large_parties(&ps, &t);
        assert_eq!(names(&large.summary), ["A", "B", "C"]);
        assert!(!names(&large.summary).contains(&"F"));
    }

    #[test]
    fn no_single_seat_parties() {
        let ps = parties(&[("A", 3)]);
        let single = single_seat(&ps, &Thresholds::default());
        assert_eq!(single.summary, "Number of single-seat parties: 0\n(none)");
    }

    #[test]
    fn relevant_parties_use_strict_cutoff() {
        // 5% of 200 is exactly 10: D is not strictly above it.
        let ps = parties(&[("A", 120), ("B", 60), ("C", 10), ("D", 10)]);
        let insight = major_parties(&ps, &Thresholds::default());
        assert!(insight
            .summary
            .starts_with("Number of relevant parties (>5% of seats): 2\n"));
        assert_eq!(names(&insight.summary), ["A", "B"]);
    }

    #[test]
    fn top_parties_table() {
        let ps = example();
        let insight = top_parties(&ps, &Thresholds::default());
        let lines: Vec<&str> = insight.summary.lines().collect();
        assert_eq!(lines[0], "Top 5 parties analysis:");
        assert_eq!(lines.len(), 2 + 5);
        assert_eq!(lines[2].split_whitespace().collect::<Vec<_>>(), ["A", "300", "49.50"]);
        assert_eq!(names(&insight.summary), ["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn top_parties_with_fewer_rows() {
        let ps = parties(&[("A", 2), ("B", 2)]);
        let insight = top_parties(&ps, &Thresholds::default());
        assert_eq!(names(&insight.summary), ["A", "B"]);
    }

    #[test]
    fn shares_sum_to_one_after_merge() {
        let ps = example();
        let rows = seat_shares(&ps, 0.01);
        let sum: f64 = rows.iter().map(|r| r.share).sum();
        assert!((sum - 1.0).abs() < 1e-9);

        // E (5/606) and F (1/606) fall under 1%.
        let labels: Vec<&str> = rows.iter().map(|r| r.party.as_str()).collect();
        assert_eq!(labels, ["A", "B", "C", "D", "Others"]);
        assert!((rows[4].share - 6.0 / 606.0).abs() < 1e-12);
    }

    #[test]
    fn no_others_row_when_nothing_is_small() {
        let ps = parties(&[("A", 50), ("B", 50)]);
        let rows = seat_shares(&ps, 0.01);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.party != "Others"));
    }

    #[test]
    fn zero_seats_does_not_divide_by_zero() {
        let ps = parties(&[("A", 0), ("B", 0)]);
        let t = Thresholds::default();
        assert_eq!(dominance_ratio(&ps, 5), 0.0);
        let share = seat_share(&ps, &t);
        assert!(share.summary.contains("Others"));
        assert!(top_parties(&ps, &t).summary.contains("0.00"));
    }

    #[test]
    fn party_count_summary() {
        let insight = party_count(&example(), &Thresholds::default());
        assert_eq!(insight.summary, "Total number of parties: 6");
        assert_eq!(insight.chart.name, "total_number_of_parties");
    }
}
