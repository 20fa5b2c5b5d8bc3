mod analysis;
mod chart;
mod config;
mod db;
mod fetch;
mod loader;
mod parser;
mod report;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use analysis::Tables;
use config::Settings;
use db::{CandidateResult, PartyResult};
use fetch::{HttpSource, PageSource};
use loader::CandidateLoad;

#[derive(Parser)]
#[command(name = "eci_results", about = "Lok Sabha results scraper and seat/margin report")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Results index page (its directory is the base for party links)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Where the report and chart files are written
    #[arg(long, global = true)]
    out_dir: Option<PathBuf>,

    /// Snapshot database path
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape, analyse and write the report (default)
    Run,
    /// Scrape party and candidate tables into the snapshot DB
    Scrape,
    /// Analyse the stored snapshot and write the report
    Analyze,
    /// Party table of the stored snapshot
    Overview {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "50")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(url) = &cli.url {
        settings.set_index_url(url);
    }
    if let Some(dir) = cli.out_dir {
        settings.out_dir = dir;
    }
    if let Some(path) = cli.db {
        settings.db_path = path;
    }

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let source = HttpSource::new(&settings)?;
            let (parties, load) = collect(&source, &settings).await?;
            analyze_and_write(&settings, &parties, &load.candidates)
        }
        Commands::Scrape => {
            let source = HttpSource::new(&settings)?;
            let (parties, load) = collect(&source, &settings).await?;
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let meta = db::SnapshotMeta {
                source_url: settings.index_url(),
                scraped_at: chrono::Utc::now().to_rfc3339(),
            };
            db::save_snapshot(&conn, &meta, &parties, &load.candidates, &load.pages)?;
            println!(
                "Saved {} parties, {} candidates ({} party pages loaded, {} empty) to {}",
                parties.len(),
                load.candidates.len(),
                load.loaded(),
                load.empty(),
                settings.db_path.display()
            );
            Ok(())
        }
        Commands::Analyze => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let Some(meta) = db::fetch_meta(&conn)? else {
                println!("No snapshot stored. Run 'scrape' first.");
                return Ok(());
            };
            info!("Analysing snapshot of {} taken {}", meta.source_url, meta.scraped_at);
            let parties = db::fetch_parties(&conn, None)?;
            let candidates = db::fetch_candidates(&conn)?;
            analyze_and_write(&settings, &parties, &candidates)
        }
        Commands::Overview { limit } => {
            let conn = db::connect(&settings.db_path)?;
            db::init_schema(&conn)?;
            let Some(meta) = db::fetch_meta(&conn)? else {
                println!("No snapshot stored. Run 'scrape' first.");
                return Ok(());
            };
            let parties = db::fetch_parties(&conn, Some(limit))?;
            let pages = db::fetch_pages(&conn)?;
            print_overview(&meta, &parties, &pages);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Party summary (fatal on failure), then every party's candidates (never fatal).
async fn collect<S: PageSource>(
    source: &S,
    settings: &Settings,
) -> Result<(Vec<PartyResult>, CandidateLoad)> {
    let parties = loader::load_parties(source, settings).await?;
    let load = loader::load_all_candidates(source, settings, &parties).await;
    if load.candidates.is_empty() {
        println!("No candidate data could be scraped. Please check the website structure and URLs.");
    }
    Ok((parties, load))
}

fn analyze_and_write(
    settings: &Settings,
    parties: &[PartyResult],
    candidates: &[CandidateResult],
) -> Result<()> {
    let tables = Tables { parties, candidates };
    let insights = analysis::run_all(tables, &settings.analysis);
    if candidates.is_empty() {
        println!("No candidate-specific insights could be generated due to lack of data.");
    }

    for insight in &insights {
        println!("{}", insight.summary);
    }
    let path = report::write(&settings.out_dir, settings.report_path(), &insights)?;
    println!("\nReport written to {}", path.display());
    Ok(())
}

fn print_overview(meta: &db::SnapshotMeta, parties: &[PartyResult], pages: &[db::PageRow]) {
    println!("Snapshot: {} ({})\n", meta.source_url, meta.scraped_at);
    println!(
        "{:>3} | {:<40} | {:>4} | {:>7} | {:>5} | {:>10}",
        "#", "Party", "Won", "Leading", "Total", "Candidates"
    );
    println!("{}", "-".repeat(86));

    for (i, p) in parties.iter().enumerate() {
        let candidates = pages
            .iter()
            .find(|pg| pg.party == p.party)
            .map(|pg| if pg.loaded { pg.rows.to_string() } else { "-".into() })
            .unwrap_or_else(|| "-".into());
        println!(
            "{:>3} | {:<40} | {:>4} | {:>7} | {:>5} | {:>10}",
            i + 1,
            truncate(&p.party, 40),
            p.won,
            p.leading,
            p.total,
            candidates
        );
    }

    let failed: Vec<_> = pages.iter().filter(|pg| !pg.loaded).collect();
    if !failed.is_empty() {
        println!("\n--- Empty candidate pages ---");
        for pg in &failed {
            println!("  {}: {}", truncate(&pg.party, 40), pg.reason.as_deref().unwrap_or("?"));
        }
    }

    println!("\n{} parties shown", parties.len());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::fixtures::FixtureSource;

    const BASE: &str = "http://results.test/2024/";

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    fn settings() -> Settings {
        let mut s = Settings::default();
        s.set_index_url(&format!("{}index.htm", BASE));
        s
    }

    fn source() -> FixtureSource {
        FixtureSource::new()
            .page(&format!("{}index.htm", BASE), fixture("index"))
            .page(&format!("{}partywisewinresult-369.htm", BASE), fixture("party_bjp"))
            .page(&format!("{}partywisewinresult-3388.htm", BASE), fixture("party_ragged"))
            .status(&format!("{}partywisewinresult-742.htm", BASE), 404)
    }

    async fn report_text(src: &FixtureSource) -> String {
        let s = settings();
        let (parties, load) = collect(src, &s).await.unwrap();
        let insights = analysis::run_all(
            Tables { parties: &parties, candidates: &load.candidates },
            &s.analysis,
        );
        report::render(&insights)
    }

    #[tokio::test]
    async fn identical_markup_gives_identical_report() {
        let src = source();
        let first = report_text(&src).await;
        let second = report_text(&src).await;
        assert_eq!(first, second);
        assert!(first.contains("Top 5 candidates by winning margin:"));
    }

    #[tokio::test]
    async fn failed_party_page_leaves_party_analyses_intact() {
        let src = source();
        let s = settings();
        let (parties, load) = collect(&src, &s).await.unwrap();
        assert_eq!(parties.len(), 10);
        assert!(load.candidates.iter().all(|c| !c.party.starts_with("Indian National Congress")));
        let inc = load
            .pages
            .iter()
            .find(|p| p.party.starts_with("Indian National Congress"))
            .unwrap();
        assert!(!inc.loaded);

        let text = report_text(&src).await;
        assert!(text.contains("Total number of parties: 10\n"));
        assert!(text.contains("Number of single-seat parties: 2\n"));
        assert!(text.contains("Top 5 parties hold 92.03% of seats"));
    }

    #[tokio::test]
    async fn no_candidates_means_party_analyses_only() {
        let src = FixtureSource::new().page(&format!("{}index.htm", BASE), fixture("index"));
        let text = report_text(&src).await;
        assert_eq!(text.matches("\n\n").count(), 7);
        assert!(!text.contains("winning margin"));
    }

    #[tokio::test]
    async fn index_failure_aborts() {
        let src = FixtureSource::new().status(&format!("{}index.htm", BASE), 500);
        assert!(collect(&src, &settings()).await.is_err());
    }

    #[test]
    fn truncate_long_names() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Bharatiya Janata Party - BJP", 10), "Bharati...");
    }
}
