use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use serde::Serialize;

// ── Records ──

/// One row of the party-wise summary on the results index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyResult {
    pub party: String,
    pub won: u64,
    pub leading: u64,
    /// Always `won + leading`.
    pub total: u64,
    /// Relative link to the party's constituency-wise results page.
    pub link: String,
}

/// One winning candidate on a party's results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateResult {
    pub serial_number: String,
    pub constituency: String,
    pub winning_candidate: String,
    pub total_votes: u64,
    pub margin: u64,
    pub party: String,
}

/// Per-party outcome of the candidate load, as stored alongside a snapshot.
pub struct PageRow {
    pub party: String,
    pub loaded: bool,
    pub reason: Option<String>,
    pub rows: usize,
}

pub struct SnapshotMeta {
    pub source_url: String,
    pub scraped_at: String,
}

// ── Snapshot store ──

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open snapshot DB {}", path.display()))?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS snapshot (
            id          INTEGER PRIMARY KEY CHECK (id = 1),
            source_url  TEXT NOT NULL,
            scraped_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS parties (
            position    INTEGER PRIMARY KEY,
            party       TEXT UNIQUE NOT NULL,
            won         INTEGER NOT NULL CHECK (won >= 0),
            leading     INTEGER NOT NULL CHECK (leading >= 0),
            total       INTEGER NOT NULL CHECK (total = won + leading),
            link        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS candidates (
            position          INTEGER PRIMARY KEY,
            party             TEXT NOT NULL REFERENCES parties(party),
            serial_number     TEXT NOT NULL,
            constituency      TEXT NOT NULL,
            winning_candidate TEXT NOT NULL,
            total_votes       INTEGER NOT NULL,
            margin            INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_candidates_party ON candidates(party);

        CREATE TABLE IF NOT EXISTS candidate_pages (
            party       TEXT PRIMARY KEY REFERENCES parties(party),
            loaded      BOOLEAN NOT NULL,
            reason      TEXT,
            rows        INTEGER NOT NULL
        );
        ",
    )?;
    Ok(())
}

/// Replace whatever snapshot is stored with this one, atomically.
pub fn save_snapshot(
    conn: &Connection,
    meta: &SnapshotMeta,
    parties: &[PartyResult],
    candidates: &[CandidateResult],
    pages: &[PageRow],
) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "DELETE FROM candidate_pages;
         DELETE FROM candidates;
         DELETE FROM parties;
         DELETE FROM snapshot;",
    )?;
    tx.execute(
        "INSERT INTO snapshot (id, source_url, scraped_at) VALUES (1, ?1, ?2)",
        rusqlite::params![meta.source_url, meta.scraped_at],
    )?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO parties (position, party, won, leading, total, link)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )?;
        for (i, p) in parties.iter().enumerate() {
            stmt.execute(rusqlite::params![
                i as i64, p.party, p.won as i64, p.leading as i64, p.total as i64, p.link,
            ])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO candidates
             (position, party, serial_number, constituency, winning_candidate, total_votes, margin)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;
        for (i, c) in candidates.iter().enumerate() {
            stmt.execute(rusqlite::params![
                i as i64, c.party, c.serial_number, c.constituency, c.winning_candidate,
                c.total_votes as i64, c.margin as i64,
            ])?;
        }

        let mut stmt = tx.prepare(
            "INSERT INTO candidate_pages (party, loaded, reason, rows) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for p in pages {
            stmt.execute(rusqlite::params![p.party, p.loaded, p.reason, p.rows as i64])?;
        }
    }
    tx.commit()?;
    Ok(())
}

pub fn fetch_meta(conn: &Connection) -> Result<Option<SnapshotMeta>> {
    let mut stmt = conn.prepare("SELECT source_url, scraped_at FROM snapshot WHERE id = 1")?;
    let mut rows = stmt.query([])?;
    match rows.next()? {
        Some(row) => Ok(Some(SnapshotMeta {
            source_url: row.get(0)?,
            scraped_at: row.get(1)?,
        })),
        None => Ok(None),
    }
}

pub fn fetch_parties(conn: &Connection, limit: Option<usize>) -> Result<Vec<PartyResult>> {
    let sql = match limit {
        Some(n) => format!(
            "SELECT party, won, leading, total, link FROM parties ORDER BY position LIMIT {}",
            n
        ),
        None => "SELECT party, won, leading, total, link FROM parties ORDER BY position".to_string(),
    };
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(PartyResult {
                party: row.get(0)?,
                won: row.get::<_, i64>(1)? as u64,
                leading: row.get::<_, i64>(2)? as u64,
                total: row.get::<_, i64>(3)? as u64,
                link: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_candidates(conn: &Connection) -> Result<Vec<CandidateResult>> {
    let mut stmt = conn.prepare(
        "SELECT serial_number, constituency, winning_candidate, total_votes, margin, party
         FROM candidates ORDER BY position",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(CandidateResult {
                serial_number: row.get(0)?,
                constituency: row.get(1)?,
                winning_candidate: row.get(2)?,
                total_votes: row.get::<_, i64>(3)? as u64,
                margin: row.get::<_, i64>(4)? as u64,
                party: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn fetch_pages(conn: &Connection) -> Result<Vec<PageRow>> {
    let mut stmt = conn.prepare(
        "SELECT cp.party, cp.loaded, cp.reason, cp.rows
         FROM candidate_pages cp JOIN parties p ON p.party = cp.party
         ORDER BY p.position",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(PageRow {
                party: row.get(0)?,
                loaded: row.get(1)?,
                reason: row.get(2)?,
                rows: row.get::<_, i64>(3)? as usize,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
