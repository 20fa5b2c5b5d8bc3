use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static COUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

static ROW_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("column '{column}' is not a number: {value:?}")]
    NotANumber { column: &'static str, value: String },
    #[error("column '{column}' has no results link")]
    MissingLink { column: &'static str },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid table selector '{0}'")]
    Selector(String),
    #[error("no table matching '{0}'")]
    TableNotFound(String),
    #[error("row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: ParseError,
    },
}

/// Text of one `<td>`, whitespace-collapsed, plus the first link inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub href: Option<String>,
}

impl Cell {
    fn from_element(td: ElementRef) -> Self {
        let raw: String = td.text().collect();
        let text = WS_RE.replace_all(raw.trim(), " ").into_owned();
        let href = td
            .select(&ANCHOR_SEL)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|h| h.trim().to_string());
        Cell { text, href }
    }
}

/// How one table row maps onto a typed record.
pub trait RowShape {
    type Record;

    /// Rows with fewer `<td>` cells than this are skipped.
    fn min_cells(&self) -> usize;

    fn parse(&self, cells: &[Cell]) -> Result<Self::Record, ParseError>;
}

/// Pull typed records out of the first table matching `table_selector`.
///
/// Row 0 is the header and is always skipped. Short rows are dropped;
/// a bad value in a required column fails the whole call.
pub fn extract<S: RowShape>(
    markup: &str,
    table_selector: &str,
    shape: &S,
) -> Result<Vec<S::Record>, ExtractError> {
    let table_sel = Selector::parse(table_selector)
        .map_err(|_| ExtractError::Selector(table_selector.to_string()))?;

    let document = Html::parse_document(markup);
    let Some(table) = document.select(&table_sel).next() else {
        warn!(selector = table_selector, "results table not found");
        return Err(ExtractError::TableNotFound(table_selector.to_string()));
    };

    let mut records = Vec::new();
    for (i, tr) in table.select(&ROW_SEL).enumerate().skip(1) {
        let cells: Vec<Cell> = tr.select(&CELL_SEL).map(Cell::from_element).collect();
        if cells.len() < shape.min_cells() {
            debug!(row = i, cells = cells.len(), "skipping short row");
            continue;
        }
        let record = shape
            .parse(&cells)
            .map_err(|source| ExtractError::Row { row: i, source })?;
        records.push(record);
    }
    Ok(records)
}

/// Parse a vote or seat count: thousands separators are ignored and a
/// lone "-" means zero.
pub fn parse_count(column: &'static str, raw: &str) -> Result<u64, ParseError> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned == "-" {
        return Ok(0);
    }
    let not_a_number = || ParseError::NotANumber {
        column,
        value: raw.to_string(),
    };
    if !COUNT_RE.is_match(&cleaned) {
        return Err(not_a_number());
    }
    cleaned.parse::<u64>().map_err(|_| not_a_number())
}
