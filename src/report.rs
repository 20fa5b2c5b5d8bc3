use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::analysis::Insight;

/// Report body: every summary followed by a blank line, in pipeline order.
pub fn render(insights: &[Insight]) -> String {
    insights
        .iter()
        .map(|i| format!("{}\n\n", i.summary))
        .collect()
}

/// Write one chart file per insight into `out_dir`, then the text report
/// at `report`. Returns the report path.
pub fn write(out_dir: &Path, report: PathBuf, insights: &[Insight]) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output dir {}", out_dir.display()))?;

    for insight in insights {
        let path = insight.chart.write(out_dir)?;
        debug!(chart = %path.display(), "chart written");
    }

    let path = report;
    std::fs::write(&path, render(insights))
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    info!("Wrote {} insights to {}", insights.len(), path.display());
    Ok(path)
}
