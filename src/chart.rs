use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};

const SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// One labelled bar (or pie slice). `text` is the annotation drawn on it.
#[derive(Debug, Clone, Serialize)]
pub struct Point {
    pub label: String,
    pub value: f64,
    pub text: String,
}

impl Point {
    pub fn new(label: impl Into<String>, value: f64, text: impl Into<String>) -> Self {
        Point {
            label: label.into(),
            value,
            text: text.into(),
        }
    }
}

/// A chart artifact: a Vega-Lite document plus the file stem it is saved under.
#[derive(Debug, Clone)]
pub struct Chart {
    pub name: &'static str,
    pub spec: Value,
}

impl Chart {
    /// Bars in the given order, value annotation above each bar.
    pub fn bar(name: &'static str, title: &str, y_title: &str, points: &[Point]) -> Self {
        let spec = json!({
            "$schema": SCHEMA,
            "title": title,
            "width": bar_width(points.len()),
            "height": 360,
            "data": { "values": points },
            "encoding": {
                "x": {
                    "field": "label",
                    "type": "nominal",
                    "sort": null,
                    "title": null,
                    "axis": { "labelAngle": -45, "labelAlign": "right" }
                },
                "y": { "field": "value", "type": "quantitative", "title": y_title }
            },
            "layer": [
                { "mark": "bar" },
                {
                    "mark": { "type": "text", "baseline": "bottom", "dy": -2 },
                    "encoding": { "text": { "field": "text" } }
                }
            ]
        });
        Chart { name, spec }
    }

    /// Pie of shares; slices keep input order.
    pub fn pie(name: &'static str, title: &str, points: &[Point]) -> Self {
        let spec = json!({
            "$schema": SCHEMA,
            "title": { "text": title, "fontSize": 16 },
            "width": 720,
            "height": 720,
            "data": { "values": points },
            "encoding": {
                "theta": { "field": "value", "type": "quantitative", "stack": true },
                "color": { "field": "label", "type": "nominal", "sort": null, "title": "Party" },
                "order": { "field": "index", "type": "quantitative" }
            },
            "transform": [{ "window": [{ "op": "row_number", "as": "index" }] }],
            "layer": [
                { "mark": { "type": "arc", "outerRadius": 300 } },
                {
                    "mark": { "type": "text", "radius": 330, "fontSize": 14 },
                    "encoding": { "text": { "field": "text" } }
                }
            ]
        });
        Chart { name, spec }
    }

    /// One small bar chart per group, two per row.
    pub fn faceted_bars(
        name: &'static str,
        title: &str,
        y_title: &str,
        groups: &[(String, Vec<Point>)],
    ) -> Self {
        let values: Vec<Value> = groups
            .iter()
            .flat_map(|(group, points)| {
                points.iter().map(move |p| {
                    json!({ "group": group, "label": p.label, "value": p.value, "text": p.text })
                })
            })
            .collect();
        let spec = json!({
            "$schema": SCHEMA,
            "title": title,
            "data": { "values": values },
            "facet": { "field": "group", "type": "nominal", "sort": null, "title": null },
            "columns": 2,
            "resolve": { "scale": { "x": "independent", "y": "independent" } },
            "spec": {
                "width": 420,
                "height": 240,
                "encoding": {
                    "x": {
                        "field": "label",
                        "type": "nominal",
                        "sort": null,
                        "title": null,
                        "axis": { "labelAngle": -45, "labelAlign": "right" }
                    },
                    "y": { "field": "value", "type": "quantitative", "title": y_title }
                },
                "layer": [
                    { "mark": "bar" },
                    {
                        "mark": { "type": "text", "baseline": "bottom", "dy": -2 },
                        "encoding": { "text": { "field": "text" } }
                    }
                ]
            }
        });
        Chart { name, spec }
    }

    /// Fix the y axis range, e.g. `[0, 1]` for ratios.
    pub fn with_y_domain(mut self, lo: f64, hi: f64) -> Self {
        self.spec["encoding"]["y"]["scale"] = json!({ "domain": [lo, hi] });
        self
    }

    pub fn file_name(&self) -> String {
        format!("{}.vl.json", self.name)
    }

    /// Write the chart into `dir`, replacing any previous run's file.
    pub fn write(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        let body = serde_json::to_string_pretty(&self.spec)?;
        std::fs::write(&path, body + "\n")
            .with_context(|| format!("Failed to write chart {}", path.display()))?;
        Ok(path)
    }
}

fn bar_width(bars: usize) -> usize {
    (bars * 60).clamp(240, 1200)
}
