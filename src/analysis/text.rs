/// Plain-text table: header line then one line per row, every column
/// right-aligned to its widest cell, two spaces between columns.
pub struct TextTable {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new(headers: &[&'static str]) -> Self {
        TextTable {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        debug_assert_eq!(cells.len(), self.headers.len());
        self.rows.push(cells);
    }

    pub fn render(&self) -> String {
        if self.rows.is_empty() {
            return "(none)".to_string();
        }

        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.rows
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header: Vec<String> = self.headers.iter().map(|h| h.to_string()).collect();
        std::iter::once(&header)
            .chain(self.rows.iter())
            .map(|cells| {
                cells
                    .iter()
                    .zip(&widths)
                    .map(|(c, w)| format!("{:>w$}", c, w = *w))
                    .collect::<Vec<_>>()
                    .join("  ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `0.9983…` → `"99.83%"`.
pub fn percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// `1175092` → `"1,175,092"`.
pub fn grouped(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// A threshold ratio as a short percentage label: `0.05` → `"5"`, `0.025` → `"2.5"`.
pub fn threshold_label(ratio: f64) -> String {
    let fixed = format!("{:.2}", ratio * 100.0);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}
