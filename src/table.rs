/// Fixed-width text table. Cells are left-aligned and padded to the column
/// width; a cell wider than its column is printed whole so nothing is lost.
pub struct TextTable {
    columns: Vec<(String, usize)>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new(columns: &[(&str, usize)]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|(title, width)| (title.to_string(), *width))
                .collect(),
            rows: Vec::new(),
        }
    }

    /// Missing trailing cells render as empty strings.
    pub fn push<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.columns.iter().map(|(_, w)| w + 1).sum::<usize>().saturating_sub(1)
    }

    pub fn header(&self) -> String {
        let titles: Vec<String> = self.columns.iter().map(|(t, _)| t.clone()).collect();
        self.format_line(&titles)
    }

    pub fn rule(&self) -> String {
        "-".repeat(self.width())
    }

    fn format_line(&self, cells: &[String]) -> String {
        let mut out = String::new();
        for (i, (_, width)) in self.columns.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&pad(cell, *width));
        }
        out.trim_end().to_string()
    }

    pub fn lines(&self) -> Vec<String> {
        self.rows.iter().map(|r| self.format_line(r)).collect()
    }

    /// Header, rule and every row.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.header());
        out.push('\n');
        out.push_str(&self.rule());
        out.push('\n');
        for line in self.lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

pub fn pad(cell: &str, width: usize) -> String {
    format!("{:<width$}", cell, width = width)
}

pub fn opt(v: &Option<String>) -> String {
    v.clone().unwrap_or_default()
}

/// Split `items` into pages of `per_page` (at least 1).
pub fn paginate<T>(items: &[T], per_page: usize) -> Vec<&[T]> {
    items.chunks(per_page.max(1)).collect()
}
