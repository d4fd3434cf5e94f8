use crate::foundation::utils::{display_width, truncate_graphemes};

/// A rounded box-drawing table measured in graphemes.
#[derive(Debug, Clone, Default)]
pub struct Table {
    title: Option<String>,
    headers: Vec<String>,
    max_widths: Vec<Option<usize>>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            title: None,
            headers: headers.iter().map(|h| h.to_string()).collect(),
            max_widths: vec![None; headers.len()],
            rows: Vec::new(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    /// Caps a column; longer cells are cut with an ellipsis.
    pub fn max_width(mut self, column: usize, width: usize) -> Self {
        if let Some(slot) = self.max_widths.get_mut(column) {
            *slot = Some(width.max(1));
        }
        self
    }

    /// Adds a row. Missing cells render empty and extra cells are dropped.
    pub fn add_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = cells
            .into_iter()
            .take(self.headers.len())
            .map(Into::into)
            .collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        (0..self.headers.len())
            .map(|column| {
                let natural = self
                    .rows
                    .iter()
                    .map(|row| display_width(&row[column]))
                    .chain(std::iter::once(display_width(&self.headers[column])))
                    .max()
                    .unwrap_or(0);
                match self.max_widths[column] {
                    Some(cap) => natural.min(cap),
                    None => natural,
                }
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let rule = |left: &str, middle: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("{left}{}{right}\n", segments.join(middle))
        };
        let line = |cells: &[String]| {
            let padded: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| {
                    let cell = truncate_graphemes(cell, width);
                    let padding = width.saturating_sub(display_width(&cell));
                    format!(" {cell}{} ", " ".repeat(padding))
                })
                .collect();
            format!("│{}│\n", padded.join("│"))
        };

        let mut out = String::new();
        if let Some(title) = &self.title {
            let total: usize = widths.iter().map(|w| w + 3).sum::<usize>() + 1;
            let indent = total.saturating_sub(display_width(title)) / 2;
            out.push_str(&format!("{}{title}\n", " ".repeat(indent)));
        }
        out.push_str(&rule("╭", "┬", "╮"));
        out.push_str(&line(&self.headers));
        out.push_str(&rule("├", "┼", "┤"));
        for row in &self.rows {
            out.push_str(&line(row));
        }
        out.push_str(&rule("╰", "┴", "╯"));
        out
    }
}

/// Draws `body` inside a rounded box with `title` set into the top edge.
pub fn panel(title: &str, body: &str) -> String {
    let lines: Vec<&str> = body.lines().collect();
    let inner = lines
        .iter()
        .map(|line| display_width(line))
        .chain(std::iter::once(display_width(title) + 2))
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let heading = if title.is_empty() {
        String::new()
    } else {
        format!(" {title} ")
    };
    let fill = (inner + 2).saturating_sub(display_width(&heading));
    out.push_str(&format!("╭{heading}{}╮\n", "─".repeat(fill)));
    for line in lines {
        let padding = inner - display_width(line);
        out.push_str(&format!("│ {line}{} │\n", " ".repeat(padding)));
    }
    out.push_str(&format!("╰{}╯\n", "─".repeat(inner + 2)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table() {
        let mut table = Table::new(&["#", "Album"]);
        table.add_row(["1", "Kid A"]);
        table.add_row(["2", "Amnesiac"]);

        let expected = "\
╭───┬──────────╮
│ # │ Album    │
├───┼──────────┤
│ 1 │ Kid A    │
│ 2 │ Amnesiac │
╰───┴──────────╯
";
        assert_eq!(table.render(), expected);
    }

    #[test]
    fn test_max_width_truncates() {
        let mut table = Table::new(&["Album"]).max_width(0, 6);
        table.add_row(["Hail to the Thief"]);

        let rendered = table.render();
        assert!(rendered.contains("│ Hail … │"));
    }

    #[test]
    fn test_rows_are_padded_to_header_count() {
        let mut table = Table::new(&["a", "b", "c"]);
        table.add_row(["x"]);

        let rendered = table.render();
        assert!(rendered.contains("│ x │   │   │"));
    }

    #[test]
    fn test_graphemes_count_as_one_column() {
        let mut table = Table::new(&["Name"]);
        table.add_row(["Bjo\u{308}rk"]);

        let rendered = table.render();
        assert!(rendered.contains("│ Bjo\u{308}rk │"));
    }

    #[test]
    fn test_panel() {
        let expected = "\
╭ Hi ──────╮
│ line one │
│ two      │
╰──────────╯
";
        assert_eq!(panel("Hi", "line one\ntwo"), expected);
    }
}
