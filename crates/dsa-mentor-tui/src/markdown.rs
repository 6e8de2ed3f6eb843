//! Markdown to styled ratatui lines
//!
//! Answers use the GitHub dialect: tables, strikethrough and task lists are
//! enabled on top of CommonMark.

use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

const RULE_WIDTH: usize = 40;

pub fn render_markdown(text: &str) -> Vec<Line<'static>> {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;

    let mut renderer = Renderer::default();
    for event in Parser::new_ext(text, options) {
        renderer.event(event);
    }
    renderer.finish()
}

/// What a `Start` event opened; the matching `End` pops it.
enum Open {
    Paragraph,
    Heading,
    Inline,
    Link(String),
    CodeBlock,
    List,
    Item,
    BlockQuote,
    Table,
    TableHead,
    Other,
}

#[derive(Default)]
struct Table {
    alignments: Vec<Alignment>,
    rows: Vec<Vec<String>>,
    header_rows: usize,
}

#[derive(Default)]
struct Renderer {
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    styles: Vec<Style>,
    open: Vec<Open>,
    // Next number for ordered lists, None for bullets
    lists: Vec<Option<u64>>,
    quote_depth: usize,
    in_code_block: bool,
    table: Option<Table>,
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn heading_style(level: HeadingLevel) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => bold.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
        HeadingLevel::H2 => bold.fg(Color::Cyan),
        HeadingLevel::H3 => bold.fg(Color::Blue),
        _ => bold,
    }
}

impl Renderer {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => {
                if self.in_code_block {
                    self.code_text(&text);
                } else {
                    self.push_text(text.to_string());
                }
            }
            Event::Code(code) => {
                if let Some(cell) = self.current_cell() {
                    cell.push_str(&code);
                } else {
                    let style = self.style().fg(Color::Yellow).bg(Color::Black);
                    self.spans.push(Span::styled(code.to_string(), style));
                }
            }
            Event::Html(html) => {
                // Block HTML is shown verbatim, one source line per row
                for line in html.lines() {
                    self.push_text(line.to_string());
                    self.flush();
                }
            }
            Event::InlineHtml(html) => self.push_text(html.to_string()),
            Event::SoftBreak => self.push_text(" ".to_string()),
            Event::HardBreak => {
                if self.table.is_some() {
                    self.push_text(" ".to_string());
                } else {
                    self.flush();
                }
            }
            Event::Rule => {
                self.flush();
                self.lines.push(Line::styled("─".repeat(RULE_WIDTH), dim()));
                self.blank();
            }
            Event::TaskListMarker(done) => {
                let (marker, style) = if done {
                    ("[x] ", Style::default().fg(Color::Green))
                } else {
                    ("[ ] ", dim())
                };
                self.spans.push(Span::styled(marker, style));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let open = match tag {
            Tag::Paragraph => Open::Paragraph,
            Tag::HtmlBlock => {
                self.flush();
                Open::Paragraph
            }
            Tag::Heading { level, .. } => {
                self.flush();
                self.push_style(heading_style(level));
                Open::Heading
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
                Open::BlockQuote
            }
            Tag::CodeBlock(kind) => {
                self.flush();
                self.in_code_block = true;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        let style = dim().add_modifier(Modifier::ITALIC);
                        self.lines.push(Line::styled(format!("  {lang}"), style));
                    }
                }
                Open::CodeBlock
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
                Open::List
            }
            Tag::Item => {
                self.flush();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.spans.push(Span::raw(indent));
                self.spans
                    .push(Span::styled(marker, Style::default().fg(Color::Cyan)));
                Open::Item
            }
            Tag::Emphasis => {
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
                Open::Inline
            }
            Tag::Strong => {
                self.push_style(Style::default().add_modifier(Modifier::BOLD));
                Open::Inline
            }
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT));
                Open::Inline
            }
            Tag::Link { dest_url, .. } => {
                self.push_style(
                    Style::default()
                        .fg(Color::Blue)
                        .add_modifier(Modifier::UNDERLINED),
                );
                Open::Link(dest_url.to_string())
            }
            Tag::Table(alignments) => {
                self.flush();
                self.table = Some(Table {
                    alignments,
                    ..Table::default()
                });
                Open::Table
            }
            Tag::TableHead => {
                self.start_row();
                Open::TableHead
            }
            Tag::TableRow => {
                self.start_row();
                Open::Other
            }
            Tag::TableCell => {
                if let Some(row) = self.table.as_mut().and_then(|t| t.rows.last_mut()) {
                    row.push(String::new());
                }
                Open::Other
            }
            _ => Open::Other,
        };
        self.open.push(open);
    }

    fn end(&mut self) {
        let Some(open) = self.open.pop() else {
            return;
        };

        match open {
            Open::Paragraph => {
                self.flush();
                self.blank();
            }
            Open::Heading => {
                self.flush();
                self.styles.pop();
                self.blank();
            }
            Open::Inline => {
                self.styles.pop();
            }
            Open::Link(url) => {
                self.styles.pop();
                let shown = self.spans.last().map(|s| s.content.as_ref() == url);
                if !url.is_empty() && shown == Some(false) && self.table.is_none() {
                    self.spans.push(Span::styled(format!(" ({url})"), dim()));
                }
            }
            Open::CodeBlock => {
                self.in_code_block = false;
                self.blank();
            }
            Open::List => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            Open::Item => self.flush(),
            Open::BlockQuote => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank();
            }
            Open::Table => {
                if let Some(table) = self.table.take() {
                    self.render_table(table);
                }
                self.blank();
            }
            Open::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.header_rows = table.rows.len();
                }
            }
            Open::Other => {}
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, style: Style) {
        let patched = self.style().patch(style);
        self.styles.push(patched);
    }

    fn current_cell(&mut self) -> Option<&mut String> {
        self.table
            .as_mut()
            .and_then(|t| t.rows.last_mut())
            .and_then(|row| row.last_mut())
    }

    fn start_row(&mut self) {
        if let Some(table) = self.table.as_mut() {
            table.rows.push(Vec::new());
        }
    }

    fn push_text(&mut self, text: String) {
        if let Some(cell) = self.current_cell() {
            cell.push_str(&text);
            return;
        }
        let style = self.style();
        self.spans.push(Span::styled(text, style));
    }

    fn code_text(&mut self, text: &str) {
        let style = Style::default().fg(Color::LightGreen);
        for line in text.split_terminator('\n') {
            let mut spans = self.quote_prefix();
            spans.push(Span::styled(format!("  {line}"), style));
            self.lines.push(Line::from(spans));
        }
    }

    fn quote_prefix(&self) -> Vec<Span<'static>> {
        if self.quote_depth == 0 {
            Vec::new()
        } else {
            vec![Span::styled("│ ".repeat(self.quote_depth), dim())]
        }
    }

    /// Move pending spans into a finished line.
    fn flush(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let mut spans = self.quote_prefix();
        spans.append(&mut self.spans);
        self.lines.push(Line::from(spans));
    }

    /// Separate blocks with a single empty line.
    fn blank(&mut self) {
        if self.lines.last().is_some_and(|line| line.width() > 0) {
            self.lines.push(Line::default());
        }
    }

    fn render_table(&mut self, table: Table) {
        let columns = table.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut widths = vec![0usize; columns];
        for row in &table.rows {
            for (col, cell) in row.iter().enumerate() {
                widths[col] = widths[col].max(cell.width());
            }
        }

        for (i, row) in table.rows.iter().enumerate() {
            let row_style = if i < table.header_rows {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let mut spans = self.quote_prefix();
            for (col, width) in widths.iter().enumerate() {
                if col > 0 {
                    spans.push(Span::styled(" │ ", dim()));
                }
                let cell = row.get(col).map_or("", String::as_str);
                let alignment = table.alignments.get(col).copied().unwrap_or(Alignment::None);
                spans.push(Span::styled(pad(cell, *width, alignment), row_style));
            }
            self.lines.push(Line::from(spans));

            if i + 1 == table.header_rows {
                let rule = widths
                    .iter()
                    .map(|w| "─".repeat(*w))
                    .collect::<Vec<_>>()
                    .join("─┼─");
                let mut spans = self.quote_prefix();
                spans.push(Span::styled(rule, dim()));
                self.lines.push(Line::from(spans));
            }
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|line| line.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

fn pad(cell: &str, width: usize, alignment: Alignment) -> String {
    let gap = width.saturating_sub(cell.width());
    match alignment {
        Alignment::Right => format!("{}{cell}", " ".repeat(gap)),
        Alignment::Center => {
            let left = gap / 2;
            format!("{}{cell}{}", " ".repeat(left), " ".repeat(gap - left))
        }
        Alignment::Left | Alignment::None => format!("{cell}{}", " ".repeat(gap)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn texts(markdown: &str) -> Vec<String> {
        render_markdown(markdown).iter().map(text_of).collect()
    }

    fn span<'a>(lines: &'a [Line<'static>], content: &str) -> &'a Span<'static> {
        lines
            .iter()
            .flat_map(|l| l.spans.iter())
            .find(|s| s.content == content)
            .unwrap_or_else(|| panic!("no span {content:?}"))
    }

    #[test]
    fn test_heading_is_bold() {
        let lines = render_markdown("# Hello");
        assert_eq!(lines.len(), 1);
        assert_eq!(text_of(&lines[0]), "Hello");
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_inline_emphasis() {
        let lines = render_markdown("plain *slow* **fast** ~~old~~ `O(1)`");
        assert!(span(&lines, "slow").style.add_modifier.contains(Modifier::ITALIC));
        assert!(span(&lines, "fast").style.add_modifier.contains(Modifier::BOLD));
        assert!(span(&lines, "old").style.add_modifier.contains(Modifier::CROSSED_OUT));
        assert_eq!(span(&lines, "O(1)").style.fg, Some(Color::Yellow));
    }

    #[test]
    fn test_nested_emphasis_keeps_outer_style() {
        let lines = render_markdown("**bold *both***");
        let both = span(&lines, "both").style.add_modifier;
        assert!(both.contains(Modifier::BOLD));
        assert!(both.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_paragraphs_are_separated_by_one_blank_line() {
        assert_eq!(texts("first\n\n\n\nsecond"), vec!["first", "", "second"]);
    }

    #[test]
    fn test_soft_break_joins_lines() {
        assert_eq!(texts("one\ntwo"), vec!["one two"]);
    }

    #[test]
    fn test_bullet_list() {
        assert_eq!(texts("- push\n- pop"), vec!["• push", "• pop"]);
    }

    #[test]
    fn test_ordered_list_counts_from_start() {
        assert_eq!(texts("3. sort\n4. scan"), vec!["3. sort", "4. scan"]);
    }

    #[test]
    fn test_nested_list_is_indented() {
        assert_eq!(
            texts("- tree\n  - left\n  - right\n- graph"),
            vec!["• tree", "  • left", "  • right", "• graph"]
        );
    }

    #[test]
    fn test_task_list() {
        assert_eq!(texts("- [x] base case\n- [ ] memoize"), vec!["• [x] base case", "• [ ] memoize"]);
    }

    #[test]
    fn test_fenced_code_block() {
        let lines = texts("```rust\nfn main() {\n\n}\n```\nafter");
        assert_eq!(lines, vec!["  rust", "  fn main() {", "  ", "  }", "", "after"]);
    }

    #[test]
    fn test_block_quote() {
        assert_eq!(texts("> mind the overflow"), vec!["│ mind the overflow"]);
    }

    #[test]
    fn test_link_shows_target() {
        assert_eq!(
            texts("see [docs](https://example.com)"),
            vec!["see docs (https://example.com)"]
        );
        assert_eq!(texts("<https://example.com>"), vec!["https://example.com"]);
    }

    #[test]
    fn test_html_block_is_its_own_block() {
        assert_eq!(
            texts("<details>\n\nNext paragraph"),
            vec!["<details>", "", "Next paragraph"]
        );
        assert_eq!(
            texts("<div>\n<b>hint</b>\n</div>\n\nafter"),
            vec!["<div>", "<b>hint</b>", "</div>", "", "after"]
        );
    }

    #[test]
    fn test_rule() {
        let lines = texts("above\n\n---\n\nbelow");
        assert_eq!(lines[2], "─".repeat(RULE_WIDTH));
        assert_eq!(lines.last().map(String::as_str), Some("below"));
    }

    #[test]
    fn test_table_columns_are_aligned() {
        let lines = texts(
            "| Op | Cost |\n|---|---:|\n| push | 1 |\n| search | n |",
        );
        assert_eq!(
            lines,
            vec![
                "Op     │ Cost",
                "───────┼─────",
                "push   │    1",
                "search │    n",
            ]
        );
    }

    #[test]
    fn test_table_header_is_bold() {
        let lines = render_markdown("| A | B |\n|---|---|\n| 1 | 2 |");
        let header = &lines[0];
        assert!(header.spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert!(!lines[2].spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_table_center_alignment() {
        assert_eq!(pad("ab", 6, Alignment::Center), "  ab  ");
        assert_eq!(pad("ab", 5, Alignment::Center), " ab  ");
    }

    #[test]
    fn test_trailing_blank_lines_trimmed() {
        let lines = render_markdown("## Approach\n\nUse two pointers.\n\n");
        assert!(lines.last().is_some_and(|l| l.width() > 0));
    }

    #[test]
    fn test_empty_input() {
        assert!(render_markdown("").is_empty());
    }
}
