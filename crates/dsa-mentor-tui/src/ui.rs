use dsa_mentor_core::{AnswerSource, SUGGESTIONS};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::{App, FocusPane};

const SPINNER_FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];
const PLACEHOLDER: &str = "Ask a DSA question (e.g., Two Sum, Binary Search, Dynamic Programming...)";
const SUGGESTION_GAP: u16 = 2;

/// Button colours, one per suggestion
const SUGGESTION_COLORS: [Color; 4] = [Color::Blue, Color::Magenta, Color::LightRed, Color::Green];

pub fn render<S: AnswerSource>(app: &mut App<S>, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, answer, input, suggestions, footer
    let [header_area, answer_area, input_area, suggestions_area, footer_area] =
        Layout::vertical([
            Constraint::Length(4),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

    render_header(frame, header_area);
    render_answer(app, frame, answer_area);
    render_input(app, frame, input_area);
    render_suggestions(app, frame, suggestions_area);
    render_footer(app, frame, footer_area);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            " DSA Interview Mentor ",
            Style::default().bg(Color::Blue).fg(Color::White).bold(),
        )),
        Line::from(Span::styled(
            "Algorithmic Reasoning Assistant",
            Style::default().fg(Color::Magenta).bold(),
        )),
        Line::from(Span::styled(
            "Structured explanations with optimal solutions and complexity analysis.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let header = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(header, area);
}

fn render_answer<S: AnswerSource>(app: &mut App<S>, frame: &mut Frame, area: Rect) {
    app.answer_area = Some(area);

    // Store answer dimensions for scroll calculations (inner size minus borders)
    app.resize_answer(area.width.saturating_sub(2), area.height.saturating_sub(2));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Answer ");

    if app.state().loading {
        let spinner = SPINNER_FRAMES[app.animation_frame % SPINNER_FRAMES.len()];
        let lines = vec![
            Line::from(Span::styled(spinner, Style::default().fg(Color::Cyan).bold())),
            Line::default(),
            Line::from(Span::styled(
                "Analyzing optimal approaches",
                Style::default().fg(Color::Blue).bold(),
            )),
            Line::from(Span::styled(
                "Evaluating time and space complexity",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        // Vertically centre the four status lines
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let [_, status_area, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(lines.len() as u16),
            Constraint::Fill(1),
        ])
        .areas(inner);
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), status_area);
        return;
    }

    if app.answer_lines.is_empty() {
        frame.render_widget(block, area);
        return;
    }

    // Clamp scroll in case the panel grew since the last scroll
    app.answer_scroll = app.answer_scroll.min(app.max_scroll());

    let answer = Paragraph::new(Text::from(app.answer_lines.clone()))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.answer_scroll, 0));
    frame.render_widget(answer, area);

    let max_scroll = app.max_scroll();
    if max_scroll > 0 {
        let mut scrollbar_state =
            ScrollbarState::new(max_scroll as usize).position(app.answer_scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }
}

fn render_input<S: AnswerSource>(app: &App<S>, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Input;
    let border_color = if focused { Color::Yellow } else { Color::DarkGray };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let mut hints = Vec::new();
    if app.state().has_query() {
        hints.push(Span::styled(" Esc to clear ", key_style));
        hints.push(Span::raw(" "));
    }
    hints.push(Span::styled(" ⏎ Enter ", Style::default().bg(Color::Blue).fg(Color::White)));
    hints.push(Span::raw(" "));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Ask ")
        .title_top(Line::from(hints).right_aligned());

    let query = &app.state().query;
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = visible_input(query, app.cursor, inner_width);

    if query.is_empty() {
        let placeholder = Paragraph::new(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
            .block(block);
        frame.render_widget(placeholder, area);
    } else {
        let input = Paragraph::new(visible_text)
            .style(Style::default().fg(Color::Cyan))
            .block(block);
        frame.render_widget(input, area);
    }

    if focused {
        frame.set_cursor_position((area.x + 1 + cursor_x, area.y + 1));
    }
}

/// Slice of `query` that fits in `width` columns with the cursor (a char
/// index) in view, plus the cursor's column within that slice.
fn visible_input(query: &str, cursor: usize, width: usize) -> (String, u16) {
    if width == 0 {
        return (String::new(), 0);
    }

    let chars: Vec<char> = query.chars().collect();
    let cursor = cursor.min(chars.len());
    let char_width = |c: &char| c.width().unwrap_or(0);

    // Drop leading chars until the cursor column fits inside the box
    let mut skip = 0;
    let mut cursor_col: usize = chars[..cursor].iter().map(char_width).sum();
    while cursor_col >= width && skip < cursor {
        cursor_col -= char_width(&chars[skip]);
        skip += 1;
    }

    let mut used = 0;
    let visible: String = chars[skip..]
        .iter()
        .take_while(|c| {
            used += char_width(*c);
            used <= width
        })
        .collect();

    (visible, cursor_col as u16)
}

fn render_suggestions<S: AnswerSource>(app: &mut App<S>, frame: &mut Frame, area: Rect) {
    let [label_area, buttons_area, tip_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    frame.render_widget(
        Paragraph::new(Span::styled("Common questions:", Style::default().fg(Color::DarkGray)))
            .alignment(Alignment::Center),
        label_area,
    );

    // Lay the buttons out centred on one row, remembering where each landed
    let widths: Vec<u16> = SUGGESTIONS
        .iter()
        .map(|s| s.label.width() as u16 + 2)
        .collect();
    let total = widths.iter().sum::<u16>() + SUGGESTION_GAP * (widths.len() as u16 - 1);
    let mut x = buttons_area.x + buttons_area.width.saturating_sub(total) / 2;

    app.suggestion_areas.clear();
    for (i, (suggestion, width)) in SUGGESTIONS.iter().zip(widths).enumerate() {
        let right_edge = buttons_area.x + buttons_area.width;
        let width = width.min(right_edge.saturating_sub(x));
        if width == 0 {
            break;
        }
        let button_area = Rect::new(x, buttons_area.y, width, 1);

        let color = SUGGESTION_COLORS[i % SUGGESTION_COLORS.len()];
        let selected = app.focus == FocusPane::Suggestions && app.selected_suggestion == i;
        let style = if selected {
            Style::default().bg(color).fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(color)
        };

        frame.render_widget(
            Paragraph::new(Span::styled(format!(" {} ", suggestion.label), style)),
            button_area,
        );
        app.suggestion_areas.push(button_area);
        x = x.saturating_add(width + SUGGESTION_GAP);
    }

    frame.render_widget(
        Paragraph::new(Span::styled(
            "Include constraints and edge cases for detailed analysis",
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(Alignment::Center),
        tip_area,
    );
}

fn render_footer<S: AnswerSource>(app: &App<S>, frame: &mut Frame, area: Rect) {
    let mode_style = match app.focus {
        FocusPane::Input => Style::default().bg(Color::Yellow).fg(Color::Black),
        FocusPane::Suggestions => Style::default().bg(Color::Blue).fg(Color::White),
    };
    let mode_text = match app.focus {
        FocusPane::Input => " ASK ",
        FocusPane::Suggestions => " SUGGEST ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = match app.focus {
        FocusPane::Input => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" ask now ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" clear ", label_style),
        ],
        FocusPane::Suggestions => vec![
            Span::styled(" ←/→ ", key_style),
            Span::styled(" pick ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" ask ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" back ", label_style),
        ],
    };
    hints.extend(vec![
        Span::styled(" Tab ", key_style),
        Span::styled(" focus ", label_style),
        Span::styled(" ↑/↓ ", key_style),
        Span::styled(" scroll ", label_style),
        Span::styled(" Ctrl+C ", key_style),
        Span::styled(" quit ", label_style),
    ]);

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_support::app;
    use dsa_mentor_core::ERROR_MESSAGE;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw<S: AnswerSource>(app: &mut App<S>) -> String {
        draw_sized(app, 100, 30)
    }

    fn draw_sized<S: AnswerSource>(app: &mut App<S>, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let mut screen = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                screen.push_str(buffer[(x, y)].symbol());
            }
            screen.push('\n');
        }
        screen
    }

    #[tokio::test]
    async fn test_idle_screen() {
        let (mut app, _rx) = app();
        let screen = draw(&mut app);

        assert!(screen.contains("DSA Interview Mentor"));
        assert!(screen.contains("Algorithmic Reasoning Assistant"));
        assert!(screen.contains("Ask a DSA question"));
        assert!(screen.contains("Common questions:"));
        assert!(screen.contains("Binary Search"));
        assert!(screen.contains("Include constraints and edge cases"));
        // No clear hint without a query
        assert!(!screen.contains("Esc to clear"));
    }

    #[tokio::test]
    async fn test_loading_screen() {
        let (mut app, _rx) = app();
        app.insert_str("Two Sum");
        app.submit_input();
        let screen = draw(&mut app);

        assert!(screen.contains("Analyzing optimal approaches"));
        assert!(screen.contains("Evaluating time and space complexity"));
        assert!(screen.contains("Esc to clear"));
    }

    #[tokio::test]
    async fn test_answer_screen() {
        let (mut app, mut rx) = app();
        app.insert_str("Tries");
        app.submit_input();
        let event = rx.recv().await.unwrap();
        app.apply(event);

        let screen = draw(&mut app);
        assert!(screen.contains("Tries"));
        assert!(screen.contains("Some text."));
        assert!(!screen.contains("Analyzing optimal approaches"));
    }

    /// Fails every question the way a malformed reply would.
    #[derive(Clone)]
    struct Garbled;

    impl AnswerSource for Garbled {
        fn ask(
            &self,
            _question: &str,
        ) -> impl std::future::Future<Output = Result<String, dsa_mentor_core::AskError>> + Send
        {
            let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
            async move { Err(err.into()) }
        }
    }

    #[tokio::test]
    async fn test_error_message_rendered_as_text() {
        let (dispatcher, mut rx) =
            dsa_mentor_core::QueryDispatcher::new(Garbled, std::time::Duration::from_millis(700));
        let mut app = App::new(dispatcher);
        app.insert_str("graphs");
        app.submit_input();
        let event = rx.recv().await.unwrap();
        app.apply(event);

        let screen = draw(&mut app);
        assert!(screen.contains(ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_suggestion_hit_areas_recorded() {
        let (mut app, _rx) = app();
        draw(&mut app);

        assert_eq!(app.suggestion_areas.len(), SUGGESTIONS.len());
        let first = app.suggestion_areas[0];
        let second = app.suggestion_areas[1];
        assert!(first.x + first.width <= second.x);
        assert_eq!(first.y, second.y);
    }

    /// Answers every question with the same markdown.
    #[derive(Clone)]
    struct Canned(String);

    impl AnswerSource for Canned {
        fn ask(
            &self,
            _question: &str,
        ) -> impl std::future::Future<Output = Result<String, dsa_mentor_core::AskError>> + Send
        {
            let answer = self.0.clone();
            async move { Ok(answer) }
        }
    }

    #[tokio::test]
    async fn test_end_of_wrapped_answer_reachable() {
        // Each paragraph is three long words, so word wrapping needs a row per word
        let mut answer = (0..40)
            .map(|i| format!("p{i}{} {} {}", "x".repeat(30), "y".repeat(30), "z".repeat(30)))
            .collect::<Vec<_>>()
            .join("\n\n");
        answer.push_str("\n\nlast-paragraph");

        let (dispatcher, mut rx) =
            dsa_mentor_core::QueryDispatcher::new(Canned(answer), std::time::Duration::from_millis(700));
        let mut app = App::new(dispatcher);
        app.insert_str("sorting");
        app.submit_input();
        let event = rx.recv().await.unwrap();
        app.apply(event);

        let screen = draw_sized(&mut app, 60, 30);
        assert!(!screen.contains("last-paragraph"));

        app.scroll_down(u16::MAX);
        let screen = draw_sized(&mut app, 60, 30);
        assert!(screen.contains("p39"));
        assert!(screen.contains("last-paragraph"));
    }

    #[test]
    fn test_visible_input_short_text() {
        assert_eq!(visible_input("heap", 4, 20), ("heap".to_string(), 4));
        assert_eq!(visible_input("heap", 1, 20), ("heap".to_string(), 1));
        assert_eq!(visible_input("heap", 0, 0), (String::new(), 0));
    }

    #[test]
    fn test_visible_input_scrolls_to_cursor() {
        let (visible, col) = visible_input("abcdefghij", 10, 5);
        assert_eq!(visible, "ghij");
        assert_eq!(col, 4);
    }

    #[test]
    fn test_visible_input_counts_wide_chars() {
        // Each CJK char takes two columns
        assert_eq!(visible_input("ab你", 3, 10), ("ab你".to_string(), 4));

        let (visible, col) = visible_input("你好世界", 4, 5);
        assert_eq!(visible, "世界");
        assert_eq!(col, 4);
    }

    #[tokio::test]
    async fn test_cursor_sits_after_wide_text() {
        let (mut app, _rx) = app();
        app.insert_str("二分");

        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        // Inner row of the input box: above it sit footer, suggestions and the box itself
        let input_y = 30 - 1 - 3 - 3 + 1;
        assert_eq!(
            terminal.get_cursor_position().unwrap(),
            ratatui::layout::Position::new(1 + 4, input_y)
        );
    }
}
