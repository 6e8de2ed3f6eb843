use dsa_mentor_core::{AnswerSource, DispatchEvent, QueryDispatcher, QueryState, SUGGESTIONS};
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::{Paragraph, Wrap};

use crate::markdown::render_markdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Input,
    Suggestions,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App<S> {
    pub should_quit: bool,
    pub focus: FocusPane,
    pub dispatcher: QueryDispatcher<S>,

    // Input state
    pub cursor: usize, // cursor position in the query, in chars
    pub selected_suggestion: usize,

    // Answer view state
    pub answer_lines: Vec<Line<'static>>,
    rendered_answer: String,
    pub answer_scroll: u16,
    pub answer_height: u16, // inner height of the answer panel
    pub answer_width: u16,  // inner width, for wrap calculations
    answer_rows: u16,       // rows the answer wraps to at answer_width

    // Animation state
    pub animation_frame: usize,

    // Panel areas for mouse hit-testing (updated during render)
    pub answer_area: Option<Rect>,
    pub suggestion_areas: Vec<Rect>,
}

impl<S: AnswerSource> App<S> {
    pub fn new(dispatcher: QueryDispatcher<S>) -> Self {
        Self {
            should_quit: false,
            focus: FocusPane::Input,
            dispatcher,

            cursor: 0,
            selected_suggestion: 0,

            answer_lines: Vec::new(),
            rendered_answer: String::new(),
            answer_scroll: 0,
            answer_height: 0,
            answer_width: 0,
            answer_rows: 0,

            animation_frame: 0,

            answer_area: None,
            suggestion_areas: Vec::new(),
        }
    }

    pub fn state(&self) -> &QueryState {
        self.dispatcher.state()
    }

    /// Feed a timer or request report back into the dispatcher.
    pub fn apply(&mut self, event: DispatchEvent) {
        self.dispatcher.apply(event);
        self.sync_answer();
    }

    /// Re-render the answer only when its text changed.
    fn sync_answer(&mut self) {
        if self.state().answer != self.rendered_answer {
            self.rendered_answer = self.state().answer.clone();
            self.answer_lines = render_markdown(&self.rendered_answer);
            self.answer_scroll = 0;
            self.measure_answer();
        }
    }

    // Input editing
    pub fn insert_char(&mut self, c: char) {
        let mut query = self.state().query.clone();
        let byte_pos = char_to_byte_index(&query, self.cursor);
        query.insert(byte_pos, c);
        self.cursor += 1;
        self.dispatcher.on_input_changed(&query);
    }

    pub fn insert_str(&mut self, text: &str) {
        // Single-line input: newlines from a paste become spaces
        let text: String = text
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        if text.is_empty() {
            return;
        }

        let mut query = self.state().query.clone();
        let byte_pos = char_to_byte_index(&query, self.cursor);
        query.insert_str(byte_pos, &text);
        self.cursor += text.chars().count();
        self.dispatcher.on_input_changed(&query);
    }

    pub fn delete_before_cursor(&mut self) {
        if self.cursor > 0 {
            let mut query = self.state().query.clone();
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&query, self.cursor);
            query.remove(byte_pos);
            self.dispatcher.on_input_changed(&query);
        }
    }

    pub fn delete_at_cursor(&mut self) {
        let char_count = self.state().query.chars().count();
        if self.cursor < char_count {
            let mut query = self.state().query.clone();
            let byte_pos = char_to_byte_index(&query, self.cursor);
            query.remove(byte_pos);
            self.dispatcher.on_input_changed(&query);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.state().query.chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.state().query.chars().count();
    }

    // Submitting
    pub fn submit_input(&mut self) {
        let query = self.state().query.clone();
        self.dispatcher.on_submit_requested(&query);
    }

    pub fn submit_suggestion(&mut self, index: usize) {
        if let Some(suggestion) = SUGGESTIONS.get(index) {
            self.selected_suggestion = index;
            self.dispatcher.on_submit_requested(suggestion.question);
            self.cursor_end();
            self.focus = FocusPane::Input;
        }
    }

    pub fn clear(&mut self) {
        self.dispatcher.on_clear_requested();
        self.cursor = 0;
        self.sync_answer();
    }

    // Suggestion navigation
    pub fn suggestion_next(&mut self) {
        self.selected_suggestion = (self.selected_suggestion + 1) % SUGGESTIONS.len();
    }

    pub fn suggestion_prev(&mut self) {
        self.selected_suggestion =
            (self.selected_suggestion + SUGGESTIONS.len() - 1) % SUGGESTIONS.len();
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPane::Input => FocusPane::Suggestions,
            FocusPane::Suggestions => FocusPane::Input,
        };
    }

    // Answer scrolling

    /// Record the answer panel's inner size, re-wrapping when the width changed.
    pub fn resize_answer(&mut self, width: u16, height: u16) {
        self.answer_height = height;
        if width != self.answer_width {
            self.answer_width = width;
            self.measure_answer();
        }
    }

    /// Count rows with the same word wrapping the answer panel renders with.
    fn measure_answer(&mut self) {
        // Use actual panel width for wrap calculation, default to 80 if not set
        let wrap_width = if self.answer_width > 0 { self.answer_width } else { 80 };

        let rows = Paragraph::new(self.answer_lines.clone())
            .wrap(Wrap { trim: false })
            .line_count(wrap_width);
        self.answer_rows = u16::try_from(rows).unwrap_or(u16::MAX);
    }

    pub fn max_scroll(&self) -> u16 {
        self.answer_rows.saturating_sub(self.answer_height)
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.answer_scroll = self.answer_scroll.saturating_add(lines).min(self.max_scroll());
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.answer_scroll = self.answer_scroll.saturating_sub(lines);
    }

    pub fn half_page(&self) -> u16 {
        (self.answer_height / 2).max(1)
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.state().loading {
            self.animation_frame = self.animation_frame.wrapping_add(1);
        }
    }
}
