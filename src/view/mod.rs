//! TUI rendering and terminal management (impure shell)

pub mod constants;

use crate::config::ResolvedConfig;
use crate::list::{ConversationList, DelayedPreviewSource, PoolError, PreviewFetcher, RowPool};
use crate::model::Conversation;
use crate::parser::ParsedTranscript;
use constants::{FALLBACK_WIDTH, LINE_SCROLL, STATUS_BAR_HEIGHT};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Terminal;
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use unicode_width::UnicodeWidthStr;

/// How long the event loop waits for input before checking for previews.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// A row kind had no registered factory
    #[error("Row pool error: {0}")]
    Pool(#[from] PoolError),
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: Backend,
{
    terminal: Terminal<B>,
    list: ConversationList,
    fetcher: PreviewFetcher,
    skipped_lines: usize,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Put the terminal in raw mode on the alternate screen and build the app.
    pub fn new(list: ConversationList, fetcher: PreviewFetcher) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self::with_terminal(terminal, list, fetcher))
    }

    /// Run the main event loop
    ///
    /// Returns when the user quits (q or Ctrl+C). Redraws on input, resize,
    /// and when previews arrive; idle ticks draw nothing.
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.draw()?;

        loop {
            let mut dirty = false;

            if event::poll(TICK_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if self.handle_key(key) {
                            return Ok(());
                        }
                        dirty = true;
                    }
                    Event::Resize(width, height) => {
                        debug!(width, height, "Terminal resized");
                        dirty = true;
                    }
                    _ => {}
                }
            }

            if self.pump_previews() > 0 {
                dirty = true;
            }

            if dirty {
                self.draw()?;
            }
        }
    }
}

impl<B> TuiApp<B>
where
    B: Backend,
{
    /// Build the app around an already prepared terminal.
    pub fn with_terminal(
        terminal: Terminal<B>,
        list: ConversationList,
        fetcher: PreviewFetcher,
    ) -> Self {
        Self {
            terminal,
            list,
            fetcher,
            skipped_lines: 0,
        }
    }

    /// Number of transcript lines that failed to parse, shown in the status bar.
    pub fn set_skipped_lines(&mut self, skipped: usize) {
        self.skipped_lines = skipped;
    }

    /// The list being shown.
    pub fn list(&self) -> &ConversationList {
        &self.list
    }

    /// The terminal (tests inspect its backend).
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    /// Handle a single keyboard event
    ///
    /// Returns true if app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        let page = isize::try_from(self.list_area_height().max(1)).unwrap_or(isize::MAX);
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('j') | KeyCode::Down => self.list.scroll_by(LINE_SCROLL),
            KeyCode::Char('k') | KeyCode::Up => self.list.scroll_by(-LINE_SCROLL),
            KeyCode::PageDown | KeyCode::Char(' ') => self.list.scroll_by(page),
            KeyCode::PageUp => self.list.scroll_by(-page),
            KeyCode::Char('g') | KeyCode::Home => self.list.scroll_to_top(),
            KeyCode::Char('G') | KeyCode::End => self.list.scroll_to_bottom(),
            _ => {}
        }
        false
    }

    /// Apply every preview that finished since the last call.
    ///
    /// Returns how many results were drained, stale ones included.
    pub fn pump_previews(&mut self) -> usize {
        let results = self.fetcher.drain();
        let count = results.len();
        for result in results {
            self.list.apply_fill(result);
        }
        count
    }

    /// Lay out the list for the current terminal size, start the preview
    /// fetches visible rows still need, and render a frame.
    pub fn draw(&mut self) -> Result<(), TuiError> {
        let size = self.terminal.size()?;
        let area = Rect::new(0, 0, size.width, size.height);
        let [list_area, status_area] = split(area);

        let width = if list_area.width > 0 {
            list_area.width
        } else {
            FALLBACK_WIDTH
        };
        self.list.set_viewport(width, list_area.height);
        for request in self.list.layout()? {
            let message_id = request.message_id.clone();
            if let Err(e) = self.fetcher.request(request) {
                warn!(error = %e, %message_id, "Failed to start preview fetch");
                self.list.fetch_failed(&message_id);
            }
        }

        let status = status_line(
            &self.list,
            self.fetcher.in_flight(),
            self.skipped_lines,
            status_area.width,
        );
        let list = &self.list;
        self.terminal.draw(|frame| {
            frame.render_widget(list, list_area);
            frame.render_widget(
                Paragraph::new(status)
                    .style(Style::default().add_modifier(Modifier::REVERSED)),
                status_area,
            );
        })?;

        Ok(())
    }

    fn list_area_height(&self) -> u16 {
        self.terminal
            .size()
            .map(|size| size.height.saturating_sub(STATUS_BAR_HEIGHT))
            .unwrap_or(0)
    }
}

fn split(area: Rect) -> [Rect; 2] {
    Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(STATUS_BAR_HEIGHT),
    ])
    .areas(area)
}

/// Text of the status bar, fitted to `width` columns.
///
/// Segments keep their display order; when the text is too wide the least
/// important one is dropped until it fits. Skipped and message counts go last.
fn status_line(
    list: &ConversationList,
    loading: usize,
    skipped: usize,
    width: u16,
) -> Line<'static> {
    let conversation = list.conversation();
    let total = list.total_height();
    let line = if total == 0 { 0 } else { list.scroll_offset() + 1 };

    // (priority, text); lower priority is dropped first.
    let mut segments: Vec<(u8, String)> = vec![
        (4, count(conversation.len(), "message")),
        (1, count(conversation.section_count(), "day")),
    ];
    if skipped > 0 {
        segments.push((5, format!("{skipped} skipped")));
    }
    if loading > 0 {
        segments.push((2, format!("{loading} loading")));
    }
    segments.push((3, format!("line {line}/{total}")));
    if list.is_at_bottom() {
        segments.push((0, "end".to_string()));
    }

    let mut text = join_segments(&segments);
    while text.width() > usize::from(width) && segments.len() > 1 {
        let lowest = segments
            .iter()
            .enumerate()
            .min_by_key(|(_, (priority, _))| *priority)
            .map(|(index, _)| index);
        if let Some(index) = lowest {
            segments.remove(index);
        }
        text = join_segments(&segments);
    }
    Line::from(text)
}

fn join_segments(segments: &[(u8, String)]) -> String {
    let texts: Vec<&str> = segments.iter().map(|(_, text)| text.as_str()).collect();
    format!(" {}", texts.join(" | "))
}

fn count(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Build the list and fetcher for `transcript` and run the TUI until quit.
///
/// Logging must be initialized by the caller. The terminal is restored even
/// when the event loop fails.
pub fn run_with_transcript(
    transcript: ParsedTranscript,
    config: &ResolvedConfig,
) -> Result<(), TuiError> {
    let skipped = transcript.errors.len();
    let conversation = Conversation::new(transcript.messages, config.grouping_rules());
    info!(
        messages = conversation.len(),
        sections = conversation.section_count(),
        skipped,
        "Starting TUI"
    );

    let list = ConversationList::new(conversation, RowPool::for_conversation());
    let fetcher = PreviewFetcher::new(Arc::new(DelayedPreviewSource::new(config.preview_delay)));

    let mut app = TuiApp::new(list, fetcher)?;
    app.set_skipped_lines(skipped);

    let result = app.run();
    restore_terminal()?;
    result
}

/// Restore terminal to normal state
///
/// Disables raw mode and leaves the alternate screen.
pub fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
