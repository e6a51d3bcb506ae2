use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::{app::App, render::CharClass, session::Phase};

const HORIZONTAL_MARGIN: u16 = 2;
const TAB_WIDTH: usize = 4;

struct Palette {
    correct: Style,
    incorrect: Style,
    current: Style,
    pending: Style,
}

impl Palette {
    fn new() -> Self {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);

        Self {
            correct: Style::default().patch(bold_style).fg(Color::Green),
            incorrect: Style::default().patch(bold_style).fg(Color::Red),
            current: Style::default()
                .patch(dim_bold_style)
                .add_modifier(Modifier::UNDERLINED),
            pending: dim_bold_style,
        }
    }

    fn style(&self, class: CharClass) -> Style {
        match class {
            CharClass::Correct => self.correct,
            CharClass::Incorrect => self.incorrect,
            CharClass::Current => self.current,
            CharClass::Pending => self.pending,
        }
    }
}

/// Visible glyph for a target char. Whitespace gets a marker where a plain blank would hide a mistake.
fn glyph(c: char, class: CharClass) -> String {
    let marked = matches!(class, CharClass::Incorrect | CharClass::Current);
    match c {
        '\n' if marked => "↵".to_string(),
        '\n' => String::new(),
        '\t' if marked => format!("→{}", " ".repeat(TAB_WIDTH - 1)),
        '\t' => " ".repeat(TAB_WIDTH),
        ' ' if class == CharClass::Incorrect => "·".to_string(),
        c => c.to_string(),
    }
}

/// Lays the target out in screen rows no wider than `width` and returns the row holding
/// the cursor. Rows break at newlines and wherever the next glyph would overflow.
pub fn text_rows(app: &App, width: usize) -> (Vec<Line<'static>>, usize) {
    let palette = Palette::new();
    let session = app.controller.session();
    let cursor = session.typed().len();
    let width = width.max(1);

    let mut rows = Vec::new();
    let mut spans = Vec::new();
    let mut row_width = 0;
    let mut cursor_row = 0;

    for (idx, c) in session.target().iter().enumerate() {
        let class = app.classes.get(idx).copied().unwrap_or(CharClass::Pending);
        let cell = glyph(*c, class);
        let cell_width = cell.width();

        if !spans.is_empty() && row_width + cell_width > width {
            rows.push(Line::from(std::mem::take(&mut spans)));
            row_width = 0;
        }
        if idx == cursor {
            cursor_row = rows.len();
        }
        spans.push(Span::styled(cell, palette.style(class)));
        row_width += cell_width;

        if *c == '\n' {
            rows.push(Line::from(std::mem::take(&mut spans)));
            row_width = 0;
        }
    }
    if !spans.is_empty() || rows.is_empty() {
        rows.push(Line::from(spans));
    }
    if cursor >= session.target().len() {
        cursor_row = rows.len().saturating_sub(1);
    }

    (rows, cursor_row)
}

fn stats_line(app: &App) -> Line<'static> {
    let label = Style::default().fg(Color::Gray);
    let value = Style::default().add_modifier(Modifier::BOLD);
    let stats = &app.stats;

    Line::from(vec![
        Span::styled("WPM ", label),
        Span::styled(stats.wpm_label(), value),
        Span::raw("   "),
        Span::styled("Accuracy ", label),
        Span::styled(stats.accuracy_label(), value),
        Span::raw("   "),
        Span::styled("Time ", label),
        Span::styled(stats.remaining_label(), value),
        Span::raw("   "),
        Span::styled("Progress ", label),
        Span::styled(stats.progress_label(), value),
    ])
}

fn status_style(phase: Phase, paused: bool) -> Style {
    match (phase, paused) {
        (_, true) => Style::default().fg(Color::Yellow),
        (Phase::Finished, _) => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        _ => Style::default().add_modifier(Modifier::ITALIC),
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(1), // source info
                Constraint::Length(1), // stats
                Constraint::Min(3),    // text
                Constraint::Length(1), // status
                Constraint::Length(1), // legend
            ])
            .split(area);

        let info = self
            .active_source()
            .map(|s| s.info())
            .unwrap_or_else(|| "no text loaded".to_string());
        Paragraph::new(Span::styled(
            format!("{info} | {}s", self.controller.timer_seconds()),
            Style::default().fg(Color::Cyan),
        ))
        .render(chunks[0], buf);

        Paragraph::new(stats_line(self))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        let text_area = chunks[2];
        let inner_width = text_area.width.saturating_sub(2) as usize;
        let inner_height = text_area.height.saturating_sub(2) as usize;
        let (rows, cursor_row) = text_rows(self, inner_width);
        // keep the cursor row roughly centered once the text outgrows the box
        let scroll = cursor_row.saturating_sub(inner_height / 2) as u16;

        let widest = self
            .controller
            .session()
            .target_string()
            .lines()
            .map(|l| l.width())
            .max()
            .unwrap_or(0);
        let finished = self.controller.session().is_finished();
        let row_count = rows.len();

        Paragraph::new(rows)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(if finished {
                        Style::default().add_modifier(Modifier::DIM)
                    } else {
                        Style::default()
                    }),
            )
            .alignment(
                if widest < inner_width && row_count == 1 {
                    Alignment::Center
                } else {
                    Alignment::Left
                },
            )
            .scroll((scroll, 0))
            .render(text_area, buf);

        let session = self.controller.session();
        let status = if session.is_paused() {
            "Paused.".to_string()
        } else {
            self.controller.status().to_string()
        };
        Paragraph::new(Span::styled(
            status,
            status_style(session.phase(), session.is_paused()),
        ))
        .render(chunks[3], buf);

        Paragraph::new(Span::styled(
            "(^r)estart / (^n)ext / (^p)rev / (^t)ime / (esc)ape",
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(chunks[4], buf);
    }
}
