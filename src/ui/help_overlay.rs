//! Key binding overlay
//!
//! Drawn on top of the dashboard while `?` is toggled on.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Key bindings grouped by section, in display order
pub const KEY_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Datasets",
        &[
            ("Tab, l, →", "Next dataset"),
            ("S-Tab, h, ←", "Previous dataset"),
            ("1-6", "Jump to a dataset"),
            ("r", "Refresh from backend"),
        ],
    ),
    (
        "Filters",
        &[
            ("/", "Search records"),
            ("d", "Cycle date range"),
            ("c", "Cycle chain"),
        ],
    ),
    (
        "Table",
        &[("j, ↓ / k, ↑", "Scroll one row"), ("g / G", "First / last row")],
    ),
    ("General", &[("?", "Toggle this help"), ("q, Esc", "Quit")]),
];

const OVERLAY_WIDTH: u16 = 46;
const KEY_COLUMN: usize = 14;

fn overlay_lines() -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (section, bindings) in KEY_SECTIONS {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            *section,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        for (keys, action) in *bindings {
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {:<width$}", keys, width = KEY_COLUMN),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(*action),
            ]));
        }
    }
    lines
}

/// Renders the overlay centered in the frame
pub fn render(frame: &mut Frame) {
    let lines = overlay_lines();
    // Borders take two rows
    let height = lines.len() as u16 + 2;
    let area = centered_rect(OVERLAY_WIDTH, height, frame.area());

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Keys ")
                .title_bottom(Line::from(" ? or Esc to close ").right_aligned()),
        ),
        area,
    );
}

/// A `width` x `height` rect centered in `area`, shrunk to fit when `area` is smaller
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
