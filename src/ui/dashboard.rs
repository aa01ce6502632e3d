//! Dashboard screen
//!
//! Renders the dataset tabs, the active filters, and either a loading message, an
//! error with a retry hint, or the stat cards, charts and record table.

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Paragraph, Row, Sparkline, Table, Tabs},
    Frame,
};

use crate::app::{App, AppState};
use crate::data::{chain_label, Dataset};
use crate::present::{pie_slices, ChartPoint, DashboardView, StatCard};

/// Renders the whole dashboard for the current app state
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Length(1), // Filters
            Constraint::Min(5),    // Body
            Constraint::Length(1), // Footer
        ])
        .split(area);

    render_tabs(frame, app, chunks[0]);
    render_filter_bar(frame, app, chunks[1]);

    match &app.state {
        AppState::Loading => render_loading(frame, app.dataset, chunks[2]),
        AppState::Error(message) => render_error(frame, app.dataset, message, chunks[2]),
        AppState::Dashboard => match app.current_view() {
            Some(view) => render_view(frame, app, &view, chunks[2]),
            None => render_loading(frame, app.dataset, chunks[2]),
        },
    }

    render_footer(frame, app, chunks[3]);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Dataset::ALL
        .iter()
        .enumerate()
        .map(|(i, d)| Line::from(format!("{} {}", i + 1, d.title())))
        .collect();
    let selected = Dataset::ALL
        .iter()
        .position(|d| *d == app.dataset)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    " MINTDASH ",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )),
        )
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    frame.render_widget(tabs, area);
}

fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let chain = app
        .view
        .chain
        .as_deref()
        .map(chain_label)
        .unwrap_or_else(|| "All chains".to_string());
    let search = if app.search_mode {
        format!("{}_", app.view.search)
    } else if app.view.search.is_empty() {
        "-".to_string()
    } else {
        app.view.search.clone()
    };
    let search_style = if app.search_mode {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };

    let line = Line::from(vec![
        Span::styled(" Range: ", Style::default().fg(Color::DarkGray)),
        Span::raw(app.view.window.label()),
        Span::styled("  Chain: ", Style::default().fg(Color::DarkGray)),
        Span::raw(chain),
        Span::styled("  Search: ", Style::default().fg(Color::DarkGray)),
        Span::styled(search, search_style),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

fn render_loading(frame: &mut Frame, dataset: Dataset, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Percentage(45),
        ])
        .split(area);

    let text = Paragraph::new(format!("Loading {}...", dataset.title()))
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(text, chunks[1]);
}

fn render_error(frame: &mut Frame, dataset: Dataset, message: &str, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(3),
            Constraint::Percentage(40),
        ])
        .split(area);

    let lines = vec![
        Line::from(Span::styled(
            format!("Failed to load {}", dataset.title()),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            "Press r to retry",
            Style::default().fg(Color::Yellow),
        )),
    ];

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), chunks[1]);
}

fn render_view(frame: &mut Frame, app: &App, view: &DashboardView, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Cards
            Constraint::Length(10), // Charts
            Constraint::Min(3),     // Table
        ])
        .split(area);

    render_cards(frame, &view.cards, chunks[0]);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);
    render_bar_chart(frame, &view.chart_title, &view.chart, charts[0]);
    render_timeline(frame, &view.timeline_title, &view.timeline, charts[1]);

    render_table(frame, app, view, chunks[2]);
}

fn render_cards(frame: &mut Frame, cards: &[StatCard], area: Rect) {
    if cards.is_empty() {
        return;
    }
    let constraints = vec![Constraint::Ratio(1, cards.len() as u32); cards.len()];
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (card, slot) in cards.iter().zip(slots.iter()) {
        let paragraph = Paragraph::new(Span::styled(
            card.value.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    format!(" {} ", card.title),
                    Style::default().fg(Color::Cyan),
                )),
        );
        frame.render_widget(paragraph, *slot);
    }
}

fn render_bar_chart(frame: &mut Frame, title: &str, points: &[ChartPoint], area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", title));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    let bars: Vec<Bar> = points
        .iter()
        .map(|p| {
            Bar::default()
                .value(p.value.max(0.0).round() as u64)
                .label(Line::from(p.label.clone()))
        })
        .collect();
    let bar_width = if points.is_empty() {
        1
    } else {
        (parts[0].width / points.len() as u16).saturating_sub(1).clamp(1, 12)
    };
    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    frame.render_widget(chart, parts[0]);

    let legend: Vec<String> = pie_slices(points).iter().map(|s| s.legend()).collect();
    frame.render_widget(
        Paragraph::new(legend.join("  ")).style(Style::default().fg(Color::DarkGray)),
        parts[1],
    );
}

fn render_timeline(frame: &mut Frame, title: &str, points: &[ChartPoint], area: Rect) {
    let range = match (points.first(), points.last()) {
        (Some(first), Some(last)) => format!(" {} ({} - {}) ", title, first.label, last.label),
        _ => format!(" {} (no data) ", title),
    };
    let data: Vec<u64> = points.iter().map(|p| p.value.max(0.0).round() as u64).collect();

    let sparkline = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(range))
        .data(&data)
        .style(Style::default().fg(Color::Green));

    frame.render_widget(sparkline, area);
}

fn render_table(frame: &mut Frame, app: &App, view: &DashboardView, area: Rect) {
    let widths = vec![Constraint::Ratio(1, view.header.len().max(1) as u32); view.header.len()];
    let offset = app.scroll_offset.min(view.rows.len().saturating_sub(1));

    let rows: Vec<Row> = view
        .rows
        .iter()
        .skip(offset)
        .map(|r| Row::new(r.cells.clone()))
        .collect();

    let header = Row::new(view.header.clone()).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ({} records) ", app.dataset.title(), view.matched)),
    );

    frame.render_widget(table, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(status) = &app.status {
        Line::from(Span::styled(
            format!(" {}", status),
            Style::default().fg(Color::Yellow),
        ))
    } else if app.search_mode {
        Line::from(Span::styled(
            " Type to search  Enter: done  Esc: clear",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let refreshed = app
            .last_refresh
            .map(|t| format!("  Updated {}", t.with_timezone(&Local).format("%H:%M")))
            .unwrap_or_default();
        Line::from(Span::styled(
            format!(
                " Tab: dataset  /: search  d: range  c: chain  r: refresh  ?: help  q: quit{}",
                refreshed
            ),
            Style::default().fg(Color::DarkGray),
        ))
    };

    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StartupConfig;
    use crate::data::Payment;
    use crate::fetch::{Loaded, Origin};
    use crate::loader::DatasetData;
    use crate::refresh::LoadMessage;
    use chrono::Utc;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(app: &App, width: u16, height: u16) -> String {
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn revenue_app() -> App {
        let mut app = App::new(StartupConfig {
            dataset: Dataset::Revenue,
            ..Default::default()
        });
        let token = app.take_load_requests().remove(0).token;
        app.apply(LoadMessage::Loaded {
            dataset: Dataset::Revenue,
            token,
            loaded: Loaded {
                data: DatasetData::Revenue(vec![Payment {
                    signature: "sig-1".to_string(),
                    evm_address: "0xabc".to_string(),
                    amount: 12.5,
                    chain_id: "8453".to_string(),
                    token: None,
                    created_at: Utc::now(),
                }]),
                origin: Origin::Backend,
            },
        });
        app
    }

    #[test]
    fn test_loading_state_renders_message() {
        let app = App::new(StartupConfig::default());

        let content = buffer_text(&app, 120, 30);

        assert!(content.contains("MINTDASH"), "Should render title");
        assert!(content.contains("Loading User Analytics..."));
    }

    #[test]
    fn test_error_state_shows_retry_hint() {
        let mut app = App::new(StartupConfig::default());
        let token = app.take_load_requests().remove(0).token;
        app.apply(LoadMessage::Failed {
            dataset: Dataset::Users,
            token,
            error: "HTTP 500".to_string(),
        });

        let content = buffer_text(&app, 120, 30);

        assert!(content.contains("Failed to load User Analytics"));
        assert!(content.contains("HTTP 500"));
        assert!(content.contains("Press r to retry"));
    }

    #[test]
    fn test_dashboard_renders_cards_and_table() {
        let app = revenue_app();

        let content = buffer_text(&app, 140, 40);

        assert!(content.contains("Total Revenue"));
        assert!(content.contains("$12.50"));
        assert!(content.contains("Revenue by Chain"));
        assert!(content.contains("Signature"));
        assert!(content.contains("sig-1"));
        assert!(content.contains("(1 records)"));
    }

    #[test]
    fn test_filter_bar_shows_range_and_chain() {
        let mut app = revenue_app();
        app.view.chain = Some("8453".to_string());

        let content = buffer_text(&app, 140, 40);

        assert!(content.contains("Last 30 days"));
        assert!(content.contains("Chain: Base"));
    }

    #[test]
    fn test_search_mode_shows_cursor() {
        let mut app = revenue_app();
        app.search_mode = true;
        app.view.search = "sig".to_string();

        let content = buffer_text(&app, 140, 40);

        assert!(content.contains("sig_"));
        assert!(content.contains("Esc: clear"));
    }

    #[test]
    fn test_tabs_list_every_dataset() {
        let app = App::new(StartupConfig::default());

        let content = buffer_text(&app, 160, 30);

        for dataset in Dataset::ALL {
            assert!(content.contains(dataset.title()), "Missing tab {}", dataset.title());
        }
    }

    #[test]
    fn test_small_terminal_does_not_panic() {
        let app = revenue_app();
        buffer_text(&app, 20, 8);
    }
}
