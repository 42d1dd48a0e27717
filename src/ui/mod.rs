mod content;
mod detail;
mod markdown;
mod repo_list;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::browser::Browser;

/// Compose the whole frame. Pure function of browser state and frame size;
/// widths are taken from the live areas so a resize is just the next render.
pub fn render(frame: &mut Frame, browser: &Browser) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, chunks[0]);

    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)])
        .split(chunks[1]);

    repo_list::render(frame, browser, main[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(0)])
        .split(main[1]);

    detail::render(frame, browser, right[0]);
    content::render(frame, browser, right[1]);

    render_status_bar(frame, browser, chunks[2]);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(Span::styled(
            "GitHub Repository Browser",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "j/k or ↑/↓: navigate  Enter/Space: load details  o: open in browser  c: clone  q: quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let header = Paragraph::new(text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn render_status_bar(frame: &mut Frame, browser: &Browser, area: Rect) {
    let line = if let Some(notice) = &browser.notice {
        Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        ))
    } else if browser.loading {
        Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        ))
    } else {
        Line::from(Span::styled(
            format!(
                "{} of {} repositories",
                browser.selected + 1,
                browser.summaries().len()
            ),
            Style::default().fg(Color::Gray),
        ))
    };

    let status = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, area);
}
