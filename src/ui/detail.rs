use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::browser::Browser;
use crate::format::relative_date;

/// Detail pane. Before `LoadDetail` it previews the selected summary's
/// fields; after, it shows the full record including the URL.
pub fn render(frame: &mut Frame, browser: &Browser, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();

    match &browser.detail {
        None => {
            let repo = browser.selected_summary();
            lines.push(Line::from(Span::styled(
                repo.full_name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            if let Some(desc) = &repo.description {
                lines.push(Line::from(desc.clone()));
            }
            lines.push(stats_line(repo.language.as_deref(), repo.stars, repo.forks));
            if let Some(updated) = repo.updated_at {
                lines.push(updated_line(updated));
            }
        }
        Some(detail) => {
            lines.push(Line::from(Span::styled(
                detail.full_name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )));
            if let Some(desc) = &detail.description {
                lines.push(Line::from(desc.clone()));
            }
            lines.push(stats_line(detail.language.as_deref(), detail.stars, detail.forks));
            if let Some(updated) = detail.updated_at {
                lines.push(updated_line(updated));
            }
            if let Some(url) = &detail.url {
                lines.push(Line::from(vec![
                    Span::styled("URL: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(url.clone(), Style::default().fg(Color::Cyan)),
                ]));
            }
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Details "))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn stats_line(language: Option<&str>, stars: u64, forks: u64) -> Line<'static> {
    let mut spans = Vec::new();
    if let Some(lang) = language {
        spans.push(Span::styled("Language: ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            lang.to_string(),
            Style::default().fg(Color::Green),
        ));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled("Stars: ", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
        stars.to_string(),
        Style::default().fg(Color::Yellow),
    ));
    spans.push(Span::styled("  Forks: ", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
        forks.to_string(),
        Style::default().fg(Color::Cyan),
    ));
    Line::from(spans)
}

fn updated_line(updated: chrono::DateTime<chrono::Utc>) -> Line<'static> {
    Line::from(vec![
        Span::styled("Updated: ", Style::default().fg(Color::DarkGray)),
        Span::raw(relative_date(updated)),
    ])
}
