use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::browser::Browser;
use crate::types::{FileEntry, FileKind, RepoDetail};

use super::markdown;

/// Content pane: file tree beside the rendered README once detail is
/// loaded, a hint paragraph before that.
pub fn render(frame: &mut Frame, browser: &Browser, area: Rect) {
    let Some(detail) = &browser.detail else {
        let hint = Paragraph::new("Press Enter to load repository details and README")
            .block(Block::default().borders(Borders::ALL).title(" README "))
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(hint, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)])
        .split(area);

    let tree = Paragraph::new(tree_lines(detail))
        .block(Block::default().borders(Borders::ALL).title(" Files "));
    frame.render_widget(tree, chunks[0]);

    let readme = match &detail.readme {
        Some(text) => markdown::render(text, Color::Gray),
        None => "No README available.".into(),
    };
    let readme = Paragraph::new(readme)
        .block(Block::default().borders(Borders::ALL).title(" README "))
        .wrap(Wrap { trim: false });
    frame.render_widget(readme, chunks[1]);
}

/// The documented degraded-mode tree shown when the file listing failed or
/// came back empty. Tests assert on these exact entries.
pub fn placeholder_tree() -> Vec<FileEntry> {
    vec![
        FileEntry {
            name: "src".to_string(),
            kind: FileKind::Dir,
        },
        FileEntry {
            name: "README.md".to_string(),
            kind: FileKind::File,
        },
        FileEntry {
            name: "LICENSE".to_string(),
            kind: FileKind::File,
        },
    ]
}

pub fn tree_lines(detail: &RepoDetail) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!("📁 {}", detail.full_name),
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    let degraded = detail.files.is_empty();
    let entries = if degraded {
        placeholder_tree()
    } else {
        detail.files.clone()
    };

    for entry in entries {
        let marker = match entry.kind {
            FileKind::Dir => "📁",
            FileKind::File => "📄",
        };
        lines.push(Line::from(format!("  {} {}", marker, entry.name)));
    }

    if degraded {
        lines.push(Line::from(Span::styled(
            "  repository structure unavailable",
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines
}
