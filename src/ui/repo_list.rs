use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;

use crate::browser::Browser;
use crate::format::{list_budget, truncate};

pub fn render(frame: &mut Frame, browser: &Browser, area: Rect) {
    let budget = list_budget(area.width.saturating_sub(2));

    let items: Vec<ListItem> = browser
        .summaries()
        .iter()
        .enumerate()
        .map(|(i, repo)| {
            let selected = i == browser.selected;
            let name_style = if selected {
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::REVERSED)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };

            let stars = if repo.stars > 0 {
                format!("★ {}", repo.stars)
            } else {
                String::new()
            };

            let description = repo
                .description
                .as_deref()
                .map(|d| truncate(d, budget.desc))
                .unwrap_or_default();

            let line = Line::from(vec![
                Span::styled(
                    format!("{:<width$}", truncate(&repo.full_name, budget.name), width = budget.name),
                    name_style,
                ),
                Span::raw(" "),
                Span::styled(
                    format!("{:<width$}", stars, width = budget.stars),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(" "),
                Span::styled(description, Style::default().fg(Color::Gray)),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Repositories ({}) ", browser.summaries().len())),
    );

    let mut state = ListState::default();
    state.select(Some(browser.selected));

    frame.render_stateful_widget(list, area, &mut state);
}
