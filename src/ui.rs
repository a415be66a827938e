//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! The layout is a vertical split: an optional search box, the article list
//! (or an empty-state message), and a one-line status bar.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let search_height = if app.search_input.is_some() { 3 } else { 0 };
    let [search_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(search_height),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    if app.search_input.is_some() {
        draw_search_box(app, frame, search_area);
    }
    if app.articles.is_empty() {
        draw_empty_state(app, frame, main_area);
    } else {
        draw_article_list(app, frame, main_area);
    }
    draw_status_bar(app, frame, status_area);
}

fn list_title(app: &App) -> String {
    let query = app.query.trim();
    let mut title = if query.is_empty() {
        " Latest ".to_string()
    } else {
        format!(" Search: {query} ")
    };
    if app.loading {
        title.push_str("(loading…) ");
    }
    title
}

fn draw_search_box(app: &App, frame: &mut Frame, area: Rect) {
    let text = app.search_input.as_deref().unwrap_or_default();
    let input = Paragraph::new(Line::from(vec![
        Span::raw(text),
        Span::styled("█", Style::default().fg(Color::DarkGray)),
    ]))
    .block(
        Block::default()
            .title(" Search (Enter: go, Esc: cancel) ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(input, area);
}

/// Render the scrollable article list, two lines per article.
fn draw_article_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let list_items: Vec<ListItem> = app
        .articles
        .iter()
        .map(|article| {
            let headline = Line::from(Span::styled(
                article.title(),
                Style::default().fg(Color::White),
            ));
            let byline = Line::from(vec![
                Span::styled(
                    format!("{:<11}", article.date_published()),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!("[{}]", article.section()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw("  "),
                Span::styled(article.contributor(), Style::default().fg(Color::Magenta)),
            ]);

            ListItem::new(vec![headline, byline])
        })
        .collect();

    let list = List::new(list_items)
        .block(Block::default().title(list_title(app)).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn draw_empty_state(app: &App, frame: &mut Frame, area: Rect) {
    let message = if app.loading {
        "Loading…"
    } else {
        app.empty_message
    };

    let paragraph = Paragraph::new(message)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(list_title(app)).borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} articles", app.articles.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  /: search  r: reload  c: clear  ↵: link"),
    ]));
    frame.render_widget(status, area);
}
