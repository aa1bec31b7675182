//! Drawing

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::app::App;

/// Draw the UI
pub fn draw_ui(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Games and details
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    draw_header(frame, chunks[0], app);

    if let Some(error) = &app.error {
        draw_diagnostic(frame, chunks[1], error);
    } else {
        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);
        draw_games(frame, main[0], app);
        draw_details(frame, main[1], app);
    }

    draw_footer(frame, chunks[2], app);

    if let Some(pending) = &app.confirm {
        draw_confirm(frame, &pending.prompt);
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let title = if app.error.is_some() {
        format!("MAMEly - {}", app.platform_name())
    } else {
        format!("MAMEly - {} - {}", app.platform_name(), app.active_category())
    };

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn draw_diagnostic(frame: &mut Frame, area: Rect, error: &str) {
    let text = Text::from(vec![
        Line::from(Span::styled(
            "This platform cannot be shown",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(error.to_string()),
        Line::from(""),
        Line::from("Press [E] for the next platform or [Q] to quit."),
    ]);

    let paragraph = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Error"))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn draw_games(frame: &mut Frame, area: Rect, app: &mut App) {
    // Borders take two rows
    app.page_size = usize::from(area.height.saturating_sub(2)).max(1);

    let title = app.active_category().to_string();

    if app.games.is_empty() {
        let empty = Paragraph::new("No games in this category")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .games
        .iter()
        .map(|game| {
            let prefix = if game.favorite { "★ " } else { "  " };
            ListItem::new(format!("{}{}", prefix, game.display_name))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.games_state);
}

fn label(name: &str) -> Span<'_> {
    Span::styled(name, Style::default().add_modifier(Modifier::BOLD))
}

fn draw_details(frame: &mut Frame, area: Rect, app: &App) {
    let content = match app.selected_game() {
        Some(game) => {
            let mut lines = Vec::new();

            match app.status() {
                Some(status) => lines.push(Line::from(Span::styled(
                    status.to_string(),
                    Style::default().fg(Color::Yellow),
                ))),
                None => {
                    lines.push(Line::from(vec![label("Genre: "), Span::raw(game.genre.as_str())]));
                    lines.push(Line::from(vec![label("Rating: "), Span::raw(game.rating.as_str())]));
                }
            }

            lines.push(Line::from(vec![label("ROM: "), Span::raw(game.id.as_str())]));

            if let Some(platform) = &app.platform {
                let snap = platform
                    .config
                    .find_snap(&game.id)
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "none".to_string());
                lines.push(Line::from(vec![label("Snap: "), Span::raw(snap)]));
            }

            let position = app.games_state.selected().map_or(0, |i| i + 1);
            lines.push(Line::from(""));
            lines.push(Line::from(format!("{} of {}", position, app.games.len())));

            Text::from(lines)
        }
        None => match app.status() {
            Some(status) => Text::raw(status.to_string()),
            None => Text::raw("No game selected"),
        },
    };

    let paragraph = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title("Details"))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let help_text = if app.confirm.is_some() {
        "[Enter] Confirm  [any key] Cancel"
    } else {
        "[↑↓] Move  [←→] Page  [Tab] Category  [E] Platform  [F] Favorite  [I] Ignore  [Enter] Run  [Q] Quit"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(help, area);
}

fn draw_confirm(frame: &mut Frame, prompt: &str) {
    let area = centered(frame.size(), 50, 5);
    let popup = Paragraph::new(prompt.to_string())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Confirm"))
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

/// A `width`% wide, `height` rows tall rectangle in the middle of `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = (u32::from(area.width) * u32::from(width) / 100) as u16;
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}
