use std::time::Instant;

use affirm_core::{format_cell, BannerKind, DashboardTab, Feedback, PinTarget};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Row, Table, Tabs, Wrap},
};

use crate::app::{App, Screen};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, banner, footer
    let [header_area, body_area, banner_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Home => render_home(app, frame, body_area),
        Screen::Dashboard => render_dashboard(app, frame, body_area),
    }

    render_banner(app, frame, banner_area);
    render_footer(app, frame, footer_area);

    // Popups: a blocking notice wins over an open form
    if let Some(Feedback::Dialog { title, message }) = &app.feedback {
        render_blocking_notice(title, message, frame, area);
    } else if app.dialog.is_some() {
        render_dialog(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let loading = if app.is_loading() {
        format!(" loading{}", ".".repeat(app.animation_frame as usize + 1))
    } else {
        String::new()
    };

    let title = Line::from(vec![
        Span::styled(" Affirmations ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.base_url().to_string(), Style::default().fg(Color::Gray)),
        Span::styled(loading, Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_home(app: &mut App, frame: &mut Frame, area: Rect) {
    let [filter_area, view_area] = Layout::horizontal([
        Constraint::Length(24),
        Constraint::Min(0),
    ])
    .areas(area);

    let items: Vec<ListItem> = app
        .filter_options()
        .into_iter()
        .map(|(_, name)| ListItem::new(format!(" {} ", name)))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Category "))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, filter_area, &mut app.filter_state);

    let panel = app.fetcher.view();
    let mut lines = vec![Line::default()];

    if panel.text.is_empty() {
        lines.push(Line::styled(
            "Press r for an affirmation",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        lines.push(Line::styled(
            panel.text.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    }
    lines.push(Line::default());
    if !panel.categories.is_empty() {
        lines.push(Line::styled(panel.categories.clone(), Style::default().fg(Color::Cyan)));
    }

    let pin_line = match panel.pin {
        PinTarget::Enabled(id) => Span::styled(format!("[p] pin #{}", id), Style::default().fg(Color::Green)),
        PinTarget::Disabled => Span::styled("[p] pin unavailable", Style::default().fg(Color::DarkGray)),
    };
    lines.push(Line::default());
    lines.push(Line::from(pin_line));

    if let Some(notice) = panel.visible_notice(Instant::now()) {
        lines.push(Line::default());
        lines.push(Line::styled(
            notice.to_string(),
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ));
    }

    let view = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(" Affirmation "))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(view, view_area);
}

fn render_dashboard(app: &App, frame: &mut Frame, area: Rect) {
    let [tabs_area, table_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let tabs = DashboardTab::all();
    let selected = tabs.iter().position(|t| *t == app.dashboard_tab).unwrap_or(0);
    let titles: Vec<String> = tabs.iter().map(|t| t.display_name().to_string()).collect();

    let tab_bar = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Dashboard "))
        .select(selected)
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    frame.render_widget(tab_bar, tabs_area);

    let header_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let block = Block::default().borders(Borders::ALL);

    let table = match app.dashboard_tab {
        DashboardTab::Users => {
            let session = if app.config.session_cookie.is_some() { "signed in" } else { "anonymous" };
            let rows = vec![
                Row::new(vec!["Server".to_string(), app.base_url().to_string()]),
                Row::new(vec!["Session".to_string(), session.to_string()]),
                Row::new(vec!["Default filter".to_string(), app.config.default_filter().to_string()]),
                Row::new(vec!["Known categories".to_string(), app.config.categories.len().to_string()]),
            ];
            Table::new(rows, [Constraint::Length(18), Constraint::Min(0)])
                .header(Row::new(vec!["Setting", "Value"]).style(header_style))
        }
        DashboardTab::Affirmations => {
            let rows = app.seen.iter().map(|seen| {
                Row::new(vec![
                    seen.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
                    seen.text.clone(),
                    seen.categories.clone(),
                    format_cell(&seen.seen_at),
                ])
            });
            Table::new(
                rows,
                [
                    Constraint::Length(6),
                    Constraint::Min(20),
                    Constraint::Length(20),
                    Constraint::Length(24),
                ],
            )
            .header(Row::new(vec!["ID", "Affirmation", "Categories", "Seen"]).style(header_style))
        }
        DashboardTab::Categories => {
            let rows = app.config.categories.iter().map(|c| {
                Row::new(vec![c.id.to_string(), c.name.clone()])
            });
            Table::new(rows, [Constraint::Length(6), Constraint::Min(0)])
                .header(Row::new(vec!["ID", "Name"]).style(header_style))
        }
    };

    frame.render_widget(table.block(block), table_area);
}

fn render_banner(app: &App, frame: &mut Frame, area: Rect) {
    let Some(Feedback::Banner { kind, message }) = &app.feedback else {
        return;
    };

    let style = match kind {
        BannerKind::Success => Style::default().bg(Color::Green).fg(Color::Black),
        BannerKind::Error => Style::default().bg(Color::Red).fg(Color::White),
    };

    let banner = Paragraph::new(format!(" {}  (Esc to dismiss)", message)).style(style);
    frame.render_widget(banner, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = Style::default().bg(Color::Blue).fg(Color::White);
    let mode_text = match app.screen {
        Screen::Home => " HOME ",
        Screen::Dashboard => " DASHBOARD ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let keys: &[(&str, &str)] = if app.dialog.is_some() {
        &[("Tab", "next field"), ("Enter", "submit"), ("Esc", "cancel")]
    } else {
        match app.screen {
            Screen::Home => &[
                ("j/k", "category"),
                ("r", "another"),
                ("p/u", "pin/unpin"),
                ("s", "save"),
                ("F", "favorite"),
                ("c", "categorize"),
                ("f", "filter id"),
                ("d", "dashboard"),
                ("q", "quit"),
            ],
            Screen::Dashboard if app.dashboard_tab == DashboardTab::Users => &[
                ("h/l", "tab"),
                ("b", "back"),
                ("q", "quit"),
            ],
            Screen::Dashboard => &[
                ("h/l", "tab"),
                ("a", "add"),
                ("e", "edit"),
                ("x", "delete"),
                ("b", "back"),
                ("q", "quit"),
            ],
        }
    };

    let mut spans = vec![Span::styled(mode_text, mode_style)];
    for (key, label) in keys {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_dialog(app: &App, frame: &mut Frame, area: Rect) {
    let Some(dialog) = &app.dialog else {
        return;
    };

    // Each field takes a label row and an input row
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = (dialog.fields.len() as u16 * 2 + 4).min(area.height.saturating_sub(2));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(dialog.kind.title());

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines = Vec::new();
    for (i, field) in dialog.fields.iter().enumerate() {
        let focused = i == dialog.focus;
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        lines.push(Line::styled(field.label, label_style));
        lines.push(Line::from(format!("> {}", field.value)));
    }

    match &dialog.error {
        Some(error) => lines.push(Line::styled(error.clone(), Style::default().fg(Color::Red))),
        None => lines.push(Line::styled(
            "Enter to submit, Esc to cancel",
            Style::default().fg(Color::DarkGray),
        )),
    }

    frame.render_widget(Paragraph::new(Text::from(lines)), inner);

    // Cursor at the end of the focused input
    if let Some(field) = dialog.fields.get(dialog.focus) {
        let row = inner.y + dialog.focus as u16 * 2 + 1;
        let col = (field.value.chars().count() as u16 + 2).min(inner.width.saturating_sub(1));
        if row < inner.y + inner.height {
            frame.set_cursor_position((inner.x + col, row));
        }
    }
}

fn render_blocking_notice(title: &str, message: &str, frame: &mut Frame, area: Rect) {
    let popup_width = 50.min(area.width.saturating_sub(4));
    let popup_height = 6;

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let text = Text::from(vec![
        Line::from(message.to_string()),
        Line::default(),
        Line::styled("Press Enter to close", Style::default().fg(Color::DarkGray)),
    ]);

    let popup = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(format!(" {} ", title)),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(popup, popup_area);
}
