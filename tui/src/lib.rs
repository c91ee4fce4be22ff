//! Terminal rendering for Missive.
//!
//! Pure rendering over [`missive_engine::App`]: the engine owns all state,
//! this crate draws it and (in [`input`]) maps key events onto engine
//! methods.

pub mod input;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap,
};
use unicode_width::UnicodeWidthStr;

use missive_engine::{App, NoticeKind, SettingsFocus, Tab};

pub use input::{InputOutcome, handle_events};

const ACCENT: Color = Color::Cyan;
const MUTED: Color = Color::DarkGray;
const MASKED_KEY_PLACEHOLDER: &str = "***************** (Saved)";

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(5),    // Body
            Constraint::Length(1), // Notice / hints
        ])
        .split(frame.area());

    draw_tab_bar(frame, app, chunks[0]);
    match app.view.tab {
        Tab::General => draw_general(frame, app, chunks[1]),
        Tab::Settings => draw_settings(frame, app, chunks[1]),
        Tab::History => draw_history(frame, app, chunks[1]),
    }
    draw_status_line(frame, app, chunks[2]);

    if app.view.confirm.is_some() {
        draw_confirm_modal(frame, app);
    }
}

fn draw_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let titles = Tab::ALL.iter().map(|t| Line::from(t.title()));
    let selected = Tab::ALL
        .iter()
        .position(|t| *t == app.view.tab)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(" Missive "),
        );
    frame.render_widget(tabs, area);
}

fn draw_general(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Job URL
            Constraint::Length(3), // Language + style
            Constraint::Min(3),    // Output
        ])
        .split(area);

    let url = Paragraph::new(app.view.url_field.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT))
            .title(" Job posting URL "),
    );
    frame.render_widget(url, chunks[0]);

    let options = Line::from(vec![
        Span::styled("Language: ", Style::default().fg(MUTED)),
        Span::styled(
            app.view.language.name(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  <-/->", Style::default().fg(MUTED)),
        Span::raw("    "),
        Span::styled("Style: ", Style::default().fg(MUTED)),
        Span::styled(
            app.view.style.label(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled("  ^T", Style::default().fg(MUTED)),
    ]);
    let options = Paragraph::new(options).block(Block::default().borders(Borders::ALL));
    frame.render_widget(options, chunks[1]);

    let title = if app.busy() {
        " Letter (generating...) "
    } else {
        " Letter "
    };
    let output = Paragraph::new(app.output())
        .wrap(Wrap { trim: false })
        .scroll((app.view.output_scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(title),
        );
    frame.render_widget(output, chunks[2]);
}

fn draw_settings(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // CV editor
            Constraint::Length(3), // API key
        ])
        .split(area);

    let cv_focused = app.view.settings_focus == SettingsFocus::Cv;
    let cv = Paragraph::new(app.view.cv_field.as_str())
        .wrap(Wrap { trim: false })
        .block(titled_block(" CV (^S to save) ", cv_focused));
    frame.render_widget(cv, chunks[0]);

    let key_focused = app.view.settings_focus == SettingsFocus::ApiKey;
    // The stored key is never rendered; typed input shows as bullets and a
    // saved key only as a masked placeholder.
    let key_text: Text = if app.view.api_key_field.is_empty() {
        if app.view.api_key_saved {
            Text::from(Line::styled(
                MASKED_KEY_PLACEHOLDER,
                Style::default().fg(MUTED),
            ))
        } else {
            Text::from(Line::styled(
                "Paste your Gemini API key, Enter to save",
                Style::default().fg(MUTED),
            ))
        }
    } else {
        Text::from("*".repeat(app.view.api_key_field.as_str().chars().count()))
    };
    let key = Paragraph::new(key_text).block(titled_block(" API key (Enter to save) ", key_focused));
    frame.render_widget(key, chunks[1]);
}

fn titled_block(title: &str, focused: bool) -> Block<'_> {
    let style = if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(MUTED)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title)
}

fn draw_history(frame: &mut Frame, app: &App, area: Rect) {
    let records = app.records();
    if records.is_empty() {
        let empty = Paragraph::new("No history yet...")
            .style(Style::default().fg(MUTED))
            .block(Block::default().borders(Borders::ALL).title(" History "));
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    // Most recent first.
    let items: Vec<ListItem> = records
        .iter()
        .rev()
        .map(|record| {
            let kind = if record.is_manual() {
                "Manual"
            } else {
                "Generated"
            };
            let header = Line::from(vec![
                Span::styled(record.date.clone(), Style::default().fg(ACCENT)),
                Span::raw("  "),
                Span::styled(kind, Style::default().fg(MUTED)),
                Span::styled(
                    if record.has_letter() { "  [letter]" } else { "" },
                    Style::default().fg(MUTED),
                ),
            ]);
            let url = Line::from(truncate_to_width(&record.url, width));
            ListItem::new(Text::from(vec![header, url]))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(format!(" History ({}) ", records.len())),
        );

    let mut state = ListState::default().with_selected(Some(
        app.view.history_selected.min(records.len() - 1),
    ));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_status_line(frame: &mut Frame, app: &App, area: Rect) {
    let line = if let Some(notice) = app.notice() {
        let style = match notice.kind() {
            NoticeKind::Info => Style::default().fg(Color::Green),
            NoticeKind::Error => Style::default().fg(Color::Red),
        };
        Line::styled(notice.text().to_string(), style)
    } else {
        Line::styled(hints_for(app.view.tab), Style::default().fg(MUTED))
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Left), area);
}

fn hints_for(tab: Tab) -> &'static str {
    match tab {
        Tab::General => "Enter generate  ^T style  ^D save letter  Tab switch tab  ^C quit",
        Tab::Settings => "Up/Down focus  ^S save CV  Enter save key  Tab switch tab  ^C quit",
        Tab::History => {
            "Enter view  d delete  c clear  e export CSV  m manual entry  Tab switch tab  ^C quit"
        }
    }
}

fn draw_confirm_modal(frame: &mut Frame, app: &App) {
    let Some(action) = app.view.confirm else {
        return;
    };

    let area = centered_rect(frame.area(), 40, 5);
    frame.render_widget(Clear, area);

    let body = Paragraph::new(vec![
        Line::from(action.question()),
        Line::from(""),
        Line::styled("y confirm    n cancel", Style::default().fg(MUTED)),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Red))
            .title(" Confirm "),
    );
    frame.render_widget(body, area);
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let budget = max_width.saturating_sub(3);
    for c in text.chars() {
        if out.width() >= budget {
            break;
        }
        out.push(c);
    }
    out.push_str("...");
    out
}
