use tui::backend::Backend;
use tui::layout::{Alignment, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::Line;
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs, Wrap};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::components::match_card::{CARD_HEIGHT, MatchCard, card_window};
use crate::ui::layout::LayoutAreas;
use chrono::Local;
use log::error;

const HELP_TEXT: &str = "q quit   1 live   2 upcoming   tab switch   j/k move   s sport filter   r refresh now   \" logs   f full screen   Esc back";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
            draw_footer(f, layout.footer, app);
        }

        match app.state.active_tab {
            MenuItem::Live | MenuItem::Upcoming => draw_matches(f, layout.main, app),
            MenuItem::Help => draw_placeholder(f, layout.main, HELP_TEXT),
        }

        if let Some(area) = layout.logs {
            draw_logs(f, area);
        }
    });

    if let Err(e) = result {
        error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Live => 0,
        MenuItem::Upcoming => 1,
        MenuItem::Help => 2,
    };

    let titles = vec![
        Line::from(format!("Live ({})", app.state.feed.live_count())),
        Line::from(format!("Upcoming ({})", app.state.feed.upcoming_count())),
        Line::from("Help"),
    ];
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let (status_text, status_style) = status_label(app);
    let status = Paragraph::new(status_text)
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(status_style);
    f.render_widget(status, tab_bar[1]);
}

/// Right side of the tab bar: last update time, or the failure marker.
fn status_label(app: &App) -> (String, Style) {
    let feed = &app.state.feed;
    let updated = feed
        .snapshot
        .fetched_at()
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string());

    match (feed.status.is_failing(), updated) {
        (true, Some(at)) => (format!("! stale since {at} "), Style::default().fg(Color::Red)),
        (true, None) => ("! feed unavailable ".to_string(), Style::default().fg(Color::Red)),
        (false, Some(at)) => (format!("updated {at} "), Style::default().fg(Color::White)),
        (false, None) => ("loading... ".to_string(), Style::default().fg(Color::DarkGray)),
    }
}

fn draw_matches(f: &mut Frame, area: Rect, app: &App) {
    let title = match app.state.feed.sport_filter {
        Some(sport) => format!(" {} · {} ", tab_title(app.state.active_tab), sport.label()),
        None => format!(" {} ", tab_title(app.state.active_tab)),
    };
    let block = default_border(Color::White).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let matches = app.visible_matches();
    if matches.is_empty() {
        f.render_widget(
            Paragraph::new(empty_message(app))
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            inner,
        );
        return;
    }

    let capacity = (inner.height / CARD_HEIGHT) as usize;
    let window = card_window(matches.len(), app.selected_index(), capacity);
    let selected = app.selected_index();
    for (row, idx) in window.enumerate() {
        let card_area = Rect::new(
            inner.x,
            inner.y + row as u16 * CARD_HEIGHT,
            inner.width,
            CARD_HEIGHT,
        );
        f.render_widget(
            MatchCard { game: matches[idx], selected: idx == selected },
            card_area,
        );
    }
}

fn empty_message(app: &App) -> String {
    let feed = &app.state.feed;
    if feed.snapshot.fetched_at().is_none() {
        return match feed.status.last_error.as_deref() {
            Some(err) => format!("Match feed unavailable:\n{err}"),
            None => format!("Loading matches from {}...", feed.source_label),
        };
    }
    match app.state.active_tab {
        MenuItem::Live => "No live matches right now".to_string(),
        _ => "No upcoming matches".to_string(),
    }
}

fn tab_title(tab: MenuItem) -> &'static str {
    match tab {
        MenuItem::Live => "Live",
        MenuItem::Upcoming => "Upcoming",
        MenuItem::Help => "Help",
    }
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App) {
    let filter = app
        .state
        .feed
        .sport_filter
        .map(|s| format!("{} {}", s.symbol(), s.label()))
        .unwrap_or_else(|| "All sports".to_string());
    let text = format!(
        " {} | {} | every {}s | ? help",
        app.state.feed.source_label,
        filter,
        app.settings.refresh_interval.as_secs()
    );
    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray))
        .output_separator(' ')
        .output_timestamp(Some("%H:%M:%S".to_string()))
        .output_target(false);
    f.render_widget(logs, area);
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        inner,
    );
}
