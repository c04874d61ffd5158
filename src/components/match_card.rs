use match_feed::{Match, Odds};
use std::ops::Range;
use tui::buffer::Buffer;
use tui::layout::Rect;
use tui::style::{Color, Modifier, Style};
use tui::widgets::{Block, BorderType, Borders, Widget};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Rows per card: border, header, two team lines, odds line, border.
pub const CARD_HEIGHT: u16 = 6;

/// Width reserved for a score on the right of each team line.
const SCORE_WIDTH: usize = 4;

/// One match rendered as a bordered card.
pub struct MatchCard<'a> {
    pub game: &'a Match,
    pub selected: bool,
}

impl Widget for MatchCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_color = if self.selected { Color::Yellow } else { Color::DarkGray };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < 4 || inner.height < 4 {
            return;
        }
        let width = inner.width as usize;
        let muted = Style::default().fg(Color::Gray);
        let score_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

        // Header: sport, league, LIVE badge, time label on the right.
        let time_width = self.game.time.width().min(width / 2) as u16;
        let mut x = inner.x;
        let (next_x, _) = buf.set_stringn(x, inner.y, &self.game.sport, 2, Style::default());
        x = next_x + 1;
        if self.game.is_live {
            let badge = Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD);
            let (next_x, _) = buf.set_stringn(x, inner.y, "LIVE", 4, badge);
            x = next_x + 1;
        }
        let league_room = (inner.right().saturating_sub(time_width + 1)).saturating_sub(x);
        buf.set_stringn(x, inner.y, &self.game.league, league_room as usize, muted);
        buf.set_stringn(
            inner.right().saturating_sub(time_width),
            inner.y,
            &self.game.time,
            time_width as usize,
            muted,
        );

        // Teams with scores.
        let scores = self.game.score();
        for (row, (name, score)) in [
            (&self.game.team1, scores.map(|(s, _)| s)),
            (&self.game.team2, scores.map(|(_, s)| s)),
        ]
        .into_iter()
        .enumerate()
        {
            let y = inner.y + 1 + row as u16;
            let line = team_line(name, score, width);
            // The score cell is ASCII, so this is a char boundary.
            let (team_part, score_part) = line.split_at(line.len().saturating_sub(SCORE_WIDTH));
            let score_x = inner.x + width.saturating_sub(SCORE_WIDTH) as u16;
            buf.set_string(inner.x, y, team_part, Style::default().add_modifier(Modifier::BOLD));
            buf.set_string(score_x, y, score_part, score_style);
        }

        // Odds buttons.
        buf.set_stringn(
            inner.x,
            inner.y + 3,
            odds_line(&self.game.odds),
            width,
            Style::default().fg(Color::Cyan),
        );
    }
}

/// Team name padded or truncated so the score sits right-aligned.
/// Always exactly `width` terminal columns when `width >= SCORE_WIDTH`.
pub fn team_line(name: &str, score: Option<u32>, width: usize) -> String {
    let name_width = width.saturating_sub(SCORE_WIDTH);
    let name = truncate_name(name, name_width);
    let pad = name_width.saturating_sub(name.width());
    let score = score.map(|s| s.to_string()).unwrap_or_default();
    format!("{name}{:pad$}{score:>SCORE_WIDTH$}", "")
}

/// "1 1.85   X 3.40   2 4.20"; the draw cell only when the sport has one.
pub fn odds_line(odds: &Odds) -> String {
    let mut cells = vec![format!("1 {}", format_odds(odds.win1))];
    if let Some(draw) = odds.draw {
        cells.push(format!("X {}", format_odds(draw)));
    }
    cells.push(format!("2 {}", format_odds(odds.win2)));
    cells.join("   ")
}

pub fn format_odds(price: f64) -> String {
    format!("{price:.2}")
}

/// Range of card indices to draw so that `selected` stays on screen.
pub fn card_window(len: usize, selected: usize, capacity: usize) -> Range<usize> {
    if capacity == 0 || len == 0 {
        return 0..0;
    }
    let selected = selected.min(len - 1);
    let start = (selected + 1).saturating_sub(capacity);
    start..(start + capacity).min(len)
}

/// Cut `name` to at most `max` columns, ending in an ellipsis when cut.
fn truncate_name(name: &str, max: usize) -> String {
    if name.width() <= max {
        return name.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let budget = max - 1;
    let mut used = 0;
    let mut out = String::new();
    for c in name.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(is_live: bool) -> Match {
        Match {
            id: 1,
            sport: "⚽".into(),
            league: "Premier League".into(),
            team1: "Manchester City".into(),
            team2: "Liverpool".into(),
            score1: is_live.then_some(2),
            score2: is_live.then_some(1),
            time: "67'".into(),
            is_live,
            odds: Odds { win1: 1.85, draw: Some(3.4), win2: 4.2 },
        }
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (buf.area.x..buf.area.right())
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn team_line_is_exact_width() {
        let line = team_line("Manchester City", Some(2), 20);
        assert_eq!(line.chars().count(), 20, "line: {line:?}");
        assert!(line.ends_with("   2"));

        let long = team_line("Borussia Mönchengladbach", Some(101), 14);
        assert_eq!(long.chars().count(), 14, "line: {long:?}");
        assert!(long.contains('…'));
    }

    #[test]
    fn team_line_measures_wide_glyphs_in_columns() {
        let line = team_line("東京ヴェルディ", Some(3), 12);
        assert_eq!(line.width(), 12, "line: {line:?}");
        assert!(line.starts_with("東京ヴ…"), "line: {line:?}");
        assert!(line.ends_with("   3"));

        let fits = team_line("浦和", None, 10);
        assert_eq!(fits.width(), 10, "line: {fits:?}");
    }

    #[test]
    fn team_line_without_score_is_blank_on_the_right() {
        let line = team_line("CSKA", None, 12);
        assert_eq!(line, "CSKA        ");
    }

    #[test]
    fn odds_line_includes_draw_only_when_present() {
        let three_way = Odds { win1: 2.2, draw: Some(3.1), win2: 3.4 };
        let two_way = Odds { win1: 2.1, draw: None, win2: 1.7 };
        assert_eq!(odds_line(&three_way), "1 2.20   X 3.10   2 3.40");
        assert_eq!(odds_line(&two_way), "1 2.10   2 1.70");
    }

    #[test]
    fn card_window_keeps_selection_visible() {
        assert_eq!(card_window(10, 0, 3), 0..3);
        assert_eq!(card_window(10, 2, 3), 0..3);
        assert_eq!(card_window(10, 5, 3), 3..6);
        assert_eq!(card_window(10, 9, 3), 7..10);
        assert_eq!(card_window(2, 1, 5), 0..2);
        assert_eq!(card_window(0, 0, 5), 0..0);
        assert_eq!(card_window(4, 10, 2), 2..4);
    }

    #[test]
    fn live_card_renders_badge_scores_and_odds() {
        let game = game(true);
        let mut buf = Buffer::empty(Rect::new(0, 0, 40, CARD_HEIGHT));
        MatchCard { game: &game, selected: false }.render(buf.area, &mut buf);

        let header = row_text(&buf, 1);
        assert!(header.contains("LIVE"), "header: {header:?}");
        assert!(header.contains("67'"), "header: {header:?}");
        assert!(row_text(&buf, 2).contains("Manchester City"));
        assert!(row_text(&buf, 2).trim_end_matches('│').trim_end().ends_with('2'));
        assert!(row_text(&buf, 4).contains("X 3.40"));
    }

    #[test]
    fn wide_labels_stay_inside_the_border() {
        let mut game = game(true);
        game.time = "今日 20:00".into();
        game.team1 = "マンチェスター・シティ".into();
        let mut buf = Buffer::empty(Rect::new(0, 0, 30, CARD_HEIGHT));
        MatchCard { game: &game, selected: false }.render(buf.area, &mut buf);

        assert!(row_text(&buf, 1).contains("20:00"));
        for y in 1..CARD_HEIGHT - 1 {
            assert_eq!(buf[(29, y)].symbol(), "│", "row {y}: {:?}", row_text(&buf, y));
        }
        assert_eq!(buf[(28, 2)].symbol(), "2", "row: {:?}", row_text(&buf, 2));
    }

    #[test]
    fn upcoming_card_has_no_badge() {
        let game = game(false);
        let mut buf = Buffer::empty(Rect::new(0, 0, 40, CARD_HEIGHT));
        MatchCard { game: &game, selected: true }.render(buf.area, &mut buf);
        assert!(!row_text(&buf, 1).contains("LIVE"));
        assert!(row_text(&buf, 1).contains("Premier League"));
    }
}
