pub mod charting;
pub mod screen;
pub mod stats_view;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Gauge, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use typespark::{
    clock::Clock,
    coordinator::Coordinator,
    scoring::CharStatus,
    session::PHASE_COUNT,
    theme::Theme,
    util::format_countdown,
};

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

const KEYBOARD_ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl", "zxcvbnm"];
// letter rows plus the space bar
const KEYBOARD_HEIGHT: u16 = KEYBOARD_ROWS.len() as u16 + 1;

/// Colors for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color,
    pub text: Color,
    pub dim: Color,
    pub correct: Color,
    pub incorrect: Color,
    pub accent: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                background: Color::White,
                text: Color::Black,
                dim: Color::Gray,
                correct: Color::Green,
                incorrect: Color::Red,
                accent: Color::Blue,
            },
            Theme::Dark => Self {
                background: Color::Reset,
                text: Color::White,
                dim: Color::DarkGray,
                correct: Color::Green,
                incorrect: Color::Red,
                accent: Color::Magenta,
            },
            Theme::EyeCare => Self {
                background: Color::Rgb(244, 236, 216),
                text: Color::Rgb(67, 56, 40),
                dim: Color::Rgb(150, 138, 115),
                correct: Color::Rgb(84, 130, 74),
                incorrect: Color::Rgb(176, 72, 52),
                accent: Color::Rgb(160, 112, 40),
            },
        }
    }

    fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }
}

pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(app.state).render(app, f);
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let palette = Palette::for_theme(self.theme);
        Block::default().style(palette.base()).render(area, buf);

        match self.state {
            AppState::Session => render_session(self, &palette, area, buf),
            AppState::Completed => render_completed(self, &palette, area, buf),
            // drawn by stats_view against the frame
            AppState::Stats => {}
        }
    }
}

fn render_session(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let coordinator = &app.coordinator;
    let (Some(phase), Some(attempt)) = (coordinator.current_phase(), coordinator.attempt()) else {
        Paragraph::new("(n)ew session / (s)tats / (esc)ape")
            .style(palette.base())
            .alignment(Alignment::Center)
            .render(area, buf);
        return;
    };

    let bold = palette.base().add_modifier(Modifier::BOLD);
    let dim_bold = bold.fg(palette.dim);

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_lines =
        ((phase.text.width() as f64 / max_chars_per_line as f64).ceil() as u16).max(1);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),            // phase header
            Constraint::Length(1),            // session progress
            Constraint::Length(1),            // padding
            Constraint::Min(prompt_lines),    // prompt
            Constraint::Length(1),            // phase status
            Constraint::Length(1),            // padding
            Constraint::Length(KEYBOARD_HEIGHT),
            Constraint::Length(1),            // legend
        ])
        .split(area);

    let header = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(6)])
        .split(chunks[0]);

    let phase_index = coordinator.current_phase_index().unwrap_or(0);
    Paragraph::new(Span::styled(
        format!(
            "Phase {} of {} · {}",
            phase_index + 1,
            PHASE_COUNT,
            phase.mode.label()
        ),
        bold,
    ))
    .render(header[0], buf);

    Paragraph::new(Span::styled(
        format_countdown(coordinator.seconds_remaining().unwrap_or(0)),
        bold.fg(palette.accent),
    ))
    .alignment(Alignment::Right)
    .render(header[1], buf);

    Gauge::default()
        .gauge_style(Style::default().fg(palette.accent).bg(palette.background))
        .percent(coordinator.progress_percent().min(100) as u16)
        .render(chunks[1], buf);

    let spans = attempt
        .prompt()
        .iter()
        .enumerate()
        .map(|(idx, &expected)| match attempt.status_at(idx) {
            CharStatus::Correct => Span::styled(expected.to_string(), bold.fg(palette.correct)),
            CharStatus::Incorrect => Span::styled(
                match attempt.input()[idx] {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                bold.fg(palette.incorrect),
            ),
            CharStatus::Current => Span::styled(
                expected.to_string(),
                dim_bold.add_modifier(Modifier::UNDERLINED),
            ),
            CharStatus::Pending => Span::styled(expected.to_string(), dim_bold),
        })
        .collect::<Vec<Span>>();

    Paragraph::new(Line::from(spans))
        .alignment(if prompt_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: false })
        .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        phase_status(coordinator),
        palette.base().fg(palette.dim).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[4], buf);

    Paragraph::new(keyboard_lines(coordinator.problem_keys(), palette))
        .alignment(Alignment::Center)
        .render(chunks[6], buf);

    Paragraph::new(Span::styled(
        "(tab) try again / (esc) finish session / (ctrl+c) quit",
        palette.base().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[7], buf);
}

fn phase_status<C: Clock>(coordinator: &Coordinator<C>) -> String {
    match coordinator.last_result() {
        Some(result) if coordinator.awaiting_advance() => format!(
            "Phase complete! {} wpm   {}% acc   next phase starting...",
            result.wpm, result.accuracy
        ),
        Some(result) => format!("last phase: {} wpm   {}% acc", result.wpm, result.accuracy),
        None => String::from("start typing when you're ready"),
    }
}

/// On-screen QWERTY layout with problem keys highlighted
pub fn keyboard_lines(problem_keys: &[char], palette: &Palette) -> Vec<Line<'static>> {
    let is_problem = |c: char| problem_keys.iter().any(|p| p.to_ascii_lowercase() == c);

    let key_style = |c: char| {
        if is_problem(c) {
            Style::default()
                .fg(palette.background)
                .bg(palette.incorrect)
                .add_modifier(Modifier::BOLD)
        } else {
            palette.base().fg(palette.dim)
        }
    };

    let mut lines: Vec<Line<'static>> = KEYBOARD_ROWS
        .iter()
        .map(|row| {
            Line::from(
                row.chars()
                    .map(|c| Span::styled(format!(" {c} "), key_style(c)))
                    .collect::<Vec<_>>(),
            )
        })
        .collect();
    lines.push(Line::from(Span::styled("     space     ", key_style(' '))));
    lines
}

fn render_completed(app: &App, palette: &Palette, area: Rect, buf: &mut Buffer) {
    let bold = palette.base().add_modifier(Modifier::BOLD);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // title
            Constraint::Length(1), // result
            Constraint::Length(1), // mode
            Constraint::Length(1), // problem keys
            Constraint::Length(1), // streak
            Constraint::Min(1),
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled(
        "Session complete!",
        bold.fg(palette.accent),
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    if let Some(record) = app.coordinator.record() {
        Paragraph::new(Span::styled(
            format!(
                "{} wpm   {}% acc   {} min",
                record.wpm, record.accuracy, record.duration
            ),
            bold,
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

        Paragraph::new(Span::styled(
            format!("finished during {}", record.mode.label()),
            palette.base().fg(palette.dim),
        ))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

        if !record.error_keys.is_empty() {
            let keys = record
                .error_keys
                .iter()
                .map(|c| match c {
                    ' ' => "space".to_string(),
                    c => c.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" ");
            Paragraph::new(Span::styled(
                format!("problem keys: {keys}"),
                palette.base().fg(palette.incorrect),
            ))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);
        }
    }

    Paragraph::new(Span::styled(
        format!(
            "streak: {} days (best {})",
            app.snapshot.current_streak, app.snapshot.longest_streak
        ),
        palette.base().fg(palette.correct),
    ))
    .alignment(Alignment::Center)
    .render(chunks[5], buf);

    Paragraph::new(Span::styled(
        format!("(n)ew session / (s)tats / (t)heme: {} / (q)uit", app.theme),
        palette.base().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[7], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use typespark::{
        clock::SystemClock, practice_text, provider::StatsProvider, stats::StatsEngine,
        storage::SqliteStore,
    };

    fn create_test_app(text: &str) -> App {
        let store = SqliteStore::open_in_memory().unwrap();
        practice_text::save_pending(&store, text).unwrap();
        App::new(
            StatsProvider::local(StatsEngine::new(store, SystemClock)),
            false,
        )
    }

    fn render_to_string(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    fn press(app: &mut App, c: char) {
        app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
    }

    #[test]
    fn test_session_screen_shows_phase_and_timer() {
        let app = create_test_app("hello world again and again and again");
        let rendered = render_to_string(&app, 80, 24);

        assert!(rendered.contains("Phase 1 of 6"));
        assert!(rendered.contains("Warm-up"));
        assert!(rendered.contains("2:00"));
        assert!(rendered.contains("hello"));
        assert!(rendered.contains("(tab) try again"));
    }

    #[test]
    fn test_incorrect_space_is_marked() {
        let mut app = create_test_app("ab cd ef gh ij kl mn op qr st uv wx");
        press(&mut app, 'a');
        press(&mut app, 'b');
        press(&mut app, 'x');

        let rendered = render_to_string(&app, 80, 24);
        assert!(rendered.contains("abx"));

        let mut app = create_test_app("ab cd ef gh ij kl mn op qr st uv wx");
        press(&mut app, 'a');
        press(&mut app, ' ');
        let rendered = render_to_string(&app, 80, 24);
        assert!(rendered.contains("a·"));
    }

    #[test]
    fn test_completed_screen() {
        let mut app = create_test_app("a b c d e f g h i j k l");
        press(&mut app, 'a');
        press(&mut app, ' ');
        press(&mut app, 'x');
        app.on_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));

        let rendered = render_to_string(&app, 80, 24);
        assert!(rendered.contains("Session complete!"));
        assert!(rendered.contains("67% acc"));
        assert!(rendered.contains("finished during Warm-up"));
        assert!(rendered.contains("problem keys: b"));
        assert!(rendered.contains("streak: 1 days"));
        assert!(rendered.contains("(t)heme: dark"));
    }

    #[test]
    fn test_keyboard_highlights_problem_keys() {
        let palette = Palette::for_theme(Theme::Dark);
        let lines = keyboard_lines(&['Q', ' '], &palette);

        assert_eq!(lines.len(), KEYBOARD_ROWS.len() + 1);
        assert_eq!(lines[0].spans[0].content, " q ");
        assert_eq!(lines[0].spans[0].style.bg, Some(palette.incorrect));
        assert_ne!(lines[0].spans[1].style.bg, Some(palette.incorrect));
        assert_eq!(lines[3].spans[0].style.bg, Some(palette.incorrect));
    }

    #[test]
    fn test_palettes_differ_per_theme() {
        let light = Palette::for_theme(Theme::Light);
        let dark = Palette::for_theme(Theme::Dark);
        let eye_care = Palette::for_theme(Theme::EyeCare);

        assert_ne!(light, dark);
        assert_ne!(dark, eye_care);
        assert_ne!(light.background, eye_care.background);
    }

    #[test]
    fn test_small_area_does_not_panic() {
        let app = create_test_app("hello world again and again and again");
        render_to_string(&app, 20, 5);
        render_to_string(&app, 1, 1);
    }
}
