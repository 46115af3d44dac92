use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table},
    Frame,
};
use typespark::{
    stats::{SessionRecord, StatsSnapshot},
    time_series::{accuracy_trend, wpm_trend},
};

use crate::{
    ui::{
        charting::{compute_chart_params, format_label},
        Palette,
    },
    App,
};

/// Rows shown in the recent sessions table
pub const RECENT_SESSIONS: usize = 5;

/// Pure presenter for a single recent-session row
pub fn present_row(record: &SessionRecord, palette: &Palette) -> Row<'static> {
    let accuracy_color = if record.accuracy >= 95 {
        palette.correct
    } else if record.accuracy >= 85 {
        palette.accent
    } else {
        palette.incorrect
    };

    Row::new(vec![
        Cell::from(
            record
                .date
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
        ),
        Cell::from(record.mode.label()),
        Cell::from(format!("{} min", record.duration)),
        Cell::from(record.wpm.to_string()),
        Cell::from(format!("{}%", record.accuracy)).style(Style::default().fg(accuracy_color)),
    ])
}

pub fn overview_lines(snapshot: &StatsSnapshot) -> Vec<Line<'static>> {
    vec![
        Line::from(format!(
            "Average WPM: {}   Average accuracy: {}%   Practice time: {} min",
            snapshot.average_wpm, snapshot.average_accuracy, snapshot.total_practice_minutes
        )),
        Line::from(format!(
            "Current streak: {} days   Longest streak: {} days   Sessions: {}",
            snapshot.current_streak,
            snapshot.longest_streak,
            snapshot.total_sessions()
        )),
    ]
}

pub fn render_stats(app: &App, f: &mut Frame) {
    let palette = Palette::for_theme(app.theme);
    let base = palette.base();
    let snapshot = &app.snapshot;
    let area = f.area();

    f.render_widget(Block::default().style(base), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(4), // overview
            Constraint::Min(8),    // trends
            Constraint::Length(RECENT_SESSIONS as u16 + 3),
            Constraint::Length(3), // instructions
        ])
        .split(area);

    let title_source = if app.provider.uses_api() {
        "Your Progress (remote)"
    } else {
        "Your Progress"
    };
    let title = Paragraph::new(title_source)
        .block(Block::default().borders(Borders::ALL).title("Stats"))
        .style(base.fg(palette.accent).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    let overview = Paragraph::new(overview_lines(snapshot))
        .block(Block::default().borders(Borders::ALL).title("Overview"))
        .style(base)
        .alignment(Alignment::Center);
    f.render_widget(overview, chunks[1]);

    if snapshot.session_history.is_empty() {
        let no_data = Paragraph::new(
            "No sessions yet.\nComplete a practice session to see your stats!",
        )
        .block(Block::default().borders(Borders::ALL).title("No Data"))
        .style(base.fg(palette.dim))
        .alignment(Alignment::Center);
        f.render_widget(no_data, chunks[2]);
    } else {
        let wpm: Vec<(f64, f64)> = wpm_trend(&snapshot.session_history)
            .into_iter()
            .map(Into::into)
            .collect();
        let accuracy: Vec<(f64, f64)> = accuracy_trend(&snapshot.session_history)
            .into_iter()
            .map(Into::into)
            .collect();
        let (last_session, highest) =
            compute_chart_params(&[wpm.as_slice(), accuracy.as_slice()], 100.0);
        let bold = base.add_modifier(Modifier::BOLD);

        let datasets = vec![
            Dataset::default()
                .name("wpm")
                .marker(Marker::Braille)
                .style(Style::default().fg(palette.accent))
                .graph_type(GraphType::Line)
                .data(&wpm),
            Dataset::default()
                .name("accuracy %")
                .marker(Marker::Braille)
                .style(Style::default().fg(palette.correct))
                .graph_type(GraphType::Line)
                .data(&accuracy),
        ];

        let chart = Chart::new(datasets)
            .block(Block::default().borders(Borders::ALL).title("Trends"))
            .style(base)
            .x_axis(
                Axis::default()
                    .title("session")
                    .bounds([1.0, last_session])
                    .labels(vec![
                        Span::styled("1", bold),
                        Span::styled(format_label(last_session), bold),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .bounds([0.0, highest])
                    .labels(vec![
                        Span::styled("0", bold),
                        Span::styled(format_label(highest), bold),
                    ]),
            );
        f.render_widget(chart, chunks[2]);
    }

    let header = Row::new(vec![
        Cell::from("Date"),
        Cell::from("Mode"),
        Cell::from("Duration"),
        Cell::from("WPM"),
        Cell::from("Accuracy"),
    ])
    .style(base.fg(palette.accent).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = snapshot
        .recent_sessions(RECENT_SESSIONS)
        .map(|record| present_row(record, &palette))
        .collect();

    let table = Table::new(
        rows,
        &[
            Constraint::Length(18),
            Constraint::Length(20),
            Constraint::Length(10),
            Constraint::Length(6),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .style(base)
    .block(Block::default().borders(Borders::ALL).title("Recent Sessions"));
    f.render_widget(table, chunks[3]);

    let instructions = Paragraph::new("(n)ew session / (b)ack / (t)heme / (esc)ape")
        .block(Block::default().borders(Borders::ALL))
        .style(base.fg(palette.dim).add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[4]);
}
