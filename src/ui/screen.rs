use ratatui::Frame;

use crate::{ui::stats_view::render_stats, App, AppState};

/// A UI Screen boundary: renders one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Active phase: prompt, countdown, progress and keyboard
pub struct SessionScreen;

impl Screen for SessionScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

pub struct CompletedScreen;

impl Screen for CompletedScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Overview, trends and recent sessions
pub struct StatsScreen;

impl Screen for StatsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        render_stats(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: AppState) -> Box<dyn Screen> {
    match state {
        AppState::Session => Box::new(SessionScreen),
        AppState::Completed => Box::new(CompletedScreen),
        AppState::Stats => Box::new(StatsScreen),
    }
}
