use crate::stats::SessionRecord;

/// One point of a per-session trend line; `session` is 1-based
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub session: f64,
    pub value: f64,
}

impl TrendPoint {
    pub fn new(session: f64, value: f64) -> Self {
        Self { session, value }
    }

    pub fn label(&self) -> String {
        format!("Session {}", self.session as usize)
    }
}

impl From<TrendPoint> for (f64, f64) {
    fn from(p: TrendPoint) -> Self {
        (p.session, p.value)
    }
}

pub fn wpm_trend(history: &[SessionRecord]) -> Vec<TrendPoint> {
    trend(history, |r| r.wpm)
}

pub fn accuracy_trend(history: &[SessionRecord]) -> Vec<TrendPoint> {
    trend(history, |r| r.accuracy)
}

fn trend(history: &[SessionRecord], metric: impl Fn(&SessionRecord) -> u32) -> Vec<TrendPoint> {
    history
        .iter()
        .enumerate()
        .map(|(idx, record)| TrendPoint::new((idx + 1) as f64, metric(record) as f64))
        .collect()
}
