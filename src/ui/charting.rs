/// Compute X (session number) and Y (value) bounds for a trend chart.
/// Y never drops below `y_floor` so a flat history still has headroom.
pub fn compute_chart_params(series: &[&[(f64, f64)]], y_floor: f64) -> (f64, f64) {
    let mut highest = y_floor;
    let mut last_session: f64 = 1.0;

    for points in series {
        for &(session, value) in points.iter() {
            if value > highest {
                highest = value;
            }
            if session > last_session {
                last_session = session;
            }
        }
    }

    (last_session, highest.round())
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
