pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Mean of integer samples rounded to the nearest integer, 0 when empty
pub fn rounded_mean(data: &[u32]) -> u32 {
    let samples = data.iter().map(|&v| v as f64).collect::<Vec<f64>>();
    mean(&samples).map_or(0, |m| m.round() as u32)
}

/// Format a countdown as M:SS
pub fn format_countdown(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
