use crate::signal::Events;

/// Mean heart rate (BPM) over the observation window: `60 * beats / duration_s`.
///
/// Every detected beat counts against the full duration; this is a
/// count-over-window estimate, not an average of R-R intervals. Returns `None`
/// when fewer than two beats were detected or the duration is not a positive,
/// finite number of seconds.
pub fn compute_hr(events: &Events, duration_s: f64) -> Option<f64> {
    if events.len() < 2 {
        return None;
    }
    if !(duration_s.is_finite() && duration_s > 0.0) {
        return None;
    }
    let beats = events.len() as f64;
    Some(60.0 * beats / duration_s)
}
