//! Rolling volume baseline.

/// Mean volume of the trailing `window` sessions, excluding the most recent.
///
/// The latest session is what gets compared against the baseline, so it
/// must not contaminate it.
///
/// Returns `None` when fewer than 2 sessions exist in the last `window + 1`.
pub fn baseline(volumes: &[f64], window: usize) -> Option<f64> {
    let tail_len = volumes.len().min(window + 1);
    if tail_len < 2 {
        return None;
    }

    let tail = &volumes[volumes.len() - tail_len..];
    let prior = &tail[..tail.len() - 1];
    Some(prior.iter().sum::<f64>() / prior.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_insufficient_data() {
        assert!(baseline(&[], 20).is_none());
        assert!(baseline(&[5000.0], 20).is_none());
    }

    #[test]
    fn test_baseline_excludes_latest_session() {
        // 20 prior sessions at 5000, then a 15000 spike.
        let mut volumes = vec![5000.0; 20];
        volumes.push(15000.0);
        assert_eq!(baseline(&volumes, 20), Some(5000.0));
    }

    #[test]
    fn test_baseline_uses_at_most_window_sessions() {
        // Old history outside the window must not leak in.
        let mut volumes = vec![1_000_000.0; 100];
        volumes.extend(vec![5000.0; 20]);
        volumes.push(8000.0);
        assert_eq!(baseline(&volumes, 20), Some(5000.0));
    }

    #[test]
    fn test_baseline_short_history() {
        // Two sessions: the baseline is just the first one.
        assert_eq!(baseline(&[4000.0, 9000.0], 20), Some(4000.0));
    }

    #[test]
    fn test_baseline_zero_volume_sessions() {
        let mut volumes = vec![0.0; 20];
        volumes.push(10000.0);
        assert_eq!(baseline(&volumes, 20), Some(0.0));
    }
}
