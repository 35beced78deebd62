//! Pure reductions over a sweep: extrema of VSWR and gain
//!
//! Reducers return `None` on empty input; callers map that to the blank
//! label policy. Ties are broken by first occurrence in frequency order.

use crate::types::{SweepPoint, SweepResult};

/// Point with the minimum VSWR, first occurrence on ties
pub fn min_vswr(result: &SweepResult) -> Option<&SweepPoint> {
    min_by_key(result, |p| p.vswr())
}

/// Point with the minimum gain, first occurrence on ties
pub fn min_gain(result: &SweepResult) -> Option<&SweepPoint> {
    min_by_key(result, |p| p.gain_db())
}

/// Point with the maximum gain, first occurrence on ties
pub fn max_gain(result: &SweepResult) -> Option<&SweepPoint> {
    min_by_key(result, |p| -p.gain_db())
}

fn min_by_key(result: &SweepResult, key: impl Fn(&SweepPoint) -> f64) -> Option<&SweepPoint> {
    let mut best: Option<(&SweepPoint, f64)> = None;
    for p in result {
        let k = key(p);
        match best {
            // Strict comparison keeps the first occurrence on ties
            Some((_, best_k)) if !(k < best_k) => {}
            _ => best = Some((p, k)),
        }
    }
    best.map(|(p, _)| p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sweep(mags: &[(u64, f64)]) -> SweepResult {
        mags.iter()
            .map(|&(freq, mag)| SweepPoint::new(freq, mag, 0.0))
            .collect()
    }

    #[test]
    fn test_min_vswr() {
        // VSWR grows with |Γ|, so the smallest magnitude wins
        let s11 = sweep(&[(1_000_000, 0.5), (2_000_000, 0.1), (3_000_000, 0.9)]);
        let best = min_vswr(&s11).expect("non-empty");
        assert_eq!(best.freq, 2_000_000);
    }

    #[test]
    fn test_min_vswr_is_lower_bound() {
        let s11 = sweep(&[(1_000_000, 0.3), (2_000_000, 0.02), (3_000_000, 0.7), (4_000_000, 0.02)]);
        let best = min_vswr(&s11).expect("non-empty");
        for p in &s11 {
            assert!(best.vswr() <= p.vswr());
        }
        // First occurrence wins the tie
        assert_eq!(best.freq, 2_000_000);
    }

    #[test]
    fn test_gain_extrema() {
        let s21 = sweep(&[(1_000_000, 0.1), (2_000_000, 0.9), (3_000_000, 0.5)]);
        assert_eq!(min_gain(&s21).expect("non-empty").freq, 1_000_000);
        assert_eq!(max_gain(&s21).expect("non-empty").freq, 2_000_000);
    }

    #[test]
    fn test_empty_input() {
        let empty = SweepResult::new();
        assert!(min_vswr(&empty).is_none());
        assert!(min_gain(&empty).is_none());
        assert!(max_gain(&empty).is_none());
    }
}
