use tasas_models::report::{ChangeAnnotation, Direction, CHANGE_THRESHOLD_PCT};

/// Classify the move from `previous` to `current`.
///
/// Returns `None` when there is no baseline (`previous <= 0`) or the move is
/// below [`CHANGE_THRESHOLD_PCT`].
pub fn classify(previous: f64, current: f64) -> Option<ChangeAnnotation> {
    if previous <= 0.0 {
        return None;
    }

    let magnitude_pct = (current - previous).abs() / previous * 100.0;
    if magnitude_pct < CHANGE_THRESHOLD_PCT {
        return None;
    }

    let direction = if current > previous {
        Direction::Up
    } else {
        Direction::Down
    };

    Some(ChangeAnnotation {
        direction,
        magnitude_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_baseline() {
        assert_eq!(classify(0.0, 100.0), None);
        assert_eq!(classify(-5.0, 100.0), None);
        assert_eq!(classify(-5.0, -500.0), None);
    }

    #[test]
    fn below_threshold() {
        assert_eq!(classify(100.0, 101.99), None);
        assert_eq!(classify(100.0, 98.01), None);
        assert_eq!(classify(100.0, 100.0), None);
    }

    #[test]
    fn exactly_at_threshold_counts() {
        let change = classify(100.0, 102.0).unwrap();
        assert_eq!(change.direction, Direction::Up);
        assert!((change.magnitude_pct - 2.0).abs() < 1e-9);
    }

    #[test]
    fn direction_follows_sign() {
        let up = classify(50.0, 60.0).unwrap();
        assert_eq!(up.direction, Direction::Up);
        assert!((up.magnitude_pct - 20.0).abs() < 1e-9);

        let down = classify(50.0, 40.0).unwrap();
        assert_eq!(down.direction, Direction::Down);
        assert!((down.magnitude_pct - 20.0).abs() < 1e-9);
    }

    #[test]
    fn threshold_matches_formula_over_grid() {
        let previous_values = [0.5, 1.0, 36.4, 100.0, 4_500.0];
        for &previous in &previous_values {
            for step in -60..=60 {
                let current = previous * (1.0 + step as f64 * 0.001);
                let pct = (current - previous).abs() / previous * 100.0;
                match classify(previous, current) {
                    None => assert!(pct < 2.0, "{previous} -> {current} should annotate"),
                    Some(change) => {
                        assert!(pct >= 2.0);
                        let expected = if current > previous {
                            Direction::Up
                        } else {
                            Direction::Down
                        };
                        assert_eq!(change.direction, expected);
                    }
                }
            }
        }
    }
}
