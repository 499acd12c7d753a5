//! Line-clear points and level progression.

/// Lines per level step: level L is left once the total reaches L * 10.
pub const LINES_PER_LEVEL: u32 = 10;

/// Base points for clearing `rows` rows in one lock.
///
/// Any count outside 1..=4 that is still positive scores as a single.
pub fn base_points(rows: usize) -> u32 {
    match rows {
        0 => 0,
        1 => 100,
        2 => 300,
        3 => 500,
        4 => 800,
        _ => 100,
    }
}

/// Points awarded for a lock clearing `rows` rows at `level`.
pub fn line_clear_points(rows: usize, level: u32) -> u32 {
    base_points(rows).saturating_mul(level)
}

/// True when `lines_cleared` has reached the threshold for leaving `level`.
/// Checked once per lock, so at most one level is gained per lock.
pub fn should_level_up(lines_cleared: u32, level: u32) -> bool {
    lines_cleared >= level.saturating_mul(LINES_PER_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_at_level_one() {
        assert_eq!(line_clear_points(0, 1), 0);
        assert_eq!(line_clear_points(1, 1), 100);
        assert_eq!(line_clear_points(2, 1), 300);
        assert_eq!(line_clear_points(3, 1), 500);
        assert_eq!(line_clear_points(4, 1), 800);
    }

    #[test]
    fn test_points_scale_with_level() {
        assert_eq!(line_clear_points(1, 3), 300);
        assert_eq!(line_clear_points(4, 5), 4000);
    }

    #[test]
    fn test_five_rows_scores_as_single() {
        assert_eq!(base_points(5), 100);
        assert_eq!(base_points(20), 100);
    }

    #[test]
    fn test_level_threshold() {
        assert!(!should_level_up(9, 1));
        assert!(should_level_up(10, 1));
        assert!(!should_level_up(19, 2));
        assert!(should_level_up(25, 2));
    }
}
