// Cooldown message formatting.

use std::time::Duration;

/// Split a remaining cooldown into whole minutes and seconds. Hours are folded
/// into the minutes and partial seconds round up, so "0m 0s" never shows.
pub fn split_cooldown(remaining: Duration) -> (u64, u64) {
    let mut secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs += 1;
    }
    (secs / 60, secs % 60)
}

pub fn cooldown_message(remaining: Duration) -> String {
    let (minutes, seconds) = split_cooldown(remaining);
    format!(
        "This command is on cooldown. Try again in {}m {}s.",
        minutes, seconds
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_rounds_up() {
        assert_eq!(split_cooldown(Duration::from_millis(2_100)), (0, 3));
        assert_eq!(split_cooldown(Duration::from_secs(3)), (0, 3));
    }

    #[test]
    fn test_hours_fold_into_minutes() {
        assert_eq!(split_cooldown(Duration::from_secs(3_725)), (62, 5));
    }

    #[test]
    fn test_message() {
        assert_eq!(
            cooldown_message(Duration::from_secs(70)),
            "This command is on cooldown. Try again in 1m 10s."
        );
    }
}
