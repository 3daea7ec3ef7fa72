// Cosmetic side effects (nickname edits, DMs, notices) must never fail the
// action they decorate. Route them through here so the discard is explicit.

use std::fmt::Display;

/// Log a failed best-effort operation at debug level and drop the error.
pub fn best_effort<T, E: Display>(result: Result<T, E>, what: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Best-effort {} failed: {}", what, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_effort_discards_errors() {
        let ok: Result<u8, String> = Ok(1);
        let err: Result<u8, String> = Err("forbidden".into());

        assert_eq!(best_effort(ok, "rename"), Some(1));
        assert_eq!(best_effort(err, "rename"), None);
    }
}
