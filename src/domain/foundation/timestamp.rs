//! Unix timestamp helpers.
//!
//! Stripe and the membership store both speak whole Unix seconds, so the
//! domain keeps timestamps as plain `i64` values.

/// Current time as Unix seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_now_is_after_2024() {
        assert!(unix_now() > 1_704_067_200);
    }
}
