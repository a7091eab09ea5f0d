use chrono::{DateTime, Duration, Utc};

/// How long after creation a review stays editable/deletable.
pub const EDIT_WINDOW_HOURS: i64 = 24;

pub fn edit_window() -> Duration {
    Duration::hours(EDIT_WINDOW_HOURS)
}

/// A review may be edited or deleted while `now - created_at` is within the
/// 24 hour window. The boundary itself is still allowed.
pub fn within_edit_window(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - created_at <= edit_window()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_review_is_editable() {
        let now = Utc::now();
        assert!(within_edit_window(now - Duration::minutes(5), now));
    }

    #[test]
    fn boundary_is_still_editable() {
        let now = Utc::now();
        assert!(within_edit_window(now - edit_window(), now));
    }

    #[test]
    fn expired_review_is_not_editable() {
        let now = Utc::now();
        assert!(!within_edit_window(now - Duration::hours(25), now));
        assert!(!within_edit_window(now - Duration::days(7), now));
    }

    #[test]
    fn future_created_at_is_editable() {
        // Clock skew between the store and this service should not lock a
        // review out of its window.
        let now = Utc::now();
        assert!(within_edit_window(now + Duration::minutes(1), now));
    }
}
