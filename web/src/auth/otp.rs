//! Resend countdown for the one-time password page.

pub const RESEND_COOLDOWN_SECONDS: i64 = 60;

/// Time left before another code may be requested, computed from the send
/// time carried by the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpCountdown {
    sent_at: i64,
    now: i64,
}

impl OtpCountdown {
    pub fn new(sent_at: Option<i64>, now: i64) -> Self {
        // No usable send time: resend is available immediately. Older send
        // times all mean the same thing, so they are pinned to the window.
        let window_start = now.saturating_sub(RESEND_COOLDOWN_SECONDS);
        let sent_at = sent_at
            .filter(|t| *t <= now)
            .map_or(window_start, |t| t.max(window_start));
        Self { sent_at, now }
    }

    pub fn remaining_seconds(&self) -> i64 {
        self.sent_at
            .saturating_add(RESEND_COOLDOWN_SECONDS)
            .saturating_sub(self.now)
            .max(0)
    }

    pub fn can_resend(&self) -> bool {
        self.remaining_seconds() == 0
    }

    /// `m:ss` label for the resend button.
    pub fn label(&self) -> String {
        let remaining = self.remaining_seconds();
        format!("{}:{:02}", remaining / 60, remaining % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;

    #[test]
    fn test_countdown_runs_down_from_send_time() {
        let countdown = OtpCountdown::new(Some(NOW - 15), NOW);
        assert_eq!(countdown.remaining_seconds(), 45);
        assert_eq!(countdown.label(), "0:45");
        assert!(!countdown.can_resend());
    }

    #[test]
    fn test_countdown_expires() {
        let countdown = OtpCountdown::new(Some(NOW - 61), NOW);
        assert_eq!(countdown.remaining_seconds(), 0);
        assert!(countdown.can_resend());
    }

    #[test]
    fn test_missing_or_future_send_time_allows_resend() {
        assert!(OtpCountdown::new(None, NOW).can_resend());
        assert!(OtpCountdown::new(Some(NOW + 500), NOW).can_resend());
        assert_eq!(OtpCountdown::new(Some(NOW), NOW).label(), "1:00");
    }

    #[test]
    fn test_extreme_send_times_do_not_overflow() {
        let countdown = OtpCountdown::new(Some(i64::MIN), NOW);
        assert_eq!(countdown.remaining_seconds(), 0);
        assert!(countdown.can_resend());

        assert!(OtpCountdown::new(Some(i64::MAX), NOW).can_resend());
        assert_eq!(OtpCountdown::new(Some(i64::MIN), i64::MIN).label(), "1:00");
    }
}
