use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;
const MILLIS_PER_DAY: i64 = 86_400_000;

/// Whether applications are still accepted at the evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeadlineStatus {
    Open,
    Closed,
}

impl DeadlineStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DeadlineStatus::Open => "Open",
            DeadlineStatus::Closed => "Closed",
        }
    }

    pub const fn is_open(self) -> bool {
        matches!(self, DeadlineStatus::Open)
    }
}

/// Remaining time until a deadline, broken down for a ticking display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub expired: bool,
}

impl Countdown {
    pub const EXPIRED: Countdown = Countdown {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
        expired: true,
    };
}

/// Calendar breakdown of `deadline - now`. A deadline at or before `now` is
/// expired, which is stricter than [`status`] at the exact instant.
pub fn remaining(now: DateTime<Utc>, deadline: DateTime<Utc>) -> Countdown {
    if deadline <= now {
        return Countdown::EXPIRED;
    }

    let total_seconds = (deadline - now).num_seconds();

    Countdown {
        days: total_seconds / SECONDS_PER_DAY,
        hours: (total_seconds / SECONDS_PER_HOUR) % 24,
        minutes: (total_seconds / SECONDS_PER_MINUTE) % 60,
        seconds: total_seconds % 60,
        expired: false,
    }
}

/// `Open` while `deadline >= now`; the deadline instant itself is still open.
pub fn status(now: DateTime<Utc>, deadline: DateTime<Utc>) -> DeadlineStatus {
    if deadline >= now {
        DeadlineStatus::Open
    } else {
        DeadlineStatus::Closed
    }
}

/// Whole days until the deadline, rounded up. Negative once it has passed.
pub fn days_until(now: DateTime<Utc>, deadline: DateTime<Utc>) -> i64 {
    let millis = (deadline - now).num_milliseconds();
    -(-millis).div_euclid(MILLIS_PER_DAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn remaining_breaks_down_future_deadlines() {
        let deadline = now()
            + Duration::days(3)
            + Duration::hours(4)
            + Duration::minutes(5)
            + Duration::seconds(6)
            + Duration::milliseconds(900);

        let countdown = remaining(now(), deadline);

        assert_eq!(
            countdown,
            Countdown {
                days: 3,
                hours: 4,
                minutes: 5,
                seconds: 6,
                expired: false,
            }
        );
    }

    #[test]
    fn remaining_expires_past_deadlines() {
        let countdown = remaining(now(), now() - Duration::minutes(1));
        assert_eq!(countdown, Countdown::EXPIRED);
    }

    #[test]
    fn exact_deadline_instant_is_expired_but_open() {
        assert!(remaining(now(), now()).expired);
        assert_eq!(status(now(), now()), DeadlineStatus::Open);
        assert_eq!(days_until(now(), now()), 0);
    }

    #[test]
    fn status_closes_one_millisecond_after_deadline() {
        let deadline = now() - Duration::milliseconds(1);
        assert_eq!(status(now(), deadline), DeadlineStatus::Closed);
    }

    #[test]
    fn days_until_rounds_up() {
        assert_eq!(days_until(now(), now() + Duration::hours(1)), 1);
        assert_eq!(days_until(now(), now() + Duration::days(2)), 2);
        assert_eq!(
            days_until(now(), now() + Duration::days(2) + Duration::seconds(1)),
            3
        );
    }

    #[test]
    fn days_until_goes_negative_for_past_deadlines() {
        assert_eq!(days_until(now(), now() - Duration::hours(12)), 0);
        assert_eq!(days_until(now(), now() - Duration::days(1)), -1);
        assert_eq!(
            days_until(now(), now() - Duration::days(1) - Duration::hours(1)),
            -1
        );
        assert_eq!(days_until(now(), now() - Duration::days(3)), -3);
    }
}
