//! Time-of-day rules for attendance, evaluated in the company time zone

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use chrono_tz::Tz;
use shared::models::AttendanceStatus;

use crate::utils::time;

/// `LATE` iff the local arrival time is strictly after start + grace
pub fn classify_arrival(local_time: NaiveTime, start: NaiveTime, grace_minutes: u32) -> AttendanceStatus {
    let (deadline, wrapped) =
        start.overflowing_add_signed(TimeDelta::minutes(i64::from(grace_minutes)));
    // A grace period running past midnight never makes a same-day arrival late
    if wrapped != 0 || local_time <= deadline {
        AttendanceStatus::Ontime
    } else {
        AttendanceStatus::Late
    }
}

/// Auto-checkout instant for a record dated `date`: `date` at local `end_time`
pub fn checkout_boundary(date: NaiveDate, end_time: NaiveTime, tz: Tz) -> i64 {
    time::date_time_to_millis(date, end_time, tz)
}

/// The sweep closes a record only once `now` is strictly past its boundary
pub fn is_past_boundary(now: i64, boundary: i64) -> bool {
    now > boundary
}

/// Whole minutes between check-in and check-out, never negative
pub fn work_minutes(check_in: i64, check_out: i64) -> i64 {
    (check_out - check_in).max(0) / 60_000
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Jakarta;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_classify_arrival() {
        assert_eq!(classify_arrival(t(7, 59), t(8, 0), 0), AttendanceStatus::Ontime);
        assert_eq!(classify_arrival(t(8, 0), t(8, 0), 0), AttendanceStatus::Ontime);
        assert_eq!(
            classify_arrival(NaiveTime::from_hms_opt(8, 0, 1).unwrap(), t(8, 0), 0),
            AttendanceStatus::Late
        );
        assert_eq!(classify_arrival(t(8, 10), t(8, 0), 15), AttendanceStatus::Ontime);
        assert_eq!(classify_arrival(t(8, 16), t(8, 0), 15), AttendanceStatus::Late);
        assert_eq!(classify_arrival(t(23, 59), t(23, 30), 60), AttendanceStatus::Ontime);
    }

    #[test]
    fn test_checkout_boundary_is_local_end_time() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let boundary = checkout_boundary(date, t(17, 0), Jakarta);
        // 17:00 WIB = 10:00 UTC
        let expected = date.and_hms_opt(10, 0, 0).unwrap().and_utc().timestamp_millis();
        assert_eq!(boundary, expected);
        assert_eq!(time::local_date(boundary, Jakarta), date);
    }

    #[test]
    fn test_past_boundary_is_strict() {
        assert!(!is_past_boundary(1000, 1000));
        assert!(is_past_boundary(1001, 1000));
        assert!(!is_past_boundary(999, 1000));
    }

    #[test]
    fn test_work_minutes() {
        assert_eq!(work_minutes(0, 9 * 3_600_000 + 59_999), 540);
        assert_eq!(work_minutes(5_000, 1_000), 0);
    }
}
