//! Attendance operations
//!
//! Every operation takes the company's [`AttendancePolicy`] and the current
//! instant `now` (Unix millis) so the time rules stay deterministic.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Attendance, Employee};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::clock;
use super::geofence::GeoPoint;
use crate::db::repository::attendance::{self as repo, AttendanceFilter, NewCheckIn};
use crate::db::repository::{Page, RepoError};
use crate::settings::AttendancePolicy;
use crate::utils::time;

fn require_point(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<GeoPoint> {
    let (Some(lat), Some(lng)) = (latitude, longitude) else {
        return Err(AppError::new(ErrorCode::InvalidCoordinates));
    };
    GeoPoint::new(lat, lng).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidCoordinates, e.to_string())
            .with_detail("latitude", lat)
            .with_detail("longitude", lng)
    })
}

fn round_meters(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Close every open record of the company whose checkout boundary has passed.
///
/// The record's checkout becomes its boundary (never earlier than its
/// check-in). Returns the number of records closed; a second call with the
/// same `now` closes nothing.
pub async fn sweep_auto_checkout(
    pool: &SqlitePool,
    company_id: i64,
    policy: &AttendancePolicy,
    now: i64,
) -> AppResult<u64> {
    let open = repo::find_open(pool, company_id).await?;
    let mut closed = 0;

    for record in open {
        let date = match time::parse_date(&record.date) {
            Ok(d) => d,
            Err(_) => {
                warn!(attendance_id = record.id, date = %record.date, "Skipping record with malformed date");
                continue;
            }
        };
        let boundary = clock::checkout_boundary(date, policy.end_time, policy.timezone);
        if !clock::is_past_boundary(now, boundary) {
            continue;
        }

        let check_out = boundary.max(record.check_in);
        let minutes = clock::work_minutes(record.check_in, check_out);
        closed += repo::close_auto(pool, record.id, check_out, minutes).await?;
    }

    if closed > 0 {
        info!(company_id, closed, "Auto-checkout closed open attendance");
    }
    Ok(closed)
}

/// Record today's check-in for `employee`
pub async fn check_in(
    pool: &SqlitePool,
    policy: &AttendancePolicy,
    employee: &Employee,
    latitude: Option<f64>,
    longitude: Option<f64>,
    now: i64,
) -> AppResult<Attendance> {
    if !employee.is_active {
        return Err(AppError::forbidden("Employee is not active"));
    }

    sweep_auto_checkout(pool, employee.company_id, policy, now).await?;

    let point = require_point(latitude, longitude)?;
    let distance_m = match &policy.geofence {
        Some(fence) => match fence.check(point) {
            Ok(d) => Some(round_meters(d)),
            Err(violation) => {
                debug!(
                    employee_id = employee.id,
                    distance_m = violation.distance_m,
                    radius_m = violation.radius_m,
                    "Check-in rejected outside geofence"
                );
                return Err(AppError::new(ErrorCode::OutsideGeofence)
                    .with_detail("distance_m", round_meters(violation.distance_m))
                    .with_detail("radius_m", violation.radius_m));
            }
        },
        None => None,
    };

    let local = time::millis_to_local(now, policy.timezone);
    let date = time::format_date(local.date_naive());
    if repo::find_by_employee_date(pool, employee.id, &date)
        .await?
        .is_some()
    {
        return Err(AppError::new(ErrorCode::AlreadyCheckedIn).with_detail("date", date));
    }

    let status = clock::classify_arrival(local.time(), policy.start_time, policy.grace_minutes);
    let record = repo::insert(
        pool,
        NewCheckIn {
            company_id: employee.company_id,
            employee_id: employee.id,
            date: date.clone(),
            check_in: now,
            status,
            latitude: point.lat,
            longitude: point.lng,
            distance_m,
        },
    )
    .await
    .map_err(|e| match e {
        RepoError::Duplicate(_) => {
            AppError::new(ErrorCode::AlreadyCheckedIn).with_detail("date", date.clone())
        }
        other => other.into(),
    })?;

    info!(
        company_id = employee.company_id,
        employee_id = employee.id,
        date = %record.date,
        status = ?record.status,
        "Checked in"
    );
    Ok(record)
}

/// Close today's open record with a manual check-out
pub async fn check_out(
    pool: &SqlitePool,
    policy: &AttendancePolicy,
    employee: &Employee,
    latitude: Option<f64>,
    longitude: Option<f64>,
    now: i64,
) -> AppResult<Attendance> {
    let point = match (latitude, longitude) {
        (None, None) => None,
        _ => Some(require_point(latitude, longitude)?),
    };

    let date = time::format_date(time::local_date(now, policy.timezone));
    let record = repo::find_by_employee_date(pool, employee.id, &date)
        .await?
        .filter(|r| r.check_out.is_none())
        .ok_or_else(|| AppError::new(ErrorCode::NotCheckedIn).with_detail("date", date.clone()))?;

    let check_out = now.max(record.check_in);
    let changed = repo::close_manual(
        pool,
        record.id,
        check_out,
        point.map(|p| p.lat),
        point.map(|p| p.lng),
        clock::work_minutes(record.check_in, check_out),
    )
    .await?;
    if changed == 0 {
        return Err(AppError::new(ErrorCode::NotCheckedIn).with_detail("date", date));
    }

    info!(
        company_id = employee.company_id,
        employee_id = employee.id,
        "Checked out"
    );
    repo::find_by_id(pool, employee.company_id, record.id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AttendanceNotFound))
}

/// The employee's record for the current local day
pub async fn today(
    pool: &SqlitePool,
    policy: &AttendancePolicy,
    employee: &Employee,
    now: i64,
) -> AppResult<Option<Attendance>> {
    let date = time::format_date(time::local_date(now, policy.timezone));
    Ok(repo::find_by_employee_date(pool, employee.id, &date).await?)
}

/// Sweep, then list the company's records newest first
pub async fn list(
    pool: &SqlitePool,
    company_id: i64,
    policy: &AttendancePolicy,
    filter: &AttendanceFilter,
    limit: u32,
    offset: i64,
    now: i64,
) -> AppResult<Page<Attendance>> {
    for bound in [&filter.from, &filter.to].into_iter().flatten() {
        time::parse_date(bound)?;
    }
    sweep_auto_checkout(pool, company_id, policy, now).await?;
    Ok(repo::find_page(pool, company_id, filter, limit, offset).await?)
}
