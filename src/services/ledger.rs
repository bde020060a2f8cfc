use chrono::NaiveDate;
use rusqlite::{Connection, ErrorCode, TransactionBehavior};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, CancelActor, NewBooking};
use crate::services::availability;

pub const SLOT_TAKEN: &str = "slot already taken";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled(BookingStatus),
    /// The booking was cancelled earlier; its status is left untouched.
    AlreadyCancelled(BookingStatus),
}

/// Checks caller-supplied fields and turns them into a bookable request.
pub fn validate_new_booking(
    first_name: &str,
    last_name: &str,
    phone: &str,
    date: &str,
    time: &str,
    service: &str,
) -> Result<NewBooking, AppError> {
    let required = [
        ("first name", first_name),
        ("last name", last_name),
        ("phone", phone),
        ("date", date),
        ("time", time),
        ("service", service),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    let date = parse_date(date)?;
    let time = time.trim();
    if !availability::is_catalog_slot(time) {
        return Err(AppError::Validation(format!("{time} is not a bookable time")));
    }

    Ok(NewBooking {
        first_name: first_name.trim().to_string(),
        last_name: last_name.trim().to_string(),
        phone: phone.trim().to_string(),
        date,
        time: time.to_string(),
        service: service.trim().to_string(),
    })
}

pub fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s.trim(), queries::DATE_FORMAT)
        .map_err(|_| AppError::Validation(format!("invalid date {s:?}, expected YYYY-MM-DD")))
}

pub fn list_active(conn: &Connection) -> Result<Vec<Booking>, AppError> {
    Ok(queries::list_bookings(conn, true)?)
}

pub fn list_all(conn: &Connection) -> Result<Vec<Booking>, AppError> {
    Ok(queries::list_bookings(conn, false)?)
}

/// Books a slot. The conflict check and the insert run in one IMMEDIATE
/// transaction, and the partial unique index on active slots rejects any
/// writer that slips past the check.
pub fn create(conn: &mut Connection, booking: &NewBooking) -> Result<Booking, AppError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if queries::active_booking_exists(&tx, &booking.date, &booking.time)? {
        return Err(AppError::Conflict(SLOT_TAKEN.to_string()));
    }

    let created = queries::insert_booking(&tx, booking).map_err(|e| {
        if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
            AppError::Conflict(SLOT_TAKEN.to_string())
        } else {
            AppError::Database(e)
        }
    })?;
    tx.commit()?;

    tracing::info!(
        booking_id = created.id,
        date = %created.date,
        time = %created.time,
        "booking created"
    );
    Ok(created)
}

/// Cancels a booking on behalf of `actor`. Cancellation is terminal: a second
/// cancel succeeds without rewriting the first cancellation's status.
pub fn cancel(conn: &Connection, id: i64, actor: CancelActor) -> Result<CancelOutcome, AppError> {
    let status = actor.cancelled_status();
    if queries::cancel_active_booking(conn, id, status)? {
        tracing::info!(booking_id = id, status = status.as_str(), "booking cancelled");
        return Ok(CancelOutcome::Cancelled(status));
    }

    match queries::get_booking_by_id(conn, id)? {
        Some(existing) => {
            tracing::info!(
                booking_id = id,
                status = existing.status.as_str(),
                "booking already cancelled"
            );
            Ok(CancelOutcome::AlreadyCancelled(existing.status))
        }
        None => Err(AppError::NotFound("booking".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use std::sync::{Arc, Barrier, Mutex};
    use std::thread;

    fn request(date: &str, time: &str) -> NewBooking {
        validate_new_booking("Zeynep", "Kaya", "05321112233", date, time, "gel polish").unwrap()
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let err = validate_new_booking("", "Kaya", " ", "2024-06-01", "16:00", "polish").unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("first name"));
                assert!(msg.contains("phone"));
                assert!(!msg.contains("last name"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_bad_date_and_time() {
        assert!(matches!(
            validate_new_booking("A", "B", "1", "01/06/2024", "16:00", "x"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_new_booking("A", "B", "1", "2024-06-01", "16:30", "x"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_create_assigns_increasing_ids() {
        let mut conn = db::init_db(":memory:").unwrap();
        let first = create(&mut conn, &request("2024-06-01", "16:00")).unwrap();
        let second = create(&mut conn, &request("2024-06-01", "17:00")).unwrap();
        assert_eq!(first.id, 1);
        assert!(second.id > first.id);
        assert_eq!(second.status, BookingStatus::Active);
    }

    #[test]
    fn test_create_conflict_inserts_nothing() {
        let mut conn = db::init_db(":memory:").unwrap();
        create(&mut conn, &request("2024-06-01", "17:00")).unwrap();

        let err = create(&mut conn, &request("2024-06-01", "17:00")).unwrap_err();
        assert!(matches!(err, AppError::Conflict(ref msg) if msg == SLOT_TAKEN));
        assert_eq!(list_all(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_cancelled_slot_can_be_rebooked() {
        let mut conn = db::init_db(":memory:").unwrap();
        let first = create(&mut conn, &request("2024-06-01", "17:00")).unwrap();
        cancel(&conn, first.id, CancelActor::Customer).unwrap();

        let second = create(&mut conn, &request("2024-06-01", "17:00")).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(list_active(&conn).unwrap().len(), 1);
        assert_eq!(list_all(&conn).unwrap().len(), 2);
    }

    #[test]
    fn test_cancel_by_actor() {
        let mut conn = db::init_db(":memory:").unwrap();
        let a = create(&mut conn, &request("2024-06-01", "16:00")).unwrap();
        let b = create(&mut conn, &request("2024-06-01", "17:00")).unwrap();

        assert_eq!(
            cancel(&conn, a.id, CancelActor::Customer).unwrap(),
            CancelOutcome::Cancelled(BookingStatus::CancelledByCustomer)
        );
        assert_eq!(
            cancel(&conn, b.id, CancelActor::Admin).unwrap(),
            CancelOutcome::Cancelled(BookingStatus::CancelledByAdmin)
        );
    }

    #[test]
    fn test_cancel_twice_keeps_first_status() {
        let mut conn = db::init_db(":memory:").unwrap();
        let b = create(&mut conn, &request("2024-06-01", "16:00")).unwrap();
        cancel(&conn, b.id, CancelActor::Customer).unwrap();

        assert_eq!(
            cancel(&conn, b.id, CancelActor::Admin).unwrap(),
            CancelOutcome::AlreadyCancelled(BookingStatus::CancelledByCustomer)
        );
        let stored = queries::get_booking_by_id(&conn, b.id).unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::CancelledByCustomer);
    }

    #[test]
    fn test_cancel_unknown_booking() {
        let conn = db::init_db(":memory:").unwrap();
        assert!(matches!(
            cancel(&conn, 42, CancelActor::Customer),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_concurrent_creates_on_shared_handle() {
        let conn = Arc::new(Mutex::new(db::init_db(":memory:").unwrap()));
        let workers = 8;
        let barrier = Arc::new(Barrier::new(workers));

        let handles: Vec<_> = (0..workers)
            .map(|_| {
                let conn = Arc::clone(&conn);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let mut conn = conn.lock().unwrap();
                    create(&mut conn, &request("2024-06-01", "18:00"))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(AppError::Conflict(_))))
                .count(),
            workers - 1
        );
    }

    #[test]
    fn test_concurrent_creates_across_connections() {
        let path = std::env::temp_dir().join(format!("salonbook-{}.db", uuid::Uuid::new_v4()));
        let path_str = path.to_string_lossy().to_string();
        let workers = 6;

        // Open every connection up front so migrations run once.
        let conns: Vec<Connection> = (0..workers)
            .map(|_| db::init_db(&path_str).unwrap())
            .collect();
        let barrier = Arc::new(Barrier::new(workers));

        let handles: Vec<_> = conns
            .into_iter()
            .map(|mut conn| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    create(&mut conn, &request("2024-06-01", "19:00"))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(AppError::Conflict(_)))));

        let check = db::init_db(&path_str).unwrap();
        assert_eq!(list_all(&check).unwrap().len(), 1);
        drop(check);

        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{path_str}{suffix}"));
        }
    }
}
