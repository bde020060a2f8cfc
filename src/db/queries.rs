use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{
    AdminAccount, Booking, BookingStatus, GalleryImage, NewBooking, NewGalleryImage,
};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn now_timestamp() -> String {
    Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

fn conversion_error(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}

fn parse_timestamp(idx: usize, s: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map_err(|e| conversion_error(idx, format!("bad timestamp {s:?}: {e}")))
}

// ── Bookings ──

const BOOKING_COLUMNS: &str =
    "id, first_name, last_name, phone, date, time, service, status, created_at";

pub fn insert_booking(conn: &Connection, booking: &NewBooking) -> rusqlite::Result<Booking> {
    let created_at = now_timestamp();
    conn.execute(
        "INSERT INTO bookings (first_name, last_name, phone, date, time, service, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            booking.first_name,
            booking.last_name,
            booking.phone,
            booking.date.format(DATE_FORMAT).to_string(),
            booking.time,
            booking.service,
            BookingStatus::Active.as_str(),
            created_at,
        ],
    )?;

    Ok(Booking {
        id: conn.last_insert_rowid(),
        first_name: booking.first_name.clone(),
        last_name: booking.last_name.clone(),
        phone: booking.phone.clone(),
        date: booking.date,
        time: booking.time.clone(),
        service: booking.service.clone(),
        status: BookingStatus::Active,
        created_at: parse_timestamp(8, &created_at)?,
    })
}

pub fn active_booking_exists(
    conn: &Connection,
    date: &NaiveDate,
    time: &str,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT COUNT(*) > 0 FROM bookings WHERE date = ?1 AND time = ?2 AND status = 'active'",
        params![date.format(DATE_FORMAT).to_string(), time],
        |row| row.get(0),
    )
}

/// All bookings, or only active ones, ordered by slot.
pub fn list_bookings(conn: &Connection, active_only: bool) -> rusqlite::Result<Vec<Booking>> {
    let sql = if active_only {
        format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE status = 'active' ORDER BY date ASC, time ASC, id ASC"
        )
    } else {
        format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY date ASC, time ASC, id ASC")
    };

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

pub fn get_booking_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Booking>> {
    conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        parse_booking_row,
    )
    .optional()
}

/// Moves an active booking to `status`. Returns false when the booking does
/// not exist or is no longer active.
pub fn cancel_active_booking(
    conn: &Connection,
    id: i64,
    status: BookingStatus,
) -> rusqlite::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1 WHERE id = ?2 AND status = 'active'",
        params![status.as_str(), id],
    )?;
    Ok(count > 0)
}

pub fn active_times_on(conn: &Connection, date: &NaiveDate) -> rusqlite::Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT time FROM bookings WHERE date = ?1 AND status = 'active'")?;
    let rows = stmt.query_map(params![date.format(DATE_FORMAT).to_string()], |row| {
        row.get::<_, String>(0)
    })?;

    let mut times = vec![];
    for row in rows {
        times.push(row?);
    }
    Ok(times)
}

fn parse_booking_row(row: &rusqlite::Row) -> rusqlite::Result<Booking> {
    let date_str: String = row.get(4)?;
    let status_str: String = row.get(7)?;
    let created_at_str: String = row.get(8)?;

    let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
        .map_err(|e| conversion_error(4, format!("bad date {date_str:?}: {e}")))?;
    let status = BookingStatus::parse(&status_str)
        .ok_or_else(|| conversion_error(7, format!("unknown booking status {status_str:?}")))?;

    Ok(Booking {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        phone: row.get(3)?,
        date,
        time: row.get(5)?,
        service: row.get(6)?,
        status,
        created_at: parse_timestamp(8, &created_at_str)?,
    })
}

// ── Admin ──

pub fn count_admins(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM admin_accounts", [], |row| row.get(0))
}

pub fn insert_admin(conn: &Connection, username: &str, password_hash: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO admin_accounts (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
        params![username, password_hash, now_timestamp()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_admin_by_username(
    conn: &Connection,
    username: &str,
) -> rusqlite::Result<Option<AdminAccount>> {
    conn.query_row(
        "SELECT id, username, password_hash, created_at FROM admin_accounts WHERE username = ?1",
        params![username],
        |row| {
            let created_at_str: String = row.get(3)?;
            Ok(AdminAccount {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                created_at: parse_timestamp(3, &created_at_str)?,
            })
        },
    )
    .optional()
}

// ── Gallery ──

const GALLERY_COLUMNS: &str = "id, title, description, filename, original_name, upload_date";

pub fn insert_gallery_image(
    conn: &Connection,
    image: &NewGalleryImage,
) -> rusqlite::Result<GalleryImage> {
    let upload_date = now_timestamp();
    conn.execute(
        "INSERT INTO gallery_images (title, description, filename, original_name, upload_date)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            image.title,
            image.description,
            image.filename,
            image.original_name,
            upload_date,
        ],
    )?;

    Ok(GalleryImage {
        id: conn.last_insert_rowid(),
        title: image.title.clone(),
        description: image.description.clone(),
        filename: image.filename.clone(),
        original_name: image.original_name.clone(),
        upload_date: parse_timestamp(5, &upload_date)?,
    })
}

/// Newest first.
pub fn list_gallery_images(conn: &Connection) -> rusqlite::Result<Vec<GalleryImage>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GALLERY_COLUMNS} FROM gallery_images ORDER BY upload_date DESC, id DESC"
    ))?;
    let rows = stmt.query_map([], parse_gallery_row)?;

    let mut images = vec![];
    for row in rows {
        images.push(row?);
    }
    Ok(images)
}

pub fn get_gallery_image(conn: &Connection, id: i64) -> rusqlite::Result<Option<GalleryImage>> {
    conn.query_row(
        &format!("SELECT {GALLERY_COLUMNS} FROM gallery_images WHERE id = ?1"),
        params![id],
        parse_gallery_row,
    )
    .optional()
}

pub fn delete_gallery_image(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let count = conn.execute("DELETE FROM gallery_images WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

fn parse_gallery_row(row: &rusqlite::Row) -> rusqlite::Result<GalleryImage> {
    let upload_date_str: String = row.get(5)?;
    Ok(GalleryImage {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        filename: row.get(3)?,
        original_name: row.get(4)?,
        upload_date: parse_timestamp(5, &upload_date_str)?,
    })
}
