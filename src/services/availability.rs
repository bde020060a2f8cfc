use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::queries;

/// Bookable times of day, in the order they are offered.
pub const SLOT_CATALOG: &[&str] = &["16:00", "17:00", "18:00", "19:00"];

pub fn is_catalog_slot(time: &str) -> bool {
    SLOT_CATALOG.contains(&time)
}

/// Catalog entries not present in `taken`, preserving catalog order.
pub fn free_slots<S: AsRef<str>>(catalog: &[&str], taken: &[S]) -> Vec<String> {
    catalog
        .iter()
        .filter(|slot| !taken.iter().any(|t| t.as_ref() == **slot))
        .map(|slot| slot.to_string())
        .collect()
}

/// Free slots on `date` given the currently active bookings.
pub fn free_slots_on(conn: &Connection, date: &NaiveDate) -> rusqlite::Result<Vec<String>> {
    let taken = queries::active_times_on(conn, date)?;
    Ok(free_slots(SLOT_CATALOG, &taken))
}
