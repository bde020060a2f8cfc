use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub date: NaiveDate,
    pub time: String,
    pub service: String,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
}

/// Caller-supplied fields for a new booking. Status and timestamps are
/// assigned by the ledger.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub date: NaiveDate,
    pub time: String,
    pub service: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Active,
    CancelledByCustomer,
    CancelledByAdmin,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Active => "active",
            BookingStatus::CancelledByCustomer => "cancelled_by_customer",
            BookingStatus::CancelledByAdmin => "cancelled_by_admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(BookingStatus::Active),
            "cancelled_by_customer" => Some(BookingStatus::CancelledByCustomer),
            "cancelled_by_admin" => Some(BookingStatus::CancelledByAdmin),
            _ => None,
        }
    }
}

/// Who asked for a cancellation; decides the terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelActor {
    Customer,
    Admin,
}

impl CancelActor {
    pub fn cancelled_status(&self) -> BookingStatus {
        match self {
            CancelActor::Customer => BookingStatus::CancelledByCustomer,
            CancelActor::Admin => BookingStatus::CancelledByAdmin,
        }
    }
}
