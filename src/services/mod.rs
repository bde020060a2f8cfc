pub mod availability;
pub mod credentials;
pub mod gallery;
pub mod ledger;
pub mod session;
pub mod uploads;
