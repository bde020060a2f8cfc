pub mod admin;
pub mod auth;
pub mod bookings;
pub mod extract;
pub mod gallery;
pub mod health;
