pub mod admin;
pub mod booking;
pub mod gallery;

pub use admin::{AdminAccount, AdminIdentity};
pub use booking::{Booking, BookingStatus, CancelActor, NewBooking};
pub use gallery::{GalleryImage, NewGalleryImage};
