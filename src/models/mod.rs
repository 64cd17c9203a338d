//! Data models for Toyrent

pub mod category;
pub mod enums;
pub mod rental;
pub mod toy;
pub mod user;

// Re-export commonly used types
pub use category::Category;
pub use enums::{ItemCondition, PaymentStatus, RentalItemStatus, RentalStatus, UserRole};
pub use rental::{Rental, RentalDetails, RentalItem, ReturnSettlement, SettledItem};
pub use toy::{Toy, ToyImage};
pub use user::{User, UserClaims};
