pub mod analysis;
pub mod clubs;
pub mod events;
pub mod nutrition;
pub mod reports;
pub mod users;
