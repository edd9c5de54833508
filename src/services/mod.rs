pub mod clubs;
pub mod compliance;
pub mod documents;
pub mod events;
pub mod jwt;
pub mod nutrition;
pub mod plan_filter;
pub mod reports;
pub mod users;
