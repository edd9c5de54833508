#![allow(dead_code)]

pub mod database;
pub mod helpers;
pub mod test_app;

pub use database::TestDb;
pub use helpers::{register_and_login, unique_name};
pub use test_app::{StubBackend, TestApp};
