#[allow(clippy::module_inception)]
pub mod db;
pub mod export;
pub mod records;

pub use db::Database;
