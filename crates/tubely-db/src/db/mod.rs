//! Content record repositories

pub mod content;
pub mod memory;

pub use content::{ContentRepository, PgContentRepository};
pub use memory::InMemoryContentRepository;

/// Migrations embedded at build time from `crates/tubely-db/migrations`
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
