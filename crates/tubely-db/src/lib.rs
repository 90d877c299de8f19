//! Tubely database layer
//!
//! The upload pipelines only need to read a content record and set one of its URL fields, so
//! this crate exposes exactly that boundary ([`ContentRepository`]) with a Postgres
//! implementation and an in-memory one.

pub mod db;

pub use db::{ContentRepository, InMemoryContentRepository, PgContentRepository, MIGRATOR};
