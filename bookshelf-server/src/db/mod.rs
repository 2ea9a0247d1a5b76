//! Database layer - connection pool, schema, row aggregation and repositories
//!
//! # Design Principles
//!
//! - One shared pool (max 25 connections), no Arc<Mutex<Connection>>
//! - Schema provisioning is idempotent and best-effort
//! - Nested reads are a single LEFT JOIN folded in memory
//! - The repository takes its store at construction, never a global

pub mod pool;
pub mod repos;
pub mod rows;
pub mod schema;

pub use pool::{close_pool, create_pool, create_pool_with_settings, init_pool, PoolSettings};
pub use repos::*;
pub use rows::{aggregate, BookChapterRow, BookRow};
pub use schema::{ensure_schema, SchemaReport};
