//! PostgreSQL-backed plan store.
//!
//! One JSONB document per plan id; saves are whole-document overwrites and
//! the last save wins. Shape detection and normalization of legacy
//! documents live in `pathway-core`; this crate only moves documents.

pub mod config;
pub mod pool;
pub mod store;

pub use store::PgPlanStore;
