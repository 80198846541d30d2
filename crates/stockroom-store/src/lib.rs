//! Stockroom storage adapters.
//!
//! Both adapters implement the inventory context's `UnitOfWork` port: one
//! transaction scope per command, staged writes, atomic commit.

pub mod memory;
pub mod pg;
pub mod schema;
