//! Stockroom core: shared domain abstractions.
//!
//! This crate defines the traits and types that the inventory context and
//! its adapters depend on. It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod event;
pub mod publisher;
