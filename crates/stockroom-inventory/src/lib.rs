//! Stockroom: tenant-scoped product stock bounded context.
//!
//! Responsible for adding stock to a product within its tenant's ceiling,
//! recording the audit trail, and raising capacity and low-stock alerts.

pub mod application;
pub mod domain;
