//! Application layer: ports, policy, and the command handler that
//! orchestrates a stock addition.

pub mod command_handlers;
pub mod policy;
pub mod ports;
