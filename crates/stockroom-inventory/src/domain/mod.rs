//! Domain model: value objects, entities, commands and events.

pub mod commands;
pub mod entities;
pub mod events;
pub mod value_objects;
