//! Blueprint registry library exports

pub mod registry;
