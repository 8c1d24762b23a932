//! Adapters between the outside world and the domain types.

pub mod csv;
