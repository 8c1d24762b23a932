//! Domain layer: the money value object, the transaction record and the store port.

pub mod currency;
pub mod money;
pub mod ports;
pub mod transaction;
