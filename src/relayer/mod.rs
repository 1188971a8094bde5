//! Configuration for off-process relayers.

pub mod hermes;
