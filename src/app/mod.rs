//! Application core — port traits and the node service glue.

pub mod ports;
pub mod service;
