//! Wire types shared by the DataViz client crates.

pub mod domain;
pub mod error;
pub mod protocol;
