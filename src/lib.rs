//! Library crate for elgato-hue-cycler, exposing the hue strategies, the device client and the
//! run loop to the binary and integration tests.

pub mod cli;
pub mod color;
pub mod config;
pub mod cycler;
pub mod device;
pub mod error;
pub mod gradient;
pub mod strategy;
