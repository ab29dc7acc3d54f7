//! Jump CLI - command line front end for the jump planner.
//!
//! Scenario files describe a site, optional settings and the wind data;
//! the commands turn them into JSON documents:
//! - plan: landing pattern, jump run, freefall and circles
//! - profile: resampled wind profile
//! - mean-wind: mean wind over a height band
//! - freefall: freefall trajectory and ground path

pub mod commands;
pub mod config;
pub mod scenario;

pub use config::{Config, LogFormat};
pub use scenario::Scenario;
