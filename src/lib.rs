//! ortrend - Operating-room occupancy curves by time of day
//!
//! This library turns a log of surgery time intervals into weighted
//! "rooms in use" curves sampled at fixed anchors, broken down by surgery
//! category and weekday, under several interchangeable sampling semantics,
//! and checks that the category split reconciles with the combined curve.

pub mod aggregate;
pub mod anchors;
pub mod cli;
pub mod config;
pub mod consistency;
pub mod csv_output;
pub mod engine;
pub mod error;
pub mod filter;
pub mod json_output;
pub mod loader;
pub mod record;
pub mod registry;
pub mod rounding;
pub mod sampler;
pub mod time_codec;
pub mod utilization;
