//! Lumen Core - shared numeric primitives for the light-show pipeline.
//!
//! This crate provides the small, allocation-free building blocks reused by
//! the analyser, change-detector, and effect-controller crates.
//!
//! # Core Abstractions
//!
//! - [`ExponentialFilter`] / [`ExponentialFilterVec`] - two-rate decay/rise
//!   smoothing over scalars and vectors
//! - Math utilities: [`db_to_linear`], [`linear_to_db`], [`lerp`], [`clamp`],
//!   [`flush_denormal`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature in
//! your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! lumen-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod exponential_filter;
pub mod math;

pub use exponential_filter::{ExponentialFilter, ExponentialFilterVec};
pub use math::{clamp, db_to_linear, flush_denormal, lerp, linear_to_db, ms_to_samples, samples_to_ms};
