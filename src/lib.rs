//! Windowgate - Sliding-Window Admission Control
//!
//! This crate bounds a bursty request source to a maximum number of requests
//! per trailing time window. Limiters are constructed explicitly, one per
//! logical boundary, and read time from an injected clock.

pub mod config;
pub mod error;
pub mod ratelimit;
