//! Retrieval of regional listing pages over HTTP.

pub mod client;
pub mod selectors;

pub use client::{FetchFailure, FetchFailureReason, HttpFetcher, RegionalFetcher};
