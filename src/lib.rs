//! Access log analysis: parse, aggregate, attribute regions, render a report

pub mod analysis;
pub mod config;
pub mod error;
pub mod geoip;
pub mod report;
