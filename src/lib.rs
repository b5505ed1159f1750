//! Bike sharing analytics: loads the rental dataset once, filters it by
//! date range and serves grouped aggregations for a dashboard renderer.
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
