//! Sales metrics dashboard over the accounts / orders / regions / sales reps /
//! web events dataset.
//!
//! The dataset is loaded once into an immutable [`Dataset`]. A
//! [`RegionFilter`] turns it into a [`dataset::Scope`], and every aggregation
//! family in [`reports`] is computed from that scope. [`Dashboard`] runs all of
//! them for one selection and [`output`] renders or exports the result.

pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod loader;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

pub use config::Config;
pub use dashboard::{BoundaryYears, Dashboard, DashboardConfig, DashboardSnapshot};
pub use dataset::Dataset;
pub use error::{Error, Result};
pub use filter::{RegionFilter, ALL_REGIONS};
pub use loader::{load_dataset, LoadReport};
