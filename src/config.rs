//! Command-line and environment configuration.

use clap::Parser;
use std::path::PathBuf;

use crate::dashboard::{BoundaryYears, DashboardConfig};
use crate::filter::RegionFilter;

/// Environment variable holding the tracing filter (e.g. `debug`).
pub const LOG_ENV: &str = "SALES_DASHBOARD_LOG";

#[derive(Debug, Clone, Parser)]
#[command(
    name = "sales_dashboard",
    version,
    about = "Region-filtered sales metrics over accounts, orders and web events"
)]
pub struct Config {
    /// Directory holding region.csv, sales_reps.csv, accounts.csv, orders.csv
    /// and web_events.csv.
    #[arg(long, env = "SALES_DASHBOARD_DATA", default_value = ".")]
    pub data_dir: PathBuf,

    /// Render the dashboard once for this selection and exit instead of
    /// showing the menu. Use "All Regions" for no restriction.
    #[arg(long, env = "SALES_DASHBOARD_REGION")]
    pub region: Option<String>,

    /// Where CSV and JSON exports are written.
    #[arg(long, env = "SALES_DASHBOARD_OUT", default_value = "reports")]
    pub out_dir: PathBuf,

    /// Two years compared by the monthly trend panel, e.g. `2013,2017`.
    /// Defaults to the first and last order year in the data.
    #[arg(long, value_parser = parse_year_pair, value_name = "YEAR,YEAR")]
    pub boundary_years: Option<(i32, i32)>,

    /// Rows shown per panel in the console preview.
    #[arg(long, default_value_t = 5)]
    pub preview_rows: usize,

    /// Skip writing CSV/JSON files.
    #[arg(long)]
    pub no_export: bool,
}

impl Config {
    pub fn dashboard(&self) -> DashboardConfig {
        let boundary_years = match self.boundary_years {
            Some((a, b)) => BoundaryYears::Explicit(a, b),
            None => BoundaryYears::Derived,
        };
        DashboardConfig { boundary_years }
    }

    pub fn region_filter(&self) -> Option<RegionFilter> {
        self.region.as_deref().map(RegionFilter::from_selection)
    }
}

fn parse_year_pair(s: &str) -> Result<(i32, i32), String> {
    let (a, b) = s
        .split_once(',')
        .ok_or_else(|| format!("expected two comma-separated years, got `{s}`"))?;
    let year = |v: &str| {
        v.trim()
            .parse::<i32>()
            .map_err(|e| format!("invalid year `{}`: {e}", v.trim()))
    };
    Ok((year(a)?, year(b)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::try_parse_from(["sales_dashboard"]).unwrap();
        assert_eq!(cfg.preview_rows, 5);
        assert!(!cfg.no_export);
        assert_eq!(cfg.dashboard().boundary_years, BoundaryYears::Derived);
    }

    #[test]
    fn explicit_boundary_years_and_region() {
        let cfg = Config::try_parse_from([
            "sales_dashboard",
            "--boundary-years",
            "2013,2017",
            "--region",
            "Northeast",
            "--no-export",
        ])
        .unwrap();
        assert_eq!(
            cfg.dashboard().boundary_years,
            BoundaryYears::Explicit(2013, 2017)
        );
        assert_eq!(
            cfg.region_filter(),
            Some(RegionFilter::Named("Northeast".into()))
        );
        assert!(cfg.no_export);
    }

    #[test]
    fn malformed_boundary_years_are_rejected() {
        assert!(Config::try_parse_from(["sales_dashboard", "--boundary-years", "2013"]).is_err());
        assert!(
            Config::try_parse_from(["sales_dashboard", "--boundary-years", "2013,later"]).is_err()
        );
    }

    #[test]
    fn all_regions_selection_is_the_sentinel() {
        let cfg = Config::try_parse_from(["sales_dashboard", "--region", "All Regions"]).unwrap();
        assert_eq!(cfg.region_filter(), Some(RegionFilter::All));
    }
}
