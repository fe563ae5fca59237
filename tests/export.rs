mod common;

use sales_dashboard::output::{export_snapshot, PANELS};
use sales_dashboard::{Dashboard, DashboardConfig, RegionFilter};
use std::fs;

#[test]
fn exports_every_panel_and_a_summary() {
    let ds = common::sample();
    let snapshot = Dashboard::new(&ds, DashboardConfig::default())
        .build(&RegionFilter::Named("Southeast".into()));

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("reports");
    let files = export_snapshot(&out, &snapshot).unwrap();
    assert_eq!(files.len(), PANELS.len() + 2);
    for panel in PANELS.iter() {
        assert!(out.join(panel.file_name()).exists(), "{}", panel.slug);
    }

    let churn = fs::read_to_string(out.join("10_customer_churn.csv")).unwrap();
    assert_eq!(
        churn.lines().collect::<Vec<_>>(),
        vec!["ActiveCustomers,ChurnedCustomers", "1,1"]
    );

    let segments = fs::read_to_string(out.join("06_customer_segmentation.csv")).unwrap();
    let first_cell = segments.lines().nth(1).unwrap();
    assert!(first_cell.starts_with("Moderate Volume,High Value,1,"));

    let text = fs::read_to_string(out.join("summary.json")).unwrap();
    let summary: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(summary["region"], "Southeast");
    assert_eq!(summary["total_sales"], 14400.0);
    assert_eq!(summary["active_customers"], 1);
    assert_eq!(summary["churned_customers"], 1);
    assert_eq!(summary["accounts_in_scope"], 2);
}
