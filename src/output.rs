// Rendering and export of a dashboard snapshot.
//
// Each family is a panel with a chart kind. The terminal front end prints a
// markdown preview of every panel; export writes one CSV per panel plus a
// JSON summary.
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

use crate::dashboard::DashboardSnapshot;
use crate::error::{Error, Result};
use crate::reports::yearly_extremes;
use crate::util::{display_usd, format_int};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Indicator,
    Bar,
    HorizontalBar,
    StackedBar,
    GroupedBar,
    Scatter,
    Line,
    Area,
    PolarBar,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChartKind::Indicator => "indicator",
            ChartKind::Bar => "bar",
            ChartKind::HorizontalBar => "horizontal bar",
            ChartKind::StackedBar => "stacked bar",
            ChartKind::GroupedBar => "grouped bar",
            ChartKind::Scatter => "scatter",
            ChartKind::Line => "line",
            ChartKind::Area => "area",
            ChartKind::PolarBar => "polar bar",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Panel {
    pub number: usize,
    pub slug: &'static str,
    pub title: &'static str,
    pub kind: ChartKind,
}

impl Panel {
    const fn new(number: usize, slug: &'static str, title: &'static str, kind: ChartKind) -> Self {
        Self {
            number,
            slug,
            title,
            kind,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{:02}_{}.csv", self.number, self.slug)
    }
}

pub const PANELS: [Panel; 18] = [
    Panel::new(
        1,
        "regional_sales",
        "Total Sales by Region",
        ChartKind::Indicator,
    ),
    Panel::new(
        2,
        "accounts_per_rep",
        "Accounts by Sales Rep",
        ChartKind::Bar,
    ),
    Panel::new(
        3,
        "web_events_by_rep",
        "Web Event Occurrences by Sales Rep and Channel",
        ChartKind::StackedBar,
    ),
    Panel::new(
        4,
        "customer_acquisition",
        "Customer Acquisition by Sales Rep",
        ChartKind::Scatter,
    ),
    Panel::new(
        5,
        "average_order_size",
        "Average Order Size by Region",
        ChartKind::HorizontalBar,
    ),
    Panel::new(
        6,
        "customer_segmentation",
        "Order Size, Accounts and Sales by Segment",
        ChartKind::GroupedBar,
    ),
    Panel::new(
        7,
        "unit_price_outliers",
        "Unit Price for Large Mixed Orders",
        ChartKind::Bar,
    ),
    Panel::new(
        8,
        "yearly_totals",
        "Total Order Value by Year",
        ChartKind::Line,
    ),
    Panel::new(
        9,
        "customer_lifetime_value",
        "Customer Lifetime Value",
        ChartKind::Scatter,
    ),
    Panel::new(
        10,
        "customer_churn",
        "Active vs Churned Customers",
        ChartKind::HorizontalBar,
    ),
    Panel::new(
        11,
        "web_event_effectiveness",
        "Web Event Effectiveness by Region and Channel",
        ChartKind::StackedBar,
    ),
    Panel::new(
        12,
        "sales_contribution",
        "Sales Contribution by Sales Rep and Region",
        ChartKind::Bar,
    ),
    Panel::new(
        13,
        "monthly_boundary_trend",
        "Monthly Orders in the Boundary Years",
        ChartKind::Area,
    ),
    Panel::new(
        14,
        "product_mix",
        "Average Order Amounts by Paper Type",
        ChartKind::StackedBar,
    ),
    Panel::new(
        15,
        "channel_effectiveness",
        "Channel Effectiveness",
        ChartKind::GroupedBar,
    ),
    Panel::new(
        16,
        "seasonal_trend",
        "Seasonal Sales by Month",
        ChartKind::PolarBar,
    ),
    Panel::new(
        17,
        "purchase_frequency",
        "Purchase Frequency and Spend Segments",
        ChartKind::Scatter,
    ),
    Panel::new(
        18,
        "activity_sales",
        "Average Sales by Activity Segment and Region",
        ChartKind::GroupedBar,
    ),
];

/// Something that consumes each panel's rows in turn.
pub trait PanelSink {
    fn panel<T>(&mut self, panel: &Panel, rows: &[T]) -> Result<()>
    where
        T: Tabled + Serialize + Clone;
}

/// Feed every panel of the snapshot to `sink`, in panel order.
pub fn walk_panels<S: PanelSink>(snapshot: &DashboardSnapshot, sink: &mut S) -> Result<()> {
    let p = &PANELS;
    sink.panel(&p[0], &snapshot.regional_sales)?;
    sink.panel(&p[1], &snapshot.accounts_per_rep)?;
    sink.panel(&p[2], &snapshot.rep_channel_events)?;
    sink.panel(&p[3], &snapshot.acquisition)?;
    sink.panel(&p[4], &snapshot.average_order_size)?;
    sink.panel(&p[5], &snapshot.segmentation)?;
    sink.panel(&p[6], &snapshot.unit_prices)?;
    sink.panel(&p[7], &snapshot.yearly_totals)?;
    sink.panel(&p[8], &snapshot.lifetime_value)?;
    sink.panel(&p[9], &snapshot.churn)?;
    sink.panel(&p[10], &snapshot.web_event_reach)?;
    sink.panel(&p[11], &snapshot.sales_contribution)?;
    sink.panel(&p[12], &snapshot.monthly_trend)?;
    sink.panel(&p[13], &snapshot.product_mix)?;
    sink.panel(&p[14], &snapshot.channel_reach)?;
    sink.panel(&p[15], &snapshot.seasonal)?;
    sink.panel(&p[16], &snapshot.purchase_frequency)?;
    sink.panel(&p[17], &snapshot.activity_sales)?;
    Ok(())
}

/// Prints a markdown preview of each panel to stdout.
pub struct ConsoleRenderer {
    pub max_rows: usize,
}

impl PanelSink for ConsoleRenderer {
    fn panel<T>(&mut self, panel: &Panel, rows: &[T]) -> Result<()>
    where
        T: Tabled + Serialize + Clone,
    {
        println!(
            "Panel {}: {} ({}, {} rows)",
            panel.number,
            panel.title,
            panel.kind,
            format_int(rows.len())
        );
        println!("{}", preview_table(rows, self.max_rows));
        Ok(())
    }
}

pub fn preview_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)\n".to_string();
    }
    format!("{}\n", Table::new(slice).with(Style::markdown()))
}

/// Print the whole dashboard for one selection.
pub fn render_snapshot(snapshot: &DashboardSnapshot, max_rows: usize) -> Result<()> {
    println!("Strategic Sales Performance Overview ({})\n", snapshot.region);
    println!(
        "Total Sales Amount - {}: {}",
        snapshot.region,
        display_usd(&snapshot.total_sales)
    );
    if let Some((low, high)) = yearly_extremes(&snapshot.yearly_totals) {
        println!(
            "Lowest year {} ({}), highest year {} ({})",
            low.year,
            display_usd(&low.total_usd),
            high.year,
            display_usd(&high.total_usd)
        );
    }
    println!();
    walk_panels(snapshot, &mut ConsoleRenderer { max_rows })?;
    println!("Web events per channel (pivot by sales rep):");
    println!("{}", preview_table(&snapshot.rep_channel_pivot, max_rows));
    Ok(())
}

/// Writes one CSV per panel into a directory.
pub struct CsvExporter {
    dir: PathBuf,
    pub written: Vec<PathBuf>,
}

impl CsvExporter {
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            written: Vec::new(),
        })
    }
}

impl PanelSink for CsvExporter {
    fn panel<T>(&mut self, panel: &Panel, rows: &[T]) -> Result<()>
    where
        T: Tabled + Serialize + Clone,
    {
        let path = self.dir.join(panel.file_name());
        write_csv(&path, rows)?;
        self.written.push(path);
        Ok(())
    }
}

/// Export every panel, the channel pivot and `summary.json` into `dir`.
pub fn export_snapshot(dir: &Path, snapshot: &DashboardSnapshot) -> Result<Vec<PathBuf>> {
    let mut exporter = CsvExporter::new(dir)?;
    walk_panels(snapshot, &mut exporter)?;

    let pivot = dir.join("03_web_events_pivot.csv");
    write_csv(&pivot, &snapshot.rep_channel_pivot)?;
    exporter.written.push(pivot);

    let summary = dir.join("summary.json");
    write_json(&summary, &snapshot.summary())?;
    exporter.written.push(summary);

    info!(
        "Exported {} files to {}",
        exporter.written.len(),
        dir.display()
    );
    Ok(exporter.written)
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let name = path.display().to_string();
    let mut wtr = csv::Writer::from_path(path).map_err(|e| Error::csv(&name, e))?;
    for r in rows {
        wtr.serialize(r).map_err(|e| Error::csv(&name, e))?;
    }
    wtr.flush().map_err(|e| Error::io(path, e))?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    fs::write(path, s).map_err(|e| Error::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RegionalSalesRow, YearlyTotalRow};

    #[test]
    fn panels_are_numbered_in_order() {
        for (i, panel) in PANELS.iter().enumerate() {
            assert_eq!(panel.number, i + 1);
        }
        assert_eq!(PANELS[0].kind, ChartKind::Indicator);
        assert_eq!(PANELS[15].kind, ChartKind::PolarBar);
        assert_eq!(PANELS[6].file_name(), "07_unit_price_outliers.csv");
    }

    #[test]
    fn preview_limits_rows() {
        let rows: Vec<YearlyTotalRow> = (2013..2018)
            .map(|year| YearlyTotalRow {
                year,
                total_usd: 1000.0,
            })
            .collect();
        let table = preview_table(&rows, 2);
        assert!(table.contains("2013"));
        assert!(table.contains("2014"));
        assert!(!table.contains("2015"));
        assert!(table.contains("$1,000.00"));
        assert_eq!(preview_table::<YearlyTotalRow>(&[], 5), "(no rows)\n");
    }

    #[test]
    fn csv_headers_are_pascal_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("regional.csv");
        write_csv(
            &path,
            &[RegionalSalesRow {
                region_name: "Northeast".into(),
                total_sales: 7744405.36,
            }],
        )
        .unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("RegionName,TotalSales"));
        assert_eq!(lines.next(), Some("Northeast,7744405.36"));
    }
}
