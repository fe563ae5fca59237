use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::types::{
    Account, Channel, Order, RawAccount, RawOrder, RawRegion, RawSalesRep, RawWebEvent, Region,
    SalesRep, WebEvent,
};
use crate::util::parse_timestamp;

pub const REGION_FILE: &str = "region.csv";
pub const SALES_REPS_FILE: &str = "sales_reps.csv";
pub const ACCOUNTS_FILE: &str = "accounts.csv";
pub const ORDERS_FILE: &str = "orders.csv";
pub const WEB_EVENTS_FILE: &str = "web_events.csv";

const REGION_COLUMNS: &[&str] = &["id", "name"];
const SALES_REPS_COLUMNS: &[&str] = &["id", "name", "region_id"];
const ACCOUNTS_COLUMNS: &[&str] = &["id", "name", "sales_rep_id"];
const ORDERS_COLUMNS: &[&str] = &[
    "id",
    "account_id",
    "occurred_at",
    "standard_qty",
    "poster_qty",
    "total",
    "standard_amt_usd",
    "gloss_amt_usd",
    "poster_amt_usd",
    "total_amt_usd",
];
const WEB_EVENTS_COLUMNS: &[&str] = &["id", "account_id", "occurred_at", "channel"];

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub regions: usize,
    pub sales_reps: usize,
    pub accounts: usize,
    pub orders: usize,
    pub web_events: usize,
    pub order_years: Option<(i32, i32)>,
}

/// Load the five tables from `dir` and validate them into a [`Dataset`].
///
/// Any problem is fatal: a missing file, a missing required column, a row
/// that does not parse, a repeated id, or a reference to a row that does not
/// exist.
pub fn load_dataset(dir: &Path) -> Result<(Dataset, LoadReport)> {
    info!("Loading dataset from {}", dir.display());

    let regions: Vec<Region> = read_rows::<RawRegion>(dir, REGION_FILE, REGION_COLUMNS)?
        .into_iter()
        .map(|(_, r)| Region {
            id: r.id,
            name: r.name,
        })
        .collect();

    let sales_reps: Vec<SalesRep> =
        read_rows::<RawSalesRep>(dir, SALES_REPS_FILE, SALES_REPS_COLUMNS)?
            .into_iter()
            .map(|(_, r)| SalesRep {
                id: r.id,
                name: r.name,
                region_id: r.region_id,
            })
            .collect();

    let accounts: Vec<Account> = read_rows::<RawAccount>(dir, ACCOUNTS_FILE, ACCOUNTS_COLUMNS)?
        .into_iter()
        .map(|(_, r)| Account {
            id: r.id,
            name: r.name,
            sales_rep_id: r.sales_rep_id,
        })
        .collect();

    let mut orders = Vec::new();
    for (line, r) in read_rows::<RawOrder>(dir, ORDERS_FILE, ORDERS_COLUMNS)? {
        let occurred_at =
            parse_timestamp(&r.occurred_at).ok_or_else(|| Error::InvalidTimestamp {
                file: ORDERS_FILE.to_string(),
                line,
                value: r.occurred_at.clone(),
            })?;
        orders.push(Order {
            id: r.id,
            account_id: r.account_id,
            occurred_at,
            standard_qty: r.standard_qty,
            poster_qty: r.poster_qty,
            total: r.total,
            standard_amt_usd: r.standard_amt_usd,
            gloss_amt_usd: r.gloss_amt_usd,
            poster_amt_usd: r.poster_amt_usd,
            total_amt_usd: r.total_amt_usd,
        });
    }

    let mut web_events = Vec::new();
    for (line, r) in read_rows::<RawWebEvent>(dir, WEB_EVENTS_FILE, WEB_EVENTS_COLUMNS)? {
        let occurred_at =
            parse_timestamp(&r.occurred_at).ok_or_else(|| Error::InvalidTimestamp {
                file: WEB_EVENTS_FILE.to_string(),
                line,
                value: r.occurred_at.clone(),
            })?;
        let channel = r.channel.parse::<Channel>().map_err(|value| Error::InvalidChannel {
            file: WEB_EVENTS_FILE.to_string(),
            line,
            value,
        })?;
        web_events.push(WebEvent {
            id: r.id,
            account_id: r.account_id,
            occurred_at,
            channel,
        });
    }

    let dataset = Dataset::from_tables(regions, sales_reps, accounts, orders, web_events)?;
    let report = LoadReport {
        regions: dataset.regions().len(),
        sales_reps: dataset.sales_reps().len(),
        accounts: dataset.accounts().len(),
        orders: dataset.orders().len(),
        web_events: dataset.web_events().len(),
        order_years: dataset.order_year_range(),
    };
    info!(
        regions = report.regions,
        sales_reps = report.sales_reps,
        accounts = report.accounts,
        orders = report.orders,
        web_events = report.web_events,
        "Dataset loaded"
    );
    Ok((dataset, report))
}

/// Read one file, failing fast when a required column is absent.
///
/// Each row comes back with its 1-based line number for error messages.
fn read_rows<T: DeserializeOwned>(
    dir: &Path,
    file: &str,
    required: &[&str],
) -> Result<Vec<(u64, T)>> {
    let path = dir.join(file);
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .from_path(&path)
        .map_err(|e| Error::csv(file, e))?;

    let headers: StringRecord = rdr.headers().map_err(|e| Error::csv(file, e))?.clone();
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(Error::MissingColumn {
                file: file.to_string(),
                column: column.to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| Error::csv(file, e))?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: T = record
            .deserialize(Some(&headers))
            .map_err(|e| Error::csv(file, e))?;
        rows.push((line, row));
    }
    debug!("{}: {} rows", file, rows.len());
    Ok(rows)
}
