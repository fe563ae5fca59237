//! Immutable in-memory dataset and the region scope every report reads from.
//!
//! A [`Scope`] is the region filter applied as a restriction: the matching
//! regions, their reps, those reps' accounts, and those accounts' orders and
//! web events. It always walks Region -> SalesRep -> Account -> {Order,
//! WebEvent}, so "All Regions" and a single region differ only in which
//! regions seed the walk.

use chrono::Datelike;
use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::filter::{RegionFilter, ALL_REGIONS};
use crate::types::{Account, Order, Region, SalesRep, WebEvent};

#[derive(Debug)]
pub struct Dataset {
    regions: Vec<Region>,
    sales_reps: Vec<SalesRep>,
    accounts: Vec<Account>,
    orders: Vec<Order>,
    web_events: Vec<WebEvent>,
    region_by_id: HashMap<i64, usize>,
    rep_by_id: HashMap<i64, usize>,
    account_by_id: HashMap<i64, usize>,
}

impl Dataset {
    /// Build the dataset handle, checking that ids are unique within each
    /// table and that every reference resolves.
    pub fn from_tables(
        regions: Vec<Region>,
        sales_reps: Vec<SalesRep>,
        accounts: Vec<Account>,
        orders: Vec<Order>,
        web_events: Vec<WebEvent>,
    ) -> Result<Self> {
        let region_by_id = index_by("region", &regions, |r| r.id)?;
        let rep_by_id = index_by("sales_reps", &sales_reps, |r| r.id)?;
        let account_by_id = index_by("accounts", &accounts, |a| a.id)?;
        index_by("orders", &orders, |o| o.id)?;
        index_by("web_events", &web_events, |e| e.id)?;

        for rep in &sales_reps {
            if !region_by_id.contains_key(&rep.region_id) {
                return Err(Error::DanglingReference {
                    table: "sales_reps",
                    id: rep.id,
                    column: "region_id",
                    target: "region",
                    missing: rep.region_id,
                });
            }
        }
        for account in &accounts {
            if !rep_by_id.contains_key(&account.sales_rep_id) {
                return Err(Error::DanglingReference {
                    table: "accounts",
                    id: account.id,
                    column: "sales_rep_id",
                    target: "sales_reps",
                    missing: account.sales_rep_id,
                });
            }
        }
        for order in &orders {
            if !account_by_id.contains_key(&order.account_id) {
                return Err(Error::DanglingReference {
                    table: "orders",
                    id: order.id,
                    column: "account_id",
                    target: "accounts",
                    missing: order.account_id,
                });
            }
        }
        for event in &web_events {
            if !account_by_id.contains_key(&event.account_id) {
                return Err(Error::DanglingReference {
                    table: "web_events",
                    id: event.id,
                    column: "account_id",
                    target: "accounts",
                    missing: event.account_id,
                });
            }
        }

        Ok(Self {
            regions,
            sales_reps,
            accounts,
            orders,
            web_events,
            region_by_id,
            rep_by_id,
            account_by_id,
        })
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn sales_reps(&self) -> &[SalesRep] {
        &self.sales_reps
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn web_events(&self) -> &[WebEvent] {
        &self.web_events
    }

    /// Distinct region names in table order.
    pub fn region_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.regions
            .iter()
            .map(|r| r.name.as_str())
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Selector options: the sentinel followed by every region name.
    pub fn region_options(&self) -> Vec<String> {
        std::iter::once(ALL_REGIONS.to_string())
            .chain(self.region_names().into_iter().map(str::to_string))
            .collect()
    }

    /// First and last calendar year with an order, over the whole table.
    pub fn order_year_range(&self) -> Option<(i32, i32)> {
        let years = self.orders.iter().map(|o| o.occurred_at.year());
        let min = years.clone().min()?;
        let max = years.max()?;
        Some((min, max))
    }

    pub fn region(&self, id: i64) -> Option<&Region> {
        self.region_by_id.get(&id).map(|&i| &self.regions[i])
    }

    pub fn sales_rep(&self, id: i64) -> Option<&SalesRep> {
        self.rep_by_id.get(&id).map(|&i| &self.sales_reps[i])
    }

    pub fn account(&self, id: i64) -> Option<&Account> {
        self.account_by_id.get(&id).map(|&i| &self.accounts[i])
    }

    pub fn rep_region(&self, rep: &SalesRep) -> Option<&Region> {
        self.region(rep.region_id)
    }

    pub fn account_rep(&self, account: &Account) -> Option<&SalesRep> {
        self.sales_rep(account.sales_rep_id)
    }

    pub fn account_region(&self, account: &Account) -> Option<&Region> {
        self.account_rep(account).and_then(|rep| self.rep_region(rep))
    }

    /// Restrict the dataset to the regions the filter selects.
    pub fn scope(&self, filter: &RegionFilter) -> Scope<'_> {
        let regions: Vec<&Region> = self
            .regions
            .iter()
            .filter(|r| filter.matches(&r.name))
            .collect();
        let region_ids: HashSet<i64> = regions.iter().map(|r| r.id).collect();

        let sales_reps: Vec<&SalesRep> = self
            .sales_reps
            .iter()
            .filter(|rep| region_ids.contains(&rep.region_id))
            .collect();
        let rep_ids: HashSet<i64> = sales_reps.iter().map(|r| r.id).collect();

        let accounts: Vec<&Account> = self
            .accounts
            .iter()
            .filter(|a| rep_ids.contains(&a.sales_rep_id))
            .collect();
        let account_ids: HashSet<i64> = accounts.iter().map(|a| a.id).collect();

        let orders = self
            .orders
            .iter()
            .filter(|o| account_ids.contains(&o.account_id))
            .collect();
        let web_events = self
            .web_events
            .iter()
            .filter(|e| account_ids.contains(&e.account_id))
            .collect();

        Scope {
            dataset: self,
            regions,
            sales_reps,
            accounts,
            orders,
            web_events,
        }
    }
}

/// Map each row's id to its position, rejecting repeated ids.
fn index_by<T>(
    table: &'static str,
    rows: &[T],
    key: impl Fn(&T) -> i64,
) -> Result<HashMap<i64, usize>> {
    let mut index = HashMap::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let id = key(row);
        if index.insert(id, i).is_some() {
            return Err(Error::DuplicateId { table, id });
        }
    }
    Ok(index)
}

/// The rows visible under one region filter, in table order.
#[derive(Debug)]
pub struct Scope<'a> {
    pub dataset: &'a Dataset,
    pub regions: Vec<&'a Region>,
    pub sales_reps: Vec<&'a SalesRep>,
    pub accounts: Vec<&'a Account>,
    pub orders: Vec<&'a Order>,
    pub web_events: Vec<&'a WebEvent>,
}

impl<'a> Scope<'a> {
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn account(&self, id: i64) -> Option<&'a Account> {
        self.dataset.account(id)
    }

    pub fn region_name_of_rep(&self, rep: &SalesRep) -> Option<&'a str> {
        self.dataset.rep_region(rep).map(|r| r.name.as_str())
    }

    pub fn region_name_of_account(&self, account: &Account) -> Option<&'a str> {
        self.dataset.account_region(account).map(|r| r.name.as_str())
    }

    /// Orders of each account in scope, keyed by account id.
    pub fn orders_by_account(&self) -> HashMap<i64, Vec<&'a Order>> {
        let mut map: HashMap<i64, Vec<&'a Order>> = HashMap::new();
        for order in &self.orders {
            map.entry(order.account_id).or_default().push(*order);
        }
        map
    }
}
