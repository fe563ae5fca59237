//! Shared helpers for integration tests.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use sales_dashboard::types::{Account, Channel, Order, Region, SalesRep, WebEvent};
use sales_dashboard::{Dataset, Result};

/// Midnight on the given `YYYY-MM-DD`.
pub fn ts(date: &str) -> NaiveDateTime {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .expect("fixture date")
        .and_hms_opt(0, 0, 0)
        .expect("midnight")
}

/// Builder for in-memory datasets. Ids for orders and events are assigned
/// sequentially.
#[derive(Default)]
pub struct Fixture {
    regions: Vec<Region>,
    reps: Vec<SalesRep>,
    accounts: Vec<Account>,
    orders: Vec<Order>,
    events: Vec<WebEvent>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(mut self, id: i64, name: &str) -> Self {
        self.regions.push(Region {
            id,
            name: name.to_string(),
        });
        self
    }

    pub fn rep(mut self, id: i64, name: &str, region_id: i64) -> Self {
        self.reps.push(SalesRep {
            id,
            name: name.to_string(),
            region_id,
        });
        self
    }

    pub fn account(mut self, id: i64, name: &str, sales_rep_id: i64) -> Self {
        self.accounts.push(Account {
            id,
            name: name.to_string(),
            sales_rep_id,
        });
        self
    }

    /// One order of `units` standard paper worth `amount` USD.
    pub fn order(self, account_id: i64, date: &str, units: i64, amount: f64) -> Self {
        self.order_with(account_id, date, |o| {
            o.standard_qty = units;
            o.total = units;
            o.standard_amt_usd = amount;
            o.total_amt_usd = amount;
        })
    }

    /// `count` identical orders on the same date.
    pub fn orders(mut self, account_id: i64, count: usize, date: &str, amount: f64) -> Self {
        for _ in 0..count {
            self = self.order(account_id, date, 10, amount);
        }
        self
    }

    pub fn order_with(
        mut self,
        account_id: i64,
        date: &str,
        edit: impl FnOnce(&mut Order),
    ) -> Self {
        let mut order = Order {
            id: self.orders.len() as i64 + 1,
            account_id,
            occurred_at: ts(date),
            standard_qty: 0,
            poster_qty: 0,
            total: 0,
            standard_amt_usd: 0.0,
            gloss_amt_usd: 0.0,
            poster_amt_usd: 0.0,
            total_amt_usd: 0.0,
        };
        edit(&mut order);
        self.orders.push(order);
        self
    }

    pub fn event(mut self, account_id: i64, date: &str, channel: Channel) -> Self {
        self.events.push(WebEvent {
            id: self.events.len() as i64 + 1,
            account_id,
            occurred_at: ts(date),
            channel,
        });
        self
    }

    pub fn try_build(self) -> Result<Dataset> {
        Dataset::from_tables(
            self.regions,
            self.reps,
            self.accounts,
            self.orders,
            self.events,
        )
    }

    pub fn build(self) -> Dataset {
        self.try_build().expect("fixture references resolve")
    }
}

/// Four regions, one of them without any accounts, with orders spread over
/// 2013-2017 and web events on several channels.
pub fn sample() -> Dataset {
    Fixture::new()
        .region(1, "Northeast")
        .region(2, "Southeast")
        .region(3, "West")
        .region(4, "Midwest")
        .rep(10, "Alice", 1)
        .rep(11, "Bob", 1)
        .rep(20, "Carla", 2)
        .rep(30, "Dan", 3)
        .rep(40, "Idle", 4)
        .account(100, "Acme", 10)
        .account(101, "Initech", 10)
        .account(102, "Globex", 11)
        .account(200, "Umbrella", 20)
        .account(201, "Stark", 20)
        .account(300, "Wayne", 30)
        .order(100, "2013-01-15", 120, 800.0)
        .order(100, "2014-06-02", 300, 2400.5)
        .order(100, "2017-12-30", 50, 410.0)
        .order(101, "2015-03-10", 0, 0.0)
        .order(102, "2016-07-04", 80, 700.25)
        .order(102, "2016-07-05", 80, 650.75)
        .orders(200, 12, "2014-02-01", 1200.0)
        .order(300, "2017-01-20", 500, 4100.0)
        .order(300, "2013-11-11", 40, 320.0)
        .order_with(100, "2015-05-05", |o| {
            o.standard_qty = 150;
            o.poster_qty = 60;
            o.total = 210;
            o.standard_amt_usd = 748.5;
            o.poster_amt_usd = 487.2;
            o.total_amt_usd = 1235.7;
        })
        .order_with(300, "2016-09-09", |o| {
            o.standard_qty = 400;
            o.poster_qty = 90;
            o.total = 490;
            o.standard_amt_usd = 1996.0;
            o.poster_amt_usd = 730.8;
            o.total_amt_usd = 2726.8;
        })
        .event(100, "2015-01-01", Channel::Direct)
        .event(100, "2015-01-02", Channel::Facebook)
        .event(101, "2015-01-03", Channel::Direct)
        .event(102, "2015-01-04", Channel::Organic)
        .event(200, "2015-01-05", Channel::Direct)
        .event(201, "2015-01-06", Channel::Banner)
        .event(300, "2015-01-07", Channel::Twitter)
        .event(300, "2015-01-08", Channel::Adwords)
        .build()
}
