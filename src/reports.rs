// The eighteen aggregation families.
//
// Every function takes a `Scope` (the dataset already restricted to the
// selected regions) and returns its rows sorted for display. None of them
// branch on the filter, which is what keeps "All Regions" and a single region
// on the same aggregation path. Sums run over orders in table order and
// groups are emitted in a fixed order, so the same input always produces
// bit-identical floats.
use chrono::{Datelike, NaiveDateTime};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::dataset::Scope;
use crate::types::{
    AcquisitionRow, ActivitySalesRow, ActivitySegment, AverageOrderSizeRow, Channel,
    ChannelPivotRow, ChannelReachRow, ChurnRow, LifetimeValueRow, MonthlyTrendRow, Order,
    OrderActivity, ProductMixRow, PurchaseFrequencyRow, RegionalSalesRow, RepAccountsRow,
    RepChannelEventsRow, SalesContributionRow, SeasonalRow, SegmentCellRow, SpendingSegment,
    UnitPriceRow, ValueSegment, VolumeSegment, WebEventReachRow, YearlyTotalRow,
};
use crate::util::{average, dense_rank_desc, desc, month_name, round_to, sample_std_dev};

/// Added to the unit count before dividing so zero-unit orders stay finite.
pub const UNIT_PRICE_GUARD: f64 = 0.01;

/// Average order amount reported for an account that never ordered.
pub const NO_ORDERS_AVERAGE: f64 = 1.0;

fn region_of_order<'a>(scope: &Scope<'a>, order: &Order) -> Option<&'a str> {
    scope
        .account(order.account_id)
        .and_then(|a| scope.region_name_of_account(a))
}

fn amounts(orders: &[&Order]) -> Vec<f64> {
    orders.iter().map(|o| o.total_amt_usd).collect()
}

/// Family 1: total order value per region, highest first.
pub fn regional_total_sales(scope: &Scope<'_>) -> Vec<RegionalSalesRow> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for order in &scope.orders {
        if let Some(region) = region_of_order(scope, order) {
            *totals.entry(region).or_insert(0.0) += order.total_amt_usd;
        }
    }
    let mut rows: Vec<RegionalSalesRow> = totals
        .into_iter()
        .map(|(region, total)| RegionalSalesRow {
            region_name: region.to_string(),
            total_sales: total,
        })
        .collect();
    rows.sort_by(|a, b| {
        desc(a.total_sales, b.total_sales).then_with(|| a.region_name.cmp(&b.region_name))
    });
    rows
}

/// Headline indicator: the rounded sum of the regional totals.
pub fn headline_total_sales(rows: &[RegionalSalesRow]) -> f64 {
    rows.iter().map(|r| r.total_sales).sum::<f64>().round()
}

/// Family 2: number of accounts each rep owns. Reps without accounts are
/// not listed.
pub fn accounts_per_rep(scope: &Scope<'_>) -> Vec<RepAccountsRow> {
    let mut counts: HashMap<i64, usize> = HashMap::new();
    for account in &scope.accounts {
        *counts.entry(account.sales_rep_id).or_default() += 1;
    }
    let mut rows: Vec<RepAccountsRow> = scope
        .sales_reps
        .iter()
        .filter_map(|rep| {
            let count = *counts.get(&rep.id)?;
            Some(RepAccountsRow {
                region_name: scope.region_name_of_rep(rep)?.to_string(),
                sales_rep: rep.name.clone(),
                account_count: count,
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        a.sales_rep
            .cmp(&b.sales_rep)
            .then_with(|| a.region_name.cmp(&b.region_name))
    });
    rows
}

/// Family 3: web events per (rep, channel), most frequent first.
pub fn web_events_by_rep_channel(scope: &Scope<'_>) -> Vec<RepChannelEventsRow> {
    let mut counts: HashMap<(i64, Channel), usize> = HashMap::new();
    for event in &scope.web_events {
        if let Some(account) = scope.account(event.account_id) {
            *counts
                .entry((account.sales_rep_id, event.channel))
                .or_default() += 1;
        }
    }
    let mut rows: Vec<RepChannelEventsRow> = counts
        .into_iter()
        .filter_map(|((rep_id, channel), occurrences)| {
            let rep = scope.dataset.sales_rep(rep_id)?;
            Some(RepChannelEventsRow {
                region_name: scope.region_name_of_rep(rep)?.to_string(),
                sales_rep: rep.name.clone(),
                channel,
                occurrences,
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        b.occurrences
            .cmp(&a.occurrences)
            .then_with(|| a.sales_rep.cmp(&b.sales_rep))
            .then_with(|| a.region_name.cmp(&b.region_name))
            .then_with(|| a.channel.cmp(&b.channel))
    });
    rows
}

/// Spread family 3 into one column per channel, filling gaps with zero.
pub fn pivot_channels(rows: &[RepChannelEventsRow]) -> Vec<ChannelPivotRow> {
    let mut grid: BTreeMap<(&str, &str), [usize; 6]> = BTreeMap::new();
    for row in rows {
        let cells = grid
            .entry((row.region_name.as_str(), row.sales_rep.as_str()))
            .or_insert([0; 6]);
        if let Some(idx) = Channel::ALL.iter().position(|c| *c == row.channel) {
            cells[idx] += row.occurrences;
        }
    }
    grid.into_iter()
        .map(|((region, rep), c)| ChannelPivotRow {
            region_name: region.to_string(),
            sales_rep: rep.to_string(),
            direct: c[0],
            facebook: c[1],
            organic: c[2],
            adwords: c[3],
            twitter: c[4],
            banner: c[5],
        })
        .collect()
}

/// Family 4: accounts per rep and the year of the rep's earliest order.
///
/// Every rep in scope appears, including reps with no accounts or orders.
pub fn customer_acquisition(scope: &Scope<'_>) -> Vec<AcquisitionRow> {
    let mut accounts_of_rep: HashMap<i64, HashSet<i64>> = HashMap::new();
    for account in &scope.accounts {
        accounts_of_rep
            .entry(account.sales_rep_id)
            .or_default()
            .insert(account.id);
    }
    let mut first_order: HashMap<i64, NaiveDateTime> = HashMap::new();
    for order in &scope.orders {
        if let Some(account) = scope.account(order.account_id) {
            first_order
                .entry(account.sales_rep_id)
                .and_modify(|ts| *ts = (*ts).min(order.occurred_at))
                .or_insert(order.occurred_at);
        }
    }

    let mut rows: Vec<AcquisitionRow> = scope
        .sales_reps
        .iter()
        .filter_map(|rep| {
            Some(AcquisitionRow {
                region_name: scope.region_name_of_rep(rep)?.to_string(),
                sales_rep: rep.name.clone(),
                new_customers_acquired: accounts_of_rep.get(&rep.id).map_or(0, HashSet::len),
                first_order_year: first_order.get(&rep.id).map(|ts| ts.year()),
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        b.new_customers_acquired
            .cmp(&a.new_customers_acquired)
            .then_with(|| a.sales_rep.cmp(&b.sales_rep))
            .then_with(|| a.region_name.cmp(&b.region_name))
    });
    rows
}

/// Family 5: mean order value per region, highest first.
pub fn average_order_size_by_region(scope: &Scope<'_>) -> Vec<AverageOrderSizeRow> {
    let mut by_region: HashMap<&str, Vec<f64>> = HashMap::new();
    for order in &scope.orders {
        if let Some(region) = region_of_order(scope, order) {
            by_region
                .entry(region)
                .or_default()
                .push(order.total_amt_usd);
        }
    }
    let mut rows: Vec<AverageOrderSizeRow> = by_region
        .into_iter()
        .filter_map(|(region, amts)| {
            Some(AverageOrderSizeRow {
                region_name: region.to_string(),
                avg_order_size: average(&amts)?,
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        desc(a.avg_order_size, b.avg_order_size).then_with(|| a.region_name.cmp(&b.region_name))
    });
    rows
}

/// Family 6: volume x value segmentation of accounts that have ordered.
pub fn customer_segmentation(scope: &Scope<'_>) -> Vec<SegmentCellRow> {
    #[derive(Default)]
    struct Cell {
        accounts: usize,
        avgs: Vec<f64>,
        std_devs: Vec<f64>,
        total_sales: f64,
    }

    let by_account = scope.orders_by_account();
    let mut cells: BTreeMap<(VolumeSegment, ValueSegment), Cell> = BTreeMap::new();
    for account in &scope.accounts {
        let Some(orders) = by_account.get(&account.id) else {
            continue;
        };
        let amts = amounts(orders);
        let Some(avg) = average(&amts) else {
            continue;
        };
        let key = (
            VolumeSegment::classify(orders.len()),
            ValueSegment::classify(avg),
        );
        let cell = cells.entry(key).or_default();
        cell.accounts += 1;
        cell.avgs.push(avg);
        if let Some(sd) = sample_std_dev(&amts) {
            cell.std_devs.push(sd);
        }
        cell.total_sales += amts.iter().sum::<f64>();
    }

    let mut rows: Vec<SegmentCellRow> = cells
        .into_iter()
        .map(|((volume, value), cell)| SegmentCellRow {
            volume_segment: volume,
            value_segment: value,
            num_accounts: cell.accounts,
            avg_order_size: average(&cell.avgs).unwrap_or(0.0),
            avg_order_std_dev: average(&cell.std_devs),
            total_sales: cell.total_sales,
        })
        .collect();
    // Stable sort keeps the segment order for equal counts.
    rows.sort_by(|a, b| b.num_accounts.cmp(&a.num_accounts));
    rows
}

/// Family 7: per-unit price of large mixed orders (more than 100 standard and
/// more than 50 poster units), highest first.
pub fn unit_price_outliers(scope: &Scope<'_>) -> Vec<UnitPriceRow> {
    let mut rows: Vec<UnitPriceRow> = scope
        .orders
        .iter()
        .filter(|o| o.standard_qty > 100 && o.poster_qty > 50)
        .filter_map(|o| {
            let account = scope.account(o.account_id)?;
            Some(UnitPriceRow {
                region_name: scope.region_name_of_account(account)?.to_string(),
                account_name: account.name.clone(),
                order_id: o.id,
                unit_price: unit_price(o),
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        desc(a.unit_price, b.unit_price).then_with(|| a.order_id.cmp(&b.order_id))
    });
    rows
}

pub fn unit_price(order: &Order) -> f64 {
    order.total_amt_usd / (order.total as f64 + UNIT_PRICE_GUARD)
}

/// Family 8: order value per calendar year, smallest total first.
pub fn yearly_order_totals(scope: &Scope<'_>) -> Vec<YearlyTotalRow> {
    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for order in &scope.orders {
        *by_year.entry(order.occurred_at.year()).or_insert(0.0) += order.total_amt_usd;
    }
    let mut rows: Vec<YearlyTotalRow> = by_year
        .into_iter()
        .map(|(year, total_usd)| YearlyTotalRow { year, total_usd })
        .collect();
    rows.sort_by(|a, b| {
        a.total_usd
            .total_cmp(&b.total_usd)
            .then_with(|| a.year.cmp(&b.year))
    });
    rows
}

/// Lowest and highest year of family 8, for chart annotations.
pub fn yearly_extremes(rows: &[YearlyTotalRow]) -> Option<(&YearlyTotalRow, &YearlyTotalRow)> {
    let min = rows
        .iter()
        .min_by(|a, b| a.total_usd.total_cmp(&b.total_usd))?;
    let max = rows
        .iter()
        .max_by(|a, b| a.total_usd.total_cmp(&b.total_usd))?;
    Some((min, max))
}

/// Family 9: lifetime value per account.
///
/// Accounts without orders report zero spent, zero orders and an average of
/// [`NO_ORDERS_AVERAGE`].
pub fn customer_lifetime_value(scope: &Scope<'_>) -> Vec<LifetimeValueRow> {
    let by_account = scope.orders_by_account();
    let mut rows: Vec<LifetimeValueRow> = scope
        .accounts
        .iter()
        .map(|account| {
            let amts = by_account
                .get(&account.id)
                .map(|orders| amounts(orders))
                .unwrap_or_default();
            LifetimeValueRow {
                account_id: account.id,
                account_name: account.name.clone(),
                total_spent: amts.iter().sum(),
                total_orders: amts.len(),
                average_order_amount: average(&amts).unwrap_or(NO_ORDERS_AVERAGE),
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        desc(a.total_spent, b.total_spent).then_with(|| a.account_id.cmp(&b.account_id))
    });
    rows
}

/// Family 10: accounts with at least one order against the rest.
///
/// Always a single row, zeroes included, unless no region matched the filter.
pub fn customer_churn(scope: &Scope<'_>) -> Vec<ChurnRow> {
    if scope.is_empty() {
        return Vec::new();
    }
    let ordered: HashSet<i64> = scope.orders.iter().map(|o| o.account_id).collect();
    let active = scope
        .accounts
        .iter()
        .filter(|a| ordered.contains(&a.id))
        .count();
    vec![ChurnRow {
        active_customers: active,
        churned_customers: scope.accounts.len() - active,
    }]
}

/// Family 11: web event volume and reach per (region, channel).
pub fn web_event_effectiveness(scope: &Scope<'_>) -> Vec<WebEventReachRow> {
    let mut groups: HashMap<(&str, Channel), (usize, HashSet<i64>)> = HashMap::new();
    for event in &scope.web_events {
        let Some(region) = scope
            .account(event.account_id)
            .and_then(|a| scope.region_name_of_account(a))
        else {
            continue;
        };
        let entry = groups.entry((region, event.channel)).or_default();
        entry.0 += 1;
        entry.1.insert(event.account_id);
    }
    let mut rows: Vec<WebEventReachRow> = groups
        .into_iter()
        .map(|((region, channel), (events, accounts))| WebEventReachRow {
            region_name: region.to_string(),
            channel,
            total_events: events,
            unique_accounts_impacted: accounts.len(),
        })
        .collect();
    rows.sort_by(|a, b| {
        a.region_name
            .cmp(&b.region_name)
            .then_with(|| b.total_events.cmp(&a.total_events))
            .then_with(|| a.channel.cmp(&b.channel))
    });
    rows
}

/// Family 12: each rep's share of their region's order value, in percent
/// rounded to two decimals.
pub fn sales_contribution(scope: &Scope<'_>) -> Vec<SalesContributionRow> {
    let mut per_rep: BTreeMap<(&str, i64), (usize, f64)> = BTreeMap::new();
    for order in &scope.orders {
        let Some(account) = scope.account(order.account_id) else {
            continue;
        };
        let Some(region) = scope.region_name_of_account(account) else {
            continue;
        };
        let entry = per_rep
            .entry((region, account.sales_rep_id))
            .or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += order.total_amt_usd;
    }

    let mut region_totals: BTreeMap<&str, f64> = BTreeMap::new();
    for ((region, _), (_, total)) in &per_rep {
        *region_totals.entry(*region).or_insert(0.0) += total;
    }

    let mut rows: Vec<SalesContributionRow> = per_rep
        .iter()
        .filter_map(|((region, rep_id), (num_orders, total))| {
            let rep = scope.dataset.sales_rep(*rep_id)?;
            let region_total = region_totals.get(region).copied().unwrap_or(0.0);
            let share = if region_total == 0.0 {
                0.0
            } else {
                round_to(total / region_total * 100.0, 2)
            };
            Some(SalesContributionRow {
                region_name: region.to_string(),
                sales_rep: rep.name.clone(),
                num_orders: *num_orders,
                total_amt_usd: *total,
                region_total_amt_usd: region_total,
                contribution_percent: share,
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        a.region_name
            .cmp(&b.region_name)
            .then_with(|| desc(a.contribution_percent, b.contribution_percent))
            .then_with(|| a.sales_rep.cmp(&b.sales_rep))
    });
    rows
}

/// Family 13: month-by-month order statistics for the two boundary years.
pub fn monthly_boundary_trend(scope: &Scope<'_>, years: (i32, i32)) -> Vec<MonthlyTrendRow> {
    let mut by_month: BTreeMap<(i32, u32), Vec<f64>> = BTreeMap::new();
    for order in &scope.orders {
        let year = order.occurred_at.year();
        if year == years.0 || year == years.1 {
            by_month
                .entry((year, order.occurred_at.month()))
                .or_default()
                .push(order.total_amt_usd);
        }
    }
    by_month
        .into_iter()
        .map(|((year, month), amts)| MonthlyTrendRow {
            year,
            month,
            year_month: format!("{}-{:02}", year, month),
            total_usd: amts.iter().sum(),
            avg_order_amt: average(&amts).unwrap_or(0.0),
            total_orders: amts.len(),
            max_order_amt: amts.iter().copied().fold(f64::MIN, f64::max),
        })
        .collect()
}

/// Family 14: average standard, gloss and poster amounts per ordering account.
pub fn average_amounts_by_product(scope: &Scope<'_>) -> Vec<ProductMixRow> {
    let by_account = scope.orders_by_account();
    let mut rows: Vec<ProductMixRow> = scope
        .accounts
        .iter()
        .filter_map(|account| {
            let orders = by_account.get(&account.id)?;
            let column = |f: fn(&Order) -> f64| {
                average(&orders.iter().map(|o| f(o)).collect::<Vec<_>>())
            };
            Some(ProductMixRow {
                account_name: account.name.clone(),
                avg_standard_amt_usd: column(|o| o.standard_amt_usd)?,
                avg_gloss_amt_usd: column(|o| o.gloss_amt_usd)?,
                avg_poster_amt_usd: column(|o| o.poster_amt_usd)?,
            })
        })
        .collect();
    rows.sort_by(|a, b| a.account_name.cmp(&b.account_name));
    rows
}

/// Family 15: events and distinct accounts reached per channel.
pub fn channel_effectiveness(scope: &Scope<'_>) -> Vec<ChannelReachRow> {
    let mut groups: BTreeMap<Channel, (usize, HashSet<i64>)> = BTreeMap::new();
    for event in &scope.web_events {
        let entry = groups.entry(event.channel).or_default();
        entry.0 += 1;
        entry.1.insert(event.account_id);
    }
    let mut rows: Vec<ChannelReachRow> = groups
        .into_iter()
        .map(|(channel, (events, accounts))| ChannelReachRow {
            channel,
            total_events: events,
            unique_accounts: accounts.len(),
            total_customers: accounts.len(),
        })
        .collect();
    rows.sort_by(|a, b| b.total_events.cmp(&a.total_events));
    rows
}

/// Family 16: order value per calendar month across all years.
pub fn seasonal_trend(scope: &Scope<'_>) -> Vec<SeasonalRow> {
    let mut by_month: BTreeMap<u32, f64> = BTreeMap::new();
    for order in &scope.orders {
        *by_month.entry(order.occurred_at.month()).or_insert(0.0) += order.total_amt_usd;
    }
    by_month
        .into_iter()
        .map(|(month, total_sales)| SeasonalRow {
            month,
            month_name: month_name(month).to_string(),
            total_sales,
        })
        .collect()
}

/// Family 17: dense-rank accounts by order count and by spend, then tier them.
pub fn purchase_frequency_segments(scope: &Scope<'_>) -> Vec<PurchaseFrequencyRow> {
    let by_account = scope.orders_by_account();
    let stats: Vec<(&str, usize, f64)> = scope
        .accounts
        .iter()
        .map(|account| {
            let amts = by_account
                .get(&account.id)
                .map(|orders| amounts(orders))
                .unwrap_or_default();
            (account.name.as_str(), amts.len(), amts.iter().sum::<f64>())
        })
        .collect();

    let counts: Vec<f64> = stats.iter().map(|(_, n, _)| *n as f64).collect();
    let spends: Vec<f64> = stats.iter().map(|(_, _, s)| *s).collect();
    let order_ranks = dense_rank_desc(&counts);
    let spend_ranks = dense_rank_desc(&spends);

    let mut rows: Vec<PurchaseFrequencyRow> = stats
        .into_iter()
        .zip(order_ranks.into_iter().zip(spend_ranks))
        .map(
            |((name, total_orders, total_spend), (order_rank, spend_rank))| PurchaseFrequencyRow {
                account_name: name.to_string(),
                total_orders,
                total_spend,
                order_rank,
                spend_rank,
                order_activity: OrderActivity::from_rank(order_rank),
                spending_segment: SpendingSegment::from_rank(spend_rank),
            },
        )
        .collect();
    rows.sort_by(|a, b| {
        a.order_rank
            .cmp(&b.order_rank)
            .then_with(|| a.spend_rank.cmp(&b.spend_rank))
            .then_with(|| a.account_name.cmp(&b.account_name))
    });
    rows
}

/// Family 18: average account sales per (region, activity segment).
///
/// Accounts without orders land in Low Activity but contribute no sales; a
/// cell holding only such accounts averages to zero.
pub fn activity_sales_by_region(scope: &Scope<'_>) -> Vec<ActivitySalesRow> {
    let by_account = scope.orders_by_account();
    let mut cells: BTreeMap<(&str, ActivitySegment), Vec<f64>> = BTreeMap::new();
    for account in &scope.accounts {
        let Some(region) = scope.region_name_of_account(account) else {
            continue;
        };
        let orders = by_account.get(&account.id);
        let count = orders.map_or(0, Vec::len);
        let sales = cells
            .entry((region, ActivitySegment::classify(count)))
            .or_default();
        if let Some(orders) = orders {
            sales.push(amounts(orders).iter().sum());
        }
    }
    let mut rows: Vec<ActivitySalesRow> = cells
        .into_iter()
        .map(|((region, segment), sales)| ActivitySalesRow {
            region_name: region.to_string(),
            activity_segment: segment,
            avg_sales: average(&sales).unwrap_or(0.0),
        })
        .collect();
    rows.sort_by(|a, b| {
        a.region_name
            .cmp(&b.region_name)
            .then_with(|| desc(a.avg_sales, b.avg_sales))
            .then_with(|| a.activity_segment.cmp(&b.activity_segment))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(rep: &str, channel: Channel, occurrences: usize) -> RepChannelEventsRow {
        RepChannelEventsRow {
            region_name: "Northeast".into(),
            sales_rep: rep.into(),
            channel,
            occurrences,
        }
    }

    #[test]
    fn pivot_fills_missing_channels_with_zero() {
        let pivot = pivot_channels(&[
            events("Bob", Channel::Twitter, 4),
            events("Alice", Channel::Direct, 7),
            events("Alice", Channel::Banner, 1),
        ]);
        assert_eq!(pivot.len(), 2);
        assert_eq!(pivot[0].sales_rep, "Alice");
        assert_eq!((pivot[0].direct, pivot[0].banner, pivot[0].twitter), (7, 1, 0));
        assert_eq!((pivot[1].twitter, pivot[1].direct), (4, 0));
    }

    #[test]
    fn headline_rounds_the_regional_sum() {
        let rows = [
            RegionalSalesRow {
                region_name: "Northeast".into(),
                total_sales: 1000.4,
            },
            RegionalSalesRow {
                region_name: "West".into(),
                total_sales: 500.3,
            },
        ];
        assert_eq!(headline_total_sales(&rows), 1501.0);
        assert_eq!(headline_total_sales(&[]), 0.0);
    }

    #[test]
    fn yearly_extremes_pick_lowest_and_highest() {
        let rows = [
            YearlyTotalRow { year: 2017, total_usd: 10.0 },
            YearlyTotalRow { year: 2014, total_usd: 30.0 },
            YearlyTotalRow { year: 2015, total_usd: 20.0 },
        ];
        let (low, high) = yearly_extremes(&rows).unwrap();
        assert_eq!((low.year, high.year), (2017, 2014));
        assert!(yearly_extremes(&[]).is_none());
    }
}
