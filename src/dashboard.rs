//! One dashboard refresh: every aggregation family computed for a single
//! filter value.

use serde::Serialize;
use tracing::{debug, info};

use crate::dataset::Dataset;
use crate::filter::RegionFilter;
use crate::reports;
use crate::types::{
    AcquisitionRow, ActivitySalesRow, AverageOrderSizeRow, ChannelPivotRow, ChannelReachRow,
    ChurnRow, LifetimeValueRow, MonthlyTrendRow, ProductMixRow, PurchaseFrequencyRow,
    RegionalSalesRow, RepAccountsRow, RepChannelEventsRow, SalesContributionRow, SeasonalRow,
    SegmentCellRow, UnitPriceRow, WebEventReachRow, YearlyTotalRow,
};

/// Which two years the monthly trend compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryYears {
    /// First and last order year of the whole loaded dataset.
    #[default]
    Derived,
    Explicit(i32, i32),
}

impl BoundaryYears {
    /// Resolved against the full dataset, never the filtered scope, so the
    /// region filter cannot move the boundaries.
    pub fn resolve(self, dataset: &Dataset) -> Option<(i32, i32)> {
        match self {
            BoundaryYears::Derived => dataset.order_year_range(),
            BoundaryYears::Explicit(a, b) => Some((a.min(b), a.max(b))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DashboardConfig {
    pub boundary_years: BoundaryYears,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub region: String,
    pub total_sales: f64,
    pub boundary_years: Option<(i32, i32)>,
    pub accounts_in_scope: usize,
    pub orders_in_scope: usize,
    pub web_events_in_scope: usize,
    pub regional_sales: Vec<RegionalSalesRow>,
    pub accounts_per_rep: Vec<RepAccountsRow>,
    pub rep_channel_events: Vec<RepChannelEventsRow>,
    pub rep_channel_pivot: Vec<ChannelPivotRow>,
    pub acquisition: Vec<AcquisitionRow>,
    pub average_order_size: Vec<AverageOrderSizeRow>,
    pub segmentation: Vec<SegmentCellRow>,
    pub unit_prices: Vec<UnitPriceRow>,
    pub yearly_totals: Vec<YearlyTotalRow>,
    pub lifetime_value: Vec<LifetimeValueRow>,
    pub churn: Vec<ChurnRow>,
    pub web_event_reach: Vec<WebEventReachRow>,
    pub sales_contribution: Vec<SalesContributionRow>,
    pub monthly_trend: Vec<MonthlyTrendRow>,
    pub product_mix: Vec<ProductMixRow>,
    pub channel_reach: Vec<ChannelReachRow>,
    pub seasonal: Vec<SeasonalRow>,
    pub purchase_frequency: Vec<PurchaseFrequencyRow>,
    pub activity_sales: Vec<ActivitySalesRow>,
}

/// Headline numbers written to `summary.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub region: String,
    pub total_sales: f64,
    pub accounts_in_scope: usize,
    pub orders_in_scope: usize,
    pub web_events_in_scope: usize,
    pub active_customers: usize,
    pub churned_customers: usize,
    pub boundary_years: Option<(i32, i32)>,
}

impl DashboardSnapshot {
    pub fn summary(&self) -> DashboardSummary {
        let (active, churned) = self
            .churn
            .first()
            .map(|c| (c.active_customers, c.churned_customers))
            .unwrap_or((0, 0));
        DashboardSummary {
            region: self.region.clone(),
            total_sales: self.total_sales,
            accounts_in_scope: self.accounts_in_scope,
            orders_in_scope: self.orders_in_scope,
            web_events_in_scope: self.web_events_in_scope,
            active_customers: active,
            churned_customers: churned,
            boundary_years: self.boundary_years,
        }
    }
}

pub struct Dashboard<'a> {
    dataset: &'a Dataset,
    config: DashboardConfig,
}

impl<'a> Dashboard<'a> {
    pub fn new(dataset: &'a Dataset, config: DashboardConfig) -> Self {
        Self { dataset, config }
    }

    /// Run every family against one scope.
    ///
    /// All results in the snapshot come from the same filter value; nothing
    /// is carried over from a previous build.
    pub fn build(&self, filter: &RegionFilter) -> DashboardSnapshot {
        let scope = self.dataset.scope(filter);
        if scope.is_empty() {
            info!(region = %filter, "Region filter matches no rows");
        }
        debug!(
            region = %filter,
            accounts = scope.accounts.len(),
            orders = scope.orders.len(),
            "Building dashboard"
        );

        let boundary_years = self.config.boundary_years.resolve(self.dataset);
        let regional_sales = reports::regional_total_sales(&scope);
        let rep_channel_events = reports::web_events_by_rep_channel(&scope);

        DashboardSnapshot {
            region: filter.label().to_string(),
            total_sales: reports::headline_total_sales(&regional_sales),
            boundary_years,
            accounts_in_scope: scope.accounts.len(),
            orders_in_scope: scope.orders.len(),
            web_events_in_scope: scope.web_events.len(),
            rep_channel_pivot: reports::pivot_channels(&rep_channel_events),
            regional_sales,
            accounts_per_rep: reports::accounts_per_rep(&scope),
            rep_channel_events,
            acquisition: reports::customer_acquisition(&scope),
            average_order_size: reports::average_order_size_by_region(&scope),
            segmentation: reports::customer_segmentation(&scope),
            unit_prices: reports::unit_price_outliers(&scope),
            yearly_totals: reports::yearly_order_totals(&scope),
            lifetime_value: reports::customer_lifetime_value(&scope),
            churn: reports::customer_churn(&scope),
            web_event_reach: reports::web_event_effectiveness(&scope),
            sales_contribution: reports::sales_contribution(&scope),
            monthly_trend: boundary_years
                .map(|years| reports::monthly_boundary_trend(&scope, years))
                .unwrap_or_default(),
            product_mix: reports::average_amounts_by_product(&scope),
            channel_reach: reports::channel_effectiveness(&scope),
            seasonal: reports::seasonal_trend(&scope),
            purchase_frequency: reports::purchase_frequency_segments(&scope),
            activity_sales: reports::activity_sales_by_region(&scope),
        }
    }
}
