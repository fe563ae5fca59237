use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

use crate::util::{display_opt_usd, display_opt_year, display_percent, display_usd};

// Raw CSV rows. Extra columns in the files are ignored by serde.

#[derive(Debug, Deserialize)]
pub struct RawRegion {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RawSalesRep {
    pub id: i64,
    pub name: String,
    pub region_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct RawAccount {
    pub id: i64,
    pub name: String,
    pub sales_rep_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct RawOrder {
    pub id: i64,
    pub account_id: i64,
    pub occurred_at: String,
    pub standard_qty: i64,
    pub poster_qty: i64,
    pub total: i64,
    pub standard_amt_usd: f64,
    pub gloss_amt_usd: f64,
    pub poster_amt_usd: f64,
    pub total_amt_usd: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawWebEvent {
    pub id: i64,
    pub account_id: i64,
    pub occurred_at: String,
    pub channel: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesRep {
    pub id: i64,
    pub name: String,
    pub region_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub sales_rep_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub account_id: i64,
    pub occurred_at: NaiveDateTime,
    pub standard_qty: i64,
    pub poster_qty: i64,
    /// Units across all paper types.
    pub total: i64,
    pub standard_amt_usd: f64,
    pub gloss_amt_usd: f64,
    pub poster_amt_usd: f64,
    pub total_amt_usd: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebEvent {
    pub id: i64,
    pub account_id: i64,
    pub occurred_at: NaiveDateTime,
    pub channel: Channel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Direct,
    Facebook,
    Organic,
    Adwords,
    Twitter,
    Banner,
}

impl Channel {
    pub const ALL: [Channel; 6] = [
        Channel::Direct,
        Channel::Facebook,
        Channel::Organic,
        Channel::Adwords,
        Channel::Twitter,
        Channel::Banner,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Direct => "direct",
            Channel::Facebook => "facebook",
            Channel::Organic => "organic",
            Channel::Adwords => "adwords",
            Channel::Twitter => "twitter",
            Channel::Banner => "banner",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Channel::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| s.to_string())
    }
}

// Segments. The boundary values (50, 10, 1000, 20) are exact.

macro_rules! labelled_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

labelled_enum!(VolumeSegment {
    High => "High Volume",
    Moderate => "Moderate Volume",
    Low => "Low Volume",
});

labelled_enum!(ValueSegment {
    High => "High Value",
    Low => "Low Value",
});

labelled_enum!(OrderActivity {
    Highly => "Highly Active",
    Moderately => "Moderately Active",
    Less => "Less Active",
});

labelled_enum!(SpendingSegment {
    High => "High Spender",
    Moderate => "Moderate Spender",
    Low => "Low Spender",
});

labelled_enum!(ActivitySegment {
    High => "High Activity",
    Medium => "Medium Activity",
    Low => "Low Activity",
});

impl VolumeSegment {
    /// More than 50 orders is high, 11 to 50 moderate, 10 or fewer low.
    pub fn classify(order_count: usize) -> Self {
        if order_count > 50 {
            VolumeSegment::High
        } else if order_count > 10 {
            VolumeSegment::Moderate
        } else {
            VolumeSegment::Low
        }
    }
}

impl ValueSegment {
    pub fn classify(avg_order_amt_usd: f64) -> Self {
        if avg_order_amt_usd > 1000.0 {
            ValueSegment::High
        } else {
            ValueSegment::Low
        }
    }
}

impl OrderActivity {
    pub fn from_rank(rank: usize) -> Self {
        match rank {
            0..=3 => OrderActivity::Highly,
            4..=10 => OrderActivity::Moderately,
            _ => OrderActivity::Less,
        }
    }
}

impl SpendingSegment {
    pub fn from_rank(rank: usize) -> Self {
        match rank {
            0..=3 => SpendingSegment::High,
            4..=10 => SpendingSegment::Moderate,
            _ => SpendingSegment::Low,
        }
    }
}

impl ActivitySegment {
    /// More than 20 orders is high, 10 to 20 inclusive medium, under 10 low.
    pub fn classify(order_count: usize) -> Self {
        match order_count {
            c if c > 20 => ActivitySegment::High,
            10..=20 => ActivitySegment::Medium,
            _ => ActivitySegment::Low,
        }
    }
}

// Result rows, one type per aggregation family.

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct RegionalSalesRow {
    pub region_name: String,
    #[tabled(display_with = "display_usd")]
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct RepAccountsRow {
    pub region_name: String,
    pub sales_rep: String,
    pub account_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct RepChannelEventsRow {
    pub region_name: String,
    pub sales_rep: String,
    pub channel: Channel,
    pub occurrences: usize,
}

/// One row per rep with a column per channel; absent combinations are zero.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct ChannelPivotRow {
    pub region_name: String,
    pub sales_rep: String,
    pub direct: usize,
    pub facebook: usize,
    pub organic: usize,
    pub adwords: usize,
    pub twitter: usize,
    pub banner: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct AcquisitionRow {
    pub region_name: String,
    pub sales_rep: String,
    pub new_customers_acquired: usize,
    #[tabled(display_with = "display_opt_year")]
    pub first_order_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct AverageOrderSizeRow {
    pub region_name: String,
    #[tabled(display_with = "display_usd")]
    pub avg_order_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct SegmentCellRow {
    pub volume_segment: VolumeSegment,
    pub value_segment: ValueSegment,
    pub num_accounts: usize,
    #[tabled(display_with = "display_usd")]
    pub avg_order_size: f64,
    #[tabled(display_with = "display_opt_usd")]
    pub avg_order_std_dev: Option<f64>,
    #[tabled(display_with = "display_usd")]
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct UnitPriceRow {
    pub region_name: String,
    pub account_name: String,
    pub order_id: i64,
    #[tabled(display_with = "display_usd")]
    pub unit_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct YearlyTotalRow {
    pub year: i32,
    #[tabled(display_with = "display_usd")]
    pub total_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct LifetimeValueRow {
    pub account_id: i64,
    pub account_name: String,
    #[tabled(display_with = "display_usd")]
    pub total_spent: f64,
    pub total_orders: usize,
    #[tabled(display_with = "display_usd")]
    pub average_order_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct ChurnRow {
    pub active_customers: usize,
    pub churned_customers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct WebEventReachRow {
    pub region_name: String,
    pub channel: Channel,
    pub total_events: usize,
    pub unique_accounts_impacted: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct SalesContributionRow {
    pub region_name: String,
    pub sales_rep: String,
    pub num_orders: usize,
    #[tabled(display_with = "display_usd")]
    pub total_amt_usd: f64,
    #[tabled(display_with = "display_usd")]
    pub region_total_amt_usd: f64,
    #[tabled(display_with = "display_percent")]
    pub contribution_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct MonthlyTrendRow {
    pub year: i32,
    pub month: u32,
    pub year_month: String,
    #[tabled(display_with = "display_usd")]
    pub total_usd: f64,
    #[tabled(display_with = "display_usd")]
    pub avg_order_amt: f64,
    pub total_orders: usize,
    #[tabled(display_with = "display_usd")]
    pub max_order_amt: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct ProductMixRow {
    pub account_name: String,
    #[tabled(display_with = "display_usd")]
    pub avg_standard_amt_usd: f64,
    #[tabled(display_with = "display_usd")]
    pub avg_gloss_amt_usd: f64,
    #[tabled(display_with = "display_usd")]
    pub avg_poster_amt_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct ChannelReachRow {
    pub channel: Channel,
    pub total_events: usize,
    pub unique_accounts: usize,
    pub total_customers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct SeasonalRow {
    pub month: u32,
    pub month_name: String,
    #[tabled(display_with = "display_usd")]
    pub total_sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct PurchaseFrequencyRow {
    pub account_name: String,
    pub total_orders: usize,
    #[tabled(display_with = "display_usd")]
    pub total_spend: f64,
    pub order_rank: usize,
    pub spend_rank: usize,
    pub order_activity: OrderActivity,
    pub spending_segment: SpendingSegment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
#[serde(rename_all = "PascalCase")]
#[tabled(rename_all = "PascalCase")]
pub struct ActivitySalesRow {
    pub region_name: String,
    pub activity_segment: ActivitySegment,
    #[tabled(display_with = "display_usd")]
    pub avg_sales: f64,
}
