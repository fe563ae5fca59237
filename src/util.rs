// Statistics, timestamp parsing and number formatting shared by the loader,
// the aggregation families and the console renderer.
//
// The statistics follow SQL aggregate semantics: an aggregate over no values
// is `None` (SQL NULL), and callers decide which default to substitute.
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};
use std::cmp::Ordering;

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%SZ",
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Parse an order/web event timestamp.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, the ISO-8601 `T` form with optional
/// fractional seconds and a trailing `Z`, and a bare `YYYY-MM-DD` (midnight).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// English name for a calendar month (1-12).
pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_NAMES[(month - 1) as usize],
        _ => "Unknown",
    }
}

pub fn average(v: &[f64]) -> Option<f64> {
    if v.is_empty() {
        return None;
    }
    Some(v.iter().sum::<f64>() / v.len() as f64)
}

/// Sample standard deviation (n - 1 denominator), `None` below two values.
pub fn sample_std_dev(v: &[f64]) -> Option<f64> {
    if v.len() < 2 {
        return None;
    }
    let mean = average(v)?;
    let var = v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (v.len() - 1) as f64;
    Some(var.sqrt())
}

/// Dense rank of every value in descending order, aligned with the input.
///
/// Tied values share a rank and the next distinct value takes the following
/// rank: `[9, 7, 7, 5]` ranks as `[1, 2, 2, 3]`.
pub fn dense_rank_desc(values: &[f64]) -> Vec<usize> {
    let mut distinct: Vec<f64> = values.to_vec();
    distinct.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    distinct.dedup();
    values
        .iter()
        .map(|v| distinct.partition_point(|d| d > v) + 1)
        .collect()
}

pub fn round_to(n: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (n * factor).round() / factor
}

/// Descending comparison for floats; NaN compares equal.
pub fn desc(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Fixed decimals with `en` thousands separators, e.g. `1,234,567.89`.
pub fn format_number(n: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let grouped = int_part
        .parse::<u64>()
        .map(|v| v.to_formatted_string(&Locale::en))
        .unwrap_or_else(|_| int_part.to_string());
    let sign = if n.is_sign_negative() && n != 0.0 { "-" } else { "" };
    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, grouped, frac),
        None => format!("{}{}", sign, grouped),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

// `display_with` adapters for the `Tabled` result rows.

pub fn display_usd(v: &f64) -> String {
    format!("${}", format_number(*v, 2))
}

pub fn display_opt_usd(v: &Option<f64>) -> String {
    v.map(|x| display_usd(&x)).unwrap_or_else(|| "-".to_string())
}

pub fn display_opt_year(v: &Option<i32>) -> String {
    v.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn display_percent(v: &f64) -> String {
    format!("{:.2}%", v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_timestamp_shapes() {
        let expected = NaiveDate::from_ymd_opt(2015, 10, 6)
            .unwrap()
            .and_hms_opt(17, 31, 14)
            .unwrap();
        assert_eq!(parse_timestamp("2015-10-06 17:31:14"), Some(expected));
        assert_eq!(parse_timestamp("2015-10-06T17:31:14"), Some(expected));
        assert_eq!(parse_timestamp("2015-10-06T17:31:14.000Z"), Some(expected));
        assert_eq!(
            parse_timestamp("2015-10-06"),
            NaiveDate::from_ymd_opt(2015, 10, 6).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("06/10/2015"), None);
        assert_eq!(parse_timestamp("  "), None);
    }

    #[test]
    fn average_and_std_dev_follow_sql_nulls() {
        assert_eq!(average(&[]), None);
        assert_eq!(average(&[2.0, 4.0]), Some(3.0));
        assert_eq!(sample_std_dev(&[5.0]), None);
        let sd = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((sd - 2.138_089_935).abs() < 1e-6);
    }

    #[test]
    fn dense_rank_shares_ranks_on_ties() {
        assert_eq!(dense_rank_desc(&[9.0, 7.0, 7.0, 5.0]), vec![1, 2, 2, 3]);
        assert_eq!(dense_rank_desc(&[1.0, 3.0, 3.0, 3.0, 2.0]), vec![3, 1, 1, 1, 2]);
        assert!(dense_rank_desc(&[]).is_empty());
    }

    #[test]
    fn formats_numbers_with_separators() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1500.0, 0), "-1,500");
        assert_eq!(format_number(0.5, 2), "0.50");
        assert_eq!(format_int(9855u64), "9,855");
        assert_eq!(display_usd(&3000.0), "$3,000.00");
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round_to(33.33333, 2), 33.33);
        assert_eq!(round_to(66.666, 2), 66.67);
    }

    #[test]
    fn month_names_cover_the_calendar() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(13), "Unknown");
    }
}
