//! Discounting of annual cash flows into present values.
//!
//! Every sum is evaluated by the same left-to-right loop, so identical inputs
//! give bit-identical outputs regardless of horizon set or call order.

use std::collections::BTreeMap;

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Present value keyed by horizon in years.
pub type HorizonValues = BTreeMap<u32, f64>;

/// `Σ_{t=1..n} cf / (1 + r)^t`. `r == 0` is exactly `cf × n`.
pub fn present_value(annual_cash_flow: f64, rate: f64, years: u32) -> f64 {
    if years == 0 {
        return 0.0;
    }
    if rate == 0.0 {
        return annual_cash_flow * years as f64;
    }
    let growth = 1.0 + rate;
    let mut factor = 1.0;
    let mut pv = 0.0;
    for _ in 0..years {
        factor *= growth;
        pv += annual_cash_flow / factor;
    }
    pv
}

/// Present value of a flow that varies by year; `flows[0]` lands in year 1.
pub fn present_value_series(flows: &[f64], rate: f64) -> f64 {
    if rate == 0.0 {
        return flows.iter().sum();
    }
    let growth = 1.0 + rate;
    let mut factor = 1.0;
    let mut pv = 0.0;
    for &cf in flows {
        factor *= growth;
        pv += cf / factor;
    }
    pv
}

/// Present value of a single amount received in `year` (year 0 is today).
pub fn discount_lump_sum(amount: f64, rate: f64, year: u32) -> f64 {
    if rate == 0.0 || year == 0 {
        return amount;
    }
    let mut factor = 1.0;
    for _ in 0..year {
        factor *= 1.0 + rate;
    }
    amount / factor
}

pub fn npv_by_horizon(annual_cash_flow: f64, rate: f64, horizons: &[u32]) -> HorizonValues {
    horizons
        .iter()
        .map(|&h| (h, present_value(annual_cash_flow, rate, h)))
        .collect()
}

/// One year of a discount schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct ScheduleRow {
    pub year: u32,
    pub undiscounted: f64,
    pub discounted: f64,
    pub cumulative_undiscounted: f64,
    pub cumulative_npv: f64,
}

/// Year-by-year breakdown of [`present_value`]. The last row's
/// `cumulative_npv` equals `present_value(cf, r, n)` bit for bit.
pub fn discount_schedule(annual_cash_flow: f64, rate: f64, years: u32) -> Vec<ScheduleRow> {
    let mut rows = Vec::with_capacity(years as usize);
    let mut factor = 1.0;
    let mut cumulative_undiscounted = 0.0;
    let mut cumulative_npv = 0.0;
    for year in 1..=years {
        let discounted = if rate == 0.0 {
            annual_cash_flow
        } else {
            factor *= 1.0 + rate;
            annual_cash_flow / factor
        };
        cumulative_undiscounted += annual_cash_flow;
        cumulative_npv += discounted;
        rows.push(ScheduleRow {
            year,
            undiscounted: annual_cash_flow,
            discounted,
            cumulative_undiscounted,
            cumulative_npv,
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rate_is_cash_flow_times_years() {
        for cf in [0.0, 1.0, 123_456.789, -42.5] {
            for n in [0, 1, 10, 25, 30] {
                assert_eq!(present_value(cf, 0.0, n), cf * n as f64);
            }
        }
    }

    #[test]
    fn test_zero_years_is_zero() {
        assert_eq!(present_value(1_000.0, 0.06, 0), 0.0);
    }

    #[test]
    fn test_matches_annuity_formula() {
        let cf = 100_000.0;
        let r: f64 = 0.06;
        let n = 30;
        let annuity = cf * (1.0 - (1.0 + r).powi(-(n as i32))) / r;
        let pv = present_value(cf, r, n);
        assert!(
            (pv - annuity).abs() / annuity < 1e-12,
            "loop {pv} vs closed form {annuity}"
        );
    }

    #[test]
    fn test_one_year_is_single_discount() {
        let pv = present_value(1_060.0, 0.06, 1);
        assert!((pv - 1_000.0).abs() < 1e-9, "got {pv}");
    }

    #[test]
    fn test_bit_stable_across_calls() {
        let a = npv_by_horizon(98_765.4321, 0.09, &[1, 10, 25, 30]);
        let b = npv_by_horizon(98_765.4321, 0.09, &[30, 25, 10, 1]);
        for (h, v) in &a {
            assert_eq!(v.to_bits(), b[h].to_bits(), "horizon {h} drifted");
        }
    }

    #[test]
    fn test_longer_horizon_worth_more_for_positive_flow() {
        let values = npv_by_horizon(1_000.0, 0.06, &[1, 10, 25, 30]);
        let ordered: Vec<f64> = values.values().copied().collect();
        assert!(ordered.windows(2).all(|w| w[0] < w[1]), "{ordered:?}");
    }

    #[test]
    fn test_series_matches_constant_flow() {
        let flows = vec![500.0; 12];
        let a = present_value_series(&flows, 0.07);
        let b = present_value(500.0, 0.07, 12);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_lump_sum() {
        assert_eq!(discount_lump_sum(1_000.0, 0.09, 0), 1_000.0);
        let pv = discount_lump_sum(1_188.1, 0.09, 2);
        assert!((pv - 1_000.0).abs() < 0.01, "got {pv}");
    }

    #[test]
    fn test_schedule_ends_at_present_value() {
        let rows = discount_schedule(2_500.0, 0.06, 30);
        assert_eq!(rows.len(), 30);
        let last = rows.last().unwrap();
        assert_eq!(last.year, 30);
        assert_eq!(
            last.cumulative_npv.to_bits(),
            present_value(2_500.0, 0.06, 30).to_bits()
        );
        assert_eq!(last.cumulative_undiscounted, 75_000.0);
    }
}
