//! Price Trend Analyzer
//!
//! Compares a current price against an item's price history:
//! - Summary statistics (average, median, min, max)
//! - Price score and good-deal flag
//! - Trend from the first third of observations to the last third
//! - Cheapest day of the week to buy

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Weekday};
use tracing::debug;

use crate::config::PricingConfig;
use crate::error::{Error, Result};
use crate::models::PriceObservation;
use crate::stats::{clamp_unit, mean, median};

use super::types::{BestTimePrediction, PriceAnalysis, PriceTrend};

/// Analyzer for one item's price history
#[derive(Debug, Clone, Default)]
pub struct PriceTrendAnalyzer {
    config: PricingConfig,
}

impl PriceTrendAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Analyze `current_price` against the item's history.
    ///
    /// Observations for other items are ignored. Returns
    /// `Error::InsufficientHistory` when nothing usable remains.
    pub fn analyze_price(
        &self,
        item_name: &str,
        current_price: f64,
        history: &[PriceObservation],
    ) -> Result<PriceAnalysis> {
        let observations = item_history(item_name, history)?;
        let prices: Vec<f64> = observations.iter().map(|o| o.price).collect();

        let average_price = mean(&prices);
        let median_price = median(&prices);
        let min_price = prices.iter().copied().fold(f64::INFINITY, f64::min);
        let max_price = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let price_score = if max_price > min_price {
            clamp_unit(1.0 - (current_price - min_price) / (max_price - min_price))
        } else {
            1.0
        };

        let is_good_deal = current_price <= average_price * self.config.good_deal_ratio;
        let trend = self.classify_trend(&prices);
        let percent_vs_average = if average_price > 0.0 {
            (current_price - average_price) / average_price * 100.0
        } else {
            0.0
        };
        let best_store = cheapest_store(&observations);

        let note = if is_good_deal {
            format!("Good deal: {:.0}% below average", -percent_vs_average)
        } else if max_price > min_price && current_price >= max_price * self.config.near_high_ratio {
            "Near the highest price seen; consider waiting".to_string()
        } else {
            match trend {
                PriceTrend::Increasing => "Prices have been rising".to_string(),
                PriceTrend::Decreasing => "Prices have been falling; it may drop further".to_string(),
                PriceTrend::Stable => "Typical price".to_string(),
            }
        };

        debug!(
            item = item_name,
            samples = prices.len(),
            average = average_price,
            trend = trend.as_str(),
            is_good_deal,
            "Price analysis complete"
        );

        Ok(PriceAnalysis {
            item_name: item_name.trim().to_string(),
            current_price,
            average_price,
            median_price,
            min_price,
            max_price,
            sample_count: prices.len(),
            trend,
            price_score,
            is_good_deal,
            percent_vs_average,
            best_store,
            note,
        })
    }

    /// Find the day of the week with the lowest mean price
    pub fn best_time_to_buy(
        &self,
        item_name: &str,
        history: &[PriceObservation],
    ) -> Result<BestTimePrediction> {
        let observations = item_history(item_name, history)?;
        let prices: Vec<f64> = observations.iter().map(|o| o.price).collect();
        let current_average = mean(&prices);

        let mut buckets: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for obs in &observations {
            buckets
                .entry(obs.timestamp.weekday().num_days_from_monday())
                .or_default()
                .push(obs.price);
        }

        // BTreeMap iteration is Monday-first, so ties go to the earlier weekday
        let mut best: Option<(u32, f64, usize)> = None;
        for (day, bucket) in &buckets {
            let bucket_mean = mean(bucket);
            match best {
                Some((_, best_mean, _)) if best_mean <= bucket_mean => {}
                _ => best = Some((*day, bucket_mean, bucket.len())),
            }
        }
        let (day, best_day_average, best_samples) = best.ok_or_else(|| {
            Error::InsufficientHistory(format!("No price history for {}", item_name.trim()))
        })?;

        let full = self.config.full_confidence_samples.max(1) as f64;
        let confidence = clamp_unit(best_samples as f64 / full);

        Ok(BestTimePrediction {
            item_name: item_name.trim().to_string(),
            best_day_of_week: weekday_from_index(day),
            best_day_average,
            current_average,
            estimated_savings: (current_average - best_day_average).max(0.0),
            confidence,
            sample_count: prices.len(),
        })
    }

    /// Compare the mean of the most recent third to the earliest third
    fn classify_trend(&self, chronological_prices: &[f64]) -> PriceTrend {
        let third = chronological_prices.len() / 3;
        if third == 0 {
            return PriceTrend::Stable;
        }

        let early = mean(&chronological_prices[..third]);
        let recent = mean(&chronological_prices[chronological_prices.len() - third..]);
        if early <= 0.0 {
            return PriceTrend::Stable;
        }

        let change = (recent - early) / early;
        if change > self.config.trend_threshold {
            PriceTrend::Increasing
        } else if change < -self.config.trend_threshold {
            PriceTrend::Decreasing
        } else {
            PriceTrend::Stable
        }
    }
}

/// Usable observations for an item, oldest first
fn item_history<'a>(
    item_name: &str,
    history: &'a [PriceObservation],
) -> Result<Vec<&'a PriceObservation>> {
    let mut observations: Vec<&PriceObservation> = history
        .iter()
        .filter(|o| o.is_for(item_name) && o.price.is_finite() && o.price > 0.0)
        .collect();

    if observations.is_empty() {
        return Err(Error::InsufficientHistory(format!(
            "No price history for {}",
            item_name.trim()
        )));
    }

    observations.sort_by_key(|o| o.timestamp);
    Ok(observations)
}

fn cheapest_store(observations: &[&PriceObservation]) -> Option<String> {
    let mut by_store: HashMap<&str, Vec<f64>> = HashMap::new();
    for obs in observations {
        if let Some(store) = obs.store.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            by_store.entry(store).or_default().push(obs.price);
        }
    }

    by_store
        .into_iter()
        .map(|(store, prices)| (store, mean(&prices)))
        .min_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(store, _)| store.to_string())
}

fn weekday_from_index(index: u32) -> Weekday {
    match index {
        0 => Weekday::Mon,
        1 => Weekday::Tue,
        2 => Weekday::Wed,
        3 => Weekday::Thu,
        4 => Weekday::Fri,
        5 => Weekday::Sat,
        _ => Weekday::Sun,
    }
}
