//! Purchase Cadence Predictor
//!
//! Forecasts when an item will be bought next from the gaps between past
//! purchases. Short histories fall back to a per-category default interval.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Local, NaiveDate};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::CadenceConfig;
use crate::models::{normalize_key, shift_days, Category, PurchaseEvent};
use crate::stats::{clamp_unit, coefficient_of_variation, mean, median};

use super::types::{PurchaseForecast, Urgency};

/// Predictor for the next purchase of an item
#[derive(Debug, Clone, Default)]
pub struct PurchaseCadencePredictor {
    config: CadenceConfig,
}

impl PurchaseCadencePredictor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CadenceConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &CadenceConfig {
        &self.config
    }

    /// Forecast as of the local date
    pub fn predict_next_purchase(
        &self,
        item_name: &str,
        category: Category,
        history: &[PurchaseEvent],
    ) -> PurchaseForecast {
        let today = Local::now().date_naive();
        self.predict_next_purchase_at(item_name, category, history, today)
    }

    /// Forecast as of `today`.
    ///
    /// Only events for `item_name` are used, and several purchases on the
    /// same day count once.
    pub fn predict_next_purchase_at(
        &self,
        item_name: &str,
        category: Category,
        history: &[PurchaseEvent],
        today: NaiveDate,
    ) -> PurchaseForecast {
        let matching: Vec<&PurchaseEvent> = history.iter().filter(|e| e.is_for(item_name)).collect();

        let days: Vec<NaiveDate> = matching
            .iter()
            .map(|e| e.date())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let quantities: Vec<f64> = matching
            .iter()
            .map(|e| e.quantity)
            .filter(|q| q.is_finite() && *q > 0.0)
            .collect();
        let typical_quantity = if quantities.is_empty() {
            None
        } else {
            Some(median(&quantities))
        };

        let (last_purchase, predicted_date, mean_interval_days, seasonal_factor, confidence) =
            match days.as_slice() {
                [] | [_] => {
                    let interval = self.config.interval_for(category);
                    let last = days.first().copied();
                    let (anchor, confidence) = match last {
                        Some(day) => (day, self.config.single_purchase_confidence),
                        None => (today, self.config.no_history_confidence),
                    };
                    debug!(
                        item = item_name,
                        category = category.as_str(),
                        interval_days = interval,
                        points = days.len(),
                        "Using default purchase interval"
                    );
                    (
                        last,
                        shift_days(anchor, interval as i64),
                        interval as f64,
                        1.0,
                        confidence,
                    )
                }
                [.., last] => {
                    let intervals: Vec<f64> = days
                        .windows(2)
                        .map(|pair| (pair[1] - pair[0]).num_days() as f64)
                        .collect();
                    let mean_interval = mean(&intervals);
                    let seasonal = self.config.seasonal_factors[last.month0() as usize];
                    let offset = (mean_interval * seasonal).round().max(1.0) as i64;

                    let confidence = match coefficient_of_variation(&intervals) {
                        Some(cv) => clamp_unit(1.0 - cv).max(self.config.min_confidence),
                        None => self.config.min_confidence,
                    };

                    (
                        Some(*last),
                        shift_days(*last, offset),
                        mean_interval,
                        seasonal,
                        confidence,
                    )
                }
            };

        let days_until = (predicted_date - today).num_days();

        PurchaseForecast {
            item_name: item_name.trim().to_string(),
            category,
            last_purchase,
            predicted_date,
            mean_interval_days,
            seasonal_factor,
            confidence,
            urgency: Urgency::from_days_until(days_until),
            days_until,
            sample_count: days.len(),
            typical_quantity,
        }
    }

    /// Forecast every item in a history snapshot, most urgent first
    pub fn restock_forecasts(
        &self,
        history: &[PurchaseEvent],
        today: NaiveDate,
    ) -> Vec<PurchaseForecast> {
        // normalized name -> (display name, category)
        let mut items: BTreeMap<String, (String, Option<Category>)> = BTreeMap::new();
        for event in history {
            let key = normalize_key(&event.item_name);
            if key.is_empty() {
                continue;
            }
            let entry = items
                .entry(key)
                .or_insert_with(|| (event.item_name.trim().to_string(), None));
            if entry.1.is_none() {
                entry.1 = event.category;
            }
        }

        let entries: Vec<(String, Option<Category>)> = items.into_values().collect();
        let mut forecasts: Vec<PurchaseForecast> = entries
            .par_iter()
            .map(|(name, category)| {
                self.predict_next_purchase_at(
                    name,
                    category.unwrap_or(Category::Other),
                    history,
                    today,
                )
            })
            .collect();

        forecasts.sort_by(|a, b| {
            b.urgency
                .priority()
                .cmp(&a.urgency.priority())
                .then_with(|| a.predicted_date.cmp(&b.predicted_date))
                .then_with(|| a.item_name.cmp(&b.item_name))
        });

        info!(items = forecasts.len(), "Restock forecasts computed");
        forecasts
    }
}
