//! Expiration Forecaster
//!
//! Predicts when a purchased item goes off from its baseline shelf life,
//! where it is stored and how it is packaged, and tracks whether it was
//! eventually consumed or wasted.

use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::config::ExpirationConfig;
use crate::error::{Error, Result};
use crate::models::{shift_days, Category, PackageType, StorageLocation};
use crate::shelf_life::ShelfLifeTable;

use super::types::{ExpirationAlert, ExpirationForecast, ExpirationStatus, WasteSummary};

const DEFAULT_USE_SOON_DAYS: i64 = 2;
const DEFAULT_MODERATE_DAYS: i64 = 5;

/// Predictor for item expiration dates
#[derive(Debug, Clone)]
pub struct ExpirationForecaster {
    table: ShelfLifeTable,
    use_soon_days: i64,
    moderate_days: i64,
}

impl Default for ExpirationForecaster {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpirationForecaster {
    pub fn new() -> Self {
        Self::from_config(&ExpirationConfig::default())
    }

    pub fn from_config(config: &ExpirationConfig) -> Self {
        Self {
            table: ShelfLifeTable::from_config(config),
            use_soon_days: config.use_soon_days,
            moderate_days: config.moderate_days,
        }
    }

    pub fn table(&self) -> &ShelfLifeTable {
        &self.table
    }

    /// Shelf life in whole days after storage and packaging adjustments
    pub fn adjusted_shelf_life(
        &self,
        item_name: &str,
        category: Option<Category>,
        storage: StorageLocation,
        package: PackageType,
    ) -> u32 {
        let base = self.table.lookup(item_name, category);
        let stored = base.days as f64 * storage.multiplier();
        let adjusted = package.adjust(stored).round().max(1.0);

        debug!(
            item = item_name,
            base_days = base.days,
            source = ?base.source,
            storage = storage.as_str(),
            package = package.as_str(),
            adjusted_days = adjusted,
            "Computed shelf life"
        );

        adjusted as u32
    }

    /// Predict expiration with status as of the local date
    pub fn predict_expiration(
        &self,
        item_name: &str,
        category: Option<Category>,
        purchase_date: NaiveDate,
        storage: StorageLocation,
        package: PackageType,
    ) -> ExpirationForecast {
        let today = Local::now().date_naive();
        self.predict_expiration_at(item_name, category, purchase_date, storage, package, today)
    }

    /// Predict expiration with status as of `today`
    pub fn predict_expiration_at(
        &self,
        item_name: &str,
        category: Option<Category>,
        purchase_date: NaiveDate,
        storage: StorageLocation,
        package: PackageType,
        today: NaiveDate,
    ) -> ExpirationForecast {
        let shelf_life_days = self.adjusted_shelf_life(item_name, category, storage, package);
        let expiration_date = shift_days(purchase_date, shelf_life_days as i64);

        let mut forecast = ExpirationForecast {
            item_name: item_name.trim().to_string(),
            category,
            purchase_date,
            expiration_date,
            shelf_life_days,
            storage_location: storage,
            package_type: package,
            status: ExpirationStatus::Fresh,
            consumed_on: None,
            wasted_on: None,
        };
        forecast.status = self.status_of(&forecast, today);
        forecast
    }

    /// Status using this forecaster's thresholds
    pub fn status_of(&self, forecast: &ExpirationForecast, today: NaiveDate) -> ExpirationStatus {
        forecast.status_with(today, self.use_soon_days, self.moderate_days)
    }

    /// Re-derive the stored status of tracked records
    pub fn refresh_all(&self, tracked: &mut [ExpirationForecast], today: NaiveDate) {
        for forecast in tracked.iter_mut() {
            forecast.status = self.status_of(forecast, today);
        }
    }

    /// Alerts for open records that are about to expire or already have,
    /// soonest first
    pub fn alerts(&self, tracked: &[ExpirationForecast], today: NaiveDate) -> Vec<ExpirationAlert> {
        let mut alerts: Vec<ExpirationAlert> = tracked
            .iter()
            .filter_map(|forecast| {
                let status = self.status_of(forecast, today);
                if !matches!(status, ExpirationStatus::UseSoon | ExpirationStatus::Expired) {
                    return None;
                }

                let days_remaining = forecast.days_remaining(today);
                let message = match days_remaining {
                    d if d < -1 => format!("{} expired {} days ago", forecast.item_name, -d),
                    -1 => format!("{} expired yesterday", forecast.item_name),
                    0 => format!("{} expires today", forecast.item_name),
                    1 => format!("{} expires tomorrow", forecast.item_name),
                    d => format!("{} expires in {} days", forecast.item_name, d),
                };

                Some(ExpirationAlert {
                    item_name: forecast.item_name.clone(),
                    status,
                    days_remaining,
                    expiration_date: forecast.expiration_date,
                    message,
                })
            })
            .collect();

        alerts.sort_by(|a, b| {
            a.days_remaining
                .cmp(&b.days_remaining)
                .then_with(|| a.item_name.cmp(&b.item_name))
        });
        alerts
    }

    /// Count consumed, wasted and still-open records
    pub fn waste_summary(&self, tracked: &[ExpirationForecast]) -> WasteSummary {
        let mut summary = WasteSummary::default();
        for forecast in tracked {
            if forecast.wasted_on.is_some() {
                summary.wasted += 1;
            } else if forecast.consumed_on.is_some() {
                summary.consumed += 1;
            } else {
                summary.open += 1;
            }
        }

        let closed = summary.consumed + summary.wasted;
        if closed > 0 {
            summary.waste_rate = summary.wasted as f64 / closed as f64;
        }
        summary
    }
}

impl ExpirationForecast {
    /// Days until expiration; negative once expired
    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.expiration_date - today).num_days()
    }

    /// Status with the default thresholds (use soon <= 2 days, moderate <= 5)
    pub fn status_at(&self, today: NaiveDate) -> ExpirationStatus {
        self.status_with(today, DEFAULT_USE_SOON_DAYS, DEFAULT_MODERATE_DAYS)
    }

    /// Status with explicit thresholds. Consumed/wasted always win over the
    /// time-based status.
    pub fn status_with(
        &self,
        today: NaiveDate,
        use_soon_days: i64,
        moderate_days: i64,
    ) -> ExpirationStatus {
        if self.wasted_on.is_some() {
            return ExpirationStatus::Wasted;
        }
        if self.consumed_on.is_some() {
            return ExpirationStatus::Consumed;
        }

        let remaining = self.days_remaining(today);
        if remaining < 0 {
            ExpirationStatus::Expired
        } else if remaining <= use_soon_days {
            ExpirationStatus::UseSoon
        } else if remaining <= moderate_days {
            ExpirationStatus::Moderate
        } else {
            ExpirationStatus::Fresh
        }
    }

    /// Store the status as of `today`
    pub fn refresh(&mut self, today: NaiveDate) {
        self.status = self.status_at(today);
    }

    /// Record that the item was eaten. Fails if it was already marked wasted.
    pub fn mark_consumed(&mut self, on: NaiveDate) -> Result<()> {
        if self.wasted_on.is_some() {
            return Err(self.transition_error(ExpirationStatus::Wasted, ExpirationStatus::Consumed));
        }
        if self.consumed_on.is_none() {
            self.consumed_on = Some(on);
        }
        self.status = ExpirationStatus::Consumed;
        Ok(())
    }

    /// Record that the item was thrown out. Fails if it was already marked consumed.
    pub fn mark_wasted(&mut self, on: NaiveDate) -> Result<()> {
        if self.consumed_on.is_some() {
            return Err(self.transition_error(ExpirationStatus::Consumed, ExpirationStatus::Wasted));
        }
        if self.wasted_on.is_none() {
            self.wasted_on = Some(on);
        }
        self.status = ExpirationStatus::Wasted;
        Ok(())
    }

    fn transition_error(&self, from: ExpirationStatus, to: ExpirationStatus) -> Error {
        Error::InvalidTransition {
            item: self.item_name.clone(),
            from: from.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }
}
