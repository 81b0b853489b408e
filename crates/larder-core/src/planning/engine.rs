//! Planning Engine - builds the predictors once and combines their output

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::Error;
use crate::models::{
    normalize_key, shift_days, CatalogItem, Category, PriceObservation, PurchaseEvent,
};

use super::allocation::CategoryAllocationPlanner;
use super::cadence::PurchaseCadencePredictor;
use super::expiration::ExpirationForecaster;
use super::pricing::PriceTrendAnalyzer;
use super::types::{
    ExpirationAlert, ExpirationForecast, PriceAnalysis, PurchaseForecast, Recommendation,
};

/// Composition root owning one instance of each predictor
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    planner: CategoryAllocationPlanner,
    cadence: PurchaseCadencePredictor,
    pricing: PriceTrendAnalyzer,
    expiration: ExpirationForecaster,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            planner: CategoryAllocationPlanner::from_config(&config.planner),
            cadence: PurchaseCadencePredictor::from_config(&config.cadence),
            pricing: PriceTrendAnalyzer::from_config(&config.pricing),
            expiration: ExpirationForecaster::from_config(&config.expiration),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn planner(&self) -> &CategoryAllocationPlanner {
        &self.planner
    }

    pub fn cadence(&self) -> &PurchaseCadencePredictor {
        &self.cadence
    }

    pub fn pricing(&self) -> &PriceTrendAnalyzer {
        &self.pricing
    }

    pub fn expiration(&self) -> &ExpirationForecaster {
        &self.expiration
    }

    /// Orchestrator borrowing this engine's predictors
    pub fn orchestrator(&self) -> RecommendationOrchestrator<'_> {
        RecommendationOrchestrator {
            planner: &self.planner,
            cadence: &self.cadence,
            pricing: &self.pricing,
            expiration: &self.expiration,
            recent_window_days: self.config.orchestrator.recent_window_days,
        }
    }
}

/// Inputs for one shopping plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub budget: f64,
    pub household_size: u32,
    /// Additive category weight deltas
    #[serde(default)]
    pub weight_overrides: BTreeMap<Category, f64>,
    pub catalog: Vec<CatalogItem>,
    #[serde(default)]
    pub purchases: Vec<PurchaseEvent>,
    #[serde(default)]
    pub prices: Vec<PriceObservation>,
    /// Items currently in the kitchen
    #[serde(default)]
    pub tracked: Vec<ExpirationForecast>,
    pub today: NaiveDate,
}

impl PlanRequest {
    pub fn new(budget: f64, catalog: Vec<CatalogItem>, today: NaiveDate) -> Self {
        Self {
            budget,
            household_size: 1,
            weight_overrides: BTreeMap::new(),
            catalog,
            purchases: Vec::new(),
            prices: Vec::new(),
            tracked: Vec::new(),
            today,
        }
    }
}

/// One recommendation with its supporting analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedItem {
    pub recommendation: Recommendation,
    /// Absent when the item has no price history yet
    pub price_analysis: Option<PriceAnalysis>,
    pub forecast: PurchaseForecast,
}

/// Output of [`RecommendationOrchestrator::plan`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingPlan {
    pub generated_for: NaiveDate,
    pub budget: f64,
    pub household_size: u32,
    /// Planner order
    pub items: Vec<PlannedItem>,
    /// Everything in the purchase history, most urgent first
    pub restock: Vec<PurchaseForecast>,
    pub expiration_alerts: Vec<ExpirationAlert>,
    pub total_cost: f64,
    pub remaining_budget: f64,
}

/// Combines the four predictors into a shopping plan
#[derive(Debug, Clone, Copy)]
pub struct RecommendationOrchestrator<'a> {
    planner: &'a CategoryAllocationPlanner,
    cadence: &'a PurchaseCadencePredictor,
    pricing: &'a PriceTrendAnalyzer,
    expiration: &'a ExpirationForecaster,
    recent_window_days: i64,
}

impl<'a> RecommendationOrchestrator<'a> {
    /// Names bought within the recent window ending `today`
    pub fn recently_purchased(&self, purchases: &[PurchaseEvent], today: NaiveDate) -> Vec<String> {
        let since = shift_days(today, -self.recent_window_days);
        let names: BTreeSet<String> = purchases
            .iter()
            .filter(|p| {
                let day = p.date();
                day >= since && day <= today
            })
            .map(|p| normalize_key(&p.item_name))
            .filter(|name| !name.is_empty())
            .collect();
        names.into_iter().collect()
    }

    /// Build a shopping plan
    pub fn plan(&self, request: &PlanRequest) -> ShoppingPlan {
        let today = request.today;
        let recent = self.recently_purchased(&request.purchases, today);

        let recommendations = self.planner.allocate(
            request.budget,
            request.household_size,
            &request.weight_overrides,
            &request.catalog,
            &recent,
        );

        // Explicit observations plus the unit prices actually paid
        let mut price_history = request.prices.clone();
        price_history.extend(request.purchases.iter().filter_map(PriceObservation::from_purchase));

        let items: Vec<PlannedItem> = recommendations
            .into_par_iter()
            .map(|recommendation| {
                let price_analysis = match self.pricing.analyze_price(
                    &recommendation.item_name,
                    recommendation.estimated_unit_price,
                    &price_history,
                ) {
                    Ok(analysis) => Some(analysis),
                    Err(e @ Error::InsufficientHistory(_)) => {
                        debug!(item = %recommendation.item_name, reason = %e, "No price analysis");
                        None
                    }
                    Err(e) => {
                        warn!(item = %recommendation.item_name, error = %e, "Price analysis failed");
                        None
                    }
                };

                let forecast = self.cadence.predict_next_purchase_at(
                    &recommendation.item_name,
                    recommendation.category,
                    &request.purchases,
                    today,
                );

                PlannedItem {
                    recommendation,
                    price_analysis,
                    forecast,
                }
            })
            .collect();

        let restock = self.cadence.restock_forecasts(&request.purchases, today);
        let expiration_alerts = self.expiration.alerts(&request.tracked, today);

        let total_cost: f64 = items.iter().map(|i| i.recommendation.estimated_cost()).sum();
        let budget = request.budget.max(0.0);

        info!(
            items = items.len(),
            restock = restock.len(),
            alerts = expiration_alerts.len(),
            total_cost,
            "Shopping plan ready"
        );

        ShoppingPlan {
            generated_for: today,
            budget,
            household_size: request.household_size.max(1),
            items,
            restock,
            expiration_alerts,
            total_cost,
            remaining_budget: budget - total_cost,
        }
    }
}
