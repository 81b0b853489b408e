//! Planning - grocery forecasting and budget allocation
//!
//! Four predictors work over caller-supplied snapshots. None of them do I/O
//! or keep state between calls.
//!
//! ## Predictors
//!
//! - **Category Allocation Planner** - Fits a shopping list to a budget
//! - **Purchase Cadence Predictor** - Forecasts the next purchase of an item
//! - **Price Trend Analyzer** - Judges a price against history
//! - **Expiration Forecaster** - Predicts when purchased food goes off
//!
//! ## Usage
//!
//! ```rust,ignore
//! use larder_core::planning::{Engine, PlanRequest};
//!
//! let engine = Engine::new(config);
//! let plan = engine.orchestrator().plan(&PlanRequest::new(100.0, catalog, today));
//! ```

pub mod allocation;
pub mod cadence;
pub mod engine;
pub mod expiration;
pub mod pricing;
pub mod types;

pub use allocation::CategoryAllocationPlanner;
pub use cadence::PurchaseCadencePredictor;
pub use engine::{Engine, PlanRequest, PlannedItem, RecommendationOrchestrator, ShoppingPlan};
pub use expiration::ExpirationForecaster;
pub use pricing::PriceTrendAnalyzer;
pub use types::{
    BestTimePrediction, ExpirationAlert, ExpirationForecast, ExpirationStatus, PriceAnalysis,
    PriceTrend, PurchaseForecast, Recommendation, Urgency, WasteSummary,
};
