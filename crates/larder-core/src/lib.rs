//! Larder Core Library
//!
//! Grocery forecasting and budget allocation:
//! - Category allocation planner for budget-fitting shopping lists
//! - Purchase cadence predictor with seasonal adjustment
//! - Price trend analysis and best-day-to-buy
//! - Expiration forecasting with consumed/wasted tracking
//! - Snapshot import for catalogs, purchases and prices
//! - Layered TOML configuration

pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod planning;
pub mod shelf_life;
pub mod stats;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use models::{
    CatalogItem, Category, PackageType, PriceObservation, PurchaseEvent, StorageLocation, Unit,
};
pub use planning::{
    BestTimePrediction, CategoryAllocationPlanner, Engine, ExpirationAlert, ExpirationForecast,
    ExpirationForecaster, ExpirationStatus, PlanRequest, PlannedItem, PriceAnalysis,
    PriceTrend, PriceTrendAnalyzer, PurchaseCadencePredictor, PurchaseForecast, Recommendation,
    RecommendationOrchestrator, ShoppingPlan, Urgency, WasteSummary,
};
pub use shelf_life::{ShelfLife, ShelfLifeSource, ShelfLifeTable};
