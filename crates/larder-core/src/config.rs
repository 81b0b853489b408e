//! Engine configuration
//!
//! Thresholds, default category weights and shelf-life overrides used by the
//! predictors.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/larder/config/engine.toml) if it exists
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Every key is optional; missing keys keep their built-in defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{normalize_key, Category};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/engine.toml");

/// Upper bound for any day count in config (about a century)
pub const MAX_CONFIG_DAYS: i64 = 36_500;

/// Month-indexed (Jan..Dec) multipliers applied to the mean purchase interval.
/// Values below 1.0 mean people restock sooner that month.
pub const DEFAULT_SEASONAL_FACTORS: [f64; 12] = [
    1.05, 1.05, 1.0, 1.0, 0.95, 0.95, 0.95, 0.95, 1.0, 1.0, 0.95, 0.9,
];

/// Settings for the category allocation planner
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Baseline share of the budget per category, before caller overrides
    pub default_weights: BTreeMap<Category, f64>,
    /// Priority multiplier for items not bought recently
    pub new_item_boost: f64,
    pub max_items_per_category: usize,
    /// Category overshoot allowance as a fraction of the sub-budget
    pub category_tolerance_ratio: f64,
    /// Minimum category overshoot allowance in dollars
    pub category_tolerance_min: f64,
    /// Overall overshoot allowance in dollars
    pub global_tolerance: f64,
    /// Extra quantity per additional household member
    pub household_scale_step: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        let default_weights = BTreeMap::from([
            (Category::Produce, 0.25),
            (Category::Dairy, 0.20),
            (Category::MeatSeafood, 0.20),
            (Category::Pantry, 0.20),
            (Category::Beverages, 0.15),
        ]);
        Self {
            default_weights,
            new_item_boost: 1.2,
            max_items_per_category: 5,
            category_tolerance_ratio: 0.1,
            category_tolerance_min: 3.0,
            global_tolerance: 2.0,
            household_scale_step: 0.2,
        }
    }
}

/// Settings for the price trend analyzer
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    /// A price at or below `average * good_deal_ratio` is a good deal
    pub good_deal_ratio: f64,
    /// Relative change between first and last thirds that counts as a trend
    pub trend_threshold: f64,
    /// Samples in the best weekday bucket needed for full confidence
    pub full_confidence_samples: usize,
    /// A price at or above `max * near_high_ratio` is reported as near the high
    pub near_high_ratio: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            good_deal_ratio: 0.9,
            trend_threshold: 0.05,
            full_confidence_samples: 4,
            near_high_ratio: 0.95,
        }
    }
}

/// Settings for the purchase cadence predictor
#[derive(Debug, Clone, PartialEq)]
pub struct CadenceConfig {
    /// Fallback purchase interval per category when history is too short
    pub default_interval_days: BTreeMap<Category, u32>,
    /// Fallback interval for categories without an entry
    pub fallback_interval_days: u32,
    /// Confidence reported when only one purchase is known
    pub single_purchase_confidence: f64,
    /// Confidence reported when no purchase is known
    pub no_history_confidence: f64,
    /// Floor for statistically derived confidence
    pub min_confidence: f64,
    pub seasonal_factors: [f64; 12],
}

impl Default for CadenceConfig {
    fn default() -> Self {
        let default_interval_days = BTreeMap::from([
            (Category::Dairy, 7),
            (Category::Produce, 5),
            (Category::MeatSeafood, 10),
            (Category::Pantry, 30),
        ]);
        Self {
            default_interval_days,
            fallback_interval_days: 14,
            single_purchase_confidence: 0.5,
            no_history_confidence: 0.3,
            min_confidence: 0.1,
            seasonal_factors: DEFAULT_SEASONAL_FACTORS,
        }
    }
}

impl CadenceConfig {
    pub fn interval_for(&self, category: Category) -> u32 {
        self.default_interval_days
            .get(&category)
            .copied()
            .unwrap_or(self.fallback_interval_days)
    }
}

/// Settings for the expiration forecaster
#[derive(Debug, Clone, PartialEq)]
pub struct ExpirationConfig {
    /// Shelf life when neither the item nor its category is known
    pub default_shelf_life_days: u32,
    /// Days remaining at or below which an item is "use soon"
    pub use_soon_days: i64,
    /// Days remaining at or below which an item is "moderate"
    pub moderate_days: i64,
    /// Extra or replacement shelf-life table entries (item name -> days)
    pub shelf_life_overrides: BTreeMap<String, u32>,
}

impl Default for ExpirationConfig {
    fn default() -> Self {
        Self {
            default_shelf_life_days: 7,
            use_soon_days: 2,
            moderate_days: 5,
            shelf_life_overrides: BTreeMap::new(),
        }
    }
}

/// Settings for the recommendation orchestrator
#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Purchases within this many days count as "recently purchased"
    pub recent_window_days: i64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            recent_window_days: 14,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    pub planner: PlannerConfig,
    pub pricing: PricingConfig,
    pub cadence: CadenceConfig,
    pub expiration: ExpirationConfig,
    pub orchestrator: OrchestratorConfig,
}

impl EngineConfig {
    /// Load configuration (explicit path or data-dir override first, then default)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) => {
                if path.exists() {
                    debug!(path = %path.display(), "Loading engine config");
                    fs::read_to_string(path)?
                } else {
                    warn!(path = %path.display(), "Config file not found, using defaults");
                    DEFAULT_CONFIG.to_string()
                }
            }
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => {
                    debug!(path = %default_path.display(), "Loading engine config override");
                    fs::read_to_string(&default_path)?
                }
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        Self::parse(&content)
    }

    /// Parse config from TOML content, merging over built-in defaults
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)?;

        let mut config = EngineConfig::default();

        if let Some(planner) = raw.planner {
            let target = &mut config.planner;
            if let Some(weights) = planner.default_weights {
                let mut parsed = BTreeMap::new();
                for (label, weight) in weights {
                    let Some(category) = parse_category_key(&label) else {
                        warn!(category = %label, "Unknown category in default_weights, skipping");
                        continue;
                    };
                    if !weight.is_finite() || weight < 0.0 {
                        return Err(Error::Config(format!(
                            "Weight for {} must be a non-negative number",
                            label
                        )));
                    }
                    parsed.insert(category, weight);
                }
                if parsed.values().sum::<f64>() <= 0.0 {
                    return Err(Error::Config(
                        "default_weights must contain at least one positive weight".into(),
                    ));
                }
                target.default_weights = parsed;
            }
            if let Some(v) = planner.new_item_boost {
                target.new_item_boost = positive("planner.new_item_boost", v)?;
            }
            if let Some(v) = planner.max_items_per_category {
                target.max_items_per_category = v;
            }
            if let Some(v) = planner.category_tolerance_ratio {
                target.category_tolerance_ratio = non_negative("planner.category_tolerance_ratio", v)?;
            }
            if let Some(v) = planner.category_tolerance_min {
                target.category_tolerance_min = non_negative("planner.category_tolerance_min", v)?;
            }
            if let Some(v) = planner.global_tolerance {
                target.global_tolerance = non_negative("planner.global_tolerance", v)?;
            }
            if let Some(v) = planner.household_scale_step {
                target.household_scale_step = non_negative("planner.household_scale_step", v)?;
            }
        }

        if let Some(pricing) = raw.pricing {
            let target = &mut config.pricing;
            if let Some(v) = pricing.good_deal_ratio {
                target.good_deal_ratio = positive("pricing.good_deal_ratio", v)?;
            }
            if let Some(v) = pricing.trend_threshold {
                target.trend_threshold = non_negative("pricing.trend_threshold", v)?;
            }
            if let Some(v) = pricing.full_confidence_samples {
                target.full_confidence_samples = v.max(1);
            }
            if let Some(v) = pricing.near_high_ratio {
                target.near_high_ratio = positive("pricing.near_high_ratio", v)?;
            }
        }

        if let Some(cadence) = raw.cadence {
            let target = &mut config.cadence;
            if let Some(intervals) = cadence.default_interval_days {
                for (label, days) in intervals {
                    let Some(category) = parse_category_key(&label) else {
                        warn!(category = %label, "Unknown category in default_interval_days, skipping");
                        continue;
                    };
                    let days = day_count("cadence.default_interval_days", days)?;
                    target.default_interval_days.insert(category, days.max(1));
                }
            }
            if let Some(v) = cadence.fallback_interval_days {
                target.fallback_interval_days =
                    day_count("cadence.fallback_interval_days", v)?.max(1);
            }
            if let Some(v) = cadence.single_purchase_confidence {
                target.single_purchase_confidence = unit("cadence.single_purchase_confidence", v)?;
            }
            if let Some(v) = cadence.no_history_confidence {
                target.no_history_confidence = unit("cadence.no_history_confidence", v)?;
            }
            if let Some(v) = cadence.min_confidence {
                target.min_confidence = unit("cadence.min_confidence", v)?;
            }
            if let Some(factors) = cadence.seasonal_factors {
                if factors.len() != 12 {
                    return Err(Error::Config(format!(
                        "cadence.seasonal_factors needs 12 entries, got {}",
                        factors.len()
                    )));
                }
                for (i, factor) in factors.iter().enumerate() {
                    target.seasonal_factors[i] = positive("cadence.seasonal_factors", *factor)?;
                }
            }
        }

        if let Some(expiration) = raw.expiration {
            let target = &mut config.expiration;
            if let Some(v) = expiration.default_shelf_life_days {
                target.default_shelf_life_days =
                    day_count("expiration.default_shelf_life_days", v)?.max(1);
            }
            if let Some(v) = expiration.use_soon_days {
                target.use_soon_days = v;
            }
            if let Some(v) = expiration.moderate_days {
                target.moderate_days = v;
            }
            if target.moderate_days < target.use_soon_days {
                return Err(Error::Config(
                    "expiration.moderate_days must be >= expiration.use_soon_days".into(),
                ));
            }
            if let Some(overrides) = expiration.shelf_life {
                for (name, days) in overrides {
                    let days = day_count("expiration.shelf_life", days)?;
                    target
                        .shelf_life_overrides
                        .insert(normalize_key(&name), days.max(1));
                }
            }
        }

        if let Some(orchestrator) = raw.orchestrator {
            if let Some(v) = orchestrator.recent_window_days {
                if v > MAX_CONFIG_DAYS {
                    return Err(Error::Config(format!(
                        "orchestrator.recent_window_days must be at most {}, got {}",
                        MAX_CONFIG_DAYS, v
                    )));
                }
                config.orchestrator.recent_window_days = v.max(0);
            }
        }

        Ok(config)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        let raw = RawConfig::from(self);
        toml::to_string_pretty(&raw).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("larder").join("config").join("engine.toml"))
}

/// Category keys in config files must name a real category; unlike free-text
/// catalog labels, typos are not silently filed under `Other`.
fn parse_category_key(label: &str) -> Option<Category> {
    let category = Category::lookup(label);
    if category == Category::Other && normalize_key(label) != "other" {
        return None;
    }
    Some(category)
}

fn day_count(key: &str, days: u32) -> Result<u32> {
    if i64::from(days) <= MAX_CONFIG_DAYS {
        Ok(days)
    } else {
        Err(Error::Config(format!(
            "{} must be at most {} days, got {}",
            key, MAX_CONFIG_DAYS, days
        )))
    }
}

fn positive(key: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(Error::Config(format!("{} must be positive, got {}", key, value)))
    }
}

fn non_negative(key: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(Error::Config(format!("{} must be non-negative, got {}", key, value)))
    }
}

fn unit(key: &str, value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(Error::Config(format!("{} must be within [0, 1], got {}", key, value)))
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Default, Serialize, Deserialize)]
struct RawConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    planner: Option<RawPlanner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pricing: Option<RawPricing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cadence: Option<RawCadence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expiration: Option<RawExpiration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    orchestrator: Option<RawOrchestrator>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawPlanner {
    new_item_boost: Option<f64>,
    max_items_per_category: Option<usize>,
    category_tolerance_ratio: Option<f64>,
    category_tolerance_min: Option<f64>,
    global_tolerance: Option<f64>,
    household_scale_step: Option<f64>,
    default_weights: Option<BTreeMap<String, f64>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawPricing {
    good_deal_ratio: Option<f64>,
    trend_threshold: Option<f64>,
    full_confidence_samples: Option<usize>,
    near_high_ratio: Option<f64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawCadence {
    fallback_interval_days: Option<u32>,
    single_purchase_confidence: Option<f64>,
    no_history_confidence: Option<f64>,
    min_confidence: Option<f64>,
    seasonal_factors: Option<Vec<f64>>,
    default_interval_days: Option<BTreeMap<String, u32>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawExpiration {
    default_shelf_life_days: Option<u32>,
    use_soon_days: Option<i64>,
    moderate_days: Option<i64>,
    shelf_life: Option<BTreeMap<String, u32>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RawOrchestrator {
    recent_window_days: Option<i64>,
}

impl From<&EngineConfig> for RawConfig {
    fn from(config: &EngineConfig) -> Self {
        let planner = &config.planner;
        let pricing = &config.pricing;
        let cadence = &config.cadence;
        let expiration = &config.expiration;

        RawConfig {
            planner: Some(RawPlanner {
                new_item_boost: Some(planner.new_item_boost),
                max_items_per_category: Some(planner.max_items_per_category),
                category_tolerance_ratio: Some(planner.category_tolerance_ratio),
                category_tolerance_min: Some(planner.category_tolerance_min),
                global_tolerance: Some(planner.global_tolerance),
                household_scale_step: Some(planner.household_scale_step),
                default_weights: Some(
                    planner
                        .default_weights
                        .iter()
                        .map(|(c, w)| (c.as_str().to_string(), *w))
                        .collect(),
                ),
            }),
            pricing: Some(RawPricing {
                good_deal_ratio: Some(pricing.good_deal_ratio),
                trend_threshold: Some(pricing.trend_threshold),
                full_confidence_samples: Some(pricing.full_confidence_samples),
                near_high_ratio: Some(pricing.near_high_ratio),
            }),
            cadence: Some(RawCadence {
                fallback_interval_days: Some(cadence.fallback_interval_days),
                single_purchase_confidence: Some(cadence.single_purchase_confidence),
                no_history_confidence: Some(cadence.no_history_confidence),
                min_confidence: Some(cadence.min_confidence),
                seasonal_factors: Some(cadence.seasonal_factors.to_vec()),
                default_interval_days: Some(
                    cadence
                        .default_interval_days
                        .iter()
                        .map(|(c, d)| (c.as_str().to_string(), *d))
                        .collect(),
                ),
            }),
            expiration: Some(RawExpiration {
                default_shelf_life_days: Some(expiration.default_shelf_life_days),
                use_soon_days: Some(expiration.use_soon_days),
                moderate_days: Some(expiration.moderate_days),
                shelf_life: if expiration.shelf_life_overrides.is_empty() {
                    None
                } else {
                    Some(expiration.shelf_life_overrides.clone())
                },
            }),
            orchestrator: Some(RawOrchestrator {
                recent_window_days: Some(config.orchestrator.recent_window_days),
            }),
        }
    }
}
