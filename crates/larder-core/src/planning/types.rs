//! Value objects produced by the planning engine

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{Category, PackageType, StorageLocation, Unit};

/// One line of a budget-fitting shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub item_id: String,
    pub item_name: String,
    pub category: Category,
    /// Always > 0, rounded to the unit's granularity
    pub quantity: f64,
    pub unit: Unit,
    /// Always > 0
    pub estimated_unit_price: f64,
    /// In [0, 1]
    pub priority_score: f64,
    /// Not bought in the recent window
    pub is_new: bool,
}

impl Recommendation {
    pub fn estimated_cost(&self) -> f64 {
        self.quantity * self.estimated_unit_price
    }
}

/// Direction of an item's price over the analysis window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTrend {
    Increasing,
    Decreasing,
    Stable,
}

impl PriceTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceTrend::Increasing => "increasing",
            PriceTrend::Decreasing => "decreasing",
            PriceTrend::Stable => "stable",
        }
    }
}

impl fmt::Display for PriceTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PriceTrend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increasing" => Ok(PriceTrend::Increasing),
            "decreasing" => Ok(PriceTrend::Decreasing),
            "stable" => Ok(PriceTrend::Stable),
            _ => Err(format!("Unknown price trend: {}", s)),
        }
    }
}

/// Statistics over one item's price history compared to a current price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAnalysis {
    pub item_name: String,
    pub current_price: f64,
    pub average_price: f64,
    pub median_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub sample_count: usize,
    pub trend: PriceTrend,
    /// 1.0 at the historical low, 0.0 at the historical high
    pub price_score: f64,
    pub is_good_deal: bool,
    /// Signed percent difference from the average price
    pub percent_vs_average: f64,
    /// Store with the lowest mean observed price
    pub best_store: Option<String>,
    pub note: String,
}

/// Cheapest day of the week to buy an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestTimePrediction {
    pub item_name: String,
    pub best_day_of_week: Weekday,
    pub best_day_average: f64,
    /// Mean over all observations
    pub current_average: f64,
    /// Never negative
    pub estimated_savings: f64,
    /// In [0, 1]; grows with samples in the best bucket
    pub confidence: f64,
    pub sample_count: usize,
}

/// How soon an item needs buying
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    /// Predicted date already passed
    Overdue,
    /// Today or tomorrow
    Urgent,
    /// Within a week
    Soon,
    /// Within two weeks
    Planned,
    /// Further out
    Future,
}

impl Urgency {
    /// Classify from days until the predicted purchase
    pub fn from_days_until(days: i64) -> Self {
        match days {
            d if d < 0 => Urgency::Overdue,
            0..=1 => Urgency::Urgent,
            2..=7 => Urgency::Soon,
            8..=14 => Urgency::Planned,
            _ => Urgency::Future,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Overdue => "overdue",
            Urgency::Urgent => "urgent",
            Urgency::Soon => "soon",
            Urgency::Planned => "planned",
            Urgency::Future => "future",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Urgency::Overdue => 5,
            Urgency::Urgent => 4,
            Urgency::Soon => 3,
            Urgency::Planned => 2,
            Urgency::Future => 1,
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overdue" => Ok(Urgency::Overdue),
            "urgent" => Ok(Urgency::Urgent),
            "soon" => Ok(Urgency::Soon),
            "planned" => Ok(Urgency::Planned),
            "future" => Ok(Urgency::Future),
            _ => Err(format!("Unknown urgency: {}", s)),
        }
    }
}

/// When an item will likely be bought next
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseForecast {
    pub item_name: String,
    pub category: Category,
    pub last_purchase: Option<NaiveDate>,
    pub predicted_date: NaiveDate,
    /// Mean interval before the seasonal adjustment
    pub mean_interval_days: f64,
    pub seasonal_factor: f64,
    /// In [0, 1]
    pub confidence: f64,
    pub urgency: Urgency,
    /// Relative to the day the forecast was made; negative when overdue
    pub days_until: i64,
    /// Distinct purchase days used
    pub sample_count: usize,
    /// Median quantity per purchase
    pub typical_quantity: Option<f64>,
}

impl PurchaseForecast {
    /// Whether the forecast came from the category default rather than history
    pub fn is_fallback(&self) -> bool {
        self.sample_count < 2
    }
}

/// Freshness state of a tracked item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpirationStatus {
    Fresh,
    Moderate,
    UseSoon,
    Expired,
    Consumed,
    Wasted,
}

impl ExpirationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpirationStatus::Fresh => "fresh",
            ExpirationStatus::Moderate => "moderate",
            ExpirationStatus::UseSoon => "use_soon",
            ExpirationStatus::Expired => "expired",
            ExpirationStatus::Consumed => "consumed",
            ExpirationStatus::Wasted => "wasted",
        }
    }
}

impl fmt::Display for ExpirationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ExpirationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fresh" => Ok(ExpirationStatus::Fresh),
            "moderate" => Ok(ExpirationStatus::Moderate),
            "use_soon" | "usesoon" => Ok(ExpirationStatus::UseSoon),
            "expired" => Ok(ExpirationStatus::Expired),
            "consumed" => Ok(ExpirationStatus::Consumed),
            "wasted" => Ok(ExpirationStatus::Wasted),
            _ => Err(format!("Unknown expiration status: {}", s)),
        }
    }
}

/// Predicted expiration of a purchased item, plus its tracked outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirationForecast {
    pub item_name: String,
    pub category: Option<Category>,
    pub purchase_date: NaiveDate,
    pub expiration_date: NaiveDate,
    /// Adjusted for storage and packaging
    pub shelf_life_days: u32,
    pub storage_location: StorageLocation,
    pub package_type: PackageType,
    pub status: ExpirationStatus,
    pub consumed_on: Option<NaiveDate>,
    pub wasted_on: Option<NaiveDate>,
}

/// Something in the kitchen needs attention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpirationAlert {
    pub item_name: String,
    pub status: ExpirationStatus,
    pub days_remaining: i64,
    pub expiration_date: NaiveDate,
    pub message: String,
}

/// Outcome counts over tracked items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WasteSummary {
    pub consumed: usize,
    pub wasted: usize,
    pub open: usize,
    /// wasted / (consumed + wasted), 0.0 when nothing is closed
    pub waste_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_thresholds() {
        assert_eq!(Urgency::from_days_until(-1), Urgency::Overdue);
        assert_eq!(Urgency::from_days_until(0), Urgency::Urgent);
        assert_eq!(Urgency::from_days_until(1), Urgency::Urgent);
        assert_eq!(Urgency::from_days_until(2), Urgency::Soon);
        assert_eq!(Urgency::from_days_until(7), Urgency::Soon);
        assert_eq!(Urgency::from_days_until(8), Urgency::Planned);
        assert_eq!(Urgency::from_days_until(14), Urgency::Planned);
        assert_eq!(Urgency::from_days_until(15), Urgency::Future);
    }

    #[test]
    fn test_urgency_priority() {
        assert!(Urgency::Overdue.priority() > Urgency::Urgent.priority());
        assert!(Urgency::Urgent.priority() > Urgency::Soon.priority());
        assert!(Urgency::Soon.priority() > Urgency::Planned.priority());
        assert!(Urgency::Planned.priority() > Urgency::Future.priority());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(ExpirationStatus::UseSoon.as_str(), "use_soon");
        assert_eq!(
            ExpirationStatus::from_str("use_soon").unwrap(),
            ExpirationStatus::UseSoon
        );
        assert_eq!(
            serde_json::to_string(&ExpirationStatus::UseSoon).unwrap(),
            "\"use_soon\""
        );
    }

    #[test]
    fn test_recommendation_cost() {
        let rec = Recommendation {
            item_id: "d1".into(),
            item_name: "Milk".into(),
            category: Category::Dairy,
            quantity: 2.0,
            unit: Unit::Gallon,
            estimated_unit_price: 3.5,
            priority_score: 0.8,
            is_new: true,
        };
        assert_eq!(rec.estimated_cost(), 7.0);
    }
}
