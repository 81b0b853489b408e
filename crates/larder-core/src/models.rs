//! Domain models for Larder
//!
//! These are the snapshot types handed to the engine by the surrounding
//! tracker. Results produced by the engine live in `planning::types`.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Normalize a free-text key for lookups: trimmed and lowercased
pub fn normalize_key(s: &str) -> String {
    s.trim().to_lowercase()
}

/// `date` moved by `days`, clamped to the representable date range
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Grocery category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Produce,
    Dairy,
    MeatSeafood,
    Pantry,
    Beverages,
    Bakery,
    Frozen,
    Snacks,
    Household,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Produce => "produce",
            Self::Dairy => "dairy",
            Self::MeatSeafood => "meat_seafood",
            Self::Pantry => "pantry",
            Self::Beverages => "beverages",
            Self::Bakery => "bakery",
            Self::Frozen => "frozen",
            Self::Snacks => "snacks",
            Self::Household => "household",
            Self::Other => "other",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Produce => "Produce",
            Self::Dairy => "Dairy",
            Self::MeatSeafood => "Meat & Seafood",
            Self::Pantry => "Pantry",
            Self::Beverages => "Beverages",
            Self::Bakery => "Bakery",
            Self::Frozen => "Frozen",
            Self::Snacks => "Snacks",
            Self::Household => "Household",
            Self::Other => "Other",
        }
    }

    pub fn all() -> &'static [Category] {
        &[
            Self::Produce,
            Self::Dairy,
            Self::MeatSeafood,
            Self::Pantry,
            Self::Beverages,
            Self::Bakery,
            Self::Frozen,
            Self::Snacks,
            Self::Household,
            Self::Other,
        ]
    }

    /// Map a free-text category label to a category.
    ///
    /// Tries an exact match on the compacted label (punctuation and spaces
    /// removed), then a "contains" pass over keywords. Unknown labels map to
    /// `Other`.
    pub fn lookup(label: &str) -> Category {
        let lower = normalize_key(label);
        let compact: String = lower.chars().filter(|c| c.is_alphanumeric()).collect();

        let exact = match compact.as_str() {
            "produce" | "fruit" | "fruits" | "vegetables" | "veggies" | "fruitvegetables" => {
                Some(Self::Produce)
            }
            "dairy" | "dairyeggs" | "eggs" => Some(Self::Dairy),
            "meatseafood" | "meatandseafood" | "meat" | "seafood" | "fish" | "poultry" => {
                Some(Self::MeatSeafood)
            }
            "pantry" | "drygoods" | "canned" | "cannedgoods" | "grains" => Some(Self::Pantry),
            "beverages" | "beverage" | "drinks" | "drink" => Some(Self::Beverages),
            "bakery" | "bread" | "baked" | "bakedgoods" => Some(Self::Bakery),
            "frozen" | "frozenfoods" | "frozenfood" => Some(Self::Frozen),
            "snacks" | "snack" => Some(Self::Snacks),
            "household" | "cleaning" | "supplies" => Some(Self::Household),
            "other" | "misc" | "miscellaneous" => Some(Self::Other),
            _ => None,
        };
        if let Some(category) = exact {
            return category;
        }

        // Frozen first so "frozen vegetables" isn't filed under produce
        if lower.contains("frozen") {
            return Self::Frozen;
        }
        if lower.contains("meat")
            || lower.contains("seafood")
            || lower.contains("poultry")
            || lower.contains("fish")
        {
            return Self::MeatSeafood;
        }
        if lower.contains("produce")
            || lower.contains("fruit")
            || lower.contains("vegetable")
            || lower.contains("veggie")
        {
            return Self::Produce;
        }
        let has_eggs = lower
            .split(|c: char| !c.is_alphanumeric())
            .any(|word| word == "egg" || word == "eggs");
        if lower.contains("dairy") || lower.contains("cheese") || has_eggs {
            return Self::Dairy;
        }
        if lower.contains("beverage") || lower.contains("drink") || lower.contains("juice") {
            return Self::Beverages;
        }
        if lower.contains("bake") || lower.contains("bread") {
            return Self::Bakery;
        }
        if lower.contains("snack") || lower.contains("chips") {
            return Self::Snacks;
        }
        if lower.contains("pantry") || lower.contains("canned") || lower.contains("dry") {
            return Self::Pantry;
        }
        if lower.contains("household") || lower.contains("clean") {
            return Self::Household;
        }

        Self::Other
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("Empty category".to_string());
        }
        Ok(Self::lookup(s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::lookup(&label))
    }
}

/// Unit an item is sold in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Default)]
pub enum Unit {
    #[default]
    #[serde(rename = "each")]
    Each,
    #[serde(rename = "lb")]
    Pound,
    #[serde(rename = "oz")]
    Ounce,
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "gal")]
    Gallon,
    #[serde(rename = "l")]
    Liter,
    #[serde(rename = "dozen")]
    Dozen,
    #[serde(rename = "pack")]
    Pack,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Each => "each",
            Self::Pound => "lb",
            Self::Ounce => "oz",
            Self::Kilogram => "kg",
            Self::Gram => "g",
            Self::Gallon => "gal",
            Self::Liter => "l",
            Self::Dozen => "dozen",
            Self::Pack => "pack",
        }
    }

    /// Smallest quantity step a shopper would actually buy
    pub fn granularity(&self) -> f64 {
        match self {
            Self::Each | Self::Dozen | Self::Pack | Self::Ounce | Self::Gram => 1.0,
            Self::Pound | Self::Kilogram => 0.25,
            Self::Gallon | Self::Liter => 0.5,
        }
    }

    /// Round a quantity to this unit's granularity, never below one step
    pub fn round_quantity(&self, quantity: f64) -> f64 {
        let step = self.granularity();
        let steps = (quantity / step).round().max(1.0);
        steps * step
    }

    /// Lenient parse; unknown units are treated as `Each`
    pub fn lookup(s: &str) -> Unit {
        match normalize_key(s).trim_end_matches('.') {
            "lb" | "lbs" | "pound" | "pounds" => Self::Pound,
            "oz" | "ounce" | "ounces" => Self::Ounce,
            "kg" | "kgs" | "kilogram" | "kilograms" => Self::Kilogram,
            "g" | "gram" | "grams" => Self::Gram,
            "gal" | "gallon" | "gallons" => Self::Gallon,
            "l" | "liter" | "liters" | "litre" | "litres" => Self::Liter,
            "dozen" | "dz" => Self::Dozen,
            "pack" | "pk" | "package" | "box" | "bag" => Self::Pack,
            _ => Self::Each,
        }
    }
}

impl std::str::FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::lookup(s))
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::lookup(&s))
    }
}

/// An item the catalog provider offers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub category: Category,
    #[serde(default)]
    pub unit: Unit,
    /// Nominal average price per unit
    #[serde(alias = "price")]
    pub average_price: f64,
}

impl CatalogItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        unit: Unit,
        average_price: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            unit,
            average_price,
        }
    }
}

fn default_quantity() -> f64 {
    1.0
}

/// A recorded purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseEvent {
    pub item_name: String,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    /// Total paid for `quantity`
    pub price_paid: f64,
    #[serde(default)]
    pub store: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl PurchaseEvent {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    /// Price per unit, if quantity is usable
    pub fn unit_price(&self) -> Option<f64> {
        if self.quantity > 0.0 && self.price_paid > 0.0 {
            Some(self.price_paid / self.quantity)
        } else {
            None
        }
    }

    pub fn is_for(&self, item_name: &str) -> bool {
        normalize_key(&self.item_name) == normalize_key(item_name)
    }
}

/// A price seen for an item at a point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceObservation {
    pub item_name: String,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub store: Option<String>,
}

impl PriceObservation {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }

    pub fn is_for(&self, item_name: &str) -> bool {
        normalize_key(&self.item_name) == normalize_key(item_name)
    }

    /// Derive an observation from a purchase (unit price paid)
    pub fn from_purchase(purchase: &PurchaseEvent) -> Option<Self> {
        purchase.unit_price().map(|price| Self {
            item_name: purchase.item_name.clone(),
            price,
            timestamp: purchase.timestamp,
            store: purchase.store.clone(),
        })
    }
}

/// Where an item is stored after purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageLocation {
    #[default]
    Fridge,
    Freezer,
    Pantry,
}

impl StorageLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fridge => "fridge",
            Self::Freezer => "freezer",
            Self::Pantry => "pantry",
        }
    }

    /// Shelf-life multiplier relative to the fridge baseline
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Fridge => 1.0,
            Self::Freezer => 4.0,
            Self::Pantry => 0.8,
        }
    }
}

impl std::str::FromStr for StorageLocation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "fridge" | "refrigerator" | "refrigerated" => Ok(Self::Fridge),
            "freezer" | "frozen" => Ok(Self::Freezer),
            "pantry" | "cupboard" | "shelf" => Ok(Self::Pantry),
            _ => Err(format!("Unknown storage location: {}", s)),
        }
    }
}

impl std::fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How an item was packaged when bought
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    #[default]
    Fresh,
    Packaged,
    Frozen,
    Canned,
}

impl PackageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Packaged => "packaged",
            Self::Frozen => "frozen",
            Self::Canned => "canned",
        }
    }

    /// Apply the packaging adjustment to a storage-adjusted shelf life
    pub fn adjust(&self, days: f64) -> f64 {
        match self {
            Self::Fresh => days,
            Self::Packaged => days * 1.2,
            Self::Frozen => days * 3.0,
            Self::Canned => days.max(365.0),
        }
    }
}

impl std::str::FromStr for PackageType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize_key(s).as_str() {
            "fresh" => Ok(Self::Fresh),
            "packaged" | "package" | "sealed" => Ok(Self::Packaged),
            "frozen" => Ok(Self::Frozen),
            "canned" | "can" | "jarred" => Ok(Self::Canned),
            _ => Err(format!("Unknown package type: {}", s)),
        }
    }
}

impl std::fmt::Display for PackageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
