//! Shelf-life lookup table
//!
//! Baseline days an item stays usable in the fridge in fresh packaging.
//! Lookups are case-insensitive and trimmed, with a partial-match pass so
//! "Organic Chicken Breast" finds the "chicken breast" entry.

use std::collections::{BTreeMap, HashMap};

use crate::config::ExpirationConfig;
use crate::models::{normalize_key, Category};

/// Global fallback when neither item nor category is known
pub const DEFAULT_SHELF_LIFE_DAYS: u32 = 7;

/// Names shorter than this never take part in reverse partial matching
const MIN_PARTIAL_LEN: usize = 3;

const STANDARD_ITEMS: &[(&str, u32)] = &[
    // Dairy
    ("milk", 7),
    ("oat milk", 10),
    ("almond milk", 10),
    ("eggs", 21),
    ("butter", 30),
    ("cheese", 21),
    ("shredded cheese", 14),
    ("cream cheese", 14),
    ("yogurt", 14),
    ("heavy cream", 10),
    ("sour cream", 14),
    ("cottage cheese", 7),
    // Meat & seafood
    ("chicken", 2),
    ("chicken breast", 2),
    ("chicken thighs", 2),
    ("ground beef", 2),
    ("ground turkey", 2),
    ("steak", 4),
    ("pork chops", 4),
    ("bacon", 7),
    ("ham", 5),
    ("sausage", 2),
    ("deli meat", 5),
    ("salmon", 2),
    ("fish", 2),
    ("shrimp", 2),
    ("tofu", 5),
    // Produce
    ("lettuce", 7),
    ("spinach", 5),
    ("kale", 5),
    ("tomatoes", 7),
    ("cucumber", 7),
    ("bell pepper", 10),
    ("broccoli", 5),
    ("carrots", 21),
    ("celery", 14),
    ("onions", 30),
    ("potatoes", 21),
    ("mushrooms", 5),
    ("avocado", 4),
    ("apple", 30),
    ("pineapple", 5),
    ("bananas", 5),
    ("berries", 4),
    ("strawberries", 4),
    ("blueberries", 7),
    ("grapes", 7),
    ("oranges", 21),
    ("lemons", 21),
    ("herbs", 7),
    // Bakery
    ("bread", 5),
    ("bagels", 5),
    ("tortillas", 14),
    // Pantry
    ("rice", 365),
    ("pasta", 365),
    ("flour", 180),
    ("cereal", 180),
    ("oats", 365),
    ("peanut butter", 90),
    ("coffee", 30),
    // Beverages
    ("orange juice", 7),
    ("juice", 7),
    ("soda", 180),
];

const STANDARD_CATEGORIES: &[(Category, u32)] = &[
    (Category::Produce, 5),
    (Category::Dairy, 10),
    (Category::MeatSeafood, 3),
    (Category::Pantry, 180),
    (Category::Beverages, 30),
    (Category::Bakery, 5),
    (Category::Frozen, 90),
    (Category::Snacks, 60),
    (Category::Household, 365),
];

/// How a shelf-life value was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShelfLifeSource {
    /// Exact item name match
    Exact,
    /// Partial ("contains") item name match
    Partial,
    /// Category default
    Category,
    /// Global default
    Default,
}

/// Result of a shelf-life lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShelfLife {
    pub days: u32,
    pub source: ShelfLifeSource,
    /// Table key that matched, for item-level matches
    pub matched_key: Option<String>,
}

/// Item and category shelf-life baselines
#[derive(Debug, Clone)]
pub struct ShelfLifeTable {
    items: BTreeMap<String, u32>,
    categories: HashMap<Category, u32>,
    default_days: u32,
}

impl Default for ShelfLifeTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ShelfLifeTable {
    /// The built-in table
    pub fn standard() -> Self {
        Self {
            items: STANDARD_ITEMS
                .iter()
                .map(|(name, days)| (name.to_string(), *days))
                .collect(),
            categories: STANDARD_CATEGORIES.iter().copied().collect(),
            default_days: DEFAULT_SHELF_LIFE_DAYS,
        }
    }

    /// Build the standard table with config overrides applied
    pub fn from_config(config: &ExpirationConfig) -> Self {
        let mut table = Self::standard().with_overrides(&config.shelf_life_overrides);
        table.default_days = config.default_shelf_life_days.max(1);
        table
    }

    /// Add or replace item entries
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, u32>) -> Self {
        for (name, days) in overrides {
            let key = normalize_key(name);
            if key.is_empty() {
                continue;
            }
            self.items.insert(key, (*days).max(1));
        }
        self
    }

    pub fn default_days(&self) -> u32 {
        self.default_days
    }

    /// Item entries, for iteration in tests and reports
    pub fn entries(&self) -> impl Iterator<Item = (&str, u32)> {
        self.items.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Category default, if the category has one
    pub fn category_days(&self, category: Category) -> Option<u32> {
        self.categories.get(&category).copied()
    }

    /// Look up the baseline shelf life for an item.
    ///
    /// Order: exact name, longest table key contained in the name, longest
    /// table key containing the name, category default, global default.
    pub fn lookup(&self, item_name: &str, category: Option<Category>) -> ShelfLife {
        let name = normalize_key(item_name);

        if let Some(days) = self.items.get(&name) {
            return ShelfLife {
                days: *days,
                source: ShelfLifeSource::Exact,
                matched_key: Some(name),
            };
        }

        if !name.is_empty() {
            if let Some((key, days)) = self.longest_match(|key| name.contains(key)) {
                return ShelfLife {
                    days,
                    source: ShelfLifeSource::Partial,
                    matched_key: Some(key.to_string()),
                };
            }

            if name.len() >= MIN_PARTIAL_LEN {
                if let Some((key, days)) = self.longest_match(|key| key.contains(name.as_str())) {
                    return ShelfLife {
                        days,
                        source: ShelfLifeSource::Partial,
                        matched_key: Some(key.to_string()),
                    };
                }
            }
        }

        if let Some(days) = category.and_then(|c| self.category_days(c)) {
            return ShelfLife {
                days,
                source: ShelfLifeSource::Category,
                matched_key: None,
            };
        }

        ShelfLife {
            days: self.default_days,
            source: ShelfLifeSource::Default,
            matched_key: None,
        }
    }

    fn longest_match<F>(&self, predicate: F) -> Option<(&str, u32)>
    where
        F: Fn(&str) -> bool,
    {
        let mut best: Option<(&str, u32)> = None;
        for (key, days) in &self.items {
            if !predicate(key) {
                continue;
            }
            match best {
                Some((current, _)) if current.len() >= key.len() => {}
                _ => best = Some((key.as_str(), *days)),
            }
        }
        best
    }
}
