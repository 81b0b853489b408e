//! Category Allocation Planner
//!
//! Splits a grocery budget across categories by weight, then fills each
//! category with the highest-priority catalog items that fit. Items the
//! household has not bought recently get a priority boost so lists vary
//! from week to week.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::PlannerConfig;
use crate::error::{Error, Result};
use crate::models::{normalize_key, CatalogItem, Category};
use crate::stats::clamp_unit;

use super::types::Recommendation;

/// A candidate with its score and purchase quantity worked out
#[derive(Debug, Clone)]
struct ScoredCandidate {
    recommendation: Recommendation,
    category_weight: f64,
}

impl ScoredCandidate {
    fn cost(&self) -> f64 {
        self.recommendation.estimated_cost()
    }
}

/// New items first, then priority descending, then cheaper first, then
/// heavier category first
fn compare_candidates(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    let (ra, rb) = (&a.recommendation, &b.recommendation);
    rb.is_new
        .cmp(&ra.is_new)
        .then_with(|| rb.priority_score.total_cmp(&ra.priority_score))
        .then_with(|| ra.estimated_unit_price.total_cmp(&rb.estimated_unit_price))
        .then_with(|| b.category_weight.total_cmp(&a.category_weight))
        .then_with(|| ra.item_name.cmp(&rb.item_name))
}

/// Budget planner over catalog candidates
#[derive(Debug, Clone, Default)]
pub struct CategoryAllocationPlanner {
    config: PlannerConfig,
}

impl CategoryAllocationPlanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Apply additive overrides to the default weight table and renormalize
    /// so the weights sum to 1. Weights pushed below zero become zero.
    pub fn normalize_weights(&self, overrides: &BTreeMap<Category, f64>) -> BTreeMap<Category, f64> {
        let mut weights = self.config.default_weights.clone();
        for (category, delta) in overrides {
            if !delta.is_finite() {
                warn!(category = category.as_str(), "Ignoring non-finite weight override");
                continue;
            }
            let weight = weights.entry(*category).or_insert(0.0);
            *weight = (*weight + delta).max(0.0);
        }

        let total: f64 = weights.values().sum();
        if total > 0.0 {
            return weights.into_iter().map(|(c, w)| (c, w / total)).collect();
        }

        warn!("All category weights are zero after overrides, using defaults");
        let defaults = &self.config.default_weights;
        let default_total: f64 = defaults.values().map(|w| w.max(0.0)).sum();
        if default_total <= 0.0 {
            return BTreeMap::new();
        }
        defaults
            .iter()
            .map(|(c, w)| (*c, w.max(0.0) / default_total))
            .collect()
    }

    /// Build a shopping list that fits `budget`.
    ///
    /// Never fails: an empty catalog or non-positive budget yields an empty
    /// list.
    pub fn allocate(
        &self,
        budget: f64,
        household_size: u32,
        weight_overrides: &BTreeMap<Category, f64>,
        candidates: &[CatalogItem],
        recently_purchased: &[String],
    ) -> Vec<Recommendation> {
        if !budget.is_finite() || budget <= 0.0 {
            debug!(budget, "Non-positive budget, nothing to allocate");
            return Vec::new();
        }
        if candidates.is_empty() {
            debug!("Empty catalog, nothing to allocate");
            return Vec::new();
        }

        let weights = self.normalize_weights(weight_overrides);
        let max_weight = weights.values().copied().fold(0.0, f64::max);
        if max_weight <= 0.0 {
            return Vec::new();
        }

        let recent: HashSet<String> = recently_purchased.iter().map(|n| normalize_key(n)).collect();
        let quantity_scale =
            1.0 + self.config.household_scale_step * (household_size.max(1) - 1) as f64;

        // Catalog position of each candidate within its category
        let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
        let positioned: Vec<(&CatalogItem, usize)> = candidates
            .iter()
            .map(|item| {
                let count = counts.entry(item.category).or_insert(0);
                let position = *count;
                *count += 1;
                (item, position)
            })
            .collect();

        let scored: Vec<Option<ScoredCandidate>> = positioned
            .par_iter()
            .map(|(item, position)| {
                let count = counts.get(&item.category).copied().unwrap_or(1);
                self.score(item, *position, count, &weights, max_weight, &recent, quantity_scale)
            })
            .collect();

        let mut by_category: BTreeMap<Category, Vec<ScoredCandidate>> = BTreeMap::new();
        for candidate in scored.into_iter().flatten() {
            by_category
                .entry(candidate.recommendation.category)
                .or_default()
                .push(candidate);
        }

        let mut accepted = Vec::new();
        for (category, mut items) in by_category {
            let weight = weights.get(&category).copied().unwrap_or(0.0);
            items.sort_by(compare_candidates);
            accepted.extend(self.fill_category(category, weight * budget, items));
        }

        accepted.sort_by(compare_candidates);

        let limit = budget + self.config.global_tolerance;
        let mut total = 0.0;
        let mut recommendations = Vec::with_capacity(accepted.len());
        for candidate in accepted {
            let cost = candidate.cost();
            if total + cost > limit {
                debug!(
                    item = %candidate.recommendation.item_name,
                    cost,
                    running_total = total,
                    "Skipping item over overall budget"
                );
                continue;
            }
            total += cost;
            recommendations.push(candidate.recommendation);
        }

        info!(
            budget,
            household_size,
            items = recommendations.len(),
            total_cost = total,
            "Allocated shopping list"
        );

        recommendations
    }

    /// Same as [`allocate`](Self::allocate) but an empty catalog is an error
    pub fn allocate_strict(
        &self,
        budget: f64,
        household_size: u32,
        weight_overrides: &BTreeMap<Category, f64>,
        candidates: &[CatalogItem],
        recently_purchased: &[String],
    ) -> Result<Vec<Recommendation>> {
        if candidates.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        Ok(self.allocate(
            budget,
            household_size,
            weight_overrides,
            candidates,
            recently_purchased,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn score(
        &self,
        item: &CatalogItem,
        position: usize,
        count: usize,
        weights: &BTreeMap<Category, f64>,
        max_weight: f64,
        recent: &HashSet<String>,
        quantity_scale: f64,
    ) -> Option<ScoredCandidate> {
        let weight = weights.get(&item.category).copied().unwrap_or(0.0);
        if weight <= 0.0 {
            return None;
        }
        if !item.average_price.is_finite() || item.average_price <= 0.0 {
            debug!(item = %item.name, price = item.average_price, "Skipping candidate without a usable price");
            return None;
        }

        let order_score = 1.0 - 0.5 * (position as f64 / count.max(1) as f64);
        let base = 0.5 * order_score + 0.5 * (weight / max_weight);
        let is_new = !recent.contains(&normalize_key(&item.name));
        let boost = if is_new { self.config.new_item_boost } else { 1.0 };

        Some(ScoredCandidate {
            recommendation: Recommendation {
                item_id: item.id.clone(),
                item_name: item.name.clone(),
                category: item.category,
                quantity: item.unit.round_quantity(quantity_scale),
                unit: item.unit,
                estimated_unit_price: item.average_price,
                priority_score: clamp_unit(base * boost),
                is_new,
            },
            category_weight: weight,
        })
    }

    /// Accept items in order while they fit the category allowance
    fn fill_category(
        &self,
        category: Category,
        sub_budget: f64,
        items: Vec<ScoredCandidate>,
    ) -> Vec<ScoredCandidate> {
        let tolerance =
            (sub_budget * self.config.category_tolerance_ratio).max(self.config.category_tolerance_min);
        let allowance = sub_budget + tolerance;

        let mut spent = 0.0;
        let mut accepted = Vec::new();
        for candidate in items {
            if accepted.len() >= self.config.max_items_per_category || spent >= allowance {
                break;
            }
            let cost = candidate.cost();
            if spent + cost > allowance {
                debug!(
                    item = %candidate.recommendation.item_name,
                    category = category.as_str(),
                    cost,
                    remaining = allowance - spent,
                    "Item does not fit category budget"
                );
                continue;
            }
            spent += cost;
            accepted.push(candidate);
        }

        debug!(
            category = category.as_str(),
            sub_budget,
            spent,
            items = accepted.len(),
            "Filled category"
        );
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Unit;

    fn item(id: &str, name: &str, category: Category, price: f64) -> CatalogItem {
        CatalogItem::new(id, name, category, Unit::Each, price)
    }

    fn no_overrides() -> BTreeMap<Category, f64> {
        BTreeMap::new()
    }

    fn sample_catalog() -> Vec<CatalogItem> {
        vec![
            item("p1", "Bananas", Category::Produce, 1.5),
            item("p2", "Spinach", Category::Produce, 3.0),
            item("p3", "Apples", Category::Produce, 4.0),
            item("d1", "Milk", Category::Dairy, 3.5),
            item("d2", "Eggs", Category::Dairy, 4.0),
            item("d3", "Cheese", Category::Dairy, 6.0),
            item("m1", "Chicken Breast", Category::MeatSeafood, 9.0),
            item("m2", "Salmon", Category::MeatSeafood, 12.0),
            item("n1", "Rice", Category::Pantry, 5.0),
            item("n2", "Pasta", Category::Pantry, 2.0),
            item("b1", "Coffee", Category::Beverages, 10.0),
            item("b2", "Orange Juice", Category::Beverages, 4.5),
        ]
    }

    fn total_cost(recs: &[Recommendation]) -> f64 {
        recs.iter().map(|r| r.estimated_cost()).sum()
    }

    #[test]
    fn test_default_weights_normalized() {
        let planner = CategoryAllocationPlanner::new();
        let weights = planner.normalize_weights(&no_overrides());
        let total: f64 = weights.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!((weights[&Category::Produce] - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_override_renormalizes() {
        let planner = CategoryAllocationPlanner::new();
        for (category, delta) in [
            (Category::Produce, 0.3),
            (Category::Dairy, -0.5),
            (Category::Snacks, 0.1),
            (Category::Beverages, -0.05),
        ] {
            let weights = planner.normalize_weights(&BTreeMap::from([(category, delta)]));
            let total: f64 = weights.values().sum();
            assert!((total - 1.0).abs() < 1e-9, "{:?} {}", category, delta);
            assert!(weights.values().all(|w| *w >= 0.0));
        }

        let weights = planner.normalize_weights(&BTreeMap::from([(Category::Dairy, -1.0)]));
        assert_eq!(weights[&Category::Dairy], 0.0);
    }

    #[test]
    fn test_all_zero_weights_fall_back_to_defaults() {
        let planner = CategoryAllocationPlanner::new();
        let overrides: BTreeMap<Category, f64> =
            Category::all().iter().map(|c| (*c, -1.0)).collect();
        let weights = planner.normalize_weights(&overrides);
        assert!((weights[&Category::Pantry] - 0.20).abs() < 1e-9);
    }

    #[test]
    fn test_zero_budget_is_empty() {
        let planner = CategoryAllocationPlanner::new();
        let recs = planner.allocate(0.0, 1, &no_overrides(), &sample_catalog(), &[]);
        assert!(recs.is_empty());
        let recs = planner.allocate(-5.0, 1, &no_overrides(), &sample_catalog(), &[]);
        assert!(recs.is_empty());
    }

    #[test]
    fn test_empty_catalog() {
        let planner = CategoryAllocationPlanner::new();
        assert!(planner.allocate(50.0, 1, &no_overrides(), &[], &[]).is_empty());
        let err = planner
            .allocate_strict(50.0, 1, &no_overrides(), &[], &[])
            .unwrap_err();
        assert!(matches!(err, Error::EmptyCatalog));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_budget_respected_and_categories_covered() {
        let planner = CategoryAllocationPlanner::new();
        let recs = planner.allocate(100.0, 1, &no_overrides(), &sample_catalog(), &[]);

        assert!(total_cost(&recs) <= 102.0);
        for category in [
            Category::Produce,
            Category::Dairy,
            Category::MeatSeafood,
            Category::Pantry,
            Category::Beverages,
        ] {
            assert!(recs.iter().any(|r| r.category == category), "{:?}", category);
        }
        assert!(recs.iter().all(|r| r.quantity > 0.0 && r.estimated_unit_price > 0.0));
        assert!(recs.iter().all(|r| (0.0..=1.0).contains(&r.priority_score)));
    }

    #[test]
    fn test_new_items_ordered_first() {
        let planner = CategoryAllocationPlanner::new();
        let catalog = vec![
            item("d1", "Milk", Category::Dairy, 3.0),
            item("d2", "Yogurt", Category::Dairy, 3.0),
        ];
        let recs = planner.allocate(100.0, 1, &no_overrides(), &catalog, &["  milk".to_string()]);

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].item_name, "Yogurt");
        assert!(recs[0].is_new);
        assert!(!recs[1].is_new);
    }

    #[test]
    fn test_output_order_is_priority_descending_within_group() {
        let planner = CategoryAllocationPlanner::new();
        let recs = planner.allocate(200.0, 1, &no_overrides(), &sample_catalog(), &[]);
        for pair in recs.windows(2) {
            if pair[0].is_new == pair[1].is_new {
                assert!(pair[0].priority_score >= pair[1].priority_score);
            }
        }
    }

    #[test]
    fn test_household_scales_quantity() {
        let planner = CategoryAllocationPlanner::new();
        let catalog = vec![
            CatalogItem::new("d1", "Milk", Category::Dairy, Unit::Gallon, 3.5),
            CatalogItem::new("p1", "Apples", Category::Produce, Unit::Pound, 2.0),
            CatalogItem::new("n1", "Pasta", Category::Pantry, Unit::Each, 2.0),
        ];
        let recs = planner.allocate(200.0, 4, &no_overrides(), &catalog, &[]);
        let quantity = |name: &str| recs.iter().find(|r| r.item_name == name).unwrap().quantity;

        // scale = 1.6
        assert_eq!(quantity("Milk"), 1.5);
        assert_eq!(quantity("Apples"), 1.5);
        assert_eq!(quantity("Pasta"), 2.0);

        let single = planner.allocate(200.0, 0, &no_overrides(), &catalog, &[]);
        assert!(single.iter().all(|r| r.quantity == 1.0));
    }

    #[test]
    fn test_max_items_per_category() {
        let planner = CategoryAllocationPlanner::new();
        let catalog: Vec<CatalogItem> = (0..10)
            .map(|i| item(&format!("p{}", i), &format!("Veg {}", i), Category::Produce, 1.0))
            .collect();
        let recs = planner.allocate(500.0, 1, &no_overrides(), &catalog, &[]);
        assert_eq!(recs.len(), 5);
    }

    #[test]
    fn test_category_walk_skips_items_that_do_not_fit() {
        let planner = CategoryAllocationPlanner::new();
        // Beverages gets 15% of $20 = $3, allowance max(0.3, 3) + 3 = $6
        let catalog = vec![
            item("b1", "Sparkling Water", Category::Beverages, 4.0),
            item("b2", "Craft Soda Case", Category::Beverages, 20.0),
            item("b3", "Tea", Category::Beverages, 2.0),
        ];
        let recs = planner.allocate(20.0, 1, &no_overrides(), &catalog, &[]);
        let names: Vec<&str> = recs.iter().map(|r| r.item_name.as_str()).collect();
        assert_eq!(names, vec!["Sparkling Water", "Tea"]);
    }

    #[test]
    fn test_global_pass_keeps_later_items_that_fit() {
        let planner = CategoryAllocationPlanner::new();
        // Each category alone fits its allowance; together they overshoot
        // $10 + $2. Berries would cross the limit and is dropped, while the
        // recurring Salt ordered after it still fits.
        let catalog = vec![
            item("p1", "Berries", Category::Produce, 5.0),
            item("d1", "Cheese", Category::Dairy, 4.5),
            item("m1", "Tuna", Category::MeatSeafood, 4.0),
            item("n1", "Salt", Category::Pantry, 1.0),
        ];
        let recs = planner.allocate(10.0, 1, &no_overrides(), &catalog, &["Salt".to_string()]);
        let names: Vec<&str> = recs.iter().map(|r| r.item_name.as_str()).collect();

        assert_eq!(names, vec!["Tuna", "Cheese", "Salt"]);
        assert!(total_cost(&recs) <= 12.0);
    }

    #[test]
    fn test_zero_weight_category_skipped() {
        let planner = CategoryAllocationPlanner::new();
        let overrides = BTreeMap::from([(Category::Beverages, -1.0)]);
        let recs = planner.allocate(100.0, 1, &overrides, &sample_catalog(), &[]);
        assert!(recs.iter().all(|r| r.category != Category::Beverages));

        // Categories without a default weight get nothing unless overridden
        let catalog = vec![item("s1", "Chips", Category::Snacks, 3.0)];
        assert!(planner.allocate(100.0, 1, &no_overrides(), &catalog, &[]).is_empty());
        let boosted = BTreeMap::from([(Category::Snacks, 0.2)]);
        assert_eq!(planner.allocate(100.0, 1, &boosted, &catalog, &[]).len(), 1);
    }

    #[test]
    fn test_unusable_prices_skipped() {
        let planner = CategoryAllocationPlanner::new();
        let catalog = vec![
            item("p1", "Free Sample", Category::Produce, 0.0),
            item("p2", "Mystery", Category::Produce, f64::NAN),
            item("p3", "Kale", Category::Produce, 2.5),
        ];
        let recs = planner.allocate(50.0, 1, &no_overrides(), &catalog, &[]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].item_name, "Kale");
    }
}
