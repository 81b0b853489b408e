//! Integration tests for larder-core
//!
//! These tests exercise the import → plan workflow and the engine-wide
//! guarantees on budgets, ordering, confidence and shelf life.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use larder_core::{
    import::{parse_catalog_json, parse_prices_csv, parse_purchases_csv},
    CatalogItem, Category, Engine, EngineConfig, ExpirationForecaster, ExpirationStatus,
    PackageType, PlanRequest, PriceTrend, PriceTrendAnalyzer, PurchaseCadencePredictor,
    StorageLocation, Unit, Urgency,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A small weekly-shop catalog covering the five default categories
fn catalog_json() -> &'static str {
    r#"[
    {"id": "p1", "name": "Bananas", "category": "Produce", "unit": "lb", "average_price": 0.65},
    {"id": "p2", "name": "Baby Spinach", "category": "Produce", "unit": "each", "average_price": 3.99},
    {"id": "p3", "name": "Honeycrisp Apples", "category": "Produce", "unit": "lb", "average_price": 2.49},
    {"id": "p4", "name": "Avocados", "category": "Produce", "unit": "each", "average_price": 1.25},
    {"id": "d1", "name": "Milk", "category": "Dairy", "unit": "gal", "average_price": 3.79},
    {"id": "d2", "name": "Eggs", "category": "Dairy", "unit": "dozen", "average_price": 3.49},
    {"id": "d3", "name": "Greek Yogurt", "category": "Dairy", "unit": "each", "average_price": 5.29},
    {"id": "m1", "name": "Chicken Breast", "category": "Meat & Seafood", "unit": "lb", "average_price": 4.99},
    {"id": "m2", "name": "Salmon Fillet", "category": "Meat & Seafood", "unit": "lb", "average_price": 10.99},
    {"id": "m3", "name": "Ground Beef", "category": "Meat & Seafood", "unit": "lb", "average_price": 5.49},
    {"id": "n1", "name": "Jasmine Rice", "category": "Pantry", "unit": "each", "average_price": 6.49},
    {"id": "n2", "name": "Pasta", "category": "Pantry", "unit": "each", "average_price": 1.79},
    {"id": "n3", "name": "Peanut Butter", "category": "Pantry", "unit": "each", "average_price": 3.99},
    {"id": "b1", "name": "Orange Juice", "category": "Beverages", "unit": "each", "average_price": 4.29},
    {"id": "b2", "name": "Coffee", "category": "Beverages", "unit": "each", "average_price": 8.99}
]"#
}

fn catalog() -> Vec<CatalogItem> {
    parse_catalog_json(catalog_json().as_bytes()).expect("catalog parses")
}

fn weekly_milk_csv(start: NaiveDate, cycles: i64) -> String {
    let mut csv = String::from("date,item,category,quantity,price,store\n");
    for i in 0..=cycles {
        let day = start + Duration::days(7 * i);
        csv.push_str(&format!("{},Milk,Dairy,1,3.79,FreshMart\n", day.format("%Y-%m-%d")));
    }
    csv
}

fn total_cost(recs: &[larder_core::Recommendation]) -> f64 {
    recs.iter().map(|r| r.estimated_cost()).sum()
}

// =============================================================================
// Allocation
// =============================================================================

#[test]
fn test_scenario_default_budget_no_history() {
    let engine = Engine::default();
    let catalog = catalog();
    let recs = engine
        .planner()
        .allocate(100.0, 1, &BTreeMap::new(), &catalog, &[]);

    assert!(total_cost(&recs) <= 102.0, "total {}", total_cost(&recs));
    for category in [
        Category::Produce,
        Category::Dairy,
        Category::MeatSeafood,
        Category::Pantry,
        Category::Beverages,
    ] {
        assert!(
            recs.iter().any(|r| r.category == category),
            "no {:?} recommendation",
            category
        );
    }
    // No history means every item counts as new
    assert!(recs.iter().all(|r| r.is_new));
}

#[test]
fn test_scenario_zero_budget() {
    let engine = Engine::default();
    let recs = engine
        .planner()
        .allocate(0.0, 3, &BTreeMap::new(), &catalog(), &[]);
    assert!(recs.is_empty());
}

#[test]
fn test_budget_bound_across_budgets_and_households() {
    let engine = Engine::default();
    let catalog = catalog();
    let tolerance = engine.config().planner.global_tolerance;

    for budget in [5.0, 12.5, 25.0, 40.0, 75.0, 150.0, 400.0] {
        for household in 0..6 {
            let recs = engine
                .planner()
                .allocate(budget, household, &BTreeMap::new(), &catalog, &["Milk".into()]);
            assert!(
                total_cost(&recs) <= budget + tolerance + 1e-9,
                "budget {} household {} total {}",
                budget,
                household,
                total_cost(&recs)
            );
            for rec in &recs {
                assert!(rec.quantity > 0.0);
                assert!(rec.estimated_unit_price > 0.0);
            }
        }
    }
}

#[test]
fn test_weight_normalization_after_single_override() {
    let engine = Engine::default();
    for category in Category::all() {
        for delta in [-1.0, -0.2, -0.01, 0.0, 0.05, 0.3, 2.0] {
            let weights = engine
                .planner()
                .normalize_weights(&BTreeMap::from([(*category, delta)]));
            let total: f64 = weights.values().sum();
            assert!(
                (total - 1.0).abs() <= 1e-9,
                "{:?} {} -> {}",
                category,
                delta,
                total
            );
        }
    }
}

#[test]
fn test_unpurchased_item_ordered_before_equal_purchased_item() {
    let engine = Engine::default();
    let catalog = vec![
        CatalogItem::new("a", "Oat Milk", Category::Dairy, Unit::Each, 4.0),
        CatalogItem::new("b", "Almond Milk", Category::Dairy, Unit::Each, 4.0),
    ];

    // Whichever of the two was bought recently is listed second
    for recent in ["Oat Milk", "Almond Milk"] {
        let recs = engine
            .planner()
            .allocate(50.0, 1, &BTreeMap::new(), &catalog, &[recent.to_string()]);
        assert_eq!(recs.len(), 2);
        assert_ne!(recs[0].item_name, recent);
        assert_eq!(recs[1].item_name, recent);
    }
}

// =============================================================================
// Cadence
// =============================================================================

#[test]
fn test_scenario_weekly_milk() {
    let start = date(2026, 3, 1);
    let purchases = parse_purchases_csv(weekly_milk_csv(start, 8).as_bytes()).unwrap();
    assert_eq!(purchases.len(), 9);

    let last = start + Duration::days(56);
    let predictor = PurchaseCadencePredictor::new();

    let forecast = predictor.predict_next_purchase_at("Milk", Category::Dairy, &purchases, last);
    assert!(forecast.confidence >= 0.9);
    assert_eq!(forecast.predicted_date, last + Duration::days(7));
    assert_eq!(forecast.days_until, 7);
    assert_eq!(forecast.urgency, Urgency::Soon);

    let next_day = predictor.predict_next_purchase_at(
        "Milk",
        Category::Dairy,
        &purchases,
        last + Duration::days(6),
    );
    assert_eq!(next_day.urgency, Urgency::Urgent);
}

#[test]
fn test_confidence_monotone_in_variance() {
    let predictor = PurchaseCadencePredictor::new();
    let start = date(2026, 4, 6);

    // Mean interval stays at 10 days while the spread grows
    let mut previous = f64::INFINITY;
    for spread in 0..=9 {
        let gaps = [10 - spread, 10 + spread, 10 - spread, 10 + spread];
        let mut csv = String::from("date,item,price\n");
        let mut day = start;
        csv.push_str(&format!("{},Eggs,3.49\n", day));
        for gap in gaps {
            day += Duration::days(gap);
            csv.push_str(&format!("{},Eggs,3.49\n", day));
        }
        let purchases = parse_purchases_csv(csv.as_bytes()).unwrap();

        let confidence = predictor
            .predict_next_purchase_at("Eggs", Category::Dairy, &purchases, day)
            .confidence;
        assert!(confidence <= previous, "spread {} gave {}", spread, confidence);
        assert!((0.0..=1.0).contains(&confidence));
        previous = confidence;
    }
}

// =============================================================================
// Pricing
// =============================================================================

#[test]
fn test_scenario_flat_price_history() {
    let mut csv = String::from("date,item,price,store\n");
    let start = date(2026, 2, 1);
    for i in 0..30 {
        csv.push_str(&format!("{},Milk,3.50,FreshMart\n", start + Duration::days(i)));
    }
    let prices = parse_prices_csv(csv.as_bytes()).unwrap();

    let analysis = PriceTrendAnalyzer::new()
        .analyze_price("Milk", 3.5, &prices)
        .unwrap();
    assert!(!analysis.is_good_deal);
    assert_eq!(analysis.price_score, 1.0);
    assert_eq!(analysis.trend, PriceTrend::Stable);
    assert_eq!(analysis.trend.as_str(), "stable");
}

#[test]
fn test_price_at_observed_max_is_not_a_deal() {
    let csv = "date,item,price
2026-02-01,Coffee,7.99
2026-02-08,Coffee,8.49
2026-02-15,Coffee,9.99
2026-02-22,Coffee,8.99";
    let prices = parse_prices_csv(csv.as_bytes()).unwrap();

    let analysis = PriceTrendAnalyzer::new()
        .analyze_price("coffee", 9.99, &prices)
        .unwrap();
    assert!(!analysis.is_good_deal);
    assert_eq!(analysis.price_score, 0.0);
}

#[test]
fn test_missing_price_history_is_recoverable() {
    let err = PriceTrendAnalyzer::new()
        .analyze_price("Saffron", 12.0, &[])
        .unwrap_err();
    assert!(err.is_recoverable());
}

// =============================================================================
// Expiration
// =============================================================================

#[test]
fn test_scenario_frozen_chicken() {
    let forecaster = ExpirationForecaster::new();
    let today = date(2026, 3, 10);

    let frozen = forecaster.predict_expiration_at(
        "Chicken Breast",
        Some(Category::MeatSeafood),
        today,
        StorageLocation::Freezer,
        PackageType::Frozen,
        today,
    );
    let baseline = forecaster.adjusted_shelf_life(
        "Chicken Breast",
        Some(Category::MeatSeafood),
        StorageLocation::Fridge,
        PackageType::Fresh,
    );

    assert!(frozen.shelf_life_days >= 12 * baseline);
    assert_eq!(frozen.status, ExpirationStatus::Fresh);
    assert_eq!(
        frozen.expiration_date,
        today + Duration::days(frozen.shelf_life_days as i64)
    );
}

#[test]
fn test_freezing_never_shortens_shelf_life() {
    let forecaster = ExpirationForecaster::new();
    let names: Vec<String> = forecaster
        .table()
        .entries()
        .map(|(name, _)| name.to_string())
        .collect();
    assert!(!names.is_empty());

    for name in &names {
        for package in [
            PackageType::Fresh,
            PackageType::Packaged,
            PackageType::Frozen,
            PackageType::Canned,
        ] {
            let fridge =
                forecaster.adjusted_shelf_life(name, None, StorageLocation::Fridge, package);
            let freezer =
                forecaster.adjusted_shelf_life(name, None, StorageLocation::Freezer, package);
            assert!(freezer >= fridge, "{} {:?}: {} < {}", name, package, freezer, fridge);
        }
    }
}

#[test]
fn test_tracked_item_lifecycle() {
    let forecaster = ExpirationForecaster::new();
    let bought = date(2026, 3, 1);

    let mut yogurt = forecaster.predict_expiration_at(
        "Yogurt",
        Some(Category::Dairy),
        bought,
        StorageLocation::Fridge,
        PackageType::Fresh,
        bought,
    );
    assert_eq!(yogurt.status, ExpirationStatus::Fresh);

    yogurt.refresh(yogurt.expiration_date + Duration::days(1));
    assert_eq!(yogurt.status, ExpirationStatus::Expired);

    yogurt.mark_wasted(date(2026, 3, 20)).unwrap();
    assert!(yogurt.mark_consumed(date(2026, 3, 21)).is_err());
    assert_eq!(yogurt.status_at(date(2026, 4, 1)), ExpirationStatus::Wasted);

    let summary = forecaster.waste_summary(&[yogurt]);
    assert_eq!(summary.wasted, 1);
    assert_eq!(summary.waste_rate, 1.0);
}

// =============================================================================
// End to end
// =============================================================================

#[test]
fn test_full_plan_workflow() {
    let today = date(2026, 4, 27);
    let purchases = parse_purchases_csv(weekly_milk_csv(date(2026, 3, 1), 8).as_bytes()).unwrap();
    let prices = parse_prices_csv(
        "date,item,price,store
2026-04-01,Coffee,9.49,FreshMart
2026-04-08,Coffee,8.99,BudgetGrocer
2026-04-15,Coffee,9.29,FreshMart"
            .as_bytes(),
    )
    .unwrap();

    let config = EngineConfig::parse("[planner]\nmax_items_per_category = 2").unwrap();
    let engine = Engine::new(config);

    let mut request = PlanRequest::new(80.0, catalog(), today);
    request.household_size = 2;
    request.purchases = purchases;
    request.prices = prices;
    request.weight_overrides = BTreeMap::from([(Category::Beverages, 0.1)]);

    let plan = engine.orchestrator().plan(&request);

    assert!(!plan.items.is_empty());
    assert!(plan.total_cost <= 82.0);
    assert!((plan.remaining_budget - (80.0 - plan.total_cost)).abs() < 1e-9);

    for category in Category::all() {
        let count = plan
            .items
            .iter()
            .filter(|i| i.recommendation.category == *category)
            .count();
        assert!(count <= 2);
    }

    // Milk was bought yesterday, so if it made the list it comes last
    if let Some(pos) = plan
        .items
        .iter()
        .position(|i| i.recommendation.item_name == "Milk")
    {
        assert_eq!(pos, plan.items.len() - 1);
        let milk = &plan.items[pos];
        assert!(!milk.recommendation.is_new);
        assert!(milk.price_analysis.is_some());
        assert!(milk.forecast.confidence >= 0.9);
    }

    if let Some(coffee) = plan
        .items
        .iter()
        .find(|i| i.recommendation.item_name == "Coffee")
    {
        let analysis = coffee.price_analysis.as_ref().unwrap();
        assert_eq!(analysis.best_store.as_deref(), Some("BudgetGrocer"));
    }

    assert_eq!(plan.restock.len(), 1);
    assert_eq!(plan.restock[0].item_name, "Milk");
}
