//! Shopping plan command

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use larder_core::import::parse_weight_override;
use larder_core::{Category, Engine, PlanRequest, ShoppingPlan};

use super::{print_json, read_catalog, read_prices, read_purchases, truncate};

/// Inputs for `larder plan`, as given on the command line
pub struct PlanArgs<'a> {
    pub budget: f64,
    pub household: u32,
    pub catalog: &'a Path,
    pub purchases: Option<&'a Path>,
    pub prices: Option<&'a Path>,
    pub weights: &'a [String],
}

/// Sum repeated `--weight` deltas per category
pub fn parse_weight_args(weights: &[String]) -> Result<BTreeMap<Category, f64>> {
    let mut overrides = BTreeMap::new();
    for arg in weights {
        let (category, delta) =
            parse_weight_override(arg).with_context(|| format!("Invalid --weight {}", arg))?;
        *overrides.entry(category).or_insert(0.0) += delta;
    }
    Ok(overrides)
}

/// Build the plan without printing it
pub fn build_plan(engine: &Engine, args: &PlanArgs<'_>, today: NaiveDate) -> Result<ShoppingPlan> {
    if !args.budget.is_finite() {
        anyhow::bail!("Budget must be a number");
    }

    let mut request = PlanRequest::new(args.budget, read_catalog(args.catalog)?, today);
    request.household_size = args.household;
    request.weight_overrides = parse_weight_args(args.weights)?;
    if let Some(path) = args.purchases {
        request.purchases = read_purchases(path)?;
    }
    if let Some(path) = args.prices {
        request.prices = read_prices(path)?;
    }

    Ok(engine.orchestrator().plan(&request))
}

pub fn cmd_plan(engine: &Engine, args: &PlanArgs<'_>, today: NaiveDate, json: bool) -> Result<()> {
    let plan = build_plan(engine, args, today)?;

    if json {
        return print_json(&plan);
    }

    println!();
    println!("🛒 Shopping Plan for {}", plan.generated_for);
    println!(
        "   Budget: ${:.2}   Household: {}",
        plan.budget, plan.household_size
    );
    println!("   ─────────────────────────────────────────────────────────────────────");

    if plan.items.is_empty() {
        println!("   Nothing fits this budget.");
    } else {
        println!(
            "   {:24} │ {:14} │ {:>8} │ {:>8} │ {:>5} │ {}",
            "Item", "Category", "Qty", "Cost", "Score", "Note"
        );
        println!("   ─────────────────────────┼────────────────┼──────────┼──────────┼───────┼──────");
        for item in &plan.items {
            let rec = &item.recommendation;
            let marker = if rec.is_new { "✨ " } else { "" };
            let note = match &item.price_analysis {
                Some(analysis) if analysis.is_good_deal => "💰 good deal".to_string(),
                Some(analysis) => analysis.trend.to_string(),
                None => "no price data".to_string(),
            };
            println!(
                "   {:24} │ {:14} │ {:>5} {:<2} │ {:>8.2} │ {:>5.2} │ {}",
                format!("{}{}", marker, truncate(&rec.item_name, 21)),
                rec.category.label(),
                rec.quantity,
                rec.unit.as_str(),
                rec.estimated_cost(),
                rec.priority_score,
                note
            );
        }
    }

    println!("   ─────────────────────────────────────────────────────────────────────");
    println!(
        "   Total: ${:.2}   Remaining: ${:.2}",
        plan.total_cost, plan.remaining_budget
    );

    let due: Vec<_> = plan
        .restock
        .iter()
        .filter(|f| f.urgency.priority() >= 3)
        .collect();
    if !due.is_empty() {
        println!();
        println!("🔁 Due for restock");
        for forecast in due {
            println!(
                "   {:24} {:8} {}",
                truncate(&forecast.item_name, 24),
                forecast.urgency.as_str(),
                forecast.predicted_date
            );
        }
    }

    if !plan.expiration_alerts.is_empty() {
        println!();
        println!("⏰ Use soon");
        for alert in &plan.expiration_alerts {
            println!("   {}", alert.message);
        }
    }

    Ok(())
}
