//! Purchase cadence commands (next, restock)

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;
use larder_core::{Category, Engine, PurchaseForecast, Urgency};

use super::{parse_category_arg, print_json, read_purchases, truncate};

fn urgency_icon(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::Overdue => "🔴",
        Urgency::Urgent => "🟠",
        Urgency::Soon => "🟡",
        Urgency::Planned => "🟢",
        Urgency::Future => "⚪",
    }
}

pub fn cmd_next(
    engine: &Engine,
    item: &str,
    category: Option<&str>,
    purchases_path: &Path,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let history = read_purchases(purchases_path)?;

    // Fall back to the category recorded with the purchases
    let category = match category {
        Some(label) => parse_category_arg(label)?,
        None => history
            .iter()
            .filter(|p| p.is_for(item))
            .find_map(|p| p.category)
            .unwrap_or(Category::Other),
    };

    let forecast = engine
        .cadence()
        .predict_next_purchase_at(item, category, &history, today);

    if json {
        return print_json(&forecast);
    }

    println!();
    println!("{} {}", urgency_icon(forecast.urgency), forecast.item_name);
    println!("   ─────────────────────────────");
    match forecast.last_purchase {
        Some(last) => println!("   Last bought:  {}", last),
        None => println!("   Last bought:  never"),
    }
    println!(
        "   Next:         {} ({}, {} days)",
        forecast.predicted_date, forecast.urgency, forecast.days_until
    );
    if forecast.is_fallback() {
        println!(
            "   Interval:     {:.0} days (default for {})",
            forecast.mean_interval_days,
            forecast.category.label()
        );
    } else {
        println!(
            "   Interval:     {:.1} days × {:.2} seasonal",
            forecast.mean_interval_days, forecast.seasonal_factor
        );
    }
    println!("   Confidence:   {:.0}%", forecast.confidence * 100.0);
    if let Some(quantity) = forecast.typical_quantity {
        println!("   Usually buy:  {}", quantity);
    }

    Ok(())
}

pub fn cmd_restock(engine: &Engine, purchases_path: &Path, today: NaiveDate, json: bool) -> Result<()> {
    let history = read_purchases(purchases_path)?;
    let forecasts: Vec<PurchaseForecast> = engine.cadence().restock_forecasts(&history, today);

    if json {
        return print_json(&forecasts);
    }

    println!();
    println!("🔁 Restock Forecast ({})", today);
    println!("   ─────────────────────────────────────────────────────────────");

    if forecasts.is_empty() {
        println!("   No purchase history yet.");
        return Ok(());
    }

    println!(
        "   {:24} │ {:10} │ {:>5} │ {:>5}",
        "Item", "Next", "Days", "Conf"
    );
    println!("   ─────────────────────────┼────────────┼───────┼──────");
    for forecast in &forecasts {
        println!(
            "   {} {:21} │ {:10} │ {:>5} │ {:>4.0}%",
            urgency_icon(forecast.urgency),
            truncate(&forecast.item_name, 21),
            forecast.predicted_date,
            forecast.days_until,
            forecast.confidence * 100.0
        );
    }

    let due = forecasts
        .iter()
        .filter(|f| matches!(f.urgency, Urgency::Overdue | Urgency::Urgent))
        .count();
    if due > 0 {
        println!();
        println!("⚠️  {} items due now", due);
    }

    Ok(())
}
