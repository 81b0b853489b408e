//! Price check command

use std::path::Path;

use anyhow::Result;
use larder_core::{BestTimePrediction, Engine, Error, PriceAnalysis};
use serde::Serialize;

use super::{print_json, read_prices};

#[derive(Serialize)]
struct PriceReport {
    analysis: PriceAnalysis,
    best_time: BestTimePrediction,
}

pub fn cmd_price(
    engine: &Engine,
    item: &str,
    current: f64,
    prices_path: &Path,
    json: bool,
) -> Result<()> {
    let history = read_prices(prices_path)?;
    let analyzer = engine.pricing();

    let analysis = match analyzer.analyze_price(item, current, &history) {
        Ok(analysis) => analysis,
        Err(Error::InsufficientHistory(_)) => {
            if json {
                return print_json(&serde_json::json!({ "item": item, "analysis": null }));
            }
            println!("📭 No price data yet for {}", item);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let best_time = analyzer.best_time_to_buy(item, &history)?;

    if json {
        return print_json(&PriceReport {
            analysis,
            best_time,
        });
    }

    println!();
    println!("🏷️  {} at ${:.2}", analysis.item_name, analysis.current_price);
    println!("   ─────────────────────────────");
    println!(
        "   Average: ${:.2}   Median: ${:.2}",
        analysis.average_price, analysis.median_price
    );
    println!(
        "   Range:   ${:.2} - ${:.2} ({} samples)",
        analysis.min_price, analysis.max_price, analysis.sample_count
    );
    println!("   vs avg:  {:+.1}%", analysis.percent_vs_average);
    println!("   Trend:   {}", analysis.trend);
    println!("   Score:   {:.2}", analysis.price_score);
    if let Some(ref store) = analysis.best_store {
        println!("   Cheapest store: {}", store);
    }
    println!();
    if analysis.is_good_deal {
        println!("💰 {}", analysis.note);
    } else {
        println!("💡 {}", analysis.note);
    }

    println!();
    println!(
        "📅 Best day to buy: {} (avg ${:.2}, saves ~${:.2}, confidence {:.0}%)",
        best_time.best_day_of_week,
        best_time.best_day_average,
        best_time.estimated_savings,
        best_time.confidence * 100.0
    );

    Ok(())
}
