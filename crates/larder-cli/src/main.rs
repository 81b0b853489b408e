//! Larder CLI - Grocery forecasting and budget allocation
//!
//! Usage:
//!   larder plan --budget 100 --catalog catalog.json   Build a shopping list
//!   larder price --item Milk --current 3.49 --prices prices.csv
//!   larder restock --purchases purchases.csv          What needs buying soon
//!   larder expire --item "Chicken Breast" --storage freezer

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let engine = commands::load_engine(cli.config.as_deref())?;
    let today = commands::resolve_today(cli.today.as_deref())?;

    match cli.command {
        Commands::Plan {
            budget,
            household,
            catalog,
            purchases,
            prices,
            weights,
        } => {
            let args = commands::PlanArgs {
                budget,
                household,
                catalog: &catalog,
                purchases: purchases.as_deref(),
                prices: prices.as_deref(),
                weights: &weights,
            };
            commands::cmd_plan(&engine, &args, today, cli.json)
        }
        Commands::Price {
            item,
            current,
            prices,
        } => commands::cmd_price(&engine, &item, current, &prices, cli.json),
        Commands::Next {
            item,
            category,
            purchases,
        } => commands::cmd_next(
            &engine,
            &item,
            category.as_deref(),
            &purchases,
            today,
            cli.json,
        ),
        Commands::Restock { purchases } => {
            commands::cmd_restock(&engine, &purchases, today, cli.json)
        }
        Commands::Expire {
            item,
            category,
            date,
            storage,
            package,
        } => {
            let args = commands::ExpireArgs {
                item: &item,
                category: category.as_deref(),
                date: date.as_deref(),
                storage: &storage,
                package: &package,
            };
            commands::cmd_expire(&engine, &args, today, cli.json)
        }
        Commands::Config => commands::cmd_config(&engine),
    }
}
