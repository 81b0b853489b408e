//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Larder - Plan grocery shopping around a budget
#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "Grocery forecasting and budget allocation", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Engine config file (defaults to the data-dir override, then built-in values)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Date to plan for, YYYY-MM-DD (defaults to today)
    #[arg(long, global = true)]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a shopping list that fits a budget
    Plan {
        /// Total budget in dollars
        #[arg(short, long)]
        budget: f64,

        /// People in the household
        #[arg(long, default_value = "1")]
        household: u32,

        /// Catalog snapshot (JSON)
        #[arg(long)]
        catalog: PathBuf,

        /// Purchase history (CSV: date,item,category,quantity,price,store)
        #[arg(long)]
        purchases: Option<PathBuf>,

        /// Price history (CSV: date,item,price,store)
        #[arg(long)]
        prices: Option<PathBuf>,

        /// Category weight delta, e.g. Produce=+0.1 (repeatable)
        #[arg(short, long = "weight")]
        weights: Vec<String>,
    },

    /// Judge a price against an item's history
    Price {
        /// Item name
        #[arg(short, long)]
        item: String,

        /// Price being considered
        #[arg(short, long)]
        current: f64,

        /// Price history (CSV: date,item,price,store)
        #[arg(long)]
        prices: PathBuf,
    },

    /// Forecast the next purchase of an item
    Next {
        /// Item name
        #[arg(short, long)]
        item: String,

        /// Category, used for the default interval when history is short
        #[arg(long)]
        category: Option<String>,

        /// Purchase history (CSV: date,item,category,quantity,price,store)
        #[arg(long)]
        purchases: PathBuf,
    },

    /// List everything in the purchase history by how soon it needs buying
    Restock {
        /// Purchase history (CSV: date,item,category,quantity,price,store)
        #[arg(long)]
        purchases: PathBuf,
    },

    /// Predict when a purchased item expires
    Expire {
        /// Item name
        #[arg(short, long)]
        item: String,

        /// Category, used when the item is not in the shelf-life table
        #[arg(long)]
        category: Option<String>,

        /// Purchase date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Storage location: fridge, freezer, pantry
        #[arg(long, default_value = "fridge")]
        storage: String,

        /// Package type: fresh, packaged, frozen, canned
        #[arg(long, default_value = "fresh")]
        package: String,
    },

    /// Show the effective engine configuration
    Config,
}
