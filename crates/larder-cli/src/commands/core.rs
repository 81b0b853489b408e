//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `load_engine` - Shared utility to build the engine from config
//! - `resolve_today` and the snapshot readers used by every command
//! - `cmd_config` - Show the effective configuration

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use larder_core::import::{parse_catalog_json, parse_date, parse_prices_csv, parse_purchases_csv};
use larder_core::{
    CatalogItem, Category, Engine, EngineConfig, PriceObservation, PurchaseEvent,
};
use serde::Serialize;

/// Build the engine from an explicit config file or the default resolution
pub fn load_engine(config_path: Option<&Path>) -> Result<Engine> {
    let config = EngineConfig::load(config_path).context("Failed to load engine config")?;
    Ok(Engine::new(config))
}

/// The `--today` override, or the local date
pub fn resolve_today(today: Option<&str>) -> Result<NaiveDate> {
    match today {
        Some(s) => parse_date(s).context("Invalid --today date (use YYYY-MM-DD)"),
        None => Ok(Local::now().date_naive()),
    }
}

/// Parse a `--category` argument; unknown names are an error rather than `Other`
pub fn parse_category_arg(label: &str) -> Result<Category> {
    let category = Category::lookup(label);
    if category == Category::Other && !label.trim().eq_ignore_ascii_case("other") {
        anyhow::bail!(
            "Unknown category: {}. Available: {}",
            label,
            Category::all()
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(category)
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

pub fn read_catalog(path: &Path) -> Result<Vec<CatalogItem>> {
    parse_catalog_json(open(path)?)
        .with_context(|| format!("Failed to parse catalog {}", path.display()))
}

pub fn read_purchases(path: &Path) -> Result<Vec<PurchaseEvent>> {
    parse_purchases_csv(open(path)?)
        .with_context(|| format!("Failed to parse purchases {}", path.display()))
}

pub fn read_prices(path: &Path) -> Result<Vec<PriceObservation>> {
    parse_prices_csv(open(path)?)
        .with_context(|| format!("Failed to parse prices {}", path.display()))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

pub fn cmd_config(engine: &Engine) -> Result<()> {
    let rendered = engine
        .config()
        .to_toml()
        .context("Failed to render config")?;
    println!("{}", rendered.trim_end());
    Ok(())
}
