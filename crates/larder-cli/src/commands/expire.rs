//! Expiration command

use anyhow::{Context, Result};
use chrono::NaiveDate;
use larder_core::import::parse_date;
use larder_core::{Engine, ExpirationStatus, PackageType, StorageLocation};

use super::{parse_category_arg, print_json};

/// Arguments for `larder expire`
pub struct ExpireArgs<'a> {
    pub item: &'a str,
    pub category: Option<&'a str>,
    pub date: Option<&'a str>,
    pub storage: &'a str,
    pub package: &'a str,
}

pub fn cmd_expire(engine: &Engine, args: &ExpireArgs<'_>, today: NaiveDate, json: bool) -> Result<()> {
    let category = args.category.map(parse_category_arg).transpose()?;
    let purchase_date = match args.date {
        Some(s) => parse_date(s).context("Invalid --date (use YYYY-MM-DD)")?,
        None => today,
    };
    let storage: StorageLocation = args.storage.parse().map_err(anyhow::Error::msg)?;
    let package: PackageType = args.package.parse().map_err(anyhow::Error::msg)?;

    let forecast = engine.expiration().predict_expiration_at(
        args.item,
        category,
        purchase_date,
        storage,
        package,
        today,
    );

    if json {
        return print_json(&forecast);
    }

    let icon = match forecast.status {
        ExpirationStatus::Fresh => "🟢",
        ExpirationStatus::Moderate => "🟡",
        ExpirationStatus::UseSoon => "🟠",
        ExpirationStatus::Expired => "🔴",
        ExpirationStatus::Consumed | ExpirationStatus::Wasted => "⚪",
    };

    println!();
    println!("{} {}", icon, forecast.item_name);
    println!("   ─────────────────────────────");
    println!("   Bought:     {}", forecast.purchase_date);
    println!(
        "   Storage:    {} / {}",
        forecast.storage_location, forecast.package_type
    );
    println!("   Shelf life: {} days", forecast.shelf_life_days);
    println!("   Expires:    {}", forecast.expiration_date);
    println!(
        "   Status:     {} ({} days left)",
        forecast.status,
        forecast.days_remaining(today)
    );

    Ok(())
}
