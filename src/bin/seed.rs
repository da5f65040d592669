//! Seed script for development: pushes a sample wine catalogue to the shop API.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires the `API_BASE_URL` environment variable (reads .env).

use anyhow::Context;
use chrono::{Duration, Utc};

use cellar_console::config::AppConfig;
use cellar_console::models::account::AccountDraft;
use cellar_console::models::category::{Category, CategoryDraft};
use cellar_console::models::discount::{DiscountEventDraft, DiscountOrderDraft};
use cellar_console::models::inventory::InventoryProductDraft;
use cellar_console::repository::{ListParams, Repositories};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().context("API_BASE_URL must be set")?;
    let http = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()?;
    let repos = Repositories::http(http, &config.api_base_url);

    println!("=== Cellar Seed Script ===");
    println!("Target: {}", config.api_base_url);

    let categories = seed_categories(&repos).await?;
    seed_products(&repos, &categories).await?;
    seed_discounts(&repos).await?;
    seed_accounts(&repos).await?;

    println!("\n=== Seed complete! ===");
    Ok(())
}

async fn seed_categories(repos: &Repositories) -> anyhow::Result<Vec<Category>> {
    let existing = repos.categories.get_list(&ListParams::all()).await?;
    if !existing.is_empty() {
        println!("[skip] {} categories already present", existing.len());
        return Ok(existing);
    }

    let names = [
        ("Red", "Full and medium bodied reds"),
        ("White", "Crisp and aromatic whites"),
        ("Sparkling", "Traditional method and Charmat"),
        ("Dessert", "Late harvest and fortified"),
    ];
    for (name, description) in names {
        repos
            .categories
            .create(&CategoryDraft {
                category_name: name.to_string(),
                description: Some(description.to_string()),
            })
            .await
            .with_context(|| format!("creating category {name}"))?;
    }
    println!("[done] Created {} categories", names.len());

    Ok(repos.categories.get_list(&ListParams::all()).await?)
}

async fn seed_products(repos: &Repositories, categories: &[Category]) -> anyhow::Result<()> {
    let category_id = |name: &str| {
        categories
            .iter()
            .find(|c| c.category_name == name)
            .map(|c| c.category_id)
            .unwrap_or(1)
    };

    let products = [
        ("Barolo Riserva", "Red", 64.0, 18, Some(2016)),
        ("Rioja Gran Reserva", "Red", 38.5, 30, Some(2015)),
        ("Chablis Premier Cru", "White", 42.0, 24, Some(2021)),
        ("Riesling Kabinett", "White", 19.5, 48, Some(2022)),
        ("Franciacorta Brut", "Sparkling", 31.0, 36, None),
        ("Tokaji Aszú 5 Puttonyos", "Dessert", 55.0, 12, Some(2017)),
    ];
    for (name, category, price, stock, vintage) in products {
        repos
            .products
            .create(&InventoryProductDraft {
                product_name: name.to_string(),
                category_id: category_id(category),
                price,
                stock,
                vintage,
            })
            .await
            .with_context(|| format!("creating product {name}"))?;
    }
    println!("[done] Created {} products", products.len());
    Ok(())
}

async fn seed_discounts(repos: &Repositories) -> anyhow::Result<()> {
    let now = Utc::now();

    repos
        .discount_events
        .create(&DiscountEventDraft {
            event_name: "Harvest Festival".to_string(),
            description: Some("Autumn tasting weekend".to_string()),
            discount_value: 15.0,
            time_start: now + Duration::days(7),
            time_end: now + Duration::days(10),
        })
        .await?;
    repos
        .discount_events
        .create(&DiscountEventDraft {
            event_name: "Cellar Clearance".to_string(),
            description: None,
            discount_value: 25.0,
            time_start: now - Duration::days(2),
            time_end: now + Duration::days(5),
        })
        .await?;
    println!("[done] Created 2 discount events");

    repos
        .discount_orders
        .create(&DiscountOrderDraft {
            discount_name: "Case discount".to_string(),
            minimum_order_value: 150.0,
            discount_value: 10.0,
            time_start: now,
            time_end: now + Duration::days(30),
        })
        .await?;
    println!("[done] Created 1 discount order");
    Ok(())
}

async fn seed_accounts(repos: &Repositories) -> anyhow::Result<()> {
    let accounts = [
        ("admin", "admin@cellar.local", 1, None),
        ("seller", "seller@cellar.local", 2, None),
        ("customer", "customer@cellar.local", 3, Some(1)),
    ];
    for (user_name, email, role_id, tier_id) in accounts {
        let existing = repos.accounts.get_list(&ListParams::search(user_name)).await?;
        if existing.iter().any(|a| a.user_name == user_name) {
            println!("[skip] Account {user_name} already exists");
            continue;
        }
        repos
            .accounts
            .create(&AccountDraft {
                user_name: user_name.to_string(),
                email: email.to_string(),
                full_name: None,
                role_id,
                tier_id,
            })
            .await
            .with_context(|| format!("creating account {user_name}"))?;
        println!("[done] Created account {user_name}");
    }
    Ok(())
}
