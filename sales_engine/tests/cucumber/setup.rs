use chrono::NaiveDateTime;
use cucumber::given;
use sales_common::Secret;
use sales_engine::{db_types::ARP_COMMERCE, IntegrationStore, NicheStore};

use crate::cucumber::{SalesSystem, SalesWorld};

#[given(expr = "a fresh install where the local time is {string}")]
async fn fresh_install(world: &mut SalesWorld, now: String) {
    let now = NaiveDateTime::parse_from_str(&now, "%Y-%m-%d %H:%M").expect("Use the YYYY-MM-DD HH:MM format");
    world.system = Some(SalesSystem::new(now).await);
}

#[given(expr = "user {int} has an ARP Commerce session {string}")]
async fn add_integration(world: &mut SalesWorld, user_id: i64, token: String) {
    world.system().db.save_integration(user_id, ARP_COMMERCE, &Secret::new(token)).await.expect("Error saving integration");
}

#[given(expr = "user {int} maps SKU {word} to the niche {string}")]
async fn map_niche(world: &mut SalesWorld, user_id: i64, sku: String, niche: String) {
    world.system().db.assign_niche(user_id, &sku, &niche).await.expect("Error assigning niche");
}
