#![allow(dead_code)]

use marketledger::application::marketplace::Marketplace;
use marketledger::domain::item::{ItemId, NewItem};
use marketledger::domain::user::{Money, UserId};
use marketledger::infrastructure::in_memory::InMemoryStore;
use std::io::{Error, Write};
use std::path::Path;
use std::sync::Arc;

pub const HEADER: &str = "op, user, item, category, amount, name";

pub fn in_memory_market() -> Arc<Marketplace> {
    Arc::new(Marketplace::new(Arc::new(InMemoryStore::new())))
}

/// Registers a user and tops them up with `balance` (skipped when zero).
pub async fn user_with_balance(market: &Marketplace, name: &str, balance: i64) -> UserId {
    let user = market.register_user(name).await.unwrap().id;
    if balance > 0 {
        market.add_balance(user, balance).await.unwrap();
    }
    user
}

/// Lists an item for `seller` at `price` and puts it on sale.
pub async fn on_sale_item(market: &Marketplace, seller: UserId, price: u64) -> ItemId {
    let category = match market.categories().await.unwrap().first() {
        Some(c) => c.id,
        None => market.add_category("misc").await.unwrap().id,
    };
    let item = market
        .list_item(
            seller,
            NewItem {
                name: format!("item for {price}"),
                description: String::new(),
                category,
                price: Money::new(price),
            },
        )
        .await
        .unwrap()
        .id;
    market.sell(seller, item).await.unwrap();
    item
}

pub async fn total_money(market: &Marketplace) -> u64 {
    market
        .users()
        .await
        .unwrap()
        .iter()
        .map(|u| u.balance.value())
        .sum()
}

/// Writes a command file with the standard header followed by `rows`.
pub fn write_commands(path: &Path, rows: &[&str]) -> Result<(), Error> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "{HEADER}")?;
    for row in rows {
        writeln!(file, "{row}")?;
    }
    Ok(())
}
