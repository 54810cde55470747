use crate::domain::category::Category;
use crate::domain::item::{Item, ItemStatus};
use crate::domain::user::User;
use crate::error::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::io::Write;

#[derive(Serialize)]
struct UserRow<'a> {
    user: u32,
    name: &'a str,
    balance: u64,
}

#[derive(Serialize)]
struct ItemRow<'a> {
    item: u32,
    name: &'a str,
    owner: u32,
    category: String,
    price: u64,
    status: ItemStatus,
}

/// Writes end-of-run reports as CSV.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    /// Writes `user,name,balance` rows.
    pub fn write_users(&mut self, users: &[User]) -> Result<()> {
        for user in users {
            self.writer.serialize(UserRow {
                user: user.id.0,
                name: &user.name,
                balance: user.balance.value(),
            })?;
        }
        self.finish(users.is_empty(), &["user", "name", "balance"])
    }

    /// Writes `item,name,owner,category,price,status` rows, resolving category names.
    pub fn write_items(&mut self, items: &[Item], categories: &[Category]) -> Result<()> {
        let names: HashMap<_, _> = categories.iter().map(|c| (c.id, c.name.as_str())).collect();
        for item in items {
            let category = names
                .get(&item.category)
                .map_or_else(|| item.category.to_string(), |name| (*name).to_string());
            self.writer.serialize(ItemRow {
                item: item.id.0,
                name: &item.name,
                owner: item.owner.0,
                category,
                price: item.price.value(),
                status: item.status,
            })?;
        }
        self.finish(
            items.is_empty(),
            &["item", "name", "owner", "category", "price", "status"],
        )
    }

    fn finish(&mut self, empty: bool, header: &[&str]) -> Result<()> {
        // `serialize` only emits the header alongside the first row.
        if empty {
            self.writer.write_record(header)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
