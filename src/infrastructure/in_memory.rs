use crate::domain::category::{Category, CategoryId};
use crate::domain::changeset::Changeset;
use crate::domain::item::{Item, ItemId, ItemStatus, NewItem};
use crate::domain::ports::{CategoryStore, ItemFilter, ItemStore, Ledger, UserStore};
use crate::domain::user::{Money, User, UserId};
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory marketplace store.
///
/// Each table sits behind its own `Arc<RwLock<BTreeMap<..>>>`, so ids come back in
/// ascending order. [`Ledger::commit`] always locks items before users.
/// Ideal for testing or for runs where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    users: Arc<RwLock<BTreeMap<UserId, User>>>,
    items: Arc<RwLock<BTreeMap<ItemId, Item>>>,
    categories: Arc<RwLock<BTreeMap<CategoryId, Category>>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_key<K: Ord + Copy, V>(table: &BTreeMap<K, V>, raw: impl Fn(K) -> u32) -> Result<u32> {
    match table.last_key_value() {
        None => Ok(1),
        Some((k, _)) => raw(*k)
            .checked_add(1)
            .ok_or_else(|| MarketError::internal("id space exhausted")),
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, name: String) -> Result<User> {
        let mut users = self.users.write().await;
        let id = UserId(next_key(&*users, |k| k.0)?);
        let user = User::new(id, name);
        users.insert(id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn update_balance(&self, id: UserId, balance: Money) -> Result<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(&id).ok_or(MarketError::UserNotFound(id))?;
        user.balance = balance;
        Ok(())
    }

    async fn all_users(&self) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.values().cloned().collect())
    }
}

#[async_trait]
impl ItemStore for InMemoryStore {
    async fn insert_item(&self, owner: UserId, fields: NewItem) -> Result<Item> {
        let mut items = self.items.write().await;
        let id = ItemId(next_key(&*items, |k| k.0)?);
        let item = Item::new(id, owner, fields);
        items.insert(id, item.clone());
        Ok(item)
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>> {
        let items = self.items.read().await;
        Ok(items.get(&id).cloned())
    }

    async fn store_item(&self, item: Item) -> Result<()> {
        let mut items = self.items.write().await;
        match items.get_mut(&item.id) {
            Some(slot) => {
                *slot = item;
                Ok(())
            }
            None => Err(MarketError::ItemNotFound(item.id)),
        }
    }

    async fn update_status(&self, id: ItemId, status: ItemStatus) -> Result<()> {
        let mut items = self.items.write().await;
        let item = items.get_mut(&id).ok_or(MarketError::ItemNotFound(id))?;
        item.status = status;
        Ok(())
    }

    async fn find_items(&self, filter: ItemFilter) -> Result<Vec<Item>> {
        let items = self.items.read().await;
        Ok(items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CategoryStore for InMemoryStore {
    async fn insert_category(&self, name: String) -> Result<Category> {
        let mut categories = self.categories.write().await;
        let id = CategoryId(next_key(&*categories, |k| k.0)?);
        let category = Category { id, name };
        categories.insert(id, category.clone());
        Ok(category)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        let categories = self.categories.read().await;
        Ok(categories.get(&id).cloned())
    }

    async fn all_categories(&self) -> Result<Vec<Category>> {
        let categories = self.categories.read().await;
        Ok(categories.values().cloned().collect())
    }
}

#[async_trait]
impl Ledger for InMemoryStore {
    async fn commit(&self, changes: Changeset) -> Result<()> {
        let mut items = self.items.write().await;
        let mut users = self.users.write().await;

        // Validate the whole write set before touching anything.
        if let Some((id, _)) = changes
            .statuses()
            .iter()
            .find(|(id, _)| !items.contains_key(id))
        {
            return Err(MarketError::ItemNotFound(*id));
        }
        if let Some((id, _)) = changes
            .balances()
            .iter()
            .find(|(id, _)| !users.contains_key(id))
        {
            return Err(MarketError::UserNotFound(*id));
        }

        for (id, status) in changes.statuses() {
            if let Some(item) = items.get_mut(id) {
                item.status = *status;
            }
        }
        for (id, balance) in changes.balances() {
            if let Some(user) = users.get_mut(id) {
                user.balance = *balance;
            }
        }
        Ok(())
    }
}
