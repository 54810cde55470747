use super::category::{Category, CategoryId};
use super::changeset::Changeset;
use super::item::{Item, ItemId, ItemStatus, NewItem};
use super::user::{Money, User, UserId};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user with a zero balance and a freshly allocated id.
    async fn insert_user(&self, name: String) -> Result<User>;
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;
    async fn update_balance(&self, id: UserId, balance: Money) -> Result<()>;
    /// All users in ascending id order.
    async fn all_users(&self) -> Result<Vec<User>>;
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Persists a new `Initial` item with a freshly allocated id.
    async fn insert_item(&self, owner: UserId, fields: NewItem) -> Result<Item>;
    async fn get_item(&self, id: ItemId) -> Result<Option<Item>>;
    /// Overwrites an existing item record.
    async fn store_item(&self, item: Item) -> Result<()>;
    async fn update_status(&self, id: ItemId, status: ItemStatus) -> Result<()>;
    /// Items matching `filter` in ascending id order.
    async fn find_items(&self, filter: ItemFilter) -> Result<Vec<Item>>;
}

#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn insert_category(&self, name: String) -> Result<Category>;
    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>>;
    async fn all_categories(&self) -> Result<Vec<Category>>;
}

/// Atomic-unit primitive shared by the item and user tables.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Applies every write in `changes` or none of them.
    ///
    /// Fails without writing anything if a referenced item or user does not exist.
    async fn commit(&self, changes: Changeset) -> Result<()>;
}

/// A complete storage backend for the marketplace.
pub trait MarketStore: UserStore + ItemStore + CategoryStore + Ledger {}

impl<T> MarketStore for T where T: UserStore + ItemStore + CategoryStore + Ledger {}

pub type MarketStoreHandle = Arc<dyn MarketStore>;

/// Selection criteria for [`ItemStore::find_items`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemFilter {
    All,
    Status(ItemStatus),
    Owner(UserId),
    Category(CategoryId),
    /// Case-insensitive substring match on the item name.
    NameContains(String),
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        match self {
            ItemFilter::All => true,
            ItemFilter::Status(status) => item.status == *status,
            ItemFilter::Owner(owner) => item.owner == *owner,
            ItemFilter::Category(category) => item.category == *category,
            ItemFilter::NameContains(keyword) => item
                .name
                .to_lowercase()
                .contains(&keyword.to_lowercase()),
        }
    }
}
