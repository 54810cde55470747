use crate::domain::category::{Category, CategoryId};
use crate::domain::changeset::Changeset;
use crate::domain::item::{Item, ItemId, ItemStatus, NewItem};
use crate::domain::ports::{CategoryStore, ItemFilter, ItemStore, Ledger, UserStore};
use crate::domain::user::{Money, User, UserId};
use crate::error::{MarketError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for user records.
pub const CF_USERS: &str = "users";
/// Column Family for item records.
pub const CF_ITEMS: &str = "items";
/// Column Family for categories.
pub const CF_CATEGORIES: &str = "categories";
/// Column Family for id sequences, keyed by the name of the table they feed.
pub const CF_META: &str = "meta";

/// A persistent store implementation using RocksDB.
///
/// Each entity lives in its own Column Family, keyed by the big-endian id so that
/// iteration yields ascending ids. Every mutation goes through a single `WriteBatch`,
/// which makes [`Ledger::commit`] and id allocation atomic on disk. Writers are
/// serialized by an async mutex so read-modify-write cycles never interleave.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    writer: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that all required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [CF_USERS, CF_ITEMS, CF_CATEGORIES, CF_META]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;

        Ok(Self {
            db: Arc::new(db),
            writer: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| MarketError::internal(format!("{name} column family not found")))
    }

    fn read<T: DeserializeOwned>(&self, cf_name: &str, id: u32) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, id.to_be_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn read_all<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut records = Vec::new();
        for entry in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = entry?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }

    fn put<T: Serialize>(
        &self,
        batch: &mut WriteBatch,
        cf_name: &str,
        id: u32,
        record: &T,
    ) -> Result<()> {
        let cf = self.cf(cf_name)?;
        batch.put_cf(cf, id.to_be_bytes(), serde_json::to_vec(record)?);
        Ok(())
    }

    /// Reserves the next id of `table` inside `batch`. Caller must hold `writer`.
    fn allocate(&self, batch: &mut WriteBatch, table: &str) -> Result<u32> {
        let meta = self.cf(CF_META)?;
        let last = match self.db.get_cf(meta, table.as_bytes())? {
            Some(bytes) => {
                let raw: [u8; 4] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| MarketError::internal(format!("corrupt {table} sequence")))?;
                u32::from_be_bytes(raw)
            }
            None => 0,
        };
        let next = last
            .checked_add(1)
            .ok_or_else(|| MarketError::internal("id space exhausted"))?;
        batch.put_cf(meta, table.as_bytes(), next.to_be_bytes());
        Ok(next)
    }
}

#[async_trait]
impl UserStore for RocksDBStore {
    async fn insert_user(&self, name: String) -> Result<User> {
        let _writer = self.writer.lock().await;
        let mut batch = WriteBatch::default();
        let user = User::new(UserId(self.allocate(&mut batch, CF_USERS)?), name);
        self.put(&mut batch, CF_USERS, user.id.0, &user)?;
        self.db.write(batch)?;
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        self.read(CF_USERS, id.0)
    }

    async fn update_balance(&self, id: UserId, balance: Money) -> Result<()> {
        self.commit(Changeset::new().set_balance(id, balance)).await
    }

    async fn all_users(&self) -> Result<Vec<User>> {
        self.read_all(CF_USERS)
    }
}

#[async_trait]
impl ItemStore for RocksDBStore {
    async fn insert_item(&self, owner: UserId, fields: NewItem) -> Result<Item> {
        let _writer = self.writer.lock().await;
        let mut batch = WriteBatch::default();
        let item = Item::new(ItemId(self.allocate(&mut batch, CF_ITEMS)?), owner, fields);
        self.put(&mut batch, CF_ITEMS, item.id.0, &item)?;
        self.db.write(batch)?;
        Ok(item)
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>> {
        self.read(CF_ITEMS, id.0)
    }

    async fn store_item(&self, item: Item) -> Result<()> {
        let _writer = self.writer.lock().await;
        if self.read::<Item>(CF_ITEMS, item.id.0)?.is_none() {
            return Err(MarketError::ItemNotFound(item.id));
        }
        let mut batch = WriteBatch::default();
        self.put(&mut batch, CF_ITEMS, item.id.0, &item)?;
        self.db.write(batch)?;
        Ok(())
    }

    async fn update_status(&self, id: ItemId, status: ItemStatus) -> Result<()> {
        self.commit(Changeset::new().set_status(id, status)).await
    }

    async fn find_items(&self, filter: ItemFilter) -> Result<Vec<Item>> {
        let items: Vec<Item> = self.read_all(CF_ITEMS)?;
        Ok(items
            .into_iter()
            .filter(|item| filter.matches(item))
            .collect())
    }
}

#[async_trait]
impl CategoryStore for RocksDBStore {
    async fn insert_category(&self, name: String) -> Result<Category> {
        let _writer = self.writer.lock().await;
        let mut batch = WriteBatch::default();
        let id = CategoryId(self.allocate(&mut batch, CF_CATEGORIES)?);
        let category = Category { id, name };
        self.put(&mut batch, CF_CATEGORIES, id.0, &category)?;
        self.db.write(batch)?;
        Ok(category)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        self.read(CF_CATEGORIES, id.0)
    }

    async fn all_categories(&self) -> Result<Vec<Category>> {
        self.read_all(CF_CATEGORIES)
    }
}

#[async_trait]
impl Ledger for RocksDBStore {
    async fn commit(&self, changes: Changeset) -> Result<()> {
        let _writer = self.writer.lock().await;
        let mut batch = WriteBatch::default();

        for (id, status) in changes.statuses() {
            let mut item: Item = self
                .read(CF_ITEMS, id.0)?
                .ok_or(MarketError::ItemNotFound(*id))?;
            item.status = *status;
            self.put(&mut batch, CF_ITEMS, id.0, &item)?;
        }
        for (id, balance) in changes.balances() {
            let mut user: User = self
                .read(CF_USERS, id.0)?
                .ok_or(MarketError::UserNotFound(*id))?;
            user.balance = *balance;
            self.put(&mut batch, CF_USERS, id.0, &user)?;
        }

        self.db.write(batch)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn bike() -> NewItem {
        NewItem {
            name: "Road Bike".into(),
            description: "barely used".into(),
            category: CategoryId(1),
            price: Money::new(300),
        }
    }

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        for name in [CF_USERS, CF_ITEMS, CF_CATEGORIES, CF_META] {
            assert!(store.db.cf_handle(name).is_some(), "{name} missing");
        }
    }

    #[tokio::test]
    async fn test_rocksdb_user_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let alice = store.insert_user("alice".into()).await.unwrap();
        let bob = store.insert_user("bob".into()).await.unwrap();
        assert_eq!((alice.id, bob.id), (UserId(1), UserId(2)));

        store.update_balance(bob.id, Money::new(70)).await.unwrap();
        let retrieved = store.get_user(bob.id).await.unwrap().unwrap();
        assert_eq!(retrieved.balance, Money::new(70));

        let all = store.all_users().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, alice.id);

        assert!(store.get_user(UserId(3)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rocksdb_commit_rejects_unknown_records() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let seller = store.insert_user("seller".into()).await.unwrap();
        let item = store.insert_item(seller.id, bike()).await.unwrap();

        let changes = Changeset::new()
            .set_status(item.id, ItemStatus::OnSale)
            .set_balance(UserId(42), Money::new(5));
        assert!(matches!(
            store.commit(changes).await,
            Err(MarketError::UserNotFound(UserId(42)))
        ));

        let item = store.get_item(item.id).await.unwrap().unwrap();
        assert_eq!(item.status, ItemStatus::Initial);
    }

    #[tokio::test]
    async fn test_rocksdb_sequences_survive_reopen() {
        let dir = tempdir().unwrap();
        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            store.insert_category("bikes".into()).await.unwrap();
            store.insert_user("alice".into()).await.unwrap();
        }

        let store = RocksDBStore::open(dir.path()).unwrap();
        let second = store.insert_category("tools".into()).await.unwrap();
        assert_eq!(second.id, CategoryId(2));
        assert_eq!(store.all_categories().await.unwrap().len(), 2);
    }
}
