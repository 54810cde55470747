use super::locks::StripedLocks;
use crate::domain::category::{Category, CategoryId};
use crate::domain::changeset::Changeset;
use crate::domain::item::{Item, ItemEdit, ItemId, ItemStatus, NewItem};
use crate::domain::ports::{
    CategoryStore, ItemFilter, ItemStore, Ledger, MarketStoreHandle, UserStore,
};
use crate::domain::user::{Amount, Money, User, UserId};
use crate::error::{ErrorKind, MarketError, Result};
use tracing::{debug, error, info};

/// Record of a completed purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub item: ItemId,
    pub buyer: UserId,
    pub seller: UserId,
    pub price: Money,
}

/// The marketplace service: the one place where item status and balances change.
///
/// `Marketplace` owns no data of its own. It holds the storage handle it was built
/// with and two pools of striped locks. Every read-check-write sequence runs while
/// holding the locks of the item and users it touches, items first, users in
/// ascending order, and finishes with a single store write, so concurrent callers
/// never act on each other's intermediate state.
pub struct Marketplace {
    store: MarketStoreHandle,
    item_locks: StripedLocks,
    user_locks: StripedLocks,
}

impl Marketplace {
    /// Creates a new `Marketplace` over `store`.
    pub fn new(store: MarketStoreHandle) -> Self {
        Self {
            store,
            item_locks: StripedLocks::default(),
            user_locks: StripedLocks::default(),
        }
    }

    /// Buys `item_id` on behalf of `buyer_id`.
    ///
    /// Preconditions are checked in a fixed order and the first failure is returned
    /// with nothing written:
    ///
    /// 1. the item exists ([`MarketError::ItemNotFound`]),
    /// 2. the buyer is not the owner ([`MarketError::SelfPurchaseForbidden`]),
    /// 3. the item is on sale ([`MarketError::ItemNotAvailable`]),
    /// 4. the buyer exists ([`MarketError::BuyerNotFound`]),
    /// 5. the buyer can pay ([`MarketError::InsufficientBalance`]),
    /// 6. the seller exists ([`MarketError::SellerNotFound`]).
    ///
    /// On success the item becomes `SoldOut`, the buyer is debited and the seller
    /// credited by the price, all in one commit.
    pub async fn purchase(&self, buyer_id: UserId, item_id: ItemId) -> Result<PurchaseReceipt> {
        let result = self.purchase_locked(buyer_id, item_id).await;
        if let Ok(receipt) = &result {
            info!(
                item = %receipt.item,
                buyer = %receipt.buyer,
                seller = %receipt.seller,
                price = %receipt.price,
                "purchase completed"
            );
        }
        observe("purchase", result)
    }

    async fn purchase_locked(&self, buyer_id: UserId, item_id: ItemId) -> Result<PurchaseReceipt> {
        let _item_guard = self.item_locks.lock(item_id.0).await;

        let mut item = self
            .store
            .get_item(item_id)
            .await?
            .ok_or(MarketError::ItemNotFound(item_id))?;
        if item.owner == buyer_id {
            return Err(MarketError::SelfPurchaseForbidden);
        }
        item.transition(ItemStatus::SoldOut)
            .map_err(|_| MarketError::ItemNotAvailable)?;

        let seller_id = item.owner;
        let _user_guards = self.user_locks.lock_many(&[buyer_id.0, seller_id.0]).await;

        let (buyer, seller) = tokio::try_join!(
            self.store.get_user(buyer_id),
            self.store.get_user(seller_id)
        )?;
        let mut buyer = buyer.ok_or(MarketError::BuyerNotFound(buyer_id))?;
        buyer.debit(item.price)?;
        let mut seller = seller.ok_or(MarketError::SellerNotFound(seller_id))?;
        seller.credit(item.price)?;

        let changes = Changeset::new()
            .set_status(item.id, item.status)
            .set_balance(buyer.id, buyer.balance)
            .set_balance(seller.id, seller.balance);
        self.store.commit(changes).await?;

        Ok(PurchaseReceipt {
            item: item.id,
            buyer: buyer.id,
            seller: seller.id,
            price: item.price,
        })
    }

    /// Puts an `Initial` item owned by `seller_id` on sale.
    pub async fn sell(&self, seller_id: UserId, item_id: ItemId) -> Result<()> {
        let result: Result<()> = async {
            let _guard = self.item_locks.lock(item_id.0).await;
            let mut item = self
                .store
                .get_item(item_id)
                .await?
                .ok_or(MarketError::ItemNotFound(item_id))?;
            if item.owner != seller_id {
                return Err(MarketError::NotOwner);
            }
            item.transition(ItemStatus::OnSale)?;
            self.store.update_status(item.id, item.status).await
        }
        .await;
        if result.is_ok() {
            info!(item = %item_id, seller = %seller_id, "item put on sale");
        }
        observe("sell", result)
    }

    /// Adds a strictly positive `amount` to the balance of `user_id`.
    ///
    /// Returns the new balance.
    pub async fn add_balance(&self, user_id: UserId, amount: i64) -> Result<Money> {
        let result: Result<Money> = async {
            let amount = Amount::new(amount)?;
            let _guard = self.user_locks.lock(user_id.0).await;
            let mut user = self
                .store
                .get_user(user_id)
                .await?
                .ok_or(MarketError::UserNotFound(user_id))?;
            user.credit(amount.into())?;
            self.store.update_balance(user.id, user.balance).await?;
            Ok(user.balance)
        }
        .await;
        if let Ok(balance) = &result {
            info!(user = %user_id, balance = %balance, "balance topped up");
        }
        observe("add_balance", result)
    }

    pub async fn balance(&self, user_id: UserId) -> Result<Money> {
        let balance = self
            .store
            .get_user(user_id)
            .await
            .and_then(|user| user.ok_or(MarketError::UserNotFound(user_id)))
            .map(|user| user.balance);
        observe("balance", balance)
    }

    /// Registers a new user with an empty balance.
    pub async fn register_user(&self, name: &str) -> Result<User> {
        let result = match required(name, "user name") {
            Ok(name) => self.store.insert_user(name).await,
            Err(e) => Err(e),
        };
        if let Ok(user) = &result {
            info!(user = %user.id, name = %user.name, "user registered");
        }
        observe("register_user", result)
    }

    pub async fn add_category(&self, name: &str) -> Result<Category> {
        let result = match required(name, "category name") {
            Ok(name) => self.store.insert_category(name).await,
            Err(e) => Err(e),
        };
        observe("add_category", result)
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        observe("categories", self.store.all_categories().await)
    }

    /// Creates an `Initial` listing owned by `owner`.
    ///
    /// The owner and the category are looked up concurrently; both must exist.
    pub async fn list_item(&self, owner: UserId, fields: NewItem) -> Result<Item> {
        let result: Result<Item> = async {
            required(&fields.name, "item name")?;
            let (user, category) = tokio::try_join!(
                self.store.get_user(owner),
                self.store.get_category(fields.category)
            )?;
            user.ok_or(MarketError::UserNotFound(owner))?;
            category.ok_or(MarketError::CategoryNotFound(fields.category))?;
            self.store.insert_item(owner, fields).await
        }
        .await;
        if let Ok(item) = &result {
            info!(item = %item.id, owner = %owner, price = %item.price, "item listed");
        }
        observe("list_item", result)
    }

    /// Rewrites the descriptive fields of an item that has not been put on sale yet.
    ///
    /// The status is never changed by an edit.
    pub async fn edit_item(&self, owner: UserId, item_id: ItemId, edit: ItemEdit) -> Result<Item> {
        let result: Result<Item> = async {
            required(&edit.name, "item name")?;
            let _guard = self.item_locks.lock(item_id.0).await;
            let (item, category) = tokio::try_join!(
                self.store.get_item(item_id),
                self.store.get_category(edit.category)
            )?;
            let mut item = item.ok_or(MarketError::ItemNotFound(item_id))?;
            if item.owner != owner {
                return Err(MarketError::NotOwner);
            }
            if item.status != ItemStatus::Initial {
                return Err(MarketError::InvalidState);
            }
            category.ok_or(MarketError::CategoryNotFound(edit.category))?;
            item.apply_edit(edit);
            self.store.store_item(item.clone()).await?;
            Ok(item)
        }
        .await;
        observe("edit_item", result)
    }

    pub async fn item(&self, item_id: ItemId) -> Result<Item> {
        let item = self
            .store
            .get_item(item_id)
            .await
            .and_then(|item| item.ok_or(MarketError::ItemNotFound(item_id)));
        observe("item", item)
    }

    pub async fn on_sale_items(&self) -> Result<Vec<Item>> {
        self.find(ItemFilter::Status(ItemStatus::OnSale)).await
    }

    pub async fn items_by_owner(&self, owner: UserId) -> Result<Vec<Item>> {
        self.find(ItemFilter::Owner(owner)).await
    }

    pub async fn items_by_category(&self, category: CategoryId) -> Result<Vec<Item>> {
        self.find(ItemFilter::Category(category)).await
    }

    /// Case-insensitive search on item names. An empty keyword is rejected.
    pub async fn search(&self, keyword: &str) -> Result<Vec<Item>> {
        match required(keyword, "keyword") {
            Ok(keyword) => self.find(ItemFilter::NameContains(keyword)).await,
            Err(e) => observe("search", Err(e)),
        }
    }

    pub async fn items(&self) -> Result<Vec<Item>> {
        self.find(ItemFilter::All).await
    }

    pub async fn users(&self) -> Result<Vec<User>> {
        observe("users", self.store.all_users().await)
    }

    async fn find(&self, filter: ItemFilter) -> Result<Vec<Item>> {
        observe("find_items", self.store.find_items(filter).await)
    }
}

fn required(value: &str, field: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        Err(MarketError::InvalidInput(format!("{field} is required")))
    } else {
        Ok(value.to_string())
    }
}

/// Logs a failed operation at a level matching its kind and passes the result on.
fn observe<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        match e.kind() {
            ErrorKind::Internal => {
                let source = std::error::Error::source(e)
                    .map(ToString::to_string)
                    .unwrap_or_else(|| e.to_string());
                error!(operation, error = %source, "storage failure");
            }
            _ => debug!(operation, reason = %e, "operation refused"),
        }
    }
    result
}
