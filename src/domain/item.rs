use super::category::CategoryId;
use super::user::{Money, UserId};
use crate::error::MarketError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Listing lifecycle. Only `Initial -> OnSale -> SoldOut` is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    #[default]
    Initial,
    OnSale,
    SoldOut,
}

impl ItemStatus {
    /// Returns whether `self -> next` is a legal lifecycle step.
    pub fn can_transition_to(self, next: ItemStatus) -> bool {
        matches!(
            (self, next),
            (ItemStatus::Initial, ItemStatus::OnSale) | (ItemStatus::OnSale, ItemStatus::SoldOut)
        )
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemStatus::Initial => "initial",
            ItemStatus::OnSale => "on_sale",
            ItemStatus::SoldOut => "sold_out",
        };
        f.write_str(s)
    }
}

/// A listing owned by a single seller for its entire lifetime.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Item {
    pub id: ItemId,
    pub owner: UserId,
    pub name: String,
    pub description: String,
    pub category: CategoryId,
    pub price: Money,
    pub status: ItemStatus,
}

/// Fields supplied by a seller when creating a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub category: CategoryId,
    pub price: Money,
}

/// Descriptive fields a seller may change while the item is still `Initial`.
pub type ItemEdit = NewItem;

impl Item {
    pub fn new(id: ItemId, owner: UserId, fields: NewItem) -> Self {
        Self {
            id,
            owner,
            name: fields.name,
            description: fields.description,
            category: fields.category,
            price: fields.price,
            status: ItemStatus::Initial,
        }
    }

    /// Moves the item to `next`, rejecting any step outside the lifecycle.
    pub fn transition(&mut self, next: ItemStatus) -> Result<(), MarketError> {
        if self.status.can_transition_to(next) {
            self.status = next;
            Ok(())
        } else {
            Err(MarketError::InvalidState)
        }
    }

    pub fn apply_edit(&mut self, edit: ItemEdit) {
        self.name = edit.name;
        self.description = edit.description;
        self.category = edit.category;
        self.price = edit.price;
    }
}
