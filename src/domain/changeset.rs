use super::item::{ItemId, ItemStatus};
use super::user::{Money, UserId};

/// The write set of one atomic unit, handed to [`Ledger::commit`].
///
/// Values are absolute: a balance entry carries the new balance, not a delta, so the
/// orchestrator must compute it while holding the locks of the affected users.
///
/// [`Ledger::commit`]: super::ports::Ledger::commit
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Changeset {
    statuses: Vec<(ItemId, ItemStatus)>,
    balances: Vec<(UserId, Money)>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(mut self, item: ItemId, status: ItemStatus) -> Self {
        self.statuses.push((item, status));
        self
    }

    pub fn set_balance(mut self, user: UserId, balance: Money) -> Self {
        self.balances.push((user, balance));
        self
    }

    pub fn statuses(&self) -> &[(ItemId, ItemStatus)] {
        &self.statuses
    }

    pub fn balances(&self) -> &[(UserId, Money)] {
        &self.balances
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty() && self.balances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.statuses.len() + self.balances.len()
    }
}
