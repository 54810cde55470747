use super::csv::command_reader::{Command, Op};
use crate::application::marketplace::Marketplace;
use crate::domain::category::CategoryId;
use crate::domain::item::{ItemId, NewItem};
use crate::domain::user::{Money, UserId};
use crate::error::{MarketError, Result};
use std::sync::Arc;

/// Translates parsed commands into [`Marketplace`] calls.
///
/// The acting user of each command is taken as given; authentication happens
/// before commands reach this layer.
#[derive(Clone)]
pub struct CommandHandler {
    market: Arc<Marketplace>,
}

impl CommandHandler {
    pub fn new(market: Arc<Marketplace>) -> Self {
        Self { market }
    }

    pub async fn handle(&self, cmd: Command) -> Result<()> {
        match cmd.op {
            Op::Register => {
                self.market.register_user(&field(cmd.name, cmd.op, "name")?).await?;
            }
            Op::Category => {
                self.market.add_category(&field(cmd.name, cmd.op, "name")?).await?;
            }
            Op::Deposit => {
                let user = UserId(field(cmd.user, cmd.op, "user")?);
                let amount = field(cmd.amount, cmd.op, "amount")?;
                self.market.add_balance(user, amount).await?;
            }
            Op::List => {
                let owner = UserId(field(cmd.user, cmd.op, "user")?);
                let fields = item_fields(&cmd)?;
                self.market.list_item(owner, fields).await?;
            }
            Op::Edit => {
                let owner = UserId(field(cmd.user, cmd.op, "user")?);
                let item = ItemId(field(cmd.item, cmd.op, "item")?);
                let fields = item_fields(&cmd)?;
                self.market.edit_item(owner, item, fields).await?;
            }
            Op::Sell => {
                let seller = UserId(field(cmd.user, cmd.op, "user")?);
                let item = ItemId(field(cmd.item, cmd.op, "item")?);
                self.market.sell(seller, item).await?;
            }
            Op::Purchase => {
                let buyer = UserId(field(cmd.user, cmd.op, "user")?);
                let item = ItemId(field(cmd.item, cmd.op, "item")?);
                self.market.purchase(buyer, item).await?;
            }
        }
        Ok(())
    }
}

fn field<T>(value: Option<T>, op: Op, name: &str) -> Result<T> {
    value.ok_or_else(|| MarketError::InvalidInput(format!("{op:?} requires `{name}`")))
}

fn item_fields(cmd: &Command) -> Result<NewItem> {
    let price = field(cmd.amount, cmd.op, "amount")?;
    let price = u64::try_from(price)
        .map_err(|_| MarketError::InvalidInput("price must not be negative".into()))?;
    Ok(NewItem {
        name: field(cmd.name.clone(), cmd.op, "name")?,
        description: String::new(),
        category: CategoryId(field(cmd.category, cmd.op, "category")?),
        price: Money::new(price),
    })
}
