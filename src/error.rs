use crate::domain::category::CategoryId;
use crate::domain::item::ItemId;
use crate::domain::user::UserId;
use thiserror::Error;

/// Coarse classification of [`MarketError`], used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Precondition,
    InsufficientResource,
    Validation,
    Internal,
}

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("item {0} not found")]
    ItemNotFound(ItemId),
    #[error("buyer {0} not found")]
    BuyerNotFound(UserId),
    #[error("seller {0} not found")]
    SellerNotFound(UserId),
    #[error("user {0} not found")]
    UserNotFound(UserId),
    #[error("category {0} not found")]
    CategoryNotFound(CategoryId),
    #[error("you cannot buy your own item")]
    SelfPurchaseForbidden,
    #[error("item is not on sale")]
    ItemNotAvailable,
    #[error("item belongs to another user")]
    NotOwner,
    #[error("invalid item status for this operation")]
    InvalidState,
    #[error("insufficient balance: need {required}, have {available}")]
    InsufficientBalance { required: u64, available: u64 },
    #[error("amount must be positive")]
    InvalidAmount,
    #[error("balance would overflow")]
    BalanceOverflow,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    /// Storage failure. The source is kept for logging and never rendered.
    #[error("internal storage failure")]
    InternalError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl MarketError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(Box::new(std::io::Error::other(message.into())))
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ItemNotFound(_)
            | Self::BuyerNotFound(_)
            | Self::SellerNotFound(_)
            | Self::UserNotFound(_)
            | Self::CategoryNotFound(_) => ErrorKind::NotFound,
            Self::SelfPurchaseForbidden
            | Self::ItemNotAvailable
            | Self::NotOwner
            | Self::InvalidState => ErrorKind::Precondition,
            Self::InsufficientBalance { .. } | Self::InvalidAmount | Self::BalanceOverflow => {
                ErrorKind::InsufficientResource
            }
            Self::InvalidInput(_) | Self::CsvError(_) => ErrorKind::Validation,
            Self::IoError(_) | Self::InternalError(_) => ErrorKind::Internal,
        }
    }

    /// HTTP-style status code for this error.
    ///
    /// Missing items and buyers are reported as 412 like the rest of the purchase
    /// preconditions; other lookups are plain 404s.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ItemNotFound(_) | Self::BuyerNotFound(_) | Self::SellerNotFound(_) => 412,
            Self::InvalidAmount => 400,
            _ => match self.kind() {
                ErrorKind::NotFound => 404,
                ErrorKind::Precondition | ErrorKind::InsufficientResource => 412,
                ErrorKind::Validation => 400,
                ErrorKind::Internal => 500,
            },
        }
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for MarketError {
    fn from(err: rocksdb::Error) -> Self {
        Self::InternalError(Box::new(err))
    }
}

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        Self::InternalError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, MarketError>;
