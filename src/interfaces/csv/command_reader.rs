use crate::error::{MarketError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Register,
    Category,
    Deposit,
    List,
    Edit,
    Sell,
    Purchase,
}

/// One row of a command file: `op, user, item, category, amount, name`.
///
/// Which columns are required depends on `op`; see
/// [`CommandHandler`](crate::interfaces::handler::CommandHandler).
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
pub struct Command {
    pub op: Op,
    pub user: Option<u32>,
    pub item: Option<u32>,
    pub category: Option<u32>,
    pub amount: Option<i64>,
    pub name: Option<String>,
}

/// Reads marketplace commands from a CSV source.
///
/// This reader wraps `csv::Reader` and provides an iterator over `Result<Command>`.
/// It handles whitespace trimming and flexible record lengths automatically.
pub struct CommandReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CommandReader<R> {
    /// Creates a new `CommandReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes commands.
    pub fn commands(self) -> impl Iterator<Item = Result<Command>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(MarketError::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "op, user, item, category, amount, name\n\
                    register, , , , , alice\n\
                    deposit, 1, , , 150,\n\
                    purchase, 1, 3, , ,";
        let reader = CommandReader::new(data.as_bytes());
        let results: Vec<Result<Command>> = reader.commands().collect();

        assert_eq!(results.len(), 3);
        let register = results[0].as_ref().unwrap();
        assert_eq!(register.op, Op::Register);
        assert_eq!(register.user, None);
        assert_eq!(register.name.as_deref(), Some("alice"));

        let deposit = results[1].as_ref().unwrap();
        assert_eq!(deposit.user, Some(1));
        assert_eq!(deposit.amount, Some(150));
        assert_eq!(deposit.name, None);

        let purchase = results[2].as_ref().unwrap();
        assert_eq!(purchase.op, Op::Purchase);
        assert_eq!(purchase.item, Some(3));
    }

    #[test]
    fn test_reader_short_rows() {
        let data = "op, user, item, category, amount, name\nsell, 2, 7";
        let reader = CommandReader::new(data.as_bytes());
        let results: Vec<Result<Command>> = reader.commands().collect();

        let sell = results[0].as_ref().unwrap();
        assert_eq!(sell.op, Op::Sell);
        assert_eq!((sell.user, sell.item), (Some(2), Some(7)));
        assert_eq!(sell.amount, None);
    }

    #[test]
    fn test_reader_malformed_line() {
        let data = "op, user, item, category, amount, name\nrefund, 1, 1, , 1,";
        let reader = CommandReader::new(data.as_bytes());
        let results: Vec<Result<Command>> = reader.commands().collect();

        assert!(matches!(results[0], Err(MarketError::CsvError(_))));
    }
}
