pub mod token;
pub mod transaction;

pub use token::{format_token_amount, TokenDetails};
pub use transaction::{RawLog, TransactionReceiptSummary, TransferLogEntry};
