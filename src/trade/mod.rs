//! Buy, sell and delivery entry model.

mod trade_model;


pub use trade_model::{TradeEntryModel, TradeKind};
