//! Dividend, tax, fee, interest, deposit and removal entry model.

mod income_model;


pub use income_model::{IncomeEntryModel, IncomeKind};
