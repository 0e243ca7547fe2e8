//! Account-to-account cash transfer entry model.

mod cash_transfer_model;

#[cfg(test)]
mod cash_transfer_model_tests;

pub use cash_transfer_model::CashTransferModel;
