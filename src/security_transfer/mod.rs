//! Portfolio-to-portfolio security transfer entry model.

mod security_transfer_model;


pub use security_transfer_model::SecurityTransferModel;
