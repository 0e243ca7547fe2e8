use rust_decimal::Decimal;

use crate::domain::{DomainError, OwnerRef, Transaction, TransactionStoreTrait, TransactionUnit};
use crate::money::MonetaryAmount;
use crate::reconcile::ApplyMode;

/// Assembles the annotation units of a transaction.
///
/// Fee and tax units are written only when non-zero; the gross-value unit
/// only when the caller passes one (i.e. the currencies differ). Unit
/// construction re-checks the persisted invariants.
pub fn assemble_units(
    fees: Option<MonetaryAmount>,
    taxes: Option<MonetaryAmount>,
    gross: Option<(MonetaryAmount, MonetaryAmount, Decimal)>,
) -> Result<Vec<TransactionUnit>, DomainError> {
    let mut units = Vec::new();
    if let Some(fees) = fees {
        if !fees.is_zero() {
            units.push(TransactionUnit::fee(fees)?);
        }
    }
    if let Some(taxes) = taxes {
        if !taxes.is_zero() {
            units.push(TransactionUnit::tax(taxes)?);
        }
    }
    if let Some((settlement, foreign, rate)) = gross {
        units.push(TransactionUnit::gross_value(settlement, foreign, rate)?);
    }
    Ok(units)
}

/// Writes a fully built transaction to the store under the given mode.
///
/// In-place edits keep the source id; a move deletes the old transaction
/// first so nothing dangles on the previous owner, then inserts the fresh
/// one. Returns the transaction as persisted.
pub fn reconcile_transaction(
    store: &mut dyn TransactionStoreTrait,
    mode: &ApplyMode,
    target: &OwnerRef,
    source_id: Option<&str>,
    mut built: Transaction,
) -> Result<Transaction, DomainError> {
    match mode {
        ApplyMode::New => {
            log::debug!("inserting new transaction into {:?}", target);
            store.add_transaction(target, built.clone())?;
        }
        ApplyMode::InPlace(owner) => {
            let id = source_id.ok_or_else(|| {
                DomainError::NotFound("in-place edit without a source transaction".to_string())
            })?;
            log::debug!("updating transaction {} in place", id);
            built.id = id.to_string();
            store.replace_transaction(owner, built.clone())?;
        }
        ApplyMode::Moved { from, to } => {
            let id = source_id.ok_or_else(|| {
                DomainError::NotFound("move without a source transaction".to_string())
            })?;
            log::debug!("moving transaction {} from {:?} to {:?}", id, from, to);
            store.delete_transaction(from, id)?;
            store.add_transaction(to, built.clone())?;
        }
    }
    Ok(built)
}
