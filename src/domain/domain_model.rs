use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;
use crate::money::{Amount, MonetaryAmount, ShareQuantity};
use crate::validation::conversion_consistent;

/// Whether a transaction direction increases or decreases a holding.
///
/// The sign policy selects the direction-dependent total formula shared by
/// the editing models and the persisted-unit consistency check.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignPolicy {
    /// Buy and inbound delivery: fees and taxes add on top of the gross.
    Acquisition,
    /// Sell and outbound delivery: fees and taxes come out of the gross.
    Disposal,
}

impl SignPolicy {
    /// `total = f(gross, fees, taxes)`.
    pub fn total_from_parts(&self, gross: Amount, fees: Amount, taxes: Amount) -> Amount {
        match self {
            SignPolicy::Acquisition => gross.saturating_add(fees).saturating_add(taxes),
            SignPolicy::Disposal => gross.sub_or_zero(fees.saturating_add(taxes)),
        }
    }

    /// The inverse `g`: recovers the gross value from the total.
    pub fn gross_from_total(&self, total: Amount, fees: Amount, taxes: Amount) -> Amount {
        match self {
            SignPolicy::Acquisition => total.sub_or_zero(fees.saturating_add(taxes)),
            SignPolicy::Disposal => total.saturating_add(fees).saturating_add(taxes),
        }
    }
}

/// The closed set of persisted transaction kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Buy,
    Sell,
    DeliveryInbound,
    DeliveryOutbound,
    Dividend,
    Tax,
    TaxRefund,
    Fee,
    FeeRefund,
    Interest,
    InterestCharge,
    Deposit,
    Removal,
    TransferIn,
    TransferOut,
}

impl TransactionKind {
    /// The sign policy for kinds that trade a security against cash.
    pub fn sign_policy(&self) -> Option<SignPolicy> {
        match self {
            TransactionKind::Buy | TransactionKind::DeliveryInbound => {
                Some(SignPolicy::Acquisition)
            }
            TransactionKind::Sell | TransactionKind::DeliveryOutbound => {
                Some(SignPolicy::Disposal)
            }
            _ => None,
        }
    }
}

/// Kinds of annotation units attached to a persisted transaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitKind {
    Fee,
    Tax,
    GrossValue,
}

/// The foreign-currency side of a forex-bearing unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForexPair {
    pub amount: MonetaryAmount,
    #[serde(with = "crate::utils::decimal_serde::rate_serde")]
    pub rate: Decimal,
}

/// An annotation unit: a fee, a tax, or the gross value of a dual-currency
/// transaction. The unit amount is always in the transaction's settlement
/// currency; a gross-value unit additionally carries the paired foreign
/// amount and the exchange rate used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUnit {
    kind: UnitKind,
    amount: MonetaryAmount,
    forex: Option<ForexPair>,
}

impl TransactionUnit {
    pub fn fee(amount: MonetaryAmount) -> Result<Self, DomainError> {
        Self::plain(UnitKind::Fee, amount)
    }

    pub fn tax(amount: MonetaryAmount) -> Result<Self, DomainError> {
        Self::plain(UnitKind::Tax, amount)
    }

    fn plain(kind: UnitKind, amount: MonetaryAmount) -> Result<Self, DomainError> {
        if amount.value().is_negative() {
            return Err(DomainError::NegativeUnitAmount(amount.to_decimal().to_string()));
        }
        Ok(TransactionUnit {
            kind,
            amount,
            forex: None,
        })
    }

    /// A gross-value unit pairing the settlement-currency amount with its
    /// foreign equivalent. `settlement ~= foreign * rate` must hold within
    /// the rate tolerance.
    pub fn gross_value(
        settlement: MonetaryAmount,
        foreign: MonetaryAmount,
        rate: Decimal,
    ) -> Result<Self, DomainError> {
        if settlement.value().is_negative() || foreign.value().is_negative() {
            return Err(DomainError::NegativeUnitAmount(
                settlement.to_decimal().to_string(),
            ));
        }
        if rate <= Decimal::ZERO {
            return Err(DomainError::InconsistentUnit(format!(
                "exchange rate {} is not positive",
                rate
            )));
        }
        if !conversion_consistent(foreign.value(), rate, settlement.value()) {
            return Err(DomainError::InconsistentUnit(format!(
                "{} {} at rate {} does not amount to {} {}",
                foreign.to_decimal(),
                foreign.currency(),
                rate,
                settlement.to_decimal(),
                settlement.currency()
            )));
        }
        Ok(TransactionUnit {
            kind: UnitKind::GrossValue,
            amount: settlement,
            forex: Some(ForexPair {
                amount: foreign,
                rate,
            }),
        })
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn amount(&self) -> &MonetaryAmount {
        &self.amount
    }

    pub fn forex(&self) -> Option<&ForexPair> {
        self.forex.as_ref()
    }
}

/// A persisted transaction: the minimal representation the editing models
/// reconcile onto. `amount` is the total in the settlement currency and is
/// never negative once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub date: NaiveDateTime,
    pub security_id: Option<String>,
    pub shares: ShareQuantity,
    pub amount: MonetaryAmount,
    pub note: Option<String>,
    pub units: Vec<TransactionUnit>,
    /// Links the two legs of a transfer.
    pub transfer_id: Option<String>,
}

impl Transaction {
    pub fn new(kind: TransactionKind, date: NaiveDateTime, amount: MonetaryAmount) -> Self {
        Transaction {
            id: Uuid::new_v4().to_string(),
            kind,
            date,
            security_id: None,
            shares: ShareQuantity::ZERO,
            amount,
            note: None,
            units: Vec::new(),
            transfer_id: None,
        }
    }

    pub fn currency(&self) -> &str {
        self.amount.currency()
    }

    /// Sum of all unit amounts of the given kind, in the settlement currency.
    pub fn unit_total(&self, kind: UnitKind) -> Amount {
        self.units
            .iter()
            .filter(|unit| unit.kind() == kind)
            .fold(Amount::ZERO, |sum, unit| {
                sum.saturating_add(unit.amount().value())
            })
    }

    pub fn gross_value_unit(&self) -> Option<&TransactionUnit> {
        self.units
            .iter()
            .find(|unit| unit.kind() == UnitKind::GrossValue)
    }

    /// Whether the attached units sum consistently with the total.
    ///
    /// With a gross-value unit the total must reproduce from the unit's
    /// settlement amount through the direction-dependent formula (or match
    /// it outright for cash-only kinds). Without one, an acquisition total
    /// must at least cover its fees and taxes.
    pub fn units_reconcile(&self) -> bool {
        let fees = self.unit_total(UnitKind::Fee);
        let taxes = self.unit_total(UnitKind::Tax);
        match (self.gross_value_unit(), self.kind.sign_policy()) {
            (Some(unit), Some(policy)) => {
                self.amount.value() == policy.total_from_parts(unit.amount().value(), fees, taxes)
            }
            (Some(unit), None) => self.amount.value() == unit.amount().value(),
            (None, Some(SignPolicy::Acquisition)) => {
                self.amount.value() >= fees.saturating_add(taxes)
            }
            (None, _) => true,
        }
    }
}

/// A tradable instrument, referenced by identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    pub id: String,
    pub name: String,
    pub currency: String,
}

impl Security {
    pub fn new(id: impl Into<String>, name: impl Into<String>, currency: impl Into<String>) -> Self {
        Security {
            id: id.into(),
            name: name.into(),
            currency: currency.into(),
        }
    }
}

/// A cash account, referenced by identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub currency: String,
}

impl Account {
    pub fn new(id: impl Into<String>, name: impl Into<String>, currency: impl Into<String>) -> Self {
        Account {
            id: id.into(),
            name: name.into(),
            currency: currency.into(),
        }
    }
}

/// A securities portfolio. The reference account is the default settlement
/// account for its trades and lends deliveries their currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub id: String,
    pub name: String,
    pub reference_account_id: Option<String>,
    pub reference_currency: String,
}

impl Portfolio {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        reference_currency: impl Into<String>,
    ) -> Self {
        Portfolio {
            id: id.into(),
            name: name.into(),
            reference_account_id: None,
            reference_currency: reference_currency.into(),
        }
    }
}

/// A recurring plan template from which transactions are generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: String,
    pub name: String,
    pub security_id: String,
    pub portfolio_id: String,
    /// Absent for the deliver-without-cash-account mode.
    pub account_id: Option<String>,
    pub amount: MonetaryAmount,
    pub fees: MonetaryAmount,
    pub interval_months: u32,
    pub start_date: NaiveDate,
    pub auto_generate: bool,
}

/// The identity of a transaction's owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OwnerRef {
    Account(String),
    Portfolio(String),
}

impl OwnerRef {
    pub fn id(&self) -> &str {
        match self {
            OwnerRef::Account(id) | OwnerRef::Portfolio(id) => id,
        }
    }
}

/// Back-pointer to the transaction being edited and its current owner.
/// Consulted only when changes are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRef {
    pub transaction_id: String,
    pub owner: OwnerRef,
}

/// Back-pointers to both legs of a persisted transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSourceRef {
    pub transfer_id: String,
    pub outbound: SourceRef,
    pub inbound: SourceRef,
}
