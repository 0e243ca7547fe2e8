//! Recurring plan template entry model.

mod plan_model;

#[cfg(test)]
mod plan_model_tests;

pub use plan_model::PlanEntryModel;
