use std::collections::HashMap;

use chrono::NaiveDate;

use crate::holdings::{HoldingsScope, PositionSnapshot};

/// Trait defining the contract for holdings-snapshot queries.
///
/// `position_at` answers with the position held in the given scope as of
/// the date, or `None` when nothing is held. Queries are synchronous and
/// side-effect free; the engine uses them only to pre-fill defaults.
pub trait HoldingsViewTrait: Send + Sync {
    fn position_at(
        &self,
        scope: &HoldingsScope,
        security_id: &str,
        date: NaiveDate,
    ) -> Option<PositionSnapshot>;
}

/// A view with no holdings; every query is absent.
#[derive(Clone, Default)]
pub struct EmptyHoldingsView;

impl HoldingsViewTrait for EmptyHoldingsView {
    fn position_at(
        &self,
        _scope: &HoldingsScope,
        _security_id: &str,
        _date: NaiveDate,
    ) -> Option<PositionSnapshot> {
        None
    }
}

/// A fixed in-memory holdings view for tests and previews. Positions are
/// keyed by scope and security; the date is ignored.
#[derive(Clone, Default)]
pub struct StaticHoldingsView {
    positions: HashMap<(HoldingsScope, String), PositionSnapshot>,
}

impl StaticHoldingsView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, scope: HoldingsScope, security_id: &str, snapshot: PositionSnapshot) {
        self.positions
            .insert((scope, security_id.to_string()), snapshot);
    }
}

impl HoldingsViewTrait for StaticHoldingsView {
    fn position_at(
        &self,
        scope: &HoldingsScope,
        security_id: &str,
        _date: NaiveDate,
    ) -> Option<PositionSnapshot> {
        self.positions
            .get(&(scope.clone(), security_id.to_string()))
            .cloned()
    }
}
