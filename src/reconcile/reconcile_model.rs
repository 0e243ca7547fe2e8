use serde::{Deserialize, Serialize};

use crate::domain::{OwnerRef, SourceRef};

/// How an apply operation maps onto the persisted store.
///
/// Computed once from the source back-reference and the currently selected
/// owner, never inferred ad hoc from identity comparisons mid-write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ApplyMode {
    /// No source transaction: insert a fresh one.
    New,
    /// Editing without changing the owner: mutate in place.
    InPlace(OwnerRef),
    /// The owner changed: delete from the old owner, insert into the new
    /// one, so no dangling state stays behind.
    Moved { from: OwnerRef, to: OwnerRef },
}

pub fn resolve_apply_mode(source: Option<&SourceRef>, target: &OwnerRef) -> ApplyMode {
    match source {
        None => ApplyMode::New,
        Some(source) if source.owner == *target => ApplyMode::InPlace(target.clone()),
        Some(source) => ApplyMode::Moved {
            from: source.owner.clone(),
            to: target.clone(),
        },
    }
}
