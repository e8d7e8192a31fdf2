//! Mutual exclusion between edit commits and reverts.

use parking_lot::RwLock;
use photon_core::AssetId;
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

#[derive(Debug, Default)]
struct GuardSets {
    editing: HashSet<AssetId>,
    reverting: HashSet<AssetId>,
}

/// Keeps an edit commit and a revert from running on the same asset at once.
///
/// Starts never block: a conflicting start returns `false` and the caller
/// retries. Ids are independent of each other. No I/O happens under the
/// lock.
///
/// # Examples
///
/// ```
/// use photon_change::EditCommitGuard;
/// use photon_core::AssetId;
///
/// let guard = EditCommitGuard::new();
/// assert!(guard.try_start_commit(AssetId(1)));
/// assert!(!guard.try_start_revert(AssetId(1)));
/// assert!(guard.try_start_revert(AssetId(2)));
/// guard.end_commit(AssetId(1));
/// assert!(guard.try_start_revert(AssetId(1)));
/// ```
#[derive(Debug, Default)]
pub struct EditCommitGuard {
    sets: RwLock<GuardSets>,
}

static GLOBAL_GUARD: OnceLock<Arc<EditCommitGuard>> = OnceLock::new();

impl EditCommitGuard {
    /// Create an empty guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide guard, shared by every library instance.
    pub fn global() -> Arc<EditCommitGuard> {
        Arc::clone(GLOBAL_GUARD.get_or_init(|| Arc::new(EditCommitGuard::new())))
    }

    /// Mark `id` as being edited.
    ///
    /// Fails if the asset is being reverted or already being edited.
    pub fn try_start_commit(&self, id: AssetId) -> bool {
        let mut sets = self.sets.write();
        if sets.reverting.contains(&id) {
            tracing::debug!(asset_id = %id, "Commit refused: asset is being reverted");
            return false;
        }
        sets.editing.insert(id)
    }

    /// Clear the edit mark of `id`.
    pub fn end_commit(&self, id: AssetId) {
        self.sets.write().editing.remove(&id);
    }

    /// Mark `id` as being reverted.
    ///
    /// Fails if the asset is being edited or already being reverted.
    pub fn try_start_revert(&self, id: AssetId) -> bool {
        let mut sets = self.sets.write();
        if sets.editing.contains(&id) {
            tracing::debug!(asset_id = %id, "Revert refused: asset is being edited");
            return false;
        }
        sets.reverting.insert(id)
    }

    /// Clear the revert mark of `id`.
    pub fn end_revert(&self, id: AssetId) {
        self.sets.write().reverting.remove(&id);
    }

    /// Whether an edit commit on `id` is in progress.
    pub fn is_under_edit(&self, id: AssetId) -> bool {
        self.sets.read().editing.contains(&id)
    }

    /// Whether a revert of `id` is in progress.
    pub fn is_under_revert(&self, id: AssetId) -> bool {
        self.sets.read().reverting.contains(&id)
    }
}
