//! Ordered record of the operations on one change request.

use crate::AssetChangeOperation;

/// Ordered list of operation kinds.
///
/// Ledger order is replay order. [`OperationLedger::record`] places each kind
/// so that dependencies execute first:
///
/// - creations always lead
/// - with a from-scratch creation present, write-handle, resource and filter
///   operations go right after it
/// - with an effect mode present, a resource goes to the front, so the mode
///   is written together with the new bytes
///
/// # Examples
///
/// ```
/// use photon_change::{AssetChangeOperation as Op, OperationLedger};
///
/// let mut ledger = OperationLedger::new();
/// ledger.record(Op::CreateFromScratch);
/// ledger.record(Op::SetFavorite);
/// ledger.record(Op::AddResource);
/// assert_eq!(ledger.as_slice(), &[Op::CreateFromScratch, Op::AddResource, Op::SetFavorite]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationLedger {
    entries: Vec<AssetChangeOperation>,
}

impl OperationLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an operation at its ordered position.
    pub fn record(&mut self, operation: AssetChangeOperation) {
        if operation.is_creation() {
            self.entries.insert(0, operation);
            if operation == AssetChangeOperation::CreateFromScratch {
                self.hoist_dependents();
            }
            tracing::debug!(operation = %operation, position = 0, "Recorded operation");
            return;
        }

        let position = if operation.follows_creation()
            && self.contains(AssetChangeOperation::CreateFromScratch)
        {
            1
        } else if operation == AssetChangeOperation::AddResource
            && self.contains(AssetChangeOperation::SetMovingPhotoEffectMode)
        {
            0
        } else {
            self.entries.len()
        };
        self.entries.insert(position, operation);
        tracing::debug!(operation = %operation, position, "Recorded operation");
    }

    /// Move operations that depend on a creation recorded late to just
    /// behind it, keeping their relative order.
    fn hoist_dependents(&mut self) {
        let (mut dependents, others): (Vec<_>, Vec<_>) = self.entries[1..]
            .iter()
            .copied()
            .partition(|operation| operation.follows_creation());
        self.entries.truncate(1);
        self.entries.append(&mut dependents);
        self.entries.extend(others);
    }

    /// Whether the ledger holds the kind.
    pub fn contains(&self, operation: AssetChangeOperation) -> bool {
        self.entries.contains(&operation)
    }

    /// Whether the ledger holds any of the kinds.
    pub fn contains_any(&self, operations: &[AssetChangeOperation]) -> bool {
        operations.iter().any(|operation| self.contains(*operation))
    }

    /// Number of entries of the kind.
    pub fn count(&self, operation: AssetChangeOperation) -> usize {
        self.entries.iter().filter(|entry| **entry == operation).count()
    }

    /// First entry.
    pub fn first(&self) -> Option<AssetChangeOperation> {
        self.entries.first().copied()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in replay order.
    pub fn as_slice(&self) -> &[AssetChangeOperation] {
        &self.entries
    }

    /// Iterate entries in replay order.
    pub fn iter(&self) -> impl Iterator<Item = AssetChangeOperation> + '_ {
        self.entries.iter().copied()
    }
}
