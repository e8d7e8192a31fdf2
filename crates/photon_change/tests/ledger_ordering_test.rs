use photon_change::{AssetChangeOperation as Op, OperationLedger};
use proptest::prelude::*;
use strum::IntoEnumIterator;

const DEPENDENTS: [Op; 3] = [Op::OpenWriteHandle, Op::AddResource, Op::AddFilters];
const OTHERS: [Op; 7] = [
    Op::SetEditMetadata,
    Op::SetMovingPhotoEffectMode,
    Op::SaveCapture,
    Op::SetTitle,
    Op::SetFavorite,
    Op::SetHidden,
    Op::SetUserComment,
];

fn ledger_of(operations: &[Op]) -> OperationLedger {
    let mut ledger = OperationLedger::new();
    for operation in operations {
        ledger.record(*operation);
    }
    ledger
}

#[test]
fn test_plain_operations_append() {
    let ledger = ledger_of(&[Op::SetFavorite, Op::SetHidden, Op::SetUserComment]);
    assert_eq!(
        ledger.as_slice(),
        &[Op::SetFavorite, Op::SetHidden, Op::SetUserComment]
    );
}

#[test]
fn test_dependent_goes_right_after_creation() {
    let ledger = ledger_of(&[Op::CreateFromScratch, Op::SetTitle, Op::AddResource]);
    assert_eq!(
        ledger.as_slice(),
        &[Op::CreateFromScratch, Op::AddResource, Op::SetTitle]
    );
}

#[test]
fn test_resource_moves_ahead_of_effect_mode() {
    let ledger = ledger_of(&[Op::SetMovingPhotoEffectMode, Op::AddResource]);
    assert_eq!(
        ledger.as_slice(),
        &[Op::AddResource, Op::SetMovingPhotoEffectMode]
    );
}

#[test]
fn test_creation_rule_wins_over_effect_mode_rule() {
    let ledger = ledger_of(&[
        Op::CreateFromScratch,
        Op::SetMovingPhotoEffectMode,
        Op::AddResource,
    ]);
    assert_eq!(
        ledger.as_slice(),
        &[Op::CreateFromScratch, Op::AddResource, Op::SetMovingPhotoEffectMode]
    );
}

#[test]
fn test_late_creation_leads_and_pulls_dependents_forward() {
    let ledger = ledger_of(&[Op::SetFavorite, Op::AddResource, Op::CreateFromScratch]);
    assert_eq!(
        ledger.as_slice(),
        &[Op::CreateFromScratch, Op::AddResource, Op::SetFavorite]
    );
}

#[test]
fn test_counts_and_lookups() {
    let ledger = ledger_of(&[Op::CreateFromScratch, Op::AddResource, Op::AddResource]);
    assert_eq!(ledger.count(Op::AddResource), 2);
    assert_eq!(ledger.first(), Some(Op::CreateFromScratch));
    assert!(ledger.contains_any(&[Op::SaveCapture, Op::AddResource]));
    assert!(!ledger.contains(Op::SetTitle));
    assert_eq!(ledger.len(), 3);
}

fn call_orders() -> impl Strategy<Value = Vec<Op>> {
    (
        prop::sample::select(DEPENDENTS.to_vec()),
        prop::collection::vec(
            prop::sample::select([DEPENDENTS.to_vec(), OTHERS.to_vec()].concat()),
            0..8,
        ),
    )
        .prop_flat_map(|(dependent, mut rest)| {
            rest.push(dependent);
            rest.push(Op::CreateFromScratch);
            Just(rest).prop_shuffle()
        })
}

#[test]
fn test_operation_names_match_display() {
    for operation in Op::iter() {
        assert_eq!(operation.as_str(), operation.to_string());
    }
    assert_eq!(Op::SetMovingPhotoEffectMode.as_str(), "set_moving_photo_effect_mode");
    assert_eq!(Op::CreateFromScratch.as_str(), "create_from_scratch");
    assert_eq!(Op::SetUserComment.as_str(), "set_user_comment");
}

proptest! {
    #[test]
    fn creation_leads_and_a_dependent_follows(calls in call_orders()) {
        let ledger = ledger_of(&calls);

        prop_assert_eq!(ledger.first(), Some(Op::CreateFromScratch));
        prop_assert!(ledger.as_slice()[1].follows_creation());

        let mut recorded = ledger.as_slice().to_vec();
        let mut expected = calls.clone();
        recorded.sort();
        expected.sort();
        prop_assert_eq!(recorded, expected);
    }

    #[test]
    fn dependents_are_contiguous_after_creation(calls in call_orders()) {
        let ledger = ledger_of(&calls);
        let dependents = calls.iter().filter(|op| op.follows_creation()).count();
        prop_assert!(ledger.as_slice()[1..=dependents].iter().all(|op| op.follows_creation()));
    }
}
