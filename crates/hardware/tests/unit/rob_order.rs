//! Reorder Buffer Ordering.
//!
//! Completion and branch resolution arrive in random order; commit must
//! still retire every entry exactly once, oldest first.

use ooosim_core::common::InstrId;
use ooosim_core::core::pipeline::ReorderBuffer;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn scenario() -> impl Strategy<Value = (Vec<bool>, Vec<usize>)> {
    prop::collection::vec(prop::bool::weighted(0.25), 1..48).prop_flat_map(|branches| {
        let order: Vec<usize> = (0..branches.len()).collect();
        (Just(branches), Just(order).prop_shuffle())
    })
}

proptest! {
    #[test]
    fn test_commit_is_in_program_order((branches, completion) in scenario()) {
        let mut rob = ReorderBuffer::new(64);
        for (i, is_branch) in branches.iter().enumerate() {
            let id = InstrId(i as u64);
            let _ = rob.dispatch(id, rob.is_speculating());
            if *is_branch {
                rob.add_branch(id);
            }
        }

        let mut committed = Vec::new();
        let mut resolved = BTreeSet::new();
        for i in completion {
            let id = InstrId(i as u64);
            rob.mark_executed(id);
            if branches[i] {
                rob.resolve_branch(id);
                let _ = resolved.insert(id);
            }
            while rob.can_commit() {
                let head = rob.commit_head();
                let unresolved_older = branches
                    .iter()
                    .enumerate()
                    .any(|(b, is_branch)| *is_branch
                        && InstrId(b as u64) < head
                        && !resolved.contains(&InstrId(b as u64)));
                prop_assert!(!unresolved_older, "{head} committed under an unresolved branch");
                committed.push(head);
            }
        }

        let expected: Vec<InstrId> = (0..branches.len() as u64).map(InstrId).collect();
        prop_assert_eq!(committed, expected);
        prop_assert!(rob.is_empty());
    }
}

#[test]
fn test_squash_keeps_older_entries() {
    let mut rob = ReorderBuffer::new(8);
    for i in 0..5 {
        let id = InstrId(i);
        let _ = rob.dispatch(id, rob.is_speculating());
        if i == 1 {
            rob.add_branch(id);
        }
    }
    rob.invalidate_from(InstrId(2));
    let removed = rob.purge_removable();
    assert_eq!(removed, vec![InstrId(2), InstrId(3), InstrId(4)]);
    assert_eq!(rob.len(), 2);
    assert!(!rob.is_speculating());
}
