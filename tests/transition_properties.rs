use std::sync::Arc;

use fragcrab::{
    BondChannel, Case, FragmentState, GroupAction, Rejection, StateError, Transition,
    SLOT_CAPACITY,
};

fn case() -> Arc<Case> {
    Arc::new(Case::from_json(include_str!("data/case.json")).unwrap())
}

fn all_actions(state: &FragmentState) -> Vec<GroupAction> {
    let mut actions = Vec::new();
    for block in 0..state.num_bb() {
        if state.is_empty() {
            actions.push(GroupAction::first(block));
            continue;
        }
        for head in BondChannel::ALL {
            for tail in state.graph().composite_ids() {
                for tail_channel in BondChannel::ALL {
                    actions.push(GroupAction::attach(block, head, tail, tail_channel));
                }
            }
        }
    }
    actions
}

fn check_invariants(state: &FragmentState) {
    assert_eq!(state.node_count() as u32, state.total_groups());
    if !state.is_empty() {
        assert_eq!(state.bond_count() + 1, state.node_count());
    }
    for g in state.graph().groups() {
        assert!(g.remaining.is_consistent(), "inconsistent valence on {}", g.composite_id());
        let id = g.composite_id() as usize;
        assert_eq!(state.valence().total[id], u32::from(g.remaining.total));
        assert_eq!(state.valence().va[id], u32::from(g.remaining.va));
        assert_eq!(state.valence().vb[id], u32::from(g.remaining.vb));
        assert_eq!(state.valence().vc[id], u32::from(g.remaining.vc));
    }
    // each bond spends exactly two units of valence in total
    let full: u32 = state.graph().groups().map(|g| u32::from(g.full.total)).sum();
    let remaining: u32 = state.graph().groups().map(|g| u32::from(g.remaining.total)).sum();
    assert_eq!(full - remaining, 2 * state.bond_count() as u32);
}

#[test]
fn case_fixture_loads() {
    let case = case();
    assert_eq!(case.bb(), &[1, 4, 5, 6]);
    assert_eq!(case.catalog().len(), 6);
    assert_eq!(case.aromatic_blocks(), vec![5]);
}

#[test]
fn exhaustive_three_steps_preserve_invariants() {
    let mut frontier = vec![FragmentState::empty(case())];
    let mut accepted = 0usize;
    let mut rejected = 0usize;

    for _ in 0..3 {
        let mut next = Vec::new();
        for state in &frontier {
            let key = state.key().clone();
            let counts = state.group_count().to_vec();
            for action in all_actions(state) {
                match state.add_group(&action).unwrap() {
                    Transition::Accepted(child) => {
                        accepted += 1;
                        check_invariants(&child);
                        assert_eq!(child.total_groups(), state.total_groups() + 1);
                        for (before, after) in counts.iter().zip(child.group_count()) {
                            assert!(after >= before);
                        }
                        assert_eq!(child.group_count()[action.block], counts[action.block] + 1);
                        next.push(child);
                    }
                    Transition::Rejected(_) => rejected += 1,
                }
                assert_eq!(state.key(), &key, "parent mutated by {action:?}");
                assert_eq!(state.group_count(), counts.as_slice());
            }
        }
        frontier = next;
    }

    assert!(accepted > 0);
    assert!(rejected > 0);
}

#[test]
fn rejections_are_explained() {
    let s = FragmentState::empty(case());
    // type 5 has a single vc
    let s = s
        .add_group(&GroupAction::first(2))
        .unwrap()
        .into_state()
        .unwrap();
    assert_eq!(s.graph().group(20).unwrap().remaining.vc, 1);

    let t = s
        .add_group(&GroupAction::attach(0, BondChannel::A, 20, BondChannel::A))
        .unwrap();
    assert_eq!(
        t.rejection(),
        Some(Rejection::TailChannelExhausted {
            tail: 20,
            channel: BondChannel::A
        })
    );

    let t = s
        .add_group(&GroupAction::attach(0, BondChannel::A, 21, BondChannel::C))
        .unwrap();
    assert_eq!(t.rejection(), Some(Rejection::TailNotFound { tail: Some(21) }));

    let t = s
        .add_group(&GroupAction::attach(0, BondChannel::A, 20, BondChannel::C))
        .unwrap();
    assert!(t.is_accepted());
}

#[test]
fn eleventh_instance_is_fatal() {
    // type 6 (block 3) has two va, so a chain of them can grow indefinitely
    let mut s = FragmentState::empty(case())
        .add_group(&GroupAction::first(3))
        .unwrap()
        .into_state()
        .unwrap();
    for slot in 1..SLOT_CAPACITY {
        let tail = 30 + slot as u32 - 1;
        s = s
            .add_group(&GroupAction::attach(3, BondChannel::A, tail, BondChannel::A))
            .unwrap()
            .into_state()
            .unwrap();
    }
    assert_eq!(s.count_of(6), SLOT_CAPACITY as u32);

    for tail in [39, 99] {
        let err = s
            .add_group(&GroupAction::attach(3, BondChannel::A, tail, BondChannel::A))
            .unwrap_err();
        assert_eq!(
            err,
            StateError::SlotCapacityExceeded {
                block: 3,
                capacity: SLOT_CAPACITY
            }
        );
    }

    // other blocks are unaffected
    assert!(s
        .add_group(&GroupAction::attach(0, BondChannel::A, 39, BondChannel::A))
        .unwrap()
        .is_accepted());
}
