use std::collections::HashSet;
use std::sync::Arc;

use crate::*;

fn two_block_case() -> Arc<Case> {
    let catalog = Catalog::new(vec![
        BuildingBlock {
            total_valence: 4,
            va: 2,
            vb: 1,
            vc: 1,
            aromatic: false,
            cyclic: false,
        },
        BuildingBlock {
            total_valence: 1,
            va: 1,
            vb: 0,
            vc: 0,
            aromatic: false,
            cyclic: false,
        },
    ])
    .unwrap();
    Arc::new(Case::new(Arc::new(catalog), vec![1, 2]).unwrap())
}

fn apply(state: &FragmentState, action: GroupAction) -> FragmentState {
    state
        .add_group(&action)
        .unwrap()
        .into_state()
        .expect("action should be accepted")
}

#[test]
fn worked_example() {
    let empty = FragmentState::empty(two_block_case());
    assert!(empty.is_empty());

    let a = apply(&empty, GroupAction::first(0));
    assert_eq!(a.group_count(), &[1, 0]);
    let node0 = a.graph().group(0).unwrap();
    assert_eq!((node0.remaining.va, node0.remaining.vb, node0.remaining.vc), (2, 1, 1));

    let b = apply(&a, GroupAction::attach(1, BondChannel::A, 0, BondChannel::A));
    assert_eq!(b.group_count(), &[1, 1]);
    assert_eq!(b.graph().group(0).unwrap().remaining.va, 1);
    let node1 = b.graph().group(10).unwrap();
    assert_eq!(node1.remaining.va, 0);
    assert_eq!(node1.remaining.total, 0);

    let key = a.key().clone();
    let rejected = a
        .add_group(&GroupAction::attach(1, BondChannel::A, 99, BondChannel::A))
        .unwrap();
    assert!(!rejected.is_accepted());
    assert_eq!(a.key(), &key);
    assert_eq!(a.group_count(), &[1, 0]);
    assert_eq!(a.node_count(), 1);
    assert_eq!(a.bond_count(), 0);
}

#[test]
fn empty_states_are_equal() {
    let case = two_block_case();
    let x = FragmentState::empty(Arc::clone(&case));
    let y = FragmentState::empty(case);
    assert_eq!(x, y);
    assert_eq!(x.key(), y.key());
}

#[test]
fn same_fragment_different_order_same_key() {
    let empty = FragmentState::empty(two_block_case());

    let via_core = {
        let s = apply(&empty, GroupAction::first(0));
        let s = apply(&s, GroupAction::attach(1, BondChannel::A, 0, BondChannel::A));
        apply(&s, GroupAction::attach(1, BondChannel::A, 0, BondChannel::B))
    };
    let via_leaf = {
        let s = apply(&empty, GroupAction::first(1));
        let s = apply(&s, GroupAction::attach(0, BondChannel::A, 10, BondChannel::A));
        apply(&s, GroupAction::attach(1, BondChannel::A, 0, BondChannel::B))
    };

    assert_eq!(via_core.key(), via_leaf.key());
    assert_eq!(via_core, via_leaf);
    assert!(via_core.is_isomorphic_to(&via_leaf));
    assert_eq!(via_core.canonical_form(), via_leaf.canonical_form());

    let mut seen = HashSet::new();
    seen.insert(via_core.key().clone());
    assert!(!seen.insert(via_leaf.key().clone()));
}

#[test]
fn different_fragments_differ() {
    let s = apply(
        &FragmentState::empty(two_block_case()),
        GroupAction::first(0),
    );
    let on_a = apply(&s, GroupAction::attach(1, BondChannel::A, 0, BondChannel::A));
    let on_c = apply(&s, GroupAction::attach(1, BondChannel::A, 0, BondChannel::C));
    assert_ne!(on_a.key(), on_c.key());
    assert!(!on_a.is_isomorphic_to(&on_c));
}

#[test]
fn node_count_tracks_composition() {
    let mut s = apply(
        &FragmentState::empty(two_block_case()),
        GroupAction::first(0),
    );
    let steps = [
        GroupAction::attach(0, BondChannel::A, 0, BondChannel::A),
        GroupAction::attach(1, BondChannel::A, 1, BondChannel::C),
        GroupAction::attach(1, BondChannel::A, 0, BondChannel::B),
        GroupAction::attach(0, BondChannel::B, 1, BondChannel::A),
    ];
    let mut prev = s.group_count().to_vec();
    for step in steps {
        s = apply(&s, step);
        assert_eq!(s.node_count() as u32, s.total_groups());
        assert_eq!(s.bond_count() + 1, s.node_count());
        for (before, after) in prev.iter().zip(s.group_count()) {
            assert!(after >= before);
        }
        for g in s.graph().groups() {
            assert!(g.remaining.is_consistent());
        }
        prev = s.group_count().to_vec();
    }
}
