//! Integration tests for ruffles-types.

use ruffles_types::{OrderedArena, RuffleError, SegmentId, VertexId};

fn collect(arena: &OrderedArena<SegmentId, u32>) -> Vec<u32> {
    arena.values().copied().collect()
}

// ─── Arena Tests ──────────────────────────────────────────────

#[test]
fn push_back_keeps_insertion_order() {
    let mut arena = OrderedArena::<SegmentId, u32>::new();
    arena.push_back(1);
    arena.push_back(2);
    arena.push_back(3);
    assert_eq!(collect(&arena), vec![1, 2, 3]);
    assert_eq!(arena.len(), 3);
}

#[test]
fn insert_before_splices_in_place() {
    let mut arena = OrderedArena::<SegmentId, u32>::new();
    let a = arena.push_back(1);
    let c = arena.push_back(3);
    let b = arena.insert_before(Some(c), 2);
    arena.insert_before(Some(a), 0);
    assert_eq!(collect(&arena), vec![0, 1, 2, 3]);
    assert_eq!(arena.next(a), Some(b));
    assert_eq!(arena.prev(c), Some(b));
}

#[test]
fn insert_after_last_appends() {
    let mut arena = OrderedArena::<SegmentId, u32>::new();
    let a = arena.push_back(1);
    let b = arena.insert_after(a, 2);
    assert_eq!(arena.last(), Some(b));
    arena.insert_after(a, 5);
    assert_eq!(collect(&arena), vec![1, 5, 2]);
}

#[test]
fn handles_survive_other_insertions_and_removals() {
    let mut arena = OrderedArena::<SegmentId, u32>::new();
    let a = arena.push_back(10);
    let b = arena.push_back(20);
    let c = arena.push_back(30);
    arena.insert_before(Some(b), 15);
    assert_eq!(arena.remove(b), Some(20));
    assert_eq!(arena[a], 10);
    assert_eq!(arena[c], 30);
    assert!(!arena.contains(b));
    assert_eq!(arena.get(b), None);
    assert_eq!(collect(&arena), vec![10, 15, 30]);
}

#[test]
fn removing_ends_updates_head_and_tail() {
    let mut arena = OrderedArena::<SegmentId, u32>::new();
    let a = arena.push_back(1);
    let b = arena.push_back(2);
    let c = arena.push_back(3);
    arena.remove(a);
    arena.remove(c);
    assert_eq!(arena.first(), Some(b));
    assert_eq!(arena.last(), Some(b));
    arena.remove(b);
    assert!(arena.is_empty());
    assert_eq!(arena.first(), None);
    assert_eq!(arena.last(), None);
}

#[test]
fn position_follows_list_order() {
    let mut arena = OrderedArena::<VertexId, u32>::new();
    let b = arena.push_back(2);
    let a = arena.insert_before(Some(b), 1);
    assert_eq!(arena.position(a), Some(0));
    assert_eq!(arena.position(b), Some(1));
}

#[test]
fn clone_is_independent() {
    let mut arena = OrderedArena::<SegmentId, u32>::new();
    let a = arena.push_back(1);
    let mut copy = arena.clone();
    copy[a] = 7;
    copy.push_back(8);
    assert_eq!(arena[a], 1);
    assert_eq!(arena.len(), 1);
    assert_eq!(copy.len(), 2);
}

#[test]
fn arena_is_serializable() {
    let mut arena = OrderedArena::<SegmentId, u32>::new();
    let a = arena.push_back(4);
    arena.push_back(5);
    let json = serde_json::to_string(&arena).unwrap();
    let back: OrderedArena<SegmentId, u32> = serde_json::from_str(&json).unwrap();
    assert_eq!(collect(&back), vec![4, 5]);
    assert_eq!(back[a], 4);
}

// ─── Error Tests ──────────────────────────────────────────────

#[test]
fn error_display() {
    let err = RuffleError::topology("section has fewer than 2 segments");
    assert!(err.to_string().contains("fewer than 2 segments"));
}

#[test]
fn ambiguous_apex_display() {
    let err = RuffleError::AmbiguousApex { candidates: 3 };
    assert!(err.to_string().contains('3'));
}
