//! Tests for [`ClusterStateCache`] — atomic per-collection storage.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use kaiju::{ClusterStateCache, ClusterStateView, Node, ResourceDescription};

fn nodes(ids: &[i32]) -> Vec<Node> {
    ids.iter()
        .map(|id| Node::new(*id, format!("host-{id}"), 9092))
        .collect()
}

#[test]
fn lookup_preserves_order_length_and_duplicates() {
    let cache = ClusterStateCache::new();
    cache.replace_nodes(nodes(&[1, 2, 3]));

    let got = cache.nodes_by_ids(&[3, 9, 1, 3]);
    let ids: Vec<Option<i32>> = got.iter().map(|n| n.as_ref().map(|n| n.id)).collect();
    assert_eq!(ids, vec![Some(3), None, Some(1), Some(3)]);
}

#[test]
fn empty_lookup_returns_empty() {
    let cache = ClusterStateCache::new();
    cache.replace_nodes(nodes(&[1]));
    assert!(cache.nodes_by_ids(&[]).is_empty());
    assert!(cache.resource_descriptions::<String>(&[]).is_empty());
}

#[test]
fn replace_sets_exact_id_set() {
    let cache = ClusterStateCache::new();
    cache.replace_nodes(nodes(&[1, 2, 3]));
    cache.replace_nodes(nodes(&[3, 4]));

    assert_eq!(cache.node_ids(), HashSet::from([3, 4]));
    assert_eq!(cache.nodes_by_ids(&[1]), vec![None]);
}

#[test]
fn empty_replace_clears_collection() {
    let cache = ClusterStateCache::new();
    cache.replace_nodes(nodes(&[1, 2]));
    cache.replace_nodes(Vec::new());
    assert!(cache.node_ids().is_empty());
}

#[test]
fn repeated_identical_replace_is_idempotent() {
    let cache = ClusterStateCache::new();
    cache.replace_nodes(nodes(&[1, 2]));
    let once_ids = cache.node_ids();
    let once_nodes = cache.nodes_by_ids(&[1, 2, 5]);

    cache.replace_nodes(nodes(&[1, 2]));
    assert_eq!(cache.node_ids(), once_ids);
    assert_eq!(cache.nodes_by_ids(&[1, 2, 5]), once_nodes);
}

#[test]
fn resource_lookup_reports_missing_names() {
    let cache = ClusterStateCache::new();
    let users = ResourceDescription::new("users");
    cache.replace_resource_descriptions(vec![ResourceDescription::new("orders"), users.clone()]);

    assert_eq!(
        cache.resource_names(),
        HashSet::from(["orders".to_string(), "users".to_string()])
    );
    assert_eq!(
        cache.resource_descriptions(&["users", "missing"]),
        vec![Some(users), None]
    );
}

#[test]
fn view_trait_lists_nodes_in_id_order() {
    let cache = ClusterStateCache::new();
    cache.replace_nodes(nodes(&[5, 1, 3]));

    let view: &dyn ClusterStateView = &cache;
    let ids: Vec<i32> = view.all_nodes().iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![1, 3, 5]);
}

#[test]
fn readers_never_observe_mixed_collections() {
    // Writer alternates between two disjoint sets; every read must match one
    // of them exactly.
    let set_a: HashSet<i32> = (0..50).collect();
    let set_b: HashSet<i32> = (100..175).collect();

    let cache = Arc::new(ClusterStateCache::new());
    cache.replace_nodes(nodes(&set_a.iter().copied().collect::<Vec<_>>()));

    let writer = {
        let cache = Arc::clone(&cache);
        let a: Vec<i32> = set_a.iter().copied().collect();
        let b: Vec<i32> = set_b.iter().copied().collect();
        thread::spawn(move || {
            for i in 0..500 {
                let ids = if i % 2 == 0 { &b } else { &a };
                cache.replace_nodes(nodes(ids));
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let a = set_a.clone();
            let b = set_b.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let seen = cache.node_ids();
                    assert!(seen == a || seen == b, "observed a torn collection");
                }
            })
        })
        .collect();

    writer.join().expect("writer panicked");
    for r in readers {
        r.join().expect("reader panicked");
    }
}

#[test]
fn collections_are_independent_under_concurrency() {
    let cache = Arc::new(ClusterStateCache::new());
    cache.replace_resource_descriptions(vec![ResourceDescription::new("orders")]);
    let resources_before = cache.resource_snapshot();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || cache.replace_nodes(nodes(&[i])))
        })
        .collect();
    for h in handles {
        h.join().expect("thread panicked");
    }

    assert_eq!(cache.node_count(), 1);
    assert!(Arc::ptr_eq(&resources_before, &cache.resource_snapshot()));
}
