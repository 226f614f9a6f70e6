use flow_index::{FlowIndex, IndexConfig, NodeView, SilentReporter};

#[cfg(test)]
mod tests {
    use super::*;

    const ROADS: [(&str, u32); 7] = [
        ("A", 50),
        ("B", 30),
        ("C", 70),
        ("D", 20),
        ("E", 40),
        ("F", 60),
        ("G", 80),
    ];

    fn silent_index() -> FlowIndex<&'static str, u32> {
        FlowIndex::with_reporter(IndexConfig::default(), SilentReporter)
    }

    fn seven_roads() -> FlowIndex<&'static str, u32> {
        let mut index = silent_index();
        for (road, flow) in ROADS {
            index.add(road, flow);
            index.assert_invariants();
        }
        index
    }

    fn weights(index: &FlowIndex<&'static str, u32>) -> Vec<u32> {
        index.iter().map(|(_, w)| *w).collect()
    }

    fn keys(index: &FlowIndex<&'static str, u32>) -> Vec<&'static str> {
        index.iter().map(|(k, _)| *k).collect()
    }

    fn shape(node: NodeView<'_, &'static str, u32>) -> (u32, Option<u32>, Option<u32>) {
        (
            *node.weight(),
            node.left().map(|n| *n.weight()),
            node.right().map(|n| *n.weight()),
        )
    }

    #[test]
    fn test_empty_index() {
        let index = silent_index();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert_eq!(index.height(), 0);
        assert!(index.root().is_none());
        assert!(index.min().is_none());
        assert_eq!(index.iter().count(), 0);
        index.assert_invariants();
    }

    #[test]
    fn test_inorder_round_trip() {
        let index = seven_roads();
        assert_eq!(index.len(), 7);
        assert_eq!(weights(&index), vec![20, 30, 40, 50, 60, 70, 80]);
        assert_eq!(keys(&index), vec!["D", "B", "E", "A", "F", "C", "G"]);
        assert_eq!(index.inorder_string(), "D:20  B:30  E:40  A:50  F:60  C:70  G:80");
        assert_eq!(index.height(), 3);
    }

    #[test]
    fn test_right_right_rotation() {
        let mut index = silent_index();
        index.add("x", 10);
        index.add("y", 20);
        index.add("z", 30);

        let root = index.root().unwrap();
        assert_eq!(shape(root), (20, Some(10), Some(30)));
        assert_eq!(root.height(), 2);
        assert!(root.left().unwrap().is_leaf());
        assert!(root.right().unwrap().is_leaf());
        index.assert_invariants();
    }

    #[test]
    fn test_left_left_rotation() {
        let mut index = silent_index();
        for (road, flow) in [("x", 30), ("y", 20), ("z", 10)] {
            index.add(road, flow);
        }
        assert_eq!(shape(index.root().unwrap()), (20, Some(10), Some(30)));
        index.assert_invariants();
    }

    #[test]
    fn test_left_right_rotation() {
        let mut index = silent_index();
        for (road, flow) in [("x", 30), ("y", 10), ("z", 20)] {
            index.add(road, flow);
        }
        let root = index.root().unwrap();
        assert_eq!(shape(root), (20, Some(10), Some(30)));
        assert_eq!(*root.key(), "z");
        index.assert_invariants();
    }

    #[test]
    fn test_right_left_rotation() {
        let mut index = silent_index();
        for (road, flow) in [("x", 10), ("y", 30), ("z", 20)] {
            index.add(road, flow);
        }
        let root = index.root().unwrap();
        assert_eq!(shape(root), (20, Some(10), Some(30)));
        assert_eq!(*root.key(), "z");
        index.assert_invariants();
    }

    #[test]
    fn test_remove_node_with_two_children() {
        let mut index = seven_roads();
        let removed = index.remove(&50);

        assert_eq!(removed.map(|e| (e.key, e.weight)), Some(("A", 50)));
        assert_eq!(weights(&index), vec![20, 30, 40, 60, 70, 80]);
        assert_eq!(keys(&index), vec!["D", "B", "E", "F", "C", "G"]);

        // The in-order successor took over the root slot.
        let root = index.root().unwrap();
        assert_eq!(*root.key(), "F");
        assert_eq!(shape(root), (60, Some(30), Some(70)));
        assert_eq!(shape(root.right().unwrap()), (70, None, Some(80)));
        assert_eq!(index.len(), 6);
        index.assert_invariants();
    }

    #[test]
    fn test_remove_leaf_and_single_child() {
        let mut index = seven_roads();
        assert_eq!(index.remove(&80).map(|e| e.key), Some("G"));
        assert_eq!(index.remove(&70).map(|e| e.key), Some("C"));
        assert_eq!(weights(&index), vec![20, 30, 40, 50, 60]);
        index.assert_invariants();
    }

    #[test]
    fn test_remove_missing_weight_is_noop() {
        let mut index = seven_roads();
        let before = weights(&index);

        assert_eq!(index.remove(&55), None);
        assert_eq!(index.remove(&0), None);
        assert_eq!(weights(&index), before);
        assert_eq!(index.len(), 7);
        index.assert_invariants();

        let mut empty = silent_index();
        assert_eq!(empty.remove(&1), None);
        assert!(empty.is_empty());
    }

    #[test]
    fn test_remove_right_right_rebalance() {
        let mut index = silent_index();
        for (road, flow) in [("a", 20), ("b", 10), ("c", 30), ("d", 40)] {
            index.add(road, flow);
        }
        index.remove(&10);
        assert_eq!(shape(index.root().unwrap()), (30, Some(20), Some(40)));
        index.assert_invariants();
    }

    #[test]
    fn test_remove_right_left_rebalance() {
        let mut index = silent_index();
        for (road, flow) in [("a", 20), ("b", 10), ("c", 30), ("d", 25)] {
            index.add(road, flow);
        }
        index.remove(&10);
        assert_eq!(shape(index.root().unwrap()), (25, Some(20), Some(30)));
        index.assert_invariants();
    }

    #[test]
    fn test_remove_left_left_with_balanced_child() {
        let mut index = silent_index();
        for (road, flow) in [("a", 30), ("b", 20), ("c", 40), ("d", 10), ("e", 25)] {
            index.add(road, flow);
        }
        index.remove(&40);

        let root = index.root().unwrap();
        assert_eq!(shape(root), (20, Some(10), Some(30)));
        assert_eq!(shape(root.right().unwrap()), (30, Some(25), None));
        assert_eq!(root.height(), 3);
        index.assert_invariants();
    }

    #[test]
    fn test_duplicate_weights() {
        let mut index = silent_index();
        for road in ["a", "b", "c", "d", "e"] {
            index.add(road, 5);
            index.assert_invariants();
        }
        assert_eq!(index.len(), 5);
        assert_eq!(weights(&index), vec![5; 5]);

        let mut removed: Vec<&str> = (0..5).filter_map(|_| index.remove(&5)).map(|e| e.key).collect();
        removed.sort();
        assert_eq!(removed, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(index.remove(&5), None);
        assert!(index.is_empty());
    }

    #[test]
    fn test_lookup_helpers() {
        let index = seven_roads();
        assert_eq!(index.min().map(|e| e.key), Some("D"));
        assert_eq!(index.get(&60).map(|e| e.key), Some("F"));
        assert!(index.contains_weight(&40));
        assert!(!index.contains_weight(&45));
    }

    #[test]
    fn test_clear() {
        let mut index = seven_roads();
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.height(), 0);
        index.add("Z", 1);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_sequential_inserts_stay_balanced() {
        let mut index = silent_index();
        for flow in 0..1_000u32 {
            index.add("road", flow);
        }
        index.assert_invariants();

        let bound = 1.44 * ((index.len() + 2) as f64).log2();
        assert!((index.height() as f64) <= bound, "height {} over {}", index.height(), bound);

        for flow in (0..1_000u32).step_by(2) {
            assert!(index.remove(&flow).is_some());
        }
        index.assert_invariants();
        assert_eq!(index.len(), 500);
        assert!(weights(&index).iter().all(|w| w % 2 == 1));
    }

    #[test]
    fn test_random_workload() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(7);
        let mut index = silent_index();
        let mut model: Vec<u32> = Vec::new();

        for _ in 0..2_000 {
            let flow = rng.gen_range(0..200);
            if rng.gen_bool(0.6) {
                index.add("road", flow);
                model.push(flow);
            } else if let Some(pos) = model.iter().position(|w| *w == flow) {
                assert!(index.remove(&flow).is_some());
                model.swap_remove(pos);
            } else {
                assert!(index.remove(&flow).is_none());
            }
        }

        index.assert_invariants();
        model.sort_unstable();
        assert_eq!(weights(&index), model);
        let bound = 1.44 * ((index.len() + 2) as f64).log2();
        assert!((index.height() as f64) <= bound);
    }
}
