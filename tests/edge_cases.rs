//! Edge case tests for graph construction.
//!
//! Tests unusual inputs and boundary conditions that could cause failures.

use stitched_vamana::graph::{Edge, Graph};
use stitched_vamana::prune::robust_prune;
use stitched_vamana::search::{greedy_search, SearchParams};
use stitched_vamana::{
    build_stitched, build_vamana, Dataset, LabelPartition, StitchedParams, VamanaError,
    VamanaParams,
};

fn tiny_params() -> VamanaParams {
    VamanaParams {
        max_degree: 4,
        search_list_size: 8,
        ..VamanaParams::default()
    }
}

// =============================================================================
// Input validation
// =============================================================================

#[test]
fn empty_dataset_is_invalid_input() {
    let rows: Vec<Vec<f32>> = Vec::new();
    assert!(matches!(
        Dataset::from_rows(&rows),
        Err(VamanaError::InvalidInput(_))
    ));
}

#[test]
fn zero_l_or_r_is_invalid_input() {
    let data = Dataset::from_rows(&[[0.0f32], [1.0], [2.0]]).unwrap();
    let zero_r = VamanaParams {
        max_degree: 0,
        ..tiny_params()
    };
    let zero_l = VamanaParams {
        search_list_size: 0,
        ..tiny_params()
    };
    assert!(matches!(
        build_vamana(&data, &zero_r),
        Err(VamanaError::InvalidInput(_))
    ));
    assert!(matches!(
        build_vamana(&data, &zero_l),
        Err(VamanaError::InvalidInput(_))
    ));

    let zero_stitched = StitchedParams {
        r_stitched: 0,
        ..StitchedParams::default()
    };
    let labels = LabelPartition::new(&[0, 0, 1], 3).unwrap();
    assert!(matches!(
        build_stitched(&data, &labels, &zero_stitched),
        Err(VamanaError::InvalidInput(_))
    ));
}

#[test]
fn start_outside_graph_is_invalid_state() {
    let data = Dataset::from_rows(&[[0.0f32], [1.0]]).unwrap();
    let graph = Graph::new(2);
    let err = greedy_search(&graph, &data, &[0.5], 5, &SearchParams::new(1, 1)).unwrap_err();
    assert!(matches!(err, VamanaError::InvalidState(_)));
}

#[test]
fn graph_dataset_size_mismatch_is_invalid_state() {
    let data = Dataset::from_rows(&[[0.0f32], [1.0]]).unwrap();
    let graph = Graph::new(3);
    assert!(matches!(
        greedy_search(&graph, &data, &[0.5], 0, &SearchParams::new(1, 1)),
        Err(VamanaError::InvalidState(_))
    ));
}

// =============================================================================
// Degenerate data
// =============================================================================

#[test]
fn duplicate_points_build_without_error() {
    let rows: Vec<Vec<f32>> = (0..12).map(|i| vec![(i / 4) as f32, 0.0]).collect();
    let data = Dataset::from_rows(&rows).unwrap();
    let index = build_vamana(&data, &tiny_params()).unwrap();

    assert!(index.graph().max_out_degree() <= 4);
    assert!(!index.graph().has_self_loops());

    let results = index.search(&data, &[1.0, 0.0], 4, 8).unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0].1, 0.0);
    // Ordered by distance, then by id among equal distances.
    assert!(results
        .windows(2)
        .all(|w| w[0].1 < w[1].1 || (w[0].1 == w[1].1 && w[0].0 < w[1].0)));
}

#[test]
fn all_points_identical() {
    let rows = vec![vec![3.0f32, 3.0]; 6];
    let data = Dataset::from_rows(&rows).unwrap();
    let index = build_vamana(&data, &tiny_params()).unwrap();
    assert_eq!(index.medoid(), 0);
    assert!(!index.graph().has_self_loops());
}

#[test]
fn r_at_least_n_minus_one_is_fully_connected_then_pruned() {
    let data = Dataset::from_rows(&[[0.0f32, 0.0], [1.0, 0.0], [0.0, 1.0]]).unwrap();
    let params = VamanaParams {
        max_degree: 10,
        search_list_size: 4,
        ..VamanaParams::default()
    };
    let index = build_vamana(&data, &params).unwrap();
    assert!(index.graph().max_out_degree() <= 2);
}

#[test]
fn single_label_stitched_matches_degree_bound() {
    let rows: Vec<Vec<f32>> = (0..30).map(|i| vec![i as f32, (i * i % 7) as f32]).collect();
    let data = Dataset::from_rows(&rows).unwrap();
    let labels = LabelPartition::new(&[4; 30], 30).unwrap();
    let params = StitchedParams {
        l_small: 10,
        r_small: 6,
        r_stitched: 3,
        ..StitchedParams::default()
    };
    let index = build_stitched(&data, &labels, &params).unwrap();
    assert!(index.graph().max_out_degree() <= 3);
    assert!(index.label_medoid(4).is_some());
}

#[test]
fn prune_with_empty_pool_leaves_node_bare() {
    let data = Dataset::from_rows(&[[0.0f32], [1.0]]).unwrap();
    let mut graph = Graph::new(2);
    graph.push_edge(1, Edge::new(0, 1.0));
    assert_eq!(robust_prune(&mut graph, &data, 0, [], 1.0, 3).unwrap(), 0);
    assert_eq!(graph.out_degree(0), 0);
    assert_eq!(graph.out_degree(1), 1);
}
