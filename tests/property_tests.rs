//! Property-based tests for graph construction.
//!
//! These tests verify invariants that should hold regardless of input:
//! - Built graphs respect the degree bound and have no self-loops
//! - Edge distances match the metric
//! - Robust pruning is idempotent and monotone in alpha
//! - Greedy search visits the start first and returns min(k, visited) results
//! - Medoid selection is deterministic

use proptest::prelude::*;
use stitched_vamana::graph::Graph;
use stitched_vamana::init::random_graph;
use stitched_vamana::medoid::find_medoid;
use stitched_vamana::prune::{robust_prune, select_neighbors};
use stitched_vamana::search::{greedy_search, SearchParams};
use stitched_vamana::{
    build_stitched, build_vamana, Dataset, LabelPartition, MedoidStrategy, StitchedParams,
    VamanaParams,
};

prop_compose! {
    fn arb_dataset(max_n: usize, max_dim: usize)
        (n in 1..=max_n, dim in 1..=max_dim)
        (raw in prop::collection::vec(-10.0f32..10.0, n * dim), dim in Just(dim))
        -> Dataset
    {
        Dataset::new(dim, raw).unwrap()
    }
}

fn seeded_graph(data: &Dataset, r: usize, seed: u64) -> Graph {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    random_graph(data, r, &mut StdRng::seed_from_u64(seed)).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn build_respects_degree_bound(
        data in arb_dataset(40, 4),
        r in 1usize..6,
        l in 1usize..10,
        alpha in 1.0f32..2.0,
        seed in any::<u64>(),
    ) {
        let params = VamanaParams {
            max_degree: r,
            search_list_size: l,
            alpha,
            seed,
            ..VamanaParams::default()
        };
        let index = build_vamana(&data, &params).unwrap();
        let graph = index.graph();

        prop_assert_eq!(graph.len(), data.len());
        prop_assert!(graph.max_out_degree() <= r);
        prop_assert!(!graph.has_self_loops());
        prop_assert!(!graph.has_duplicate_edges());
        for v in 0..data.len() as u32 {
            for e in graph.neighbors(v) {
                prop_assert_eq!(e.distance, data.distance(v, e.id));
            }
        }
    }

    #[test]
    fn stitched_respects_global_degree_bound(
        data in arb_dataset(40, 3),
        num_labels in 1u32..4,
        r_small in 1usize..5,
        r_stitched in 1usize..6,
        seed in any::<u64>(),
    ) {
        let n = data.len();
        // Point i carries label i % num_labels, and label 99 when i % 3 == 0.
        let sets: Vec<Vec<u32>> = (0..n as u32)
            .map(|i| {
                let mut s = vec![i % num_labels];
                if i % 3 == 0 {
                    s.push(99);
                }
                s
            })
            .collect();
        let labels = LabelPartition::from_label_sets(&sets, n).unwrap();
        let params = StitchedParams {
            alpha: 1.2,
            l_small: 8,
            r_small,
            r_stitched,
            seed,
            ..StitchedParams::default()
        };

        let index = build_stitched(&data, &labels, &params).unwrap();
        prop_assert!(index.graph().max_out_degree() <= r_stitched);
        prop_assert!(!index.graph().has_self_loops());
    }

    #[test]
    fn prune_is_idempotent(
        data in arb_dataset(30, 4),
        alpha in 1.0f32..3.0,
        r in 1usize..8,
        seed in any::<u64>(),
    ) {
        let n = data.len();
        let mut graph = seeded_graph(&data, r, seed);
        let candidates: Vec<u32> = (0..n as u32).collect();

        robust_prune(&mut graph, &data, 0, candidates, alpha, r).unwrap();
        let first = graph.neighbors(0).to_vec();
        let own: Vec<u32> = first.iter().map(|e| e.id).collect();

        robust_prune(&mut graph, &data, 0, own, alpha, r).unwrap();
        prop_assert_eq!(graph.neighbors(0), first.as_slice());
    }

    #[test]
    fn larger_alpha_never_selects_fewer(
        coords in prop::collection::vec(-50i32..50, 2..30),
        a1 in 1.0f32..4.0,
        bump in 0.0f32..4.0,
        r in 1usize..12,
    ) {
        // 1-D integer points keep every distance exact.
        let raw: Vec<f32> = coords.iter().map(|&c| c as f32).collect();
        let n = raw.len();
        let data = Dataset::new(1, raw).unwrap();
        let pool: Vec<u32> = (1..n as u32).collect();

        let tight = select_neighbors(n, &data, 0, pool.clone(), a1, r).unwrap();
        let loose = select_neighbors(n, &data, 0, pool, a1 + bump, r).unwrap();
        prop_assert!(loose.len() >= tight.len());
    }

    #[test]
    fn greedy_search_result_size(
        data in arb_dataset(40, 3),
        degree in 1usize..5,
        l in 1usize..12,
        k_raw in 1usize..12,
        start_raw in any::<u32>(),
        seed in any::<u64>(),
    ) {
        let k = k_raw.min(l);
        let n = data.len();
        let graph = seeded_graph(&data, degree, seed);
        let start = start_raw % n as u32;
        let query = data.point((start_raw / 7) % n as u32).to_vec();

        let out = greedy_search(&graph, &data, &query, start, &SearchParams::new(k, l)).unwrap();
        prop_assert_eq!(out.visited[0].0, start);
        prop_assert_eq!(out.results.len(), k.min(out.visited.len()));
        for w in out.results.windows(2) {
            prop_assert!(w[0].1 <= w[1].1);
        }
    }

    #[test]
    fn medoid_is_deterministic(data in arb_dataset(30, 4), seed in any::<u64>()) {
        let exact = find_medoid(&data, &MedoidStrategy::Exact).unwrap();
        prop_assert_eq!(exact, find_medoid(&data, &MedoidStrategy::Exact).unwrap());

        let sampled = MedoidStrategy::Sampled { sample_size: 5, seed };
        let m = find_medoid(&data, &sampled).unwrap();
        prop_assert_eq!(m, find_medoid(&data, &sampled).unwrap());
        prop_assert!((m as usize) < data.len());
    }
}
