use crate::{Bits, Cover, Graph};
use bitvec::prelude::*;

/// VC1: take the vertex touching the most uncovered edges until none are
/// left. Ties go to the lowest index.
pub fn greedy_degree(graph: &Graph) -> Cover {
    let n = graph.vertex_count() as usize;
    let mut degree: Vec<usize> = (0..n as u32).map(|v| graph.deg(v)).collect();
    let mut covered: Bits = bitvec![usize, Lsb0; 0; graph.edges().len()];
    let mut selected: Bits = bitvec![usize, Lsb0; 0; n];

    loop {
        let mut best = None;
        let mut max = 0;
        for (v, &d) in degree.iter().enumerate() {
            if d > max {
                max = d;
                best = Some(v);
            }
        }
        let Some(v) = best else { break };

        selected.set(v, true);
        for &edge in graph.incident_edges(v as u32) {
            if covered[edge as usize] {
                continue;
            }
            covered.set(edge as usize, true);
            let (start, end) = graph.edges()[edge as usize];
            degree[start as usize] -= 1;
            if start != end {
                degree[end as usize] -= 1;
            }
        }
        debug_assert_eq!(degree[v], 0);
    }
    Cover::from(selected)
}

/// VC2: scan vertex pairs in lexicographic order and take both ends of every
/// pair that is still an uncovered edge.
pub fn greedy_edge_scan(graph: &Graph) -> Cover {
    let n = graph.vertex_count() as usize;
    let mut adjacent: Vec<Bits> = vec![bitvec![usize, Lsb0; 0; n]; n];
    for &(start, end) in graph.edges() {
        adjacent[start as usize].set(end as usize, true);
        adjacent[end as usize].set(start as usize, true);
    }

    let mut selected: Bits = bitvec![usize, Lsb0; 0; n];
    for i in 0..n {
        // `j == i` picks up self-loops
        for j in i..n {
            if !adjacent[i][j] {
                continue;
            }
            selected.set(i, true);
            selected.set(j, true);
            for v in [i, j] {
                adjacent[v].fill(false);
                for row in adjacent.iter_mut() {
                    row.set(v, false);
                }
            }
        }
    }
    Cover::from(selected)
}

/// Drops vertices of a valid `cover`, lowest first, as long as what remains
/// still covers every edge of `graph`.
pub fn prune(graph: &Graph, cover: &Cover) -> Cover {
    let mut keep = cover.to_bits(graph.vertex_count());
    for &v in cover.vertices() {
        keep.set(v as usize, false);
        if !graph.covered_by(&keep) {
            keep.set(v as usize, true);
        }
    }
    Cover::from(keep)
}

pub fn refined_greedy_degree(graph: &Graph) -> Cover {
    prune(graph, &greedy_degree(graph))
}

pub fn refined_greedy_edge_scan(graph: &Graph) -> Cover {
    prune(graph, &greedy_edge_scan(graph))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{all_graphs, brute_force_minimum, cycle4, path3};

    fn covers(vertices: &[u32]) -> Cover {
        Cover::new(vertices.to_vec())
    }

    #[test]
    fn test_single_edge() {
        let graph = Graph::new(2, vec![(0, 1)]);
        assert_eq!(greedy_degree(&graph), covers(&[0]));
        assert_eq!(greedy_edge_scan(&graph), covers(&[0, 1]));
        assert_eq!(refined_greedy_degree(&graph), covers(&[0]));
        assert_eq!(refined_greedy_edge_scan(&graph), covers(&[1]));
    }

    #[test]
    fn test_path() {
        let graph = path3();
        assert_eq!(greedy_degree(&graph), covers(&[1]));
        assert_eq!(greedy_edge_scan(&graph), covers(&[0, 1]));
        assert_eq!(refined_greedy_degree(&graph), covers(&[1]));
        assert_eq!(refined_greedy_edge_scan(&graph), covers(&[1]));
    }

    #[test]
    fn test_cycle() {
        let graph = cycle4();
        assert_eq!(greedy_degree(&graph), covers(&[0, 2]));
        assert_eq!(greedy_edge_scan(&graph), covers(&[0, 1, 2, 3]));
        assert_eq!(refined_greedy_degree(&graph), covers(&[0, 2]));
        assert_eq!(refined_greedy_edge_scan(&graph), covers(&[1, 3]));
    }

    #[test]
    fn test_degree_ties_take_lowest_index() {
        // star centres 1 and 3 both have degree 3
        let graph = Graph::new(6, vec![(1, 0), (1, 2), (1, 5), (3, 2), (3, 4), (3, 5)]);
        assert_eq!(greedy_degree(&graph), covers(&[1, 3]));
        let graph = Graph::new(4, vec![(2, 3), (0, 1)]);
        assert_eq!(greedy_degree(&graph), covers(&[0, 2]));
    }

    #[test]
    fn test_heuristics_disagree() {
        // a star: the degree rule takes the centre, the scan takes a leaf too
        let graph = Graph::new(4, vec![(0, 3), (1, 3), (2, 3)]);
        assert_eq!(greedy_degree(&graph), covers(&[3]));
        assert_eq!(greedy_edge_scan(&graph), covers(&[0, 3]));
        assert_eq!(refined_greedy_edge_scan(&graph), covers(&[3]));
    }

    #[test]
    fn test_self_loops() {
        let graph = Graph::new(3, vec![(0, 1), (2, 2)]);
        for cover in [
            greedy_degree(&graph),
            greedy_edge_scan(&graph),
            refined_greedy_degree(&graph),
            refined_greedy_edge_scan(&graph),
        ] {
            assert!(graph.validate_cover(&cover), "{cover:?}");
            assert!(cover.contains(2));
        }
    }

    #[test]
    fn test_valid_and_refined_subsets() {
        for n in 1..=5 {
            for graph in all_graphs(n) {
                let minimum = brute_force_minimum(&graph);
                for (cover, refined) in [
                    (greedy_degree(&graph), refined_greedy_degree(&graph)),
                    (greedy_edge_scan(&graph), refined_greedy_edge_scan(&graph)),
                ] {
                    assert!(graph.validate_cover(&cover), "{graph:?}");
                    assert!(graph.validate_cover(&refined), "{graph:?}");
                    assert!(refined.is_subset_of(&cover), "{graph:?}");
                    assert!(refined.len() >= minimum);
                }
                // maximal matching bound
                assert!(greedy_edge_scan(&graph).len() <= 2 * minimum);
            }
        }
    }

    #[test]
    fn test_prune_keeps_needed_vertices() {
        let graph = cycle4();
        let full = Cover::new(vec![0, 1, 2, 3]);
        let pruned = prune(&graph, &full);
        assert_eq!(pruned, covers(&[1, 3]));
        assert_eq!(prune(&graph, &pruned), pruned);
    }
}
