//! Mesh to object graph to export lists, end to end over two ranks.

use std::thread;

use blockmesh::partitioning::{CsrGraph, PartitionError};
use blockmesh::prelude::*;

/// Deterministic stand-in backend: destination is the object id's parity.
struct ParityBackend;

impl PartitionerBackend for ParityBackend {
    fn name(&self) -> &'static str {
        "parity"
    }
    fn partition(
        &mut self,
        graph: &CsrGraph,
        nb_parts: usize,
    ) -> Result<Vec<usize>, PartitionError> {
        Ok(graph
            .vertex_ids
            .iter()
            .map(|&id| (id % nb_parts as u64) as usize)
            .collect())
    }
}

fn four_single_element_blocks() -> BlockDescription {
    let mut points = Vec::new();
    for j in 0..3 {
        for i in 0..3 {
            points.push(vec![i as f64, j as f64]);
        }
    }
    let mut desc = BlockDescription::new(2).unwrap();
    desc.set_points(points)
        .unwrap()
        .set_blocks(vec![
            vec![0, 1, 4, 3],
            vec![1, 2, 5, 4],
            vec![3, 4, 7, 6],
            vec![4, 5, 8, 7],
        ])
        .unwrap()
        .set_subdivisions(vec![vec![1, 1]; 4])
        .unwrap()
        .set_gradings(vec![vec![1.0; 4]; 4])
        .unwrap();
    desc.add_patch("bottom", vec![vec![0, 1], vec![1, 2]])
        .unwrap();
    desc.add_patch("right", vec![vec![2, 5], vec![5, 8]]).unwrap();
    desc.add_patch("top", vec![vec![8, 7], vec![7, 6]]).unwrap();
    desc.add_patch("left", vec![vec![6, 3], vec![3, 0]]).unwrap();
    desc
}

fn partition_on_ranks(nb_ranks: usize) -> Vec<(DistributedMesh, ExportLists)> {
    let handles: Vec<_> = ThreadComm::create(nb_ranks)
        .into_iter()
        .map(|comm| {
            thread::spawn(move || {
                let desc = four_single_element_blocks();
                let mapper = MultilinearMapper::new(&desc);
                let mesh = create_mesh(&desc, &comm, &mapper).unwrap();
                let graph = MeshObjectGraph::new(&mesh, &comm);
                let mut partitioner = MeshPartitioner::new(ParityBackend, &comm);
                partitioner
                    .build_graph(&graph, graph.layout().clone())
                    .unwrap();
                let exports = partitioner.partition_graph().unwrap().clone();
                assert_eq!(partitioner.phase(), PartitionPhase::Partitioned);
                (mesh.rank, mesh, exports)
            })
        })
        .collect();
    let mut results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    results.sort_by_key(|(rank, ..)| *rank);
    results.into_iter().map(|(_, mesh, ex)| (mesh, ex)).collect()
}

#[test]
fn export_lists_record_exactly_the_moved_objects() {
    let results = partition_on_ranks(2);
    for (mesh, exports) in &results {
        let rank = mesh.rank;
        assert_eq!(exports.nodes.len(), 2);
        assert_eq!(exports.elements.len(), 2);
        // staying put is never recorded
        assert!(exports.nodes[rank].is_empty());
        assert!(exports.elements[rank].iter().all(Vec::is_empty));

        let moved_nodes = mesh.node_global_ids[..mesh.nb_owned_nodes]
            .iter()
            .filter(|&&gid| gid % 2 != rank as u64)
            .count();
        assert_eq!(exports.nb_exported_nodes(), moved_nodes);

        let moved_elements = mesh
            .regions
            .iter()
            .flat_map(|r| r.element_global_ids.iter())
            .filter(|&&egid| (mesh.total_nodes + egid) % 2 != rank as u64)
            .count();
        assert_eq!(exports.nb_exported_elements(), moved_elements);
    }
}

#[test]
fn exported_indices_resolve_to_objects_headed_elsewhere() {
    let results = partition_on_ranks(2);
    for (mesh, exports) in &results {
        for (dest, nodes) in exports.nodes.iter().enumerate() {
            for &local in nodes {
                assert!(local < mesh.nb_owned_nodes);
                assert_eq!(mesh.node_global_ids[local] % 2, dest as u64);
            }
        }
        for (dest, per_region) in exports.elements.iter().enumerate() {
            assert_eq!(per_region.len(), mesh.regions.len());
            for (region, elements) in per_region.iter().enumerate() {
                for &e in elements {
                    let egid = mesh.regions[region].element_global_ids[e];
                    assert_eq!((mesh.total_nodes + egid) % 2, dest as u64);
                }
            }
        }
    }
}

#[test]
fn export_lists_round_trip_through_serde() {
    let results = partition_on_ranks(2);
    let exports = &results[0].1;
    let encoded = serde_json::to_string(exports).unwrap();
    let decoded: ExportLists = serde_json::from_str(&encoded).unwrap();
    assert_eq!(&decoded, exports);
}
