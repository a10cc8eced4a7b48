//! Serial end-to-end assembly on small quad meshes.

use blockmesh::prelude::*;

fn quad_area(mesh: &DistributedMesh, element: &[usize]) -> f64 {
    let mut area = 0.0;
    for c in 0..4 {
        let a = mesh.node_coordinates(element[c]);
        let b = mesh.node_coordinates(element[(c + 1) % 4]);
        area += a[0] * b[1] - b[0] * a[1];
    }
    area / 2.0
}

fn unit_square(segments: usize, gradings: Vec<f64>) -> BlockDescription {
    let mut desc = BlockDescription::new(2).unwrap();
    desc.set_points(vec![
        vec![0.0, 0.0],
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
    ])
    .unwrap()
    .set_blocks(vec![vec![0, 1, 2, 3]])
    .unwrap()
    .set_subdivisions(vec![vec![segments, segments]])
    .unwrap()
    .set_gradings(vec![gradings])
    .unwrap();
    desc.add_patch("bottom", vec![vec![0, 1]]).unwrap();
    desc.add_patch("right", vec![vec![1, 2]]).unwrap();
    desc.add_patch("top", vec![vec![2, 3]]).unwrap();
    desc.add_patch("left", vec![vec![3, 0]]).unwrap();
    desc
}

/// Four points per axis line, 2x2 grid of blocks, each subdivided 2x2.
fn four_block_square() -> BlockDescription {
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
        .set_subdivisions(vec![vec![2, 2]; 4])
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

#[test]
fn single_block_mesh_is_complete() {
    let desc = unit_square(2, vec![1.0; 4]);
    let mapper = MultilinearMapper::new(&desc);
    let mesh = create_mesh(&desc, &NoComm, &mapper).unwrap();

    assert_eq!(mesh.nb_owned_nodes, 9);
    assert_eq!(mesh.nb_ghost_nodes(), 0);
    assert_eq!(mesh.total_nodes, 9);

    let interior = mesh.region("interior").unwrap();
    assert!(!interior.is_surface);
    assert_eq!(interior.nb_elements(), 4);
    assert_eq!(interior.nodes_per_element, 4);
    for name in ["bottom", "right", "top", "left"] {
        let patch = mesh.region(name).unwrap();
        assert!(patch.is_surface);
        assert_eq!(patch.nb_elements(), 2);
        assert_eq!(patch.nodes_per_element, 2);
    }
    assert_eq!(mesh.nb_local_elements(), 12);
    assert_eq!(mesh.total_elements, 12);
}

#[test]
fn single_block_coordinates_fill_the_grid() {
    let desc = unit_square(2, vec![1.0; 4]);
    let mapper = MultilinearMapper::new(&desc);
    let mesh = create_mesh(&desc, &NoComm, &mapper).unwrap();

    // serial single block: local ids follow the structured layout, x fastest
    for j in 0..3 {
        for i in 0..3 {
            let coords = mesh.node_coordinates(i + 3 * j);
            assert!((coords[0] - i as f64 * 0.5).abs() < 1e-12);
            assert!((coords[1] - j as f64 * 0.5).abs() < 1e-12);
        }
    }
}

#[test]
fn volume_elements_wind_counter_clockwise() {
    let desc = unit_square(2, vec![1.0; 4]);
    let mapper = MultilinearMapper::new(&desc);
    let mesh = create_mesh(&desc, &NoComm, &mapper).unwrap();
    let interior = mesh.region("interior").unwrap();
    for e in 0..interior.nb_elements() {
        assert!(quad_area(&mesh, interior.element(e)) > 0.0);
    }
}

#[test]
fn boundary_elements_lie_on_their_side() {
    let desc = unit_square(2, vec![1.0; 4]);
    let mapper = MultilinearMapper::new(&desc);
    let mesh = create_mesh(&desc, &NoComm, &mapper).unwrap();
    let checks: [(&str, usize, f64); 4] = [
        ("bottom", 1, 0.0),
        ("top", 1, 1.0),
        ("left", 0, 0.0),
        ("right", 0, 1.0),
    ];
    for (name, axis, value) in checks {
        let patch = mesh.region(name).unwrap();
        for &node in &patch.connectivity {
            assert!((mesh.node_coordinates(node)[axis] - value).abs() < 1e-12);
        }
    }
}

#[test]
fn geometric_grading_compresses_the_first_spacing() {
    let desc = unit_square(2, vec![2.0, 2.0, 1.0, 1.0]);
    let mapper = MultilinearMapper::new(&desc);
    let mesh = create_mesh(&desc, &NoComm, &mapper).unwrap();
    // middle x layer sits at (sqrt(2)-1)/(2-1), endpoints are exact
    let expected = (2.0f64.sqrt() - 1.0) / 1.0;
    assert!((mesh.node_coordinates(1)[0] - expected).abs() < 1e-12);
    assert!((mesh.node_coordinates(2)[0] - 1.0).abs() < 1e-12);
    // y stays uniform
    assert!((mesh.node_coordinates(3)[1] - 0.5).abs() < 1e-12);
}

#[test]
fn element_ids_are_dense_in_serial() {
    let desc = unit_square(2, vec![1.0; 4]);
    let mapper = MultilinearMapper::new(&desc);
    let mesh = create_mesh(&desc, &NoComm, &mapper).unwrap();
    let mut ids: Vec<u64> = mesh
        .regions
        .iter()
        .flat_map(|r| r.element_global_ids.iter().copied())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..mesh.total_elements).collect::<Vec<u64>>());
    for region in &mesh.regions {
        assert!(region.element_ranks.iter().all(|&r| r == 0));
    }
}

#[test]
fn four_block_mesh_counts_and_coordinates() {
    let desc = four_block_square();
    let mapper = MultilinearMapper::new(&desc);
    let mesh = create_mesh(&desc, &NoComm, &mapper).unwrap();

    assert_eq!(mesh.total_nodes, 25);
    assert_eq!(mesh.nb_owned_nodes, 25);
    assert_eq!(mesh.nb_ghost_nodes(), 0);
    assert_eq!(mesh.region("interior").unwrap().nb_elements(), 16);
    // 4 boundary faces per side
    for name in ["bottom", "right", "top", "left"] {
        assert_eq!(mesh.region(name).unwrap().nb_elements(), 4);
    }
    assert_eq!(mesh.total_elements, 32);

    // seams are shared: 25 distinct coordinates on the half-unit grid
    let mut seen: Vec<(i64, i64)> = (0..mesh.nb_local_nodes())
        .map(|n| {
            let c = mesh.node_coordinates(n);
            ((c[0] * 2.0).round() as i64, (c[1] * 2.0).round() as i64)
        })
        .collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 25);
    assert!(seen.iter().all(|&(x, y)| (0..=4).contains(&x) && (0..=4).contains(&y)));

    let interior = mesh.region("interior").unwrap();
    for e in 0..interior.nb_elements() {
        let area = quad_area(&mesh, interior.element(e));
        assert!((area - 0.25).abs() < 1e-12);
    }
}
