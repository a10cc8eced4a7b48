//! The distributed mesh produced by assembly: coordinates, global id and
//! rank fields, and per-region element connectivity.

/// One named element region: a volume region per declared block-region name,
/// or a surface region per named patch group.
#[derive(Clone, Debug)]
pub struct Region {
    pub name: String,
    pub nodes_per_element: usize,
    /// Local node ids, row-major, `nodes_per_element` per element.
    pub connectivity: Vec<usize>,
    pub element_global_ids: Vec<u64>,
    pub element_ranks: Vec<usize>,
    pub is_surface: bool,
}

impl Region {
    pub fn nb_elements(&self) -> usize {
        debug_assert_eq!(self.connectivity.len() % self.nodes_per_element, 0);
        self.connectivity.len() / self.nodes_per_element
    }

    /// Local node ids of one element.
    pub fn element(&self, e: usize) -> &[usize] {
        let start = e * self.nodes_per_element;
        &self.connectivity[start..start + self.nodes_per_element]
    }
}

/// Rank-local view of the assembled distributed mesh.
#[derive(Clone, Debug)]
pub struct DistributedMesh {
    pub dimensions: usize,
    pub rank: usize,
    pub nb_ranks: usize,
    /// `(owned + ghost) * dimensions` coordinates, row-major per node.
    pub coordinates: Vec<f64>,
    /// Global node id per local node, owned first, then ghosts in
    /// allocation order.
    pub node_global_ids: Vec<u64>,
    /// Owning rank per local node.
    pub node_ranks: Vec<usize>,
    pub nb_owned_nodes: usize,
    /// Mesh-wide node count (all ranks).
    pub total_nodes: u64,
    /// Mesh-wide element count (all ranks, volume and surface).
    pub total_elements: u64,
    /// Volume regions in declaration order, then patch regions in name order.
    pub regions: Vec<Region>,
}

impl DistributedMesh {
    /// Owned plus ghost node count on this rank.
    pub fn nb_local_nodes(&self) -> usize {
        self.node_global_ids.len()
    }

    pub fn nb_ghost_nodes(&self) -> usize {
        self.nb_local_nodes() - self.nb_owned_nodes
    }

    /// Coordinates of one local node.
    pub fn node_coordinates(&self, local: usize) -> &[f64] {
        let start = local * self.dimensions;
        &self.coordinates[start..start + self.dimensions]
    }

    /// Elements emitted on this rank, across all regions.
    pub fn nb_local_elements(&self) -> usize {
        self.regions.iter().map(Region::nb_elements).sum()
    }

    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }
}
