//! Manifoldness checks for element connectivity.

use crate::{facets::FacetList, mesh::SimplexList};

/// Check that every edge of a triangle mesh
/// is shared by at most two triangles.
///
/// Panics if the elements aren't triangles.
pub fn is_edge_manifold(triangles: &SimplexList) -> bool {
    assert_eq!(
        triangles.simplex_size(),
        3,
        "Edge manifoldness is only defined here for triangle meshes"
    );
    has_manifold_facets(&FacetList::from_elements(triangles))
}

/// Whether every facet in an already computed facet list
/// is shared by at most two elements.
pub(crate) fn has_manifold_facets(facets: &FacetList) -> bool {
    facets.incidence_counts().into_iter().all(|count| count <= 2)
}
