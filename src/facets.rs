//! Facets of simplicial elements
//! (edges of triangles, triangular faces of tetrahedra)
//! and the map from each element's local facets to a deduplicated facet list.

use fixedbitset as fb;
use itertools::Itertools;
use nalgebra as na;

use crate::mesh::SimplexList;

/// Extract every facet of every element as a directed simplex.
///
/// The result has `m * ss` facets for `m` elements of `ss` vertices each,
/// in facet-major order: facet `f + m * c` is the `c`th local facet of element `f`.
/// Local facet `c` is the one opposite the element's `c`th vertex,
/// oriented consistently with the element.
/// For triangles the local edges are `[1, 2], [2, 0], [0, 1]`.
///
/// Panics if the elements have fewer than two vertices.
pub fn oriented_facets(elements: &SimplexList) -> SimplexList {
    let ss = elements.simplex_size();
    assert!(ss >= 2, "Cannot take facets of {ss}-vertex simplices");

    let mut facets = SimplexList::with_capacity(ss - 1, elements.len() * ss);
    // buffer to hold the facet currently being processed
    let mut curr_facet: Vec<usize> = Vec::with_capacity(ss - 1);

    for exclude_idx in 0..ss {
        for element in elements.iter() {
            curr_facet.clear();
            for (i, vert_id) in element.iter().enumerate() {
                if i != exclude_idx {
                    curr_facet.push(*vert_id);
                }
            }

            // boundary orientations alternate between forward and backward
            // when defined in this order.
            // see Discrete Differential Forms for Computational Modeling by Desbrun et al. (2006)
            // https://dl.acm.org/doi/pdf/10.1145/1185657.1185665
            // swapping two vertices flips the backward ones forward
            if exclude_idx % 2 == 1 && curr_facet.len() >= 2 {
                curr_facet.swap(0, 1);
            }

            facets.push(&curr_facet);
        }
    }

    facets
}

/// Result of [`unique_simplices`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniqueSimplices {
    /// The deduplicated simplices,
    /// each with its vertex indices in ascending order,
    /// sorted lexicographically.
    pub simplices: SimplexList,
    /// For each unique simplex, the index of the first input simplex equal to it.
    pub first_occurrence: Vec<usize>,
    /// For each input simplex, the index of the unique simplex equal to it.
    pub inverse: Vec<usize>,
}

/// Deduplicate a list of simplices,
/// treating simplices with the same vertices in any order as equal.
pub fn unique_simplices(list: &SimplexList) -> UniqueSimplices {
    let ss = list.simplex_size();

    // by convention, sort simplices to have their indices in ascending order.
    // this simplifies things by enabling a consistent way
    // to identify a simplex with its vertices
    let mut sorted_indices = list.indices().to_vec();
    for simplex in sorted_indices.chunks_exact_mut(ss) {
        simplex.sort_unstable();
    }

    // sort the simplices in lexicographic order so duplicates end up next to each other.
    // the sort is stable, so the first occurrence of a simplex
    // comes first among its duplicates
    let order: Vec<usize> = sorted_indices
        .chunks_exact(ss)
        .enumerate()
        .sorted_by_key(|(_, indices)| *indices)
        .map(|(input_idx, _)| input_idx)
        .collect();

    let mut simplices = SimplexList::with_capacity(ss, list.len());
    let mut first_occurrence: Vec<usize> = Vec::new();
    let mut inverse: Vec<usize> = vec![0; list.len()];
    let mut prev_simplex: Option<&[usize]> = None;
    for input_idx in order {
        let simplex = &sorted_indices[input_idx * ss..(input_idx + 1) * ss];
        // a simplex different from the previous one in sorted order
        // hasn't been seen before
        if prev_simplex != Some(simplex) {
            simplices.push(simplex);
            first_occurrence.push(input_idx);
            prev_simplex = Some(simplex);
        }
        inverse[input_idx] = simplices.len() - 1;
    }

    UniqueSimplices {
        simplices,
        first_occurrence,
        inverse,
    }
}

/// The unique facets of a mesh (`E`)
/// together with the map from element facets to them (`EMAP`).
///
/// The map is stored facet-major:
/// `emap()[f + m * c]` is the row in `facets()`
/// of the `c`th local facet of element `f`,
/// where `m` is the number of elements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FacetList {
    facets: SimplexList,
    emap: Vec<usize>,
}

impl FacetList {
    /// Derive the unique facets of a list of elements.
    ///
    /// Panics if the elements have fewer than two vertices.
    pub fn from_elements(elements: &SimplexList) -> Self {
        let directed = oriented_facets(elements);
        let unique = unique_simplices(&directed);
        tracing::debug!(
            elements = elements.len(),
            directed_facets = directed.len(),
            unique_facets = unique.simplices.len(),
            "extracted facets"
        );

        Self {
            facets: unique.simplices,
            emap: unique.inverse,
        }
    }

    /// Wrap a precomputed facet list and map,
    /// e.g. one shared between meshes with the same topology.
    ///
    /// The map is not validated here,
    /// but is checked before it's used to assemble a mass matrix.
    pub fn from_parts(facets: SimplexList, emap: Vec<usize>) -> Self {
        Self { facets, emap }
    }

    /// The unique facets.
    #[inline]
    pub fn facets(&self) -> &SimplexList {
        &self.facets
    }

    /// The map from element facets to unique facets.
    #[inline]
    pub fn emap(&self) -> &[usize] {
        &self.emap
    }

    /// Number of unique facets.
    #[inline]
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// Whether there are no facets at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Number of facets per element
    /// (one more than the number of vertices per facet).
    #[inline]
    pub fn facets_per_element(&self) -> usize {
        self.facets.simplex_size() + 1
    }

    /// Number of elements covered by the map.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.emap.len() / self.facets_per_element()
    }

    /// Unique facet indices of the local facets of element `element_idx`,
    /// in local facet order.
    pub fn element_facets(&self, element_idx: usize) -> impl Iterator<Item = usize> + '_ {
        let m = self.element_count();
        (0..self.facets_per_element()).map(move |c| self.emap[element_idx + m * c])
    }

    /// The map as an `m x ss` table
    /// where entry `(f, c)` is the unique facet of element `f`'s `c`th local facet.
    ///
    /// Panics if the map length isn't a multiple of the number of facets per element.
    pub fn as_table(&self) -> na::DMatrix<usize> {
        // column-major storage makes the facet-major map a valid table as-is
        na::DMatrix::from_column_slice(self.element_count(), self.facets_per_element(), &self.emap)
    }

    /// Number of element facets mapped to each unique facet.
    ///
    /// Panics if the map references facets that don't exist.
    pub fn incidence_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.len()];
        for &facet_idx in &self.emap {
            counts[facet_idx] += 1;
        }
        counts
    }

    /// Facets on the boundary of the mesh.
    ///
    /// If a facet is only on the boundary of one element,
    /// then it is on the boundary of the mesh.
    pub fn boundary_facets(&self) -> fb::FixedBitSet {
        let mut boundary = fb::FixedBitSet::with_capacity(self.len());
        for (facet_idx, count) in self.incidence_counts().into_iter().enumerate() {
            if count == 1 {
                boundary.insert(facet_idx);
            }
        }
        boundary
    }

    /// Take the facet list and map out of the structure.
    pub fn into_parts(self) -> (SimplexList, Vec<usize>) {
        (self.facets, self.emap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{tiny_mesh_2d, tiny_mesh_3d};

    #[test]
    fn triangle_facets_are_directed_and_facet_major() {
        let elements = SimplexList::new(3, vec![0, 1, 2, 1, 3, 2]);
        let facets = oriented_facets(&elements);

        assert_eq!(facets.simplex_size(), 2);
        #[rustfmt::skip]
        let expected = vec![
            1,2, 3,2,
            2,0, 2,1,
            0,1, 1,3,
        ];
        assert_eq!(expected, facets.indices());
    }

    #[test]
    fn tetrahedron_facets_are_oriented_like_the_element() {
        let elements = SimplexList::new(4, vec![0, 1, 2, 3]);
        let facets = oriented_facets(&elements);

        #[rustfmt::skip]
        let expected = vec![
            1,2,3,
            2,0,3,
            0,1,3,
            1,0,2,
        ];
        assert_eq!(expected, facets.indices());
    }

    #[test]
    fn unique_simplices_ignores_orientation() {
        // the last edge is the first one reversed
        let list = SimplexList::new(2, vec![1, 2, 2, 0, 0, 1, 2, 1]);
        let unique = unique_simplices(&list);

        assert_eq!(unique.simplices.indices(), &[0, 1, 0, 2, 1, 2]);
        assert_eq!(unique.inverse, vec![2, 1, 0, 2]);
        assert_eq!(unique.first_occurrence, vec![2, 1, 0]);
    }

    #[test]
    fn unique_simplices_ignores_rotation() {
        let list = SimplexList::new(3, vec![0, 3, 2, 3, 2, 0, 2, 0, 3, 1, 2, 3]);
        let unique = unique_simplices(&list);

        assert_eq!(unique.simplices.indices(), &[0, 2, 3, 1, 2, 3]);
        assert_eq!(unique.inverse, vec![0, 0, 0, 1]);
        assert_eq!(unique.first_occurrence, vec![0, 3]);
    }

    #[test]
    fn unique_simplices_of_empty_list() {
        let unique = unique_simplices(&SimplexList::new(2, Vec::new()));
        assert!(unique.simplices.is_empty());
        assert!(unique.inverse.is_empty());
        assert!(unique.first_occurrence.is_empty());
    }

    #[test]
    fn tiny_2d_facets_are_correct() {
        let mesh = tiny_mesh_2d();
        let facets = mesh.facets();

        #[rustfmt::skip]
        let expected_edges = vec![
            0,1, 0,2, 0,3,
            1,3, 1,4,
            2,3, 2,5,
            3,4, 3,5, 3,6,
            4,6, 5,6,
        ];
        assert_eq!(expected_edges, facets.facets().indices(), "incorrect edges");

        // every row of the table lists the edges of one triangle
        let table = facets.as_table();
        assert_eq!(table.shape(), (6, 3));
        for (element_idx, element) in mesh.elements().iter().enumerate() {
            let mut element_edges: Vec<usize> = facets.element_facets(element_idx).collect();
            assert_eq!(
                element_edges,
                table.row(element_idx).iter().copied().collect::<Vec<_>>()
            );
            element_edges.sort_unstable();
            element_edges.dedup();
            assert_eq!(element_edges.len(), 3, "triangle {element:?} has a repeated edge");
            for edge_idx in element_edges {
                let edge = facets.facets().simplex(edge_idx);
                assert!(edge.iter().all(|v| element.contains(v)));
            }
        }

        let expected_boundary: fb::FixedBitSet = [0, 1, 4, 6, 10, 11].into_iter().collect();
        let mut actual_boundary = facets.boundary_facets();
        actual_boundary.grow(expected_boundary.len());
        assert_eq!(expected_boundary, actual_boundary);
    }

    #[test]
    fn tiny_3d_facets_are_correct() {
        let mesh = tiny_mesh_3d();
        let facets = mesh.facets();

        #[rustfmt::skip]
        let expected_faces = vec![
            0,1,2, 0,1,4, 0,1,5,
            0,2,4, 0,2,5,
            1,2,3, 1,2,4, 1,2,5,
            1,3,4, 1,3,5,
            2,3,4, 2,3,5,
        ];
        assert_eq!(expected_faces, facets.facets().indices(), "incorrect faces");
        assert_eq!(facets.emap().len(), 16);
        assert_eq!(facets.element_count(), 4);

        let expected_counts = vec![2, 1, 1, 1, 1, 2, 2, 2, 1, 1, 1, 1];
        assert_eq!(expected_counts, facets.incidence_counts());
        let interior: Vec<usize> = (0..facets.len())
            .filter(|i| !facets.boundary_facets().contains(*i))
            .collect();
        assert_eq!(interior, vec![0, 5, 6, 7]);
    }

    #[test]
    fn facets_survive_round_trip_through_parts() {
        let facets = tiny_mesh_2d().facets();
        let (list, emap) = facets.clone().into_parts();
        assert_eq!(FacetList::from_parts(list, emap), facets);
    }
}
