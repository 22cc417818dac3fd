//! Storage for simplicial meshes and lists of simplices.

use nalgebra as na;
use nalgebra_sparse as nas;

use crate::{
    facets::FacetList,
    mass::{self, MassMatrixError},
    measure,
};

/// A list of simplices that all have the same number of vertices
/// (line segments, triangles, tetrahedra etc).
///
/// Indices are stored in a flat array,
/// where every `simplex_size` indices correspond to one simplex.
/// This is used both for the elements of a mesh
/// and for the facets derived from them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimplexList {
    /// points per simplex in the storage Vec
    simplex_size: usize,
    /// indices stored in a flat Vec to avoid generics for dimension
    indices: Vec<usize>,
}

impl SimplexList {
    /// Construct a list from a simplex size and a flat array of vertex indices.
    ///
    /// Panics if `simplex_size` is zero
    /// or the number of indices isn't a multiple of it.
    pub fn new(simplex_size: usize, indices: Vec<usize>) -> Self {
        assert!(simplex_size > 0, "Cannot create a list of empty simplices");
        assert!(
            indices.len() % simplex_size == 0,
            "Index count {} is not a multiple of the simplex size {simplex_size}",
            indices.len()
        );

        Self {
            simplex_size,
            indices,
        }
    }

    /// Construct an empty list with room for `capacity` simplices.
    pub fn with_capacity(simplex_size: usize, capacity: usize) -> Self {
        Self::new(simplex_size, Vec::with_capacity(simplex_size * capacity))
    }

    /// Number of vertices in each simplex.
    #[inline]
    pub fn simplex_size(&self) -> usize {
        self.simplex_size
    }

    /// Get the number of simplices in the list.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len() / self.simplex_size
    }

    /// Whether the list contains no simplices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The flat array of vertex indices.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Vertex indices of the `idx`th simplex.
    #[inline]
    pub fn simplex(&self, idx: usize) -> &[usize] {
        let start = idx * self.simplex_size;
        &self.indices[start..start + self.simplex_size]
    }

    /// Iterate over the vertex indices of each simplex in order.
    pub fn iter(&self) -> std::slice::ChunksExact<'_, usize> {
        self.indices.chunks_exact(self.simplex_size)
    }

    /// Append a simplex to the end of the list.
    pub fn push(&mut self, simplex: &[usize]) {
        assert_eq!(
            simplex.len(),
            self.simplex_size,
            "Simplex has the wrong number of vertices"
        );
        self.indices.extend_from_slice(simplex);
    }

    /// Take the flat array of vertex indices out of the list.
    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }
}

/// A mesh of triangles or tetrahedra
/// embedded in `DIM`-dimensional space.
#[derive(Clone, Debug)]
pub struct SimplicialMesh<T: na::RealField + Copy, const DIM: usize> {
    vertices: Vec<na::SVector<T, DIM>>,
    elements: SimplexList,
}

impl<T: na::RealField + Copy, const DIM: usize> SimplicialMesh<T, DIM> {
    /// Construct a mesh from vertex positions and a list of elements.
    ///
    /// Nothing is validated here;
    /// element size and vertex indices are checked
    /// when the mesh is used to build a mass matrix.
    pub fn new(vertices: Vec<na::SVector<T, DIM>>, elements: SimplexList) -> Self {
        Self { vertices, elements }
    }

    /// Construct a triangle mesh from raw vertices and indices.
    ///
    /// The indices are given as a flat array,
    /// where every 3 indices correspond to one triangle.
    pub fn triangles(vertices: Vec<na::SVector<T, DIM>>, indices: Vec<usize>) -> Self {
        Self::new(vertices, SimplexList::new(3, indices))
    }

    /// Construct a tetrahedral mesh from raw vertices and indices.
    ///
    /// The indices are given as a flat array,
    /// where every 4 indices correspond to one tetrahedron.
    pub fn tetrahedra(vertices: Vec<na::SVector<T, DIM>>, indices: Vec<usize>) -> Self {
        Self::new(vertices, SimplexList::new(4, indices))
    }

    /// Vertex positions of the mesh.
    #[inline]
    pub fn vertices(&self) -> &[na::SVector<T, DIM>] {
        &self.vertices
    }

    /// Element connectivity of the mesh.
    #[inline]
    pub fn elements(&self) -> &SimplexList {
        &self.elements
    }

    /// Number of elements in the mesh.
    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Compute the unique facets of the mesh
    /// and the map from element facets to them.
    pub fn facets(&self) -> FacetList {
        FacetList::from_elements(&self.elements)
    }

    /// Area (triangles) or volume (tetrahedra) of every element.
    pub fn element_measures(&self) -> Result<Vec<T>, MassMatrixError> {
        measure::element_measures(&self.vertices, &self.elements)
    }

    /// Build the lumped Crouzeix-Raviart mass matrix of the mesh
    /// with the default configuration.
    /// See [`mass_matrix`][crate::mass::mass_matrix].
    pub fn crouzeix_raviart_mass(
        &self,
    ) -> Result<(nas::CsrMatrix<T>, FacetList), MassMatrixError> {
        mass::mass_matrix(&self.vertices, &self.elements)
    }
}

//
// test meshes
//

/// A small hexagon-shaped 2D mesh for testing basic functionality.
/// Shaped somewhat like this:
///    ____
///   /\  /\
///  /__\/__\
///  \  /\  /
///   \/__\/
///
/// with vertices and triangles ordered left to right, top to bottom.
///
/// This is public for visibility in doctests, which frequently need an instance of a mesh.
/// It is not meant to be used by users and thus hidden from docs.
#[doc(hidden)]
pub fn tiny_mesh_2d() -> SimplicialMesh<f64, 2> {
    let vertices = vec![
        crate::Vec2::new(-0.5, 1.0),
        crate::Vec2::new(0.5, 1.0),
        crate::Vec2::new(-1.0, 0.0),
        crate::Vec2::new(0.0, 0.0),
        crate::Vec2::new(1.0, 0.0),
        crate::Vec2::new(-0.5, -1.0),
        crate::Vec2::new(0.5, -1.0),
    ];
    #[rustfmt::skip]
    let indices = vec![
        0, 2, 3,
        0, 1, 3,
        1, 3, 4,
        2, 3, 5,
        3, 5, 6,
        3, 4, 6,
    ];
    SimplicialMesh::triangles(vertices, indices)
}

/// A small 3D mesh for testing basic functionality.
/// Four tetrahedra arranged into a diamond shape,
/// split like this down the x,y plane:
///
///    /\
///   /__\
///   \  /
///    \/
///
/// and with a single point both up and down the z-axis.
///
/// This is public for visibility in doctests, which frequently need an instance of a mesh.
/// It is not meant to be used by users and thus hidden from docs.
#[doc(hidden)]
pub fn tiny_mesh_3d() -> SimplicialMesh<f64, 3> {
    let vertices = vec![
        crate::Vec3::new(0.0, 1.0, 0.0),
        crate::Vec3::new(-0.5, 0.0, 0.0),
        crate::Vec3::new(0.5, 0.0, 0.0),
        crate::Vec3::new(0.0, -1.0, 0.0),
        crate::Vec3::new(0.0, 0.0, -1.0),
        crate::Vec3::new(0.0, 0.0, 1.0),
    ];
    #[rustfmt::skip]
    let indices = vec![
        0, 1, 2, 4,
        0, 1, 2, 5,
        1, 2, 3, 4,
        1, 2, 3, 5,
    ];
    SimplicialMesh::tetrahedra(vertices, indices)
}
