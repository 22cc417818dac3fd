//! Lumped mass matrices of the lowest-order Crouzeix-Raviart element.
//!
//! The degrees of freedom of the Crouzeix-Raviart space live on facets
//! (edges of triangles, faces of tetrahedra).
//! The lumped mass matrix is diagonal,
//! with each element distributing its area or volume evenly between its facets:
//! for a mesh of `m` elements with `ss` facets each,
//! `M[e, e]` is the sum of `measure[f] / ss`
//! over every local facet `c` of every element `f` with `EMAP[f + m * c] == e`.
//!
//! ```
//! # use crmass::mesh::tiny_mesh_2d;
//! let mesh = tiny_mesh_2d();
//! let (mass, facets) = crmass::mass_matrix(mesh.vertices(), mesh.elements())?;
//! assert_eq!(mass.nrows(), facets.len());
//! assert_eq!(mass.ncols(), facets.len());
//! # Ok::<(), crmass::MassMatrixError>(())
//! ```

use nalgebra as na;
use nalgebra_sparse as nas;

use crate::{
    facets::FacetList,
    manifold,
    measure::{self, check_element_size},
    mesh::SimplexList,
};

/// Error in building a mass matrix.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MassMatrixError {
    /// The elements are neither triangles nor tetrahedra.
    #[error("Unsupported element size {simplex_size}: only triangles (3) and tetrahedra (4) are supported")]
    UnsupportedElementSize {
        /// Number of vertices per element.
        simplex_size: usize,
    },
    /// The element-to-facet map has the wrong number of entries.
    #[error("Malformed facet map: expected {expected} entries, got {actual}")]
    MalformedMap {
        /// Number of elements times facets per element.
        expected: usize,
        /// Length of the map given.
        actual: usize,
    },
    /// The element-to-facet map points at a facet that doesn't exist.
    #[error("Malformed facet map: entry {position} is {index}, but there are only {facet_count} facets")]
    FacetIndexOutOfRange {
        /// Position of the offending entry in the map.
        position: usize,
        /// The facet index found there.
        index: usize,
        /// Number of facets in the facet list.
        facet_count: usize,
    },
    /// An element references a vertex that doesn't exist.
    #[error("Element {element} references vertex {index}, but there are only {vertex_count} vertices")]
    VertexOutOfRange {
        /// Index of the offending element.
        element: usize,
        /// The vertex index found in it.
        index: usize,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },
    /// Some edge of a triangle mesh is shared by more than two triangles.
    #[error("Triangle mesh is not edge-manifold")]
    NonManifold,
}

/// What to do about triangle meshes that aren't edge-manifold.
///
/// Tetrahedral meshes are never checked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ManifoldCheck {
    /// Fail with [`MassMatrixError::NonManifold`].
    #[default]
    Enforce,
    /// Log a warning and assemble anyway.
    Warn,
    /// Don't check at all.
    Skip,
}

/// Configuration for building lumped Crouzeix-Raviart mass matrices.
///
/// The free functions [`mass_matrix`] and [`mass_matrix_with_facets`]
/// use the default configuration.
///
/// ```
/// # use crmass::{mesh::tiny_mesh_2d, CrouzeixRaviart, ManifoldCheck};
/// let mesh = tiny_mesh_2d();
/// let cr = CrouzeixRaviart::new().with_manifold_check(ManifoldCheck::Skip);
/// let (mass, _facets) = cr.mass_matrix(mesh.vertices(), mesh.elements())?;
/// # Ok::<(), crmass::MassMatrixError>(())
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CrouzeixRaviart {
    /// How to handle non-manifold triangle meshes.
    pub manifold_check: ManifoldCheck,
}

impl CrouzeixRaviart {
    /// The default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how non-manifold triangle meshes are handled.
    pub fn with_manifold_check(mut self, manifold_check: ManifoldCheck) -> Self {
        self.manifold_check = manifold_check;
        self
    }

    /// Build the lumped mass matrix of a mesh,
    /// deriving its unique facets along the way.
    ///
    /// Returns the `|E| x |E|` mass matrix
    /// and the facet list `E` with the element-to-facet map `EMAP`
    /// that its rows and columns correspond to.
    pub fn mass_matrix<T, const DIM: usize>(
        &self,
        vertices: &[na::SVector<T, DIM>],
        elements: &SimplexList,
    ) -> Result<(nas::CsrMatrix<T>, FacetList), MassMatrixError>
    where
        T: na::RealField + Copy,
    {
        check_element_size(elements)?;
        let facets = FacetList::from_elements(elements);
        if elements.simplex_size() == 3 {
            // the facet list is already at hand, no need to derive the edges again
            self.check_manifold(|| manifold::has_manifold_facets(&facets))?;
        }
        let mass = assemble(vertices, elements, &facets)?;
        Ok((mass, facets))
    }

    /// Build the lumped mass matrix of a mesh
    /// using a precomputed facet list and map.
    ///
    /// This is useful when many meshes share the same connectivity
    /// but have different vertex positions.
    pub fn mass_matrix_with_facets<T, const DIM: usize>(
        &self,
        vertices: &[na::SVector<T, DIM>],
        elements: &SimplexList,
        facets: &FacetList,
    ) -> Result<nas::CsrMatrix<T>, MassMatrixError>
    where
        T: na::RealField + Copy,
    {
        check_element_size(elements)?;
        if elements.simplex_size() == 3 {
            self.check_manifold(|| manifold::is_edge_manifold(elements))?;
        }
        assemble(vertices, elements, facets)
    }

    // TODO: tetrahedral meshes should get a facet-manifold check here
    // once it's settled what that check should require
    fn check_manifold(&self, is_manifold: impl FnOnce() -> bool) -> Result<(), MassMatrixError> {
        match self.manifold_check {
            ManifoldCheck::Skip => Ok(()),
            ManifoldCheck::Enforce => {
                if is_manifold() {
                    Ok(())
                } else {
                    Err(MassMatrixError::NonManifold)
                }
            }
            ManifoldCheck::Warn => {
                if !is_manifold() {
                    tracing::warn!(
                        "triangle mesh is not edge-manifold, mass matrix may be meaningless"
                    );
                }
                Ok(())
            }
        }
    }
}

/// Build the lumped mass matrix of a mesh with the default configuration.
/// See [`CrouzeixRaviart::mass_matrix`].
pub fn mass_matrix<T, const DIM: usize>(
    vertices: &[na::SVector<T, DIM>],
    elements: &SimplexList,
) -> Result<(nas::CsrMatrix<T>, FacetList), MassMatrixError>
where
    T: na::RealField + Copy,
{
    CrouzeixRaviart::default().mass_matrix(vertices, elements)
}

/// Build the lumped mass matrix of a mesh from a precomputed facet list
/// with the default configuration.
/// See [`CrouzeixRaviart::mass_matrix_with_facets`].
pub fn mass_matrix_with_facets<T, const DIM: usize>(
    vertices: &[na::SVector<T, DIM>],
    elements: &SimplexList,
    facets: &FacetList,
) -> Result<nas::CsrMatrix<T>, MassMatrixError>
where
    T: na::RealField + Copy,
{
    CrouzeixRaviart::default().mass_matrix_with_facets(vertices, elements, facets)
}

/// Shared tail of both entry points: validate the map, measure, assemble.
fn assemble<T, const DIM: usize>(
    vertices: &[na::SVector<T, DIM>],
    elements: &SimplexList,
    facets: &FacetList,
) -> Result<nas::CsrMatrix<T>, MassMatrixError>
where
    T: na::RealField + Copy,
{
    check_map(
        facets.emap(),
        elements.len(),
        elements.simplex_size(),
        facets.len(),
    )?;
    let measures = measure::element_measures(vertices, elements)?;
    let mass = assemble_lumped_mass(
        facets.emap(),
        &measures,
        elements.simplex_size(),
        facets.len(),
    )?;
    tracing::debug!(
        elements = elements.len(),
        facets = facets.len(),
        nnz = mass.nnz(),
        "assembled Crouzeix-Raviart mass matrix"
    );
    Ok(mass)
}

/// Assemble a lumped mass matrix
/// from an element-to-facet map and per-element measures.
///
/// `emap` is stored facet-major with `measures.len() * simplex_size` entries,
/// each less than `facet_count`.
/// Every element contributes `measure / simplex_size`
/// to the diagonal entry of each of its facets.
/// The result is a `facet_count x facet_count` diagonal matrix.
pub fn assemble_lumped_mass<T>(
    emap: &[usize],
    measures: &[T],
    simplex_size: usize,
    facet_count: usize,
) -> Result<nas::CsrMatrix<T>, MassMatrixError>
where
    T: na::RealField + Copy,
{
    let element_count = measures.len();
    check_map(emap, element_count, simplex_size, facet_count)?;

    let share_divisor: T = na::convert(simplex_size as f64);
    // duplicate entries are summed when converting to CSR,
    // which accumulates the shares of every element touching a facet
    let mut mass_coo = nas::CooMatrix::new(facet_count, facet_count);
    for c in 0..simplex_size {
        for (f, &measure) in measures.iter().enumerate() {
            let facet_idx = emap[f + element_count * c];
            mass_coo.push(facet_idx, facet_idx, measure / share_divisor);
        }
    }

    Ok(nas::CsrMatrix::from(&mass_coo))
}

fn check_map(
    emap: &[usize],
    element_count: usize,
    simplex_size: usize,
    facet_count: usize,
) -> Result<(), MassMatrixError> {
    let expected = element_count * simplex_size;
    if emap.len() != expected {
        return Err(MassMatrixError::MalformedMap {
            expected,
            actual: emap.len(),
        });
    }
    if let Some((position, &index)) = emap.iter().enumerate().find(|&(_, &i)| i >= facet_count) {
        return Err(MassMatrixError::FacetIndexOutOfRange {
            position,
            index,
            facet_count,
        });
    }
    Ok(())
}
