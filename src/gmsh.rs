//! Utilities for loading meshes generated with [`gmsh`](https://www.gmsh.info/).
//!
//! Only version 4.1 of the MSH format is supported,
//! as per the [`mshio`] library.

use nalgebra as na;

use crate::mesh::{SimplexList, SimplicialMesh};

/// Error in loading a mesh from a Gmsh .msh file.
#[derive(thiserror::Error, Debug)]
pub enum GmshError {
    /// Error parsing the .msh file.
    ///
    /// (Implementation note: parser error converted to string
    /// to avoid lifetime issues with the byte slices it contains)
    #[error("Parsing the .msh data failed: {0}")]
    ParseError(String),
    /// The given .msh file contains no nodes.
    #[error("Invalid .msh data: no nodes")]
    MissingNodes,
    /// The given .msh file contains no elements of the supported type.
    #[error("Invalid .msh data: no elements of the correct type")]
    MissingElements,
    /// An element references node tag 0, which gmsh never assigns.
    #[error("Invalid .msh data: element references node tag 0")]
    ZeroNodeTag,
}

/// Load a 2D triangle mesh from a `.msh` file.
///
/// First-order triangle elements in the file are interpreted as the triangles of the mesh.
/// These must be of type `Tri3` (see [`ElementType`][mshio::ElementType]).
/// The `z` coordinate of vertices is dropped to project the mesh to 2D space.
pub fn load_trimesh_2d(bytes: &[u8]) -> Result<SimplicialMesh<f64, 2>, GmshError> {
    load_simplices(bytes, mshio::ElementType::Tri3, 3, |x, y, _| na::Vector2::new(x, y))
}

/// Load a 3D tetrahedral mesh from a `.msh` file.
///
/// First-order tetrahedron elements in the file are interpreted as the tetrahedra of the mesh.
/// These must be of type `Tet4` (see [`ElementType`][mshio::ElementType]).
pub fn load_tetmesh_3d(bytes: &[u8]) -> Result<SimplicialMesh<f64, 3>, GmshError> {
    load_simplices(bytes, mshio::ElementType::Tet4, 4, na::Vector3::new)
}

fn load_simplices<const DIM: usize>(
    bytes: &[u8],
    element_type: mshio::ElementType,
    simplex_size: usize,
    position: impl Fn(f64, f64, f64) -> na::SVector<f64, DIM>,
) -> Result<SimplicialMesh<f64, DIM>, GmshError> {
    let msh = mshio::parse_msh_bytes(bytes).map_err(|e| GmshError::ParseError(format!("{}", e)))?;
    let nodes = msh.data.nodes.ok_or(GmshError::MissingNodes)?;
    let elements = msh.data.elements.ok_or(GmshError::MissingElements)?;

    let vertices: Vec<na::SVector<f64, DIM>> = nodes
        .node_blocks
        .iter()
        .flat_map(|block| block.nodes.iter())
        .map(|node| position(node.x, node.y, node.z))
        .collect();
    if vertices.is_empty() {
        return Err(GmshError::MissingNodes);
    }

    let mut indices: Vec<usize> = Vec::new();
    for block in &elements.element_blocks {
        if block.element_type != element_type {
            tracing::debug!("skipping gmsh element block of type {:?}", block.element_type);
            continue;
        }
        // gmsh tags start at 1, subtract 1 to get the index in the array.
        // (this assumes tags are sequential and in order!
        // I believe the latter is guaranteed by the format,
        // but the former may not be since tags can be set manually)
        for node_tag in block.elements.iter().flat_map(|el| el.nodes.iter()) {
            let index = (*node_tag as usize)
                .checked_sub(1)
                .ok_or(GmshError::ZeroNodeTag)?;
            indices.push(index);
        }
    }
    if indices.is_empty() {
        return Err(GmshError::MissingElements);
    }

    tracing::debug!(
        vertices = vertices.len(),
        elements = indices.len() / simplex_size,
        "loaded gmsh mesh"
    );
    Ok(SimplicialMesh::new(
        vertices,
        SimplexList::new(simplex_size, indices),
    ))
}
