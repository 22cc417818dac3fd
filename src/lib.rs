//! Lumped mass matrices for Crouzeix-Raviart finite elements
//! on triangle and tetrahedron meshes.
//!
//! The Crouzeix-Raviart space has its degrees of freedom on the facets of a mesh
//! (edges of triangles, faces of tetrahedra).
//! Building its lumped mass matrix takes three steps:
//! finding the unique facets shared between elements
//! along with the map from each element's local facets to them
//! ([`facets`]),
//! measuring the elements ([`measure`]),
//! and distributing each element's measure evenly between its facets
//! on the diagonal of a sparse matrix ([`mass`]).
//!
//! ```
//! # use crmass::{SimplicialMesh, Vec2};
//! let mesh = SimplicialMesh::triangles(
//!     vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
//!     vec![0, 1, 2],
//! );
//! let (mass, facets) = mesh.crouzeix_raviart_mass()?;
//! // one degree of freedom per edge, each getting a third of the area
//! assert_eq!(facets.len(), 3);
//! assert!(mass.values().iter().all(|m| (m - 0.5 / 3.0).abs() < 1e-12));
//! # Ok::<(), crmass::MassMatrixError>(())
//! ```

#![warn(missing_docs)]

pub mod mesh;
#[doc(inline)]
pub use mesh::{SimplexList, SimplicialMesh};

pub mod facets;
#[doc(inline)]
pub use facets::FacetList;

pub mod manifold;

pub mod measure;

pub mod mass;
#[doc(inline)]
pub use mass::{
    mass_matrix, mass_matrix_with_facets, CrouzeixRaviart, ManifoldCheck, MassMatrixError,
};

pub mod gmsh;

// nalgebra re-exports of common types for convenience

pub use nalgebra as na;
pub use nalgebra_sparse as nas;
/// Type alias for a 2D `nalgebra` vector.
pub type Vec2 = na::Vector2<f64>;
/// Type alias for a 3D `nalgebra` vector.
pub type Vec3 = na::Vector3<f64>;
