//! Areas and volumes of mesh elements.

use nalgebra as na;

use crate::{mass::MassMatrixError, mesh::SimplexList};

/// Twice the unsigned area of each triangle.
///
/// Works in any ambient dimension.
/// Panics if the elements aren't triangles
/// or reference vertices that don't exist.
pub fn double_area<T, const DIM: usize>(
    vertices: &[na::SVector<T, DIM>],
    triangles: &SimplexList,
) -> Vec<T>
where
    T: na::RealField + Copy,
{
    assert_eq!(triangles.simplex_size(), 3, "Expected triangles");

    triangles
        .iter()
        .map(|indices| {
            let a = vertices[indices[1]] - vertices[indices[0]];
            let b = vertices[indices[2]] - vertices[indices[0]];
            // Gram determinant |a|^2 |b|^2 - (a.b)^2 = |a x b|^2,
            // clamped because roundoff can push it below zero for degenerate triangles
            let ab = a.dot(&b);
            let gram_det = a.norm_squared() * b.norm_squared() - ab * ab;
            gram_det.max(na::zero()).sqrt()
        })
        .collect()
}

/// Unsigned volume of each tetrahedron.
///
/// Panics if the elements aren't tetrahedra
/// or reference vertices that don't exist.
pub fn volume<T, const DIM: usize>(
    vertices: &[na::SVector<T, DIM>],
    tetrahedra: &SimplexList,
) -> Vec<T>
where
    T: na::RealField + Copy,
{
    assert_eq!(tetrahedra.simplex_size(), 4, "Expected tetrahedra");

    // vol = sqrt(det(V^T V)) / 3!
    // (see the PyDEC paper section 10.1)
    let factorial: T = na::convert(6.0);
    tetrahedra
        .iter()
        .map(|indices| {
            // edges are vectors from the first vertex to the other ones
            let [a, b, c] = [1, 2, 3].map(|i| vertices[indices[i]] - vertices[indices[0]]);
            #[rustfmt::skip]
            let gram = na::Matrix3::new(
                a.dot(&a), a.dot(&b), a.dot(&c),
                b.dot(&a), b.dot(&b), b.dot(&c),
                c.dot(&a), c.dot(&b), c.dot(&c),
            );
            gram.determinant().max(na::zero()).sqrt() / factorial
        })
        .collect()
}

/// The measure of each element used in the lumped mass matrix:
/// area for triangles and volume for tetrahedra.
///
/// Any other element size is an error,
/// as are vertex indices outside of `vertices`.
pub fn element_measures<T, const DIM: usize>(
    vertices: &[na::SVector<T, DIM>],
    elements: &SimplexList,
) -> Result<Vec<T>, MassMatrixError>
where
    T: na::RealField + Copy,
{
    check_element_size(elements)?;
    check_vertex_indices(vertices.len(), elements)?;

    match elements.simplex_size() {
        3 => {
            let half: T = na::convert(0.5);
            Ok(double_area(vertices, elements)
                .into_iter()
                .map(|area| area * half)
                .collect())
        }
        4 => Ok(volume(vertices, elements)),
        _ => unreachable!("element size was checked above"),
    }
}

/// Triangles and tetrahedra are the only supported elements.
pub(crate) fn check_element_size(elements: &SimplexList) -> Result<(), MassMatrixError> {
    match elements.simplex_size() {
        3 | 4 => Ok(()),
        simplex_size => Err(MassMatrixError::UnsupportedElementSize { simplex_size }),
    }
}

fn check_vertex_indices(
    vertex_count: usize,
    elements: &SimplexList,
) -> Result<(), MassMatrixError> {
    for (element, indices) in elements.iter().enumerate() {
        if let Some(&index) = indices.iter().find(|&&i| i >= vertex_count) {
            return Err(MassMatrixError::VertexOutOfRange {
                element,
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{tests::*, tiny_mesh_2d, tiny_mesh_3d};
    use approx::relative_eq;

    #[test]
    fn triangle_areas() {
        let mesh = single_triangle();
        let double = double_area(mesh.vertices(), mesh.elements());
        assert!(relative_eq!(double[0], 4.0));
        let measures = mesh.element_measures().unwrap();
        assert!(relative_eq!(measures[0], 2.0));

        // all triangles are the same size (base 1, height 1)
        let measures = tiny_mesh_2d().element_measures().unwrap();
        assert_eq!(measures.len(), 6);
        assert!(measures.iter().all(|a| relative_eq!(*a, 0.5)));
    }

    #[test]
    fn triangle_area_does_not_depend_on_ambient_dimension() {
        // the same triangle as `single_triangle`, tilted into 3D space
        let vertices = vec![
            crate::Vec3::new(0.0, 0.0, 0.0),
            crate::Vec3::new(0.0, 2.0, 0.0),
            crate::Vec3::new(0.0, 0.0, 2.0),
        ];
        let triangles = SimplexList::new(3, vec![0, 1, 2]);
        let measures = element_measures(&vertices, &triangles).unwrap();
        assert!(relative_eq!(measures[0], 2.0));
    }

    #[test]
    fn tetrahedron_volumes() {
        let mesh = single_tetrahedron();
        let measures = mesh.element_measures().unwrap();
        assert!(relative_eq!(measures[0], 1.0 / 6.0));

        // every tetrahedron is a half-height pyramid on a triangle of area 0.5
        let measures = tiny_mesh_3d().element_measures().unwrap();
        assert_eq!(measures.len(), 4);
        assert!(measures.iter().all(|v| relative_eq!(*v, 1.0 / 6.0)));
    }

    #[test]
    fn measures_are_unsigned() {
        let mesh = single_tetrahedron();
        let flipped = SimplexList::new(4, vec![0, 2, 1, 3]);
        let measures = element_measures(mesh.vertices(), &flipped).unwrap();
        assert!(relative_eq!(measures[0], 1.0 / 6.0));

        let mesh = single_triangle();
        let flipped = SimplexList::new(3, vec![0, 2, 1]);
        let measures = element_measures(mesh.vertices(), &flipped).unwrap();
        assert!(relative_eq!(measures[0], 2.0));
    }

    #[test]
    fn degenerate_elements_have_zero_measure() {
        let vertices = vec![
            crate::Vec2::new(0.0, 0.0),
            crate::Vec2::new(1.0, 1.0),
            crate::Vec2::new(2.0, 2.0),
        ];
        let measures = element_measures(&vertices, &SimplexList::new(3, vec![0, 1, 2])).unwrap();
        assert!(relative_eq!(measures[0], 0.0));
    }

    #[test]
    fn unsupported_element_sizes_are_rejected() {
        let mesh = tiny_mesh_2d();
        for simplex_size in [1, 2, 5] {
            let elements = SimplexList::new(simplex_size, vec![0; simplex_size]);
            assert_eq!(
                element_measures(mesh.vertices(), &elements),
                Err(MassMatrixError::UnsupportedElementSize { simplex_size })
            );
        }
    }

    #[test]
    fn missing_vertices_are_rejected() {
        let mesh = single_triangle();
        let elements = SimplexList::new(3, vec![0, 1, 2, 1, 2, 3]);
        assert_eq!(
            element_measures(mesh.vertices(), &elements),
            Err(MassMatrixError::VertexOutOfRange {
                element: 1,
                index: 3,
                vertex_count: 3,
            })
        );
    }
}
