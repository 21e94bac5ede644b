//! Core traits for tryon

use crate::{landmarks::Face, mesh::TriangleMesh, model::Model, model::ModelPart, point::*};

/// Trait for objects with spatial extent
pub trait Drawable {
    /// Axis-aligned bounding box as `(min, max)`; both at the origin when empty
    fn bounding_box(&self) -> (Point3f, Point3f);

    /// Get the center point of the object
    fn center(&self) -> Point3f {
        let (min, max) = self.bounding_box();
        nalgebra::center(&min, &max)
    }
}

fn bounds_of<I>(points: I) -> (Point3f, Point3f)
where
    I: IntoIterator<Item = Point3f>,
{
    let mut iter = points.into_iter();
    let Some(first) = iter.next() else {
        return (Point3f::origin(), Point3f::origin());
    };
    iter.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)))
}

impl Drawable for TriangleMesh {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds_of(self.vertices.iter().copied())
    }
}

impl Drawable for ModelPart {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds_of(self.world_vertices())
    }
}

impl Drawable for Model {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds_of(self.parts.iter().flat_map(|p| p.world_vertices()))
    }
}

impl Drawable for Face {
    fn bounding_box(&self) -> (Point3f, Point3f) {
        bounds_of(self.mesh.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_bounds_and_center() {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![Point3f::new(-1.0, 0.0, 2.0), Point3f::new(3.0, 4.0, -2.0)],
            vec![],
        );
        assert_eq!(
            mesh.bounding_box(),
            (Point3f::new(-1.0, 0.0, -2.0), Point3f::new(3.0, 4.0, 2.0))
        );
        assert_eq!(mesh.center(), Point3f::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_empty_model_bounds_at_origin() {
        let model = Model::new("empty");
        assert_eq!(model.bounding_box(), (Point3f::origin(), Point3f::origin()));
    }
}
