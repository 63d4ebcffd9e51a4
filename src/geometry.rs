//! Shape descriptions attached to visuals and collisions.

use nalgebra::{Vector2, Vector3};

use crate::element::Element;
use crate::error::{Error, ErrorCode, Errors, Loaded, Result};
use crate::utils::{expect_tag, get_or_record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Empty,
    Box,
    Cylinder,
    Plane,
    Sphere,
    Mesh,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxShape {
    pub size: Vector3<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cylinder {
    pub radius: f64,
    pub length: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub size: Vector2<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sphere {
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub uri: String,
    pub scale: Vector3<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Geometry {
    #[default]
    Empty,
    Box(BoxShape),
    Cylinder(Cylinder),
    Plane(Plane),
    Sphere(Sphere),
    Mesh(Mesh),
}

impl Geometry {
    /// Load a `<geometry>` element. The first recognised shape child wins.
    pub fn load(elem: &Element) -> Result<Loaded<Self>> {
        expect_tag(elem, "geometry", "geometry")?;
        let mut errors = Errors::new();

        let geometry = if let Some(shape) = elem.element("box") {
            Geometry::Box(BoxShape {
                size: get_or_record(&shape, "size", Vector3::repeat(1.0), &mut errors),
            })
        } else if let Some(shape) = elem.element("cylinder") {
            Geometry::Cylinder(Cylinder {
                radius: get_or_record(&shape, "radius", 1.0, &mut errors),
                length: get_or_record(&shape, "length", 1.0, &mut errors),
            })
        } else if let Some(shape) = elem.element("plane") {
            Geometry::Plane(Plane {
                normal: get_or_record(&shape, "normal", Vector3::z(), &mut errors),
                size: get_or_record(&shape, "size", Vector2::repeat(1.0), &mut errors),
            })
        } else if let Some(shape) = elem.element("sphere") {
            Geometry::Sphere(Sphere {
                radius: get_or_record(&shape, "radius", 1.0, &mut errors),
            })
        } else if let Some(shape) = elem.element("mesh") {
            let uri = get_or_record(&shape, "uri", String::new(), &mut errors);
            if uri.is_empty() {
                errors.push(Error::new(
                    ErrorCode::ElementMissing,
                    "a <mesh> geometry requires a <uri>",
                ));
            }
            Geometry::Mesh(Mesh {
                uri,
                scale: get_or_record(&shape, "scale", Vector3::repeat(1.0), &mut errors),
            })
        } else {
            Geometry::Empty
        };

        Ok(Loaded::with_errors(geometry, errors))
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Empty => GeometryKind::Empty,
            Geometry::Box(_) => GeometryKind::Box,
            Geometry::Cylinder(_) => GeometryKind::Cylinder,
            Geometry::Plane(_) => GeometryKind::Plane,
            Geometry::Sphere(_) => GeometryKind::Sphere,
            Geometry::Mesh(_) => GeometryKind::Mesh,
        }
    }

    pub fn as_box(&self) -> Option<&BoxShape> {
        match self {
            Geometry::Box(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_cylinder(&self) -> Option<&Cylinder> {
        match self {
            Geometry::Cylinder(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_plane(&self) -> Option<&Plane> {
        match self {
            Geometry::Plane(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_sphere(&self) -> Option<&Sphere> {
        match self {
            Geometry::Sphere(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match self {
            Geometry::Mesh(shape) => Some(shape),
            _ => None,
        }
    }
}

/// Geometry of the `<geometry>` child of `elem`, or empty when absent.
pub(crate) fn load_child_geometry(elem: &Element, errors: &mut Errors) -> Geometry {
    match elem.element("geometry").map(|g| Geometry::load(&g)) {
        Some(Ok(loaded)) => loaded.merge_into(errors),
        Some(Err(err)) => {
            errors.push(err);
            Geometry::Empty
        }
        None => Geometry::Empty,
    }
}
