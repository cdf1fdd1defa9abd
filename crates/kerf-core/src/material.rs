//! Material sets and material records
//!
//! A [`MaterialSet`] is the field schema for one dimensionality. Material
//! records implement [`Material`] and override some of those fields; the rest
//! default to zero.

use glam::Vec3;

use crate::kind::Dim;
use crate::value::{Value, ValueType};
use crate::{Error, Result};

/// Name of the generated material struct
pub const MATERIAL_TYPE: &str = "Material";

/// Field schema of the active material
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSet {
    fields: Vec<(&'static str, ValueType)>,
}

impl MaterialSet {
    /// The degenerate set with no fields
    pub fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    /// Schema used by views of dimensionality `dim`.
    ///
    /// 2D cross-sections are shaded by distance alone and carry no material.
    pub fn for_dim(dim: Dim) -> Self {
        match dim {
            Dim::Two => Self::empty(),
            Dim::Three => Self {
                fields: vec![("color", ValueType::Vec3), ("emission", ValueType::Vec3)],
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[(&'static str, ValueType)] {
        &self.fields
    }

    /// GLSL struct declaration
    pub fn struct_source(&self) -> String {
        let mut src = format!("struct {}\n{{\n", MATERIAL_TYPE);
        for (name, ty) in &self.fields {
            src.push_str(&format!("    {} {};\n", ty.glsl(), name));
        }
        src.push_str("};\n");
        src
    }

    /// Resolve every field of `material`, filling unset ones with zero
    pub fn values(&self, material: &dyn Material) -> Result<Vec<Value>> {
        let overrides = material.fields();
        if let Some((name, _)) = overrides
            .iter()
            .find(|(name, _)| !self.fields.iter().any(|(f, _)| f == name))
        {
            return Err(Error::UnknownMaterialField((*name).to_string()));
        }

        self.fields
            .iter()
            .map(|(field, ty)| {
                match overrides.iter().rev().find(|(name, _)| name == field) {
                    Some((_, v)) if v.ty() == *ty && v.is_finite() => Ok(*v),
                    Some(_) => Err(Error::MaterialFieldType {
                        field: (*field).to_string(),
                        expected: *ty,
                    }),
                    None => Ok(ty.zero()),
                }
            })
            .collect()
    }

    /// Literal text `Material(field0, field1, ...)` for resolved values
    pub fn literal(values: &[Value]) -> String {
        let parts: Vec<String> = values.iter().map(|v| v.literal()).collect();
        format!("{}({})", MATERIAL_TYPE, parts.join(", "))
    }

    /// The all-zero material
    pub fn zero(&self) -> Vec<Value> {
        self.fields.iter().map(|(_, ty)| ty.zero()).collect()
    }
}

/// A material record: a set of field overrides
pub trait Material {
    /// Field values this material sets; unset fields resolve to zero
    fn fields(&self) -> Vec<(&'static str, Value)>;
}

/// Simple color/emission material for 3D views
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Surface {
    pub color: Option<Vec3>,
    pub emission: Option<Vec3>,
}

impl Surface {
    /// A matte surface of the given color
    pub fn color(r: f32, g: f32, b: f32) -> Self {
        Self {
            color: Some(Vec3::new(r, g, b)),
            emission: None,
        }
    }

    /// Add light emission
    pub fn emissive(mut self, r: f32, g: f32, b: f32) -> Self {
        self.emission = Some(Vec3::new(r, g, b));
        self
    }
}

impl Material for Surface {
    fn fields(&self) -> Vec<(&'static str, Value)> {
        let mut out = Vec::new();
        if let Some(c) = self.color {
            out.push(("color", Value::Vec3(c)));
        }
        if let Some(e) = self.emission {
            out.push(("emission", Value::Vec3(e)));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    struct Glow;

    impl Material for Glow {
        fn fields(&self) -> Vec<(&'static str, Value)> {
            vec![("emission", Value::Vec3(Vec3::new(1.0, 0.5, 0.0)))]
        }
    }

    struct Shiny;

    impl Material for Shiny {
        fn fields(&self) -> Vec<(&'static str, Value)> {
            vec![("gloss", Value::Scalar(1.0))]
        }
    }

    #[test]
    fn test_2d_set_is_empty() {
        assert!(MaterialSet::for_dim(Dim::Two).is_empty());
        assert!(!MaterialSet::for_dim(Dim::Three).is_empty());
    }

    #[test]
    fn test_struct_source() {
        let set = MaterialSet::for_dim(Dim::Three);
        assert_eq!(
            set.struct_source(),
            "struct Material\n{\n    vec3 color;\n    vec3 emission;\n};\n"
        );
    }

    #[test]
    fn test_unset_fields_default_to_zero() {
        let set = MaterialSet::for_dim(Dim::Three);
        let values = set.values(&Glow).unwrap();
        assert_eq!(
            MaterialSet::literal(&values),
            "Material(vec3(0.000000,0.000000,0.000000), vec3(1.000000,0.500000,0.000000))"
        );
    }

    #[test]
    fn test_unknown_field() {
        let set = MaterialSet::for_dim(Dim::Three);
        assert_eq!(
            set.values(&Shiny).unwrap_err(),
            Error::UnknownMaterialField("gloss".into())
        );
    }

    #[test]
    fn test_wrong_field_type() {
        struct Flat;
        impl Material for Flat {
            fn fields(&self) -> Vec<(&'static str, Value)> {
                vec![("color", Value::Scalar(1.0))]
            }
        }
        let set = MaterialSet::for_dim(Dim::Three);
        assert!(matches!(
            set.values(&Flat).unwrap_err(),
            Error::MaterialFieldType { .. }
        ));
    }

    #[test]
    fn test_non_finite_field_rejected() {
        let set = MaterialSet::for_dim(Dim::Three);
        let err = set
            .values(&Surface::color(f32::NAN, 0.0, 0.0))
            .unwrap_err();
        assert_eq!(
            err,
            Error::MaterialFieldType {
                field: "color".into(),
                expected: ValueType::Vec3
            }
        );
    }

    #[test]
    fn test_surface_builder() {
        let s = Surface::color(1.0, 0.0, 0.0).emissive(0.0, 0.0, 2.0);
        assert_eq!(s.fields().len(), 2);
    }
}
