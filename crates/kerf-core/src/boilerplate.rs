//! Fixed render procedures appended after the generated map
//!
//! 2D views get a cross-section shader that colors by distance; 3D views get
//! normal estimation, a sphere marcher and single point-light shading. These
//! are static templates; only the map procedure name is substituted.

use crate::kind::Dim;

const CROSS_SECTION: &str = include_str!("shaders/cross_section.glsl");
const RAYMARCH: &str = include_str!("shaders/raymarch.glsl");

/// Render template for `dim`, calling the map procedure `map_name`
pub fn template(dim: Dim, map_name: &str) -> String {
    let src = match dim {
        Dim::Two => CROSS_SECTION,
        Dim::Three => RAYMARCH,
    };
    src.replace("{map}", map_name)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_map_name_substituted() {
        let src = template(Dim::Three, "scene");
        assert!(src.contains("float d = scene(ro + rd*t, m);"));
        assert!(src.contains("vec3 scene_normal(vec3 p)"));
        assert!(!src.contains("{map}"));
    }

    #[test]
    fn test_2d_template_has_no_material() {
        let src = template(Dim::Two, "map");
        assert!(src.contains("float d = map(p);"));
        assert!(!src.contains("Material"));
    }
}
