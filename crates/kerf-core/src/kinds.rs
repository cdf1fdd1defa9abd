//! Built-in node kinds and their factory functions
//!
//! Each kind is a [`KindDef`] static. The factory functions wrap a kind and
//! its arguments into a [`Step`] that the tree builder can open or place.

// Formulas use standard single-letter notation
#![allow(clippy::many_single_char_names)]

use glam::{Vec2, Vec3};

use crate::kind::{DistanceEval, DistanceRule, JoinRule, KindDef, PointEval, PointRule, PostRule};
use crate::tree::Step;
use crate::value::arg;

// ============================================================================
// 2D transforms
// ============================================================================

pub static TRANSLATE2: KindDef = KindDef {
    name: "translate2",
    args: "2",
    point: Some(PointRule {
        glsl: r#"
            vec2 {fn}(vec2 p, vec2 t)
            {
                return p - t;
            }
        "#,
        eval: PointEval::D2(|p, a| p - arg(a, 0).vec2()),
    }),
    distance: None,
    join: None,
    post: None,
    material: false,
};

pub static ROTATE2: KindDef = KindDef {
    name: "rotate2",
    args: "1",
    point: Some(PointRule {
        glsl: r#"
            vec2 {fn}(vec2 p, float a)
            {
                float c = cos(a);
                float s = sin(a);
                return vec2(c*p.x + s*p.y, -s*p.x + c*p.y);
            }
        "#,
        eval: PointEval::D2(|p, a| {
            let (s, c) = arg(a, 0).scalar().sin_cos();
            Vec2::new(c * p.x + s * p.y, -s * p.x + c * p.y)
        }),
    }),
    distance: None,
    join: None,
    post: None,
    material: false,
};

pub static SCALE2: KindDef = KindDef {
    name: "scale2",
    args: "1",
    point: Some(PointRule {
        glsl: r#"
            vec2 {fn}(vec2 p, float s)
            {
                return p / s;
            }
        "#,
        eval: PointEval::D2(|p, a| p / arg(a, 0).scalar()),
    }),
    distance: None,
    join: None,
    post: Some(SCALE_POST),
    material: false,
};

// ============================================================================
// 2D primitives
// ============================================================================

pub static CIRCLE2: KindDef = KindDef {
    name: "circle2",
    args: "1",
    point: None,
    distance: Some(DistanceRule {
        glsl: r#"
            float {fn}(vec2 p, float r)
            {
                return length(p) - r;
            }
        "#,
        eval: DistanceEval::D2(|p, a| p.length() - arg(a, 0).scalar()),
    }),
    join: None,
    post: None,
    material: false,
};

pub static BOX2: KindDef = KindDef {
    name: "box2",
    args: "2",
    point: None,
    distance: Some(DistanceRule {
        glsl: r#"
            float {fn}(vec2 p, vec2 b)
            {
                vec2 d = abs(p) - b;
                return length(max(d, 0.0)) + min(max(d.x, d.y), 0.0);
            }
        "#,
        eval: DistanceEval::D2(|p, a| {
            let d = p.abs() - arg(a, 0).vec2();
            d.max(Vec2::ZERO).length() + d.x.max(d.y).min(0.0)
        }),
    }),
    join: None,
    post: None,
    material: false,
};

// ============================================================================
// 3D transforms
// ============================================================================

pub static TRANSLATE3: KindDef = KindDef {
    name: "translate3",
    args: "3",
    point: Some(PointRule {
        glsl: r#"
            vec3 {fn}(vec3 p, vec3 t)
            {
                return p - t;
            }
        "#,
        eval: PointEval::D3(|p, a| p - arg(a, 0).vec3()),
    }),
    distance: None,
    join: None,
    post: None,
    material: false,
};

pub static SCALE3: KindDef = KindDef {
    name: "scale3",
    args: "1",
    point: Some(PointRule {
        glsl: r#"
            vec3 {fn}(vec3 p, float s)
            {
                return p / s;
            }
        "#,
        eval: PointEval::D3(|p, a| p / arg(a, 0).scalar()),
    }),
    distance: None,
    join: None,
    post: Some(SCALE_POST),
    material: false,
};

/// Revolves a 2D profile around the Y axis; `o` offsets the profile from
/// the axis. Children are built in the (radial, height) plane.
pub static REVOLVE3: KindDef = KindDef {
    name: "revolve3",
    args: "1",
    point: Some(PointRule {
        glsl: r#"
            vec2 {fn}(vec3 p, float o)
            {
                return vec2(length(p.xz) - o, p.y);
            }
        "#,
        eval: PointEval::D3To2(|p, a| {
            Vec2::new(Vec2::new(p.x, p.z).length() - arg(a, 0).scalar(), p.y)
        }),
    }),
    distance: None,
    join: None,
    post: None,
    material: false,
};

/// Uniform scale shrinks space by `s`, so distances grow back by `s`
const SCALE_POST: PostRule = PostRule {
    glsl: r#"
        float {fn}(float d, float s)
        {
            return d * s;
        }
    "#,
    eval: |d, a| d * arg(a, 0).scalar(),
};

// ============================================================================
// 3D primitives
// ============================================================================

pub static SPHERE3: KindDef = KindDef {
    name: "sphere3",
    args: "1",
    point: None,
    distance: Some(DistanceRule {
        glsl: r#"
            float {fn}(vec3 p, float r)
            {
                return length(p) - r;
            }
        "#,
        eval: DistanceEval::D3(|p, a| p.length() - arg(a, 0).scalar()),
    }),
    join: None,
    post: None,
    material: false,
};

pub static BOX3: KindDef = KindDef {
    name: "box3",
    args: "3",
    point: None,
    distance: Some(DistanceRule {
        glsl: r#"
            float {fn}(vec3 p, vec3 b)
            {
                vec3 q = abs(p) - b;
                return length(max(q, 0.0)) + min(max(q.x, max(q.y, q.z)), 0.0);
            }
        "#,
        eval: DistanceEval::D3(|p, a| {
            let q = p.abs() - arg(a, 0).vec3();
            q.max(Vec3::ZERO).length() + q.x.max(q.y.max(q.z)).min(0.0)
        }),
    }),
    join: None,
    post: None,
    material: false,
};

pub static TORUS3: KindDef = KindDef {
    name: "torus3",
    args: "2",
    point: None,
    distance: Some(DistanceRule {
        glsl: r#"
            float {fn}(vec3 p, vec2 t)
            {
                vec2 q = vec2(length(p.xz) - t.x, p.y);
                return length(q) - t.y;
            }
        "#,
        eval: DistanceEval::D3(|p, a| {
            let t = arg(a, 0).vec2();
            let q = Vec2::new(Vec2::new(p.x, p.z).length() - t.x, p.y);
            q.length() - t.y
        }),
    }),
    join: None,
    post: None,
    material: false,
};

// ============================================================================
// Combinators
// ============================================================================

pub static UNION: KindDef = KindDef {
    name: "union",
    args: "",
    point: None,
    distance: None,
    join: Some(JoinRule {
        glsl: r#"
            float {fn}(float d0, float d1)
            {
                return min(d0, d1);
            }
        "#,
        eval: |d0, d1, _| d0.min(d1),
    }),
    post: None,
    material: false,
};

pub static SUBTRACT: KindDef = KindDef {
    name: "subtract",
    args: "",
    point: None,
    distance: None,
    join: Some(JoinRule {
        glsl: r#"
            float {fn}(float d0, float d1)
            {
                return max(-d0, d1);
            }
        "#,
        eval: |d0, d1, _| (-d0).max(d1),
    }),
    post: None,
    material: false,
};

pub static INTERSECT: KindDef = KindDef {
    name: "intersect",
    args: "",
    point: None,
    distance: None,
    join: Some(JoinRule {
        glsl: r#"
            float {fn}(float d0, float d1)
            {
                return max(d0, d1);
            }
        "#,
        eval: |d0, d1, _| d0.max(d1),
    }),
    post: None,
    material: false,
};

pub static SMOOTH_UNION: KindDef = KindDef {
    name: "smooth_union",
    args: "1",
    point: None,
    distance: None,
    join: Some(JoinRule {
        glsl: r#"
            float {fn}(float d0, float d1, float k)
            {
                float h = clamp(0.5 + 0.5*(d1-d0)/k, 0.0, 1.0);
                return mix(d1, d0, h) - k*h*(1.0-h);
            }
        "#,
        eval: |d0, d1, a| {
            let k = arg(a, 0).scalar();
            let h = (0.5 + 0.5 * (d1 - d0) / k).clamp(0.0, 1.0);
            mix(d1, d0, h) - k * h * (1.0 - h)
        },
    }),
    post: None,
    material: false,
};

pub static SMOOTH_SUBTRACT: KindDef = KindDef {
    name: "smooth_subtract",
    args: "1",
    point: None,
    distance: None,
    join: Some(JoinRule {
        glsl: r#"
            float {fn}(float d0, float d1, float k)
            {
                float h = clamp(0.5 - 0.5*(d1+d0)/k, 0.0, 1.0);
                return mix(d1, -d0, h) + k*h*(1.0-h);
            }
        "#,
        eval: |d0, d1, a| {
            let k = arg(a, 0).scalar();
            let h = (0.5 - 0.5 * (d1 + d0) / k).clamp(0.0, 1.0);
            mix(d1, -d0, h) + k * h * (1.0 - h)
        },
    }),
    post: None,
    material: false,
};

pub static SMOOTH_INTERSECT: KindDef = KindDef {
    name: "smooth_intersect",
    args: "1",
    point: None,
    distance: None,
    join: Some(JoinRule {
        glsl: r#"
            float {fn}(float d0, float d1, float k)
            {
                float h = clamp(0.5 - 0.5*(d1-d0)/k, 0.0, 1.0);
                return mix(d1, d0, h) + k*h*(1.0-h);
            }
        "#,
        eval: |d0, d1, a| {
            let k = arg(a, 0).scalar();
            let h = (0.5 - 0.5 * (d1 - d0) / k).clamp(0.0, 1.0);
            mix(d1, d0, h) + k * h * (1.0 - h)
        },
    }),
    post: None,
    material: false,
};

// ============================================================================
// Distance modifiers
// ============================================================================

pub static ROUND: KindDef = KindDef {
    name: "round",
    args: "1",
    point: None,
    distance: None,
    join: None,
    post: Some(PostRule {
        glsl: r#"
            float {fn}(float d, float r)
            {
                return d - r;
            }
        "#,
        eval: |d, a| d - arg(a, 0).scalar(),
    }),
    material: false,
};

pub static ONION: KindDef = KindDef {
    name: "onion",
    args: "1",
    point: None,
    distance: None,
    join: None,
    post: Some(PostRule {
        glsl: r#"
            float {fn}(float d, float t)
            {
                return abs(d) - t;
            }
        "#,
        eval: |d, a| d.abs() - arg(a, 0).scalar(),
    }),
    material: false,
};

/// Material scope; see [`Tree::paint`](crate::Tree::paint)
pub static PAINT: KindDef = KindDef {
    name: "paint",
    args: "",
    point: None,
    distance: None,
    join: None,
    post: None,
    material: true,
};

/// Every built-in kind, in catalogue order
pub static CATALOGUE: &[&KindDef] = &[
    &TRANSLATE2,
    &ROTATE2,
    &SCALE2,
    &CIRCLE2,
    &BOX2,
    &TRANSLATE3,
    &SCALE3,
    &REVOLVE3,
    &SPHERE3,
    &BOX3,
    &TORUS3,
    &UNION,
    &SUBTRACT,
    &INTERSECT,
    &SMOOTH_UNION,
    &SMOOTH_SUBTRACT,
    &SMOOTH_INTERSECT,
    &ROUND,
    &ONION,
    &PAINT,
];

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

// ============================================================================
// Factory functions
// ============================================================================

pub fn translate2(x: f64, y: f64) -> Step {
    Step::new(&TRANSLATE2, crate::args![[x, y]])
}

pub fn rotate2(angle: f64) -> Step {
    Step::new(&ROTATE2, crate::args![angle])
}

pub fn scale2(s: f64) -> Step {
    Step::new(&SCALE2, crate::args![s])
}

pub fn circle2(r: f64) -> Step {
    Step::new(&CIRCLE2, crate::args![r])
}

pub fn box2(w: f64, h: f64) -> Step {
    Step::new(&BOX2, crate::args![[w, h]])
}

pub fn translate3(x: f64, y: f64, z: f64) -> Step {
    Step::new(&TRANSLATE3, crate::args![[x, y, z]])
}

pub fn scale3(s: f64) -> Step {
    Step::new(&SCALE3, crate::args![s])
}

pub fn revolve3(offset: f64) -> Step {
    Step::new(&REVOLVE3, crate::args![offset])
}

pub fn sphere3(r: f64) -> Step {
    Step::new(&SPHERE3, crate::args![r])
}

pub fn box3(x: f64, y: f64, z: f64) -> Step {
    Step::new(&BOX3, crate::args![[x, y, z]])
}

pub fn torus3(major: f64, minor: f64) -> Step {
    Step::new(&TORUS3, crate::args![[major, minor]])
}

pub fn union() -> Step {
    Step::new(&UNION, Vec::new())
}

pub fn subtract() -> Step {
    Step::new(&SUBTRACT, Vec::new())
}

pub fn intersect() -> Step {
    Step::new(&INTERSECT, Vec::new())
}

pub fn smooth_union(k: f64) -> Step {
    Step::new(&SMOOTH_UNION, crate::args![k])
}

pub fn smooth_subtract(k: f64) -> Step {
    Step::new(&SMOOTH_SUBTRACT, crate::args![k])
}

pub fn smooth_intersect(k: f64) -> Step {
    Step::new(&SMOOTH_INTERSECT, crate::args![k])
}

pub fn round(r: f64) -> Step {
    Step::new(&ROUND, crate::args![r])
}

pub fn onion(t: f64) -> Step {
    Step::new(&ONION, crate::args![t])
}
