//! Built-in scenes

use kerf_core::kinds::{
    box2, circle2, onion, revolve3, rotate2, round, smooth_union, sphere3, subtract, torus3,
    translate2, translate3, union,
};
use kerf_core::{Result, Surface, Tree, ViewRegistry, view2d, view3d};

/// Every scene the binary knows about, in listing order
pub fn registry() -> Result<ViewRegistry> {
    let mut views = ViewRegistry::new();
    view2d!(views, test1)?;
    view2d!(views, test2)?;
    view2d!(views, test3)?;
    view2d!(views, frame)?;
    view3d!(views, lamp)?;
    Ok(views)
}

fn test1(t: &mut Tree) -> Result<()> {
    t.chain([union(), subtract(), translate2(-1.0, -1.0)], |t| {
        t.with(translate2(-2.0, 5.0), |t| t.leaf(circle2(1.0)))?;
        t.with(translate2(2.0, -5.0), |t| t.leaf(circle2(2.0)))
    })
}

fn test2(t: &mut Tree) -> Result<()> {
    t.chain([union(), subtract(), translate2(-1.0, -1.0)], |t| {
        t.with(translate2(-2.0, 5.0), |t| t.leaf(circle2(3.0)))?;
        t.with(translate2(2.0, -5.0), |t| t.leaf(circle2(3.0)))
    })
}

fn test3(t: &mut Tree) -> Result<()> {
    t.with(translate2(1.0, 1.0), |t| t.leaf(circle2(1.0)))?;
    t.with(translate2(-1.0, 1.0), |t| t.leaf(circle2(1.0)))
}

/// Ring cut out of a tilted plate
fn frame(t: &mut Tree) -> Result<()> {
    t.chain([rotate2(0.3), subtract()], |t| {
        t.with(onion(0.05), |t| t.leaf(circle2(0.4)))?;
        t.leaf(box2(1.0, 0.6))
    })
}

fn lamp(t: &mut Tree) -> Result<()> {
    let brass = Surface::color(0.8, 0.6, 0.2);
    let bulb = Surface::color(1.0, 0.95, 0.8).emissive(4.0, 3.6, 2.8);

    t.with(smooth_union(0.2), |t| {
        t.paint(&brass, |t| {
            t.chain([revolve3(0.0), round(0.05)], |t| t.leaf(box2(1.0, 0.1)))?;
            t.with(translate3(0.0, 1.0, 0.0), |t| t.leaf(torus3(0.6, 0.08)))
        })?;
        t.paint(&bulb, |t| {
            t.with(translate3(0.0, 1.6, 0.0), |t| t.leaf(sphere3(0.4)))
        })
    })
}
