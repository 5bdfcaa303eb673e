//! Move legality
//!
//! Pure predicates evaluated before any mutation, so no rollback is needed.

use glam::Vec3;

use super::stack::{Disc, PillarTag, StackModel};

/// A plate of `order` may go onto a stack whose top has `top_order`
#[inline]
pub fn can_place(order: u32, top_order: Option<u32>) -> bool {
    match top_order {
        None => true,
        Some(top) => top > order,
    }
}

/// Whether `disc` may be placed on `target`
pub fn can_place_on(model: &StackModel, disc: &Disc, target: PillarTag) -> bool {
    can_place(disc.order, model.top_disc(target).map(|d| d.order))
}

/// Destination coordinate for a plate dropped on `target`
pub fn placement_for(model: &StackModel, disc: &Disc, target: PillarTag) -> Vec3 {
    model.pillar(target).placement_position(disc.height)
}
