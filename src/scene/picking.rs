//! Pointer picking
//!
//! Client coordinates are turned into a camera ray, every node is tested,
//! and the nearest hit that the registry knows about wins. Nodes with no
//! registry entry (table, ghost) never block a pick.

use std::collections::BTreeMap;

use glam::Vec2;

use super::{Ray, SceneGraph, VisualHandle};
use crate::sim::{DiscId, PillarTag};

/// Game entity a visual stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Disc(DiscId),
    Pillar(PillarTag),
}

/// Visual handle <-> entity lookup
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    by_handle: BTreeMap<VisualHandle, EntityRef>,
    disc_visuals: BTreeMap<DiscId, VisualHandle>,
    pillar_parts: BTreeMap<PillarTag, Vec<VisualHandle>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_disc(&mut self, disc: DiscId, handle: VisualHandle) {
        self.by_handle.insert(handle, EntityRef::Disc(disc));
        if let Some(old) = self.disc_visuals.insert(disc, handle) {
            self.by_handle.remove(&old);
        }
    }

    /// Any number of parts (body, base, holder, label) may map to one pillar
    pub fn bind_pillar_part(&mut self, pillar: PillarTag, handle: VisualHandle) {
        self.by_handle.insert(handle, EntityRef::Pillar(pillar));
        self.pillar_parts.entry(pillar).or_default().push(handle);
    }

    /// Forget a disc; returns the visual it was bound to
    pub fn unbind_disc(&mut self, disc: DiscId) -> Option<VisualHandle> {
        let handle = self.disc_visuals.remove(&disc)?;
        self.by_handle.remove(&handle);
        Some(handle)
    }

    /// Forget one pillar part (labels come and go with the font)
    pub fn unbind_pillar_part(&mut self, handle: VisualHandle) {
        let Some(EntityRef::Pillar(tag)) = self.entity(handle) else {
            return;
        };
        self.by_handle.remove(&handle);
        if let Some(parts) = self.pillar_parts.get_mut(&tag) {
            parts.retain(|&h| h != handle);
        }
    }

    pub fn entity(&self, handle: VisualHandle) -> Option<EntityRef> {
        self.by_handle.get(&handle).copied()
    }

    pub fn disc_visual(&self, disc: DiscId) -> Option<VisualHandle> {
        self.disc_visuals.get(&disc).copied()
    }

    pub fn pillar_parts(&self, pillar: PillarTag) -> &[VisualHandle] {
        self.pillar_parts.get(&pillar).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn disc_count(&self) -> usize {
        self.disc_visuals.len()
    }
}

/// Entity under the pointer at client coordinates, if any
pub fn pick(scene: &SceneGraph, registry: &EntityRegistry, client: Vec2) -> Option<EntityRef> {
    let ndc = scene.viewport().to_ndc(client)?;
    let ray = scene.camera().ray_from_ndc(ndc);
    pick_ray(scene, registry, &ray)
}

/// Nearest registered entity along `ray`
pub fn pick_ray(scene: &SceneGraph, registry: &EntityRegistry, ray: &Ray) -> Option<EntityRef> {
    scene
        .intersect(ray)
        .into_iter()
        .find_map(|hit| registry.entity(hit.handle))
}
