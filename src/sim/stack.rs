//! Pillar/plate stack model
//!
//! Plain data: three ordered stacks of disc ids plus the disc table.
//! No rendering knowledge; visuals are looked up through the scene registry.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Session-unique disc identifier (never reused across resets)
pub type DiscId = u32;

/// One of the three posts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PillarTag {
    A,
    B,
    C,
}

impl PillarTag {
    pub const ALL: [PillarTag; 3] = [PillarTag::A, PillarTag::B, PillarTag::C];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            PillarTag::A => 0,
            PillarTag::B => 1,
            PillarTag::C => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PillarTag::A => "A",
            PillarTag::B => "B",
            PillarTag::C => "C",
        }
    }

    /// The pillar that is neither `self` nor `other`
    pub fn third(self, other: PillarTag) -> PillarTag {
        PillarTag::ALL
            .into_iter()
            .find(|&t| t != self && t != other)
            .unwrap_or(self)
    }
}

impl fmt::Display for PillarTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a disc currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscLocation {
    OnPillar(PillarTag),
    /// Popped off a stack and not yet placed
    InTransit,
}

/// A plate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disc {
    pub id: DiscId,
    /// Size rank, 1 = smallest
    pub order: u32,
    pub radius: f32,
    pub height: f32,
    /// Radius of the hole the pillar passes through
    pub pore_radius: f32,
    /// 0xRRGGBB
    pub color: u32,
    pub location: DiscLocation,
    /// Top of its stack and eligible for pick-up
    pub pickable: bool,
    /// Picked up and not yet settled
    pub held: bool,
    /// Where the disc last came to rest (hover lift baseline)
    pub rest_position: Vec3,
}

impl Disc {
    pub fn pillar(&self) -> Option<PillarTag> {
        match self.location {
            DiscLocation::OnPillar(tag) => Some(tag),
            DiscLocation::InTransit => None,
        }
    }
}

/// A post holding a stack of discs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pillar {
    pub tag: PillarTag,
    /// Center of the pillar body
    pub position: Vec3,
    pub height: f32,
    pub radius: f32,
    pub base_height: f32,
    /// Disc ids, bottom to top
    stack: Vec<DiscId>,
}

impl Pillar {
    pub fn new(tag: PillarTag, position: Vec3, height: f32, radius: f32, base_height: f32) -> Self {
        Self {
            tag,
            position,
            height,
            radius,
            base_height,
            stack: Vec::new(),
        }
    }

    /// Disc ids, bottom to top
    pub fn discs(&self) -> &[DiscId] {
        &self.stack
    }

    pub fn top(&self) -> Option<DiscId> {
        self.stack.last().copied()
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Y of the pillar's foot (bottom of the base)
    pub fn foot_y(&self) -> f32 {
        self.position.y - self.height / 2.0
    }

    /// Coordinate directly above the current top of stack
    pub fn placement_position(&self, disc_height: f32) -> Vec3 {
        let start_y = disc_height / 2.0 + self.foot_y() + self.base_height;
        let stack_height = self.stack.len() as f32 * disc_height;
        Vec3::new(self.position.x, start_y + stack_height, self.position.z)
    }
}

/// The three pillars and every live disc
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackModel {
    pillars: [Pillar; 3],
    /// Live discs (sorted by id)
    discs: Vec<Disc>,
    next_id: DiscId,
}

impl StackModel {
    pub fn new(pillars: [Pillar; 3]) -> Self {
        Self {
            pillars,
            discs: Vec::new(),
            next_id: 1,
        }
    }

    pub fn pillar(&self, tag: PillarTag) -> &Pillar {
        &self.pillars[tag.index()]
    }

    pub fn pillars(&self) -> &[Pillar; 3] {
        &self.pillars
    }

    pub fn disc(&self, id: DiscId) -> Option<&Disc> {
        self.discs.iter().find(|d| d.id == id)
    }

    pub fn disc_mut(&mut self, id: DiscId) -> Option<&mut Disc> {
        self.discs.iter_mut().find(|d| d.id == id)
    }

    pub fn discs(&self) -> &[Disc] {
        &self.discs
    }

    /// Top disc of a pillar, if any
    pub fn top_disc(&self, tag: PillarTag) -> Option<&Disc> {
        self.pillar(tag).top().and_then(|id| self.disc(id))
    }

    /// Create a disc that is not yet on any pillar
    pub fn insert_disc(&mut self, order: u32, radius: f32, height: f32, pore_radius: f32, color: u32) -> DiscId {
        let id = self.next_id;
        self.next_id += 1;
        self.discs.push(Disc {
            id,
            order,
            radius,
            height,
            pore_radius,
            color,
            location: DiscLocation::InTransit,
            pickable: false,
            held: false,
            rest_position: Vec3::ZERO,
        });
        id
    }

    /// Forget a disc entirely. It must already be off every stack.
    pub fn remove_disc(&mut self, id: DiscId) -> Option<Disc> {
        if self.pillars.iter().any(|p| p.stack.contains(&id)) {
            log::error!("Refusing to remove disc {} while it is stacked", id);
            return None;
        }
        let idx = self.discs.iter().position(|d| d.id == id)?;
        Some(self.discs.remove(idx))
    }

    /// Remove and return the top disc of a pillar; the disc below becomes pickable
    pub fn pop(&mut self, tag: PillarTag) -> Option<DiscId> {
        let pillar = &mut self.pillars[tag.index()];
        let id = pillar.stack.pop()?;
        let new_top = pillar.stack.last().copied();

        if let Some(disc) = self.disc_mut(id) {
            disc.location = DiscLocation::InTransit;
            disc.pickable = false;
        }
        if let Some(below) = new_top.and_then(|t| self.disc_mut(t)) {
            below.pickable = true;
        }
        Some(id)
    }

    /// Put a disc on top of a pillar. Legality is the caller's concern.
    pub fn push(&mut self, tag: PillarTag, id: DiscId) {
        let Some(height) = self.disc(id).map(|d| d.height) else {
            log::error!("Push of unknown disc {} onto {}", id, tag);
            return;
        };
        if self.pillars.iter().any(|p| p.stack.contains(&id)) {
            log::error!("Disc {} is already stacked", id);
            return;
        }

        let pillar = &self.pillars[tag.index()];
        let rest = pillar.placement_position(height);
        let old_top = pillar.top();

        if let Some(old) = old_top.and_then(|t| self.disc_mut(t)) {
            old.pickable = false;
        }
        if let Some(disc) = self.disc_mut(id) {
            disc.pickable = true;
            disc.location = DiscLocation::OnPillar(tag);
            disc.rest_position = rest;
        }
        self.pillars[tag.index()].stack.push(id);
    }

    /// Orders on a pillar, bottom to top
    pub fn orders(&self, tag: PillarTag) -> Vec<u32> {
        self.pillar(tag)
            .discs()
            .iter()
            .filter_map(|&id| self.disc(id).map(|d| d.order))
            .collect()
    }

    /// Strictly decreasing order from bottom to top
    pub fn is_descending(&self, tag: PillarTag) -> bool {
        self.orders(tag).windows(2).all(|w| w[0] > w[1])
    }

    pub fn held_count(&self) -> usize {
        self.discs.iter().filter(|d| d.held).count()
    }

    /// Pickable discs resting on a pillar
    pub fn pickable_count(&self, tag: PillarTag) -> usize {
        self.discs
            .iter()
            .filter(|d| d.pickable && d.location == DiscLocation::OnPillar(tag))
            .count()
    }

    /// Check all stack invariants at once (for tests and debug assertions)
    pub fn invariants_hold(&self) -> bool {
        PillarTag::ALL.into_iter().all(|tag| {
            let pillar = self.pillar(tag);
            let top_ok = match self.top_disc(tag) {
                Some(top) => top.pickable && self.pickable_count(tag) == 1,
                None => self.pickable_count(tag) == 0,
            };
            self.is_descending(tag) && top_ok && pillar.len() == self.orders(tag).len()
        }) && self.held_count() <= 1
    }
}
