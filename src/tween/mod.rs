//! Property animation
//!
//! The animator only writes visual transforms in the scene graph. Game state
//! changes happen in the session when it receives an [`AnimationEvent`].

pub mod easing;
pub mod sequence;
pub mod transitions;

pub use easing::{Easing, lerp};
pub use sequence::{Property, Sequence, SequenceKind, Step};

use crate::scene::{SceneGraph, VisualHandle};
use crate::sim::{DiscId, PillarTag};

/// Completion signals reported by [`Animator::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationEvent {
    /// A picked plate reached its lifted, tilted pose
    PickedUp { disc: DiscId },
    /// A plate finished settling onto `pillar`
    PutDownFinished { disc: DiscId, pillar: PillarTag },
}

/// Runs every active sequence, one frame at a time
#[derive(Debug, Default)]
pub struct Animator {
    /// In start order
    sequences: Vec<Sequence>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, sequence: Sequence) {
        self.sequences.push(sequence);
    }

    /// Drop sequences on `handle` (optionally only those of one kind)
    pub fn cancel(&mut self, handle: VisualHandle, kind: Option<SequenceKind>) {
        self.sequences
            .retain(|s| s.handle() != handle || kind.is_some_and(|k| s.kind() != k));
    }

    /// Abandon everything in flight; no completion events are reported
    pub fn clear(&mut self) {
        self.sequences.clear();
    }

    pub fn is_idle(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn is_animating(&self, handle: VisualHandle) -> bool {
        self.sequences.iter().any(|s| s.handle() == handle)
    }

    pub fn active(&self) -> usize {
        self.sequences.len()
    }

    /// Advance all sequences by `dt` seconds; returns completions in start order
    pub fn update(&mut self, dt: f32, scene: &mut SceneGraph) -> Vec<AnimationEvent> {
        let mut events = Vec::new();

        self.sequences.retain_mut(|sequence| {
            let Some(transform) = scene.transform_mut(sequence.handle()) else {
                // Visual was removed out from under us
                log::debug!("Dropping animation on removed visual {:?}", sequence.handle());
                return false;
            };
            if sequence.advance(dt, transform) {
                if let Some(event) = sequence.take_completion() {
                    events.push(event);
                }
                false
            } else {
                true
            }
        });

        events
    }
}
