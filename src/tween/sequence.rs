//! Chained, timed property steps on a single visual
//!
//! A step captures its start values only when it begins, so each step
//! starts exactly where its predecessor left the transform.

use std::collections::VecDeque;

use super::AnimationEvent;
use super::easing::{Easing, lerp};
use crate::scene::{Transform, VisualHandle};

/// Animatable transform channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    X,
    Y,
    Z,
    /// Rotation about the X axis (radians)
    Tilt,
    /// Uniform scale
    Scale,
}

impl Property {
    pub fn read(self, t: &Transform) -> f32 {
        match self {
            Property::X => t.position.x,
            Property::Y => t.position.y,
            Property::Z => t.position.z,
            Property::Tilt => t.tilt,
            Property::Scale => t.scale,
        }
    }

    pub fn write(self, t: &mut Transform, value: f32) {
        match self {
            Property::X => t.position.x = value,
            Property::Y => t.position.y = value,
            Property::Z => t.position.z = value,
            Property::Tilt => t.tilt = value,
            Property::Scale => t.scale = value,
        }
    }
}

/// One timed, eased move of a set of properties toward target values
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    targets: Vec<(Property, f32)>,
    duration: f32,
    easing: Easing,
}

impl Step {
    pub fn new(duration: f32) -> Self {
        Self {
            targets: Vec::new(),
            duration: duration.max(0.0),
            easing: Easing::Linear,
        }
    }

    pub fn to(mut self, property: Property, value: f32) -> Self {
        self.targets.push((property, value));
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

/// What a sequence is for (used to cancel by purpose)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    Hover,
    PickUp,
    PutDown,
}

/// In-flight progress of the front step
#[derive(Debug, Clone)]
struct Running {
    from: Vec<f32>,
    elapsed: f32,
}

/// Ordered chain of steps; step N+1 starts only after step N completes
#[derive(Debug, Clone)]
pub struct Sequence {
    handle: VisualHandle,
    kind: SequenceKind,
    steps: VecDeque<Step>,
    running: Option<Running>,
    on_complete: Option<AnimationEvent>,
}

impl Sequence {
    pub fn new(handle: VisualHandle, kind: SequenceKind) -> Self {
        Self {
            handle,
            kind,
            steps: VecDeque::new(),
            running: None,
            on_complete: None,
        }
    }

    pub fn then(mut self, step: Step) -> Self {
        self.steps.push_back(step);
        self
    }

    /// Event reported once, when the last step finishes
    pub fn on_complete(mut self, event: AnimationEvent) -> Self {
        self.on_complete = Some(event);
        self
    }

    pub fn handle(&self) -> VisualHandle {
        self.handle
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    /// Steps not yet finished (including the running one)
    pub fn remaining_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn is_finished(&self) -> bool {
        self.steps.is_empty()
    }

    /// Take the completion event (at most once)
    pub(crate) fn take_completion(&mut self) -> Option<AnimationEvent> {
        self.on_complete.take()
    }

    /// Advance by `dt` seconds. Time left over after a step finishes flows
    /// into the next one. Returns true once every step has finished.
    pub fn advance(&mut self, mut dt: f32, transform: &mut Transform) -> bool {
        while let Some(step) = self.steps.front() {
            // Out of time: timed steps start on the next tick, instant ones now
            if self.running.is_none() && dt <= 0.0 && step.duration > 0.0 {
                return false;
            }
            let running = self.running.get_or_insert_with(|| Running {
                from: step.targets.iter().map(|(p, _)| p.read(transform)).collect(),
                elapsed: 0.0,
            });

            let remaining = step.duration - running.elapsed;
            if dt < remaining {
                running.elapsed += dt;
                let t = step.easing.apply(running.elapsed / step.duration);
                for (&(property, to), &from) in step.targets.iter().zip(&running.from) {
                    property.write(transform, lerp(from, to, t));
                }
                return false;
            }

            // Step done: land exactly on the targets
            dt -= remaining.max(0.0);
            for &(property, to) in &step.targets {
                property.write(transform, to);
            }
            self.steps.pop_front();
            self.running = None;
        }
        true
    }
}
