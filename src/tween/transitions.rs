//! Plate transitions: pick-up, put-down and hover cue

use glam::Vec3;

use super::AnimationEvent;
use super::easing::Easing;
use super::sequence::{Property, Sequence, SequenceKind, Step};
use crate::config::Timings;
use crate::scene::VisualHandle;
use crate::sim::{DiscId, PillarTag};

/// Lift straight up, then lean forward. Tilt starts only after the lift lands.
pub fn pick_up(handle: VisualHandle, disc: DiscId, lift_y: f32, timings: &Timings) -> Sequence {
    Sequence::new(handle, SequenceKind::PickUp)
        .then(
            Step::new(timings.lift)
                .to(Property::Y, lift_y)
                .easing(Easing::QuadraticOut),
        )
        .then(Step::new(timings.tilt).to(Property::Tilt, timings.tilt_degrees.to_radians()))
        .on_complete(AnimationEvent::PickedUp { disc })
}

/// Level out, pan to the target pillar, settle onto the stack, restore scale.
///
/// The pan is instant when the plate goes back to the pillar it came from.
pub fn put_down(
    handle: VisualHandle,
    disc: DiscId,
    pillar: PillarTag,
    destination: Vec3,
    same_pillar: bool,
    timings: &Timings,
) -> Sequence {
    let pan = if same_pillar { 0.0 } else { timings.pan };

    Sequence::new(handle, SequenceKind::PutDown)
        .then(Step::new(timings.tilt).to(Property::Tilt, 0.0))
        .then(
            Step::new(pan)
                .to(Property::X, destination.x)
                .to(Property::Z, destination.z)
                .easing(Easing::QuadraticOut),
        )
        .then(
            Step::new(timings.settle)
                .to(Property::Y, destination.y)
                .easing(Easing::QuadraticOut),
        )
        .then(Step::new(timings.scale).to(Property::Scale, 1.0))
        .on_complete(AnimationEvent::PutDownFinished { disc, pillar })
}

/// Pointer feedback: grow and rise while hovered, shrink and drop back otherwise.
/// Two independent sequences, both started immediately.
pub fn hover(handle: VisualHandle, rest_y: f32, height: f32, on: bool, timings: &Timings) -> [Sequence; 2] {
    let (scale, y) = if on {
        (timings.hover_scale, rest_y + height / 2.0)
    } else {
        (1.0, rest_y)
    };
    [
        Sequence::new(handle, SequenceKind::Hover).then(Step::new(timings.hover).to(Property::Scale, scale)),
        Sequence::new(handle, SequenceKind::Hover).then(Step::new(timings.hover).to(Property::Y, y)),
    ]
}
