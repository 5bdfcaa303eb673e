//! Hover / pick / place state machine
//!
//! Pure: consumes pointer events with their resolved target and returns the
//! commands the session must apply. It reads the stack model but never
//! mutates it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::rules::{can_place_on, placement_for};
use super::stack::{DiscId, PillarTag, StackModel};
use crate::scene::EntityRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Hovering(DiscId),
    Holding {
        disc: DiscId,
        from: PillarTag,
    },
    /// Put-down animation running; no input accepted
    Placing {
        disc: DiscId,
        from: PillarTag,
        to: PillarTag,
    },
}

/// Pointer affordance shown over the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

impl Cursor {
    pub fn css(self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Pointer => "pointer",
        }
    }
}

/// Effects requested by the machine, applied in order by the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Start the hover cue (or its reversal)
    Hover { disc: DiscId, on: bool },
    Cursor(Cursor),
    /// Show the placement ghost at a position, or hide it
    Ghost(Option<Vec3>),
    PickUp { disc: DiscId, from: PillarTag },
    PutDown {
        disc: DiscId,
        from: PillarTag,
        to: PillarTag,
    },
}

#[derive(Debug, Clone, Default)]
pub struct InteractionMachine {
    state: InteractionState,
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// The plate picked up and not yet settled
    pub fn held_disc(&self) -> Option<DiscId> {
        match self.state {
            InteractionState::Holding { disc, .. } | InteractionState::Placing { disc, .. } => Some(disc),
            _ => None,
        }
    }

    pub fn hovered_disc(&self) -> Option<DiscId> {
        match self.state {
            InteractionState::Hovering(disc) => Some(disc),
            _ => None,
        }
    }

    /// Ready for a fresh pick
    pub fn is_idle(&self) -> bool {
        matches!(self.state, InteractionState::Idle | InteractionState::Hovering(_))
    }

    pub fn pointer_move(&mut self, target: Option<EntityRef>, model: &StackModel) -> Vec<Command> {
        match self.state {
            InteractionState::Holding { disc, .. } => match target {
                Some(EntityRef::Pillar(tag)) => match model.disc(disc) {
                    Some(held) if can_place_on(model, held, tag) => vec![
                        Command::Ghost(Some(placement_for(model, held, tag))),
                        Command::Cursor(Cursor::Pointer),
                    ],
                    _ => vec![Command::Ghost(None), Command::Cursor(Cursor::Default)],
                },
                _ => vec![Command::Ghost(None), Command::Cursor(Cursor::Default)],
            },
            InteractionState::Placing { .. } => {
                vec![Command::Ghost(None), Command::Cursor(Cursor::Default)]
            }
            InteractionState::Idle | InteractionState::Hovering(_) => {
                let previous = self.hovered_disc();
                let mut commands: Vec<Command> = previous
                    .map(|disc| Command::Hover { disc, on: false })
                    .into_iter()
                    .collect();

                match target {
                    Some(EntityRef::Disc(id)) => {
                        if previous == Some(id) {
                            return Vec::new();
                        }
                        if model.disc(id).is_some_and(|d| d.pickable && !d.held) {
                            commands.push(Command::Hover { disc: id, on: true });
                            commands.push(Command::Cursor(Cursor::Pointer));
                            self.state = InteractionState::Hovering(id);
                        } else {
                            commands.push(Command::Cursor(Cursor::Default));
                            self.state = InteractionState::Idle;
                        }
                    }
                    _ => {
                        commands.push(Command::Ghost(None));
                        commands.push(Command::Cursor(Cursor::Default));
                        self.state = InteractionState::Idle;
                    }
                }
                commands
            }
        }
    }

    pub fn click(&mut self, target: Option<EntityRef>, model: &StackModel) -> Vec<Command> {
        match (self.state, target) {
            (InteractionState::Idle | InteractionState::Hovering(_), Some(EntityRef::Disc(id))) => {
                let Some(disc) = model.disc(id) else {
                    return Vec::new();
                };
                let Some(from) = disc.pillar().filter(|_| disc.pickable && !disc.held) else {
                    log::debug!("Disc {} is not pickable", id);
                    return Vec::new();
                };

                let mut commands = Vec::new();
                if let Some(other) = self.hovered_disc().filter(|&h| h != id) {
                    commands.push(Command::Hover { disc: other, on: false });
                }
                commands.push(Command::PickUp { disc: id, from });
                commands.push(Command::Cursor(Cursor::Default));
                self.state = InteractionState::Holding { disc: id, from };
                commands
            }
            (InteractionState::Holding { disc, from }, Some(EntityRef::Pillar(to))) => {
                let legal = model.disc(disc).is_some_and(|d| can_place_on(model, d, to));
                if !legal {
                    log::debug!("Rejected move of disc {} onto {}", disc, to);
                    return Vec::new();
                }
                self.state = InteractionState::Placing { disc, from, to };
                vec![Command::Ghost(None), Command::PutDown { disc, from, to }]
            }
            (InteractionState::Placing { .. }, _) => {
                log::debug!("Click ignored while a move is in flight");
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// The put-down of `disc` finished. False if no such placement was pending.
    pub fn finish_placement(&mut self, disc: DiscId) -> bool {
        match self.state {
            InteractionState::Placing { disc: placing, .. } if placing == disc => {
                self.state = InteractionState::Idle;
                true
            }
            state => {
                log::error!("Placement of disc {} finished in state {:?}", disc, state);
                false
            }
        }
    }

    /// Back to idle; returns the held plate, if any, for disposal
    pub fn reset(&mut self) -> Option<DiscId> {
        let held = self.held_disc();
        self.state = InteractionState::Idle;
        held
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stack::Pillar;

    fn model(n: u32) -> (StackModel, Vec<DiscId>) {
        let mk = |tag, x| Pillar::new(tag, Vec3::new(x, 2.95, 0.0), 5.4, 0.2, 0.18);
        let mut m = StackModel::new([
            mk(PillarTag::A, -10.0),
            mk(PillarTag::B, 0.0),
            mk(PillarTag::C, 10.0),
        ]);
        // ids bottom to top
        let ids = (1..=n)
            .rev()
            .map(|order| {
                let id = m.insert_disc(order, order as f32, 0.5, 0.24, 0);
                m.push(PillarTag::A, id);
                id
            })
            .collect();
        (m, ids)
    }

    /// Apply the pick-up to the model the way the session does
    fn pick(machine: &mut InteractionMachine, m: &mut StackModel, id: DiscId) {
        let commands = machine.click(Some(EntityRef::Disc(id)), m);
        for c in commands {
            if let Command::PickUp { disc, from } = c {
                assert_eq!(m.pop(from), Some(disc));
                m.disc_mut(disc).unwrap().held = true;
            }
        }
    }

    #[test]
    fn test_hover_pickable_only() {
        let (m, ids) = model(3);
        let mut machine = InteractionMachine::new();

        // Bottom plate is not pickable
        let c = machine.pointer_move(Some(EntityRef::Disc(ids[0])), &m);
        assert_eq!(c, vec![Command::Cursor(Cursor::Default)]);
        assert_eq!(machine.state(), InteractionState::Idle);

        let top = ids[2];
        let c = machine.pointer_move(Some(EntityRef::Disc(top)), &m);
        assert_eq!(
            c,
            vec![
                Command::Hover { disc: top, on: true },
                Command::Cursor(Cursor::Pointer)
            ]
        );
        assert_eq!(machine.state(), InteractionState::Hovering(top));

        // Same plate again: nothing
        assert!(machine.pointer_move(Some(EntityRef::Disc(top)), &m).is_empty());

        // Off the plate
        let c = machine.pointer_move(None, &m);
        assert_eq!(
            c,
            vec![
                Command::Hover { disc: top, on: false },
                Command::Ghost(None),
                Command::Cursor(Cursor::Default)
            ]
        );
        assert!(machine.is_idle());
    }

    #[test]
    fn test_pick_requires_pickable() {
        let (m, ids) = model(3);
        let mut machine = InteractionMachine::new();
        assert!(machine.click(Some(EntityRef::Disc(ids[0])), &m).is_empty());
        assert!(machine.click(Some(EntityRef::Pillar(PillarTag::B)), &m).is_empty());
        assert!(machine.click(None, &m).is_empty());
        assert_eq!(machine.state(), InteractionState::Idle);
    }

    #[test]
    fn test_pick_then_preview_then_place() {
        let (mut m, ids) = model(3);
        let mut machine = InteractionMachine::new();
        let top = ids[2];

        pick(&mut machine, &mut m, top);
        assert_eq!(
            machine.state(),
            InteractionState::Holding {
                disc: top,
                from: PillarTag::A
            }
        );
        assert_eq!(machine.held_disc(), Some(top));

        // Preview on an empty pillar
        let c = machine.pointer_move(Some(EntityRef::Pillar(PillarTag::C)), &m);
        let expected = m.pillar(PillarTag::C).placement_position(0.5);
        assert_eq!(
            c,
            vec![Command::Ghost(Some(expected)), Command::Cursor(Cursor::Pointer)]
        );

        // Hovering a plate while holding hides the ghost
        let c = machine.pointer_move(Some(EntityRef::Disc(ids[1])), &m);
        assert_eq!(c, vec![Command::Ghost(None), Command::Cursor(Cursor::Default)]);

        let c = machine.click(Some(EntityRef::Pillar(PillarTag::C)), &m);
        assert_eq!(
            c,
            vec![
                Command::Ghost(None),
                Command::PutDown {
                    disc: top,
                    from: PillarTag::A,
                    to: PillarTag::C
                }
            ]
        );

        // In flight: everything ignored
        assert!(machine.click(Some(EntityRef::Disc(ids[1])), &m).is_empty());
        assert!(machine.click(Some(EntityRef::Pillar(PillarTag::B)), &m).is_empty());

        assert!(!machine.finish_placement(ids[1]));
        assert!(machine.finish_placement(top));
        assert_eq!(machine.state(), InteractionState::Idle);
    }

    #[test]
    fn test_illegal_target_rejected() {
        let (mut m, ids) = model(3);
        let mut machine = InteractionMachine::new();

        // Move order 1 to C, then pick order 2
        pick(&mut machine, &mut m, ids[2]);
        machine.click(Some(EntityRef::Pillar(PillarTag::C)), &m);
        m.push(PillarTag::C, ids[2]);
        m.disc_mut(ids[2]).unwrap().held = false;
        machine.finish_placement(ids[2]);

        pick(&mut machine, &mut m, ids[1]);

        let c = machine.pointer_move(Some(EntityRef::Pillar(PillarTag::C)), &m);
        assert_eq!(c, vec![Command::Ghost(None), Command::Cursor(Cursor::Default)]);
        assert!(machine.click(Some(EntityRef::Pillar(PillarTag::C)), &m).is_empty());
        assert!(matches!(machine.state(), InteractionState::Holding { .. }));

        // Back onto its own pillar is legal
        let c = machine.click(Some(EntityRef::Pillar(PillarTag::A)), &m);
        assert!(matches!(c[1], Command::PutDown { to: PillarTag::A, .. }));
    }

    #[test]
    fn test_reset_reports_held() {
        let (mut m, ids) = model(2);
        let mut machine = InteractionMachine::new();
        assert_eq!(machine.reset(), None);
        pick(&mut machine, &mut m, ids[1]);
        assert_eq!(machine.reset(), Some(ids[1]));
        assert_eq!(machine.state(), InteractionState::Idle);
    }
}
