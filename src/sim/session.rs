//! Game session
//!
//! Owns the stack model, scene, entity registry, animator and interaction
//! machine for one page lifetime. Pointer input and frame ticks come in,
//! [`GameEvent`]s go out to the host.

use glam::{Vec2, Vec3};
use serde::Serialize;

use super::interaction::{Command, Cursor, InteractionMachine, InteractionState};
use super::solver;
use super::stack::{Disc, DiscId, Pillar, PillarTag, StackModel};
use crate::config::GameConfig;
use crate::consts::*;
use crate::scene::{
    Camera, EntityRef, EntityRegistry, FrameSnapshot, Label, Material, SceneGraph, SceneNode, Shape,
    VisualHandle, Viewport, pick,
};
use crate::tween::{AnimationEvent, Animator, SequenceKind, transitions};

/// Summary of a solved puzzle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameResult {
    pub disc_count: u32,
    pub elapsed_secs: f64,
    pub moves: u32,
    /// No larger puzzle is available
    pub final_level: bool,
}

impl GameResult {
    pub fn message(&self) -> String {
        format!(
            "Congratulations, puzzle solved! {} plates in {:.1} seconds, {} moves",
            self.disc_count, self.elapsed_secs, self.moves
        )
    }
}

/// Events for the host, drained once per frame
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    CursorChanged(Cursor),
    MoveCompleted {
        disc: DiscId,
        from: PillarTag,
        to: PillarTag,
        moves: u32,
    },
    Won(GameResult),
    LevelStarted { disc_count: u32 },
}

pub struct Session {
    config: GameConfig,
    model: StackModel,
    scene: SceneGraph,
    registry: EntityRegistry,
    animator: Animator,
    machine: InteractionMachine,
    /// Translucent preview of the held plate; not in the registry
    ghost: Option<VisualHandle>,
    disc_count: u32,
    move_count: u32,
    start_time_ms: f64,
    cursor: Cursor,
    won: bool,
    autoplay: bool,
    /// Where demo mode will drop the plate it is holding
    autoplay_target: Option<PillarTag>,
    label_warned: bool,
    /// Pillar bodies carry the pillar labels
    pillar_bodies: Vec<(PillarTag, VisualHandle)>,
    /// Hidden hit volumes over the pillar labels
    label_volumes: Vec<(PillarTag, VisualHandle)>,
    events: Vec<GameEvent>,
}

fn pillar_label(pillar: &Pillar) -> Label {
    let size = pillar.radius * 2.0;
    Label {
        text: pillar.tag.to_string(),
        size,
        color: PILLAR_LABEL_COLOR,
        offset: Vec3::new(0.0, pillar.height / 2.0 + size, 0.0),
    }
}

/// Order number on the plate's front rim
fn plate_label(disc: &Disc) -> Label {
    Label {
        text: disc.order.to_string(),
        size: disc.height / 1.6,
        color: PLATE_LABEL_COLOR,
        offset: Vec3::new(0.0, 0.0, disc.radius - disc.pore_radius),
    }
}

impl Session {
    /// Build the table, pillars and the first stack of plates
    pub fn new(config: GameConfig, viewport: Viewport, now_ms: f64) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                log::error!("Invalid config ({}), using defaults", e);
                GameConfig::default()
            }
        };

        let mut camera = Camera::new(&config.camera, viewport.aspect());
        camera.fit_width(config.table.width);
        let scene = SceneGraph::new(camera, viewport);

        let pillars = Self::pillar_layout(&config);
        let mut session = Self {
            disc_count: config.initial_discs,
            model: StackModel::new(pillars),
            scene,
            registry: EntityRegistry::new(),
            animator: Animator::new(),
            machine: InteractionMachine::new(),
            ghost: None,
            move_count: 0,
            start_time_ms: now_ms,
            cursor: Cursor::Default,
            won: false,
            autoplay: false,
            autoplay_target: None,
            label_warned: false,
            pillar_bodies: Vec::new(),
            label_volumes: Vec::new(),
            events: Vec::new(),
            config,
        };

        session.add_scenery();
        session.populate();
        log::info!(
            "Session started with {} plates on {}, goal {}",
            session.disc_count,
            session.config.start_pillar,
            session.config.goal_pillar
        );
        session
    }

    fn pillar_layout(config: &GameConfig) -> [Pillar; 3] {
        let spacing = config.table.width / 3.0;
        let y = (config.table.height + config.pillar.height) / 2.0;
        PillarTag::ALL.map(|tag| {
            let x = (tag.index() as f32 - 1.0) * spacing;
            Pillar::new(
                tag,
                Vec3::new(x, y, 0.0),
                config.pillar.height,
                config.pillar.radius,
                config.pillar.base_height,
            )
        })
    }

    /// Report whether the label typeface loaded. Labels come off when it is
    /// lost and go back on every pillar and plate once it arrives.
    pub fn set_font_available(&mut self, available: bool) {
        self.scene.set_font_available(available);
        if self.labels_enabled() {
            self.attach_labels();
        } else {
            self.strip_labels();
        }
    }

    fn attach_labels(&mut self) {
        for (tag, body) in self.pillar_bodies.clone() {
            let pillar = self.model.pillar(tag);
            let label = pillar_label(pillar);
            let center = pillar.position + label.offset;
            if !self.label_volumes.iter().any(|&(t, _)| t == tag) {
                // Clicking the text selects the pillar
                let volume = SceneNode::new(
                    Shape::Box {
                        width: label.size,
                        height: label.size,
                        depth: label.size,
                    },
                    Material::solid(PILLAR_LABEL_COLOR),
                )
                .at(center)
                .hidden();
                let handle = self.scene.add(volume);
                self.registry.bind_pillar_part(tag, handle);
                self.label_volumes.push((tag, handle));
            }
            if let Some(node) = self.scene.node_mut(body) {
                node.label = Some(label);
            }
        }

        let plates: Vec<(VisualHandle, Label)> = self
            .model
            .discs()
            .iter()
            .filter_map(|d| Some((self.registry.disc_visual(d.id)?, plate_label(d))))
            .collect();
        for (handle, label) in plates {
            if let Some(node) = self.scene.node_mut(handle) {
                node.label = Some(label);
            }
        }
    }

    fn strip_labels(&mut self) {
        let labelled: Vec<VisualHandle> = self
            .scene
            .nodes()
            .filter(|(_, node)| node.label.is_some())
            .map(|(handle, _)| handle)
            .collect();
        for handle in labelled {
            if let Some(node) = self.scene.node_mut(handle) {
                node.label = None;
            }
        }
        for (_, handle) in std::mem::take(&mut self.label_volumes) {
            self.registry.unbind_pillar_part(handle);
            self.scene.remove(handle);
        }
    }

    /// Labels need both the config flag and a loaded typeface
    fn labels_enabled(&mut self) -> bool {
        if !self.config.labels {
            return false;
        }
        if !self.scene.font_available() {
            if !self.label_warned {
                log::warn!("Label font unavailable, labels omitted");
                self.label_warned = true;
            }
            return false;
        }
        true
    }

    fn add_scenery(&mut self) {
        let table = self.config.table;
        self.scene.add(SceneNode::new(
            Shape::Box {
                width: table.width,
                height: table.height,
                depth: table.depth,
            },
            Material::solid(TABLE_COLOR),
        ));

        let parts: Vec<(PillarTag, Vec3, f32, f32, f32)> = self
            .model
            .pillars()
            .iter()
            .map(|p| (p.tag, p.position, p.foot_y(), p.radius, p.height))
            .collect();

        for (tag, position, foot, radius, height) in parts {
            let body = SceneNode::new(Shape::Cylinder { radius, height }, Material::solid(PILLAR_COLOR))
                .at(position);

            let base_height = self.config.pillar.base_height;
            let base = SceneNode::new(
                Shape::Cylinder {
                    radius: radius * 2.0,
                    height: base_height,
                },
                Material::solid(PILLAR_BASE_COLOR),
            )
            .at(Vec3::new(position.x, foot + base_height / 2.0, position.z));

            // Enlarged invisible hit volume so the pillar is easy to target
            let holder = SceneNode::new(
                Shape::Cylinder {
                    radius: radius * 3.0,
                    height: height * 1.5,
                },
                Material::solid(PILLAR_COLOR),
            )
            .at(Vec3::new(position.x, foot + height * 1.5 / 2.0, position.z))
            .hidden();

            let body = self.scene.add(body);
            self.registry.bind_pillar_part(tag, body);
            self.pillar_bodies.push((tag, body));
            for node in [base, holder] {
                let handle = self.scene.add(node);
                self.registry.bind_pillar_part(tag, handle);
            }
        }

        if self.labels_enabled() {
            self.attach_labels();
        }
    }

    /// Stack `disc_count` fresh plates on the start pillar, largest first
    fn populate(&mut self) {
        let labels = self.labels_enabled();
        let max_radius = self.config.max_plate_radius();
        let pore_radius = self.config.pore_radius();
        let height = self.config.plate.height;
        let start = self.config.start_pillar;
        let colors = &self.config.plate.colors;

        for i in 0..self.disc_count {
            let order = self.disc_count - i;
            let radius = max_radius * self.config.plate.ratio.powi(i as i32);
            let color = colors[i as usize % colors.len()];

            let id = self.model.insert_disc(order, radius, height, pore_radius, color);
            self.model.push(start, id);
            let Some(disc) = self.model.disc(id) else {
                continue;
            };
            let rest = disc.rest_position;
            let label = labels.then(|| plate_label(disc));
            let node = SceneNode::new(
                Shape::Disc {
                    radius,
                    pore_radius,
                    height,
                },
                Material::solid(color),
            )
            .at(rest)
            .with_label(label);
            let handle = self.scene.add(node);
            self.registry.bind_disc(id, handle);
        }
    }

    /// Remove a plate from the registry, scene and model
    fn dispose_disc(&mut self, id: DiscId) {
        if let Some(handle) = self.registry.unbind_disc(id) {
            self.animator.cancel(handle, None);
            self.scene.remove(handle);
        }
        if self.model.remove_disc(id).is_none() {
            log::error!("Disposed disc {} was not in the model", id);
        }
    }

    fn remove_ghost(&mut self) {
        if let Some(ghost) = self.ghost.take() {
            self.scene.remove(ghost);
        }
    }

    fn rebuild_ghost(&mut self, disc: DiscId) {
        self.remove_ghost();
        let Some(d) = self.model.disc(disc) else {
            return;
        };
        let node = SceneNode::new(
            Shape::Disc {
                radius: d.radius,
                pore_radius: d.pore_radius,
                height: d.height,
            },
            Material::translucent(d.color, GHOST_OPACITY),
        )
        .hidden();
        self.ghost = Some(self.scene.add(node));
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        if self.cursor != cursor {
            self.cursor = cursor;
            self.events.push(GameEvent::CursorChanged(cursor));
        }
    }

    /// Start over. `added` changes the plate count, clamped to the palette size.
    pub fn reset(&mut self, added: Option<i32>, now_ms: f64) {
        self.animator.clear();
        if let Some(held) = self.machine.reset() {
            self.dispose_disc(held);
        }
        for tag in PillarTag::ALL {
            while let Some(id) = self.model.pop(tag) {
                self.dispose_disc(id);
            }
        }
        self.remove_ghost();

        if let Some(added) = added {
            let max = self.config.max_discs() as i64;
            let wanted = self.disc_count as i64 + added as i64;
            let count = wanted.clamp(1, max);
            if count != wanted {
                log::warn!("Plate count {} out of range, using {}", wanted, count);
            }
            self.disc_count = count as u32;
        }

        self.populate();
        self.move_count = 0;
        self.start_time_ms = now_ms;
        self.won = false;
        self.autoplay_target = None;
        self.set_cursor(Cursor::Default);
        self.events.push(GameEvent::LevelStarted {
            disc_count: self.disc_count,
        });
        log::info!("Reset: {} plates", self.disc_count);
    }

    /// One more plate
    pub fn next_level(&mut self, now_ms: f64) {
        if self.is_final_level() {
            log::warn!("Already at the final level");
        }
        self.reset(Some(1), now_ms);
    }

    /// Same plate count again
    pub fn replay(&mut self, now_ms: f64) {
        self.reset(None, now_ms);
    }

    pub fn is_final_level(&self) -> bool {
        self.disc_count >= self.config.max_discs()
    }

    /// Goal pillar holds every plate, largest at the bottom
    pub fn check_win(&self) -> bool {
        let expected: Vec<u32> = (1..=self.disc_count).rev().collect();
        self.model.orders(self.config.goal_pillar) == expected
    }

    pub fn pointer_move(&mut self, target: Option<EntityRef>) {
        let commands = self.machine.pointer_move(target, &self.model);
        self.apply(commands);
    }

    pub fn click(&mut self, target: Option<EntityRef>) {
        let commands = self.machine.click(target, &self.model);
        self.apply(commands);
    }

    /// Pointer moved to client coordinates
    pub fn pointer_move_at(&mut self, x: f32, y: f32) {
        let target = self.pick(x, y);
        self.pointer_move(target);
    }

    /// Click at client coordinates
    pub fn click_at(&mut self, x: f32, y: f32) {
        let target = self.pick(x, y);
        self.click(target);
    }

    pub fn pick(&self, x: f32, y: f32) -> Option<EntityRef> {
        pick(&self.scene, &self.registry, Vec2::new(x, y))
    }

    fn apply(&mut self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::Hover { disc, on } => self.start_hover(disc, on),
                Command::Cursor(cursor) => self.set_cursor(cursor),
                Command::Ghost(Some(position)) => {
                    if let Some(ghost) = self.ghost {
                        self.scene.set_position(ghost, position);
                        self.scene.set_visible(ghost, true);
                    }
                }
                Command::Ghost(None) => {
                    if let Some(ghost) = self.ghost {
                        self.scene.set_visible(ghost, false);
                    }
                }
                Command::PickUp { disc, from } => self.start_pick_up(disc, from),
                Command::PutDown { disc, from, to } => self.start_put_down(disc, from, to),
            }
        }
    }

    fn start_hover(&mut self, disc: DiscId, on: bool) {
        let (Some(handle), Some(d)) = (self.registry.disc_visual(disc), self.model.disc(disc)) else {
            return;
        };
        let (rest_y, height) = (d.rest_position.y, d.height);
        self.animator.cancel(handle, Some(SequenceKind::Hover));
        for sequence in transitions::hover(handle, rest_y, height, on, &self.config.timings) {
            self.animator.start(sequence);
        }
    }

    fn start_pick_up(&mut self, disc: DiscId, from: PillarTag) {
        let popped = self.model.pop(from);
        if popped != Some(disc) {
            log::error!("Expected disc {} on top of {}, found {:?}", disc, from, popped);
            if let Some(other) = popped {
                self.model.push(from, other);
            }
            self.machine.reset();
            return;
        }
        if let Some(d) = self.model.disc_mut(disc) {
            d.held = true;
        }

        if let Some(handle) = self.registry.disc_visual(disc) {
            self.animator.cancel(handle, Some(SequenceKind::Hover));
            self.animator.start(transitions::pick_up(
                handle,
                disc,
                self.config.lift_height(),
                &self.config.timings,
            ));
        }
        self.rebuild_ghost(disc);
        log::debug!("Picked disc {} from {}", disc, from);
    }

    fn start_put_down(&mut self, disc: DiscId, from: PillarTag, to: PillarTag) {
        let Some(d) = self.model.disc(disc) else {
            log::error!("Put-down of unknown disc {}", disc);
            return;
        };
        let destination = self.model.pillar(to).placement_position(d.height);
        let Some(handle) = self.registry.disc_visual(disc) else {
            log::error!("Disc {} has no visual", disc);
            return;
        };
        self.animator.cancel(handle, None);
        self.animator.start(transitions::put_down(
            handle,
            disc,
            to,
            destination,
            from == to,
            &self.config.timings,
        ));
    }

    /// Advance animations by `dt` seconds and settle finished moves
    pub fn update(&mut self, dt: f32, now_ms: f64) {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        for event in self.animator.update(dt, &mut self.scene) {
            match event {
                AnimationEvent::PickedUp { disc } => log::debug!("Disc {} lifted", disc),
                AnimationEvent::PutDownFinished { disc, pillar } => {
                    self.complete_placement(disc, pillar, now_ms)
                }
            }
        }
        if self.autoplay {
            self.autoplay_step();
        }
    }

    fn complete_placement(&mut self, disc: DiscId, pillar: PillarTag, now_ms: f64) {
        let InteractionState::Placing { disc: placing, from, to } = self.machine.state() else {
            log::error!("Put-down of disc {} finished with no move pending", disc);
            return;
        };
        if placing != disc || to != pillar || !self.machine.finish_placement(disc) {
            log::error!("Put-down of disc {} onto {} does not match the pending move", disc, pillar);
            return;
        }

        self.model.push(to, disc);
        if let Some(d) = self.model.disc_mut(disc) {
            d.held = false;
        }
        if from != to || self.config.count_same_pillar_moves {
            self.move_count += 1;
        }
        self.events.push(GameEvent::MoveCompleted {
            disc,
            from,
            to,
            moves: self.move_count,
        });
        debug_assert!(self.model.invariants_hold());

        if to == self.config.goal_pillar && self.check_win() {
            self.won = true;
            let result = GameResult {
                disc_count: self.disc_count,
                elapsed_secs: self.elapsed_secs(now_ms),
                moves: self.move_count,
                final_level: self.is_final_level(),
            };
            log::info!("{}", result.message());
            self.events.push(GameEvent::Won(result));
        }
    }

    /// Drive the normal click path with solver moves
    fn autoplay_step(&mut self) {
        if self.won {
            return;
        }
        match self.machine.state() {
            InteractionState::Idle | InteractionState::Hovering(_) => {
                let Some(next) = solver::next_move(&self.model, self.config.goal_pillar) else {
                    return;
                };
                let Some(top) = self.model.top_disc(next.from).map(|d| d.id) else {
                    return;
                };
                self.click(Some(EntityRef::Disc(top)));
                self.autoplay_target = Some(next.to);
            }
            InteractionState::Holding { disc, from } => {
                // Let the lift finish first
                let lifting = self
                    .registry
                    .disc_visual(disc)
                    .is_some_and(|h| self.animator.is_animating(h));
                if !lifting {
                    let to = self.autoplay_target.take().unwrap_or(from);
                    self.click(Some(EntityRef::Pillar(to)));
                }
            }
            InteractionState::Placing { .. } => {}
        }
    }

    /// Toggle demo mode
    pub fn set_autoplay(&mut self, on: bool) {
        if self.autoplay != on {
            log::info!("Demo mode {}", if on { "on" } else { "off" });
        }
        self.autoplay = on;
        self.autoplay_target = None;
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    /// Resize the canvas viewport
    pub fn resize(&mut self, viewport: Viewport) {
        self.scene.resize(viewport);
    }

    /// Client coordinates that pick `target` (a point on a plate's front rim,
    /// or a point on the pillar's hit volume above its top)
    pub fn client_point(&self, target: EntityRef) -> Option<Vec2> {
        let point = match target {
            EntityRef::Disc(id) => {
                let handle = self.registry.disc_visual(id)?;
                let disc = self.model.disc(id)?;
                let center = self.scene.transform(handle)?.position;
                center + Vec3::new(0.0, 0.0, disc.radius * 0.8)
            }
            EntityRef::Pillar(tag) => {
                let pillar = self.model.pillar(tag);
                Vec3::new(
                    pillar.position.x,
                    pillar.foot_y() + pillar.height * 1.25,
                    pillar.position.z,
                )
            }
        };
        self.scene.camera().world_to_client(point, &self.scene.viewport())
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn elapsed_secs(&self, now_ms: f64) -> f64 {
        ((now_ms - self.start_time_ms) / 1000.0).max(0.0)
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        self.scene.snapshot()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn disc_count(&self) -> u32 {
        self.disc_count
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn stacks(&self) -> &StackModel {
        &self.model
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn state(&self) -> InteractionState {
        self.machine.state()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn is_animating(&self) -> bool {
        !self.animator.is_idle()
    }

    pub fn ghost(&self) -> Option<VisualHandle> {
        self.ghost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::solver::solution;

    const FRAME: f32 = 1.0 / 60.0;

    fn session(n: u32) -> Session {
        let config = GameConfig {
            initial_discs: n,
            ..Default::default()
        };
        Session::new(config, Viewport::new(1200.0, 800.0), 0.0)
    }

    /// Run frames until nothing is animating
    fn settle(s: &mut Session, now: &mut f64) {
        for _ in 0..600 {
            if !s.is_animating() {
                return;
            }
            *now += FRAME as f64 * 1000.0;
            s.update(FRAME, *now);
        }
        panic!("animations never finished");
    }

    /// Click the top plate of `from`, then the pillar `to`, and let it land
    fn move_top(s: &mut Session, from: PillarTag, to: PillarTag, now: &mut f64) {
        let top = s.stacks().top_disc(from).expect("plate to move").id;
        s.click(Some(EntityRef::Disc(top)));
        settle(s, now);
        s.click(Some(EntityRef::Pillar(to)));
        settle(s, now);
    }

    #[test]
    fn test_initial_layout() {
        let s = session(5);
        assert_eq!(s.stacks().orders(PillarTag::A), vec![5, 4, 3, 2, 1]);
        assert!(s.stacks().pillar(PillarTag::C).is_empty());
        assert!(s.stacks().invariants_hold());
        // table + body, base, holder and label volume per pillar + plates
        assert_eq!(s.scene().len(), 1 + 12 + 5);
        assert_eq!(s.registry().pillar_parts(PillarTag::B).len(), 4);

        let top = s.stacks().top_disc(PillarTag::A).unwrap();
        let max = s.config().max_plate_radius();
        assert!((top.radius - max * 0.87f32.powi(4)).abs() < 1e-5);
        assert_eq!(s.stacks().pillar(PillarTag::A).position.x, -10.0);
        assert!((s.stacks().pillar(PillarTag::A).position.y - 2.95).abs() < 1e-5);
    }

    #[test]
    fn test_invalid_config_falls_back() {
        let config = GameConfig {
            initial_discs: 0,
            ..Default::default()
        };
        let s = Session::new(config, Viewport::new(800.0, 600.0), 0.0);
        assert_eq!(s.disc_count(), INITIAL_DISCS);
    }

    #[test]
    fn test_single_plate_to_empty_goal() {
        let mut s = session(3);
        let mut now = 0.0;
        // Clear orders 1 and 2 onto B, leaving order 3 alone on A
        move_top(&mut s, PillarTag::A, PillarTag::C, &mut now);
        move_top(&mut s, PillarTag::A, PillarTag::B, &mut now);
        move_top(&mut s, PillarTag::C, PillarTag::B, &mut now);
        assert_eq!(s.stacks().orders(PillarTag::A), vec![3]);
        assert!(s.stacks().pillar(PillarTag::C).is_empty());

        move_top(&mut s, PillarTag::A, PillarTag::C, &mut now);
        assert_eq!(s.stacks().orders(PillarTag::C), vec![3]);
        assert_eq!(s.move_count(), 4);
        assert!(s.stacks().invariants_hold());
        assert!(!s.is_won());
    }

    #[test]
    fn test_larger_on_smaller_rejected() {
        let mut s = session(3);
        let mut now = 0.0;
        move_top(&mut s, PillarTag::A, PillarTag::B, &mut now);
        move_top(&mut s, PillarTag::A, PillarTag::C, &mut now);
        assert_eq!(s.stacks().top_disc(PillarTag::C).unwrap().order, 2);
        let moves = s.move_count();

        let big = s.stacks().top_disc(PillarTag::A).unwrap().id;
        s.click(Some(EntityRef::Disc(big)));
        settle(&mut s, &mut now);
        s.click(Some(EntityRef::Pillar(PillarTag::C)));
        settle(&mut s, &mut now);

        assert_eq!(s.stacks().orders(PillarTag::C), vec![2]);
        assert_eq!(s.move_count(), moves);
        assert!(matches!(s.state(), InteractionState::Holding { disc, .. } if disc == big));

        s.click(Some(EntityRef::Pillar(PillarTag::A)));
        settle(&mut s, &mut now);
        assert_eq!(s.stacks().orders(PillarTag::A), vec![3]);
        assert_eq!(s.stacks().orders(PillarTag::B), vec![1]);
    }

    #[test]
    fn test_canonical_solution_wins_on_last_move() {
        let mut s = session(3);
        let mut now = 0.0;
        let moves = solution(3, PillarTag::A, PillarTag::C);
        assert_eq!(moves.len(), 7);

        for (i, mv) in moves.iter().enumerate() {
            assert!(!s.check_win(), "won early before move {}", i + 1);
            move_top(&mut s, mv.from, mv.to, &mut now);
        }
        assert!(s.check_win());
        assert!(s.is_won());
        assert_eq!(s.move_count(), 7);

        let won: Vec<GameResult> = s
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                GameEvent::Won(result) => Some(result),
                _ => None,
            })
            .collect();
        assert_eq!(won.len(), 1);
        assert_eq!(won[0].moves, 7);
        assert_eq!(won[0].disc_count, 3);
        assert!(!won[0].final_level);
        assert!(won[0].elapsed_secs > 0.0);
    }

    #[test]
    fn test_next_level_adds_plate() {
        let mut s = session(3);
        let mut now = 0.0;
        move_top(&mut s, PillarTag::A, PillarTag::C, &mut now);
        s.next_level(now);
        assert_eq!(s.disc_count(), 4);
        assert_eq!(s.stacks().orders(PillarTag::A), vec![4, 3, 2, 1]);
        assert!(s.stacks().pillar(PillarTag::C).is_empty());
        assert_eq!(s.move_count(), 0);
        assert_eq!(s.registry().disc_count(), 4);
        assert_eq!(s.stacks().discs().len(), 4);
    }

    #[test]
    fn test_put_back_on_same_pillar() {
        let mut s = session(3);
        let mut now = 0.0;
        let before = s.stacks().pillar(PillarTag::A).discs().to_vec();
        let top = s.stacks().top_disc(PillarTag::A).unwrap().id;
        let rest = s.stacks().disc(top).unwrap().rest_position;

        move_top(&mut s, PillarTag::A, PillarTag::A, &mut now);

        assert_eq!(s.stacks().pillar(PillarTag::A).discs(), before.as_slice());
        assert_eq!(s.move_count(), 1);
        let handle = s.registry().disc_visual(top).unwrap();
        let t = s.scene().transform(handle).unwrap();
        assert_eq!(t.position, rest);
        assert_eq!(t.tilt, 0.0);
        assert_eq!(t.scale, 1.0);
    }

    #[test]
    fn test_put_back_not_counted_when_configured() {
        let config = GameConfig {
            initial_discs: 2,
            count_same_pillar_moves: false,
            ..Default::default()
        };
        let mut s = Session::new(config, Viewport::new(1200.0, 800.0), 0.0);
        let mut now = 0.0;
        move_top(&mut s, PillarTag::A, PillarTag::A, &mut now);
        assert_eq!(s.move_count(), 0);
        move_top(&mut s, PillarTag::A, PillarTag::B, &mut now);
        assert_eq!(s.move_count(), 1);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut s = session(4);
        let mut now = 0.0;
        move_top(&mut s, PillarTag::A, PillarTag::C, &mut now);
        let top = s.stacks().top_disc(PillarTag::A).unwrap().id;
        s.click(Some(EntityRef::Disc(top)));

        s.replay(now);
        let nodes = s.scene().len();
        s.replay(now);
        assert_eq!(s.scene().len(), nodes);
        assert_eq!(s.disc_count(), 4);
        assert_eq!(s.move_count(), 0);
        assert!(s.stacks().pillar(PillarTag::C).is_empty());
        assert_eq!(s.stacks().orders(PillarTag::A), vec![4, 3, 2, 1]);
        assert_eq!(s.stacks().held_count(), 0);
        assert_eq!(s.state(), InteractionState::Idle);
        assert!(s.ghost().is_none());
        assert!(!s.is_animating());
    }

    #[test]
    fn test_reset_clamps_plate_count() {
        let mut s = session(8);
        assert!(s.is_final_level());
        s.next_level(0.0);
        assert_eq!(s.disc_count(), 8);
        s.reset(Some(-20), 0.0);
        assert_eq!(s.disc_count(), 1);
    }

    #[test]
    fn test_final_level_result() {
        let mut config = GameConfig {
            initial_discs: 2,
            ..Default::default()
        };
        config.plate.colors.truncate(2);
        let mut s = Session::new(config, Viewport::new(1200.0, 800.0), 0.0);
        let mut now = 0.0;
        for mv in solution(2, PillarTag::A, PillarTag::C) {
            move_top(&mut s, mv.from, mv.to, &mut now);
        }
        let result = s.drain_events().into_iter().find_map(|e| match e {
            GameEvent::Won(result) => Some(result),
            _ => None,
        });
        assert!(result.expect("win reported").final_level);
    }

    #[test]
    fn test_click_ignored_while_placing() {
        let mut s = session(3);
        let mut now = 0.0;
        let top = s.stacks().top_disc(PillarTag::A).unwrap().id;
        s.click(Some(EntityRef::Disc(top)));
        settle(&mut s, &mut now);
        s.click(Some(EntityRef::Pillar(PillarTag::C)));
        assert!(matches!(s.state(), InteractionState::Placing { .. }));

        let next = s.stacks().top_disc(PillarTag::A).unwrap().id;
        s.click(Some(EntityRef::Disc(next)));
        assert!(matches!(s.state(), InteractionState::Placing { .. }));
        assert_eq!(s.stacks().held_count(), 1);

        settle(&mut s, &mut now);
        assert_eq!(s.stacks().orders(PillarTag::C), vec![1]);
        assert_eq!(s.state(), InteractionState::Idle);
    }

    #[test]
    fn test_ghost_follows_preview() {
        let mut s = session(2);
        let top = s.stacks().top_disc(PillarTag::A).unwrap().id;
        s.click(Some(EntityRef::Disc(top)));
        let ghost = s.ghost().expect("ghost built on pick");
        assert!(!s.scene().node(ghost).unwrap().visible);
        assert_eq!(s.scene().node(ghost).unwrap().material.opacity, GHOST_OPACITY);

        s.pointer_move(Some(EntityRef::Pillar(PillarTag::B)));
        let node = s.scene().node(ghost).unwrap();
        assert!(node.visible);
        assert_eq!(
            node.transform.position,
            s.stacks().pillar(PillarTag::B).placement_position(0.5)
        );
        assert_eq!(s.cursor(), Cursor::Pointer);

        s.pointer_move(None);
        assert!(!s.scene().node(ghost).unwrap().visible);
        assert_eq!(s.cursor(), Cursor::Default);

        // Ghost is not pickable scenery
        assert_eq!(s.registry().entity(ghost), None);
    }

    #[test]
    fn test_cursor_events_only_on_change() {
        let mut s = session(3);
        let top = s.stacks().top_disc(PillarTag::A).unwrap().id;
        s.pointer_move(Some(EntityRef::Disc(top)));
        s.pointer_move(Some(EntityRef::Disc(top)));
        s.pointer_move(None);
        s.pointer_move(None);
        let cursors: Vec<GameEvent> = s
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::CursorChanged(_)))
            .collect();
        assert_eq!(
            cursors,
            vec![
                GameEvent::CursorChanged(Cursor::Pointer),
                GameEvent::CursorChanged(Cursor::Default)
            ]
        );
    }

    #[test]
    fn test_hover_lifts_and_returns() {
        let mut s = session(3);
        let mut now = 0.0;
        let top = s.stacks().top_disc(PillarTag::A).unwrap();
        let (id, rest) = (top.id, top.rest_position);
        let handle = s.registry().disc_visual(id).unwrap();

        s.pointer_move(Some(EntityRef::Disc(id)));
        settle(&mut s, &mut now);
        let t = *s.scene().transform(handle).unwrap();
        assert!((t.scale - HOVER_SCALE).abs() < 1e-6);
        assert!((t.position.y - (rest.y + 0.25)).abs() < 1e-5);

        s.pointer_move(None);
        settle(&mut s, &mut now);
        let t = *s.scene().transform(handle).unwrap();
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.position.y, rest.y);
    }

    #[test]
    fn test_pointer_coordinates_drive_a_move() {
        let mut s = session(3);
        let mut now = 0.0;
        let top = s.stacks().top_disc(PillarTag::A).unwrap().id;

        let at = s.client_point(EntityRef::Disc(top)).unwrap();
        assert_eq!(s.pick(at.x, at.y), Some(EntityRef::Disc(top)));
        s.pointer_move_at(at.x, at.y);
        assert_eq!(s.state(), InteractionState::Hovering(top));
        s.click_at(at.x, at.y);
        settle(&mut s, &mut now);

        let at = s.client_point(EntityRef::Pillar(PillarTag::C)).unwrap();
        assert_eq!(s.pick(at.x, at.y), Some(EntityRef::Pillar(PillarTag::C)));
        s.click_at(at.x, at.y);
        settle(&mut s, &mut now);
        assert_eq!(s.stacks().orders(PillarTag::C), vec![1]);
    }

    #[test]
    fn test_autoplay_solves() {
        let mut s = session(4);
        s.set_autoplay(true);
        let mut now = 0.0;
        for _ in 0..20_000 {
            if s.is_won() {
                break;
            }
            now += FRAME as f64 * 1000.0;
            s.update(FRAME, now);
        }
        assert!(s.is_won());
        assert_eq!(s.move_count(), 15);
    }

    #[test]
    fn test_labels_omitted_without_font() {
        let mut s = session(2);
        let top = s.stacks().top_disc(PillarTag::A).unwrap().id;
        let handle = s.registry().disc_visual(top).unwrap();
        assert!(s.scene().node(handle).unwrap().label.is_some());

        s.set_font_available(false);
        assert!(s.scene().nodes().all(|(_, node)| node.label.is_none()));
        assert_eq!(s.registry().pillar_parts(PillarTag::A).len(), 3);

        s.replay(0.0);
        let top = s.stacks().top_disc(PillarTag::A).unwrap().id;
        let handle = s.registry().disc_visual(top).unwrap();
        assert!(s.scene().node(handle).unwrap().label.is_none());
        assert_eq!(s.stacks().orders(PillarTag::A), vec![2, 1]);
    }

    fn labelled_texts(s: &Session) -> Vec<String> {
        let mut texts: Vec<String> = s
            .scene()
            .nodes()
            .filter_map(|(_, node)| node.label.as_ref().map(|l| l.text.clone()))
            .collect();
        texts.sort();
        texts
    }

    #[test]
    fn test_late_font_restores_labels() {
        let mut s = session(3);
        let mut now = 0.0;
        let expected = labelled_texts(&s);
        assert_eq!(expected, vec!["1", "2", "3", "A", "B", "C"]);

        s.set_font_available(false);
        assert!(labelled_texts(&s).is_empty());

        // A plate in the air gets its label back too
        let top = s.stacks().top_disc(PillarTag::A).unwrap().id;
        s.click(Some(EntityRef::Disc(top)));
        settle(&mut s, &mut now);

        s.set_font_available(true);
        assert_eq!(labelled_texts(&s), expected);
        for tag in PillarTag::ALL {
            assert_eq!(s.registry().pillar_parts(tag).len(), 4);
        }

        // Toggling again does not stack extra hit volumes
        s.set_font_available(true);
        assert_eq!(s.scene().len(), 1 + 12 + 3 + 1);

        s.replay(now);
        assert_eq!(labelled_texts(&s), expected);
    }

    #[test]
    fn test_clicking_pillar_label_selects_pillar() {
        let mut s = session(3);
        let pillar = s.stacks().pillar(PillarTag::B).clone();
        let above = pillar.position + Vec3::new(0.0, pillar.height / 2.0 + pillar.radius * 2.0, 0.0);
        let at = s.scene().camera().world_to_client(above, &s.scene().viewport()).unwrap();
        assert_eq!(s.pick(at.x, at.y), Some(EntityRef::Pillar(PillarTag::B)));
    }
}
