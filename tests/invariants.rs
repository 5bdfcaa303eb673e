//! Property tests: random pointer input never breaks the stacks

use hanoi_3d::scene::EntityRef;
use hanoi_3d::sim::{InteractionState, PillarTag, solution};
use hanoi_3d::{GameConfig, Session, Viewport};
use proptest::prelude::*;

const FRAME: f32 = 1.0 / 60.0;

#[derive(Debug, Clone)]
enum Action {
    Move(Option<EntityRef>),
    Click(Option<EntityRef>),
    Frames(u32),
    ClickAt(f32, f32),
}

fn target() -> impl Strategy<Value = Option<EntityRef>> {
    prop_oneof![
        Just(None),
        prop::sample::select(PillarTag::ALL.to_vec()).prop_map(|t| Some(EntityRef::Pillar(t))),
        // Ids past the live range exercise unknown-disc handling
        (1u32..8).prop_map(|id| Some(EntityRef::Disc(id))),
    ]
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        1 => target().prop_map(Action::Move),
        3 => target().prop_map(Action::Click),
        2 => (1u32..90).prop_map(Action::Frames),
        1 => (0.0f32..1200.0, 0.0f32..800.0).prop_map(|(x, y)| Action::ClickAt(x, y)),
    ]
}

fn session(n: u32) -> Session {
    let config = GameConfig {
        initial_discs: n,
        ..Default::default()
    };
    Session::new(config, Viewport::new(1200.0, 800.0), 0.0)
}

fn check(s: &Session) {
    let stacks = s.stacks();
    assert!(stacks.invariants_hold());
    for tag in PillarTag::ALL {
        assert!(stacks.is_descending(tag));
        assert!(stacks.pickable_count(tag) <= 1);
    }
    let stacked: usize = PillarTag::ALL.iter().map(|&t| stacks.pillar(t).len()).sum();
    let held = stacks.held_count();
    assert!(held <= 1);
    assert_eq!(stacked + held, s.disc_count() as usize);
    match s.state() {
        InteractionState::Holding { disc, .. } | InteractionState::Placing { disc, .. } => {
            assert_eq!(held, 1);
            assert!(stacks.disc(disc).is_some_and(|d| d.held));
        }
        _ => assert_eq!(held, 0),
    }
}

proptest! {
    #[test]
    fn random_input_keeps_invariants(
        n in 1u32..6,
        actions in prop::collection::vec(action(), 1..120),
    ) {
        let mut s = session(n);
        let mut now = 0.0f64;
        check(&s);
        for action in actions {
            match action {
                Action::Move(t) => s.pointer_move(t),
                Action::Click(t) => s.click(t),
                Action::ClickAt(x, y) => s.click_at(x, y),
                Action::Frames(frames) => {
                    for _ in 0..frames {
                        now += FRAME as f64 * 1000.0;
                        s.update(FRAME, now);
                    }
                }
            }
            check(&s);
        }
    }

    #[test]
    fn reset_twice_equals_once(n in 1u32..8, clicks in prop::collection::vec(target(), 0..10)) {
        let mut s = session(n);
        for t in clicks {
            s.click(t);
        }
        s.replay(0.0);
        let once: Vec<Vec<u32>> = PillarTag::ALL.iter().map(|&t| s.stacks().orders(t)).collect();
        s.replay(0.0);
        let twice: Vec<Vec<u32>> = PillarTag::ALL.iter().map(|&t| s.stacks().orders(t)).collect();
        prop_assert_eq!(once, twice);
        prop_assert_eq!(s.disc_count(), n);
        prop_assert_eq!(s.move_count(), 0);
        prop_assert!(s.stacks().pillar(PillarTag::C).is_empty());
    }
}

#[test]
fn minimal_solution_wins_only_at_the_end() {
    for n in 1..=5u32 {
        let mut s = session(n);
        let mut now = 0.0f64;
        let moves = solution(n, PillarTag::A, PillarTag::C);
        assert_eq!(moves.len(), (1usize << n) - 1);

        for mv in &moves {
            assert!(!s.check_win());
            let top = s.stacks().top_disc(mv.from).map(|d| d.id);
            s.click(top.map(EntityRef::Disc));
            s.click(Some(EntityRef::Pillar(mv.to)));
            while s.is_animating() {
                now += FRAME as f64 * 1000.0;
                s.update(FRAME, now);
            }
            check(&s);
        }
        assert!(s.check_win());
        assert_eq!(s.move_count() as usize, moves.len());
        assert_eq!(
            s.stacks().orders(PillarTag::C),
            (1..=n).rev().collect::<Vec<_>>()
        );
    }
}
