//! Tower of Hanoi solver
//!
//! Drives demo mode and the headless native run.

use serde::{Deserialize, Serialize};

use super::stack::{PillarTag, StackModel};

/// A single plate transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub from: PillarTag,
    pub to: PillarTag,
}

/// Canonical minimal solution moving `n` plates from `from` to `to` (2^n - 1 moves)
pub fn solution(n: u32, from: PillarTag, to: PillarTag) -> Vec<Move> {
    let mut moves = Vec::with_capacity((1usize << n.min(20)) - 1);
    solve_into(n, from, to, &mut moves);
    moves
}

fn solve_into(n: u32, from: PillarTag, to: PillarTag, out: &mut Vec<Move>) {
    if n == 0 {
        return;
    }
    let via = from.third(to);
    solve_into(n - 1, from, via, out);
    out.push(Move { from, to });
    solve_into(n - 1, via, to, out);
}

/// Optimal next move from any legal position toward `goal`.
///
/// Walks from the largest plate down: each plate not on its required pillar
/// forces every smaller plate onto the remaining pillar. The smallest plate
/// that must move is the one to move now. Plates in transit are ignored.
pub fn next_move(model: &StackModel, goal: PillarTag) -> Option<Move> {
    // (order, pillar), largest first
    let mut placed: Vec<(u32, PillarTag)> = model
        .discs()
        .iter()
        .filter_map(|d| d.pillar().map(|p| (d.order, p)))
        .collect();
    placed.sort_by(|a, b| b.0.cmp(&a.0));

    let mut target = goal;
    let mut result = None;
    for (_, pillar) in placed {
        if pillar == target {
            continue;
        }
        result = Some(Move {
            from: pillar,
            to: target,
        });
        target = pillar.third(target);
    }
    result
}
