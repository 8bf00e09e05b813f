//! Heuristic repair of diffs that match no move shape.
//!
//! Planning is pure: [`plan_repair`] inspects the diff and boards and returns
//! the reappeared squares it considers false positives. [`RepairPlan::apply`]
//! then marks those squares unoccupied on the current board, after which the
//! caller recomputes the diff.

use std::collections::HashSet;

use crate::board::{BoardSnapshot, FigureColor, FigureType, Position};
use crate::constants::CASTLE_LANDING_ROWS;
use crate::diff::{BoardDiff, Disappeared};
use crate::patterns::{can_reach, pawn_pattern};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStrategy {
    /// Exactly one candidate landing square is reachable by the moved piece.
    SingleReachable,
    /// King and rook vanished: only castling landing squares are kept.
    Castle,
    /// Two opposing pawns vanished: only their capture squares are kept.
    EnPassant,
    /// Only squares still occupied in the following snapshot are kept.
    NextSnapshot,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RepairPlan {
    Resolved {
        strategy: RepairStrategy,
        discard: Vec<Position>,
    },
    Unresolved,
}

impl RepairPlan {
    pub fn apply(&self, board: &mut BoardSnapshot) {
        if let RepairPlan::Resolved { discard, .. } = self {
            for &pos in discard {
                board.set_occupied(pos, false);
            }
        }
    }
}

/// What a pair of vanished pieces looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairShape {
    Castle(FigureColor),
    EnPassant,
}

/// Match two disappeared pieces against the castle and en passant shapes.
/// The two shapes are disjoint, so at most one matches.
pub fn classify_pair(disappeared: &[Disappeared]) -> Option<PairShape> {
    let [a, b] = disappeared else {
        return None;
    };
    let (fa, fb) = (a.figure, b.figure);

    let kinds = [fa.kind, fb.kind];
    let is_king_and_rook = kinds.contains(&FigureType::King)
        && kinds.contains(&FigureType::Rook)
        && fa.color == fb.color
        && fa.color != FigureColor::Empty;
    if is_king_and_rook {
        return Some(PairShape::Castle(fa.color));
    }

    let is_opposing_pawns = fa.kind == FigureType::Pawn
        && fb.kind == FigureType::Pawn
        && fa.color == fb.color.opponent()
        && fa.color != FigureColor::Empty;
    if is_opposing_pawns {
        return Some(PairShape::EnPassant);
    }

    None
}

/// Work out which reappeared squares to drop so the diff becomes a valid
/// move shape. `board` is the current snapshot, `next` the one after it.
pub fn plan_repair(
    diff: &BoardDiff,
    board: &BoardSnapshot,
    next: Option<&BoardSnapshot>,
) -> RepairPlan {
    let heuristic = match (diff.disappeared.len(), diff.reappeared.len()) {
        (1, r) if r > 1 => repair_single_mover(diff, board),
        (2, r) if r > 2 => repair_pair(diff),
        _ => None,
    };

    if let Some(plan) = heuristic {
        return plan;
    }

    match next {
        Some(next) => confirm_with_next(diff, next),
        None => RepairPlan::Unresolved,
    }
}

fn discard_outside(valid: &[Position], candidates: &[Position]) -> Vec<Position> {
    let valid: HashSet<&Position> = valid.iter().collect();
    candidates
        .iter()
        .filter(|pos| !valid.contains(pos))
        .copied()
        .collect()
}

fn repair_single_mover(diff: &BoardDiff, board: &BoardSnapshot) -> Option<RepairPlan> {
    let mover = diff.disappeared.first()?;
    let reachable: Vec<Position> = diff
        .reappeared
        .iter()
        .filter(|&&to| can_reach(mover.figure, mover.position, to, board))
        .copied()
        .collect();

    if reachable.len() != 1 {
        return None;
    }

    Some(RepairPlan::Resolved {
        strategy: RepairStrategy::SingleReachable,
        discard: discard_outside(&reachable, &diff.reappeared),
    })
}

fn repair_pair(diff: &BoardDiff) -> Option<RepairPlan> {
    let (strategy, valid) = match classify_pair(&diff.disappeared)? {
        PairShape::Castle(color) => {
            let back_rank = if color == FigureColor::White { 0 } else { 7 };
            let valid = CASTLE_LANDING_ROWS
                .iter()
                .filter_map(|&row| Position::new(row, back_rank).ok())
                .collect::<Vec<_>>();
            (RepairStrategy::Castle, valid)
        }
        PairShape::EnPassant => {
            let valid = diff
                .disappeared
                .iter()
                .flat_map(|d| pawn_pattern(d.figure.color, d.position).captures)
                .collect::<Vec<_>>();
            (RepairStrategy::EnPassant, valid)
        }
    };

    Some(RepairPlan::Resolved {
        strategy,
        discard: discard_outside(&valid, &diff.reappeared),
    })
}

fn confirm_with_next(diff: &BoardDiff, next: &BoardSnapshot) -> RepairPlan {
    let discard = diff
        .reappeared
        .iter()
        .filter(|&&pos| !next.is_occupied(pos))
        .copied()
        .collect();
    RepairPlan::Resolved {
        strategy: RepairStrategy::NextSnapshot,
        discard,
    }
}
