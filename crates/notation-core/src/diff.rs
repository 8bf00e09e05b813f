//! Occupancy differences between two consecutive snapshots and the move
//! shapes they may describe.

use crate::board::{BoardSnapshot, Figure, Position};

/// A piece that was on `position` before and is gone now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disappeared {
    pub figure: Figure,
    pub position: Position,
}

/// The kind of move a valid diff can describe, keyed by
/// (disappeared, reappeared) counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveShape {
    /// (1, 1): a piece left one square and landed on an empty one.
    Standard,
    /// (1, 0): the attacker's origin emptied, the victim's square stays occupied.
    ClassicCapture,
    /// (2, 1): both pawns vanish, the capturer lands behind the victim.
    EnPassant,
    /// (2, 2): king and rook both move.
    Castle,
}

impl MoveShape {
    pub fn from_counts(disappeared: usize, reappeared: usize) -> Option<Self> {
        match (disappeared, reappeared) {
            (1, 1) => Some(MoveShape::Standard),
            (1, 0) => Some(MoveShape::ClassicCapture),
            (2, 1) => Some(MoveShape::EnPassant),
            (2, 2) => Some(MoveShape::Castle),
            _ => None,
        }
    }
}

/// Whether the counts match any known move shape.
pub fn count_check(disappeared: usize, reappeared: usize) -> bool {
    MoveShape::from_counts(disappeared, reappeared).is_some()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardDiff {
    pub disappeared: Vec<Disappeared>,
    pub reappeared: Vec<Position>,
}

impl BoardDiff {
    /// Squares that lost (with the identity they held) or gained occupancy,
    /// in row-major order. Does not touch either board.
    pub fn between(before: &BoardSnapshot, after: &BoardSnapshot) -> Self {
        let mut diff = BoardDiff::default();
        for (prev, curr) in before.squares().zip(after.squares()) {
            match (prev.is_occupied(), curr.is_occupied()) {
                (true, false) => diff.disappeared.push(Disappeared {
                    figure: prev.figure(),
                    position: prev.position(),
                }),
                (false, true) => diff.reappeared.push(curr.position()),
                _ => {}
            }
        }
        diff
    }

    pub fn shape(&self) -> Option<MoveShape> {
        MoveShape::from_counts(self.disappeared.len(), self.reappeared.len())
    }

    pub fn is_valid(&self) -> bool {
        self.shape().is_some()
    }
}

/// Copy identities of pieces that stayed put from `before` onto `after`, so a
/// noisy re-classification of an unmoved piece does not stick.
pub fn carry_forward_identities(before: &BoardSnapshot, after: &mut BoardSnapshot) {
    for pos in Position::all() {
        if before.is_occupied(pos) && after.is_occupied(pos) {
            after.set_figure(pos, before.square(pos).figure());
        }
    }
}

/// Compute the diff and, unless `notation_only`, carry unmoved identities
/// forward onto `after`.
pub fn diff_snapshots(
    before: &BoardSnapshot,
    after: &mut BoardSnapshot,
    notation_only: bool,
) -> BoardDiff {
    if !notation_only {
        carry_forward_identities(before, after);
    }
    BoardDiff::between(before, after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{FigureColor, FigureType};

    fn pos(name: &str) -> Position {
        name.parse().unwrap()
    }

    #[test]
    fn test_count_check_valid_shapes_only() {
        for d in 0..5 {
            for r in 0..5 {
                let expected = matches!((d, r), (1, 1) | (1, 0) | (2, 1) | (2, 2));
                assert_eq!(count_check(d, r), expected, "({d}, {r})");
            }
        }
        assert!(!count_check(0, 0));
        assert!(!count_check(1, 2));
        assert!(!count_check(3, 1));
    }

    #[test]
    fn test_diff_inverts_standard_move() {
        let knight = Figure::new(FigureType::Knight, FigureColor::White);
        let mut before = BoardSnapshot::empty();
        before.place(pos("g1"), knight);
        before.place(pos("e1"), Figure::new(FigureType::King, FigureColor::White));

        let mut after = before.clone();
        after.clear_square(pos("g1"));
        after.set_occupied(pos("f3"), true);

        let diff = BoardDiff::between(&before, &after);
        assert_eq!(
            diff.disappeared,
            vec![Disappeared {
                figure: knight,
                position: pos("g1")
            }]
        );
        assert_eq!(diff.reappeared, vec![pos("f3")]);
        assert_eq!(diff.shape(), Some(MoveShape::Standard));
    }

    #[test]
    fn test_carry_forward_only_when_not_notation_only() {
        let queen = Figure::new(FigureType::Queen, FigureColor::Black);
        let mut before = BoardSnapshot::empty();
        before.place(pos("d8"), queen);

        let mut after = BoardSnapshot::empty();
        after.place(pos("d8"), Figure::new(FigureType::Bishop, FigureColor::Black));

        let mut untouched = after.clone();
        let diff = diff_snapshots(&before, &mut untouched, true);
        assert_eq!(diff, BoardDiff::default());
        assert_eq!(untouched.square(pos("d8")).figure().kind, FigureType::Bishop);

        diff_snapshots(&before, &mut after, false);
        assert_eq!(after.square(pos("d8")).figure(), queen);
    }
}
