//! Movement patterns: which squares each piece type can reach from a
//! position, ignoring everything else on the board. Obstruction is a
//! separate test ([`is_obstructed`]).

use crate::board::{BoardSnapshot, Figure, FigureColor, FigureType, Position, BOARD_SIZE};

const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i32, i32); 4] = [(1, 1), (-1, -1), (1, -1), (-1, 1)];

pub const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

pub const KING_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Squares a pawn can step to, split by whether the step captures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PawnPattern {
    pub moves: Vec<Position>,
    pub captures: Vec<Position>,
}

pub fn is_within_bounds(row: i32, col: i32) -> bool {
    (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col)
}

/// Rank direction a pawn of `color` advances in.
fn pawn_direction(color: FigureColor) -> Option<i32> {
    match color {
        FigureColor::White => Some(1),
        FigureColor::Black => Some(-1),
        FigureColor::Empty => None,
    }
}

fn offsets_from(from: Position, offsets: &[(i32, i32)]) -> Vec<Position> {
    offsets
        .iter()
        .filter_map(|&(dr, dc)| from.offset(dr, dc))
        .collect()
}

fn rays_from(from: Position, directions: &[(i32, i32)]) -> Vec<Position> {
    let mut squares = Vec::new();
    for step in 1..BOARD_SIZE as i32 {
        for &(dr, dc) in directions {
            if let Some(pos) = from.offset(dr * step, dc * step) {
                squares.push(pos);
            }
        }
    }
    squares
}

pub fn pawn_pattern(color: FigureColor, from: Position) -> PawnPattern {
    let Some(dir) = pawn_direction(color) else {
        return PawnPattern::default();
    };
    PawnPattern {
        moves: offsets_from(from, &[(0, dir)]),
        captures: offsets_from(from, &[(1, dir), (-1, dir)]),
    }
}

/// The two-square advance, only available from the pawn's starting rank.
pub fn pawn_double_step(color: FigureColor, from: Position) -> Option<Position> {
    let start_col = match color {
        FigureColor::White => 1,
        FigureColor::Black => 6,
        FigureColor::Empty => return None,
    };
    let dir = pawn_direction(color)?;
    if from.col() != start_col {
        return None;
    }
    from.offset(0, 2 * dir)
}

pub fn rook_pattern(from: Position) -> Vec<Position> {
    rays_from(from, &ORTHOGONAL)
}

pub fn bishop_pattern(from: Position) -> Vec<Position> {
    rays_from(from, &DIAGONAL)
}

pub fn queen_pattern(from: Position) -> Vec<Position> {
    let mut squares = rook_pattern(from);
    squares.extend(bishop_pattern(from));
    squares
}

pub fn knight_pattern(from: Position) -> Vec<Position> {
    offsets_from(from, &KNIGHT_OFFSETS)
}

pub fn king_pattern(from: Position) -> Vec<Position> {
    offsets_from(from, &KING_OFFSETS)
}

/// Squares `figure` standing on `from` attacks. Pawns attack diagonally only.
pub fn attack_pattern(figure: Figure, from: Position) -> Vec<Position> {
    match figure.kind {
        FigureType::Pawn => pawn_pattern(figure.color, from).captures,
        FigureType::Rook => rook_pattern(from),
        FigureType::Knight => knight_pattern(from),
        FigureType::Bishop => bishop_pattern(from),
        FigureType::Queen => queen_pattern(from),
        FigureType::King => king_pattern(from),
        FigureType::Empty => Vec::new(),
    }
}

/// True when an occupied square lies strictly between `from` and `to`.
/// Only meaningful for squares sharing a rank, file or diagonal.
pub fn is_obstructed(from: Position, to: Position, board: &BoardSnapshot) -> bool {
    let d_row = (to.row() as i32 - from.row() as i32).signum();
    let d_col = (to.col() as i32 - from.col() as i32).signum();

    let mut current = from;
    while let Some(next) = current.offset(d_row, d_col) {
        if next == to {
            return false;
        }
        if board.is_occupied(next) {
            return true;
        }
        current = next;
    }
    false
}

/// Whether `figure` could have travelled from `from` to `to` on `board`,
/// either by a quiet move or by a capture.
pub fn can_reach(figure: Figure, from: Position, to: Position, board: &BoardSnapshot) -> bool {
    if figure.kind == FigureType::Pawn {
        let pattern = pawn_pattern(figure.color, from);
        if pattern.moves.contains(&to) || pattern.captures.contains(&to) {
            return true;
        }
        return pawn_double_step(figure.color, from) == Some(to)
            && !is_obstructed(from, to, board);
    }

    if !attack_pattern(figure, from).contains(&to) {
        return false;
    }
    !figure.kind.is_sliding() || !is_obstructed(from, to, board)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(name: &str) -> Position {
        name.parse().unwrap()
    }

    fn figure(kind: FigureType, color: FigureColor) -> Figure {
        Figure::new(kind, color)
    }

    #[test]
    fn test_bounds_accept_exactly_64() {
        let mut accepted = 0;
        for row in -3..11 {
            for col in -3..11 {
                if is_within_bounds(row, col) {
                    assert!((0..8).contains(&row) && (0..8).contains(&col));
                    accepted += 1;
                }
            }
        }
        assert_eq!(accepted, 64);
    }

    #[test]
    fn test_pawn_pattern_flips_with_color() {
        let white = pawn_pattern(FigureColor::White, pos("e4"));
        assert_eq!(white.moves, vec![pos("e5")]);
        assert_eq!(white.captures, vec![pos("f5"), pos("d5")]);

        let black = pawn_pattern(FigureColor::Black, pos("e4"));
        assert_eq!(black.moves, vec![pos("e3")]);
        assert_eq!(black.captures, vec![pos("f3"), pos("d3")]);

        // Mirror: a white pawn on (r, c) and a black pawn on (r, 7 - c)
        for from in Position::all() {
            let mirrored = Position::new(from.row(), 7 - from.col()).unwrap();
            let w = pawn_pattern(FigureColor::White, from);
            let b = pawn_pattern(FigureColor::Black, mirrored);
            assert_eq!(w.moves.len(), b.moves.len());
            assert_eq!(w.captures.len(), b.captures.len());
        }
    }

    #[test]
    fn test_pawn_pattern_clipped_at_edges() {
        let edge = pawn_pattern(FigureColor::White, pos("a2"));
        assert_eq!(edge.captures, vec![pos("b3")]);

        let last_rank = pawn_pattern(FigureColor::White, pos("c8"));
        assert!(last_rank.moves.is_empty());
        assert!(last_rank.captures.is_empty());

        assert_eq!(pawn_pattern(FigureColor::Empty, pos("c4")), PawnPattern::default());
    }

    #[test]
    fn test_double_step_only_from_start_rank() {
        assert_eq!(pawn_double_step(FigureColor::White, pos("e2")), Some(pos("e4")));
        assert_eq!(pawn_double_step(FigureColor::Black, pos("d7")), Some(pos("d5")));
        assert_eq!(pawn_double_step(FigureColor::White, pos("e3")), None);
        assert_eq!(pawn_double_step(FigureColor::Black, pos("d2")), None);
    }

    #[test]
    fn test_sliding_patterns_exclude_origin() {
        for from in Position::all() {
            for pattern in [rook_pattern(from), bishop_pattern(from), queen_pattern(from)] {
                assert!(!pattern.contains(&from));
            }
            assert_eq!(rook_pattern(from).len(), 14);
            assert_eq!(
                queen_pattern(from).len(),
                rook_pattern(from).len() + bishop_pattern(from).len()
            );
        }
        assert_eq!(bishop_pattern(pos("a1")).len(), 7);
        assert_eq!(bishop_pattern(pos("d4")).len(), 13);
    }

    #[test]
    fn test_knight_and_king_filtered_to_board() {
        assert_eq!(knight_pattern(pos("a1")).len(), 2);
        assert_eq!(knight_pattern(pos("d4")).len(), 8);
        assert_eq!(king_pattern(pos("h8")).len(), 3);
        assert_eq!(king_pattern(pos("e4")).len(), 8);
    }

    #[test]
    fn test_non_pawn_patterns_color_independent() {
        for kind in [
            FigureType::Rook,
            FigureType::Knight,
            FigureType::Bishop,
            FigureType::Queen,
            FigureType::King,
        ] {
            let from = pos("c3");
            assert_eq!(
                attack_pattern(figure(kind, FigureColor::White), from),
                attack_pattern(figure(kind, FigureColor::Black), from)
            );
        }
    }

    #[test]
    fn test_obstruction() {
        let mut board = BoardSnapshot::empty();
        assert!(!is_obstructed(pos("a1"), pos("a8"), &board));

        board.set_occupied(pos("a4"), true);
        assert!(is_obstructed(pos("a1"), pos("a8"), &board));
        // Destination itself never obstructs
        assert!(!is_obstructed(pos("a1"), pos("a4"), &board));

        board.set_occupied(pos("c3"), true);
        assert!(is_obstructed(pos("a1"), pos("h8"), &board));
        assert!(!is_obstructed(pos("a1"), pos("b2"), &board));
    }

    #[test]
    fn test_can_reach_respects_obstruction_for_sliders_only() {
        let mut board = BoardSnapshot::empty();
        board.set_occupied(pos("d2"), true);

        let rook = figure(FigureType::Rook, FigureColor::White);
        assert!(!can_reach(rook, pos("d1"), pos("d5"), &board));
        assert!(can_reach(rook, pos("d1"), pos("h1"), &board));

        let knight = figure(FigureType::Knight, FigureColor::White);
        assert!(can_reach(knight, pos("b1"), pos("c3"), &board));
        assert!(!can_reach(knight, pos("b1"), pos("b3"), &board));

        let pawn = figure(FigureType::Pawn, FigureColor::White);
        assert!(can_reach(pawn, pos("e2"), pos("e4"), &board));
        assert!(can_reach(pawn, pos("e2"), pos("d3"), &board));
        assert!(!can_reach(pawn, pos("e2"), pos("e5"), &board));
        board.set_occupied(pos("e3"), true);
        assert!(!can_reach(pawn, pos("e2"), pos("e4"), &board));

        assert!(!can_reach(Figure::EMPTY, pos("e2"), pos("e3"), &board));
    }
}
