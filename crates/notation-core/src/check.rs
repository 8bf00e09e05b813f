//! Check detection for notation purposes.

use crate::board::{BoardSnapshot, Figure, FigureColor, FigureType, Position};
use crate::error::ReconstructionError;
use crate::patterns::{attack_pattern, knight_pattern, KING_OFFSETS};

/// Enemy pieces visible from the king along the 8 queen rays, keeping only the
/// first occupied square of each ray.
fn pieces_in_line_of_sight(
    board: &BoardSnapshot,
    king: Position,
    king_color: FigureColor,
) -> Vec<(Figure, Position)> {
    let mut visible = Vec::new();
    for &(dr, dc) in &KING_OFFSETS {
        let mut current = king;
        while let Some(next) = current.offset(dr, dc) {
            if let Some(figure) = board.occupant(next) {
                if figure.color != king_color && !figure.is_empty() {
                    visible.push((figure, next));
                }
                break;
            }
            current = next;
        }
    }
    visible
}

fn attacked_by_knight(board: &BoardSnapshot, king: Position, king_color: FigureColor) -> bool {
    knight_pattern(king).into_iter().any(|pos| {
        board.occupant(pos).is_some_and(|figure| {
            figure.kind == FigureType::Knight && figure.color == king_color.opponent()
        })
    })
}

/// Whether the side that just moved (`moved_color`) gives check.
pub fn is_check(board: &BoardSnapshot, moved_color: FigureColor) -> Result<bool, ReconstructionError> {
    let king_color = moved_color.opponent();
    let Some(king) = board.find_king(king_color) else {
        tracing::error!(color = ?king_color, "King not found on board\n{board}");
        return Err(ReconstructionError::KingNotFound { color: king_color });
    };

    let by_line = pieces_in_line_of_sight(board, king, king_color)
        .into_iter()
        .any(|(figure, from)| attack_pattern(figure, from).contains(&king));

    Ok(by_line || attacked_by_knight(board, king, king_color))
}
