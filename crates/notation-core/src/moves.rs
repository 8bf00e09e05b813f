//! Move classification. Given a diff with a valid shape, work out what
//! happened, write the moved identities onto the current board and build the
//! [`MoveRecord`] for the transcript.

use tracing::{debug, warn};

use crate::board::{BoardSnapshot, Figure, FigureColor, FigureType, Position};
use crate::check::is_check;
use crate::classifier::PieceClassifier;
use crate::constants::PIECE_INTENSITY_THRESHOLD;
use crate::diff::{BoardDiff, Disappeared};
use crate::error::ReconstructionError;
use crate::notation::MoveRecord;

/// Boards and collaborators a single ply is classified against.
pub struct Ply<'a, C> {
    /// Index of the current snapshot in the game sequence.
    pub snapshot: usize,
    pub before: &'a BoardSnapshot,
    pub board: &'a mut BoardSnapshot,
    pub next: Option<&'a BoardSnapshot>,
    pub classifier: &'a C,
}

/// Dispatch on the (disappeared, reappeared) shape of `diff`.
pub async fn classify_move<C: PieceClassifier>(
    diff: &BoardDiff,
    ply: Ply<'_, C>,
) -> Result<MoveRecord, ReconstructionError> {
    match (diff.disappeared.as_slice(), diff.reappeared.as_slice()) {
        ([mover], [to]) => land_piece(*mover, *to, false, ply).await,
        ([mover], []) => {
            let to = find_capture_position(ply.before, ply.board, mover.position).ok_or(
                ReconstructionError::CaptureNotFound {
                    snapshot: ply.snapshot,
                },
            )?;
            land_piece(*mover, to, true, ply).await
        }
        ([a, b], [to]) => resolve_en_passant(*a, *b, *to, ply.board),
        ([a, b], [r0, r1]) => resolve_castle(&[*a, *b], [*r0, *r1], ply.board),
        _ => Err(ReconstructionError::SelfRepairFailed {
            snapshot: ply.snapshot,
        }),
    }
}

/// A pawn landing on either back rank promotes.
pub fn is_promotion(figure: Figure, to: Position) -> bool {
    figure.kind == FigureType::Pawn && matches!(to.col(), 0 | 7)
}

/// First square (row-major, skipping the mover's origin) whose intensity
/// changed enough to mean a different piece now stands there.
pub fn find_capture_position(
    before: &BoardSnapshot,
    after: &BoardSnapshot,
    skip: Position,
) -> Option<Position> {
    Position::all().filter(|&pos| pos != skip).find(|&pos| {
        let delta = before.square(pos).intensity() - after.square(pos).intensity();
        delta.abs() > PIECE_INTENSITY_THRESHOLD
    })
}

/// Check is only meaningful once the mover's colour is known.
fn gives_check(board: &BoardSnapshot, color: FigureColor) -> Result<bool, ReconstructionError> {
    if color == FigureColor::Empty {
        warn!("Moved piece has no known colour, skipping check detection");
        return Ok(false);
    }
    is_check(board, color)
}

async fn land_piece<C: PieceClassifier>(
    mover: Disappeared,
    to: Position,
    capture: bool,
    ply: Ply<'_, C>,
) -> Result<MoveRecord, ReconstructionError> {
    let promotion = if is_promotion(mover.figure, to) {
        Some(resolve_promotion(to, ply.board, ply.next, ply.classifier).await)
    } else {
        None
    };

    let landed = Figure::new(promotion.unwrap_or(mover.figure.kind), mover.figure.color);
    ply.board.place(to, landed);

    debug!(
        snapshot = ply.snapshot,
        from = %mover.position,
        to = %to,
        capture,
        "Piece moved"
    );

    Ok(MoveRecord::Standard {
        figure: mover.figure,
        from: mover.position,
        to,
        capture,
        check: gives_check(ply.board, mover.figure.color)?,
        promotion,
    })
}

/// Pick the piece a pawn promoted to. The following snapshot is trusted when
/// it names a promotable piece on the landing square; otherwise the
/// classifier looks at the landing square's crop. Anything a pawn cannot
/// become is read as a bishop.
pub async fn resolve_promotion<C: PieceClassifier>(
    to: Position,
    board: &BoardSnapshot,
    next: Option<&BoardSnapshot>,
    classifier: &C,
) -> FigureType {
    let observed = next
        .and_then(|next| next.occupant(to))
        .map(|figure| figure.kind)
        .filter(|kind| kind.is_promotion_target());
    if let Some(kind) = observed {
        return kind;
    }

    let predicted = match board.square(to).region() {
        Some(region) => classifier.predict_label(region).await.kind,
        None => FigureType::Empty,
    };
    if predicted.is_promotion_target() {
        predicted
    } else {
        debug!(square = %to, ?predicted, "Promotion guess unusable, defaulting to bishop");
        FigureType::Bishop
    }
}

/// The captured pawn is the one on the destination's file; the capturing
/// colour is the opposite of the victim's.
fn resolve_en_passant(
    a: Disappeared,
    b: Disappeared,
    to: Position,
    board: &mut BoardSnapshot,
) -> Result<MoveRecord, ReconstructionError> {
    let (captured, mover) = if a.position.row() == to.row() {
        (a, b)
    } else {
        (b, a)
    };
    let color = match captured.figure.color {
        FigureColor::Empty => mover.figure.color,
        victim => victim.opponent(),
    };

    board.place(to, Figure::new(FigureType::Pawn, color));

    Ok(MoveRecord::EnPassant {
        color,
        from_file: mover.position.file_letter(),
        to,
        check: gives_check(board, color)?,
    })
}

/// The king lands on whichever reappeared square is closer to the corner the
/// rook came from; the rook takes the other one.
fn resolve_castle(
    disappeared: &[Disappeared; 2],
    reappeared: [Position; 2],
    board: &mut BoardSnapshot,
) -> Result<MoveRecord, ReconstructionError> {
    let color = disappeared
        .iter()
        .map(|d| d.figure.color)
        .find(|&c| c != FigureColor::Empty)
        .unwrap_or(if reappeared[0].col() == 0 {
            FigureColor::White
        } else {
            FigureColor::Black
        });

    let rook_origin = disappeared
        .iter()
        .find(|d| d.figure.kind == FigureType::Rook)
        .unwrap_or_else(|| {
            if (2 * disappeared[0].position.row() as i32 - 7).abs()
                >= (2 * disappeared[1].position.row() as i32 - 7).abs()
            {
                &disappeared[0]
            } else {
                &disappeared[1]
            }
        });
    let corner: i32 = if rook_origin.position.row() < 4 { 0 } else { 7 };
    let distance = |pos: Position| (pos.row() as i32 - corner).abs();

    let [r0, r1] = reappeared;
    let (king_to, rook_to) = if distance(r0) <= distance(r1) {
        (r0, r1)
    } else {
        (r1, r0)
    };

    board.place(king_to, Figure::new(FigureType::King, color));
    board.place(rook_to, Figure::new(FigureType::Rook, color));

    Ok(MoveRecord::Castle {
        color,
        king_side: king_to.row() > 4,
        check: gives_check(board, color)?,
    })
}
