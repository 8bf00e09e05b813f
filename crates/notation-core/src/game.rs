//! Game orchestration: owns the snapshot sequence and folds it into a
//! transcript, one ply at a time.

use std::fmt::Display;
use std::future::Future;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, error, info, warn};

use crate::board::BoardSnapshot;
use crate::classifier::PieceClassifier;
use crate::constants::DEFAULT_TOP_K;
use crate::diff::{diff_snapshots, BoardDiff};
use crate::error::ReconstructionError;
use crate::moves::{classify_move, Ply};
use crate::notation::{GlyphStyle, Transcript};
use crate::repair::{plan_repair, RepairPlan};
use crate::setup::{assign_from_beginning, assign_from_classifier, is_game_from_beginning};

/// Turns one board photograph into a snapshot. Every image after the first
/// is extracted against the first one, which shows the empty board.
pub trait BoardExtractor: Send + Sync {
    type Error: Display + Send;

    fn extract(
        &self,
        image: &[u8],
        reference: Option<&BoardSnapshot>,
    ) -> impl Future<Output = Result<BoardSnapshot, Self::Error>> + Send;
}

/// A single game: snapshot 0 is the empty-board reference, snapshot 1 the
/// first real position, and every later snapshot is one ply.
pub struct Game<C> {
    snapshots: Vec<BoardSnapshot>,
    transcript: Transcript,
    classifier: C,
    top_k: usize,
}

impl<C: PieceClassifier> Game<C> {
    pub fn new(classifier: C) -> Self {
        Self {
            snapshots: Vec::new(),
            transcript: Transcript::default(),
            classifier,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_style(mut self, style: GlyphStyle) -> Self {
        self.transcript = Transcript::new(style);
        self
    }

    /// Number of guesses considered per square when identifying a position
    /// joined mid-game.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Replace the sequence and start a fresh transcript.
    pub fn load(&mut self, snapshots: Vec<BoardSnapshot>) {
        self.snapshots = snapshots;
        self.transcript.clear();
    }

    /// Extract every image and load the result. The first image is the
    /// reference; the others are extracted up to `concurrency` at a time and
    /// keep their original order.
    pub async fn load_images<E: BoardExtractor>(
        &mut self,
        extractor: &E,
        images: &[Vec<u8>],
        concurrency: usize,
    ) -> Result<(), ReconstructionError> {
        let extraction_failed = |index: usize, err: E::Error| {
            error!(index, %err, "Board extraction failed");
            ReconstructionError::Extraction {
                index,
                message: err.to_string(),
            }
        };

        let Some(first) = images.first() else {
            self.load(Vec::new());
            return Ok(());
        };
        let reference = extractor
            .extract(first, None)
            .await
            .map_err(|err| extraction_failed(0, err))?;

        let reference_ref = &reference;
        let rest: Vec<BoardSnapshot> = stream::iter(images.iter().enumerate().skip(1))
            .map(|(index, image)| async move {
                extractor
                    .extract(image, Some(reference_ref))
                    .await
                    .map_err(|err| extraction_failed(index, err))
            })
            .buffered(concurrency.max(1))
            .try_collect()
            .await?;

        info!(images = images.len(), "Extracted board snapshots");

        let mut snapshots = Vec::with_capacity(images.len());
        snapshots.push(reference);
        snapshots.extend(rest);
        self.load(snapshots);
        Ok(())
    }

    pub fn snapshots(&self) -> &[BoardSnapshot] {
        &self.snapshots
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Whether the first real position looks like the standard setup.
    pub fn is_game_from_beginning(&self) -> bool {
        self.snapshots.get(1).is_some_and(is_game_from_beginning)
    }

    /// Identify the pieces of the first real position.
    pub async fn assign_starting_figures(&mut self, from_beginning: bool) {
        let Some(first) = self.snapshots.get_mut(1) else {
            return;
        };
        if from_beginning {
            assign_from_beginning(first);
        } else {
            assign_from_classifier(first, &self.classifier, self.top_k).await;
        }
    }

    /// Work out the move behind every consecutive pair of snapshots from the
    /// first real position on, appending each to the transcript. Identities
    /// are carried forward onto each snapshot as it is processed.
    pub async fn reconstruct(&mut self) -> Result<(), ReconstructionError> {
        for index in 2..self.snapshots.len() {
            let (done, pending) = self.snapshots.split_at_mut(index);
            let before = &done[index - 1];
            let Some((board, rest)) = pending.split_first_mut() else {
                break;
            };
            let next = rest.first();

            let mut diff = diff_snapshots(before, board, false);
            if !diff.is_valid() {
                diff = repair(index, &diff, before, board, next)?;
            }

            let ply = Ply {
                snapshot: index,
                before,
                board,
                next,
                classifier: &self.classifier,
            };
            let record = classify_move(&diff, ply).await.inspect_err(|err| {
                error!(snapshot = index, %err, "Reconstruction aborted");
            })?;

            debug!(
                snapshot = index,
                token = %record.token(self.transcript.style()),
                "Move classified"
            );
            self.transcript.push(&record);
        }
        Ok(())
    }

    /// Identify the starting position (from `from_beginning` or, when absent,
    /// the occupancy heuristic), reconstruct the game and render the table.
    pub async fn generate_notation(
        &mut self,
        from_beginning: Option<bool>,
    ) -> Result<String, ReconstructionError> {
        let from_beginning = from_beginning.unwrap_or_else(|| self.is_game_from_beginning());
        self.assign_starting_figures(from_beginning).await;
        self.reconstruct().await?;
        info!(moves = self.transcript.len(), from_beginning, "Notation generated");
        Ok(self.transcript.render())
    }
}

/// Repair an invalid diff in place and return the recomputed one.
fn repair(
    index: usize,
    diff: &BoardDiff,
    before: &BoardSnapshot,
    board: &mut BoardSnapshot,
    next: Option<&BoardSnapshot>,
) -> Result<BoardDiff, ReconstructionError> {
    let failed = |board: &BoardSnapshot| {
        error!(snapshot = index, "Self repair failed\n{board}");
        ReconstructionError::SelfRepairFailed { snapshot: index }
    };

    let plan = plan_repair(diff, board, next);
    let RepairPlan::Resolved { strategy, discard } = &plan else {
        return Err(failed(board));
    };
    warn!(
        snapshot = index,
        disappeared = diff.disappeared.len(),
        reappeared = diff.reappeared.len(),
        ?strategy,
        discarded = discard.len(),
        "Repairing snapshot"
    );
    plan.apply(board);

    let repaired = BoardDiff::between(before, board);
    if repaired.is_valid() {
        Ok(repaired)
    } else {
        Err(failed(board))
    }
}
