//! Move tokens and the game transcript.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::board::{Figure, FigureColor, FigureType, Position};

const INDEX_COLUMN_WIDTH: usize = 4;
const MOVE_COLUMN_WIDTH: usize = 18;

/// How pieces are written in tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphStyle {
    /// Chess figurines, distinct per colour (♘ / ♞).
    #[default]
    Unicode,
    /// SAN letters (N, B, R, Q, K), the same for both colours.
    Letters,
}

impl GlyphStyle {
    pub fn glyph(self, figure: Figure) -> &'static str {
        match self {
            GlyphStyle::Unicode => unicode_glyph(figure),
            GlyphStyle::Letters => letter_glyph(figure.kind),
        }
    }
}

fn unicode_glyph(figure: Figure) -> &'static str {
    match (figure.kind, figure.color) {
        (FigureType::King, FigureColor::White) => "♔",
        (FigureType::Queen, FigureColor::White) => "♕",
        (FigureType::Rook, FigureColor::White) => "♖",
        (FigureType::Bishop, FigureColor::White) => "♗",
        (FigureType::Knight, FigureColor::White) => "♘",
        (FigureType::Pawn, FigureColor::White) => "♙",
        (FigureType::King, FigureColor::Black) => "♚",
        (FigureType::Queen, FigureColor::Black) => "♛",
        (FigureType::Rook, FigureColor::Black) => "♜",
        (FigureType::Bishop, FigureColor::Black) => "♝",
        (FigureType::Knight, FigureColor::Black) => "♞",
        (FigureType::Pawn, FigureColor::Black) => "♟",
        _ => "",
    }
}

fn letter_glyph(kind: FigureType) -> &'static str {
    match kind {
        FigureType::King => "K",
        FigureType::Queen => "Q",
        FigureType::Rook => "R",
        FigureType::Bishop => "B",
        FigureType::Knight => "N",
        FigureType::Pawn | FigureType::Empty => "",
    }
}

/// One classified ply, ready to be written down.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveRecord {
    Standard {
        /// The piece as it stood on `from` (a pawn when promoting).
        figure: Figure,
        from: Position,
        to: Position,
        capture: bool,
        check: bool,
        promotion: Option<FigureType>,
    },
    EnPassant {
        color: FigureColor,
        from_file: char,
        to: Position,
        check: bool,
    },
    Castle {
        color: FigureColor,
        king_side: bool,
        check: bool,
    },
}

impl MoveRecord {
    pub fn color(&self) -> FigureColor {
        match self {
            MoveRecord::Standard { figure, .. } => figure.color,
            MoveRecord::EnPassant { color, .. } | MoveRecord::Castle { color, .. } => *color,
        }
    }

    pub fn token(&self, style: GlyphStyle) -> String {
        let mut token = String::new();
        let check = match self {
            MoveRecord::Standard {
                figure,
                from,
                to,
                capture,
                check,
                promotion,
            } => {
                if figure.kind != FigureType::Pawn {
                    token.push_str(style.glyph(*figure));
                }
                if figure.kind == FigureType::Pawn && *capture {
                    token.push(from.file_letter());
                }
                if *capture {
                    token.push('x');
                }
                let _ = write!(token, "{to}");
                if let Some(kind) = promotion {
                    token.push('=');
                    token.push_str(style.glyph(Figure::new(*kind, figure.color)));
                }
                *check
            }
            MoveRecord::EnPassant {
                from_file, to, check, ..
            } => {
                let _ = write!(token, "{from_file}x{to}");
                *check
            }
            MoveRecord::Castle {
                king_side, check, ..
            } => {
                token.push_str(if *king_side { "O-O" } else { "O-O-O" });
                *check
            }
        };
        if check {
            token.push('+');
        }
        token
    }
}

/// Ordered move tokens of one game, White and Black alternating.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    style: GlyphStyle,
    moves: Vec<String>,
}

impl Transcript {
    pub fn new(style: GlyphStyle) -> Self {
        Self {
            style,
            moves: Vec::new(),
        }
    }

    pub fn style(&self) -> GlyphStyle {
        self.style
    }

    pub fn push(&mut self, record: &MoveRecord) {
        self.moves.push(record.token(self.style));
    }

    pub fn moves(&self) -> &[String] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn clear(&mut self) {
        self.moves.clear();
    }

    /// Two-column table, one line per move number.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (index, pair) in self.moves.chunks(2).enumerate() {
            let number = format!("{}.", index + 1);
            let white = &pair[0];
            let black = pair.get(1).map(|m| align_move(m)).unwrap_or_default();
            let _ = writeln!(
                out,
                "{number:>INDEX_COLUMN_WIDTH$} {white:<MOVE_COLUMN_WIDTH$}{black:<MOVE_COLUMN_WIDTH$}"
            );
        }
        out
    }

    /// PGN movetext, e.g. `1. e4 e5 2. Nf3`.
    pub fn movetext(&self) -> String {
        let mut out = String::new();
        for (index, mv) in self.moves.iter().enumerate() {
            if index % 2 == 0 {
                if !out.is_empty() {
                    out.push(' ');
                }
                let _ = write!(out, "{}. {mv}", index / 2 + 1);
            } else {
                out.push(' ');
                out.push_str(mv);
            }
        }
        out
    }
}

/// Pawn moves and castles carry no leading glyph; indent them one column so
/// they line up with piece moves in the black column.
fn align_move(mv: &str) -> String {
    match mv.chars().next() {
        Some('a'..='h' | 'O') => format!(" {mv}"),
        _ => mv.to_string(),
    }
}
