//! Board snapshot model.
//!
//! Coordinates: `row` is the file (0 = 'a' .. 7 = 'h') and `col` is the rank
//! (0 = '1' .. 7 = '8'). White starts on cols 0 and 1, Black on cols 6 and 7.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::BoardError;

pub const BOARD_SIZE: u8 = 8;

const FILE_LETTERS: [char; 8] = ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FigureType {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
    Empty,
}

impl FigureType {
    /// Rook, bishop and queen move along rays and can be blocked.
    pub fn is_sliding(self) -> bool {
        matches!(self, FigureType::Rook | FigureType::Bishop | FigureType::Queen)
    }

    /// Kinds a pawn may turn into on the last rank.
    pub fn is_promotion_target(self) -> bool {
        matches!(
            self,
            FigureType::Queen | FigureType::Rook | FigureType::Bishop | FigureType::Knight
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FigureColor {
    White,
    Black,
    Empty,
}

impl FigureColor {
    pub fn opponent(self) -> Self {
        match self {
            FigureColor::White => FigureColor::Black,
            FigureColor::Black => FigureColor::White,
            FigureColor::Empty => FigureColor::Empty,
        }
    }
}

/// Checkerboard colour of a square, fixed by its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SquareColor {
    White,
    Black,
}

/// A piece identity. Either both halves are `Empty` or neither is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Figure {
    pub kind: FigureType,
    pub color: FigureColor,
}

impl Figure {
    pub const EMPTY: Figure = Figure {
        kind: FigureType::Empty,
        color: FigureColor::Empty,
    };

    pub fn new(kind: FigureType, color: FigureColor) -> Self {
        if kind == FigureType::Empty || color == FigureColor::Empty {
            Self::EMPTY
        } else {
            Self { kind, color }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == FigureType::Empty
    }

    /// Single-character board symbol, uppercase for white.
    fn ascii_symbol(&self) -> char {
        let symbol = match self.kind {
            FigureType::Pawn => 'p',
            FigureType::Rook => 'r',
            FigureType::Knight => 'n',
            FigureType::Bishop => 'b',
            FigureType::Queen => 'q',
            FigureType::King => 'k',
            FigureType::Empty => '?',
        };
        match self.color {
            FigureColor::White => symbol.to_ascii_uppercase(),
            _ => symbol,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> Result<Self, BoardError> {
        Self::from_signed(row as i32, col as i32).ok_or(BoardError::SquareOutOfBounds {
            row: row as i32,
            col: col as i32,
        })
    }

    /// Returns `None` when the coordinates fall off the board.
    pub fn from_signed(row: i32, col: i32) -> Option<Self> {
        if (0..BOARD_SIZE as i32).contains(&row) && (0..BOARD_SIZE as i32).contains(&col) {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn col(self) -> u8 {
        self.col
    }

    pub fn offset(self, row_offset: i32, col_offset: i32) -> Option<Self> {
        Self::from_signed(self.row as i32 + row_offset, self.col as i32 + col_offset)
    }

    pub fn file_letter(self) -> char {
        FILE_LETTERS[self.row as usize]
    }

    /// All 64 positions in row-major order.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Position { row, col }))
    }

    fn index(self) -> usize {
        self.row as usize * BOARD_SIZE as usize + self.col as usize
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_letter(), self.col + 1)
    }
}

impl FromStr for Position {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BoardError::InvalidSquareName(s.to_string());
        let mut chars = s.chars();
        let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };
        let row = FILE_LETTERS.iter().position(|&c| c == file).ok_or_else(invalid)?;
        let col = rank.to_digit(10).filter(|d| (1..=8).contains(d)).ok_or_else(invalid)?;
        Ok(Position {
            row: row as u8,
            col: (col - 1) as u8,
        })
    }
}

/// One cell of a snapshot. Position, square colour, intensity and image crop
/// are fixed at extraction time; occupancy and identity change during
/// reconstruction through [`BoardSnapshot`] methods only.
#[derive(Debug, Clone, PartialEq)]
pub struct Square {
    position: Position,
    occupied: bool,
    figure: Figure,
    static_color: SquareColor,
    intensity: f64,
    region: Option<Arc<[u8]>>,
}

impl Square {
    pub fn new(position: Position, occupied: bool, intensity: f64) -> Self {
        // a1 is a dark square
        let static_color = if (position.row + position.col) % 2 == 0 {
            SquareColor::Black
        } else {
            SquareColor::White
        };
        Self {
            position,
            occupied,
            figure: Figure::EMPTY,
            static_color,
            intensity,
            region: None,
        }
    }

    pub fn with_figure(mut self, figure: Figure) -> Self {
        self.figure = figure;
        self
    }

    /// Attach the image crop the classifier is run on.
    pub fn with_region(mut self, region: impl Into<Arc<[u8]>>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    /// Identity as recorded, possibly stale when the square is unoccupied.
    pub fn figure(&self) -> Figure {
        self.figure
    }

    pub fn static_color(&self) -> SquareColor {
        self.static_color
    }

    pub fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn region(&self) -> Option<&[u8]> {
        self.region.as_deref()
    }

    /// The piece standing here, if any.
    pub fn occupant(&self) -> Option<Figure> {
        self.occupied.then_some(self.figure)
    }
}

/// The observed state of all 64 squares at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    squares: Vec<Square>,
}

impl BoardSnapshot {
    /// Build a snapshot from exactly one square per position, in any order.
    pub fn from_squares(squares: impl IntoIterator<Item = Square>) -> Result<Self, BoardError> {
        let mut slots: Vec<Option<Square>> = vec![None; 64];
        let mut count = 0;
        for square in squares {
            let pos = square.position;
            let slot = &mut slots[pos.index()];
            if slot.is_some() {
                return Err(BoardError::DuplicateSquare {
                    row: pos.row,
                    col: pos.col,
                });
            }
            *slot = Some(square);
            count += 1;
        }
        if count != 64 {
            return Err(BoardError::MissingSquares(count));
        }
        Ok(Self {
            squares: slots.into_iter().flatten().collect(),
        })
    }

    /// A board with nothing on it and zero intensity everywhere.
    pub fn empty() -> Self {
        Self {
            squares: Position::all().map(|pos| Square::new(pos, false, 0.0)).collect(),
        }
    }

    pub fn square(&self, pos: Position) -> &Square {
        &self.squares[pos.index()]
    }

    /// Row-major iteration.
    pub fn squares(&self) -> impl Iterator<Item = &Square> {
        self.squares.iter()
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.square(pos).occupied
    }

    pub fn occupant(&self, pos: Position) -> Option<Figure> {
        self.square(pos).occupant()
    }

    pub fn set_occupied(&mut self, pos: Position, occupied: bool) {
        self.squares[pos.index()].occupied = occupied;
    }

    pub fn set_figure(&mut self, pos: Position, figure: Figure) {
        self.squares[pos.index()].figure = figure;
    }

    /// Mark a square as holding `figure`.
    pub fn place(&mut self, pos: Position, figure: Figure) {
        let square = &mut self.squares[pos.index()];
        square.occupied = true;
        square.figure = figure;
    }

    /// Drop both identity and occupancy, treating the square as a misdetection.
    pub fn clear_square(&mut self, pos: Position) {
        let square = &mut self.squares[pos.index()];
        square.occupied = false;
        square.figure = Figure::EMPTY;
    }

    pub fn find_king(&self, color: FigureColor) -> Option<Position> {
        if color == FigureColor::Empty {
            return None;
        }
        let king = Figure::new(FigureType::King, color);
        self.squares
            .iter()
            .find(|sq| sq.occupied && sq.figure == king)
            .map(|sq| sq.position)
    }

    pub fn occupied_count(&self) -> usize {
        self.squares.iter().filter(|sq| sq.occupied).count()
    }
}

impl Default for BoardSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ranks: String = (1..=BOARD_SIZE).map(|r| format!("{r} ")).collect();
        writeln!(f, "  {ranks}")?;
        for row in 0..BOARD_SIZE {
            let letter = FILE_LETTERS[row as usize];
            write!(f, "{letter}")?;
            for col in 0..BOARD_SIZE {
                let square = &self.squares[row as usize * BOARD_SIZE as usize + col as usize];
                let symbol = match square.occupant() {
                    Some(figure) => figure.ascii_symbol(),
                    None => '.',
                };
                write!(f, "|{symbol}")?;
            }
            writeln!(f, "|{letter}")?;
        }
        write!(f, "  {ranks}")
    }
}
