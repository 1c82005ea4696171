//! Dvonn rules engine: board state, move legality, move application and the
//! disconnection-capture rule.
//!
//! # Board Layout
//!
//! ```text
//! The 49-cell hexagonal board lives in a 5 × 11 grid (rank 0-4, file 0-10).
//! Six corner cells of the rectangle are not part of the board:
//! (0,9) (0,10) (1,10) (3,0) (4,0) (4,1).
//!
//!         c5  d5  e5  f5  g5  h5  i5  j5  k5        rank 4
//!       b4  c4  d4  e4  f4  g4  h4  i4  j4  k4      rank 3
//!     a3  b3  c3  d3  e3  f3  g3  h3  i3  j3  k3    rank 2
//!       a2  b2  c2  d2  e2  f2  g2  h2  i2  j2      rank 1
//!         a1  b1  c1  d1  e1  f1  g1  h1  i1        rank 0
//!
//! Hex neighbours of (r, f):
//!   (r-1, f) (r+1, f) (r, f-1) (r, f+1) (r-1, f-1) (r+1, f+1)
//! ```
//!
//! # Move Numbers
//!
//! ```text
//! 1..=3          place the three root pieces (neutral)
//! 4..=SPACES     place one piece: even = Black, odd = White
//! SPACES+1..     jump a stack or pass: odd = Black, even = White
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[cfg(feature = "wasm")]
pub mod wasm;

/// Number of ranks (rows) in the storage grid.
pub const RANKS: usize = 5;

/// Number of files (columns) in the storage grid.
pub const FILES: usize = 11;

/// Grid cells that are not part of the hexagonal board.
pub const INVALID_SPACES: [Coord; 6] = [
    Coord::new(0, 9),
    Coord::new(0, 10),
    Coord::new(1, 10),
    Coord::new(3, 0),
    Coord::new(4, 0),
    Coord::new(4, 1),
];

/// Number of playable cells, which is also the number of pieces placed
/// before the jump phase starts.
pub const SPACES: u32 = (RANKS * FILES - INVALID_SPACES.len()) as u32;

/// Number of root pieces, placed on moves 1 through 3.
pub const ROOT_PIECES: u32 = 3;

/// The six straight-line hex directions as (rank, file) deltas.
const HEX_DIRECTIONS: [(i32, i32); 6] = [(-1, 0), (1, 0), (0, -1), (0, 1), (-1, -1), (1, 1)];

/// Piece colour.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

/// Game phase, derived from the move number.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Phase {
    /// Pieces are being placed on empty cells.
    Placement,
    /// Stacks jump onto other stacks, or the side to move passes.
    Jump,
}

// ============================================================================
// COORDINATES
// ============================================================================

/// A (rank, file) coordinate in the storage grid.
///
/// Coordinates may lie outside the grid; every rule check rejects those
/// rather than panicking.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub rank: u8,
    pub file: u8,
}

impl Coord {
    #[inline]
    pub const fn new(rank: u8, file: u8) -> Coord {
        Coord { rank, file }
    }

    /// Build a coordinate from signed integers. Negative values and values
    /// that do not fit a `u8` give `None`.
    pub fn from_signed(rank: i32, file: i32) -> Option<Coord> {
        Some(Coord::new(u8::try_from(rank).ok()?, u8::try_from(file).ok()?))
    }

    /// Check if the coordinate lies inside the 5 × 11 grid.
    #[inline]
    pub fn is_in_bounds(self) -> bool {
        (self.rank as usize) < RANKS && (self.file as usize) < FILES
    }

    /// Check if the coordinate is on the outer rim of the grid.
    #[inline]
    pub fn is_on_edge(self) -> bool {
        self.rank == 0
            || self.rank as usize == RANKS - 1
            || self.file == 0
            || self.file as usize == FILES - 1
    }

    /// Check if this is one of the masked-out corner cells.
    #[inline]
    pub fn is_invalid_space(self) -> bool {
        INVALID_SPACES.contains(&self)
    }

    /// Shift by a (rank, file) delta. Returns `None` if the result leaves the grid.
    pub fn offset(self, d_rank: i32, d_file: i32) -> Option<Coord> {
        let rank = self.rank as i32 + d_rank;
        let file = self.file as i32 + d_file;
        if rank < 0 || rank >= RANKS as i32 || file < 0 || file >= FILES as i32 {
            return None;
        }
        Some(Coord::new(rank as u8, file as u8))
    }

    /// Iterate over the in-grid hex neighbours.
    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        HEX_DIRECTIONS
            .into_iter()
            .filter_map(move |(d_rank, d_file)| self.offset(d_rank, d_file))
    }

    /// Iterate over all 55 grid coordinates in rank-major order, invalid
    /// corners included.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..RANKS as u8).flat_map(|rank| (0..FILES as u8).map(move |file| Coord::new(rank, file)))
    }
}

/// Algebraic name: file letter then 1-based rank, e.g. `(2, 4)` is `e3`.
impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_in_bounds() {
            write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
        } else {
            write!(f, "({}, {})", self.rank, self.file)
        }
    }
}

/// Error returned when parsing an algebraic coordinate fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate {0:?}: expected a file letter a-k followed by a rank digit 1-5")]
pub struct ParseCoordError(String);

impl FromStr for Coord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Coord, ParseCoordError> {
        let err = || ParseCoordError(s.to_string());
        let &[file, rank] = s.as_bytes() else {
            return Err(err());
        };
        let file = file.to_ascii_lowercase().checked_sub(b'a').ok_or_else(err)?;
        let rank = rank.checked_sub(b'1').ok_or_else(err)?;
        let coord = Coord::new(rank, file);
        if !coord.is_in_bounds() {
            return Err(err());
        }
        Ok(coord)
    }
}

// ============================================================================
// CELLS
// ============================================================================

/// One or more pieces on a single cell, moved and merged as a unit.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Stack {
    /// Number of pieces, always at least 1.
    pub height: u8,
    /// Colour of the top piece. `None` only for a root piece as placed.
    pub owner: Option<Color>,
    /// Whether a root piece is somewhere in the stack.
    pub has_root: bool,
}

impl Stack {
    /// A single root piece, as placed on moves 1 through 3.
    #[inline]
    pub const fn root() -> Stack {
        Stack { height: 1, owner: None, has_root: true }
    }

    /// A single coloured piece.
    #[inline]
    pub const fn piece(color: Color) -> Stack {
        Stack { height: 1, owner: Some(color), has_root: false }
    }

    /// A lone root piece never moves.
    #[inline]
    pub fn is_lone_root(self) -> bool {
        self.has_root && self.height == 1
    }

    /// The stack that results from jumping `self` on top of `below`.
    /// The moving stack keeps control of the merged stack.
    #[inline]
    pub fn jump_onto(self, below: Stack) -> Stack {
        Stack {
            height: self.height + below.height,
            owner: self.owner,
            has_root: self.has_root || below.has_root,
        }
    }
}

/// State of a single grid cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Not part of the board.
    Invalid,
    /// Playable and unoccupied.
    Empty,
    Stack(Stack),
}

impl Cell {
    #[inline]
    pub fn stack(self) -> Option<Stack> {
        match self {
            Cell::Stack(stack) => Some(stack),
            _ => None,
        }
    }

    #[inline]
    pub fn is_occupied(self) -> bool {
        matches!(self, Cell::Stack(_))
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    #[inline]
    pub fn is_invalid(self) -> bool {
        self == Cell::Invalid
    }
}

// ============================================================================
// MOVES
// ============================================================================

/// A move request.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Move {
    /// Skip the turn; only legal when no jump is available.
    Pass,
    /// Place a new piece on an empty cell.
    Place { at: Coord },
    /// Jump the whole stack on `from` onto the stack on `to`.
    Jump { from: Coord, to: Coord },
}

impl Move {
    /// Interpret a flat coordinate list: no values is a pass, two values are
    /// `rank, file` of a placement, four values are `from_rank, from_file,
    /// to_rank, to_file` of a jump. Any other length, or a value that is not
    /// a grid index, gives `None`.
    pub fn from_coords(coords: &[i32]) -> Option<Move> {
        match *coords {
            [] => Some(Move::Pass),
            [rank, file] => Some(Move::Place { at: Coord::from_signed(rank, file)? }),
            [from_rank, from_file, to_rank, to_file] => Some(Move::Jump {
                from: Coord::from_signed(from_rank, from_file)?,
                to: Coord::from_signed(to_rank, to_file)?,
            }),
            _ => None,
        }
    }

    /// Inverse of [`Move::from_coords`].
    pub fn to_coords(self) -> Vec<i32> {
        match self {
            Move::Pass => vec![],
            Move::Place { at } => vec![at.rank as i32, at.file as i32],
            Move::Jump { from, to } => vec![
                from.rank as i32,
                from.file as i32,
                to.rank as i32,
                to.file as i32,
            ],
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Pass => f.write_str("pass"),
            Move::Place { at } => write!(f, "{at}"),
            Move::Jump { from, to } => write!(f, "{from}{to}"),
        }
    }
}

/// Why a move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IllegalMove {
    #[error("move {0} is still in the placement phase")]
    PlacementPhase(u32),

    #[error("all pieces have been placed")]
    AllPlaced,

    #[error("{0} is not on the board")]
    OffBoard(Coord),

    #[error("{0} is already occupied")]
    Occupied(Coord),

    #[error("{from} to {to} is not a straight line")]
    NotStraight { from: Coord, to: Coord },

    #[error("there is no stack on {0}")]
    NoStack(Coord),

    #[error("the lone root piece on {0} cannot move")]
    LoneRoot(Coord),

    #[error("jumps must land on a stack, {0} is empty")]
    EmptyLanding(Coord),

    #[error("the stack on {from} has height {height} and cannot reach {to}")]
    WrongDistance { from: Coord, to: Coord, height: u8 },

    #[error("the stack on {0} is not controlled by the side to move")]
    WrongColor(Coord),

    #[error("the stack on {0} is surrounded")]
    Surrounded(Coord),

    #[error("cannot pass while {from} to {to} is available")]
    JumpAvailable { from: Coord, to: Coord },
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Full game state: the grid and the move counter.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct GameState {
    cells: [[Cell; FILES]; RANKS],
    move_number: u32,
}

impl GameState {
    /// Create the initial position: every playable cell empty, move 1.
    pub fn new() -> GameState {
        let mut cells = [[Cell::Empty; FILES]; RANKS];
        for space in INVALID_SPACES {
            cells[space.rank as usize][space.file as usize] = Cell::Invalid;
        }
        GameState { cells, move_number: 1 }
    }

    /// Return to the initial position.
    pub fn reset(&mut self) {
        *self = GameState::new();
    }

    /// Replace the move counter, keeping the board. The counter never drops below 1.
    pub fn with_move_number(mut self, move_number: u32) -> GameState {
        self.move_number = move_number.max(1);
        self
    }

    #[inline]
    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        if self.move_number <= SPACES {
            Phase::Placement
        } else {
            Phase::Jump
        }
    }

    /// Colour that acts on the current move. `None` while root pieces are placed.
    ///
    /// Placement and jump phases use opposite parities; see the crate docs.
    pub fn side_to_move(&self) -> Option<Color> {
        let even = self.move_number % 2 == 0;
        match self.phase() {
            Phase::Placement if self.move_number <= ROOT_PIECES => None,
            Phase::Placement => Some(if even { Color::Black } else { Color::White }),
            Phase::Jump => Some(if even { Color::White } else { Color::Black }),
        }
    }

    /// Get the cell at a coordinate. Anything outside the grid reads as `Invalid`.
    #[inline]
    pub fn cell(&self, at: Coord) -> Cell {
        if !at.is_in_bounds() {
            return Cell::Invalid;
        }
        self.cells[at.rank as usize][at.file as usize]
    }

    /// Overwrite a playable cell.
    /// Does NOT validate - used to set up positions. Writes to invalid
    /// spaces, writes of `Cell::Invalid`, zero-height stacks and out-of-grid
    /// writes are ignored.
    pub fn set_cell(&mut self, at: Coord, cell: Cell) {
        if self.cell(at).is_invalid() || cell.is_invalid() {
            return;
        }
        if cell.stack().is_some_and(|stack| stack.height == 0) {
            return;
        }
        self.cells[at.rank as usize][at.file as usize] = cell;
    }

    /// Iterate over every occupied cell.
    pub fn stacks(&self) -> impl Iterator<Item = (Coord, Stack)> + '_ {
        Coord::all().filter_map(move |at| self.cell(at).stack().map(|stack| (at, stack)))
    }

    /// Total pieces currently on the board.
    pub fn pieces_on_board(&self) -> u32 {
        self.stacks().map(|(_, stack)| stack.height as u32).sum()
    }

    /// Pieces that still have to be placed.
    #[inline]
    pub fn pieces_to_place(&self) -> u32 {
        (SPACES + 1).saturating_sub(self.move_number)
    }

    /// Pieces removed by disconnection so far, assuming the position was
    /// reached by play.
    pub fn captured_pieces(&self) -> u32 {
        SPACES.saturating_sub(self.pieces_to_place() + self.pieces_on_board())
    }

    /// Whether the stack on `at` is hemmed in on all six sides.
    ///
    /// Cells on the rim of the grid always have an open side.
    pub fn is_surrounded(&self, at: Coord) -> bool {
        if at.is_on_edge() {
            return false;
        }
        HEX_DIRECTIONS.into_iter().all(|(d_rank, d_file)| {
            at.offset(d_rank, d_file)
                .is_some_and(|next| self.cell(next).is_occupied())
        })
    }

    // ========== Legality ==========

    /// Validate a move against the current position.
    pub fn check(&self, mov: Move) -> Result<(), IllegalMove> {
        match mov {
            Move::Pass => self.check_pass(),
            Move::Place { at } => self.check_placement(at),
            Move::Jump { from, to } => self.check_jump(from, to),
        }
    }

    pub fn check_placement(&self, at: Coord) -> Result<(), IllegalMove> {
        if self.phase() != Phase::Placement {
            return Err(IllegalMove::AllPlaced);
        }
        match self.cell(at) {
            Cell::Invalid => Err(IllegalMove::OffBoard(at)),
            Cell::Stack(_) => Err(IllegalMove::Occupied(at)),
            Cell::Empty => Ok(()),
        }
    }

    /// A neutral stack (no owner) matches neither side, so it can never jump.
    pub fn check_jump(&self, from: Coord, to: Coord) -> Result<(), IllegalMove> {
        if self.phase() != Phase::Jump {
            return Err(IllegalMove::PlacementPhase(self.move_number));
        }
        if !from.is_in_bounds() {
            return Err(IllegalMove::OffBoard(from));
        }
        if !to.is_in_bounds() {
            return Err(IllegalMove::OffBoard(to));
        }

        let d_rank = to.rank as i32 - from.rank as i32;
        let d_file = to.file as i32 - from.file as i32;
        if d_rank != 0 && d_file != 0 && d_rank != d_file {
            return Err(IllegalMove::NotStraight { from, to });
        }

        let stack = match self.cell(from) {
            Cell::Invalid => return Err(IllegalMove::OffBoard(from)),
            Cell::Empty => return Err(IllegalMove::NoStack(from)),
            Cell::Stack(stack) if stack.is_lone_root() => return Err(IllegalMove::LoneRoot(from)),
            Cell::Stack(stack) => stack,
        };
        match self.cell(to) {
            Cell::Invalid => return Err(IllegalMove::OffBoard(to)),
            Cell::Empty => return Err(IllegalMove::EmptyLanding(to)),
            Cell::Stack(_) => {}
        }

        let height = stack.height as u32;
        if d_rank.unsigned_abs() != height && d_file.unsigned_abs() != height {
            return Err(IllegalMove::WrongDistance { from, to, height: stack.height });
        }

        if stack.owner != self.side_to_move() {
            return Err(IllegalMove::WrongColor(from));
        }

        if self.is_surrounded(from) {
            return Err(IllegalMove::Surrounded(from));
        }

        Ok(())
    }

    /// A pass is legal only in the jump phase when no jump exists anywhere.
    /// Every origin/destination pair on the grid is tried.
    pub fn check_pass(&self) -> Result<(), IllegalMove> {
        if self.phase() != Phase::Jump {
            return Err(IllegalMove::PlacementPhase(self.move_number));
        }
        for from in Coord::all() {
            for to in Coord::all() {
                if self.is_legal_jump(from, to) {
                    return Err(IllegalMove::JumpAvailable { from, to });
                }
            }
        }
        Ok(())
    }

    #[inline]
    pub fn is_legal_move(&self, mov: Move) -> bool {
        self.check(mov).is_ok()
    }

    #[inline]
    pub fn is_legal_placement(&self, at: Coord) -> bool {
        self.check_placement(at).is_ok()
    }

    #[inline]
    pub fn is_legal_jump(&self, from: Coord, to: Coord) -> bool {
        self.check_jump(from, to).is_ok()
    }

    #[inline]
    pub fn is_legal_pass(&self) -> bool {
        self.check_pass().is_ok()
    }

    // ========== Move Generation ==========

    /// Generate every legal move in the current position.
    ///
    /// In the jump phase a stack of height `h` can only reach the six cells
    /// `h` steps away along a hex line, so only those are tried. If none is
    /// legal the result is `[Move::Pass]`.
    pub fn legal_moves(&self) -> Vec<Move> {
        match self.phase() {
            Phase::Placement => Coord::all()
                .filter(|&at| self.cell(at).is_empty())
                .map(|at| Move::Place { at })
                .collect(),
            Phase::Jump => {
                let mut moves = Vec::new();
                for (from, stack) in self.stacks() {
                    let height = stack.height as i32;
                    for (d_rank, d_file) in HEX_DIRECTIONS {
                        if let Some(to) = from.offset(d_rank * height, d_file * height) {
                            if self.is_legal_jump(from, to) {
                                moves.push(Move::Jump { from, to });
                            }
                        }
                    }
                }
                if moves.is_empty() {
                    moves.push(Move::Pass);
                }
                moves
            }
        }
    }

    // ========== Apply ==========

    /// Apply a move if it is legal. Returns whether it was applied.
    pub fn apply(&mut self, mov: Move) -> bool {
        self.try_apply(mov).is_ok()
    }

    /// Apply a move if it is legal, reporting why it was not.
    ///
    /// On success the move counter advances by one. Jumps are followed by
    /// removal of every stack cut off from the root pieces. On failure the
    /// state is untouched.
    pub fn try_apply(&mut self, mov: Move) -> Result<(), IllegalMove> {
        self.check(mov)?;

        match mov {
            Move::Pass => {}
            Move::Place { at } => {
                let stack = self.placed_stack();
                self.set_cell(at, Cell::Stack(stack));
            }
            Move::Jump { from, to } => {
                if let (Cell::Stack(moving), Cell::Stack(below)) = (self.cell(from), self.cell(to)) {
                    self.set_cell(to, Cell::Stack(moving.jump_onto(below)));
                    self.set_cell(from, Cell::Empty);
                    self.remove_disconnected_stacks();
                }
            }
        }

        self.move_number += 1;
        Ok(())
    }

    /// The piece placed on the current move.
    fn placed_stack(&self) -> Stack {
        match self.side_to_move() {
            Some(color) => Stack::piece(color),
            None => Stack::root(),
        }
    }

    // ========== Disconnection ==========

    /// Remove every stack that is not linked to a root-bearing stack through
    /// a chain of occupied hex neighbours. Returns the number of pieces removed.
    ///
    /// Breadth-first search seeded with all root-bearing stacks. Each cell
    /// enters the queue at most once.
    pub fn remove_disconnected_stacks(&mut self) -> u32 {
        let mut connected = [[false; FILES]; RANKS];
        let mut queue = VecDeque::new();

        for (at, stack) in self.stacks() {
            if stack.has_root {
                connected[at.rank as usize][at.file as usize] = true;
                queue.push_back(at);
            }
        }

        while let Some(at) = queue.pop_front() {
            for next in at.neighbors() {
                let seen = &mut connected[next.rank as usize][next.file as usize];
                if !*seen && self.cell(next).is_occupied() {
                    *seen = true;
                    queue.push_back(next);
                }
            }
        }

        let mut removed = 0;
        for at in Coord::all() {
            if let Cell::Stack(stack) = self.cell(at) {
                if !connected[at.rank as usize][at.file as usize] {
                    removed += stack.height as u32;
                    self.set_cell(at, Cell::Empty);
                }
            }
        }
        removed
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
