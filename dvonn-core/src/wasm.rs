//! WASM bindings for dvonn-core
//!
//! Moves cross the boundary as flat coordinate arrays: `[]` passes,
//! `[rank, file]` places, `[fromRank, fromFile, toRank, toFile]` jumps.

use wasm_bindgen::prelude::*;
use crate::{Cell, Color, Coord, GameState, Move};

/// WASM-friendly wrapper around GameState
#[wasm_bindgen]
pub struct WasmGame {
    inner: GameState,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a game at the initial position
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame { inner: GameState::new() }
    }

    /// Clear the board and restart at move 1
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    #[wasm_bindgen(js_name = moveNumber)]
    pub fn move_number(&self) -> u32 {
        self.inner.move_number()
    }

    /// Side to move: 0 (root placement), 1 (White), or 2 (Black)
    #[wasm_bindgen(js_name = sideToMove)]
    pub fn side_to_move(&self) -> u8 {
        color_code(self.inner.side_to_move())
    }

    /// Check a move given as a coordinate array. Wrong lengths are illegal.
    #[wasm_bindgen(js_name = isLegalMove)]
    pub fn is_legal_move(&self, coords: Vec<i32>) -> bool {
        Move::from_coords(&coords).is_some_and(|mov| self.inner.is_legal_move(mov))
    }

    /// Apply a move given as a coordinate array. Returns true if it was legal.
    #[wasm_bindgen(js_name = applyMove)]
    pub fn apply_move(&mut self, coords: Vec<i32>) -> bool {
        match Move::from_coords(&coords) {
            Some(mov) => self.inner.apply(mov),
            None => false,
        }
    }

    /// Reason a move is illegal, or None if it is legal
    #[wasm_bindgen(js_name = whyIllegal)]
    pub fn why_illegal(&self, coords: Vec<i32>) -> Option<String> {
        match Move::from_coords(&coords) {
            Some(mov) => self.inner.check(mov).err().map(|e| e.to_string()),
            None => Some(format!("expected 0, 2 or 4 coordinates, got {}", coords.len())),
        }
    }

    /// Cell contents for rendering: [] for off-board, [0] for empty,
    /// [height, owner (0 neutral, 1 White, 2 Black), hasRoot (0/1)] for a stack
    pub fn cell(&self, rank: u8, file: u8) -> Vec<u8> {
        match self.inner.cell(Coord::new(rank, file)) {
            Cell::Invalid => vec![],
            Cell::Empty => vec![0],
            Cell::Stack(stack) => vec![
                stack.height,
                color_code(stack.owner),
                stack.has_root as u8,
            ],
        }
    }

    /// Get legal moves as a JSON array of coordinate arrays
    #[wasm_bindgen(js_name = legalMoves)]
    pub fn legal_moves(&self) -> Result<JsValue, JsValue> {
        let moves: Vec<Vec<i32>> = self.inner.legal_moves()
            .into_iter()
            .map(Move::to_coords)
            .collect();
        Ok(serde_wasm_bindgen::to_value(&moves)?)
    }

    /// Clone the game
    #[wasm_bindgen(js_name = clone)]
    pub fn clone_game(&self) -> WasmGame {
        WasmGame { inner: self.inner.clone() }
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}

fn color_code(color: Option<Color>) -> u8 {
    match color {
        None => 0,
        Some(Color::White) => 1,
        Some(Color::Black) => 2,
    }
}
