//! Random self-play through the rules engine.
//!
//! Every move is picked uniformly from `legal_moves()` and applied with
//! `try_apply`, and the board is checked after each move. A game ends when
//! both sides pass in a row, or when the move cap is hit.

use anyhow::{ensure, Context, Result};
use rand::Rng;

use dvonn_core::{Color, GameState, Move, Phase, INVALID_SPACES, SPACES};

/// Outcome of a single playout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameRecord {
    pub moves: u32,
    pub jumps: u32,
    pub passes: u32,
    /// Pieces removed by disconnection
    pub captured: u32,
    pub tallest_stack: u8,
    /// Pieces on board at the end, by controller of their stack
    pub white_pieces: u32,
    pub black_pieces: u32,
    /// Both sides passed in a row before the move cap
    pub finished: bool,
}

/// Play one random game from the initial position.
pub fn play_random_game<R: Rng + ?Sized>(rng: &mut R, max_moves: u32) -> Result<GameRecord> {
    let mut state = GameState::new();
    let mut record = GameRecord::default();
    let mut passes_in_a_row = 0;

    while record.moves < max_moves {
        let moves = state.legal_moves();
        ensure!(!moves.is_empty(), "no legal moves at move {}", state.move_number());
        let mov = moves[rng.random_range(0..moves.len())];

        let before = state.pieces_on_board();
        state
            .try_apply(mov)
            .with_context(|| format!("generated move {} rejected at move {}", mov, state.move_number()))?;
        record.moves += 1;

        match mov {
            Move::Place { .. } => {}
            Move::Jump { .. } => {
                passes_in_a_row = 0;
                record.jumps += 1;
                record.captured += before - state.pieces_on_board();
            }
            Move::Pass => {
                passes_in_a_row += 1;
                record.passes += 1;
            }
        }

        check_invariants(&state, record.captured)
            .with_context(|| format!("after {} at move {}", mov, state.move_number() - 1))?;

        if passes_in_a_row == 2 {
            record.finished = true;
            break;
        }
    }

    for (_, stack) in state.stacks() {
        record.tallest_stack = record.tallest_stack.max(stack.height);
        match stack.owner {
            Some(Color::White) => record.white_pieces += stack.height as u32,
            Some(Color::Black) => record.black_pieces += stack.height as u32,
            None => {}
        }
    }

    Ok(record)
}

/// Board invariants that hold after every legal move.
fn check_invariants(state: &GameState, captured: u32) -> Result<()> {
    for space in INVALID_SPACES {
        ensure!(state.cell(space).is_invalid(), "invalid space {} was overwritten", space);
    }

    let on_board = state.pieces_on_board();
    ensure!(
        on_board + state.pieces_to_place() + captured == SPACES,
        "pieces not conserved: {} on board, {} to place, {} captured",
        on_board,
        state.pieces_to_place(),
        captured
    );

    if state.phase() == Phase::Jump {
        let mut pruned = state.clone();
        let removed = pruned.remove_disconnected_stacks();
        ensure!(removed == 0, "{} disconnected pieces left on the board", removed);
    }

    Ok(())
}
