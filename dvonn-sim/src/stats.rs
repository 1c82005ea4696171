//! Playout statistics tracking.

use std::time::Instant;

use crate::playout::GameRecord;

/// Statistics collected across playouts.
#[derive(Debug, Default)]
pub struct PlayoutStats {
    /// Games played (finished or cut off)
    pub games: u64,

    /// Games that ended with both sides passing
    pub finished_games: u64,

    /// Moves applied, all phases
    pub moves: u64,

    /// Jump-phase breakdown
    pub jumps: u64,
    pub passes: u64,

    /// Pieces removed by disconnection
    pub captured: u64,

    /// Tallest stack seen in any game
    pub tallest_stack: u8,

    /// Final pieces on board, split by controller of the stacks
    pub white_pieces: u64,
    pub black_pieces: u64,

    /// For rate calculation
    start_time: Option<Instant>,
    last_log_time: Option<Instant>,
    last_log_games: u64,
}

impl PlayoutStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            last_log_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Fold one game into the totals
    pub fn record_game(&mut self, record: &GameRecord) {
        self.games += 1;
        if record.finished {
            self.finished_games += 1;
        }
        self.moves += record.moves as u64;
        self.jumps += record.jumps as u64;
        self.passes += record.passes as u64;
        self.captured += record.captured as u64;
        self.tallest_stack = self.tallest_stack.max(record.tallest_stack);
        self.white_pieces += record.white_pieces as u64;
        self.black_pieces += record.black_pieces as u64;
    }

    /// Get current games per second
    pub fn games_per_sec(&self) -> f64 {
        if let Some(start) = self.start_time {
            let elapsed = start.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                return self.games as f64 / elapsed;
            }
        }
        0.0
    }

    /// Check if we should log progress
    pub fn should_log(&self, interval_secs: u64) -> bool {
        if let Some(last) = self.last_log_time {
            last.elapsed().as_secs() >= interval_secs
        } else {
            true
        }
    }

    /// Log progress and reset log timer
    pub fn log_progress(&mut self) {
        let now = Instant::now();
        let elapsed_total = self.start_time.map(|s| s.elapsed().as_secs()).unwrap_or(0);

        // Calculate rate since last log
        let rate = if let Some(last) = self.last_log_time {
            let elapsed = last.elapsed().as_secs_f64();
            let games = self.games - self.last_log_games;
            if elapsed > 0.0 {
                games as f64 / elapsed
            } else {
                0.0
            }
        } else {
            self.games_per_sec()
        };

        println!(
            "[{:02}:{:02}:{:02}] games={} finished={} moves={} rate={:.0}/s tallest={}",
            elapsed_total / 3600,
            (elapsed_total % 3600) / 60,
            elapsed_total % 60,
            self.games,
            self.finished_games,
            self.moves,
            rate,
            self.tallest_stack,
        );
        println!(
            "           jumps={} passes={} captured={}",
            self.jumps, self.passes, self.captured
        );

        self.last_log_time = Some(now);
        self.last_log_games = self.games;
    }

    /// Print final summary
    pub fn print_summary(&self) {
        println!("Games played: {}", self.games);
        println!("  - Finished: {}", self.finished_games);
        println!("  - Cut off: {}", self.games - self.finished_games);
        println!("Moves: {}", self.moves);
        println!("  - Jumps: {}", self.jumps);
        println!("  - Passes: {}", self.passes);
        println!("Pieces captured: {}", self.captured);
        println!("Tallest stack: {}", self.tallest_stack);
        println!("Pieces left under White: {}", self.white_pieces);
        println!("Pieces left under Black: {}", self.black_pieces);

        if self.games > 0 {
            println!(
                "Average game length: {:.1} moves",
                self.moves as f64 / self.games as f64
            );
            println!(
                "Average captured per game: {:.1}",
                self.captured as f64 / self.games as f64
            );
        }

        if let Some(start) = self.start_time {
            let elapsed = start.elapsed().as_secs_f64();
            println!("Average rate: {:.0} games/sec", self.games as f64 / elapsed);
        }
    }
}
