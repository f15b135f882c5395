//! Pawns-only chess endgame solver core.
//!
//! Computes the game-theoretic value (White win, draw, Black win) of
//! pawns-only positions on an N×N board under perfect play:
//!
//! - a bijective codec packing every position into a dense integer
//! - a huge bit-packed, lock-free transposition table for memoization
//! - parallel negamax with alpha-beta pruning over canonicalized
//!   positions

pub mod binom;
pub mod board;
pub mod codec;
mod movegen;
pub mod moves;
pub mod search;
pub mod tt;

pub use board::{sq_name, CanonFlags, Pos, MAX_ISQ, MAX_N};
pub use codec::Codec;
pub use moves::{Move, MoveList};
pub use search::Searcher;
pub use tt::{key_fits, CachedTable, MemTable, Spill, Table, TpResult};
