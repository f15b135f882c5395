//! Parallel negamax with alpha-beta pruning and memoization.
//!
//! Values are always relative to the side to move and confined to
//! {−1, 0, +1}. Every child position is canonicalized before the
//! transposition table is consulted, so color-swapped and mirrored
//! transpositions share one entry. A bounded pool of worker threads
//! fans sibling moves out at shallow depths; a sibling that fails high
//! raises a shared abort flag that cancels the remaining workers.

pub mod pool;
pub mod progress;

pub use progress::VERBOSE_DEPTH;

use crate::board::Pos;
use crate::codec::Codec;
use crate::moves::Move;
use crate::tt::{Table, TpResult};
use pool::WorkerPool;
use progress::{empty_stack, root_result_str, DepthStack, Progress};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;

/// Fixed size of the worker pool.
pub const NUM_THREADS: usize = 8;

/// Deepest node that may fan out to the pool.
pub const PARALLEL_DEPTH: u32 = 4;

/// Shallowest node that may fan out.
pub const PARALLEL_MIN_DEPTH: u32 = 2;

/// Below this depth, a full-window node stays serial: parallel cutoffs
/// only pay off once the window is constrained.
pub const CUT_MIN_DEPTH: u32 = 3;

/// Children searched serially before fanning out, to seed alpha.
const SERIAL_PRELUDE: usize = 2;

pub struct Searcher<'a, T: Table> {
    codec: &'a Codec,
    table: &'a T,
    pool: WorkerPool,
    abort: AtomicBool,
    fanned_out: AtomicBool,
    nodes: AtomicU64,
    progress: Progress,
    parallel: bool,
    checkpoint: Option<Box<dyn Fn() + Send + Sync + 'a>>,
}

impl<'a, T: Table> Searcher<'a, T> {
    pub fn new(codec: &'a Codec, table: &'a T) -> Self {
        Searcher {
            codec,
            table,
            pool: WorkerPool::new(NUM_THREADS),
            abort: AtomicBool::new(false),
            fanned_out: AtomicBool::new(false),
            nodes: AtomicU64::new(0),
            progress: Progress::new(codec.n()),
            parallel: true,
            checkpoint: None,
        }
    }

    /// Disables the worker pool; every node is searched serially.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Callback invoked between root moves, the only point where the
    /// search is guaranteed single-threaded. The driver uses it for
    /// signal-requested table saves.
    pub fn with_checkpoint(mut self, f: impl Fn() + Send + Sync + 'a) -> Self {
        self.checkpoint = Some(Box::new(f));
        self
    }

    pub fn nodes(&self) -> u64 {
        self.nodes.load(Ordering::Relaxed)
    }

    fn fill_pct(&self) -> f64 {
        self.table.size() as f64 / self.table.capacity() as f64 * 100.0
    }

    /// Solves `root` to an exact value for its side to move, printing
    /// progress and per-move results along the way.
    pub fn solve(&self, root: &Pos) -> i8 {
        let n = root.n();
        let mover_is_white = root.side_to_move() == 1;
        let to_white = |v: i8| if mover_is_white { v } else { -v };

        let winner = root.winner();
        if winner != 0 {
            self.progress.final_result(to_white(winner));
            return winner;
        }
        let mut moves = root.legal_moves();
        if moves.is_empty() {
            self.progress.final_result(0);
            return 0;
        }
        if root.is_horiz_symmetric() {
            moves.retain(|m| !m.is_from_right_half(n));
        }

        let mut stack = empty_stack();
        stack[0].num = moves.len() as u16;

        let beta = 1i8;
        let mut alpha = -1i8;
        let mut best = -1i8;
        let mut scratch = *root;
        for (i, &mv) in moves.iter().enumerate() {
            if let Some(checkpoint) = &self.checkpoint {
                checkpoint();
            }
            self.note_move(1, &mut stack, i, mv);
            let m = self
                .try_move(&mut scratch, mv, 1, alpha, beta, &mut stack)
                .expect("root search must not be aborted");
            // under a raised alpha a draw may be known only as a bound
            let exact = !(m == 0 && alpha >= 0);
            self.progress.report_result(
                1,
                &stack,
                self.fill_pct(),
                root_result_str(to_white(m), exact, mover_is_white),
            );
            best = best.max(m);
            if best >= beta {
                break;
            }
            alpha = alpha.max(m);
        }
        self.progress.final_result(to_white(best));
        best
    }

    /// Value of `pos` under an arbitrary window `(alpha, beta)`. The
    /// result is exact whenever the true value lies inside the window,
    /// and a consistent bound otherwise.
    pub fn evaluate(&self, pos: &Pos, alpha: i8, beta: i8) -> i8 {
        assert!(alpha < beta);
        assert!((-1..=1).contains(&alpha) && (-1..=1).contains(&beta));
        let winner = pos.winner();
        if winner != 0 {
            return winner;
        }
        let mut canon = *pos;
        canon.canonize();
        let code = self.codec.encode(&canon);
        let mut stack = empty_stack();
        self.negamax(&canon, code, 2, alpha, beta, &mut stack)
            .expect("window evaluation must not be aborted")
    }

    fn note_move(&self, depth: u32, stack: &mut DepthStack, index: usize, mv: Move) {
        let depth = depth as usize;
        if depth <= VERBOSE_DEPTH {
            stack[depth - 1].cur = (index + 1) as u16;
            stack[depth - 1].mv = Some(mv);
            self.progress.report(depth, stack, self.fill_pct());
        }
    }

    /// Applies `mv` on `scratch`, resolves the child through the
    /// transposition table or recursion, and undoes the move. The
    /// returned value is from the parent's perspective; `None` means the
    /// computation was aborted by a sibling's cutoff.
    fn try_move(
        &self,
        scratch: &mut Pos,
        mv: Move,
        depth: u32,
        alpha: i8,
        beta: i8,
        stack: &mut DepthStack,
    ) -> Option<i8> {
        scratch.do_move(&mv);
        let mut canon = *scratch;
        canon.canonize();
        debug_assert_eq!(canon.side_to_move(), 1);
        let code = self.codec.encode(&canon);

        // the stored kind speaks for the child's mover; flipping it
        // yields bounds on this move's value for the parent
        let (lo, hi) = self.table.probe(code).flip().value_range();
        let m = if lo == hi {
            lo
        } else if lo >= beta {
            // the bound alone fails high
            lo
        } else if hi <= alpha {
            // the bound alone shows this move cannot raise alpha
            hi
        } else {
            match self.negamax(&canon, code, depth + 1, -beta, -alpha, stack) {
                Some(v) => (-v).clamp(lo, hi),
                None => {
                    scratch.undo_move(&mv);
                    return None;
                }
            }
        };
        scratch.undo_move(&mv);
        Some(m)
    }

    /// Core negamax over a canonical position. `code` is the position's
    /// own table key; the computed result is deposited there on the way
    /// out (the root loop in [`Searcher::solve`] is depth 1 and never
    /// enters here, so every caller has a parent to exploit the entry).
    fn negamax(
        &self,
        pos: &Pos,
        code: u64,
        depth: u32,
        alpha0: i8,
        beta: i8,
        stack: &mut DepthStack,
    ) -> Option<i8> {
        if self.abort.load(Ordering::Relaxed) {
            return None;
        }
        self.nodes.fetch_add(1, Ordering::Relaxed);

        let winner = pos.winner();
        if winner != 0 {
            return Some(winner);
        }
        let mut moves = pos.legal_moves();
        if moves.is_empty() {
            // no pawn promoted and no move available: drawn by the
            // pawns-only stalemate convention
            return Some(0);
        }
        if pos.is_horiz_symmetric() {
            let n = pos.n();
            moves.retain(|m| !m.is_from_right_half(n));
        }
        if (depth as usize) <= VERBOSE_DEPTH {
            stack[depth as usize - 1].num = moves.len() as u16;
        }

        let full_window = alpha0 == -1 && beta == 1;
        let may_fan_out = self.parallel
            && (PARALLEL_MIN_DEPTH..=PARALLEL_DEPTH).contains(&depth)
            && (depth >= CUT_MIN_DEPTH || !full_window);

        let mut scratch = *pos;
        let mut alpha = alpha0;
        let mut best = -1i8;
        let mut fan_from = None;

        for (i, &mv) in moves.iter().enumerate() {
            if may_fan_out && i >= SERIAL_PRELUDE && self.claim_fan_out() {
                fan_from = Some(i);
                break;
            }
            self.note_move(depth, stack, i, mv);
            let m = self.try_move(&mut scratch, mv, depth, alpha, beta, stack)?;
            best = best.max(m);
            if best >= beta {
                break;
            }
            alpha = alpha.max(m);
        }

        if let Some(start) = fan_from {
            let (fan_best, saw_abort) = self.fan_out(pos, &moves, start, depth, alpha, beta, stack);
            best = best.max(fan_best);
            // an aborted worker is only legal when a sibling cut the node
            assert!(best >= beta || !saw_abort, "worker aborted without a beta cutoff");
        }

        self.table.add(code, result_kind(best, alpha0, beta));
        Some(best)
    }

    fn claim_fan_out(&self) -> bool {
        self.fanned_out
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
    }

    /// Searches `moves[start..]` on the worker pool with the inherited
    /// window. Returns the best completed value and whether any worker
    /// was aborted.
    fn fan_out(
        &self,
        pos: &Pos,
        moves: &[Move],
        start: usize,
        depth: u32,
        alpha: i8,
        beta: i8,
        stack: &DepthStack,
    ) -> (i8, bool) {
        let results: Vec<Option<i8>> = thread::scope(|s| {
            let mut handles = Vec::with_capacity(moves.len() - start);
            for (i, &mv) in moves.iter().enumerate().skip(start) {
                self.pool.acquire();
                let base_stack = *stack;
                let parent = *pos;
                handles.push(s.spawn(move || {
                    let mut stack = base_stack;
                    self.note_move(depth, &mut stack, i, mv);
                    let mut scratch = parent;
                    let result = self.try_move(&mut scratch, mv, depth, alpha, beta, &mut stack);
                    if matches!(result, Some(m) if m >= beta) {
                        self.abort.store(true, Ordering::Relaxed);
                    }
                    self.pool.release();
                    result
                }));
            }
            handles
                .into_iter()
                .map(|h| h.join().expect("search worker panicked"))
                .collect()
        });
        // clear the flag before releasing the fan-out level so ancestors
        // and the next region start clean
        self.abort.store(false, Ordering::Relaxed);
        self.fanned_out.store(false, Ordering::Release);

        let mut best = -1i8;
        let mut saw_abort = false;
        for result in results {
            match result {
                Some(m) => best = best.max(m),
                None => saw_abort = true,
            }
        }
        (best, saw_abort)
    }
}

/// Result kind deposited for a node searched with window
/// `(alpha0, beta)` that computed `best`.
fn result_kind(best: i8, alpha0: i8, beta: i8) -> TpResult {
    match best {
        -1 => {
            if alpha0 == -1 {
                TpResult::CurrentLoss
            } else {
                debug_assert_eq!(alpha0, 0);
                TpResult::UpperBound0
            }
        }
        1 => {
            if beta == 1 {
                TpResult::CurrentWin
            } else {
                debug_assert_eq!(beta, 0);
                TpResult::LowerBound0
            }
        }
        0 => {
            if alpha0 == -1 && beta == 1 {
                TpResult::Draw
            } else if beta == 0 {
                TpResult::LowerBound0
            } else {
                TpResult::UpperBound0
            }
        }
        _ => unreachable!("search value out of range: {best}"),
    }
}
