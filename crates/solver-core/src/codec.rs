//! Bijective position code.
//!
//! Every (layout, side-to-move, en-passant-file) triple maps to a dense
//! nonnegative integer so the transposition table can be a flat array.
//! Codes are stratified by the pawn-count pair (nw, nb); within a
//! stratum the two pawn sets are ranked independently as k-combinations
//! and the side bit and en-passant file occupy the least significant
//! digits, spreading neighbouring positions across table slots.

use crate::binom::{binom, rank_combination, unrank_combination};
use crate::board::{Pos, MAX_N};

pub struct Codec {
    n: u8,
    num_isq: usize,
    /// `base[i]` is the first code of stratum `i`; the final entry is
    /// one past the whole code space.
    base: Vec<u64>,
}

impl Codec {
    pub fn new(n: u8) -> Self {
        assert!((4..=MAX_N).contains(&n), "board size out of range: {n}");
        let num_isq = n as usize * (n as usize - 2);
        let strata = (n as usize + 1) * (n as usize + 1);
        let ep_span = n as u64 + 1;

        let mut base = Vec::with_capacity(strata);
        base.push(0);
        for nw in 0..=n as usize {
            for nb in 0..=n as usize {
                if nw == 0 && nb == 0 {
                    continue;
                }
                let span = binom(num_isq, nw) * binom(num_isq, nb) * 2 * ep_span;
                base.push(base.last().unwrap() + span);
            }
        }
        debug_assert_eq!(base.len(), strata);
        assert!(base.last().unwrap() >> 62 == 0, "code space exceeds 62 bits");

        Codec { n, num_isq, base }
    }

    #[inline]
    pub fn n(&self) -> u8 {
        self.n
    }

    /// One past the largest code; every encoded position is below this.
    pub fn code_end(&self) -> u64 {
        *self.base.last().unwrap()
    }

    fn stratum_base(&self, nw: usize, nb: usize) -> u64 {
        debug_assert!(nw <= self.n as usize && nb <= self.n as usize);
        debug_assert!(nw != 0 || nb != 0);
        self.base[nw * (self.n as usize + 1) + nb - 1]
    }

    /// Index of the stratum containing `code`.
    fn find(&self, code: u64) -> usize {
        self.base.partition_point(|&b| b <= code) - 1
    }

    pub fn encode(&self, pos: &Pos) -> u64 {
        debug_assert_eq!(pos.n(), self.n);
        let (nw, nb) = pos.counts();
        let (nw, nb) = (nw as usize, nb as usize);

        let mut squares = [0u8; MAX_N as usize];
        let mut p = 0;
        for i in 0..self.num_isq {
            if pos.piece_at(i) == 1 {
                squares[p] = i as u8;
                p += 1;
            }
        }
        let whites_rank = rank_combination(&squares[..nw]);
        p = 0;
        for i in 0..self.num_isq {
            if pos.piece_at(i) == -1 {
                squares[p] = i as u8;
                p += 1;
            }
        }
        let blacks_rank = rank_combination(&squares[..nb]);

        let side_bit = (pos.side_to_move() == -1) as u64;
        let ep_digit = (pos.ep_file() + 1) as u64;
        let mut offset = whites_rank * binom(self.num_isq, nb) + blacks_rank;
        offset = (offset * 2 + side_bit) * (self.n as u64 + 1) + ep_digit;

        let base = self.stratum_base(nw, nb);
        let code = base + offset;
        debug_assert_eq!(
            self.find(code),
            nw * (self.n as usize + 1) + nb - 1,
            "encoded position landed outside its stratum"
        );
        code
    }

    pub fn decode(&self, code: u64) -> Pos {
        assert!(code < self.code_end(), "code out of range: {code}");
        let idx = self.find(code);
        let base = self.base[idx];
        let mut offset = code - base;

        let n1 = self.n as usize + 1;
        let nb = (idx + 1) % n1;
        let nw = (idx + 1) / n1;

        let ep_file = (offset % n1 as u64) as i8 - 1;
        offset /= n1 as u64;
        let side_bit = offset % 2;
        offset /= 2;

        let b = binom(self.num_isq, nb);
        let blacks_rank = offset % b;
        let whites_rank = offset / b;

        let mut pos = Pos::empty(self.n);
        let mut squares = [0u8; MAX_N as usize];
        unrank_combination(&mut squares[..nw], whites_rank);
        for &sq in &squares[..nw] {
            pos.place(sq as usize, 1);
        }
        unrank_combination(&mut squares[..nb], blacks_rank);
        for &sq in &squares[..nb] {
            pos.place(sq as usize, -1);
        }
        pos.set_side_to_move(if side_bit == 1 { -1 } else { 1 });
        pos.set_ep_file(ep_file);
        pos
    }
}
