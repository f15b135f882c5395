//! Legal move generation and ordering.
//!
//! Moves come out in a deterministic heuristic order meant to tighten
//! alpha-beta windows early: the most advanced pawns are scanned first,
//! captures and moves onto unstoppable squares are boosted, and the
//! single best unstoppable destination gets a large bonus.

use crate::board::{Pos, MAX_N};
use crate::moves::{Move, MoveList};

impl Pos {
    /// Whether a pawn of the side to move standing on `sq` could run to
    /// promotion with every square of its front cone empty.
    fn is_unstoppable(&self, sq: usize) -> bool {
        let n = self.n() as usize;
        let nisq = self.num_isq() as i32;
        let file = sq % n;
        let step = self.side_to_move() as i32 * n as i32;
        let mut s2 = sq as i32 + step;
        if file != 0 && file != n - 1 {
            while (0..nisq).contains(&s2) {
                let s = s2 as usize;
                if self.piece_at(s - 1) != 0 || self.piece_at(s) != 0 || self.piece_at(s + 1) != 0 {
                    return false;
                }
                s2 += step;
            }
        } else {
            let inward: i32 = if file == 0 { 1 } else { -1 };
            while (0..nisq).contains(&s2) {
                let s = s2 as usize;
                if self.piece_at(s) != 0 || self.piece_at((s as i32 + inward) as usize) != 0 {
                    return false;
                }
                s2 += step;
            }
        }
        true
    }

    /// All legal moves in heuristic order. Empty when the position is
    /// terminal or the mover has no move (the stalemate case).
    pub fn legal_moves(&self) -> MoveList {
        let mut moves = MoveList::new();
        if self.winner() != 0 {
            return moves;
        }

        let n = self.n() as usize;
        let nisq = self.num_isq();
        let nranks = self.num_ranks();
        let turn = self.side_to_move();

        // most advanced pawns first
        let mut pawns = [0usize; MAX_N as usize];
        let mut num_pawns = 0;
        if turn == 1 {
            for i in (0..nisq).rev() {
                if self.piece_at(i) == 1 {
                    pawns[num_pawns] = i;
                    num_pawns += 1;
                }
            }
        } else {
            for i in 0..nisq {
                if self.piece_at(i) == -1 {
                    pawns[num_pawns] = i;
                    num_pawns += 1;
                }
            }
        }

        let mut best_unstoppable: Option<usize> = None;
        let mut best_unstoppable_rank = -1i32;
        let consider_unstoppable =
            |moves: &MoveList, best: &mut Option<usize>, best_rank: &mut i32, to: usize, rank: i32| {
                if rank > *best_rank && self.is_unstoppable(to) {
                    *best = Some(moves.len());
                    *best_rank = rank;
                }
            };

        let new_move = |from: usize, to: usize, captured: i8, ep_capture_sq: i8, new_ep_file: i8, value: i16| Move {
            from: from as u8,
            to: to as u8,
            captured,
            ep_capture_sq,
            prev_ep_file: self.ep_file(),
            new_ep_file,
            value,
        };

        for &s in &pawns[..num_pawns] {
            let file = s % n;
            let front = (s as i32 + turn as i32 * n as i32) as usize;
            let rank = (if turn == 1 { s / n } else { nranks - 1 - s / n }) as i32;

            if self.piece_at(front) == 0 {
                let value = (2 * rank + 1) as i16;
                consider_unstoppable(&moves, &mut best_unstoppable, &mut best_unstoppable_rank, front, rank + 1);
                moves.push(new_move(s, front, 0, -1, -1, value));

                if n >= 5 && rank == 0 {
                    let front2 = (front as i32 + turn as i32 * n as i32) as usize;
                    if self.piece_at(front2) == 0 {
                        let value = (4 * rank + 4) as i16;
                        consider_unstoppable(
                            &moves,
                            &mut best_unstoppable,
                            &mut best_unstoppable_rank,
                            front2,
                            rank + 2,
                        );
                        moves.push(new_move(s, front2, 0, -1, file as i8, value));
                    }
                }
            }

            let capture_value = (2 * rank + 1) as i16
                + ((nranks as i32 - rank) * (nranks as i32 - rank) + 1) as i16;
            if file != 0 && self.piece_at(front - 1) == -turn {
                consider_unstoppable(&moves, &mut best_unstoppable, &mut best_unstoppable_rank, front - 1, rank + 1);
                moves.push(new_move(s, front - 1, -turn, -1, -1, capture_value));
            }
            if file != n - 1 && self.piece_at(front + 1) == -turn {
                consider_unstoppable(&moves, &mut best_unstoppable, &mut best_unstoppable_rank, front + 1, rank + 1);
                moves.push(new_move(s, front + 1, -turn, -1, -1, capture_value));
            }
        }

        // en-passant captures of the opponent's double push
        if self.ep_file() >= 0 && n >= 5 {
            let ep = self.ep_file() as usize;
            let (pawn_rank, target_rank) = if turn == 1 { (nranks - 3, nranks - 2) } else { (2, 1) };
            let victim = pawn_rank * n + ep;
            let target = target_rank * n + ep;
            if self.piece_at(victim) == -turn && self.piece_at(target) == 0 {
                let rank = (if turn == 1 { pawn_rank } else { nranks - 1 - pawn_rank }) as i32;
                let value = (2 * rank + 1) as i16
                    + ((nranks as i32 - rank) * (nranks as i32 - rank) + 1) as i16;
                for df in [-1i32, 1] {
                    let f = ep as i32 + df;
                    if f < 0 || f >= n as i32 {
                        continue;
                    }
                    let from = pawn_rank * n + f as usize;
                    if self.piece_at(from) == turn {
                        consider_unstoppable(
                            &moves,
                            &mut best_unstoppable,
                            &mut best_unstoppable_rank,
                            target,
                            rank + 1,
                        );
                        moves.push(new_move(from, target, 0, victim as i8, -1, value));
                    }
                }
            }
        }

        if let Some(i) = best_unstoppable {
            moves[i].value += 100 * (2 + best_unstoppable_rank) as i16;
        }

        moves.sort_unstable_by(|a, b| b.value.cmp(&a.value));
        moves
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn initial_moves_4x4_are_captures_only() {
        // every push is blocked, leaving the six diagonal captures
        let moves = Pos::initial(4).legal_moves();
        assert_eq!(moves.len(), 6);
        assert!(moves.iter().all(|m| m.is_capture()));
    }

    #[test]
    fn initial_moves_8x8_include_double_pushes() {
        let moves = Pos::initial(8).legal_moves();
        let singles = moves.iter().filter(|m| m.to == m.from + 8).count();
        let doubles = moves.iter().filter(|m| m.to == m.from + 16).count();
        assert_eq!(singles, 8);
        assert_eq!(doubles, 8);
        assert!(moves.iter().filter(|m| m.to == m.from + 16).all(|m| m.new_ep_file >= 0));
    }

    #[test]
    fn no_double_push_on_4x4() {
        let moves = Pos::initial(4).legal_moves();
        assert!(moves.iter().all(|m| m.new_ep_file == -1));
    }

    #[test]
    fn terminal_position_generates_nothing() {
        let mut pos = Pos::empty(6);
        pos.place(3 * 6 + 2, 1);
        pos.place(8, -1);
        assert_eq!(pos.winner(), 1);
        assert!(pos.legal_moves().is_empty());
    }

    #[test]
    fn ordering_is_deterministic_and_descending() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        for _ in 0..200 {
            let pos = Pos::random(&mut rng, 6);
            let a = pos.legal_moves();
            let b = pos.legal_moves();
            assert_eq!(a, b);
            for w in a.windows(2) {
                assert!(w[0].value >= w[1].value);
            }
        }
    }

    #[test]
    fn en_passant_capture_generated_and_reversible() {
        // black double-pushes c5-c3 past the white pawn on b3; White may
        // capture en passant onto c4
        let n = 6usize;
        let mut pos = Pos::empty(6);
        pos.place(n + 1, 1); // b3
        pos.place(3 * n + 2, -1); // c5
        pos.place(0, 1); // spare white pawn far away
        pos.place(3 * n + 5, -1); // spare black pawn
        pos.set_side_to_move(-1);

        let double = pos
            .legal_moves()
            .into_iter()
            .find(|m| m.from as usize == 3 * n + 2 && m.to as usize == n + 2)
            .expect("double push available");
        assert_eq!(double.new_ep_file, 2);
        pos.do_move(&double);
        assert_eq!(pos.ep_file(), 2);

        let before = pos;
        let ep = pos
            .legal_moves()
            .into_iter()
            .find(|m| m.is_en_passant())
            .expect("en-passant capture available");
        assert_eq!(ep.from as usize, n + 1);
        assert_eq!(ep.to as usize, 2 * n + 2);
        assert_eq!(ep.ep_capture_sq as usize, n + 2);

        pos.do_move(&ep);
        assert_eq!(pos.piece_at(n + 2), 0, "victim removed");
        assert_eq!(pos.piece_at(2 * n + 2), 1);
        assert_eq!(pos.ep_file(), -1);
        pos.undo_move(&ep);
        assert_eq!(pos, before);
    }

    #[test]
    fn en_passant_expires_after_one_ply() {
        let n = 6usize;
        let mut pos = Pos::empty(6);
        pos.place(n + 1, 1);
        pos.place(3 * n + 2, -1);
        pos.place(4, 1);
        pos.place(3 * n + 5, -1);
        pos.set_side_to_move(-1);

        let double = pos
            .legal_moves()
            .into_iter()
            .find(|m| m.to as usize == n + 2)
            .unwrap();
        pos.do_move(&double);

        // White plays something else; the en-passant right disappears
        let quiet = pos
            .legal_moves()
            .into_iter()
            .find(|m| !m.is_en_passant() && m.new_ep_file == -1)
            .unwrap();
        pos.do_move(&quiet);
        assert_eq!(pos.ep_file(), -1);
        let replies = pos.legal_moves();
        assert!(replies.iter().all(|m| !m.is_en_passant()));
    }

    #[test]
    fn do_undo_round_trip_random() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(12);
        for _ in 0..2000 {
            let pos = Pos::random(&mut rng, 6);
            let moves = pos.legal_moves();
            for mv in &moves {
                let mut p = pos;
                p.do_move(mv);
                assert_ne!(p, pos);
                p.undo_move(mv);
                assert_eq!(p, pos, "do/undo altered the position for {}", mv.notation(6));
            }
        }
    }

    #[test]
    fn unstoppable_bonus_prefers_the_clear_runner() {
        // white pawn on b with an empty cone vs. a contested pawn on e
        let n = 8usize;
        let mut pos = Pos::empty(8);
        pos.place(2 * n + 1, 1); // b4, nothing ahead
        pos.place(2 * n + 4, 1); // e4, blocked cone
        pos.place(4 * n + 5, -1); // f6 guards e-file advance
        pos.place(4 * n + 7, -1); // spare
        let moves = pos.legal_moves();
        let best = moves.first().unwrap();
        assert_eq!(best.from as usize, 2 * n + 1);
        assert!(best.value > 100);
    }
}
