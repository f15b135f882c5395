//! In-memory concurrent transposition table.

use super::entry::Entry;
use super::result::TpResult;
use super::{Spill, Table};
use anyhow::{ensure, Context, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

/// One sampled slot per this many when estimating occupancy.
const SIZE_SAMPLE_STRIDE: usize = 10_240;

/// Flat, fixed-capacity, open-addressed table with single-probe
/// replacement. Slot index is `code % capacity`; the stored partial key
/// is `code / capacity`, so every non-empty slot reconstructs its exact
/// code. Slots are independent atomic words accessed with relaxed
/// ordering; racing writers may lose a deposit, which costs a
/// recomputation but never correctness.
pub struct MemTable {
    slots: Box<[AtomicU32]>,
    capacity: usize,
}

impl MemTable {
    /// Allocates `capacity` empty slots in one contiguous block. The
    /// construction writes every slot, so the pages are resident before
    /// the search starts.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "table capacity must be nonzero");
        let slots: Box<[AtomicU32]> = (0..capacity).map(|_| AtomicU32::new(0)).collect();
        MemTable { slots, capacity }
    }

    #[inline]
    fn slot_of(&self, code: u64) -> usize {
        (code % self.capacity as u64) as usize
    }

    #[inline]
    fn partial_key(&self, code: u64) -> u64 {
        code / self.capacity as u64
    }

    #[inline]
    fn read(&self, slot: usize) -> Entry {
        Entry::from_raw(self.slots[slot].load(Ordering::Relaxed))
    }

    #[inline]
    fn write(&self, slot: usize, entry: Entry) {
        self.slots[slot].store(entry.raw(), Ordering::Relaxed);
    }

    fn code_of(&self, slot: usize, entry: Entry) -> u64 {
        entry.partial_key() * self.capacity as u64 + slot as u64
    }
}

impl Table for MemTable {
    fn probe(&self, code: u64) -> TpResult {
        let entry = self.read(self.slot_of(code));
        if entry.is_empty() || entry.partial_key() != self.partial_key(code) {
            // an occupied slot for a different code is a miss, not an error
            return TpResult::None;
        }
        entry.kind()
    }

    fn add(&self, code: u64, kind: TpResult) {
        let slot = self.slot_of(code);
        let key = self.partial_key(code);
        if kind.is_exact() {
            // exact supersedes whatever the slot held
            self.write(slot, Entry::new(key, kind));
            return;
        }
        let old = self.read(slot);
        let merged = if !old.is_empty() && old.partial_key() == key {
            kind.merge(old.kind())
        } else {
            kind
        };
        self.write(slot, Entry::new(key, merged));
    }

    fn add_with_spill(&self, code: u64, kind: TpResult) -> Option<Spill> {
        let slot = self.slot_of(code);
        let key = self.partial_key(code);
        let old = self.read(slot);
        if !old.is_empty() && old.partial_key() == key {
            let merged = if kind.is_exact() { kind } else { kind.merge(old.kind()) };
            self.write(slot, Entry::new(key, merged));
            return None;
        }
        self.write(slot, Entry::new(key, kind));
        if old.is_empty() {
            None
        } else {
            Some(Spill {
                code: self.code_of(slot, old),
                kind: old.kind(),
            })
        }
    }

    fn is_empty_slot(&self, code: u64) -> bool {
        self.read(self.slot_of(code)).is_empty()
    }

    fn size(&self) -> usize {
        let stride = if self.capacity < SIZE_SAMPLE_STRIDE { 1 } else { SIZE_SAMPLE_STRIDE };
        let mut count = 0;
        let mut slot = 0;
        while slot < self.capacity {
            if !self.read(slot).is_empty() {
                count += 1;
            }
            slot += stride;
        }
        (count * stride).min(self.capacity)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn save(&self, path: &Path) -> Result<()> {
        log::info!("saving transposition table to {}", path.display());
        let tmp = path.with_extension("tmp");
        {
            let file = File::create(&tmp)
                .with_context(|| format!("cannot create {}", tmp.display()))?;
            let mut out = BufWriter::new(file);
            out.write_all(&(self.capacity as u64).to_le_bytes())
                .context("short write on table header")?;
            for slot in self.slots.iter() {
                out.write_all(&slot.load(Ordering::Relaxed).to_le_bytes())
                    .context("short write on table body")?;
            }
            out.flush().context("cannot flush table dump")?;
        }
        // temp file plus rename keeps the previous dump intact if the
        // write dies halfway
        fs::rename(&tmp, path)
            .with_context(|| format!("cannot move table dump into place at {}", path.display()))?;
        log::info!("transposition table saved");
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<()> {
        log::info!("loading transposition table from {}", path.display());
        let file =
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        let mut input = BufReader::new(file);

        let mut header = [0u8; 8];
        input.read_exact(&mut header).context("short read on table header")?;
        let capacity = u64::from_le_bytes(header);
        ensure!(
            capacity == self.capacity as u64,
            "table dump capacity {capacity} does not match configured capacity {}",
            self.capacity
        );

        let mut word = [0u8; 4];
        for slot in self.slots.iter() {
            input.read_exact(&mut word).context("short read on table body")?;
            slot.store(u32::from_le_bytes(word), Ordering::Relaxed);
        }
        log::info!("transposition table loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256PlusPlus;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn probe_after_add() {
        let table = MemTable::new(1009);
        table.add(12345, TpResult::Draw);
        assert_eq!(table.probe(12345), TpResult::Draw);
        assert!(!table.is_empty_slot(12345));
    }

    #[test]
    fn miss_on_empty_and_on_collision() {
        let table = MemTable::new(1009);
        assert_eq!(table.probe(77), TpResult::None);
        assert!(table.is_empty_slot(77));

        table.add(77, TpResult::CurrentWin);
        // same slot, different code: the occupant is invisible
        assert_eq!(table.probe(77 + 1009), TpResult::None);
    }

    #[test]
    fn collision_overwrites_single_probe() {
        let table = MemTable::new(1009);
        table.add(5, TpResult::CurrentWin);
        table.add(5 + 1009, TpResult::Draw);
        assert_eq!(table.probe(5), TpResult::None);
        assert_eq!(table.probe(5 + 1009), TpResult::Draw);
    }

    #[test]
    fn bound_deposits_merge_for_the_same_code() {
        let table = MemTable::new(1009);
        table.add(42, TpResult::LowerBound0);
        assert_eq!(table.probe(42), TpResult::LowerBound0);
        // the two bounds pinch to an exact draw
        table.add(42, TpResult::UpperBound0);
        assert_eq!(table.probe(42), TpResult::Draw);
        // a redundant bound does not downgrade the exact value
        table.add(42, TpResult::LowerBound0);
        assert_eq!(table.probe(42), TpResult::Draw);
    }

    #[test]
    fn exact_overwrites_bound() {
        let table = MemTable::new(1009);
        table.add(42, TpResult::LowerBound0);
        table.add(42, TpResult::CurrentWin);
        assert_eq!(table.probe(42), TpResult::CurrentWin);
    }

    #[test]
    fn spill_reports_the_displaced_entry() {
        let table = MemTable::new(1009);
        assert!(table.add_with_spill(5, TpResult::CurrentWin).is_none());
        // same code: merge in place, nothing spills
        assert!(table.add_with_spill(5, TpResult::CurrentWin).is_none());

        let spill = table.add_with_spill(5 + 1009, TpResult::Draw).expect("spill");
        assert_eq!(spill.code, 5);
        assert_eq!(spill.kind, TpResult::CurrentWin);
        assert_eq!(table.probe(5 + 1009), TpResult::Draw);
    }

    #[test]
    fn size_estimate_tracks_occupancy() {
        let table = MemTable::new(4096);
        assert_eq!(table.size(), 0);
        for code in 0..1024u64 {
            table.add(code, TpResult::Draw);
        }
        // capacity below the sampling stride: the estimate is exact
        assert_eq!(table.size(), 1024);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.data");

        let table = MemTable::new(509);
        table.add(1, TpResult::CurrentWin);
        table.add(600, TpResult::LowerBound0);
        table.add(77, TpResult::Draw);
        table.save(&path).unwrap();

        let restored = MemTable::new(509);
        restored.load(&path).unwrap();
        for code in [1u64, 600, 77] {
            assert_eq!(restored.probe(code), table.probe(code));
        }
        assert_eq!(restored.probe(2), TpResult::None);
    }

    #[test]
    fn load_refuses_capacity_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.data");
        MemTable::new(509).save(&path).unwrap();

        let err = MemTable::new(1009).load(&path).unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn load_refuses_truncated_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.data");
        fs::write(&path, 509u64.to_le_bytes()).unwrap();

        let err = MemTable::new(509).load(&path).unwrap_err();
        assert!(err.to_string().contains("short read"));
    }

    /// Deterministic kind for a code, so concurrent writers never
    /// contradict each other and torn words are detectable.
    fn kind_for(code: u64) -> TpResult {
        match code % 5 {
            0 => TpResult::CurrentLoss,
            1 => TpResult::Draw,
            2 => TpResult::CurrentWin,
            3 => TpResult::LowerBound0,
            _ => TpResult::UpperBound0,
        }
    }

    #[test]
    fn concurrent_adds_and_probes_stay_consistent() {
        const CAPACITY: usize = 100_003;
        const OPS_PER_THREAD: usize = 100_000;

        let table = MemTable::new(CAPACITY);
        let code_space = (CAPACITY as u64) << 12;
        let bad_probes = AtomicUsize::new(0);

        std::thread::scope(|s| {
            for t in 0..8u64 {
                let table = &table;
                let bad_probes = &bad_probes;
                s.spawn(move || {
                    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1000 + t);
                    for _ in 0..OPS_PER_THREAD {
                        let code = rng.gen_range(0..code_space);
                        table.add(code, kind_for(code));
                        let probe_code = rng.gen_range(0..code_space);
                        let got = table.probe(probe_code);
                        if got != TpResult::None && got != kind_for(probe_code) {
                            bad_probes.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                });
            }
        });
        assert_eq!(bad_probes.load(Ordering::Relaxed), 0);

        // every surviving entry is bitwise something a thread wrote
        for slot in 0..CAPACITY {
            let entry = table.read(slot);
            if !entry.is_empty() {
                let code = table.code_of(slot, entry);
                assert_eq!(entry.kind(), kind_for(code), "torn entry at slot {slot}");
            }
        }
    }
}
