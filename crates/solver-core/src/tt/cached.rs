//! Chained transposition table: a small fast front backed by a larger
//! store. Entries displaced from the front are demoted to the backing
//! table instead of being dropped; backing hits are promoted forward.

use super::result::TpResult;
use super::{Spill, Table};
use anyhow::{bail, Result};
use std::path::Path;

pub struct CachedTable<F: Table, B: Table> {
    front: F,
    backing: B,
}

impl<F: Table, B: Table> CachedTable<F, B> {
    pub fn new(front: F, backing: B) -> Self {
        CachedTable { front, backing }
    }

    pub fn front(&self) -> &F {
        &self.front
    }

    pub fn backing(&self) -> &B {
        &self.backing
    }
}

impl<F: Table, B: Table> Table for CachedTable<F, B> {
    fn probe(&self, code: u64) -> TpResult {
        let kind = self.front.probe(code);
        if !kind.is_none() {
            return kind;
        }
        let kind = self.backing.probe(code);
        if !kind.is_none() {
            // promote; whatever this displaces from the front is demoted
            self.add(code, kind);
        }
        kind
    }

    fn add(&self, code: u64, kind: TpResult) {
        if let Some(spill) = self.front.add_with_spill(code, kind) {
            self.backing.add(spill.code, spill.kind);
        }
    }

    fn add_with_spill(&self, code: u64, kind: TpResult) -> Option<Spill> {
        match self.front.add_with_spill(code, kind) {
            Some(spill) => self.backing.add_with_spill(spill.code, spill.kind),
            None => None,
        }
    }

    fn is_empty_slot(&self, code: u64) -> bool {
        self.front.is_empty_slot(code) && self.backing.is_empty_slot(code)
    }

    fn size(&self) -> usize {
        self.front.size() + self.backing.size()
    }

    fn capacity(&self) -> usize {
        self.front.capacity() + self.backing.capacity()
    }

    fn save(&self, _path: &Path) -> Result<()> {
        bail!("persistence is not supported for chained transposition tables");
    }

    fn load(&self, _path: &Path) -> Result<()> {
        bail!("persistence is not supported for chained transposition tables");
    }
}
