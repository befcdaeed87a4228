// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Simulated register space for host tests.

extern crate std;

use core::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::vec::Vec;

use crate::Mmio;

/// Reads of one address in a row before we decide a poll loop will never
/// finish. Real hardware gets no such courtesy.
const POLL_LIMIT: u32 = 100_000;

/// Maps a written value to what the register reads back as afterwards.
pub type ReadBack = fn(u32) -> u32;

/// A register space that remembers everything.
///
/// Unwritten addresses read as zero unless preset. Every write is logged in
/// order; [`MockRegs::on_write`] can install a read-back rule for an address
/// to model self-clearing bits or request/acknowledge handshakes, so poll
/// loops in the code under test terminate the way they would on silicon.
#[derive(Default)]
pub struct MockRegs {
    values: BTreeMap<u32, u32>,
    written: BTreeMap<u32, u32>,
    writes: Vec<(u32, u32)>,
    rules: BTreeMap<u32, ReadBack>,
    last_read: Cell<(u32, u32)>,
    /// Values that take effect after a number of reads: `(reads left, val)`.
    pending: RefCell<BTreeMap<u32, (u32, u32)>>,
    /// Values that have taken effect, shadowing `values` until written.
    settled: RefCell<BTreeMap<u32, u32>>,
    /// Length of the write log at the moment each pending value took effect.
    settled_at: RefCell<BTreeMap<u32, usize>>,
}

impl MockRegs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets what `addr` reads as, without logging a write.
    pub fn preset(&mut self, addr: u32, val: u32) {
        self.values.insert(addr, val);
    }

    /// Installs a read-back rule applied to every subsequent write of
    /// `addr`.
    pub fn on_write(&mut self, addr: u32, rule: ReadBack) {
        self.rules.insert(addr, rule);
    }

    /// Copies `bytes` into the space as little-endian words starting at
    /// `addr`, the way the ROM would have left an image in memory.
    pub fn load(&mut self, addr: u32, bytes: &[u8]) {
        for (i, chunk) in bytes.chunks(4).enumerate() {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            self.preset(addr + 4 * i as u32, u32::from_le_bytes(word));
        }
    }

    /// Makes `addr` read as `val`, but only after it has been read `reads`
    /// more times. Models a status bit that takes a while to come up, so a
    /// test can tell a poll loop from a single read or none at all.
    pub fn settle_after(&mut self, addr: u32, reads: u32, val: u32) {
        self.pending.get_mut().insert(addr, (reads, val));
    }

    /// How many writes had been logged when the value armed with
    /// [`MockRegs::settle_after`] for `addr` took effect, or `None` if
    /// nothing read `addr` often enough.
    pub fn settled_at(&self, addr: u32) -> Option<usize> {
        self.settled_at.borrow().get(&addr).copied()
    }

    /// Every write, in the order it happened.
    pub fn writes(&self) -> &[(u32, u32)] {
        &self.writes
    }

    /// Every value written to `addr`, in order.
    pub fn writes_to(&self, addr: u32) -> Vec<u32> {
        self.writes
            .iter()
            .filter(|&&(a, _)| a == addr)
            .map(|&(_, v)| v)
            .collect()
    }

    /// Last value written to each address that was written at all.
    pub fn written(&self) -> BTreeMap<u32, u32> {
        self.written.clone()
    }

    /// Position of the first write of `(addr, val)` in the log.
    pub fn position(&self, addr: u32, val: u32) -> Option<usize> {
        self.writes.iter().position(|&w| w == (addr, val))
    }
}

impl Mmio for MockRegs {
    fn read32(&self, addr: u32) -> u32 {
        let (last, count) = self.last_read.get();
        let count = if last == addr { count + 1 } else { 1 };
        if count > POLL_LIMIT {
            panic!("stuck polling {addr:#010x}");
        }
        self.last_read.set((addr, count));

        let mut pending = self.pending.borrow_mut();
        match pending.get(&addr).copied() {
            Some((0, val)) => {
                pending.remove(&addr);
                self.settled.borrow_mut().insert(addr, val);
                self.settled_at.borrow_mut().insert(addr, self.writes.len());
            }
            Some((left, val)) => {
                pending.insert(addr, (left - 1, val));
            }
            None => {}
        }
        drop(pending);

        if let Some(&v) = self.settled.borrow().get(&addr) {
            return v;
        }
        self.values.get(&addr).copied().unwrap_or(0)
    }

    fn write32(&mut self, addr: u32, val: u32) {
        self.writes.push((addr, val));
        self.written.insert(addr, val);
        self.last_read.set((0, 0));
        self.settled.get_mut().remove(&addr);

        let readback = match self.rules.get(&addr) {
            Some(rule) => rule(val),
            None => val,
        };
        self.values.insert(addr, readback);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settles_after_counted_reads() {
        let mut regs = MockRegs::new();
        regs.preset(0x100, 1);
        regs.settle_after(0x100, 3, 0x8000_0001);
        regs.write32(0x200, 5);

        let seen: Vec<u32> = (0..5).map(|_| regs.read32(0x100)).collect();
        assert_eq!(seen, vec![1, 1, 1, 0x8000_0001, 0x8000_0001]);
        assert_eq!(regs.settled_at(0x100), Some(1));
    }

    #[test]
    fn unread_value_never_settles() {
        let mut regs = MockRegs::new();
        regs.settle_after(0x100, 3, 1);
        regs.read32(0x104);
        assert_eq!(regs.settled_at(0x100), None);
    }

    #[test]
    fn write_replaces_settled_value() {
        let mut regs = MockRegs::new();
        regs.settle_after(0x100, 0, 7);
        assert_eq!(regs.read32(0x100), 7);
        regs.write32(0x100, 2);
        assert_eq!(regs.read32(0x100), 2);
    }

    #[test]
    #[should_panic(expected = "stuck polling")]
    fn endless_poll_panics() {
        let regs = MockRegs::new();
        regs.wait_set(0x100, 1);
    }
}
