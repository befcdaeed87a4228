// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Register access and table-driven register initialization.
//!
//! Everything the plugin does to hardware goes through the [`Mmio`] trait.
//! On the target that's [`Volatile`], which turns each call into exactly one
//! volatile 32-bit access. In host tests it's `mock::MockRegs`, which records
//! what happened so sequences can be checked write by write.
//!
//! Most of bring-up is expressed as [`RegWrite`] tables: ordered lists of
//! (address, value) pairs terminated by [`RegWrite::END`]. Order matters;
//! tables routinely assert a reset, configure, then release it, so [`apply`]
//! never skips, reorders or merges entries.

#![cfg_attr(not(test), no_std)]

#[cfg(any(test, feature = "mock"))]
pub mod mock;

/// Capability to touch memory-mapped registers.
///
/// Addresses are physical and 32-bit, because that's what the i.MX6/7
/// address map is, regardless of what the host running the tests thinks a
/// pointer is.
pub trait Mmio {
    fn read32(&self, addr: u32) -> u32;
    fn write32(&mut self, addr: u32, val: u32);

    fn modify32<F>(&mut self, addr: u32, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let v = self.read32(addr);
        self.write32(addr, f(v));
    }

    fn set_bits32(&mut self, addr: u32, bits: u32) {
        self.modify32(addr, |v| v | bits);
    }

    fn clear_bits32(&mut self, addr: u32, bits: u32) {
        self.modify32(addr, |v| v & !bits);
    }

    /// Spins until every bit in `mask` reads back as set.
    ///
    /// There is deliberately no timeout: this runs before anything could
    /// report a failure, and a board whose PLL or DRAM never answers is dead
    /// no matter how we'd describe it.
    fn wait_set(&self, addr: u32, mask: u32) {
        while self.read32(addr) & mask != mask {
            // spin
        }
    }

    /// Spins until every bit in `mask` reads back as clear. Same caveats as
    /// [`Mmio::wait_set`].
    fn wait_clear(&self, addr: u32, mask: u32) {
        while self.read32(addr) & mask != 0 {
            // spin
        }
    }
}

/// Direct volatile access to the physical address space.
pub struct Volatile {
    _private: (),
}

impl Volatile {
    /// Produces the register capability.
    ///
    /// # Safety
    ///
    /// Every address later passed to this handle is dereferenced as-is. The
    /// caller must only hand it register or memory addresses that are valid
    /// for 32-bit access on the running SoC, and must not hold Rust
    /// references into memory it writes through this handle.
    pub unsafe fn steal() -> Self {
        Self { _private: () }
    }
}

impl Mmio for Volatile {
    #[inline(always)]
    fn read32(&self, addr: u32) -> u32 {
        // Safety: see `Volatile::steal`.
        unsafe { core::ptr::read_volatile(addr as usize as *const u32) }
    }

    #[inline(always)]
    fn write32(&mut self, addr: u32, val: u32) {
        // Safety: see `Volatile::steal`.
        unsafe { core::ptr::write_volatile(addr as usize as *mut u32, val) }
    }
}

/// One entry of an init table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RegWrite {
    pub addr: u32,
    pub val: u32,
}

impl RegWrite {
    /// Table terminator. Nothing lives at address 0 that a table would want
    /// to write (it's boot ROM on both families), so it doubles as the end
    /// marker.
    pub const END: Self = Self { addr: 0, val: 0 };

    pub const fn new(addr: u32, val: u32) -> Self {
        Self { addr, val }
    }

    pub const fn is_end(&self) -> bool {
        self.addr == 0
    }
}

/// Writes every entry of `table` in order, stopping at the first
/// [`RegWrite::END`] (which is not written) or at the end of the slice.
pub fn apply<M: Mmio + ?Sized>(mmio: &mut M, table: &[RegWrite]) {
    for w in table {
        if w.is_end() {
            break;
        }
        mmio.write32(w.addr, w.val);
    }
}

/// Checks that `table` ends in exactly one terminator, with no terminator
/// hiding entries behind it.
///
/// This is a `const fn` so catalogs can assert it at compile time.
pub const fn is_terminated(table: &[RegWrite]) -> bool {
    let mut i = 0;
    while i < table.len() {
        if table[i].is_end() {
            return i + 1 == table.len();
        }
        i += 1;
    }
    false
}
