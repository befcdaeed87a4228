// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Board bring-up: clocks, pads and DRAM.
//!
//! Exactly one platform is built in, picked by the `imx6` or `imx7` feature.
//! [`early_init`] gets the board far enough along for the debug UART;
//! [`init`] brings up DRAM and checks that it works.

#![cfg_attr(not(test), no_std)]

pub mod dram;

use regtable::Mmio;
use ringbuf::{ringbuf, ringbuf_entry};

cfg_if::cfg_if! {
    if #[cfg(all(feature = "imx6", feature = "imx7"))] {
        compile_error!("enable exactly one of the `imx6` and `imx7` features");
    } else if #[cfg(feature = "imx6")] {
        mod imx6;
        use imx6 as platform;
        type Controller = imx6::Mmdc;
    } else if #[cfg(feature = "imx7")] {
        mod imx7;
        use imx7 as platform;
        type Controller = imx7::Ddrc;
    } else {
        compile_error!("enable exactly one of the `imx6` and `imx7` features");
    }
}

pub use platform::tables;
pub use platform::DRAM_BASE;

/// Simulated hardware for host tests of code that brings up the board.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    /// A register space where PLLs lock, resets finish and every
    /// handshake is answered, so a whole bring-up runs to completion.
    pub use crate::platform::mock_regs;
}

/// Written to, then read back from, the start of DRAM. Two different words
/// at neighbouring addresses, so a floating bus that echoes the last thing
/// driven onto it doesn't pass.
const PROBE_PATTERNS: [u32; 2] = [0x5555_aaaa, 0xa5a5_5a5a];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoardError {
    /// DRAM didn't hold what we wrote.
    DramProbe { addr: u32, wrote: u32, read: u32 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Trace {
    None,
    EarlyInit,
    DramUp,
    ProbeFailed(BoardError),
    Finalized,
}

ringbuf!(Trace, 8, Trace::None);

/// Turns on the clocks and muxes the pads. Runs before anything else.
pub fn early_init<M: Mmio + ?Sized>(mmio: &mut M) {
    regtable::apply(mmio, tables::CLOCKS);
    regtable::apply(mmio, tables::IOMUX);
    ringbuf_entry!(Trace::EarlyInit);
}

/// Brings up DRAM, checks it, then applies the final trims.
///
/// Nothing after a failure is attempted: the board is left as the DRAM
/// sequence left it.
pub fn init<M: Mmio + ?Sized>(mmio: &mut M) -> Result<(), BoardError> {
    dram::bring_up::<Controller, M>(mmio);
    ringbuf_entry!(Trace::DramUp);

    if let Err(e) = probe(mmio, DRAM_BASE) {
        ringbuf_entry!(Trace::ProbeFailed(e));
        return Err(e);
    }

    regtable::apply(mmio, tables::FINALIZE);
    ringbuf_entry!(Trace::Finalized);
    Ok(())
}

fn probe<M: Mmio + ?Sized>(mmio: &mut M, base: u32) -> Result<(), BoardError> {
    for (i, &p) in PROBE_PATTERNS.iter().enumerate() {
        mmio.write32(base + 4 * i as u32, p);
    }
    for (i, &wrote) in PROBE_PATTERNS.iter().enumerate() {
        let addr = base + 4 * i as u32;
        let read = mmio.read32(addr);
        if read != wrote {
            return Err(BoardError::DramProbe { addr, wrote, read });
        }
    }
    Ok(())
}
