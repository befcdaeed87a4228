// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Everything the plugin does between the ROM calling it and it returning.
//!
//! The plugin binary is a thin shell around [`run`]: it supplies the real
//! register space, the real ROM and the linker's idea of where the plugin
//! sits, and turns the result into the ROM's return convention.

#![cfg_attr(not(test), no_std)]

pub mod handoff;

use core::fmt::Write;

use drv_imx_board::BoardError;
use drv_imx_uart::Usart;
use imx_romapi::{BootRom, HabStatus};
use regtable::Mmio;
use ringbuf::{ringbuf, ringbuf_entry};

pub use handoff::{
    boot_path, fall_through, load_next_image, BootPath, HandoffError,
    LoadedImage, PluginImage,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Trace {
    None,
    EarlyInit,
    DiagnosticsUp,
    HardwareInitFailed(BoardError),
    Path(BootPath),
    Hab(HabStatus),
    HandoffFailed(HandoffError),
    Loaded(LoadedImage),
}

ringbuf!(Trace, 16, Trace::None);

/// Brings the board up and hands back to the ROM.
///
/// `param_addr` is the address of the ROM's `start` output parameter, which
/// tells us how we were loaded. `locate` produces the ROM services once
/// they're needed; it gets to look at the hardware to figure out which ROM
/// it's talking to.
///
/// Returns the image the ROM should boot next, or `None` if there isn't
/// one: hardware init failed, the next image didn't check out, or we went
/// through the serial loader, which never leaves an image behind for the
/// ROM.
pub fn run<M, R, F>(
    mmio: &mut M,
    locate: F,
    param_addr: u32,
    plugin: &PluginImage,
    version: &str,
) -> Option<LoadedImage>
where
    M: Mmio + ?Sized,
    R: BootRom,
    F: FnOnce(&M) -> R,
{
    drv_imx_board::early_init(mmio);
    ringbuf_entry!(Trace::EarlyInit);

    // The UART is the only thing that could fail to print here, and it
    // can't report that anywhere.
    let _ = write!(
        Usart::init(mmio),
        "\n\niMX boot plugin, version {version}\n"
    );
    ringbuf_entry!(Trace::DiagnosticsUp);

    if let Err(e) = drv_imx_board::init(mmio) {
        ringbuf_entry!(Trace::HardwareInitFailed(e));
        let _ = writeln!(Usart::attach(mmio), "hardware init failed: {e:?}");
        return None;
    }

    let path = boot_path(param_addr);
    ringbuf_entry!(Trace::Path(path));

    let mut rom = locate(&*mmio);
    match path {
        BootPath::Fallback => {
            let status = fall_through(&mut rom);
            ringbuf_entry!(Trace::Hab(status));
            None
        }
        BootPath::ContinueLoad => {
            match load_next_image(mmio, &mut rom, plugin) {
                Ok(img) => {
                    ringbuf_entry!(Trace::Loaded(img));
                    Some(img)
                }
                Err(e) => {
                    ringbuf_entry!(Trace::HandoffFailed(e));
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handoff::tests::{
        loaded_memory, Call, FakeRom, PLUGIN, RELOADED_HEADER,
    };
    use drv_imx_board::DRAM_BASE;
    use regtable::mock::MockRegs;

    fn board() -> MockRegs {
        let mut regs = drv_imx_board::mock::mock_regs();
        drv_imx_uart::mock::install(&mut regs);
        regs
    }

    const FLASH: u32 = 0x0091_7ff0;
    const SERIAL: u32 = 0x0080_0000;

    #[test]
    fn flash_boot_loads_next_image() {
        let mut regs = board();
        loaded_memory(&mut regs);
        let mut rom = FakeRom::new();

        let img = run(&mut regs, |_| &mut rom, FLASH, &PLUGIN, "1.2.3");
        assert_eq!(
            img,
            Some(LoadedImage {
                start: 0x177f_f000,
                bytes: 0x6_0000,
                ivt_offset: 0x400,
            })
        );
        assert!(matches!(rom.calls[..], [Call::HwcnfgSetup(..)]));
        assert_eq!(
            drv_imx_uart::mock::transmitted(&regs),
            "\r\n\r\niMX boot plugin, version 1.2.3\r\n"
        );
    }

    #[test]
    fn serial_boot_goes_back_to_the_loader() {
        let mut regs = board();
        loaded_memory(&mut regs);
        let mut rom = FakeRom::new();

        assert_eq!(run(&mut regs, |_| &mut rom, SERIAL, &PLUGIN, "x"), None);
        assert_eq!(rom.calls, vec![Call::HabRvtEntry, Call::HabFailsafe]);
    }

    #[test]
    fn serial_boot_with_hab_failure() {
        let mut regs = board();
        let mut rom = FakeRom::new();
        rom.hab = HabStatus::Failure;

        assert_eq!(run(&mut regs, |_| &mut rom, SERIAL, &PLUGIN, "x"), None);
        assert_eq!(rom.calls, vec![Call::HabRvtEntry]);
    }

    #[test]
    fn rom_located_after_hardware_init() {
        let mut regs = board();
        loaded_memory(&mut regs);
        let mut rom = FakeRom::new();

        run(
            &mut regs,
            |m| {
                // DRAM is up by the time anyone asks.
                assert_eq!(m.read32(DRAM_BASE), 0x5555_aaaa);
                &mut rom
            },
            FLASH,
            &PLUGIN,
            "x",
        );
    }

    #[test]
    fn hardware_failure_skips_both_paths() {
        for param in [FLASH, SERIAL] {
            let mut regs = board();
            loaded_memory(&mut regs);
            regs.on_write(DRAM_BASE, |_| 0xffff_ffff);
            let mut located = false;

            let img = run(
                &mut regs,
                |_| {
                    located = true;
                    FakeRom::new()
                },
                param,
                &PLUGIN,
                "x",
            );
            assert_eq!(img, None);
            assert!(!located);
            let err = BoardError::DramProbe {
                addr: DRAM_BASE,
                wrote: 0x5555_aaaa,
                read: 0xffff_ffff,
            };
            let note = format!("\r\nhardware init failed: {err:?}\r\n");
            assert!(drv_imx_uart::mock::transmitted(&regs).ends_with(&note));
        }
    }

    #[test]
    fn bad_next_image_reports_nothing_ready() {
        let mut regs = board();
        loaded_memory(&mut regs);
        regs.preset(RELOADED_HEADER, 0);
        let mut rom = FakeRom::new();

        assert_eq!(run(&mut regs, |_| &mut rom, FLASH, &PLUGIN, "x"), None);
        assert_eq!(rom.calls.len(), 1);
    }
}
