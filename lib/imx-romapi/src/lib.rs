// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Access to the i.MX boot ROM's own service routines.
//!
//! The ROM exports a handful of routines through pointer tables at fixed
//! addresses. Which addresses depends on the silicon revision, so the first
//! job is figuring out what we're running on ([`RomLayout::detect`]); the
//! second is calling through the table ([`RomServices`]).
//!
//! The routines are documented in NXP's "High Assurance Boot Version 4
//! Application Programming Interface Reference Manual", shipped with the
//! Code Signing Tool. `hwcnfg_setup` appears there as
//! `hab_loader_callback_f`.

#![cfg_attr(not(test), no_std)]

use imx_ivt::BootData;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use regtable::Mmio;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "imx6", feature = "imx7"))] {
        compile_error!("enable exactly one of the `imx6` and `imx7` features");
    } else if #[cfg(feature = "imx6")] {
        mod imx6;
        use imx6 as silicon;
        pub use imx6::classify;
    } else if #[cfg(feature = "imx7")] {
        mod imx7;
        use imx7 as silicon;
    } else {
        compile_error!("enable exactly one of the `imx6` and `imx7` features");
    }
}

#[repr(u32)]
#[derive(Debug, FromPrimitive, PartialEq, Eq, Clone, Copy)]
pub enum HabStatus {
    Any = 0x00,
    Failure = 0x33,
    Warning = 0x69,
    Success = 0xf0,
    /// Used to encode an unknown return from the ROM, not defined by NXP
    Unknown = 0xff,
}

impl HabStatus {
    pub fn from_rom(ret: u32) -> Self {
        HabStatus::from_u32(ret).unwrap_or(HabStatus::Unknown)
    }
}

/// Addresses of the ROM table slots holding each service routine pointer.
///
/// These are the slots, not the routines: each one holds the routine's
/// address, which is what actually moves between ROM revisions.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RomPtrs {
    pub hwcnfg_setup: u32,
    pub hab_rvt_entry: u32,
    pub hab_failsafe: u32,
}

/// Which generation of ROM pointer tables the running chip has.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RomLayout {
    /// i.MX6SoloX and every i.MX7.
    Unified,
    /// i.MX6SoloLite, 6DQ before TO1.5 and 6DL before TO1.2. This is also
    /// what an unrecognized chip gets: assuming the oldest tables can at
    /// worst fail to load, while assuming newer ones can jump into the weeds.
    #[cfg(feature = "imx6")]
    Legacy,
    /// i.MX6DQ TO1.5 and later, 6DL TO1.2 and later, and all of 6DQP.
    #[cfg(feature = "imx6")]
    DqlNew,
}

impl RomLayout {
    /// Reads the silicon identification registers and classifies them.
    pub fn detect<M: Mmio + ?Sized>(mmio: &M) -> Self {
        silicon::detect(mmio)
    }

    pub const fn ptrs(self) -> &'static RomPtrs {
        match self {
            RomLayout::Unified => &RomPtrs {
                hwcnfg_setup: 0x0000_0180 + 0x08,
                hab_rvt_entry: 0x0000_0100 + 0x04,
                hab_failsafe: 0x0000_0100 + 0x28,
            },
            #[cfg(feature = "imx6")]
            RomLayout::Legacy => &RomPtrs {
                hwcnfg_setup: 0x0000_00c0 + 0x08,
                hab_rvt_entry: 0x0000_0094 + 0x04,
                hab_failsafe: 0x0000_0094 + 0x28,
            },
            #[cfg(feature = "imx6")]
            RomLayout::DqlNew => &RomPtrs {
                hwcnfg_setup: 0x0000_00c4 + 0x08,
                hab_rvt_entry: 0x0000_0098 + 0x04,
                hab_failsafe: 0x0000_0098 + 0x28,
            },
        }
    }
}

/// The ROM services the plugin uses.
///
/// The handoff logic is written against this trait so it can be exercised
/// without a ROM; [`RomServices`] is the real thing.
pub trait BootRom {
    /// Asks the ROM to finish loading the image described by `boot`.
    ///
    /// On entry `start`/`bytes` describe what's already been loaded (the ROM
    /// only ever resumes); on return they describe everything that has been.
    fn hwcnfg_setup(&mut self, start: &mut u32, bytes: &mut u32, boot: &BootData);

    /// HAB entry; must report success before any other HAB call is allowed.
    fn hab_rvt_entry(&mut self) -> HabStatus;

    /// Drops into the ROM's serial download loader.
    fn hab_failsafe(&mut self);
}

impl<T: BootRom + ?Sized> BootRom for &mut T {
    fn hwcnfg_setup(&mut self, start: &mut u32, bytes: &mut u32, boot: &BootData) {
        (**self).hwcnfg_setup(start, bytes, boot)
    }

    fn hab_rvt_entry(&mut self) -> HabStatus {
        (**self).hab_rvt_entry()
    }

    fn hab_failsafe(&mut self) {
        (**self).hab_failsafe()
    }
}

type HwcnfgSetupFn =
    unsafe extern "C" fn(start: *mut u32, bytes: *mut u32, boot: *const BootData);
type HabRvtEntryFn = unsafe extern "C" fn() -> u32;
type HabFailsafeFn = unsafe extern "C" fn();

/// Calls into the boot ROM through its pointer tables.
///
/// This is the only place the plugin jumps to an address it didn't link.
pub struct RomServices {
    ptrs: &'static RomPtrs,
}

impl RomServices {
    /// # Safety
    ///
    /// `layout` must be the one for the chip we're running on, and we must be
    /// running as a ROM plugin (the ROM's state must still be intact).
    pub unsafe fn new(layout: RomLayout) -> Self {
        Self {
            ptrs: layout.ptrs(),
        }
    }

    /// Fetches the routine address stored in a ROM table slot.
    fn slot(addr: u32) -> usize {
        // Safety: the slot addresses are ROM constants for this layout,
        // which `new` made the caller vouch for.
        unsafe { core::ptr::read_volatile(addr as usize as *const usize) }
    }
}

impl BootRom for RomServices {
    fn hwcnfg_setup(&mut self, start: &mut u32, bytes: &mut u32, boot: &BootData) {
        // Safety: the slot holds a ROM routine with this signature; `BootData`
        // matches the ROM's `boot_data` layout on a 32-bit target.
        unsafe {
            let f: HwcnfgSetupFn =
                core::mem::transmute(Self::slot(self.ptrs.hwcnfg_setup));
            f(start, bytes, boot)
        }
    }

    fn hab_rvt_entry(&mut self) -> HabStatus {
        // Safety: as above.
        let ret = unsafe {
            let f: HabRvtEntryFn =
                core::mem::transmute(Self::slot(self.ptrs.hab_rvt_entry));
            f()
        };
        HabStatus::from_rom(ret)
    }

    fn hab_failsafe(&mut self) {
        // Safety: as above.
        unsafe {
            let f: HabFailsafeFn =
                core::mem::transmute(Self::slot(self.ptrs.hab_failsafe));
            f()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hab_status_decoding() {
        assert_eq!(HabStatus::from_rom(0xf0), HabStatus::Success);
        assert_eq!(HabStatus::from_rom(0x33), HabStatus::Failure);
        assert_eq!(HabStatus::from_rom(0x69), HabStatus::Warning);
        assert_eq!(HabStatus::from_rom(0x00), HabStatus::Any);
        assert_eq!(HabStatus::from_rom(0xf1), HabStatus::Unknown);
        assert_eq!(HabStatus::from_rom(0x1_00f0), HabStatus::Unknown);
    }

    #[test]
    fn unified_table() {
        let p = RomLayout::Unified.ptrs();
        assert_eq!(p.hwcnfg_setup, 0x188);
        assert_eq!(p.hab_rvt_entry, 0x104);
        assert_eq!(p.hab_failsafe, 0x128);
    }

    #[cfg(feature = "imx6")]
    #[test]
    fn imx6_tables() {
        let legacy = RomLayout::Legacy.ptrs();
        assert_eq!(
            (legacy.hwcnfg_setup, legacy.hab_rvt_entry, legacy.hab_failsafe),
            (0xc8, 0x98, 0xbc)
        );
        let new = RomLayout::DqlNew.ptrs();
        assert_eq!(
            (new.hwcnfg_setup, new.hab_rvt_entry, new.hab_failsafe),
            (0xcc, 0x9c, 0xc0)
        );
    }
}
