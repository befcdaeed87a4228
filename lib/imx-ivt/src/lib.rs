// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! i.MX image vector table (IVT) and boot data layout.
//!
//! The boot ROM looks for an IVT at [`FLASH_OFFSET`] into the boot device.
//! The IVT points at a boot data record saying where to copy the image and
//! how much of it to copy, and at itself, which is how the ROM works out
//! where in memory the header ended up. Images built for i.MX (U-Boot, and
//! this plugin) put the boot data directly behind the IVT; that pairing is
//! [`FlashHeader`].
//!
//! All addresses are 32-bit target addresses. The byte layout here is fixed
//! by the ROM and checked at compile time.

#![cfg_attr(not(test), no_std)]

use core::mem::{offset_of, size_of};

use regtable::Mmio;
use static_assertions::const_assert_eq;
use zerocopy::{FromZeros, IntoBytes};

/// Offset of the IVT from the start of the boot device.
pub const FLASH_OFFSET: u32 = 0x400;

pub const IVT_TAG: u8 = 0xD1;
pub const IVT_VERSION: u8 = 0x40;

#[derive(
    Copy,
    Clone,
    Debug,
    Eq,
    PartialEq,
    zerocopy_derive::FromBytes,
    zerocopy_derive::IntoBytes,
    zerocopy_derive::KnownLayout,
    zerocopy_derive::Immutable,
)]
#[repr(C)]
pub struct IvtHeader {
    pub tag: u8,
    /// Big endian, unlike everything else in here.
    pub length: [u8; 2],
    pub version: u8,
}

impl IvtHeader {
    pub const fn new() -> Self {
        Self {
            tag: IVT_TAG,
            length: (size_of::<Ivt>() as u16).to_be_bytes(),
            version: IVT_VERSION,
        }
    }

    pub fn length(&self) -> u16 {
        u16::from_be_bytes(self.length)
    }
}

impl Default for IvtHeader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    zerocopy_derive::FromBytes,
    zerocopy_derive::IntoBytes,
    zerocopy_derive::KnownLayout,
    zerocopy_derive::Immutable,
)]
#[repr(C)]
pub struct Ivt {
    pub header: IvtHeader,
    pub entry: u32,
    pub reserved1: u32,
    /// Device configuration data; unused by images that carry a plugin.
    pub dcd: u32,
    pub boot_data: u32,
    pub self_ptr: u32,
    /// Command sequence file for HAB; zero when unsigned.
    pub csf: u32,
    pub reserved2: u32,
}

#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    zerocopy_derive::FromBytes,
    zerocopy_derive::IntoBytes,
    zerocopy_derive::KnownLayout,
    zerocopy_derive::Immutable,
)]
#[repr(C)]
pub struct BootData {
    /// Where byte 0 of the boot device lands in memory.
    pub start: u32,
    /// How many bytes, from byte 0 of the boot device, to load.
    pub size: u32,
    /// Non-zero if the image is a plugin the ROM should call and return from.
    pub plugin: u32,
}

#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    zerocopy_derive::FromBytes,
    zerocopy_derive::IntoBytes,
    zerocopy_derive::KnownLayout,
    zerocopy_derive::Immutable,
)]
#[repr(C)]
pub struct FlashHeader {
    pub ivt: Ivt,
    pub boot: BootData,
}

/// Distance from the IVT's self pointer to its boot data pointer in a
/// well-formed [`FlashHeader`].
pub const BOOT_DATA_OFFSET: u32 = offset_of!(FlashHeader, boot) as u32;

const_assert_eq!(size_of::<IvtHeader>(), 4);
const_assert_eq!(size_of::<Ivt>(), 32);
const_assert_eq!(size_of::<BootData>(), 12);
const_assert_eq!(size_of::<FlashHeader>(), 44);
const_assert_eq!(BOOT_DATA_OFFSET, 32);

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HeaderError {
    /// First byte wasn't [`IVT_TAG`]; there's no image here.
    BadTag(u8),
    /// The boot data isn't where [`FlashHeader`] puts it, so we can't trust
    /// `boot` to describe this image.
    BootDataMisplaced { offset: u32 },
}

impl FlashHeader {
    /// Reads a header out of memory at `addr`, one word at a time.
    pub fn read<M: Mmio + ?Sized>(mmio: &M, addr: u32) -> Self {
        let mut h = Self::new_zeroed();
        for (i, word) in h.as_mut_bytes().chunks_exact_mut(4).enumerate() {
            let v = mmio.read32(addr + 4 * i as u32);
            word.copy_from_slice(&v.to_le_bytes());
        }
        h
    }

    /// Checks the two things the ROM's own loader relies on: the tag, and
    /// the boot data sitting right behind the IVT.
    pub fn validate(&self) -> Result<(), HeaderError> {
        if self.ivt.header.tag != IVT_TAG {
            return Err(HeaderError::BadTag(self.ivt.header.tag));
        }

        let offset = self.ivt.boot_data.wrapping_sub(self.ivt.self_ptr);
        if offset != BOOT_DATA_OFFSET {
            return Err(HeaderError::BootDataMisplaced { offset });
        }

        Ok(())
    }
}
