// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The plugin's own image header.
//!
//! Same layout as [`imx_ivt::FlashHeader`], but holding real pointers so
//! the linker can fill it in.

use core::mem::{offset_of, size_of};
use core::ptr::addr_of;

use imx_ivt::{IvtHeader, BOOT_DATA_OFFSET};
use static_assertions::const_assert_eq;

use crate::plugin_download;

type Entry = unsafe extern "C" fn(*mut u32, *mut u32, *mut u32) -> u32;

/// A value the linker script computes, which Rust can only see as the
/// address of a symbol.
#[repr(transparent)]
pub struct LinkerValue(*const u8);

#[repr(C)]
pub struct Ivt {
    header: IvtHeader,
    entry: Entry,
    reserved1: u32,
    dcd: *const u8,
    boot_data: *const BootData,
    self_ptr: *const Ivt,
    csf: u32,
    reserved2: u32,
}

#[repr(C)]
pub struct BootData {
    start: LinkerValue,
    size: LinkerValue,
    plugin: u32,
}

#[repr(C)]
pub struct FlashHeader {
    ivt: Ivt,
    boot: BootData,
}

// Safety: never written after link time.
unsafe impl Sync for FlashHeader {}

#[cfg(target_pointer_width = "32")]
const_assert_eq!(size_of::<FlashHeader>(), size_of::<imx_ivt::FlashHeader>());
#[cfg(target_pointer_width = "32")]
const_assert_eq!(offset_of!(FlashHeader, boot), BOOT_DATA_OFFSET as usize);

#[allow(non_upper_case_globals)]
extern "C" {
    static _boot_data_start: u8;
    static _boot_data_size: u8;
}

#[used]
#[link_section = ".flash_header"]
pub static HEADER: FlashHeader = FlashHeader {
    ivt: Ivt {
        header: IvtHeader::new(),
        entry: plugin_download,
        reserved1: 0,
        // A plugin does its own device configuration.
        dcd: core::ptr::null(),
        boot_data: addr_of!(HEADER.boot),
        self_ptr: addr_of!(HEADER.ivt),
        csf: 0,
        reserved2: 0,
    },
    boot: BootData {
        // Safety: only the symbols' addresses are taken.
        start: LinkerValue(unsafe { addr_of!(_boot_data_start) }),
        size: LinkerValue(unsafe { addr_of!(_boot_data_size) }),
        plugin: 1,
    },
};
