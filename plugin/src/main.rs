// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! i.MX6/i.MX7 boot ROM plugin.
//!
//! The ROM loads this image into OCRAM, calls [`plugin_download`], and
//! depending on what comes back either boots the image we had it load or
//! gives up on this boot device.

#![no_std]
#![no_main]

extern crate panic_halt;

mod header;

use core::ptr::addr_of;

use imx_plugin_startup::PluginImage;
use imx_romapi::{RomLayout, RomServices};
use regtable::Volatile;

include!(concat!(env!("OUT_DIR"), "/consts.rs"));

#[allow(non_upper_case_globals)]
extern "C" {
    static _plugin_end: u8;
    static _plugin_size: u8;
}

/// Called by the boot ROM. Returns 1 with the output parameters describing
/// the next image to boot, or 0 if there isn't one.
///
/// # Safety
///
/// Only the ROM calls this, once, as a plugin, with valid output pointers.
#[no_mangle]
pub unsafe extern "C" fn plugin_download(
    start: *mut u32,
    bytes: *mut u32,
    ivt_offset: *mut u32,
) -> u32 {
    // Safety: we own the machine until we return to the ROM.
    let mut mmio = unsafe { Volatile::steal() };

    // Safety: only the symbols' addresses are taken.
    let plugin = unsafe {
        PluginImage {
            end: addr_of!(_plugin_end) as usize as u32,
            size: addr_of!(_plugin_size) as usize as u32,
        }
    };

    let loaded = imx_plugin_startup::run(
        &mut mmio,
        // Safety: the layout is detected from the chip we're running on.
        |m| unsafe { RomServices::new(RomLayout::detect(m)) },
        start as usize as u32,
        &plugin,
        PLUGIN_VERSION,
    );

    match loaded {
        Some(img) => {
            // Safety: the ROM passed us valid pointers for its results.
            unsafe {
                start.write_volatile(img.start);
                bytes.write_volatile(img.bytes);
                ivt_offset.write_volatile(img.ivt_offset);
            }
            1
        }
        None => 0,
    }
}
