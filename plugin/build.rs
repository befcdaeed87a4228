// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// Free OCRAM once the ROM has taken what it uses, as (start, end).
const IMX6_OCRAM: (u32, u32) = (0x0090_7000, 0x0093_8000);
const IMX7_OCRAM: (u32, u32) = (0x0091_1000, 0x0092_0000);

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out = PathBuf::from(env::var_os("OUT_DIR").ok_or("no OUT_DIR")?);

    println!("cargo:rerun-if-env-changed=IMX_PLUGIN_VERSION");
    let version = match env::var("IMX_PLUGIN_VERSION") {
        Ok(v) => v,
        Err(_) => env::var("CARGO_PKG_VERSION")?,
    };

    let mut const_file = File::create(out.join("consts.rs"))?;
    writeln!(const_file, "// See build.rs for details")?;
    writeln!(const_file, "pub const PLUGIN_VERSION: &str = {version:?};")?;

    let imx6 = env::var_os("CARGO_FEATURE_IMX6").is_some();
    let imx7 = env::var_os("CARGO_FEATURE_IMX7").is_some();
    let (start, end) = match (imx6, imx7) {
        (true, false) => IMX6_OCRAM,
        (false, true) => IMX7_OCRAM,
        _ => return Err("enable exactly one of `imx6` and `imx7`".into()),
    };

    // The image starts FLASH_OFFSET ahead of the plugin, since the ROM
    // loads from the start of flash; that has to land in free OCRAM too.
    let origin = start + 0x400;

    let template = include_str!("link.x.in");
    let script = template
        .replace("@ORIGIN@", &format!("{origin:#010x}"))
        .replace("@LENGTH@", &format!("{:#x}", end - origin));
    File::create(out.join("link.x"))?.write_all(script.as_bytes())?;

    println!("cargo:rustc-link-search={}", out.display());
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rerun-if-changed=link.x.in");

    Ok(())
}
