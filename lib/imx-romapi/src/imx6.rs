// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! i.MX6 silicon identification.
//!
//! The chip revision lives in the anatop (USB analog) block, and even that
//! register moved: the 6SoloLite has it at a different offset than the rest
//! of the family.

use regtable::Mmio;

use crate::RomLayout;

const ANATOP_DIGPROG: u32 = 0x020c_8260;
const ANATOP_DIGPROG_SL: u32 = 0x020c_8280;

const CHIP_6SL: u32 = 0x60;
const CHIP_6DL: u32 = 0x61;
const CHIP_6SX: u32 = 0x62;
const CHIP_6DQ: u32 = 0x63;

/// First 6DQ minor revision (TO1.5) with the newer tables; 6DQP counts too.
const DQ_NEW_MINOR: u32 = 0x05;
/// First 6DL minor revision (TO1.2) with the newer tables.
const DL_NEW_MINOR: u32 = 0x02;

fn chip_type(digprog: u32) -> u32 {
    (digprog >> 16) & 0xff
}

fn minor(digprog: u32) -> u32 {
    digprog & 0xffff
}

/// Classifies the two DIGPROG register values.
pub fn classify(digprog_sl: u32, digprog: u32) -> RomLayout {
    if chip_type(digprog_sl) == CHIP_6SL {
        return RomLayout::Legacy;
    }

    match chip_type(digprog) {
        CHIP_6SX => RomLayout::Unified,
        CHIP_6DQ if minor(digprog) >= DQ_NEW_MINOR => RomLayout::DqlNew,
        CHIP_6DL if minor(digprog) >= DL_NEW_MINOR => RomLayout::DqlNew,
        _ => RomLayout::Legacy,
    }
}

pub(crate) fn detect<M: Mmio + ?Sized>(mmio: &M) -> RomLayout {
    classify(mmio.read32(ANATOP_DIGPROG_SL), mmio.read32(ANATOP_DIGPROG))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regtable::mock::MockRegs;

    #[test]
    fn documented_parts() {
        // (DIGPROG_SL, DIGPROG, expected)
        let cases = [
            (0x0060_0000, 0x0000_0000, RomLayout::Legacy), // 6SL
            (0x0060_0001, 0x0063_0005, RomLayout::Legacy), // SL wins
            (0, 0x0062_0000, RomLayout::Unified),          // 6SX TO1.0
            (0, 0x0062_0101, RomLayout::Unified),          // 6SX TO1.1
            (0, 0x0063_0000, RomLayout::Legacy),           // 6DQ TO1.0
            (0, 0x0063_0002, RomLayout::Legacy),           // 6DQ TO1.2
            (0, 0x0063_0004, RomLayout::Legacy),
            (0, 0x0063_0005, RomLayout::DqlNew),           // 6DQ TO1.5
            (0, 0x0063_0100, RomLayout::DqlNew),           // 6DQP TO1.0
            (0, 0x0061_0000, RomLayout::Legacy),           // 6DL TO1.0
            (0, 0x0061_0001, RomLayout::Legacy),           // 6DL TO1.1
            (0, 0x0061_0002, RomLayout::DqlNew),           // 6DL TO1.2
            (0, 0x0061_0003, RomLayout::DqlNew),
        ];

        for (sl, dp, want) in cases {
            assert_eq!(classify(sl, dp), want, "{sl:#x} {dp:#x}");
        }
    }

    #[test]
    fn unknown_parts_get_the_oldest_tables() {
        for dp in [0x0000_0000, 0x0064_0000, 0x0065_0005, 0xffff_ffff] {
            assert_eq!(classify(0, dp), RomLayout::Legacy, "{dp:#x}");
        }
        // A plausible 6SX/6DQ type in the SL register is not a 6SL.
        assert_eq!(classify(0x0062_0000, 0x0062_0000), RomLayout::Unified);
    }

    #[test]
    fn type_byte_ignores_high_bits() {
        assert_eq!(classify(0xff60_0000, 0), RomLayout::Legacy);
        assert_eq!(classify(0, 0xaa62_0000), RomLayout::Unified);
    }

    #[test]
    fn detect_reads_anatop() {
        let mut regs = MockRegs::new();
        regs.preset(ANATOP_DIGPROG_SL, 0);
        regs.preset(ANATOP_DIGPROG, 0x0063_0005);
        assert_eq!(RomLayout::detect(&regs), RomLayout::DqlNew);
        assert!(regs.writes().is_empty());
    }
}
