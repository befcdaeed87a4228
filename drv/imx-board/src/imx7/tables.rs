// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Init tables for the i.MX7D SABRE board: 1 GiB of DDR3L on the DDRC,
//! 32 bits wide.

use regtable::RegWrite;
use static_assertions::const_assert;

/// Anatop DDR retention control: clear, then set, bit 30 so the DDR pads
/// leave retention. A wake from suspend leaves them latched otherwise.
pub const CLOCKS: &[RegWrite] = &[
    RegWrite::new(0x3036_0388, 0x4000_0000),
    RegWrite::new(0x3036_0384, 0x4000_0000),

    RegWrite::END,
];

pub const IOMUX: &[RegWrite] = &[
    // IOMUXC_GPR1: IRQ/DDR-related GPR bits as the board expects them
    RegWrite::new(0x3034_0004, 0x4f40_0005),

    RegWrite::END,
];

/// Written while the DDRC core is held in reset.
pub const DDRC: &[RegWrite] = &[
    // MSTR: DDR3, full bus width, one rank
    RegWrite::new(0x307a_0000, 0x0104_0001),
    // DFIUPD0..2
    RegWrite::new(0x307a_01a0, 0x8040_0003),
    RegWrite::new(0x307a_01a4, 0x0010_0020),
    RegWrite::new(0x307a_01a8, 0x8010_0004),
    // RFSHTMG
    RegWrite::new(0x307a_0064, 0x0040_0046),
    // MP_PCTRL_0: port 0 enable
    RegWrite::new(0x307a_0490, 0x0000_0001),

    // INIT0, INIT1, INIT3..5
    RegWrite::new(0x307a_00d0, 0x0002_0083),
    RegWrite::new(0x307a_00d4, 0x0069_0000),
    RegWrite::new(0x307a_00dc, 0x0930_0004),
    RegWrite::new(0x307a_00e0, 0x0408_0000),
    RegWrite::new(0x307a_00e4, 0x0010_0004),
    // RANKCTL
    RegWrite::new(0x307a_00f4, 0x0000_033f),

    // DRAMTMG0..4, DRAMTMG8
    RegWrite::new(0x307a_0100, 0x0908_1109),
    RegWrite::new(0x307a_0104, 0x0007_020d),
    RegWrite::new(0x307a_0108, 0x0304_0407),
    RegWrite::new(0x307a_010c, 0x0000_2006),
    RegWrite::new(0x307a_0110, 0x0402_0205),
    RegWrite::new(0x307a_0114, 0x0303_0202),
    RegWrite::new(0x307a_0120, 0x0000_0803),

    // ZQCTL0, ZQCTL1
    RegWrite::new(0x307a_0180, 0x0080_0020),
    RegWrite::new(0x307a_0184, 0x0200_0100),
    // DFITMG0, DFITMG1
    RegWrite::new(0x307a_0190, 0x0209_8204),
    RegWrite::new(0x307a_0194, 0x0003_0303),

    // ADDRMAP0, 1, 5, 6
    RegWrite::new(0x307a_0200, 0x0000_0016),
    RegWrite::new(0x307a_0204, 0x0017_1717),
    RegWrite::new(0x307a_0214, 0x0404_0404),
    RegWrite::new(0x307a_0218, 0x0f04_0404),
    // ODTCFG, ODTMAP
    RegWrite::new(0x307a_0240, 0x0600_0604),
    RegWrite::new(0x307a_0244, 0x0000_0001),

    RegWrite::END,
];

/// Written once the DDRC is out of reset.
pub const DDR_PHY: &[RegWrite] = &[
    // PHY_CON0, PHY_CON1, PHY_CON4
    RegWrite::new(0x3079_0000, 0x1742_0f40),
    RegWrite::new(0x3079_0004, 0x1021_0100),
    RegWrite::new(0x3079_0010, 0x0006_0807),
    // MDLL_CON0, DRVDS_CON0
    RegWrite::new(0x3079_00b0, 0x1010_007e),
    RegWrite::new(0x3079_009c, 0x0000_0d6e),

    // OFFSET_RD_CON0, OFFSET_WR_CON0
    RegWrite::new(0x3079_0020, 0x0808_0808),
    RegWrite::new(0x3079_0030, 0x0808_0808),
    // CMD_SDLL_CON0: resync the command delay line, then let it run
    RegWrite::new(0x3079_0050, 0x0100_0010),
    RegWrite::new(0x3079_0050, 0x0000_0010),

    RegWrite::END,
];

/// Nothing left to trim on this board once DRAM is up.
pub const FINALIZE: &[RegWrite] = &[RegWrite::END];

const_assert!(regtable::is_terminated(CLOCKS));
const_assert!(regtable::is_terminated(IOMUX));
const_assert!(regtable::is_terminated(DDRC));
const_assert!(regtable::is_terminated(DDR_PHY));
const_assert!(regtable::is_terminated(FINALIZE));
