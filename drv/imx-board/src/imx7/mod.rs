// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! i.MX7 DDRC and DDR PHY bring-up.

pub mod tables;

use regtable::Mmio;

use crate::dram::DramController;

pub const DRAM_BASE: u32 = 0x8000_0000;

/// CCM_ANALOG_PLL_DDR and its spread-spectrum register.
const PLL_DDR: u32 = 0x3036_0070;
const PLL_DDR_SS: u32 = 0x3036_0090;
const PLL_LOCK: u32 = 1 << 31;
/// 1066 MHz, powered down and bypassed while the divider settles.
const PLL_DDR_CONFIG_BYPASS: u32 = 0x0070_3021;
const PLL_DDR_CONFIG: u32 = 0x0060_3021;

/// SRC_DDRC_RCR
const SRC_DDRC_RCR: u32 = 0x3039_1000;
const DDRC_CORE_RST: u32 = 1 << 1;

const DDR_PHY_ZQ_CON0: u32 = 0x3079_00c0;
const DDR_PHY_ZQ_CON1: u32 = 0x3079_00c4;
const ZQ_DONE: u32 = 1 << 0;
/// ZQ_CON0 values: idle, manual mode selected, then the start bit.
const ZQ_IDLE: u32 = 0x0e40_7304;
const ZQ_MANUAL: u32 = 0x0e44_7304;
const ZQ_START: u32 = 0x0e44_7306;

const CCM_CCGR_DRAM: u32 = 0x3038_4130;
const IOMUXC_GPR8: u32 = 0x3034_0020;
/// DDR PHY control via GPR8: drive strength and ODT for the DDR3L pads.
const GPR8_PHY: u32 = 0x0000_0178;
const DDR_PHY_LP_CON0: u32 = 0x3079_0018;

const DDRC_STAT: u32 = 0x307a_0004;
const STAT_NORMAL: u32 = 1 << 0;

pub struct Ddrc;

impl DramController for Ddrc {
    fn start_pll<M: Mmio + ?Sized>(mmio: &mut M) {
        mmio.write32(PLL_DDR, PLL_DDR_CONFIG_BYPASS);
        mmio.write32(PLL_DDR_SS, 0);
        mmio.write32(PLL_DDR, PLL_DDR_CONFIG);
        mmio.wait_set(PLL_DDR, PLL_LOCK);
    }

    fn hold_reset<M: Mmio + ?Sized>(mmio: &mut M) {
        mmio.write32(SRC_DDRC_RCR, DDRC_CORE_RST);
    }

    fn configure<M: Mmio + ?Sized>(mmio: &mut M) {
        regtable::apply(mmio, tables::DDRC);
    }

    fn release_reset<M: Mmio + ?Sized>(mmio: &mut M) {
        mmio.write32(SRC_DDRC_RCR, 0);
        // The PHY is only reachable with the DDRC out of reset.
        regtable::apply(mmio, tables::DDR_PHY);
    }

    fn calibrate_zq<M: Mmio + ?Sized>(mmio: &mut M) {
        mmio.write32(DDR_PHY_ZQ_CON0, ZQ_IDLE);
        mmio.write32(DDR_PHY_ZQ_CON0, ZQ_MANUAL);
        mmio.write32(DDR_PHY_ZQ_CON0, ZQ_START);
        mmio.wait_set(DDR_PHY_ZQ_CON1, ZQ_DONE);
        mmio.write32(DDR_PHY_ZQ_CON0, ZQ_MANUAL);
        mmio.write32(DDR_PHY_ZQ_CON0, ZQ_IDLE);
    }

    fn wait_normal<M: Mmio + ?Sized>(mmio: &mut M) {
        // GPR8 may only change with the DRAM clock gated.
        mmio.write32(CCM_CCGR_DRAM, 0);
        mmio.write32(IOMUXC_GPR8, GPR8_PHY);
        mmio.write32(CCM_CCGR_DRAM, 2);
        mmio.write32(DDR_PHY_LP_CON0, 0xf);
        mmio.wait_set(DDRC_STAT, STAT_NORMAL);
    }
}

#[cfg(any(test, feature = "mock"))]
pub fn mock_regs() -> regtable::mock::MockRegs {
    let mut regs = regtable::mock::MockRegs::new();
    regs.on_write(PLL_DDR, |v| v | PLL_LOCK);
    // Calibration and mode change are both instant here.
    regs.preset(DDR_PHY_ZQ_CON1, ZQ_DONE);
    regs.preset(DDRC_STAT, STAT_NORMAL);
    regs
}
