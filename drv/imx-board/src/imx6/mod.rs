// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! i.MX6 MMDC bring-up.

pub mod tables;

use regtable::Mmio;

use crate::dram::DramController;

/// Start of the MMDC's address window.
pub const DRAM_BASE: u32 = 0x1000_0000;

/// CCM_ANALOG_PLL_SYS (PLL2, 528 MHz), which clocks the MMDC.
const PLL_SYS: u32 = 0x020c_8030;
const PLL_LOCK: u32 = 1 << 31;

const MMDC_MDSCR: u32 = 0x021b_001c;
const MDSCR_CON_REQ: u32 = 1 << 15;
const MDSCR_CON_ACK: u32 = 1 << 14;

const MMDC_MDMISC: u32 = 0x021b_0018;
const MDMISC_RST: u32 = 1 << 1;

const MMDC_MAPSR: u32 = 0x021b_0404;
/// Automatic power saving on, with the default idle timeouts.
const MAPSR_VALUE: u32 = 0x0001_1006;

const MMDC_MPZQHWCTRL: u32 = 0x021b_0800;
const MPZQHWCTRL_ZQ_HW_FOR: u32 = 1 << 16;

pub struct Mmdc;

impl DramController for Mmdc {
    fn start_pll<M: Mmio + ?Sized>(mmio: &mut M) {
        // The ROM has already programmed PLL2; we only need it settled.
        mmio.wait_set(PLL_SYS, PLL_LOCK);
    }

    fn hold_reset<M: Mmio + ?Sized>(mmio: &mut M) {
        mmio.set_bits32(MMDC_MDMISC, MDMISC_RST);
        mmio.wait_clear(MMDC_MDMISC, MDMISC_RST);

        mmio.write32(MMDC_MDSCR, MDSCR_CON_REQ);
        mmio.wait_set(MMDC_MDSCR, MDSCR_CON_ACK);
    }

    fn configure<M: Mmio + ?Sized>(mmio: &mut M) {
        regtable::apply(mmio, tables::MMDC);
    }

    fn release_reset<M: Mmio + ?Sized>(_mmio: &mut M) {
        // The MMDC has no reset beyond the self-clearing soft reset; it
        // stays out of service until configuration mode is left, which is
        // the last step.
    }

    fn calibrate_zq<M: Mmio + ?Sized>(mmio: &mut M) {
        mmio.set_bits32(MMDC_MPZQHWCTRL, MPZQHWCTRL_ZQ_HW_FOR);
        mmio.wait_clear(MMDC_MPZQHWCTRL, MPZQHWCTRL_ZQ_HW_FOR);
    }

    fn wait_normal<M: Mmio + ?Sized>(mmio: &mut M) {
        mmio.write32(MMDC_MDSCR, 0);
        mmio.wait_clear(MMDC_MDSCR, MDSCR_CON_ACK);
        mmio.write32(MMDC_MAPSR, MAPSR_VALUE);
    }
}

/// Read-back rules that make a [`regtable::mock::MockRegs`] answer the MMDC
/// handshakes the way the silicon does.
#[cfg(any(test, feature = "mock"))]
pub fn mock_regs() -> regtable::mock::MockRegs {
    let mut regs = regtable::mock::MockRegs::new();
    regs.preset(PLL_SYS, PLL_LOCK | 0x2001);
    regs.on_write(MMDC_MDMISC, |v| v & !MDMISC_RST);
    regs.on_write(MMDC_MDSCR, |v| {
        if v & MDSCR_CON_REQ != 0 {
            v | MDSCR_CON_ACK
        } else {
            v & !MDSCR_CON_ACK
        }
    });
    regs.on_write(MMDC_MPZQHWCTRL, |v| v & !MPZQHWCTRL_ZQ_HW_FOR);
    regs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dram;
    use regtable::RegWrite;

    fn entries(table: &[RegWrite]) -> Vec<(u32, u32)> {
        table
            .iter()
            .take_while(|w| !w.is_end())
            .map(|w| (w.addr, w.val))
            .collect()
    }

    #[test]
    fn table_sizes() {
        assert_eq!(entries(tables::CLOCKS).len(), 8);
        assert_eq!(entries(tables::IOMUX).len(), 40);
        assert_eq!(entries(tables::MMDC).len(), 47);
        assert_eq!(entries(tables::FINALIZE).len(), 11);
    }

    #[test]
    fn mmdc_table_leaves_handshakes_to_the_sequencer() {
        let mmdc = entries(tables::MMDC);
        assert!(!mmdc.contains(&(MMDC_MDSCR, MDSCR_CON_REQ)));
        assert!(!mmdc.contains(&(MMDC_MDSCR, 0)));
        assert!(mmdc.iter().all(|&(a, _)| a != MMDC_MAPSR));
    }

    #[test]
    fn bring_up_order() {
        let mut regs = mock_regs();
        dram::bring_up::<Mmdc, _>(&mut regs);

        let reset = regs.position(MMDC_MDMISC, MDMISC_RST).unwrap();
        let con_req = regs.position(MMDC_MDSCR, MDSCR_CON_REQ).unwrap();
        let first_bulk = regs.position(0x021b_081c, 0x3333_3333).unwrap();
        let last_bulk = regs.position(0x021b_48b8, 0x0000_0800).unwrap();
        let zq = regs
            .position(MMDC_MPZQHWCTRL, 0xa138_0003 | MPZQHWCTRL_ZQ_HW_FOR)
            .unwrap();
        let leave = regs.position(MMDC_MDSCR, 0).unwrap();
        let mapsr = regs.position(MMDC_MAPSR, MAPSR_VALUE).unwrap();

        assert!(reset < con_req);
        assert!(con_req < first_bulk);
        assert!(last_bulk < zq);
        assert!(zq < leave);
        assert!(leave < mapsr);
        assert_eq!(mapsr, regs.writes().len() - 1);
    }

    #[test]
    fn whole_mmdc_table_is_written_in_order() {
        let mut regs = mock_regs();
        dram::bring_up::<Mmdc, _>(&mut regs);

        let bulk = entries(tables::MMDC);
        let start = regs.position(bulk[0].0, bulk[0].1).unwrap();
        assert_eq!(&regs.writes()[start..start + bulk.len()], &bulk[..]);
    }

    #[test]
    fn mode_register_writes_all_reach_mdscr() {
        let mut regs = mock_regs();
        dram::bring_up::<Mmdc, _>(&mut regs);

        let mdscr = regs.writes_to(MMDC_MDSCR);
        assert_eq!(mdscr.first(), Some(&MDSCR_CON_REQ));
        assert_eq!(mdscr.last(), Some(&0));
        // CON_REQ, ten commands, then leaving configuration mode.
        assert_eq!(mdscr.len(), 12);
    }

    #[test]
    fn lock_and_zq_are_waited_for_before_moving_on() {
        let mut regs = mock_regs();
        regs.preset(PLL_SYS, 0x2001);
        regs.settle_after(PLL_SYS, 20, PLL_LOCK | 0x2001);
        regs.on_write(MMDC_MPZQHWCTRL, |v| v);
        regs.settle_after(MMDC_MPZQHWCTRL, 20, 0xa138_0003);
        dram::bring_up::<Mmdc, _>(&mut regs);

        // Nothing is written until PLL2 reports lock.
        assert_eq!(regs.settled_at(PLL_SYS), Some(0));

        // Configuration mode is only left once forced ZQ has finished.
        let zq = regs
            .position(MMDC_MPZQHWCTRL, 0xa138_0003 | MPZQHWCTRL_ZQ_HW_FOR)
            .unwrap();
        assert_eq!(regs.settled_at(MMDC_MPZQHWCTRL), Some(zq + 1));
        assert_eq!(regs.writes()[zq + 1], (MMDC_MDSCR, 0));
    }

    #[test]
    #[should_panic(expected = "stuck polling")]
    fn pll2_never_locks() {
        let mut regs = mock_regs();
        regs.preset(PLL_SYS, 0x2001);
        dram::bring_up::<Mmdc, _>(&mut regs);
    }

    #[test]
    #[should_panic(expected = "stuck polling")]
    fn soft_reset_never_clears() {
        let mut regs = mock_regs();
        regs.on_write(MMDC_MDMISC, |v| v);
        dram::bring_up::<Mmdc, _>(&mut regs);
    }

    #[test]
    #[should_panic(expected = "stuck polling")]
    fn con_ack_never_set() {
        let mut regs = mock_regs();
        regs.on_write(MMDC_MDSCR, |v| v & !MDSCR_CON_ACK);
        dram::bring_up::<Mmdc, _>(&mut regs);
    }

    #[test]
    #[should_panic(expected = "stuck polling")]
    fn con_ack_never_clears() {
        let mut regs = mock_regs();
        regs.on_write(MMDC_MDSCR, |v| v | MDSCR_CON_ACK);
        dram::bring_up::<Mmdc, _>(&mut regs);
    }

    #[test]
    #[should_panic(expected = "stuck polling")]
    fn forced_zq_never_finishes() {
        let mut regs = mock_regs();
        regs.on_write(MMDC_MPZQHWCTRL, |v| v);
        dram::bring_up::<Mmdc, _>(&mut regs);
    }
}
