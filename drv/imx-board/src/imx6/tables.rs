// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Init tables for the i.MX6Q SABRE board: 4x MT41J128M16 DDR3 behind the
//! MMDC, 64 bits wide, both chip selects.
//!
//! Addresses are from the i.MX6DQ reference manual; the values come from the
//! board's DDR stress-tester calibration run.

use regtable::RegWrite;
use static_assertions::const_assert;

/// CCM_CCGR0..7: every clock gate on. [`FINALIZE`] trims them back.
pub const CLOCKS: &[RegWrite] = &[
    RegWrite::new(0x020c_4068, 0xffff_ffff),
    RegWrite::new(0x020c_406c, 0xffff_ffff),
    RegWrite::new(0x020c_4070, 0xffff_ffff),
    RegWrite::new(0x020c_4074, 0xffff_ffff),
    RegWrite::new(0x020c_4078, 0xffff_ffff),
    RegWrite::new(0x020c_407c, 0xffff_ffff),
    RegWrite::new(0x020c_4080, 0xffff_ffff),
    RegWrite::new(0x020c_4084, 0xffff_ffff),

    RegWrite::END,
];

pub const IOMUX: &[RegWrite] = &[
    // DRAM pads: DQM, CAS/RAS, SDCLK, reset, SDBA2, ODT, SDQS
    RegWrite::new(0x020e_05a8, 0x0000_0030),
    RegWrite::new(0x020e_05b0, 0x0000_0030),
    RegWrite::new(0x020e_0524, 0x0000_0030),
    RegWrite::new(0x020e_051c, 0x0000_0030),

    RegWrite::new(0x020e_0518, 0x0000_0030),
    RegWrite::new(0x020e_050c, 0x0000_0030),
    RegWrite::new(0x020e_05b8, 0x0000_0030),
    RegWrite::new(0x020e_05c0, 0x0000_0030),

    RegWrite::new(0x020e_05ac, 0x0002_0030),
    RegWrite::new(0x020e_05b4, 0x0002_0030),
    RegWrite::new(0x020e_0528, 0x0002_0030),
    RegWrite::new(0x020e_0520, 0x0002_0030),

    RegWrite::new(0x020e_0514, 0x0002_0030),
    RegWrite::new(0x020e_0510, 0x0002_0030),
    RegWrite::new(0x020e_05bc, 0x0002_0030),
    RegWrite::new(0x020e_05c4, 0x0002_0030),

    RegWrite::new(0x020e_056c, 0x0002_0030),
    RegWrite::new(0x020e_0578, 0x0002_0030),
    RegWrite::new(0x020e_0588, 0x0002_0030),
    RegWrite::new(0x020e_0594, 0x0002_0030),

    RegWrite::new(0x020e_057c, 0x0002_0030),
    RegWrite::new(0x020e_0590, 0x0000_3000),
    RegWrite::new(0x020e_0598, 0x0000_3000),
    RegWrite::new(0x020e_058c, 0x0000_0000),

    RegWrite::new(0x020e_059c, 0x0000_3030),
    RegWrite::new(0x020e_05a0, 0x0000_3030),
    // DRAM pad groups: DQ drive, DDR mode, input type, pull/keeper
    RegWrite::new(0x020e_0784, 0x0000_0030),
    RegWrite::new(0x020e_0788, 0x0000_0030),

    RegWrite::new(0x020e_0794, 0x0000_0030),
    RegWrite::new(0x020e_079c, 0x0000_0030),
    RegWrite::new(0x020e_07a0, 0x0000_0030),
    RegWrite::new(0x020e_07a4, 0x0000_0030),

    RegWrite::new(0x020e_07a8, 0x0000_0030),
    RegWrite::new(0x020e_0748, 0x0000_0030),
    RegWrite::new(0x020e_074c, 0x0000_0030),
    RegWrite::new(0x020e_0750, 0x0002_0000),

    RegWrite::new(0x020e_0758, 0x0000_0000),
    RegWrite::new(0x020e_0774, 0x0002_0000),
    RegWrite::new(0x020e_078c, 0x0000_0030),
    RegWrite::new(0x020e_0798, 0x000c_0000),

    RegWrite::END,
];

/// MMDC and MMDC PHY configuration. The configuration-mode request before
/// it and the return to normal mode after it are done by the sequencer,
/// which also has to wait for the controller's acknowledgements.
pub const MMDC: &[RegWrite] = &[
    RegWrite::new(0x021b_081c, 0x3333_3333),
    RegWrite::new(0x021b_0820, 0x3333_3333),
    RegWrite::new(0x021b_0824, 0x3333_3333),
    RegWrite::new(0x021b_0828, 0x3333_3333),

    RegWrite::new(0x021b_481c, 0x3333_3333),
    RegWrite::new(0x021b_4820, 0x3333_3333),
    RegWrite::new(0x021b_4824, 0x3333_3333),
    RegWrite::new(0x021b_4828, 0x3333_3333),

    // MDMISC: 8 banks, DDR3, write-leveling/WALAT/RALAT settings
    RegWrite::new(0x021b_0018, 0x0008_1740),

    // Timing: MDCFG0..2, MDRWD, MDOR, MDOTC, MDPDC, MDASP, MDCTL
    RegWrite::new(0x021b_000c, 0x555a_7974),
    RegWrite::new(0x021b_0010, 0xdb53_8f64),
    RegWrite::new(0x021b_0014, 0x01ff_00db),
    RegWrite::new(0x021b_002c, 0x0000_26d2),

    RegWrite::new(0x021b_0030, 0x005a_1023),
    RegWrite::new(0x021b_0008, 0x0944_4040),
    RegWrite::new(0x021b_0004, 0x0002_5576),
    RegWrite::new(0x021b_0040, 0x0000_0027),
    RegWrite::new(0x021b_0000, 0x831a_0000),

    // Mode register writes (MR2, MR3, MR1, MR0) to both chip selects
    RegWrite::new(0x021b_001c, 0x0408_8032),
    RegWrite::new(0x021b_001c, 0x0408_803a),
    RegWrite::new(0x021b_001c, 0x0000_8033),
    RegWrite::new(0x021b_001c, 0x0000_803b),
    RegWrite::new(0x021b_001c, 0x0042_8031),
    RegWrite::new(0x021b_001c, 0x0042_8039),
    RegWrite::new(0x021b_001c, 0x1930_8030),
    RegWrite::new(0x021b_001c, 0x1930_8038),

    // ZQ calibration command, then periodic ZQ, refresh and ODT
    RegWrite::new(0x021b_001c, 0x0400_8040),
    RegWrite::new(0x021b_001c, 0x0400_8048),
    RegWrite::new(0x021b_0800, 0xa138_0003),
    RegWrite::new(0x021b_4800, 0xa138_0003),
    RegWrite::new(0x021b_0020, 0x0000_5800),
    RegWrite::new(0x021b_0818, 0x0002_2227),
    RegWrite::new(0x021b_4818, 0x0002_2227),

    // Read DQS gating delays
    RegWrite::new(0x021b_083c, 0x434b_0350),
    RegWrite::new(0x021b_0840, 0x034c_0359),
    RegWrite::new(0x021b_483c, 0x434b_0350),
    RegWrite::new(0x021b_4840, 0x0365_0348),

    // Read delay lines
    RegWrite::new(0x021b_0848, 0x4436_383b),
    RegWrite::new(0x021b_4848, 0x3939_3341),

    // Write delay lines
    RegWrite::new(0x021b_0850, 0x3537_3933),
    RegWrite::new(0x021b_4850, 0x4825_4a36),

    // Write leveling delays
    RegWrite::new(0x021b_080c, 0x001f_001f),
    RegWrite::new(0x021b_0810, 0x001f_001f),
    RegWrite::new(0x021b_480c, 0x0044_0044),
    RegWrite::new(0x021b_4810, 0x0044_0044),

    // MPMUR0: force measure of the delay lines
    RegWrite::new(0x021b_08b8, 0x0000_0800),
    RegWrite::new(0x021b_48b8, 0x0000_0800),

    RegWrite::END,
];

pub const FINALIZE: &[RegWrite] = &[
    // Gate off the clocks CLOCKS opened that nothing downstream needs
    RegWrite::new(0x020c_4068, 0x00c0_3f3f),
    RegWrite::new(0x020c_406c, 0x0030_fc03),
    RegWrite::new(0x020c_4070, 0x0fff_c000),
    RegWrite::new(0x020c_4074, 0x3ff0_0000),
    RegWrite::new(0x020c_4078, 0x00ff_f300),
    RegWrite::new(0x020c_407c, 0x0f00_00c3),
    RegWrite::new(0x020c_4080, 0x0000_03ff),

    // IOMUXC_GPR4: AXI cache enable for VDOA, VPU and IPU
    RegWrite::new(0x020e_0010, 0xf000_00cf),
    // IOMUXC_GPR6/7: IPU QoS, id0 bypass (0xf) and id1 at 7
    RegWrite::new(0x020e_0018, 0x007f_007f),
    RegWrite::new(0x020e_001c, 0x007f_007f),

    // CCM_CCOSR: CKO1 enabled, ahb_clk_root / 8 (16.5 MHz), to scope
    RegWrite::new(0x020c_4060, 0x0000_00fb),

    RegWrite::END,
];

const_assert!(regtable::is_terminated(CLOCKS));
const_assert!(regtable::is_terminated(IOMUX));
const_assert!(regtable::is_terminated(MMDC));
const_assert!(regtable::is_terminated(FINALIZE));
