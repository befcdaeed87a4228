// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! i.MX7 silicon identification. Every i.MX7 ROM so far uses the same
//! tables, so there's nothing to read.

use regtable::Mmio;

use crate::RomLayout;

pub(crate) fn detect<M: Mmio + ?Sized>(_mmio: &M) -> RomLayout {
    RomLayout::Unified
}

#[cfg(test)]
mod tests {
    use super::*;
    use regtable::mock::MockRegs;

    #[test]
    fn always_unified() {
        let mut regs = MockRegs::new();
        regs.preset(0x3036_0800, 0x0072_0001);
        assert_eq!(RomLayout::detect(&regs), RomLayout::Unified);
    }
}
