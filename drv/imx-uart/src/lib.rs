// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transmit-only driver for UART1, used for the plugin's diagnostics.
//!
//! Nothing is ever received: the RX pad is muxed only because the UART
//! refuses to run sensibly with its input floating.

#![cfg_attr(not(test), no_std)]

pub use embedded_hal::serial::Write;
use regtable::Mmio;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "imx6", feature = "imx7"))] {
        compile_error!("enable exactly one of the `imx6` and `imx7` features");
    } else if #[cfg(feature = "imx6")] {
        const UART_BASE: u32 = 0x0202_0000;
        /// PLL3 / 6, as the ROM leaves it.
        const UART_CLOCK: u32 = 80_000_000;

        const IOMUXC_SW_MUX_CTL_PAD_CSI0_DATA10: u32 = 0x020e_0280;
        const IOMUXC_SW_MUX_CTL_PAD_CSI0_DATA11: u32 = 0x020e_0284;
        const IOMUXC_UART1_RXD_SELECT_INPUT: u32 = 0x020e_0920;

        fn route_pins<M: Mmio + ?Sized>(mmio: &mut M) {
            // ALT3 on both pads is UART1 TX/RX.
            mmio.write32(IOMUXC_SW_MUX_CTL_PAD_CSI0_DATA10, 0x3);
            mmio.write32(IOMUXC_SW_MUX_CTL_PAD_CSI0_DATA11, 0x3);
            mmio.write32(IOMUXC_UART1_RXD_SELECT_INPUT, 0x1);
        }
    } else if #[cfg(feature = "imx7")] {
        const UART_BASE: u32 = 0x3086_0000;
        /// 24 MHz oscillator, selected as the clock root below.
        const UART_CLOCK: u32 = 24_000_000;

        const IOMUXC_SW_MUX_CTL_PAD_UART1_RX_DATA: u32 = 0x3033_0128;
        const IOMUXC_SW_MUX_CTL_PAD_UART1_TX_DATA: u32 = 0x3033_012c;
        const CCM_CCGR_UART1: u32 = 0x3038_4940;
        const CCM_TARGET_ROOT_UART1: u32 = 0x3038_af80;

        fn route_pins<M: Mmio + ?Sized>(mmio: &mut M) {
            mmio.write32(IOMUXC_SW_MUX_CTL_PAD_UART1_RX_DATA, 0);
            mmio.write32(IOMUXC_SW_MUX_CTL_PAD_UART1_TX_DATA, 0);

            // The clock root may only be changed with the gate closed.
            mmio.write32(CCM_CCGR_UART1, 0);
            mmio.write32(CCM_TARGET_ROOT_UART1, 0x1000_0000);
            mmio.write32(CCM_CCGR_UART1, 3);
        }
    } else {
        compile_error!("enable exactly one of the `imx6` and `imx7` features");
    }
}

pub const BAUD: u32 = 115_200;

const UTXD: u32 = UART_BASE + 0x40;
const UCR1: u32 = UART_BASE + 0x80;
const UCR2: u32 = UART_BASE + 0x84;
const UCR3: u32 = UART_BASE + 0x88;
const UFCR: u32 = UART_BASE + 0x90;
const UBIR: u32 = UART_BASE + 0xa4;
const UBMR: u32 = UART_BASE + 0xa8;
const UTS: u32 = UART_BASE + 0xb4;

const UCR1_UARTEN: u32 = 1 << 0;

const UCR2_SRST: u32 = 1 << 0;
const UCR2_RXEN: u32 = 1 << 1;
const UCR2_TXEN: u32 = 1 << 2;
const UCR2_WS: u32 = 1 << 5;
const UCR2_IRTS: u32 = 1 << 14;

const UCR3_RXDMUXSEL: u32 = 1 << 2;
const UCR3_ADNIMP: u32 = 1 << 7;

const UFCR_RXTL_SHIFT: u32 = 0;
const UFCR_RFDIV_SHIFT: u32 = 7;
const UFCR_TXTL_SHIFT: u32 = 10;

const RXTL: u32 = 1;
/// Encodes "divide by 2".
const RFDIV: u32 = 4;
const TXTL: u32 = 2;

const UTS_TXEMPTY: u32 = 1 << 6;

/// The reference clock runs at half the module clock (RFDIV) and UBIR is
/// 15, so the 16x oversampled rate works out to `clock / (2 * baud)`.
const UBMR_VALUE: u32 = UART_CLOCK / (2 * BAUD);

#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Error {}

pub struct Usart<'a, M: Mmio + ?Sized> {
    mmio: &'a mut M,
}

impl<'a, M: Mmio + ?Sized> Usart<'a, M> {
    /// Muxes the pins, clocks the block and programs it for 115200 8N1.
    pub fn init(mmio: &'a mut M) -> Self {
        route_pins(mmio);

        mmio.write32(UCR1, 0);
        // Writing SRST low resets the block; it reads back high once the
        // reset has finished.
        mmio.write32(UCR2, 0);
        mmio.wait_set(UCR2, UCR2_SRST);

        mmio.set_bits32(UCR3, UCR3_RXDMUXSEL | UCR3_ADNIMP);

        mmio.write32(
            UFCR,
            (RFDIV << UFCR_RFDIV_SHIFT)
                | (TXTL << UFCR_TXTL_SHIFT)
                | (RXTL << UFCR_RXTL_SHIFT),
        );
        mmio.write32(UBIR, 0xf);
        mmio.write32(UBMR, UBMR_VALUE);
        mmio.write32(
            UCR2,
            UCR2_WS | UCR2_IRTS | UCR2_RXEN | UCR2_TXEN | UCR2_SRST,
        );
        mmio.write32(UCR1, UCR1_UARTEN);

        Self { mmio }
    }

    /// Wraps a UART that `init` has already set up.
    pub fn attach(mmio: &'a mut M) -> Self {
        Self { mmio }
    }

    pub fn is_tx_empty(&self) -> bool {
        self.mmio.read32(UTS) & UTS_TXEMPTY != 0
    }

    /// Sends one byte and waits for it to leave the FIFO.
    pub fn send(&mut self, byte: u8) {
        match nb::block!(self.write(byte)) {
            Ok(()) => {}
            Err(e) => match e {},
        }
        match nb::block!(self.flush()) {
            Ok(()) => {}
            Err(e) => match e {},
        }
    }
}

impl<M: Mmio + ?Sized> Write<u8> for Usart<'_, M> {
    type Error = Error;

    fn write(&mut self, byte: u8) -> nb::Result<(), Error> {
        if self.is_tx_empty() {
            self.mmio.write32(UTXD, u32::from(byte));
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    fn flush(&mut self) -> nb::Result<(), Error> {
        if self.is_tx_empty() {
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

impl<M: Mmio + ?Sized> core::fmt::Write for Usart<'_, M> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        for b in s.bytes() {
            if b == b'\n' {
                self.send(b'\r');
            }
            self.send(b);
        }
        Ok(())
    }
}

/// Host-side model of the UART for tests of code that prints.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    extern crate std;

    use super::{UCR2, UCR2_SRST, UTS, UTS_TXEMPTY, UTXD};
    use regtable::mock::MockRegs;
    use std::string::String;

    /// Makes soft reset complete at once and the transmitter always ready.
    pub fn install(regs: &mut MockRegs) {
        regs.on_write(UCR2, |v| v | UCR2_SRST);
        regs.preset(UTS, UTS_TXEMPTY);
    }

    /// Everything sent so far, as text.
    pub fn transmitted(regs: &MockRegs) -> String {
        regs.writes_to(UTXD)
            .into_iter()
            .map(|b| char::from(b as u8))
            .collect()
    }
}
