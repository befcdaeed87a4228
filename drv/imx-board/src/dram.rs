// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The shape every DRAM bring-up has, whatever the controller.
//!
//! Controllers fill in the steps; [`bring_up`] runs them in order. None of
//! the steps can fail. Any of them can spin forever on a board whose PLL or
//! DRAM never answers, which is the only failure mode this early.

use regtable::Mmio;
use ringbuf::{ringbuf, ringbuf_entry};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Pll,
    HoldReset,
    Configure,
    ReleaseReset,
    ZqCalibration,
    NormalMode,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Trace {
    None,
    Start(Step),
    Up,
}

ringbuf!(Trace, 8, Trace::None);

pub trait DramController {
    /// Programs the controller's clock and waits for it to lock.
    fn start_pll<M: Mmio + ?Sized>(mmio: &mut M);

    /// Takes the controller out of service for configuration.
    fn hold_reset<M: Mmio + ?Sized>(mmio: &mut M);

    /// The bulk register burst.
    fn configure<M: Mmio + ?Sized>(mmio: &mut M);

    fn release_reset<M: Mmio + ?Sized>(mmio: &mut M);

    /// Triggers impedance calibration and waits for it to complete.
    fn calibrate_zq<M: Mmio + ?Sized>(mmio: &mut M);

    /// Returns once the controller reports normal operation.
    fn wait_normal<M: Mmio + ?Sized>(mmio: &mut M);
}

pub fn bring_up<P: DramController, M: Mmio + ?Sized>(mmio: &mut M) {
    ringbuf_entry!(Trace::Start(Step::Pll));
    P::start_pll(mmio);
    ringbuf_entry!(Trace::Start(Step::HoldReset));
    P::hold_reset(mmio);
    ringbuf_entry!(Trace::Start(Step::Configure));
    P::configure(mmio);
    ringbuf_entry!(Trace::Start(Step::ReleaseReset));
    P::release_reset(mmio);
    ringbuf_entry!(Trace::Start(Step::ZqCalibration));
    P::calibrate_zq(mmio);
    ringbuf_entry!(Trace::Start(Step::NormalMode));
    P::wait_normal(mmio);
    ringbuf_entry!(Trace::Up);
}
