// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};

/// Holder for a ring buffer in a `static`, handing out one mutable borrow
/// at a time.
///
/// A borrow attempted while another is live is refused rather than waited
/// on; there's nothing else running that could end it.
pub struct StaticCell<T> {
    taken: AtomicBool,
    contents: UnsafeCell<T>,
}

// Safety: `taken` admits one borrower at a time, and the borrower may be on
// any thread.
unsafe impl<T: Send> Sync for StaticCell<T> {}

impl<T> StaticCell<T> {
    pub const fn new(contents: T) -> Self {
        Self {
            taken: AtomicBool::new(false),
            contents: UnsafeCell::new(contents),
        }
    }

    /// Borrows the contents, or returns `None` if they're already borrowed.
    pub fn try_borrow_mut(&self) -> Option<Borrow<'_, T>> {
        if self.taken.swap(true, Ordering::Acquire) {
            return None;
        }
        // Safety: the swap made us the only borrower until `Borrow` drops.
        let contents = unsafe { &mut *self.contents.get() };
        Some(Borrow {
            contents,
            taken: &self.taken,
        })
    }
}

pub struct Borrow<'a, T> {
    contents: &'a mut T,
    taken: &'a AtomicBool,
}

impl<T> Drop for Borrow<'_, T> {
    fn drop(&mut self) {
        self.taken.store(false, Ordering::Release);
    }
}

impl<T> Deref for Borrow<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.contents
    }
}

impl<T> DerefMut for Borrow<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.contents
    }
}
