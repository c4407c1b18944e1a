// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leading-edge throttle with a trailing call, driven by caller-supplied time.
//!
//! The first call after a quiet period runs immediately. Calls arriving inside
//! the window collapse into a single trailing run at the end of the window.
//!
//! ```
//! use core::time::Duration;
//! use understory_scenes::throttle::Throttle;
//!
//! let ms = Duration::from_millis;
//! let mut t = Throttle::new(ms(100));
//! assert!(t.call(ms(0)));
//! assert!(!t.call(ms(10)));
//! assert_eq!(t.deadline(), Some(ms(100)));
//! assert!(!t.poll(ms(50)));
//! assert!(t.poll(ms(100)));
//! ```

use core::time::Duration;

/// Throttle state. See the [module docs](self).
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Throttle {
    window: Duration,
    last_run: Option<Duration>,
    trailing: bool,
}

impl Throttle {
    /// Create a throttle with the given window.
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            last_run: None,
            trailing: false,
        }
    }

    /// The window length.
    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Register a call at `now`. Returns `true` if it should run immediately;
    /// otherwise a trailing run is scheduled.
    pub fn call(&mut self, now: Duration) -> bool {
        match self.last_run {
            Some(last) if now.saturating_sub(last) < self.window => {
                self.trailing = true;
                false
            }
            _ => {
                self.last_run = Some(now);
                self.trailing = false;
                true
            }
        }
    }

    /// When the pending trailing run is due, if any.
    pub fn deadline(&self) -> Option<Duration> {
        match (self.trailing, self.last_run) {
            (true, Some(last)) => Some(last + self.window),
            _ => None,
        }
    }

    /// Returns `true` once when the trailing run is due at `now`.
    ///
    /// The trailing run opens a new window starting at its deadline.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.deadline() {
            Some(due) if now >= due => {
                self.last_run = Some(due);
                self.trailing = false;
                true
            }
            _ => false,
        }
    }

    /// Forget any pending trailing run and the current window.
    pub fn cancel(&mut self) {
        self.last_run = None;
        self.trailing = false;
    }
}
