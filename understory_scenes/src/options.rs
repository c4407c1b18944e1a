// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Router configuration.

use alloc::borrow::Cow;
use core::time::Duration;

/// Time allotted to each half of a transition.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(80);

/// Minimum spacing between applied resize ticks.
pub const DEFAULT_RESIZE_THROTTLE: Duration = Duration::from_millis(100);

/// Tunables for [`Scenes`](crate::router::Scenes).
///
/// The defaults match the stylesheet contract: a `changing` class while a
/// transition is in flight and a `scene-<name>` class per active scene.
///
/// ```
/// use core::time::Duration;
/// use understory_scenes::options::SceneOptions;
///
/// let options = SceneOptions::default()
///     .with_settle_delay(Duration::from_millis(120))
///     .with_class_prefix("illustration-");
/// assert_eq!(options.identity_class("room"), "illustration-room");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SceneOptions {
    /// Delay before teardown of the outgoing scene, and again before the
    /// transition class is removed.
    pub settle_delay: Duration,
    /// Throttle window for viewport resize ticks.
    pub resize_throttle: Duration,
    /// Class present on the host while a transition is in flight.
    pub transition_class: Cow<'static, str>,
    /// Prefix of the per-scene identity class.
    pub class_prefix: Cow<'static, str>,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            resize_throttle: DEFAULT_RESIZE_THROTTLE,
            transition_class: Cow::Borrowed("changing"),
            class_prefix: Cow::Borrowed("scene-"),
        }
    }
}

impl SceneOptions {
    /// Set the settle delay.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the resize throttle window.
    pub fn with_resize_throttle(mut self, window: Duration) -> Self {
        self.resize_throttle = window;
        self
    }

    /// Set the transition class.
    pub fn with_transition_class(mut self, class: impl Into<Cow<'static, str>>) -> Self {
        self.transition_class = class.into();
        self
    }

    /// Set the identity class prefix.
    pub fn with_class_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.class_prefix = prefix.into();
        self
    }

    /// Identity class for the scene called `name`.
    pub fn identity_class(&self, name: &str) -> alloc::string::String {
        let mut class = alloc::string::String::with_capacity(self.class_prefix.len() + name.len());
        class.push_str(&self.class_prefix);
        class.push_str(name);
        class
    }
}
