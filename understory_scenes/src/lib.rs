// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Scenes: a deterministic, `no_std` scene registry and router.
//!
//! ## Overview
//!
//! An illustrated UI is a set of named scenes rendered one at a time into a
//! single host element. This crate keeps the registry of scenes, switches
//! between them with a two-phase transition, mirrors the visible scene into
//! browser history, and keeps the host sized to a fixed aspect ratio.
//!
//! It does not draw anything. Scenes build their own content through a
//! creator callback and hand back a [`Teardown`](crate::scene::Teardown) that
//! undoes it.
//!
//! ## Transition sequence
//!
//! Showing a scene while another is active runs:
//!
//! 1) settle: the host gains the transition class (`changing` by default);
//! 2) teardown: after the settle delay the outgoing scene's teardown runs,
//!    the host is emptied, and its `scene-<name>` class is removed;
//! 3) enter: the incoming scene gets its `scene-<name>` class and its creator
//!    runs; after another settle delay the transition class is removed and a
//!    history entry is pushed.
//!
//! Time is supplied by the caller, so the whole sequence is reproducible in
//! tests: see [`Scenes::poll`](crate::router::Scenes::poll) and
//! [`Scenes::next_deadline`](crate::router::Scenes::next_deadline).
//!
//! ## Sizing
//!
//! [`AspectRatio::fit`](crate::proportions::AspectRatio::fit) picks the
//! largest rectangle of the ratio that fits the viewport. The router applies
//! it on construction, on throttled resize, and on orientation change.
//!
//! ## Workflow
//!
//! 1) Implement [`Host`](crate::types::Host) for your element handle (or
//!    enable `web_adapter` and use `web_sys::HtmlElement`).
//! 2) Build a [`Scenes`](crate::router::Scenes), [`add`](crate::router::Scenes::add)
//!    scenes, and [`show`](crate::router::Scenes::show) one.
//! 3) Forward viewport and history events and call
//!    [`poll`](crate::router::Scenes::poll) at the next deadline.
//!
//! ```
//! use core::time::Duration;
//! use kurbo::Size;
//! use understory_scenes::router::Scenes;
//! use understory_scenes::scene::{SceneConfig, SceneContext, Teardown};
//! use understory_scenes::types::{Host, TransitionPhase};
//!
//! #[derive(Default)]
//! struct Stage {
//!     width: Option<String>,
//!     children: Vec<String>,
//! }
//!
//! impl Host for Stage {
//!     fn add_class(&mut self, _: &str) {}
//!     fn remove_class(&mut self, _: &str) {}
//!     fn clear_children(&mut self) {
//!         self.children.clear();
//!     }
//!     fn set_style(&mut self, property: &str, value: Option<&str>) {
//!         if property == "width" {
//!             self.width = value.map(String::from);
//!         }
//!     }
//! }
//!
//! let ms = Duration::from_millis;
//! let mut scenes = Scenes::new(Stage::default(), "1:1".parse().unwrap(), Size::new(1000.0, 1500.0));
//! assert_eq!(scenes.host().width.as_deref(), Some("1000px"));
//!
//! scenes.add(
//!     "room",
//!     SceneConfig::new(|ctx: &mut SceneContext<'_, Stage>| {
//!         ctx.host_mut().children.push("tv".into());
//!         Teardown::noop()
//!     }),
//! )?;
//! scenes.show("room", ms(0))?;
//! assert_eq!(scenes.host().children, ["tv"]);
//! assert_eq!(scenes.next_deadline(), Some(ms(80)));
//! scenes.poll(ms(80));
//! assert_eq!(scenes.phase(), TransitionPhase::Idle);
//! # Ok::<(), understory_scenes::error::SceneError>(())
//! ```
//!
//! ## Features
//!
//! - `std` (default): forwards to Kurbo's `std`.
//! - `libm`: forwards to Kurbo's `libm` for `no_std` targets.
//! - `web_adapter`: [`adapters`] for `web-sys`, driven by `gloo` listeners and timers.
//!
//! Without `web_adapter` this crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod adapters;
pub mod error;
pub mod handlers;
pub mod options;
pub mod proportions;
pub mod router;
pub mod scene;
pub mod throttle;
pub mod types;
