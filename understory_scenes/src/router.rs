// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene registry and router.
//!
//! ## Overview
//!
//! Registers scenes, runs transitions between them, keeps browser history in
//! step with the visible scene, and keeps the host sized to a fixed aspect
//! ratio.
//!
//! ## Transitions
//!
//! A transition is a small state machine driven by [`Scenes::poll`]:
//!
//! - [`TransitioningOut`](TransitionPhase::TransitioningOut): the host carries
//!   the transition class; when the settle delay elapses the outgoing scene's
//!   teardown runs, the host is cleared, and the incoming scene is created.
//! - [`TransitioningIn`](TransitionPhase::TransitioningIn): when the settle
//!   delay elapses again the transition class is removed and, for an external
//!   [`show`](Scenes::show), a history entry is pushed.
//!
//! The first scene skips the outgoing half. Requests arriving mid-transition
//! are queued; a later request replaces an earlier queued one.
//!
//! ## Time
//!
//! The router never reads a clock. Every entry point that can start a timer
//! takes `now`, a monotonic [`Duration`] since an origin of the caller's
//! choosing, and [`Scenes::next_deadline`] tells the caller when to poll next.
//!
//! ## See Also
//!
//! [`proportions`](crate::proportions) for the sizing rule and
//! [`scene`](crate::scene) for the creator/teardown contract.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::time::Duration;

use kurbo::Size;

use crate::error::SceneError;
use crate::options::SceneOptions;
use crate::proportions::{AspectRatio, clear_proportions, set_proportions};
use crate::scene::{Navigator, Scene, SceneConfig, Teardown};
use crate::throttle::Throttle;
use crate::types::{
    ActiveStatus, History, HistoryState, Host, Listeners, NoHistory, TransitionPhase,
};

/// Strip the leading `#` of a URL fragment, e.g. `location.hash`.
///
/// ```
/// use understory_scenes::router::fragment_identifier;
/// assert_eq!(fragment_identifier("#/room"), "/room");
/// assert_eq!(fragment_identifier("room"), "room");
/// ```
pub fn fragment_identifier(hash: &str) -> &str {
    hash.strip_prefix('#').unwrap_or(hash)
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct Request {
    index: usize,
    // Push a history entry once shown (external show, not popstate).
    push: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Transition {
    Idle,
    Out { target: Request, until: Duration },
    In { shown: Request, until: Duration },
}

#[derive(Debug)]
enum Slot {
    Empty,
    Active { index: usize, teardown: Teardown },
    Closed,
}

/// Scene registry and router.
///
/// ## Usage
///
/// - Construct with [`Scenes::new`] when history sync is not needed, or with
///   [`Scenes::with_history`] / [`Scenes::with_options`].
/// - Register scenes with [`Scenes::add`].
/// - Forward viewport and history events to [`Scenes::resize`],
///   [`Scenes::orientation_change`] and [`Scenes::pop_state`].
/// - Call [`Scenes::show`] to navigate, and [`Scenes::poll`] whenever
///   [`Scenes::next_deadline`] has passed.
///
/// ```
/// use core::time::Duration;
/// use kurbo::Size;
/// use understory_scenes::router::Scenes;
/// use understory_scenes::scene::{SceneConfig, Teardown};
/// use understory_scenes::types::Host;
///
/// #[derive(Default)]
/// struct El {
///     classes: Vec<String>,
/// }
///
/// impl Host for El {
///     fn add_class(&mut self, class: &str) {
///         self.classes.push(class.into());
///     }
///     fn remove_class(&mut self, class: &str) {
///         self.classes.retain(|c| c != class);
///     }
///     fn clear_children(&mut self) {}
///     fn set_style(&mut self, _: &str, _: Option<&str>) {}
/// }
///
/// let ms = Duration::from_millis;
/// let mut scenes = Scenes::new(El::default(), "16:9".parse().unwrap(), Size::new(1280.0, 720.0));
/// scenes
///     .add("room", SceneConfig::new(|_| Teardown::noop()))?
///     .add("drawer", SceneConfig::new(|_| Teardown::noop()).with_path("/drawer"))?;
///
/// scenes.show("room", ms(0))?;
/// scenes.poll(ms(80));
/// scenes.show("/drawer", ms(100))?;
/// scenes.poll(ms(260));
/// assert_eq!(scenes.current().map(|s| s.name()), Some("drawer"));
/// assert_eq!(scenes.host().classes, ["scene-drawer"]);
/// # Ok::<(), understory_scenes::error::SceneError>(())
/// ```
pub struct Scenes<H: Host, Y: History = NoHistory> {
    host: H,
    history: Y,
    options: SceneOptions,
    aspect_ratio: AspectRatio,
    viewport: Size,
    throttle: Throttle,
    listeners: Listeners,
    scenes: Vec<Scene<H>>,
    by_name: BTreeMap<String, usize>,
    by_path: BTreeMap<String, usize>,
    current: Slot,
    transition: Transition,
    queued: Option<Request>,
    navigator: Navigator,
    destroyed: bool,
}

impl<H: Host, Y: History> core::fmt::Debug for Scenes<H, Y> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scenes")
            .field("aspect_ratio", &self.aspect_ratio)
            .field("viewport", &self.viewport)
            .field("listeners", &self.listeners)
            .field("scenes", &self.scenes)
            .field("current", &self.current)
            .field("transition", &self.transition)
            .field("queued", &self.queued)
            .finish_non_exhaustive()
    }
}

impl<H: Host> Scenes<H, NoHistory> {
    /// Create a router without history sync, using default options.
    ///
    /// Sizes `host` to `viewport` immediately.
    pub fn new(host: H, aspect_ratio: AspectRatio, viewport: Size) -> Self {
        Self::with_options(host, NoHistory, aspect_ratio, SceneOptions::default(), viewport)
    }
}

impl<H: Host, Y: History> Scenes<H, Y> {
    /// Create a router that pushes history entries through `history`.
    pub fn with_history(host: H, history: Y, aspect_ratio: AspectRatio, viewport: Size) -> Self {
        Self::with_options(host, history, aspect_ratio, SceneOptions::default(), viewport)
    }

    /// Create a router with explicit options.
    ///
    /// Sizes `host` to `viewport` immediately and attaches all
    /// [`Listeners`].
    pub fn with_options(
        mut host: H,
        history: Y,
        aspect_ratio: AspectRatio,
        options: SceneOptions,
        viewport: Size,
    ) -> Self {
        set_proportions(&mut host, aspect_ratio, viewport);
        log::debug!("scenes: created with aspect ratio {aspect_ratio} in {viewport:?}");
        Self {
            host,
            history,
            throttle: Throttle::new(options.resize_throttle),
            options,
            aspect_ratio,
            viewport,
            listeners: Listeners::all(),
            scenes: Vec::new(),
            by_name: BTreeMap::new(),
            by_path: BTreeMap::new(),
            current: Slot::Empty,
            transition: Transition::Idle,
            queued: None,
            navigator: Navigator::new(),
            destroyed: false,
        }
    }

    /// Register a scene under `name`.
    ///
    /// Fails with [`SceneError::DuplicateName`] if the name is taken, then
    /// with [`SceneError::DuplicatePath`] if the path is taken. The registry
    /// is unchanged on failure.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        config: SceneConfig<H>,
    ) -> Result<&mut Self, SceneError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(SceneError::DuplicateName { name });
        }
        let scene = Scene::new(name, config);
        if self.by_path.contains_key(scene.path()) {
            return Err(SceneError::DuplicatePath {
                path: scene.path().into(),
            });
        }

        let index = self.scenes.len();
        self.by_name.insert(scene.name().into(), index);
        self.by_path.insert(scene.path().into(), index);
        log::debug!("scenes: added {:?} at {:?}", scene.name(), scene.path());
        self.scenes.push(scene);
        Ok(self)
    }

    /// Whether `identifier` names a registered scene or path.
    pub fn has(&self, identifier: &str) -> bool {
        self.resolve(identifier).is_some()
    }

    /// Look up a registered scene by name or path.
    pub fn get(&self, identifier: &str) -> Option<&Scene<H>> {
        self.resolve(identifier).map(|i| &self.scenes[i])
    }

    /// Registered scenes, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Scene<H>> {
        self.scenes.iter()
    }

    /// Number of registered scenes.
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// Whether no scenes are registered.
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Show the scene named by `identifier` (name or path).
    ///
    /// Fails with [`SceneError::SceneNotFound`] without touching the current
    /// scene. When idle, the transition starts at `now`; otherwise the request
    /// is queued behind the transition in flight, replacing any queued one.
    /// A history entry is pushed when the transition completes.
    pub fn show(&mut self, identifier: &str, now: Duration) -> Result<(), SceneError> {
        self.request(identifier, true, now)
    }

    /// Show `identifier` if registered, else `fallback`.
    ///
    /// Intended for deep links read from the URL fragment on load.
    pub fn show_or(
        &mut self,
        identifier: &str,
        fallback: &str,
        now: Duration,
    ) -> Result<(), SceneError> {
        if self.has(identifier) {
            self.show(identifier, now)
        } else {
            self.show(fallback, now)
        }
    }

    /// Handle a viewport resize. Throttled: the first tick after a quiet
    /// period applies at once, later ticks within the window apply once at
    /// its end with the latest viewport.
    pub fn resize(&mut self, viewport: Size, now: Duration) {
        if !self.listeners.contains(Listeners::RESIZE) {
            return;
        }
        self.viewport = viewport;
        if self.throttle.call(now) {
            self.apply_proportions();
        }
    }

    /// Handle a device orientation change. Applies at once.
    pub fn orientation_change(&mut self, viewport: Size) {
        if !self.listeners.contains(Listeners::ORIENTATION_CHANGE) {
            return;
        }
        self.viewport = viewport;
        self.apply_proportions();
    }

    /// Handle history navigation. Shows the entry's scene without pushing a
    /// new entry; entries without state or with unknown paths are ignored.
    pub fn pop_state(&mut self, state: Option<&HistoryState>, now: Duration) {
        if !self.listeners.contains(Listeners::POP_STATE) {
            return;
        }
        let Some(state) = state else {
            return;
        };
        if let Err(e) = self.request(&state.path, false, now) {
            log::debug!("scenes: ignoring popstate: {e}");
        }
    }

    /// Advance timers to `now`: navigator requests, the trailing resize, and
    /// any transition deadlines that have passed.
    pub fn poll(&mut self, now: Duration) {
        if self.destroyed {
            self.navigator.clear();
            return;
        }

        if let Some(identifier) = self.navigator.take()
            && let Err(e) = self.request(&identifier, true, now)
        {
            log::warn!("scenes: dropping navigation request: {e}");
        }

        if self.listeners.contains(Listeners::RESIZE) && self.throttle.poll(now) {
            self.apply_proportions();
        }

        loop {
            match self.transition {
                Transition::Out { target, until } if now >= until => {
                    self.detach_current();
                    self.install(target.index);
                    self.transition = Transition::In {
                        shown: target,
                        until: until + self.options.settle_delay,
                    };
                }
                Transition::In { shown, until } if now >= until => {
                    self.host.remove_class(&self.options.transition_class);
                    self.transition = Transition::Idle;
                    if shown.push {
                        self.push_history(shown.index);
                    }
                    if let Some(next) = self.queued.take() {
                        self.begin(next, until);
                    }
                }
                _ => break,
            }
        }
    }

    /// Earliest time at which [`poll`](Self::poll) has work to do.
    pub fn next_deadline(&self) -> Option<Duration> {
        let transition = match self.transition {
            Transition::Idle => None,
            Transition::Out { until, .. } | Transition::In { until, .. } => Some(until),
        };
        let resize = if self.listeners.contains(Listeners::RESIZE) {
            self.throttle.deadline()
        } else {
            None
        };
        match (transition, resize) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Tear everything down. Idempotent.
    ///
    /// Detaches listeners, clears the host's inline size, abandons any
    /// transition in flight, and runs the active scene's teardown. Afterwards
    /// [`status`](Self::status) is [`ActiveStatus::Closed`] if a scene was
    /// showing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.listeners = Listeners::empty();
        self.throttle.cancel();
        clear_proportions(&mut self.host);

        self.queued = None;
        self.navigator.close();
        if self.transition != Transition::Idle {
            self.host.remove_class(&self.options.transition_class);
            self.transition = Transition::Idle;
        }
        self.detach_current();
        log::debug!("scenes: destroyed");
    }

    /// The active scene, if any.
    pub fn current(&self) -> Option<&Scene<H>> {
        match self.current {
            Slot::Active { index, .. } => Some(&self.scenes[index]),
            Slot::Empty | Slot::Closed => None,
        }
    }

    /// Whether a scene is showing, was never shown, or was closed.
    pub fn status(&self) -> ActiveStatus {
        match self.current {
            Slot::Empty => ActiveStatus::NeverShown,
            Slot::Active { .. } => ActiveStatus::Showing,
            Slot::Closed => ActiveStatus::Closed,
        }
    }

    /// Current transition phase.
    pub fn phase(&self) -> TransitionPhase {
        match self.transition {
            Transition::Idle => TransitionPhase::Idle,
            Transition::Out { .. } => TransitionPhase::TransitioningOut,
            Transition::In { .. } => TransitionPhase::TransitioningIn,
        }
    }

    /// The scene queued behind the transition in flight, if any.
    pub fn queued(&self) -> Option<&Scene<H>> {
        self.queued.map(|r| &self.scenes[r.index])
    }

    /// Whether [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Listeners still attached.
    pub fn listeners(&self) -> Listeners {
        self.listeners
    }

    /// A navigator whose requests this router executes on [`poll`](Self::poll).
    pub fn navigator(&self) -> Navigator {
        self.navigator.clone()
    }

    /// The host element.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host element, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The history seam.
    pub fn history(&self) -> &Y {
        &self.history
    }

    /// Options in effect.
    pub fn options(&self) -> &SceneOptions {
        &self.options
    }

    /// Aspect ratio fixed at construction.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Last viewport size seen.
    pub fn viewport(&self) -> Size {
        self.viewport
    }

    fn resolve(&self, identifier: &str) -> Option<usize> {
        self.by_name
            .get(identifier)
            .or_else(|| self.by_path.get(identifier))
            .copied()
    }

    fn request(&mut self, identifier: &str, push: bool, now: Duration) -> Result<(), SceneError> {
        if self.destroyed {
            return Err(SceneError::Destroyed);
        }
        let index = self
            .resolve(identifier)
            .ok_or_else(|| SceneError::SceneNotFound {
                identifier: identifier.into(),
            })?;
        let request = Request { index, push };

        if self.transition == Transition::Idle {
            self.begin(request, now);
        } else {
            log::debug!(
                "scenes: queueing {:?} behind transition in flight",
                self.scenes[index].name()
            );
            self.queued = Some(request);
        }
        Ok(())
    }

    fn begin(&mut self, request: Request, now: Duration) {
        let until = now + self.options.settle_delay;
        if matches!(self.current, Slot::Active { .. }) {
            self.host.add_class(&self.options.transition_class);
            self.transition = Transition::Out {
                target: request,
                until,
            };
        } else {
            self.install(request.index);
            self.transition = Transition::In {
                shown: request,
                until,
            };
        }
    }

    fn install(&mut self, index: usize) {
        let scene = &mut self.scenes[index];
        log::debug!("scenes: showing {:?}", scene.name());
        self.host
            .add_class(&self.options.identity_class(scene.name()));
        let teardown = scene.render(&mut self.host, &self.navigator);
        self.current = Slot::Active { index, teardown };
    }

    fn detach_current(&mut self) {
        if !matches!(self.current, Slot::Active { .. }) {
            return;
        }
        let Slot::Active { index, teardown } = core::mem::replace(&mut self.current, Slot::Closed)
        else {
            return;
        };
        let name = self.scenes[index].name();
        if let Err(e) = teardown.run() {
            log::warn!("scenes: {name:?}: {e}");
        }
        self.host.clear_children();
        self.host.remove_class(&self.options.identity_class(name));
    }

    fn push_history(&mut self, index: usize) {
        let path = self.scenes[index].path();
        let url = format!("{}#{}", self.history.pathname(), path);
        self.history.push_state(&HistoryState::new(path), &url);
    }

    fn apply_proportions(&mut self) {
        log::trace!("scenes: sizing to {:?}", self.viewport);
        set_proportions(&mut self.host, self.aspect_ratio, self.viewport);
    }
}

impl<H: Host, Y: History> Drop for Scenes<H, Y> {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneContext;
    use alloc::rc::Rc;
    use alloc::string::ToString;
    use alloc::vec;
    use core::cell::{Cell, RefCell};

    type Journal = Rc<RefCell<Vec<String>>>;

    #[derive(Debug, Default)]
    struct Element {
        classes: Vec<String>,
        styles: BTreeMap<String, String>,
        children: Vec<String>,
        journal: Journal,
    }

    impl Element {
        fn has_class(&self, class: &str) -> bool {
            self.classes.iter().any(|c| c == class)
        }

        // Missing inline styles read as empty, as in the DOM.
        fn style(&self, property: &str) -> &str {
            self.styles.get(property).map_or("", String::as_str)
        }
    }

    impl Host for Element {
        fn add_class(&mut self, class: &str) {
            if !self.has_class(class) {
                self.classes.push(class.to_string());
            }
        }

        fn remove_class(&mut self, class: &str) {
            self.classes.retain(|c| c != class);
        }

        fn clear_children(&mut self) {
            self.children.clear();
            self.journal.borrow_mut().push("clear".into());
        }

        fn set_style(&mut self, property: &str, value: Option<&str>) {
            match value {
                Some(v) => {
                    self.styles.insert(property.to_string(), v.to_string());
                }
                None => {
                    self.styles.remove(property);
                }
            }
        }
    }

    #[derive(Debug, Default)]
    struct RecordedHistory {
        pathname: String,
        entries: Vec<(HistoryState, String)>,
    }

    impl History for RecordedHistory {
        fn pathname(&self) -> String {
            self.pathname.clone()
        }

        fn push_state(&mut self, state: &HistoryState, url: &str) {
            self.entries.push((state.clone(), url.to_string()));
        }
    }

    #[derive(Clone, Default)]
    struct Counts {
        created: Rc<Cell<u32>>,
        torn_down: Rc<Cell<u32>>,
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn square() -> AspectRatio {
        AspectRatio::new(1, 1).unwrap()
    }

    fn portrait() -> Size {
        Size::new(1000.0, 1500.0)
    }

    // A scene that appends a child, journals its lifecycle, and counts calls.
    fn counted(counts: &Counts) -> SceneConfig<Element> {
        let counts = counts.clone();
        SceneConfig::new(move |ctx: &mut SceneContext<'_, Element>| {
            counts.created.set(counts.created.get() + 1);
            let name = ctx.name().to_string();
            let journal = ctx.host().journal.clone();
            journal.borrow_mut().push(format!("create:{name}"));
            ctx.host_mut().children.push(name.clone());
            let torn_down = counts.torn_down.clone();
            Teardown::new(move || {
                torn_down.set(torn_down.get() + 1);
                journal.borrow_mut().push(format!("teardown:{name}"));
            })
        })
    }

    fn router() -> Scenes<Element, RecordedHistory> {
        let history = RecordedHistory {
            pathname: "/index.html".into(),
            entries: Vec::new(),
        };
        Scenes::with_history(Element::default(), history, square(), portrait())
    }

    #[test]
    fn construction_sizes_host_and_attaches_listeners() {
        let scenes = Scenes::new(Element::default(), square(), portrait());
        assert_eq!(scenes.host().style("width"), "1000px");
        assert_eq!(scenes.host().style("height"), "1000px");
        assert_eq!(scenes.listeners(), Listeners::all());
        assert_eq!(scenes.status(), ActiveStatus::NeverShown);
        assert_eq!(scenes.phase(), TransitionPhase::Idle);
        assert!(scenes.current().is_none());
        assert_eq!(scenes.aspect_ratio(), square());
    }

    #[test]
    fn resize_applies_leading_tick_then_trailing_tick() {
        let mut scenes = Scenes::new(Element::default(), square(), portrait());

        scenes.resize(Size::new(1100.0, 1500.0), ms(0));
        assert_eq!(scenes.host().style("width"), "1100px");
        assert_eq!(scenes.host().style("height"), "1100px");

        scenes.resize(Size::new(1200.0, 1500.0), ms(0));
        scenes.poll(ms(50));
        assert_eq!(scenes.host().style("width"), "1100px");
        assert_eq!(scenes.next_deadline(), Some(ms(100)));

        scenes.poll(ms(100));
        assert_eq!(scenes.host().style("width"), "1200px");
        assert_eq!(scenes.host().style("height"), "1200px");
        assert_eq!(scenes.next_deadline(), None);
    }

    #[test]
    fn orientation_change_is_not_throttled() {
        let mut scenes = Scenes::new(Element::default(), square(), portrait());
        scenes.resize(Size::new(1050.0, 1500.0), ms(0));
        scenes.orientation_change(Size::new(1100.0, 1500.0));
        assert_eq!(scenes.host().style("width"), "1100px");
        assert_eq!(scenes.host().style("height"), "1100px");
    }

    #[test]
    fn add_registers_name_and_path() {
        let mut scenes = router();
        scenes
            .add(
                "scene-1",
                SceneConfig::new(|_| Teardown::noop()).with_path("/scene-1-path"),
            )
            .unwrap();
        assert!(scenes.has("scene-1"));
        assert!(scenes.has("/scene-1-path"));
        assert!(!scenes.has("undefined-scene"));
        assert!(!scenes.has("/undefined-scene-path"));
        assert_eq!(scenes.len(), 1);
    }

    #[test]
    fn add_chains() {
        let mut scenes = router();
        scenes
            .add("room", SceneConfig::new(|_| Teardown::noop()))
            .and_then(|s| s.add("drawer", SceneConfig::new(|_| Teardown::noop())))
            .unwrap();
        assert!(scenes.has("room") && scenes.has("drawer"));
        assert_eq!(scenes.get("room").map(Scene::path), Some("room"));
        let names: Vec<_> = scenes.iter().map(Scene::name).collect();
        assert_eq!(names, ["room", "drawer"]);
    }

    #[test]
    fn duplicate_name_is_rejected_regardless_of_path() {
        let mut scenes = router();
        scenes
            .add(
                "scene-1",
                SceneConfig::new(|_| Teardown::noop()).with_path("/scene-1-path"),
            )
            .unwrap();
        let err = scenes
            .add(
                "scene-1",
                SceneConfig::new(|_| Teardown::noop()).with_path("/scene-2-path"),
            )
            .unwrap_err();
        assert_eq!(
            err,
            SceneError::DuplicateName {
                name: "scene-1".into()
            }
        );
        assert!(!scenes.has("/scene-2-path"));
    }

    #[test]
    fn duplicate_path_is_rejected() {
        let mut scenes = router();
        scenes
            .add(
                "scene-1",
                SceneConfig::new(|_| Teardown::noop()).with_path("/scene-1-path"),
            )
            .unwrap();
        let err = scenes
            .add(
                "scene-2",
                SceneConfig::new(|_| Teardown::noop()).with_path("/scene-1-path"),
            )
            .unwrap_err();
        assert_eq!(
            err,
            SceneError::DuplicatePath {
                path: "/scene-1-path".into()
            }
        );
        assert!(!scenes.has("scene-2"));
        assert_eq!(scenes.len(), 1);
    }

    #[test]
    fn first_show_creates_synchronously_without_outgoing_half() {
        let counts = Counts::default();
        let mut scenes = router();
        scenes
            .add("scene-1", counted(&counts).with_path("/scene-1-path"))
            .unwrap();

        scenes.show("scene-1", ms(0)).unwrap();
        assert_eq!(counts.created.get(), 1);
        assert!(scenes.host().has_class("scene-scene-1"));
        assert!(!scenes.host().has_class("changing"));
        assert_eq!(scenes.phase(), TransitionPhase::TransitioningIn);
        assert!(scenes.history().entries.is_empty());

        scenes.poll(ms(80));
        assert_eq!(scenes.phase(), TransitionPhase::Idle);
        assert_eq!(scenes.current().map(Scene::name), Some("scene-1"));
        assert_eq!(scenes.status(), ActiveStatus::Showing);
        assert_eq!(counts.torn_down.get(), 0);
    }

    #[test]
    fn name_and_path_resolve_to_the_same_scene() {
        let counts = Counts::default();
        let mut scenes = router();
        scenes.add("a", counted(&counts).with_path("/a")).unwrap();

        scenes.show("/a", ms(0)).unwrap();
        scenes.poll(ms(80));
        assert_eq!(scenes.current().map(Scene::name), Some("a"));

        scenes.show("a", ms(100)).unwrap();
        scenes.poll(ms(260));
        assert_eq!(scenes.current().map(Scene::name), Some("a"));
        assert_eq!(counts.created.get(), 2);
        assert_eq!(counts.torn_down.get(), 1);
    }

    #[test]
    fn unknown_scene_leaves_current_untouched() {
        let counts = Counts::default();
        let mut scenes = router();
        scenes.add("a", counted(&counts)).unwrap();
        scenes.show("a", ms(0)).unwrap();
        scenes.poll(ms(80));

        let err = scenes.show("something", ms(100)).unwrap_err();
        assert_eq!(
            err,
            SceneError::SceneNotFound {
                identifier: "something".into()
            }
        );
        assert_eq!(scenes.current().map(Scene::name), Some("a"));
        assert!(scenes.host().has_class("scene-a"));
        assert!(!scenes.host().has_class("changing"));
        assert_eq!(scenes.phase(), TransitionPhase::Idle);
        assert_eq!(counts.torn_down.get(), 0);
    }

    #[test]
    fn switching_tears_down_once_and_swaps_classes_after_settle() {
        let a = Counts::default();
        let b = Counts::default();
        let mut scenes = router();
        scenes.add("a", counted(&a)).unwrap();
        scenes.add("b", counted(&b)).unwrap();

        scenes.show("a", ms(0)).unwrap();
        scenes.poll(ms(80));

        scenes.show("b", ms(100)).unwrap();
        assert!(scenes.host().has_class("changing"));
        assert_eq!(scenes.phase(), TransitionPhase::TransitioningOut);
        assert_eq!(scenes.next_deadline(), Some(ms(180)));

        scenes.poll(ms(179));
        assert!(scenes.host().has_class("scene-a"));
        assert!(!scenes.host().has_class("scene-b"));
        assert_eq!(a.torn_down.get(), 0);

        scenes.poll(ms(180));
        assert!(!scenes.host().has_class("scene-a"));
        assert!(scenes.host().has_class("scene-b"));
        assert!(scenes.host().has_class("changing"));
        assert_eq!(scenes.host().children, ["b"]);
        assert_eq!(a.torn_down.get(), 1);
        assert_eq!(b.created.get(), 1);

        scenes.poll(ms(260));
        assert!(!scenes.host().has_class("changing"));
        assert_eq!(scenes.current().map(Scene::name), Some("b"));
        assert_eq!(a.torn_down.get(), 1);
        assert_eq!(b.torn_down.get(), 0);

        let journal = scenes.host().journal.borrow().clone();
        assert_eq!(journal, ["create:a", "teardown:a", "clear", "create:b"]);
    }

    // One late poll runs both halves of the transition.
    #[test]
    fn late_poll_completes_whole_transition() {
        let counts = Counts::default();
        let mut scenes = router();
        scenes.add("a", counted(&counts)).unwrap();
        scenes.add("b", counted(&counts)).unwrap();
        scenes.show("a", ms(0)).unwrap();
        scenes.show("b", ms(10)).unwrap();
        scenes.poll(ms(1_000));
        assert_eq!(scenes.phase(), TransitionPhase::Idle);
        assert_eq!(scenes.current().map(Scene::name), Some("b"));
        assert!(!scenes.host().has_class("changing"));
    }

    #[test]
    fn show_pushes_history_after_transition_completes() {
        let mut scenes = router();
        scenes
            .add("a", SceneConfig::new(|_| Teardown::noop()).with_path("/a"))
            .unwrap();
        scenes.show("a", ms(0)).unwrap();
        assert!(scenes.history().entries.is_empty());
        scenes.poll(ms(80));
        assert_eq!(
            scenes.history().entries,
            vec![(HistoryState::new("/a"), "/index.html#/a".to_string())]
        );
    }

    #[test]
    fn pop_state_shows_scene_without_pushing() {
        let counts = Counts::default();
        let mut scenes = router();
        scenes
            .add("scene-1", counted(&counts).with_path("/scene-1"))
            .unwrap();

        scenes.pop_state(Some(&HistoryState::new("/scene-1")), ms(0));
        scenes.poll(ms(160));
        assert_eq!(scenes.current().map(Scene::name), Some("scene-1"));
        assert!(scenes.history().entries.is_empty());
    }

    #[test]
    fn pop_state_ignores_missing_state_and_unknown_paths() {
        let counts = Counts::default();
        let mut scenes = router();
        scenes.add("a", counted(&counts)).unwrap();
        scenes.pop_state(None, ms(0));
        scenes.pop_state(Some(&HistoryState::new("/gone")), ms(0));
        scenes.poll(ms(160));
        assert_eq!(counts.created.get(), 0);
        assert_eq!(scenes.status(), ActiveStatus::NeverShown);
    }

    #[test]
    fn overlapping_requests_queue_and_collapse_to_latest() {
        let counts = Counts::default();
        let mut scenes = router();
        for name in ["a", "b", "c", "d"] {
            scenes
                .add(name, counted(&counts).with_path(format!("/{name}")))
                .unwrap();
        }
        scenes.show("a", ms(0)).unwrap();
        scenes.poll(ms(80));

        scenes.show("b", ms(100)).unwrap();
        scenes.show("c", ms(110)).unwrap();
        assert_eq!(scenes.queued().map(Scene::name), Some("c"));
        scenes.show("d", ms(120)).unwrap();
        assert_eq!(scenes.queued().map(Scene::name), Some("d"));
        // Unknown identifiers fail up front and do not disturb the queue.
        assert!(scenes.show("zzz", ms(130)).is_err());
        assert_eq!(scenes.queued().map(Scene::name), Some("d"));

        scenes.poll(ms(180));
        assert_eq!(scenes.current().map(Scene::name), Some("b"));
        // b settles at 260, then d starts its outgoing half.
        scenes.poll(ms(260));
        assert_eq!(scenes.phase(), TransitionPhase::TransitioningOut);
        assert!(scenes.queued().is_none());
        scenes.poll(ms(420));
        assert_eq!(scenes.current().map(Scene::name), Some("d"));
        assert_eq!(scenes.phase(), TransitionPhase::Idle);

        let paths: Vec<_> = scenes
            .history()
            .entries
            .iter()
            .map(|(s, _)| s.path.as_str())
            .collect();
        assert_eq!(paths, ["/a", "/b", "/d"]);
        // a, b, d created once each; c never.
        assert_eq!(counts.created.get(), 3);
        assert_eq!(counts.torn_down.get(), 2);
    }

    #[test]
    fn navigator_requests_run_on_poll() {
        let slot: Rc<RefCell<Option<Navigator>>> = Rc::default();
        let mut scenes = router();
        let captured = slot.clone();
        scenes
            .add(
                "room",
                SceneConfig::new(move |ctx| {
                    *captured.borrow_mut() = Some(ctx.navigator());
                    Teardown::noop()
                }),
            )
            .unwrap();
        scenes
            .add("drawer", SceneConfig::new(|_| Teardown::noop()))
            .unwrap();

        scenes.show("room", ms(0)).unwrap();
        scenes.poll(ms(80));

        let nav = slot.borrow().clone().unwrap();
        nav.show("nowhere");
        scenes.poll(ms(90));
        assert_eq!(scenes.phase(), TransitionPhase::Idle);

        nav.show("drawer");
        scenes.poll(ms(100));
        assert_eq!(scenes.phase(), TransitionPhase::TransitioningOut);
        scenes.poll(ms(260));
        assert_eq!(scenes.current().map(Scene::name), Some("drawer"));
        assert_eq!(scenes.history().entries.len(), 2);
    }

    #[test]
    fn scene_state_survives_hide_and_show() {
        #[derive(Default)]
        struct Visits(u32);

        let seen = Rc::new(Cell::new(0));
        let mut scenes = router();
        let s = seen.clone();
        scenes
            .add(
                "a",
                SceneConfig::new(move |ctx| {
                    let visits = ctx.state::<Visits>();
                    visits.borrow_mut().0 += 1;
                    s.set(visits.borrow().0);
                    Teardown::noop()
                }),
            )
            .unwrap();
        scenes.add("b", SceneConfig::new(|_| Teardown::noop())).unwrap();

        scenes.show("a", ms(0)).unwrap();
        scenes.poll(ms(80));
        scenes.show("b", ms(100)).unwrap();
        scenes.poll(ms(260));
        scenes.show("a", ms(300)).unwrap();
        scenes.poll(ms(460));
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn failing_teardown_does_not_abort_transition() {
        let mut scenes = router();
        scenes
            .add(
                "a",
                SceneConfig::new(|_| Teardown::fallible(|| Err("tween already killed"))),
            )
            .unwrap();
        scenes.add("b", SceneConfig::new(|_| Teardown::noop())).unwrap();
        scenes.show("a", ms(0)).unwrap();
        scenes.show("b", ms(10)).unwrap();
        scenes.poll(ms(500));
        assert_eq!(scenes.current().map(Scene::name), Some("b"));
        assert!(!scenes.host().has_class("scene-a"));
    }

    #[test]
    fn show_or_falls_back_for_unknown_deep_links() {
        let mut scenes = router();
        scenes
            .add("room", SceneConfig::new(|_| Teardown::noop()).with_path("/room"))
            .unwrap();
        scenes
            .add("drawer", SceneConfig::new(|_| Teardown::noop()).with_path("/drawer"))
            .unwrap();

        scenes
            .show_or(fragment_identifier("#/unknown"), "room", ms(0))
            .unwrap();
        assert_eq!(scenes.current().map(Scene::name), Some("room"));
        scenes.poll(ms(80));

        scenes
            .show_or(fragment_identifier("#/drawer"), "room", ms(100))
            .unwrap();
        scenes.poll(ms(260));
        assert_eq!(scenes.current().map(Scene::name), Some("drawer"));

        assert_eq!(
            scenes.show_or("/nope", "also-nope", ms(300)),
            Err(SceneError::SceneNotFound {
                identifier: "also-nope".into()
            })
        );
    }

    #[test]
    fn destroy_clears_sizing_and_closes_scene() {
        let counts = Counts::default();
        let mut scenes = router();
        scenes
            .add("scene-1", counted(&counts).with_path("/scene-1"))
            .unwrap();
        scenes.show("scene-1", ms(0)).unwrap();
        scenes.poll(ms(80));
        assert!(!scenes.host().style("width").is_empty());

        scenes.destroy();
        assert_eq!(scenes.host().style("width"), "");
        assert_eq!(scenes.host().style("height"), "");
        assert_eq!(counts.torn_down.get(), 1);
        assert_eq!(scenes.status(), ActiveStatus::Closed);
        assert!(scenes.current().is_none());
        assert!(scenes.listeners().is_empty());
        assert!(!scenes.host().has_class("scene-scene-1"));

        scenes.orientation_change(Size::new(800.0, 600.0));
        scenes.resize(Size::new(800.0, 600.0), ms(200));
        scenes.poll(ms(400));
        assert_eq!(scenes.host().style("width"), "");
        assert_eq!(scenes.host().style("height"), "");

        scenes.pop_state(Some(&HistoryState::new("/scene-1")), ms(500));
        scenes.poll(ms(660));
        assert_eq!(counts.created.get(), 1);
        assert_eq!(
            scenes.show("scene-1", ms(700)),
            Err(SceneError::Destroyed)
        );

        scenes.destroy();
        assert_eq!(counts.torn_down.get(), 1);
    }

    #[test]
    fn destroy_without_scene_leaves_never_shown() {
        let mut scenes = router();
        scenes.add("a", SceneConfig::new(|_| Teardown::noop())).unwrap();
        scenes.destroy();
        assert_eq!(scenes.status(), ActiveStatus::NeverShown);
    }

    #[test]
    fn destroy_mid_transition_abandons_it() {
        let a = Counts::default();
        let b = Counts::default();
        let mut scenes = router();
        scenes.add("a", counted(&a)).unwrap();
        scenes.add("b", counted(&b)).unwrap();
        scenes.show("a", ms(0)).unwrap();
        scenes.poll(ms(80));
        scenes.show("b", ms(100)).unwrap();

        scenes.destroy();
        assert!(!scenes.host().has_class("changing"));
        assert_eq!(a.torn_down.get(), 1);
        assert_eq!(b.created.get(), 0);
        assert_eq!(scenes.phase(), TransitionPhase::Idle);
        assert_eq!(scenes.next_deadline(), None);

        scenes.poll(ms(500));
        assert_eq!(b.created.get(), 0);
    }

    #[test]
    fn dropping_router_runs_active_teardown() {
        let counts = Counts::default();
        {
            let mut scenes = router();
            scenes.add("a", counted(&counts)).unwrap();
            scenes.show("a", ms(0)).unwrap();
        }
        assert_eq!(counts.torn_down.get(), 1);
    }

    #[test]
    fn navigator_is_closed_by_destroy() {
        let mut scenes = router();
        scenes.add("a", SceneConfig::new(|_| Teardown::noop())).unwrap();
        let nav = scenes.navigator();
        let wakes = Rc::new(Cell::new(0));
        let w = wakes.clone();
        nav.set_waker(Some(Rc::new(move || w.set(w.get() + 1))));

        scenes.destroy();
        assert!(nav.is_closed());
        nav.show("a");
        for t in 0..3 {
            scenes.poll(ms(t));
        }
        assert_eq!(nav.pending(), None);
        assert_eq!(wakes.get(), 0);
        assert_eq!(scenes.status(), ActiveStatus::NeverShown);
        assert_eq!(scenes.next_deadline(), None);
    }

    // History-driven requests join the queue like any other but never push.
    #[test]
    fn queued_pop_state_shows_without_pushing() {
        let counts = Counts::default();
        let mut scenes = router();
        for name in ["a", "b", "c"] {
            scenes
                .add(name, counted(&counts).with_path(format!("/{name}")))
                .unwrap();
        }
        scenes.show("a", ms(0)).unwrap();
        scenes.poll(ms(80));
        scenes.show("b", ms(100)).unwrap();

        scenes.pop_state(Some(&HistoryState::new("/c")), ms(120));
        assert_eq!(scenes.queued().map(Scene::name), Some("c"));

        scenes.poll(ms(260));
        assert_eq!(scenes.phase(), TransitionPhase::TransitioningOut);
        scenes.poll(ms(420));
        assert_eq!(scenes.current().map(Scene::name), Some("c"));
        let paths: Vec<_> = scenes
            .history()
            .entries
            .iter()
            .map(|(s, _)| s.path.as_str())
            .collect();
        assert_eq!(paths, ["/a", "/b"]);
    }

    #[test]
    fn show_replaces_queued_pop_state_and_pushes() {
        let counts = Counts::default();
        let mut scenes = router();
        for name in ["a", "b", "c", "d"] {
            scenes
                .add(name, counted(&counts).with_path(format!("/{name}")))
                .unwrap();
        }
        scenes.show("a", ms(0)).unwrap();
        scenes.poll(ms(80));
        scenes.show("b", ms(100)).unwrap();
        scenes.pop_state(Some(&HistoryState::new("/c")), ms(110));
        scenes.show("d", ms(120)).unwrap();
        assert_eq!(scenes.queued().map(Scene::name), Some("d"));

        scenes.poll(ms(420));
        assert_eq!(scenes.current().map(Scene::name), Some("d"));
        let paths: Vec<_> = scenes
            .history()
            .entries
            .iter()
            .map(|(s, _)| s.path.as_str())
            .collect();
        assert_eq!(paths, ["/a", "/b", "/d"]);
        assert_eq!(
            scenes.history().entries.last().map(|(_, url)| url.as_str()),
            Some("/index.html#/d")
        );
    }

    #[test]
    fn empty_fragment_falls_back() {
        assert_eq!(fragment_identifier(""), "");
        assert_eq!(fragment_identifier("#"), "");

        let mut scenes = router();
        scenes
            .add("room", SceneConfig::new(|_| Teardown::noop()).with_path("/room"))
            .unwrap();
        assert!(!scenes.has(fragment_identifier("")));
        scenes
            .show_or(fragment_identifier(""), "room", ms(0))
            .unwrap();
        assert_eq!(scenes.current().map(Scene::name), Some("room"));
    }

    #[test]
    fn custom_options_drive_classes_and_timing() {
        let options = SceneOptions::default()
            .with_settle_delay(ms(10))
            .with_transition_class("fading")
            .with_class_prefix("illustration-");
        let mut scenes = Scenes::with_options(
            Element::default(),
            NoHistory,
            square(),
            options,
            portrait(),
        );
        scenes.add("a", SceneConfig::new(|_| Teardown::noop())).unwrap();
        scenes.add("b", SceneConfig::new(|_| Teardown::noop())).unwrap();
        scenes.show("a", ms(0)).unwrap();
        scenes.poll(ms(10));
        scenes.show("b", ms(20)).unwrap();
        assert!(scenes.host().has_class("fading"));
        scenes.poll(ms(30));
        assert!(scenes.host().has_class("illustration-b"));
        scenes.poll(ms(40));
        assert!(!scenes.host().has_class("fading"));
    }
}
