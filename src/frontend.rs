use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use gloo_timers::callback::{Interval, Timeout};
use js_sys::{Function, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, Document, DocumentReadyState, Element, Event, FocusEvent, HtmlElement,
    HtmlInputElement, HtmlTextAreaElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, MouseEvent, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition, Storage,
};
use yew::prelude::*;

use crate::registry::{Registry, Role};
use crate::sequencer::{
    EffectError, EffectSpec, EffectTarget, Presenter, Sequencer, TargetId, TimeMs,
};
use crate::theme::{Theme, ThemePreference, ThemeStore, THEME_KEY};

const MOBILE_BREAKPOINT_PX: f64 = 768.0;
const MIN_FPS: u32 = 30;
const DEGRADED_DURATION_FLOOR_MS: TimeMs = 100;
const HERO_STAGGER_MS: TimeMs = 200;
const REVEAL_CHILD_STAGGER_MS: TimeMs = 100;
const REVEAL_THRESHOLD: f64 = 0.1;
const REVEAL_ROOT_MARGIN: &str = "0px 0px -50px 0px";
const NAVBAR_CONDENSE_Y: f64 = 100.0;
const NAVBAR_HIDE_Y: f64 = 200.0;
const NAVBAR_ENTRANCE_DELAY_MS: TimeMs = 100;
const ACTIVE_SECTION_OFFSET_PX: f64 = 200.0;
const TRAIL_CAP: usize = 5;
const PARTICLE_INTERVAL_MS: u32 = 2_000;
const PARTICLE_BURST: u32 = 10;
const PARTICLE_BURST_STEP_MS: u32 = 200;
const PARTICLE_MIN_LIFE_MS: TimeMs = 5_000;
const PARTICLE_MAX_LIFE_MS: TimeMs = 15_000;
const OVERLAY_LINGER_MS: u32 = 1_000;
const OVERLAY_FADE_MS: TimeMs = 500;
const MAGNETIC_PULL: f64 = 0.1;
const PROGRESS_GLOW_AFTER_PERCENT: f64 = 50.0;
const PROGRESS_GLOW_SOFT: &str = "0 0 10px rgba(37, 99, 235, 0.5)";
const PROGRESS_GLOW_STRONG: &str = "0 0 20px rgba(37, 99, 235, 0.8)";
const TADA_MS: TimeMs = 1_000;
const SHAKE_MS: TimeMs = 800;
const CLICK_PULSE_MS: TimeMs = 600;
const HEART_BEAT_MS: TimeMs = 1_300;
const BOUNCE_IN_MS: TimeMs = 800;

fn now_ms() -> TimeMs {
    window()
        .and_then(|w| w.performance())
        .map(|performance| performance.now() as TimeMs)
        .unwrap_or(0)
}

fn viewport_width() -> f64 {
    window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|value| value.as_f64())
        .unwrap_or(1280.0)
}

fn prefers_reduced_motion() -> bool {
    window()
        .and_then(|w| {
            w.match_media("(prefers-reduced-motion: reduce)")
                .ok()
                .flatten()
        })
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

#[derive(Clone, Copy, Debug)]
pub struct Capabilities {
    pub reduced_motion: bool,
    pub mobile: bool,
}

impl Capabilities {
    fn detect() -> Self {
        Self {
            reduced_motion: prefers_reduced_motion(),
            mobile: viewport_width() <= MOBILE_BREAKPOINT_PX,
        }
    }
}

// ---------------------------------------------------------------------------
// Theme plumbing

fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok().flatten()
}

pub struct LocalStorageStore;

impl ThemeStore for LocalStorageStore {
    fn load(&self) -> Result<Option<String>, EffectError> {
        let storage = local_storage().ok_or(EffectError::StorageUnavailable)?;
        storage
            .get_item(THEME_KEY)
            .map_err(|_| EffectError::StorageUnavailable)
    }

    fn save(&mut self, value: &str) -> Result<(), EffectError> {
        let storage = local_storage().ok_or(EffectError::StorageUnavailable)?;
        storage
            .set_item(THEME_KEY, value)
            .map_err(|_| EffectError::StorageUnavailable)
    }
}

fn apply_theme(theme: Theme) {
    if let Some(document) = window().and_then(|w| w.document()) {
        if let Some(root) = document.document_element() {
            let _ = root.set_attribute("data-theme", theme.as_str());
        }
    }
}

fn apply_theme_with_transition(theme: Theme) {
    if prefers_reduced_motion() {
        apply_theme(theme);
        return;
    }

    let Some(document) = window().and_then(|w| w.document()) else {
        apply_theme(theme);
        return;
    };

    let document_js: JsValue = document.into();
    let Ok(start_view_transition) =
        Reflect::get(&document_js, &JsValue::from_str("startViewTransition"))
    else {
        apply_theme(theme);
        return;
    };

    let Some(start_view_transition) = start_view_transition.dyn_ref::<Function>() else {
        apply_theme(theme);
        return;
    };

    let callback = Closure::<dyn FnMut()>::new(move || {
        apply_theme(theme);
    });

    if start_view_transition
        .call1(&document_js, callback.as_ref().unchecked_ref())
        .is_err()
    {
        apply_theme(theme);
    }

    callback.forget();
}

// ---------------------------------------------------------------------------
// Presentation seam

#[derive(Clone)]
pub struct DomTarget {
    id: TargetId,
    element: Element,
}

impl DomTarget {
    fn new(id: TargetId, element: Element) -> Self {
        Self { id, element }
    }

    fn element(&self) -> &Element {
        &self.element
    }
}

impl EffectTarget for DomTarget {
    fn id(&self) -> TargetId {
        self.id
    }
}

/// Applies effects as class-list and inline-style mutations. Ephemeral
/// targets (particles, the loading overlay) are removed from the document
/// outright when their effect reverts.
pub struct DomPresenter {
    ephemeral: HashSet<TargetId>,
}

impl DomPresenter {
    fn new() -> Self {
        Self {
            ephemeral: HashSet::new(),
        }
    }

    fn mark_ephemeral(&mut self, id: TargetId) {
        self.ephemeral.insert(id);
    }
}

impl Presenter for DomPresenter {
    type Target = DomTarget;

    fn enter(&mut self, _now_ms: TimeMs, target: &DomTarget, spec: &EffectSpec) {
        let element = target.element();
        if let Some(class) = &spec.enter_class {
            let _ = element.class_list().add_1(class);
        }
        if !spec.style_delta.is_empty() {
            if let Some(html) = element.dyn_ref::<HtmlElement>() {
                let style = html.style();
                for (property, value) in &spec.style_delta {
                    let _ = style.set_property(property, value);
                }
            }
        }
    }

    fn revert(&mut self, _now_ms: TimeMs, target: &DomTarget, spec: &EffectSpec) {
        if self.ephemeral.remove(&target.id()) {
            target.element().remove();
            return;
        }

        let element = target.element();
        if let Some(class) = &spec.enter_class {
            let _ = element.class_list().remove_1(class);
        }
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            let style = html.style();
            for (property, _) in &spec.style_delta {
                let _ = style.remove_property(property);
            }
        }
        if let Some(class) = &spec.exit_class {
            let _ = element.class_list().add_1(class);
        }
    }
}

// ---------------------------------------------------------------------------
// Timer-pumped engine around the sequencer

/// The page's sequencer plus the single outstanding wakeup timer driving it.
/// Every entry point syncs the simulated clock to `performance.now()` before
/// scheduling, then re-aims the timer at the next deadline.
#[derive(Clone)]
pub struct Engine {
    sequencer: Rc<RefCell<Sequencer<DomPresenter>>>,
    wakeup: Rc<RefCell<Option<Timeout>>>,
}

impl Engine {
    fn new() -> Self {
        Self {
            sequencer: Rc::new(RefCell::new(Sequencer::new(DomPresenter::new()))),
            wakeup: Rc::new(RefCell::new(None)),
        }
    }

    fn apply(&self, targets: &[DomTarget], spec: EffectSpec, stagger_ms: TimeMs) {
        {
            let mut sequencer = self.sequencer.borrow_mut();
            sequencer.advance_to(now_ms());
            sequencer.apply(targets, spec, stagger_ms);
        }
        self.pump();
    }

    fn revert_target(&self, target: TargetId) {
        {
            let mut sequencer = self.sequencer.borrow_mut();
            sequencer.advance_to(now_ms());
            sequencer.revert_target(target);
        }
        self.pump();
    }

    fn register_ephemeral(&self, target: &DomTarget) {
        self.sequencer
            .borrow_mut()
            .presenter_mut()
            .mark_ephemeral(target.id());
    }

    fn disable(&self) {
        self.sequencer.borrow_mut().disable();
        *self.wakeup.borrow_mut() = None;
    }

    fn degrade(&self) {
        {
            let mut sequencer = self.sequencer.borrow_mut();
            sequencer.advance_to(now_ms());
            sequencer.clamp_active_durations(DEGRADED_DURATION_FLOOR_MS);
        }
        self.pump();
    }

    fn is_degraded(&self) -> bool {
        self.sequencer.borrow().is_degraded()
    }

    fn pump(&self) {
        let deadline = self.sequencer.borrow().next_deadline();
        let Some(at) = deadline else {
            *self.wakeup.borrow_mut() = None;
            return;
        };

        let delay = at.saturating_sub(now_ms());
        let engine = self.clone();
        *self.wakeup.borrow_mut() = Some(Timeout::new(delay as u32, move || {
            engine.sequencer.borrow_mut().advance_to(now_ms());
            engine.pump();
        }));
    }
}

// ---------------------------------------------------------------------------
// Context shared by the trigger adapters

struct FxContext {
    engine: Engine,
    registry: Registry<DomTarget>,
    capabilities: Capabilities,
    ids: Cell<u64>,
    last_scroll_y: Cell<f64>,
    active_section: RefCell<Option<String>>,
    trail: RefCell<VecDeque<Element>>,
    progress_bar: RefCell<Option<Element>>,
}

type Ctx = Rc<FxContext>;

impl FxContext {
    fn next_id(&self) -> TargetId {
        let id = self.ids.get();
        self.ids.set(id + 1);
        TargetId(id)
    }
}

fn style_spec(pairs: &[(&str, &str)]) -> EffectSpec {
    EffectSpec::styles(
        pairs
            .iter()
            .map(|(property, value)| (property.to_string(), value.to_string()))
            .collect(),
    )
}

fn listen_mouse<T: AsRef<web_sys::EventTarget>>(
    target: &T,
    event: &str,
    handler: impl FnMut(MouseEvent) + 'static,
) {
    let closure = Closure::<dyn FnMut(MouseEvent)>::new(handler);
    let _ = target
        .as_ref()
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

fn listen_focus<T: AsRef<web_sys::EventTarget>>(
    target: &T,
    event: &str,
    handler: impl FnMut(FocusEvent) + 'static,
) {
    let closure = Closure::<dyn FnMut(FocusEvent)>::new(handler);
    let _ = target
        .as_ref()
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

fn listen_event<T: AsRef<web_sys::EventTarget>>(
    target: &T,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    let _ = target
        .as_ref()
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    closure.forget();
}

// ---------------------------------------------------------------------------
// Initialization

/// Build the registry, detect capabilities, and wire every trigger adapter.
/// Runs once after the first render; the context lives until page unload.
fn boot_effects() -> Option<Ctx> {
    let window = window()?;
    let document = window.document()?;

    decorate_page(&document);

    let ids = Cell::new(0);
    let registry = build_registry(&document, &ids);

    let ctx: Ctx = Rc::new(FxContext {
        engine: Engine::new(),
        registry,
        capabilities: Capabilities::detect(),
        ids,
        last_scroll_y: Cell::new(0.0),
        active_section: RefCell::new(None),
        trail: RefCell::new(VecDeque::new()),
        progress_bar: RefCell::new(None),
    });

    if ctx.capabilities.reduced_motion {
        // One sweep; nothing is ever scheduled afterward. Structural behavior
        // (navigation, forms, smooth anchors) stays wired without animation.
        ctx.engine.disable();
    } else {
        create_progress_bar(&ctx, &document);
        wire_loading_overlay(&ctx, &document);
        hero_entrance(&ctx);
        navbar_entrance(&ctx);
        wire_reveal_observer(&ctx);
        wire_hover_lift(&ctx);
        wire_nav_link_flourishes(&ctx);
        if !ctx.capabilities.mobile {
            wire_mouse_trail(&ctx, &document);
            wire_magnetic(&ctx);
            wire_particles(&ctx, &document);
        }
        monitor_frame_rate(&ctx);
    }

    wire_scroll(&ctx);
    wire_nav(&ctx);
    wire_forms(&ctx);
    wire_smooth_scroll(&ctx);

    Some(ctx)
}

/// Class/attribute decoration the effects key off, applied before the
/// registry snapshot so decorated elements land in their roles.
fn decorate_page(document: &Document) {
    if let Ok(buttons) = document.query_selector_all(".btn, .social-link") {
        for index in 0..buttons.length() {
            if let Some(element) = buttons
                .item(index)
                .and_then(|node| node.dyn_into::<Element>().ok())
            {
                let _ = element.class_list().add_1("magnetic");
            }
        }
    }

    if let Ok(pieces) =
        document.query_selector_all(".hero-title, .hero-subtitle, .hero-description")
    {
        for index in 0..pieces.length() {
            if let Some(element) = pieces
                .item(index)
                .and_then(|node| node.dyn_into::<Element>().ok())
            {
                let _ = element.class_list().add_1("parallax");
                let speed = 0.1 + (index as f64) * 0.05;
                let _ = element.set_attribute("data-speed", &format!("{speed:.2}"));
            }
        }
    }
}

fn build_registry(document: &Document, ids: &Cell<u64>) -> Registry<DomTarget> {
    let mut registry = Registry::new();
    for role in Role::ALL {
        let Ok(nodes) = document.query_selector_all(role.selector()) else {
            continue;
        };
        for index in 0..nodes.length() {
            let Some(element) = nodes
                .item(index)
                .and_then(|node| node.dyn_into::<Element>().ok())
            else {
                continue;
            };
            let id = ids.get();
            ids.set(id + 1);
            registry.register(role, DomTarget::new(TargetId(id), element));
        }
    }
    registry
}

// ---------------------------------------------------------------------------
// Trigger adapters

fn hero_entrance(ctx: &Ctx) {
    let Ok(pieces) = ctx.registry.targets(Role::HeroPiece) else {
        return;
    };

    for piece in pieces {
        if let Some(html) = piece.element().dyn_ref::<HtmlElement>() {
            let style = html.style();
            let _ = style.set_property("opacity", "0");
            let _ = style.set_property("transform", "translateY(30px)");
        }
    }

    let entrance = style_spec(&[
        ("transition", "all 0.8s cubic-bezier(0.4, 0, 0.2, 1)"),
        ("opacity", "1"),
        ("transform", "translateY(0)"),
    ]);
    ctx.engine.apply(pieces, entrance, HERO_STAGGER_MS);
}

fn navbar_entrance(ctx: &Ctx) {
    let Ok(navbar) = ctx.registry.first(Role::Navbar) else {
        return;
    };
    ctx.engine.apply(
        std::slice::from_ref(navbar),
        EffectSpec::class("navbar-visible"),
        NAVBAR_ENTRANCE_DELAY_MS,
    );
}

fn wire_reveal_observer(ctx: &Ctx) {
    let Ok(sections) = ctx.registry.targets(Role::RevealSection) else {
        return;
    };

    let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new({
        let ctx = Rc::clone(ctx);
        move |entries: js_sys::Array, _observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if !entry.is_intersecting() {
                    continue;
                }
                reveal_section(&ctx, &entry.target());
            }
        }
    });

    let options = IntersectionObserverInit::new();
    options.set_root_margin(REVEAL_ROOT_MARGIN);
    options.set_threshold(&JsValue::from_f64(REVEAL_THRESHOLD));

    let Ok(observer) =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
    else {
        return;
    };
    for section in sections {
        observer.observe(section.element());
    }
    callback.forget();
}

fn reveal_section(ctx: &Ctx, element: &Element) {
    let Ok(sections) = ctx.registry.targets(Role::RevealSection) else {
        return;
    };
    let Some(section) = sections.iter().find(|target| target.element() == element) else {
        return;
    };

    ctx.engine
        .apply(std::slice::from_ref(section), EffectSpec::class("animate"), 0);

    let Ok(children) = ctx.registry.targets(Role::RevealChild) else {
        return;
    };
    let section_node: &web_sys::Node = section.element().as_ref();
    let nested: Vec<DomTarget> = children
        .iter()
        .filter(|child| section_node.contains(Some(child.element().as_ref())))
        .cloned()
        .collect();
    ctx.engine
        .apply(&nested, EffectSpec::class("animate"), REVEAL_CHILD_STAGGER_MS);
}

fn create_progress_bar(ctx: &Ctx, document: &Document) {
    let Some(body) = document.body() else {
        return;
    };
    let Ok(bar) = document.create_element("div") else {
        return;
    };
    bar.set_class_name("scroll-progress");
    let _ = bar.set_attribute(
        "style",
        "position: fixed; top: 0; left: 0; width: 0%; height: 3px; \
         background: linear-gradient(90deg, #2563eb, #fbbf24); z-index: 10000; \
         transition: width 0.1s ease; box-shadow: 0 0 10px rgba(37, 99, 235, 0.5);",
    );
    let _ = body.append_child(bar.as_ref());
    *ctx.progress_bar.borrow_mut() = Some(bar);
}

fn wire_scroll(ctx: &Ctx) {
    let Some(window) = window() else {
        return;
    };

    let handler = {
        let ctx = Rc::clone(ctx);
        move |_event: Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let scrolled = window.scroll_y().unwrap_or(0.0);

            update_navbar(&ctx, scrolled);
            update_active_link(&ctx, scrolled);
            update_progress_bar(&ctx, &window, scrolled);
            update_parallax(&ctx, scrolled);

            ctx.last_scroll_y.set(scrolled);
        }
    };
    listen_event(&window, "scroll", handler);
}

fn update_navbar(ctx: &Ctx, scrolled: f64) {
    let Ok(navbar) = ctx.registry.first(Role::Navbar) else {
        return;
    };
    let class_list = navbar.element().class_list();
    if scrolled > NAVBAR_CONDENSE_Y {
        let _ = class_list.add_1("navbar-scrolled");
    } else {
        let _ = class_list.remove_1("navbar-scrolled");
    }

    if let Some(html) = navbar.element().dyn_ref::<HtmlElement>() {
        let hide = scrolled > ctx.last_scroll_y.get() && scrolled > NAVBAR_HIDE_Y;
        let transform = if hide {
            "translateY(-100%)"
        } else {
            "translateY(0)"
        };
        let _ = html.style().set_property("transform", transform);
    }
}

fn update_active_link(ctx: &Ctx, scrolled: f64) {
    let Ok(sections) = ctx.registry.targets(Role::PageSection) else {
        return;
    };

    let mut current = String::new();
    for section in sections {
        let Some(html) = section.element().dyn_ref::<HtmlElement>() else {
            continue;
        };
        if scrolled >= f64::from(html.offset_top()) - ACTIVE_SECTION_OFFSET_PX {
            if let Some(id) = section.element().get_attribute("id") {
                current = id;
            }
        }
    }

    if ctx.active_section.borrow().as_deref() == Some(current.as_str()) {
        return;
    }
    *ctx.active_section.borrow_mut() = Some(current.clone());

    let Ok(links) = ctx.registry.targets(Role::NavLink) else {
        return;
    };
    let anchor = format!("#{current}");
    for link in links {
        let class_list = link.element().class_list();
        let _ = class_list.remove_1("active");
        if link.element().get_attribute("href").as_deref() == Some(anchor.as_str()) {
            let _ = class_list.add_1("active");
            ctx.engine.apply(
                std::slice::from_ref(link),
                EffectSpec::class("animate-heart-beat").lasting(HEART_BEAT_MS),
                0,
            );
        }
    }
}

fn update_progress_bar(ctx: &Ctx, window: &web_sys::Window, scrolled: f64) {
    let bar = ctx.progress_bar.borrow();
    let Some(bar) = bar.as_ref() else {
        return;
    };
    let Some(body) = window.document().and_then(|document| document.body()) else {
        return;
    };

    let viewport = window
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);
    let track = f64::from(body.scroll_height()) - viewport;
    if track <= 0.0 {
        return;
    }
    let percent = (scrolled / track * 100.0).clamp(0.0, 100.0);

    let Some(html) = bar.dyn_ref::<HtmlElement>() else {
        return;
    };
    let style = html.style();
    let _ = style.set_property("width", &format!("{percent:.2}%"));

    // Under the low-frame-rate floor the glow stops updating.
    if ctx.engine.is_degraded() {
        return;
    }
    let glow = if percent > PROGRESS_GLOW_AFTER_PERCENT {
        PROGRESS_GLOW_STRONG
    } else {
        PROGRESS_GLOW_SOFT
    };
    let _ = style.set_property("box-shadow", glow);
}

fn update_parallax(ctx: &Ctx, scrolled: f64) {
    let Ok(targets) = ctx.registry.targets(Role::Parallax) else {
        return;
    };
    for target in targets {
        let speed = target
            .element()
            .get_attribute("data-speed")
            .and_then(|value| value.parse::<f64>().ok())
            .unwrap_or(0.5);
        if let Some(html) = target.element().dyn_ref::<HtmlElement>() {
            let _ = html.style().set_property(
                "transform",
                &format!("translateY({:.2}px)", -(scrolled * speed)),
            );
        }
    }
}

fn wire_nav(ctx: &Ctx) {
    let hamburger = ctx.registry.first(Role::Hamburger).ok().cloned();
    let menu = ctx.registry.first(Role::NavMenu).ok().cloned();

    if let (Some(hamburger), Some(menu)) = (hamburger.clone(), menu.clone()) {
        let handler = {
            let ctx = Rc::clone(ctx);
            let hamburger = hamburger.clone();
            move |_event: MouseEvent| {
                let _ = hamburger.element().class_list().toggle("active");
                let _ = menu.element().class_list().toggle("active");

                let open = hamburger.element().class_list().contains("active");
                let flourish = if open { "animate-tada" } else { "animate-shake" };
                ctx.engine.apply(
                    std::slice::from_ref(&hamburger),
                    EffectSpec::class(flourish).lasting(TADA_MS),
                    0,
                );
            }
        };
        listen_mouse(hamburger.element(), "click", handler);
    }

    let Ok(links) = ctx.registry.targets(Role::NavLink) else {
        return;
    };
    for link in links {
        let handler = {
            let ctx = Rc::clone(ctx);
            let link = link.clone();
            let hamburger = hamburger.clone();
            let menu = menu.clone();
            move |_event: MouseEvent| {
                if let Some(hamburger) = &hamburger {
                    let _ = hamburger.element().class_list().remove_1("active");
                }
                if let Some(menu) = &menu {
                    let _ = menu.element().class_list().remove_1("active");
                }
                ctx.engine.apply(
                    std::slice::from_ref(&link),
                    EffectSpec::class("animate-pulse").lasting(CLICK_PULSE_MS),
                    0,
                );
            }
        };
        listen_mouse(link.element(), "click", handler);
    }
}

/// Hover flourish on nav links, reverted by the `animationend` signal rather
/// than a timer.
fn wire_nav_link_flourishes(ctx: &Ctx) {
    let Ok(links) = ctx.registry.targets(Role::NavLink) else {
        return;
    };
    for link in links {
        let enter = {
            let ctx = Rc::clone(ctx);
            let link = link.clone();
            move |_event: MouseEvent| {
                ctx.engine.apply(
                    std::slice::from_ref(&link),
                    EffectSpec::class("animate-rubber-band"),
                    0,
                );
            }
        };
        listen_mouse(link.element(), "mouseenter", enter);

        let settle = {
            let ctx = Rc::clone(ctx);
            let id = link.id();
            move |_event: Event| {
                ctx.engine.revert_target(id);
            }
        };
        listen_event(link.element(), "animationend", settle);
    }
}

fn wire_hover_lift(ctx: &Ctx) {
    let Ok(cards) = ctx.registry.targets(Role::Card) else {
        return;
    };
    for card in cards {
        let enter = {
            let ctx = Rc::clone(ctx);
            let card = card.clone();
            move |_event: MouseEvent| {
                ctx.engine.apply(
                    std::slice::from_ref(&card),
                    EffectSpec::class("hover-lift"),
                    0,
                );
            }
        };
        listen_mouse(card.element(), "mouseenter", enter);

        let leave = {
            let ctx = Rc::clone(ctx);
            let id = card.id();
            move |_event: MouseEvent| {
                ctx.engine.revert_target(id);
            }
        };
        listen_mouse(card.element(), "mouseleave", leave);
    }
}

fn wire_magnetic(ctx: &Ctx) {
    let Ok(magnets) = ctx.registry.targets(Role::Magnetic) else {
        return;
    };
    for magnet in magnets {
        let follow = {
            let magnet = magnet.clone();
            move |event: MouseEvent| {
                let rect = magnet.element().get_bounding_client_rect();
                let x = f64::from(event.client_x()) - rect.left() - rect.width() / 2.0;
                let y = f64::from(event.client_y()) - rect.top() - rect.height() / 2.0;
                if let Some(html) = magnet.element().dyn_ref::<HtmlElement>() {
                    let _ = html.style().set_property(
                        "transform",
                        &format!(
                            "translate({:.2}px, {:.2}px)",
                            x * MAGNETIC_PULL,
                            y * MAGNETIC_PULL
                        ),
                    );
                }
            }
        };
        listen_mouse(magnet.element(), "mousemove", follow);

        let release = {
            let magnet = magnet.clone();
            move |_event: MouseEvent| {
                if let Some(html) = magnet.element().dyn_ref::<HtmlElement>() {
                    let _ = html.style().set_property("transform", "translate(0px, 0px)");
                }
            }
        };
        listen_mouse(magnet.element(), "mouseleave", release);
    }
}

/// Continuous pointer decoration: one mark per move event, direct DOM writes,
/// nothing scheduled. Only the newest few marks survive.
fn wire_mouse_trail(ctx: &Ctx, document: &Document) {
    let handler = {
        let ctx = Rc::clone(ctx);
        move |event: MouseEvent| {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let Some(body) = document.body() else {
                return;
            };
            let Ok(mark) = document.create_element("div") else {
                return;
            };
            mark.set_class_name("mouse-trail");
            if let Some(html) = mark.dyn_ref::<HtmlElement>() {
                let style = html.style();
                let _ = style.set_property("left", &format!("{}px", event.client_x()));
                let _ = style.set_property("top", &format!("{}px", event.client_y()));
            }
            let _ = body.append_child(mark.as_ref());

            let mut trail = ctx.trail.borrow_mut();
            trail.push_back(mark);
            while trail.len() > TRAIL_CAP {
                if let Some(stale) = trail.pop_front() {
                    stale.remove();
                }
            }
        }
    };
    listen_mouse(document, "mousemove", handler);
}

fn wire_particles(ctx: &Ctx, document: &Document) {
    let Some(body) = document.body() else {
        return;
    };
    let Ok(container) = document.create_element("div") else {
        return;
    };
    container.set_class_name("particle-bg");
    let _ = body.append_child(container.as_ref());

    for index in 0..PARTICLE_BURST {
        let ctx = Rc::clone(ctx);
        let container = container.clone();
        Timeout::new(index * PARTICLE_BURST_STEP_MS, move || {
            spawn_particle(&ctx, &container);
        })
        .forget();
    }

    let ctx = Rc::clone(ctx);
    Interval::new(PARTICLE_INTERVAL_MS, move || {
        spawn_particle(&ctx, &container);
    })
    .forget();
}

fn spawn_particle(ctx: &Ctx, container: &Element) {
    let Some(document) = window().and_then(|w| w.document()) else {
        return;
    };
    let Ok(particle) = document.create_element("div") else {
        return;
    };
    particle.set_class_name("particle");

    if let Some(html) = particle.dyn_ref::<HtmlElement>() {
        let style = html.style();
        let _ = style.set_property("left", &format!("{:.2}%", js_sys::Math::random() * 100.0));
        let _ = style.set_property("top", &format!("{:.2}%", js_sys::Math::random() * 100.0));
        let size = js_sys::Math::random() * 4.0 + 2.0;
        let _ = style.set_property("width", &format!("{size:.2}px"));
        let _ = style.set_property("height", &format!("{size:.2}px"));
    }
    let _ = container.append_child(particle.as_ref());

    let life = PARTICLE_MIN_LIFE_MS
        + (js_sys::Math::random() * (PARTICLE_MAX_LIFE_MS - PARTICLE_MIN_LIFE_MS) as f64) as TimeMs;
    let drift = style_spec(&[(
        "animation-duration",
        &format!("{:.2}s", life as f64 / 1000.0),
    )]);

    let target = DomTarget::new(ctx.next_id(), particle);
    ctx.engine.register_ephemeral(&target);
    ctx.engine.apply(&[target], drift.lasting(life), 0);
}

fn wire_forms(ctx: &Ctx) {
    let Ok(fields) = ctx.registry.targets(Role::FormField) else {
        return;
    };
    for field in fields {
        let focus = {
            let ctx = Rc::clone(ctx);
            let field = field.clone();
            move |_event: FocusEvent| {
                if let Some(parent) = field.element().parent_element() {
                    let _ = parent.class_list().add_1("focused");
                }
                ctx.engine.apply(
                    std::slice::from_ref(&field),
                    EffectSpec::class("animate-pulse"),
                    0,
                );
            }
        };
        listen_focus(field.element(), "focus", focus);

        let blur = {
            let ctx = Rc::clone(ctx);
            let field = field.clone();
            move |_event: FocusEvent| {
                if field_value(field.element()).is_empty() {
                    if let Some(parent) = field.element().parent_element() {
                        let _ = parent.class_list().remove_1("focused");
                    }
                }
                ctx.engine.revert_target(field.id());
            }
        };
        listen_focus(field.element(), "blur", blur);

        let typing = {
            let ctx = Rc::clone(ctx);
            let field = field.clone();
            move |_event: Event| {
                if !field_value(field.element()).is_empty() {
                    ctx.engine.apply(
                        std::slice::from_ref(&field),
                        EffectSpec::class("animate-shake")
                            .with_exit_class("typed")
                            .lasting(SHAKE_MS),
                        0,
                    );
                }
            }
        };
        listen_event(field.element(), "input", typing);
    }
}

fn field_value(element: &Element) -> String {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        input.value()
    } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        area.value()
    } else {
        String::new()
    }
}

fn wire_smooth_scroll(ctx: &Ctx) {
    let Ok(anchors) = ctx.registry.targets(Role::AnchorLink) else {
        return;
    };
    let reduced = ctx.capabilities.reduced_motion;
    for anchor in anchors {
        let handler = {
            let ctx = Rc::clone(ctx);
            let anchor = anchor.clone();
            move |event: MouseEvent| {
                event.prevent_default();
                let Some(href) = anchor.element().get_attribute("href") else {
                    return;
                };
                let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                    return;
                };
                let Ok(Some(section)) = document.query_selector(&href) else {
                    return;
                };

                ctx.engine.apply(
                    std::slice::from_ref(&anchor),
                    EffectSpec::class("animate-bounce-in").lasting(BOUNCE_IN_MS),
                    0,
                );

                let options = ScrollIntoViewOptions::new();
                options.set_behavior(if reduced {
                    ScrollBehavior::Auto
                } else {
                    ScrollBehavior::Smooth
                });
                options.set_block(ScrollLogicalPosition::Start);
                section.scroll_into_view_with_scroll_into_view_options(&options);
            }
        };
        listen_mouse(anchor.element(), "click", handler);
    }
}

fn wire_loading_overlay(ctx: &Ctx, document: &Document) {
    let Some(body) = document.body() else {
        return;
    };
    let Ok(overlay) = document.create_element("div") else {
        return;
    };
    overlay.set_class_name("loading-screen");
    overlay.set_inner_html("<div class=\"loading-spinner\"></div>");
    let _ = body.append_child(overlay.as_ref());

    if document.ready_state() == DocumentReadyState::Complete {
        fade_out_overlay(ctx, overlay);
        return;
    }

    let Some(window) = window() else {
        return;
    };
    let handler = {
        let ctx = Rc::clone(ctx);
        move |_event: Event| {
            fade_out_overlay(&ctx, overlay.clone());
        }
    };
    listen_event(&window, "load", handler);
}

fn fade_out_overlay(ctx: &Ctx, overlay: Element) {
    if let Some(body) = window().and_then(|w| w.document()).and_then(|d| d.body()) {
        let _ = body.class_list().add_1("loaded");
    }
    let ctx = Rc::clone(ctx);
    Timeout::new(OVERLAY_LINGER_MS, move || {
        let target = DomTarget::new(ctx.next_id(), overlay);
        ctx.engine.register_ephemeral(&target);
        let fade = style_spec(&[("transition", "opacity 0.5s ease"), ("opacity", "0")]);
        ctx.engine.apply(&[target], fade.lasting(OVERLAY_FADE_MS), 0);
    })
    .forget();
}

/// Count frames per second; under sustained low frame rate, shorten every
/// running effect to the degradation floor and stand down.
fn monitor_frame_rate(ctx: &Ctx) {
    let ctx = Rc::clone(ctx);
    let frames = Cell::new(0u32);
    let window_start = Cell::new(now_ms());

    let raf: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let raf_handle = Rc::clone(&raf);

    *raf.borrow_mut() = Some(Closure::new(move || {
        frames.set(frames.get() + 1);
        let now = now_ms();
        let elapsed = now.saturating_sub(window_start.get());
        if elapsed >= 1_000 {
            let fps = (u64::from(frames.get()) * 1_000 / elapsed) as u32;
            if fps < MIN_FPS {
                ctx.engine.degrade();
                return;
            }
            frames.set(0);
            window_start.set(now);
        }
        request_next_frame(&raf_handle);
    }));

    request_next_frame(&raf);
}

fn request_next_frame(raf: &Rc<RefCell<Option<Closure<dyn FnMut()>>>>) {
    let Some(window) = window() else {
        return;
    };
    if let Some(callback) = raf.borrow().as_ref() {
        let _ = window.request_animation_frame(callback.as_ref().unchecked_ref());
    }
}

// ---------------------------------------------------------------------------
// Page

#[function_component(App)]
fn app() -> Html {
    let preference = use_mut_ref(|| ThemePreference::load(LocalStorageStore));
    let theme = use_state(|| preference.borrow().current());
    let fx = use_mut_ref(|| None::<Ctx>);

    {
        let current = *theme;
        let fx = fx.clone();
        use_effect_with((), move |_| {
            apply_theme(current);
            *fx.borrow_mut() = boot_effects();
            || ()
        });
    }

    let on_toggle = {
        let theme = theme.clone();
        let preference = preference.clone();
        let fx = fx.clone();
        Callback::from(move |_| {
            let next = preference.borrow_mut().toggle();
            apply_theme_with_transition(next);
            if let Some(ctx) = fx.borrow().as_ref() {
                if let Ok(toggle) = ctx.registry.first(Role::ThemeToggle) {
                    ctx.engine.apply(
                        std::slice::from_ref(toggle),
                        EffectSpec::class("animate-tada").lasting(TADA_MS),
                        0,
                    );
                }
            }
            theme.set(next);
        })
    };

    let icon_style = if (*theme).pressed() {
        "display: inline-block; transition: all 0.3s ease; transform: rotate(180deg);"
    } else {
        "display: inline-block; transition: all 0.3s ease; transform: rotate(0deg);"
    };

    html! {
        <>
            <a class="skip-link" href="#home">{"Skip to main content"}</a>
            <nav class="navbar">
                <a class="nav-brand" href="#home">{"Avery Lane"}</a>
                <button class="hamburger" type="button" aria-label="Toggle navigation menu">
                    <span class="bar"></span>
                    <span class="bar"></span>
                    <span class="bar"></span>
                </button>
                <ul class="nav-menu">
                    <li><a class="nav-link" href="#home">{"Home"}</a></li>
                    <li><a class="nav-link" href="#about">{"About"}</a></li>
                    <li><a class="nav-link" href="#skills">{"Skills"}</a></li>
                    <li><a class="nav-link" href="#projects">{"Projects"}</a></li>
                    <li><a class="nav-link" href="#contact">{"Contact"}</a></li>
                </ul>
                <button
                    class="theme-toggle"
                    type="button"
                    aria-label={(*theme).toggle_label()}
                    aria-pressed={(*theme).pressed().to_string()}
                    onclick={on_toggle}
                >
                    <span aria-hidden="true" style={icon_style}>{(*theme).icon()}</span>
                </button>
            </nav>

            <main id="content">
                <section id="home" class="hero">
                    <h1 class="hero-title">{"Avery Lane"}</h1>
                    <p class="hero-subtitle">{"Software engineer"}</p>
                    <p class="hero-description">
                        {"I build fast, accessible interfaces and the services behind them."}
                    </p>
                    <div class="hero-buttons">
                        <a class="btn btn-primary" href="#projects">{"View work"}</a>
                        <a class="btn btn-secondary" href="#contact">{"Get in touch"}</a>
                    </div>
                    <div class="hero-image" aria-hidden="true">{"◢◤"}</div>
                </section>

                <section id="about">
                    <h2>{"About"}</h2>
                    <div class="about-content">
                        <p>
                            {"Engineer with a soft spot for interfaces that feel alive \
                              without getting in the way. Most of my work sits where \
                              design systems meet the event loop."}
                        </p>
                        <div class="stats">
                            <div class="stat">
                                <h3>{"6"}</h3>
                                <p>{"years shipping"}</p>
                            </div>
                            <div class="stat">
                                <h3>{"24"}</h3>
                                <p>{"projects delivered"}</p>
                            </div>
                            <div class="stat">
                                <h3>{"3"}</h3>
                                <p>{"conference talks"}</p>
                            </div>
                        </div>
                    </div>
                </section>

                <section id="skills">
                    <h2>{"Skills"}</h2>
                    <div class="skills-grid">
                        <div class="skill-category">
                            <h3>{"Languages"}</h3>
                            <ul>
                                <li class="skill-item">{"Rust"}</li>
                                <li class="skill-item">{"TypeScript"}</li>
                                <li class="skill-item">{"Python"}</li>
                            </ul>
                        </div>
                        <div class="skill-category">
                            <h3>{"Frontend"}</h3>
                            <ul>
                                <li class="skill-item">{"WebAssembly"}</li>
                                <li class="skill-item">{"CSS architecture"}</li>
                                <li class="skill-item">{"Accessibility"}</li>
                            </ul>
                        </div>
                        <div class="skill-category">
                            <h3>{"Backend"}</h3>
                            <ul>
                                <li class="skill-item">{"axum"}</li>
                                <li class="skill-item">{"PostgreSQL"}</li>
                                <li class="skill-item">{"Observability"}</li>
                            </ul>
                        </div>
                    </div>
                </section>

                <section id="projects">
                    <h2>{"Projects"}</h2>
                    <div class="projects-grid">
                        <div class="project-card">
                            <h3>{"Driftline"}</h3>
                            <p>{"A collaborative moodboard with sub-frame sync."}</p>
                        </div>
                        <div class="project-card">
                            <h3>{"Ledgerlight"}</h3>
                            <p>{"Self-hosted budgeting with plain-text storage."}</p>
                        </div>
                        <div class="project-card">
                            <h3>{"Murmur"}</h3>
                            <p>{"Ambient soundscapes generated in the browser."}</p>
                        </div>
                    </div>
                </section>

                <section id="contact">
                    <h2>{"Contact"}</h2>
                    <div class="contact-content">
                        <div class="contact-method">
                            <h3>{"Email"}</h3>
                            <p>{"hello@averylane.dev"}</p>
                        </div>
                        <form class="contact-form">
                            <div class="form-group">
                                <label for="name">{"Name"}</label>
                                <input id="name" name="name" type="text" />
                            </div>
                            <div class="form-group">
                                <label for="email">{"Email"}</label>
                                <input id="email" name="email" type="email" />
                            </div>
                            <div class="form-group">
                                <label for="message">{"Message"}</label>
                                <textarea id="message" name="message" rows="5"></textarea>
                            </div>
                            <button class="btn btn-primary" type="submit">{"Send"}</button>
                        </form>
                        <div class="social-links">
                            <a class="social-link" href="https://github.com/averylane" target="_blank" rel="noopener noreferrer">{"GitHub"}</a>
                            <a class="social-link" href="https://www.linkedin.com/in/averylane" target="_blank" rel="noopener noreferrer">{"LinkedIn"}</a>
                        </div>
                    </div>
                </section>
            </main>
        </>
    }
}

pub fn run() {
    yew::Renderer::<App>::with_root(
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
    )
    .render();
}
