// Browser binding. Owns the page state behind one `Rc<RefCell<..>>`, wires
// DOM events to the pure components and drives everything from a single
// animation-frame loop.
//
// Event listeners hold a `Weak` to the state and use `try_borrow_mut`, so an
// event dispatched while the state is borrowed is dropped instead of panicking.
// Animator callbacks only ever capture element handles.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use gloo::events::{EventListener, EventListenerOptions};
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::Timeout;
use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlInputElement, HtmlTextAreaElement, KeyboardEvent,
    MouseEvent, Node, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

use crate::animator::{FrameAnimator, TimerSlots};
use crate::decor::{scatter_particles, scatter_sparkles, Decor};
use crate::effects::{self, EffectRequest, ParticleField, ParticleOptions, WAVE_KEYFRAMES};
use crate::error::SiteError;
use crate::form::{
    validate_field, ButtonState, CharacterBudget, ContactForm, FieldResult, SimulatedEndpoint,
    SubmitStart,
};
use crate::gallery::{
    overlay_links, search_caption, showing_caption, DetailRecord, GalleryFilterIndex,
    ItemDescriptor, ReadMore,
};
use crate::modal::{DetailContent, DetailView, LinkKind, ModalPresenter};
use crate::nav::{
    classify_link, parallax_offset, parse_parallax_speed, play_state, Accordion, FrameGate,
    LinkIntent, NavState,
};
use crate::notify::{clipboard_notification, Notification, NotificationCenter, ToastEvent};
use crate::pointer::{PointerEffect, PointerEffectBinder, RenderMode};
use crate::reveal::{RevealOptions, ViewportRevealTracker};
use crate::surface::{Bounded, ClassSlot, StyleSlot, TextSlot};
use crate::types::{css_number, ElementId, Point, Rect, SiteConfig, Timestamp};

const MODAL_MARKUP: &str = r#"<div class="project-modal" id="project-modal">
  <div class="modal-overlay"></div>
  <div class="modal-content">
    <button class="modal-close">&times;</button>
    <div class="modal-body">
      <div class="modal-image"><img src="" alt=""></div>
      <div class="modal-info">
        <h2 class="modal-title"></h2>
        <p class="modal-description"></p>
        <div class="modal-tech"></div>
        <div class="modal-links">
          <a href="#" class="btn btn-secondary modal-github" style="display:none"><i class="fab fa-github"></i> View Code</a>
          <a href="#" class="btn btn-secondary modal-design" style="display:none"><i class="fas fa-palette"></i> View Design</a>
          <a href="#" class="btn btn-secondary modal-prototype" style="display:none"><i class="fas fa-play-circle"></i> View Prototype</a>
        </div>
        <div class="modal-features"><h3>Key Features</h3><ul class="features-list"></ul></div>
      </div>
    </div>
  </div>
</div>"#;

const MODAL_STYLES: &str = ".project-modal{position:fixed;inset:0;z-index:10000;display:none;align-items:center;justify-content:center;padding:2rem}\
.modal-overlay{position:absolute;inset:0;background:rgba(0,0,0,.8);backdrop-filter:blur(5px)}\
.modal-content{position:relative;max-width:900px;width:100%;max-height:90vh;overflow-y:auto;border-radius:20px;background:var(--bg-primary,#fff);transform:scale(.8);opacity:0;transition:all .3s ease}\
.project-modal.active .modal-content{transform:scale(1);opacity:1}\
.modal-close{position:absolute;top:1rem;right:1rem;z-index:1;border:none;background:none;font-size:2rem;cursor:pointer}";

const TOAST_STYLE: &str = "position:fixed;top:2rem;right:2rem;padding:1rem 1.5rem;border-radius:10px;color:white;font-weight:500;z-index:10000;transform:translateX(100%);transition:transform 0.3s ease;max-width:400px;box-shadow:0 10px 30px rgba(0,0,0,0.2)";

/// A DOM element seen through the surface capabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct DomElement(HtmlElement);

impl DomElement {
    pub fn new(element: HtmlElement) -> Self {
        DomElement(element)
    }

    fn from_element(element: Element) -> Option<Self> {
        element.dyn_into::<HtmlElement>().ok().map(DomElement)
    }

    pub fn element(&self) -> &HtmlElement {
        &self.0
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.0.get_attribute(name)
    }

    fn set_attr(&self, name: &str, value: &str) {
        if let Err(err) = self.0.set_attribute(name, value) {
            tracing::warn!(name, error = ?err, "set_attribute failed");
        }
    }

    pub fn text(&self) -> String {
        self.0.text_content().unwrap_or_default()
    }

    fn find(&self, selector: &str) -> Option<DomElement> {
        self.0
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(DomElement::from_element)
    }

    fn find_all(&self, selector: &str) -> Vec<DomElement> {
        match self.0.query_selector_all(selector) {
            Ok(nodes) => collect_nodes(&nodes),
            Err(err) => {
                tracing::warn!(selector, error = ?err, "invalid selector");
                Vec::new()
            }
        }
    }

    fn parent(&self) -> Option<DomElement> {
        self.0.parent_element().and_then(DomElement::from_element)
    }

    fn append(&self, child: &DomElement) {
        if let Err(err) = self.0.append_child(&child.0) {
            tracing::warn!(error = ?err, "append_child failed");
        }
    }

    fn contains_target(&self, event: &Event) -> bool {
        let target = event.target().and_then(|t| t.dyn_into::<Node>().ok());
        self.0.contains(target.as_ref())
    }
}

impl TextSlot for DomElement {
    fn set_text(&self, text: &str) {
        self.0.set_text_content(Some(text));
    }
}

impl StyleSlot for DomElement {
    fn set_style(&self, property: &str, value: &str) {
        let style = self.0.style();
        let result = if value.is_empty() {
            style.remove_property(property).map(|_| ())
        } else {
            style.set_property(property, value)
        };
        if let Err(err) = result {
            tracing::warn!(property, error = ?err, "style update failed");
        }
    }
}

impl ClassSlot for DomElement {
    fn add_class(&self, class: &str) {
        if let Err(err) = self.0.class_list().add_1(class) {
            tracing::warn!(class, error = ?err, "classList.add failed");
        }
    }

    fn remove_class(&self, class: &str) {
        if let Err(err) = self.0.class_list().remove_1(class) {
            tracing::warn!(class, error = ?err, "classList.remove failed");
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.class_list().contains(class)
    }
}

impl Bounded for DomElement {
    fn bounds(&self) -> Rect {
        let rect = self.0.get_bounding_client_rect();
        Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
    }
}

fn collect_nodes(nodes: &web_sys::NodeList) -> Vec<DomElement> {
    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
        .map(DomElement)
        .collect()
}

fn unavailable(capability: &str, message: impl Into<String>) -> SiteError {
    SiteError::IntegrationUnavailable {
        capability: capability.to_string(),
        message: message.into(),
    }
}

fn js_unavailable(capability: &'static str) -> impl Fn(JsValue) -> SiteError {
    move |err| unavailable(capability, format!("{err:?}"))
}

fn now() -> Timestamp {
    let millis = web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or_else(js_sys::Date::now);
    Timestamp::from_millis(millis)
}

fn viewport(window: &Window) -> Rect {
    let dimension = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Rect::new(
        0.0,
        0.0,
        dimension(window.inner_width()),
        dimension(window.inner_height()),
    )
}

/// Name and current value of a form control.
fn field_value(element: &HtmlElement) -> Option<(String, String)> {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        Some((input.name(), input.value()))
    } else {
        element
            .dyn_ref::<HtmlTextAreaElement>()
            .map(|area| (area.name(), area.value()))
    }
}

fn clear_field(element: &HtmlElement) {
    if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
        input.set_value("");
    } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
        area.set_value("");
    }
}

/// What a registered reveal target does when it enters the viewport.
#[derive(Debug, Clone)]
enum RevealAction {
    Entrance,
    /// Entrance, then stagger the container's children in.
    Stagger(Vec<DomElement>),
    Counter(i64),
    SkillBar(String),
    Animate,
    ScrollBand,
    Rise { delay_ms: f64 },
}

#[derive(Debug, Clone)]
struct RevealTarget {
    element: DomElement,
    action: RevealAction,
}

impl Bounded for RevealTarget {
    fn bounds(&self) -> Rect {
        self.element.bounds()
    }
}

#[derive(Debug, Clone, Copy)]
enum ParallaxKind {
    /// `--scroll-y` custom property at the configured rate.
    Variable(f64),
    /// `data-parallax` translate at its own speed.
    Translate(f64),
}

#[derive(Debug, Clone)]
struct ParallaxTarget {
    element: DomElement,
    kind: ParallaxKind,
}

impl ParallaxTarget {
    fn apply(&self, scroll_y: f64) {
        match self.kind {
            ParallaxKind::Variable(rate) => self.element.set_style(
                "--scroll-y",
                &format!("{}px", css_number(parallax_offset(scroll_y, rate))),
            ),
            ParallaxKind::Translate(speed) => self.element.set_style(
                "transform",
                &format!("translateY({}px)", parallax_offset(scroll_y, speed)),
            ),
        }
    }
}

struct NavParts {
    navbar: DomElement,
    hamburger: Option<DomElement>,
    menu: Option<DomElement>,
}

impl NavParts {
    fn apply(&self, nav: &NavState) {
        match (&self.hamburger, &self.menu) {
            (Some(hamburger), Some(menu)) => nav.apply(&self.navbar, hamburger, menu),
            _ => self.navbar.set_class("scrolled", nav.is_scrolled()),
        }
    }
}

struct ParticleLayer {
    container: DomElement,
    field: ParticleField,
    dots: Vec<DomElement>,
}

impl ParticleLayer {
    fn step(&mut self) {
        self.field.step();
        for (dot, particle) in self.dots.iter().zip(self.field.particles()) {
            dot.set_style("left", &format!("{}px", particle.x));
            dot.set_style("top", &format!("{}px", particle.y));
        }
    }

    fn resize(&mut self) {
        let bounds = self.container.bounds();
        self.field.resize(bounds.width, bounds.height);
    }
}

/// Modal surface over the injected modal markup.
pub struct DomModalView {
    root: DomElement,
    body: DomElement,
    title: Option<DomElement>,
    description: Option<DomElement>,
    image: Option<DomElement>,
    tech: Option<DomElement>,
    features: Option<DomElement>,
    links: Vec<(LinkKind, DomElement)>,
    document: Document,
}

impl DomModalView {
    fn new(root: DomElement, body: DomElement, document: Document) -> Self {
        let links = [
            (LinkKind::Code, ".modal-github"),
            (LinkKind::Design, ".modal-design"),
            (LinkKind::Prototype, ".modal-prototype"),
        ]
        .into_iter()
        .filter_map(|(kind, selector)| root.find(selector).map(|link| (kind, link)))
        .collect();

        DomModalView {
            title: root.find(".modal-title"),
            description: root.find(".modal-description"),
            image: root.find(".modal-image img"),
            tech: root.find(".modal-tech"),
            features: root.find(".features-list"),
            links,
            root,
            body,
            document,
        }
    }

    fn fill_list(&self, parent: &DomElement, tag: &str, class: Option<&str>, entries: &[String]) {
        parent.0.set_inner_html("");
        for entry in entries {
            let Some(child) = create(&self.document, tag) else {
                continue;
            };
            if let Some(class) = class {
                child.add_class(class);
            }
            child.set_text(entry);
            parent.append(&child);
        }
    }
}

impl DetailView for DomModalView {
    fn render(&self, content: &DetailContent) {
        if let Some(title) = &self.title {
            title.set_text(&content.title);
        }
        if let Some(description) = &self.description {
            description.set_text(&content.description);
        }
        if let Some(image) = &self.image {
            image.set_attr("src", &content.image);
            image.set_attr("alt", &content.title);
        }
        if let Some(tech) = &self.tech {
            self.fill_list(tech, "span", Some("tech-tag"), &content.tags);
        }
        if let Some(features) = &self.features {
            self.fill_list(features, "li", None, &content.features);
        }

        for (kind, link) in &self.links {
            match content.links.iter().find(|l| l.kind == *kind) {
                Some(detail) => {
                    link.set_attr("href", &detail.href);
                    link.set_attr("target", "_blank");
                    link.set_style("display", "inline-flex");
                }
                None => link.set_style("display", "none"),
            }
        }
    }

    fn set_displayed(&self, displayed: bool) {
        self.root
            .set_style("display", if displayed { "flex" } else { "none" });
    }

    fn set_active(&self, active: bool) {
        self.root.set_class("active", active);
    }

    fn lock_scroll(&self, locked: bool) {
        if locked {
            self.body.set_style("overflow", "hidden");
        } else {
            self.body.clear_style("overflow");
        }
    }
}

fn create(document: &Document, tag: &str) -> Option<DomElement> {
    match document.create_element(tag) {
        Ok(element) => DomElement::from_element(element),
        Err(err) => {
            tracing::warn!(tag, error = ?err, "createElement failed");
            None
        }
    }
}

fn select_all(document: &Document, selector: &str) -> Vec<DomElement> {
    match document.query_selector_all(selector) {
        Ok(nodes) => collect_nodes(&nodes),
        Err(err) => {
            tracing::warn!(selector, error = ?err, "invalid selector");
            Vec::new()
        }
    }
}

fn select(document: &Document, selector: &str) -> Option<DomElement> {
    document
        .query_selector(selector)
        .ok()
        .flatten()
        .and_then(DomElement::from_element)
}

struct Contact {
    form: ContactForm,
    endpoint: SimulatedEndpoint,
    fields: Vec<DomElement>,
    button: Option<DomElement>,
    label: Option<DomElement>,
    icon: Option<DomElement>,
}

impl Contact {
    fn apply_button(&self, state: &ButtonState) {
        if let Some(label) = &self.label {
            label.set_text(&state.label);
        }
        if let Some(icon) = &self.icon {
            icon.0.set_class_name(&state.icon_class);
        }
        if let Some(button) = &self.button {
            if state.disabled {
                button.set_attr("disabled", "");
            } else if let Err(err) = button.0.remove_attribute("disabled") {
                tracing::warn!(error = ?err, "removeAttribute failed");
            }
        }
    }

    fn values(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .filter_map(|field| field_value(field.element()))
            .collect()
    }

    fn reset(&self) {
        for field in &self.fields {
            clear_field(field.element());
            field.remove_class("error");
            field.remove_class("success");
            if let Some(group) = field.parent() {
                group.remove_class("focused");
            }
        }
    }
}

type SharedPage = Rc<RefCell<PageState>>;
type WeakPage = Weak<RefCell<PageState>>;

/// Run `f` against the page if it is still mounted and not already borrowed.
fn with_page<R>(page: &WeakPage, f: impl FnOnce(&mut PageState) -> R) -> Option<R> {
    let page = page.upgrade()?;
    let mut state = match page.try_borrow_mut() {
        Ok(state) => state,
        Err(_) => {
            tracing::trace!("page busy, event dropped");
            return None;
        }
    };
    let result = f(&mut state);
    Some(result)
}

struct PageState {
    this: WeakPage,
    config: SiteConfig,
    window: Window,
    document: Document,
    body: Option<DomElement>,
    animator: FrameAnimator,
    reveal: ViewportRevealTracker<RevealTarget>,
    pointer: PointerEffectBinder,
    nav: NavState,
    nav_parts: Option<NavParts>,
    scroll_gate: FrameGate,
    parallax: Vec<ParallaxTarget>,
    notifications: NotificationCenter,
    toast: Option<(u64, DomElement)>,
    modal: Option<ModalPresenter<DomModalView>>,
    gallery: GalleryFilterIndex,
    cards: Vec<DomElement>,
    card_timers: TimerSlots,
    link_timers: TimerSlots,
    contact: Option<Contact>,
    faq: Accordion,
    faq_items: Vec<DomElement>,
    decor: Decor,
    particle_layers: Vec<ParticleLayer>,
    frame: Option<AnimationFrame>,
    submission: Option<Timeout>,
    navigation: Option<Timeout>,
}

impl PageState {
    fn new(this: WeakPage, config: SiteConfig, window: Window, document: Document) -> Self {
        PageState {
            this,
            nav: NavState::new(config.motion.nav_scroll_threshold),
            notifications: NotificationCenter::new(config.contact.notification_ms),
            body: document.body().map(DomElement),
            gallery: GalleryFilterIndex::new(Vec::new(), &config.gallery.projects),
            config,
            window,
            document,
            animator: FrameAnimator::new(),
            reveal: ViewportRevealTracker::new(),
            pointer: PointerEffectBinder::new(),
            nav_parts: None,
            scroll_gate: FrameGate::default(),
            parallax: Vec::new(),
            toast: None,
            modal: None,
            cards: Vec::new(),
            card_timers: TimerSlots::default(),
            link_timers: TimerSlots::default(),
            contact: None,
            faq: Accordion::new(),
            faq_items: Vec::new(),
            decor: Decor::new(js_sys::Math::random),
            particle_layers: Vec::new(),
            frame: None,
            submission: None,
            navigation: None,
        }
    }

    fn ensure_frame(&mut self) {
        if self.frame.is_some() {
            return;
        }
        let page = self.this.clone();
        self.frame = Some(request_animation_frame(move |timestamp| {
            with_page(&page, |state| {
                state.frame.take();
                state.on_frame(Timestamp::from_millis(timestamp));
            });
        }));
    }

    fn needs_frame(&self) -> bool {
        self.scroll_gate.is_pending()
            || self.animator.has_active()
            || self.notifications.is_active()
            || self.modal.as_ref().is_some_and(|modal| modal.is_transitioning())
            || !self.particle_layers.is_empty()
    }

    fn on_frame(&mut self, now: Timestamp) {
        if self.scroll_gate.is_pending() {
            self.scroll_gate.complete();
            self.on_scroll(now);
        }
        self.animator.tick(now);
        for event in self.notifications.tick(now) {
            self.apply_toast(event);
        }
        if let Some(modal) = self.modal.as_mut() {
            modal.tick(now);
        }
        if !self.animator.is_hidden() {
            for layer in &mut self.particle_layers {
                layer.step();
            }
        }
        if self.needs_frame() {
            self.ensure_frame();
        }
    }

    /// Scroll-linked work: navbar, parallax and reveal evaluation.
    fn on_scroll(&mut self, now: Timestamp) {
        let scroll_y = self.window.scroll_y().unwrap_or(0.0);
        if self.nav.on_scroll(scroll_y) {
            if let Some(parts) = &self.nav_parts {
                parts.apply(&self.nav);
            }
        }
        for target in &self.parallax {
            target.apply(scroll_y);
        }

        let viewport = viewport(&self.window);
        let PageState {
            reveal,
            animator,
            config,
            ..
        } = self;
        let motion = &config.motion;
        let changed = reveal.evaluate(viewport, |transition| {
            let element = transition.handle.element.clone();
            match &transition.handle.action {
                RevealAction::Entrance => {
                    element.add_class("animated");
                    element.add_class("visible");
                }
                RevealAction::Stagger(children) => {
                    element.add_class("animated");
                    effects::stagger(
                        animator,
                        now,
                        children.clone(),
                        "animated",
                        0.0,
                        motion.stagger_delay_ms,
                    );
                }
                RevealAction::Counter(target) => {
                    effects::animate_counter(
                        animator,
                        now,
                        element,
                        0,
                        *target,
                        motion.counter_duration_ms,
                    );
                }
                RevealAction::SkillBar(width) => element.set_style("width", width),
                RevealAction::Animate => element.add_class("animate"),
                RevealAction::ScrollBand => element.set_class("revealed", transition.revealed),
                RevealAction::Rise { delay_ms } => {
                    animator.after(now, *delay_ms, move || {
                        element.set_style("opacity", "1");
                        element.set_style("transform", "translateY(0)");
                    });
                }
            }
        });
        if changed > 0 {
            tracing::trace!(changed, "reveal transitions applied");
        }
    }

    fn request_scroll_frame(&mut self) {
        if self.scroll_gate.request() {
            self.ensure_frame();
        }
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.animator.set_hidden(hidden, now());
        if let Some(body) = &self.body {
            body.set_style("animation-play-state", play_state(hidden));
        }
        if !hidden {
            self.ensure_frame();
        }
    }

    fn notify(&mut self, notification: Notification) {
        for event in self.notifications.show(notification, now()) {
            self.apply_toast(event);
        }
        self.ensure_frame();
    }

    fn apply_toast(&mut self, event: ToastEvent) {
        match event {
            ToastEvent::Mount {
                serial,
                notification,
            } => {
                let Some(toast) = create(&self.document, "div") else {
                    return;
                };
                toast.0.set_class_name(&format!(
                    "notification {}",
                    notification.kind.class_name()
                ));
                toast.set_attr("style", TOAST_STYLE);
                toast.set_style("background", notification.kind.background());
                toast.set_text(&notification.message);
                if let Some(body) = &self.body {
                    body.append(&toast);
                }
                self.toast = Some((serial, toast));
            }
            ToastEvent::SlideIn { serial } => self.with_toast(serial, |toast| {
                toast.set_style("transform", "translateX(0)");
            }),
            ToastEvent::SlideOut { serial } => self.with_toast(serial, |toast| {
                toast.set_style("transform", "translateX(100%)");
            }),
            ToastEvent::Remove { serial } => {
                if self.toast.as_ref().is_some_and(|(current, _)| *current == serial) {
                    if let Some((_, toast)) = self.toast.take() {
                        toast.0.remove();
                    }
                }
            }
        }
    }

    fn with_toast(&self, serial: u64, f: impl FnOnce(&DomElement)) {
        if let Some((current, toast)) = &self.toast {
            if *current == serial {
                f(toast);
            }
        }
    }

    fn apply_filter(&mut self, category: &str, now: Timestamp) {
        let selection = self.gallery.filter(category);
        tracing::debug!(category, count = selection.count, "gallery filtered");

        for id in &selection.visible {
            let Some(card) = self.cards.get(id.as_u32() as usize).cloned() else {
                continue;
            };
            card.set_style("display", "block");
            let shown = card.clone();
            let timer = self.animator.after(now, 100.0, move || {
                shown.add_class("animate-scale");
                shown.add_class("animated");
            });
            self.card_timers
                .replace(&mut self.animator, id.as_u32() as usize, timer);
        }
        for id in &selection.hidden {
            let Some(card) = self.cards.get(id.as_u32() as usize).cloned() else {
                continue;
            };
            card.remove_class("animate-scale");
            card.remove_class("animated");
            let timer = self
                .animator
                .after(now, 300.0, move || card.set_style("display", "none"));
            self.card_timers
                .replace(&mut self.animator, id.as_u32() as usize, timer);
        }

        if let Some(caption) = self.gallery_caption("project-count") {
            caption.set_text(&showing_caption(selection.count));
        }
        self.ensure_frame();
    }

    fn show_card_links(&mut self, index: usize, links: Vec<DomElement>) {
        let timer = effects::show_links(&mut self.animator, now(), links, 100.0);
        self.link_timers.replace(&mut self.animator, index, timer);
        self.ensure_frame();
    }

    fn hide_card_links(&mut self, index: usize, links: &[DomElement]) {
        self.link_timers.cancel(&mut self.animator, index);
        effects::rest_links(links);
    }

    fn apply_search(&mut self, term: &str) {
        let selection = self.gallery.search(term);
        for (index, card) in self.cards.iter().enumerate() {
            let visible = selection.contains(ElementId::new(index as u32));
            self.card_timers.cancel(&mut self.animator, index);
            card.set_style("display", if visible { "block" } else { "none" });
            card.set_class("search-match", visible);
        }
        if let Some(caption) = self.gallery_caption("search-count") {
            match search_caption(selection.count, term) {
                Some(text) => {
                    caption.set_text(&text);
                    caption.set_style("display", "block");
                }
                None => caption.set_style("display", "none"),
            }
        }
    }

    /// Find or create a caption element just above the project grid.
    fn gallery_caption(&self, class: &str) -> Option<DomElement> {
        if let Some(existing) = select(&self.document, &format!(".{class}")) {
            return Some(existing);
        }
        let grid = select(&self.document, ".projects-grid")?;
        let parent = grid.0.parent_node()?;
        let caption = create(&self.document, "div")?;
        caption.add_class(class);
        let before: &Node = &grid.0;
        parent.insert_before(&caption.0, Some(before)).ok()?;
        Some(caption)
    }

    fn open_project(&mut self, id: ElementId) {
        let now = now();
        let PageState { modal, gallery, .. } = self;
        match (modal.as_mut(), gallery.get(id)) {
            (Some(modal), Some(item)) => modal.open(item, now),
            (_, None) => tracing::warn!(error = %SiteError::UnknownItem(id.as_u32().to_string()), "card without descriptor"),
            (None, _) => {}
        }
        self.ensure_frame();
    }

    fn close_project(&mut self) {
        if let Some(modal) = self.modal.as_mut() {
            modal.close(now());
        }
        self.ensure_frame();
    }

    fn show_field_result(&self, field: &DomElement, result: &FieldResult) {
        result.apply(field);
        let Some(group) = field.parent() else {
            return;
        };
        let existing = group.find(".field-error");
        match (&result.message, existing) {
            (Some(message), Some(error)) => error.set_text(message),
            (Some(message), None) => {
                if let Some(error) = create(&self.document, "div") {
                    error.add_class("field-error");
                    error.set_text(message);
                    group.append(&error);
                }
            }
            (None, Some(error)) => error.0.remove(),
            (None, None) => {}
        }
    }

    fn submit_contact(&mut self) {
        let Some(contact) = self.contact.as_mut() else {
            return;
        };
        let values = contact.values();
        match contact.form.begin_submit(&values) {
            SubmitStart::AlreadySending => {}
            SubmitStart::Invalid(report) => {
                let fields = contact.fields.clone();
                for field in &fields {
                    if let Some((name, _)) = field_value(field.element()) {
                        if let Some(result) = report.fields.get(&name) {
                            self.show_field_result(field, result);
                        }
                    }
                }
            }
            SubmitStart::Started(button) => {
                contact.apply_button(&button);
                let delay = contact.endpoint.delay_ms.max(0.0) as u32;
                let page = self.this.clone();
                self.submission = Some(Timeout::new(delay, move || {
                    with_page(&page, |state| state.settle_contact());
                }));
            }
        }
    }

    fn settle_contact(&mut self) {
        self.submission = None;
        let Some(contact) = self.contact.as_mut() else {
            return;
        };
        let result = contact.endpoint.settle(&mut js_sys::Math::random);
        let outcome = contact.form.finish_submit(result);
        contact.apply_button(&outcome.button);
        if outcome.reset_form {
            contact.reset();
        }
        self.notify(outcome.notification);
    }

    fn update_budget(&self, message: &DomElement, counter: &DomElement) {
        let text = field_value(message.element())
            .map(|(_, value)| value)
            .unwrap_or_default();
        let budget = CharacterBudget::measure(&text, self.config.contact.message_budget);
        counter.set_text(&budget.caption());
        counter.set_style("color", budget.color());

        message.set_style("height", "auto");
        message.set_style("height", &format!("{}px", message.0.scroll_height()));
    }

    fn navigate_after_transition(&mut self, href: String) {
        let overlay = match select(&self.document, ".page-transition") {
            Some(overlay) => overlay,
            None => {
                let Some(overlay) = create(&self.document, "div") else {
                    return;
                };
                overlay.add_class("page-transition");
                if let Some(body) = &self.body {
                    body.append(&overlay);
                }
                overlay
            }
        };
        overlay.add_class("active");

        let window = self.window.clone();
        let delay = self.config.motion.page_transition_ms.max(0.0) as u32;
        self.navigation = Some(Timeout::new(delay, move || {
            if let Err(err) = window.location().set_href(&href) {
                tracing::warn!(error = ?err, "navigation failed");
            }
        }));
    }

    fn play(&mut self, selector: &str, request: &EffectRequest) -> usize {
        let targets = select_all(&self.document, selector);
        let now = now();
        let fade = self.config.motion.fade_duration_ms;
        let frame_ms = self.config.motion.scramble_frame_ms;
        let stagger_ms = self.config.motion.stagger_delay_ms;

        for target in &targets {
            let target = target.clone();
            match request {
                EffectRequest::FadeIn { duration_ms } => {
                    effects::fade_in(&mut self.animator, now, target, duration_ms.unwrap_or(fade));
                }
                EffectRequest::FadeOut { duration_ms } => {
                    let start = self
                        .window
                        .get_computed_style(&target.0)
                        .ok()
                        .flatten()
                        .and_then(|style| style.get_property_value("opacity").ok())
                        .and_then(|value| value.parse::<f64>().ok())
                        .unwrap_or(1.0);
                    effects::fade_out(&mut self.animator, now, target, start, duration_ms.unwrap_or(fade));
                }
                EffectRequest::SlideIn {
                    direction,
                    duration_ms,
                } => {
                    effects::slide_in(&mut self.animator, now, target, *direction, duration_ms.unwrap_or(fade));
                }
                EffectRequest::ScaleIn { duration_ms } => {
                    effects::scale_in(&mut self.animator, now, target, duration_ms.unwrap_or(fade));
                }
                EffectRequest::Scramble { duration_ms } => {
                    let text = target.text();
                    effects::animate_scramble(
                        &mut self.animator,
                        now,
                        target,
                        text,
                        *duration_ms,
                        frame_ms,
                        js_sys::Math::random,
                    );
                }
                EffectRequest::Wave => self.wave(&target),
                EffectRequest::Stagger { class, delay_ms } => {
                    effects::stagger(
                        &mut self.animator,
                        now,
                        target.find_all(":scope > *"),
                        class.clone(),
                        0.0,
                        delay_ms.unwrap_or(stagger_ms),
                    );
                }
                EffectRequest::Particles { options } => self.add_particles(&target, options),
            }
        }
        self.ensure_frame();
        targets.len()
    }

    fn wave(&self, target: &DomElement) {
        if self.document.get_element_by_id("wave-keyframes").is_none() {
            if let (Some(style), Some(head)) = (create(&self.document, "style"), self.document.head()) {
                style.0.set_id("wave-keyframes");
                style.set_text(WAVE_KEYFRAMES);
                if let Err(err) = head.append_child(&style.0) {
                    tracing::warn!(error = ?err, "wave keyframes not added");
                }
            }
        }

        let letters = effects::wave_letters(&target.text());
        target.0.set_inner_html("");
        for letter in letters {
            let Some(span) = create(&self.document, "span") else {
                continue;
            };
            span.set_text(&letter.text);
            span.set_style("display", "inline-block");
            span.set_style("animation", &letter.animation());
            target.append(&span);
        }
    }

    fn add_particles(&mut self, container: &DomElement, options: &ParticleOptions) {
        let bounds = container.bounds();
        let field = ParticleField::scatter(
            options,
            bounds.width,
            bounds.height,
            &mut js_sys::Math::random,
        );
        let mut dots = Vec::with_capacity(field.particles().len());
        for particle in field.particles() {
            let Some(dot) = create(&self.document, "div") else {
                continue;
            };
            dot.add_class("particle");
            let size = format!("{}px", options.size);
            dot.set_style("position", "absolute");
            dot.set_style("width", &size);
            dot.set_style("height", &size);
            dot.set_style("background", &options.color);
            dot.set_style("border-radius", "50%");
            dot.set_style("pointer-events", "none");
            dot.set_style("opacity", &particle.opacity.to_string());
            container.append(&dot);
            dots.push(dot);
        }
        self.particle_layers.push(ParticleLayer {
            container: container.clone(),
            field,
            dots,
        });
    }

    fn teardown(&mut self) {
        let decorative = self.decor.teardown(&mut self.animator);
        self.animator.cancel_all();
        self.reveal.clear();
        self.pointer.clear();
        self.frame = None;
        self.submission = None;
        self.navigation = None;
        if let Some(event) = self.notifications.clear() {
            self.apply_toast(event);
        }
        for layer in self.particle_layers.drain(..) {
            for dot in layer.dots {
                dot.0.remove();
            }
        }
        tracing::info!(decorative, "page torn down");
    }
}

/// A mounted page: its state plus every listener keeping it wired.
pub struct MountedPage {
    state: SharedPage,
    listeners: Vec<EventListener>,
}

impl MountedPage {
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn notify(&self, notification: Notification) {
        self.state.borrow_mut().notify(notification);
    }

    /// Play `request` on every element matching `selector`. Returns how many matched.
    pub fn play(&self, selector: &str, request: &EffectRequest) -> usize {
        self.state.borrow_mut().play(selector, request)
    }

    pub fn teardown(self) {
        self.state.borrow_mut().teardown();
        drop(self.listeners);
    }
}

/// Wire every page behavior present in the current document.
pub fn mount(config: SiteConfig) -> Result<MountedPage, SiteError> {
    let window = web_sys::window().ok_or_else(|| unavailable("window", "no global window"))?;
    let document = window
        .document()
        .ok_or_else(|| unavailable("document", "window has no document"))?;

    let state: SharedPage = Rc::new_cyclic(|this| {
        RefCell::new(PageState::new(
            this.clone(),
            config,
            window.clone(),
            document.clone(),
        ))
    });

    let mut listeners = Vec::new();
    install_window(&state, &window, &document, &mut listeners);
    install_nav(&state, &document, &mut listeners);
    install_reveals(&state, &document)?;
    install_motion(&state, &document);
    install_pointer(&state, &document, &mut listeners);
    install_gallery(&state, &document, &mut listeners);
    install_contact(&state, &document, &mut listeners);
    install_faq(&state, &document, &mut listeners);
    install_clipboard(&state, &document, &mut listeners);

    {
        let mut page = state.borrow_mut();
        page.on_scroll(now());
        page.ensure_frame();
    }

    tracing::info!(listeners = listeners.len(), "page mounted");
    Ok(MountedPage { state, listeners })
}

fn install_window(
    state: &SharedPage,
    window: &Window,
    document: &Document,
    listeners: &mut Vec<EventListener>,
) {
    let page = Rc::downgrade(state);
    listeners.push(EventListener::new(window, "scroll", move |_| {
        with_page(&page, |state| state.request_scroll_frame());
    }));

    let page = Rc::downgrade(state);
    listeners.push(EventListener::new(window, "resize", move |_| {
        with_page(&page, |state| {
            for layer in &mut state.particle_layers {
                layer.resize();
            }
            state.request_scroll_frame();
        });
    }));

    let page = Rc::downgrade(state);
    let watched = document.clone();
    listeners.push(EventListener::new(document, "visibilitychange", move |_| {
        let hidden = watched.hidden();
        with_page(&page, |state| state.set_hidden(hidden));
    }));

    let page = Rc::downgrade(state);
    listeners.push(EventListener::new(document, "keydown", move |event| {
        let Some(key) = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key) else {
            return;
        };
        with_page(&page, |state| {
            let consumed = state
                .modal
                .as_mut()
                .is_some_and(|modal| modal.handle_key(&key, now()));
            if consumed {
                state.ensure_frame();
            }
        });
    }));

    let mut page = state.borrow_mut();
    if let Some(body) = page.body.clone() {
        body.add_class("loaded");
    }
    let rate = page.config.motion.parallax_rate;
    let mut parallax: Vec<ParallaxTarget> = select_all(document, ".parallax-element")
        .into_iter()
        .map(|element| ParallaxTarget {
            element,
            kind: ParallaxKind::Variable(rate),
        })
        .collect();
    parallax.extend(select_all(document, "[data-parallax]").into_iter().map(|element| {
        let speed = parse_parallax_speed(element.attr("data-parallax").as_deref());
        ParallaxTarget {
            element,
            kind: ParallaxKind::Translate(speed),
        }
    }));
    page.parallax = parallax;
}

fn install_nav(state: &SharedPage, document: &Document, listeners: &mut Vec<EventListener>) {
    let by_id = |id: &str| {
        document
            .get_element_by_id(id)
            .and_then(DomElement::from_element)
    };
    if let Some(navbar) = by_id("navbar") {
        let parts = NavParts {
            navbar,
            hamburger: by_id("hamburger"),
            menu: by_id("nav-menu"),
        };

        if let Some(hamburger) = &parts.hamburger {
            let page = Rc::downgrade(state);
            listeners.push(EventListener::new(&hamburger.0, "click", move |_| {
                with_page(&page, |state| {
                    state.nav.toggle_menu();
                    if let Some(parts) = &state.nav_parts {
                        parts.apply(&state.nav);
                    }
                });
            }));
        }

        for link in select_all(document, ".nav-link") {
            let page = Rc::downgrade(state);
            listeners.push(EventListener::new(&link.0, "click", move |_| {
                with_page(&page, |state| {
                    if state.nav.close_menu() {
                        if let Some(parts) = &state.nav_parts {
                            parts.apply(&state.nav);
                        }
                    }
                });
            }));
        }

        let page = Rc::downgrade(state);
        let navbar = parts.navbar.clone();
        listeners.push(EventListener::new(document, "click", move |event| {
            let inside = navbar.contains_target(event);
            with_page(&page, |state| {
                if state.nav.on_document_click(inside) {
                    if let Some(parts) = &state.nav_parts {
                        parts.apply(&state.nav);
                    }
                }
            });
        }));

        state.borrow_mut().nav_parts = Some(parts);
    }

    for link in select_all(document, "a[href^=\"#\"], a[href$=\".html\"]") {
        let Some(href) = link.attr("href") else {
            continue;
        };
        let intent = classify_link(&href);
        if intent == LinkIntent::Browser {
            continue;
        }
        let page = Rc::downgrade(state);
        let document = document.clone();
        listeners.push(EventListener::new_with_options(
            &link.0,
            "click",
            EventListenerOptions::enable_prevent_default(),
            move |event| match &intent {
                LinkIntent::Anchor(id) if id.is_empty() => event.prevent_default(),
                LinkIntent::Anchor(id) => {
                    event.prevent_default();
                    if let Some(target) = document.get_element_by_id(id) {
                        let options = ScrollIntoViewOptions::new();
                        options.set_behavior(ScrollBehavior::Smooth);
                        options.set_block(ScrollLogicalPosition::Start);
                        target.scroll_into_view_with_scroll_into_view_options(&options);
                    }
                }
                LinkIntent::PageTransition(href) => {
                    event.prevent_default();
                    let href = href.clone();
                    with_page(&page, |state| state.navigate_after_transition(href));
                }
                LinkIntent::Browser => {}
            },
        ));
    }
}

fn install_reveals(state: &SharedPage, document: &Document) -> Result<(), SiteError> {
    let mut guard = state.borrow_mut();
    let page = &mut *guard;
    let entrance = RevealOptions::entrance(&page.config.reveal)?;
    let counter = RevealOptions::counter(&page.config.reveal);
    let band = RevealOptions::scroll_band(&page.config.reveal);

    let tracker = &mut page.reveal;
    register_all(
        tracker,
        select_all(
            document,
            ".animate-on-scroll, .animate-slide-left, .animate-slide-right, .animate-fade-in, \
             .animate-scale, .fade-in-up, .fade-in-left, .fade-in-right, .scale-in",
        ),
        entrance,
        |_| RevealAction::Entrance,
    );
    register_all(tracker, select_all(document, ".stagger-container"), entrance, |container| {
        RevealAction::Stagger(container.find_all(".stagger-animation"))
    });
    register_all(tracker, select_all(document, ".stat-number[data-target]"), counter, |element| {
        let target = element
            .attr("data-target")
            .and_then(|raw| effects::parse_counter_target(&raw))
            .unwrap_or(0);
        RevealAction::Counter(target)
    });
    register_all(tracker, select_all(document, ".skill-progress[data-width]"), counter, |element| {
        RevealAction::SkillBar(element.attr("data-width").unwrap_or_default())
    });
    register_all(
        tracker,
        select_all(document, ".progress-circle, .reveal-text"),
        counter,
        |_| RevealAction::Animate,
    );
    register_all(tracker, select_all(document, "[data-reveal]"), band, |_| RevealAction::ScrollBand);

    let cards = select_all(document, ".contact-card");
    for (index, card) in cards.into_iter().enumerate() {
        card.set_style("opacity", "0");
        card.set_style("transform", "translateY(30px)");
        card.set_style("transition", "all 0.6s ease");
        tracker.register(
            RevealTarget {
                element: card,
                action: RevealAction::Rise {
                    delay_ms: index as f64 * 100.0,
                },
            },
            entrance,
        );
    }

    tracing::debug!(targets = tracker.len(), "reveal targets registered");
    Ok(())
}

fn register_all(
    tracker: &mut ViewportRevealTracker<RevealTarget>,
    elements: Vec<DomElement>,
    options: RevealOptions,
    action: impl Fn(&DomElement) -> RevealAction,
) {
    for element in elements {
        let action = action(&element);
        tracker.register(RevealTarget { element, action }, options);
    }
}

/// Typewriter text plus the decorative blob, glitch, particle and sparkle layers.
fn install_motion(state: &SharedPage, document: &Document) {
    let mut guard = state.borrow_mut();
    let page = &mut *guard;
    let start = now();

    for element in select_all(document, ".typewriter") {
        let text = element.text();
        effects::typewriter(&mut page.animator, start, element, &text, &page.config.motion);
    }

    for container in select_all(document, ".blob-container") {
        if let Some(blob) = create(document, "div") {
            blob.add_class("morphing-blob");
            container.append(&blob);
            page.decor.morph_blob(&mut page.animator, start, blob);
        }
    }

    for element in select_all(document, ".glitch-text") {
        element.set_attr("data-text", &element.text());
        page.decor.glitch(&mut page.animator, start, element);
    }

    for container in select_all(document, ".particles") {
        for particle in scatter_particles(20, &mut || page.decor.draw()) {
            if let Some(dot) = create(document, "div") {
                dot.add_class("particle");
                dot.set_style("left", &format!("{}%", particle.left_pct));
                dot.set_style("animation-delay", &format!("{}s", particle.delay_s));
                dot.set_style("animation-duration", &format!("{}s", particle.duration_s));
                container.append(&dot);
            }
        }
    }

    for container in select_all(document, ".sparkle-container") {
        for sparkle in scatter_sparkles(4, &mut || page.decor.draw()) {
            if let Some(dot) = create(document, "div") {
                dot.add_class("sparkle");
                dot.set_style("top", &format!("{}%", sparkle.top_pct));
                dot.set_style("left", &format!("{}%", sparkle.left_pct));
                dot.set_style("animation-delay", &format!("{}s", sparkle.delay_s));
                container.append(&dot);
            }
        }
    }
}

fn bind_pointer(
    state: &SharedPage,
    host: &DomElement,
    target: DomElement,
    effect: PointerEffect,
    render: RenderMode,
    listeners: &mut Vec<EventListener>,
) {
    let key = state.borrow_mut().pointer.bind(effect, render);

    let page = Rc::downgrade(state);
    let lifted = target.clone();
    listeners.push(EventListener::new(&host.0, "mouseenter", move |_| {
        with_page(&page, |state| {
            if let Some(transform) = state.pointer.enter(key) {
                render.apply(&lifted, &transform);
            }
        });
    }));

    let page = Rc::downgrade(state);
    let bounds_of = host.clone();
    let moved = target.clone();
    listeners.push(EventListener::new(&host.0, "mousemove", move |event| {
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let pointer = Point::new(mouse.client_x() as f64, mouse.client_y() as f64);
        let bounds = bounds_of.bounds();
        with_page(&page, |state| {
            if let Some(transform) = state.pointer.pointer_move(key, &bounds, pointer) {
                render.apply(&moved, &transform);
            }
        });
    }));

    let page = Rc::downgrade(state);
    listeners.push(EventListener::new(&host.0, "mouseleave", move |_| {
        with_page(&page, |state| {
            if let Some(transform) = state.pointer.leave(key) {
                render.apply(&target, &transform);
            }
        });
    }));
}

fn install_pointer(state: &SharedPage, document: &Document, listeners: &mut Vec<EventListener>) {
    let settings = state.borrow().config.pointer.clone();
    let magnetic = PointerEffect::magnetic(&settings);
    let tilt = PointerEffect::tilt(&settings);
    let soft_tilt = PointerEffect::tilt(&crate::types::PointerSettings {
        tilt_divisor: settings.tilt_divisor * 2.0,
        ..settings.clone()
    });

    for element in select_all(document, ".magnetic") {
        bind_pointer(state, &element, element.clone(), magnetic, RenderMode::Variables, listeners);
    }
    for element in select_all(document, ".tilt-card") {
        bind_pointer(state, &element, element.clone(), tilt, RenderMode::Variables, listeners);
    }
    for element in select_all(document, ".btn:not(.magnetic), .skill-item") {
        bind_pointer(state, &element, element.clone(), magnetic, RenderMode::Inline, listeners);
    }
    for element in select_all(document, ".skill-category, .value-card") {
        bind_pointer(state, &element, element.clone(), soft_tilt, RenderMode::Inline, listeners);
    }
    for card in select_all(document, ".project-card") {
        if let Some(image) = card.find(".project-image img") {
            bind_pointer(state, &card, image, PointerEffect::lift(), RenderMode::Inline, listeners);
        }
    }
    for link in select_all(document, ".social-link-large") {
        bind_pointer(state, &link, link.clone(), PointerEffect::raise(), RenderMode::Inline, listeners);
    }
}

fn describe_card(index: usize, card: &DomElement) -> ItemDescriptor {
    let text_of = |selector: &str| {
        card.find(selector)
            .map(|element| element.text().trim().to_string())
            .unwrap_or_default()
    };
    ItemDescriptor {
        id: ElementId::new(index as u32),
        category: card.attr("data-category").unwrap_or_default(),
        title: text_of(".project-title"),
        description: text_of(".project-description"),
        image: card
            .find(".project-image img")
            .and_then(|img| img.attr("src"))
            .unwrap_or_default(),
        tags: card
            .find_all(".tech-tag")
            .iter()
            .map(|tag| tag.text().trim().to_string())
            .collect(),
        design_url: card.attr("data-design-url"),
        prototype_url: card.attr("data-prototype-url"),
        detail: DetailRecord::default(),
    }
}

fn install_gallery(state: &SharedPage, document: &Document, listeners: &mut Vec<EventListener>) {
    if select(document, ".projects-grid").is_none() {
        return;
    }

    let cards = select_all(document, ".projects-grid .project-card");
    {
        let mut guard = state.borrow_mut();
        let page = &mut *guard;
        let items = cards
            .iter()
            .enumerate()
            .map(|(index, card)| describe_card(index, card))
            .collect();
        page.gallery = GalleryFilterIndex::new(items, &page.config.gallery.projects);
        page.card_timers = TimerSlots::with_len(cards.len());
        page.link_timers = TimerSlots::with_len(cards.len());
        page.cards = cards.clone();
        for card in &cards {
            card.set_style("cursor", "pointer");
        }
        effects::rise_in(&mut page.animator, now(), cards.clone(), 100.0);
        page.ensure_frame();

        for (card, item) in cards.iter().zip(page.gallery.items()) {
            let slots = card.find_all(".project-link");
            for link in overlay_links(item, slots.len()) {
                let Some(anchor) = slots.get(link.slot) else {
                    continue;
                };
                anchor.set_attr("href", &link.href);
                anchor.set_attr("target", "_blank");
                anchor.set_attr("title", link.title);
                if let Some(icon) = anchor.find("i") {
                    icon.0.set_class_name(link.icon_class);
                }
            }
        }
    }

    for (index, card) in cards.iter().enumerate() {
        let links = card.find_all(".project-link");
        if links.is_empty() {
            continue;
        }
        effects::rest_links(&links);
        for link in &links {
            link.set_style("transition", "all 0.3s ease");
        }

        let page = Rc::downgrade(state);
        let shown = links.clone();
        listeners.push(EventListener::new(&card.0, "mouseenter", move |_| {
            with_page(&page, |state| state.show_card_links(index, shown.clone()));
        }));
        let page = Rc::downgrade(state);
        listeners.push(EventListener::new(&card.0, "mouseleave", move |_| {
            with_page(&page, |state| state.hide_card_links(index, &links));
        }));
    }

    let buttons = select_all(document, ".filter-btn");
    for button in &buttons {
        let page = Rc::downgrade(state);
        let all = buttons.clone();
        let clicked = button.clone();
        listeners.push(EventListener::new(&button.0, "click", move |_| {
            for other in &all {
                other.remove_class("active");
            }
            clicked.add_class("active");
            let category = clicked.attr("data-filter").unwrap_or_else(|| "all".to_string());
            with_page(&page, |state| state.apply_filter(&category, now()));
        }));
    }

    install_search(state, document, listeners);
    install_read_more(state, document, listeners);
    install_modal(state, document, &cards, listeners);
}

fn install_search(state: &SharedPage, document: &Document, listeners: &mut Vec<EventListener>) {
    let Some(filter) = select(document, ".project-filter") else {
        return;
    };
    let (Some(container), Some(input)) = (create(document, "div"), create(document, "input")) else {
        return;
    };
    container.add_class("project-search");
    input.add_class("search-input");
    input.set_attr("type", "text");
    input.set_attr("placeholder", "Search projects...");
    container.append(&input);

    let Some(parent) = filter.0.parent_node() else {
        return;
    };
    if let Err(err) = parent.insert_before(&container.0, filter.0.next_sibling().as_ref()) {
        tracing::warn!(error = ?err, "search box not inserted");
        return;
    }

    let page = Rc::downgrade(state);
    let field = input.clone();
    listeners.push(EventListener::new(&input.0, "input", move |_| {
        let term = field_value(field.element())
            .map(|(_, value)| value)
            .unwrap_or_default();
        with_page(&page, |state| state.apply_search(&term));
    }));
}

fn install_read_more(state: &SharedPage, document: &Document, listeners: &mut Vec<EventListener>) {
    let limit = state.borrow().config.gallery.read_more_limit;
    for description in select_all(document, ".projects-grid .project-description") {
        let Some(toggle) = ReadMore::for_description(&description.text(), limit) else {
            continue;
        };
        let Some(button) = create(document, "button") else {
            continue;
        };
        toggle.apply(&description);
        button.add_class("read-more-btn");
        button.set_attr("type", "button");
        button.set_attr("aria-expanded", toggle.aria_expanded());
        button.set_text(toggle.label());
        if let Err(err) = description.0.after_with_node_1(&button.0) {
            tracing::warn!(error = ?err, "read-more button not inserted");
            continue;
        }

        let mut toggle = toggle;
        let clicked = button.clone();
        listeners.push(EventListener::new(&button.0, "click", move |_| {
            toggle.toggle();
            toggle.apply(&description);
            clicked.set_text(toggle.label());
            clicked.set_attr("aria-expanded", toggle.aria_expanded());
        }));
    }
}

fn install_modal(
    state: &SharedPage,
    document: &Document,
    cards: &[DomElement],
    listeners: &mut Vec<EventListener>,
) {
    let Some(body) = document.body().map(DomElement) else {
        return;
    };
    if let Err(err) = body.0.insert_adjacent_html("beforeend", MODAL_MARKUP) {
        tracing::warn!(error = ?err, "modal markup not inserted");
        return;
    }
    if let Some(style) = create(document, "style") {
        style.set_text(MODAL_STYLES);
        body.append(&style);
    }
    let Some(root) = document
        .get_element_by_id("project-modal")
        .and_then(DomElement::from_element)
    else {
        return;
    };

    for selector in [".modal-overlay", ".modal-close"] {
        if let Some(closer) = root.find(selector) {
            let page = Rc::downgrade(state);
            listeners.push(EventListener::new(&closer.0, "click", move |_| {
                with_page(&page, |state| state.close_project());
            }));
        }
    }

    for (index, card) in cards.iter().enumerate() {
        let page = Rc::downgrade(state);
        let id = ElementId::new(index as u32);
        listeners.push(EventListener::new(&card.0, "click", move |event| {
            let on_link = event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .and_then(|target| target.closest(".project-link").ok().flatten())
                .is_some();
            if !on_link {
                with_page(&page, |state| state.open_project(id));
            }
        }));
    }

    let mut guard = state.borrow_mut();
    let page = &mut *guard;
    let view = DomModalView::new(root, body, document.clone());
    page.modal = Some(ModalPresenter::new(view, &page.config.gallery));
}

fn install_contact(state: &SharedPage, document: &Document, listeners: &mut Vec<EventListener>) {
    let Some(form) = document
        .get_element_by_id("contact-form")
        .and_then(DomElement::from_element)
    else {
        return;
    };
    let fields = form.find_all(".form-input, .form-textarea");
    let button = form.find(".form-submit");
    let label = button.as_ref().and_then(|b| b.find(".btn-text"));
    let icon = button.as_ref().and_then(|b| b.find(".btn-icon"));
    let idle = ButtonState {
        label: label.as_ref().map(|l| l.text()).unwrap_or_else(|| "Send Message".to_string()),
        icon_class: icon
            .as_ref()
            .map(|i| i.0.class_name())
            .unwrap_or_default(),
        disabled: false,
    };

    for field in &fields {
        let group = field.parent();
        if let Some(group) = group.clone() {
            listeners.push(EventListener::new(&field.0, "focus", move |_| {
                group.add_class("focused");
            }));
        }
        if let Some(group) = group {
            let blurred = field.clone();
            listeners.push(EventListener::new(&field.0, "blur", move |_| {
                let empty = field_value(blurred.element()).is_some_and(|(_, value)| value.is_empty());
                if empty {
                    group.remove_class("focused");
                }
            }));
        }

        let page = Rc::downgrade(state);
        let edited = field.clone();
        listeners.push(EventListener::new(&field.0, "input", move |_| {
            let Some((name, value)) = field_value(edited.element()) else {
                return;
            };
            let result = validate_field(&name, &value);
            with_page(&page, |state| state.show_field_result(&edited, &result));
        }));
    }

    let page = Rc::downgrade(state);
    listeners.push(EventListener::new_with_options(
        &form.0,
        "submit",
        EventListenerOptions::enable_prevent_default(),
        move |event| {
            event.prevent_default();
            with_page(&page, |state| state.submit_contact());
        },
    ));

    if let Some(message) = document
        .get_element_by_id("message")
        .and_then(DomElement::from_element)
    {
        if let (Some(counter), Some(group)) = (create(document, "div"), message.parent()) {
            counter.add_class("character-counter");
            group.append(&counter);
            let budget = state.borrow().config.contact.message_budget;
            message.set_attr("maxlength", &budget.to_string());
            state.borrow().update_budget(&message, &counter);

            let page = Rc::downgrade(state);
            let typed = message.clone();
            listeners.push(EventListener::new(&message.0, "input", move |_| {
                with_page(&page, |state| state.update_budget(&typed, &counter));
            }));
        }
    }

    let mut guard = state.borrow_mut();
    let page = &mut *guard;
    let start = now();
    for (index, group) in form.find_all(".form-group").into_iter().enumerate() {
        group.set_style("opacity", "0");
        group.set_style("transform", "translateX(-30px)");
        group.set_style("transition", "all 0.6s ease");
        page.animator.after(start, index as f64 * 100.0 + 500.0, move || {
            group.set_style("opacity", "1");
            group.set_style("transform", "translateX(0)");
        });
    }

    page.contact = Some(Contact {
        form: ContactForm::new(idle),
        endpoint: SimulatedEndpoint::new(&page.config.contact),
        fields,
        button,
        label,
        icon,
    });
}

fn install_faq(state: &SharedPage, document: &Document, listeners: &mut Vec<EventListener>) {
    let items = select_all(document, ".faq-item");
    for (index, item) in items.iter().enumerate() {
        let Some(question) = item.find(".faq-question") else {
            continue;
        };
        let page = Rc::downgrade(state);
        listeners.push(EventListener::new(&question.0, "click", move |_| {
            with_page(&page, |state| {
                state.faq.toggle(index);
                state.faq.apply(&state.faq_items);
            });
        }));
    }
    state.borrow_mut().faq_items = items;
}

fn install_clipboard(state: &SharedPage, document: &Document, listeners: &mut Vec<EventListener>) {
    for element in select_all(document, ".contact-text") {
        element.set_style("cursor", "pointer");
        element.set_attr("title", "Click to copy");

        let page = Rc::downgrade(state);
        let copied = element.clone();
        listeners.push(EventListener::new(&element.0, "click", move |_| {
            let page = page.clone();
            let copied = copied.clone();
            let text = copied.text();
            spawn_local(async move {
                let result = write_clipboard(&text).await;
                if let Err(err) = &result {
                    tracing::warn!(error = %err, "copy failed");
                }
                with_page(&page, |state| {
                    if result.is_ok() {
                        let previous = copied.0.style().get_property_value("color").unwrap_or_default();
                        copied.set_style("color", "var(--primary-color)");
                        state.animator.after(now(), 300.0, move || copied.set_style("color", &previous));
                    }
                    state.notify(clipboard_notification(&result));
                });
            });
        }));
    }
}

async fn write_clipboard(text: &str) -> Result<(), SiteError> {
    let window = web_sys::window().ok_or_else(|| unavailable("clipboard", "no global window"))?;
    let navigator = window.navigator();
    let clipboard = Reflect::get(&navigator, &JsValue::from_str("clipboard"))
        .map_err(js_unavailable("clipboard"))?;
    if clipboard.is_undefined() {
        return Err(unavailable("clipboard", "navigator.clipboard is undefined"));
    }
    let write_text = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
        .map_err(js_unavailable("clipboard"))?
        .dyn_into::<Function>()
        .map_err(js_unavailable("clipboard"))?;
    let promise = write_text
        .call1(&clipboard, &JsValue::from_str(text))
        .map_err(js_unavailable("clipboard"))?
        .dyn_into::<Promise>()
        .map_err(js_unavailable("clipboard"))?;
    JsFuture::from(promise)
        .await
        .map_err(js_unavailable("clipboard"))?;
    Ok(())
}
