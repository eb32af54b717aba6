// Navigation and scroll-linked state: navbar, mobile menu, parallax,
// scroll-frame coalescing, link interception and the FAQ accordion.

use crate::surface::ClassSlot;

/// Navbar `scrolled` flag and mobile menu state.
#[derive(Debug, Clone)]
pub struct NavState {
    scroll_threshold: f64,
    scrolled: bool,
    menu_open: bool,
}

impl NavState {
    pub fn new(scroll_threshold: f64) -> Self {
        NavState {
            scroll_threshold,
            scrolled: false,
            menu_open: false,
        }
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }

    pub fn is_menu_open(&self) -> bool {
        self.menu_open
    }

    /// Returns whether the `scrolled` flag changed.
    pub fn on_scroll(&mut self, scroll_y: f64) -> bool {
        let scrolled = scroll_y > self.scroll_threshold;
        let changed = scrolled != self.scrolled;
        self.scrolled = scrolled;
        changed
    }

    pub fn toggle_menu(&mut self) -> bool {
        self.menu_open = !self.menu_open;
        self.menu_open
    }

    /// Close the menu, e.g. after a nav link click. Returns whether it was open.
    pub fn close_menu(&mut self) -> bool {
        std::mem::replace(&mut self.menu_open, false)
    }

    /// Document click: anything outside the navbar closes the menu.
    pub fn on_document_click(&mut self, inside_navbar: bool) -> bool {
        !inside_navbar && self.close_menu()
    }

    pub fn apply<N, H, M>(&self, navbar: &N, hamburger: &H, menu: &M)
    where
        N: ClassSlot,
        H: ClassSlot,
        M: ClassSlot,
    {
        navbar.set_class("scrolled", self.scrolled);
        hamburger.set_class("active", self.menu_open);
        menu.set_class("active", self.menu_open);
    }
}

/// Vertical parallax offset in pixels for a scroll position.
pub fn parallax_offset(scroll_y: f64, speed: f64) -> f64 {
    -(scroll_y * speed)
}

/// Read a `data-parallax` speed; missing, zero or unparsable values use 0.5.
pub fn parse_parallax_speed(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|speed| speed.is_finite() && *speed != 0.0)
        .unwrap_or(0.5)
}

/// Coalesces bursts of scroll events into one frame callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameGate {
    pending: bool,
}

impl FrameGate {
    /// True when the caller should request a frame; false if one is already pending.
    pub fn request(&mut self) -> bool {
        !std::mem::replace(&mut self.pending, true)
    }

    pub fn complete(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

/// What a link click should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkIntent {
    /// Smooth-scroll to the element with this id.
    Anchor(String),
    /// Play the page transition, then navigate.
    PageTransition(String),
    /// Leave the click alone.
    Browser,
}

pub fn classify_link(href: &str) -> LinkIntent {
    if let Some(id) = href.strip_prefix('#') {
        LinkIntent::Anchor(id.to_string())
    } else if href.ends_with(".html") {
        LinkIntent::PageTransition(href.to_string())
    } else {
        LinkIntent::Browser
    }
}

/// `animation-play-state` for the body while the page is hidden or shown.
pub fn play_state(hidden: bool) -> &'static str {
    if hidden {
        "paused"
    } else {
        "running"
    }
}

/// FAQ list where at most one item is open.
#[derive(Debug, Clone, Default)]
pub struct Accordion {
    open: Option<usize>,
}

impl Accordion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle `index`, closing any other open item. Returns the open item.
    pub fn toggle(&mut self, index: usize) -> Option<usize> {
        self.open = if self.open == Some(index) {
            None
        } else {
            Some(index)
        };
        self.open
    }

    pub fn open_item(&self) -> Option<usize> {
        self.open
    }

    pub fn apply<S: ClassSlot>(&self, items: &[S]) {
        for (i, item) in items.iter().enumerate() {
            item.set_class("active", self.open == Some(i));
        }
    }
}
