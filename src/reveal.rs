// Viewport reveal tracking. Pure geometry: the tracker owns registrations and
// their revealed flags; rendering happens in the caller's transition callback.

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::error::SiteError;
use crate::surface::Bounded;
use crate::types::{Margin, Rect, RevealSettings};

new_key_type! {
    /// Handle to a registered element.
    pub struct RevealKey;
}

/// How a registration reacts once it has been revealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevealMode {
    /// Reveal once, then stop observing. Never reverts.
    OneShot,
    /// Re-evaluated on every tick; reverts when the element leaves.
    Continuous,
}

/// Per-registration reveal configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevealOptions {
    /// Fraction of the element (0-1) that must be inside the adjusted viewport.
    pub threshold: f64,
    /// Offset applied to each viewport edge before testing.
    pub margin: Margin,
    pub mode: RevealMode,
}

impl RevealOptions {
    pub fn one_shot(threshold: f64, margin: Margin) -> Self {
        RevealOptions {
            threshold: threshold.clamp(0.0, 1.0),
            margin,
            mode: RevealMode::OneShot,
        }
    }

    pub fn continuous(threshold: f64, margin: Margin) -> Self {
        RevealOptions {
            threshold: threshold.clamp(0.0, 1.0),
            margin,
            mode: RevealMode::Continuous,
        }
    }

    /// Fade/slide/scale entrance animations.
    pub fn entrance(settings: &RevealSettings) -> Result<Self, SiteError> {
        Ok(RevealOptions::one_shot(
            settings.threshold,
            Margin::parse(&settings.root_margin)?,
        ))
    }

    /// Counters, progress circles, skill bars and reveal text.
    pub fn counter(settings: &RevealSettings) -> Self {
        RevealOptions::one_shot(settings.counter_threshold, Margin::default())
    }

    /// `data-reveal` band: revealed while any part of the element sits between
    /// the viewport top and `scroll_band_reveal_point` pixels above its bottom.
    pub fn scroll_band(settings: &RevealSettings) -> Self {
        RevealOptions::continuous(
            0.0,
            Margin::new(0.0, 0.0, -settings.scroll_band_reveal_point, 0.0),
        )
    }
}

/// Fraction of `element` inside `viewport` after adjusting it by `margin`.
/// Zero-area elements always yield 0.
pub fn intersection_ratio(element: &Rect, viewport: &Rect, margin: &Margin) -> f64 {
    let area = element.area();
    if area <= 0.0 {
        return 0.0;
    }

    match element.intersection(&viewport.inflate(margin)) {
        Some(overlap) => (overlap.area() / area).clamp(0.0, 1.0),
        None => 0.0,
    }
}

/// An element counts as intersecting when some of it is visible and the
/// visible fraction reaches the threshold.
pub fn meets_threshold(ratio: f64, threshold: f64) -> bool {
    ratio > 0.0 && ratio >= threshold
}

struct TrackedElement<H> {
    handle: H,
    options: RevealOptions,
    revealed: bool,
    observing: bool,
}

/// A revealed-state change emitted by [`ViewportRevealTracker::evaluate`].
#[derive(Debug)]
pub struct RevealTransition<'a, H> {
    pub key: RevealKey,
    pub handle: &'a H,
    pub revealed: bool,
    pub ratio: f64,
}

/// Tracks registered elements against the viewport.
pub struct ViewportRevealTracker<H> {
    elements: SlotMap<RevealKey, TrackedElement<H>>,
}

impl<H: Bounded> ViewportRevealTracker<H> {
    pub fn new() -> Self {
        ViewportRevealTracker {
            elements: SlotMap::with_key(),
        }
    }

    pub fn register(&mut self, handle: H, options: RevealOptions) -> RevealKey {
        let key = self.elements.insert(TrackedElement {
            handle,
            options,
            revealed: false,
            observing: true,
        });
        tracing::debug!(?key, mode = ?options.mode, threshold = options.threshold, "registered reveal target");
        key
    }

    /// Release a registration and hand back its element.
    pub fn unregister(&mut self, key: RevealKey) -> Option<H> {
        self.elements.remove(key).map(|tracked| tracked.handle)
    }

    /// Test every observed element against `viewport` and report state changes.
    ///
    /// One-shot registrations stop being observed after their first reveal.
    /// Continuous registrations end every call with
    /// `revealed == meets_threshold(ratio, threshold)`.
    /// Returns the number of transitions emitted.
    pub fn evaluate<F>(&mut self, viewport: Rect, mut on_transition: F) -> usize
    where
        F: FnMut(RevealTransition<'_, H>),
    {
        let mut transitions = 0;

        for (key, tracked) in self.elements.iter_mut() {
            if !tracked.observing {
                continue;
            }

            let ratio =
                intersection_ratio(&tracked.handle.bounds(), &viewport, &tracked.options.margin);
            let visible = meets_threshold(ratio, tracked.options.threshold);

            let next = match tracked.options.mode {
                RevealMode::OneShot => tracked.revealed || visible,
                RevealMode::Continuous => visible,
            };

            if tracked.options.mode == RevealMode::OneShot && next {
                tracked.observing = false;
            }

            if next != tracked.revealed {
                tracked.revealed = next;
                transitions += 1;
                on_transition(RevealTransition {
                    key,
                    handle: &tracked.handle,
                    revealed: next,
                    ratio,
                });
            }
        }

        transitions
    }

    pub fn is_revealed(&self, key: RevealKey) -> Option<bool> {
        self.elements.get(key).map(|tracked| tracked.revealed)
    }

    pub fn is_observing(&self, key: RevealKey) -> Option<bool> {
        self.elements.get(key).map(|tracked| tracked.observing)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn observing_count(&self) -> usize {
        self.elements.values().filter(|tracked| tracked.observing).count()
    }

    /// Teardown: release every registration.
    pub fn clear(&mut self) {
        tracing::debug!(count = self.elements.len(), "releasing reveal targets");
        self.elements.clear();
    }
}

impl<H: Bounded> Default for ViewportRevealTracker<H> {
    fn default() -> Self {
        Self::new()
    }
}
