// Pointer-driven transforms: magnetic pull, 3-D tilt and hover lift.
// Each transform is a pure function of the latest pointer event and the
// element bounds; the binder only remembers which elements are engaged.

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};

use crate::surface::StyleSlot;
use crate::types::{css_number, Point, PointerSettings, Rect};

new_key_type! {
    pub struct PointerKey;
}

/// Effect computed from the pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PointerEffect {
    /// Translate toward the pointer by `strength` of its offset from center.
    Magnetic { strength: f64 },
    /// Rotate one degree per `divisor` pixels of offset.
    Tilt { divisor: f64, perspective: f64 },
    /// Zoom while hovered.
    Lift { zoom: f64 },
    /// Rise by `height` pixels and zoom while hovered.
    Raise { height: f64, zoom: f64 },
}

impl PointerEffect {
    pub fn magnetic(settings: &PointerSettings) -> Self {
        PointerEffect::Magnetic {
            strength: settings.magnetic_strength,
        }
    }

    pub fn tilt(settings: &PointerSettings) -> Self {
        PointerEffect::Tilt {
            divisor: settings.tilt_divisor,
            perspective: settings.tilt_perspective,
        }
    }

    pub fn lift() -> Self {
        PointerEffect::Lift { zoom: 1.1 }
    }

    pub fn raise() -> Self {
        PointerEffect::Raise {
            height: 3.0,
            zoom: 1.05,
        }
    }

    /// Transform applied on enter, for effects that ignore pointer position.
    pub fn hover(&self) -> Option<Transform> {
        match *self {
            PointerEffect::Magnetic { .. } | PointerEffect::Tilt { .. } => None,
            PointerEffect::Lift { zoom } => Some(Transform::Scale(zoom)),
            PointerEffect::Raise { height, zoom } => Some(Transform::Raise {
                y: -height,
                scale: zoom,
            }),
        }
    }

    /// Transform for a pointer at `pointer` over an element at `bounds`.
    pub fn transform(&self, bounds: &Rect, pointer: Point) -> Transform {
        let center = bounds.center();
        let dx = pointer.x - center.x;
        let dy = pointer.y - center.y;

        match *self {
            PointerEffect::Magnetic { strength } => Transform::Translate {
                x: dx * strength,
                y: dy * strength,
            },
            PointerEffect::Tilt { divisor, perspective } => {
                if divisor == 0.0 || !divisor.is_finite() {
                    return self.identity();
                }
                Transform::Rotate {
                    x_deg: dy / divisor,
                    y_deg: -dx / divisor,
                    perspective,
                }
            }
            PointerEffect::Lift { .. } | PointerEffect::Raise { .. } => {
                self.hover().unwrap_or_else(|| self.identity())
            }
        }
    }

    /// Rest transform of the same shape as this effect's output.
    pub fn identity(&self) -> Transform {
        match *self {
            PointerEffect::Magnetic { .. } => Transform::Translate { x: 0.0, y: 0.0 },
            PointerEffect::Tilt { perspective, .. } => Transform::Rotate {
                x_deg: 0.0,
                y_deg: 0.0,
                perspective,
            },
            PointerEffect::Lift { .. } => Transform::Scale(1.0),
            PointerEffect::Raise { .. } => Transform::Raise { y: 0.0, scale: 1.0 },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Transform {
    Translate { x: f64, y: f64 },
    Rotate { x_deg: f64, y_deg: f64, perspective: f64 },
    Scale(f64),
    Raise { y: f64, scale: f64 },
}

impl Transform {
    pub fn is_identity(&self) -> bool {
        match *self {
            Transform::Translate { x, y } => x == 0.0 && y == 0.0,
            Transform::Rotate { x_deg, y_deg, .. } => x_deg == 0.0 && y_deg == 0.0,
            Transform::Scale(factor) => factor == 1.0,
            Transform::Raise { y, scale } => y == 0.0 && scale == 1.0,
        }
    }

    /// Value for the inline `transform` property.
    pub fn to_css(&self) -> String {
        match *self {
            Transform::Translate { x, y } => {
                format!("translate({}px, {}px)", css_number(x), css_number(y))
            }
            Transform::Rotate {
                x_deg,
                y_deg,
                perspective,
            } => format!(
                "perspective({}px) rotateX({}deg) rotateY({}deg)",
                css_number(perspective),
                css_number(x_deg),
                css_number(y_deg)
            ),
            Transform::Scale(factor) => format!("scale({})", css_number(factor)),
            Transform::Raise { y, scale } => {
                format!("translateY({}px) scale({})", css_number(y), css_number(scale))
            }
        }
    }

    /// Custom properties for stylesheets that compose the transform themselves.
    pub fn css_variables(&self) -> Vec<(&'static str, String)> {
        match *self {
            Transform::Translate { x, y } => vec![
                ("--x", format!("{}px", css_number(x))),
                ("--y", format!("{}px", css_number(y))),
            ],
            Transform::Rotate { x_deg, y_deg, .. } => vec![
                ("--rotate-x", format!("{}deg", css_number(x_deg))),
                ("--rotate-y", format!("{}deg", css_number(y_deg))),
            ],
            Transform::Scale(factor) => vec![("--scale", css_number(factor))],
            Transform::Raise { y, scale } => vec![
                ("--y", format!("{}px", css_number(y))),
                ("--scale", css_number(scale)),
            ],
        }
    }
}

/// How a binding writes its transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Inline `transform`; cleared on leave so the stylesheet applies again.
    Inline,
    /// CSS custom properties; reset to zero values on leave.
    Variables,
}

impl RenderMode {
    pub fn apply<S: StyleSlot>(&self, slot: &S, transform: &Transform) {
        match self {
            RenderMode::Inline if transform.is_identity() => slot.clear_style("transform"),
            RenderMode::Inline => slot.set_style("transform", &transform.to_css()),
            RenderMode::Variables => {
                for (property, value) in transform.css_variables() {
                    slot.set_style(property, &value);
                }
            }
        }
    }
}

struct Binding {
    effect: PointerEffect,
    render: RenderMode,
    engaged: bool,
}

/// Pointer enter/move/leave handling for a set of elements.
#[derive(Default)]
pub struct PointerEffectBinder {
    bindings: SlotMap<PointerKey, Binding>,
}

impl PointerEffectBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, effect: PointerEffect, render: RenderMode) -> PointerKey {
        self.bindings.insert(Binding {
            effect,
            render,
            engaged: false,
        })
    }

    pub fn unbind(&mut self, key: PointerKey) -> bool {
        self.bindings.remove(key).is_some()
    }

    /// Engage; returns the hover transform for position-independent effects.
    pub fn enter(&mut self, key: PointerKey) -> Option<Transform> {
        let binding = self.bindings.get_mut(key)?;
        binding.engaged = true;
        binding.effect.hover()
    }

    /// Transform for a move, or `None` when the element is not engaged.
    pub fn pointer_move(&self, key: PointerKey, bounds: &Rect, pointer: Point) -> Option<Transform> {
        self.bindings
            .get(key)
            .filter(|binding| binding.engaged)
            .map(|binding| binding.effect.transform(bounds, pointer))
    }

    /// Disengage and return the rest transform.
    pub fn leave(&mut self, key: PointerKey) -> Option<Transform> {
        let binding = self.bindings.get_mut(key)?;
        binding.engaged = false;
        Some(binding.effect.identity())
    }

    pub fn is_engaged(&self, key: PointerKey) -> bool {
        self.bindings.get(key).map_or(false, |binding| binding.engaged)
    }

    pub fn render_mode(&self, key: PointerKey) -> Option<RenderMode> {
        self.bindings.get(key).map(|binding| binding.render)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::mock::MockElement;
    use proptest::prelude::*;

    fn card() -> Rect {
        Rect::new(100.0, 200.0, 200.0, 100.0)
    }

    #[test]
    fn magnetic_pulls_toward_pointer() {
        let effect = PointerEffect::magnetic(&PointerSettings::default());
        // 50px right of and 20px above center.
        let t = effect.transform(&card(), Point::new(250.0, 230.0));
        assert_eq!(t, Transform::Translate { x: 5.0, y: -2.0 });
        assert_eq!(t.to_css(), "translate(5px, -2px)");
    }

    #[test]
    fn tilt_rotates_away_from_pointer() {
        let effect = PointerEffect::tilt(&PointerSettings::default());
        let t = effect.transform(&card(), Point::new(300.0, 300.0));
        // Bottom-right corner: offset (100, 50).
        assert_eq!(
            t,
            Transform::Rotate {
                x_deg: 5.0,
                y_deg: -10.0,
                perspective: 1000.0
            }
        );
        assert_eq!(
            t.css_variables(),
            vec![("--rotate-x", "5deg".to_string()), ("--rotate-y", "-10deg".to_string())]
        );
        assert_eq!(t.to_css(), "perspective(1000px) rotateX(5deg) rotateY(-10deg)");
    }

    #[test]
    fn center_is_identity() {
        let center = card().center();
        for effect in [
            PointerEffect::magnetic(&PointerSettings::default()),
            PointerEffect::tilt(&PointerSettings::default()),
        ] {
            assert!(effect.transform(&card(), center).is_identity());
        }
    }

    #[test]
    fn zero_divisor_degrades_to_identity() {
        let effect = PointerEffect::Tilt {
            divisor: 0.0,
            perspective: 1000.0,
        };
        assert!(effect.transform(&card(), Point::new(0.0, 0.0)).is_identity());
    }

    #[test]
    fn moves_ignored_until_entered() {
        let mut binder = PointerEffectBinder::new();
        let key = binder.bind(PointerEffect::lift(), RenderMode::Inline);
        assert!(binder.pointer_move(key, &card(), Point::new(0.0, 0.0)).is_none());

        assert_eq!(binder.enter(key), Some(Transform::Scale(1.1)));
        assert!(binder.is_engaged(key));
        assert_eq!(
            binder.pointer_move(key, &card(), Point::new(0.0, 0.0)),
            Some(Transform::Scale(1.1))
        );

        let rest = binder.leave(key);
        assert_eq!(rest, Some(Transform::Scale(1.0)));
        assert!(!binder.is_engaged(key));
    }

    #[test]
    fn raise_lifts_on_enter_and_settles_on_leave() {
        let mut binder = PointerEffectBinder::new();
        let key = binder.bind(PointerEffect::raise(), RenderMode::Inline);
        let slot = MockElement::default();

        let hover = binder.enter(key).unwrap();
        RenderMode::Inline.apply(&slot, &hover);
        assert_eq!(slot.style("transform").as_deref(), Some("translateY(-3px) scale(1.05)"));

        let rest = binder.leave(key).unwrap();
        assert!(rest.is_identity());
        RenderMode::Inline.apply(&slot, &rest);
        assert_eq!(slot.style("transform"), None);
    }

    #[test]
    fn position_effects_wait_for_a_move() {
        let mut binder = PointerEffectBinder::new();
        let key = binder.bind(PointerEffect::magnetic(&PointerSettings::default()), RenderMode::Variables);
        assert_eq!(binder.enter(key), None);
        assert!(binder.is_engaged(key));
    }

    #[test]
    fn leave_on_unknown_key() {
        let mut binder = PointerEffectBinder::new();
        let key = binder.bind(PointerEffect::lift(), RenderMode::Inline);
        assert!(binder.unbind(key));
        assert_eq!(binder.leave(key), None);
        assert!(binder.is_empty());
    }

    #[test]
    fn inline_render_clears_on_identity() {
        let slot = MockElement::default();
        RenderMode::Inline.apply(&slot, &Transform::Translate { x: 3.0, y: 4.0 });
        assert_eq!(slot.style("transform").as_deref(), Some("translate(3px, 4px)"));
        RenderMode::Inline.apply(&slot, &Transform::Translate { x: 0.0, y: 0.0 });
        assert_eq!(slot.style("transform"), None);
    }

    #[test]
    fn variable_render_resets_to_zero() {
        let slot = MockElement::default();
        let effect = PointerEffect::magnetic(&PointerSettings::default());
        RenderMode::Variables.apply(&slot, &effect.transform(&card(), Point::new(300.0, 300.0)));
        assert_eq!(slot.style("--x").as_deref(), Some("10px"));
        RenderMode::Variables.apply(&slot, &effect.identity());
        assert_eq!(slot.style("--x").as_deref(), Some("0px"));
        assert_eq!(slot.style("--y").as_deref(), Some("0px"));
    }

    proptest! {
        /// Property: magnetic translation is linear in the pointer offset.
        #[test]
        fn magnetic_is_linear(
            px in 0.0f64..1000.0,
            py in 0.0f64..1000.0,
            strength in 0.0f64..1.0,
        ) {
            let bounds = card();
            let center = bounds.center();
            let effect = PointerEffect::Magnetic { strength };
            match effect.transform(&bounds, Point::new(px, py)) {
                Transform::Translate { x, y } => {
                    prop_assert!((x - (px - center.x) * strength).abs() < 1e-9);
                    prop_assert!((y - (py - center.y) * strength).abs() < 1e-9);
                }
                other => prop_assert!(false, "unexpected transform {:?}", other),
            }
        }
    }
}
