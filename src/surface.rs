// Typed element capabilities. Components name the one capability they need;
// the wasm binding implements these for DOM elements, tests use recorders.

use crate::types::Rect;

/// Something with a text-content slot.
pub trait TextSlot {
    fn set_text(&self, text: &str);
}

/// Something with settable inline style properties.
pub trait StyleSlot {
    fn set_style(&self, property: &str, value: &str);

    /// Remove an inline property so the stylesheet value applies again.
    fn clear_style(&self, property: &str) {
        self.set_style(property, "");
    }
}

/// Something with a class list.
pub trait ClassSlot {
    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;

    fn set_class(&self, class: &str, enabled: bool) {
        if enabled {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }
}

/// Something with a bounding box, in the same coordinate space as the viewport.
pub trait Bounded {
    fn bounds(&self) -> Rect;
}
