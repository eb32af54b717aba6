//! Browser smoke tests. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use portfolio_engine::dom::DomElement;
use portfolio_engine::surface::{ClassSlot, StyleSlot, TextSlot};
use portfolio_engine::Site;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

wasm_bindgen_test_configure!(run_in_browser);

fn element(tag: &str) -> DomElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let element = document.create_element(tag).unwrap();
    document.body().unwrap().append_child(&element).unwrap();
    DomElement::new(element.dyn_into::<HtmlElement>().unwrap())
}

#[wasm_bindgen_test]
fn dom_element_surfaces() {
    let div = element("div");
    div.add_class("visible");
    assert!(div.has_class("visible"));
    div.set_class("visible", false);
    assert!(!div.has_class("visible"));

    div.set_text("42");
    assert_eq!(div.text(), "42");

    div.set_style("opacity", "0.5");
    assert_eq!(div.element().style().get_property_value("opacity").unwrap(), "0.5");
    div.clear_style("opacity");
    assert_eq!(div.element().style().get_property_value("opacity").unwrap(), "");
}

#[wasm_bindgen_test]
fn mount_and_teardown() {
    let navbar = element("nav");
    navbar.element().set_id("navbar");

    let mut site = Site::new("{}").unwrap();
    site.mount().unwrap();
    assert!(site.is_mounted());
    site.mount().unwrap();

    site.notify("success", "Saved").unwrap();
    assert!(site.notify("loud", "Saved").is_err());

    assert!(site.teardown());
    assert!(!site.teardown());
}

#[wasm_bindgen_test]
fn effects_require_mount() {
    let site = Site::new("{}").unwrap();
    assert!(site.play_effect(".typewriter", r#"{"effect":"wave"}"#).is_err());
}

#[wasm_bindgen_test]
fn mount_reveals_entrances_and_sets_parallax() {
    let window = web_sys::window().unwrap();

    let spacer = element("div");
    spacer.set_style("height", "5000px");

    let entering = element("div");
    entering.add_class("fade-in-up");
    for (property, value) in [("position", "fixed"), ("top", "10px"), ("width", "100px"), ("height", "100px")] {
        entering.set_style(property, value);
    }

    let below = element("div");
    below.add_class("fade-in-left");
    for (property, value) in [("position", "absolute"), ("top", "4000px"), ("width", "100px"), ("height", "100px")] {
        below.set_style(property, value);
    }

    let layer = element("div");
    layer.add_class("parallax-element");

    window.scroll_to_with_x_and_y(0.0, 200.0);

    let mut site = Site::new("{}").unwrap();
    site.mount().unwrap();

    assert!(entering.has_class("animated"));
    assert!(entering.has_class("visible"));
    assert!(!below.has_class("visible"));
    assert_eq!(
        layer.element().style().get_property_value("--scroll-y").unwrap(),
        "-100px"
    );

    assert!(site.teardown());
    window.scroll_to_with_x_and_y(0.0, 0.0);
    for node in [spacer, entering, below, layer] {
        node.element().remove();
    }
}
