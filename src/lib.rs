// portfolio_engine: client behavior for a static portfolio site, compiled to
// WebAssembly. The page supplies markup; the behavior lives here.
// Components are plain Rust over the `surface` traits; `dom` binds them to
// the browser and only exists on wasm32.

pub mod animator;
pub mod decor;
pub mod effects;
pub mod error;
pub mod form;
pub mod gallery;
pub mod logging;
pub mod modal;
pub mod nav;
pub mod notify;
pub mod pointer;
pub mod reveal;
pub mod surface;
pub mod types;

#[cfg(target_arch = "wasm32")]
pub mod dom;

use std::collections::BTreeMap;

use serde::Serialize;
use wasm_bindgen::prelude::*;

pub use animator::FrameAnimator;
pub use error::SiteError;
pub use gallery::{GalleryFilterIndex, ItemDescriptor, Selection};
pub use modal::{DetailContent, ModalPresenter};
pub use notify::{Notification, NotificationCenter, NotificationKind};
pub use pointer::{PointerEffect, PointerEffectBinder, Transform};
pub use reveal::{RevealOptions, ViewportRevealTracker};
pub use types::*;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Filter or search result with the caption shown above the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryView {
    #[serde(flatten)]
    pub selection: Selection,
    pub caption: Option<String>,
}

/// Counter text and color for the message box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetView {
    pub remaining: i64,
    pub caption: String,
    pub color: &'static str,
}

/// The site's application context, built once from configuration.
#[wasm_bindgen]
pub struct Site {
    config: SiteConfig,
    gallery: GalleryFilterIndex,
    #[cfg(target_arch = "wasm32")]
    mounted: Option<dom::MountedPage>,
}

#[wasm_bindgen]
impl Site {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<Site, JsValue> {
        Ok(Site::from_config(SiteConfig::from_json(config_json)?))
    }

    /// `{ valid, message }` for one contact field.
    pub fn validate_field(&self, name: &str, value: &str) -> Result<String, JsValue> {
        Ok(self.validate_field_json(name, value)?)
    }

    /// `{ valid, fields }` for a JSON object of field values.
    pub fn validate_form(&self, values_json: &str) -> Result<String, JsValue> {
        Ok(self.validate_form_json(values_json)?)
    }

    /// Replace the indexed projects. Returns how many were loaded.
    pub fn set_projects(&mut self, items_json: &str) -> Result<usize, JsValue> {
        Ok(self.load_projects(items_json)?)
    }

    pub fn filter_projects(&self, category: &str) -> Result<String, JsValue> {
        Ok(self.filter_json(category)?)
    }

    pub fn search_projects(&self, term: &str) -> Result<String, JsValue> {
        Ok(self.search_json(term)?)
    }

    /// Modal content for the project with `id`.
    pub fn project_detail(&self, id: u32) -> Result<String, JsValue> {
        Ok(self.detail_json(id)?)
    }

    /// CSS transform for a pointer at (`x`, `y`) over an element.
    pub fn pointer_transform(
        &self,
        effect_json: &str,
        bounds_json: &str,
        x: f64,
        y: f64,
    ) -> Result<String, JsValue> {
        Ok(self.pointer_css(effect_json, bounds_json, Point::new(x, y))?)
    }

    pub fn character_budget(&self, text: &str) -> Result<String, JsValue> {
        Ok(self.budget_json(text)?)
    }
}

impl Site {
    /// Build from parsed configuration and install logging at its level.
    pub fn from_config(config: SiteConfig) -> Site {
        match logging::init(&config.log_level) {
            Ok(true) => tracing::debug!(level = %config.log_level, "logging installed"),
            Ok(false) => {}
            Err(err) => tracing::warn!(error = %err, "logging not installed"),
        }
        Site {
            gallery: GalleryFilterIndex::new(Vec::new(), &config.gallery.projects),
            config,
            #[cfg(target_arch = "wasm32")]
            mounted: None,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn gallery(&self) -> &GalleryFilterIndex {
        &self.gallery
    }

    pub fn validate_field_json(&self, name: &str, value: &str) -> Result<String, SiteError> {
        Ok(serde_json::to_string(&form::validate_field(name, value))?)
    }

    pub fn validate_form_json(&self, values_json: &str) -> Result<String, SiteError> {
        let values: BTreeMap<String, String> = serde_json::from_str(values_json)?;
        Ok(serde_json::to_string(&form::validate_form(&values))?)
    }

    pub fn load_projects(&mut self, items_json: &str) -> Result<usize, SiteError> {
        let items: Vec<ItemDescriptor> = serde_json::from_str(items_json)?;
        self.gallery = GalleryFilterIndex::new(items, &self.config.gallery.projects);
        Ok(self.gallery.len())
    }

    pub fn filter_json(&self, category: &str) -> Result<String, SiteError> {
        let selection = self.gallery.filter(category);
        let caption = Some(gallery::showing_caption(selection.count));
        Ok(serde_json::to_string(&GalleryView { selection, caption })?)
    }

    pub fn search_json(&self, term: &str) -> Result<String, SiteError> {
        let selection = self.gallery.search(term);
        let caption = gallery::search_caption(selection.count, term);
        Ok(serde_json::to_string(&GalleryView { selection, caption })?)
    }

    pub fn detail_json(&self, id: u32) -> Result<String, SiteError> {
        let item = self
            .gallery
            .get(ElementId::new(id))
            .ok_or_else(|| SiteError::UnknownItem(id.to_string()))?;
        Ok(serde_json::to_string(&DetailContent::from_item(item))?)
    }

    pub fn pointer_css(
        &self,
        effect_json: &str,
        bounds_json: &str,
        pointer: Point,
    ) -> Result<String, SiteError> {
        let effect: PointerEffect = serde_json::from_str(effect_json)?;
        let bounds: Rect = serde_json::from_str(bounds_json)?;
        Ok(effect.transform(&bounds, pointer).to_css())
    }

    pub fn budget_json(&self, text: &str) -> Result<String, SiteError> {
        let budget = form::CharacterBudget::measure(text, self.config.contact.message_budget);
        Ok(serde_json::to_string(&BudgetView {
            remaining: budget.remaining,
            caption: budget.caption(),
            color: budget.color(),
        })?)
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl Site {
    /// Wire every behavior present in the current document. Mounting twice is a no-op.
    pub fn mount(&mut self) -> Result<(), JsValue> {
        if self.mounted.is_some() {
            tracing::debug!("already mounted");
            return Ok(());
        }
        self.mounted = Some(dom::mount(self.config.clone())?);
        Ok(())
    }

    /// Release every listener, registration and task. Returns whether anything was mounted.
    pub fn teardown(&mut self) -> bool {
        match self.mounted.take() {
            Some(page) => {
                page.teardown();
                true
            }
            None => false,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.is_some()
    }

    /// Show a toast; `kind` is `"success"` or `"error"`.
    pub fn notify(&self, kind: &str, message: &str) -> Result<(), JsValue> {
        let kind: NotificationKind = serde_json::from_value(serde_json::Value::String(kind.to_string()))
            .map_err(SiteError::from)?;
        let page = self.mounted_page()?;
        page.notify(Notification::new(kind, message));
        Ok(())
    }

    /// Play an effect (JSON, tagged by `effect`) on every match of `selector`.
    pub fn play_effect(&self, selector: &str, request_json: &str) -> Result<usize, JsValue> {
        let request = effects::EffectRequest::from_json(request_json)?;
        Ok(self.mounted_page()?.play(selector, &request))
    }
}

#[cfg(target_arch = "wasm32")]
impl Site {
    fn mounted_page(&self) -> Result<&dom::MountedPage, SiteError> {
        self.mounted.as_ref().ok_or_else(|| SiteError::IntegrationUnavailable {
            capability: "page".to_string(),
            message: "call mount() first".to_string(),
        })
    }
}
