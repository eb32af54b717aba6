// Project detail modal. Content for one project is rendered in a single
// call, so switching projects never shows a mix of two.

use serde::{Deserialize, Serialize};

use crate::gallery::ItemDescriptor;
use crate::types::{ElementId, GallerySettings, Timestamp};

pub const FEATURES_FALLBACK: &str = "Feature information coming soon...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModalState {
    Closed,
    /// Displayed, waiting to receive the `active` class.
    Opening,
    Open,
    /// `active` removed, waiting to be hidden.
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Code,
    Design,
    Prototype,
}

impl LinkKind {
    pub fn label(&self) -> &'static str {
        match self {
            LinkKind::Code => "View Code",
            LinkKind::Design => "View Design",
            LinkKind::Prototype => "View Prototype",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailLink {
    pub kind: LinkKind,
    pub href: String,
}

/// Everything the modal shows for one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailContent {
    pub item: ElementId,
    pub title: String,
    pub description: String,
    pub image: String,
    pub tags: Vec<String>,
    pub features: Vec<String>,
    /// Links to show; every other link is hidden.
    pub links: Vec<DetailLink>,
}

impl DetailContent {
    /// `ui` projects link to their design and prototype; everything else to
    /// its code repository when one is known.
    pub fn from_item(item: &ItemDescriptor) -> Self {
        let non_empty = |url: &Option<String>| url.as_deref().filter(|u| !u.is_empty()).map(str::to_string);

        let links = if item.category == "ui" {
            [
                (LinkKind::Design, non_empty(&item.design_url)),
                (LinkKind::Prototype, non_empty(&item.prototype_url)),
            ]
            .into_iter()
            .filter_map(|(kind, href)| href.map(|href| DetailLink { kind, href }))
            .collect()
        } else {
            non_empty(&item.detail.code_url)
                .filter(|href| href != "#")
                .map(|href| DetailLink {
                    kind: LinkKind::Code,
                    href,
                })
                .into_iter()
                .collect()
        };

        let features = if item.detail.features.is_empty() {
            vec![FEATURES_FALLBACK.to_string()]
        } else {
            item.detail.features.clone()
        };

        DetailContent {
            item: item.id,
            title: item.title.clone(),
            description: item.description.clone(),
            image: item.image.clone(),
            tags: item.tags.clone(),
            features,
            links,
        }
    }
}

/// The modal's presentation surface.
pub trait DetailView {
    /// Replace every detail field at once.
    fn render(&self, content: &DetailContent);
    /// `display: flex` or `display: none`.
    fn set_displayed(&self, displayed: bool);
    /// The `active` class that drives the CSS transition.
    fn set_active(&self, active: bool);
    /// Background scroll lock on the document body.
    fn lock_scroll(&self, locked: bool);
}

/// Closed -> Opening -> Open -> Closing -> Closed, advanced by `tick`.
pub struct ModalPresenter<V> {
    view: V,
    state: ModalState,
    due: Timestamp,
    current: Option<ElementId>,
    open_delay_ms: f64,
    close_ms: f64,
}

impl<V: DetailView> ModalPresenter<V> {
    pub fn new(view: V, settings: &GallerySettings) -> Self {
        ModalPresenter {
            view,
            state: ModalState::Closed,
            due: Timestamp::default(),
            current: None,
            open_delay_ms: settings.modal_open_delay_ms,
            close_ms: settings.modal_close_ms,
        }
    }

    pub fn state(&self) -> ModalState {
        self.state
    }

    pub fn current(&self) -> Option<ElementId> {
        self.current
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Show `item`. While already opening or open, the content is swapped in place.
    pub fn open(&mut self, item: &ItemDescriptor, now: Timestamp) {
        let content = DetailContent::from_item(item);
        self.view.render(&content);
        self.current = Some(item.id);

        match self.state {
            ModalState::Opening | ModalState::Open => {
                tracing::debug!(item = item.id.as_u32(), "modal content replaced");
            }
            ModalState::Closed | ModalState::Closing => {
                tracing::debug!(item = item.id.as_u32(), "modal opening");
                self.view.set_displayed(true);
                self.view.lock_scroll(true);
                self.state = ModalState::Opening;
                self.due = now.offset(self.open_delay_ms);
            }
        }
    }

    pub fn close(&mut self, now: Timestamp) {
        if matches!(self.state, ModalState::Opening | ModalState::Open) {
            self.view.set_active(false);
            self.state = ModalState::Closing;
            self.due = now.offset(self.close_ms);
        }
    }

    /// Escape closes an active modal. Returns whether the key was consumed.
    pub fn handle_key(&mut self, key: &str, now: Timestamp) -> bool {
        if key == "Escape" && self.state == ModalState::Open {
            self.close(now);
            true
        } else {
            false
        }
    }

    /// Finish any transition that is due.
    pub fn tick(&mut self, now: Timestamp) {
        if now < self.due {
            return;
        }
        match self.state {
            ModalState::Opening => {
                self.view.set_active(true);
                self.state = ModalState::Open;
            }
            ModalState::Closing => {
                self.view.set_displayed(false);
                self.view.lock_scroll(false);
                self.state = ModalState::Closed;
                self.current = None;
            }
            ModalState::Closed | ModalState::Open => {}
        }
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.state, ModalState::Opening | ModalState::Closing)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::gallery::tests::{item, sample_index};

    #[derive(Default)]
    struct RecordingView {
        rendered: RefCell<Vec<DetailContent>>,
        displayed: RefCell<bool>,
        active: RefCell<bool>,
        locked: RefCell<bool>,
    }

    impl DetailView for RecordingView {
        fn render(&self, content: &DetailContent) {
            self.rendered.borrow_mut().push(content.clone());
        }

        fn set_displayed(&self, displayed: bool) {
            *self.displayed.borrow_mut() = displayed;
        }

        fn set_active(&self, active: bool) {
            *self.active.borrow_mut() = active;
        }

        fn lock_scroll(&self, locked: bool) {
            *self.locked.borrow_mut() = locked;
        }
    }

    fn ms(value: f64) -> Timestamp {
        Timestamp::from_millis(value)
    }

    fn presenter() -> ModalPresenter<RecordingView> {
        ModalPresenter::new(RecordingView::default(), &GallerySettings::default())
    }

    #[test]
    fn open_then_close() {
        let index = sample_index();
        let mut modal = presenter();
        modal.open(&index.items()[0], ms(0.0));

        assert_eq!(modal.state(), ModalState::Opening);
        assert!(*modal.view().displayed.borrow());
        assert!(*modal.view().locked.borrow());
        assert!(!*modal.view().active.borrow());

        modal.tick(ms(10.0));
        assert_eq!(modal.state(), ModalState::Open);
        assert!(*modal.view().active.borrow());

        modal.close(ms(20.0));
        assert_eq!(modal.state(), ModalState::Closing);
        assert!(!*modal.view().active.borrow());
        // Still displayed and locked until the transition ends.
        assert!(*modal.view().locked.borrow());

        modal.tick(ms(320.0));
        assert_eq!(modal.state(), ModalState::Closed);
        assert!(!*modal.view().displayed.borrow());
        assert!(!*modal.view().locked.borrow());
        assert_eq!(modal.current(), None);
    }

    #[test]
    fn reopen_replaces_content_without_closing() {
        let index = sample_index();
        let mut modal = presenter();
        modal.open(&index.items()[0], ms(0.0));
        modal.tick(ms(10.0));
        modal.open(&index.items()[2], ms(50.0));

        assert_eq!(modal.state(), ModalState::Open);
        assert_eq!(modal.current(), Some(index.items()[2].id));
        let rendered = modal.view().rendered.borrow();
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[1], DetailContent::from_item(&index.items()[2]));
        assert_eq!(rendered[1].title, "Xpense TrackerApp");
        assert!(rendered[1]
            .features
            .iter()
            .all(|f| index.items()[2].detail.features.contains(f)));
    }

    #[test]
    fn escape_only_closes_active_modal() {
        let index = sample_index();
        let mut modal = presenter();
        assert!(!modal.handle_key("Escape", ms(0.0)));

        modal.open(&index.items()[0], ms(0.0));
        assert!(!modal.handle_key("Escape", ms(5.0)));
        modal.tick(ms(10.0));
        assert!(!modal.handle_key("Enter", ms(11.0)));
        assert!(modal.handle_key("Escape", ms(12.0)));
        assert_eq!(modal.state(), ModalState::Closing);
    }

    #[test]
    fn open_during_close_cancels_the_close() {
        let index = sample_index();
        let mut modal = presenter();
        modal.open(&index.items()[0], ms(0.0));
        modal.tick(ms(10.0));
        modal.close(ms(100.0));
        modal.open(&index.items()[1], ms(200.0));

        modal.tick(ms(400.0));
        assert_eq!(modal.state(), ModalState::Open);
        assert!(*modal.view().locked.borrow());
    }

    #[test]
    fn ui_projects_link_to_design_and_prototype() {
        let index = sample_index();
        let content = DetailContent::from_item(&index.items()[3]);
        let kinds: Vec<LinkKind> = content.links.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![LinkKind::Design, LinkKind::Prototype]);
        assert_eq!(content.features, vec![FEATURES_FALLBACK.to_string()]);
    }

    #[test]
    fn other_projects_link_to_code() {
        let index = sample_index();
        let content = DetailContent::from_item(&index.items()[1]);
        assert_eq!(
            content.links,
            vec![DetailLink {
                kind: LinkKind::Code,
                href: "https://github.com/DikshyaSingh/To-Do-app".to_string()
            }]
        );

        let unknown = DetailContent::from_item(&item(9, "web", "Side Project", "", &[]));
        assert!(unknown.links.is_empty());
    }
}
