// Project gallery: category filter, text search, read-more toggles and
// overlay link resolution over a static list of project cards.

use serde::{Deserialize, Serialize};

use crate::surface::ClassSlot;
use crate::types::{ElementId, ProjectDetailConfig};

/// Extra detail shown only in the modal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    #[serde(default)]
    pub code_url: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

/// One project card as read from the markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    pub id: ElementId,
    pub category: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub design_url: Option<String>,
    #[serde(default)]
    pub prototype_url: Option<String>,
    #[serde(default)]
    pub detail: DetailRecord,
}

impl ItemDescriptor {
    /// Case-insensitive substring match on title, description or any tag.
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
    }
}

/// Visible/hidden partition produced by a filter or search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub visible: Vec<ElementId>,
    pub hidden: Vec<ElementId>,
    pub count: usize,
}

impl Selection {
    pub fn contains(&self, id: ElementId) -> bool {
        self.visible.contains(&id)
    }
}

pub const ALL_CATEGORIES: &str = "all";

/// In-memory index over the page's project cards.
#[derive(Debug, Clone, Default)]
pub struct GalleryFilterIndex {
    items: Vec<ItemDescriptor>,
}

impl GalleryFilterIndex {
    /// Build the index, filling each item's detail from the matching title.
    pub fn new(mut items: Vec<ItemDescriptor>, details: &[ProjectDetailConfig]) -> Self {
        for item in &mut items {
            if let Some(config) = details.iter().find(|d| d.title == item.title) {
                item.detail = DetailRecord {
                    code_url: config.code_url.clone().filter(|url| !url.is_empty() && url != "#"),
                    features: config.features.clone(),
                };
            }
        }
        tracing::debug!(items = items.len(), "gallery indexed");
        GalleryFilterIndex { items }
    }

    pub fn items(&self) -> &[ItemDescriptor] {
        &self.items
    }

    pub fn get(&self, id: ElementId) -> Option<&ItemDescriptor> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in `category`, or every item for `all`.
    pub fn filter(&self, category: &str) -> Selection {
        self.partition(|item| category == ALL_CATEGORIES || item.category == category)
    }

    /// Items whose title, description or tags contain `term`, ignoring case.
    /// An empty term matches everything.
    pub fn search(&self, term: &str) -> Selection {
        let needle = term.to_lowercase();
        self.partition(|item| item.matches(&needle))
    }

    fn partition<P>(&self, predicate: P) -> Selection
    where
        P: Fn(&ItemDescriptor) -> bool,
    {
        let (visible, hidden): (Vec<&ItemDescriptor>, Vec<&ItemDescriptor>) =
            self.items.iter().partition(|&item| predicate(item));
        Selection {
            count: visible.len(),
            visible: visible.iter().map(|item| item.id).collect(),
            hidden: hidden.iter().map(|item| item.id).collect(),
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Caption above the grid after a category filter.
pub fn showing_caption(count: usize) -> String {
    format!("Showing {count} project{}", plural(count))
}

/// Caption after a search; `None` hides it for an empty term.
pub fn search_caption(count: usize, term: &str) -> Option<String> {
    if term.is_empty() {
        return None;
    }
    Some(format!(
        "Found {count} project{} matching \"{}\"",
        plural(count),
        term.to_lowercase()
    ))
}

/// Expand/collapse state for a long card description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadMore {
    expanded: bool,
}

impl ReadMore {
    /// A toggle for descriptions longer than `limit` characters, else `None`.
    pub fn for_description(text: &str, limit: usize) -> Option<ReadMore> {
        (text.trim().chars().count() > limit).then_some(ReadMore { expanded: false })
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn label(&self) -> &'static str {
        if self.expanded {
            "Read less"
        } else {
            "Read more"
        }
    }

    pub fn aria_expanded(&self) -> &'static str {
        if self.expanded {
            "true"
        } else {
            "false"
        }
    }

    /// Swap the description between `truncated` and `full`.
    pub fn apply<S: ClassSlot>(&self, description: &S) {
        description.set_class("truncated", !self.expanded);
        description.set_class("full", self.expanded);
    }
}

/// Link rewrite for a card overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlayLink {
    /// Index into the card's overlay links.
    pub slot: usize,
    pub href: String,
    pub title: &'static str,
    pub icon_class: &'static str,
}

/// Design and prototype links for `ui` cards; other cards keep their markup.
/// With a single overlay link the prototype link wins the slot.
pub fn overlay_links(item: &ItemDescriptor, link_count: usize) -> Vec<OverlayLink> {
    if item.category != "ui" || link_count == 0 {
        return Vec::new();
    }

    let prototype_slot = if link_count > 1 { 1 } else { 0 };
    let mut links = Vec::new();
    if let Some(url) = item.design_url.as_deref().filter(|u| !u.is_empty()) {
        links.push(OverlayLink {
            slot: 0,
            href: url.to_string(),
            title: "View Design",
            icon_class: "fas fa-palette",
        });
    }
    if let Some(url) = item.prototype_url.as_deref().filter(|u| !u.is_empty()) {
        links.push(OverlayLink {
            slot: prototype_slot,
            href: url.to_string(),
            title: "View Prototype",
            icon_class: "fas fa-play-circle",
        });
    }
    links
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::surface::mock::MockElement;
    use crate::types::GallerySettings;

    pub(crate) fn item(id: u32, category: &str, title: &str, description: &str, tags: &[&str]) -> ItemDescriptor {
        ItemDescriptor {
            id: ElementId::new(id),
            category: category.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            image: format!("images/{id}.png"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            design_url: None,
            prototype_url: None,
            detail: DetailRecord::default(),
        }
    }

    pub(crate) fn sample_index() -> GalleryFilterIndex {
        let mut dashboard = item(3, "ui", "Finance Dashboard", "Figma concept for budgeting", &["Figma"]);
        dashboard.design_url = Some("https://figma.com/file/abc".to_string());
        dashboard.prototype_url = Some("https://figma.com/proto/abc".to_string());

        GalleryFilterIndex::new(
            vec![
                item(0, "web", "Personal Portfolio", "Animated personal site", &["HTML", "CSS", "JavaScript"]),
                item(1, "mobile", "TO-DO App", "Study goals and streaks", &["React Native"]),
                item(2, "mobile", "Xpense TrackerApp", "Track shared expenses across rooms", &["React Native", "Firebase"]),
                dashboard,
            ],
            &GallerySettings::default().projects,
        )
    }

    #[test]
    fn filter_all_returns_everything() {
        let index = sample_index();
        let all = index.filter("all");
        assert_eq!(all.count, 4);
        assert!(all.hidden.is_empty());
    }

    #[test]
    fn filter_by_category_is_exact() {
        let index = sample_index();
        let ui = index.filter("ui");
        assert_eq!(ui.visible, vec![ElementId::new(3)]);
        assert_eq!(ui.count, 1);
        assert_eq!(ui.hidden.len(), 3);

        assert_eq!(index.filter("UI").count, 0);
        assert_eq!(index.filter("mobile").count, 2);
    }

    #[test]
    fn search_matches_title_case_insensitively() {
        let index = sample_index();
        // Only the title mentions a dashboard.
        let found = index.search("DASHBOARD");
        assert_eq!(found.visible, vec![ElementId::new(3)]);
        assert_eq!(found.count, 1);
        assert_eq!(index.search("tracker").visible, vec![ElementId::new(2)]);
    }

    #[test]
    fn search_matches_tags_and_description() {
        let index = sample_index();
        assert_eq!(index.search("FIREBASE").visible, vec![ElementId::new(2)]);
        assert_eq!(index.search("streaks").visible, vec![ElementId::new(1)]);
        assert_eq!(index.search("react").count, 2);
        assert_eq!(index.search("").count, 4);
        assert_eq!(index.search("cobol").count, 0);
    }

    #[test]
    fn details_are_joined_by_title() {
        let index = sample_index();
        let todo = index.get(ElementId::new(1)).unwrap();
        assert_eq!(
            todo.detail.code_url.as_deref(),
            Some("https://github.com/DikshyaSingh/To-Do-app")
        );
        assert_eq!(todo.detail.features.len(), 5);
        assert!(index.get(ElementId::new(3)).unwrap().detail.features.is_empty());
    }

    #[test]
    fn captions() {
        assert_eq!(showing_caption(1), "Showing 1 project");
        assert_eq!(showing_caption(0), "Showing 0 projects");
        assert_eq!(
            search_caption(2, "React").as_deref(),
            Some("Found 2 projects matching \"react\"")
        );
        assert_eq!(search_caption(0, ""), None);
    }

    #[test]
    fn read_more_toggles() {
        assert!(ReadMore::for_description(&"x".repeat(120), 120).is_none());
        let mut toggle = ReadMore::for_description(&"x".repeat(121), 120).unwrap();
        let description = MockElement::default();

        toggle.apply(&description);
        assert!(description.has_class("truncated"));
        assert_eq!(toggle.label(), "Read more");

        toggle.toggle();
        toggle.apply(&description);
        assert!(description.has_class("full"));
        assert!(!description.has_class("truncated"));
        assert_eq!(toggle.label(), "Read less");
        assert_eq!(toggle.aria_expanded(), "true");
    }

    #[test]
    fn overlay_links_only_for_ui_cards() {
        let index = sample_index();
        let ui = index.get(ElementId::new(3)).unwrap();
        let links = overlay_links(ui, 2);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].title, "View Design");
        assert_eq!(links[1].slot, 1);

        let single = overlay_links(ui, 1);
        assert!(single.iter().all(|link| link.slot == 0));

        assert!(overlay_links(index.get(ElementId::new(0)).unwrap(), 2).is_empty());
    }
}
