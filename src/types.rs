// Strong typing over strings. Newtypes for timestamps, element handles and pixel geometry.

use serde::{Deserialize, Serialize};

use crate::error::SiteError;

/// Timestamp in milliseconds, as delivered by display-refresh callbacks.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, Default)]
pub struct Timestamp(f64);

impl Timestamp {
    pub fn from_millis(ms: f64) -> Self {
        Timestamp(ms)
    }

    pub fn as_millis(&self) -> f64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, never negative.
    pub fn since(&self, earlier: Timestamp) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }

    pub fn offset(&self, ms: f64) -> Self {
        Timestamp(self.0 + ms)
    }
}

/// Element index. Newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct ElementId(u32);

impl ElementId {
    pub fn new(index: u32) -> Self {
        ElementId(index)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Point in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }
}

/// Axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Area; non-positive or non-finite extents count as empty.
    pub fn area(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.width * self.height
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0) || !self.width.is_finite() || !self.height.is_finite()
    }

    /// Overlapping region, if any area is shared.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        let overlap = Rect::new(left, top, right - left, bottom - top);
        if overlap.is_empty() {
            None
        } else {
            Some(overlap)
        }
    }

    /// Grow (positive) or shrink (negative) each edge by the margin.
    pub fn inflate(&self, margin: &Margin) -> Rect {
        Rect::new(
            self.x - margin.left,
            self.y - margin.top,
            self.width + margin.left + margin.right,
            self.height + margin.top + margin.bottom,
        )
    }
}

/// Per-edge pixel offsets applied to the viewport before intersection tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Margin {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn uniform(px: f64) -> Self {
        Margin::new(px, px, px, px)
    }

    /// Parse CSS root-margin shorthand such as `"0px 0px -50px 0px"`.
    /// Accepts one to four values with an optional `px` suffix.
    pub fn parse(spec: &str) -> Result<Margin, SiteError> {
        let values = spec
            .split_whitespace()
            .map(|token| {
                token
                    .strip_suffix("px")
                    .unwrap_or(token)
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
            })
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| SiteError::InvalidMargin(spec.to_string()))?;

        match values.as_slice() {
            [all] => Ok(Margin::uniform(*all)),
            [vertical, horizontal] => Ok(Margin::new(*vertical, *horizontal, *vertical, *horizontal)),
            [top, horizontal, bottom] => Ok(Margin::new(*top, *horizontal, *bottom, *horizontal)),
            [top, right, bottom, left] => Ok(Margin::new(*top, *right, *bottom, *left)),
            _ => Err(SiteError::InvalidMargin(spec.to_string())),
        }
    }
}

/// Easing function for frame animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EasingType {
    /// Identity mapping (typewriter reveal).
    Linear,
    /// Cubic ease-out `1 - (1 - t)^3` (counters, fades, slides, scale, scramble).
    EaseOut,
}

impl EasingType {
    /// Map linear progress to eased progress. Input is clamped to [0, 1].
    pub fn apply(&self, t: f64) -> f64 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            EasingType::Linear => t,
            EasingType::EaseOut => 1.0 - (1.0 - t).powi(3),
        }
    }
}

/// Format a number for inline CSS: at most three decimals, no `-0`.
pub fn css_number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 || !rounded.is_finite() {
        "0".to_string()
    } else {
        format!("{rounded}")
    }
}

/// Deterministic linear congruential generator. The page injects
/// `Math.random`; tests use a fixed seed.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct SeededRng {
    state: u64,
}

#[cfg(test)]
impl SeededRng {
    pub fn new(seed: u64) -> Self {
        SeededRng { state: seed }
    }

    /// Uniform value in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.state >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Site configuration passed from JS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub reveal: RevealSettings,
    #[serde(default)]
    pub motion: MotionSettings,
    #[serde(default)]
    pub pointer: PointerSettings,
    #[serde(default)]
    pub contact: ContactSettings,
    #[serde(default)]
    pub gallery: GallerySettings,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            reveal: RevealSettings::default(),
            motion: MotionSettings::default(),
            pointer: PointerSettings::default(),
            contact: ContactSettings::default(),
            gallery: GallerySettings::default(),
            log_level: default_log_level(),
        }
    }
}

impl SiteConfig {
    pub fn from_json(json: &str) -> Result<SiteConfig, SiteError> {
        let config: SiteConfig =
            serde_json::from_str(json).map_err(|e| SiteError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make an effect meaningless.
    pub fn validate(&self) -> Result<(), SiteError> {
        let fractions = [
            ("reveal.threshold", self.reveal.threshold),
            ("reveal.counter_threshold", self.reveal.counter_threshold),
            ("contact.failure_rate", self.contact.failure_rate),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(SiteError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        let durations = [
            ("motion.counter_duration_ms", self.motion.counter_duration_ms),
            ("motion.fade_duration_ms", self.motion.fade_duration_ms),
            ("motion.typewriter_delay_ms", self.motion.typewriter_delay_ms),
            ("motion.typewriter_start_delay_ms", self.motion.typewriter_start_delay_ms),
            ("motion.caret_blink_ms", self.motion.caret_blink_ms),
            ("motion.stagger_delay_ms", self.motion.stagger_delay_ms),
            ("motion.scramble_frame_ms", self.motion.scramble_frame_ms),
            ("motion.page_transition_ms", self.motion.page_transition_ms),
            ("contact.notification_ms", self.contact.notification_ms),
            ("contact.submission_delay_ms", self.contact.submission_delay_ms),
            ("gallery.modal_open_delay_ms", self.gallery.modal_open_delay_ms),
            ("gallery.modal_close_ms", self.gallery.modal_close_ms),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(SiteError::InvalidConfig(format!(
                    "{name} must be a non-negative number of milliseconds, got {value}"
                )));
            }
        }

        if self.pointer.tilt_divisor == 0.0 || !self.pointer.tilt_divisor.is_finite() {
            return Err(SiteError::InvalidConfig(
                "pointer.tilt_divisor must be a non-zero number".to_string(),
            ));
        }

        Margin::parse(&self.reveal.root_margin)?;
        crate::logging::parse_level(&self.log_level)?;
        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Scroll reveal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealSettings {
    /// Fraction of an element that must be visible before it reveals.
    #[serde(default = "default_reveal_threshold")]
    pub threshold: f64,
    /// CSS root-margin shorthand applied to the viewport.
    #[serde(default = "default_root_margin")]
    pub root_margin: String,
    /// Threshold for counters, progress circles and reveal text.
    #[serde(default = "default_counter_threshold")]
    pub counter_threshold: f64,
    /// Distance above the viewport bottom at which scroll-band elements reveal.
    #[serde(default = "default_reveal_point")]
    pub scroll_band_reveal_point: f64,
}

impl Default for RevealSettings {
    fn default() -> Self {
        RevealSettings {
            threshold: default_reveal_threshold(),
            root_margin: default_root_margin(),
            counter_threshold: default_counter_threshold(),
            scroll_band_reveal_point: default_reveal_point(),
        }
    }
}

fn default_reveal_threshold() -> f64 {
    0.1
}

fn default_root_margin() -> String {
    "0px 0px -50px 0px".to_string()
}

fn default_counter_threshold() -> f64 {
    0.5
}

fn default_reveal_point() -> f64 {
    150.0
}

/// Animation timing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionSettings {
    #[serde(default = "default_counter_duration")]
    pub counter_duration_ms: f64,
    #[serde(default = "default_fade_duration")]
    pub fade_duration_ms: f64,
    #[serde(default = "default_typewriter_delay")]
    pub typewriter_delay_ms: f64,
    #[serde(default = "default_typewriter_start_delay")]
    pub typewriter_start_delay_ms: f64,
    #[serde(default = "default_caret_blink")]
    pub caret_blink_ms: f64,
    #[serde(default = "default_stagger_delay")]
    pub stagger_delay_ms: f64,
    /// One scramble frame; 16 ms approximates 60 Hz.
    #[serde(default = "default_scramble_frame")]
    pub scramble_frame_ms: f64,
    /// Scroll offset after which the navbar is marked as scrolled.
    #[serde(default = "default_nav_scroll_threshold")]
    pub nav_scroll_threshold: f64,
    #[serde(default = "default_parallax_rate")]
    pub parallax_rate: f64,
    #[serde(default = "default_page_transition")]
    pub page_transition_ms: f64,
}

impl Default for MotionSettings {
    fn default() -> Self {
        MotionSettings {
            counter_duration_ms: default_counter_duration(),
            fade_duration_ms: default_fade_duration(),
            typewriter_delay_ms: default_typewriter_delay(),
            typewriter_start_delay_ms: default_typewriter_start_delay(),
            caret_blink_ms: default_caret_blink(),
            stagger_delay_ms: default_stagger_delay(),
            scramble_frame_ms: default_scramble_frame(),
            nav_scroll_threshold: default_nav_scroll_threshold(),
            parallax_rate: default_parallax_rate(),
            page_transition_ms: default_page_transition(),
        }
    }
}

fn default_counter_duration() -> f64 {
    2000.0
}

fn default_fade_duration() -> f64 {
    300.0
}

fn default_typewriter_delay() -> f64 {
    100.0
}

fn default_typewriter_start_delay() -> f64 {
    1000.0
}

fn default_caret_blink() -> f64 {
    500.0
}

fn default_stagger_delay() -> f64 {
    100.0
}

fn default_scramble_frame() -> f64 {
    16.0
}

fn default_nav_scroll_threshold() -> f64 {
    50.0
}

fn default_parallax_rate() -> f64 {
    0.5
}

fn default_page_transition() -> f64 {
    500.0
}

/// Pointer effect tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointerSettings {
    /// Fraction of the pointer offset applied as translation.
    #[serde(default = "default_magnetic_strength")]
    pub magnetic_strength: f64,
    /// Pixels of pointer offset per degree of rotation.
    #[serde(default = "default_tilt_divisor")]
    pub tilt_divisor: f64,
    #[serde(default = "default_tilt_perspective")]
    pub tilt_perspective: f64,
}

impl Default for PointerSettings {
    fn default() -> Self {
        PointerSettings {
            magnetic_strength: default_magnetic_strength(),
            tilt_divisor: default_tilt_divisor(),
            tilt_perspective: default_tilt_perspective(),
        }
    }
}

fn default_magnetic_strength() -> f64 {
    0.1
}

fn default_tilt_divisor() -> f64 {
    10.0
}

fn default_tilt_perspective() -> f64 {
    1000.0
}

/// Contact page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactSettings {
    #[serde(default = "default_notification_lifetime")]
    pub notification_ms: f64,
    #[serde(default = "default_submission_delay")]
    pub submission_delay_ms: f64,
    /// Probability that the simulated submission is rejected.
    #[serde(default = "default_failure_rate")]
    pub failure_rate: f64,
    /// Maximum message length shown by the character counter.
    #[serde(default = "default_message_budget")]
    pub message_budget: usize,
}

impl Default for ContactSettings {
    fn default() -> Self {
        ContactSettings {
            notification_ms: default_notification_lifetime(),
            submission_delay_ms: default_submission_delay(),
            failure_rate: default_failure_rate(),
            message_budget: default_message_budget(),
        }
    }
}

fn default_notification_lifetime() -> f64 {
    5000.0
}

fn default_submission_delay() -> f64 {
    2000.0
}

fn default_failure_rate() -> f64 {
    0.1
}

fn default_message_budget() -> usize {
    500
}

/// Project gallery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GallerySettings {
    /// Descriptions longer than this get a "Read more" toggle.
    #[serde(default = "default_read_more_limit")]
    pub read_more_limit: usize,
    #[serde(default = "default_modal_open_delay")]
    pub modal_open_delay_ms: f64,
    #[serde(default = "default_modal_close")]
    pub modal_close_ms: f64,
    /// Extra detail keyed by project title.
    #[serde(default = "default_project_details")]
    pub projects: Vec<ProjectDetailConfig>,
}

impl Default for GallerySettings {
    fn default() -> Self {
        GallerySettings {
            read_more_limit: default_read_more_limit(),
            modal_open_delay_ms: default_modal_open_delay(),
            modal_close_ms: default_modal_close(),
            projects: default_project_details(),
        }
    }
}

fn default_read_more_limit() -> usize {
    120
}

fn default_modal_open_delay() -> f64 {
    10.0
}

fn default_modal_close() -> f64 {
    300.0
}

/// Detail record merged into a project card when its modal opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetailConfig {
    pub title: String,
    #[serde(default)]
    pub code_url: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

fn default_project_details() -> Vec<ProjectDetailConfig> {
    let detail = |title: &str, code_url: &str, features: &[&str]| ProjectDetailConfig {
        title: title.to_string(),
        code_url: Some(code_url.to_string()),
        features: features.iter().map(|f| f.to_string()).collect(),
    };

    vec![
        detail(
            "Personal Portfolio",
            "https://github.com/yourusername/personal-portfolio",
            &[
                "User authentication and authorization",
                "Product catalog with search and filters",
                "Shopping cart and checkout process",
                "Payment integration with Stripe",
                "Admin dashboard for inventory management",
                "Responsive design for all devices",
            ],
        ),
        detail(
            "TO-DO App",
            "https://github.com/DikshyaSingh/To-Do-app",
            &[
                "User authentication and authorization",
                "Create & Manage Study Goals",
                "Daily Task Completion Tracking",
                "Streak Maintenance for Motivation",
                "AsyncStorage for Local Data Handling",
            ],
        ),
        detail(
            "Xpense TrackerApp",
            "https://github.com/DikshyaSingh/XpenseTracker",
            &[
                "Email Authentication (Login & Signup)",
                "Create & Join Rooms with Invite Codes",
                "Multi-Room Switching",
                "Real-Time Chat System (Firebase)",
                "Add & Track Income/Expenses",
                "Search in Transactions",
                "Profile with Image Upload (AsyncStorage)",
                "Update Username & Logout",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_since_never_negative() {
        let earlier = Timestamp::from_millis(100.0);
        let later = Timestamp::from_millis(116.5);
        assert!((later.since(earlier) - 16.5).abs() < 1e-9);
        assert_eq!(earlier.since(later), 0.0);
    }

    #[test]
    fn rect_intersection() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        let overlap = a.intersection(&b).unwrap();
        assert_eq!(overlap, Rect::new(50.0, 50.0, 50.0, 50.0));

        let far = Rect::new(200.0, 200.0, 10.0, 10.0);
        assert!(a.intersection(&far).is_none());
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn zero_area_rect_is_empty() {
        assert!(Rect::new(5.0, 5.0, 0.0, 20.0).is_empty());
        assert_eq!(Rect::new(5.0, 5.0, 0.0, 20.0).area(), 0.0);
        assert!(Rect::new(0.0, 0.0, f64::NAN, 1.0).is_empty());
    }

    #[test]
    fn inflate_with_negative_bottom_margin() {
        let viewport = Rect::new(0.0, 0.0, 800.0, 600.0);
        let margin = Margin::parse("0px 0px -50px 0px").unwrap();
        assert_eq!(viewport.inflate(&margin), Rect::new(0.0, 0.0, 800.0, 550.0));
    }

    #[test]
    fn margin_shorthand_forms() {
        assert_eq!(Margin::parse("10px").unwrap(), Margin::uniform(10.0));
        assert_eq!(Margin::parse("1 2").unwrap(), Margin::new(1.0, 2.0, 1.0, 2.0));
        assert_eq!(Margin::parse("1px 2px 3px").unwrap(), Margin::new(1.0, 2.0, 3.0, 2.0));
        assert!(Margin::parse("").is_err());
        assert!(Margin::parse("10%").is_err());
        assert!(Margin::parse("1 2 3 4 5").is_err());
    }

    #[test]
    fn easing_bounds() {
        for easing in [EasingType::Linear, EasingType::EaseOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert_eq!(easing.apply(2.0), 1.0);
            assert_eq!(easing.apply(-1.0), 0.0);
        }
        assert!((EasingType::EaseOut.apply(0.5) - 0.875).abs() < 1e-9);
    }

    #[test]
    fn css_number_formatting() {
        assert_eq!(css_number(100.0), "100");
        assert_eq!(css_number(12.5), "12.5");
        assert_eq!(css_number(1.0 / 3.0), "0.333");
        assert_eq!(css_number(-0.0001), "0");
    }

    #[test]
    fn seeded_rng_in_unit_interval() {
        let mut rng = SeededRng::new(7);
        for _ in 0..1000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn config_defaults_from_empty_json() {
        let config = SiteConfig::from_json("{}").unwrap();
        assert_eq!(config.reveal.threshold, 0.1);
        assert_eq!(config.reveal.root_margin, "0px 0px -50px 0px");
        assert_eq!(config.motion.counter_duration_ms, 2000.0);
        assert_eq!(config.contact.message_budget, 500);
        assert_eq!(config.gallery.projects.len(), 3);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn config_rejects_out_of_range_threshold() {
        let err = SiteConfig::from_json(r#"{"reveal":{"threshold":1.5}}"#).unwrap_err();
        assert!(matches!(err, SiteError::InvalidConfig(_)));
    }

    #[test]
    fn config_rejects_bad_margin() {
        let err = SiteConfig::from_json(r#"{"reveal":{"root_margin":"oops"}}"#).unwrap_err();
        assert!(matches!(err, SiteError::InvalidMargin(_)));
    }

    #[test]
    fn config_rejects_malformed_json() {
        assert!(matches!(
            SiteConfig::from_json("{not json"),
            Err(SiteError::InvalidConfig(_))
        ));
    }
}
