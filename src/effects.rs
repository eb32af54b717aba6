// Visual effects over the frame animator: counters, fades, slides, scale,
// text scramble, typewriter, stagger, wave text and particle motion.

use serde::{Deserialize, Serialize};

use crate::animator::{FrameAnimator, RunId, StepId, TaskId};
use crate::surface::{ClassSlot, StyleSlot, TextSlot};
use crate::types::{css_number, EasingType, MotionSettings, Timestamp};

/// Glyphs shown while a scrambled character is unresolved.
pub const SCRAMBLE_GLYPHS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Keyframes injected once for wave text.
pub const WAVE_KEYFRAMES: &str =
    "@keyframes wave { 0%, 60%, 100% { transform: translateY(0); } 30% { transform: translateY(-20px); } }";

/// Caret style used by the typewriter.
pub const CARET_BORDER: &str = "2px solid var(--primary-color)";

/// Counter value for eased progress, floored like the page shows it.
pub fn counter_value(start: i64, end: i64, eased: f64) -> i64 {
    (start as f64 + (end - start) as f64 * eased).floor() as i64
}

/// Parse a `data-target` attribute the way `parseInt` reads it:
/// optional sign, then leading digits; anything after is ignored.
pub fn parse_counter_target(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Count from `start` to `end` with cubic ease-out; the final text is exactly `end`.
pub fn animate_counter<S>(
    animator: &mut FrameAnimator,
    now: Timestamp,
    slot: S,
    start: i64,
    end: i64,
    duration_ms: f64,
) -> Option<RunId>
where
    S: TextSlot + Clone + 'static,
{
    let frame_slot = slot.clone();
    animator.run(
        now,
        duration_ms,
        EasingType::EaseOut,
        move |eased| frame_slot.set_text(&counter_value(start, end, eased).to_string()),
        move || slot.set_text(&end.to_string()),
    )
}

pub fn fade_in<S>(animator: &mut FrameAnimator, now: Timestamp, slot: S, duration_ms: f64) -> Option<RunId>
where
    S: StyleSlot + Clone + 'static,
{
    slot.set_style("opacity", "0");
    slot.set_style("display", "block");
    let frame_slot = slot.clone();
    animator.run(
        now,
        duration_ms,
        EasingType::EaseOut,
        move |eased| frame_slot.set_style("opacity", &css_number(eased)),
        || {},
    )
}

/// Fade from `start_opacity` (the element's computed opacity) to hidden.
pub fn fade_out<S>(
    animator: &mut FrameAnimator,
    now: Timestamp,
    slot: S,
    start_opacity: f64,
    duration_ms: f64,
) -> Option<RunId>
where
    S: StyleSlot + Clone + 'static,
{
    let frame_slot = slot.clone();
    animator.run(
        now,
        duration_ms,
        EasingType::EaseOut,
        move |eased| frame_slot.set_style("opacity", &css_number(start_opacity * (1.0 - eased))),
        move || slot.set_style("display", "none"),
    )
}

/// Edge an element slides in from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideDirection {
    Left,
    Right,
    Up,
    Down,
}

impl SlideDirection {
    /// Transform with `remaining` percent of the travel left.
    pub fn transform(&self, remaining: f64) -> String {
        let remaining = css_number(remaining);
        match self {
            SlideDirection::Left => format!("translateX(-{remaining}%)"),
            SlideDirection::Right => format!("translateX({remaining}%)"),
            SlideDirection::Up => format!("translateY(-{remaining}%)"),
            SlideDirection::Down => format!("translateY({remaining}%)"),
        }
    }
}

pub fn slide_in<S>(
    animator: &mut FrameAnimator,
    now: Timestamp,
    slot: S,
    direction: SlideDirection,
    duration_ms: f64,
) -> Option<RunId>
where
    S: StyleSlot + Clone + 'static,
{
    slot.set_style("transform", &direction.transform(100.0));
    slot.set_style("opacity", "0");
    slot.set_style("display", "block");
    let frame_slot = slot.clone();
    animator.run(
        now,
        duration_ms,
        EasingType::EaseOut,
        move |eased| {
            frame_slot.set_style("transform", &direction.transform(100.0 * (1.0 - eased)));
            frame_slot.set_style("opacity", &css_number(eased));
        },
        move || {
            slot.clear_style("transform");
            slot.clear_style("opacity");
        },
    )
}

pub fn scale_in<S>(animator: &mut FrameAnimator, now: Timestamp, slot: S, duration_ms: f64) -> Option<RunId>
where
    S: StyleSlot + Clone + 'static,
{
    slot.set_style("transform", "scale(0)");
    slot.set_style("opacity", "0");
    slot.set_style("display", "block");
    let frame_slot = slot.clone();
    animator.run(
        now,
        duration_ms,
        EasingType::EaseOut,
        move |eased| {
            frame_slot.set_style("transform", &format!("scale({})", css_number(eased)));
            frame_slot.set_style("opacity", &css_number(eased));
        },
        move || {
            slot.clear_style("transform");
            slot.clear_style("opacity");
        },
    )
}

/// One frame of the scramble effect. Character `i` is resolved once the
/// eased frame progress passes `i / len`; the rest show random glyphs.
pub fn scramble_frame<R>(final_text: &str, frame: u32, total_frames: u32, rng: &mut R) -> String
where
    R: FnMut() -> f64,
{
    let glyphs: Vec<char> = SCRAMBLE_GLYPHS.chars().collect();
    let chars: Vec<char> = final_text.chars().collect();
    let len = chars.len() as f64;
    let progress = EasingType::EaseOut.apply(frame as f64 / total_frames.max(1) as f64);

    chars
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if progress > i as f64 / len {
                *c
            } else {
                let pick = (rng() * glyphs.len() as f64) as usize;
                glyphs[pick.min(glyphs.len() - 1)]
            }
        })
        .collect()
}

/// Scramble text into `final_text`, one discrete frame per `frame_ms`.
pub fn animate_scramble<S, R>(
    animator: &mut FrameAnimator,
    now: Timestamp,
    slot: S,
    final_text: String,
    duration_ms: f64,
    frame_ms: f64,
    mut rng: R,
) -> StepId
where
    S: TextSlot + Clone + 'static,
    R: FnMut() -> f64 + 'static,
{
    let total_frames = if frame_ms > 0.0 {
        (duration_ms / frame_ms).ceil().max(1.0) as u32
    } else {
        1
    };
    let frame_slot = slot.clone();
    let frame_text = final_text.clone();
    animator.run_steps(
        now,
        0.0,
        frame_ms,
        total_frames,
        move |frame| frame_slot.set_text(&scramble_frame(&frame_text, frame, total_frames, &mut rng)),
        move || slot.set_text(&final_text),
    )
}

/// Typewriter run and the caret blink that follows it.
#[derive(Debug, Clone, Copy)]
pub struct Typewriter {
    pub typing: StepId,
    pub caret: TaskId,
}

/// Type `text` one character per step after the configured start delay,
/// then blink the caret border until cancelled.
pub fn typewriter<S>(
    animator: &mut FrameAnimator,
    now: Timestamp,
    slot: S,
    text: &str,
    settings: &MotionSettings,
) -> Typewriter
where
    S: TextSlot + StyleSlot + Clone + 'static,
{
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len() as u32;

    slot.set_text("");
    slot.set_style("border-right", CARET_BORDER);

    let step_slot = slot.clone();
    let typing = animator.run_steps(
        now,
        settings.typewriter_start_delay_ms,
        settings.typewriter_delay_ms,
        total,
        move |i| {
            let typed: String = chars[..=i as usize].iter().collect();
            step_slot.set_text(&typed);
        },
        || {},
    );

    // Typing finishes one delay after the last character; the first toggle
    // comes one blink interval later.
    let blink_start = settings.typewriter_start_delay_ms
        + total as f64 * settings.typewriter_delay_ms
        + settings.caret_blink_ms;
    let mut caret_visible = true;
    let caret = animator.every(now, blink_start, settings.caret_blink_ms, move |_| {
        caret_visible = !caret_visible;
        slot.set_style("border-right", if caret_visible { CARET_BORDER } else { "none" });
    });

    Typewriter { typing, caret }
}

/// Add `class` to item `i` after `initial_delay_ms + i * delay_ms`.
pub fn stagger<S>(
    animator: &mut FrameAnimator,
    now: Timestamp,
    items: Vec<S>,
    class: impl Into<String>,
    initial_delay_ms: f64,
    delay_ms: f64,
) -> StepId
where
    S: ClassSlot + 'static,
{
    let class = class.into();
    let total = items.len() as u32;
    animator.run_steps(
        now,
        initial_delay_ms,
        delay_ms,
        total,
        move |i| {
            if let Some(item) = items.get(i as usize) {
                item.add_class(&class);
            }
        },
        || {},
    )
}

/// Cards start low and transparent, then rise into place one by one.
pub fn rise_in<S>(animator: &mut FrameAnimator, now: Timestamp, items: Vec<S>, delay_ms: f64) -> StepId
where
    S: StyleSlot + 'static,
{
    for item in &items {
        item.set_style("opacity", "0");
        item.set_style("transform", "translateY(30px)");
    }
    let total = items.len() as u32;
    animator.run_steps(
        now,
        0.0,
        delay_ms,
        total,
        move |i| {
            if let Some(item) = items.get(i as usize) {
                item.set_style("transition", "all 0.6s ease");
                item.set_style("opacity", "1");
                item.set_style("transform", "translateY(0)");
            }
        },
        || {},
    )
}

/// Put overlay links in their hidden pose.
pub fn rest_links<S: StyleSlot>(links: &[S]) {
    for link in links {
        link.set_style("transform", "scale(0.8) translateY(10px)");
        link.set_style("opacity", "0");
    }
}

/// Pop overlay links in one at a time.
pub fn show_links<S>(animator: &mut FrameAnimator, now: Timestamp, links: Vec<S>, delay_ms: f64) -> StepId
where
    S: StyleSlot + 'static,
{
    let total = links.len() as u32;
    animator.run_steps(
        now,
        0.0,
        delay_ms,
        total,
        move |i| {
            if let Some(link) = links.get(i as usize) {
                link.set_style("transform", "scale(1) translateY(0)");
                link.set_style("opacity", "1");
            }
        },
        || {},
    )
}

/// One letter of wave text with its animation delay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveLetter {
    pub text: String,
    pub delay_s: f64,
}

impl WaveLetter {
    /// Inline `animation` value for this letter.
    pub fn animation(&self) -> String {
        format!("wave 2s ease-in-out {}s infinite", css_number(self.delay_s))
    }
}

/// Split text into wave letters; spaces become non-breaking so they keep width.
pub fn wave_letters(text: &str) -> Vec<WaveLetter> {
    text.chars()
        .enumerate()
        .map(|(i, c)| WaveLetter {
            text: if c == ' ' { '\u{00A0}'.to_string() } else { c.to_string() },
            delay_s: (i as f64 * 0.1 * 10.0).round() / 10.0,
        })
        .collect()
}

/// Particle system options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleOptions {
    #[serde(default = "default_particle_count")]
    pub count: usize,
    #[serde(default = "default_particle_color")]
    pub color: String,
    #[serde(default = "default_particle_size")]
    pub size: f64,
    #[serde(default = "default_particle_speed")]
    pub speed: f64,
}

impl Default for ParticleOptions {
    fn default() -> Self {
        ParticleOptions {
            count: default_particle_count(),
            color: default_particle_color(),
            size: default_particle_size(),
            speed: default_particle_speed(),
        }
    }
}

fn default_particle_count() -> usize {
    50
}

fn default_particle_color() -> String {
    "#ff6b9d".to_string()
}

fn default_particle_size() -> f64 {
    2.0
}

fn default_particle_speed() -> f64 {
    1.0
}

/// An effect the page asks to play on every element matching a selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum EffectRequest {
    FadeIn {
        #[serde(default)]
        duration_ms: Option<f64>,
    },
    FadeOut {
        #[serde(default)]
        duration_ms: Option<f64>,
    },
    SlideIn {
        direction: SlideDirection,
        #[serde(default)]
        duration_ms: Option<f64>,
    },
    ScaleIn {
        #[serde(default)]
        duration_ms: Option<f64>,
    },
    Scramble {
        #[serde(default = "default_scramble_duration")]
        duration_ms: f64,
    },
    Wave,
    Stagger {
        class: String,
        #[serde(default)]
        delay_ms: Option<f64>,
    },
    Particles {
        #[serde(default)]
        options: ParticleOptions,
    },
}

fn default_scramble_duration() -> f64 {
    2000.0
}

impl EffectRequest {
    pub fn from_json(json: &str) -> Result<Self, crate::error::SiteError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub opacity: f64,
}

/// Free-floating particles that wrap around the container edges.
#[derive(Debug, Clone)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width: f64,
    height: f64,
}

impl ParticleField {
    pub fn scatter<R>(options: &ParticleOptions, width: f64, height: f64, rng: &mut R) -> Self
    where
        R: FnMut() -> f64,
    {
        let particles = (0..options.count)
            .map(|_| Particle {
                x: rng() * width,
                y: rng() * height,
                vx: (rng() - 0.5) * options.speed,
                vy: (rng() - 0.5) * options.speed,
                opacity: rng() * 0.5 + 0.3,
            })
            .collect();

        ParticleField {
            particles,
            width,
            height,
        }
    }

    /// Advance one frame.
    pub fn step(&mut self) {
        for particle in &mut self.particles {
            particle.x += particle.vx;
            particle.y += particle.vy;

            if particle.x < 0.0 {
                particle.x = self.width;
            }
            if particle.x > self.width {
                particle.x = 0.0;
            }
            if particle.y < 0.0 {
                particle.y = self.height;
            }
            if particle.y > self.height {
                particle.y = 0.0;
            }
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
}
