// Decorative effects: morphing blobs, glitch text, scattered particles and
// sparkles. Repeating work is registered as animator tasks owned by `Decor`.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::animator::{FrameAnimator, TaskId};
use crate::surface::{ClassSlot, StyleSlot};
use crate::types::{css_number, Timestamp};

pub const BLOB_MORPH_INTERVAL_MS: f64 = 2000.0;
pub const GLITCH_CHECK_INTERVAL_MS: f64 = 100.0;
pub const GLITCH_DURATION_MS: f64 = 200.0;
/// A glitch starts when the random draw exceeds this.
pub const GLITCH_CHANCE_CUTOFF: f64 = 0.95;

type SharedRng = Rc<RefCell<Box<dyn FnMut() -> f64>>>;

fn draw_from(rng: &SharedRng) -> f64 {
    let mut next = rng.borrow_mut();
    (next.as_mut())()
}

/// Border radius with four random corners in 30..60 %.
pub fn blob_radius<R>(rng: &mut R) -> String
where
    R: FnMut() -> f64,
{
    let mut corner = || format!("{}%", css_number(rng() * 30.0 + 30.0));
    let (a, b, c, d) = (corner(), corner(), corner(), corner());
    format!("{a} {b} {c} {d}")
}

/// Placement of one floating background particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingParticle {
    pub left_pct: f64,
    pub delay_s: f64,
    pub duration_s: f64,
}

/// Placement of one sparkle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sparkle {
    pub top_pct: f64,
    pub left_pct: f64,
    pub delay_s: f64,
}

pub fn scatter_particles<R>(count: usize, rng: &mut R) -> Vec<FloatingParticle>
where
    R: FnMut() -> f64,
{
    (0..count)
        .map(|_| FloatingParticle {
            left_pct: rng() * 100.0,
            delay_s: rng() * 6.0,
            duration_s: rng() * 3.0 + 3.0,
        })
        .collect()
}

pub fn scatter_sparkles<R>(count: usize, rng: &mut R) -> Vec<Sparkle>
where
    R: FnMut() -> f64,
{
    (0..count)
        .map(|_| Sparkle {
            top_pct: rng() * 100.0,
            left_pct: rng() * 100.0,
            delay_s: rng() * 2.0,
        })
        .collect()
}

/// Owner of every repeating decorative task on the page.
pub struct Decor {
    rng: SharedRng,
    tasks: Vec<TaskId>,
}

impl Decor {
    pub fn new<R>(rng: R) -> Self
    where
        R: FnMut() -> f64 + 'static,
    {
        Decor {
            rng: Rc::new(RefCell::new(Box::new(rng))),
            tasks: Vec::new(),
        }
    }

    /// Give `blob` a new random shape every two seconds.
    pub fn morph_blob<S>(&mut self, animator: &mut FrameAnimator, now: Timestamp, blob: S) -> TaskId
    where
        S: StyleSlot + 'static,
    {
        let rng = Rc::clone(&self.rng);
        let id = animator.every(now, BLOB_MORPH_INTERVAL_MS, BLOB_MORPH_INTERVAL_MS, move |_| {
            blob.set_style("border-radius", &blob_radius(&mut || draw_from(&rng)));
        });
        self.tasks.push(id);
        id
    }

    /// Occasionally flash the `glitching` class on `element`.
    pub fn glitch<S>(&mut self, animator: &mut FrameAnimator, now: Timestamp, element: S) -> TaskId
    where
        S: ClassSlot + 'static,
    {
        let rng = Rc::clone(&self.rng);
        let mut glitch_until: Option<Timestamp> = None;
        let id = animator.every(now, GLITCH_CHECK_INTERVAL_MS, GLITCH_CHECK_INTERVAL_MS, move |at| {
            match glitch_until {
                Some(until) if at >= until => {
                    element.remove_class("glitching");
                    glitch_until = None;
                }
                Some(_) => {}
                None => {
                    if draw_from(&rng) > GLITCH_CHANCE_CUTOFF {
                        element.add_class("glitching");
                        glitch_until = Some(at.offset(GLITCH_DURATION_MS));
                    }
                }
            }
        });
        self.tasks.push(id);
        id
    }

    /// Draw from the shared generator, for one-off placements.
    pub fn draw(&self) -> f64 {
        draw_from(&self.rng)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Cancel every task this value created. Returns how many were still live.
    pub fn teardown(&mut self, animator: &mut FrameAnimator) -> usize {
        let cancelled = self
            .tasks
            .drain(..)
            .filter(|id| animator.cancel_task(*id))
            .count();
        tracing::debug!(cancelled, "decorative tasks torn down");
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::mock::MockElement;
    use crate::types::SeededRng;

    fn ms(value: f64) -> Timestamp {
        Timestamp::from_millis(value)
    }

    #[test]
    fn blob_radius_has_four_corners_in_range() {
        let mut rng = SeededRng::new(9);
        let radius = blob_radius(&mut || rng.next_f64());
        let corners: Vec<f64> = radius
            .split(' ')
            .map(|c| c.trim_end_matches('%').parse().unwrap())
            .collect();
        assert_eq!(corners.len(), 4);
        assert!(corners.iter().all(|c| (30.0..=60.0).contains(c)));
    }

    #[test]
    fn blob_morphs_every_two_seconds() {
        let mut animator = FrameAnimator::new();
        let mut rng = SeededRng::new(1);
        let mut decor = Decor::new(move || rng.next_f64());
        let blob = MockElement::default();
        decor.morph_blob(&mut animator, ms(0.0), blob.clone());

        animator.tick(ms(1999.0));
        assert!(blob.style("border-radius").is_none());
        animator.tick(ms(2000.0));
        animator.tick(ms(4000.0));
        assert_eq!(blob.style_history("border-radius").len(), 2);
    }

    #[test]
    fn glitch_clears_after_duration() {
        let mut animator = FrameAnimator::new();
        // Always above the cutoff.
        let mut decor = Decor::new(|| 0.99);
        let title = MockElement::default();
        decor.glitch(&mut animator, ms(0.0), title.clone());

        animator.tick(ms(100.0));
        assert!(title.has_class("glitching"));
        animator.tick(ms(200.0));
        assert!(title.has_class("glitching"));
        animator.tick(ms(300.0));
        assert!(!title.has_class("glitching"));
    }

    #[test]
    fn glitch_never_fires_below_cutoff() {
        let mut animator = FrameAnimator::new();
        let mut decor = Decor::new(|| 0.5);
        let title = MockElement::default();
        decor.glitch(&mut animator, ms(0.0), title.clone());
        for i in 1..50 {
            animator.tick(ms(i as f64 * 100.0));
        }
        assert!(!title.has_class("glitching"));
    }

    #[test]
    fn teardown_cancels_everything() {
        let mut animator = FrameAnimator::new();
        let mut decor = Decor::new(|| 0.99);
        let blob = MockElement::default();
        let title = MockElement::default();
        decor.morph_blob(&mut animator, ms(0.0), blob.clone());
        decor.glitch(&mut animator, ms(0.0), title.clone());
        assert_eq!(animator.task_count(), 2);

        assert_eq!(decor.teardown(&mut animator), 2);
        assert_eq!(animator.task_count(), 0);
        assert_eq!(decor.task_count(), 0);

        animator.tick(ms(5000.0));
        assert!(blob.style("border-radius").is_none());
        assert!(!title.has_class("glitching"));
    }

    #[test]
    fn scattered_placements_stay_in_range() {
        let mut rng = SeededRng::new(42);
        let mut next = || rng.next_f64();
        let particles = scatter_particles(20, &mut next);
        assert_eq!(particles.len(), 20);
        assert!(particles.iter().all(|p| {
            (0.0..100.0).contains(&p.left_pct)
                && (0.0..6.0).contains(&p.delay_s)
                && (3.0..6.0).contains(&p.duration_s)
        }));

        let sparkles = scatter_sparkles(4, &mut next);
        assert_eq!(sparkles.len(), 4);
        assert!(sparkles.iter().all(|s| (0.0..2.0).contains(&s.delay_s)));
    }
}
