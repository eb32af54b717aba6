// Frame-driven animation runs, discrete-step runs and periodic tasks.
// Everything advances from `tick(now)`; one time sample per display refresh.

use slotmap::{new_key_type, SlotMap};

use crate::types::{EasingType, Timestamp};

new_key_type! {
    /// Handle to a continuous-time run.
    pub struct RunId;
    /// Handle to a discrete-step run.
    pub struct StepId;
    /// Handle to a periodic task.
    pub struct TaskId;
}

type FrameCallback = Box<dyn FnMut(f64)>;
type StepCallback = Box<dyn FnMut(u32)>;
type DoneCallback = Box<dyn FnOnce()>;
type TickCallback = Box<dyn FnMut(Timestamp)>;

/// Continuous-time interpolation from 0 to 1 over a duration.
struct AnimationRun {
    start: Timestamp,
    duration_ms: f64,
    easing: EasingType,
    last_progress: f64,
    on_frame: FrameCallback,
    on_done: Option<DoneCallback>,
}

/// Integer step counter advanced once per fixed delay.
struct StepRun {
    next_due: Timestamp,
    step_delay_ms: f64,
    step: u32,
    total_steps: u32,
    on_step: StepCallback,
    on_done: Option<DoneCallback>,
}

/// Repeating callback, for decorative effects that never finish on their own.
struct PeriodicTask {
    next_due: Timestamp,
    interval_ms: f64,
    on_tick: TickCallback,
}

/// Drives every animation on the page from display-refresh ticks.
///
/// Continuous runs measure wall-clock time since their start, so variable
/// frame deltas and long pauses self-correct. Step runs and periodic tasks
/// are timers: they stop while the page is hidden and resume where they were.
#[derive(Default)]
pub struct FrameAnimator {
    runs: SlotMap<RunId, AnimationRun>,
    steps: SlotMap<StepId, StepRun>,
    tasks: SlotMap<TaskId, PeriodicTask>,
    hidden_since: Option<Timestamp>,
}

impl FrameAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a continuous run at `now`.
    ///
    /// `on_frame` receives eased progress, nondecreasing, on every tick after
    /// `now` until it reaches exactly 1; `on_done` follows the final frame.
    /// A non-positive duration completes synchronously with `on_frame(1.0)`
    /// then `on_done()`, and no run is stored.
    pub fn run<F, D>(
        &mut self,
        now: Timestamp,
        duration_ms: f64,
        easing: EasingType,
        on_frame: F,
        on_done: D,
    ) -> Option<RunId>
    where
        F: FnMut(f64) + 'static,
        D: FnOnce() + 'static,
    {
        if !(duration_ms > 0.0) {
            let mut on_frame = on_frame;
            on_frame(1.0);
            on_done();
            return None;
        }

        Some(self.runs.insert(AnimationRun {
            start: now,
            duration_ms,
            easing,
            last_progress: 0.0,
            on_frame: Box::new(on_frame),
            on_done: Some(Box::new(on_done)),
        }))
    }

    /// Start a discrete-step run: `on_step(i)` for `i` in `0..total_steps`,
    /// the first after `initial_delay_ms` and each next one `step_delay_ms`
    /// after the previous. At most one step per tick.
    pub fn run_steps<S, D>(
        &mut self,
        now: Timestamp,
        initial_delay_ms: f64,
        step_delay_ms: f64,
        total_steps: u32,
        on_step: S,
        on_done: D,
    ) -> StepId
    where
        S: FnMut(u32) + 'static,
        D: FnOnce() + 'static,
    {
        self.steps.insert(StepRun {
            next_due: now.offset(initial_delay_ms.max(0.0)),
            step_delay_ms: step_delay_ms.max(0.0),
            step: 0,
            total_steps,
            on_step: Box::new(on_step),
            on_done: Some(Box::new(on_done)),
        })
    }

    /// One-shot timer: `on_done` fires on the first tick at or after `now + delay_ms`.
    pub fn after<D>(&mut self, now: Timestamp, delay_ms: f64, on_done: D) -> StepId
    where
        D: FnOnce() + 'static,
    {
        self.run_steps(now, delay_ms, 0.0, 0, |_| {}, on_done)
    }

    /// Repeat `on_tick` every `interval_ms`, first after `initial_delay_ms`.
    /// An interval of 0 fires once per tick.
    pub fn every<T>(
        &mut self,
        now: Timestamp,
        initial_delay_ms: f64,
        interval_ms: f64,
        on_tick: T,
    ) -> TaskId
    where
        T: FnMut(Timestamp) + 'static,
    {
        self.tasks.insert(PeriodicTask {
            next_due: now.offset(initial_delay_ms.max(0.0)),
            interval_ms: interval_ms.max(0.0),
            on_tick: Box::new(on_tick),
        })
    }

    /// Advance everything to `now`. Returns whether anything is still scheduled.
    pub fn tick(&mut self, now: Timestamp) -> bool {
        self.tick_runs(now);
        if self.hidden_since.is_none() {
            self.tick_steps(now);
            self.tick_tasks(now);
        }
        self.has_active()
    }

    fn tick_runs(&mut self, now: Timestamp) {
        let mut finished = Vec::new();

        for (id, run) in self.runs.iter_mut() {
            let elapsed = now.since(run.start);
            if elapsed <= 0.0 {
                continue;
            }

            let linear = (elapsed / run.duration_ms).min(1.0);
            let eased = run.easing.apply(linear).max(run.last_progress);
            if eased <= 0.0 {
                continue;
            }
            run.last_progress = eased;
            (run.on_frame)(eased);

            if linear >= 1.0 {
                finished.push(id);
            }
        }

        for id in finished {
            if let Some(done) = self.runs.remove(id).and_then(|run| run.on_done) {
                done();
            }
        }
    }

    fn tick_steps(&mut self, now: Timestamp) {
        let mut finished = Vec::new();

        for (id, run) in self.steps.iter_mut() {
            if now < run.next_due {
                continue;
            }

            if run.step < run.total_steps {
                (run.on_step)(run.step);
                run.step += 1;
                run.next_due = now.offset(run.step_delay_ms);
            }

            if run.step >= run.total_steps {
                finished.push(id);
            }
        }

        for id in finished {
            if let Some(done) = self.steps.remove(id).and_then(|run| run.on_done) {
                done();
            }
        }
    }

    fn tick_tasks(&mut self, now: Timestamp) {
        for (_, task) in self.tasks.iter_mut() {
            if now < task.next_due {
                continue;
            }

            (task.on_tick)(now);

            // No catch-up bursts after a stall.
            let next = task.next_due.offset(task.interval_ms);
            task.next_due = if next > now || task.interval_ms == 0.0 {
                next
            } else {
                now.offset(task.interval_ms)
            };
        }
    }

    /// Page visibility change. Hiding pauses step runs and periodic tasks;
    /// showing shifts their deadlines by the time spent hidden.
    pub fn set_hidden(&mut self, hidden: bool, now: Timestamp) {
        match (hidden, self.hidden_since) {
            (true, None) => {
                tracing::debug!("page hidden, pausing timers");
                self.hidden_since = Some(now);
            }
            (false, Some(since)) => {
                let paused_ms = now.since(since);
                tracing::debug!(paused_ms, "page visible, resuming timers");
                for (_, run) in self.steps.iter_mut() {
                    run.next_due = run.next_due.offset(paused_ms);
                }
                for (_, task) in self.tasks.iter_mut() {
                    task.next_due = task.next_due.offset(paused_ms);
                }
                self.hidden_since = None;
            }
            _ => {}
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden_since.is_some()
    }

    /// Cancel a run; neither of its callbacks fires again.
    pub fn cancel(&mut self, id: RunId) -> bool {
        self.runs.remove(id).is_some()
    }

    pub fn cancel_steps(&mut self, id: StepId) -> bool {
        self.steps.remove(id).is_some()
    }

    pub fn cancel_task(&mut self, id: TaskId) -> bool {
        self.tasks.remove(id).is_some()
    }

    /// Teardown: drop every run, step run and task without invoking callbacks.
    pub fn cancel_all(&mut self) {
        tracing::debug!(
            runs = self.runs.len(),
            steps = self.steps.len(),
            tasks = self.tasks.len(),
            "cancelling all animations"
        );
        self.runs.clear();
        self.steps.clear();
        self.tasks.clear();
    }

    pub fn is_running(&self, id: RunId) -> bool {
        self.runs.contains_key(id)
    }

    pub fn is_stepping(&self, id: StepId) -> bool {
        self.steps.contains_key(id)
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.tasks.contains_key(id)
    }

    pub fn has_active(&self) -> bool {
        !self.runs.is_empty() || !self.steps.is_empty() || !self.tasks.is_empty()
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

/// One pending `after` timer per indexed element. Scheduling into a slot
/// cancels whatever the slot was still waiting on.
#[derive(Debug, Default)]
pub struct TimerSlots {
    slots: Vec<Option<StepId>>,
}

impl TimerSlots {
    pub fn with_len(len: usize) -> Self {
        TimerSlots {
            slots: vec![None; len],
        }
    }

    pub fn replace(&mut self, animator: &mut FrameAnimator, index: usize, timer: StepId) {
        match self.slots.get_mut(index) {
            Some(slot) => {
                if let Some(previous) = slot.replace(timer) {
                    animator.cancel_steps(previous);
                }
            }
            None => tracing::warn!(index, "timer slot out of range"),
        }
    }

    /// Cancel the slot's pending timer. Returns whether one was still pending.
    pub fn cancel(&mut self, animator: &mut FrameAnimator, index: usize) -> bool {
        self.slots
            .get_mut(index)
            .and_then(Option::take)
            .map_or(false, |timer| animator.cancel_steps(timer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn ms(value: f64) -> Timestamp {
        Timestamp::from_millis(value)
    }

    /// Recorder for frame/done callbacks, in call order.
    #[derive(Clone, Default)]
    struct Trace {
        events: Rc<RefCell<Vec<Option<f64>>>>,
    }

    impl Trace {
        fn frame(&self) -> impl FnMut(f64) + 'static {
            let events = Rc::clone(&self.events);
            move |p| events.borrow_mut().push(Some(p))
        }

        fn done(&self) -> impl FnOnce() + 'static {
            let events = Rc::clone(&self.events);
            move || events.borrow_mut().push(None)
        }

        fn events(&self) -> Vec<Option<f64>> {
            self.events.borrow().clone()
        }
    }

    #[test]
    fn zero_duration_completes_synchronously() {
        let mut animator = FrameAnimator::new();
        let trace = Trace::default();
        let id = animator.run(ms(0.0), 0.0, EasingType::EaseOut, trace.frame(), trace.done());

        assert!(id.is_none());
        assert_eq!(trace.events(), vec![Some(1.0), None]);
        assert!(!animator.tick(ms(16.0)));
        assert_eq!(trace.events().len(), 2);
    }

    #[test]
    fn negative_and_nan_durations_complete_synchronously() {
        let mut animator = FrameAnimator::new();
        for duration in [-5.0, f64::NAN] {
            let trace = Trace::default();
            animator.run(ms(0.0), duration, EasingType::Linear, trace.frame(), trace.done());
            assert_eq!(trace.events(), vec![Some(1.0), None]);
        }
    }

    #[test]
    fn run_reaches_exactly_one_then_done() {
        let mut animator = FrameAnimator::new();
        let trace = Trace::default();
        let id = animator
            .run(ms(1000.0), 100.0, EasingType::Linear, trace.frame(), trace.done())
            .unwrap();

        // Same instant as the start: nothing to report yet.
        animator.tick(ms(1000.0));
        assert!(trace.events().is_empty());

        animator.tick(ms(1025.0));
        animator.tick(ms(1050.0));
        animator.tick(ms(1200.0));
        assert!(!animator.is_running(id));
        assert_eq!(
            trace.events(),
            vec![Some(0.25), Some(0.5), Some(1.0), None]
        );
    }

    #[test]
    fn cancelled_run_never_calls_back() {
        let mut animator = FrameAnimator::new();
        let trace = Trace::default();
        let id = animator
            .run(ms(0.0), 100.0, EasingType::EaseOut, trace.frame(), trace.done())
            .unwrap();
        animator.tick(ms(16.0));
        assert!(animator.cancel(id));
        animator.tick(ms(200.0));
        assert_eq!(trace.events().len(), 1);
        assert!(!animator.cancel(id));
    }

    #[test]
    fn steps_advance_once_per_delay() {
        let mut animator = FrameAnimator::new();
        let steps = Rc::new(RefCell::new(Vec::new()));
        let done = Rc::new(Cell::new(0));
        let (s, d) = (Rc::clone(&steps), Rc::clone(&done));
        animator.run_steps(
            ms(0.0),
            1000.0,
            100.0,
            3,
            move |i| s.borrow_mut().push(i),
            move || d.set(d.get() + 1),
        );

        animator.tick(ms(999.0));
        assert!(steps.borrow().is_empty());
        animator.tick(ms(1000.0));
        // A long stall still advances only one step.
        animator.tick(ms(5000.0));
        assert_eq!(*steps.borrow(), vec![0, 1]);
        animator.tick(ms(5050.0));
        assert_eq!(steps.borrow().len(), 2);
        animator.tick(ms(5100.0));
        assert_eq!(*steps.borrow(), vec![0, 1, 2]);
        assert_eq!(done.get(), 1);
        animator.tick(ms(6000.0));
        assert_eq!(done.get(), 1);
    }

    #[test]
    fn after_fires_once() {
        let mut animator = FrameAnimator::new();
        let fired = Rc::new(Cell::new(0));
        let f = Rc::clone(&fired);
        animator.after(ms(0.0), 300.0, move || f.set(f.get() + 1));
        animator.tick(ms(299.0));
        assert_eq!(fired.get(), 0);
        animator.tick(ms(301.0));
        animator.tick(ms(900.0));
        assert_eq!(fired.get(), 1);
        assert!(!animator.has_active());
    }

    #[test]
    fn timer_slots_keep_only_the_latest_timer() {
        let mut animator = FrameAnimator::new();
        let mut slots = TimerSlots::with_len(2);
        let hidden = Rc::new(Cell::new(false));

        let h = Rc::clone(&hidden);
        let hide = animator.after(ms(0.0), 300.0, move || h.set(true));
        slots.replace(&mut animator, 0, hide);

        // A search at 100 ms shows the card again before the hide lands.
        assert!(slots.cancel(&mut animator, 0));
        assert!(!slots.cancel(&mut animator, 0));
        animator.tick(ms(400.0));
        assert!(!hidden.get());

        let shown = Rc::new(Cell::new(0));
        for at in [500.0, 550.0] {
            let s = Rc::clone(&shown);
            let timer = animator.after(ms(at), 100.0, move || s.set(s.get() + 1));
            slots.replace(&mut animator, 1, timer);
        }
        animator.tick(ms(700.0));
        assert_eq!(shown.get(), 1);
        assert!(!slots.cancel(&mut animator, 5));
    }

    #[test]
    fn hidden_page_pauses_timers_not_runs() {
        let mut animator = FrameAnimator::new();
        let ticks = Rc::new(Cell::new(0));
        let frames = Trace::default();
        let t = Rc::clone(&ticks);
        let task = animator.every(ms(0.0), 100.0, 100.0, move |_| t.set(t.get() + 1));
        animator.run(ms(0.0), 1000.0, EasingType::Linear, frames.frame(), frames.done());

        animator.set_hidden(true, ms(50.0));
        animator.tick(ms(500.0));
        assert_eq!(ticks.get(), 0);
        assert_eq!(frames.events(), vec![Some(0.5)]);

        // 450ms hidden: first tick now due at 550.
        animator.set_hidden(false, ms(500.0));
        animator.tick(ms(540.0));
        assert_eq!(ticks.get(), 0);
        animator.tick(ms(550.0));
        assert_eq!(ticks.get(), 1);
        assert!(animator.is_scheduled(task));
    }

    #[test]
    fn periodic_task_does_not_burst_after_stall() {
        let mut animator = FrameAnimator::new();
        let ticks = Rc::new(Cell::new(0));
        let t = Rc::clone(&ticks);
        let task = animator.every(ms(0.0), 0.0, 100.0, move |_| t.set(t.get() + 1));

        animator.tick(ms(0.0));
        animator.tick(ms(1000.0));
        animator.tick(ms(1001.0));
        assert_eq!(ticks.get(), 2);
        animator.tick(ms(1100.0));
        assert_eq!(ticks.get(), 3);

        assert!(animator.cancel_task(task));
        animator.tick(ms(5000.0));
        assert_eq!(ticks.get(), 3);
    }

    #[test]
    fn cancel_all_is_silent() {
        let mut animator = FrameAnimator::new();
        let trace = Trace::default();
        animator.run(ms(0.0), 100.0, EasingType::EaseOut, trace.frame(), trace.done());
        animator.after(ms(0.0), 10.0, trace.done());
        animator.every(ms(0.0), 0.0, 10.0, |_| {});
        animator.cancel_all();
        assert!(!animator.tick(ms(1000.0)));
        assert!(trace.events().is_empty());
    }

    proptest! {
        /// Property: for any positive duration and any sequence of frame
        /// deltas, progress starts above 0, never decreases, ends at exactly
        /// 1, and done fires once, after the final frame.
        #[test]
        fn progress_is_monotonic_and_terminal(
            duration in 1.0f64..5000.0,
            deltas in prop::collection::vec(0.0f64..80.0, 1..400),
            ease_out in any::<bool>(),
        ) {
            let easing = if ease_out { EasingType::EaseOut } else { EasingType::Linear };
            let mut animator = FrameAnimator::new();
            let trace = Trace::default();
            animator.run(ms(0.0), duration, easing, trace.frame(), trace.done());

            let mut now = 0.0;
            for delta in deltas {
                now += delta;
                animator.tick(ms(now));
            }
            // Make sure the run has finished.
            animator.tick(ms(now + duration + 1.0));

            let events = trace.events();
            let (done, frames) = events.split_last().unwrap();
            prop_assert_eq!(*done, None);
            let progress: Vec<f64> = frames.iter().map(|e| e.unwrap()).collect();
            prop_assert!(progress[0] > 0.0);
            prop_assert!(progress.windows(2).all(|w| w[1] >= w[0]));
            prop_assert_eq!(*progress.last().unwrap(), 1.0);
        }
    }
}
