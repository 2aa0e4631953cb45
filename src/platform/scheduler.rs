//! Frame scheduling
//!
//! A [`FrameLoop`] asks its [`FrameScheduler`] for one frame at a time and
//! runs its tick when the frame fires. Dropping the loop cancels the pending
//! frame, so teardown happens on every exit path.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Identifies a frame request so it can be cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameHandle {
    /// `requestAnimationFrame` id (or a manual scheduler id)
    Animation(i32),
    /// `setTimeout` id used by the fallback path
    Timeout(i32),
}

/// Callback receiving the frame timestamp in milliseconds
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Host primitive that runs a callback roughly once per display refresh
pub trait FrameScheduler {
    /// `None` when the host refused to schedule
    fn request_frame(&self, callback: FrameCallback) -> Option<FrameHandle>;

    fn cancel_frame(&self, handle: FrameHandle);
}

/// Holds the single callback waiting for the next frame
///
/// Lets a host register one long-lived trampoline with its timer API and
/// swap the callback behind it, so cancelling a frame frees the callback
/// right away instead of when the timer would have fired.
#[derive(Clone, Default)]
pub struct FrameSlot {
    callback: Rc<RefCell<Option<FrameCallback>>>,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever was waiting
    pub fn arm(&self, callback: FrameCallback) {
        *self.callback.borrow_mut() = Some(callback);
    }

    /// Drop the waiting callback
    pub fn disarm(&self) {
        self.callback.borrow_mut().take();
    }

    pub fn is_armed(&self) -> bool {
        self.callback.borrow().is_some()
    }

    /// Run the waiting callback. Hosts that pass no timestamp get `now()`
    /// read at fire time. Returns false when nothing was armed.
    pub fn fire(&self, time: Option<f64>, now: impl FnOnce() -> f64) -> bool {
        // Released before the call: the callback may arm the next frame
        let callback = self.callback.borrow_mut().take();
        match callback {
            Some(callback) => {
                callback(time.unwrap_or_else(now));
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Stopped,
    Running,
    Paused,
}

struct Inner {
    scheduler: Box<dyn FrameScheduler>,
    tick: RefCell<Box<dyn FnMut(f64)>>,
    pending: Cell<Option<FrameHandle>>,
    state: Cell<LoopState>,
    frames: Cell<u64>,
}

impl Inner {
    fn schedule(self: &Rc<Self>) {
        if self.pending.get().is_some() {
            return;
        }
        let weak = Rc::downgrade(self);
        let handle = self.scheduler.request_frame(Box::new(move |time| {
            if let Some(inner) = weak.upgrade() {
                inner.run_frame(time);
            }
        }));
        if handle.is_none() {
            log::warn!("Frame request refused, animation halted");
        }
        self.pending.set(handle);
    }

    fn run_frame(self: &Rc<Self>, time: f64) {
        self.pending.set(None);
        if self.state.get() != LoopState::Running {
            return;
        }

        {
            let mut tick = self.tick.borrow_mut();
            tick(time);
        }
        self.frames.set(self.frames.get() + 1);

        // The tick may have paused or stopped us
        if self.state.get() == LoopState::Running {
            self.schedule();
        }
    }

    fn cancel_pending(&self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    fn halt(&self, state: LoopState) {
        self.state.set(state);
        self.cancel_pending();
    }

    fn resume(self: &Rc<Self>) {
        if self.state.get() == LoopState::Paused {
            self.state.set(LoopState::Running);
            self.schedule();
        }
    }
}

/// Animation loop owning its tick and at most one pending frame
pub struct FrameLoop {
    inner: Rc<Inner>,
}

impl FrameLoop {
    pub fn new(scheduler: impl FrameScheduler + 'static, tick: impl FnMut(f64) + 'static) -> Self {
        Self {
            inner: Rc::new(Inner {
                scheduler: Box::new(scheduler),
                tick: RefCell::new(Box::new(tick)),
                pending: Cell::new(None),
                state: Cell::new(LoopState::Stopped),
                frames: Cell::new(0),
            }),
        }
    }

    /// Begin (or restart) requesting frames
    pub fn start(&self) {
        self.inner.state.set(LoopState::Running);
        self.inner.schedule();
    }

    /// Stop requesting frames until [`resume`](Self::resume)
    pub fn pause(&self) {
        if self.inner.state.get() == LoopState::Running {
            self.inner.halt(LoopState::Paused);
        }
    }

    pub fn resume(&self) {
        self.inner.resume();
    }

    /// Stop for good and release the pending frame
    pub fn stop(&self) {
        self.inner.halt(LoopState::Stopped);
    }

    pub fn is_running(&self) -> bool {
        self.inner.state.get() == LoopState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.inner.state.get() == LoopState::Paused
    }

    pub fn has_pending_frame(&self) -> bool {
        self.inner.pending.get().is_some()
    }

    /// Ticks run so far
    pub fn frames(&self) -> u64 {
        self.inner.frames.get()
    }

    /// Weak pause/resume handle for event listeners
    pub fn control(&self) -> LoopControl {
        LoopControl {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Pause/resume access that does not keep the loop alive
#[derive(Clone)]
pub struct LoopControl {
    inner: Weak<Inner>,
}

impl LoopControl {
    pub fn pause(&self) {
        if let Some(inner) = self.inner.upgrade() {
            if inner.state.get() == LoopState::Running {
                inner.halt(LoopState::Paused);
            }
        }
    }

    pub fn resume(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.resume();
        }
    }
}

#[derive(Default)]
struct ManualQueue {
    next_id: i32,
    pending: Vec<(i32, FrameCallback)>,
}

/// Scheduler driven by hand: frames fire only when [`fire`](Self::fire) is
/// called. Used by the headless runner and tests.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    queue: Rc<RefCell<ManualQueue>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests waiting to fire
    pub fn pending(&self) -> usize {
        self.queue.borrow().pending.len()
    }

    /// Run every callback requested before this call; returns how many ran
    pub fn fire(&self, time: f64) -> usize {
        let due = std::mem::take(&mut self.queue.borrow_mut().pending);
        let count = due.len();
        for (_, callback) in due {
            callback(time);
        }
        count
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, callback: FrameCallback) -> Option<FrameHandle> {
        let mut queue = self.queue.borrow_mut();
        queue.next_id += 1;
        let id = queue.next_id;
        queue.pending.push((id, callback));
        Some(FrameHandle::Animation(id))
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        let (FrameHandle::Animation(id) | FrameHandle::Timeout(id)) = handle;
        self.queue.borrow_mut().pending.retain(|(pid, _)| *pid != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_loop() -> (ManualScheduler, FrameLoop, Rc<Cell<u32>>) {
        let scheduler = ManualScheduler::new();
        let ticks = Rc::new(Cell::new(0));
        let t = ticks.clone();
        let frame_loop = FrameLoop::new(scheduler.clone(), move |_| t.set(t.get() + 1));
        (scheduler, frame_loop, ticks)
    }

    #[test]
    fn test_one_pending_frame_at_a_time() {
        let (scheduler, frame_loop, ticks) = counting_loop();
        assert_eq!(scheduler.pending(), 0);

        frame_loop.start();
        frame_loop.start();
        assert_eq!(scheduler.pending(), 1);

        for i in 1..=5 {
            assert_eq!(scheduler.fire(i as f64 * 16.0), 1);
            assert_eq!(scheduler.pending(), 1);
        }
        assert_eq!(ticks.get(), 5);
        assert_eq!(frame_loop.frames(), 5);
    }

    #[test]
    fn test_pause_and_resume() {
        let (scheduler, frame_loop, ticks) = counting_loop();
        frame_loop.start();
        scheduler.fire(0.0);

        frame_loop.pause();
        assert!(frame_loop.is_paused());
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.fire(16.0), 0);

        let control = frame_loop.control();
        control.resume();
        assert!(frame_loop.is_running());
        scheduler.fire(32.0);
        assert_eq!(ticks.get(), 2);

        control.pause();
        assert!(!frame_loop.has_pending_frame());
    }

    #[test]
    fn test_resume_does_not_restart_stopped_loop() {
        let (scheduler, frame_loop, _) = counting_loop();
        frame_loop.start();
        frame_loop.stop();
        frame_loop.resume();
        assert!(!frame_loop.is_running());
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_drop_cancels_pending_frame() {
        let (scheduler, frame_loop, ticks) = counting_loop();
        frame_loop.start();
        let control = frame_loop.control();
        assert_eq!(scheduler.pending(), 1);

        drop(frame_loop);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.fire(0.0), 0);
        assert_eq!(ticks.get(), 0);

        // Control outliving the loop is inert
        control.resume();
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_stale_callback_after_drop_is_harmless() {
        struct NeverCancel(ManualScheduler);
        impl FrameScheduler for NeverCancel {
            fn request_frame(&self, callback: FrameCallback) -> Option<FrameHandle> {
                self.0.request_frame(callback)
            }
            fn cancel_frame(&self, _handle: FrameHandle) {}
        }

        let scheduler = ManualScheduler::new();
        let ticks = Rc::new(Cell::new(0));
        let t = ticks.clone();
        let frame_loop = FrameLoop::new(NeverCancel(scheduler.clone()), move |_| {
            t.set(t.get() + 1)
        });
        frame_loop.start();
        drop(frame_loop);

        assert_eq!(scheduler.fire(0.0), 1);
        assert_eq!(ticks.get(), 0);
    }

    #[test]
    fn test_slot_reads_clock_at_fire_time() {
        let slot = FrameSlot::new();
        let seen = Rc::new(Cell::new(0.0));

        let s = seen.clone();
        slot.arm(Box::new(move |time: f64| s.set(time)));
        assert!(slot.fire(None, || 250.0));
        assert_eq!(seen.get(), 250.0);

        let s = seen.clone();
        slot.arm(Box::new(move |time: f64| s.set(time)));
        assert!(slot.fire(Some(16.5), || unreachable!()));
        assert_eq!(seen.get(), 16.5);
    }

    #[test]
    fn test_slot_disarm_frees_callback() {
        let slot = FrameSlot::new();
        let marker = Rc::new(());
        let held = marker.clone();
        slot.arm(Box::new(move |_: f64| drop(held)));
        assert_eq!(Rc::strong_count(&marker), 2);

        slot.disarm();
        assert!(!slot.is_armed());
        assert_eq!(Rc::strong_count(&marker), 1);
        assert!(!slot.fire(Some(0.0), || 0.0));
    }

    #[test]
    fn test_slot_drives_frame_loop() {
        struct SlotScheduler(FrameSlot);
        impl FrameScheduler for SlotScheduler {
            fn request_frame(&self, callback: FrameCallback) -> Option<FrameHandle> {
                self.0.arm(callback);
                Some(FrameHandle::Timeout(1))
            }
            fn cancel_frame(&self, _handle: FrameHandle) {
                self.0.disarm();
            }
        }

        let slot = FrameSlot::new();
        let ticks = Rc::new(Cell::new(0));
        let t = ticks.clone();
        let frame_loop = FrameLoop::new(SlotScheduler(slot.clone()), move |_| t.set(t.get() + 1));
        frame_loop.start();

        // Each fire re-arms the slot from inside the callback
        for i in 0..3 {
            assert!(slot.fire(None, || i as f64));
            assert!(slot.is_armed());
        }
        assert_eq!(ticks.get(), 3);

        frame_loop.pause();
        assert!(!slot.is_armed());
        drop(frame_loop);
        assert!(!slot.fire(None, || 0.0));
    }

    #[test]
    fn test_refused_request_halts() {
        struct Refuse;
        impl FrameScheduler for Refuse {
            fn request_frame(&self, _callback: FrameCallback) -> Option<FrameHandle> {
                None
            }
            fn cancel_frame(&self, _handle: FrameHandle) {}
        }

        let frame_loop = FrameLoop::new(Refuse, |_| {});
        frame_loop.start();
        assert!(!frame_loop.has_pending_frame());
    }
}
