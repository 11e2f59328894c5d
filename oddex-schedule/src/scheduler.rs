use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// What a scheduled task asks for after running once.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// Task is done; move on to the next item.
    Next,
    /// Task is still running; re-invoke it after the next display refresh.
    FlipRepeat,
    /// Unwind the whole schedule immediately.
    Quit,
}

/// Result of driving the scheduler for one display refresh.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A task requested a refresh; render, flip, tick again.
    Flip,
    /// Every item has run (or been skipped by a stop); nothing left to do.
    Complete,
    /// A task requested session teardown.
    Quit,
}

type Task<C> = Box<dyn FnMut(&mut C) -> SchedulerEvent>;

enum Item<C> {
    Task(Task<C>),
    /// Nested schedule, shared so a loop-begin task can populate it after
    /// it was inserted into its parent.
    Sub(SchedulerHandle<C>),
}

pub type SchedulerHandle<C> = Rc<RefCell<Scheduler<C>>>;

/// Handle that lets a task stop the scheduler it lives in. Once stopped,
/// the remaining items are skipped and the scheduler reports `Complete`;
/// sibling schedulers keep running.
#[derive(Clone)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.get()
    }
}

/// Cooperative, single-threaded task list. Items run strictly in insertion
/// order; a task yielding `FlipRepeat` suspends the whole schedule until
/// the host has flipped the display and calls `tick` again.
pub struct Scheduler<C> {
    items: Vec<Item<C>>,
    cursor: usize,
    stopped: Rc<Cell<bool>>,
}

impl<C> Scheduler<C> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
            stopped: Rc::new(Cell::new(false)),
        }
    }

    pub fn shared() -> SchedulerHandle<C> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn add<F>(&mut self, task: F)
    where
        F: FnMut(&mut C) -> SchedulerEvent + 'static,
    {
        self.items.push(Item::Task(Box::new(task)));
    }

    /// Insert a one-shot task from a plain closure returning nothing.
    pub fn add_once<F>(&mut self, mut task: F)
    where
        F: FnMut(&mut C) + 'static,
    {
        self.add(move |ctx| {
            task(ctx);
            SchedulerEvent::Next
        });
    }

    pub fn add_sub(&mut self, sub: &SchedulerHandle<C>) {
        self.items.push(Item::Sub(Rc::clone(sub)));
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Rc::clone(&self.stopped))
    }

    /// Number of scheduled items, counting a nested scheduler as one.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Run items from the cursor until one suspends, quits, or the list is
    /// exhausted. Called once per display refresh by the host.
    pub fn tick(&mut self, ctx: &mut C) -> TickOutcome {
        loop {
            if self.stopped.get() {
                log::debug!("scheduler stopped; skipping {} remaining item(s)",
                    self.items.len().saturating_sub(self.cursor));
                self.cursor = self.items.len();
                return TickOutcome::Complete;
            }
            let Some(item) = self.items.get_mut(self.cursor) else {
                return TickOutcome::Complete;
            };
            match item {
                Item::Task(task) => match task(ctx) {
                    SchedulerEvent::Next => self.cursor += 1,
                    SchedulerEvent::FlipRepeat => return TickOutcome::Flip,
                    SchedulerEvent::Quit => return TickOutcome::Quit,
                },
                Item::Sub(sub) => {
                    let outcome = sub.borrow_mut().tick(ctx);
                    match outcome {
                        TickOutcome::Complete => self.cursor += 1,
                        TickOutcome::Flip => return TickOutcome::Flip,
                        TickOutcome::Quit => return TickOutcome::Quit,
                    }
                }
            }
        }
    }
}

impl<C> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Log {
        entries: Vec<&'static str>,
    }

    #[test]
    fn tasks_run_in_insertion_order() {
        let mut s: Scheduler<Log> = Scheduler::new();
        s.add_once(|log| log.entries.push("a"));
        s.add_once(|log| log.entries.push("b"));
        s.add_once(|log| log.entries.push("c"));

        let mut log = Log::default();
        assert_eq!(s.tick(&mut log), TickOutcome::Complete);
        assert_eq!(log.entries, vec!["a", "b", "c"]);
    }

    #[test]
    fn flip_repeat_suspends_until_next_tick() {
        let mut s: Scheduler<Log> = Scheduler::new();
        let mut remaining = 3;
        s.add(move |log: &mut Log| {
            log.entries.push("frame");
            remaining -= 1;
            if remaining == 0 {
                SchedulerEvent::Next
            } else {
                SchedulerEvent::FlipRepeat
            }
        });
        s.add_once(|log| log.entries.push("after"));

        let mut log = Log::default();
        assert_eq!(s.tick(&mut log), TickOutcome::Flip);
        assert_eq!(s.tick(&mut log), TickOutcome::Flip);
        assert_eq!(s.tick(&mut log), TickOutcome::Complete);
        assert_eq!(log.entries, vec!["frame", "frame", "frame", "after"]);
    }

    #[test]
    fn nested_scheduler_runs_in_place() {
        let mut s: Scheduler<Log> = Scheduler::new();
        s.add_once(|log| log.entries.push("before"));
        let sub = Scheduler::shared();
        sub.borrow_mut().add_once(|log: &mut Log| log.entries.push("inner"));
        s.add_sub(&sub);
        s.add_once(|log| log.entries.push("after"));

        let mut log = Log::default();
        assert_eq!(s.tick(&mut log), TickOutcome::Complete);
        assert_eq!(log.entries, vec!["before", "inner", "after"]);
    }

    #[test]
    fn stop_skips_remaining_items_only_in_that_scheduler() {
        let mut s: Scheduler<Log> = Scheduler::new();

        let sub = Scheduler::shared();
        {
            let mut sub = sub.borrow_mut();
            let stop = sub.stop_handle();
            sub.add_once(move |log: &mut Log| {
                log.entries.push("first");
                stop.stop();
            });
            sub.add_once(|log: &mut Log| log.entries.push("skipped"));
        }
        s.add_sub(&sub);
        s.add_once(|log| log.entries.push("sibling"));

        let mut log = Log::default();
        assert_eq!(s.tick(&mut log), TickOutcome::Complete);
        assert_eq!(log.entries, vec!["first", "sibling"]);
    }

    #[test]
    fn quit_propagates_through_nesting() {
        let mut s: Scheduler<Log> = Scheduler::new();
        let sub = Scheduler::shared();
        sub.borrow_mut().add(|log: &mut Log| {
            log.entries.push("quitting");
            SchedulerEvent::Quit
        });
        sub.borrow_mut().add_once(|log: &mut Log| log.entries.push("never"));
        s.add_sub(&sub);
        s.add_once(|log| log.entries.push("never either"));

        let mut log = Log::default();
        assert_eq!(s.tick(&mut log), TickOutcome::Quit);
        assert_eq!(log.entries, vec!["quitting"]);
    }
}
