use std::cell::Cell;
use std::rc::Rc;

use crate::scheduler::{Scheduler, SchedulerHandle};

/// State shared by every snapshot of one trial loop. Setting `finished`
/// mid-trial makes the loop's end-iteration check stop the governing
/// sub-scheduler before the next trial runs.
#[derive(Debug)]
pub struct LoopState {
    pub name: String,
    pub n_total: usize,
    finished: Cell<bool>,
}

impl LoopState {
    pub fn finish(&self) {
        self.finished.set(true);
    }

    pub fn is_finished(&self) -> bool {
        self.finished.get()
    }
}

/// Per-row closure state handed to every scheduled phase of one trial:
/// a clone of the condition row plus the loop bookkeeping.
#[derive(Clone, Debug)]
pub struct TrialSnapshot<T> {
    pub row: T,
    /// Position of this trial within the loop (0-based).
    pub this_n: usize,
    pub state: Rc<LoopState>,
}

impl<T> TrialSnapshot<T> {
    pub fn loop_name(&self) -> &str {
        &self.state.name
    }
}

/// A condition-list-driven repetition of a routine. Rows are assumed to be
/// sampled/randomized already; trials run in the order given here.
pub struct TrialLoop<T> {
    rows: Vec<T>,
    state: Rc<LoopState>,
}

impl<T: Clone> TrialLoop<T> {
    pub fn new(name: impl Into<String>, rows: Vec<T>) -> Self {
        let state = Rc::new(LoopState {
            name: name.into(),
            n_total: rows.len(),
            finished: Cell::new(false),
        });
        Self { rows, state }
    }

    pub fn state(&self) -> Rc<LoopState> {
        Rc::clone(&self.state)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn snapshots(&self) -> impl Iterator<Item = TrialSnapshot<T>> + '_ {
        self.rows.iter().cloned().enumerate().map(|(n, row)| TrialSnapshot {
            row,
            this_n: n,
            state: Rc::clone(&self.state),
        })
    }

    /// Statically unroll the loop into `sub`: one group of phases per row,
    /// in row order, each closed over that row's snapshot. This runs when
    /// the loop-begin task fires, before any trial of the loop executes.
    pub fn expand<C, F>(&self, sub: &SchedulerHandle<C>, mut schedule_trial: F)
    where
        F: FnMut(&mut Scheduler<C>, TrialSnapshot<T>),
    {
        log::info!(
            "loop '{}': scheduling {} trial(s)",
            self.state.name,
            self.rows.len()
        );
        let mut sub = sub.borrow_mut();
        for snapshot in self.snapshots() {
            schedule_trial(&mut sub, snapshot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::{SchedulerEvent, TickOutcome};

    #[test]
    fn expansion_schedules_one_group_per_row_in_order() {
        let rows = vec!["r0", "r1", "r2", "r3", "r4"];
        let trial_loop = TrialLoop::new("practiceTrials", rows);
        let sub: SchedulerHandle<Vec<String>> = Scheduler::shared();

        trial_loop.expand(&sub, |s, snap| {
            s.add_once(move |seen: &mut Vec<String>| {
                seen.push(format!("{}:{}", snap.this_n, snap.row));
            });
        });

        assert_eq!(sub.borrow().len(), 5);
        let mut seen = Vec::new();
        assert_eq!(sub.borrow_mut().tick(&mut seen), TickOutcome::Complete);
        assert_eq!(seen, vec!["0:r0", "1:r1", "2:r2", "3:r3", "4:r4"]);
    }

    #[test]
    fn finished_flag_stops_later_rows_without_removing_them() {
        let trial_loop = TrialLoop::new("mainTrials", vec![0usize, 1, 2, 3, 4]);
        let sub: SchedulerHandle<Vec<usize>> = Scheduler::shared();
        let stop = sub.borrow().stop_handle();

        trial_loop.expand(&sub, |s, snap| {
            // trial body
            let body = snap.clone();
            s.add_once(move |seen: &mut Vec<usize>| {
                seen.push(body.this_n);
                if body.this_n == 2 {
                    body.state.finish();
                }
            });
            // end-iteration check
            let stop = stop.clone();
            s.add(move |_seen: &mut Vec<usize>| {
                if snap.state.is_finished() {
                    stop.stop();
                }
                SchedulerEvent::Next
            });
        });

        // Rows 3 and 4 stay in the schedule (static unrolling) ...
        assert_eq!(sub.borrow().len(), 10);

        let mut seen = Vec::new();
        assert_eq!(sub.borrow_mut().tick(&mut seen), TickOutcome::Complete);
        // ... but the stop flag keeps them from executing.
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn sibling_loop_unaffected_by_finished_loop() {
        let first = TrialLoop::new("practiceTrials", vec![0usize, 1, 2]);
        let second = TrialLoop::new("mainTrials", vec![10usize, 11]);

        let mut flow: Scheduler<Vec<usize>> = Scheduler::new();

        let sub1: SchedulerHandle<Vec<usize>> = Scheduler::shared();
        let stop1 = sub1.borrow().stop_handle();
        first.expand(&sub1, |s, snap| {
            let stop = stop1.clone();
            s.add_once(move |seen: &mut Vec<usize>| {
                seen.push(snap.this_n);
                snap.state.finish();
                if snap.state.is_finished() {
                    stop.stop();
                }
            });
        });
        flow.add_sub(&sub1);

        let sub2: SchedulerHandle<Vec<usize>> = Scheduler::shared();
        second.expand(&sub2, |s, snap| {
            s.add_once(move |seen: &mut Vec<usize>| seen.push(snap.row));
        });
        flow.add_sub(&sub2);

        let mut seen = Vec::new();
        assert_eq!(flow.tick(&mut seen), TickOutcome::Complete);
        // First loop ends after row 0; the sibling loop runs in full.
        assert_eq!(seen, vec![0, 10, 11]);
    }
}
