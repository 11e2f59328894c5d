use std::path::PathBuf;
use std::rc::Rc;

use oddex_core::Triplet;
use oddex_schedule::{Scheduler, SchedulerEvent, StopHandle, TrialLoop, TrialSnapshot};

use crate::context::ExperimentCtx;
use crate::routines::{schedule_routine, InstructionRoutine, TrialRoutine};

/// Which trial-routine flavor a loop schedules.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum LoopKind {
    Practice,
    Main,
}

pub struct FlowConfig {
    pub practice: TrialLoop<Triplet>,
    pub main: TrialLoop<Triplet>,
    pub images_dir: PathBuf,
    pub instruction_image: Option<PathBuf>,
    /// Early-exit cutoffs: a loop finishes after this many trials even if
    /// more rows were scheduled.
    pub max_practice: Option<usize>,
    pub max_main: Option<usize>,
}

/// Assemble the whole session: welcome, example, the practice loop, the
/// pause, the main loop, and the exit screen, in that order.
pub fn build_flow(cfg: FlowConfig) -> Scheduler<ExperimentCtx> {
    let mut flow = Scheduler::new();

    schedule_routine(&mut flow, InstructionRoutine::welcome());
    schedule_routine(&mut flow, InstructionRoutine::example(cfg.instruction_image.clone()));
    add_trial_loop(
        &mut flow,
        cfg.practice,
        LoopKind::Practice,
        cfg.images_dir.clone(),
        cfg.max_practice,
    );
    schedule_routine(&mut flow, InstructionRoutine::pause());
    add_trial_loop(
        &mut flow,
        cfg.main,
        LoopKind::Main,
        cfg.images_dir,
        cfg.max_main,
    );
    schedule_routine(&mut flow, InstructionRoutine::exit());

    flow
}

/// Insert a loop as (begin-task, sub-scheduler) pair. The begin task
/// statically unrolls the loop into the sub-scheduler (one routine group
/// plus an end-iteration check per row) before any trial runs.
fn add_trial_loop(
    flow: &mut Scheduler<ExperimentCtx>,
    trial_loop: TrialLoop<Triplet>,
    kind: LoopKind,
    images_dir: PathBuf,
    cutoff: Option<usize>,
) {
    let sub = Scheduler::shared();
    let stop = sub.borrow().stop_handle();

    let fill = Rc::clone(&sub);
    let mut pending = Some(trial_loop);
    flow.add(move |_ctx: &mut ExperimentCtx| {
        if let Some(trial_loop) = pending.take() {
            trial_loop.expand(&fill, |s, snapshot| {
                schedule_trial(s, snapshot, kind, images_dir.clone(), cutoff, stop.clone());
            });
        }
        SchedulerEvent::Next
    });
    flow.add_sub(&sub);
}

fn schedule_trial(
    scheduler: &mut Scheduler<ExperimentCtx>,
    snapshot: TrialSnapshot<Triplet>,
    kind: LoopKind,
    images_dir: PathBuf,
    cutoff: Option<usize>,
    stop: StopHandle,
) {
    let state = Rc::clone(&snapshot.state);
    let routine = match kind {
        LoopKind::Practice => TrialRoutine::practice(snapshot, images_dir, cutoff),
        LoopKind::Main => TrialRoutine::main(snapshot, images_dir, cutoff),
    };
    schedule_routine(scheduler, routine);

    // End-iteration check: an early-finished loop flushes any orphaned
    // data and stops its own sub-scheduler; otherwise the data file
    // advances to the next row.
    scheduler.add(move |ctx: &mut ExperimentCtx| {
        if state.is_finished() {
            if !ctx.data.is_entry_empty() {
                ctx.data.next_entry();
            }
            stop.stop();
        } else {
            ctx.data.next_entry();
        }
        SchedulerEvent::Next
    });
}
