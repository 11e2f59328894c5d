pub mod components;
pub mod instruction;
pub mod trial;

use std::cell::RefCell;
use std::rc::Rc;

use oddex_schedule::{Scheduler, SchedulerEvent};

use crate::context::ExperimentCtx;

pub use instruction::InstructionRoutine;
pub use trial::TrialRoutine;

/// What a routine's each-frame phase wants from the scheduler.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameVerdict {
    /// Keep drawing; run again after the next flip.
    Continue,
    /// Ending condition met; move on to the routine's end phase.
    Finished,
}

/// One experiment phase with the begin / each-frame / end lifecycle.
/// `begin` runs with the routine clock freshly zeroed; `each_frame` is
/// called once per display refresh until it returns `Finished`; `end`
/// flushes responses into the data table.
pub trait Routine {
    fn name(&self) -> &'static str;
    fn begin(&mut self, ctx: &mut ExperimentCtx);
    fn each_frame(&mut self, ctx: &mut ExperimentCtx) -> FrameVerdict;
    fn end(&mut self, ctx: &mut ExperimentCtx);
}

/// Insert a routine into a schedule as its three lifecycle tasks. The
/// each-frame task checks the quit signal first: cancellation unwinds
/// without running `end` (partial data is persisted by the shell).
pub fn schedule_routine<R: Routine + 'static>(scheduler: &mut Scheduler<ExperimentCtx>, routine: R) {
    let routine = Rc::new(RefCell::new(routine));

    let r = Rc::clone(&routine);
    scheduler.add(move |ctx: &mut ExperimentCtx| {
        let mut r = r.borrow_mut();
        log::info!("routine '{}' begins", r.name());
        ctx.routine_clock.reset();
        ctx.frame_n = 0;
        r.begin(ctx);
        SchedulerEvent::Next
    });

    let r = Rc::clone(&routine);
    scheduler.add(move |ctx: &mut ExperimentCtx| {
        if ctx.input.quit {
            log::warn!("escape pressed during '{}'", r.borrow().name());
            return SchedulerEvent::Quit;
        }
        let verdict = r.borrow_mut().each_frame(ctx);
        ctx.frame_n += 1;
        match verdict {
            FrameVerdict::Continue => SchedulerEvent::FlipRepeat,
            FrameVerdict::Finished => SchedulerEvent::Next,
        }
    });

    scheduler.add(move |ctx: &mut ExperimentCtx| {
        routine.borrow_mut().end(ctx);
        ctx.scene.clear();
        SchedulerEvent::Next
    });
}
