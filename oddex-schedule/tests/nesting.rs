//! Black-box tests of the public scheduler API: a flow-shaped layout with
//! instruction tasks around two trial loops, driven tick by tick.

use oddex_schedule::{Scheduler, SchedulerEvent, TickOutcome, TrialLoop};

/// Context standing in for the experiment state: a trace of what ran and
/// a countdown used to keep a task on screen for a few frames.
#[derive(Default)]
struct Trace {
    ran: Vec<String>,
    frames_left: u32,
}

fn instruction(name: &'static str, frames: u32) -> impl FnMut(&mut Trace) -> SchedulerEvent {
    let mut started = false;
    move |trace: &mut Trace| {
        if !started {
            started = true;
            trace.frames_left = frames;
            trace.ran.push(format!("{name}:begin"));
        }
        if trace.frames_left > 0 {
            trace.frames_left -= 1;
            SchedulerEvent::FlipRepeat
        } else {
            trace.ran.push(format!("{name}:end"));
            SchedulerEvent::Next
        }
    }
}

fn build(rows_a: Vec<&'static str>, rows_b: Vec<&'static str>, stop_a_at: Option<usize>) -> Scheduler<Trace> {
    let mut flow: Scheduler<Trace> = Scheduler::new();
    flow.add(instruction("welcome", 2));

    for (loop_name, rows, stop_at) in [
        ("loopA", rows_a, stop_a_at),
        ("loopB", rows_b, None),
    ] {
        let trial_loop = TrialLoop::new(loop_name, rows);
        let sub = Scheduler::shared();
        let stop = sub.borrow().stop_handle();
        trial_loop.expand(&sub, |s, snap| {
            let trial = snap.clone();
            s.add_once(move |trace: &mut Trace| {
                trace.ran.push(format!("{}:{}", trial.loop_name(), trial.row));
                if stop_at == Some(trial.this_n + 1) {
                    trial.state.finish();
                }
            });
            let stop = stop.clone();
            s.add(move |_trace: &mut Trace| {
                if snap.state.is_finished() {
                    stop.stop();
                }
                SchedulerEvent::Next
            });
        });
        flow.add_sub(&sub);
    }

    flow.add(instruction("exit", 1));
    flow
}

#[test]
fn flow_runs_instructions_and_both_loops_in_order() {
    let mut flow = build(vec!["a0", "a1"], vec!["b0"], None);
    let mut trace = Trace::default();

    let mut flips = 0;
    loop {
        match flow.tick(&mut trace) {
            TickOutcome::Flip => flips += 1,
            TickOutcome::Complete => break,
            TickOutcome::Quit => panic!("nothing quits in this flow"),
        }
    }

    assert_eq!(
        trace.ran,
        vec![
            "welcome:begin",
            "welcome:end",
            "loopA:a0",
            "loopA:a1",
            "loopB:b0",
            "exit:begin",
            "exit:end",
        ]
    );
    // welcome holds the display for two frames, exit for one
    assert_eq!(flips, 3);
}

#[test]
fn stopping_the_first_loop_leaves_the_second_intact() {
    let mut flow = build(vec!["a0", "a1", "a2"], vec!["b0", "b1"], Some(1));
    let mut trace = Trace::default();

    while flow.tick(&mut trace) == TickOutcome::Flip {}

    let trials: Vec<&str> = trace
        .ran
        .iter()
        .filter(|r| r.starts_with("loop"))
        .map(String::as_str)
        .collect();
    assert_eq!(trials, vec!["loopA:a0", "loopB:b0", "loopB:b1"]);
}

#[test]
fn quit_unwinds_out_of_a_nested_loop() {
    let mut flow: Scheduler<Trace> = Scheduler::new();
    let trial_loop = TrialLoop::new("loop", vec!["t0", "t1"]);
    let sub = Scheduler::shared();
    trial_loop.expand(&sub, |s, snap| {
        s.add(move |trace: &mut Trace| {
            trace.ran.push(snap.row.to_string());
            SchedulerEvent::Quit
        });
    });
    flow.add_sub(&sub);
    flow.add(instruction("exit", 0));

    let mut trace = Trace::default();
    assert_eq!(flow.tick(&mut trace), TickOutcome::Quit);
    assert_eq!(trace.ran, vec!["t0"]);
}
