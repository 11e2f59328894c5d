//! Headless end-to-end runs of the session flow: the scheduler is driven
//! with scripted input snapshots instead of a window, and the data file is
//! inspected afterwards.

use std::path::PathBuf;
use std::time::Duration;

use oddex_app::context::{ExperimentCtx, KeyEvent};
use oddex_app::flow::{build_flow, FlowConfig};
use oddex_core::Triplet;
use oddex_data::{ExperimentHandler, SessionInfo};
use oddex_schedule::{Scheduler, TickOutcome, TrialLoop};

fn triplets(prefix: &str, n: usize) -> Vec<Triplet> {
    (0..n)
        .map(|i| Triplet {
            stim1: format!("{prefix}{i}.png"),
            stim2: format!("{prefix}{i}_b.png"),
            stim3: format!("{prefix}{i}_c.png"),
        })
        .collect()
}

struct Driver {
    flow: Scheduler<ExperimentCtx>,
    ctx: ExperimentCtx,
}

impl Driver {
    fn new(
        data_dir: &std::path::Path,
        practice: Vec<Triplet>,
        main: Vec<Triplet>,
        max_practice: Option<usize>,
    ) -> Self {
        let flow = build_flow(FlowConfig {
            practice: TrialLoop::new("practiceTrials", practice),
            main: TrialLoop::new("mainTrials", main),
            images_dir: PathBuf::from("images"),
            instruction_image: None,
            max_practice,
            max_main: None,
        });
        let data = ExperimentHandler::new(SessionInfo::new("0000", "001"), data_dir);
        Self {
            flow,
            ctx: ExperimentCtx::new(data),
        }
    }

    /// One display refresh: tick the scheduler, then drop this frame's
    /// key events (the shell rebuilds the input snapshot every frame).
    fn tick(&mut self) -> TickOutcome {
        let outcome = self.flow.tick(&mut self.ctx);
        self.ctx.input.keys.clear();
        outcome
    }

    /// Pretend `secs` of routine time have passed.
    fn elapse(&mut self, secs: f64) {
        self.ctx.routine_clock.rewind(Duration::from_secs_f64(secs));
    }

    fn press_space(&mut self) {
        let t_global = self.ctx.global_clock.seconds();
        self.ctx.input.keys.push(KeyEvent {
            name: "space".to_string(),
            t_global,
        });
    }

    /// Welcome screen: shown, wait for the key to arm, then space.
    /// Afterwards the next routine has drawn its first frame.
    fn pass_welcome(&mut self) {
        assert_eq!(self.tick(), TickOutcome::Flip); // first frame, key unarmed
        self.elapse(1.5);
        assert_eq!(self.tick(), TickOutcome::Flip); // arming frame
        self.press_space();
        assert_eq!(self.tick(), TickOutcome::Flip);
    }

    /// Example or pause screen: the keyboard armed on the screen's first
    /// drawn frame, so one space press ends it. Returns the outcome of the
    /// ending tick.
    fn pass_instruction(&mut self) -> TickOutcome {
        self.press_space();
        self.tick()
    }

    /// Exit screen: its key only arms half a second in, so wait it out
    /// before pressing.
    fn pass_exit(&mut self) -> TickOutcome {
        self.elapse(0.6);
        assert_eq!(self.tick(), TickOutcome::Flip); // arming frame
        self.press_space();
        self.tick()
    }

    /// One trial, clicking the given stimulus slot (0 left, 1 center,
    /// 2 right). Assumes the trial's fixation frame has just been drawn.
    fn click_through_trial(&mut self, slot: usize) {
        self.elapse(0.6);
        assert_eq!(self.tick(), TickOutcome::Flip); // stimuli up, mouse arms
        self.ctx.input.mouse_pos = ([-0.5, 0.0, 0.5][slot], 0.0);
        self.ctx.input.buttons = [true, false, false];
        assert_eq!(self.tick(), TickOutcome::Flip); // click ends the trial
        self.ctx.input.buttons = [false, false, false];
    }

    fn saved_csv(&mut self) -> String {
        let path = self.ctx.data.save().unwrap();
        std::fs::read_to_string(path).unwrap()
    }
}

#[test]
fn full_session_produces_one_row_per_routine_and_trial() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = Driver::new(
        dir.path(),
        triplets("p", 2),
        triplets("m", 2),
        None,
    );

    driver.pass_welcome(); // -> example drawn
    assert_eq!(driver.pass_instruction(), TickOutcome::Flip); // -> practice trial 0
    driver.click_through_trial(1);
    driver.click_through_trial(2); // -> pause drawn
    assert_eq!(driver.pass_instruction(), TickOutcome::Flip); // -> main trial 0
    driver.click_through_trial(0);
    driver.click_through_trial(1); // -> exit drawn
    assert_eq!(driver.pass_exit(), TickOutcome::Complete);

    // welcome, example, 2 practice, pause, 2 main, exit
    assert_eq!(driver.ctx.data.row_count(), 8);

    let csv = driver.saved_csv();
    assert!(csv.contains("key_resp.keys"));
    assert!(csv.contains("mouse_pract.clicked_name"));
    assert!(csv.contains("mouse_main.clicked_name"));
    assert!(csv.contains("stim2_pract"));
    assert!(csv.contains("stim1_main"));

    // Trials ran in table order.
    let p0 = csv.find("p0.png").expect("practice row 0 logged");
    let p1 = csv.find("p1.png").expect("practice row 1 logged");
    let m0 = csv.find("m0.png").expect("main row 0 logged");
    let m1 = csv.find("m1.png").expect("main row 1 logged");
    assert!(p0 < p1 && p1 < m0 && m0 < m1);
}

#[test]
fn practice_cutoff_stops_the_loop_but_not_the_main_loop() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = Driver::new(
        dir.path(),
        triplets("p", 5),
        triplets("m", 1),
        Some(3),
    );

    driver.pass_welcome();
    assert_eq!(driver.pass_instruction(), TickOutcome::Flip);
    // The cutoff fires at the end of the third trial; the remaining two
    // scheduled rows are skipped and the pause screen comes up.
    driver.click_through_trial(0);
    driver.click_through_trial(0);
    driver.click_through_trial(0); // -> pause drawn
    assert_eq!(driver.pass_instruction(), TickOutcome::Flip); // -> main trial
    driver.click_through_trial(2); // -> exit drawn
    assert_eq!(driver.pass_exit(), TickOutcome::Complete);

    assert_eq!(driver.ctx.data.row_count(), 8); // 2 + 3 practice + 1 + 1 main + 1

    let csv = driver.saved_csv();
    assert!(csv.contains("p2.png"));
    assert!(!csv.contains("p3.png"));
    assert!(!csv.contains("p4.png"));
    assert!(csv.contains("m0.png"));
}

#[test]
fn escape_skips_routine_end_but_partial_row_survives() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = Driver::new(
        dir.path(),
        triplets("p", 2),
        triplets("m", 2),
        None,
    );

    driver.pass_welcome();
    assert_eq!(driver.pass_instruction(), TickOutcome::Flip); // practice trial 0 begun

    driver.ctx.input.quit = true;
    assert_eq!(driver.tick(), TickOutcome::Quit);

    // The trial's end phase never ran: no mouse columns were written and
    // the condition columns are still sitting in the uncommitted row.
    assert!(!driver.ctx.data.is_entry_empty());
    assert!(!driver.ctx.data.columns().iter().any(|c| c.starts_with("mouse_pract")));

    let path = driver.ctx.data.abort_save().unwrap();
    let csv = std::fs::read_to_string(path).unwrap();
    assert_eq!(driver.ctx.data.row_count(), 3); // welcome, example, partial trial
    assert!(csv.contains("p0.png"));
}
