use std::path::PathBuf;

use oddex_core::{Bounds, Triplet, Visual};
use oddex_schedule::TrialSnapshot;

use crate::context::ExperimentCtx;
use crate::routines::components::{MouseComponent, Onset};
use crate::routines::{FrameVerdict, Routine};

const STIM_X: [f32; 3] = [-0.5, 0.0, 0.5];
const STIM_SIZE: (f32, f32) = (0.4, 0.4);
const FRAME_SIZE: (f32, f32) = (0.45, 0.45);
const FIXATION_SECS: f64 = 0.5;

/// One odd-one-out trial: fixation cross, then the image triplet with
/// hover-highlight frames and the question text, until a valid click.
/// Used by both the practice and the main loop.
pub struct TrialRoutine {
    name: &'static str,
    /// Data-table prefix for the mouse response columns.
    mouse_column: &'static str,
    snapshot: TrialSnapshot<Triplet>,
    images_dir: PathBuf,
    /// Trial-count cutoff: finishing this many trials ends the loop early.
    cutoff: Option<usize>,
    stim_names: [String; 3],
    fixation: Onset,
    stimuli: Onset,
    mouse: MouseComponent,
}

impl TrialRoutine {
    pub fn practice(
        snapshot: TrialSnapshot<Triplet>,
        images_dir: PathBuf,
        cutoff: Option<usize>,
    ) -> Self {
        Self::new("practice", "mouse_pract", "pract", snapshot, images_dir, cutoff)
    }

    pub fn main(
        snapshot: TrialSnapshot<Triplet>,
        images_dir: PathBuf,
        cutoff: Option<usize>,
    ) -> Self {
        Self::new("experiment", "mouse_main", "main", snapshot, images_dir, cutoff)
    }

    fn new(
        name: &'static str,
        mouse_column: &'static str,
        suffix: &str,
        snapshot: TrialSnapshot<Triplet>,
        images_dir: PathBuf,
        cutoff: Option<usize>,
    ) -> Self {
        let stim_names =
            [1, 2, 3].map(|i| format!("stim{i}_{suffix}"));
        Self {
            name,
            mouse_column,
            snapshot,
            images_dir,
            cutoff,
            stim_names,
            fixation: Onset::new(0.0, Some(FIXATION_SECS)),
            stimuli: Onset::new(FIXATION_SECS, None),
            mouse: MouseComponent::new(FIXATION_SECS),
        }
    }

    fn bounds(&self, i: usize) -> Bounds {
        Bounds::new((STIM_X[i], 0.0), STIM_SIZE)
    }
}

impl Routine for TrialRoutine {
    fn name(&self) -> &'static str {
        self.name
    }

    fn begin(&mut self, ctx: &mut ExperimentCtx) {
        self.fixation.reset();
        self.stimuli.reset();
        self.mouse.reset();

        // Condition columns for this row of the loop.
        let row = &self.snapshot.row;
        ctx.data.add_data("Stim1", &row.stim1);
        ctx.data.add_data("Stim2", &row.stim2);
        ctx.data.add_data("Stim3", &row.stim3);

        log::info!(
            "loop '{}' trial {}/{}: {:?}",
            self.snapshot.loop_name(),
            self.snapshot.this_n + 1,
            self.snapshot.state.n_total,
            row.stimuli(),
        );
    }

    fn each_frame(&mut self, ctx: &mut ExperimentCtx) -> FrameVerdict {
        let t = ctx.routine_clock.seconds();
        ctx.scene.clear();

        if self.fixation.update(t) {
            ctx.scene.push(Visual::Fixation {
                pos: (0.0, 0.0),
                size: 0.05,
            });
        }

        if self.stimuli.update(t) {
            // Frames first (behind), highlighted while hovered.
            for i in 0..3 {
                let hovered = self.bounds(i).contains(ctx.input.mouse_pos);
                ctx.scene.push(Visual::Frame {
                    pos: (STIM_X[i], 0.0),
                    size: FRAME_SIZE,
                    opacity: if hovered { 1.0 } else { 0.0 },
                });
            }
            for (i, stim) in self.snapshot.row.stimuli().into_iter().enumerate() {
                ctx.scene.push(Visual::Image {
                    path: self.images_dir.join(stim),
                    pos: (STIM_X[i], 0.0),
                    size: STIM_SIZE,
                });
            }
            ctx.scene.push(Visual::Text {
                content: "Which is the odd-one-out?".to_string(),
                pos: (0.0, 0.4),
                height: 0.05,
                wrap_width: None,
            });
        }

        let clickables: Vec<(&str, Bounds)> = self
            .stim_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), Bounds::new((STIM_X[i], 0.0), STIM_SIZE)))
            .collect();
        if self.mouse.update(ctx, t, &clickables) {
            FrameVerdict::Finished
        } else {
            FrameVerdict::Continue
        }
    }

    fn end(&mut self, ctx: &mut ExperimentCtx) {
        let clicks = &self.mouse.clicks;
        let col = self.mouse_column;
        ctx.data
            .add_data(&format!("{col}.x"), clicks.iter().map(|c| c.x).collect::<Vec<_>>());
        ctx.data
            .add_data(&format!("{col}.y"), clicks.iter().map(|c| c.y).collect::<Vec<_>>());
        ctx.data.add_data(
            &format!("{col}.leftButton"),
            clicks.iter().map(|c| c.left as u8).collect::<Vec<_>>(),
        );
        ctx.data.add_data(
            &format!("{col}.midButton"),
            clicks.iter().map(|c| c.middle as u8).collect::<Vec<_>>(),
        );
        ctx.data.add_data(
            &format!("{col}.rightButton"),
            clicks.iter().map(|c| c.right as u8).collect::<Vec<_>>(),
        );
        ctx.data.add_data(
            &format!("{col}.time"),
            clicks.iter().map(|c| c.time).collect::<Vec<_>>(),
        );
        ctx.data.add_data(
            &format!("{col}.clicked_name"),
            clicks.iter().map(|c| c.clicked_name.clone()).collect::<Vec<_>>(),
        );

        if let Some(cutoff) = self.cutoff {
            if self.snapshot.this_n + 1 >= cutoff && !self.snapshot.state.is_finished() {
                log::info!(
                    "loop '{}' reached its cutoff of {} trial(s)",
                    self.snapshot.loop_name(),
                    cutoff
                );
                self.snapshot.state.finish();
            }
        }
    }
}
