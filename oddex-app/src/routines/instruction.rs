use std::path::PathBuf;

use oddex_core::Visual;

use crate::context::ExperimentCtx;
use crate::routines::components::KeyboardComponent;
use crate::routines::{FrameVerdict, Routine};

const WELCOME_TEXT: &str = "Welcome, in this experiment you will be presented with three chess scenario's, side-by-side.\n\nIt is your task to select the odd-one-out. In other words, choose the one you think is the most different when comparing to the other two scenario's.\n\nTo select the odd-one-out you can use your mouse. Click on the scenario you think is the most distinct.\n\nWe will first show you an example of a single trial. It is not necessary to pay attention to the correctness of the decision, rather focus on the general lay-out of the task.\n\nAfter the example you can practice the task yourself.\n\nPress <space> to continue...";

const EXAMPLE_TEXT: &str = "Let's say you think the most distinct scenario is the one in the middle.\nYou can then use your mouse to select this specific scenario as the odd-one-out.\n\nPress <space> to continue to the practice trials...";

const PAUSE_TEXT: &str = "We have finished practicing!\n\nLet's start with the experiment, the task remains the same as it was during practice.\n\nPress <space> to continue...";

const EXIT_TEXT: &str = "That was it!\n\nThank you for your time and attention.\n\nPress <space> to leave the experiment.";

/// Text screen ended by the space bar: welcome, example (with its
/// illustration), the pause between loops, and the exit screen.
pub struct InstructionRoutine {
    name: &'static str,
    /// Data-table prefix for the keyboard response ("key_resp" etc.).
    key_column: &'static str,
    text: String,
    text_pos: (f32, f32),
    text_height: f32,
    image: Option<PathBuf>,
    key: KeyboardComponent,
}

impl InstructionRoutine {
    pub fn welcome() -> Self {
        Self {
            name: "welcome",
            key_column: "key_resp",
            text: WELCOME_TEXT.to_string(),
            text_pos: (0.0, 0.0),
            text_height: 0.03,
            image: None,
            // The welcome key only arms after a second on screen.
            key: KeyboardComponent::new(1.0, &["space"]),
        }
    }

    pub fn example(image: Option<PathBuf>) -> Self {
        Self {
            name: "example",
            key_column: "key_example",
            text: EXAMPLE_TEXT.to_string(),
            text_pos: (0.0, -0.35),
            text_height: 0.03,
            image,
            key: KeyboardComponent::new(0.0, &["space"]),
        }
    }

    pub fn pause() -> Self {
        Self {
            name: "pause",
            key_column: "key_resp_pause",
            text: PAUSE_TEXT.to_string(),
            text_pos: (0.0, 0.0),
            text_height: 0.04,
            image: None,
            key: KeyboardComponent::new(0.0, &["space"]),
        }
    }

    pub fn exit() -> Self {
        Self {
            name: "exit",
            key_column: "key_resp_2",
            text: EXIT_TEXT.to_string(),
            text_pos: (0.0, 0.0),
            text_height: 0.05,
            image: None,
            // The exit key only arms half a second in.
            key: KeyboardComponent::new(0.5, &["space"]),
        }
    }
}

impl Routine for InstructionRoutine {
    fn name(&self) -> &'static str {
        self.name
    }

    fn begin(&mut self, _ctx: &mut ExperimentCtx) {
        self.key.reset();
    }

    fn each_frame(&mut self, ctx: &mut ExperimentCtx) -> FrameVerdict {
        let t = ctx.routine_clock.seconds();

        ctx.scene.clear();
        if let Some(image) = &self.image {
            ctx.scene.push(Visual::Image {
                path: image.clone(),
                pos: (0.0, 0.0),
                size: (1.7, 1.0),
            });
        }
        ctx.scene.push(Visual::Text {
            content: self.text.clone(),
            pos: self.text_pos,
            height: self.text_height,
            wrap_width: Some(1.4),
        });

        if self.key.update(ctx, t) {
            FrameVerdict::Finished
        } else {
            FrameVerdict::Continue
        }
    }

    fn end(&mut self, ctx: &mut ExperimentCtx) {
        match &self.key.keys {
            Some(press) => {
                ctx.data
                    .add_data(&format!("{}.keys", self.key_column), &press.name);
                ctx.data.add_data(&format!("{}.rt", self.key_column), press.rt);
            }
            None => {
                ctx.data
                    .add_data(&format!("{}.keys", self.key_column), Option::<String>::None);
            }
        }
        // Routines outside a loop always advance the data file row.
        ctx.data.next_entry();
    }
}
