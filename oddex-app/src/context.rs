use oddex_core::Scene;
use oddex_data::ExperimentHandler;
use oddex_timing::Clock;

/// Key press as delivered by the window system, stamped with the global
/// clock at arrival so components can compute reaction times.
#[derive(Clone, Debug)]
pub struct KeyEvent {
    pub name: String,
    pub t_global: f64,
}

/// Input snapshot for one frame. The shell refills this before every
/// scheduler tick; routines only ever see the current frame's state.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    pub keys: Vec<KeyEvent>,
    /// Cursor position in height units.
    pub mouse_pos: (f32, f32),
    /// Left, middle, right button state.
    pub buttons: [bool; 3],
    /// Escape observed; checked once per frame by the routine adapter.
    pub quit: bool,
}

/// Everything a scheduled task can touch: the session clocks, this frame's
/// input, the scene being assembled, and the data table. Single-threaded
/// by construction; only the active phase ever holds it.
pub struct ExperimentCtx {
    pub global_clock: Clock,
    /// Reset at every routine's `begin`.
    pub routine_clock: Clock,
    /// Completed frames of the current routine.
    pub frame_n: u64,
    pub input: FrameInput,
    pub scene: Scene,
    pub data: ExperimentHandler,
}

impl ExperimentCtx {
    pub fn new(data: ExperimentHandler) -> Self {
        Self {
            global_clock: Clock::new(),
            routine_clock: Clock::new(),
            frame_n: 0,
            input: FrameInput::default(),
            scene: Scene::new(),
            data,
        }
    }
}
