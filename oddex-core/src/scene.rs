use std::path::PathBuf;

/// One visual element for the current frame, in height units. The renderer
/// draws visuals in push order (later entries on top).
#[derive(Clone, Debug, PartialEq)]
pub enum Visual {
    Text {
        content: String,
        pos: (f32, f32),
        /// Letter height in height units (PsychoPy text `height`).
        height: f32,
        wrap_width: Option<f32>,
    },
    Image {
        path: PathBuf,
        pos: (f32, f32),
        size: (f32, f32),
    },
    /// Outline frame behind a stimulus; drawn only while `opacity > 0`.
    Frame {
        pos: (f32, f32),
        size: (f32, f32),
        opacity: f32,
    },
    Fixation {
        pos: (f32, f32),
        size: f32,
    },
}

/// Declarative description of what the current frame should show.
/// Routines rebuild this every frame; the renderer consumes it.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    visuals: Vec<Visual>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.visuals.clear();
    }

    pub fn push(&mut self, visual: Visual) {
        self.visuals.push(visual);
    }

    pub fn visuals(&self) -> &[Visual] {
        &self.visuals
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }
}
