use std::path::PathBuf;

use clap::Parser;

/// Odd-one-out triplet similarity experiment.
#[derive(Parser, Debug)]
#[command(name = "oddex", version, about)]
pub struct Args {
    /// Participant identifier (names the data directory and file).
    #[arg(long, default_value = "0000")]
    pub participant: String,

    /// Session identifier.
    #[arg(long, default_value = "001")]
    pub session: String,

    /// Condition table with Stim1,Stim2,Stim3 columns.
    #[arg(long, default_value = "triplets.csv")]
    pub conditions: PathBuf,

    /// Directory holding the stimulus images named in the condition table.
    #[arg(long, default_value = "images")]
    pub images: PathBuf,

    /// Root of the output data tree.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Illustration shown on the example screen. Defaults to
    /// `instructFrame1.png` inside the images directory.
    #[arg(long)]
    pub instruction_image: Option<PathBuf>,

    /// TrueType font for instruction and question text.
    #[arg(long, default_value = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf")]
    pub font: PathBuf,

    /// Number of rows sampled for the practice loop.
    #[arg(long, default_value_t = 10)]
    pub practice_trials: usize,

    /// Number of rows sampled for the main loop.
    #[arg(long, default_value_t = 10)]
    pub main_trials: usize,

    /// End the practice loop early after this many trials.
    #[arg(long)]
    pub max_practice: Option<usize>,

    /// End the main loop early after this many trials.
    #[arg(long)]
    pub max_main: Option<usize>,

    /// Run in a window instead of borderless fullscreen.
    #[arg(long)]
    pub windowed: bool,
}

impl Args {
    /// Illustration for the example screen: the explicit flag, or the stock
    /// `instructFrame1.png` next to the stimuli when it exists.
    pub fn resolve_instruction_image(&self) -> Option<PathBuf> {
        if let Some(path) = &self.instruction_image {
            return Some(path.clone());
        }
        let default = self.images.join("instructFrame1.png");
        if default.exists() {
            Some(default)
        } else {
            log::warn!(
                "no example illustration at {}; the example screen will be text only",
                default.display()
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_image_defaults_into_the_images_directory() {
        let dir = tempfile::tempdir().unwrap();
        let default = dir.path().join("instructFrame1.png");
        std::fs::write(&default, b"png").unwrap();

        let args = Args::parse_from(["oddex", "--images", dir.path().to_str().unwrap()]);
        assert_eq!(args.resolve_instruction_image(), Some(default));
    }

    #[test]
    fn explicit_instruction_image_wins() {
        let dir = tempfile::tempdir().unwrap();
        let custom = dir.path().join("custom.png");
        std::fs::write(&custom, b"png").unwrap();

        let args = Args::parse_from([
            "oddex",
            "--images",
            dir.path().to_str().unwrap(),
            "--instruction-image",
            custom.to_str().unwrap(),
        ]);
        assert_eq!(args.resolve_instruction_image(), Some(custom));
    }

    #[test]
    fn missing_default_illustration_falls_back_to_text() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::parse_from(["oddex", "--images", dir.path().to_str().unwrap()]);
        assert_eq!(args.resolve_instruction_image(), None);
    }
}
