use std::path::{Path, PathBuf};

use chrono::Local;

pub const EXP_NAME: &str = "odd_one_out_experiment";

/// Session metadata appended as extra columns to every data row
/// (PsychoPy `expInfo`).
#[derive(Clone, Debug)]
pub struct SessionInfo {
    pub participant: String,
    pub session: String,
    pub date: String,
    pub exp_name: String,
    pub frame_rate: Option<f64>,
}

impl SessionInfo {
    pub fn new(participant: impl Into<String>, session: impl Into<String>) -> Self {
        Self {
            participant: participant.into(),
            session: session.into(),
            date: Local::now().format("%Y-%m-%d_%Hh%M.%S").to_string(),
            exp_name: EXP_NAME.to_string(),
            frame_rate: None,
        }
    }

    /// `<data_dir>/<participant>/<participant>_<expName>_<date>`, the stem
    /// the data file and the sampled trial lists are derived from.
    pub fn file_stem(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.participant).join(format!(
            "{}_{}_{}",
            self.participant, self.exp_name, self.date
        ))
    }

    pub fn columns(&self) -> Vec<(&'static str, String)> {
        let mut cols = vec![
            ("participant", self.participant.clone()),
            ("session", self.session.clone()),
            ("date", self.date.clone()),
            ("expName", self.exp_name.clone()),
        ];
        if let Some(rate) = self.frame_rate {
            cols.push(("frameRate", format!("{rate:.2}")));
        }
        cols
    }
}
