use serde::{Deserialize, Serialize};

/// One row of the condition table: three image identifiers shown
/// side-by-side. Column names follow the original `triplets.csv` headers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triplet {
    #[serde(rename = "Stim1")]
    pub stim1: String,
    #[serde(rename = "Stim2")]
    pub stim2: String,
    #[serde(rename = "Stim3")]
    pub stim3: String,
}

impl Triplet {
    /// Stimulus names in presentation order (left, center, right).
    pub fn stimuli(&self) -> [&str; 3] {
        [&self.stim1, &self.stim2, &self.stim3]
    }
}
