/// Lifecycle status of a routine component (text, image, keyboard, mouse).
///
/// Components move NotStarted -> Started once their onset time is reached,
/// and Started -> Finished when the routine ends or their offset passes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    NotStarted,
    Started,
    Finished,
}

impl Status {
    pub fn is_started(&self) -> bool {
        matches!(self, Status::Started)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Status::Finished)
    }
}
