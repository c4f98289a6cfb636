#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Gender {
    Male,
    Female,
}

impl Gender {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum SessionCommand {
    Start,
    Stop,
}

/// One pipeline result per hop while a session is running.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameUpdate {
    pub(crate) t: f64,
    /// Stabilized frequency in Hz, `None` for unvoiced frames.
    pub(crate) hz: Option<f64>,
    pub(crate) label: Option<Gender>,
    pub(crate) rms: f32,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SessionSummary {
    pub(crate) label: Option<Gender>,
    pub(crate) certainty: u8,
    pub(crate) voiced_frames: usize,
}
