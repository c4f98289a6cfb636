pub(crate) mod classify;
pub(crate) mod pitch;
pub(crate) mod stabilize;
