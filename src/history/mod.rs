pub(crate) mod engine;
pub(crate) mod events;
pub(crate) mod guard;
