pub(crate) mod generation;
pub(crate) mod model;
pub(crate) mod types;
