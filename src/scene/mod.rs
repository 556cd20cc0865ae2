pub(crate) mod component;
pub(crate) mod controller;
pub(crate) mod model;
