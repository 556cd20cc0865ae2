pub(crate) mod frame;
pub(crate) mod object;
pub(crate) mod store;
