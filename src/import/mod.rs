pub(crate) mod base;
pub(crate) mod importer;
pub(crate) mod render_importer;
