pub(crate) mod backend;
pub(crate) mod cpu;
pub(crate) mod renderer;
pub(crate) mod svg_raster;
