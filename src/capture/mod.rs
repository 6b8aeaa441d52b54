pub mod frame;
pub mod raster;
pub mod recorder;
pub mod theme;
pub mod tokenize;
