mod archive;
mod dataset;
mod loader;
mod synthetic;

pub use archive::*;
pub use dataset::*;
pub use loader::*;
pub use synthetic::*;
