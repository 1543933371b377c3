mod canvas;

pub use canvas::{CellHalves, HalfBlockCanvas};
