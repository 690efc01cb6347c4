pub mod composite;
pub mod mask;
pub mod overlap;
pub mod sample;

pub use composite::Canvases;
pub use mask::Mask;
pub use overlap::{MaskSettings, Placement};
pub use sample::{CellSpec, ParameterSampler};
