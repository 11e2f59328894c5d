pub mod component;
pub mod geometry;
pub mod response;
pub mod scene;
pub mod triplet;

pub use component::Status;
pub use geometry::Bounds;
pub use response::{ClickSample, KeyPress};
pub use scene::{Scene, Visual};
pub use triplet::Triplet;
