pub mod render;
pub mod text;
pub mod units;

pub use render::SceneRenderer;
pub use units::Units;
