pub mod export;
pub mod feed;
pub mod legend;
pub mod logging;
pub mod markers;
pub mod pipeline;
pub mod quake;
pub mod state;
pub mod style;
pub mod surface;
