pub mod event;
pub mod sequence;
pub mod step;
pub mod world;
