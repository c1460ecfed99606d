pub mod animation;
pub mod entity;
pub mod timer;
