pub mod entity;
pub mod explosion;
pub mod layer;
pub mod zone;
