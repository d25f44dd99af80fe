pub mod rng;
pub mod store;
pub mod timer;
pub mod viewport;
