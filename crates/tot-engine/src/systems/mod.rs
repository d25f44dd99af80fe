pub mod collision;
pub mod drag;
pub mod stepper;
pub mod tutorial;
