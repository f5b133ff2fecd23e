//! UI widgets.

pub mod stage;

pub use stage::{SURFACE_LABEL, Stage, contain_top};
