//! Interview preparation: question generation, scoring, learning plans and
//! coaching. Each capability is one prompt plus one schema-checked completion.

pub mod guidance;
pub mod handlers;
pub mod learning;
pub mod prompts;
pub mod questions;
pub mod scoring;
