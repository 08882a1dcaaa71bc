//! Command module structure for the edgecraft CLI

pub mod detect;
pub mod manifest;
pub mod scaffold;
pub mod scan;
pub mod solution;
pub mod template;
pub mod tidy;
