pub mod composer;
pub mod pipeline;
pub mod session;
