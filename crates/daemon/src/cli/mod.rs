pub mod args;
pub mod op;
pub mod ops;

pub use ops::{Daemon, Document, Health, Identity, Init, Keys, Version};
