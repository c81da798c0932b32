//! Content-addressed publishing
//!
//! A sealed document is serialized to its canonical JSON payload and handed
//! to a [`ContentStore`], which answers with a [`ContentId`]. Two stores ship
//! here: [`MemoryContentStore`] for tests and single-process use, and
//! [`PinningClient`] for a Pinata-compatible pinning service.

mod content_id;
mod memory;
mod pinning;
mod publisher;
mod store;

pub use content_id::{ContentId, ContentIdError, JSON_CODEC, SHA2_256_CODE};
pub use memory::MemoryContentStore;
pub use pinning::{PinningAuth, PinningClient, PIN_JSON_PATH};
pub use publisher::ContentPublisher;
pub use store::{ContentStore, PublishError};
