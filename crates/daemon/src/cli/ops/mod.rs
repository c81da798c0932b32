pub mod daemon;
pub mod document;
pub mod health;
pub mod identity;
pub mod init;
pub mod keys;
pub mod version;

pub use daemon::Daemon;
pub use document::Document;
pub use health::Health;
pub use identity::Identity;
pub use init::Init;
pub use keys::Keys;
pub use version::Version;
