pub mod auth;
pub mod directory;
pub mod error;
pub mod membership;
pub mod revocation;
pub mod store;
pub mod token;

pub use auth::{AuthOutcome, AuthService, LogoutOutcome};
pub use directory::AccountDirectory;
pub use error::ServiceError;
pub use membership::MembershipService;
pub use revocation::{MemoryRevocationStore, RedisRevocationStore, RevocationStore};
pub use store::{AccountStore, MemoryStore};
pub use token::{Claims, TokenService};
