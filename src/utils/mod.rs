pub mod password;
pub mod validation;

pub use password::{hash_password, is_strong_password, verify_password, Password, PasswordHashString};
pub use validation::ValidatedJson;
