//! Account credentials.
//!
//! Passwords are stored as Argon2id PHC strings and never leave this module
//! in plaintext form.

mod password;

pub use password::{
    MIN_PASSWORD_LEN, PasswordError, hash_password, validate_credentials, verify_password,
};
