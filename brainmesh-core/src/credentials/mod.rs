//! Password hashing primitives.

pub mod ffi;
pub mod hasher;
pub mod params;

pub use hasher::{
    constant_time_eq, derive_key, generate_salt, make_password_hash, verify_password,
    PasswordHashRecord,
};
pub use params::{KdfParams, DEFAULT_ITERATIONS, DEFAULT_KEY_LENGTH, DEFAULT_SALT_LENGTH};
