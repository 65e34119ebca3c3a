//! Core types for Crestline.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod client_code;
pub mod email;
pub mod id;
pub mod status;

pub use client_code::{ClientCode, ClientCodeError};
pub use email::{Email, EmailError};
pub use id::*;
pub use status::*;
