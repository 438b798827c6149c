#![warn(rust_2018_idioms)]

pub mod cipher_suite;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod hpke;
pub mod key_package;
pub mod key_schedule;
pub mod message;
pub mod tree;
