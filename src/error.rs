//! Error type for the engine.
//!
//! Very little in the engine is allowed to fail outright. Terminal I/O
//! errors during mode switches are logged and degrade to no-ops, and
//! component hook failures are contained at the call site. What remains
//! surfaces through [`Error`].

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("component id `{0}` is already registered")]
    DuplicateComponent(String),

    #[error("invalid value `{value}` for {key}")]
    InvalidConfig { key: String, value: String },

    #[error("could not install log subscriber: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;
