// src/constants.rs

pub const DEFAULT_LISTEN_PORT: u16 = 21;

/// Control-channel lines longer than this are refused outright.
pub const MAX_COMMAND_LENGTH: usize = 512;

pub const GREETING: &str = "220 FTP interface for S3(-compatibles) ready";
