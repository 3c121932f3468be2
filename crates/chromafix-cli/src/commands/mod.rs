pub mod config;
pub mod fix;
pub mod info;
pub mod preview;
pub mod shift_args;
