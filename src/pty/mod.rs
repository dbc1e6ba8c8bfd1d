//! PTY process management

pub mod process;

pub use process::PtyProcess;
