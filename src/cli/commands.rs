//! Subcommand implementations / 子命令实现

pub mod init;
pub mod rewrite;
pub mod run;
pub mod simulate;
