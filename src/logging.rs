use std::env;
use std::fs;

use simplelog::{Config, WriteLogger};

/// Opt-in debug log. The interactive terminal must stay clean, so traces go
/// to the file named by USH_LOG; without it logging stays disabled entirely.
/// Best-effort: a broken log path must never take down the shell.
pub fn init() {
	let Some(path) = env::var_os("USH_LOG") else {
		return;
	};
	let Ok(file) = fs::OpenOptions::new().create(true).append(true).open(path) else {
		return;
	};
	let _ = WriteLogger::init(log::LevelFilter::Debug, Config::default(), file);
}
