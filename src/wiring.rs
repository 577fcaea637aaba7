use std::fs;
use std::os::fd::OwnedFd;
use std::os::unix::fs::OpenOptionsExt;

use nix::fcntl::OFlag;
use nix::unistd;

use crate::error::{FileAccess, ShellError};
use crate::types::Pipeline;

/// Where a stage's stdin or stdout comes from.
#[derive(Debug)]
pub enum Slot {
	Inherit,
	Fd(OwnedFd),
}

#[derive(Debug)]
pub struct StageIo {
	pub stdin: Slot,
	pub stdout: Slot,
}

/// Per-stage descriptor plan for one pipeline invocation. Every descriptor
/// is owned by exactly one slot and is close-on-exec, so dropping the plan
/// (or any part of it) releases everything not yet handed to a child.
#[derive(Debug)]
pub struct Wiring {
	pub stages: Vec<StageIo>,
}

/// Open the redirection files and create the N-1 pipes connecting adjacent
/// stages. Runs entirely before any fork: on failure no process has been
/// spawned and every descriptor opened so far is released by drop.
pub fn build(pipeline: &Pipeline) -> Result<Wiring, ShellError> {
	let n = pipeline.stages.len();
	let mut stages: Vec<StageIo> = (0..n)
		.map(|_| StageIo { stdin: Slot::Inherit, stdout: Slot::Inherit })
		.collect();

	if let Some(path) = &pipeline.input {
		let file = fs::File::open(path)
			.map_err(|e| ShellError::Redirection(FileAccess::from_io(&e)))?;
		stages[0].stdin = Slot::Fd(file.into());
	}
	if let Some(path) = &pipeline.output {
		let file = fs::OpenOptions::new()
			.write(true)
			.create(true)
			.truncate(true)
			.mode(0o664)
			.open(path)
			.map_err(|e| ShellError::Redirection(FileAccess::from_io(&e)))?;
		stages[n - 1].stdout = Slot::Fd(file.into());
	}
	for i in 0..n - 1 {
		let (read, write) = unistd::pipe2(OFlag::O_CLOEXEC).map_err(ShellError::PipeCreation)?;
		stages[i].stdout = Slot::Fd(write);
		stages[i + 1].stdin = Slot::Fd(read);
	}
	Ok(Wiring { stages })
}
