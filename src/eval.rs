use std::convert::Infallible;
use std::ffi::CString;
use std::io;
use std::os::fd::AsRawFd;
use std::process;

use io::Write;
use nix::errno::Errno;
use nix::sys::signal::{self, SigHandler, Signal};
use nix::unistd::{self, ForkResult, Pid};

use crate::builtin::{self, Builtin};
use crate::error::ShellError;
use crate::job::{self, JobRecord};
use crate::types::{Pipeline, Stage};
use crate::wiring::{self, Slot, StageIo};

/// Execute one parsed pipeline. Setup failures abort the pipeline and are
/// reported on stderr; the interpreter itself always survives to prompt
/// again.
pub fn eval(pipeline: &Pipeline) {
	if let Err(e) = run(pipeline) {
		let _ = writeln!(io::stderr(), "{}", e);
	}
}

fn run(pipeline: &Pipeline) -> Result<(), ShellError> {
	assert!(!pipeline.stages.is_empty());

	// Builtins mutate interpreter state, so they only make sense as the
	// sole stage. In a longer pipeline they are refused before anything is
	// opened or spawned.
	if pipeline.stages.len() == 1 {
		if let Some(b) = builtin::classify(&pipeline.stages[0].argv[0]) {
			return run_builtin(b, &pipeline.stages[0]);
		}
	} else if let Some(b) = pipeline.stages.iter().find_map(|s| builtin::classify(&s.argv[0])) {
		return Err(ShellError::BuiltinInPipeline(b.name()));
	}
	if pipeline.stages.len() > job::MAX_STAGES {
		return Err(ShellError::TooManyStages(job::MAX_STAGES));
	}

	let wiring = wiring::build(pipeline)?;
	let pids = spawn_stages(&pipeline.stages, wiring)?;
	log::debug!("spawned {:?} (background: {})", pids, pipeline.background);

	if pipeline.background {
		// not recorded anywhere; SIGCHLD being ignored, the kernel reaps
		// these children when they exit
		return Ok(());
	}
	JobRecord::publish(pids).wait();
	Ok(())
}

fn run_builtin(b: Builtin, stage: &Stage) -> Result<(), ShellError> {
	match b {
		Builtin::Cd => builtin::cd(&stage.argv).map_err(ShellError::DirectoryChange),
		Builtin::Exit => process::exit(0),
	}
}

/// Fork one child per stage, left to right. On a fork failure the stages
/// already running are left alone; dropping the rest of the wiring closes
/// the interpreter's pipe ends, so their readers still see end-of-stream.
fn spawn_stages(stages: &[Stage], wiring: wiring::Wiring) -> Result<Vec<Pid>, ShellError> {
	let mut pids = Vec::with_capacity(stages.len());
	for (stage, stage_io) in stages.iter().zip(wiring.stages) {
		match unsafe { unistd::fork() }.map_err(ShellError::Fork)? {
			ForkResult::Parent { child } => {
				// the child owns these descriptors now; keeping a write end
				// open here would stall downstream readers forever
				drop(stage_io);
				pids.push(child);
			},
			ForkResult::Child => exec_stage(stage, stage_io),
		}
	}
	Ok(pids)
}

/// Child side, never returns. Launch failures are stage-local: the
/// diagnostic goes to the inherited stderr (not the pipeline's redirected
/// output) and only this child exits non-zero.
fn exec_stage(stage: &Stage, stage_io: StageIo) -> ! {
	// the interpreter ignores SIGINT and SIGCHLD; the child must not
	// inherit either policy
	unsafe {
		let _ = signal::signal(Signal::SIGINT, SigHandler::SigDfl);
		let _ = signal::signal(Signal::SIGCHLD, SigHandler::SigDfl);
	}
	let code = match install_and_exec(stage, &stage_io) {
		Ok(never) => match never {},
		Err(Errno::ENOENT) => {
			let _ = writeln!(io::stderr(), "Could not find executable: {}", stage.argv[0]);
			127
		},
		Err(_) => {
			let _ = writeln!(io::stderr(), "Failed to execute: {}", stage.argv[0]);
			126
		},
	};
	unsafe { libc::_exit(code) }
}

fn install_and_exec(stage: &Stage, stage_io: &StageIo) -> nix::Result<Infallible> {
	// dup2 clears close-on-exec on the installed slot only; every other
	// descriptor in the wiring stays CLOEXEC and vanishes at execvp
	if let Slot::Fd(fd) = &stage_io.stdin {
		unistd::dup2(fd.as_raw_fd(), libc::STDIN_FILENO)?;
	}
	if let Slot::Fd(fd) = &stage_io.stdout {
		unistd::dup2(fd.as_raw_fd(), libc::STDOUT_FILENO)?;
	}
	let argv = stage.argv.iter()
		.map(|a| CString::new(a.as_str()))
		.collect::<Result<Vec<CString>, _>>()
		.map_err(|_| Errno::EINVAL)?;
	unistd::execvp(&argv[0], &argv)?;
	unreachable!()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::Stage;

	fn pipeline_of(names: &[&str]) -> Pipeline {
		Pipeline {
			stages: names.iter().map(|n| Stage { argv: vec![n.to_string()] }).collect(),
			input: None,
			output: None,
			background: false,
		}
	}

	#[test]
	fn builtin_inside_a_pipeline_is_refused_before_spawning() {
		let err = run(&pipeline_of(&["cd", "ls"])).unwrap_err();
		assert!(matches!(err, ShellError::BuiltinInPipeline("cd")));
		let err = run(&pipeline_of(&["ls", "exit"])).unwrap_err();
		assert!(matches!(err, ShellError::BuiltinInPipeline("exit")));
	}

	#[test]
	fn oversized_pipelines_are_refused_before_spawning() {
		let names: Vec<String> = (0..job::MAX_STAGES + 1).map(|i| format!("prog{}", i)).collect();
		let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
		let err = run(&pipeline_of(&refs)).unwrap_err();
		assert!(matches!(err, ShellError::TooManyStages(_)));
	}
}
