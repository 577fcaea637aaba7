use std::io;

use nix::errno::Errno;
use thiserror::Error;

/// Why a redirection file could not be opened, reduced to the cases the
/// shell reports distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FileAccess {
	#[error("Access denied")]
	AccessDenied,
	#[error("File is a directory")]
	IsADirectory,
	#[error("No such file")]
	NoSuchFile,
	#[error("Could not open file")]
	Other,
}

impl FileAccess {
	pub fn from_io(e: &io::Error) -> FileAccess {
		match e.raw_os_error().map(Errno::from_raw) {
			Some(Errno::EACCES) => FileAccess::AccessDenied,
			Some(Errno::EISDIR) => FileAccess::IsADirectory,
			Some(Errno::ENOENT) => FileAccess::NoSuchFile,
			_ => FileAccess::Other,
		}
	}
}

/// Why `cd` failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DirError {
	#[error("Permission denied")]
	PermissionDenied,
	#[error("No such path")]
	NoSuchPath,
	#[error("Not a directory")]
	NotADirectory,
	#[error("Invalid argument")]
	InvalidArgument,
	#[error("Could not change working directory ({0})")]
	Other(i32),
}

impl From<Errno> for DirError {
	fn from(e: Errno) -> DirError {
		match e {
			Errno::EACCES => DirError::PermissionDenied,
			Errno::ENOENT => DirError::NoSuchPath,
			Errno::ENOTDIR => DirError::NotADirectory,
			Errno::EFAULT => DirError::InvalidArgument,
			other => DirError::Other(other as i32),
		}
	}
}

/// Pipeline-setup and builtin failures. None of these are fatal to the
/// interpreter; each aborts only the pipeline it occurred in, and the
/// read-eval loop prompts again.
#[derive(Debug, Error)]
pub enum ShellError {
	#[error("{0}")]
	Redirection(FileAccess),
	#[error("Pipe failed")]
	PipeCreation(#[source] Errno),
	#[error("{0}")]
	DirectoryChange(DirError),
	#[error("{0}: cannot be part of a pipeline")]
	BuiltinInPipeline(&'static str),
	#[error("too many pipeline stages (max {0})")]
	TooManyStages(usize),
	#[error("fork failed: {0}")]
	Fork(#[source] Errno),
}
