use std::env;
use std::path::PathBuf;

use nix::unistd;

use crate::error::DirError;

/// Commands executed inside the interpreter process. Classified once per
/// stage so dispatch stays exhaustive instead of scattered string compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
	Cd,
	Exit,
}

impl Builtin {
	pub fn name(self) -> &'static str {
		match self {
			Builtin::Cd => "cd",
			Builtin::Exit => "exit",
		}
	}
}

pub fn classify(name: &str) -> Option<Builtin> {
	match name {
		"cd" => Some(Builtin::Cd),
		"exit" => Some(Builtin::Exit),
		_ => None,
	}
}

/// Change the interpreter's working directory; subsequently spawned stages
/// inherit it. With no argument, go to $HOME.
pub fn cd(argv: &[String]) -> Result<(), DirError> {
	let target = match argv.get(1) {
		Some(arg) => PathBuf::from(arg),
		None => match env::var_os("HOME") {
			Some(home) => PathBuf::from(home),
			None => return Err(DirError::NoSuchPath),
		},
	};
	unistd::chdir(&target).map_err(DirError::from)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn recognized_builtins() {
		assert_eq!(classify("cd"), Some(Builtin::Cd));
		assert_eq!(classify("exit"), Some(Builtin::Exit));
	}

	#[test]
	fn anything_else_is_external() {
		assert_eq!(classify("ls"), None);
		assert_eq!(classify("cdd"), None);
		assert_eq!(classify("jobs"), None);
		assert_eq!(classify(""), None);
	}

	#[test]
	fn builtin_names_round_trip() {
		for b in [Builtin::Cd, Builtin::Exit] {
			assert_eq!(classify(b.name()), Some(b));
		}
	}
}
