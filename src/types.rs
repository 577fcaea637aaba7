use std::path::PathBuf;

/// One program invocation within a pipeline. `argv[0]` is the program name;
/// the parser never produces an empty argv.
#[derive(Debug, PartialEq, Eq)]
pub struct Stage {
	pub argv: Vec<String>,
}

/// A parsed command line. Stages are ordered leftmost (first on the command
/// line) to rightmost; `input` feeds the first stage, `output` drains the
/// last. Invariant: `stages` is non-empty.
#[derive(Debug, PartialEq, Eq)]
pub struct Pipeline {
	pub stages: Vec<Stage>,
	pub input: Option<PathBuf>,
	pub output: Option<PathBuf>,
	pub background: bool,
}
