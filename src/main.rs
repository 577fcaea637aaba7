mod builtin;
mod error;
mod eval;
mod job;
mod logging;
mod parser;
mod types;
mod wiring;

use std::io;
use io::BufRead;
use io::Write;

use nix::sys::signal::{self, SigHandler, Signal};

const PROMPT: &[u8] = b"ush> ";

fn main() {
	logging::init();
	// SIGINT only matters during a foreground wait, where the JobRecord
	// arms a kill handler; SIGCHLD stays ignored so terminated background
	// children are reaped by the kernel instead of becoming zombies
	unsafe {
		let _ = signal::signal(Signal::SIGINT, SigHandler::SigIgn);
		let _ = signal::signal(Signal::SIGCHLD, SigHandler::SigIgn);
	}

	let mut stdout = io::stdout();
	let stdin = io::stdin();
	let mut stdin_locked = stdin.lock();
	loop {
		let _ = stdout.write_all(PROMPT);
		let _ = stdout.flush();
		let mut line = String::new();
		match stdin_locked.read_line(&mut line) {
			// end of input terminates the session
			Ok(0) | Err(_) => break,
			Ok(_) => {},
		}
		let line = line.trim();
		if line.is_empty() {
			continue;
		}
		match parser::parse(line) {
			Ok(pipeline) => {
				log::debug!("parsed: {:?}", pipeline);
				eval::eval(&pipeline);
			},
			Err(e) => {
				let _ = writeln!(io::stderr(), "parse error: {}", e);
			},
		}
	}
}
