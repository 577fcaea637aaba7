use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

use nix::sys::signal::{self, SigHandler, Signal};
use nix::sys::wait::{self, WaitPidFlag};
use nix::unistd::Pid;

/// Upper bound on stages in one pipeline. The interrupt handler may not
/// allocate, so the pid table is a fixed-size array.
pub const MAX_STAGES: usize = 64;

// The only state shared with the SIGINT handler. The count is stored after
// the pids (Release) and zeroed before the handler is detached, so the
// handler never reads a slot outside the recorded range.
static PIDS: [AtomicI32; MAX_STAGES] = [const { AtomicI32::new(0) }; MAX_STAGES];
static COUNT: AtomicUsize = AtomicUsize::new(0);

// Runs on SIGINT while a foreground pipeline is active. Restricted to
// async-signal-safe operations: atomic loads, kill(2), write(2).
extern "C" fn kill_recorded(_: libc::c_int) {
	let n = COUNT.load(Ordering::Acquire);
	for slot in PIDS.iter().take(n) {
		let pid = slot.load(Ordering::Relaxed);
		if pid > 0 {
			let _ = signal::kill(Pid::from_raw(pid), Signal::SIGKILL);
		}
	}
	// leave the next prompt on a fresh line
	let _ = unsafe { libc::write(libc::STDERR_FILENO, b"\n".as_ptr() as *const libc::c_void, 1) };
}

/// The foreground pipeline currently being waited on. Publishing arms the
/// interrupt-to-kill path; dropping clears the record and restores the
/// interpreter's SIGINT-ignored policy. Background pipelines are never
/// published here.
pub struct JobRecord {
	pids: Vec<Pid>,
}

impl JobRecord {
	pub fn publish(pids: Vec<Pid>) -> JobRecord {
		debug_assert!(pids.len() <= MAX_STAGES);
		for (slot, pid) in PIDS.iter().zip(&pids) {
			slot.store(pid.as_raw(), Ordering::Relaxed);
		}
		COUNT.store(pids.len().min(MAX_STAGES), Ordering::Release);
		unsafe {
			let _ = signal::signal(Signal::SIGINT, SigHandler::Handler(kill_recorded));
		}
		JobRecord { pids }
	}

	/// Block until every recorded process has terminated, in launch order.
	/// SIGCHLD is ignored process-wide, so each wait blocks until the child
	/// is gone and then reports ECHILD; either way the child no longer
	/// exists once the call returns.
	pub fn wait(&self) {
		for &pid in &self.pids {
			let _ = wait::waitpid(pid, Some(WaitPidFlag::WUNTRACED));
		}
		log::debug!("foreground pipeline finished: {:?}", self.pids);
	}
}

impl Drop for JobRecord {
	fn drop(&mut self) {
		unsafe {
			let _ = signal::signal(Signal::SIGINT, SigHandler::SigIgn);
		}
		COUNT.store(0, Ordering::Release);
	}
}
