use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

fn shell() -> Command {
	Command::new(env!("CARGO_BIN_EXE_ush"))
}

fn run_script_in(script: &str, dir: Option<&Path>) -> Output {
	let mut cmd = shell();
	if let Some(dir) = dir {
		cmd.current_dir(dir);
	}
	let mut child = cmd
		.stdin(Stdio::piped())
		.stdout(Stdio::piped())
		.stderr(Stdio::piped())
		.spawn()
		.expect("spawn shell");
	child
		.stdin
		.as_mut()
		.expect("piped stdin")
		.write_all(script.as_bytes())
		.expect("write script");
	child.wait_with_output().expect("collect output")
}

fn run_script(script: &str) -> Output {
	run_script_in(script, None)
}

fn stdout_of(out: &Output) -> String {
	String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr_of(out: &Output) -> String {
	String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn runs_a_simple_command() {
	let out = run_script("echo hello\n");
	assert!(out.status.success());
	assert!(stdout_of(&out).contains("hello"));
}

#[test]
fn end_of_input_exits_with_status_zero() {
	let out = run_script("");
	assert_eq!(out.status.code(), Some(0));
}

#[test]
fn pipes_connect_adjacent_stages() {
	let out = run_script("echo one two three | wc -w\n");
	assert!(stdout_of(&out).contains('3'));
}

#[test]
fn three_stage_pipeline_flows_left_to_right() {
	let out = run_script("echo banana | tr a-z A-Z | tr N X\n");
	assert!(stdout_of(&out).contains("BAXAXA"));
}

#[test]
fn input_and_output_redirection() {
	let dir = tempfile::tempdir().unwrap();
	fs::write(dir.path().join("in.txt"), "pear\napple\n").unwrap();
	let out = run_script_in("sort < in.txt > out.txt\n", Some(dir.path()));
	assert!(out.status.success());
	assert_eq!(fs::read_to_string(dir.path().join("out.txt")).unwrap(), "apple\npear\n");
}

#[test]
fn redirected_input_feeds_a_pipeline() {
	let dir = tempfile::tempdir().unwrap();
	fs::write(dir.path().join("in.txt"), "aa\nbb\naa\n").unwrap();
	let out = run_script_in("grep aa < in.txt | wc -l\n", Some(dir.path()));
	assert!(stdout_of(&out).contains('2'));
}

#[test]
fn missing_input_file_reports_and_spawns_nothing() {
	let dir = tempfile::tempdir().unwrap();
	let out = run_script_in("wc -l < nope.txt > out.txt\n", Some(dir.path()));
	assert!(stderr_of(&out).contains("No such file"));
	// aborted before the output file was created
	assert!(!dir.path().join("out.txt").exists());
}

#[test]
fn output_path_that_is_a_directory_reports() {
	let dir = tempfile::tempdir().unwrap();
	fs::create_dir(dir.path().join("sub")).unwrap();
	let out = run_script_in("echo hi > sub\n", Some(dir.path()));
	assert!(stderr_of(&out).contains("File is a directory"));
}

#[test]
fn unknown_program_reports_without_killing_the_shell() {
	let out = run_script("no_such_program_xyz\necho still here\n");
	assert!(stderr_of(&out).contains("Could not find executable: no_such_program_xyz"));
	assert!(stdout_of(&out).contains("still here"));
	assert!(out.status.success());
}

#[test]
fn cd_changes_directory_for_spawned_children() {
	let dir = tempfile::tempdir().unwrap();
	let target = dir.path().canonicalize().unwrap();
	let script = format!("cd {}\npwd\n", target.display());
	let out = run_script(&script);
	assert!(stdout_of(&out).contains(&target.display().to_string()));
}

#[test]
fn cd_to_a_bad_path_reports_and_keeps_cwd() {
	let dir = tempfile::tempdir().unwrap();
	let here = dir.path().canonicalize().unwrap();
	let out = run_script_in("cd /no/such/dir_xyz\npwd\n", Some(&here));
	assert!(stderr_of(&out).contains("No such path"));
	assert!(stdout_of(&out).contains(&here.display().to_string()));
}

#[test]
fn builtin_inside_a_pipeline_is_refused() {
	let out = run_script("cd / | echo hi\n");
	assert!(stderr_of(&out).contains("cannot be part of a pipeline"));
}

#[test]
fn exit_terminates_immediately_with_status_zero() {
	let out = run_script("exit\necho after\n");
	assert_eq!(out.status.code(), Some(0));
	assert!(!stdout_of(&out).contains("after"));
}

#[test]
fn background_pipeline_returns_to_the_prompt_immediately() {
	// stdout must not be piped here: the background sleep inherits it and
	// would keep the read side open long after the shell exits
	let started = Instant::now();
	let mut child = shell()
		.stdin(Stdio::piped())
		.stdout(Stdio::null())
		.stderr(Stdio::null())
		.spawn()
		.expect("spawn shell");
	child
		.stdin
		.take()
		.expect("piped stdin")
		.write_all(b"sleep 5 &\nexit\n")
		.expect("write script");
	let status = child.wait().expect("wait");
	assert_eq!(status.code(), Some(0));
	assert!(started.elapsed() < Duration::from_secs(4), "shell blocked on a background stage");
}

#[test]
fn interrupt_kills_the_whole_foreground_pipeline() {
	let started = Instant::now();
	let mut child = shell()
		.stdin(Stdio::piped())
		.stdout(Stdio::null())
		.stderr(Stdio::null())
		.spawn()
		.expect("spawn shell");
	let mut stdin = child.stdin.take().expect("piped stdin");
	stdin.write_all(b"sleep 30 | sleep 30\n").expect("write script");
	stdin.flush().unwrap();
	// give the shell time to fork both stages and enter the wait
	std::thread::sleep(Duration::from_millis(500));
	kill(Pid::from_raw(child.id() as i32), Signal::SIGINT).expect("signal shell");
	drop(stdin);
	let status = child.wait().expect("wait");
	assert_eq!(status.code(), Some(0));
	assert!(started.elapsed() < Duration::from_secs(10), "interrupt did not cancel the wait");
}
