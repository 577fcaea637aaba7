use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Pipeline, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
	#[error("empty command")]
	EmptyCommand,
	#[error("missing redirect target")]
	MissingRedirectTarget,
	#[error("duplicate input redirect")]
	DuplicateInput,
	#[error("duplicate output redirect")]
	DuplicateOutput,
	#[error("unexpected character after '&': '{0}'")]
	TrailingAfterBackground(char),
	#[error("unexpected character: '{0}'")]
	UnexpectedChar(char),
}

struct Parser<'a> {
	line: &'a [u8],
	i: usize,
}

impl<'a> Parser<'a> {
	fn proceed_while<F>(&mut self, f: F) where F: Fn(u8) -> bool {
		while let Some(c) = self.line.get(self.i) {
			if !f(*c) { break; }
			self.i += 1;
		}
	}

	fn is_whitespace(c: u8) -> bool {
		matches!(c, b' ' | b'\t' | b'\n')
	}

	fn is_word(c: u8) -> bool {
		!matches!(c, b'<' | b'>' | b'&' | b'|') && !Parser::is_whitespace(c)
	}

	fn skip_whitespace(&mut self) {
		self.proceed_while(Parser::is_whitespace);
	}

	fn read_word(&mut self) -> &'a [u8] {
		let orig = self.i;
		self.proceed_while(Parser::is_word);
		&self.line[orig .. self.i]
	}

	fn read_redirect_target(&mut self) -> Result<PathBuf, ParseError> {
		self.skip_whitespace();
		let word = self.read_word();
		if word.is_empty() {
			return Err(ParseError::MissingRedirectTarget);
		}
		Ok(PathBuf::from(String::from_utf8_lossy(word).into_owned()))
	}

	// Redirects may appear anywhere in a stage; they always apply to the
	// pipeline as a whole (input to the first stage, output from the last).
	fn parse_stage(&mut self, input: &mut Option<PathBuf>, output: &mut Option<PathBuf>) -> Result<Stage, ParseError> {
		let mut argv: Vec<String> = vec![];
		loop {
			self.skip_whitespace();
			match self.line.get(self.i) {
				Some(&b'<') => {
					self.i += 1;
					if input.is_some() {
						return Err(ParseError::DuplicateInput);
					}
					*input = Some(self.read_redirect_target()?);
				},
				Some(&b'>') => {
					self.i += 1;
					if output.is_some() {
						return Err(ParseError::DuplicateOutput);
					}
					*output = Some(self.read_redirect_target()?);
				},
				_ => {
					let word = self.read_word();
					if word.is_empty() {
						break;
					}
					argv.push(String::from_utf8_lossy(word).into_owned());
				},
			}
		}
		if argv.is_empty() {
			return Err(ParseError::EmptyCommand);
		}
		Ok(Stage { argv })
	}

	fn parse_pipeline(&mut self) -> Result<Pipeline, ParseError> {
		let mut stages: Vec<Stage> = vec![];
		let mut input = None;
		let mut output = None;
		let mut background = false;
		loop {
			stages.push(self.parse_stage(&mut input, &mut output)?);
			match self.line.get(self.i) {
				Some(&b'|') => { self.i += 1; },
				Some(&b'&') => {
					self.i += 1;
					background = true;
					self.skip_whitespace();
					if let Some(&c) = self.line.get(self.i) {
						return Err(ParseError::TrailingAfterBackground(c as char));
					}
					break;
				},
				Some(&c) => { return Err(ParseError::UnexpectedChar(c as char)); },
				None => { break; },
			}
		}
		Ok(Pipeline { stages, input, output, background })
	}
}

/// Parse one trimmed, non-empty line into a structured pipeline. Stages come
/// out in execution order, leftmost first.
pub fn parse(line: &str) -> Result<Pipeline, ParseError> {
	let mut parser = Parser { line: line.as_bytes(), i: 0 };
	parser.parse_pipeline()
}
