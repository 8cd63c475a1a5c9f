/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Where the submitting worker gets its job from.
//!
//! [`PromptJobSource`] asks the operator field by field and starts over on
//! any invalid answer.  [`FixedJobSource`] uses values given on the command
//! line and only falls back to prompting when they are invalid.

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

use tracing::warn;

use quadra_o::job::{IntegrationJob, JobError, Method, MIN_LOWER_BOUND};

/// Produces the job a submitter sends to the coordinator.
///
/// Implementations may block (e.g. on stdin); callers run them off the async
/// runtime.
pub trait JobSource: Send {
    /// Return a job that already passed [`IntegrationJob::validate`].
    ///
    /// # Errors
    /// Only for input failures, e.g. the operator closed stdin.
    fn next_job(&mut self) -> io::Result<IntegrationJob>;
}

// ── PromptJobSource ───────────────────────────────────────────────────────────

/// Interactive line-oriented prompt.
pub struct PromptJobSource<R, W> {
    input: R,
    output: W,
}

impl PromptJobSource<BufReader<Stdin>, Stdout> {
    /// Prompt on the process's stdin / stdout.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptJobSource<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and read one trimmed answer line.
    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before the job was complete",
            ));
        }
        Ok(line.trim().to_string())
    }

    /// One pass over all four questions.  The inner `Err` is an invalid answer.
    fn ask_once(&mut self) -> io::Result<Result<IntegrationJob, String>> {
        let lower = match parse_number(&self.ask("Enter the lower limit of integration (>= 2): ")?) {
            Ok(v) if v >= MIN_LOWER_BOUND => v,
            Ok(v) => return Ok(Err(JobError::LowerBoundOutOfDomain { lower: v }.to_string())),
            Err(e) => return Ok(Err(e)),
        };

        let upper = match parse_number(&self.ask("Enter the upper limit of integration: ")?) {
            Ok(v) if v > lower => v,
            Ok(v) => {
                return Ok(Err(JobError::EmptyInterval { lower, upper: v }.to_string()));
            }
            Err(e) => return Ok(Err(e)),
        };

        let step = match parse_number(&self.ask("Enter the integration step: ")?) {
            Ok(v) if v > 0.0 => v,
            Ok(v) => return Ok(Err(JobError::NonPositiveStep { step: v }.to_string())),
            Err(e) => return Ok(Err(e)),
        };

        let method =
            match parse_method(&self.ask("Choose integration method (1: Rectangle, 2: Trapezoidal): ")?) {
                Ok(m) => m,
                Err(e) => return Ok(Err(e)),
            };

        Ok(IntegrationJob::new(lower, upper, step, method).map_err(|e| e.to_string()))
    }
}

impl<R, W> JobSource for PromptJobSource<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn next_job(&mut self) -> io::Result<IntegrationJob> {
        loop {
            match self.ask_once()? {
                Ok(job) => return Ok(job),
                Err(reason) => {
                    writeln!(self.output, "Invalid input: {reason}")?;
                    writeln!(self.output, "Please enter correct values.\n")?;
                }
            }
        }
    }
}

fn parse_number(answer: &str) -> Result<f64, String> {
    answer
        .parse::<f64>()
        .map_err(|_| format!("'{answer}' is not a number"))
}

fn parse_method(answer: &str) -> Result<Method, String> {
    answer
        .parse::<i32>()
        .ok()
        .and_then(Method::from_wire_int)
        .ok_or_else(|| "enter 1 for Rectangle or 2 for Trapezoidal".to_string())
}

// ── FixedJobSource ────────────────────────────────────────────────────────────

/// Job given up front (e.g. from CLI flags), with a fallback for bad values.
pub struct FixedJobSource<F> {
    candidate: IntegrationJob,
    fallback: F,
}

impl<F: JobSource> FixedJobSource<F> {
    pub fn new(candidate: IntegrationJob, fallback: F) -> Self {
        Self {
            candidate,
            fallback,
        }
    }
}

impl<F: JobSource> JobSource for FixedJobSource<F> {
    fn next_job(&mut self) -> io::Result<IntegrationJob> {
        match self.candidate.validate() {
            Ok(()) => Ok(self.candidate),
            Err(e) => {
                warn!(job = %self.candidate, "Job from command line is invalid ({e}), prompting instead");
                self.fallback.next_job()
            }
        }
    }
}

// ── Role question ─────────────────────────────────────────────────────────────

/// Ask whether this worker submits the job.  Re-asks until the answer is `1`
/// (submitter) or `2` (plain worker).
pub fn ask_is_submitter<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<bool> {
    loop {
        write!(output, "Enter 1 if you are the first client, otherwise enter 2: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before the role was chosen",
            ));
        }
        match line.trim() {
            "1" => return Ok(true),
            "2" => return Ok(false),
            other => writeln!(output, "Invalid choice '{other}', enter 1 or 2.")?,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
