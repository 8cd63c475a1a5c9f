/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Fixed-layout binary codec for the coordinator ↔ worker protocol.
//!
//! There is no length prefix and no message tag: each side knows which message
//! comes next from its position in the exchange.
//!
//! ```text
//! submitter                   Quadra-O                    worker
//!     |-- JobSubmission (28B) -->|                           |
//!     |                          |<------- connect ----------|
//!     |<- WorkAssignment (28B) --|-- WorkAssignment (28B) -->|
//!     |-- PartialResult (8B) --->|<--- PartialResult (8B) ---|
//! ```
//!
//! | Message | Layout |
//! |---|---|
//! | `JobSubmission` | `lower:f64, upper:f64, step:f64, method:i32` |
//! | `WorkAssignment` | `sub_start:f64, sub_end:f64, step:f64, method:i32` |
//! | `PartialResult` | `value:f64` |
//!
//! # Byte order
//! Every field is **little-endian**.  The byte order is fixed here instead of
//! inheriting the host's, so a big-endian peer still interoperates; on x86 and
//! little-endian ARM the bytes are identical to a raw in-memory dump.

use std::io;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::job::{IntegrationJob, Method, WorkAssignment};

/// Size of a `JobSubmission` or `WorkAssignment` frame.
pub const TASK_FRAME_LEN: usize = 3 * 8 + 4;

/// Size of a `PartialResult` frame.
pub const RESULT_FRAME_LEN: usize = 8;

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors raised while encoding or decoding a frame.
#[derive(Debug, Error)]
pub enum WireError {
    /// The underlying stream failed or closed before a full frame arrived.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),

    /// The `method` field is neither `1` nor `2`.
    #[error("unknown integration method id {0} (expected 1 = Rectangle, 2 = Trapezoidal)")]
    UnknownMethod(i32),

    /// A partial result was NaN or infinite.
    #[error("{field} is not a finite number ({value})")]
    NonFinite { field: &'static str, value: f64 },
}

impl WireError {
    /// `true` for transport failures, `false` for malformed payloads.
    pub fn is_transport(&self) -> bool {
        matches!(self, WireError::Io(_))
    }
}

// ── Frame encoding ────────────────────────────────────────────────────────────

fn encode_task_frame(a: f64, b: f64, step: f64, method: Method) -> [u8; TASK_FRAME_LEN] {
    let mut buf = [0u8; TASK_FRAME_LEN];
    buf[0..8].copy_from_slice(&a.to_le_bytes());
    buf[8..16].copy_from_slice(&b.to_le_bytes());
    buf[16..24].copy_from_slice(&step.to_le_bytes());
    buf[24..28].copy_from_slice(&method.to_wire_int().to_le_bytes());
    buf
}

fn decode_task_frame(buf: &[u8; TASK_FRAME_LEN]) -> Result<(f64, f64, f64, Method), WireError> {
    let field = |at: usize| {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&buf[at..at + 8]);
        f64::from_le_bytes(raw)
    };
    let method_id = i32::from_le_bytes([buf[24], buf[25], buf[26], buf[27]]);
    let method = Method::from_wire_int(method_id).ok_or(WireError::UnknownMethod(method_id))?;
    Ok((field(0), field(8), field(16), method))
}

/// Encode a `JobSubmission` frame.
pub fn encode_job(job: &IntegrationJob) -> [u8; TASK_FRAME_LEN] {
    encode_task_frame(job.lower_bound, job.upper_bound, job.step, job.method)
}

/// Decode a `JobSubmission` frame.
///
/// The job is **not** validated here; the coordinator does that so it can
/// distinguish a malformed frame from a well-formed but invalid job.
pub fn decode_job(buf: &[u8; TASK_FRAME_LEN]) -> Result<IntegrationJob, WireError> {
    let (lower_bound, upper_bound, step, method) = decode_task_frame(buf)?;
    Ok(IntegrationJob {
        lower_bound,
        upper_bound,
        step,
        method,
    })
}

/// Encode a `WorkAssignment` frame.
pub fn encode_assignment(a: &WorkAssignment) -> [u8; TASK_FRAME_LEN] {
    encode_task_frame(a.sub_start, a.sub_end, a.step, a.method)
}

/// Decode a `WorkAssignment` frame (not validated, see [`WorkAssignment::validate`]).
pub fn decode_assignment(buf: &[u8; TASK_FRAME_LEN]) -> Result<WorkAssignment, WireError> {
    let (sub_start, sub_end, step, method) = decode_task_frame(buf)?;
    Ok(WorkAssignment {
        sub_start,
        sub_end,
        step,
        method,
    })
}

/// Encode a `PartialResult` frame.
pub fn encode_result(value: f64) -> [u8; RESULT_FRAME_LEN] {
    value.to_le_bytes()
}

/// Decode a `PartialResult` frame, rejecting non-finite values.
pub fn decode_result(buf: &[u8; RESULT_FRAME_LEN]) -> Result<f64, WireError> {
    let value = f64::from_le_bytes(*buf);
    if !value.is_finite() {
        return Err(WireError::NonFinite {
            field: "partial result",
            value,
        });
    }
    Ok(value)
}

// ── Stream helpers ────────────────────────────────────────────────────────────

async fn write_frame<W>(stream: &mut W, frame: &[u8]) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    stream.write_all(frame).await?;
    // Flush so the frame leaves immediately; the peer blocks on it.
    stream.flush().await?;
    Ok(())
}

/// Send a `JobSubmission`.
pub async fn write_job<W>(stream: &mut W, job: &IntegrationJob) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    write_frame(stream, &encode_job(job)).await
}

/// Receive a `JobSubmission`.
pub async fn read_job<R>(stream: &mut R) -> Result<IntegrationJob, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; TASK_FRAME_LEN];
    stream.read_exact(&mut buf).await?;
    decode_job(&buf)
}

/// Send a `WorkAssignment`.
pub async fn write_assignment<W>(stream: &mut W, a: &WorkAssignment) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    write_frame(stream, &encode_assignment(a)).await
}

/// Receive a `WorkAssignment`.
pub async fn read_assignment<R>(stream: &mut R) -> Result<WorkAssignment, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; TASK_FRAME_LEN];
    stream.read_exact(&mut buf).await?;
    decode_assignment(&buf)
}

/// Send a `PartialResult`.
pub async fn write_result<W>(stream: &mut W, value: f64) -> Result<(), WireError>
where
    W: AsyncWrite + Unpin,
{
    write_frame(stream, &encode_result(value)).await
}

/// Receive a `PartialResult`.
pub async fn read_result<R>(stream: &mut R) -> Result<f64, WireError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; RESULT_FRAME_LEN];
    stream.read_exact(&mut buf).await?;
    decode_result(&buf)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    fn sample_job() -> IntegrationJob {
        IntegrationJob {
            lower_bound: 2.0,
            upper_bound: 10.0,
            step: 0.01,
            method: Method::Trapezoidal,
        }
    }

    // ── Layout ────────────────────────────────────────────────────────────────

    #[test]
    fn frame_sizes_match_protocol() {
        assert_eq!(TASK_FRAME_LEN, 28);
        assert_eq!(RESULT_FRAME_LEN, 8);
    }

    #[test]
    fn job_frame_is_little_endian_field_concatenation() {
        let bytes = encode_job(&sample_job());
        assert_eq!(&bytes[0..8], &2.0f64.to_le_bytes());
        assert_eq!(&bytes[8..16], &10.0f64.to_le_bytes());
        assert_eq!(&bytes[16..24], &0.01f64.to_le_bytes());
        assert_eq!(&bytes[24..28], &2i32.to_le_bytes());
    }

    #[test]
    fn decode_job_does_not_validate() {
        // Out-of-domain bounds decode fine; validation is the caller's job.
        let job = IntegrationJob {
            lower_bound: 1.0,
            ..sample_job()
        };
        let decoded = decode_job(&encode_job(&job)).unwrap();
        assert_eq!(decoded, job);
    }

    #[test]
    fn unknown_method_is_rejected() {
        let mut bytes = encode_job(&sample_job());
        bytes[24..28].copy_from_slice(&7i32.to_le_bytes());
        assert!(matches!(
            decode_job(&bytes),
            Err(WireError::UnknownMethod(7))
        ));
        assert!(matches!(
            decode_assignment(&bytes),
            Err(WireError::UnknownMethod(7))
        ));
    }

    #[test]
    fn non_finite_result_is_rejected() {
        let err = decode_result(&encode_result(f64::NAN)).unwrap_err();
        assert!(matches!(err, WireError::NonFinite { .. }));
        assert!(!err.is_transport());
        assert!(decode_result(&encode_result(f64::INFINITY)).is_err());
    }

    // ── Streams ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn assignment_and_result_cross_a_pipe() {
        let (mut coord, mut worker) = duplex(64);
        let assignment = WorkAssignment {
            sub_start: 4.0,
            sub_end: 6.0,
            step: 0.01,
            method: Method::Rectangle,
        };

        write_assignment(&mut coord, &assignment).await.unwrap();
        let received = read_assignment(&mut worker).await.unwrap();
        assert_eq!(received, assignment);

        write_result(&mut worker, 1.25).await.unwrap();
        assert_eq!(read_result(&mut coord).await.unwrap(), 1.25);
    }

    #[tokio::test]
    async fn truncated_frame_is_a_transport_error() {
        let (mut coord, mut worker) = duplex(64);
        tokio::io::AsyncWriteExt::write_all(&mut worker, &[0u8; 5])
            .await
            .unwrap();
        drop(worker);

        let err = read_result(&mut coord).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn closed_stream_fails_job_read() {
        let (mut coord, worker) = duplex(64);
        drop(worker);
        assert!(read_job(&mut coord).await.unwrap_err().is_transport());
    }
}
