/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Quadra-N – integration worker
//!
//! ```text
//! lib.rs
//! ├── client   – connect-with-retry, run_worker, ClientError
//! └── prompt   – JobSource implementations for the submitting worker
//! ```

pub mod client;
pub mod prompt;
