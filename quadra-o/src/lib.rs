/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Quadra-O – distributed integration coordinator
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── job           – IntegrationJob / WorkAssignment model, validation
//! ├── quadrature    – rectangle & trapezoidal rules over 1/ln(x)
//! ├── wire          – fixed-layout little-endian frame codec
//! ├── config/       – YAML + CLI coordinator settings
//! └── coordinator/  – registration window, partitioning, dispatch, aggregation
//! ```
//!
//! `job`, `quadrature` and `wire` are shared with the Quadra-N worker crate.

pub mod config;
pub mod coordinator;
pub mod job;
pub mod quadrature;
pub mod wire;
