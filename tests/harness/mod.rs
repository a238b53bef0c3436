// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for points-farming simulation.
//!
//! Replays click patterns an abuser would use to inflate points and
//! records what the limiter and the ledger made of each click.

pub mod attacks;
pub mod generators;
pub mod metrics;
