// Copyright takubokudori.
// This source code is licensed under the MIT or Apache-2.0 license.
//! REST API backend.
pub mod client;

pub use client::*;
