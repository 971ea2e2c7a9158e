// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bourse Matching Engine
//!
//! This crate provides an in-memory, multi-instrument order matching
//! engine. It keeps resting orders per instrument and side, matches
//! crossing orders by price-time priority, and supports replace, cancel
//! and book snapshots.
//!
//! Architecture:
//! - Shared order book registry (`DashMap` of instrument -> side queue)
//! - Side queues ordered market-first, then price, then time
//! - Matching runs on the caller's thread, no global lock
//! - Optimistic fills: compare-and-swap claims plus exact removal, with
//!   bounded retry when a concurrent matcher wins

pub mod config;
pub mod engine;
pub mod logging;
pub mod matcher;
pub mod orderbook;
pub mod service;
pub mod types;

pub use engine::{EngineConfig, EngineError, MatchingEngine, OrderBooks};
pub use orderbook::{BookEntry, SideQueue};
pub use service::{OrderBookService, OrderService};
pub use types::*;
