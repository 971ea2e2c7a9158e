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

use std::sync::Arc;

use bourse_sdk::types::Side;
use dashmap::DashMap;

use crate::orderbook::SideQueue;

/// Order book registry shared by every engine caller
///
/// This structure holds all resting state of the engine:
/// - Buy side queues, keyed by instrument
/// - Sell side queues, keyed by instrument
///
/// Queues are created lazily on the first order that rests for an
/// instrument and are never dropped, so an instrument that emptied out
/// still has (empty) entries. Build one per process and share it through
/// an `Arc`.
#[derive(Debug, Default)]
pub struct OrderBooks {
	buys: DashMap<String, Arc<SideQueue>>,
	sells: DashMap<String, Arc<SideQueue>>,
}

impl OrderBooks {
	pub fn new() -> Self {
		Self::default()
	}

	/// All queues for one side
	pub fn queues(&self, side: Side) -> &DashMap<String, Arc<SideQueue>> {
		match side {
			Side::Buy => &self.buys,
			Side::Sell => &self.sells,
		}
	}

	/// Queue for (side, instrument), if one was ever created
	///
	/// The handle is cloned out so no registry shard lock is held while
	/// the caller works on the queue.
	pub fn get(&self, side: Side, instrument: &str) -> Option<Arc<SideQueue>> {
		self.queues(side)
			.get(instrument)
			.map(|queue| queue.value().clone())
	}

	/// Queue for (side, instrument), created on first use
	pub fn get_or_create(&self, side: Side, instrument: &str) -> Arc<SideQueue> {
		if let Some(queue) = self.get(side, instrument) {
			return queue;
		}
		self.queues(side)
			.entry(instrument.to_string())
			.or_insert_with(|| Arc::new(SideQueue::new(side)))
			.value()
			.clone()
	}

	/// Number of instruments with a queue on either side
	pub fn instrument_count(&self) -> usize {
		let sell_only = self
			.sells
			.iter()
			.filter(|entry| !self.buys.contains_key(entry.key()))
			.count();
		self.buys.len() + sell_only
	}

	/// Reset to initial conditions
	///
	/// Intended for test isolation; callers still holding a queue handle
	/// keep writing into a queue the registry no longer knows.
	pub fn clear(&self) {
		self.buys.clear();
		self.sells.clear();
	}
}
