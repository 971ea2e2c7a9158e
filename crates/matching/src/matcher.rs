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

use std::{cmp::Ordering, sync::Arc};

use bourse_sdk::types::Side;

use crate::{
	orderbook::{BookEntry, SideQueue},
	types::{Order, OrderKind},
};

/// Result of one fill attempt against a resting order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillResult {
	/// Quantity traded; both orders' quantities have been updated
	Filled { quantity: u64 },
	/// Another caller changed or removed the resting order first.
	/// Both quantities are back to what they were before the attempt.
	LostRace,
}

/// Whether `incoming` may trade against `resting`
///
/// An incoming market order crosses anything. A resting market order
/// accepts any price, so it crosses too. Two limit orders cross when
/// the bid is at or above the ask.
pub fn crosses(incoming: &Order, resting: &BookEntry) -> bool {
	match (incoming.kind, resting.kind()) {
		(OrderKind::Market, _) | (_, OrderKind::Market) => true,
		(OrderKind::Limit { price }, OrderKind::Limit { price: resting_price }) => {
			match incoming.side {
				Side::Buy => price >= resting_price,
				Side::Sell => price <= resting_price,
			}
		}
	}
}

/// Trade `incoming` against the peeked `resting` entry of `queue`
///
/// Three cases, by quantity:
/// - incoming larger: resting is drained to zero and removed, incoming
///   keeps the difference
/// - incoming smaller: resting is reduced and stays queued, incoming is
///   done
/// - equal: both go to zero and resting is removed
///
/// The resting quantity is claimed with compare-and-swap before anything
/// else changes. If the claim fails, or the entry has already left the
/// queue (removed by another matcher, cancelled or replaced), the step is
/// undone and `LostRace` is returned.
pub fn fill_step(incoming: &mut Order, queue: &SideQueue, resting: &Arc<BookEntry>) -> FillResult {
	let original = incoming.quantity;
	let resting_quantity = resting.remaining();

	// Someone is between draining this entry and removing it
	if resting_quantity == 0 {
		return FillResult::LostRace;
	}

	match original.cmp(&resting_quantity) {
		Ordering::Less => {
			if !resting.try_claim(resting_quantity, resting_quantity - original) {
				return FillResult::LostRace;
			}
			// A cancel or replace may have detached the entry after the peek
			if !queue.contains_exact(resting) {
				resting.release(original);
				return FillResult::LostRace;
			}
			incoming.quantity = 0;
			FillResult::Filled { quantity: original }
		}
		Ordering::Greater | Ordering::Equal => {
			if !resting.try_claim(resting_quantity, 0) {
				return FillResult::LostRace;
			}
			incoming.quantity = original - resting_quantity;

			if queue.remove_exact(resting) {
				FillResult::Filled {
					quantity: resting_quantity,
				}
			} else {
				resting.restore(resting_quantity);
				incoming.quantity = original;
				FillResult::LostRace
			}
		}
	}
}
