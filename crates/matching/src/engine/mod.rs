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

mod state;

pub use state::OrderBooks;

use std::sync::Arc;

use bourse_sdk::types::Side;
use crossbeam::utils::Backoff;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
	config::DEFAULT_MAX_RETRIES,
	matcher::{self, FillResult},
	types::{Order, OrderId, ProcessOutcome},
};

/// Error types for matching engine operations
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Order not found: {0}")]
	OrderNotFound(String),
	#[error("Invalid order: {0}")]
	InvalidOrder(String),
	/// Matching gave up; `filled` units had already traded and stay
	/// traded, the rest of the order was neither filled nor rested
	#[error("Order {order_id} lost {attempts} consecutive races after filling {filled}, giving up")]
	RetriesExhausted {
		order_id: OrderId,
		attempts: u32,
		filled: u64,
	},
}

/// Configuration for the matching engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
	/// Consecutive lost races tolerated for one order before failing it
	pub max_retries: u32,
	pub verbose_logging: bool,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			max_retries: DEFAULT_MAX_RETRIES,
			verbose_logging: false,
		}
	}
}

/// Price-time priority matching over a shared order book registry
///
/// The engine itself holds no order state: every call works directly on
/// the `OrderBooks` it was built with, on the caller's thread, with no
/// global lock. Any number of threads may call any operation at once,
/// for the same or different instruments.
///
/// Concurrency model:
/// - Matchers peek the best opposing order optimistically
/// - The resting quantity is claimed with compare-and-swap, and a fully
///   consumed order must then be removed with `remove_exact`
/// - Losing either race undoes the step and restarts matching from the
///   top, with backoff, up to `max_retries` consecutive times
#[derive(Debug, Clone)]
pub struct MatchingEngine {
	books: Arc<OrderBooks>,
	config: EngineConfig,
}

impl MatchingEngine {
	pub fn new(books: Arc<OrderBooks>, config: EngineConfig) -> Self {
		info!(target: "engine", max_retries = config.max_retries, "Matching engine created");
		Self { books, config }
	}

	/// The registry this engine works on
	pub fn books(&self) -> &Arc<OrderBooks> {
		&self.books
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	/// Match a new order against the book and rest whatever is left
	///
	/// Consumes opposing orders best-first while they cross. Stops when
	/// the order is fully filled (nothing rests) or when the opposing
	/// side is empty or no longer crosses (the remainder rests on the
	/// order's own side).
	pub fn process(&self, order: Order) -> Result<ProcessOutcome, EngineError> {
		let order_id = order.id;
		let quantity = order.quantity;

		if self.config.verbose_logging {
			debug!(
				target: "engine",
				order_id,
				instrument = %order.instrument,
				side = ?order.side,
				kind = ?order.kind,
				quantity,
				"Processing order"
			);
		}

		if quantity == 0 {
			return Ok(ProcessOutcome {
				order_id,
				filled: 0,
				rested: 0,
				lost_races: 0,
			});
		}

		let (rested, lost_races) = self.match_order(order)?;
		let outcome = ProcessOutcome {
			order_id,
			filled: quantity - rested,
			rested,
			lost_races,
		};

		if self.config.verbose_logging {
			debug!(
				target: "engine",
				order_id,
				filled = outcome.filled,
				rested = outcome.rested,
				lost_races,
				"Order processed"
			);
		}

		Ok(outcome)
	}

	/// Matching loop; returns (rested quantity, lost races)
	fn match_order(&self, mut incoming: Order) -> Result<(u64, u32), EngineError> {
		let original = incoming.quantity;
		let opposite = incoming.side.opposite();
		let backoff = Backoff::new();
		let mut lost_races = 0u32;
		let mut consecutive = 0u32;

		loop {
			let opposing = self.books.get(opposite, &incoming.instrument);
			let best = opposing.as_ref().and_then(|queue| queue.peek_best());

			let (Some(queue), Some(best)) = (opposing, best) else {
				return Ok((self.rest(incoming), lost_races));
			};

			if !matcher::crosses(&incoming, &best) {
				return Ok((self.rest(incoming), lost_races));
			}

			match matcher::fill_step(&mut incoming, &queue, &best) {
				FillResult::Filled { quantity } => {
					consecutive = 0;
					backoff.reset();

					if self.config.verbose_logging {
						debug!(
							target: "engine",
							order_id = incoming.id,
							maker_order_id = best.id(),
							quantity,
							remaining = incoming.quantity,
							"Orders matched"
						);
					}

					if incoming.quantity == 0 {
						return Ok((0, lost_races));
					}
				}
				FillResult::LostRace => {
					lost_races = lost_races.saturating_add(1);
					consecutive += 1;

					if consecutive > self.config.max_retries {
						let filled = original - incoming.quantity;
						warn!(
							target: "engine",
							order_id = incoming.id,
							attempts = consecutive,
							filled,
							"Retry limit reached"
						);
						return Err(EngineError::RetriesExhausted {
							order_id: incoming.id,
							attempts: consecutive,
							filled,
						});
					}

					debug!(
						target: "engine",
						order_id = incoming.id,
						maker_order_id = best.id(),
						quantity = incoming.quantity,
						"Lost race, retrying"
					);
					backoff.snooze();
				}
			}
		}
	}

	/// Put the remainder on its own side; returns the rested quantity
	fn rest(&self, order: Order) -> u64 {
		let quantity = order.quantity;
		self.books
			.get_or_create(order.side, &order.instrument)
			.insert(order);
		quantity
	}

	/// Replace a resting order in place
	///
	/// The order with the same id on the same side and instrument is
	/// swapped for `order` and re-positioned by its priority. Matching is
	/// not re-run.
	pub fn update(&self, order: Order) -> Result<(), EngineError> {
		let order_id = order.id;
		let replaced = self
			.books
			.get(order.side, &order.instrument)
			.is_some_and(|queue| queue.replace_by_id(order_id, order));

		if !replaced {
			warn!(target: "engine", order_id, "Order doesn't exist for update");
			return Err(EngineError::OrderNotFound(format!(
				"order {} doesn't exist for update",
				order_id
			)));
		}

		if self.config.verbose_logging {
			debug!(target: "engine", order_id, "Order replaced");
		}
		Ok(())
	}

	/// Cancel every resting order with this id, across all instruments
	pub fn delete(&self, order_id: OrderId) -> Result<(), EngineError> {
		let mut removed = false;
		for side in [Side::Buy, Side::Sell] {
			for queue in self.books.queues(side).iter() {
				removed |= queue.value().remove_by_id(order_id);
			}
		}

		if !removed {
			warn!(target: "engine", order_id, "Order doesn't exist for removal");
			return Err(EngineError::OrderNotFound(format!(
				"order {} doesn't exist for removal",
				order_id
			)));
		}

		if self.config.verbose_logging {
			debug!(target: "engine", order_id, "Order cancelled");
		}
		Ok(())
	}

	/// Resting orders for one instrument, buy side first then sell side
	pub fn retrieve(&self, instrument: &str) -> Result<Vec<Order>, EngineError> {
		let mut book: Vec<Order> = self
			.books
			.get(Side::Buy, instrument)
			.map(|queue| queue.snapshot())
			.unwrap_or_default();

		if let Some(sells) = self.books.get(Side::Sell, instrument) {
			book.extend(sells.snapshot());
		}

		if book.is_empty() {
			warn!(target: "engine", instrument, "No order book exists");
			return Err(EngineError::OrderNotFound(format!(
				"no order book exists for {}",
				instrument
			)));
		}
		Ok(book)
	}
}
