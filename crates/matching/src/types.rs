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

use bourse_sdk::types::{OrderType, Side};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::engine::EngineError;

/// Order identifier, the sole key for cancel and replace
pub type OrderId = u64;

/// How an order is priced
///
/// Market orders carry no price at all, so nothing price-aware can
/// accidentally read one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum OrderKind {
	Limit { price: Decimal },
	Market,
}

impl OrderKind {
	/// Build the kind from the wire-level type and optional price
	///
	/// A price sent with a market order is dropped.
	pub fn from_request(order_type: OrderType, price: Option<Decimal>) -> Result<Self, EngineError> {
		match order_type {
			OrderType::Market => Ok(OrderKind::Market),
			OrderType::Limit => price
				.map(|price| OrderKind::Limit { price })
				.ok_or_else(|| EngineError::InvalidOrder("limit order without a price".to_string())),
		}
	}

	pub fn order_type(&self) -> OrderType {
		match self {
			OrderKind::Limit { .. } => OrderType::Limit,
			OrderKind::Market => OrderType::Market,
		}
	}

	pub fn price(&self) -> Option<Decimal> {
		match self {
			OrderKind::Limit { price } => Some(*price),
			OrderKind::Market => None,
		}
	}

	pub fn is_market(&self) -> bool {
		matches!(self, OrderKind::Market)
	}
}

/// One order's full state
///
/// Incoming orders are owned by the caller while they are matched; once
/// rested, the book keeps its own live copy (see `orderbook::BookEntry`)
/// and hands out `Order` values only as snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	/// Unique order ID
	pub id: OrderId,
	/// Instrument symbol, partitions all book state
	pub instrument: String,
	/// Order side
	pub side: Side,
	/// Limit price or market
	#[serde(flatten)]
	pub kind: OrderKind,
	/// Remaining quantity
	pub quantity: u64,
	/// Creation time in milliseconds, final priority tie-break
	pub timestamp: u64,
}

impl Order {
	pub fn new(
		id: OrderId,
		instrument: impl Into<String>,
		side: Side,
		kind: OrderKind,
		quantity: u64,
		timestamp: u64,
	) -> Self {
		Self {
			id,
			instrument: instrument.into(),
			side,
			kind,
			quantity,
			timestamp,
		}
	}
}

/// What a single `process` call did with an incoming order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutcome {
	/// The incoming order's ID
	pub order_id: OrderId,
	/// Quantity matched against resting orders
	pub filled: u64,
	/// Quantity left resting on the book (0 when fully filled)
	pub rested: u64,
	/// Lost races detected and retried along the way
	pub lost_races: u32,
}

impl ProcessOutcome {
	pub fn fully_filled(&self) -> bool {
		self.rested == 0
	}
}
