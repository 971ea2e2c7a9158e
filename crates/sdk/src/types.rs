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

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Status message returned for every successful order operation
pub const SUCCESS_MESSAGE: &str = "Successful execution";

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
	Buy,
	Sell,
}

impl Side {
	/// The side an order of this side trades against
	pub fn opposite(self) -> Self {
		match self {
			Side::Buy => Side::Sell,
			Side::Sell => Side::Buy,
		}
	}
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
	Limit,
	Market,
}

/// Request to place or replace an order
///
/// Shape validation (non-blank instrument, positive quantity) is the
/// caller's job; the engine assumes a well-formed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
	/// Instrument symbol (e.g., "HDFC")
	pub instrument: String,
	/// Order side
	pub side: Side,
	/// Order type
	#[serde(rename = "type")]
	pub order_type: OrderType,
	/// Limit price; ignored for market orders
	pub price: Option<Decimal>,
	/// Quantity
	pub quantity: u64,
}

/// Response from a successful order operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResponse {
	/// Order ID the operation applied to
	#[serde(skip_serializing_if = "Option::is_none")]
	pub order_id: Option<u64>,
	/// Human readable status
	pub message: String,
}

impl OrderResponse {
	pub fn success(order_id: Option<u64>) -> Self {
		Self {
			order_id,
			message: SUCCESS_MESSAGE.to_string(),
		}
	}
}
