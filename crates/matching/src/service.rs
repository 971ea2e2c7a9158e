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

use std::time::SystemTime;

use bourse_sdk::types::{OrderRequest, OrderResponse};
use tracing::info;

use crate::{
	engine::{EngineError, MatchingEngine},
	types::{Order, OrderId, OrderKind},
};

/// Operations a transport layer calls into the engine with
///
/// Requests are expected to be shape-validated already (non-blank
/// instrument, positive quantity). Implementations must be shareable
/// across request handler threads.
pub trait OrderBookService: Send + Sync {
	/// Create an order and match it; returns the assigned order id
	fn submit_order(&self, request: OrderRequest) -> Result<OrderResponse, EngineError>;

	/// Replace the resting order `order_id` with a new body
	fn replace_order(
		&self,
		order_id: OrderId,
		request: OrderRequest,
	) -> Result<OrderResponse, EngineError>;

	/// Cancel `order_id` wherever it rests
	fn cancel_order(&self, order_id: OrderId) -> Result<OrderResponse, EngineError>;

	/// Resting orders for an instrument, buy side then sell side
	fn get_book(&self, instrument: &str) -> Result<Vec<Order>, EngineError>;
}

/// `OrderBookService` backed by a `MatchingEngine`
///
/// Assigns ids and creation timestamps, then delegates to the engine.
#[derive(Debug, Clone)]
pub struct OrderService {
	engine: MatchingEngine,
}

impl OrderService {
	pub fn new(engine: MatchingEngine) -> Self {
		Self { engine }
	}

	pub fn engine(&self) -> &MatchingEngine {
		&self.engine
	}

	fn build_order(id: OrderId, request: OrderRequest) -> Result<Order, EngineError> {
		let kind = OrderKind::from_request(request.order_type, request.price)?;
		Ok(Order::new(
			id,
			request.instrument,
			request.side,
			kind,
			request.quantity,
			timestamp_millis(),
		))
	}
}

impl OrderBookService for OrderService {
	fn submit_order(&self, request: OrderRequest) -> Result<OrderResponse, EngineError> {
		let order = Self::build_order(new_order_id(), request)?;
		let order_id = order.id;

		info!(
			target: "engine",
			order_id,
			instrument = %order.instrument,
			side = ?order.side,
			"Order submitted"
		);

		self.engine.process(order)?;
		Ok(OrderResponse::success(Some(order_id)))
	}

	fn replace_order(
		&self,
		order_id: OrderId,
		request: OrderRequest,
	) -> Result<OrderResponse, EngineError> {
		let order = Self::build_order(order_id, request)?;
		self.engine.update(order)?;

		info!(target: "engine", order_id, "Order replaced");
		Ok(OrderResponse::success(Some(order_id)))
	}

	fn cancel_order(&self, order_id: OrderId) -> Result<OrderResponse, EngineError> {
		self.engine.delete(order_id)?;

		info!(target: "engine", order_id, "Order cancelled");
		Ok(OrderResponse::success(None))
	}

	fn get_book(&self, instrument: &str) -> Result<Vec<Order>, EngineError> {
		self.engine.retrieve(instrument)
	}
}

/// Random 64-bit order id
fn new_order_id() -> OrderId {
	uuid::Uuid::new_v4().as_u64_pair().0
}

/// Wall clock in milliseconds since the Unix epoch
fn timestamp_millis() -> u64 {
	SystemTime::now()
		.duration_since(SystemTime::UNIX_EPOCH)
		.map(|elapsed| elapsed.as_millis() as u64)
		.unwrap_or_default()
}
