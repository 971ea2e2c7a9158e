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

use bourse_matching::{Order, OrderId, OrderKind};
use bourse_sdk::types::Side;
use rust_decimal::Decimal;

pub const INSTRUMENT: &str = "HDFC";

#[derive(Clone, Copy)]
pub enum Scenario {
	/// Bids and asks in disjoint bands, every order rests
	NoCross,
	/// Alternating sides at one price, almost every order fills
	CrossHeavy,
	/// Small crossing orders with a market order every tenth, all on one
	/// best level so threads keep colliding on the same head entry
	Contended,
}

pub struct OrderGenerator {
	thread_id: u64,
	counter: u64,
	scenario: Scenario,
}

impl OrderGenerator {
	pub fn new(thread_id: usize, scenario: Scenario) -> Self {
		Self {
			thread_id: thread_id as u64,
			counter: 0,
			scenario,
		}
	}

	fn next_id(&self) -> OrderId {
		(self.thread_id << 40) | self.counter
	}

	fn side(&self) -> Side {
		if self.counter.is_multiple_of(2) {
			Side::Buy
		} else {
			Side::Sell
		}
	}

	fn limit(price: u64) -> OrderKind {
		OrderKind::Limit {
			price: Decimal::from(price),
		}
	}

	pub fn next_order(&mut self) -> Order {
		self.counter += 1;
		let id = self.next_id();
		let side = self.side();

		let (kind, quantity) = match self.scenario {
			Scenario::NoCross => {
				let price = match side {
					Side::Buy => 44_000 + self.counter % 1_000,
					Side::Sell => 56_000 + self.counter % 1_000,
				};
				(Self::limit(price), 1)
			}
			Scenario::CrossHeavy => (Self::limit(50_000), 10),
			Scenario::Contended => {
				let kind = if self.counter.is_multiple_of(10) {
					OrderKind::Market
				} else {
					Self::limit(50_000)
				};
				(kind, 1 + self.counter % 3)
			}
		};

		Order::new(id, INSTRUMENT, side, kind, quantity, self.counter)
	}
}
