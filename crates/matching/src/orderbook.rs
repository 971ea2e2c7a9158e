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

use std::{
	collections::BTreeMap,
	sync::{
		Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
		atomic::{AtomicU64, Ordering},
	},
};

use bourse_sdk::types::Side;
use rust_decimal::Decimal;

use crate::types::{Order, OrderId, OrderKind};

/// Matching precedence of a resting order
///
/// Variant order puts every market order ahead of every limit order.
/// Buy prices are stored negated so that ascending key order is
/// "highest bid first" on the buy side and "lowest ask first" on the
/// sell side. `seq` is unique per queue, which makes the key identify
/// exactly one entry and keeps arrival order for equal timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Priority {
	Market { timestamp: u64, seq: u64 },
	Limit { price: Decimal, timestamp: u64, seq: u64 },
}

impl Priority {
	fn new(side: Side, kind: OrderKind, timestamp: u64, seq: u64) -> Self {
		match kind {
			OrderKind::Market => Priority::Market { timestamp, seq },
			OrderKind::Limit { price } => {
				let price = match side {
					Side::Buy => -price,
					Side::Sell => price,
				};
				Priority::Limit {
					price,
					timestamp,
					seq,
				}
			}
		}
	}
}

/// A resting order as held by a side queue
///
/// Everything except the remaining quantity is fixed at insertion. The
/// remaining quantity is the live state that matchers claim with
/// compare-and-swap.
#[derive(Debug)]
pub struct BookEntry {
	id: OrderId,
	instrument: String,
	side: Side,
	kind: OrderKind,
	timestamp: u64,
	remaining: AtomicU64,
	priority: Priority,
}

impl BookEntry {
	pub fn id(&self) -> OrderId {
		self.id
	}

	pub fn side(&self) -> Side {
		self.side
	}

	pub fn kind(&self) -> OrderKind {
		self.kind
	}

	pub fn timestamp(&self) -> u64 {
		self.timestamp
	}

	/// Current remaining quantity; 0 means a matcher is consuming it
	pub fn remaining(&self) -> u64 {
		self.remaining.load(Ordering::Acquire)
	}

	/// Move remaining quantity from `expected` to `new`
	///
	/// Fails if anyone changed the quantity since it was read.
	pub(crate) fn try_claim(&self, expected: u64, new: u64) -> bool {
		self.remaining
			.compare_exchange(expected, new, Ordering::AcqRel, Ordering::Acquire)
			.is_ok()
	}

	/// Undo a claim that could not be completed
	///
	/// Only valid for a claim that drained the entry to zero, since no
	/// other claim can land on a drained entry.
	pub(crate) fn restore(&self, original: u64) {
		self.remaining.store(original, Ordering::Release);
	}

	/// Give back `quantity` from a partial claim
	///
	/// Other partial claims may have landed since ours, so this adds
	/// instead of overwriting.
	pub(crate) fn release(&self, quantity: u64) {
		self.remaining.fetch_add(quantity, Ordering::AcqRel);
	}

	/// Point-in-time copy as a plain order
	pub fn to_order(&self) -> Order {
		Order {
			id: self.id,
			instrument: self.instrument.clone(),
			side: self.side,
			kind: self.kind,
			quantity: self.remaining(),
			timestamp: self.timestamp,
		}
	}
}

/// Thread-safe priority queue of resting orders for one (instrument, side)
///
/// Entries are kept in a `BTreeMap` keyed by matching precedence, so the
/// first entry is always the best order:
/// - Buy side: market first, then highest price, then oldest
/// - Sell side: market first, then lowest price, then oldest
///
/// Inserts never block on capacity and are visible to every caller as
/// soon as they return. `remove_exact` succeeds for at most one caller
/// per entry, which is what matchers use to detect a lost race.
#[derive(Debug)]
pub struct SideQueue {
	side: Side,
	entries: RwLock<BTreeMap<Priority, Arc<BookEntry>>>,
	next_seq: AtomicU64,
}

impl SideQueue {
	/// Create an empty queue for one side of a book
	pub fn new(side: Side) -> Self {
		Self {
			side,
			entries: RwLock::new(BTreeMap::new()),
			next_seq: AtomicU64::new(0),
		}
	}

	pub fn side(&self) -> Side {
		self.side
	}

	fn read(&self) -> RwLockReadGuard<'_, BTreeMap<Priority, Arc<BookEntry>>> {
		self.entries.read().unwrap_or_else(PoisonError::into_inner)
	}

	fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<Priority, Arc<BookEntry>>> {
		self.entries.write().unwrap_or_else(PoisonError::into_inner)
	}

	fn entry_for(&self, order: Order) -> Arc<BookEntry> {
		debug_assert_eq!(order.side, self.side, "order rested on the wrong side");
		debug_assert!(order.quantity > 0, "zero quantity order rested");

		let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
		Arc::new(BookEntry {
			priority: Priority::new(self.side, order.kind, order.timestamp, seq),
			id: order.id,
			instrument: order.instrument,
			side: order.side,
			kind: order.kind,
			timestamp: order.timestamp,
			remaining: AtomicU64::new(order.quantity),
		})
	}

	/// Add an order to the queue
	pub fn insert(&self, order: Order) -> Arc<BookEntry> {
		let entry = self.entry_for(order);
		self.write().insert(entry.priority, entry.clone());
		entry
	}

	/// Highest-priority entry, without removing it
	pub fn peek_best(&self) -> Option<Arc<BookEntry>> {
		self.read().first_key_value().map(|(_, entry)| entry.clone())
	}

	/// Remove this exact entry if it is still queued
	///
	/// Returns false when another caller already removed it. Matching is
	/// by instance, never by field values.
	pub fn remove_exact(&self, entry: &Arc<BookEntry>) -> bool {
		let mut entries = self.write();
		match entries.get(&entry.priority) {
			Some(queued) if Arc::ptr_eq(queued, entry) => {
				entries.remove(&entry.priority);
				true
			}
			_ => false,
		}
	}

	/// Whether this exact entry is still queued
	pub fn contains_exact(&self, entry: &Arc<BookEntry>) -> bool {
		self.read()
			.get(&entry.priority)
			.is_some_and(|queued| Arc::ptr_eq(queued, entry))
	}

	/// Remove every entry carrying `id`
	pub fn remove_by_id(&self, id: OrderId) -> bool {
		let mut entries = self.write();
		let before = entries.len();
		entries.retain(|_, entry| entry.id != id);
		entries.len() != before
	}

	/// Swap the first entry carrying `id` for `order`
	///
	/// The replacement is positioned by its own priority. Returns false,
	/// leaving the queue untouched, when no entry has that id.
	pub fn replace_by_id(&self, id: OrderId, order: Order) -> bool {
		let mut entries = self.write();
		let Some(key) = entries
			.iter()
			.find(|(_, entry)| entry.id == id)
			.map(|(key, _)| *key)
		else {
			return false;
		};

		entries.remove(&key);
		let entry = self.entry_for(order);
		entries.insert(entry.priority, entry);
		true
	}

	/// Copy of all live orders in queue order
	///
	/// Entries a matcher has already drained to zero are left out.
	pub fn snapshot(&self) -> Vec<Order> {
		self.read()
			.values()
			.filter(|entry| entry.remaining() > 0)
			.map(|entry| entry.to_order())
			.collect()
	}

	/// Number of queued entries
	pub fn len(&self) -> usize {
		self.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.read().is_empty()
	}

	/// Sum of remaining quantity across the queue
	pub fn depth(&self) -> u64 {
		self.read().values().map(|entry| entry.remaining()).sum()
	}

	/// Drop all entries
	pub fn clear(&self) {
		self.write().clear();
	}
}
