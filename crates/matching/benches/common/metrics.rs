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
use std::sync::atomic::{AtomicU64, Ordering};

use bourse_matching::ProcessOutcome;

#[derive(Clone)]
pub struct BenchMetrics {
	pub processed: Arc<AtomicU64>,
	pub filled: Arc<AtomicU64>,
	pub lost_races: Arc<AtomicU64>,
	pub start_time: std::time::Instant,
}

impl BenchMetrics {
	pub fn new() -> Self {
		Self {
			processed: Arc::new(AtomicU64::new(0)),
			filled: Arc::new(AtomicU64::new(0)),
			lost_races: Arc::new(AtomicU64::new(0)),
			start_time: std::time::Instant::now(),
		}
	}

	pub fn record(&self, outcome: &ProcessOutcome) {
		self.processed.fetch_add(1, Ordering::Relaxed);
		self.filled.fetch_add(outcome.filled, Ordering::Relaxed);
		self.lost_races
			.fetch_add(u64::from(outcome.lost_races), Ordering::Relaxed);
	}

	pub fn report(&self) -> BenchReport {
		let elapsed = self.start_time.elapsed().as_secs_f64();
		let processed = self.processed.load(Ordering::Relaxed);

		BenchReport {
			total_processed: processed,
			total_filled: self.filled.load(Ordering::Relaxed),
			total_lost_races: self.lost_races.load(Ordering::Relaxed),
			throughput: processed as f64 / elapsed,
		}
	}
}

pub struct BenchReport {
	pub total_processed: u64,
	pub total_filled: u64,
	pub total_lost_races: u64,
	pub throughput: f64,
}
