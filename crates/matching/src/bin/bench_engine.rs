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
	sync::Arc,
	thread,
	time::{Duration, Instant},
};

use anyhow::{Context, Result, bail};
use crossbeam::channel;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info};

use bourse_matching::{
	MatchingEngine, Order, OrderBooks, OrderKind, config::MatchingConfig, logging,
};
use bourse_sdk::types::Side;

#[derive(Debug, Default, Clone, Copy)]
struct WorkerTotals {
	orders: u64,
	submitted: u64,
	filled: u64,
	lost_races: u64,
}

#[derive(Debug, Serialize)]
struct BenchSummary {
	threads: usize,
	orders: u64,
	elapsed_ms: u128,
	throughput: f64,
	submitted_quantity: u64,
	filled_quantity: u64,
	resting_quantity: u64,
	lost_races: u64,
}

fn run_worker(
	engine: &MatchingEngine,
	instrument: &str,
	worker: u64,
	orders: u64,
) -> Result<WorkerTotals> {
	let mut totals = WorkerTotals::default();

	for n in 0..orders {
		let id = worker * orders + n + 1;
		let side = if (worker + n) % 2 == 0 {
			Side::Buy
		} else {
			Side::Sell
		};
		// One market order in sixteen, limits in a narrow band around 100
		let kind = if n % 16 == 0 {
			OrderKind::Market
		} else {
			OrderKind::Limit {
				price: Decimal::from(98 + (id % 5)),
			}
		};
		let quantity = 1 + id % 10;

		let outcome = engine
			.process(Order::new(id, instrument, side, kind, quantity, id))
			.with_context(|| format!("worker {} failed on order {}", worker, id))?;

		totals.orders += 1;
		totals.submitted += quantity;
		totals.filled += outcome.filled;
		totals.lost_races += u64::from(outcome.lost_races);
	}

	Ok(totals)
}

fn main() -> Result<()> {
	unsafe {
		std::env::set_var("RUST_LOG", "error");
		std::env::set_var("LOG_TO_CONSOLE", "false");
	}
	logging::init_logging()?;

	let config = MatchingConfig::from_file("configs/bench.toml")
		.or_else(|_| MatchingConfig::from_env())
		.unwrap_or_default();

	println!("Starting Engine Benchmark");
	println!("Threads: {}", config.bench_threads);
	println!("Orders per thread: {}", config.bench_orders_per_thread);
	println!("Instrument: {}", config.bench_instrument);

	let engine = MatchingEngine::new(Arc::new(OrderBooks::new()), config.engine_config());
	let (totals_tx, totals_rx) = channel::unbounded();
	let start = Instant::now();

	thread::scope(|scope| {
		for worker in 0..config.bench_threads as u64 {
			let engine = &engine;
			let instrument = config.bench_instrument.as_str();
			let orders = config.bench_orders_per_thread;
			let totals_tx = totals_tx.clone();
			scope.spawn(move || {
				let result = run_worker(engine, instrument, worker, orders);
				if let Err(e) = &result {
					error!(target: "engine", "Bench worker failed: {:#}", e);
				}
				totals_tx.send(result).ok();
			});
		}
	});
	drop(totals_tx);

	let elapsed = start.elapsed().max(Duration::from_micros(1));

	let mut totals = WorkerTotals::default();
	for result in totals_rx.iter() {
		let worker = result?;
		totals.orders += worker.orders;
		totals.submitted += worker.submitted;
		totals.filled += worker.filled;
		totals.lost_races += worker.lost_races;
	}

	let resting: u64 = [Side::Buy, Side::Sell]
		.into_iter()
		.filter_map(|side| engine.books().get(side, &config.bench_instrument))
		.map(|queue| queue.depth())
		.sum();

	// Each filled unit leaves the book once from the incoming side and
	// once from the resting side
	if resting != totals.submitted - 2 * totals.filled {
		bail!(
			"quantity not conserved: submitted {}, filled {}, resting {}",
			totals.submitted,
			totals.filled,
			resting
		);
	}

	let summary = BenchSummary {
		threads: config.bench_threads,
		orders: totals.orders,
		elapsed_ms: elapsed.as_millis(),
		throughput: totals.orders as f64 / elapsed.as_secs_f64(),
		submitted_quantity: totals.submitted,
		filled_quantity: totals.filled,
		resting_quantity: resting,
		lost_races: totals.lost_races,
	};

	info!(target: "engine", "Benchmark finished: {:?}", summary);
	println!("{}", serde_json::to_string_pretty(&summary)?);

	Ok(())
}
