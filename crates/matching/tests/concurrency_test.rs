//! Concurrency tests for the matching engine
//!
//! These tests hammer shared books from several threads and check the
//! invariants that must hold regardless of interleaving:
//! - Exactly one winner when two orders race for one resting order
//! - Quantity is conserved across all fills
//! - No drained order is ever visible in a book

use std::{
	sync::{
		Arc, Barrier,
		atomic::{AtomicU64, Ordering},
	},
	thread,
};

use bourse_matching::{
	EngineConfig, MatchingEngine, Order, OrderBookService, OrderBooks, OrderKind, OrderService,
};
use bourse_sdk::types::{OrderRequest, OrderType, Side};
use rust_decimal::Decimal;

const HDFC: &str = "HDFC";

fn create_engine() -> MatchingEngine {
	let config = EngineConfig {
		max_retries: 1_000_000,
		verbose_logging: false,
	};
	MatchingEngine::new(Arc::new(OrderBooks::new()), config)
}

fn limit(id: u64, side: Side, quantity: u64, price: i64) -> Order {
	Order::new(
		id,
		HDFC,
		side,
		OrderKind::Limit {
			price: Decimal::from(price),
		},
		quantity,
		id,
	)
}

fn depth(engine: &MatchingEngine, side: Side) -> u64 {
	engine
		.books()
		.get(side, HDFC)
		.map(|queue| queue.depth())
		.unwrap_or(0)
}

#[test]
fn test_two_sells_race_for_one_buy() {
	for round in 0..200 {
		let engine = create_engine();
		engine.process(limit(1, Side::Buy, 10, 100)).unwrap();

		let barrier = Barrier::new(2);
		let outcomes: Vec<_> = thread::scope(|scope| {
			let handles: Vec<_> = (0..2)
				.map(|i| {
					let engine = &engine;
					let barrier = &barrier;
					scope.spawn(move || {
						barrier.wait();
						engine.process(limit(10 + i, Side::Sell, 10, 100)).unwrap()
					})
				})
				.collect();
			handles.into_iter().map(|h| h.join().unwrap()).collect()
		});

		let fully_filled = outcomes.iter().filter(|o| o.fully_filled()).count();
		assert_eq!(fully_filled, 1, "round {}: {:?}", round, outcomes);

		let sells = engine.books().get(Side::Sell, HDFC).unwrap().snapshot();
		assert_eq!(sells.len(), 1, "round {}", round);
		assert_eq!(sells[0].quantity, 10);
		assert_eq!(depth(&engine, Side::Buy), 0);
	}
}

#[test]
fn test_market_buy_raced_by_sells() {
	for _ in 0..100 {
		let engine = create_engine();
		engine
			.process(Order::new(1, HDFC, Side::Buy, OrderKind::Market, 10, 1))
			.unwrap();

		thread::scope(|scope| {
			for i in 0..4 {
				let engine = &engine;
				scope.spawn(move || engine.process(limit(10 + i, Side::Sell, 10, 50)).unwrap());
			}
		});

		assert_eq!(engine.books().get(Side::Sell, HDFC).unwrap().len(), 3);
		assert_eq!(depth(&engine, Side::Buy), 0);
	}
}

#[test]
fn test_quantity_conserved_under_contention() {
	const THREADS: u64 = 8;
	const ORDERS_PER_THREAD: u64 = 2_000;

	let engine = create_engine();
	let submitted = AtomicU64::new(0);
	let filled = AtomicU64::new(0);

	thread::scope(|scope| {
		for t in 0..THREADS {
			let engine = &engine;
			let submitted = &submitted;
			let filled = &filled;
			scope.spawn(move || {
				for n in 0..ORDERS_PER_THREAD {
					let id = t * ORDERS_PER_THREAD + n + 1;
					let side = if (t + n) % 2 == 0 { Side::Buy } else { Side::Sell };
					let quantity = 1 + (id % 7);
					let price = 100 + (id % 5) as i64 - 2;

					let outcome = engine.process(limit(id, side, quantity, price)).unwrap();
					assert_eq!(outcome.filled + outcome.rested, quantity);

					submitted.fetch_add(quantity, Ordering::Relaxed);
					filled.fetch_add(outcome.filled, Ordering::Relaxed);
				}
			});
		}
	});

	// Every filled unit took one unit from the incoming order and one
	// from a resting order
	let submitted = submitted.load(Ordering::Relaxed);
	let filled = filled.load(Ordering::Relaxed);
	let resting = depth(&engine, Side::Buy) + depth(&engine, Side::Sell);
	assert_eq!(resting, submitted - 2 * filled);

	for side in [Side::Buy, Side::Sell] {
		if let Some(queue) = engine.books().get(side, HDFC) {
			assert!(queue.snapshot().iter().all(|order| order.quantity > 0));
		}
	}
}

#[test]
fn test_cancel_races_with_matching() {
	for _ in 0..100 {
		let engine = create_engine();
		for id in 1..=20 {
			engine.process(limit(id, Side::Buy, 5, 100)).unwrap();
		}

		let barrier = Barrier::new(2);
		let (filled, cancelled) = thread::scope(|scope| {
			let matcher = scope.spawn(|| {
				barrier.wait();
				engine.process(limit(100, Side::Sell, 50, 100)).unwrap().filled
			});
			let canceller = scope.spawn(|| {
				barrier.wait();
				(1..=20).filter(|id| engine.delete(*id).is_ok()).count() as u64
			});
			(matcher.join().unwrap(), canceller.join().unwrap())
		});

		// Each resting order is either filled or cancelled, never both
		assert_eq!(filled % 5, 0);
		assert_eq!(filled / 5 + cancelled, 20);
		assert_eq!(depth(&engine, Side::Buy), 0);
	}
}

#[test]
fn test_service_shared_across_threads() {
	let service = Arc::new(OrderService::new(create_engine()));

	let handles: Vec<_> = (0..4)
		.map(|i| {
			let service = service.clone();
			thread::spawn(move || {
				let side = if i % 2 == 0 { Side::Buy } else { Side::Sell };
				for _ in 0..250 {
					service
						.submit_order(OrderRequest {
							instrument: HDFC.to_string(),
							side,
							order_type: OrderType::Limit,
							price: Some(Decimal::from(100)),
							quantity: 1,
						})
						.unwrap();
				}
			})
		})
		.collect();

	for handle in handles {
		handle.join().unwrap();
	}

	// 500 units each way at one price: every fill takes one unit from
	// each side, so whatever is left is balanced
	let book = service.get_book(HDFC).unwrap_or_default();
	let resting = |side: Side| -> u64 {
		book.iter()
			.filter(|order| order.side == side)
			.map(|order| order.quantity)
			.sum()
	};
	assert_eq!(resting(Side::Buy), resting(Side::Sell));
	assert_eq!(depth(service.engine(), Side::Buy), resting(Side::Buy));
}
