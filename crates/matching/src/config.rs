// Copyright 2025 chenjjiaa
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

use serde::{Deserialize, Serialize};

use crate::engine::EngineConfig;

// Logging configuration constants
/// Default log level (can be overridden by RUST_LOG environment variable)
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log directory component name
pub const LOG_COMPONENT_NAME: &str = "matching";

/// Default console output enabled (can be overridden by LOG_TO_CONSOLE environment variable)
pub const DEFAULT_LOG_TO_CONSOLE: bool = false;

// Engine configuration constants
/// Default number of consecutive lost races before an order is failed
/// (can be overridden by MATCHING_MAX_RETRIES)
pub const DEFAULT_MAX_RETRIES: u32 = 1_024;

/// Matching engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
	/// Consecutive lost races tolerated per order
	pub max_retries: u32,
	/// Log every order, fill and cancel at debug level
	pub verbose_logging: bool,
	/// Worker threads used by the bench-engine binary
	pub bench_threads: usize,
	/// Orders each bench-engine worker submits
	pub bench_orders_per_thread: u64,
	/// Instrument the bench-engine binary trades
	pub bench_instrument: String,
}

impl Default for MatchingConfig {
	fn default() -> Self {
		Self {
			max_retries: DEFAULT_MAX_RETRIES,
			verbose_logging: false,
			bench_threads: 4,
			bench_orders_per_thread: 100_000,
			bench_instrument: "HDFC".to_string(),
		}
	}
}

impl MatchingConfig {
	/// Load configuration from environment variables
	pub fn from_env() -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder()
			.add_source(config::Environment::with_prefix("MATCHING"))
			.build()?;

		cfg.try_deserialize()
	}

	/// Load configuration from file
	pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder()
			.add_source(config::File::with_name(path))
			.add_source(config::Environment::with_prefix("MATCHING"))
			.build()?;

		cfg.try_deserialize()
	}

	/// Engine settings carried by this configuration
	pub fn engine_config(&self) -> EngineConfig {
		EngineConfig {
			max_retries: self.max_retries,
			verbose_logging: self.verbose_logging,
		}
	}
}
