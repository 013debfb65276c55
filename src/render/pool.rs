//! Bounded pool of width-specific rendering engines.
//!
//! Building an engine is noticeably more expensive than running it, so the
//! pool keeps the most recently used engines alive and hands out shared
//! references. A miss builds the engine while holding the lock, so concurrent
//! callers asking for the same width wait for that one construction instead
//! of building duplicates. Conversion runs on the caller's thread after the
//! lock has been released.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::{EngineFactory, RenderError};

/// Least-recently-used cache of engines keyed by width bucket.
pub struct RendererPool<F: EngineFactory> {
	factory: F,
	capacity: usize,
	state: Mutex<PoolState<F::Engine>>,
}

struct PoolState<E> {
	/// Map from width to (recency tick, engine).
	entries: HashMap<u16, (u64, Arc<E>)>,
	/// Monotonic counter for recency ordering (higher = more recent).
	tick: u64,
}

impl<E> PoolState<E> {
	fn touch(&mut self, width: u16) -> Option<Arc<E>> {
		let (order, engine) = self.entries.get_mut(&width)?;
		self.tick += 1;
		*order = self.tick;
		Some(Arc::clone(engine))
	}

	fn insert(&mut self, width: u16, engine: Arc<E>, capacity: usize) {
		self.tick += 1;
		self.entries.insert(width, (self.tick, engine));

		while self.entries.len() > capacity {
			let Some(oldest) = self
				.entries
				.iter()
				.min_by_key(|(_, (order, _))| *order)
				.map(|(width, _)| *width)
			else {
				break;
			};
			self.entries.remove(&oldest);
			debug!(width = oldest, "evicted pooled renderer");
		}
	}
}

impl<F: EngineFactory> RendererPool<F> {
	/// Create an empty pool. A capacity of zero is treated as one.
	pub fn new(factory: F, capacity: usize) -> Self {
		Self {
			factory,
			capacity: capacity.max(1),
			state: Mutex::new(PoolState {
				entries: HashMap::with_capacity(capacity.max(1)),
				tick: 0,
			}),
		}
	}

	/// Return the engine for `width`, constructing it on a miss.
	///
	/// A hit refreshes the width's recency. A miss constructs under the pool
	/// lock, so each pooled width is built exactly once and other callers
	/// block until it is ready. Construction failures are returned to the
	/// caller and leave the pool untouched.
	pub fn acquire(&self, width: u16) -> Result<Arc<F::Engine>, RenderError> {
		let mut state = self.lock();
		if let Some(engine) = state.touch(width) {
			return Ok(engine);
		}

		let engine = Arc::new(self.factory.build(width)?);
		debug!(width, "constructed renderer");
		state.insert(width, Arc::clone(&engine), self.capacity);
		Ok(engine)
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn len(&self) -> usize {
		self.lock().entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn contains(&self, width: u16) -> bool {
		self.lock().entries.contains_key(&width)
	}

	/// Pooled widths ordered from least to most recently used.
	pub fn widths(&self) -> Vec<u16> {
		let state = self.lock();
		let mut widths: Vec<(u64, u16)> = state
			.entries
			.iter()
			.map(|(width, (order, _))| (*order, *width))
			.collect();
		widths.sort_unstable();
		widths.into_iter().map(|(_, width)| width).collect()
	}

	fn lock(&self) -> MutexGuard<'_, PoolState<F::Engine>> {
		self.state.lock().unwrap_or_else(PoisonError::into_inner)
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::thread;

	use super::*;
	use crate::render::Converter;

	struct Echo(u16);

	impl Converter for Echo {
		fn convert(&self, source: &str) -> Result<String, RenderError> {
			Ok(format!("{}:{source}", self.0))
		}
	}

	#[derive(Default)]
	struct CountingFactory {
		built: AtomicUsize,
	}

	impl EngineFactory for CountingFactory {
		type Engine = Echo;

		fn build(&self, width: u16) -> Result<Echo, RenderError> {
			if width == 0 {
				return Err(RenderError::Construct {
					width,
					reason: "zero width".into(),
				});
			}
			self.built.fetch_add(1, Ordering::SeqCst);
			Ok(Echo(width))
		}
	}

	#[test]
	fn overflow_keeps_the_most_recent_widths() {
		let pool = RendererPool::new(CountingFactory::default(), 8);
		for width in (20..=240).step_by(20) {
			pool.acquire(width).unwrap();
		}

		assert_eq!(pool.len(), 8);
		assert!(!pool.contains(20));
		assert!(pool.contains(240));
		assert_eq!(pool.widths(), vec![100, 120, 140, 160, 180, 200, 220, 240]);
	}

	#[test]
	fn hit_refreshes_recency() {
		let pool = RendererPool::new(CountingFactory::default(), 3);
		pool.acquire(10).unwrap();
		pool.acquire(20).unwrap();
		pool.acquire(30).unwrap();
		pool.acquire(10).unwrap();
		pool.acquire(40).unwrap();

		assert!(!pool.contains(20));
		assert!(pool.contains(10));
		assert_eq!(pool.widths(), vec![30, 10, 40]);
	}

	#[test]
	fn hit_does_not_construct() {
		let pool = RendererPool::new(CountingFactory::default(), 2);
		let first = pool.acquire(80).unwrap();
		let second = pool.acquire(80).unwrap();

		assert!(Arc::ptr_eq(&first, &second));
		assert_eq!(pool.factory.built.load(Ordering::SeqCst), 1);
	}

	#[test]
	fn concurrent_callers_share_one_engine_per_width() {
		let pool = RendererPool::new(CountingFactory::default(), 8);
		let widths = [20, 40, 60, 40, 20];

		thread::scope(|scope| {
			for _ in 0..8 {
				scope.spawn(|| {
					for width in widths {
						let engine = pool.acquire(width).unwrap();
						assert_eq!(engine.convert("x").unwrap(), format!("{width}:x"));
						assert!(pool.len() <= pool.capacity());
					}
				});
			}
		});

		assert_eq!(pool.factory.built.load(Ordering::SeqCst), 3);
		assert_eq!(pool.len(), 3);
	}

	#[test]
	fn concurrent_churn_stays_within_capacity() {
		let pool = RendererPool::new(CountingFactory::default(), 2);

		thread::scope(|scope| {
			for offset in 0..6u16 {
				let pool = &pool;
				scope.spawn(move || {
					for step in 0..20u16 {
						let width = 10 + (offset + step) % 5 * 10;
						pool.acquire(width).unwrap();
						assert!(pool.len() <= 2);
					}
				});
			}
		});

		assert!(pool.len() <= 2);
		assert!(pool.factory.built.load(Ordering::SeqCst) >= 5);
	}

	#[test]
	fn construction_failure_is_not_pooled() {
		let pool = RendererPool::new(CountingFactory::default(), 2);
		let err = pool.acquire(0).err().unwrap();

		assert!(err.is_io());
		assert!(pool.is_empty());
	}

	#[test]
	fn zero_capacity_still_holds_one_engine() {
		let pool = RendererPool::new(CountingFactory::default(), 0);
		pool.acquire(20).unwrap();
		pool.acquire(40).unwrap();

		assert_eq!(pool.capacity(), 1);
		assert_eq!(pool.widths(), vec![40]);
	}
}
