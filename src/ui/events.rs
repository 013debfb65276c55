use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Result;
use ratatui::crossterm::event::{self, Event};

use crate::render::{RenderRequest, RenderResult};

/// Everything the interactive loop reacts to, in arrival order.
#[derive(Debug)]
pub enum AppEvent {
	Input(Event),
	/// A debounce timer fired for the request.
	RenderDue(RenderRequest),
	RenderDone(RenderResult),
	WatchTick,
}

/// Post `event` after `delay` from a short-lived timer thread.
pub(crate) fn schedule(
	sender: &mpsc::Sender<AppEvent>,
	delay: Duration,
	event: AppEvent,
) -> io::Result<()> {
	let sender = sender.clone();
	thread::Builder::new()
		.name("marginalia-timer".into())
		.spawn(move || {
			thread::sleep(delay);
			let _ = sender.send(event);
		})?;
	Ok(())
}

/// Background reader forwarding terminal input into the event channel.
///
/// Reading can be paused while an external editor owns the terminal.
pub(crate) struct InputPump {
	running: Arc<AtomicBool>,
	paused: Arc<AtomicBool>,
	handle: Option<JoinHandle<Result<()>>>,
}

const INPUT_POLL: Duration = Duration::from_millis(50);

impl InputPump {
	pub(crate) fn spawn(sender: mpsc::Sender<AppEvent>) -> io::Result<Self> {
		let running = Arc::new(AtomicBool::new(true));
		let paused = Arc::new(AtomicBool::new(false));
		let thread_running = Arc::clone(&running);
		let thread_paused = Arc::clone(&paused);

		let handle = thread::Builder::new()
			.name("marginalia-input".into())
			.spawn(move || -> Result<()> {
				while thread_running.load(Ordering::Relaxed) {
					if thread_paused.load(Ordering::Relaxed) {
						thread::sleep(INPUT_POLL);
						continue;
					}
					if event::poll(INPUT_POLL)? {
						let event = event::read()?;
						if sender.send(AppEvent::Input(event)).is_err() {
							break;
						}
					}
				}
				Ok(())
			})?;

		Ok(Self {
			running,
			paused,
			handle: Some(handle),
		})
	}

	/// Stop reading and wait long enough for an in-progress poll to return.
	pub(crate) fn pause(&self) {
		self.paused.store(true, Ordering::Relaxed);
		thread::sleep(INPUT_POLL * 2);
	}

	pub(crate) fn resume(&self) {
		self.paused.store(false, Ordering::Relaxed);
	}

	pub(crate) fn stop(mut self) -> Result<()> {
		self.running.store(false, Ordering::Relaxed);
		match self.handle.take().map(JoinHandle::join) {
			Some(Ok(result)) => result,
			Some(Err(panic)) => std::panic::resume_unwind(panic),
			None => Ok(()),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::time::Instant;

	use super::*;

	#[test]
	fn scheduled_event_arrives_after_delay() {
		let (tx, rx) = mpsc::channel();
		let started = Instant::now();

		schedule(&tx, Duration::from_millis(30), AppEvent::WatchTick).unwrap();

		let event = rx.recv_timeout(Duration::from_secs(5)).unwrap();
		assert!(matches!(event, AppEvent::WatchTick));
		assert!(started.elapsed() >= Duration::from_millis(30));
	}
}
