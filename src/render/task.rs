use std::fs;
use std::io;
use std::sync::Arc;
use std::thread;

use tracing::warn;

use super::{Converter, EngineFactory, RenderError, RenderRequest, RenderResult, RendererPool};

/// Stat, read and convert the requested document.
///
/// I/O failures produce a result carrying the failure and no content. When
/// the engine cannot be built or the conversion fails, the raw source is
/// returned as the rendered output so the pane is never left blank.
pub fn render_document<F: EngineFactory>(
	request: RenderRequest,
	pool: &RendererPool<F>,
) -> RenderResult {
	let metadata = match fs::metadata(&request.path) {
		Ok(metadata) => metadata,
		Err(source) => {
			let path = request.path.clone();
			return RenderResult::failed(request, RenderError::Stat { path, source });
		}
	};

	let raw = match fs::read(&request.path) {
		Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
		Err(source) => {
			let path = request.path.clone();
			return RenderResult::failed(request, RenderError::Read { path, source });
		}
	};

	let output = convert_or_raw(&raw, &request, pool);

	RenderResult {
		path: request.path,
		width: request.width,
		generation: request.generation,
		output,
		raw,
		modified: metadata.modified().ok(),
		failure: None,
	}
}

fn convert_or_raw<F: EngineFactory>(
	raw: &str,
	request: &RenderRequest,
	pool: &RendererPool<F>,
) -> String {
	let engine = match pool.acquire(request.width) {
		Ok(engine) => engine,
		Err(err) => {
			warn!(width = request.width, error = %err, "renderer unavailable, showing raw source");
			return raw.to_string();
		}
	};

	match engine.convert(raw) {
		Ok(output) => output,
		Err(err) => {
			warn!(
				path = %request.path.display(),
				width = request.width,
				error = %err,
				"markdown conversion failed, showing raw source"
			);
			raw.to_string()
		}
	}
}

/// Run [`render_document`] on a dedicated worker thread.
///
/// The result is handed to `deliver`, which is expected to forward it to the
/// interactive loop as a message.
pub fn spawn_render<F, D>(
	request: RenderRequest,
	pool: Arc<RendererPool<F>>,
	deliver: D,
) -> io::Result<()>
where
	F: EngineFactory + 'static,
	F::Engine: 'static,
	D: FnOnce(RenderResult) + Send + 'static,
{
	thread::Builder::new()
		.name("render-worker".into())
		.spawn(move || deliver(render_document(request, &pool)))?;
	Ok(())
}
