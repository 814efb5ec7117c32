use std::path::PathBuf;
use std::sync::mpsc;

use rayon::prelude::*;

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRange};
use crate::foundation::error::{PromoError, PromoResult};
use crate::render::compositor::FrameRenderer;
use crate::render::frame::Frame;
use crate::scene::model::Scene;

const MAX_CHUNK_BUFFER_BYTES: u64 = 128 * 1024 * 1024;

/// Options controlling `RenderSession` range rendering behavior.
#[derive(Clone, Debug)]
pub struct RenderSessionOpts {
    /// Enable frame-level parallelism (rayon), using a dedicated thread pool.
    pub parallel: bool,
    /// Frames rendered per parallel batch.
    pub chunk_size: usize,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Bounded channel capacity between render workers and the encoder thread.
    pub channel_capacity: usize,
}

impl Default for RenderSessionOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 32,
            threads: None,
            channel_capacity: 4,
        }
    }
}

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Total frames in the requested range.
    pub frames_total: u64,
    /// Frames delivered to the sink.
    pub frames_rendered: u64,
}

/// Drives a [`Scene`] over frame indices into a [`FrameSink`].
///
/// The scene is only read, so parallel workers share it without locks. Stopping a render is the
/// caller's business: request fewer frames, or fail from the sink.
#[derive(Debug)]
pub struct RenderSession {
    scene: Scene,
    opts: RenderSessionOpts,
    renderer: FrameRenderer,
}

impl RenderSession {
    /// Session over `scene`.
    pub fn new(scene: Scene, opts: RenderSessionOpts) -> PromoResult<Self> {
        if let Some(n) = opts.threads
            && n == 0
        {
            return Err(PromoError::validation(
                "render session 'threads' must be >= 1 when set",
            ));
        }
        Ok(Self {
            scene,
            opts,
            renderer: FrameRenderer::new(),
        })
    }

    /// The scene being rendered.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Frames needed to cover the scene duration.
    pub fn total_frames(&self) -> u64 {
        self.scene.total_frames()
    }

    /// Configuration handed to sinks.
    pub fn sink_config(&self) -> SinkConfig {
        let canvas = self.scene.canvas();
        SinkConfig {
            width: canvas.width,
            height: canvas.height,
            fps: self.scene.fps(),
            audio: self.scene.audio().map(PathBuf::from),
        }
    }

    /// Render a single frame.
    pub fn render_frame(&mut self, frame: FrameIndex) -> PromoResult<Frame> {
        if frame.0 >= self.total_frames() {
            return Err(PromoError::validation(
                "render_frame frame must be within scene duration",
            ));
        }
        self.renderer.render_frame(&self.scene, frame)
    }

    /// Render every frame of the scene into `sink`.
    pub fn render_all(&mut self, sink: &mut dyn FrameSink) -> PromoResult<RenderStats> {
        let range = FrameRange::new(FrameIndex(0), FrameIndex(self.total_frames()))?;
        self.render_range(range, sink)
    }

    /// Render a frame range and stream frames into a sink.
    ///
    /// The sink receives frames in strictly increasing frame index order, from a dedicated
    /// encoder thread so that encoding overlaps rendering.
    #[tracing::instrument(skip(self, sink))]
    pub fn render_range(
        &mut self,
        range: FrameRange,
        sink: &mut dyn FrameSink,
    ) -> PromoResult<RenderStats> {
        if range.is_empty() {
            return Err(PromoError::validation(
                "render_range range must be non-empty",
            ));
        }
        if range.end.0 > self.total_frames() {
            return Err(PromoError::validation(
                "render_range range must be within scene duration",
            ));
        }

        let cfg = self.sink_config();
        let cap = self.opts.channel_capacity.max(1);
        let bytes_per_frame = u64::from(cfg.width)
            .saturating_mul(u64::from(cfg.height))
            .saturating_mul(4)
            .max(1);
        let max_chunk_by_mem = (MAX_CHUNK_BUFFER_BYTES / bytes_per_frame).max(1);
        let chunk_size = normalized_chunk_size(self.opts.chunk_size)
            .min(max_chunk_by_mem)
            .min(range.len_frames());

        let pool = if self.opts.parallel {
            Some(build_thread_pool(self.opts.threads)?)
        } else {
            None
        };

        let scene = &self.scene;
        let renderer = &mut self.renderer;

        std::thread::scope(|scope| -> PromoResult<RenderStats> {
            let (tx, rx) = mpsc::sync_channel::<FrameMsg>(cap);

            let enc = scope.spawn(move || -> PromoResult<()> {
                sink.begin(cfg)?;
                let mut next = range.start.0;
                while next < range.end.0 {
                    let msg = rx.recv().map_err(|_| {
                        PromoError::render("encoder channel disconnected unexpectedly")
                    })?;
                    if msg.idx.0 != next {
                        return Err(PromoError::render(format!(
                            "frame {} delivered out of order, expected {next}",
                            msg.idx.0
                        )));
                    }
                    sink.push_frame(msg.idx, &msg.frame)?;
                    next += 1;
                }
                sink.end()
            });

            let produced = match pool.as_ref() {
                Some(pool) => produce_parallel(scene, pool, range, chunk_size, &tx),
                None => produce_sequential(scene, renderer, range, &tx),
            };
            drop(tx);
            let enc_res = enc
                .join()
                .map_err(|_| PromoError::render("encoder thread panicked"))?;

            // A render failure disconnects the encoder; report the cause, not the symptom.
            let rendered = produced?;
            enc_res?;
            tracing::debug!(frames = rendered, "range rendered");
            Ok(RenderStats {
                frames_total: range.len_frames(),
                frames_rendered: rendered,
            })
        })
    }
}

#[derive(Debug)]
struct FrameMsg {
    idx: FrameIndex,
    frame: Frame,
}

fn send(tx: &mpsc::SyncSender<FrameMsg>, idx: u64, frame: Frame) -> PromoResult<()> {
    tx.send(FrameMsg {
        idx: FrameIndex(idx),
        frame,
    })
    .map_err(|_| PromoError::render("encoder thread is not accepting frames"))
}

fn produce_sequential(
    scene: &Scene,
    renderer: &mut FrameRenderer,
    range: FrameRange,
    tx: &mpsc::SyncSender<FrameMsg>,
) -> PromoResult<u64> {
    let mut rendered = 0;
    for f in range.start.0..range.end.0 {
        let frame = renderer.render_frame(scene, FrameIndex(f))?;
        if send(tx, f, frame).is_err() {
            // The encoder failed; its own error is reported by the caller.
            break;
        }
        rendered += 1;
    }
    Ok(rendered)
}

fn produce_parallel(
    scene: &Scene,
    pool: &rayon::ThreadPool,
    range: FrameRange,
    chunk_size: u64,
    tx: &mpsc::SyncSender<FrameMsg>,
) -> PromoResult<u64> {
    let mut rendered = 0;
    let mut chunk_start = range.start.0;
    while chunk_start < range.end.0 {
        let chunk_end = (chunk_start + chunk_size).min(range.end.0);
        let frames: Vec<u64> = (chunk_start..chunk_end).collect();
        let out = pool.install(|| {
            frames
                .par_iter()
                .map_init(FrameRenderer::new, |renderer, &f| {
                    renderer.render_frame(scene, FrameIndex(f))
                })
                .collect::<PromoResult<Vec<Frame>>>()
        })?;
        for (f, frame) in (chunk_start..chunk_end).zip(out) {
            if send(tx, f, frame).is_err() {
                return Ok(rendered);
            }
            rendered += 1;
        }
        chunk_start = chunk_end;
    }
    Ok(rendered)
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    if chunk_size == 0 {
        1
    } else {
        chunk_size as u64
    }
}

fn build_thread_pool(threads: Option<usize>) -> PromoResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(PromoError::validation(
            "render session 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| PromoError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/session/render_session.rs"]
mod tests;
