//! Progressive bucket-parallel render session.
//!
//! One worker thread per bucket refines its tile pass by pass. A controller
//! on the calling thread waits until every bucket has finished the current
//! pass, resolves a frame, hands it to a [`FrameSink`] and opens the gate
//! for the next pass.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{unbounded, Receiver, Sender};
use log::{debug, error, info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::{
    generate_bucket_grid, render_bucket_pass, Bucket, Camera, Frame, PixelBuffer, RenderConfig,
    RenderError, RenderResult, SampleGrid, Scene,
};

/// How often the controller checks for a finished pass.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Counting semaphore that admits one pass per bucket at a time.
///
/// Capacity equals the bucket count, but each bucket draws from its own
/// token queue so a fast worker can never take a slower one's turn.
#[derive(Debug)]
pub struct PassGate {
    tokens: Vec<(Sender<()>, Receiver<()>)>,
}

impl PassGate {
    /// A gate for `buckets` workers, each holding one token.
    pub fn new(buckets: usize) -> Self {
        let gate = Self {
            tokens: (0..buckets).map(|_| unbounded()).collect(),
        };
        gate.release_all();
        gate
    }

    /// Block until bucket `index` may start its next pass.
    pub fn acquire(&self, index: usize) {
        // Never disconnected: the gate owns both ends
        let _ = self.tokens[index].1.recv();
    }

    /// Hand every bucket one more token.
    pub fn release_all(&self) {
        for (tx, _) in &self.tokens {
            let _ = tx.send(());
        }
    }

    /// Tokens currently waiting to be claimed by bucket `index`.
    pub fn available(&self, index: usize) -> usize {
        self.tokens[index].1.len()
    }
}

/// Receives every resolved frame while a session is running.
///
/// Returning `ControlFlow::Break` ends the session after the current pass.
pub trait FrameSink {
    fn present(&mut self, frame: &Frame, pass: u32) -> ControlFlow<()>;
}

impl<F> FrameSink for F
where
    F: FnMut(&Frame, u32) -> ControlFlow<()>,
{
    fn present(&mut self, frame: &Frame, pass: u32) -> ControlFlow<()> {
        self(frame, pass)
    }
}

/// Shared state of one render.
///
/// The scene and camera are borrowed for the whole session, so neither can
/// be edited while workers are tracing.
pub struct RenderSession<'a> {
    scene: &'a Scene,
    camera: &'a Camera,
    config: RenderConfig,
    buckets: Vec<Bucket>,
    buffer: PixelBuffer,
    gate: PassGate,
    /// Buckets that finished the current pass
    completed: AtomicUsize,
    /// Workers that have stopped for good
    finished: AtomicUsize,
    exit: AtomicBool,
}

impl<'a> RenderSession<'a> {
    pub fn new(scene: &'a Scene, camera: &'a Camera, config: RenderConfig) -> RenderResult<Self> {
        config.validate()?;

        if !(camera.focal_length.is_finite() && camera.focal_length > 0.0) {
            return Err(RenderError::InvalidSetting {
                name: "focal_length",
                reason: format!("must be positive, got {}", camera.focal_length),
            });
        }

        let buckets = generate_bucket_grid(config.width, config.height, config.bucket_ratio());
        let buffer = PixelBuffer::new(config.width, config.height, &buckets);
        let gate = PassGate::new(buckets.len());

        Ok(Self {
            scene,
            camera,
            config,
            buckets,
            buffer,
            gate,
            completed: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
            exit: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Ask every worker to stop as soon as possible.
    pub fn stop(&self) {
        self.exit.store(true, Ordering::SeqCst);
        self.gate.release_all();
    }

    pub fn is_stopped(&self) -> bool {
        self.exit.load(Ordering::SeqCst)
    }

    /// Current average of every pixel.
    pub fn snapshot(&self) -> Frame {
        self.buffer.resolve()
    }

    /// Render until every bucket has converged, the pass limit is hit, the
    /// sink breaks, or [`RenderSession::stop`] is called. Returns the final
    /// frame.
    pub fn run(&self, sink: &mut dyn FrameSink) -> Frame {
        let buckets = self.buckets.len();
        let started = Instant::now();
        info!(
            "Rendering {}x{} in {} buckets, {} passes",
            self.config.width,
            self.config.height,
            buckets,
            self.config.total_passes()
        );

        thread::scope(|scope| {
            let handles: Vec<_> = self
                .buckets
                .iter()
                .map(|bucket| {
                    thread::Builder::new()
                        .name(format!("bucket-{}", bucket.index))
                        .spawn_scoped(scope, move || self.worker(bucket.index))
                })
                .collect();

            let spawned = handles.iter().filter(|h| h.is_ok()).count();
            if spawned < buckets {
                error!("Failed to spawn {} render workers", buckets - spawned);
                self.stop();
            } else {
                self.control(sink, started);
            }

            self.stop();
            for handle in handles.into_iter().flatten() {
                if handle.join().is_err() {
                    error!("A render worker panicked");
                }
            }
        });

        info!("Render finished in {:.2?}", started.elapsed());
        self.buffer.resolve()
    }

    /// Present each completed pass and reopen the gate.
    fn control(&self, sink: &mut dyn FrameSink, started: Instant) {
        let buckets = self.buckets.len();
        let mut pass = 0;
        let mut last = started;

        loop {
            // Read before `completed`: a worker bumps `completed` before it
            // counts itself as finished
            let all_finished = self.finished.load(Ordering::SeqCst) == buckets;

            if self.completed.load(Ordering::SeqCst) >= buckets {
                self.completed.fetch_sub(buckets, Ordering::SeqCst);
                pass += 1;

                let frame = self.buffer.resolve();
                debug!(
                    "Pass {}/{} done in {:.2?}",
                    pass,
                    self.config.total_passes(),
                    last.elapsed()
                );
                last = Instant::now();

                if sink.present(&frame, pass).is_break() {
                    info!("Render cancelled after pass {}", pass);
                    return;
                }
                if self.config.max_passes.is_some_and(|max| pass >= max) {
                    info!("Pass limit of {} reached", pass);
                    return;
                }

                self.gate.release_all();
                continue;
            }

            if all_finished || self.is_stopped() {
                return;
            }

            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Refine one bucket until its sample slots run out or the session stops.
    fn worker(&self, index: usize) {
        let _exit = WorkerExit { session: self };
        let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(index as u64));
        let mut slots = SampleGrid::new(self.config.sample);

        while !self.is_stopped() {
            let Some(slot) = slots.take(&mut rng) else {
                trace!("Bucket {} converged", index);
                break;
            };

            self.gate.acquire(index);
            if self.is_stopped() {
                break;
            }

            let mut tile = self.buffer.lock_tile(index);
            let done = render_bucket_pass(
                &mut tile,
                slot,
                self.camera,
                self.scene,
                &self.config,
                &mut rng,
                &self.exit,
            );
            drop(tile);

            if !done {
                break;
            }

            trace!("Bucket {} finished slot {:?}", index, slot);
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Marks a worker as finished when it returns or unwinds.
struct WorkerExit<'s, 'a> {
    session: &'s RenderSession<'a>,
}

impl Drop for WorkerExit<'_, '_> {
    fn drop(&mut self) {
        if thread::panicking() {
            // The controller would otherwise wait forever on this bucket
            self.session.stop();
        }
        self.session.finished.fetch_add(1, Ordering::SeqCst);
    }
}
