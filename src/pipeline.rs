//! Concurrent frame processing with a single "latest result" slot.
//!
//! Every submitted frame gets a sequence number. Recognition runs on the
//! blocking pool, so several frames may be in flight at once, but a result is
//! only published if it is newer than the one already in the slot.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::{sync::watch, task::JoinHandle};
use tracing::instrument;

use crate::{
    render::RenderSurface, DisplayTransform, Frame, FrameAnnotations, RowFilter, TextRecognizer,
};

/// The annotations of one frame together with its sequence number.
/// Sequence `0` is the empty value the slot starts with.
#[derive(Debug, Clone, Default)]
pub struct Published {
    pub sequence: u64,
    pub annotations: Arc<FrameAnnotations>,
}

struct Shared<R> {
    recognizer: R,
    filter: RowFilter,
    display_size: (f64, f64),
    next_sequence: AtomicU64,
    latest: watch::Sender<Published>,
}

pub struct FrameProcessor<R> {
    shared: Arc<Shared<R>>,
}

impl<R> Clone for FrameProcessor<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<R: TextRecognizer> FrameProcessor<R> {
    pub fn new(recognizer: R, filter: RowFilter, display_size: (f64, f64)) -> Self {
        let (latest, _) = watch::channel(Published::default());
        Self {
            shared: Arc::new(Shared {
                recognizer,
                filter,
                display_size,
                next_sequence: AtomicU64::new(1),
                latest,
            }),
        }
    }

    /// Queues a frame for recognition and returns its sequence number along
    /// with a handle resolving to whether its result got published.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, frame: Frame) -> (u64, JoinHandle<bool>) {
        let sequence = self.shared.next_sequence.fetch_add(1, Ordering::Relaxed);
        let shared = Arc::clone(&self.shared);
        let handle = tokio::task::spawn_blocking(move || shared.process(sequence, &frame));
        (sequence, handle)
    }

    /// Processes a frame on the calling thread.
    pub fn process_now(&self, frame: &Frame) -> bool {
        let sequence = self.shared.next_sequence.fetch_add(1, Ordering::Relaxed);
        self.shared.process(sequence, frame)
    }

    pub fn latest(&self) -> Published {
        self.shared.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> LatestAnnotations {
        LatestAnnotations {
            receiver: self.shared.latest.subscribe(),
        }
    }
}

impl<R: TextRecognizer> Shared<R> {
    #[instrument(level = "debug", skip(self, frame))]
    fn process(&self, sequence: u64, frame: &Frame) -> bool {
        let (width, height) = frame.size();
        let annotations = if width == 0 || height == 0 {
            log::warn!("Frame {sequence} has no pixels, clearing annotations");
            FrameAnnotations::default()
        } else {
            match self.recognizer.recognize(frame) {
                Ok(recognition) => {
                    let transform =
                        DisplayTransform::aspect_fill((width, height), self.display_size);
                    let lines = recognition.into_lines(width, height);
                    self.filter.annotate(lines, &transform)
                }
                Err(err) => {
                    log::warn!("Recognition of frame {sequence} failed: {err}");
                    FrameAnnotations::default()
                }
            }
        };
        self.publish(sequence, annotations)
    }

    fn publish(&self, sequence: u64, annotations: FrameAnnotations) -> bool {
        let annotations = Arc::new(annotations);
        let published = self.latest.send_if_modified(|current| {
            if current.sequence >= sequence {
                return false;
            }
            *current = Published {
                sequence,
                annotations: Arc::clone(&annotations),
            };
            true
        });
        if !published {
            log::debug!("Dropping result of frame {sequence}, a newer frame is already shown");
        }
        published
    }
}

/// Receiving end of the slot, for whatever owns the rendering surface.
#[derive(Debug, Clone)]
pub struct LatestAnnotations {
    receiver: watch::Receiver<Published>,
}

impl LatestAnnotations {
    pub fn current(&self) -> Published {
        self.receiver.borrow().clone()
    }

    /// Waits until a newer result is published. Intermediate results that
    /// were replaced before this call woke up are skipped. Returns `None` once
    /// every processor handle is gone.
    pub async fn changed(&mut self) -> Option<Published> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Waits for the next result and redraws the surface with it.
    pub async fn render_next(&mut self, surface: &mut impl RenderSurface) -> Option<u64> {
        let published = self.changed().await?;
        published.annotations.apply(surface);
        Some(published.sequence)
    }
}
