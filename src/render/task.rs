use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::foundation::error::{LottieError, LottieResult};
use crate::paint::Surface;

/// One queued render: a frame, the surface to paint and where to send it back.
pub(crate) struct RenderTask {
    pub(crate) frame: usize,
    pub(crate) surface: Surface,
    pub(crate) keep_aspect_ratio: bool,
    sender: oneshot::Sender<LottieResult<Surface>>,
}

impl RenderTask {
    pub(crate) fn new(frame: usize, surface: Surface, keep_aspect_ratio: bool) -> (Self, RenderFuture) {
        let (sender, receiver) = oneshot::channel();
        let task = Self {
            frame,
            surface,
            keep_aspect_ratio,
            sender,
        };
        (task, RenderFuture { receiver })
    }

    /// Run `render` on the task's surface, then `finished`, then fulfil the
    /// future. A caller woken by the future therefore sees `finished` done.
    pub(crate) fn run(self, render: impl FnOnce(usize, &mut Surface, bool), finished: impl FnOnce()) {
        let Self {
            frame,
            mut surface,
            keep_aspect_ratio,
            sender,
        } = self;
        render(frame, &mut surface, keep_aspect_ratio);
        finished();
        // A dropped future means nobody wants the frame.
        let _ = sender.send(Ok(surface));
    }
}

/// Pending result of an asynchronous render; resolves to the painted surface.
#[derive(Debug)]
#[must_use = "the rendered surface is only reachable through the future"]
pub struct RenderFuture {
    receiver: oneshot::Receiver<LottieResult<Surface>>,
}

impl RenderFuture {
    /// Block the current thread until the render finishes.
    pub fn wait(self) -> LottieResult<Surface> {
        futures::executor::block_on(self)
    }
}

impl Future for RenderFuture {
    type Output = LottieResult<Surface>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver).poll(cx).map(|result| {
            result.unwrap_or_else(|_| Err(LottieError::render("render task dropped before completion")))
        })
    }
}
