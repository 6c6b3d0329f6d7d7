//! The public [`Animation`] handle.

use std::path::Path;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::foundation::error::{LottieError, LottieResult};
use crate::loader::{self, LoadOpts};
use crate::model::Composition;
use crate::paint::Surface;
use crate::render::task::RenderTask;
use crate::render::{RenderFuture, RenderScheduler};
use crate::scene::{PropertyKind, PropertyValue, RenderTree, Scene};

/// Per-animation options.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnimationOpts {
    /// Rasterize the drawables of a frame on the `rayon` pool.
    pub parallel_raster: bool,
}

/// Tracks the single outstanding asynchronous render.
#[derive(Debug, Default)]
struct InFlight {
    busy: Mutex<bool>,
    idle: Condvar,
}

impl InFlight {
    fn acquire(&self) -> bool {
        let mut busy = self.busy.lock();
        !std::mem::replace(&mut *busy, true)
    }

    fn release(&self) {
        *self.busy.lock() = false;
        self.idle.notify_all();
    }

    fn wait_idle(&self) {
        let mut busy = self.busy.lock();
        while *busy {
            self.idle.wait(&mut busy);
        }
    }
}

/// Clears the busy flag when the render job ends, even by panic.
struct Release(Arc<InFlight>);

impl Drop for Release {
    fn drop(&mut self) {
        self.0.release();
    }
}

/// A loaded animation with its own evaluation state.
///
/// The parsed [`Composition`] is shared with every other `Animation` loaded
/// under the same cache key; the evaluated scene belongs to this handle alone.
#[derive(Debug)]
pub struct Animation {
    comp: Arc<Composition>,
    scene: Arc<Mutex<Scene>>,
    in_flight: Arc<InFlight>,
}

impl Animation {
    /// Load the document at `path`.
    pub fn load(path: impl AsRef<Path>) -> LottieResult<Self> {
        Self::load_with_opts(path, &LoadOpts::default(), AnimationOpts::default())
    }

    /// Load the document at `path` with explicit options.
    pub fn load_with_opts(path: impl AsRef<Path>, load: &LoadOpts, opts: AnimationOpts) -> LottieResult<Self> {
        let comp = loader::load_from_path(path.as_ref(), load)?;
        Ok(Self::from_composition(comp, opts))
    }

    /// Parse `json`. An empty `cache_key` bypasses the model cache; image
    /// assets resolve against `resource_dir`.
    pub fn load_from_data(json: &str, cache_key: &str, resource_dir: Option<&Path>) -> LottieResult<Self> {
        Self::load_from_data_with_opts(json, cache_key, resource_dir, &LoadOpts::default(), AnimationOpts::default())
    }

    /// [`Animation::load_from_data`] with explicit options.
    pub fn load_from_data_with_opts(
        json: &str,
        cache_key: &str,
        resource_dir: Option<&Path>,
        load: &LoadOpts,
        opts: AnimationOpts,
    ) -> LottieResult<Self> {
        let comp = loader::load_from_data(json, cache_key, resource_dir, load)?;
        Ok(Self::from_composition(comp, opts))
    }

    /// Wrap an already parsed composition.
    pub fn from_composition(comp: Arc<Composition>, opts: AnimationOpts) -> Self {
        let scene = Scene::new(Arc::clone(&comp), opts.parallel_raster);
        Self {
            comp,
            scene: Arc::new(Mutex::new(scene)),
            in_flight: Arc::default(),
        }
    }

    /// The shared model.
    pub fn composition(&self) -> &Arc<Composition> {
        &self.comp
    }

    /// Canvas size.
    pub fn size(&self) -> (u32, u32) {
        (self.comp.width, self.comp.height)
    }

    /// Length in seconds.
    pub fn duration(&self) -> f64 {
        self.comp.duration()
    }

    /// Number of frames.
    pub fn total_frame(&self) -> usize {
        self.comp.total_frame()
    }

    /// Frames per second.
    pub fn frame_rate(&self) -> f64 {
        f64::from(self.comp.frame_rate)
    }

    /// Frame at normalized position `pos`, clamped to `[0, 1]`.
    pub fn frame_at_pos(&self, pos: f64) -> usize {
        self.comp.frame_at_pos(pos)
    }

    /// Named segments as `(name, start frame, end frame)`.
    pub fn markers(&self) -> Vec<(String, f32, f32)> {
        self.comp
            .markers
            .iter()
            .map(|m| (m.name.clone(), m.start_frame, m.end_frame))
            .collect()
    }

    /// Render `frame` into `surface` on the calling thread.
    pub fn render_sync(&self, frame: usize, surface: &mut Surface, keep_aspect_ratio: bool) {
        self.scene.lock().render(frame as f32, surface, keep_aspect_ratio);
    }

    /// Render `frame` on the global scheduler.
    ///
    /// Only one asynchronous render may be outstanding; a second request
    /// fails with [`LottieError::RenderBusy`] and leaves the first untouched.
    pub fn render(&self, frame: usize, surface: Surface, keep_aspect_ratio: bool) -> LottieResult<RenderFuture> {
        self.render_on(RenderScheduler::global()?, frame, surface, keep_aspect_ratio)
    }

    /// [`Animation::render`] on an explicit scheduler.
    #[tracing::instrument(level = "debug", skip(self, scheduler, surface))]
    pub fn render_on(
        &self,
        scheduler: &RenderScheduler,
        frame: usize,
        surface: Surface,
        keep_aspect_ratio: bool,
    ) -> LottieResult<RenderFuture> {
        if !self.in_flight.acquire() {
            tracing::warn!(frame, "render request rejected, previous request still in flight");
            return Err(LottieError::RenderBusy);
        }
        let (task, future) = RenderTask::new(frame, surface, keep_aspect_ratio);
        let scene = Arc::clone(&self.scene);
        let release = Release(Arc::clone(&self.in_flight));
        scheduler.spawn(Box::new(move || {
            // The slot frees before the future resolves, so a caller that
            // waited can submit again at once.
            task.run(
                |frame, surface, keep| scene.lock().render(frame as f32, surface, keep),
                move || drop(release),
            );
        }));
        Ok(future)
    }

    /// Evaluate `frame` at `width` x `height` and describe what would be drawn.
    pub fn render_tree(&self, frame: usize, width: u32, height: u32) -> RenderTree {
        self.scene.lock().render_tree(frame as f32, width, height)
    }

    /// Override a paint property on every node matching `keypath`.
    pub fn set_property(&self, keypath: &str, value: PropertyValue) -> LottieResult<()> {
        self.scene.lock().set_property(keypath, value)
    }

    /// Drop an override; returns `false` if none was set.
    pub fn remove_property(&self, keypath: &str, kind: PropertyKind) -> LottieResult<bool> {
        self.scene.lock().remove_property(keypath, kind)
    }
}

impl Drop for Animation {
    fn drop(&mut self) {
        self.in_flight.wait_idle();
    }
}

#[cfg(test)]
#[path = "../tests/unit/animation.rs"]
mod tests;
