use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;

use crate::engine::raster::FrameRGBA;
use crate::foundation::core::Viewport;
use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};

/// Host drawing surface the engine presents frames to.
pub trait Surface {
    /// Bind to the host. Fails with [`PhotoglyphError::SurfaceInit`] when no context is available.
    fn attach(&mut self) -> PhotoglyphResult<Viewport>;

    /// Current size of the surface.
    fn size(&self) -> Viewport;

    fn present(&mut self, frame: &FrameRGBA) -> PhotoglyphResult<()>;

    /// Release the host binding. Called at most once per successful attach.
    fn detach(&mut self);
}

/// Observations recorded by an [`InMemorySurface`], shared with the test that created it.
#[derive(Debug, Default)]
pub struct SurfaceProbe {
    pub attached: bool,
    pub presents: usize,
    pub detaches: usize,
    pub last_frame: Option<FrameRGBA>,
}

/// Headless surface that keeps the last presented frame.
#[derive(Debug)]
pub struct InMemorySurface {
    viewport: Viewport,
    fail_attach: bool,
    probe: Arc<Mutex<SurfaceProbe>>,
}

impl InMemorySurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            fail_attach: false,
            probe: Arc::new(Mutex::new(SurfaceProbe::default())),
        }
    }

    /// A surface whose attach always fails, for exercising initialization errors.
    pub fn unavailable(viewport: Viewport) -> Self {
        Self {
            fail_attach: true,
            ..Self::new(viewport)
        }
    }

    pub fn probe(&self) -> Arc<Mutex<SurfaceProbe>> {
        Arc::clone(&self.probe)
    }

    pub fn set_size(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn with_probe(&self, f: impl FnOnce(&mut SurfaceProbe)) {
        if let Ok(mut p) = self.probe.lock() {
            f(&mut p);
        }
    }
}

impl Surface for InMemorySurface {
    fn attach(&mut self) -> PhotoglyphResult<Viewport> {
        if self.fail_attach {
            return Err(PhotoglyphError::surface_init(
                "in-memory surface configured as unavailable",
            ));
        }
        self.with_probe(|p| p.attached = true);
        Ok(self.viewport)
    }

    fn size(&self) -> Viewport {
        self.viewport
    }

    fn present(&mut self, frame: &FrameRGBA) -> PhotoglyphResult<()> {
        self.with_probe(|p| {
            p.presents += 1;
            p.last_frame = Some(frame.clone());
        });
        Ok(())
    }

    fn detach(&mut self) {
        self.with_probe(|p| {
            p.attached = false;
            p.detaches += 1;
        });
    }
}

/// Writes every `every`-th presented frame as `frame_<n>.png` into a directory.
#[derive(Debug)]
pub struct PngSequenceSurface {
    dir: PathBuf,
    viewport: Viewport,
    every: usize,
    presented: usize,
    written: usize,
}

impl PngSequenceSurface {
    pub fn new(dir: impl Into<PathBuf>, viewport: Viewport, every: usize) -> Self {
        Self {
            dir: dir.into(),
            viewport,
            every: every.max(1),
            presented: 0,
            written: 0,
        }
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl Surface for PngSequenceSurface {
    fn attach(&mut self) -> PhotoglyphResult<Viewport> {
        std::fs::create_dir_all(&self.dir).map_err(|e| {
            PhotoglyphError::surface_init(format!("create '{}': {e}", self.dir.display()))
        })?;
        Ok(self.viewport)
    }

    fn size(&self) -> Viewport {
        self.viewport
    }

    fn present(&mut self, frame: &FrameRGBA) -> PhotoglyphResult<()> {
        let n = self.presented;
        self.presented += 1;
        if n % self.every != 0 {
            return Ok(());
        }
        let path = self.dir.join(format!("frame_{:05}.png", self.written));
        frame
            .to_rgba_image()?
            .save(&path)
            .with_context(|| format!("write frame '{}'", path.display()))?;
        self.written += 1;
        Ok(())
    }

    fn detach(&mut self) {
        tracing::debug!(frames = self.written, dir = %self.dir.display(), "png surface detached");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/surface.rs"]
mod tests;
