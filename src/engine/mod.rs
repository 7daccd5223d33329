//! Frame-driven ticker engine: scene construction, seamless scrolling, hover zoom, CPU
//! rasterization and the host surface contract.

pub mod assets;
pub mod fps;
pub mod interaction;
pub mod raster;
pub mod scene;
pub mod scroll;
pub mod session;
pub mod surface;
pub mod tween;

pub use assets::{AssetLoader, FsAssetLoader, LoadedAssets, MemoryAssetLoader, load_all};
pub use fps::{FpsMeter, QualitySignal};
pub use interaction::Interaction;
pub use raster::{AtlasTextures, FrameRGBA, render_scene};
pub use scene::{Scene, SceneSprite, SpriteHandle, SpriteTransform};
pub use scroll::ScrollState;
pub use session::{Engine, EngineOptions, EngineState};
pub use surface::{InMemorySurface, PngSequenceSurface, Surface, SurfaceProbe};
pub use tween::{Ease, Lerp, Tween};
