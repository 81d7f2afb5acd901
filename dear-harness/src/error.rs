//! Error types for the harness and the backends it drives

use std::fmt;

use thiserror::Error;

/// Errors a [`Backend`](crate::Backend) reports from its own calls
#[derive(Debug, Error)]
pub enum BackendError {
    /// The windowing library could not be initialized
    #[error("backend initialization failed: {0}")]
    Init(String),

    /// The native window could not be created
    #[error("window error: {0}")]
    Window(String),

    /// The graphics context could not be created or activated
    #[error("graphics context error: {0}")]
    Context(String),

    /// Graphics function loading failed
    #[error("graphics loader error: {0}")]
    Loader(String),

    /// The GUI platform layer failed
    #[error("platform backend error: {0}")]
    Platform(String),

    /// The GUI renderer failed
    #[error("renderer error: {0}")]
    Renderer(String),

    /// Presenting to the window surface failed
    #[error("surface error: {0}")]
    Surface(String),

    /// An extension context could not be created
    #[cfg(feature = "implot")]
    #[error("extension context error: {0}")]
    Extension(String),
}

/// Construction steps of a [`Harness`](crate::Harness), in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InitStage {
    BackendInit,
    WindowCreation,
    ContextActivation,
    SwapInterval,
    GraphicsLoader,
    #[cfg(feature = "implot")]
    PlotContext,
    PlatformBackend,
    RendererBackend,
}

impl fmt::Display for InitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InitStage::BackendInit => "backend initialization",
            InitStage::WindowCreation => "window creation",
            InitStage::ContextActivation => "context activation",
            InitStage::SwapInterval => "swap interval setup",
            InitStage::GraphicsLoader => "graphics loader initialization",
            #[cfg(feature = "implot")]
            InitStage::PlotContext => "plot context creation",
            InitStage::PlatformBackend => "platform backend initialization",
            InitStage::RendererBackend => "renderer backend initialization",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the harness to its caller
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The window hints cannot produce a shader-language version
    #[error("invalid window hints: {0}")]
    InvalidHints(String),

    /// A construction step failed; the partial state has been unwound
    #[error("{stage} failed: {source}")]
    Construction {
        stage: InitStage,
        #[source]
        source: BackendError,
    },

    /// The windowing backend reported an error through its error callback
    #[error("platform error {code}: {description}")]
    Platform { code: i32, description: String },

    /// A backend call failed while producing a frame
    #[error("frame failed: {0}")]
    Frame(#[from] BackendError),

    /// A harness instance is live on another thread
    #[error("a harness instance is already owned by another thread")]
    ForeignThread,

    /// The instance behind this handle has been destroyed
    #[error("harness instance has been destroyed")]
    Destroyed,

    /// The frame loop is running and holds the instance state
    #[error("harness state is in use by the running frame loop")]
    Reentrant,
}

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;
