//! Narrow platform capability interfaces, one per probe.
//!
//! Probes never touch ambient platform state directly. A host embeds the
//! suite by implementing these traits over its real browser APIs; tests use
//! the fixed providers in [`fixture`].

pub mod fixture;

use crate::canvas::CanvasScene;
use async_trait::async_trait;
use spectaguard_core::{CapabilityInventory, PlatformError, ScreenGeometry};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Result of a platform capability read.
pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

/// Identity-surface attributes (navigator, screen, locale).
pub trait IdentitySurface: Send + Sync {
    /// User-agent string
    fn user_agent(&self) -> PlatformResult<String>;
    /// Primary language
    fn language(&self) -> PlatformResult<String>;
    /// Declared language list
    fn languages(&self) -> PlatformResult<Vec<String>>;
    /// Platform string (e.g. `Win32`, `MacIntel`)
    fn platform(&self) -> PlatformResult<String>;
    /// Whether cookies are enabled
    fn cookie_enabled(&self) -> PlatformResult<bool>;
    /// Raw do-not-track declaration
    fn do_not_track(&self) -> PlatformResult<Option<String>>;
    /// IANA timezone name
    fn timezone(&self) -> PlatformResult<String>;
    /// Screen geometry and depth
    fn screen(&self) -> PlatformResult<ScreenGeometry>;
    /// Device-memory hint in GiB
    fn device_memory(&self) -> PlatformResult<Option<f64>>;
    /// Logical-core-count hint
    fn hardware_concurrency(&self) -> PlatformResult<Option<u32>>;
    /// Touch capability flag
    fn touch_support(&self) -> PlatformResult<bool>;
    /// Installed plugin names
    fn plugins(&self) -> PlatformResult<Vec<String>>;

    /// Whether a cryptographic digest is available for hashing.
    fn digest_available(&self) -> bool {
        true
    }
}

/// Offscreen raster surface.
pub trait CanvasSurface: Send + Sync {
    /// Render `scene` and serialise the pixel buffer to an encoded string
    /// (a `data:` URL on browser hosts).
    fn render(&self, scene: &CanvasScene) -> PlatformResult<String>;

    /// Whether a cryptographic digest is available for hashing.
    fn digest_available(&self) -> bool {
        true
    }
}

/// Parameters for opening a real-time-transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Rendezvous (STUN) server URLs
    pub ice_servers: Vec<String>,
}

/// One address-discovery event from a transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateEvent {
    /// A candidate descriptor line
    Candidate(String),
    /// Discovery has finished; no more candidates follow
    GatheringComplete,
}

/// Factory for real-time-transport sessions.
#[async_trait]
pub trait TransportSurface: Send + Sync {
    /// Open a session. Fails when the transport API is absent or blocked.
    async fn open_session(&self, config: &SessionConfig)
        -> PlatformResult<Box<dyn TransportSession>>;
}

/// A locally negotiated session that is never connected to a remote peer.
#[async_trait]
pub trait TransportSession: Send {
    /// Create a data channel purely to trigger candidate discovery.
    fn create_data_channel(&mut self, label: &str) -> PlatformResult<()>;

    /// Create and apply the local offer, starting discovery.
    ///
    /// Events arrive on the returned receiver until `GatheringComplete`, the
    /// sender is dropped, or `cancel` fires.
    async fn start_discovery(
        &mut self,
        cancel: CancellationToken,
    ) -> PlatformResult<mpsc::UnboundedReceiver<CandidateEvent>>;

    /// Tear the session down. Idempotent.
    fn close(&mut self);
}

/// A key/value web storage area.
pub trait WebStorage: Send + Sync {
    /// Store `value` under `key`
    fn set_item(&self, key: &str, value: &str) -> PlatformResult<()>;
    /// Read the value under `key`
    fn get_item(&self, key: &str) -> PlatformResult<Option<String>>;
    /// Delete `key`
    fn remove_item(&self, key: &str) -> PlatformResult<()>;
    /// Number of stored entries
    fn len(&self) -> PlatformResult<usize>;
}

/// Cookie, storage, header and capability surfaces.
pub trait StorageSurface: Send + Sync {
    /// Declared cookie support
    fn cookies_enabled(&self) -> PlatformResult<bool>;
    /// Write a cookie string (`name=value; attrs`)
    fn set_cookie(&self, cookie: &str) -> PlatformResult<()>;
    /// Current readable cookie string
    fn cookie_string(&self) -> PlatformResult<String>;
    /// Persistent storage area
    fn local_storage(&self) -> PlatformResult<&dyn WebStorage>;
    /// Session-scoped storage area
    fn session_storage(&self) -> PlatformResult<&dyn WebStorage>;
    /// Raw do-not-track declaration
    fn do_not_track(&self) -> PlatformResult<Option<String>>;
    /// Page scheme including the colon (e.g. `https:`)
    fn protocol(&self) -> PlatformResult<String>;
    /// Whether a `<meta http-equiv=...>` element with this name exists
    fn has_meta_http_equiv(&self, name: &str) -> PlatformResult<bool>;
    /// Inventory of sensitive capability surfaces
    fn capabilities(&self) -> PlatformResult<CapabilityInventory>;
    /// User-agent string
    fn user_agent(&self) -> PlatformResult<String>;
}

/// One provider per probe, shared by reference count.
#[derive(Clone)]
pub struct PlatformProviders {
    /// Identity attributes for the fingerprint probe
    pub identity: Arc<dyn IdentitySurface>,
    /// Raster surface for the canvas probe
    pub canvas: Arc<dyn CanvasSurface>,
    /// Session factory for the transport leak probe
    pub transport: Arc<dyn TransportSurface>,
    /// Storage and header surfaces for the storage probe
    pub storage: Arc<dyn StorageSurface>,
}

impl std::fmt::Debug for PlatformProviders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformProviders").finish_non_exhaustive()
    }
}
