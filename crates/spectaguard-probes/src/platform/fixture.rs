//! Fixed platform providers.
//!
//! These stand in for real browser state so that probes, the orchestrator and
//! the whole pipeline can run against injected, reproducible values.

use super::{
    CandidateEvent, CanvasSurface, IdentitySurface, PlatformProviders, PlatformResult,
    SessionConfig, StorageSurface, TransportSession, TransportSurface, WebStorage,
};
use crate::canvas::CanvasScene;
use async_trait::async_trait;
use spectaguard_core::{CapabilityInventory, IdentitySnapshot, PlatformError, ScreenGeometry};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Providers describing an ordinary desktop browser with nothing hidden.
#[must_use]
pub fn typical_desktop() -> PlatformProviders {
    PlatformProviders {
        identity: Arc::new(FixedIdentity::typical_desktop()),
        canvas: Arc::new(FixedCanvas::png(6_000)),
        transport: Arc::new(ScriptedTransport::new(vec![
            ScriptStep::Candidate(
                "candidate:1 1 udp 2122260223 192.168.1.23 54321 typ host".to_string(),
            ),
            ScriptStep::Delay(Duration::from_millis(200)),
            ScriptStep::Candidate(
                "candidate:2 1 udp 1686052607 203.0.113.7 54321 typ srflx".to_string(),
            ),
            ScriptStep::Complete,
        ])),
        storage: Arc::new(FixedStorage::typical_desktop()),
    }
}

/// Identity attributes served from a fixed snapshot.
#[derive(Debug, Clone)]
pub struct FixedIdentity {
    /// Values returned by every read
    pub snapshot: IdentitySnapshot,
    /// When set, every read fails with this error
    pub failure: Option<PlatformError>,
    /// Whether SHA-256 is reported as available
    pub digest: bool,
}

impl FixedIdentity {
    /// Chrome on Windows at 1920x1080.
    #[must_use]
    pub fn typical_desktop() -> Self {
        Self::new(IdentitySnapshot {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            language: "en-US".to_string(),
            languages: vec!["en-US".to_string(), "en".to_string()],
            platform: "Win32".to_string(),
            cookie_enabled: true,
            do_not_track: None,
            timezone: "America/New_York".to_string(),
            screen: ScreenGeometry {
                width: 1920,
                height: 1080,
                color_depth: 24,
                pixel_depth: 24,
            },
            device_memory: Some(8.0),
            hardware_concurrency: Some(8),
            touch_support: false,
            plugins: vec![
                "PDF Viewer".to_string(),
                "Chrome PDF Viewer".to_string(),
                "Chromium PDF Viewer".to_string(),
                "Microsoft Edge PDF Viewer".to_string(),
                "WebKit built-in PDF".to_string(),
            ],
        })
    }

    /// Serve `snapshot`.
    #[must_use]
    pub fn new(snapshot: IdentitySnapshot) -> Self {
        Self {
            snapshot,
            failure: None,
            digest: true,
        }
    }

    /// Every read fails with `error`.
    #[must_use]
    pub fn failing(error: PlatformError) -> Self {
        Self {
            snapshot: IdentitySnapshot::default(),
            failure: Some(error),
            digest: true,
        }
    }

    fn read<T>(&self, f: impl FnOnce(&IdentitySnapshot) -> T) -> PlatformResult<T> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(f(&self.snapshot)),
        }
    }
}

impl IdentitySurface for FixedIdentity {
    fn user_agent(&self) -> PlatformResult<String> {
        self.read(|s| s.user_agent.clone())
    }

    fn language(&self) -> PlatformResult<String> {
        self.read(|s| s.language.clone())
    }

    fn languages(&self) -> PlatformResult<Vec<String>> {
        self.read(|s| s.languages.clone())
    }

    fn platform(&self) -> PlatformResult<String> {
        self.read(|s| s.platform.clone())
    }

    fn cookie_enabled(&self) -> PlatformResult<bool> {
        self.read(|s| s.cookie_enabled)
    }

    fn do_not_track(&self) -> PlatformResult<Option<String>> {
        self.read(|s| s.do_not_track.clone())
    }

    fn timezone(&self) -> PlatformResult<String> {
        self.read(|s| s.timezone.clone())
    }

    fn screen(&self) -> PlatformResult<ScreenGeometry> {
        self.read(|s| s.screen)
    }

    fn device_memory(&self) -> PlatformResult<Option<f64>> {
        self.read(|s| s.device_memory)
    }

    fn hardware_concurrency(&self) -> PlatformResult<Option<u32>> {
        self.read(|s| s.hardware_concurrency)
    }

    fn touch_support(&self) -> PlatformResult<bool> {
        self.read(|s| s.touch_support)
    }

    fn plugins(&self) -> PlatformResult<Vec<String>> {
        self.read(|s| s.plugins.clone())
    }

    fn digest_available(&self) -> bool {
        self.digest
    }
}

/// A raster surface that always encodes to the same string.
#[derive(Debug, Clone)]
pub struct FixedCanvas {
    /// Encoded output, or the rendering failure
    pub output: PlatformResult<String>,
    /// Whether SHA-256 is reported as available
    pub digest: bool,
}

impl FixedCanvas {
    /// A PNG data URL padded to exactly `len` characters.
    #[must_use]
    pub fn png(len: usize) -> Self {
        let prefix = "data:image/png;base64,";
        let mut data = String::with_capacity(len.max(prefix.len()));
        data.push_str(prefix);
        let alphabet = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
        let mut i = 0;
        while data.len() < len {
            data.push(char::from(alphabet[i % alphabet.len()]));
            i += 1;
        }
        Self::encoded(data)
    }

    /// Serve `data` verbatim.
    #[must_use]
    pub fn encoded(data: impl Into<String>) -> Self {
        Self {
            output: Ok(data.into()),
            digest: true,
        }
    }

    /// Rendering fails with `error`.
    #[must_use]
    pub fn failing(error: PlatformError) -> Self {
        Self {
            output: Err(error),
            digest: true,
        }
    }

    /// Report SHA-256 as unavailable.
    #[must_use]
    pub fn without_digest(mut self) -> Self {
        self.digest = false;
        self
    }
}

impl CanvasSurface for FixedCanvas {
    fn render(&self, _scene: &CanvasScene) -> PlatformResult<String> {
        self.output.clone()
    }

    fn digest_available(&self) -> bool {
        self.digest
    }
}

/// One step of a scripted discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Emit a candidate line
    Candidate(String),
    /// Wait before the next step
    Delay(Duration),
    /// Emit the end-of-candidates signal
    Complete,
    /// Keep the event stream open until the session is cancelled
    Hang,
}

/// A transport whose sessions replay a fixed discovery script.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    steps: Vec<ScriptStep>,
    open_failure: Option<PlatformError>,
    offer_failure: Option<PlatformError>,
    open_stalls: bool,
    offer_stalls: bool,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    /// Sessions replay `steps`.
    #[must_use]
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps,
            ..Self::default()
        }
    }

    /// Opening a session fails, as when the API is absent.
    #[must_use]
    pub fn unsupported(error: PlatformError) -> Self {
        Self {
            open_failure: Some(error),
            ..Self::default()
        }
    }

    /// Sessions open but offer creation is rejected.
    #[must_use]
    pub fn offer_rejected(error: PlatformError) -> Self {
        Self {
            offer_failure: Some(error),
            ..Self::default()
        }
    }

    /// Opening a session never settles.
    #[must_use]
    pub fn open_stalled() -> Self {
        Self {
            open_stalls: true,
            ..Self::default()
        }
    }

    /// Sessions open but offer creation never settles.
    #[must_use]
    pub fn offer_stalled() -> Self {
        Self {
            offer_stalls: true,
            ..Self::default()
        }
    }

    /// Number of sessions opened so far.
    #[must_use]
    pub fn opened_sessions(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of sessions torn down so far.
    #[must_use]
    pub fn closed_sessions(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportSurface for ScriptedTransport {
    async fn open_session(
        &self,
        _config: &SessionConfig,
    ) -> PlatformResult<Box<dyn TransportSession>> {
        if let Some(err) = &self.open_failure {
            return Err(err.clone());
        }
        if self.open_stalls {
            return std::future::pending().await;
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            steps: self.steps.clone(),
            offer_failure: self.offer_failure.clone(),
            offer_stalls: self.offer_stalls,
            closed: false,
            close_counter: Arc::clone(&self.closed),
        }))
    }
}

struct ScriptedSession {
    steps: Vec<ScriptStep>,
    offer_failure: Option<PlatformError>,
    offer_stalls: bool,
    closed: bool,
    close_counter: Arc<AtomicUsize>,
}

#[async_trait]
impl TransportSession for ScriptedSession {
    fn create_data_channel(&mut self, _label: &str) -> PlatformResult<()> {
        Ok(())
    }

    async fn start_discovery(
        &mut self,
        cancel: CancellationToken,
    ) -> PlatformResult<mpsc::UnboundedReceiver<CandidateEvent>> {
        if let Some(err) = &self.offer_failure {
            return Err(err.clone());
        }
        if self.offer_stalls {
            return std::future::pending().await;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let steps = std::mem::take(&mut self.steps);

        tokio::spawn(async move {
            for step in steps {
                match step {
                    ScriptStep::Candidate(line) => {
                        if tx.send(CandidateEvent::Candidate(line)).is_err() {
                            return;
                        }
                    }
                    ScriptStep::Delay(delay) => {
                        tokio::select! {
                            () = cancel.cancelled() => return,
                            () = tokio::time::sleep(delay) => {}
                        }
                    }
                    ScriptStep::Complete => {
                        let _ = tx.send(CandidateEvent::GatheringComplete);
                    }
                    ScriptStep::Hang => {
                        cancel.cancelled().await;
                        return;
                    }
                }
            }
        });

        Ok(rx)
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.close_counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// In-memory web storage area.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
    read_only: bool,
}

impl MemoryStorage {
    /// Empty, writable storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writable storage pre-populated with `count` entries.
    #[must_use]
    pub fn with_items(count: usize) -> Self {
        let items = (0..count)
            .map(|i| (format!("existing_{i}"), format!("value_{i}")))
            .collect();
        Self {
            items: Mutex::new(items),
            read_only: false,
        }
    }

    /// Storage that rejects writes, as when the quota is zero.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            items: Mutex::default(),
            read_only: true,
        }
    }

    fn items(&self) -> PlatformResult<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| PlatformError::Failed("storage lock poisoned".to_string()))
    }
}

impl WebStorage for MemoryStorage {
    fn set_item(&self, key: &str, value: &str) -> PlatformResult<()> {
        if self.read_only {
            return Err(PlatformError::Blocked("storage quota exceeded".to_string()));
        }
        self.items()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_item(&self, key: &str) -> PlatformResult<Option<String>> {
        Ok(self.items()?.get(key).cloned())
    }

    fn remove_item(&self, key: &str) -> PlatformResult<()> {
        self.items()?.remove(key);
        Ok(())
    }

    fn len(&self) -> PlatformResult<usize> {
        Ok(self.items()?.len())
    }
}

/// Cookie, storage, header and capability state with fixed values.
#[derive(Debug)]
pub struct FixedStorage {
    /// Declared cookie support
    pub cookies_enabled: PlatformResult<bool>,
    /// Whether written cookies are retained
    pub cookie_writable: bool,
    /// Persistent storage area
    pub local: PlatformResult<MemoryStorage>,
    /// Session storage area
    pub session: PlatformResult<MemoryStorage>,
    /// Raw do-not-track declaration
    pub do_not_track: Option<String>,
    /// Page scheme, e.g. `https:`
    pub protocol: String,
    /// `http-equiv` names of the page's meta elements
    pub meta_http_equiv: Vec<String>,
    /// Capability inventory or its failure
    pub capabilities: PlatformResult<CapabilityInventory>,
    /// User-agent string
    pub user_agent: String,
    /// When set, header reads (protocol, do-not-track) fail
    pub header_failure: Option<PlatformError>,
    jar: Mutex<BTreeMap<String, String>>,
}

impl FixedStorage {
    /// Cookies on, a few persistent entries, plain HTTPS, every capability exposed.
    #[must_use]
    pub fn typical_desktop() -> Self {
        Self {
            cookies_enabled: Ok(true),
            cookie_writable: true,
            local: Ok(MemoryStorage::with_items(3)),
            session: Ok(MemoryStorage::new()),
            do_not_track: None,
            protocol: "https:".to_string(),
            meta_http_equiv: Vec::new(),
            capabilities: Ok(CapabilityInventory {
                geolocation: true,
                camera: true,
                microphone: true,
                notifications: true,
                clipboard: true,
                webgl: true,
                web_workers: true,
                service_workers: true,
                languages: 2,
                language: "en-US".to_string(),
            }),
            user_agent: FixedIdentity::typical_desktop().snapshot.user_agent,
            header_failure: None,
            jar: Mutex::default(),
        }
    }

    /// Everything locked down: no cookies, no storage, DNT, HTTPS with policy.
    #[must_use]
    pub fn hardened() -> Self {
        Self {
            cookies_enabled: Ok(false),
            cookie_writable: false,
            local: Err(PlatformError::Blocked("storage disabled".to_string())),
            session: Err(PlatformError::Blocked("storage disabled".to_string())),
            do_not_track: Some("1".to_string()),
            protocol: "https:".to_string(),
            meta_http_equiv: vec!["Strict-Transport-Security".to_string()],
            capabilities: Ok(CapabilityInventory {
                languages: 1,
                language: "en-US".to_string(),
                ..CapabilityInventory::default()
            }),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; rv:115.0) Gecko/20100101 Firefox/115.0"
                .to_string(),
            header_failure: None,
            jar: Mutex::default(),
        }
    }

    fn headers(&self) -> PlatformResult<()> {
        match &self.header_failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn jar(&self) -> PlatformResult<std::sync::MutexGuard<'_, BTreeMap<String, String>>> {
        self.jar
            .lock()
            .map_err(|_| PlatformError::Failed("cookie jar poisoned".to_string()))
    }
}

impl StorageSurface for FixedStorage {
    fn cookies_enabled(&self) -> PlatformResult<bool> {
        self.cookies_enabled.clone()
    }

    fn set_cookie(&self, cookie: &str) -> PlatformResult<()> {
        let pair = cookie.split(';').next().unwrap_or_default();
        let Some((name, value)) = pair.split_once('=') else {
            return Ok(());
        };
        let expired = cookie.contains("expires=Thu, 01 Jan 1970");

        let mut jar = self.jar()?;
        if expired {
            jar.remove(name.trim());
        } else if self.cookie_writable {
            jar.insert(name.trim().to_string(), value.trim().to_string());
        }
        Ok(())
    }

    fn cookie_string(&self) -> PlatformResult<String> {
        let jar = self.jar()?;
        Ok(jar
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; "))
    }

    fn local_storage(&self) -> PlatformResult<&dyn WebStorage> {
        match &self.local {
            Ok(storage) => Ok(storage),
            Err(err) => Err(err.clone()),
        }
    }

    fn session_storage(&self) -> PlatformResult<&dyn WebStorage> {
        match &self.session {
            Ok(storage) => Ok(storage),
            Err(err) => Err(err.clone()),
        }
    }

    fn do_not_track(&self) -> PlatformResult<Option<String>> {
        self.headers()?;
        Ok(self.do_not_track.clone())
    }

    fn protocol(&self) -> PlatformResult<String> {
        self.headers()?;
        Ok(self.protocol.clone())
    }

    fn has_meta_http_equiv(&self, name: &str) -> PlatformResult<bool> {
        Ok(self
            .meta_http_equiv
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(name)))
    }

    fn capabilities(&self) -> PlatformResult<CapabilityInventory> {
        self.capabilities.clone()
    }

    fn user_agent(&self) -> PlatformResult<String> {
        Ok(self.user_agent.clone())
    }
}
