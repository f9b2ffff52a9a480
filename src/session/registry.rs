//! Registry of live viewer sessions.
//!
//! Each session owns one [`Viewer`]. Sessions are kept in an LRU cache so an
//! abandoned viewer is eventually evicted, and each viewer sits behind its
//! own mutex: motions on one viewer are serialized, motions on different
//! viewers run independently. Whole-viewer batch work runs on the blocking
//! pool so it never stalls the async runtime.
//!
//! # Example
//!
//! ```
//! use slide_viewer::session::SessionRegistry;
//! use slide_viewer::transform::Motion;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = SessionRegistry::new();
//!     let info = registry.create(64, 64, None).await.unwrap();
//!
//!     registry
//!         .apply_motion(info.id, Motion::from_degrees(90.0, None))
//!         .await
//!         .unwrap();
//!
//!     let state = registry.registration(info.id, 1, 0).await.unwrap();
//!     assert!((state.current().sy + 1.0).abs() < 1e-9);
//! }
//! ```

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::error::{SessionError, ViewerError};
use crate::transform::precision::all_finite;
use crate::transform::{Motion, TransformState};
use crate::viewer::{Region, Viewer, DEFAULT_MAX_HISTORY};

/// Default number of live sessions.
pub const DEFAULT_SESSION_CAPACITY: usize = 16;

/// Default upper bound on `width * height` for one viewer (2048 x 2048).
pub const DEFAULT_MAX_VIEWER_PIXELS: u64 = 2048 * 2048;

/// A viewer shared between requests.
pub type SharedViewer = Arc<Mutex<Viewer>>;

// =============================================================================
// Session Identifier
// =============================================================================

/// Identifier of a viewer session, displayed as 16 hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 16 {
            return Err(SessionError::NotFound {
                viewer_id: s.to_string(),
            });
        }
        u64::from_str_radix(s, 16)
            .map(SessionId)
            .map_err(|_| SessionError::NotFound {
                viewer_id: s.to_string(),
            })
    }
}

// =============================================================================
// Session Info
// =============================================================================

/// Snapshot of a session's shape and history length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionInfo {
    pub id: SessionId,
    pub width: u32,
    pub height: u32,
    pub motion_count: usize,
}

impl SessionInfo {
    fn of(id: SessionId, viewer: &Viewer) -> Self {
        Self {
            id,
            width: viewer.width(),
            height: viewer.height(),
            motion_count: viewer.motion_count(),
        }
    }
}

// =============================================================================
// SessionRegistry
// =============================================================================

/// LRU-bounded set of viewer sessions.
pub struct SessionRegistry {
    sessions: RwLock<LruCache<SessionId, SharedViewer>>,
    next_id: AtomicU64,
    max_viewer_pixels: u64,
    max_history: usize,
}

impl SessionRegistry {
    /// Create a registry with default capacity and pixel budget.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SESSION_CAPACITY, DEFAULT_MAX_VIEWER_PIXELS)
    }

    /// Create a registry holding at most `capacity` sessions, each with at
    /// most `max_viewer_pixels` registrations.
    ///
    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize, max_viewer_pixels: u64) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: RwLock::new(LruCache::new(capacity)),
            next_id: AtomicU64::new(1),
            max_viewer_pixels,
            max_history: DEFAULT_MAX_HISTORY,
        }
    }

    /// Limit how many motions each new viewer keeps for undo.
    pub fn with_history_limit(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    /// Create a viewer session.
    ///
    /// `offset` shifts the initial identity mapping by `(ox, oy)`.
    pub async fn create(
        &self,
        width: u32,
        height: u32,
        offset: Option<(f64, f64)>,
    ) -> Result<SessionInfo, SessionError> {
        let requested = u64::from(width) * u64::from(height);
        if requested > self.max_viewer_pixels {
            return Err(SessionError::TooLarge {
                requested,
                limit: self.max_viewer_pixels,
            });
        }

        let (ox, oy) = offset.unwrap_or((0.0, 0.0));
        if !all_finite(&[ox, oy]) {
            return Err(ViewerError::NonFiniteOffset { ox, oy }.into());
        }

        let max_history = self.max_history;
        let viewer = tokio::task::spawn_blocking(move || {
            Viewer::with_offset(width, height, ox, oy).map(|v| v.with_history_limit(max_history))
        })
        .await
        .map_err(worker_error)??;

        let id = SessionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let info = SessionInfo::of(id, &viewer);
        let history_limit = viewer.history_limit();

        let mut sessions = self.sessions.write().await;
        if let Some((evicted, _)) = sessions.push(id, Arc::new(Mutex::new(viewer))) {
            if evicted != id {
                info!(viewer_id = %evicted, "Evicted least recently used viewer");
            }
        }

        info!(
            viewer_id = %id,
            width,
            height,
            history_limit,
            "Created viewer session"
        );
        Ok(info)
    }

    /// Look up a session, marking it as recently used.
    pub async fn get(&self, id: SessionId) -> Result<SharedViewer, SessionError> {
        let mut sessions = self.sessions.write().await;
        sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound {
                viewer_id: id.to_string(),
            })
    }

    /// Current shape and history length of a session.
    pub async fn info(&self, id: SessionId) -> Result<SessionInfo, SessionError> {
        let viewer = self.get(id).await?;
        let viewer = viewer.lock().await;
        Ok(SessionInfo::of(id, &viewer))
    }

    /// Apply a motion to every registration of a session.
    ///
    /// The motion is validated first; non-finite input never reaches the engine.
    pub async fn apply_motion(
        &self,
        id: SessionId,
        motion: Motion,
    ) -> Result<SessionInfo, SessionError> {
        motion.validate()?;
        let viewer = self.get(id).await?;
        let mut guard = viewer.lock_owned().await;

        let info = tokio::task::spawn_blocking(move || {
            guard.apply(motion);
            SessionInfo::of(id, &guard)
        })
        .await
        .map_err(worker_error)?;

        debug!(
            viewer_id = %id,
            theta = motion.theta,
            motion_count = info.motion_count,
            "Applied motion"
        );
        Ok(info)
    }

    /// Undo the most recent motion of a session.
    pub async fn undo(&self, id: SessionId) -> Result<(SessionInfo, Motion), SessionError> {
        let viewer = self.get(id).await?;
        let mut guard = viewer.lock_owned().await;

        let (info, undone) = tokio::task::spawn_blocking(move || {
            let undone = guard.undo();
            (SessionInfo::of(id, &guard), undone)
        })
        .await
        .map_err(worker_error)?;

        let undone = undone.ok_or(ViewerError::NothingToUndo)?;
        debug!(viewer_id = %id, theta = undone.theta, "Undid motion");
        Ok((info, undone))
    }

    /// Registration of one viewer pixel.
    pub async fn registration(
        &self,
        id: SessionId,
        vx: i64,
        vy: i64,
    ) -> Result<TransformState, SessionError> {
        let viewer = self.get(id).await?;
        let viewer = viewer.lock().await;
        viewer.registration(vx, vy).copied().ok_or_else(|| {
            ViewerError::PixelOutOfBounds {
                vx,
                vy,
                width: viewer.width(),
                height: viewer.height(),
            }
            .into()
        })
    }

    /// Registrations inside a rectangle of a session, clipped to its extent.
    pub async fn region(
        &self,
        id: SessionId,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<Region, SessionError> {
        let viewer = self.get(id).await?;
        let viewer = viewer.lock().await;
        Ok(viewer.region(x, y, width, height)?)
    }

    /// Remove a session.
    pub async fn remove(&self, id: SessionId) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        match sessions.pop(&id) {
            Some(_) => {
                info!(viewer_id = %id, "Removed viewer session");
                Ok(())
            }
            None => Err(SessionError::NotFound {
                viewer_id: id.to_string(),
            }),
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn worker_error(e: tokio::task::JoinError) -> SessionError {
    SessionError::Worker {
        message: e.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
