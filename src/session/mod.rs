//! Viewer sessions.
//!
//! A session is one live [`Viewer`](crate::viewer::Viewer) addressed by a
//! [`SessionId`]. The HTTP layer creates sessions, submits motions to them
//! and reads their registrations back.

mod registry;

pub use registry::{
    SessionId, SessionInfo, SessionRegistry, SharedViewer, DEFAULT_MAX_VIEWER_PIXELS,
    DEFAULT_SESSION_CAPACITY,
};
