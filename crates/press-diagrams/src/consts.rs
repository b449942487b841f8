//! Default deadlines for diagram rendering.

use std::time::Duration;

/// Deadline for the local CLI renderer.
pub const CLI_TIMEOUT: Duration = Duration::from_secs(30);

/// Deadline for each diagram service request.
pub const SERVICE_TIMEOUT: Duration = Duration::from_secs(15);

/// Default CLI canvas in pixels.
pub(crate) const DEFAULT_WIDTH: u32 = 800;
pub(crate) const DEFAULT_HEIGHT: u32 = 600;
