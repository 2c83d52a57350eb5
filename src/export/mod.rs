//! Still and animated exports of the edited strip.

/// Exported file descriptor.
pub mod file;
/// Animated GIF export.
pub mod motion;
/// Progress reporting.
pub mod progress;
/// PNG/JPEG export.
pub mod still;

pub use file::{ExportedFile, FILE_PREFIX};
pub use motion::{GifExportOpts, export_gif, gif_frame_plan};
pub use progress::{NoProgress, ProgressObserver};
pub use still::{StillExportFormat, StillExportOpts, export_still};

use crate::session::editor::EditorSession;

/// Marks a session as exporting for the guard's lifetime.
///
/// Dropping the guard clears the flag and restores the live view's frame index on every exit
/// path, errors included.
pub(crate) struct ExportGuard<'a> {
    session: &'a mut EditorSession,
    frame_index: Option<usize>,
}

impl<'a> ExportGuard<'a> {
    pub(crate) fn begin(session: &'a mut EditorSession) -> Self {
        let frame_index = session.frame_index();
        session.set_exporting(true);
        Self {
            session,
            frame_index,
        }
    }

    pub(crate) fn session(&self) -> &EditorSession {
        self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut EditorSession {
        self.session
    }
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.session.set_frame_index(self.frame_index);
        self.session.set_exporting(false);
    }
}
