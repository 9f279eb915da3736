use log::{debug, info, warn};
use thiserror::Error;

use crate::geometry::Rect;
use crate::overlay::state::{SelectionAction, SelectionState};
use crate::platform::{OverlayBackend, OverlaySurface, PlatformError};

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("failed to set up selection overlay: {0}")]
    Setup(#[source] PlatformError),

    #[error("input loop failed: {0}")]
    EventLoop(#[source] PlatformError),

    #[error("invalid region dimensions: width={width}, height={height}")]
    InvalidRegion { width: i32, height: i32 },

    #[error("selection cancelled")]
    Cancelled,
}

/// 显示全屏覆盖层并阻塞当前线程，直到用户完成一次拖拽（或关闭覆盖层）。
///
/// 返回规范化后的选区；宽或高 <= 0（例如单击未拖动）时返回 `InvalidRegion`。
/// 覆盖层在所有返回路径上都会被销毁。
pub fn select_region<B: OverlayBackend>(backend: &mut B) -> Result<Rect, SelectError> {
    let mut window = backend.create_overlay().map_err(SelectError::Setup)?;
    info!("overlay shown, waiting for selection");
    let mut state = SelectionState::new();

    loop {
        let event = match window.next_event().map_err(SelectError::EventLoop)? {
            Some(event) => event,
            None => {
                debug!("event source closed before selection finished");
                break;
            }
        };
        match state.handle_event(&event) {
            SelectionAction::Redraw { erase, draw } => {
                if let Err(e) = window.redraw_outline(erase, draw) {
                    warn!("outline redraw skipped: {e}");
                    state.restore_outline(erase);
                }
            }
            SelectionAction::Dismissed => {
                info!("selection dismissed");
                return Err(SelectError::Cancelled);
            }
            SelectionAction::Finished | SelectionAction::None => {}
        }
        if state.is_finalized() {
            break;
        }
    }
    drop(window);

    let rect = state
        .selection()
        .validate()
        .map_err(|e| SelectError::InvalidRegion {
            width: e.width,
            height: e.height,
        })?;
    info!("selected {rect}");
    Ok(rect)
}
