use log::debug;

use crate::geometry::{Point, Rect};
use crate::platform::InputEvent;

/// 移动超过该距离（任一轴）才重绘选框
pub const REDRAW_THRESHOLD: i32 = 1;

// SelectionAction: 单个事件处理后需要外部执行的动作
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionAction {
    None,
    /// 擦除旧框（若有）并绘制新框
    Redraw {
        erase: Option<Rect>,
        draw: Rect,
    },
    Finished,
    Dismissed,
}

// SelectionMode: 内部状态机，Finalized 为终态
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionMode {
    Idle,
    Dragging,
    Finalized,
}

// SelectionState: 一次选区会话的全部可变状态，由会话独占持有
#[derive(Clone, Debug)]
pub struct SelectionState {
    start: Point,
    end: Point,
    mode: SelectionMode,
    last_drawn: Option<Rect>,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionState {
    pub fn new() -> Self {
        Self {
            start: Point::default(),
            end: Point::default(),
            mode: SelectionMode::Idle,
            last_drawn: None,
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        self.mode == SelectionMode::Dragging
    }

    pub fn is_finalized(&self) -> bool {
        self.mode == SelectionMode::Finalized
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn last_drawn(&self) -> Option<Rect> {
        self.last_drawn
    }

    pub fn handle_event(&mut self, event: &InputEvent) -> SelectionAction {
        if self.is_finalized() {
            return SelectionAction::None;
        }
        match *event {
            InputEvent::PrimaryDown(pos) => {
                self.start = pos;
                self.end = pos;
                self.last_drawn = None;
                self.mode = SelectionMode::Dragging;
                debug!("drag started at ({}, {})", pos.x, pos.y);
                SelectionAction::None
            }
            InputEvent::PointerMoved { pos, primary_held } => {
                if !primary_held || !self.is_dragging() {
                    return SelectionAction::None;
                }
                if !pos.moved_beyond(self.end, REDRAW_THRESHOLD) {
                    return SelectionAction::None;
                }
                let draw = Rect::from_corners(self.start, pos);
                let erase = self.last_drawn.replace(draw);
                self.end = pos;
                SelectionAction::Redraw { erase, draw }
            }
            InputEvent::PrimaryUp(pos) => {
                if !self.is_dragging() {
                    return SelectionAction::None;
                }
                self.end = pos;
                self.mode = SelectionMode::Finalized;
                debug!("drag finished at ({}, {})", pos.x, pos.y);
                SelectionAction::Finished
            }
            InputEvent::Dismissed => SelectionAction::Dismissed,
        }
    }

    /// 重绘失败时调用：失败的重绘不会动屏幕，`on_screen` 即上一次 Redraw 的 `erase`，
    /// 下次重绘会擦除它而不是擦除没画出来的新框
    pub fn restore_outline(&mut self, on_screen: Option<Rect>) {
        self.last_drawn = on_screen;
    }

    /// 由起止点得到的规范化矩形（未校验面积）
    pub fn selection(&self) -> Rect {
        Rect::from_corners(self.start, self.end)
    }
}
