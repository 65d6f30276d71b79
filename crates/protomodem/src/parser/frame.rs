//! The semantic frame stack: one frame per open JSON object, array, or
//! string-valued subframe.

use alloc::{sync::Arc, vec::Vec};

use super::error::ErrorKind;
use crate::method::NameTable;
use crate::schema::{FieldDef, MessageDef};

/// Depth bound shared by the frame stack and the machine's return stack.
pub const MAX_DEPTH: usize = 64;

/// Per-depth semantic state: the message being populated, its member name
/// table, the field the current value binds to, and map-mode flags.
///
/// `field` is `None` while a member name is being parsed and set while its
/// value is. `is_map` marks the synthetic sequence frame of a map field;
/// `is_mapentry` marks a frame for one key/value entry. They are never both
/// set. `mapfield` carries the map field for both kinds of map frame.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub msg: Arc<MessageDef>,
    pub table: Arc<NameTable>,
    pub field: Option<Arc<FieldDef>>,
    pub is_map: bool,
    pub is_mapentry: bool,
    pub mapfield: Option<Arc<FieldDef>>,
}

impl Frame {
    pub fn new(msg: Arc<MessageDef>, table: Arc<NameTable>) -> Self {
        Self {
            msg,
            table,
            field: None,
            is_map: false,
            is_mapentry: false,
            mapfield: None,
        }
    }
}

#[derive(Debug)]
pub(crate) struct FrameStack {
    frames: Vec<Frame>,
}

impl FrameStack {
    pub fn new() -> Self {
        Self {
            frames: Vec::with_capacity(16),
        }
    }

    /// Clears the stack and installs the root frame.
    pub fn reset(&mut self, root: Frame) {
        self.frames.clear();
        self.frames.push(root);
    }

    pub fn push(&mut self, frame: Frame) -> Result<(), ErrorKind> {
        if self.frames.len() >= MAX_DEPTH {
            return Err(ErrorKind::NestingTooDeep);
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn last(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    #[cfg(test)]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}
