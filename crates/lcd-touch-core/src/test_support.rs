//! Shared test doubles

use heapless::Deque;

use crate::controller::TouchController;
use crate::error::TouchError;
use crate::sample::{RawPoint, TouchSample};

/// Controller that replays a queue of frames, then reports no contact
pub struct ScriptedController {
    frames: Deque<Result<TouchSample, TouchError>, 16>,
    cached: TouchSample,
    pub reads: u32,
}

impl ScriptedController {
    pub fn new() -> Self {
        Self {
            frames: Deque::new(),
            cached: TouchSample::empty(),
            reads: 0,
        }
    }

    pub fn push_points(&mut self, points: &[RawPoint]) {
        self.push(Ok(TouchSample::from_points(points)));
    }

    pub fn push_empty(&mut self) {
        self.push(Ok(TouchSample::empty()));
    }

    pub fn push_error(&mut self, error: TouchError) {
        self.push(Err(error));
    }

    fn push(&mut self, frame: Result<TouchSample, TouchError>) {
        assert!(self.frames.push_back(frame).is_ok(), "script is full");
    }
}

impl TouchController for ScriptedController {
    async fn read_data(&mut self) -> Result<(), TouchError> {
        self.reads += 1;
        self.cached = self.frames.pop_front().unwrap_or(Ok(TouchSample::empty()))?;
        Ok(())
    }

    fn get_xy(&mut self) -> TouchSample {
        core::mem::take(&mut self.cached)
    }
}
