use std::collections::VecDeque;

/// Raw frames captured while an action is in flight. Oldest frames are
/// evicted once `capacity` is reached. Diagnostic only.
#[derive(Debug)]
pub struct FrameBuffer {
    frames: VecDeque<Vec<u8>>,
    capacity: usize,
}

impl FrameBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, frame: &[u8]) {
        while self.frames.len() >= self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame.to_vec());
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
