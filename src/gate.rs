use std::collections::VecDeque;

pub type Deferred = Box<dyn FnOnce() + Send + 'static>;

/// Open/paused state of the display plus the end callbacks waiting for it to
/// open. Pauses nest: the gate stays paused until every pause is released.
#[derive(Default)]
pub struct Gate {
    depth: usize,
    deferred: VecDeque<Deferred>,
}

impl Gate {
    pub fn is_paused(&self) -> bool {
        self.depth > 0
    }

    pub fn pause(&mut self) {
        self.depth += 1;
    }

    /// Releases one pause and reports whether the gate is now open.
    pub fn release(&mut self) -> bool {
        self.depth = self.depth.saturating_sub(1);
        !self.is_paused()
    }

    pub fn defer(&mut self, callback: Deferred) {
        self.deferred.push_back(callback);
    }

    /// Next callback to run, or `None` while paused.
    pub fn next_ready(&mut self) -> Option<Deferred> {
        if self.is_paused() {
            return None;
        }
        self.deferred.pop_front()
    }

    pub fn pending(&self) -> usize {
        self.deferred.len()
    }
}

#[cfg(test)]
mod test {
    use super::Gate;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn holds_callbacks_while_paused() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut gate = Gate::default();
        gate.pause();
        for i in 0..3 {
            let order = order.clone();
            gate.defer(Box::new(move || order.lock().push(i)));
        }
        assert!(gate.next_ready().is_none());
        assert_eq!(gate.pending(), 3);

        assert!(gate.release());
        while let Some(callback) = gate.next_ready() {
            callback();
        }
        assert_eq!(*order.lock(), [0, 1, 2]);
    }

    #[test]
    fn nested_pauses_need_matching_releases() {
        let mut gate = Gate::default();
        gate.pause();
        gate.pause();
        assert!(!gate.release());
        assert!(gate.is_paused());
        assert!(gate.release());
        assert!(gate.release());
        assert!(!gate.is_paused());
    }
}
