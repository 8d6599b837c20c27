/// Linear undo/redo over whole snapshots.
///
/// `commit` drops any redo branch and appends; `amend` overwrites the
/// snapshot at the cursor without growing the list. Undo and redo only move
/// the cursor and never look inside a snapshot.
#[derive(Debug, Clone)]
pub struct History<T> {
    initial: T,
    snapshots: Vec<T>,
    index: usize,
}

impl<T: Clone> History<T> {
    pub fn new(initial: T) -> Self {
        Self {
            snapshots: vec![initial.clone()],
            initial,
            index: 0,
        }
    }

    pub fn current(&self) -> &T {
        &self.snapshots[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    pub fn commit(&mut self, snapshot: T) {
        self.snapshots.truncate(self.index + 1);
        self.snapshots.push(snapshot);
        self.index += 1;
        log::debug!("history commit -> {}/{}", self.index, self.snapshots.len());
    }

    pub fn amend(&mut self, snapshot: T) {
        self.snapshots[self.index] = snapshot;
    }

    /// Returns `false` when already at the oldest snapshot.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.index -= 1;
        log::debug!("history undo -> {}/{}", self.index, self.snapshots.len());
        true
    }

    /// Returns `false` when already at the newest snapshot.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.index += 1;
        log::debug!("history redo -> {}/{}", self.index, self.snapshots.len());
        true
    }

    pub fn clear(&mut self) {
        self.snapshots = vec![self.initial.clone()];
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_then_undo_restores_prior() {
        let mut history = History::new(Vec::<u32>::new());
        history.commit(vec![1]);
        history.commit(vec![1, 2]);
        assert!(history.undo());
        assert_eq!(history.current(), &vec![1]);
        assert!(history.redo());
        assert_eq!(history.current(), &vec![1, 2]);
    }

    #[test]
    fn test_bounds_are_no_ops() {
        let mut history = History::new(0);
        assert!(!history.undo());
        assert_eq!(history.index(), 0);

        history.commit(1);
        assert!(!history.redo());
        assert_eq!(history.index(), 1);
        assert_eq!(*history.current(), 1);
    }

    #[test]
    fn test_amend_overwrites_without_growth() {
        let mut history = History::new(0);
        history.commit(1);
        for frame in 2..10 {
            history.amend(frame);
        }
        assert_eq!(history.len(), 2);
        assert_eq!(*history.current(), 9);
        history.undo();
        assert_eq!(*history.current(), 0);
    }

    #[test]
    fn test_edit_after_undo_drops_redo_branch() {
        let mut history = History::new(String::new());
        history.commit("a".to_string());
        history.commit("ab".to_string());
        history.commit("abc".to_string());
        history.undo();
        history.undo();
        history.commit("ax".to_string());

        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), "ax");
        assert!(!history.redo());
        history.undo();
        assert_eq!(history.current(), "a");
    }

    #[test]
    fn test_clear_resets_to_initial() {
        let mut history = History::new(vec![0u8]);
        for i in 1..6 {
            history.commit(vec![i]);
        }
        history.undo();
        history.clear();
        assert_eq!(history.len(), 1);
        assert_eq!(history.index(), 0);
        assert_eq!(history.current(), &vec![0u8]);
    }
}
