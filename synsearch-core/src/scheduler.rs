/// Round-robin driver for step-wise tasks.
///
/// A host calls [`Scheduler::tick`] from its own update loop; each tick
/// advances one task by one step, so no single call blocks for more than one
/// archive. Finished tasks are dropped. There is no cancellation.
pub struct Scheduler<T> {
    tasks: Vec<T>,
    cursor: usize,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            cursor: 0,
        }
    }
}

impl<T: Iterator> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, task: T) {
        self.tasks.push(task);
    }

    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks not yet finished.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_idle()
    }

    /// Runs one step of the next task in turn. `None` once every task is done.
    pub fn tick(&mut self) -> Option<T::Item> {
        while !self.tasks.is_empty() {
            self.cursor %= self.tasks.len();
            match self.tasks[self.cursor].next() {
                Some(item) => {
                    self.cursor += 1;
                    return Some(item);
                }
                None => {
                    self.tasks.remove(self.cursor);
                }
            }
        }
        self.cursor = 0;
        None
    }

    /// Ticks until idle.
    pub fn drain(&mut self) -> impl Iterator<Item = T::Item> + '_ {
        std::iter::from_fn(move || self.tick())
    }
}

impl<T: Iterator> Extend<T> for Scheduler<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.tasks.extend(iter);
    }
}
