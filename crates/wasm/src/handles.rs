/// Index-addressed table whose freed slots are handed out again, so
/// mount/unmount cycles do not grow it.
#[derive(Debug)]
pub(crate) struct HandleTable<T> {
    slots: Vec<Option<T>>,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T> HandleTable<T> {
    /// Store `value` in the first free slot and return its handle.
    pub(crate) fn insert(&mut self, value: T) -> usize {
        match self.slots.iter().position(Option::is_none) {
            Some(handle) => {
                self.slots[handle] = Some(value);
                handle
            }
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            }
        }
    }

    pub(crate) fn remove(&mut self, handle: usize) -> Option<T> {
        self.slots.get_mut(handle).and_then(Option::take)
    }

    pub(crate) fn get_mut(&mut self, handle: usize) -> Option<&mut T> {
        self.slots.get_mut(handle).and_then(Option::as_mut)
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().flatten()
    }

    #[cfg(test)]
    fn capacity_used(&self) -> usize {
        self.slots.len()
    }
}
