use std::fmt;

/// Owning slot for a GPU object.
///
/// A handle is either live (holds a value) or empty. Ownership moves with
/// [`Handle::take`], which leaves the source empty, and ends with
/// [`Handle::release`]. A handle dropped while still live logs a leak
/// diagnostic; it never panics.
pub struct Handle<T> {
    slot: Option<T>,
}

impl<T> Handle<T> {
    pub fn new(value: T) -> Self {
        Self { slot: Some(value) }
    }

    pub fn empty() -> Self {
        Self { slot: None }
    }

    pub fn is_live(&self) -> bool {
        self.slot.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.slot.as_ref()
    }

    /// Moves the value into a new handle and leaves `self` empty.
    pub fn take(&mut self) -> Handle<T> {
        Handle { slot: self.slot.take() }
    }

    /// Consumes the handle and returns the value, if any.
    pub fn release(mut self) -> Option<T> {
        self.slot.take()
    }
}

impl<T> Default for Handle<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_live() { "live" } else { "empty" };
        write!(f, "Handle<{}>({state})", std::any::type_name::<T>())
    }
}

impl<T> Drop for Handle<T> {
    fn drop(&mut self) {
        if self.slot.is_some() {
            log::warn!(
                "leaked {}: handle dropped while still live",
                std::any::type_name::<T>()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_moves_and_leaves_source_empty() {
        let mut a = Handle::new(7u32);
        let b = a.take();
        assert!(!a.is_live());
        assert_eq!(b.get(), Some(&7));
        assert_eq!(b.release(), Some(7));
        assert_eq!(a.release(), None);
    }

    #[test]
    fn take_of_empty_is_empty() {
        let mut a: Handle<u32> = Handle::empty();
        let b = a.take();
        assert!(!a.is_live() && !b.is_live());
    }

    #[test]
    fn dropping_live_handle_does_not_panic() {
        let h = Handle::new(String::from("buffer"));
        drop(h);
    }

    #[test]
    fn debug_shows_state() {
        let h = Handle::new(1u8);
        assert!(format!("{h:?}").ends_with("(live)"));
        let _ = h.release();
    }
}
