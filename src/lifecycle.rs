use log::debug;

/// Something registered at mount that must be undone at teardown.
pub trait Disposable {
    fn dispose(self: Box<Self>);
}

impl<F: FnOnce()> Disposable for F {
    fn dispose(self: Box<Self>) {
        (*self)()
    }
}

/// Listener registrations scoped to one mount, released together.
#[derive(Default)]
pub struct Registrations {
    entries: Vec<(&'static str, Box<dyn Disposable>)>,
    disposed: bool,
}

impl Registrations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a registration. Registering after disposal releases it at once.
    pub fn push(&mut self, label: &'static str, registration: Box<dyn Disposable>) {
        if self.disposed {
            registration.dispose();
            return;
        }
        self.entries.push((label, registration));
    }

    /// Keeps a value alive until disposal; dropping it is the release.
    pub fn hold<T: 'static>(&mut self, label: &'static str, value: T) {
        self.push(label, Box::new(move || drop(value)));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Releases every registration in reverse registration order.
    pub fn dispose_all(&mut self) {
        self.disposed = true;
        while let Some((label, registration)) = self.entries.pop() {
            debug!("disposing {label}");
            registration.dispose();
        }
    }
}

impl Drop for Registrations {
    fn drop(&mut self) {
        self.dispose_all();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn disposes_everything_in_reverse_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut registrations = Registrations::new();
        for name in ["resize", "mousedown", "mouseup", "mousemove"] {
            let log = Rc::clone(&log);
            registrations.push(name, Box::new(move || log.borrow_mut().push(name)));
        }
        assert_eq!(registrations.len(), 4);
        registrations.dispose_all();
        assert!(registrations.is_empty());
        assert_eq!(
            *log.borrow(),
            vec!["mousemove", "mouseup", "mousedown", "resize"]
        );
    }

    #[test]
    fn late_registrations_are_released_immediately() {
        let released = Rc::new(RefCell::new(false));
        let mut registrations = Registrations::new();
        registrations.dispose_all();
        let flag = Rc::clone(&released);
        registrations.push("late", Box::new(move || *flag.borrow_mut() = true));
        assert!(*released.borrow());
        assert!(registrations.is_empty());
    }

    #[test]
    fn held_values_drop_on_dispose() {
        let value = Rc::new(());
        let mut registrations = Registrations::new();
        registrations.hold("listener", Rc::clone(&value));
        assert_eq!(Rc::strong_count(&value), 2);
        registrations.dispose_all();
        assert_eq!(Rc::strong_count(&value), 1);
    }

    #[test]
    fn dropping_disposes() {
        let value = Rc::new(());
        {
            let mut registrations = Registrations::new();
            registrations.hold("listener", Rc::clone(&value));
        }
        assert_eq!(Rc::strong_count(&value), 1);
    }
}
