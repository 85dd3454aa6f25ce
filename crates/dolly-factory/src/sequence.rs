use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use dolly_core::Value;

/// Monotonic value generator for fields that need unique defaults.
///
/// Each call to `next` bumps the counter first, so the first generated value
/// sees `1`. Clones carry their own counter, starting from the value the
/// original had at clone time.
#[derive(Clone)]
pub struct Sequence {
    counter: Cell<u64>,
    generator: Rc<dyn Fn(u64) -> Value>,
}

impl Sequence {
    pub fn new<F, V>(generator: F) -> Self
    where
        F: Fn(u64) -> V + 'static,
        V: Into<Value>,
    {
        Self {
            counter: Cell::new(0),
            generator: Rc::new(move |n| generator(n).into()),
        }
    }

    /// Sequence producing `pattern` with every `{n}` replaced by the counter.
    pub fn template(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        Self::new(move |n| pattern.replace("{n}", &n.to_string()))
    }

    pub fn next(&self) -> Value {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        (self.generator)(n)
    }

    pub fn counter(&self) -> u64 {
        self.counter.get()
    }

    pub fn reset(&self) {
        self.counter.set(0);
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("counter", &self.counter.get())
            .finish_non_exhaustive()
    }
}
