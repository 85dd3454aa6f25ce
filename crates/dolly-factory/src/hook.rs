use std::fmt;
use std::rc::Rc;

use dolly_core::Record;

/// Point in resolution at which a hook runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// After the field merge, before belongs-to associations and the insert.
    Before,
    /// After the insert and every has-one/has-many association.
    After,
}

/// Callback allowed to mutate a record during resolution.
#[derive(Clone)]
pub struct Hook {
    phase: Phase,
    callback: Rc<dyn Fn(&mut Record)>,
}

impl Hook {
    pub fn new(phase: Phase, callback: impl Fn(&mut Record) + 'static) -> Self {
        Self {
            phase,
            callback: Rc::new(callback),
        }
    }

    pub fn before(callback: impl Fn(&mut Record) + 'static) -> Self {
        Self::new(Phase::Before, callback)
    }

    pub fn after(callback: impl Fn(&mut Record) + 'static) -> Self {
        Self::new(Phase::After, callback)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn run(&self, record: &mut Record) {
        (self.callback)(record);
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}
