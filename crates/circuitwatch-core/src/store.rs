// ── Circuit store ──
//
// Holds the deduplicated circuits from the latest discovery run.
// Contents are replaced wholesale, never patched.

use chrono::{DateTime, Utc};

use crate::model::Circuit;

#[derive(Debug, Clone, Default)]
pub struct CircuitStore {
    circuits: Vec<Circuit>,
    rebuilt_at: Option<DateTime<Utc>>,
}

impl CircuitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the current contents and install `circuits`.
    pub(crate) fn replace(&mut self, circuits: Vec<Circuit>) {
        self.circuits = circuits;
        self.rebuilt_at = Some(Utc::now());
    }

    pub fn circuits(&self) -> &[Circuit] {
        &self.circuits
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Circuit> {
        self.circuits.iter()
    }

    pub fn len(&self) -> usize {
        self.circuits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circuits.is_empty()
    }

    /// When the last discovery run replaced the contents.
    pub fn rebuilt_at(&self) -> Option<DateTime<Utc>> {
        self.rebuilt_at
    }
}

impl<'a> IntoIterator for &'a CircuitStore {
    type Item = &'a Circuit;
    type IntoIter = std::slice::Iter<'a, Circuit>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
