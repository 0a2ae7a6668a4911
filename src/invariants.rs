use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;

use lazy_static::lazy_static;
use log::error;

/// Filesystem guarantees the staging and deploy steps promise to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Invariant {
    /// A dependency copy never replaces a file already present at the destination.
    StagingNeverOverwrites,
    /// After a deploy, the target holds exactly the source tree: the old tree was
    /// removed first, never merged into.
    DeployReplacesTree,
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StagingNeverOverwrites => "staging never overwrites an existing file",
            Self::DeployReplacesTree => "deployed tree is replaced, never merged",
        })
    }
}

lazy_static! {
    /// Invariants that have been asserted and held at least once in this process.
    static ref CHECKED: Mutex<HashSet<Invariant>> = Mutex::new(HashSet::new());
}

/// Asserts that `invariant` holds.
///
/// A violation is logged and panics in debug and test builds; release builds log
/// and carry on. A successful check is recorded for [`contract_test`].
pub fn assert_invariant(condition: bool, invariant: Invariant, detail: &str) {
    if !condition {
        let msg = format!("INVARIANT VIOLATION ({}): {}", invariant, detail);
        error!("{}", msg);
        if cfg!(debug_assertions) || cfg!(test) {
            panic!("{}", msg);
        }
    } else if let Ok(mut set) = CHECKED.lock() {
        set.insert(invariant);
    }
}

/// Panics unless every invariant in `required` was asserted during this process.
#[allow(dead_code)]
pub fn contract_test(context: &str, required: &[Invariant]) {
    let checked = CHECKED.lock().unwrap();
    let missing: Vec<&Invariant> = required.iter().filter(|i| !checked.contains(*i)).collect();

    if !missing.is_empty() {
        panic!(
            "Contract test '{}' failed, these invariants were never checked:\n{:#?}",
            context, missing
        );
    }
}
