use std::sync::{
    Mutex,
    PoisonError,
};

use hashbrown::HashSet;

use super::rule::RuleFamily;
use crate::data_structs::tree::NodeId;

/// Per-scan record of which family passes already ran on which container.
#[derive(Debug, Default)]
pub struct OnceGuard {
    claimed: Mutex<HashSet<(RuleFamily, NodeId)>>,
}

impl OnceGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the pass of `family` over `node`. Returns `false` if it was
    /// already claimed during this scan.
    pub fn claim(
        &self,
        family: RuleFamily,
        node: NodeId,
    ) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((family, node))
    }

    pub fn is_claimed(
        &self,
        family: RuleFamily,
        node: NodeId,
    ) -> bool {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(family, node))
    }

    pub fn reset(&self) {
        self.claimed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
