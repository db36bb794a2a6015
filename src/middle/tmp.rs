//! 临时寄存器分配
//!
//! Lowering passes ask a [`TmpSource`] for fresh temporaries and never invent ids
//! themselves. Uniqueness across a compilation unit is the source's job.

use crate::middle::ir::{Origin, RegClass, Tmp, TmpId};
use crate::middle::passes::LowerError;

/// Hands out fresh virtual temporaries
pub trait TmpSource {
    /// Allocate a temporary no other call on this source has returned
    ///
    /// Fails with [`LowerError::TemporariesExhausted`] once the id space is used up.
    fn fresh(
        &mut self,
        class: RegClass,
        origin: &Origin,
    ) -> Result<Tmp, LowerError>;
}

/// Monotonic counter, one per compilation unit
#[derive(Debug, Clone)]
pub struct TmpCounter {
    /// `None` once every id has been handed out
    next: Option<u32>,
    allocated: usize,
}

impl TmpCounter {
    /// Counter starting at id 0
    pub fn new() -> Self {
        Self {
            next: Some(0),
            allocated: 0,
        }
    }

    /// Counter whose ids are all greater than `max_seen`
    ///
    /// Used when the input already contains temporaries, e.g. a listing that was
    /// lowered once and is being fed back in.
    pub fn above(max_seen: Option<TmpId>) -> Self {
        Self {
            next: max_seen.map_or(Some(0), |id| id.0.checked_add(1)),
            allocated: 0,
        }
    }

    /// Number of temporaries handed out so far
    pub fn allocated(&self) -> usize {
        self.allocated
    }

    /// Id the next allocation will get, if any are left
    pub fn next_id(&self) -> Option<TmpId> {
        self.next.map(TmpId)
    }
}

impl Default for TmpCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TmpSource for TmpCounter {
    fn fresh(
        &mut self,
        class: RegClass,
        origin: &Origin,
    ) -> Result<Tmp, LowerError> {
        let id = self.next.ok_or_else(|| LowerError::TemporariesExhausted {
            origin: origin.clone(),
        })?;
        self.next = id.checked_add(1);
        self.allocated += 1;
        Ok(Tmp {
            id: TmpId(id),
            class,
            origin: origin.clone(),
        })
    }
}
