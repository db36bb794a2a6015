//! Middle layer: IR and lowering passes

pub mod ir;
pub mod passes;
pub mod tmp;

pub use ir::*;
pub use passes::{LowerError, LoweringPass, PassKind, Pipeline};
pub use tmp::{TmpCounter, TmpSource};
