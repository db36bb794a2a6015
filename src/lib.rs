//! macrolower
//!
//! Lowering passes that turn architecture-independent macro instructions (`noti`,
//! `bmulio`, `btiz`, ...) into instruction sequences a RISC target actually has.
//!
//! # Example
//!
//! ```
//! use macrolower::{lower_to_string, middle::Pipeline, Result};
//!
//! fn main() -> Result<()> {
//!     let out = lower_to_string("inline.asm", "    btiz t0, -1, .done\n", &Pipeline::default())?;
//!     assert_eq!(out, "    bieq t0, 0, .done\n");
//!     Ok(())
//! }
//! ```

#![warn(rust_2018_idioms)]

pub mod frontend;
pub mod middle;
pub mod util;

// Re-exports
pub use anyhow::{Context, Result};

use crate::frontend::{parse_listing, print_listing};
use crate::middle::ir::Node;
use crate::middle::passes::Pipeline;
use crate::middle::tmp::TmpCounter;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tool name
pub const NAME: &str = "macrolower";

/// Parse a listing and run `pipeline` over it
///
/// Fresh temporaries start above any temporary already present in `source`.
pub fn lower_source(
    name: &str,
    source: &str,
    pipeline: &Pipeline,
) -> Result<Vec<Node>> {
    let listing = parse_listing(name, source)?;
    debug!(file = name, nodes = listing.nodes.len(), "parsed listing");

    let mut tmps = TmpCounter::above(listing.max_tmp);
    let lowered = pipeline.run(&listing.nodes, &mut tmps)?;
    debug!(file = name, temporaries = tmps.allocated(), "lowered listing");
    Ok(lowered)
}

/// [`lower_source`], printed back as listing text
pub fn lower_to_string(
    name: &str,
    source: &str,
    pipeline: &Pipeline,
) -> Result<String> {
    lower_source(name, source, pipeline).map(|nodes| print_listing(&nodes))
}

/// Lower a listing file
pub fn lower_file(
    path: &Path,
    pipeline: &Pipeline,
) -> Result<String> {
    let name = path.display().to_string();
    debug!(file = %name, "reading listing");
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read: {}", name))?;
    lower_to_string(&name, &source, pipeline)
}
