//! Frontend: listing text to nodes and back

pub mod listing;

pub use listing::{parse_listing, print_listing, Listing, ParseError};
