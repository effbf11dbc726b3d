//! Core interval-chain functionality
//!
//! This module contains the segment and chain data model, the relational
//! predicates, and the coordinate translation machinery.

mod chain;
mod compare;
mod error;
mod segment;
mod strand;
mod transcript;

pub use chain::{AttrValue, SegmentChain, ATTR_GENE_ID, ATTR_ID};
pub use compare::TriState;
pub use error::{
    ChainError, ChainResult, ParseError, ParseResult, Result, SegChainError,
};
pub use segment::{positions_to_segments, GenomicSegment};
pub use strand::Strand;
pub use transcript::Transcript;
