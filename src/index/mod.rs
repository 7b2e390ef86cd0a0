//! Segment-level collaborators: posting lists and segment readers.
//!
//! The engine only reads segments. [`MemorySegment`] is an in-memory
//! implementation built from pre-tokenized documents.

pub mod posting;
pub mod reader;
pub mod segment;

pub use posting::{EncodedPostings, MemoryPostingList, Posting, PostingList, PostingListConfig};
pub use reader::{FieldStats, SegmentReader, SegmentRef};
pub use segment::{MemorySegment, MemorySegmentBuilder};
