//! A tolerant decoder for GPS activity recordings in Garmin's Flexible and
//! Interoperable Data Transfer format.
//!
//! Traceur reads a recording front to back, tracking the message layouts
//! the stream declares for its sixteen local slots, and projects out the
//! fields track consumers care about: timestamped coordinates, already
//! converted to degrees and wall-clock time, and the session's sport
//! classification. Message types and fields outside that projection are
//! decoded and discarded. Individual fields a stream mangles are reported
//! as diagnostics and skipped; only damage to the framing itself, or a
//! data record whose slot was never defined, abandons a document.
//!
//! Most users should begin with the functions in the [`decode`] module:
//! [`decode::decode_file`] for paths (gzip-compressed recordings are
//! recognized by suffix), or [`decode::decode`] to keep partial output when
//! a document turns out to be truncated or malformed mid-stream. The
//! protocol-level parsers in [`wire`] are exposed for applications needing
//! finer control over decoding internals.

pub mod decode;
pub mod track;
pub mod wire;
