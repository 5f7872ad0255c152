//! Full and relative snapshot encoding for rigid-body transforms.
//!
//! This is the main codec crate. It packs the positions and orientations of
//! many simulated bodies into bit-level snapshots, either in full or as a
//! delta against a baseline frame both peers already hold.
//!
//! # Features
//!
//! - Minimum-width range and progressive integer encoders
//! - Smallest-three quaternion compression
//! - Relative position/orientation deltas with absolute fallbacks
//! - Sparse index lists or dense flags, chosen by bit cost
//! - A per-session cache of encoded snapshots and frame history
//!
//! # Design Principles
//!
//! - **Mirrored encode/decode** - Every `encode_*` has a `decode_*` that
//!   consumes exactly the bits it wrote.
//! - **Explicit errors** - Malformed input and out-of-range values are
//!   reported, never panicked on.
//! - **Deterministic** - Same inputs and settings produce the same bytes.

mod cache;
mod delta;
mod error;
mod history;
mod index;
mod progressive;
mod quaternion;
mod range;
mod relative;
mod settings;
mod snapshot;
mod types;

pub use cache::SnapshotCache;
pub use delta::{
    decode_relative_snapshot, encode_relative_snapshot, peek_relative_encoding,
    select_relative_encoding, RelativeEncoding,
};
pub use error::{CodecError, CodecResult};
pub use history::FrameHistory;
pub use index::{
    count_relative_id_bits, decode_first_index, decode_relative_index, encode_first_index,
    encode_relative_index, relative_index_bits,
};
pub use progressive::{
    decode_unsigned_range, encode_unsigned_range, unsigned_range_limit, ORIENTATION_TIERS,
    POSITION_TIERS,
};
pub use quaternion::{
    CompressedQuaternion, QuaternionCompressor, MAX_QUATERNION_BITS, MIN_QUATERNION_BITS,
};
pub use range::{
    bits_required, decode_bool, decode_int, encode_bool, encode_int, unzigzag, zigzag,
};
pub use relative::{
    decode_relative_orientation, decode_relative_position, encode_relative_orientation,
    encode_relative_position, QuantizedPosition,
};
pub use settings::CodecSettings;
pub use snapshot::{decode_full_snapshot, encode_full_snapshot, peek_frame};
pub use types::{BodyTransform, FrameId, Quat, Snapshot, Vec3};
