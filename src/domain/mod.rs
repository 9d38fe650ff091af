// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe the problem:
//   - a skeleton sequence (bodies × frames × joints × coords)
//   - a labelled sample built from one sequence
//   - the table of human-readable class names
//   - the error taxonomy shared by the training layers
//
// Rules for this layer:
//   - NO Burn framework types
//   - NO file I/O
//   - Only structs, enums and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// Skeleton keypoint sequences and labelled samples
pub mod skeleton;

/// Class index → display name table
pub mod labels;

/// Errors raised by the orchestrator and its artifact writers
pub mod error;

/// Core abstractions (traits) that other layers implement
pub mod traits;
