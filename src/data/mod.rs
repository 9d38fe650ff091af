// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything between .npy files on disk and tensor batches:
//
//   *.npy keypoint arrays
//       │
//       ▼
//   NpyDirLoader      → reads arrays, derives labels from file names
//       │
//       ▼
//   split_train_val   → seeded shuffle + train/validation split
//       │
//       ▼
//   SkeletonDataset   → implements Burn's Dataset trait
//       │
//       ▼
//   SkeletonBatcher   → stacks samples into [batch, M, T, V, C]
//       │
//       ▼
//   DataLoader        → feeds batches to the orchestrator
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Reads skeleton arrays and label name tables from disk
pub mod loader;

/// Implements Burn's Dataset trait for skeleton samples
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Shuffles and splits data into train/validation sets
pub mod splitter;
