// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer strings the other layers together into the two
// workflows a user can run.
//
// Rules for this layer:
//   - No tensor math or model code here
//   - No argument parsing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern

/// Load → split → train → checkpoint
pub mod train_use_case;

/// Reload best model → predict → table + videos
pub mod predict_use_case;
