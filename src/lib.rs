//! gh-secrets - Declarative GitHub Actions repository secrets.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── validate      # Check declarations offline
//! │   ├── sync          # plan / apply
//! │   ├── refresh       # Re-read tracked secrets
//! │   ├── destroy       # Delete everything tracked
//! │   ├── seal          # Seal a value by hand
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── repo_path     # owner/repo parsing
//!     ├── validation    # Secret name rules
//!     ├── id            # owner:repo:name resource ids
//!     ├── cipher/       # Sealed-box encryption
//!     ├── store/        # Remote secret store
//!     │   ├── mod       # SecretStore trait
//!     │   ├── github    # REST implementation
//!     │   └── memory    # In-process implementation (test-store)
//!     ├── reconciler    # create / read / delete lifecycle
//!     ├── sync          # Declarations vs. state driver
//!     ├── config        # Settings and gh-secrets.toml
//!     └── state         # .gh-secrets.state.toml
//! ```
//!
//! # Features
//!
//! - Values sealed client-side to the repository public key
//! - Drift detection from the remote `updated_at` timestamp
//! - Plaintext never written to disk
//! - Pluggable secret store for offline testing

pub mod cli;
pub mod core;
pub mod error;
