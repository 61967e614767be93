//! File actions module.
//!
//! Resolution and removal are separate steps:
//! - [`resolve`]: pick the survivor of a duplicate set (pure)
//! - [`delete`]: remove the other members, permanently or to the trash
//!
//! ```no_run
//! use tunedupe::actions::{delete_resolution, resolve, Choice, DeleteConfig};
//! use std::path::PathBuf;
//!
//! let set = vec![PathBuf::from("a/x.mp3"), PathBuf::from("b/x.mp3")];
//! let resolution = resolve(&set, Choice::Index(1)).unwrap();
//! let result = delete_resolution(&resolution, &DeleteConfig::trash()).unwrap();
//! println!("{}", result.summary());
//! ```

pub mod delete;
pub mod resolve;

// Re-export commonly used types
pub use delete::{
    delete, delete_batch, delete_resolution, delete_to_trash, permanent_delete,
    validate_preserves_copy, BatchDeleteResult, DeleteConfig, DeleteError, DeleteResult,
};
pub use resolve::{default_index, resolve, Choice, InvalidChoiceError, Resolution};
