//! Batch driver for rewriting every office document below a folder.

pub mod batch;
pub mod dispatch;

pub use batch::run_batch;
pub use dispatch::FileDispatcher;
