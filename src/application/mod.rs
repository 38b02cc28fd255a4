pub mod capture_service;
pub mod traits;

pub use capture_service::{CaptureService, CaptureState};
pub use traits::{CopyInjector, FrontmostApp, FrontmostResolver, PasteboardReader};
