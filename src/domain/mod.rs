pub mod chord;
pub mod selection;

pub use chord::{KeyDown, PERIOD_KEY_CODE, is_chord_matched};
pub use selection::CapturedSelection;
