pub mod frontmost;
pub mod keystroke;
pub mod pasteboard;
