pub mod application;
pub mod domain;
pub mod error;
pub mod hotkey;
pub mod infrastructure;
pub mod ipc;
pub mod utils {
    pub mod env;
}
