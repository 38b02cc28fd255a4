pub mod external;
pub mod permissions;
