pub mod classify;
pub mod decode;
pub mod extract;
pub mod version;
