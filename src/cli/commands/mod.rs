pub mod completions;
pub mod decrypt;
pub mod encrypt;
pub mod reveal;
pub mod scan;
pub mod seal;
pub mod version;
