pub mod dump;
pub mod error;
pub mod key;
pub mod map;
pub mod scale;
pub mod sections;
pub mod value;
