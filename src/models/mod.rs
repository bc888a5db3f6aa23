pub mod message;

pub use message::{StoredImage, SubmittedForm};
