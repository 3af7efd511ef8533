pub mod attachment;
pub mod catalog;
pub mod content;
pub mod translation;
pub mod user;
