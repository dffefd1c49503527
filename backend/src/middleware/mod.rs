//! Request extractors shared by handlers

pub mod identity;

pub use identity::CurrentUser;
