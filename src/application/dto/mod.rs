//! Data transfer objects for the application layer.

mod appearance_dto;

pub use appearance_dto::{PlayerAppearance, SkinRequest};
