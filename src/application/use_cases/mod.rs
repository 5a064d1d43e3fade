//! Use case implementations.

mod request_skin_and_cape;

pub use request_skin_and_cape::{DEFAULT_WAIT, RequestSkinAndCapeUseCase};
