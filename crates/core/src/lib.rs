//! Domain model, validation and storage contracts for facilitrack.
//!
//! Nothing in this crate performs I/O. Storage backends implement the
//! repository traits in [`storage`].

pub mod authz;
pub mod facility;
pub mod storage;
