//! Helper items to assist the working of QAngMom.

pub mod factorial;
pub(crate) mod format;
