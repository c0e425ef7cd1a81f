//! Helper items to assist the working of `kptsym`.

pub mod cell;
pub(crate) mod format;
#[cfg(test)]
pub(crate) mod testing;
