pub mod assemble;
pub mod heat;
pub mod ppr;
pub mod renormalize;
pub mod sparsify;
pub(crate) mod utils;
