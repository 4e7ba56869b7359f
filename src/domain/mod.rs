mod account;
mod money;
mod summary;
mod transaction;

pub use account::*;
pub use money::*;
pub use summary::*;
pub use transaction::*;
