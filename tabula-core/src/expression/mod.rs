mod expr;
mod ops;
mod typed;

pub use expr::*;
pub use ops::*;
pub use typed::*;
