pub mod ast;
pub mod diagnostics;
pub mod plan_file;

pub use ast::*;
pub use diagnostics::*;
pub use plan_file::PlanFile;
