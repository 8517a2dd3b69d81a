pub mod batch;
pub mod form;
pub mod graph;
pub mod idiom;
pub mod metrics;
pub mod navigation;
pub mod span;
pub mod symbol;
pub mod util;

pub use batch::*;
pub use form::*;
pub use graph::*;
pub use idiom::*;
pub use metrics::*;
pub use navigation::*;
pub use span::*;
pub use symbol::*;
