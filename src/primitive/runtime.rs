mod event;
pub use event::*;

mod storage;
pub use storage::*;

// crates.io
use serde::Deserialize;
// multiwrap
use crate::prelude::*;

pub type DispatchResult = StdResult<(), String>;

#[derive(Debug, Deserialize)]
pub struct UnnamedWrapper<T> {
	pub r#type: T,
}
