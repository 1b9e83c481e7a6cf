pub use std::result::Result as StdResult;

pub use anyhow::Result;

pub use crate::{
	error::{Error, Rejection, Validation},
	primitive::*,
	util,
};
