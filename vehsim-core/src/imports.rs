//! Module for crate-local imports to reduce boilerplate in submodules

#![allow(unused_imports)]

pub(crate) use crate::error::CalcError;
pub(crate) use crate::traits::*;
pub(crate) use crate::utils;
pub(crate) use crate::utils::almost_eq;

pub(crate) use anyhow::{anyhow, bail, ensure, Context};
pub(crate) use serde::{Deserialize, Serialize};
pub(crate) use std::collections::HashMap;
pub(crate) use std::ffi::OsStr;
pub(crate) use std::fmt;
pub(crate) use std::fs::File;
pub(crate) use std::path::{Path, PathBuf};
pub(crate) use validator::Validate;
