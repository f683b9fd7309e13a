// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! In-process runner: page, forms and configuration

mod config;
mod form;
mod page;

pub use config::{HelperConfig, DEFAULT_HOOK_ATTRIBUTE, ENV_PREFIX};
pub use form::Form;
pub use page::Page;
