// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Given/When/Get test vocabulary
//!
//! A [`TestContext`] owns one test's page, alias registry and spies. Its
//! three handles split a test into arrange ([`Given`]), act ([`When`]) and
//! query ([`Get`]) steps. All handles share the same state, so a rule
//! installed through `given()` is seen by requests issued through `when()`.

mod context;
mod get;
mod given;
mod spy;
mod when;

#[cfg(test)]
mod tests;

pub use context::{TestContext, TestHelper};
pub use get::Get;
pub use given::Given;
pub use spy::{CallRecorder, Spy, SpyHandle, SpyKind, SpyRegistry, Stub};
pub use when::When;
