// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types returned by the registry and the sizing helper.

use alloc::string::String;

/// Failures reported synchronously by [`Scenes`](crate::router::Scenes).
///
/// All of these are caller errors. Nothing is retried, and the registry and
/// the current scene are left exactly as they were before the failing call.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SceneError {
    /// A scene with this name is already registered.
    #[error("scene with the same name already created: {name}")]
    DuplicateName {
        /// The rejected name.
        name: String,
    },
    /// A scene with this path is already registered.
    #[error("scene with the same path already created: {path}")]
    DuplicatePath {
        /// The rejected path.
        path: String,
    },
    /// The identifier matches neither a registered name nor a registered path.
    #[error("scene does not exist: {identifier}")]
    SceneNotFound {
        /// The identifier that failed to resolve.
        identifier: String,
    },
    /// The router was destroyed and no longer renders scenes.
    #[error("scenes have been destroyed")]
    Destroyed,
}

/// A scene teardown reported failure.
///
/// Teardown failures are not fatal: the router logs them and finishes the
/// transition as if the teardown had succeeded.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("scene teardown failed: {0}")]
pub struct TeardownError(pub String);

/// Failure to parse an [`AspectRatio`](crate::proportions::AspectRatio).
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ParseAspectRatioError {
    /// The input has no `:` (or `x`) separator.
    #[error("missing separator in aspect ratio {0:?}")]
    MissingSeparator(String),
    /// A component is not an unsigned integer.
    #[error("invalid aspect ratio component {0:?}")]
    InvalidComponent(String),
    /// A component is zero.
    #[error("aspect ratio components must be non-zero")]
    Zero,
}
