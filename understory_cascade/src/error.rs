// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handle misuse errors.

use understory_props::ComponentName;

use crate::runtime::InstanceId;
use crate::scope::ScopeId;

/// Errors returned for stale or unknown handles.
///
/// Prop values never cause errors: an invalid value is reported as a
/// [`Diagnostic`](crate::Diagnostic) and resolution carries on.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CascadeError {
    /// The scope does not exist or was removed.
    #[error("unknown scope {0}")]
    UnknownScope(ScopeId),
    /// The instance does not exist or was unmounted.
    #[error("unknown instance {0}")]
    UnknownInstance(InstanceId),
    /// No component with this name was defined.
    #[error("unknown component \"{0}\"")]
    UnknownComponent(ComponentName),
    /// The root scope cannot be removed.
    #[error("the root scope cannot be removed")]
    RootScope,
}
