//! Stable descriptions of the invocation target a router resolved to.

use std::fmt;

/// How the matched route's handler is identified in event context.
///
/// `describe()` produces `<owner>::<method>` for named handlers and
/// `<scope>::closure[<start>:<end>]` for anonymous callables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerDescriptor {
    /// Static method reference on a named owner
    NamedStatic { owner: String, method: String },
    /// Method on an instance of a named owner
    NamedInstance { owner: String, method: String },
    /// Anonymous callable, identified by its enclosing scope and source span
    Anonymous {
        scope: String,
        start_line: u32,
        end_line: u32,
    },
}

impl HandlerDescriptor {
    pub fn named_static(owner: impl Into<String>, method: impl Into<String>) -> Self {
        HandlerDescriptor::NamedStatic {
            owner: owner.into(),
            method: method.into(),
        }
    }

    pub fn named_instance(owner: impl Into<String>, method: impl Into<String>) -> Self {
        HandlerDescriptor::NamedInstance {
            owner: owner.into(),
            method: method.into(),
        }
    }

    pub fn anonymous(scope: impl Into<String>, start_line: u32, end_line: u32) -> Self {
        HandlerDescriptor::Anonymous {
            scope: scope.into(),
            start_line,
            end_line,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            HandlerDescriptor::NamedStatic { owner, method }
            | HandlerDescriptor::NamedInstance { owner, method } => {
                format!("{}::{}", owner, method)
            }
            HandlerDescriptor::Anonymous {
                scope,
                start_line,
                end_line,
            } => format!("{}::closure[{}:{}]", scope, start_line, end_line),
        }
    }
}

impl fmt::Display for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}
