//! Error taxonomy for driver calls, DSA dispatch and cache queries.

use gl::types::{GLenum, GLint};
use thiserror::Error;

use crate::capabilities::DsaStrategy;

/// Errors surfaced by the GL core. None of them are retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GlError {
    /// The driver flagged an error after `call`.
    #[error("{call} failed with {} ({code:#06x})", error_name(*code))]
    Driver { call: &'static str, code: GLenum },

    /// The selected DSA path has no way to perform `op`.
    #[error("{op} is not supported on the {strategy} path")]
    Unsupported {
        op: &'static str,
        strategy: DsaStrategy,
    },

    /// A caller-supplied enum value outside the accepted set.
    #[error("{value:#06x} is not a valid {what}")]
    InvalidArgument { what: &'static str, value: GLenum },

    /// A client slice is shorter than the transfer the driver would make.
    #[error("{what} needs {required} bytes but the slice holds {len}")]
    SliceTooShort {
        what: &'static str,
        required: usize,
        len: usize,
    },

    /// The driver answered a state query with a value we cannot decode.
    #[error("driver returned {value:#06x} for {query}")]
    UnexpectedValue { query: &'static str, value: GLint },

    /// A DSA family was requested whose entry points the driver never loaded.
    #[error("entry point {0} is not loaded")]
    MissingEntryPoint(&'static str),
}

pub type Result<T, E = GlError> = std::result::Result<T, E>;

/// Human readable name of a `glGetError` code.
pub fn error_name(code: GLenum) -> &'static str {
    match code {
        gl::INVALID_ENUM => "GL_INVALID_ENUM",
        gl::INVALID_VALUE => "GL_INVALID_VALUE",
        gl::INVALID_OPERATION => "GL_INVALID_OPERATION",
        gl::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
        gl::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
        gl::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
        gl::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
        gl::CONTEXT_LOST => "GL_CONTEXT_LOST",
        _ => "unknown GL error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_error_names_the_call_and_code() {
        let err = GlError::Driver {
            call: "glBlendColor",
            code: gl::INVALID_VALUE,
        };
        assert_eq!(
            err.to_string(),
            "glBlendColor failed with GL_INVALID_VALUE (0x0501)"
        );
    }

    #[test]
    fn short_slice_reports_both_lengths() {
        let err = GlError::SliceTooShort {
            what: "buffer data",
            required: 64,
            len: 4,
        };
        assert_eq!(err.to_string(), "buffer data needs 64 bytes but the slice holds 4");
    }

    #[test]
    fn unsupported_names_the_strategy() {
        let err = GlError::Unsupported {
            op: "InvalidateNamedFramebufferData",
            strategy: DsaStrategy::Ext,
        };
        assert_eq!(
            err.to_string(),
            "InvalidateNamedFramebufferData is not supported on the EXT_direct_state_access path"
        );
    }
}
