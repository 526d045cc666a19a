//! Typed views of the GL enums the state cache stores.
//!
//! Every enum is `#[repr(u32)]` with the GL constant as its discriminant, so
//! `value as GLenum` is the value passed to the driver and
//! [`num_traits::FromPrimitive`] decodes values read back from it.

use gl::types::{GLenum, GLint};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;

use crate::error::{GlError, Result};

/// Decode an integer returned by a state query into a typed enum.
pub fn decode<T: FromPrimitive>(query: &'static str, value: GLint) -> Result<T> {
    T::from_i64(value as i64).ok_or(GlError::UnexpectedValue { query, value })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u32)]
pub enum CompareFunction {
    Never = gl::NEVER,
    Less = gl::LESS,
    Equal = gl::EQUAL,
    LessOrEqual = gl::LEQUAL,
    Greater = gl::GREATER,
    NotEqual = gl::NOTEQUAL,
    GreaterOrEqual = gl::GEQUAL,
    Always = gl::ALWAYS,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u32)]
pub enum StencilOperation {
    Keep = gl::KEEP,
    Zero = gl::ZERO,
    Replace = gl::REPLACE,
    Increment = gl::INCR,
    IncrementWrap = gl::INCR_WRAP,
    Decrement = gl::DECR,
    DecrementWrap = gl::DECR_WRAP,
    Invert = gl::INVERT,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u32)]
pub enum BlendEquationMode {
    Add = gl::FUNC_ADD,
    Subtract = gl::FUNC_SUBTRACT,
    ReverseSubtract = gl::FUNC_REVERSE_SUBTRACT,
    Min = gl::MIN,
    Max = gl::MAX,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u32)]
pub enum BlendFactor {
    Zero = gl::ZERO,
    One = gl::ONE,
    SrcColor = gl::SRC_COLOR,
    OneMinusSrcColor = gl::ONE_MINUS_SRC_COLOR,
    DstColor = gl::DST_COLOR,
    OneMinusDstColor = gl::ONE_MINUS_DST_COLOR,
    SrcAlpha = gl::SRC_ALPHA,
    OneMinusSrcAlpha = gl::ONE_MINUS_SRC_ALPHA,
    DstAlpha = gl::DST_ALPHA,
    OneMinusDstAlpha = gl::ONE_MINUS_DST_ALPHA,
    ConstantColor = gl::CONSTANT_COLOR,
    OneMinusConstantColor = gl::ONE_MINUS_CONSTANT_COLOR,
    ConstantAlpha = gl::CONSTANT_ALPHA,
    OneMinusConstantAlpha = gl::ONE_MINUS_CONSTANT_ALPHA,
    SrcAlphaSaturate = gl::SRC_ALPHA_SATURATE,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u32)]
pub enum CullFaceMode {
    Front = gl::FRONT,
    Back = gl::BACK,
    FrontAndBack = gl::FRONT_AND_BACK,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u32)]
pub enum PolygonMode {
    Point = gl::POINT,
    Line = gl::LINE,
    Fill = gl::FILL,
}

/// Server-side capabilities toggled with `glEnable` / `glDisable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive)]
#[repr(u32)]
pub enum Capability {
    Blend = gl::BLEND,
    CullFace = gl::CULL_FACE,
    DepthTest = gl::DEPTH_TEST,
    StencilTest = gl::STENCIL_TEST,
    ScissorTest = gl::SCISSOR_TEST,
    PolygonOffsetFill = gl::POLYGON_OFFSET_FILL,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::Blend,
        Capability::CullFace,
        Capability::DepthTest,
        Capability::StencilTest,
        Capability::ScissorTest,
        Capability::PolygonOffsetFill,
    ];

    pub fn as_gl(self) -> GLenum {
        self as GLenum
    }
}

/// Which stencil face a per-face query or update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StencilFace {
    Front,
    Back,
}

impl StencilFace {
    /// Accepts `GL_FRONT` and `GL_BACK`; anything else is an invalid argument.
    pub fn from_gl(face: GLenum) -> Result<Self> {
        match face {
            gl::FRONT => Ok(StencilFace::Front),
            gl::BACK => Ok(StencilFace::Back),
            value => Err(GlError::InvalidArgument {
                what: "stencil face",
                value,
            }),
        }
    }

    pub fn as_gl(self) -> GLenum {
        match self {
            StencilFace::Front => gl::FRONT,
            StencilFace::Back => gl::BACK,
        }
    }
}
