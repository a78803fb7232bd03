//! Crate-level error types.

use std::fmt;

use crate::gpu::render_context::RenderContextError;

/// Errors produced by the dynasurf crate.
#[derive(Debug)]
pub enum DynasurfError {
    /// GPU context initialization failure.
    Gpu(RenderContextError),
    /// A shader program failed to compose or validate.
    Shader {
        /// Program name (e.g. `"surface"`).
        name: &'static str,
        /// Composer diagnostic.
        message: String,
    },
    /// A framebuffer's attachment set is not complete. Fatal at setup.
    FramebufferIncomplete {
        /// Framebuffer name.
        framebuffer: &'static str,
        /// What made it incomplete.
        reason: String,
    },
    /// Resources supplied to a pass do not match its binding table.
    BindingMismatch {
        /// Pass label.
        pass: &'static str,
        /// What did not match.
        reason: String,
    },
    /// Failed to acquire the presentation surface texture.
    Surface(wgpu::SurfaceError),
    /// Generic I/O failure.
    Io(std::io::Error),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Viewer event-loop failure.
    Viewer(String),
}

impl fmt::Display for DynasurfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gpu(e) => write!(f, "GPU error: {e}"),
            Self::Shader { name, message } => {
                write!(f, "shader program '{name}' failed: {message}")
            }
            Self::FramebufferIncomplete {
                framebuffer,
                reason,
            } => {
                write!(f, "framebuffer '{framebuffer}' incomplete: {reason}")
            }
            Self::BindingMismatch { pass, reason } => {
                write!(f, "binding mismatch in pass '{pass}': {reason}")
            }
            Self::Surface(e) => write!(f, "surface error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Viewer(msg) => write!(f, "viewer error: {msg}"),
        }
    }
}

impl std::error::Error for DynasurfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Gpu(e) => Some(e),
            Self::Surface(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderContextError> for DynasurfError {
    fn from(e: RenderContextError) -> Self {
        Self::Gpu(e)
    }
}

impl From<std::io::Error> for DynasurfError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<wgpu::SurfaceError> for DynasurfError {
    fn from(e: wgpu::SurfaceError) -> Self {
        Self::Surface(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framebuffer_error_names_the_framebuffer() {
        let err = DynasurfError::FramebufferIncomplete {
            framebuffer: "surface",
            reason: "attachment sizes differ".to_owned(),
        };
        let text = err.to_string();
        assert!(text.contains("surface"));
        assert!(text.contains("attachment sizes differ"));
    }

    #[test]
    fn io_error_is_exposed_as_source() {
        use std::error::Error;
        let err: DynasurfError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(err.source().is_some());
    }
}
