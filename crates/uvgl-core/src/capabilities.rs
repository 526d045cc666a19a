//! Capability probing, run once when a context is created.

use std::collections::BTreeSet;
use std::fmt;

use gl::types::{GLint, GLuint};
use tracing::debug;

use crate::driver::{check_error, DsaFamily, GlDriver};
use crate::error::Result;

/// Which implementation of named-object access a context uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DsaStrategy {
    /// `ARB_direct_state_access` / GL 4.5 named entry points.
    Arb,
    /// `EXT_direct_state_access` named entry points.
    Ext,
    /// Bind the object to a target, then issue the legacy call.
    BindEmulated,
}

impl fmt::Display for DsaStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DsaStrategy::Arb => "ARB_direct_state_access",
            DsaStrategy::Ext => "EXT_direct_state_access",
            DsaStrategy::BindEmulated => "bind-emulated",
        })
    }
}

/// Parsed `GL_VERSION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlVersion {
    pub major: u32,
    pub minor: u32,
    pub es: bool,
}

impl GlVersion {
    /// Parses both desktop (`"4.6.0 NVIDIA 550.54"`) and embedded
    /// (`"OpenGL ES 3.2 Mesa 23.1"`) version strings.
    pub fn parse(version: &str) -> Option<Self> {
        let (es, rest) = match version.strip_prefix("OpenGL ES") {
            Some(rest) => {
                // "OpenGL ES-CM 1.1" and friends carry a profile suffix.
                let rest = rest.trim_start_matches(|c: char| c != ' ');
                (true, rest.trim_start())
            }
            None => (false, version.trim_start()),
        };

        let number = rest.split_whitespace().next()?;
        let mut parts = number.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts
            .next()
            .and_then(|m| {
                let digits: String = m.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse().ok()
            })
            .unwrap_or(0);

        Some(Self { major, minor, es })
    }

    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        (self.major, self.minor) >= (major, minor)
    }
}

impl fmt::Display for GlVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.es {
            write!(f, "OpenGL ES {}.{}", self.major, self.minor)
        } else {
            write!(f, "OpenGL {}.{}", self.major, self.minor)
        }
    }
}

/// What the current driver can do, as far as the state cache and the DSA
/// layer are concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub version: GlVersion,
    pub extensions: BTreeSet<String>,
    pub supports_arb_dsa: bool,
    pub supports_ext_dsa: bool,
    /// `GL_POLYGON_MODE` can be queried and set. Absent on GLES.
    pub supports_polygon_mode: bool,
    /// `glClearDepth` takes a double. GLES only has `glClearDepthf`.
    pub supports_double_clear_depth: bool,
    pub supports_invalidate_framebuffer: bool,
    /// The row-length, skip and image-height pixel-store parameters exist.
    /// GLES 2.0 only has the alignments.
    pub supports_pixel_store_rows: bool,
}

impl Capabilities {
    /// Query the driver for its version and extension list.
    pub fn probe(gl: &dyn GlDriver) -> Result<Self> {
        let version_string = gl.get_string(gl::VERSION).unwrap_or_default();
        check_error(gl, "glGetString")?;
        let version = GlVersion::parse(&version_string).unwrap_or(GlVersion {
            major: 1,
            minor: 0,
            es: false,
        });

        let extensions = if version.at_least(3, 0) {
            indexed_extensions(gl)?
        } else {
            // GL_NUM_EXTENSIONS and glGetStringi arrived with GL 3.0 / GLES 3.0.
            let list = gl.get_string(gl::EXTENSIONS).unwrap_or_default();
            check_error(gl, "glGetString")?;
            list.split_whitespace().map(str::to_string).collect()
        };

        let caps = Self::from_parts(version, extensions, |family| gl.has_entry_points(family));
        debug!(
            version = %caps.version,
            extensions = caps.extensions.len(),
            dsa = %caps.dsa_strategy(),
            polygon_mode = caps.supports_polygon_mode,
            double_clear_depth = caps.supports_double_clear_depth,
            pixel_store_rows = caps.supports_pixel_store_rows,
            "probed GL capabilities"
        );
        Ok(caps)
    }

    /// Derive capability flags from an already known version and extension
    /// list. `loaded` reports whether a family's entry points resolved.
    pub fn from_parts(
        version: GlVersion,
        extensions: BTreeSet<String>,
        loaded: impl Fn(DsaFamily) -> bool,
    ) -> Self {
        let has = |name: &str| extensions.contains(name);

        let supports_arb_dsa = ((!version.es && version.at_least(4, 5))
            || has("GL_ARB_direct_state_access"))
            && loaded(DsaFamily::Arb);
        let supports_ext_dsa = has("GL_EXT_direct_state_access") && loaded(DsaFamily::Ext);
        let supports_invalidate_framebuffer = if version.es {
            version.at_least(3, 0)
        } else {
            version.at_least(4, 3) || has("GL_ARB_invalidate_subdata")
        };

        Self {
            supports_arb_dsa,
            supports_ext_dsa,
            supports_polygon_mode: !version.es,
            supports_double_clear_depth: !version.es,
            supports_invalidate_framebuffer,
            supports_pixel_store_rows: !version.es || version.at_least(3, 0),
            version,
            extensions,
        }
    }

    /// The named-object strategy for this driver: true DSA first, then the
    /// EXT family, then bind emulation.
    pub fn dsa_strategy(&self) -> DsaStrategy {
        if self.supports_arb_dsa {
            DsaStrategy::Arb
        } else if self.supports_ext_dsa {
            DsaStrategy::Ext
        } else {
            DsaStrategy::BindEmulated
        }
    }

    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }
}

fn indexed_extensions(gl: &dyn GlDriver) -> Result<BTreeSet<String>> {
    let mut count: [GLint; 1] = [0];
    gl.get_integer_v(gl::NUM_EXTENSIONS, &mut count);
    check_error(gl, "glGetIntegerv")?;

    let mut extensions = BTreeSet::new();
    for index in 0..count[0].max(0) as GLuint {
        if let Some(name) = gl.get_string_i(gl::EXTENSIONS, index) {
            extensions.insert(name);
        }
        check_error(gl, "glGetStringi")?;
    }
    Ok(extensions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeGl, Profile};

    fn exts(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_desktop_and_es_versions() {
        assert_eq!(
            GlVersion::parse("4.6.0 NVIDIA 550.54.14"),
            Some(GlVersion { major: 4, minor: 6, es: false })
        );
        assert_eq!(
            GlVersion::parse("OpenGL ES 3.2 Mesa 23.1.4"),
            Some(GlVersion { major: 3, minor: 2, es: true })
        );
        assert_eq!(
            GlVersion::parse("3.3 (Core Profile) Mesa 23.1.4"),
            Some(GlVersion { major: 3, minor: 3, es: false })
        );
        assert_eq!(GlVersion::parse(""), None);
    }

    #[test]
    fn prefers_arb_then_ext_then_bind() {
        let gl45 = GlVersion { major: 4, minor: 5, es: false };
        let gl33 = GlVersion { major: 3, minor: 3, es: false };

        let caps = Capabilities::from_parts(gl45, exts(&["GL_EXT_direct_state_access"]), |_| true);
        assert_eq!(caps.dsa_strategy(), DsaStrategy::Arb);

        let caps = Capabilities::from_parts(gl33, exts(&["GL_EXT_direct_state_access"]), |_| true);
        assert_eq!(caps.dsa_strategy(), DsaStrategy::Ext);

        let caps = Capabilities::from_parts(gl33, exts(&["GL_ARB_direct_state_access"]), |_| true);
        assert_eq!(caps.dsa_strategy(), DsaStrategy::Arb);

        let caps = Capabilities::from_parts(gl33, exts(&[]), |_| true);
        assert_eq!(caps.dsa_strategy(), DsaStrategy::BindEmulated);
    }

    #[test]
    fn advertised_but_unloaded_entry_points_are_not_used() {
        let gl45 = GlVersion { major: 4, minor: 5, es: false };
        let caps = Capabilities::from_parts(gl45, exts(&["GL_EXT_direct_state_access"]), |family| {
            family == DsaFamily::Ext
        });
        assert_eq!(caps.dsa_strategy(), DsaStrategy::Ext);
    }

    #[test]
    fn es_lacks_polygon_mode_and_double_clear_depth() {
        let es3 = GlVersion { major: 3, minor: 0, es: true };
        let caps = Capabilities::from_parts(es3, exts(&[]), |_| true);
        assert!(!caps.supports_polygon_mode);
        assert!(!caps.supports_double_clear_depth);
        assert!(caps.supports_invalidate_framebuffer);
        assert_eq!(caps.dsa_strategy(), DsaStrategy::BindEmulated);
    }

    #[test]
    fn probe_reads_version_and_extensions_from_driver() {
        let gl = FakeGl::new(Profile::desktop(3, 3).with_extension("GL_EXT_direct_state_access"));
        let caps = Capabilities::probe(&gl).unwrap();
        assert_eq!(caps.version, GlVersion { major: 3, minor: 3, es: false });
        assert!(caps.has_extension("GL_EXT_direct_state_access"));
        assert_eq!(caps.dsa_strategy(), DsaStrategy::Ext);
        assert_eq!(gl.count("glGetStringi"), 1);
    }

    #[test]
    fn es2_extensions_come_from_the_extension_string() {
        let gl = FakeGl::new(
            Profile::es(2, 0)
                .with_extension("GL_OES_vertex_array_object")
                .with_extension("GL_EXT_discard_framebuffer"),
        );
        let caps = Capabilities::probe(&gl).unwrap();

        assert_eq!(caps.version, GlVersion { major: 2, minor: 0, es: true });
        assert!(caps.has_extension("GL_OES_vertex_array_object"));
        assert!(caps.has_extension("GL_EXT_discard_framebuffer"));
        assert!(!caps.supports_pixel_store_rows);
        assert_eq!(caps.dsa_strategy(), DsaStrategy::BindEmulated);
        assert_eq!(gl.count("glGetStringi"), 0);
        assert_eq!(gl.count("glGetIntegerv"), 0);
    }

    #[test]
    fn gl2_desktop_splits_the_extension_string() {
        let gl = FakeGl::new(Profile::desktop(2, 1).with_extension("GL_EXT_direct_state_access"));
        let caps = Capabilities::probe(&gl).unwrap();
        assert!(caps.has_extension("GL_EXT_direct_state_access"));
        assert!(caps.supports_pixel_store_rows);
        assert_eq!(caps.dsa_strategy(), DsaStrategy::Ext);
    }

    #[test]
    fn indexed_queries_fail_before_gl3() {
        let gl = FakeGl::new(Profile::es(2, 0));
        let mut count = [0];
        gl.get_integer_v(gl::NUM_EXTENSIONS, &mut count);
        assert_eq!(gl.get_error(), gl::INVALID_ENUM);
    }
}
