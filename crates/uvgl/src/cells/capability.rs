use uvgl_core::{check_error, Capability, GlDriver, Result};

use super::{set, StateCell};

/// Whether one server-side capability is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityFlag {
    capability: Capability,
    enabled: bool,
}

impl CapabilityFlag {
    pub fn from_device(gl: &dyn GlDriver, capability: Capability) -> Result<Self> {
        let enabled = gl.is_enabled(capability.as_gl());
        check_error(gl, "glIsEnabled")?;
        Ok(Self { capability, enabled })
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }
}

impl StateCell for CapabilityFlag {
    type Value = bool;
    const NAME: &'static str = "capability";

    fn value(&self) -> Self::Value {
        self.enabled
    }

    fn apply(&self, gl: &dyn GlDriver, enabled: Self::Value) -> Result<()> {
        let cap = self.capability.as_gl();
        if enabled {
            set(gl, "glEnable", |gl| gl.enable(cap))
        } else {
            set(gl, "glDisable", |gl| gl.disable(cap))
        }
    }

    fn store(&mut self, enabled: Self::Value) {
        self.enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use uvgl_core::testing::FakeGl;

    use super::*;

    #[test]
    fn toggles_with_enable_and_disable() {
        let gl = FakeGl::desktop();
        let mut flag = CapabilityFlag::from_device(&gl, Capability::DepthTest).unwrap();
        assert!(!flag.value());

        assert!(flag.try_update(&gl, true).unwrap());
        assert!(gl.fixed().enabled.contains(&gl::DEPTH_TEST));
        assert!(!flag.try_update(&gl, true).unwrap());

        assert!(flag.try_update(&gl, false).unwrap());
        assert!(!gl.fixed().enabled.contains(&gl::DEPTH_TEST));
        assert_eq!(gl.count("glEnable"), 1);
        assert_eq!(gl.count("glDisable"), 1);
    }
}
