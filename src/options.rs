/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Parsing and management of user-configurable options.
//!
//! The translator is normally loaded into a host process that doesn't pass it
//! any arguments, so the environment is the main source of options. The
//! diagnostic binary additionally accepts them on the command line.

use std::sync::OnceLock;

pub const DOCUMENTATION: &str = "\
Shader options:
    --force-glsl-version=...
        Emit this GLSL version in every translated shader, regardless of what
        the guest's shader asks for. Useful when a host driver is picky about
        the versions it accepts.

        This is a natural number, e.g. 120 or 130. The environment variable
        GOOGLE_GLES_FORCE_GLSL_VERSION has the same effect.

    --glsl-precision-defaults
        Instead of removing GLSL ES precision statements, keep them and add
        default precisions for samplers. Most desktop drivers reject this, so
        it is off by default.

Host driver options:
    --gl-lib=...
        Name the host GL implementation. The only recognized value is 'mesa',
        which stops glReleaseShaderCompiler from reaching the host driver
        (some Mesa versions crash on later compiles if it does).

        The environment variable ANDROID_GL_LIB has the same effect.
";

/// Struct containing all user-configurable options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub force_glsl_version: Option<u32>,
    pub gl_lib_is_mesa: bool,
    pub precision_defaults: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            force_glsl_version: None,
            gl_lib_is_mesa: false,
            precision_defaults: false,
        }
    }
}

impl Options {
    /// Build options from the environment variables the translator has always
    /// honoured. Malformed values are reported and ignored.
    pub fn from_env() -> Self {
        let mut options = Options::default();
        if let Ok(value) = std::env::var("GOOGLE_GLES_FORCE_GLSL_VERSION") {
            match parse_glsl_version(&value) {
                Ok(version) => options.force_glsl_version = Some(version),
                Err(e) => log!("Ignoring GOOGLE_GLES_FORCE_GLSL_VERSION: {}", e),
            }
        }
        if let Ok(value) = std::env::var("ANDROID_GL_LIB") {
            options.gl_lib_is_mesa = value == "mesa";
        }
        options
    }

    /// Parse the command-line argument syntax for an option. Returns `Ok(true)`
    /// if the option was valid and has been applied, and `Ok(false)` if the
    /// option was not recognized.
    pub fn parse_argument(&mut self, arg: &str) -> Result<bool, String> {
        if let Some(value) = arg.strip_prefix("--force-glsl-version=") {
            self.force_glsl_version = Some(parse_glsl_version(value)?);
        } else if arg == "--glsl-precision-defaults" {
            self.precision_defaults = true;
        } else if let Some(value) = arg.strip_prefix("--gl-lib=") {
            self.gl_lib_is_mesa = value == "mesa";
        } else {
            return Ok(false);
        };
        Ok(true)
    }
}

fn parse_glsl_version(value: &str) -> Result<u32, String> {
    let version: u32 = value
        .trim()
        .parse()
        .map_err(|_| format!("Invalid GLSL version {:?}", value))?;
    if version == 0 {
        return Err("GLSL version must be at least 1".to_string());
    }
    Ok(version)
}

static PROCESS_OPTIONS: OnceLock<Options> = OnceLock::new();

/// Options for the whole process. Unless [set_process_options] was called
/// first, these come from the environment, read on first use.
pub fn process_options() -> &'static Options {
    PROCESS_OPTIONS.get_or_init(Options::from_env)
}

/// Override the process options. This only has an effect before the first
/// call to [process_options]; returns `false` if it was too late.
pub fn set_process_options(options: Options) -> bool {
    PROCESS_OPTIONS.set(options).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_arguments() {
        let mut options = Options::default();
        assert_eq!(options.parse_argument("--force-glsl-version=130"), Ok(true));
        assert_eq!(options.force_glsl_version, Some(130));
        assert_eq!(options.parse_argument("--gl-lib=mesa"), Ok(true));
        assert!(options.gl_lib_is_mesa);
        assert_eq!(options.parse_argument("--gl-lib=nvidia"), Ok(true));
        assert!(!options.gl_lib_is_mesa);
        assert_eq!(options.parse_argument("--glsl-precision-defaults"), Ok(true));
        assert!(options.precision_defaults);
        assert_eq!(options.parse_argument("shader.frag"), Ok(false));
    }

    #[test]
    fn bad_glsl_version() {
        let mut options = Options::default();
        assert!(options.parse_argument("--force-glsl-version=abc").is_err());
        assert!(options.parse_argument("--force-glsl-version=0").is_err());
        assert_eq!(options.force_glsl_version, None);
    }
}
