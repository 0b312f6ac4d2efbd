/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! anbox_gles runs OpenGL ES 2.0 applications on a desktop OpenGL 2.1 driver.
//!
//! In various places, the terms "guest" and "host" are used to distinguish
//! between the application calling into the translator (the "guest") and the
//! desktop GL driver the translator calls (the "host").
//! For example:
//! - A "guest name" is an object name as the application sees it, one per
//!   share group. A "host name" (or "global name") is what the driver gave us.
//! - "Guest GLSL" is GLSL ES 1.00; "host GLSL" is desktop GLSL 1.20 or so.
//!
//! The library is the `libGLESv2` an EGL layer loads (see [gles::exports] and
//! [gles::translator]). The binary is a small diagnostic tool around it.

// Allow items in the crate to have non-snake-case names, like the GL entry
// points they implement.
#![allow(non_snake_case)]
// The documentation for this crate is intended to include private items.
#![allow(rustdoc::private_intra_doc_links)]

#[macro_use]
mod log;
pub mod gles;
pub mod options;

use gles::shader_parser::{translate, TranslateOptions};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const USAGE: &str = "\
Usage:
    anbox_gles [options] path/to/shader.vert path/to/shader.frag ...

Each shader file is read as GLSL ES and the desktop GLSL the translator would
hand to the host driver is printed to standard output.

Special options:
    --help
        Display this help text.

    --probe
        Create a hidden window with a desktop OpenGL 2.1 context and report
        the host driver's capabilities as the translator sees them. Only
        available when built with the 'sdl' feature.
";

pub fn main<T: Iterator<Item = String>>(mut args: T) -> Result<(), String> {
    echo!("anbox_gles {}", VERSION);
    echo!();

    let _ = args.next(); // skip argv[0]

    let mut shader_paths: Vec<PathBuf> = Vec::new();
    let mut probe = false;
    let mut option_args = Vec::new();

    for arg in args {
        if arg == "--help" {
            echo!("{}", USAGE);
            echo!("{}", options::DOCUMENTATION);
            return Ok(());
        } else if arg == "--probe" {
            probe = true;
        // Parse an option but discard the value, to test whether it's valid.
        // Command-line options are applied on top of the environment below.
        } else if options::Options::default().parse_argument(&arg)? {
            option_args.push(arg);
        } else if arg.starts_with("--") {
            echo!("{}", USAGE);
            echo!("{}", options::DOCUMENTATION);
            return Err(format!("Unexpected argument: {:?}", arg));
        } else {
            shader_paths.push(PathBuf::from(arg));
        }
    }

    let mut options = options::Options::from_env();
    for option_arg in option_args {
        let parse_result = options.parse_argument(&option_arg);
        assert!(parse_result == Ok(true));
    }
    if !options::set_process_options(options.clone()) {
        log!("Warning: options were already in use, command-line options may not apply.");
    }

    if probe {
        run_probe()?;
    }

    if shader_paths.is_empty() {
        if !probe {
            return Err(
                "No shader specified. Use the --help flag to see command-line usage.".to_string(),
            );
        }
        return Ok(());
    }

    let translate_options = TranslateOptions::from(&options);
    for path in shader_paths {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("vert" | "frag" | "glsl") => (),
            _ => log!(
                "Warning: {} doesn't look like a shader, translating it anyway.",
                path.display()
            ),
        }
        let source = std::fs::read(&path)
            .map_err(|e| format!("Could not read {}: {}", path.display(), e))?;
        let translated = translate(&source, &translate_options);
        echo!("{}:", path.display());
        println!("{}", String::from_utf8_lossy(&translated));
    }
    Ok(())
}

#[cfg(feature = "sdl")]
fn run_probe() -> Result<(), String> {
    gles::probe::probe()
}

#[cfg(not(feature = "sdl"))]
fn run_probe() -> Result<(), String> {
    Err("--probe needs anbox_gles to be built with the 'sdl' feature.".to_string())
}
