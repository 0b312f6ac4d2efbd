/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
use gl_generator::{Api, Fallbacks, GlobalGenerator, Profile, Registry, StructGenerator};
use std::fs::File;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());

    // The host side. This is a struct rather than globals so that each host
    // library gets its own table of function pointers.
    let mut file = File::create(out_dir.join("gl21compat.rs")).unwrap();
    Registry::new(
        Api::Gl,
        (2, 1),
        Profile::Compatibility,
        Fallbacks::None,
        [
            "GL_EXT_framebuffer_object",
            "GL_EXT_texture_filter_anisotropic",
            "GL_ARB_ES2_compatibility",
            "GL_NV_half_float",
            "GL_ARB_texture_float",
        ],
    )
    .write_bindings(StructGenerator, &mut file)
    .unwrap();

    // The guest side. Only the types and constants are used; nothing ever
    // loads these function pointers.
    let mut file = File::create(out_dir.join("gles20.rs")).unwrap();
    Registry::new(
        Api::Gles2,
        (2, 0),
        Profile::Core,
        Fallbacks::None,
        [
            "GL_OES_EGL_image",
            "GL_OES_compressed_ETC1_RGB8_texture",
            "GL_OES_compressed_paletted_texture",
            "GL_OES_texture_half_float",
            "GL_OES_packed_depth_stencil",
            "GL_OES_standard_derivatives",
            "GL_OES_rgb8_rgba8",
            "GL_OES_depth24",
            "GL_OES_depth32",
            "GL_EXT_texture_format_BGRA8888",
            "GL_EXT_texture_filter_anisotropic",
        ],
    )
    .write_bindings(GlobalGenerator, &mut file)
    .unwrap();
}
