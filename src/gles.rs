/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! OpenGL ES 2.0 on top of desktop OpenGL 2.1.
//!
//! A guest (an Android system image, or any other GLES 2.0 client) calls the
//! `gl*` functions in [exports]. Those land on the thread's current
//! [context::GLESv2Context], which validates them, keeps the state GLES
//! requires and desktop GL doesn't have, and forwards what's left to the host
//! driver through [dispatch::GLDispatch]. The layers, from the bottom:
//!
//! - [gles20_raw] and [gl21compat_raw] are raw bindings generated from the
//!   Khronos API headers. The guest-facing constants and types come from
//!   [gles20_raw]; the host's function pointers from [gl21compat_raw], which
//!   can't be used outside this module at all.
//! - [dispatch] abstracts the host driver. [headless] is a fake driver for
//!   tests and the command-line tool.
//! - [object_names] and [objects] keep guest object names and their data,
//!   shared between contexts of one share group. [framebuffer] and [program]
//!   hold the framebuffer, shader and program specifics.
//! - [validate], [convert], [util] and [shader_parser] are stateless helpers:
//!   argument checks, `GL_FIXED` conversion, compressed texture decoding and
//!   GLSL ES to desktop GLSL translation.
//! - [context] and [gles2_imp] are the context state and entry points.
//! - [translator] is what the EGL layer uses to create contexts and make them
//!   current.
//!
//! Useful resources for OpenGL ES 2.0:
//! - [Reference pages](https://registry.khronos.org/OpenGL-Refpages/es2.0/)
//! - [Specification](https://registry.khronos.org/OpenGL/specs/es/2.0/es_full_spec_2.0.pdf)
//! - Extensions:
//!   - [OES_EGL_image](https://registry.khronos.org/OpenGL/extensions/OES/OES_EGL_image.txt)
//!   - [OES_compressed_ETC1_RGB8_texture](https://registry.khronos.org/OpenGL/extensions/OES/OES_compressed_ETC1_RGB8_texture.txt)
//!   - [OES_compressed_paletted_texture](https://registry.khronos.org/OpenGL/extensions/OES/OES_compressed_paletted_texture.txt)
//!
//! Useful resources for OpenGL 2.1:
//! - [Reference pages](https://registry.khronos.org/OpenGL-Refpages/gl2.1/)
//! - [Specification](https://registry.khronos.org/OpenGL/specs/gl/glspec21.pdf)
//! - Extensions:
//!   - [EXT_framebuffer_object](https://registry.khronos.org/OpenGL/extensions/EXT/EXT_framebuffer_object.txt)
//!   - [ARB_ES2_compatibility](https://registry.khronos.org/OpenGL/extensions/ARB/ARB_ES2_compatibility.txt)

pub mod context;
mod convert;
pub mod dispatch;
pub mod exports;
mod framebuffer;
mod gles2_imp;
pub mod headless;
pub mod object_names;
pub mod objects;
mod pointer;
#[cfg(feature = "sdl")]
pub mod probe;
mod program;
pub mod shader_parser;
pub mod translator;
mod util;
mod validate;

use anbox_gles_gl_bindings::gl21compat as gl21compat_raw;
pub use anbox_gles_gl_bindings::gles20 as gles20_raw;

pub use context::GLESv2Context;
pub use dispatch::{GLDispatch, HostGL};
pub use translator::{EGLiface, GLESiface};
