/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! The host GL dispatch table.
//!
//! [GLDispatch] is the translator's only way to reach the host driver. Its
//! methods deliberately mirror the desktop OpenGL 2.1 functions (with the
//! `EXT` suffix where the translator uses `GL_EXT_framebuffer_object`), take
//! raw pointers, and are unsafe for the same reasons the C functions are.
//!
//! Every method has a default body that reports the call to
//! [GLDispatch::record] and returns a zero value. [HostGL] overrides all of
//! them; [super::headless::HeadlessGL] only overrides the ones where it has
//! to pretend to be a driver.

use super::gl21compat_raw as gl21;
use super::gl21compat_raw::types::*;
use std::ffi::c_void;

macro_rules! host_functions {
    ($(fn $name:ident($($arg:ident: $ty:ty),*) $(-> $ret:ty)?;)*) => {
        pub trait GLDispatch: Send + Sync {
            /// Called by the default method bodies. Does nothing unless
            /// overridden.
            fn record(&self, _name: &'static str, _args: std::fmt::Arguments<'_>) {}

            /// Whether an optional entry point (one that `GL_ARB_ES2_compatibility`
            /// provides) is available.
            fn is_loaded(&self, _name: &str) -> bool {
                true
            }

            unsafe fn GetString(&self, name: GLenum) -> *const GLubyte {
                self.record("GetString", format_args!("name={:?}", name));
                std::ptr::null()
            }

            $(
                unsafe fn $name(&self, $($arg: $ty),*) $(-> $ret)? {
                    self.record(
                        stringify!($name),
                        format_args!(concat!($(stringify!($arg), "={:?} "),*), $($arg),*),
                    );
                    Default::default()
                }
            )*
        }

        impl GLDispatch for HostGL {
            fn is_loaded(&self, name: &str) -> bool {
                match name {
                    "GetShaderPrecisionFormat" => self.gl.GetShaderPrecisionFormat.is_loaded(),
                    "ReleaseShaderCompiler" => self.gl.ReleaseShaderCompiler.is_loaded(),
                    "ShaderBinary" => self.gl.ShaderBinary.is_loaded(),
                    _ => true,
                }
            }

            unsafe fn GetString(&self, name: GLenum) -> *const GLubyte {
                self.gl.GetString(name)
            }

            $(
                unsafe fn $name(&self, $($arg: $ty),*) $(-> $ret)? {
                    self.gl.$name($($arg),*)
                }
            )*
        }
    }
}

host_functions! {
    fn ActiveTexture(texture: GLenum);
    fn AttachShader(program: GLuint, shader: GLuint);
    fn BindAttribLocation(program: GLuint, index: GLuint, name: *const GLchar);
    fn BindFramebufferEXT(target: GLenum, framebuffer: GLuint);
    fn BindRenderbufferEXT(target: GLenum, renderbuffer: GLuint);
    fn BindTexture(target: GLenum, texture: GLuint);
    fn BlendColor(red: GLfloat, green: GLfloat, blue: GLfloat, alpha: GLfloat);
    fn BlendEquation(mode: GLenum);
    fn BlendEquationSeparate(mode_rgb: GLenum, mode_alpha: GLenum);
    fn BlendFunc(sfactor: GLenum, dfactor: GLenum);
    fn BlendFuncSeparate(src_rgb: GLenum, dst_rgb: GLenum, src_alpha: GLenum, dst_alpha: GLenum);
    fn CheckFramebufferStatusEXT(target: GLenum) -> GLenum;
    fn Clear(mask: GLbitfield);
    fn ClearColor(red: GLfloat, green: GLfloat, blue: GLfloat, alpha: GLfloat);
    fn ClearDepth(depth: GLdouble);
    fn ClearStencil(s: GLint);
    fn ColorMask(red: GLboolean, green: GLboolean, blue: GLboolean, alpha: GLboolean);
    fn CompileShader(shader: GLuint);
    fn CompressedTexSubImage2D(target: GLenum, level: GLint, xoffset: GLint, yoffset: GLint, width: GLsizei, height: GLsizei, format: GLenum, image_size: GLsizei, data: *const c_void);
    fn CopyTexImage2D(target: GLenum, level: GLint, internalformat: GLenum, x: GLint, y: GLint, width: GLsizei, height: GLsizei, border: GLint);
    fn CopyTexSubImage2D(target: GLenum, level: GLint, xoffset: GLint, yoffset: GLint, x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn CreateProgram() -> GLuint;
    fn CreateShader(type_: GLenum) -> GLuint;
    fn CullFace(mode: GLenum);
    fn DeleteFramebuffersEXT(n: GLsizei, framebuffers: *const GLuint);
    fn DeleteProgram(program: GLuint);
    fn DeleteRenderbuffersEXT(n: GLsizei, renderbuffers: *const GLuint);
    fn DeleteShader(shader: GLuint);
    fn DeleteTextures(n: GLsizei, textures: *const GLuint);
    fn DepthFunc(func: GLenum);
    fn DepthMask(flag: GLboolean);
    fn DepthRange(near: GLdouble, far: GLdouble);
    fn DetachShader(program: GLuint, shader: GLuint);
    fn Disable(cap: GLenum);
    fn DisableVertexAttribArray(index: GLuint);
    fn DrawArrays(mode: GLenum, first: GLint, count: GLsizei);
    fn DrawElements(mode: GLenum, count: GLsizei, type_: GLenum, indices: *const c_void);
    fn Enable(cap: GLenum);
    fn EnableVertexAttribArray(index: GLuint);
    fn Finish();
    fn Flush();
    fn FramebufferRenderbufferEXT(target: GLenum, attachment: GLenum, renderbuffertarget: GLenum, renderbuffer: GLuint);
    fn FramebufferTexture2DEXT(target: GLenum, attachment: GLenum, textarget: GLenum, texture: GLuint, level: GLint);
    fn FrontFace(mode: GLenum);
    fn GenerateMipmapEXT(target: GLenum);
    fn GenFramebuffersEXT(n: GLsizei, framebuffers: *mut GLuint);
    fn GenRenderbuffersEXT(n: GLsizei, renderbuffers: *mut GLuint);
    fn GenTextures(n: GLsizei, textures: *mut GLuint);
    fn GetActiveAttrib(program: GLuint, index: GLuint, buf_size: GLsizei, length: *mut GLsizei, size: *mut GLint, type_: *mut GLenum, name: *mut GLchar);
    fn GetActiveUniform(program: GLuint, index: GLuint, buf_size: GLsizei, length: *mut GLsizei, size: *mut GLint, type_: *mut GLenum, name: *mut GLchar);
    fn GetAttachedShaders(program: GLuint, max_count: GLsizei, count: *mut GLsizei, shaders: *mut GLuint);
    fn GetAttribLocation(program: GLuint, name: *const GLchar) -> GLint;
    fn GetBooleanv(pname: GLenum, data: *mut GLboolean);
    fn GetError() -> GLenum;
    fn GetFloatv(pname: GLenum, data: *mut GLfloat);
    fn GetFramebufferAttachmentParameterivEXT(target: GLenum, attachment: GLenum, pname: GLenum, params: *mut GLint);
    fn GetIntegerv(pname: GLenum, data: *mut GLint);
    fn GetProgramInfoLog(program: GLuint, buf_size: GLsizei, length: *mut GLsizei, info_log: *mut GLchar);
    fn GetProgramiv(program: GLuint, pname: GLenum, params: *mut GLint);
    fn GetRenderbufferParameterivEXT(target: GLenum, pname: GLenum, params: *mut GLint);
    fn GetShaderInfoLog(shader: GLuint, buf_size: GLsizei, length: *mut GLsizei, info_log: *mut GLchar);
    fn GetShaderiv(shader: GLuint, pname: GLenum, params: *mut GLint);
    fn GetShaderPrecisionFormat(shadertype: GLenum, precisiontype: GLenum, range: *mut GLint, precision: *mut GLint);
    fn GetTexLevelParameteriv(target: GLenum, level: GLint, pname: GLenum, params: *mut GLint);
    fn GetTexParameterfv(target: GLenum, pname: GLenum, params: *mut GLfloat);
    fn GetTexParameteriv(target: GLenum, pname: GLenum, params: *mut GLint);
    fn GetUniformfv(program: GLuint, location: GLint, params: *mut GLfloat);
    fn GetUniformiv(program: GLuint, location: GLint, params: *mut GLint);
    fn GetUniformLocation(program: GLuint, name: *const GLchar) -> GLint;
    fn GetVertexAttribfv(index: GLuint, pname: GLenum, params: *mut GLfloat);
    fn GetVertexAttribiv(index: GLuint, pname: GLenum, params: *mut GLint);
    fn Hint(target: GLenum, mode: GLenum);
    fn IsEnabled(cap: GLenum) -> GLboolean;
    fn IsProgram(program: GLuint) -> GLboolean;
    fn IsShader(shader: GLuint) -> GLboolean;
    fn LineWidth(width: GLfloat);
    fn LinkProgram(program: GLuint);
    fn PixelStorei(pname: GLenum, param: GLint);
    fn PolygonOffset(factor: GLfloat, units: GLfloat);
    fn ReadPixels(x: GLint, y: GLint, width: GLsizei, height: GLsizei, format: GLenum, type_: GLenum, pixels: *mut c_void);
    fn ReleaseShaderCompiler();
    fn RenderbufferStorageEXT(target: GLenum, internalformat: GLenum, width: GLsizei, height: GLsizei);
    fn SampleCoverage(value: GLfloat, invert: GLboolean);
    fn Scissor(x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn ShaderBinary(count: GLsizei, shaders: *const GLuint, binaryformat: GLenum, binary: *const c_void, length: GLsizei);
    fn ShaderSource(shader: GLuint, count: GLsizei, string: *const *const GLchar, length: *const GLint);
    fn StencilFunc(func: GLenum, reference: GLint, mask: GLuint);
    fn StencilFuncSeparate(face: GLenum, func: GLenum, reference: GLint, mask: GLuint);
    fn StencilMask(mask: GLuint);
    fn StencilMaskSeparate(face: GLenum, mask: GLuint);
    fn StencilOp(fail: GLenum, zfail: GLenum, zpass: GLenum);
    fn StencilOpSeparate(face: GLenum, sfail: GLenum, dpfail: GLenum, dppass: GLenum);
    fn TexImage2D(target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, height: GLsizei, border: GLint, format: GLenum, type_: GLenum, pixels: *const c_void);
    fn TexParameterf(target: GLenum, pname: GLenum, param: GLfloat);
    fn TexParameterfv(target: GLenum, pname: GLenum, params: *const GLfloat);
    fn TexParameteri(target: GLenum, pname: GLenum, param: GLint);
    fn TexParameteriv(target: GLenum, pname: GLenum, params: *const GLint);
    fn TexSubImage2D(target: GLenum, level: GLint, xoffset: GLint, yoffset: GLint, width: GLsizei, height: GLsizei, format: GLenum, type_: GLenum, pixels: *const c_void);
    fn Uniform1f(location: GLint, v0: GLfloat);
    fn Uniform1fv(location: GLint, count: GLsizei, value: *const GLfloat);
    fn Uniform1i(location: GLint, v0: GLint);
    fn Uniform1iv(location: GLint, count: GLsizei, value: *const GLint);
    fn Uniform2f(location: GLint, v0: GLfloat, v1: GLfloat);
    fn Uniform2fv(location: GLint, count: GLsizei, value: *const GLfloat);
    fn Uniform2i(location: GLint, v0: GLint, v1: GLint);
    fn Uniform2iv(location: GLint, count: GLsizei, value: *const GLint);
    fn Uniform3f(location: GLint, v0: GLfloat, v1: GLfloat, v2: GLfloat);
    fn Uniform3fv(location: GLint, count: GLsizei, value: *const GLfloat);
    fn Uniform3i(location: GLint, v0: GLint, v1: GLint, v2: GLint);
    fn Uniform3iv(location: GLint, count: GLsizei, value: *const GLint);
    fn Uniform4f(location: GLint, v0: GLfloat, v1: GLfloat, v2: GLfloat, v3: GLfloat);
    fn Uniform4fv(location: GLint, count: GLsizei, value: *const GLfloat);
    fn Uniform4i(location: GLint, v0: GLint, v1: GLint, v2: GLint, v3: GLint);
    fn Uniform4iv(location: GLint, count: GLsizei, value: *const GLint);
    fn UniformMatrix2fv(location: GLint, count: GLsizei, transpose: GLboolean, value: *const GLfloat);
    fn UniformMatrix3fv(location: GLint, count: GLsizei, transpose: GLboolean, value: *const GLfloat);
    fn UniformMatrix4fv(location: GLint, count: GLsizei, transpose: GLboolean, value: *const GLfloat);
    fn UseProgram(program: GLuint);
    fn ValidateProgram(program: GLuint);
    fn VertexAttrib1f(index: GLuint, x: GLfloat);
    fn VertexAttrib1fv(index: GLuint, v: *const GLfloat);
    fn VertexAttrib2f(index: GLuint, x: GLfloat, y: GLfloat);
    fn VertexAttrib2fv(index: GLuint, v: *const GLfloat);
    fn VertexAttrib3f(index: GLuint, x: GLfloat, y: GLfloat, z: GLfloat);
    fn VertexAttrib3fv(index: GLuint, v: *const GLfloat);
    fn VertexAttrib4f(index: GLuint, x: GLfloat, y: GLfloat, z: GLfloat, w: GLfloat);
    fn VertexAttrib4fv(index: GLuint, v: *const GLfloat);
    fn VertexAttribPointer(index: GLuint, size: GLint, type_: GLenum, normalized: GLboolean, stride: GLsizei, pointer: *const c_void);
    fn Viewport(x: GLint, y: GLint, width: GLsizei, height: GLsizei);
}

/// The real host driver, reached through function pointers resolved from the
/// host GL library.
pub struct HostGL {
    gl: gl21::Gl,
}

// The table is only function pointers, written once in `load_with` and never
// mutated afterwards.
unsafe impl Send for HostGL {}
unsafe impl Sync for HostGL {}

impl HostGL {
    /// Resolve every entry point with `get_proc_address`. Fails if one of the
    /// functions the translator cannot work without is missing.
    pub fn load_with<F>(mut get_proc_address: F) -> Result<HostGL, String>
    where
        F: FnMut(&str) -> *const c_void,
    {
        let gl = gl21::Gl::load_with(|name| get_proc_address(name));
        for (name, loaded) in [
            ("glBindTexture", gl.BindTexture.is_loaded()),
            ("glTexImage2D", gl.TexImage2D.is_loaded()),
            ("glCreateShader", gl.CreateShader.is_loaded()),
            ("glVertexAttribPointer", gl.VertexAttribPointer.is_loaded()),
            ("glBindFramebufferEXT", gl.BindFramebufferEXT.is_loaded()),
        ] {
            if !loaded {
                return Err(format!("Host GL library has no {}", name));
            }
        }
        if !gl.GetShaderPrecisionFormat.is_loaded() {
            log!("Host GL library lacks GL_ARB_ES2_compatibility entry points, they will be emulated.");
        }
        Ok(HostGL { gl })
    }
}
