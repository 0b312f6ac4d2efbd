/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! The exported C ABI: `libGLESv2` as an application links against it.
//!
//! Every function runs the matching [GLESv2Context] method on the calling
//! thread's current context (see [super::translator::make_current]). Without
//! one, the call does nothing and returns a harmless value, except for the
//! `glGet*` state queries, which answer from a temporary context.

use super::context::GLESv2Context;
use super::gles20_raw::types::*;
use super::objects::EglImageHandle;
use super::translator::{with_current, with_current_or_throwaway};
use std::ffi::c_void;

macro_rules! exports {
    (@or $call:expr) => {
        $call.unwrap_or(())
    };
    (@or $call:expr, $default:expr) => {
        $call.unwrap_or($default)
    };
    ($(fn $c_name:ident($($arg:ident: $ty:ty),*) $(-> $ret:ty = $default:expr)? => $method:ident;)*) => {
        $(
            #[no_mangle]
            pub unsafe extern "C" fn $c_name($($arg: $ty),*) $(-> $ret)? {
                exports!(@or with_current(|ctx| ctx.$method($($arg),*)) $(, $default)?)
            }
        )*
    };
}

exports! {
    fn glActiveTexture(texture: GLenum) => ActiveTexture;
    fn glAttachShader(program: GLuint, shader: GLuint) => AttachShader;
    fn glBindAttribLocation(program: GLuint, index: GLuint, name: *const GLchar) => BindAttribLocation;
    fn glBindBuffer(target: GLenum, buffer: GLuint) => BindBuffer;
    fn glBindFramebuffer(target: GLenum, framebuffer: GLuint) => BindFramebuffer;
    fn glBindRenderbuffer(target: GLenum, renderbuffer: GLuint) => BindRenderbuffer;
    fn glBindTexture(target: GLenum, texture: GLuint) => BindTexture;
    fn glBlendColor(red: GLclampf, green: GLclampf, blue: GLclampf, alpha: GLclampf) => BlendColor;
    fn glBlendEquation(mode: GLenum) => BlendEquation;
    fn glBlendEquationSeparate(mode_rgb: GLenum, mode_alpha: GLenum) => BlendEquationSeparate;
    fn glBlendFunc(sfactor: GLenum, dfactor: GLenum) => BlendFunc;
    fn glBlendFuncSeparate(src_rgb: GLenum, dst_rgb: GLenum, src_alpha: GLenum, dst_alpha: GLenum) => BlendFuncSeparate;
    fn glBufferData(target: GLenum, size: GLsizeiptr, data: *const c_void, usage: GLenum) => BufferData;
    fn glBufferSubData(target: GLenum, offset: GLintptr, size: GLsizeiptr, data: *const c_void) => BufferSubData;
    fn glCheckFramebufferStatus(target: GLenum) -> GLenum = 0 => CheckFramebufferStatus;
    fn glClear(mask: GLbitfield) => Clear;
    fn glClearColor(red: GLclampf, green: GLclampf, blue: GLclampf, alpha: GLclampf) => ClearColor;
    fn glClearDepthf(depth: GLclampf) => ClearDepthf;
    fn glClearStencil(s: GLint) => ClearStencil;
    fn glColorMask(red: GLboolean, green: GLboolean, blue: GLboolean, alpha: GLboolean) => ColorMask;
    fn glCompileShader(shader: GLuint) => CompileShader;
    fn glCompressedTexImage2D(target: GLenum, level: GLint, internalformat: GLenum, width: GLsizei, height: GLsizei, border: GLint, image_size: GLsizei, data: *const c_void) => CompressedTexImage2D;
    fn glCompressedTexSubImage2D(target: GLenum, level: GLint, xoffset: GLint, yoffset: GLint, width: GLsizei, height: GLsizei, format: GLenum, image_size: GLsizei, data: *const c_void) => CompressedTexSubImage2D;
    fn glCopyTexImage2D(target: GLenum, level: GLint, internalformat: GLenum, x: GLint, y: GLint, width: GLsizei, height: GLsizei, border: GLint) => CopyTexImage2D;
    fn glCopyTexSubImage2D(target: GLenum, level: GLint, xoffset: GLint, yoffset: GLint, x: GLint, y: GLint, width: GLsizei, height: GLsizei) => CopyTexSubImage2D;
    fn glCreateProgram() -> GLuint = 0 => CreateProgram;
    fn glCreateShader(type_: GLenum) -> GLuint = 0 => CreateShader;
    fn glCullFace(mode: GLenum) => CullFace;
    fn glDeleteBuffers(n: GLsizei, buffers: *const GLuint) => DeleteBuffers;
    fn glDeleteFramebuffers(n: GLsizei, framebuffers: *const GLuint) => DeleteFramebuffers;
    fn glDeleteProgram(program: GLuint) => DeleteProgram;
    fn glDeleteRenderbuffers(n: GLsizei, renderbuffers: *const GLuint) => DeleteRenderbuffers;
    fn glDeleteShader(shader: GLuint) => DeleteShader;
    fn glDeleteTextures(n: GLsizei, textures: *const GLuint) => DeleteTextures;
    fn glDepthFunc(func: GLenum) => DepthFunc;
    fn glDepthMask(flag: GLboolean) => DepthMask;
    fn glDepthRangef(near: GLclampf, far: GLclampf) => DepthRangef;
    fn glDetachShader(program: GLuint, shader: GLuint) => DetachShader;
    fn glDisable(cap: GLenum) => Disable;
    fn glDisableVertexAttribArray(index: GLuint) => DisableVertexAttribArray;
    fn glDrawArrays(mode: GLenum, first: GLint, count: GLsizei) => DrawArrays;
    fn glDrawElements(mode: GLenum, count: GLsizei, type_: GLenum, indices: *const c_void) => DrawElements;
    fn glEnable(cap: GLenum) => Enable;
    fn glEnableVertexAttribArray(index: GLuint) => EnableVertexAttribArray;
    fn glFinish() => Finish;
    fn glFlush() => Flush;
    fn glFramebufferRenderbuffer(target: GLenum, attachment: GLenum, renderbuffertarget: GLenum, renderbuffer: GLuint) => FramebufferRenderbuffer;
    fn glFramebufferTexture2D(target: GLenum, attachment: GLenum, textarget: GLenum, texture: GLuint, level: GLint) => FramebufferTexture2D;
    fn glFrontFace(mode: GLenum) => FrontFace;
    fn glGenBuffers(n: GLsizei, buffers: *mut GLuint) => GenBuffers;
    fn glGenerateMipmap(target: GLenum) => GenerateMipmap;
    fn glGenFramebuffers(n: GLsizei, framebuffers: *mut GLuint) => GenFramebuffers;
    fn glGenRenderbuffers(n: GLsizei, renderbuffers: *mut GLuint) => GenRenderbuffers;
    fn glGenTextures(n: GLsizei, textures: *mut GLuint) => GenTextures;
    fn glGetActiveAttrib(program: GLuint, index: GLuint, buf_size: GLsizei, length: *mut GLsizei, size: *mut GLint, type_: *mut GLenum, name: *mut GLchar) => GetActiveAttrib;
    fn glGetActiveUniform(program: GLuint, index: GLuint, buf_size: GLsizei, length: *mut GLsizei, size: *mut GLint, type_: *mut GLenum, name: *mut GLchar) => GetActiveUniform;
    fn glGetAttachedShaders(program: GLuint, maxcount: GLsizei, count: *mut GLsizei, shaders: *mut GLuint) => GetAttachedShaders;
    fn glGetAttribLocation(program: GLuint, name: *const GLchar) -> GLint = -1 => GetAttribLocation;
    fn glGetBufferParameteriv(target: GLenum, pname: GLenum, params: *mut GLint) => GetBufferParameteriv;
    fn glGetError() -> GLenum = 0 => GetError;
    fn glGetFramebufferAttachmentParameteriv(target: GLenum, attachment: GLenum, pname: GLenum, params: *mut GLint) => GetFramebufferAttachmentParameteriv;
    fn glGetProgramiv(program: GLuint, pname: GLenum, params: *mut GLint) => GetProgramiv;
    fn glGetProgramInfoLog(program: GLuint, buf_size: GLsizei, length: *mut GLsizei, info_log: *mut GLchar) => GetProgramInfoLog;
    fn glGetRenderbufferParameteriv(target: GLenum, pname: GLenum, params: *mut GLint) => GetRenderbufferParameteriv;
    fn glGetShaderiv(shader: GLuint, pname: GLenum, params: *mut GLint) => GetShaderiv;
    fn glGetShaderInfoLog(shader: GLuint, buf_size: GLsizei, length: *mut GLsizei, info_log: *mut GLchar) => GetShaderInfoLog;
    fn glGetShaderPrecisionFormat(shadertype: GLenum, precisiontype: GLenum, range: *mut GLint, precision: *mut GLint) => GetShaderPrecisionFormat;
    fn glGetShaderSource(shader: GLuint, buf_size: GLsizei, length: *mut GLsizei, source: *mut GLchar) => GetShaderSource;
    fn glGetTexParameterfv(target: GLenum, pname: GLenum, params: *mut GLfloat) => GetTexParameterfv;
    fn glGetTexParameteriv(target: GLenum, pname: GLenum, params: *mut GLint) => GetTexParameteriv;
    fn glGetUniformfv(program: GLuint, location: GLint, params: *mut GLfloat) => GetUniformfv;
    fn glGetUniformiv(program: GLuint, location: GLint, params: *mut GLint) => GetUniformiv;
    fn glGetUniformLocation(program: GLuint, name: *const GLchar) -> GLint = -1 => GetUniformLocation;
    fn glGetVertexAttribfv(index: GLuint, pname: GLenum, params: *mut GLfloat) => GetVertexAttribfv;
    fn glGetVertexAttribiv(index: GLuint, pname: GLenum, params: *mut GLint) => GetVertexAttribiv;
    fn glGetVertexAttribPointerv(index: GLuint, pname: GLenum, pointer: *mut *mut c_void) => GetVertexAttribPointerv;
    fn glHint(target: GLenum, mode: GLenum) => Hint;
    fn glIsBuffer(buffer: GLuint) -> GLboolean = 0 => IsBuffer;
    fn glIsEnabled(cap: GLenum) -> GLboolean = 0 => IsEnabled;
    fn glIsFramebuffer(framebuffer: GLuint) -> GLboolean = 0 => IsFramebuffer;
    fn glIsProgram(program: GLuint) -> GLboolean = 0 => IsProgram;
    fn glIsRenderbuffer(renderbuffer: GLuint) -> GLboolean = 0 => IsRenderbuffer;
    fn glIsShader(shader: GLuint) -> GLboolean = 0 => IsShader;
    fn glIsTexture(texture: GLuint) -> GLboolean = 0 => IsTexture;
    fn glLineWidth(width: GLfloat) => LineWidth;
    fn glLinkProgram(program: GLuint) => LinkProgram;
    fn glPixelStorei(pname: GLenum, param: GLint) => PixelStorei;
    fn glPolygonOffset(factor: GLfloat, units: GLfloat) => PolygonOffset;
    fn glReadPixels(x: GLint, y: GLint, width: GLsizei, height: GLsizei, format: GLenum, type_: GLenum, pixels: *mut c_void) => ReadPixels;
    fn glReleaseShaderCompiler() => ReleaseShaderCompiler;
    fn glRenderbufferStorage(target: GLenum, internalformat: GLenum, width: GLsizei, height: GLsizei) => RenderbufferStorage;
    fn glSampleCoverage(value: GLclampf, invert: GLboolean) => SampleCoverage;
    fn glScissor(x: GLint, y: GLint, width: GLsizei, height: GLsizei) => Scissor;
    fn glShaderBinary(n: GLsizei, shaders: *const GLuint, binaryformat: GLenum, binary: *const c_void, length: GLsizei) => ShaderBinary;
    fn glShaderSource(shader: GLuint, count: GLsizei, string: *const *const GLchar, length: *const GLint) => ShaderSource;
    fn glStencilFunc(func: GLenum, reference: GLint, mask: GLuint) => StencilFunc;
    fn glStencilFuncSeparate(face: GLenum, func: GLenum, reference: GLint, mask: GLuint) => StencilFuncSeparate;
    fn glStencilMask(mask: GLuint) => StencilMask;
    fn glStencilMaskSeparate(face: GLenum, mask: GLuint) => StencilMaskSeparate;
    fn glStencilOp(fail: GLenum, zfail: GLenum, zpass: GLenum) => StencilOp;
    fn glStencilOpSeparate(face: GLenum, sfail: GLenum, dpfail: GLenum, dppass: GLenum) => StencilOpSeparate;
    fn glTexImage2D(target: GLenum, level: GLint, internalformat: GLint, width: GLsizei, height: GLsizei, border: GLint, format: GLenum, type_: GLenum, pixels: *const c_void) => TexImage2D;
    fn glTexParameterf(target: GLenum, pname: GLenum, param: GLfloat) => TexParameterf;
    fn glTexParameterfv(target: GLenum, pname: GLenum, params: *const GLfloat) => TexParameterfv;
    fn glTexParameteri(target: GLenum, pname: GLenum, param: GLint) => TexParameteri;
    fn glTexParameteriv(target: GLenum, pname: GLenum, params: *const GLint) => TexParameteriv;
    fn glTexSubImage2D(target: GLenum, level: GLint, xoffset: GLint, yoffset: GLint, width: GLsizei, height: GLsizei, format: GLenum, type_: GLenum, pixels: *const c_void) => TexSubImage2D;
    fn glUniform1f(location: GLint, x: GLfloat) => Uniform1f;
    fn glUniform1fv(location: GLint, count: GLsizei, v: *const GLfloat) => Uniform1fv;
    fn glUniform1i(location: GLint, x: GLint) => Uniform1i;
    fn glUniform1iv(location: GLint, count: GLsizei, v: *const GLint) => Uniform1iv;
    fn glUniform2f(location: GLint, x: GLfloat, y: GLfloat) => Uniform2f;
    fn glUniform2fv(location: GLint, count: GLsizei, v: *const GLfloat) => Uniform2fv;
    fn glUniform2i(location: GLint, x: GLint, y: GLint) => Uniform2i;
    fn glUniform2iv(location: GLint, count: GLsizei, v: *const GLint) => Uniform2iv;
    fn glUniform3f(location: GLint, x: GLfloat, y: GLfloat, z: GLfloat) => Uniform3f;
    fn glUniform3fv(location: GLint, count: GLsizei, v: *const GLfloat) => Uniform3fv;
    fn glUniform3i(location: GLint, x: GLint, y: GLint, z: GLint) => Uniform3i;
    fn glUniform3iv(location: GLint, count: GLsizei, v: *const GLint) => Uniform3iv;
    fn glUniform4f(location: GLint, x: GLfloat, y: GLfloat, z: GLfloat, w: GLfloat) => Uniform4f;
    fn glUniform4fv(location: GLint, count: GLsizei, v: *const GLfloat) => Uniform4fv;
    fn glUniform4i(location: GLint, x: GLint, y: GLint, z: GLint, w: GLint) => Uniform4i;
    fn glUniform4iv(location: GLint, count: GLsizei, v: *const GLint) => Uniform4iv;
    fn glUniformMatrix2fv(location: GLint, count: GLsizei, transpose: GLboolean, value: *const GLfloat) => UniformMatrix2fv;
    fn glUniformMatrix3fv(location: GLint, count: GLsizei, transpose: GLboolean, value: *const GLfloat) => UniformMatrix3fv;
    fn glUniformMatrix4fv(location: GLint, count: GLsizei, transpose: GLboolean, value: *const GLfloat) => UniformMatrix4fv;
    fn glUseProgram(program: GLuint) => UseProgram;
    fn glValidateProgram(program: GLuint) => ValidateProgram;
    fn glVertexAttrib1f(index: GLuint, x: GLfloat) => VertexAttrib1f;
    fn glVertexAttrib1fv(index: GLuint, values: *const GLfloat) => VertexAttrib1fv;
    fn glVertexAttrib2f(index: GLuint, x: GLfloat, y: GLfloat) => VertexAttrib2f;
    fn glVertexAttrib2fv(index: GLuint, values: *const GLfloat) => VertexAttrib2fv;
    fn glVertexAttrib3f(index: GLuint, x: GLfloat, y: GLfloat, z: GLfloat) => VertexAttrib3f;
    fn glVertexAttrib3fv(index: GLuint, values: *const GLfloat) => VertexAttrib3fv;
    fn glVertexAttrib4f(index: GLuint, x: GLfloat, y: GLfloat, z: GLfloat, w: GLfloat) => VertexAttrib4f;
    fn glVertexAttrib4fv(index: GLuint, values: *const GLfloat) => VertexAttrib4fv;
    fn glVertexAttribPointer(index: GLuint, size: GLint, type_: GLenum, normalized: GLboolean, stride: GLsizei, ptr: *const c_void) => VertexAttribPointer;
    fn glViewport(x: GLint, y: GLint, width: GLsizei, height: GLsizei) => Viewport;
}

// State queries work without a current context.

#[no_mangle]
pub unsafe extern "C" fn glGetBooleanv(pname: GLenum, params: *mut GLboolean) {
    with_current_or_throwaway(|ctx| ctx.GetBooleanv(pname, params));
}

#[no_mangle]
pub unsafe extern "C" fn glGetFloatv(pname: GLenum, params: *mut GLfloat) {
    with_current_or_throwaway(|ctx| ctx.GetFloatv(pname, params));
}

#[no_mangle]
pub unsafe extern "C" fn glGetIntegerv(pname: GLenum, params: *mut GLint) {
    with_current_or_throwaway(|ctx| ctx.GetIntegerv(pname, params));
}

#[no_mangle]
pub unsafe extern "C" fn glGetString(name: GLenum) -> *const GLubyte {
    with_current_or_throwaway(|ctx| ctx.GetString(name)).unwrap_or(std::ptr::null())
}

/// `GLeglImageOES` is an opaque pointer, but the EGL layer hands out small
/// integer handles in it.
fn egl_image_handle(image: *const c_void) -> EglImageHandle {
    image as usize as EglImageHandle
}

#[no_mangle]
pub unsafe extern "C" fn glEGLImageTargetTexture2DOES(target: GLenum, image: *const c_void) {
    with_current(|ctx: &mut GLESv2Context| {
        ctx.EGLImageTargetTexture2DOES(target, egl_image_handle(image))
    });
}

#[no_mangle]
pub unsafe extern "C" fn glEGLImageTargetRenderbufferStorageOES(
    target: GLenum,
    image: *const c_void,
) {
    with_current(|ctx: &mut GLESv2Context| {
        ctx.EGLImageTargetRenderbufferStorageOES(target, egl_image_handle(image))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gles::gles20_raw as gles20;
    use crate::gles::translator::make_current;

    #[test]
    fn no_current_context() {
        make_current(None);
        unsafe {
            assert_eq!(glCreateShader(gles20::VERTEX_SHADER), 0);
            assert_eq!(glIsTexture(1), 0);
            assert_eq!(glGetError(), gles20::NO_ERROR);
            let name = b"position\0";
            assert_eq!(glGetAttribLocation(1, name.as_ptr() as *const GLchar), -1);
            glDrawArrays(gles20::TRIANGLES, 0, 3);
            glEGLImageTargetTexture2DOES(gles20::TEXTURE_2D, 1 as *const c_void);
        }
    }

    #[test]
    fn image_handles() {
        assert_eq!(egl_image_handle(std::ptr::null()), 0);
        assert_eq!(egl_image_handle(42 as *const c_void), 42);
    }
}
