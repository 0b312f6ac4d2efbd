/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Implementation of the OpenGL ES 2.0 entry points on top of the host's
//! OpenGL 2.1 compatibility profile.
//!
//! Each entry point validates its arguments the way GLES requires, latching
//! the first error on the context, translates guest object names into host
//! names through the share group, and then calls the host. Some calls never
//! reach the host at all (buffer objects live entirely in the translator),
//! and some are emulated because desktop GL lacks the feature: `GL_FIXED`
//! vertex arrays, compressed texture formats, the `GL_ARB_ES2_compatibility`
//! queries and the current value of attribute 0.
//!
//! The methods keep the GLES function names (minus the `gl` prefix) so that
//! [super::exports] reads as a straight mapping.

use super::context::{caps, strings, texture_slot, with_share_group, GLESv2Context};
use super::convert::{ConversionArena, Indices};
use super::dispatch::GLDispatch;
use super::framebuffer::{AttachPoint, FramebufferData};
use super::gl21compat_raw as gl21;
use super::gles20_raw as gles20;
use super::gles20_raw::types::*;
use super::object_names::{lock_share_group, NamedObjectType, ObjectLocalName, ShareGroup};
use super::objects::{EglImageDetach, EglImageHandle, ObjectData, RenderbufferData, TextureData};
use super::pointer::GLESBuffer;
use super::program::{ProgramData, ShaderData};
use super::util::{
    aligned_rgb_pitch, etc1_decode_image, etc1_encoded_size, PalettedTextureFormat,
    COMPRESSED_TEXTURE_FORMATS,
};
use super::validate;
use std::ffi::{c_void, CStr};
use std::sync::Arc;

/// Latch `$err` and return (with `$ret`, if given) when `$cond` holds.
macro_rules! set_error_if {
    ($ctx:expr, $cond:expr, $err:expr) => {
        if $cond {
            $ctx.set_gl_error($err);
            return;
        }
    };
    ($ctx:expr, $cond:expr, $err:expr, $ret:expr) => {
        if $cond {
            $ctx.set_gl_error($err);
            return $ret;
        }
    };
}

/// Entry points with no GLES-specific behavior.
macro_rules! pass_through {
    ($(fn $name:ident($($arg:ident: $ty:ty),*);)*) => {
        impl GLESv2Context {
            $(
                pub unsafe fn $name(&mut self, $($arg: $ty),*) {
                    self.host.$name($($arg),*)
                }
            )*
        }
    }
}

/// Limits that desktop GL only reports with `GL_ARB_ES2_compatibility`.
/// Without it, these values are made up.
const ES2_EMULATED_PARAMS: &[(GLenum, GLint)] = &[
    (gles20::SHADER_COMPILER, 1),
    (gles20::NUM_SHADER_BINARY_FORMATS, 0),
    (gles20::MAX_VERTEX_UNIFORM_VECTORS, 128),
    (gles20::MAX_VARYING_VECTORS, 8),
    (gles20::MAX_FRAGMENT_UNIFORM_VECTORS, 16),
];

fn es2_emulated_param(pname: GLenum) -> Option<GLint> {
    ES2_EMULATED_PARAMS
        .iter()
        .find(|&&(p, _)| p == pname)
        .map(|&(_, value)| value)
}

fn is_es2_param(pname: GLenum) -> bool {
    pname == gles20::SHADER_BINARY_FORMATS || es2_emulated_param(pname).is_some()
}

unsafe fn c_str_bytes<'a>(s: *const GLchar) -> &'a [u8] {
    if s.is_null() {
        &[]
    } else {
        CStr::from_ptr(s).to_bytes()
    }
}

/// Copy a string into a guest buffer of `buf_size` bytes, truncating it to
/// fit along with its NUL terminator. `length` gets the length written,
/// excluding the terminator.
unsafe fn copy_to_guest(src: &[u8], buf_size: GLsizei, length: *mut GLsizei, out: *mut GLchar) {
    let src = src.split(|&b| b == 0).next().unwrap_or(&[]);
    let mut written = 0;
    if buf_size > 0 && !out.is_null() {
        written = src.len().min(buf_size as usize - 1);
        std::ptr::copy_nonoverlapping(src.as_ptr(), out as *mut u8, written);
        out.add(written).write(0);
    }
    if !length.is_null() {
        length.write(written as GLsizei);
    }
}

/// Fetch an info log of `len` bytes (as the host reports it, terminator
/// included) through `get`.
fn read_info_log(len: GLint, get: impl FnOnce(GLsizei, *mut GLsizei, *mut GLchar)) -> Vec<u8> {
    if len <= 0 {
        return Vec::new();
    }
    let mut log = vec![0u8; len as usize + 1];
    let mut written: GLsizei = 0;
    get(log.len() as GLsizei, &mut written, log.as_mut_ptr() as *mut GLchar);
    log.truncate(written.clamp(0, len) as usize);
    if let Some(nul) = log.iter().position(|&b| b == 0) {
        log.truncate(nul);
    }
    log
}

unsafe fn host_shader_info_log(host: &dyn GLDispatch, shader: GLuint) -> Vec<u8> {
    let mut len = 0;
    host.GetShaderiv(shader, gl21::INFO_LOG_LENGTH, &mut len);
    read_info_log(len, |size, length, buf| unsafe {
        host.GetShaderInfoLog(shader, size, length, buf)
    })
}

unsafe fn host_program_info_log(host: &dyn GLDispatch, program: GLuint) -> Vec<u8> {
    let mut len = 0;
    host.GetProgramiv(program, gl21::INFO_LOG_LENGTH, &mut len);
    read_info_log(len, |size, length, buf| unsafe {
        host.GetProgramInfoLog(program, size, length, buf)
    })
}

/// GLES reports info log lengths with the terminator, or 0 for no log.
fn info_log_length(log: &[u8]) -> GLint {
    if log.is_empty() {
        0
    } else {
        log.len() as GLint + 1
    }
}

/// The texture's data, created on first use.
fn texture_data(group: &mut ShareGroup, tex: ObjectLocalName) -> Option<&mut TextureData> {
    if group.get_object_data(NamedObjectType::Texture, tex).is_none() {
        group.set_object_data(
            NamedObjectType::Texture,
            tex,
            ObjectData::Texture(TextureData::default()),
        );
    }
    group
        .get_object_data_mut(NamedObjectType::Texture, tex)
        .and_then(ObjectData::texture_mut)
}

fn program_data(group: &ShareGroup, program: ObjectLocalName) -> Option<&ProgramData> {
    group
        .get_object_data(NamedObjectType::Shader, program)
        .and_then(ObjectData::program)
}

fn program_data_mut(group: &mut ShareGroup, program: ObjectLocalName) -> Option<&mut ProgramData> {
    group
        .get_object_data_mut(NamedObjectType::Shader, program)
        .and_then(ObjectData::program_mut)
}

fn shader_data(group: &ShareGroup, shader: ObjectLocalName) -> Option<&ShaderData> {
    group
        .get_object_data(NamedObjectType::Shader, shader)
        .and_then(ObjectData::shader)
}

fn shader_data_mut(group: &mut ShareGroup, shader: ObjectLocalName) -> Option<&mut ShaderData> {
    group
        .get_object_data_mut(NamedObjectType::Shader, shader)
        .and_then(ObjectData::shader_mut)
}

/// A shader's program has let go of it: forget the shader if its deletion
/// was waiting on that.
fn release_shader(group: &mut ShareGroup, shader: ObjectLocalName) {
    let delete = match shader_data_mut(group, shader) {
        Some(data) => {
            data.attached_program = 0;
            data.delete_status
        }
        None => false,
    };
    if delete {
        group.delete_name(NamedObjectType::Shader, shader);
    }
}

fn buffer_data_mut(group: &mut ShareGroup, buffer: ObjectLocalName) -> Option<&mut GLESBuffer> {
    group
        .get_object_data_mut(NamedObjectType::VertexBuffer, buffer)
        .and_then(ObjectData::buffer_mut)
}

/// Host enum for a guest pixel or vertex type that desktop GL spells
/// differently.
fn host_type(type_: GLenum) -> GLenum {
    if type_ == gles20::HALF_FLOAT_OES {
        gl21::HALF_FLOAT_NV
    } else {
        type_
    }
}

impl GLESv2Context {
    /// Host name of a program, latching the errors GLES requires if `program`
    /// doesn't name one.
    fn checked_program(&mut self, group: &ShareGroup, program: GLuint) -> Option<GLuint> {
        let global = group.get_global_name(NamedObjectType::Shader, program as ObjectLocalName);
        if global == 0 {
            self.set_gl_error(gles20::INVALID_VALUE);
            return None;
        }
        if program_data(group, program as ObjectLocalName).is_none() {
            self.set_gl_error(gles20::INVALID_OPERATION);
            return None;
        }
        Some(global)
    }

    /// Like [Self::checked_program], for shaders.
    fn checked_shader(&mut self, group: &ShareGroup, shader: GLuint) -> Option<GLuint> {
        let global = group.get_global_name(NamedObjectType::Shader, shader as ObjectLocalName);
        if global == 0 {
            self.set_gl_error(gles20::INVALID_VALUE);
            return None;
        }
        if shader_data(group, shader as ObjectLocalName).is_none() {
            self.set_gl_error(gles20::INVALID_OPERATION);
            return None;
        }
        Some(global)
    }

    /// Give a newly created host shader or program a local name. [None] if
    /// there is no share group to put it in.
    fn adopt_shader_object(&self, global: GLuint, data: ObjectData) -> Option<GLuint> {
        if global == 0 {
            return None;
        }
        with_share_group(self, |group| {
            let local = group.gen_name(NamedObjectType::Shader, 0, true);
            group.replace_global_name(NamedObjectType::Shader, local, global);
            group.set_object_data(NamedObjectType::Shader, local, data);
            local as GLuint
        })
    }

    fn prepare_framebuffer(&self) {
        with_share_group(self, |group| self.draw_validate(group));
    }

    /// Remove a deleted texture or renderbuffer from the bound framebuffer.
    unsafe fn detach_from_framebuffer(&mut self, ty: NamedObjectType, name: ObjectLocalName) {
        let fb = self.framebuffer;
        if fb == 0 {
            return;
        }
        let attachments = with_share_group(self, |group| {
            group
                .get_object_data(NamedObjectType::Framebuffer, fb)
                .and_then(ObjectData::framebuffer)
                .map(|fb_data| AttachPoint::ALL.map(|point| (point, fb_data.attachment(point))))
        })
        .flatten();
        for (point, attachment) in attachments.into_iter().flatten() {
            if attachment.owned || attachment.name != name {
                continue;
            }
            match ty {
                NamedObjectType::Texture if validate::texture_target_ex(attachment.target) => {
                    self.FramebufferTexture2D(
                        gles20::FRAMEBUFFER,
                        point.to_gl(),
                        attachment.target,
                        0,
                        0,
                    )
                }
                NamedObjectType::Renderbuffer
                    if validate::renderbuffer_target(attachment.target) =>
                {
                    self.FramebufferRenderbuffer(
                        gles20::FRAMEBUFFER,
                        point.to_gl(),
                        attachment.target,
                        0,
                    )
                }
                _ => (),
            }
        }
    }

    /// Desktop GL only rasterizes points with `gl_PointSize` and texture
    /// coordinates when asked to.
    unsafe fn begin_points(&self, mode: GLenum) {
        if mode == gles20::POINTS {
            self.host.Enable(gl21::POINT_SPRITE);
            self.host.Enable(gl21::VERTEX_PROGRAM_POINT_SIZE);
        }
    }

    unsafe fn end_points(&self, mode: GLenum) {
        if mode == gles20::POINTS {
            self.host.Disable(gl21::VERTEX_PROGRAM_POINT_SIZE);
            self.host.Disable(gl21::POINT_SPRITE);
        }
    }

    unsafe fn gen_objects(
        &mut self,
        ty: NamedObjectType,
        n: GLsizei,
        names: *mut GLuint,
        make_data: impl Fn(ObjectLocalName) -> Option<ObjectData>,
    ) {
        set_error_if!(self, n < 0, gles20::INVALID_VALUE);
        with_share_group(self, |group| {
            for i in 0..n as usize {
                let name = group.gen_name(ty, 0, true);
                if let Some(data) = make_data(name) {
                    group.set_object_data(ty, name, data);
                }
                names.add(i).write(name as GLuint);
            }
        });
    }
}

pass_through! {
    fn BlendColor(red: GLclampf, green: GLclampf, blue: GLclampf, alpha: GLclampf);
    fn ClearColor(red: GLclampf, green: GLclampf, blue: GLclampf, alpha: GLclampf);
    fn ClearStencil(s: GLint);
    fn ColorMask(red: GLboolean, green: GLboolean, blue: GLboolean, alpha: GLboolean);
    fn CullFace(mode: GLenum);
    fn DepthFunc(func: GLenum);
    fn DepthMask(flag: GLboolean);
    fn Disable(cap: GLenum);
    fn Enable(cap: GLenum);
    fn Finish();
    fn Flush();
    fn FrontFace(mode: GLenum);
    fn LineWidth(width: GLfloat);
    fn PolygonOffset(factor: GLfloat, units: GLfloat);
    fn SampleCoverage(value: GLclampf, invert: GLboolean);
    fn Scissor(x: GLint, y: GLint, width: GLsizei, height: GLsizei);
    fn StencilFunc(func: GLenum, reference: GLint, mask: GLuint);
    fn StencilMask(mask: GLuint);
    fn StencilOp(fail: GLenum, zfail: GLenum, zpass: GLenum);
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
    fn Viewport(x: GLint, y: GLint, width: GLsizei, height: GLsizei);
}

impl GLESv2Context {
    // Textures and units

    pub unsafe fn ActiveTexture(&mut self, texture: GLenum) {
        set_error_if!(
            self,
            !validate::texture_unit(caps(), texture),
            gles20::INVALID_ENUM
        );
        self.active_texture = (texture - gles20::TEXTURE0) as usize;
        self.host.ActiveTexture(texture);
    }

    pub unsafe fn BindTexture(&mut self, target: GLenum, texture: GLuint) {
        // Face targets are never valid here, but a texture already fixed to
        // another target reports the mismatch instead.
        if validate::is_cube_map_face(target) && texture != 0 {
            let mismatch = with_share_group(self, |group| {
                group
                    .get_object_data(NamedObjectType::Texture, texture as ObjectLocalName)
                    .and_then(ObjectData::texture)
                    .is_some_and(|data| {
                        data.target != 0 && texture_slot(data.target) != texture_slot(target)
                    })
            });
            set_error_if!(self, mismatch == Some(true), gles20::INVALID_OPERATION);
        }
        set_error_if!(
            self,
            !validate::texture_target(target),
            gles20::INVALID_ENUM
        );
        let local = Self::texture_local_name(target, texture as ObjectLocalName);
        let mut global = texture;
        if let Some(group_ptr) = self.share_group.clone() {
            let mut group = lock_share_group(&group_ptr);
            if group.get_global_name(NamedObjectType::Texture, local) == 0 {
                group.gen_name(NamedObjectType::Texture, local, false);
            }
            global = group.get_global_name(NamedObjectType::Texture, local);
            if let Some(data) = texture_data(&mut group, local) {
                // A texture's target is fixed by its first binding.
                set_error_if!(
                    self,
                    data.target != 0 && texture_slot(data.target) != texture_slot(target),
                    gles20::INVALID_OPERATION
                );
                if data.target == 0 {
                    data.target = target;
                }
                data.was_bound = true;
            }
        }
        self.set_bound_texture(target, texture as ObjectLocalName);
        self.host.BindTexture(target, global);
    }

    pub unsafe fn GenTextures(&mut self, n: GLsizei, textures: *mut GLuint) {
        self.gen_objects(NamedObjectType::Texture, n, textures, |_| None)
    }

    pub unsafe fn DeleteTextures(&mut self, n: GLsizei, textures: *const GLuint) {
        set_error_if!(self, n < 0, gles20::INVALID_VALUE);
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        for i in 0..n as usize {
            let tex = textures.add(i).read() as ObjectLocalName;
            if tex == 0 {
                continue;
            }
            {
                let mut group = lock_share_group(&group_ptr);
                let global = group.get_global_name(NamedObjectType::Texture, tex);
                let from_egl_image = group
                    .get_object_data(NamedObjectType::Texture, tex)
                    .and_then(ObjectData::texture)
                    .is_some_and(|data| data.source_egl_image != 0);
                // An EGLImage's texture belongs to the image.
                if global != 0 && !from_egl_image {
                    self.host.DeleteTextures(1, &global);
                }
                group.delete_name(NamedObjectType::Texture, tex);
            }
            for target in [gles20::TEXTURE_2D, gles20::TEXTURE_CUBE_MAP] {
                if self.bound_texture(target) == tex {
                    self.BindTexture(target, 0);
                }
            }
            self.detach_from_framebuffer(NamedObjectType::Texture, tex);
        }
    }

    pub unsafe fn IsTexture(&mut self, texture: GLuint) -> GLboolean {
        if texture == 0 {
            return 0;
        }
        with_share_group(self, |group| {
            group
                .get_object_data(NamedObjectType::Texture, texture as ObjectLocalName)
                .and_then(ObjectData::texture)
                .is_some_and(|data| data.was_bound)
        })
        .unwrap_or(false) as GLboolean
    }

    pub unsafe fn GenerateMipmap(&mut self, target: GLenum) {
        set_error_if!(
            self,
            !validate::texture_target(target),
            gles20::INVALID_ENUM
        );
        self.host.GenerateMipmapEXT(target);
    }

    pub unsafe fn TexImage2D(
        &mut self,
        target: GLenum,
        level: GLint,
        internalformat: GLint,
        width: GLsizei,
        height: GLsizei,
        border: GLint,
        format: GLenum,
        type_: GLenum,
        pixels: *const c_void,
    ) {
        let caps = caps();
        set_error_if!(
            self,
            !(validate::texture_target_ex(target)
                && validate::pixel_format(caps, format)
                && validate::pixel_type(caps, type_)),
            gles20::INVALID_ENUM
        );
        set_error_if!(
            self,
            !validate::pixel_format(caps, internalformat as GLenum),
            gles20::INVALID_VALUE
        );
        set_error_if!(
            self,
            validate::is_cube_map_face(target) && width != height,
            gles20::INVALID_VALUE
        );
        let depth = gles20::DEPTH_COMPONENT;
        let depth_type = type_ == gles20::UNSIGNED_SHORT || type_ == gles20::UNSIGNED_INT;
        set_error_if!(
            self,
            (format == depth || internalformat as GLenum == depth) && !depth_type,
            gles20::INVALID_OPERATION
        );
        set_error_if!(
            self,
            depth_type && (format != depth || internalformat as GLenum != depth),
            gles20::INVALID_OPERATION
        );
        set_error_if!(
            self,
            !(validate::pixel_op(format, type_) && internalformat as GLenum == format),
            gles20::INVALID_OPERATION
        );
        set_error_if!(self, border != 0, gles20::INVALID_VALUE);

        if let Some(group_ptr) = self.share_group.clone() {
            let mut group = lock_share_group(&group_ptr);
            let tex = self.bound_texture_local_name(target);
            let mut restore = None;
            if let Some(data) = texture_data(&mut group, tex) {
                data.width = width;
                data.height = height;
                data.border = border;
                data.internal_format = internalformat;
                if data.target == 0 {
                    data.target = target;
                }
                // Redefining an EGLImage target gives it back its own storage.
                if data.source_egl_image != 0 {
                    data.detach_egl_image();
                    restore = Some(std::mem::take(&mut data.old_global));
                }
            }
            if let Some(old_global) = restore {
                group.replace_global_name(NamedObjectType::Texture, tex, old_global);
                self.host.BindTexture(gl21::TEXTURE_2D, old_global);
            }
        }

        let mut type_ = host_type(type_);
        let mut internalformat = internalformat;
        if pixels.is_null() && type_ == gles20::UNSIGNED_SHORT_5_5_5_1 {
            type_ = gles20::UNSIGNED_SHORT;
        }
        if type_ == gles20::FLOAT {
            internalformat = if format == gles20::RGBA {
                gl21::RGBA32F_ARB
            } else {
                gl21::RGB32F_ARB
            } as GLint;
        }
        self.host.TexImage2D(
            target,
            level,
            internalformat,
            width,
            height,
            border,
            format,
            type_,
            pixels,
        );
    }

    pub unsafe fn TexSubImage2D(
        &mut self,
        target: GLenum,
        level: GLint,
        xoffset: GLint,
        yoffset: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        type_: GLenum,
        pixels: *const c_void,
    ) {
        let caps = caps();
        set_error_if!(
            self,
            !validate::texture_target_ex(target),
            gles20::INVALID_ENUM
        );
        set_error_if!(self, width < 0 || height < 0, gles20::INVALID_VALUE);
        set_error_if!(
            self,
            !(validate::pixel_format(caps, format) && validate::pixel_type(caps, type_)),
            gles20::INVALID_ENUM
        );
        set_error_if!(
            self,
            !validate::pixel_op(format, type_),
            gles20::INVALID_OPERATION
        );
        set_error_if!(self, pixels.is_null(), gles20::INVALID_OPERATION);
        self.host.TexSubImage2D(
            target,
            level,
            xoffset,
            yoffset,
            width,
            height,
            format,
            host_type(type_),
            pixels,
        );
    }

    pub unsafe fn CompressedTexImage2D(
        &mut self,
        target: GLenum,
        level: GLint,
        internalformat: GLenum,
        width: GLsizei,
        height: GLsizei,
        border: GLint,
        image_size: GLsizei,
        data: *const c_void,
    ) {
        set_error_if!(
            self,
            !validate::texture_target_ex(target),
            gles20::INVALID_ENUM
        );
        set_error_if!(self, level < 0 || image_size < 0, gles20::INVALID_VALUE);
        set_error_if!(self, data.is_null(), gles20::INVALID_OPERATION);
        let data = std::slice::from_raw_parts(data as *const u8, image_size as usize);

        if internalformat == gles20::ETC1_RGB8_OES {
            set_error_if!(
                self,
                etc1_encoded_size(width, height) > data.len(),
                gles20::INVALID_VALUE
            );
            let pitch = aligned_rgb_pitch(width, self.unpack_alignment);
            let Some(pixels) = etc1_decode_image(data, width, height, pitch) else {
                self.set_gl_error(gles20::INVALID_VALUE);
                return;
            };
            log_dbg!("Decoded ETC1 texture ({}x{})", width, height);
            self.TexImage2D(
                target,
                level,
                gles20::RGB as GLint,
                width,
                height,
                border,
                gles20::RGB,
                gles20::UNSIGNED_BYTE,
                pixels.as_ptr() as *const c_void,
            );
        } else if let Some(palette) = PalettedTextureFormat::get_info(internalformat) {
            let max_size = caps().max_texture_size;
            set_error_if!(
                self,
                level > max_size.max(1).ilog2() as GLint
                    || border != 0
                    || level > 0
                    || !validate::texture_dimensions(width, height, max_size + 2),
                gles20::INVALID_VALUE
            );
            let Some(pixels) = palette.decode(data, width, height, 0) else {
                self.set_gl_error(gles20::INVALID_VALUE);
                return;
            };
            log_dbg!("Decoded paletted texture ({}x{})", width, height);
            let format = palette.decoded_format();
            // Decoded rows are tightly packed.
            self.host.PixelStorei(gl21::UNPACK_ALIGNMENT, 1);
            self.TexImage2D(
                target,
                0,
                format as GLint,
                width,
                height,
                border,
                format,
                gles20::UNSIGNED_BYTE,
                pixels.as_ptr() as *const c_void,
            );
            self.host
                .PixelStorei(gl21::UNPACK_ALIGNMENT, self.unpack_alignment);
        } else {
            self.set_gl_error(gles20::INVALID_ENUM);
        }
    }

    pub unsafe fn CompressedTexSubImage2D(
        &mut self,
        target: GLenum,
        level: GLint,
        xoffset: GLint,
        yoffset: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        image_size: GLsizei,
        data: *const c_void,
    ) {
        set_error_if!(
            self,
            !validate::texture_target_ex(target),
            gles20::INVALID_ENUM
        );
        set_error_if!(self, data.is_null(), gles20::INVALID_OPERATION);
        self.host.CompressedTexSubImage2D(
            target, level, xoffset, yoffset, width, height, format, image_size, data,
        );
    }

    pub unsafe fn CopyTexImage2D(
        &mut self,
        target: GLenum,
        level: GLint,
        internalformat: GLenum,
        x: GLint,
        y: GLint,
        width: GLsizei,
        height: GLsizei,
        border: GLint,
    ) {
        set_error_if!(
            self,
            !(validate::pixel_format(caps(), internalformat) && validate::texture_target_ex(target)),
            gles20::INVALID_ENUM
        );
        set_error_if!(
            self,
            validate::is_cube_map_face(target) && width != height,
            gles20::INVALID_VALUE
        );
        set_error_if!(self, border != 0, gles20::INVALID_VALUE);
        self.host
            .CopyTexImage2D(target, level, internalformat, x, y, width, height, border);
    }

    pub unsafe fn CopyTexSubImage2D(
        &mut self,
        target: GLenum,
        level: GLint,
        xoffset: GLint,
        yoffset: GLint,
        x: GLint,
        y: GLint,
        width: GLsizei,
        height: GLsizei,
    ) {
        set_error_if!(
            self,
            !validate::texture_target_ex(target),
            gles20::INVALID_ENUM
        );
        self.host
            .CopyTexSubImage2D(target, level, xoffset, yoffset, x, y, width, height);
    }

    pub unsafe fn GetTexParameterfv(&mut self, target: GLenum, pname: GLenum, params: *mut GLfloat) {
        set_error_if!(
            self,
            !(validate::texture_target(target) && validate::texture_param(pname)),
            gles20::INVALID_ENUM
        );
        self.host.GetTexParameterfv(target, pname, params);
    }

    pub unsafe fn GetTexParameteriv(&mut self, target: GLenum, pname: GLenum, params: *mut GLint) {
        set_error_if!(
            self,
            !(validate::texture_target(target) && validate::texture_param(pname)),
            gles20::INVALID_ENUM
        );
        self.host.GetTexParameteriv(target, pname, params);
    }

    pub unsafe fn TexParameterf(&mut self, target: GLenum, pname: GLenum, param: GLfloat) {
        set_error_if!(
            self,
            !(validate::texture_target(target) && validate::texture_param(pname)),
            gles20::INVALID_ENUM
        );
        self.host.TexParameterf(target, pname, param);
    }

    pub unsafe fn TexParameterfv(&mut self, target: GLenum, pname: GLenum, params: *const GLfloat) {
        set_error_if!(
            self,
            !(validate::texture_target(target) && validate::texture_param(pname)),
            gles20::INVALID_ENUM
        );
        self.host.TexParameterfv(target, pname, params);
    }

    pub unsafe fn TexParameteri(&mut self, target: GLenum, pname: GLenum, param: GLint) {
        set_error_if!(
            self,
            !(validate::texture_target(target) && validate::texture_param(pname)),
            gles20::INVALID_ENUM
        );
        self.host.TexParameteri(target, pname, param);
    }

    pub unsafe fn TexParameteriv(&mut self, target: GLenum, pname: GLenum, params: *const GLint) {
        set_error_if!(
            self,
            !(validate::texture_target(target) && validate::texture_param(pname)),
            gles20::INVALID_ENUM
        );
        self.host.TexParameteriv(target, pname, params);
    }

    pub unsafe fn PixelStorei(&mut self, pname: GLenum, param: GLint) {
        set_error_if!(
            self,
            !validate::pixel_store_param(pname),
            gles20::INVALID_ENUM
        );
        set_error_if!(
            self,
            ![1, 2, 4, 8].contains(&param),
            gles20::INVALID_VALUE
        );
        if pname == gles20::UNPACK_ALIGNMENT {
            self.unpack_alignment = param;
        }
        self.host.PixelStorei(pname, param);
    }

    // Buffers

    pub unsafe fn GenBuffers(&mut self, n: GLsizei, buffers: *mut GLuint) {
        self.gen_objects(NamedObjectType::VertexBuffer, n, buffers, |_| {
            Some(ObjectData::Buffer(GLESBuffer::default()))
        })
    }

    pub unsafe fn BindBuffer(&mut self, target: GLenum, buffer: GLuint) {
        set_error_if!(
            self,
            !validate::buffer_target(target),
            gles20::INVALID_ENUM
        );
        let buffer = buffer as ObjectLocalName;
        // Buffers never reach the host: it is always given client pointers.
        with_share_group(self, |group| {
            if buffer == 0 {
                return;
            }
            if !group.is_object(NamedObjectType::VertexBuffer, buffer) {
                group.gen_name(NamedObjectType::VertexBuffer, buffer, false);
            }
            if buffer_data_mut(group, buffer).is_none() {
                group.set_object_data(
                    NamedObjectType::VertexBuffer,
                    buffer,
                    ObjectData::Buffer(GLESBuffer::default()),
                );
            }
            if let Some(data) = buffer_data_mut(group, buffer) {
                data.was_bound = true;
            }
        });
        self.bind_buffer(target, buffer);
    }

    pub unsafe fn BufferData(
        &mut self,
        target: GLenum,
        size: GLsizeiptr,
        data: *const c_void,
        usage: GLenum,
    ) {
        set_error_if!(
            self,
            !validate::buffer_target(target),
            gles20::INVALID_ENUM
        );
        set_error_if!(self, !validate::buffer_usage(usage), gles20::INVALID_ENUM);
        let buffer = self.bound_buffer(target);
        set_error_if!(self, buffer == 0, gles20::INVALID_OPERATION);
        set_error_if!(self, size < 0, gles20::INVALID_VALUE);
        let size = size as usize;
        let contents = (!data.is_null()).then(|| std::slice::from_raw_parts(data as *const u8, size));
        with_share_group(self, |group| {
            if let Some(buffer) = buffer_data_mut(group, buffer) {
                buffer.set_buffer(size, usage, contents);
            }
        });
    }

    pub unsafe fn BufferSubData(
        &mut self,
        target: GLenum,
        offset: GLintptr,
        size: GLsizeiptr,
        data: *const c_void,
    ) {
        let buffer = self.bound_buffer(target);
        set_error_if!(self, buffer == 0, gles20::INVALID_OPERATION);
        set_error_if!(
            self,
            !validate::buffer_target(target),
            gles20::INVALID_ENUM
        );
        set_error_if!(self, offset < 0 || size < 0, gles20::INVALID_VALUE);
        if data.is_null() {
            return;
        }
        let contents = std::slice::from_raw_parts(data as *const u8, size as usize);
        let fits = with_share_group(self, |group| {
            buffer_data_mut(group, buffer)
                .is_some_and(|buffer| buffer.set_sub_buffer(offset as usize, contents))
        });
        set_error_if!(self, fits == Some(false), gles20::INVALID_VALUE);
    }

    pub unsafe fn DeleteBuffers(&mut self, n: GLsizei, buffers: *const GLuint) {
        set_error_if!(self, n < 0, gles20::INVALID_VALUE);
        for i in 0..n as usize {
            let buffer = buffers.add(i).read() as ObjectLocalName;
            if buffer == 0 {
                continue;
            }
            with_share_group(self, |group| {
                group.delete_name(NamedObjectType::VertexBuffer, buffer)
            });
            self.unbind_buffer(buffer);
        }
    }

    pub unsafe fn IsBuffer(&mut self, buffer: GLuint) -> GLboolean {
        if buffer == 0 {
            return 0;
        }
        with_share_group(self, |group| {
            group
                .get_object_data(NamedObjectType::VertexBuffer, buffer as ObjectLocalName)
                .and_then(ObjectData::buffer)
                .is_some_and(|data| data.was_bound)
        })
        .unwrap_or(false) as GLboolean
    }

    pub unsafe fn GetBufferParameteriv(&mut self, target: GLenum, pname: GLenum, params: *mut GLint) {
        set_error_if!(
            self,
            !(validate::buffer_target(target) && validate::buffer_param(pname)),
            gles20::INVALID_ENUM
        );
        let buffer = self.bound_buffer(target);
        set_error_if!(self, buffer == 0, gles20::INVALID_OPERATION);
        let value = with_share_group(self, |group| {
            let data = buffer_data_mut(group, buffer)?;
            Some(match pname {
                gles20::BUFFER_SIZE => data.size() as GLint,
                _ => data.usage() as GLint,
            })
        })
        .flatten();
        if let Some(value) = value {
            params.write(value);
        }
    }

    // Framebuffers and renderbuffers

    pub unsafe fn GenFramebuffers(&mut self, n: GLsizei, framebuffers: *mut GLuint) {
        self.gen_objects(NamedObjectType::Framebuffer, n, framebuffers, |name| {
            Some(ObjectData::Framebuffer(FramebufferData::new(name)))
        })
    }

    pub unsafe fn GenRenderbuffers(&mut self, n: GLsizei, renderbuffers: *mut GLuint) {
        self.gen_objects(NamedObjectType::Renderbuffer, n, renderbuffers, |_| {
            Some(ObjectData::Renderbuffer(RenderbufferData::default()))
        })
    }

    pub unsafe fn BindFramebuffer(&mut self, target: GLenum, framebuffer: GLuint) {
        set_error_if!(
            self,
            !validate::framebuffer_target(target),
            gles20::INVALID_ENUM
        );
        let fb = framebuffer as ObjectLocalName;
        let global = with_share_group(self, |group| {
            if fb != 0 && group.get_global_name(NamedObjectType::Framebuffer, fb) == 0 {
                group.gen_name(NamedObjectType::Framebuffer, fb, false);
                group.set_object_data(
                    NamedObjectType::Framebuffer,
                    fb,
                    ObjectData::Framebuffer(FramebufferData::new(fb)),
                );
            }
            group.get_global_name(NamedObjectType::Framebuffer, fb)
        })
        .unwrap_or(framebuffer);
        self.host.BindFramebufferEXT(gl21::FRAMEBUFFER_EXT, global);
        self.framebuffer = fb;
    }

    pub unsafe fn BindRenderbuffer(&mut self, target: GLenum, renderbuffer: GLuint) {
        set_error_if!(
            self,
            !validate::renderbuffer_target(target),
            gles20::INVALID_ENUM
        );
        let rb = renderbuffer as ObjectLocalName;
        let global = with_share_group(self, |group| {
            if rb != 0 && group.get_global_name(NamedObjectType::Renderbuffer, rb) == 0 {
                group.gen_name(NamedObjectType::Renderbuffer, rb, false);
                group.set_object_data(
                    NamedObjectType::Renderbuffer,
                    rb,
                    ObjectData::Renderbuffer(RenderbufferData::default()),
                );
            }
            group.get_global_name(NamedObjectType::Renderbuffer, rb)
        })
        .unwrap_or(renderbuffer);
        self.host.BindRenderbufferEXT(gl21::RENDERBUFFER_EXT, global);
        self.renderbuffer = rb;
    }

    pub unsafe fn DeleteFramebuffers(&mut self, n: GLsizei, framebuffers: *const GLuint) {
        set_error_if!(self, n < 0, gles20::INVALID_VALUE);
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let mut group = lock_share_group(&group_ptr);
        for i in 0..n as usize {
            let fb = framebuffers.add(i).read() as ObjectLocalName;
            if fb == 0 {
                continue;
            }
            let global = group.get_global_name(NamedObjectType::Framebuffer, fb);
            group.delete_name(NamedObjectType::Framebuffer, fb);
            if global != 0 {
                self.host.DeleteFramebuffersEXT(1, &global);
            }
            // Deleting the bound framebuffer reverts to the default one.
            if self.framebuffer == fb {
                self.framebuffer = 0;
            }
        }
    }

    pub unsafe fn DeleteRenderbuffers(&mut self, n: GLsizei, renderbuffers: *const GLuint) {
        set_error_if!(self, n < 0, gles20::INVALID_VALUE);
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        for i in 0..n as usize {
            let rb = renderbuffers.add(i).read() as ObjectLocalName;
            if rb == 0 {
                continue;
            }
            {
                let mut group = lock_share_group(&group_ptr);
                let global = group.get_global_name(NamedObjectType::Renderbuffer, rb);
                group.delete_name(NamedObjectType::Renderbuffer, rb);
                if global != 0 {
                    self.host.DeleteRenderbuffersEXT(1, &global);
                }
            }
            if self.renderbuffer == rb {
                self.renderbuffer = 0;
            }
            self.detach_from_framebuffer(NamedObjectType::Renderbuffer, rb);
        }
    }

    /// Only true for the bound framebuffer.
    pub unsafe fn IsFramebuffer(&mut self, framebuffer: GLuint) -> GLboolean {
        let fb = framebuffer as ObjectLocalName;
        let exists = with_share_group(self, |group| {
            group.is_object(NamedObjectType::Framebuffer, fb)
        });
        (fb != 0 && exists == Some(true) && self.framebuffer == fb) as GLboolean
    }

    /// Only true for the bound renderbuffer.
    pub unsafe fn IsRenderbuffer(&mut self, renderbuffer: GLuint) -> GLboolean {
        let rb = renderbuffer as ObjectLocalName;
        let exists = with_share_group(self, |group| {
            group.is_object(NamedObjectType::Renderbuffer, rb)
        });
        (rb != 0 && exists == Some(true) && self.renderbuffer == rb) as GLboolean
    }

    pub unsafe fn CheckFramebufferStatus(&mut self, target: GLenum) -> GLenum {
        set_error_if!(
            self,
            !validate::framebuffer_target(target),
            gles20::INVALID_ENUM,
            gles20::FRAMEBUFFER_COMPLETE
        );
        self.prepare_framebuffer();
        self.host.CheckFramebufferStatusEXT(gl21::FRAMEBUFFER_EXT)
    }

    pub unsafe fn FramebufferRenderbuffer(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        renderbuffertarget: GLenum,
        renderbuffer: GLuint,
    ) {
        set_error_if!(
            self,
            !(validate::framebuffer_target(target)
                && validate::renderbuffer_target(renderbuffertarget)
                && validate::framebuffer_attachment(attachment)),
            gles20::INVALID_ENUM
        );
        let Some(group_ptr) = self.share_group.clone() else {
            self.set_gl_error(gles20::INVALID_OPERATION);
            return;
        };
        let mut group = lock_share_group(&group_ptr);
        let rb = renderbuffer as ObjectLocalName;
        let mut global = 0;
        if rb != 0 {
            if !group.is_object(NamedObjectType::Renderbuffer, rb) {
                group.gen_name(NamedObjectType::Renderbuffer, rb, false);
                group.set_object_data(
                    NamedObjectType::Renderbuffer,
                    rb,
                    ObjectData::Renderbuffer(RenderbufferData::default()),
                );
            }
            global = group.get_global_name(NamedObjectType::Renderbuffer, rb);
        }
        group.set_framebuffer_attachment(self.framebuffer, attachment, renderbuffertarget, rb, false);

        // A renderbuffer backed by an EGLImage is really the image's texture.
        let egl_texture = group
            .get_object_data(NamedObjectType::Renderbuffer, rb)
            .and_then(ObjectData::renderbuffer)
            .filter(|data| rb != 0 && data.source_egl_image != 0)
            .map(|data| data.egl_image_global_tex_name);
        match egl_texture {
            Some(texture) => self.host.FramebufferTexture2DEXT(
                gl21::FRAMEBUFFER_EXT,
                attachment,
                gl21::TEXTURE_2D,
                texture,
                0,
            ),
            None => self.host.FramebufferRenderbufferEXT(
                gl21::FRAMEBUFFER_EXT,
                attachment,
                gl21::RENDERBUFFER_EXT,
                global,
            ),
        }
    }

    pub unsafe fn FramebufferTexture2D(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: GLuint,
        level: GLint,
    ) {
        set_error_if!(
            self,
            !(validate::framebuffer_target(target)
                && validate::texture_target_ex(textarget)
                && validate::framebuffer_attachment(attachment)),
            gles20::INVALID_ENUM
        );
        set_error_if!(self, level != 0, gles20::INVALID_VALUE);
        let Some(group_ptr) = self.share_group.clone() else {
            self.set_gl_error(gles20::INVALID_OPERATION);
            return;
        };
        let mut group = lock_share_group(&group_ptr);
        let tex = texture as ObjectLocalName;
        let mut global = 0;
        if tex != 0 {
            if !group.is_object(NamedObjectType::Texture, tex) {
                group.gen_name(NamedObjectType::Texture, tex, false);
            }
            global = group.get_global_name(
                NamedObjectType::Texture,
                Self::texture_local_name(textarget, tex),
            );
        }
        self.host
            .FramebufferTexture2DEXT(gl21::FRAMEBUFFER_EXT, attachment, textarget, global, level);
        group.set_framebuffer_attachment(self.framebuffer, attachment, textarget, tex, false);
    }

    pub unsafe fn GetFramebufferAttachmentParameteriv(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        pname: GLenum,
        params: *mut GLint,
    ) {
        set_error_if!(
            self,
            !(validate::framebuffer_target(target)
                && validate::framebuffer_attachment(attachment)
                && validate::framebuffer_attachment_param(pname)),
            gles20::INVALID_ENUM
        );
        let fb = self.framebuffer;
        set_error_if!(self, fb == 0, gles20::INVALID_OPERATION);
        let recorded = with_share_group(self, |group| {
            let point = AttachPoint::from_gl(attachment)?;
            group
                .get_object_data(NamedObjectType::Framebuffer, fb)
                .and_then(ObjectData::framebuffer)
                .map(|fb_data| fb_data.attachment(point))
        })
        .flatten();
        if let Some(recorded) = recorded {
            // Attachments the translator made itself are invisible to the
            // guest.
            let recorded = if recorded.owned {
                Default::default()
            } else {
                recorded
            };
            let object_query = pname == gles20::FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE
                || pname == gles20::FRAMEBUFFER_ATTACHMENT_OBJECT_NAME;
            set_error_if!(
                self,
                recorded.name == 0 && !object_query,
                gles20::INVALID_ENUM
            );
            if pname == gles20::FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE {
                let type_ = if recorded.name == 0 {
                    gles20::NONE
                } else if validate::texture_target_ex(recorded.target) {
                    gles20::TEXTURE
                } else {
                    gles20::RENDERBUFFER
                };
                params.write(type_ as GLint);
                return;
            }
            if pname == gles20::FRAMEBUFFER_ATTACHMENT_OBJECT_NAME {
                params.write(recorded.name as GLint);
                return;
            }
        }
        self.host
            .GetFramebufferAttachmentParameterivEXT(gl21::FRAMEBUFFER_EXT, attachment, pname, params);
    }

    pub unsafe fn RenderbufferStorage(
        &mut self,
        target: GLenum,
        internalformat: GLenum,
        width: GLsizei,
        height: GLsizei,
    ) {
        set_error_if!(
            self,
            !validate::renderbuffer_target(target),
            gles20::INVALID_ENUM
        );
        // Desktop GL 2.1 has no sized 16-bit color formats.
        let internalformat = match internalformat {
            gles20::RGB565 => gl21::RGB,
            gles20::RGB5_A1 => gl21::RGBA,
            other => other,
        };
        let rb = self.renderbuffer;
        set_error_if!(self, rb == 0, gles20::INVALID_OPERATION);
        let detached = with_share_group(self, |group| {
            group
                .get_object_data_mut(NamedObjectType::Renderbuffer, rb)
                .and_then(ObjectData::renderbuffer_mut)
                .map(RenderbufferData::detach_egl_image)
        })
        .flatten();
        set_error_if!(self, detached.is_none(), gles20::INVALID_OPERATION);
        self.host
            .RenderbufferStorageEXT(gl21::RENDERBUFFER_EXT, internalformat, width, height);
    }

    pub unsafe fn GetRenderbufferParameteriv(
        &mut self,
        target: GLenum,
        pname: GLenum,
        params: *mut GLint,
    ) {
        set_error_if!(
            self,
            !(validate::renderbuffer_target(target) && validate::renderbuffer_param(pname)),
            gles20::INVALID_ENUM
        );
        let rb = self.renderbuffer;
        let egl_texture = with_share_group(self, |group| {
            group
                .get_object_data(NamedObjectType::Renderbuffer, rb)
                .and_then(ObjectData::renderbuffer)
                .filter(|data| data.source_egl_image != 0)
                .map(|data| data.egl_image_global_tex_name)
        })
        .flatten();
        let Some(texture) = egl_texture.filter(|_| rb != 0) else {
            self.host
                .GetRenderbufferParameterivEXT(gl21::RENDERBUFFER_EXT, pname, params);
            return;
        };

        // Ask about the image's texture instead.
        let tex_pname = match pname {
            gles20::RENDERBUFFER_WIDTH => gl21::TEXTURE_WIDTH,
            gles20::RENDERBUFFER_HEIGHT => gl21::TEXTURE_HEIGHT,
            gles20::RENDERBUFFER_INTERNAL_FORMAT => gl21::TEXTURE_INTERNAL_FORMAT,
            gles20::RENDERBUFFER_RED_SIZE => gl21::TEXTURE_RED_SIZE,
            gles20::RENDERBUFFER_GREEN_SIZE => gl21::TEXTURE_GREEN_SIZE,
            gles20::RENDERBUFFER_BLUE_SIZE => gl21::TEXTURE_BLUE_SIZE,
            gles20::RENDERBUFFER_ALPHA_SIZE => gl21::TEXTURE_ALPHA_SIZE,
            gles20::RENDERBUFFER_DEPTH_SIZE => gl21::TEXTURE_DEPTH_SIZE,
            _ => {
                params.write(0);
                return;
            }
        };
        let mut previous = 0;
        self.host.GetIntegerv(gl21::TEXTURE_BINDING_2D, &mut previous);
        self.host.BindTexture(gl21::TEXTURE_2D, texture);
        self.host
            .GetTexLevelParameteriv(gl21::TEXTURE_2D, 0, tex_pname, params);
        self.host.BindTexture(gl21::TEXTURE_2D, previous as GLuint);
    }

    // Shaders and programs

    pub unsafe fn CreateShader(&mut self, type_: GLenum) -> GLuint {
        set_error_if!(
            self,
            !validate::shader_type(type_),
            gles20::INVALID_ENUM,
            0
        );
        let global = self.host.CreateShader(type_);
        match self.adopt_shader_object(global, ObjectData::Shader(ShaderData::new(type_))) {
            Some(name) => name,
            None => {
                if global != 0 {
                    self.host.DeleteShader(global);
                }
                0
            }
        }
    }

    pub unsafe fn CreateProgram(&mut self) -> GLuint {
        let global = self.host.CreateProgram();
        match self.adopt_shader_object(global, ObjectData::Program(ProgramData::default())) {
            Some(name) => name,
            None => {
                if global != 0 {
                    self.host.DeleteProgram(global);
                }
                0
            }
        }
    }

    pub unsafe fn ShaderSource(
        &mut self,
        shader: GLuint,
        count: GLsizei,
        string: *const *const GLchar,
        length: *const GLint,
    ) {
        set_error_if!(self, count < 0, gles20::INVALID_VALUE);
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let mut group = lock_share_group(&group_ptr);
        let Some(global) = self.checked_shader(&group, shader) else {
            return;
        };
        let mut fragments = Vec::with_capacity(count as usize);
        for i in 0..count as usize {
            let s = string.add(i).read();
            let len = if length.is_null() { -1 } else { length.add(i).read() };
            fragments.push(if s.is_null() {
                &[][..]
            } else if len < 0 {
                c_str_bytes(s)
            } else {
                std::slice::from_raw_parts(s as *const u8, len as usize)
            });
        }
        let Some(data) = shader_data_mut(&mut group, shader as ObjectLocalName) else {
            return;
        };
        data.set_src(&fragments, &self.translate_options);
        let parsed = data.parsed_src().as_ptr() as *const GLchar;
        self.host.ShaderSource(global, 1, &parsed, std::ptr::null());
    }

    pub unsafe fn CompileShader(&mut self, shader: GLuint) {
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let mut group = lock_share_group(&group_ptr);
        let Some(global) = self.checked_shader(&group, shader) else {
            return;
        };
        self.host.CompileShader(global);
        let log = host_shader_info_log(&*self.host, global);
        if let Some(data) = shader_data_mut(&mut group, shader as ObjectLocalName) {
            data.set_info_log(log);
        }
    }

    pub unsafe fn ReleaseShaderCompiler(&mut self) {
        // Mesa crashes on this.
        if self.gl_lib_is_mesa {
            return;
        }
        if self.host.is_loaded("ReleaseShaderCompiler") {
            self.host.ReleaseShaderCompiler();
        }
    }

    pub unsafe fn ShaderBinary(
        &mut self,
        n: GLsizei,
        shaders: *const GLuint,
        binaryformat: GLenum,
        binary: *const c_void,
        length: GLsizei,
    ) {
        set_error_if!(
            self,
            !self.host.is_loaded("ShaderBinary"),
            gles20::INVALID_OPERATION
        );
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let group = lock_share_group(&group_ptr);
        for i in 0..n.max(0) as usize {
            let shader = shaders.add(i).read() as ObjectLocalName;
            let global = group.get_global_name(NamedObjectType::Shader, shader);
            set_error_if!(self, global == 0, gles20::INVALID_VALUE);
            self.host.ShaderBinary(1, &global, binaryformat, binary, length);
        }
    }

    pub unsafe fn DeleteShader(&mut self, shader: GLuint) {
        if shader == 0 {
            return;
        }
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let mut group = lock_share_group(&group_ptr);
        let Some(global) = self.checked_shader(&group, shader) else {
            return;
        };
        let local = shader as ObjectLocalName;
        let attached = shader_data_mut(&mut group, local).is_some_and(|data| {
            data.delete_status = true;
            data.attached_program != 0
        });
        // An attached shader's name stays valid until it is detached.
        if !attached {
            group.delete_name(NamedObjectType::Shader, local);
        }
        self.host.DeleteShader(global);
    }

    pub unsafe fn DeleteProgram(&mut self, program: GLuint) {
        if program == 0 {
            return;
        }
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let mut group = lock_share_group(&group_ptr);
        let Some(global) = self.checked_program(&group, program) else {
            return;
        };
        let local = program as ObjectLocalName;
        let Some(data) = program_data_mut(&mut group, local) else {
            return;
        };
        // Deletion of the current program waits until it stops being used.
        if data.in_use {
            data.delete_status = true;
            return;
        }
        let shaders = [data.attached_vertex_shader(), data.attached_fragment_shader()];
        for shader in shaders {
            release_shader(&mut group, shader);
        }
        group.delete_name(NamedObjectType::Shader, local);
        self.host.DeleteProgram(global);
    }

    pub unsafe fn AttachShader(&mut self, program: GLuint, shader: GLuint) {
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let mut group = lock_share_group(&group_ptr);
        let program_global =
            group.get_global_name(NamedObjectType::Shader, program as ObjectLocalName);
        let shader_global = group.get_global_name(NamedObjectType::Shader, shader as ObjectLocalName);
        set_error_if!(self, program_global == 0, gles20::INVALID_VALUE);
        set_error_if!(self, shader_global == 0, gles20::INVALID_VALUE);
        let Some(shader_type) =
            shader_data(&group, shader as ObjectLocalName).map(ShaderData::shader_type)
        else {
            self.set_gl_error(gles20::INVALID_OPERATION);
            return;
        };
        let attached = program_data_mut(&mut group, program as ObjectLocalName)
            .map(|data| data.attach_shader(shader as ObjectLocalName, shader_type));
        set_error_if!(self, attached != Some(true), gles20::INVALID_OPERATION);
        if let Some(data) = shader_data_mut(&mut group, shader as ObjectLocalName) {
            data.attached_program = program as ObjectLocalName;
        }
        self.host.AttachShader(program_global, shader_global);
    }

    pub unsafe fn DetachShader(&mut self, program: GLuint, shader: GLuint) {
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let mut group = lock_share_group(&group_ptr);
        let program_global =
            group.get_global_name(NamedObjectType::Shader, program as ObjectLocalName);
        let shader_global = group.get_global_name(NamedObjectType::Shader, shader as ObjectLocalName);
        set_error_if!(self, program_global == 0, gles20::INVALID_VALUE);
        set_error_if!(self, shader_global == 0, gles20::INVALID_VALUE);
        let detached = program_data_mut(&mut group, program as ObjectLocalName)
            .map(|data| data.detach_shader(shader as ObjectLocalName));
        set_error_if!(self, detached != Some(true), gles20::INVALID_OPERATION);
        release_shader(&mut group, shader as ObjectLocalName);
        self.host.DetachShader(program_global, shader_global);
    }

    pub unsafe fn BindAttribLocation(&mut self, program: GLuint, index: GLuint, name: *const GLchar) {
        set_error_if!(
            self,
            !validate::attrib_name(c_str_bytes(name)),
            gles20::INVALID_OPERATION
        );
        set_error_if!(
            self,
            !validate::attrib_index(index),
            gles20::INVALID_VALUE
        );
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let group = lock_share_group(&group_ptr);
        let Some(global) = self.checked_program(&group, program) else {
            return;
        };
        self.host.BindAttribLocation(global, index, name);
    }

    pub unsafe fn LinkProgram(&mut self, program: GLuint) {
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let mut group = lock_share_group(&group_ptr);
        let Some(global) = self.checked_program(&group, program) else {
            return;
        };
        let local = program as ObjectLocalName;
        let Some(data) = program_data(&group, local) else {
            return;
        };
        let shaders = [data.attached_vertex_shader(), data.attached_fragment_shader()];
        let compiled = shaders.iter().all(|&shader| {
            let shader_global = group.get_global_name(NamedObjectType::Shader, shader);
            let mut status = 0;
            if shader_global != 0 {
                self.host
                    .GetShaderiv(shader_global, gl21::COMPILE_STATUS, &mut status);
            }
            status != 0
        });
        // The host would link a program without a shader for each stage, GLES
        // doesn't.
        let mut linked = false;
        if compiled {
            self.host.LinkProgram(global);
            let mut status = 0;
            self.host.GetProgramiv(global, gl21::LINK_STATUS, &mut status);
            linked = status != 0;
        }
        let log = host_program_info_log(&*self.host, global);
        if let Some(data) = program_data_mut(&mut group, local) {
            data.set_link_status(linked);
            data.set_info_log(log);
        }
    }

    pub unsafe fn ValidateProgram(&mut self, program: GLuint) {
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let mut group = lock_share_group(&group_ptr);
        let Some(global) = self.checked_program(&group, program) else {
            return;
        };
        self.host.ValidateProgram(global);
        let log = host_program_info_log(&*self.host, global);
        if let Some(data) = program_data_mut(&mut group, program as ObjectLocalName) {
            data.set_info_log(log);
        }
    }

    pub unsafe fn UseProgram(&mut self, program: GLuint) {
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let pending_delete = {
            let mut group = lock_share_group(&group_ptr);
            let local = program as ObjectLocalName;
            let global = group.get_global_name(NamedObjectType::Shader, local);
            set_error_if!(self, local != 0 && global == 0, gles20::INVALID_VALUE);
            set_error_if!(
                self,
                group
                    .get_object_data(NamedObjectType::Shader, local)
                    .is_some_and(|data| data.program().is_none()),
                gles20::INVALID_OPERATION
            );

            let mut current_global = 0;
            self.host
                .GetIntegerv(gl21::CURRENT_PROGRAM, &mut current_global);
            let current = group.get_local_name(NamedObjectType::Shader, current_global as GLuint);
            let mut pending_delete = None;
            if let Some(data) = program_data_mut(&mut group, current) {
                data.in_use = false;
                if data.delete_status {
                    pending_delete = Some(current);
                }
            }
            if let Some(data) = program_data_mut(&mut group, local) {
                data.in_use = true;
            }
            self.host.UseProgram(global);
            pending_delete
        };
        if let Some(previous) = pending_delete {
            self.DeleteProgram(previous as GLuint);
        }
    }

    pub unsafe fn IsProgram(&mut self, program: GLuint) -> GLboolean {
        let local = program as ObjectLocalName;
        let global = with_share_group(self, |group| {
            program_data(group, local)
                .is_some()
                .then(|| group.get_global_name(NamedObjectType::Shader, local))
        })
        .flatten();
        match global {
            Some(global) if program != 0 => self.host.IsProgram(global),
            _ => 0,
        }
    }

    pub unsafe fn IsShader(&mut self, shader: GLuint) -> GLboolean {
        let local = shader as ObjectLocalName;
        let global = with_share_group(self, |group| {
            shader_data(group, local)
                .is_some()
                .then(|| group.get_global_name(NamedObjectType::Shader, local))
        })
        .flatten();
        match global {
            Some(global) if shader != 0 => self.host.IsShader(global),
            _ => 0,
        }
    }

    pub unsafe fn GetShaderiv(&mut self, shader: GLuint, pname: GLenum, params: *mut GLint) {
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let group = lock_share_group(&group_ptr);
        let local = shader as ObjectLocalName;
        let global = group.get_global_name(NamedObjectType::Shader, local);
        set_error_if!(self, global == 0, gles20::INVALID_VALUE);
        let data = shader_data(&group, local);
        match pname {
            gles20::DELETE_STATUS => {
                let Some(data) = data else {
                    self.set_gl_error(gles20::INVALID_VALUE);
                    return;
                };
                params.write(data.delete_status as GLint);
            }
            gles20::INFO_LOG_LENGTH | gles20::SHADER_SOURCE_LENGTH => {
                let Some(data) = data else {
                    self.set_gl_error(gles20::INVALID_OPERATION);
                    return;
                };
                let text = if pname == gles20::INFO_LOG_LENGTH {
                    data.info_log()
                } else {
                    data.original_src()
                };
                params.write(info_log_length(text));
            }
            _ => self.host.GetShaderiv(global, pname, params),
        }
    }

    pub unsafe fn GetShaderInfoLog(
        &mut self,
        shader: GLuint,
        buf_size: GLsizei,
        length: *mut GLsizei,
        info_log: *mut GLchar,
    ) {
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let group = lock_share_group(&group_ptr);
        if self.checked_shader(&group, shader).is_none() {
            return;
        }
        if let Some(data) = shader_data(&group, shader as ObjectLocalName) {
            copy_to_guest(data.info_log(), buf_size, length, info_log);
        }
    }

    pub unsafe fn GetShaderSource(
        &mut self,
        shader: GLuint,
        buf_size: GLsizei,
        length: *mut GLsizei,
        source: *mut GLchar,
    ) {
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let group = lock_share_group(&group_ptr);
        if self.checked_shader(&group, shader).is_none() {
            return;
        }
        if let Some(data) = shader_data(&group, shader as ObjectLocalName) {
            copy_to_guest(data.original_src(), buf_size, length, source);
        }
    }

    pub unsafe fn GetShaderPrecisionFormat(
        &mut self,
        shadertype: GLenum,
        precisiontype: GLenum,
        range: *mut GLint,
        precision: *mut GLint,
    ) {
        set_error_if!(
            self,
            !(validate::shader_type(shadertype) && validate::precision_type(precisiontype)),
            gles20::INVALID_ENUM
        );
        match precisiontype {
            gles20::LOW_INT | gles20::MEDIUM_INT | gles20::HIGH_INT => {
                range.write(16);
                range.add(1).write(16);
                precision.write(0);
            }
            _ if self.host.is_loaded("GetShaderPrecisionFormat") => {
                self.host
                    .GetShaderPrecisionFormat(shadertype, precisiontype, range, precision);
            }
            // IEEE single precision.
            _ => {
                range.write(127);
                range.add(1).write(127);
                precision.write(24);
            }
        }
    }

    pub unsafe fn GetProgramiv(&mut self, program: GLuint, pname: GLenum, params: *mut GLint) {
        set_error_if!(
            self,
            !validate::program_param(pname),
            gles20::INVALID_ENUM
        );
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let group = lock_share_group(&group_ptr);
        let local = program as ObjectLocalName;
        let global = group.get_global_name(NamedObjectType::Shader, local);
        set_error_if!(self, global == 0, gles20::INVALID_VALUE);
        let local_query = matches!(
            pname,
            gles20::DELETE_STATUS
                | gles20::LINK_STATUS
                | gles20::VALIDATE_STATUS
                | gles20::INFO_LOG_LENGTH
        );
        if !local_query {
            self.host.GetProgramiv(global, pname, params);
            return;
        }
        let Some(data) = program_data(&group, local) else {
            self.set_gl_error(gles20::INVALID_OPERATION);
            return;
        };
        match pname {
            gles20::DELETE_STATUS => params.write(data.delete_status as GLint),
            gles20::LINK_STATUS => params.write(data.link_status() as GLint),
            gles20::INFO_LOG_LENGTH => params.write(info_log_length(data.info_log())),
            // An unlinked program can't be valid, whatever the host thinks.
            _ if data.link_status() => self.host.GetProgramiv(global, pname, params),
            _ => params.write(0),
        }
    }

    pub unsafe fn GetProgramInfoLog(
        &mut self,
        program: GLuint,
        buf_size: GLsizei,
        length: *mut GLsizei,
        info_log: *mut GLchar,
    ) {
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let group = lock_share_group(&group_ptr);
        if self.checked_program(&group, program).is_none() {
            return;
        }
        if let Some(data) = program_data(&group, program as ObjectLocalName) {
            copy_to_guest(data.info_log(), buf_size, length, info_log);
        }
    }

    pub unsafe fn GetAttachedShaders(
        &mut self,
        program: GLuint,
        maxcount: GLsizei,
        count: *mut GLsizei,
        shaders: *mut GLuint,
    ) {
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let group = lock_share_group(&group_ptr);
        let Some(global) = self.checked_program(&group, program) else {
            return;
        };
        let mut n = 0;
        self.host.GetAttachedShaders(global, maxcount, &mut n, shaders);
        for i in 0..n.min(maxcount).max(0) as usize {
            let shader_global = shaders.add(i).read();
            let local = group.get_local_name(NamedObjectType::Shader, shader_global);
            shaders.add(i).write(local as GLuint);
        }
        if !count.is_null() {
            count.write(n);
        }
    }

    pub unsafe fn GetActiveAttrib(
        &mut self,
        program: GLuint,
        index: GLuint,
        buf_size: GLsizei,
        length: *mut GLsizei,
        size: *mut GLint,
        type_: *mut GLenum,
        name: *mut GLchar,
    ) {
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let group = lock_share_group(&group_ptr);
        let Some(global) = self.checked_program(&group, program) else {
            return;
        };
        self.host
            .GetActiveAttrib(global, index, buf_size, length, size, type_, name);
    }

    pub unsafe fn GetActiveUniform(
        &mut self,
        program: GLuint,
        index: GLuint,
        buf_size: GLsizei,
        length: *mut GLsizei,
        size: *mut GLint,
        type_: *mut GLenum,
        name: *mut GLchar,
    ) {
        let Some(group_ptr) = self.share_group.clone() else {
            return;
        };
        let group = lock_share_group(&group_ptr);
        let Some(global) = self.checked_program(&group, program) else {
            return;
        };
        self.host
            .GetActiveUniform(global, index, buf_size, length, size, type_, name);
    }

    /// Host name of a linked program, for the location queries.
    fn linked_program(&mut self, program: GLuint) -> Option<GLuint> {
        let group_ptr = self.share_group.clone()?;
        let group = lock_share_group(&group_ptr);
        let global = self.checked_program(&group, program)?;
        if !program_data(&group, program as ObjectLocalName).is_some_and(ProgramData::link_status) {
            self.set_gl_error(gles20::INVALID_OPERATION);
            return None;
        }
        Some(global)
    }

    pub unsafe fn GetAttribLocation(&mut self, program: GLuint, name: *const GLchar) -> GLint {
        match self.linked_program(program) {
            Some(global) => self.host.GetAttribLocation(global, name),
            None => -1,
        }
    }

    pub unsafe fn GetUniformLocation(&mut self, program: GLuint, name: *const GLchar) -> GLint {
        match self.linked_program(program) {
            Some(global) => self.host.GetUniformLocation(global, name),
            None => -1,
        }
    }

    pub unsafe fn GetUniformfv(&mut self, program: GLuint, location: GLint, params: *mut GLfloat) {
        set_error_if!(self, location < 0, gles20::INVALID_OPERATION);
        if let Some(global) = self.linked_program(program) {
            self.host.GetUniformfv(global, location, params);
        }
    }

    pub unsafe fn GetUniformiv(&mut self, program: GLuint, location: GLint, params: *mut GLint) {
        set_error_if!(self, location < 0, gles20::INVALID_OPERATION);
        if let Some(global) = self.linked_program(program) {
            self.host.GetUniformiv(global, location, params);
        }
    }

    pub unsafe fn UniformMatrix2fv(
        &mut self,
        location: GLint,
        count: GLsizei,
        transpose: GLboolean,
        value: *const GLfloat,
    ) {
        set_error_if!(self, transpose != 0, gles20::INVALID_VALUE);
        self.host.UniformMatrix2fv(location, count, transpose, value);
    }

    pub unsafe fn UniformMatrix3fv(
        &mut self,
        location: GLint,
        count: GLsizei,
        transpose: GLboolean,
        value: *const GLfloat,
    ) {
        set_error_if!(self, transpose != 0, gles20::INVALID_VALUE);
        self.host.UniformMatrix3fv(location, count, transpose, value);
    }

    pub unsafe fn UniformMatrix4fv(
        &mut self,
        location: GLint,
        count: GLsizei,
        transpose: GLboolean,
        value: *const GLfloat,
    ) {
        set_error_if!(self, transpose != 0, gles20::INVALID_VALUE);
        self.host.UniformMatrix4fv(location, count, transpose, value);
    }

    // Vertex attributes and drawing

    pub unsafe fn EnableVertexAttribArray(&mut self, index: GLuint) {
        set_error_if!(
            self,
            !validate::array_index(caps(), index),
            gles20::INVALID_VALUE
        );
        self.enable_array(index, true);
        self.host.EnableVertexAttribArray(index);
    }

    pub unsafe fn DisableVertexAttribArray(&mut self, index: GLuint) {
        set_error_if!(
            self,
            !validate::array_index(caps(), index),
            gles20::INVALID_VALUE
        );
        self.enable_array(index, false);
        self.host.DisableVertexAttribArray(index);
    }

    pub unsafe fn VertexAttribPointer(
        &mut self,
        index: GLuint,
        size: GLint,
        type_: GLenum,
        normalized: GLboolean,
        stride: GLsizei,
        ptr: *const c_void,
    ) {
        set_error_if!(
            self,
            !validate::array_index(caps(), index),
            gles20::INVALID_VALUE
        );
        set_error_if!(
            self,
            !(1..=4).contains(&size) || stride < 0,
            gles20::INVALID_VALUE
        );
        self.set_pointer(index, size, host_type(type_), stride, ptr, normalized != 0);
    }

    /// The current value of attribute 0 is also kept locally, since it has to
    /// be emulated (see [GLESv2Context::validate_att0_pre_draw]).
    fn set_attribute0(&mut self, index: GLuint, values: &[GLfloat]) {
        if index == 0 {
            let mut value = [0.0, 0.0, 0.0, 1.0];
            value[..values.len()].copy_from_slice(values);
            self.attribute0_value = value;
        }
    }

    pub unsafe fn VertexAttrib1f(&mut self, index: GLuint, x: GLfloat) {
        self.host.VertexAttrib1f(index, x);
        self.set_attribute0(index, &[x]);
    }

    pub unsafe fn VertexAttrib1fv(&mut self, index: GLuint, values: *const GLfloat) {
        self.host.VertexAttrib1fv(index, values);
        self.set_attribute0(index, std::slice::from_raw_parts(values, 1));
    }

    pub unsafe fn VertexAttrib2f(&mut self, index: GLuint, x: GLfloat, y: GLfloat) {
        self.host.VertexAttrib2f(index, x, y);
        self.set_attribute0(index, &[x, y]);
    }

    pub unsafe fn VertexAttrib2fv(&mut self, index: GLuint, values: *const GLfloat) {
        self.host.VertexAttrib2fv(index, values);
        self.set_attribute0(index, std::slice::from_raw_parts(values, 2));
    }

    pub unsafe fn VertexAttrib3f(&mut self, index: GLuint, x: GLfloat, y: GLfloat, z: GLfloat) {
        self.host.VertexAttrib3f(index, x, y, z);
        self.set_attribute0(index, &[x, y, z]);
    }

    pub unsafe fn VertexAttrib3fv(&mut self, index: GLuint, values: *const GLfloat) {
        self.host.VertexAttrib3fv(index, values);
        self.set_attribute0(index, std::slice::from_raw_parts(values, 3));
    }

    pub unsafe fn VertexAttrib4f(
        &mut self,
        index: GLuint,
        x: GLfloat,
        y: GLfloat,
        z: GLfloat,
        w: GLfloat,
    ) {
        self.host.VertexAttrib4f(index, x, y, z, w);
        self.set_attribute0(index, &[x, y, z, w]);
    }

    pub unsafe fn VertexAttrib4fv(&mut self, index: GLuint, values: *const GLfloat) {
        self.host.VertexAttrib4fv(index, values);
        self.set_attribute0(index, std::slice::from_raw_parts(values, 4));
    }

    /// The array state queries that are answered locally.
    fn vertex_attrib_array_param(&self, index: GLuint, pname: GLenum) -> Option<GLint> {
        let p = self.pointers.get(index as usize)?;
        Some(match pname {
            gles20::VERTEX_ATTRIB_ARRAY_BUFFER_BINDING => {
                if p.is_vbo() {
                    p.buffer as GLint
                } else {
                    0
                }
            }
            gles20::VERTEX_ATTRIB_ARRAY_ENABLED => p.enabled as GLint,
            gles20::VERTEX_ATTRIB_ARRAY_SIZE => p.size,
            gles20::VERTEX_ATTRIB_ARRAY_STRIDE => p.stride,
            gles20::VERTEX_ATTRIB_ARRAY_TYPE => p.type_ as GLint,
            gles20::VERTEX_ATTRIB_ARRAY_NORMALIZED => p.normalized as GLint,
            _ => return None,
        })
    }

    pub unsafe fn GetVertexAttribfv(&mut self, index: GLuint, pname: GLenum, params: *mut GLfloat) {
        set_error_if!(
            self,
            !validate::array_index(caps(), index),
            gles20::INVALID_VALUE
        );
        if pname == gles20::CURRENT_VERTEX_ATTRIB {
            if index == 0 {
                std::ptr::copy_nonoverlapping(self.attribute0_value.as_ptr(), params, 4);
            } else {
                self.host.GetVertexAttribfv(index, pname, params);
            }
            return;
        }
        match self.vertex_attrib_array_param(index, pname) {
            Some(value) => params.write(value as GLfloat),
            None => self.set_gl_error(gles20::INVALID_ENUM),
        }
    }

    pub unsafe fn GetVertexAttribiv(&mut self, index: GLuint, pname: GLenum, params: *mut GLint) {
        set_error_if!(
            self,
            !validate::array_index(caps(), index),
            gles20::INVALID_VALUE
        );
        if pname == gles20::CURRENT_VERTEX_ATTRIB {
            if index == 0 {
                for (i, &value) in self.attribute0_value.iter().enumerate() {
                    params.add(i).write(value as GLint);
                }
            } else {
                self.host.GetVertexAttribiv(index, pname, params);
            }
            return;
        }
        match self.vertex_attrib_array_param(index, pname) {
            Some(value) => params.write(value),
            None => self.set_gl_error(gles20::INVALID_ENUM),
        }
    }

    pub unsafe fn GetVertexAttribPointerv(
        &mut self,
        index: GLuint,
        pname: GLenum,
        pointer: *mut *mut c_void,
    ) {
        set_error_if!(
            self,
            pname != gles20::VERTEX_ATTRIB_ARRAY_POINTER,
            gles20::INVALID_ENUM
        );
        set_error_if!(
            self,
            !validate::array_index(caps(), index),
            gles20::INVALID_VALUE
        );
        let Some(p) = self.pointers.get(index as usize) else {
            return;
        };
        let value = if p.is_vbo() {
            p.buffer_offset as *mut c_void
        } else {
            p.data as *mut c_void
        };
        pointer.write(value);
    }

    pub unsafe fn DrawArrays(&mut self, mode: GLenum, first: GLint, count: GLsizei) {
        set_error_if!(self, count < 0 || first < 0, gles20::INVALID_VALUE);
        set_error_if!(self, !validate::draw_mode(mode), gles20::INVALID_ENUM);
        // The last vertex must still have a GLint index.
        let Some(end) = first.checked_add(count) else {
            self.set_gl_error(gles20::INVALID_VALUE);
            return;
        };
        let group_ptr = self.share_group.clone();
        let mut group = group_ptr.as_ref().map(lock_share_group);
        if let Some(group) = group.as_deref_mut() {
            self.draw_validate(group);
        }
        let mut arena = ConversionArena::default();
        self.setup_arrays_pointers(
            group.as_deref_mut(),
            &mut arena,
            first as usize,
            count as usize,
            None,
        );
        self.validate_att0_pre_draw(end as usize);
        self.begin_points(mode);
        self.host.DrawArrays(mode, first, count);
        self.end_points(mode);
        self.validate_att0_post_draw();
    }

    pub unsafe fn DrawElements(
        &mut self,
        mode: GLenum,
        count: GLsizei,
        type_: GLenum,
        indices: *const c_void,
    ) {
        set_error_if!(self, count < 0, gles20::INVALID_VALUE);
        set_error_if!(
            self,
            !(validate::draw_mode(mode) && validate::draw_type(type_)),
            gles20::INVALID_ENUM
        );
        let byte_len = count as usize * Indices::size_of(type_).unwrap_or(1);
        let group_ptr = self.share_group.clone();
        let mut group = group_ptr.as_ref().map(lock_share_group);
        if let Some(group) = group.as_deref_mut() {
            self.draw_validate(group);
        }

        // Indices are copied out of guest memory or the element buffer, since
        // the host never sees buffer objects.
        let index_bytes: Vec<u8> = if self.element_array_buffer != 0 {
            let offset = indices as usize;
            let bytes = group
                .as_deref()
                .and_then(|group| {
                    group.get_object_data(NamedObjectType::VertexBuffer, self.element_array_buffer)
                })
                .and_then(ObjectData::buffer)
                .and_then(|buffer| buffer.data().get(offset..offset.checked_add(byte_len)?));
            match bytes {
                Some(bytes) => bytes.to_vec(),
                None => {
                    self.set_gl_error(gles20::INVALID_OPERATION);
                    return;
                }
            }
        } else if indices.is_null() {
            return;
        } else {
            std::slice::from_raw_parts(indices as *const u8, byte_len).to_vec()
        };
        let Some(index_list) = Indices::new(type_, &index_bytes) else {
            return;
        };

        let mut arena = ConversionArena::default();
        self.setup_arrays_pointers(group.as_deref_mut(), &mut arena, 0, count as usize, Some(&index_list));
        let elements = if index_list.is_empty() {
            0
        } else {
            index_list.max_index() as usize + 1
        };
        self.validate_att0_pre_draw(elements);
        self.begin_points(mode);
        self.host
            .DrawElements(mode, count, type_, index_bytes.as_ptr() as *const c_void);
        self.end_points(mode);
        self.validate_att0_post_draw();
    }

    pub unsafe fn Clear(&mut self, mask: GLbitfield) {
        let all = gles20::COLOR_BUFFER_BIT | gles20::DEPTH_BUFFER_BIT | gles20::STENCIL_BUFFER_BIT;
        set_error_if!(self, mask & !all != 0, gles20::INVALID_VALUE);
        self.prepare_framebuffer();
        self.host.Clear(mask);
    }

    pub unsafe fn ReadPixels(
        &mut self,
        x: GLint,
        y: GLint,
        width: GLsizei,
        height: GLsizei,
        format: GLenum,
        type_: GLenum,
        pixels: *mut c_void,
    ) {
        set_error_if!(
            self,
            !(validate::read_pixel_format(format) && validate::pixel_type(caps(), type_)),
            gles20::INVALID_ENUM
        );
        set_error_if!(self, width < 0 || height < 0, gles20::INVALID_VALUE);
        set_error_if!(
            self,
            !validate::pixel_op(format, type_),
            gles20::INVALID_OPERATION
        );
        set_error_if!(
            self,
            self.CheckFramebufferStatus(gles20::FRAMEBUFFER) != gles20::FRAMEBUFFER_COMPLETE,
            gles20::INVALID_FRAMEBUFFER_OPERATION
        );
        self.host
            .ReadPixels(x, y, width, height, format, type_, pixels);
    }

    // Fixed-function state

    pub unsafe fn BlendEquation(&mut self, mode: GLenum) {
        set_error_if!(
            self,
            !validate::blend_equation_mode(mode),
            gles20::INVALID_ENUM
        );
        self.host.BlendEquation(mode);
    }

    pub unsafe fn BlendEquationSeparate(&mut self, mode_rgb: GLenum, mode_alpha: GLenum) {
        set_error_if!(
            self,
            !(validate::blend_equation_mode(mode_rgb) && validate::blend_equation_mode(mode_alpha)),
            gles20::INVALID_ENUM
        );
        self.host.BlendEquationSeparate(mode_rgb, mode_alpha);
    }

    pub unsafe fn BlendFunc(&mut self, sfactor: GLenum, dfactor: GLenum) {
        set_error_if!(
            self,
            !(validate::blend_src(sfactor) && validate::blend_dst(dfactor)),
            gles20::INVALID_ENUM
        );
        self.host.BlendFunc(sfactor, dfactor);
    }

    pub unsafe fn BlendFuncSeparate(
        &mut self,
        src_rgb: GLenum,
        dst_rgb: GLenum,
        src_alpha: GLenum,
        dst_alpha: GLenum,
    ) {
        set_error_if!(
            self,
            !(validate::blend_src(src_rgb)
                && validate::blend_dst(dst_rgb)
                && validate::blend_src(src_alpha)
                && validate::blend_dst(dst_alpha)),
            gles20::INVALID_ENUM
        );
        self.host
            .BlendFuncSeparate(src_rgb, dst_rgb, src_alpha, dst_alpha);
    }

    pub unsafe fn ClearDepthf(&mut self, depth: GLclampf) {
        self.host.ClearDepth(depth as f64);
    }

    pub unsafe fn DepthRangef(&mut self, near: GLclampf, far: GLclampf) {
        self.host.DepthRange(near as f64, far as f64);
    }

    pub unsafe fn Hint(&mut self, target: GLenum, mode: GLenum) {
        set_error_if!(self, !validate::hint(target, mode), gles20::INVALID_ENUM);
        self.host.Hint(target, mode);
    }

    pub unsafe fn IsEnabled(&mut self, cap: GLenum) -> GLboolean {
        set_error_if!(self, !validate::capability(cap), gles20::INVALID_ENUM, 0);
        self.host.IsEnabled(cap)
    }

    pub unsafe fn StencilFuncSeparate(
        &mut self,
        face: GLenum,
        func: GLenum,
        reference: GLint,
        mask: GLuint,
    ) {
        set_error_if!(self, !validate::stencil_face(face), gles20::INVALID_ENUM);
        self.host.StencilFuncSeparate(face, func, reference, mask);
    }

    pub unsafe fn StencilMaskSeparate(&mut self, face: GLenum, mask: GLuint) {
        set_error_if!(self, !validate::stencil_face(face), gles20::INVALID_ENUM);
        self.host.StencilMaskSeparate(face, mask);
    }

    pub unsafe fn StencilOpSeparate(
        &mut self,
        face: GLenum,
        sfail: GLenum,
        dpfail: GLenum,
        dppass: GLenum,
    ) {
        set_error_if!(self, !validate::stencil_face(face), gles20::INVALID_ENUM);
        self.host.StencilOpSeparate(face, sfail, dpfail, dppass);
    }

    // State queries

    pub unsafe fn GetError(&mut self) -> GLenum {
        let error = self.take_gl_error();
        if error != gles20::NO_ERROR {
            return error;
        }
        self.host.GetError()
    }

    pub unsafe fn GetString(&mut self, name: GLenum) -> *const GLubyte {
        match strings().and_then(|strings| strings.get(name)) {
            Some(string) => string.as_ptr() as *const GLubyte,
            None => {
                self.set_gl_error(gles20::INVALID_ENUM);
                std::ptr::null()
            }
        }
    }

    /// Binding queries where the host's answer is a host name.
    fn binding_local_name(&self, pname: GLenum) -> Option<(NamedObjectType, GLenum)> {
        match pname {
            gles20::CURRENT_PROGRAM => Some((NamedObjectType::Shader, gl21::CURRENT_PROGRAM)),
            gles20::FRAMEBUFFER_BINDING => {
                Some((NamedObjectType::Framebuffer, gl21::FRAMEBUFFER_BINDING_EXT))
            }
            gles20::RENDERBUFFER_BINDING => {
                Some((NamedObjectType::Renderbuffer, gl21::RENDERBUFFER_BINDING_EXT))
            }
            _ => None,
        }
    }

    pub unsafe fn GetIntegerv(&mut self, pname: GLenum, params: *mut GLint) {
        if let Some(value) = self.local_integer(pname) {
            params.write(value);
            return;
        }
        if let Some((ty, host_pname)) = self.binding_local_name(pname) {
            let mut global = 0;
            self.host.GetIntegerv(host_pname, &mut global);
            if let Some(local) =
                with_share_group(self, |group| group.get_local_name(ty, global as GLuint))
            {
                params.write(local as GLint);
            }
            return;
        }
        match pname {
            gles20::NUM_COMPRESSED_TEXTURE_FORMATS => {
                params.write(COMPRESSED_TEXTURE_FORMATS.len() as GLint)
            }
            gles20::COMPRESSED_TEXTURE_FORMATS => {
                for (i, &format) in COMPRESSED_TEXTURE_FORMATS.iter().enumerate() {
                    params.add(i).write(format as GLint);
                }
            }
            _ if is_es2_param(pname) && !caps().es2_compatibility => {
                // No binary formats, so nothing to write for the list.
                if let Some(value) = es2_emulated_param(pname) {
                    params.write(value);
                }
            }
            gles20::MAX_COMBINED_TEXTURE_IMAGE_UNITS => {
                params.write(caps().max_combined_texture_image_units)
            }
            _ => self.host.GetIntegerv(pname, params),
        }
    }

    pub unsafe fn GetFloatv(&mut self, pname: GLenum, params: *mut GLfloat) {
        if let Some(value) = self.local_integer(pname) {
            params.write(value as GLfloat);
            return;
        }
        match pname {
            gles20::COMPRESSED_TEXTURE_FORMATS => {
                for (i, &format) in COMPRESSED_TEXTURE_FORMATS.iter().enumerate() {
                    params.add(i).write(format as GLfloat);
                }
            }
            // Masks are unsigned and would overflow a signed conversion.
            gles20::STENCIL_WRITEMASK
            | gles20::STENCIL_BACK_WRITEMASK
            | gles20::STENCIL_VALUE_MASK
            | gles20::STENCIL_BACK_VALUE_MASK => {
                let mut value = 0;
                self.GetIntegerv(pname, &mut value);
                params.write(value as GLuint as GLfloat);
            }
            _ if is_es2_param(pname) && caps().es2_compatibility => {
                self.host.GetFloatv(pname, params)
            }
            gles20::CURRENT_PROGRAM
            | gles20::FRAMEBUFFER_BINDING
            | gles20::RENDERBUFFER_BINDING
            | gles20::NUM_COMPRESSED_TEXTURE_FORMATS
            | gles20::MAX_COMBINED_TEXTURE_IMAGE_UNITS
            | gles20::SHADER_COMPILER
            | gles20::NUM_SHADER_BINARY_FORMATS
            | gles20::MAX_VERTEX_UNIFORM_VECTORS
            | gles20::MAX_VARYING_VECTORS
            | gles20::MAX_FRAGMENT_UNIFORM_VECTORS => {
                let mut value = 0;
                self.GetIntegerv(pname, &mut value);
                params.write(value as GLfloat);
            }
            gles20::SHADER_BINARY_FORMATS => (),
            _ => self.host.GetFloatv(pname, params),
        }
    }

    pub unsafe fn GetBooleanv(&mut self, pname: GLenum, params: *mut GLboolean) {
        if let Some(value) = self.local_integer(pname) {
            params.write((value != 0) as GLboolean);
            return;
        }
        match pname {
            _ if is_es2_param(pname) && caps().es2_compatibility => {
                self.host.GetBooleanv(pname, params)
            }
            gles20::CURRENT_PROGRAM
            | gles20::FRAMEBUFFER_BINDING
            | gles20::RENDERBUFFER_BINDING
            | gles20::NUM_COMPRESSED_TEXTURE_FORMATS
            | gles20::MAX_COMBINED_TEXTURE_IMAGE_UNITS
            | gles20::SHADER_COMPILER
            | gles20::NUM_SHADER_BINARY_FORMATS
            | gles20::MAX_VERTEX_UNIFORM_VECTORS
            | gles20::MAX_VARYING_VECTORS
            | gles20::MAX_FRAGMENT_UNIFORM_VECTORS => {
                let mut value = 0;
                self.GetIntegerv(pname, &mut value);
                params.write((value != 0) as GLboolean);
            }
            gles20::SHADER_BINARY_FORMATS => (),
            _ => self.host.GetBooleanv(pname, params),
        }
    }

    // EGLImage targets (GL_OES_EGL_image)

    pub unsafe fn EGLImageTargetTexture2DOES(&mut self, target: GLenum, image: EglImageHandle) {
        set_error_if!(self, target != gles20::TEXTURE_2D, gles20::INVALID_ENUM);
        let Some(egl) = self.egl.clone() else {
            return;
        };
        let Some(img) = egl.attach_egl_image(image) else {
            log!("Ignoring glEGLImageTargetTexture2DOES() with unknown image {}", image);
            return;
        };
        let Some(group_ptr) = self.share_group.clone() else {
            egl.detach_egl_image(image);
            return;
        };
        let mut group = lock_share_group(&group_ptr);
        let tex = self.bound_texture_local_name(target);
        let old_global = group.get_global_name(NamedObjectType::Texture, tex);
        let was_egl_image = group
            .get_object_data(NamedObjectType::Texture, tex)
            .and_then(ObjectData::texture)
            .is_some_and(|data| data.source_egl_image != 0);
        // The texture's own storage is replaced by the image's.
        if old_global != 0 && !was_egl_image {
            self.host.DeleteTextures(1, &old_global);
        }
        group.replace_global_name(NamedObjectType::Texture, tex, img.global_tex_name);
        self.host.BindTexture(gl21::TEXTURE_2D, img.global_tex_name);

        let Some(data) = texture_data(&mut group, tex) else {
            return;
        };
        if was_egl_image {
            // Keep the name the texture had before its first image.
            data.detach_egl_image();
        } else {
            data.old_global = old_global;
        }
        let detach: EglImageDetach = Arc::new(move |image| egl.detach_egl_image(image));
        data.width = img.width;
        data.height = img.height;
        data.border = img.border;
        data.internal_format = img.internal_format;
        data.source_egl_image = image;
        data.egl_image_detach = Some(detach);
    }

    pub unsafe fn EGLImageTargetRenderbufferStorageOES(
        &mut self,
        target: GLenum,
        image: EglImageHandle,
    ) {
        set_error_if!(self, target != gles20::RENDERBUFFER, gles20::INVALID_ENUM);
        let Some(group_ptr) = self.share_group.clone() else {
            self.set_gl_error(gles20::INVALID_OPERATION);
            return;
        };
        let rb = self.renderbuffer;
        set_error_if!(self, rb == 0, gles20::INVALID_OPERATION);
        let mut group = lock_share_group(&group_ptr);
        set_error_if!(
            self,
            group
                .get_object_data(NamedObjectType::Renderbuffer, rb)
                .and_then(ObjectData::renderbuffer)
                .is_none(),
            gles20::INVALID_OPERATION
        );
        let Some(egl) = self.egl.clone() else {
            self.set_gl_error(gles20::INVALID_VALUE);
            return;
        };
        let Some(img) = egl.attach_egl_image(image) else {
            self.set_gl_error(gles20::INVALID_VALUE);
            return;
        };

        let Some(data) = group
            .get_object_data_mut(NamedObjectType::Renderbuffer, rb)
            .and_then(ObjectData::renderbuffer_mut)
        else {
            return;
        };
        data.detach_egl_image();
        let detach: EglImageDetach = Arc::new(move |image| egl.detach_egl_image(image));
        data.source_egl_image = image;
        data.egl_image_detach = Some(detach);
        data.egl_image_global_tex_name = img.global_tex_name;
        let attached_fb = data.attached_fb;
        let attached_point = data.attached_point;

        // Already attached somewhere: the framebuffer must now use the image's
        // texture instead of the renderbuffer.
        let (Some(point), true) = (attached_point, attached_fb != 0) else {
            return;
        };
        let current = self.framebuffer;
        if attached_fb != current {
            let fb_global = group.get_global_name(NamedObjectType::Framebuffer, attached_fb);
            self.host.BindFramebufferEXT(gl21::FRAMEBUFFER_EXT, fb_global);
        }
        self.host.FramebufferTexture2DEXT(
            gl21::FRAMEBUFFER_EXT,
            point.to_gl(),
            gl21::TEXTURE_2D,
            img.global_tex_name,
            0,
        );
        if attached_fb != current {
            let current_global = group.get_global_name(NamedObjectType::Framebuffer, current);
            self.host
                .BindFramebufferEXT(gl21::FRAMEBUFFER_EXT, current_global);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gles::headless::HeadlessGL;
    use crate::gles::object_names::ObjectNameManager;
    use crate::gles::objects::EglImage;
    use crate::gles::translator::EGLiface;
    use crate::options::Options;
    use std::sync::Mutex;

    struct ImageEGL {
        gl: Arc<HeadlessGL>,
        detached: Mutex<Vec<EglImageHandle>>,
    }

    impl EGLiface for ImageEGL {
        fn get_gl_library(&self) -> Result<Arc<dyn GLDispatch>, String> {
            Ok(self.gl.clone())
        }
        /// Images 1 to 99 exist, each with its own texture.
        fn attach_egl_image(&self, image: EglImageHandle) -> Option<EglImage> {
            (1..100).contains(&image).then(|| EglImage {
                image_id: image,
                global_tex_name: 1000 + image,
                width: 64,
                height: 32,
                internal_format: gles20::RGBA as GLint,
                border: 0,
            })
        }
        fn detach_egl_image(&self, image: EglImageHandle) {
            self.detached.lock().unwrap().push(image);
        }
    }

    fn context() -> (Arc<HeadlessGL>, Arc<ImageEGL>, GLESv2Context) {
        let gl = Arc::new(HeadlessGL::new());
        let egl = Arc::new(ImageEGL {
            gl: gl.clone(),
            detached: Mutex::new(Vec::new()),
        });
        let egl_iface: Arc<dyn EGLiface> = egl.clone();
        let mut ctx = GLESv2Context::new(gl.clone(), Some(egl_iface), &Options::default());
        let names = ObjectNameManager::new(gl.clone());
        ctx.init(Some(names.create_share_group(1)));
        unsafe {
            ctx.BindTexture(gles20::TEXTURE_2D, 0);
            ctx.BindTexture(gles20::TEXTURE_CUBE_MAP, 0);
        }
        gl.clear_calls();
        (gl, egl, ctx)
    }

    fn fixed_bytes(values: &[GLfixed]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    unsafe fn shader_with_source(ctx: &mut GLESv2Context, type_: GLenum, source: &str) -> GLuint {
        let shader = ctx.CreateShader(type_);
        let ptr = source.as_ptr() as *const GLchar;
        let len = source.len() as GLint;
        ctx.ShaderSource(shader, 1, &ptr, &len);
        ctx.CompileShader(shader);
        shader
    }

    unsafe fn program_with(ctx: &mut GLESv2Context, fragment_source: &str) -> GLuint {
        let vs = shader_with_source(ctx, gles20::VERTEX_SHADER, "void main() {}");
        let fs = shader_with_source(ctx, gles20::FRAGMENT_SHADER, fragment_source);
        let program = ctx.CreateProgram();
        ctx.AttachShader(program, vs);
        ctx.AttachShader(program, fs);
        program
    }

    #[test]
    fn lazy_bind_creates_name_once() {
        let (gl, _egl, mut ctx) = context();
        unsafe {
            assert_eq!(ctx.IsTexture(5), 0);
            ctx.BindTexture(gles20::TEXTURE_2D, 5);
            ctx.BindTexture(gles20::TEXTURE_2D, 5);
            assert_eq!(gl.calls_named("GenTextures").len(), 1);
            assert_eq!(ctx.IsTexture(5), 1);
            let mut bound = 0;
            ctx.GetIntegerv(gles20::TEXTURE_BINDING_2D, &mut bound);
            assert_eq!(bound, 5);
            assert_eq!(ctx.GetError(), gles20::NO_ERROR);
        }
    }

    #[test]
    fn generated_names_are_unique() {
        let (_gl, _egl, mut ctx) = context();
        let mut first = [0; 4];
        let mut second = [0; 4];
        unsafe {
            ctx.GenTextures(4, first.as_mut_ptr());
            ctx.GenTextures(4, second.as_mut_ptr());
            ctx.GenTextures(-1, second.as_mut_ptr());
            assert_eq!(ctx.GetError(), gles20::INVALID_VALUE);
        }
        let mut all: Vec<GLuint> = first.iter().chain(second.iter()).copied().collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 8);
        assert!(!all.contains(&0));
    }

    #[test]
    fn texture_target_is_fixed_by_first_bind() {
        let (_gl, _egl, mut ctx) = context();
        unsafe {
            ctx.BindTexture(gles20::TEXTURE_2D, 7);
            ctx.BindTexture(gles20::TEXTURE_CUBE_MAP, 7);
            assert_eq!(ctx.GetError(), gles20::INVALID_OPERATION);
            assert_eq!(ctx.bound_texture(gles20::TEXTURE_CUBE_MAP), 0);
            ctx.BindTexture(gles20::TEXTURE_CUBE_MAP_POSITIVE_X, 7);
            assert_eq!(ctx.GetError(), gles20::INVALID_OPERATION);
            assert_eq!(ctx.bound_texture(gles20::TEXTURE_CUBE_MAP), 0);
            // A face target is still an invalid enum for a fresh name, or for
            // a texture that is a cube map already.
            ctx.BindTexture(gles20::TEXTURE_CUBE_MAP_POSITIVE_X, 8);
            assert_eq!(ctx.GetError(), gles20::INVALID_ENUM);
            ctx.BindTexture(gles20::TEXTURE_CUBE_MAP, 9);
            ctx.BindTexture(gles20::TEXTURE_CUBE_MAP_NEGATIVE_Z, 9);
            assert_eq!(ctx.GetError(), gles20::INVALID_ENUM);
        }
    }

    #[test]
    fn first_error_sticks() {
        let (gl, _egl, mut ctx) = context();
        unsafe {
            ctx.ActiveTexture(gles20::TEXTURE0 + 100);
            ctx.Clear(0xffff_ffff);
            gl.set_error(gles20::OUT_OF_MEMORY);
            assert_eq!(ctx.GetError(), gles20::INVALID_ENUM);
            assert_eq!(ctx.GetError(), gles20::OUT_OF_MEMORY);
            assert_eq!(ctx.GetError(), gles20::NO_ERROR);
        }
        assert!(gl.calls_named("Clear").is_empty());
    }

    #[test]
    fn shader_source_round_trips() {
        let (gl, _egl, mut ctx) = context();
        let parts = ["precision mediump float;\n", "void main() {}XXX"];
        let ptrs = parts.map(|p| p.as_ptr() as *const GLchar);
        let lengths = [-1, 14];
        let first = std::ffi::CString::new(parts[0]).unwrap();
        let ptrs = [first.as_ptr(), ptrs[1]];
        let expected = "precision mediump float;\nvoid main() {}";
        unsafe {
            let shader = ctx.CreateShader(gles20::FRAGMENT_SHADER);
            ctx.ShaderSource(shader, 2, ptrs.as_ptr(), lengths.as_ptr());

            let mut len = 0;
            ctx.GetShaderiv(shader, gles20::SHADER_SOURCE_LENGTH, &mut len);
            assert_eq!(len, expected.len() as GLint + 1);

            let mut buf = [0 as GLchar; 128];
            let mut written = 0;
            ctx.GetShaderSource(shader, buf.len() as GLsizei, &mut written, buf.as_mut_ptr());
            assert_eq!(written, expected.len() as GLsizei);
            assert_eq!(CStr::from_ptr(buf.as_ptr()).to_str().unwrap(), expected);

            // Truncated to fit, still terminated.
            ctx.GetShaderSource(shader, 5, &mut written, buf.as_mut_ptr());
            assert_eq!(written, 4);
            assert_eq!(CStr::from_ptr(buf.as_ptr()).to_str().unwrap(), "prec");
        }
        // The host got the translated source, not the original.
        let host_source = gl.shader_source(2 + 1).unwrap_or_default();
        assert!(host_source.contains("void main() {}"));
        assert_ne!(host_source, expected);
    }

    #[test]
    fn compile_log_is_kept() {
        let (_gl, _egl, mut ctx) = context();
        unsafe {
            let shader = shader_with_source(&mut ctx, gles20::FRAGMENT_SHADER, "#error broken\n");
            let mut status = 1;
            ctx.GetShaderiv(shader, gles20::COMPILE_STATUS, &mut status);
            assert_eq!(status, 0);
            let mut len = 0;
            ctx.GetShaderiv(shader, gles20::INFO_LOG_LENGTH, &mut len);
            assert!(len > 1);
            let mut buf = vec![0 as GLchar; len as usize];
            ctx.GetShaderInfoLog(shader, len, std::ptr::null_mut(), buf.as_mut_ptr());
            assert!(CStr::from_ptr(buf.as_ptr())
                .to_str()
                .unwrap()
                .contains("#error"));

            ctx.GetShaderInfoLog(999, 0, std::ptr::null_mut(), buf.as_mut_ptr());
            assert_eq!(ctx.GetError(), gles20::INVALID_VALUE);
            let program = ctx.CreateProgram();
            ctx.GetShaderInfoLog(program, 0, std::ptr::null_mut(), buf.as_mut_ptr());
            assert_eq!(ctx.GetError(), gles20::INVALID_OPERATION);
        }
    }

    #[test]
    fn link_needs_compiled_shaders() {
        let (gl, _egl, mut ctx) = context();
        unsafe {
            let program = program_with(&mut ctx, "#error nope\n");
            ctx.LinkProgram(program);
            let mut status = 1;
            ctx.GetProgramiv(program, gles20::LINK_STATUS, &mut status);
            assert_eq!(status, 0);
            assert!(gl.calls_named("LinkProgram").is_empty());
            let name = b"u\0";
            assert_eq!(ctx.GetUniformLocation(program, name.as_ptr() as *const GLchar), -1);
            assert_eq!(ctx.GetError(), gles20::INVALID_OPERATION);

            let program = program_with(&mut ctx, "void main() {}");
            ctx.LinkProgram(program);
            ctx.GetProgramiv(program, gles20::LINK_STATUS, &mut status);
            assert_eq!(status, 1);
            assert_eq!(gl.calls_named("LinkProgram").len(), 1);
        }
    }

    #[test]
    fn one_shader_per_stage() {
        let (_gl, _egl, mut ctx) = context();
        unsafe {
            let program = program_with(&mut ctx, "void main() {}");
            let extra = ctx.CreateShader(gles20::VERTEX_SHADER);
            ctx.AttachShader(program, extra);
            assert_eq!(ctx.GetError(), gles20::INVALID_OPERATION);
            ctx.DetachShader(program, extra);
            assert_eq!(ctx.GetError(), gles20::INVALID_OPERATION);
            ctx.AttachShader(program, 12345);
            assert_eq!(ctx.GetError(), gles20::INVALID_VALUE);
        }
    }

    #[test]
    fn program_deletion_waits_until_unused() {
        let (gl, _egl, mut ctx) = context();
        unsafe {
            let program = program_with(&mut ctx, "void main() {}");
            ctx.LinkProgram(program);
            ctx.UseProgram(program);
            let mut current = 0;
            ctx.GetIntegerv(gles20::CURRENT_PROGRAM, &mut current);
            assert_eq!(current, program as GLint);

            ctx.DeleteProgram(program);
            assert_eq!(ctx.IsProgram(program), 1);
            let mut delete_status = 0;
            ctx.GetProgramiv(program, gles20::DELETE_STATUS, &mut delete_status);
            assert_eq!(delete_status, 1);
            assert!(gl.calls_named("DeleteProgram").is_empty());

            ctx.UseProgram(0);
            assert_eq!(gl.calls_named("DeleteProgram").len(), 1);
            assert_eq!(ctx.IsProgram(program), 0);
            assert_eq!(ctx.GetError(), gles20::NO_ERROR);
        }
    }

    #[test]
    fn attached_shader_deletion_is_deferred() {
        let (_gl, _egl, mut ctx) = context();
        unsafe {
            let vs = shader_with_source(&mut ctx, gles20::VERTEX_SHADER, "void main() {}");
            let program = ctx.CreateProgram();
            ctx.AttachShader(program, vs);
            ctx.DeleteShader(vs);
            let mut status = 0;
            ctx.GetShaderiv(vs, gles20::DELETE_STATUS, &mut status);
            assert_eq!(status, 1);

            ctx.DeleteProgram(program);
            ctx.GetShaderiv(vs, gles20::DELETE_STATUS, &mut status);
            assert_eq!(ctx.GetError(), gles20::INVALID_VALUE);
            assert_eq!(ctx.IsShader(vs), 0);
        }
    }

    #[test]
    fn attribute0_current_value_is_emulated() {
        let (gl, _egl, mut ctx) = context();
        unsafe {
            ctx.VertexAttrib4f(0, 1.0, 2.0, 3.0, 4.0);
            ctx.DrawArrays(gles20::TRIANGLES, 0, 3);
            let mut value = [0.0f32; 4];
            ctx.GetVertexAttribfv(0, gles20::CURRENT_VERTEX_ATTRIB, value.as_mut_ptr());
            assert_eq!(value, [1.0, 2.0, 3.0, 4.0]);
            ctx.VertexAttrib2f(0, 5.0, 6.0);
            ctx.GetVertexAttribfv(0, gles20::CURRENT_VERTEX_ATTRIB, value.as_mut_ptr());
            assert_eq!(value, [5.0, 6.0, 0.0, 1.0]);
        }
        let draws = gl.draws();
        assert_eq!(draws[0].arrays[&0].data, [1.0f32, 2.0, 3.0, 4.0].repeat(3));
        assert_eq!(gl.calls_named("DisableVertexAttribArray"), vec!["index=0"]);
    }

    #[test]
    fn draw_range_past_glint_is_rejected() {
        let (gl, _egl, mut ctx) = context();
        unsafe {
            ctx.DrawArrays(gles20::TRIANGLES, GLint::MAX - 1, 4);
            assert_eq!(ctx.GetError(), gles20::INVALID_VALUE);
            ctx.DrawArrays(gles20::TRIANGLES, -1, 3);
            assert_eq!(ctx.GetError(), gles20::INVALID_VALUE);
        }
        assert!(gl.draws().is_empty());
        assert!(gl.calls_named("DrawArrays").is_empty());
    }

    #[test]
    fn fixed_client_array_is_converted() {
        let (gl, _egl, mut ctx) = context();
        let data = fixed_bytes(&[0x10000, 0x8000, 0x20000, -0x10000]);
        unsafe {
            ctx.VertexAttribPointer(1, 2, gles20::FIXED, 0, 0, data.as_ptr() as *const c_void);
            ctx.EnableVertexAttribArray(1);
            ctx.DrawArrays(gles20::POINTS, 0, 2);
        }
        let draws = gl.draws();
        assert_eq!(draws[0].arrays[&1].data, vec![1.0, 0.5, 2.0, -1.0]);
        // Points get desktop point sprites for the draw only.
        assert_eq!(gl.calls_named("Enable").len(), 2);
        assert_eq!(gl.calls_named("Disable").len(), 2);
    }

    #[test]
    fn fixed_buffer_array_is_converted() {
        let (gl, _egl, mut ctx) = context();
        let data = fixed_bytes(&[0x10000, 0x20000, 0x30000]);
        let indices: [u8; 2] = [2, 0];
        let mut buffer = 0;
        unsafe {
            ctx.GenBuffers(1, &mut buffer);
            ctx.BindBuffer(gles20::ARRAY_BUFFER, buffer);
            ctx.BufferData(
                gles20::ARRAY_BUFFER,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const c_void,
                gles20::STATIC_DRAW,
            );
            ctx.VertexAttribPointer(1, 1, gles20::FIXED, 0, 0, std::ptr::null());
            ctx.EnableVertexAttribArray(1);
            ctx.DrawElements(
                gles20::TRIANGLES,
                2,
                gles20::UNSIGNED_BYTE,
                indices.as_ptr() as *const c_void,
            );
            // Converting again must not convert twice.
            ctx.DrawElements(
                gles20::TRIANGLES,
                2,
                gles20::UNSIGNED_BYTE,
                indices.as_ptr() as *const c_void,
            );
        }
        let draws = gl.draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].arrays[&1].data[0], 1.0);
        assert_eq!(draws[0].arrays[&1].data[2], 3.0);
        assert_eq!(draws[1].arrays[&1].data, draws[0].arrays[&1].data);
        assert!(gl.calls_named("BindBuffer").is_empty());
    }

    #[test]
    fn element_buffer_bounds_are_checked() {
        let (gl, _egl, mut ctx) = context();
        let indices: [u16; 3] = [0, 1, 2];
        let mut buffer = 0;
        unsafe {
            ctx.GenBuffers(1, &mut buffer);
            ctx.BindBuffer(gles20::ELEMENT_ARRAY_BUFFER, buffer);
            ctx.BufferData(
                gles20::ELEMENT_ARRAY_BUFFER,
                6,
                indices.as_ptr() as *const c_void,
                gles20::STATIC_DRAW,
            );
            ctx.DrawElements(gles20::TRIANGLES, 3, gles20::UNSIGNED_SHORT, 2 as *const c_void);
            assert_eq!(ctx.GetError(), gles20::INVALID_OPERATION);
            ctx.DrawElements(gles20::TRIANGLES, 3, gles20::UNSIGNED_SHORT, std::ptr::null());
            assert_eq!(ctx.GetError(), gles20::NO_ERROR);
        }
        assert_eq!(gl.draws().len(), 1);
    }

    #[test]
    fn buffer_queries() {
        let (_gl, _egl, mut ctx) = context();
        let mut value = 0;
        unsafe {
            ctx.GetBufferParameteriv(gles20::ARRAY_BUFFER, gles20::BUFFER_SIZE, &mut value);
            assert_eq!(ctx.GetError(), gles20::INVALID_OPERATION);

            ctx.BindBuffer(gles20::ARRAY_BUFFER, 3);
            assert_eq!(ctx.IsBuffer(3), 1);
            ctx.BufferData(gles20::ARRAY_BUFFER, 16, std::ptr::null(), gles20::DYNAMIC_DRAW);
            ctx.GetBufferParameteriv(gles20::ARRAY_BUFFER, gles20::BUFFER_SIZE, &mut value);
            assert_eq!(value, 16);
            ctx.GetBufferParameteriv(gles20::ARRAY_BUFFER, gles20::BUFFER_USAGE, &mut value);
            assert_eq!(value, gles20::DYNAMIC_DRAW as GLint);

            let bytes = [1u8; 8];
            ctx.BufferSubData(gles20::ARRAY_BUFFER, 12, 8, bytes.as_ptr() as *const c_void);
            assert_eq!(ctx.GetError(), gles20::INVALID_VALUE);

            ctx.DeleteBuffers(1, &3);
            assert_eq!(ctx.IsBuffer(3), 0);
            assert_eq!(ctx.bound_buffer(gles20::ARRAY_BUFFER), 0);
        }
    }

    #[test]
    fn egl_image_texture_redefinition() {
        let (gl, egl, mut ctx) = context();
        let mut tex = 0;
        unsafe {
            ctx.GenTextures(1, &mut tex);
            ctx.BindTexture(gles20::TEXTURE_2D, tex);
            let group = ctx.share_group().unwrap().clone();
            let own_global =
                lock_share_group(&group).get_global_name(NamedObjectType::Texture, tex as ObjectLocalName);

            ctx.EGLImageTargetTexture2DOES(gles20::TEXTURE_2D, 7);
            assert_eq!(
                lock_share_group(&group).get_global_name(NamedObjectType::Texture, tex as ObjectLocalName),
                1007
            );
            assert_eq!(
                gl.calls_named("DeleteTextures"),
                vec![format!("n=1 names=[{}]", own_global)]
            );

            let pixels = [0u8; 16];
            ctx.TexImage2D(
                gles20::TEXTURE_2D,
                0,
                gles20::RGBA as GLint,
                2,
                2,
                0,
                gles20::RGBA,
                gles20::UNSIGNED_BYTE,
                pixels.as_ptr() as *const c_void,
            );
            assert_eq!(*egl.detached.lock().unwrap(), vec![7]);
            assert_eq!(
                lock_share_group(&group).get_global_name(NamedObjectType::Texture, tex as ObjectLocalName),
                own_global
            );
            let binds = gl.calls_named("BindTexture");
            assert_eq!(
                binds.last().unwrap(),
                &format!("target={} texture={}", gles20::TEXTURE_2D, own_global)
            );

            // Already detached: deleting must not detach again.
            ctx.DeleteTextures(1, &tex);
            assert_eq!(egl.detached.lock().unwrap().len(), 1);
            assert_eq!(ctx.GetError(), gles20::NO_ERROR);
        }
    }

    #[test]
    fn egl_image_texture_deletion_detaches() {
        let (gl, egl, mut ctx) = context();
        unsafe {
            ctx.BindTexture(gles20::TEXTURE_2D, 4);
            ctx.EGLImageTargetTexture2DOES(gles20::TEXTURE_2D, 3);
            ctx.EGLImageTargetTexture2DOES(gles20::TEXTURE_2D, 5);
            assert_eq!(*egl.detached.lock().unwrap(), vec![3]);
            gl.clear_calls();
            ctx.DeleteTextures(1, &4);
            assert_eq!(*egl.detached.lock().unwrap(), vec![3, 5]);
            // The image owns its texture.
            assert!(gl.calls_named("DeleteTextures").is_empty());
            assert_eq!(ctx.bound_texture(gles20::TEXTURE_2D), 0);

            ctx.EGLImageTargetTexture2DOES(gles20::TEXTURE_CUBE_MAP, 3);
            assert_eq!(ctx.GetError(), gles20::INVALID_ENUM);
        }
    }

    #[test]
    fn egl_image_renderbuffer_replaces_attachment() {
        let (gl, egl, mut ctx) = context();
        unsafe {
            ctx.EGLImageTargetRenderbufferStorageOES(gles20::RENDERBUFFER, 5);
            assert_eq!(ctx.GetError(), gles20::INVALID_OPERATION);

            ctx.BindRenderbuffer(gles20::RENDERBUFFER, 2);
            ctx.BindFramebuffer(gles20::FRAMEBUFFER, 3);
            ctx.FramebufferRenderbuffer(
                gles20::FRAMEBUFFER,
                gles20::COLOR_ATTACHMENT0,
                gles20::RENDERBUFFER,
                2,
            );
            ctx.EGLImageTargetRenderbufferStorageOES(gles20::RENDERBUFFER, 500);
            assert_eq!(ctx.GetError(), gles20::INVALID_VALUE);

            gl.clear_calls();
            ctx.EGLImageTargetRenderbufferStorageOES(gles20::RENDERBUFFER, 5);
            assert_eq!(ctx.GetError(), gles20::NO_ERROR);
            let attach = gl.calls_named("FramebufferTexture2DEXT");
            assert_eq!(attach.len(), 1);
            assert!(attach[0].contains("texture=1005"));

            let mut width = 0;
            ctx.GetRenderbufferParameteriv(gles20::RENDERBUFFER, gles20::RENDERBUFFER_WIDTH, &mut width);
            assert_eq!(gl.calls_named("GetTexLevelParameteriv").len(), 1);

            // New storage gives the image back.
            ctx.RenderbufferStorage(gles20::RENDERBUFFER, gles20::RGB565, 4, 4);
            assert_eq!(*egl.detached.lock().unwrap(), vec![5]);
            assert_eq!(gl.calls_named("RenderbufferStorageEXT").len(), 1);
        }
    }

    #[test]
    fn binding_queries_report_guest_names() {
        let (_gl, _egl, mut ctx) = context();
        unsafe {
            ctx.BindFramebuffer(gles20::FRAMEBUFFER, 9);
            ctx.BindRenderbuffer(gles20::RENDERBUFFER, 11);
            let mut value = 0;
            ctx.GetIntegerv(gles20::FRAMEBUFFER_BINDING, &mut value);
            assert_eq!(value, 9);
            ctx.GetIntegerv(gles20::RENDERBUFFER_BINDING, &mut value);
            assert_eq!(value, 11);
            let mut float_value = 0.0;
            ctx.GetFloatv(gles20::FRAMEBUFFER_BINDING, &mut float_value);
            assert_eq!(float_value, 9.0);
            assert_eq!(ctx.IsFramebuffer(9), 1);

            ctx.DeleteFramebuffers(1, &9);
            assert_eq!(ctx.framebuffer, 0);
            assert_eq!(ctx.IsFramebuffer(9), 0);
        }
    }

    #[test]
    fn es2_limits_are_emulated() {
        let (_gl, _egl, mut ctx) = context();
        let mut value = 0;
        unsafe {
            ctx.GetIntegerv(gles20::MAX_VARYING_VECTORS, &mut value);
            assert_eq!(value, 8);
            ctx.GetIntegerv(gles20::MAX_COMBINED_TEXTURE_IMAGE_UNITS, &mut value);
            assert_eq!(value, 16);
            ctx.GetIntegerv(gles20::NUM_COMPRESSED_TEXTURE_FORMATS, &mut value);
            assert_eq!(value, 11);
            let mut formats = [0; 11];
            ctx.GetIntegerv(gles20::COMPRESSED_TEXTURE_FORMATS, formats.as_mut_ptr());
            assert!(formats.contains(&(gles20::ETC1_RGB8_OES as GLint)));
            let mut flag = 0;
            ctx.GetBooleanv(gles20::SHADER_COMPILER, &mut flag);
            assert_eq!(flag, 1);
        }
    }

    #[test]
    fn precision_format_without_host_support() {
        let (gl, _egl, mut ctx) = context();
        gl.set_unloaded("GetShaderPrecisionFormat");
        let mut range = [0; 2];
        let mut precision = 0;
        unsafe {
            ctx.GetShaderPrecisionFormat(
                gles20::FRAGMENT_SHADER,
                gles20::HIGH_FLOAT,
                range.as_mut_ptr(),
                &mut precision,
            );
            assert_eq!((range, precision), ([127, 127], 24));
            ctx.GetShaderPrecisionFormat(
                gles20::VERTEX_SHADER,
                gles20::LOW_INT,
                range.as_mut_ptr(),
                &mut precision,
            );
            assert_eq!((range, precision), ([16, 16], 0));
            ctx.GetShaderPrecisionFormat(gles20::VERTEX_SHADER, gles20::RGBA, range.as_mut_ptr(), &mut precision);
            assert_eq!(ctx.GetError(), gles20::INVALID_ENUM);
        }
    }

    #[test]
    fn read_pixels_needs_complete_framebuffer() {
        let (gl, _egl, mut ctx) = context();
        let mut pixels = [0u8; 4];
        unsafe {
            gl.set_framebuffer_status(gles20::FRAMEBUFFER_INCOMPLETE_ATTACHMENT);
            ctx.BindFramebuffer(gles20::FRAMEBUFFER, 1);
            ctx.ReadPixels(
                0,
                0,
                1,
                1,
                gles20::RGBA,
                gles20::UNSIGNED_BYTE,
                pixels.as_mut_ptr() as *mut c_void,
            );
            assert_eq!(ctx.GetError(), gles20::INVALID_FRAMEBUFFER_OPERATION);
            assert!(gl.calls_named("ReadPixels").is_empty());

            gl.set_framebuffer_status(gles20::FRAMEBUFFER_COMPLETE);
            ctx.ReadPixels(
                0,
                0,
                1,
                1,
                gles20::RGBA,
                gles20::UNSIGNED_BYTE,
                pixels.as_mut_ptr() as *mut c_void,
            );
            assert_eq!(ctx.GetError(), gles20::NO_ERROR);
            assert_eq!(gl.calls_named("ReadPixels").len(), 1);
        }
    }

    #[test]
    fn paletted_texture_is_decoded() {
        let (gl, _egl, mut ctx) = context();
        // 16 RGBA8 palette entries, then four 4-bit indices.
        let mut data = vec![0u8; 16 * 4];
        data[4..8].copy_from_slice(&[255, 0, 0, 255]);
        data.extend_from_slice(&[0x01, 0x10]);
        unsafe {
            ctx.CompressedTexImage2D(
                gles20::TEXTURE_2D,
                0,
                gles20::PALETTE4_RGBA8_OES,
                2,
                2,
                0,
                data.len() as GLsizei,
                data.as_ptr() as *const c_void,
            );
            assert_eq!(ctx.GetError(), gles20::NO_ERROR);
        }
        let uploads = gl.calls_named("TexImage2D");
        assert_eq!(uploads.len(), 1);
        assert!(uploads[0].contains(&format!("format={}", gles20::RGBA)));
        assert_eq!(gl.calls_named("PixelStorei").len(), 2);
    }

    #[test]
    fn compressed_texture_errors() {
        let (gl, _egl, mut ctx) = context();
        let data = [0u8; 4];
        unsafe {
            // ETC1 needs 8 bytes per 4x4 block.
            ctx.CompressedTexImage2D(
                gles20::TEXTURE_2D,
                0,
                gles20::ETC1_RGB8_OES,
                4,
                4,
                0,
                data.len() as GLsizei,
                data.as_ptr() as *const c_void,
            );
            assert_eq!(ctx.GetError(), gles20::INVALID_VALUE);
            ctx.CompressedTexImage2D(
                gles20::TEXTURE_2D,
                0,
                gles20::RGBA,
                1,
                1,
                0,
                data.len() as GLsizei,
                data.as_ptr() as *const c_void,
            );
            assert_eq!(ctx.GetError(), gles20::INVALID_ENUM);
            ctx.CompressedTexImage2D(gles20::TEXTURE_2D, 0, gles20::ETC1_RGB8_OES, 4, 4, 0, 8, std::ptr::null());
            assert_eq!(ctx.GetError(), gles20::INVALID_OPERATION);
        }
        assert!(gl.calls_named("TexImage2D").is_empty());
    }

    #[test]
    fn tex_image_validation() {
        let (gl, _egl, mut ctx) = context();
        unsafe {
            ctx.TexImage2D(
                gles20::TEXTURE_2D,
                0,
                gles20::RGB as GLint,
                1,
                1,
                0,
                gles20::RGBA,
                gles20::UNSIGNED_BYTE,
                std::ptr::null(),
            );
            assert_eq!(ctx.GetError(), gles20::INVALID_OPERATION);
            ctx.TexImage2D(
                gles20::TEXTURE_CUBE_MAP_POSITIVE_X,
                0,
                gles20::RGB as GLint,
                2,
                1,
                0,
                gles20::RGB,
                gles20::UNSIGNED_BYTE,
                std::ptr::null(),
            );
            assert_eq!(ctx.GetError(), gles20::INVALID_VALUE);
            ctx.TexImage2D(
                gles20::TEXTURE_2D,
                0,
                gles20::RGBA as GLint,
                1,
                1,
                0,
                gles20::RGBA,
                gles20::FLOAT,
                std::ptr::null(),
            );
            assert_eq!(ctx.GetError(), gles20::NO_ERROR);
        }
        let uploads = gl.calls_named("TexImage2D");
        assert_eq!(uploads.len(), 1);
        assert!(uploads[0].contains(&format!("internalformat={}", gl21::RGBA32F_ARB)));
    }

    #[test]
    fn vertex_attrib_queries() {
        let (_gl, _egl, mut ctx) = context();
        let mut value = 0;
        unsafe {
            ctx.VertexAttribPointer(2, 3, gles20::FLOAT, 1, 16, 64 as *const c_void);
            ctx.GetVertexAttribiv(2, gles20::VERTEX_ATTRIB_ARRAY_SIZE, &mut value);
            assert_eq!(value, 3);
            ctx.GetVertexAttribiv(2, gles20::VERTEX_ATTRIB_ARRAY_NORMALIZED, &mut value);
            assert_eq!(value, 1);
            let mut pointer = std::ptr::null_mut();
            ctx.GetVertexAttribPointerv(2, gles20::VERTEX_ATTRIB_ARRAY_POINTER, &mut pointer);
            assert_eq!(pointer as usize, 64);
            ctx.GetVertexAttribiv(99, gles20::VERTEX_ATTRIB_ARRAY_SIZE, &mut value);
            assert_eq!(ctx.GetError(), gles20::INVALID_VALUE);
            ctx.GetVertexAttribiv(2, gles20::TEXTURE_2D, &mut value);
            assert_eq!(ctx.GetError(), gles20::INVALID_ENUM);
        }
    }

    #[test]
    fn string_queries() {
        let (_gl, _egl, mut ctx) = context();
        unsafe {
            let vendor = ctx.GetString(gles20::VENDOR);
            assert!(!vendor.is_null());
            assert!(CStr::from_ptr(vendor as *const std::ffi::c_char)
                .to_str()
                .unwrap()
                .starts_with("Google"));
            assert!(ctx.GetString(0).is_null());
            assert_eq!(ctx.GetError(), gles20::INVALID_ENUM);
        }
    }
}
