/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Per-context state, and the host capabilities all contexts share.
//!
//! [GLESv2Context] holds everything a GLES context has that isn't an object
//! in its share group: bindings, vertex attribute arrays, the attribute 0
//! current value and the pending error. The entry points themselves are in
//! [super::gles2_imp].

use super::convert::{self, ConversionArena, Indices};
use super::dispatch::GLDispatch;
use super::gl21compat_raw as gl21;
use super::gles20_raw as gles20;
use super::gles20_raw::types::*;
use super::object_names::{
    internal_name, lock_share_group, NamedObjectType, ObjectLocalName, ShareGroup, ShareGroupPtr,
};
use super::objects::ObjectData;
use super::pointer::GLESPointer;
use super::shader_parser::TranslateOptions;
use super::translator::EGLiface;
use crate::options::Options;
use std::ffi::{c_void, CStr, CString};
use std::sync::{Arc, OnceLock};

/// What the host GL implementation can do. Queried once per process, from
/// whichever host the first context is initialized with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caps {
    pub max_vertex_attribs: GLint,
    pub max_texture_size: GLint,
    pub max_texture_image_units: GLint,
    /// Capped at 16, the most the translator exposes.
    pub max_combined_texture_image_units: GLint,
    /// e.g. 120 for GLSL 1.20.
    pub glsl_version: u32,
    pub bgra: bool,
    pub fbo: bool,
    pub packed_depth_stencil: bool,
    pub half_float_pixel: bool,
    pub half_float_vertex: bool,
    pub auto_mipmap: bool,
    pub es2_compatibility: bool,
    pub standard_derivatives: bool,
    pub npot: bool,
    pub rgb8_rgba8: bool,
}

const MAX_TEXTURE_UNITS: GLint = 16;

impl Caps {
    /// Used before any context has been initialized.
    pub const EMPTY: Caps = Caps {
        max_vertex_attribs: 0,
        max_texture_size: 0,
        max_texture_image_units: 0,
        max_combined_texture_image_units: 0,
        glsl_version: 0,
        bgra: false,
        fbo: false,
        packed_depth_stencil: false,
        half_float_pixel: false,
        half_float_vertex: false,
        auto_mipmap: false,
        es2_compatibility: false,
        standard_derivatives: false,
        npot: false,
        rgb8_rgba8: false,
    };

    pub fn query(host: &dyn GLDispatch) -> Caps {
        let get = |pname: GLenum| {
            let mut value = 0;
            unsafe { host.GetIntegerv(pname, &mut value) };
            value
        };
        let mut caps = Caps {
            max_vertex_attribs: get(gl21::MAX_VERTEX_ATTRIBS),
            max_texture_size: get(gl21::MAX_TEXTURE_SIZE),
            max_texture_image_units: get(gl21::MAX_TEXTURE_IMAGE_UNITS),
            max_combined_texture_image_units: get(gl21::MAX_COMBINED_TEXTURE_IMAGE_UNITS)
                .min(MAX_TEXTURE_UNITS),
            ..Caps::EMPTY
        };
        caps.apply_strings(
            host_string(host, gl21::EXTENSIONS).as_deref().unwrap_or(""),
            host_string(host, gl21::VERSION).as_deref().unwrap_or(""),
            host_string(host, gl21::SHADING_LANGUAGE_VERSION)
                .as_deref()
                .unwrap_or(""),
        );
        caps
    }

    /// Fill in the flags that come from the host's strings.
    pub fn apply_strings(&mut self, extensions: &str, version: &str, glsl_version: &str) {
        let has = |name: &str| extensions.split_ascii_whitespace().any(|ext| ext == name);
        let gl_major = parse_version(version).map_or(0, |(major, _)| major);

        self.glsl_version = parse_version(glsl_version).map_or(0, |(major, minor)| major * 100 + minor);
        self.bgra = has("GL_EXT_bgra");
        self.fbo = has("GL_EXT_framebuffer_object");
        self.packed_depth_stencil = has("GL_EXT_packed_depth_stencil");
        self.half_float_pixel = has("GL_ARB_half_float_pixel") || has("GL_NV_half_float");
        self.half_float_vertex = has("GL_ARB_half_float_vertex");
        self.auto_mipmap = has("GL_SGIS_generate_mipmap");
        self.es2_compatibility = has("GL_ARB_ES2_compatibility");
        self.standard_derivatives = has("GL_OES_standard_derivatives");
        self.npot = has("GL_ARB_texture_non_power_of_two");
        self.rgb8_rgba8 = gl_major >= 3 || has("GL_OES_rgb8_rgba8");
    }
}

/// `"major.minor whatever"` to `(major, minor)`. A one-digit minor version
/// counts as tens, so "1.2" and "1.20" agree.
fn parse_version(version: &str) -> Option<(u32, u32)> {
    let number = version.split_ascii_whitespace().next()?;
    let mut parts = number.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor_str = parts.next().unwrap_or("0");
    let minor: u32 = minor_str.parse().ok()?;
    let minor = if minor_str.len() == 1 { minor * 10 } else { minor };
    Some((major, minor))
}

pub(super) fn host_string(host: &dyn GLDispatch, name: GLenum) -> Option<String> {
    let string = unsafe { host.GetString(name) };
    if string.is_null() {
        return None;
    }
    Some(
        unsafe { CStr::from_ptr(string as *const std::ffi::c_char) }
            .to_string_lossy()
            .into_owned(),
    )
}

static CAPS: OnceLock<Caps> = OnceLock::new();

/// The process-wide capabilities, or [Caps::EMPTY] if no context has been
/// initialized yet.
pub fn caps() -> &'static Caps {
    CAPS.get().unwrap_or(&Caps::EMPTY)
}

pub fn init_caps(host: &dyn GLDispatch) -> &'static Caps {
    CAPS.get_or_init(|| {
        let caps = Caps::query(host);
        log_dbg!("Host capabilities: {:?}", caps);
        caps
    })
}

/// The strings `glGetString` returns. They must stay valid forever, so they
/// are built once.
pub struct Strings {
    vendor: CString,
    renderer: CString,
    version: CString,
    shading_language_version: CString,
    extensions: CString,
}

const BASE_EXTENSIONS: &str = "GL_OES_EGL_image GL_OES_EGL_image_external GL_OES_depth24 \
GL_OES_depth32 GL_OES_element_index_uint GL_OES_texture_float GL_OES_texture_float_linear \
GL_OES_compressed_paletted_texture GL_OES_compressed_ETC1_RGB8_texture GL_OES_depth_texture ";

impl Strings {
    fn build(host: &dyn GLDispatch, caps: &Caps) -> Strings {
        let host_or_na = |name| host_string(host, name).unwrap_or_else(|| "N/A".to_string());

        let mut extensions = BASE_EXTENSIONS.to_string();
        for (supported, names) in [
            (
                caps.half_float_pixel,
                "GL_OES_texture_half_float GL_OES_texture_half_float_linear ",
            ),
            (caps.packed_depth_stencil, "GL_OES_packed_depth_stencil "),
            (caps.half_float_vertex, "GL_OES_vertex_half_float "),
            (caps.standard_derivatives, "GL_OES_standard_derivatives "),
            (caps.npot, "GL_OES_texture_npot "),
            (caps.rgb8_rgba8, "GL_OES_rgb8_rgba8 "),
        ] {
            if supported {
                extensions.push_str(names);
            }
        }

        let c_string = |s: String| CString::new(s).unwrap_or_default();
        Strings {
            vendor: c_string(format!("Google ({})", host_or_na(gl21::VENDOR))),
            renderer: c_string(format!(
                "Android Emulator OpenGL ES Translator ({})",
                host_or_na(gl21::RENDERER)
            )),
            version: c_string(format!("OpenGL ES 2.0 ({})", host_or_na(gl21::VERSION))),
            shading_language_version: c_string("OpenGL ES GLSL ES 1.0.17".to_string()),
            extensions: c_string(extensions),
        }
    }

    pub fn get(&self, name: GLenum) -> Option<&CStr> {
        match name {
            gles20::VENDOR => Some(&self.vendor),
            gles20::RENDERER => Some(&self.renderer),
            gles20::VERSION => Some(&self.version),
            gles20::SHADING_LANGUAGE_VERSION => Some(&self.shading_language_version),
            gles20::EXTENSIONS => Some(&self.extensions),
            _ => None,
        }
    }
}

static STRINGS: OnceLock<Strings> = OnceLock::new();

pub fn strings() -> Option<&'static Strings> {
    STRINGS.get()
}

pub(super) fn texture_slot(target: GLenum) -> usize {
    if target == gles20::TEXTURE_2D {
        0
    } else {
        1
    }
}

pub struct GLESv2Context {
    pub(super) host: Arc<dyn GLDispatch>,
    pub(super) egl: Option<Arc<dyn EGLiface>>,
    pub(super) share_group: Option<ShareGroupPtr>,
    initialized: bool,
    pub(super) pointers: Vec<GLESPointer>,
    pub(super) attribute0_value: [GLfloat; 4],
    /// Grown as needed, never shrunk.
    att0_array: Vec<GLfloat>,
    att0_needs_disable: bool,
    pub(super) active_texture: usize,
    /// Guest texture names bound on each unit, indexed by [texture_slot].
    tex_state: Vec<[ObjectLocalName; 2]>,
    pub(super) array_buffer: ObjectLocalName,
    pub(super) element_array_buffer: ObjectLocalName,
    pub(super) framebuffer: ObjectLocalName,
    pub(super) renderbuffer: ObjectLocalName,
    pub(super) unpack_alignment: GLint,
    gl_error: GLenum,
    pub(super) translate_options: TranslateOptions,
    pub(super) gl_lib_is_mesa: bool,
}

// Client array pointers are guest memory, only dereferenced on the thread the
// context is current on.
unsafe impl Send for GLESv2Context {}

impl GLESv2Context {
    pub fn new(host: Arc<dyn GLDispatch>, egl: Option<Arc<dyn EGLiface>>, options: &Options) -> Self {
        GLESv2Context {
            host,
            egl,
            share_group: None,
            initialized: false,
            pointers: Vec::new(),
            attribute0_value: [0.0, 0.0, 0.0, 1.0],
            att0_array: Vec::new(),
            att0_needs_disable: false,
            active_texture: 0,
            tex_state: Vec::new(),
            array_buffer: 0,
            element_array_buffer: 0,
            framebuffer: 0,
            renderbuffer: 0,
            unpack_alignment: 4,
            gl_error: gles20::NO_ERROR,
            translate_options: TranslateOptions::from(options),
            gl_lib_is_mesa: options.gl_lib_is_mesa,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Size the state to the host's limits. Returns `false` if this had
    /// already been done.
    pub(super) fn init(&mut self, share_group: Option<ShareGroupPtr>) -> bool {
        if self.initialized {
            return false;
        }
        let caps = init_caps(&*self.host);
        STRINGS.get_or_init(|| Strings::build(&*self.host, caps));
        self.share_group = share_group;
        self.pointers = vec![GLESPointer::default(); caps.max_vertex_attribs.max(0) as usize];
        self.tex_state = vec![[0; 2]; caps.max_combined_texture_image_units.max(1) as usize];
        self.initialized = true;
        true
    }

    pub fn share_group(&self) -> Option<&ShareGroupPtr> {
        self.share_group.as_ref()
    }

    pub(super) fn set_share_group(&mut self, share_group: Option<ShareGroupPtr>) {
        self.share_group = share_group;
    }

    /// Latch `error`, unless an earlier one hasn't been read yet.
    pub fn set_gl_error(&mut self, error: GLenum) {
        if self.gl_error == gles20::NO_ERROR {
            self.gl_error = error;
        }
    }

    pub fn gl_error(&self) -> GLenum {
        self.gl_error
    }

    pub(super) fn take_gl_error(&mut self) -> GLenum {
        std::mem::replace(&mut self.gl_error, gles20::NO_ERROR)
    }

    pub fn default_texture_name(target: GLenum) -> ObjectLocalName {
        internal_name(texture_slot(target) as u32)
    }

    /// Share-group name for a guest texture name, with 0 meaning the
    /// default texture for `target`.
    pub fn texture_local_name(target: GLenum, texture: ObjectLocalName) -> ObjectLocalName {
        if texture == 0 {
            Self::default_texture_name(target)
        } else {
            texture
        }
    }

    /// Guest name of the texture bound to `target` (or the cube map, for a
    /// face target) on the active unit.
    pub fn bound_texture(&self, target: GLenum) -> ObjectLocalName {
        self.tex_state
            .get(self.active_texture)
            .map_or(0, |unit| unit[texture_slot(target)])
    }

    pub(super) fn set_bound_texture(&mut self, target: GLenum, texture: ObjectLocalName) {
        if let Some(unit) = self.tex_state.get_mut(self.active_texture) {
            unit[texture_slot(target)] = texture;
        }
    }

    /// Share-group name of the texture bound to `target`.
    pub fn bound_texture_local_name(&self, target: GLenum) -> ObjectLocalName {
        Self::texture_local_name(target, self.bound_texture(target))
    }

    pub fn bound_buffer(&self, target: GLenum) -> ObjectLocalName {
        match target {
            gles20::ARRAY_BUFFER => self.array_buffer,
            gles20::ELEMENT_ARRAY_BUFFER => self.element_array_buffer,
            _ => 0,
        }
    }

    pub(super) fn bind_buffer(&mut self, target: GLenum, buffer: ObjectLocalName) {
        match target {
            gles20::ARRAY_BUFFER => self.array_buffer = buffer,
            gles20::ELEMENT_ARRAY_BUFFER => self.element_array_buffer = buffer,
            _ => (),
        }
    }

    /// Forget a deleted buffer wherever it is bound.
    pub(super) fn unbind_buffer(&mut self, buffer: ObjectLocalName) {
        if self.array_buffer == buffer {
            self.array_buffer = 0;
        }
        if self.element_array_buffer == buffer {
            self.element_array_buffer = 0;
        }
    }

    /// Record a `glVertexAttribPointer`. With an array buffer bound, `data`
    /// is an offset into it.
    pub(super) fn set_pointer(
        &mut self,
        index: GLuint,
        size: GLint,
        type_: GLenum,
        stride: GLsizei,
        data: *const c_void,
        normalized: bool,
    ) {
        let array_buffer = self.array_buffer;
        let Some(pointer) = self.pointers.get_mut(index as usize) else {
            return;
        };
        if array_buffer != 0 {
            pointer.set_buffer(size, type_, stride, array_buffer, data as usize, normalized);
        } else {
            pointer.set_array(size, type_, stride, data, normalized);
        }
    }

    pub(super) fn enable_array(&mut self, index: GLuint, enabled: bool) {
        if let Some(pointer) = self.pointers.get_mut(index as usize) {
            pointer.enabled = enabled;
        }
    }

    /// Answers for `glGet*` pnames that don't need the host. Returns [None]
    /// for anything else.
    pub fn local_integer(&self, pname: GLenum) -> Option<GLint> {
        Some(match pname {
            gles20::ARRAY_BUFFER_BINDING => self.array_buffer as GLint,
            gles20::ELEMENT_ARRAY_BUFFER_BINDING => self.element_array_buffer as GLint,
            gles20::TEXTURE_BINDING_2D => self.bound_texture(gles20::TEXTURE_2D) as GLint,
            gles20::TEXTURE_BINDING_CUBE_MAP => {
                self.bound_texture(gles20::TEXTURE_CUBE_MAP) as GLint
            }
            gles20::ACTIVE_TEXTURE => (gles20::TEXTURE0 as usize + self.active_texture) as GLint,
            gles20::IMPLEMENTATION_COLOR_READ_TYPE => gles20::UNSIGNED_BYTE as GLint,
            gles20::IMPLEMENTATION_COLOR_READ_FORMAT => gles20::RGBA as GLint,
            gles20::MAX_TEXTURE_SIZE => caps().max_texture_size,
            _ => return None,
        })
    }

    /// Get the bound framebuffer ready for drawing, clearing or a status
    /// check.
    pub(super) fn draw_validate(&self, group: &mut ShareGroup) {
        if self.framebuffer != 0 {
            group.validate_framebuffer(self.framebuffer);
        }
    }

    /// If attribute 0's array is disabled, feed the host an array of its
    /// current value for the next draw, since desktop GL doesn't take the
    /// current value of attribute 0 into account.
    pub(super) unsafe fn validate_att0_pre_draw(&mut self, count: usize) {
        self.att0_needs_disable = false;
        if count == 0 || self.pointers.first().map_or(true, |p| p.enabled) {
            return;
        }
        if self.att0_array.len() < count * 4 {
            self.att0_array.resize(count * 4, 0.0);
        }
        for vertex in self.att0_array[..count * 4].chunks_exact_mut(4) {
            vertex.copy_from_slice(&self.attribute0_value);
        }
        self.host.VertexAttribPointer(
            0,
            4,
            gl21::FLOAT,
            gl21::FALSE,
            0,
            self.att0_array.as_ptr() as *const c_void,
        );
        self.host.EnableVertexAttribArray(0);
        self.att0_needs_disable = true;
    }

    pub(super) unsafe fn validate_att0_post_draw(&mut self) {
        if self.att0_needs_disable {
            self.host.DisableVertexAttribArray(0);
        }
        self.att0_needs_disable = false;
    }

    /// Hand the host every enabled vertex array for a draw. `GL_FIXED`
    /// arrays are converted to float: client arrays into `arena`, buffer
    /// arrays in place. `first` and `count` describe a `glDrawArrays`; with
    /// `indices`, the draw is a `glDrawElements` and they are ignored.
    pub(super) unsafe fn setup_arrays_pointers(
        &self,
        mut group: Option<&mut ShareGroup>,
        arena: &mut ConversionArena,
        first: usize,
        count: usize,
        indices: Option<&Indices>,
    ) {
        for (index, p) in self.pointers.iter().enumerate() {
            if !p.enabled {
                continue;
            }
            let index = index as GLuint;
            let size = p.size.max(0) as usize;
            let normalized = p.normalized as GLboolean;

            if !p.is_vbo() {
                if p.type_ != gles20::FIXED || p.data.is_null() {
                    self.host
                        .VertexAttribPointer(index, p.size, p.type_, normalized, p.stride, p.data);
                    continue;
                }
                let stride = p.effective_stride();
                let elements = match indices {
                    Some(indices) if indices.is_empty() => 0,
                    Some(indices) => indices.max_index() as usize + 1,
                    None => first + count,
                };
                let converted = if elements == 0 {
                    Vec::new()
                } else {
                    let len = (elements - 1) * stride + size * 4;
                    let data = std::slice::from_raw_parts(p.data as *const u8, len);
                    match indices {
                        Some(indices) => convert::convert_fixed_indirect(data, stride, size, indices),
                        None => convert::convert_fixed_direct(data, stride, size, first, count),
                    }
                };
                let converted = arena.push(converted);
                self.host.VertexAttribPointer(
                    index,
                    p.size,
                    gl21::FLOAT,
                    normalized,
                    0,
                    converted as *const c_void,
                );
                continue;
            }

            let buffer = group
                .as_deref_mut()
                .and_then(|group| group.get_object_data_mut(NamedObjectType::VertexBuffer, p.buffer))
                .and_then(ObjectData::buffer_mut);
            let Some(buffer) = buffer.filter(|b| p.buffer_offset <= b.size()) else {
                self.host.VertexAttribPointer(
                    index,
                    p.size,
                    p.type_,
                    normalized,
                    p.stride,
                    std::ptr::null(),
                );
                continue;
            };
            let mut type_ = p.type_;
            if type_ == gles20::FIXED {
                let stride = p.stride.max(0) as usize;
                let ranges = match indices {
                    Some(indices) => {
                        convert::indirect_to_byte_ranges(indices, size, stride, p.buffer_offset)
                    }
                    None => convert::direct_to_byte_ranges(first, count, size, stride, p.buffer_offset),
                };
                let conversions = buffer.get_conversions(&ranges);
                let elements =
                    convert::byte_ranges_to_indices(&conversions, size, stride, p.buffer_offset);
                convert::convert_fixed_in_place(
                    &mut buffer.data_mut()[p.buffer_offset..],
                    p.effective_stride(),
                    size,
                    &elements,
                );
                type_ = gl21::FLOAT;
            }
            let data = buffer.data().as_ptr().add(p.buffer_offset);
            self.host
                .VertexAttribPointer(index, p.size, type_, normalized, p.stride, data as *const c_void);
        }
    }
}

/// Lock the context's share group, if it has one.
pub(super) fn with_share_group<R>(
    ctx: &GLESv2Context,
    f: impl FnOnce(&mut ShareGroup) -> R,
) -> Option<R> {
    let group = ctx.share_group.clone()?;
    let mut group = lock_share_group(&group);
    Some(f(&mut group))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gles::headless::HeadlessGL;
    use crate::gles::object_names::ObjectNameManager;

    fn context() -> (Arc<HeadlessGL>, GLESv2Context) {
        let gl = Arc::new(HeadlessGL::new());
        let mut ctx = GLESv2Context::new(gl.clone(), None, &Options::default());
        let names = ObjectNameManager::new(gl.clone());
        ctx.init(Some(names.create_share_group(1)));
        (gl, ctx)
    }

    #[test]
    fn caps_from_strings() {
        let mut caps = Caps::EMPTY;
        caps.apply_strings(
            "GL_EXT_bgra GL_NV_half_float GL_ARB_ES2_compatibility_extra",
            "3.0 Mesa 23.1",
            "1.30",
        );
        assert!(caps.bgra);
        assert!(caps.half_float_pixel);
        assert!(!caps.es2_compatibility);
        assert!(caps.rgb8_rgba8);
        assert_eq!(caps.glsl_version, 130);

        caps.apply_strings("", "2.1", "1.2");
        assert!(!caps.rgb8_rgba8);
        assert_eq!(caps.glsl_version, 120);
    }

    #[test]
    fn headless_caps() {
        let (_gl, _ctx) = context();
        let caps = caps();
        assert_eq!(caps.max_vertex_attribs, 16);
        assert_eq!(caps.max_combined_texture_image_units, 16);
        assert!(caps.fbo && caps.packed_depth_stencil && caps.npot);
        assert!(!caps.es2_compatibility);
    }

    #[test]
    fn strings_wrap_host_values() {
        let (_gl, _ctx) = context();
        let strings = strings().unwrap();
        assert_eq!(
            strings.get(gles20::VENDOR).unwrap().to_str().unwrap(),
            "Google (Headless)"
        );
        assert_eq!(
            strings.get(gles20::VERSION).unwrap().to_str().unwrap(),
            "OpenGL ES 2.0 (2.1 Headless)"
        );
        let extensions = strings.get(gles20::EXTENSIONS).unwrap().to_str().unwrap();
        assert!(extensions.starts_with("GL_OES_EGL_image "));
        assert!(extensions.contains("GL_OES_packed_depth_stencil"));
        assert!(extensions.contains("GL_OES_texture_npot"));
        assert!(!extensions.contains("GL_OES_standard_derivatives"));
        assert!(strings.get(gles20::RGBA).is_none());
    }

    #[test]
    fn error_is_sticky() {
        let (_gl, mut ctx) = context();
        ctx.set_gl_error(gles20::INVALID_ENUM);
        ctx.set_gl_error(gles20::INVALID_VALUE);
        assert_eq!(ctx.take_gl_error(), gles20::INVALID_ENUM);
        assert_eq!(ctx.take_gl_error(), gles20::NO_ERROR);
    }

    #[test]
    fn texture_bindings_per_unit() {
        let (_gl, mut ctx) = context();
        ctx.set_bound_texture(gles20::TEXTURE_2D, 5);
        ctx.set_bound_texture(gles20::TEXTURE_CUBE_MAP_POSITIVE_Y, 6);
        assert_eq!(ctx.bound_texture(gles20::TEXTURE_CUBE_MAP), 6);
        assert_eq!(ctx.local_integer(gles20::TEXTURE_BINDING_2D), Some(5));
        ctx.active_texture = 1;
        assert_eq!(ctx.bound_texture(gles20::TEXTURE_2D), 0);
        assert_eq!(
            ctx.bound_texture_local_name(gles20::TEXTURE_2D),
            internal_name(0)
        );
        assert_eq!(
            ctx.local_integer(gles20::ACTIVE_TEXTURE),
            Some(gles20::TEXTURE1 as GLint)
        );
        assert_eq!(ctx.local_integer(gles20::CURRENT_PROGRAM), None);
    }

    #[test]
    fn att0_array_replicates_current_value() {
        let (gl, mut ctx) = context();
        ctx.attribute0_value = [1.0, 2.0, 3.0, 4.0];
        unsafe {
            ctx.validate_att0_pre_draw(3);
            gl.DrawArrays(gles20::TRIANGLES, 0, 3);
            ctx.validate_att0_post_draw();
        }
        let draws = gl.draws();
        assert_eq!(draws[0].arrays[&0].data, [1.0f32, 2.0, 3.0, 4.0].repeat(3));
        assert_eq!(gl.calls_named("DisableVertexAttribArray"), vec!["index=0"]);

        gl.clear_calls();
        ctx.enable_array(0, true);
        unsafe {
            ctx.validate_att0_pre_draw(3);
            ctx.validate_att0_post_draw();
        }
        assert!(gl.calls_named("VertexAttribPointer").is_empty());
        assert!(gl.calls_named("DisableVertexAttribArray").is_empty());
    }

    #[test]
    fn pointer_follows_array_buffer_binding() {
        let (_gl, mut ctx) = context();
        ctx.bind_buffer(gles20::ARRAY_BUFFER, 7);
        ctx.set_pointer(2, 3, gles20::FLOAT, 0, 12 as *const c_void, false);
        assert!(ctx.pointers[2].is_vbo());
        assert_eq!(ctx.pointers[2].buffer_offset, 12);
        ctx.unbind_buffer(7);
        ctx.set_pointer(2, 3, gles20::FLOAT, 0, std::ptr::null(), false);
        assert!(!ctx.pointers[2].is_vbo());
        // Out of range indices are ignored.
        ctx.set_pointer(99, 3, gles20::FLOAT, 0, std::ptr::null(), false);
    }
}
