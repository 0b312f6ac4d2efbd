/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! A host "driver" that renders nothing.
//!
//! [HeadlessGL] records every call made through [GLDispatch] and pretends to
//! be a desktop GL 2.1 implementation well enough for the translator to run
//! on top of it: it hands out object names, tracks shader and program status,
//! answers the integer and string queries the translator makes, and captures
//! the contents of float vertex arrays at the time of each draw. It is what
//! the tests run against, and lets the translator be exercised on machines
//! without a GPU.

use super::dispatch::GLDispatch;
use super::gl21compat_raw as gl21;
use super::gl21compat_raw::types::*;
use std::collections::{HashMap, HashSet};
use std::ffi::{c_void, CString};
use std::sync::{Mutex, MutexGuard};

/// A float vertex array as the host saw it during a draw.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedArray {
    pub size: GLint,
    pub stride: GLsizei,
    /// Elements from 0 up to the highest one the draw used, tightly packed.
    pub data: Vec<GLfloat>,
}

#[derive(Debug, Clone)]
pub struct DrawCall {
    pub mode: GLenum,
    pub count: GLsizei,
    /// Enabled `GL_FLOAT` arrays by attribute index.
    pub arrays: HashMap<GLuint, CapturedArray>,
}

#[derive(Copy, Clone)]
struct AttribState {
    enabled: bool,
    size: GLint,
    type_: GLenum,
    stride: GLsizei,
    pointer: *const c_void,
}

impl Default for AttribState {
    fn default() -> Self {
        AttribState {
            enabled: false,
            size: 4,
            type_: gl21::FLOAT,
            stride: 0,
            pointer: std::ptr::null(),
        }
    }
}

#[derive(Default)]
struct ShaderState {
    type_: GLenum,
    source: String,
    compiled: bool,
    info_log: String,
}

struct State {
    calls: Vec<(&'static str, String)>,
    next_name: GLuint,
    integers: HashMap<GLenum, GLint>,
    strings: HashMap<GLenum, CString>,
    unloaded: HashSet<String>,
    attachment_types: HashMap<GLenum, GLenum>,
    framebuffer_status: GLenum,
    error: GLenum,
    shaders: HashMap<GLuint, ShaderState>,
    programs: HashMap<GLuint, bool>,
    attribs: HashMap<GLuint, AttribState>,
    draws: Vec<DrawCall>,
}

// The attribute pointers are only dereferenced during the draw call that
// uses them, on the calling thread.
unsafe impl Send for State {}

pub struct HeadlessGL {
    state: Mutex<State>,
}

impl Default for HeadlessGL {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessGL {
    pub fn new() -> HeadlessGL {
        let integers = HashMap::from([
            (gl21::MAX_VERTEX_ATTRIBS, 16),
            (gl21::MAX_TEXTURE_SIZE, 4096),
            (gl21::MAX_TEXTURE_IMAGE_UNITS, 16),
            (gl21::MAX_COMBINED_TEXTURE_IMAGE_UNITS, 32),
            (gl21::MAX_VERTEX_UNIFORM_COMPONENTS, 1024),
            (gl21::MAX_FRAGMENT_UNIFORM_COMPONENTS, 1024),
            (gl21::MAX_VARYING_FLOATS, 60),
            (gl21::MAX_RENDERBUFFER_SIZE_EXT, 4096),
            (gl21::MAX_VIEWPORT_DIMS, 4096),
        ]);
        let strings = [
            (gl21::VENDOR, "Headless"),
            (gl21::RENDERER, "HeadlessGL"),
            (gl21::VERSION, "2.1 Headless"),
            (gl21::SHADING_LANGUAGE_VERSION, "1.20"),
            (
                gl21::EXTENSIONS,
                "GL_EXT_framebuffer_object GL_EXT_packed_depth_stencil GL_NV_half_float \
                 GL_ARB_texture_non_power_of_two GL_EXT_bgra",
            ),
        ]
        .into_iter()
        .map(|(name, value)| (name, CString::new(value).unwrap_or_default()))
        .collect();
        HeadlessGL {
            state: Mutex::new(State {
                calls: Vec::new(),
                next_name: 1,
                integers,
                strings,
                unloaded: HashSet::new(),
                attachment_types: HashMap::new(),
                framebuffer_status: gl21::FRAMEBUFFER_COMPLETE_EXT,
                error: gl21::NO_ERROR,
                shaders: HashMap::new(),
                programs: HashMap::new(),
                attribs: HashMap::new(),
                draws: Vec::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push_call(&self, name: &'static str, args: String) {
        self.state().calls.push((name, args));
    }

    fn gen_names(&self, name: &'static str, n: GLsizei, names: *mut GLuint) {
        let mut state = self.state();
        let mut generated = Vec::new();
        for i in 0..n.max(0) as usize {
            let new = state.next_name;
            state.next_name += 1;
            unsafe { names.add(i).write(new) };
            generated.push(new);
        }
        state.calls.push((name, format!("n={} names={:?}", n, generated)));
    }

    fn delete_names(&self, name: &'static str, n: GLsizei, names: *const GLuint) {
        let names: Vec<GLuint> = (0..n.max(0) as usize)
            .map(|i| unsafe { names.add(i).read() })
            .collect();
        self.push_call(name, format!("n={} names={:?}", n, names));
    }

    /// Argument strings of every recorded call to `name`, oldest first.
    pub fn calls_named(&self, name: &str) -> Vec<String> {
        self.state()
            .calls
            .iter()
            .filter(|(call, _)| *call == name)
            .map(|(_, args)| args.clone())
            .collect()
    }

    /// Names of every recorded call, oldest first.
    pub fn call_names(&self) -> Vec<&'static str> {
        self.state().calls.iter().map(|&(name, _)| name).collect()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.state().draws.clone()
    }

    /// Make [GLDispatch::is_loaded] report `name` as missing.
    pub fn set_unloaded(&self, name: &str) {
        self.state().unloaded.insert(name.to_string());
    }

    /// What `glGetFramebufferAttachmentParameteriv` reports as the object
    /// type at `attachment` of the bound framebuffer.
    pub fn set_framebuffer_attachment_type(&self, attachment: GLenum, type_: GLenum) {
        self.state().attachment_types.insert(attachment, type_);
    }

    pub fn set_framebuffer_status(&self, status: GLenum) {
        self.state().framebuffer_status = status;
    }

    /// Latch an error for the next `glGetError`.
    pub fn set_error(&self, error: GLenum) {
        self.state().error = error;
    }

    /// The source last given to a host shader.
    pub fn shader_source(&self, shader: GLuint) -> Option<String> {
        self.state().shaders.get(&shader).map(|s| s.source.clone())
    }

    fn capture_arrays(state: &State, elements: usize) -> HashMap<GLuint, CapturedArray> {
        let mut arrays = HashMap::new();
        for (&index, attrib) in &state.attribs {
            if !attrib.enabled || attrib.type_ != gl21::FLOAT || attrib.pointer.is_null() {
                continue;
            }
            let size = attrib.size.max(0) as usize;
            let stride = if attrib.stride != 0 {
                attrib.stride as usize
            } else {
                size * 4
            };
            let mut data = Vec::with_capacity(elements * size);
            for element in 0..elements {
                for component in 0..size {
                    let ptr = attrib.pointer as *const u8;
                    let value = unsafe {
                        (ptr.add(element * stride + component * 4) as *const GLfloat)
                            .read_unaligned()
                    };
                    data.push(value);
                }
            }
            arrays.insert(
                index,
                CapturedArray {
                    size: attrib.size,
                    stride: attrib.stride,
                    data,
                },
            );
        }
        arrays
    }
}

unsafe fn read_c_str(s: *const GLchar, length: Option<GLint>) -> String {
    match length {
        Some(length) if length >= 0 => {
            let bytes = std::slice::from_raw_parts(s as *const u8, length as usize);
            String::from_utf8_lossy(bytes).into_owned()
        }
        _ => std::ffi::CStr::from_ptr(s).to_string_lossy().into_owned(),
    }
}

unsafe fn write_log(log: &str, buf_size: GLsizei, length: *mut GLsizei, out: *mut GLchar) {
    let n = log.len().min((buf_size.max(1) - 1) as usize);
    if !out.is_null() && buf_size > 0 {
        std::ptr::copy_nonoverlapping(log.as_ptr(), out as *mut u8, n);
        out.add(n).write(0);
    }
    if !length.is_null() {
        length.write(n as GLsizei);
    }
}

impl GLDispatch for HeadlessGL {
    fn record(&self, name: &'static str, args: std::fmt::Arguments<'_>) {
        self.push_call(name, args.to_string());
    }

    fn is_loaded(&self, name: &str) -> bool {
        !self.state().unloaded.contains(name)
    }

    unsafe fn GetString(&self, name: GLenum) -> *const GLubyte {
        self.push_call("GetString", format!("name={:?}", name));
        self.state()
            .strings
            .get(&name)
            .map_or(std::ptr::null(), |s| s.as_ptr() as *const GLubyte)
    }

    unsafe fn GetError(&self) -> GLenum {
        let mut state = self.state();
        state.calls.push(("GetError", String::new()));
        std::mem::replace(&mut state.error, gl21::NO_ERROR)
    }

    unsafe fn GetIntegerv(&self, pname: GLenum, data: *mut GLint) {
        let mut state = self.state();
        state.calls.push(("GetIntegerv", format!("pname={:?}", pname)));
        if let Some(&value) = state.integers.get(&pname) {
            data.write(value);
        }
    }

    unsafe fn GetFloatv(&self, pname: GLenum, data: *mut GLfloat) {
        let mut state = self.state();
        state.calls.push(("GetFloatv", format!("pname={:?}", pname)));
        if let Some(&value) = state.integers.get(&pname) {
            data.write(value as GLfloat);
        }
    }

    unsafe fn GetBooleanv(&self, pname: GLenum, data: *mut GLboolean) {
        let mut state = self.state();
        state.calls.push(("GetBooleanv", format!("pname={:?}", pname)));
        if let Some(&value) = state.integers.get(&pname) {
            data.write((value != 0) as GLboolean);
        }
    }

    unsafe fn GenTextures(&self, n: GLsizei, textures: *mut GLuint) {
        self.gen_names("GenTextures", n, textures)
    }

    unsafe fn GenRenderbuffersEXT(&self, n: GLsizei, renderbuffers: *mut GLuint) {
        self.gen_names("GenRenderbuffersEXT", n, renderbuffers)
    }

    unsafe fn GenFramebuffersEXT(&self, n: GLsizei, framebuffers: *mut GLuint) {
        self.gen_names("GenFramebuffersEXT", n, framebuffers)
    }

    unsafe fn DeleteTextures(&self, n: GLsizei, textures: *const GLuint) {
        self.delete_names("DeleteTextures", n, textures)
    }

    unsafe fn DeleteRenderbuffersEXT(&self, n: GLsizei, renderbuffers: *const GLuint) {
        self.delete_names("DeleteRenderbuffersEXT", n, renderbuffers)
    }

    unsafe fn DeleteFramebuffersEXT(&self, n: GLsizei, framebuffers: *const GLuint) {
        self.delete_names("DeleteFramebuffersEXT", n, framebuffers)
    }

    unsafe fn BindTexture(&self, target: GLenum, texture: GLuint) {
        let mut state = self.state();
        state.calls.push(("BindTexture", format!("target={:?} texture={:?}", target, texture)));
        let binding = match target {
            gl21::TEXTURE_CUBE_MAP => gl21::TEXTURE_BINDING_CUBE_MAP,
            _ => gl21::TEXTURE_BINDING_2D,
        };
        state.integers.insert(binding, texture as GLint);
    }

    unsafe fn BindFramebufferEXT(&self, target: GLenum, framebuffer: GLuint) {
        let mut state = self.state();
        state.calls.push((
            "BindFramebufferEXT",
            format!("target={:?} framebuffer={:?}", target, framebuffer),
        ));
        state
            .integers
            .insert(gl21::FRAMEBUFFER_BINDING_EXT, framebuffer as GLint);
    }

    unsafe fn BindRenderbufferEXT(&self, target: GLenum, renderbuffer: GLuint) {
        let mut state = self.state();
        state.calls.push((
            "BindRenderbufferEXT",
            format!("target={:?} renderbuffer={:?}", target, renderbuffer),
        ));
        state
            .integers
            .insert(gl21::RENDERBUFFER_BINDING_EXT, renderbuffer as GLint);
    }

    unsafe fn CheckFramebufferStatusEXT(&self, target: GLenum) -> GLenum {
        let mut state = self.state();
        state
            .calls
            .push(("CheckFramebufferStatusEXT", format!("target={:?}", target)));
        state.framebuffer_status
    }

    unsafe fn GetFramebufferAttachmentParameterivEXT(
        &self,
        target: GLenum,
        attachment: GLenum,
        pname: GLenum,
        params: *mut GLint,
    ) {
        let mut state = self.state();
        state.calls.push((
            "GetFramebufferAttachmentParameterivEXT",
            format!("target={:?} attachment={:?} pname={:?}", target, attachment, pname),
        ));
        let type_ = state
            .attachment_types
            .get(&attachment)
            .copied()
            .unwrap_or(gl21::NONE);
        match pname {
            gl21::FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE_EXT => params.write(type_ as GLint),
            gl21::FRAMEBUFFER_ATTACHMENT_OBJECT_NAME_EXT => {
                params.write(if type_ == gl21::NONE { 0 } else { 1 })
            }
            _ => params.write(0),
        }
    }

    unsafe fn CreateShader(&self, type_: GLenum) -> GLuint {
        let mut state = self.state();
        let name = state.next_name;
        state.next_name += 1;
        state.shaders.insert(
            name,
            ShaderState {
                type_,
                ..Default::default()
            },
        );
        state.calls.push(("CreateShader", format!("type_={:?} -> {}", type_, name)));
        name
    }

    unsafe fn CreateProgram(&self) -> GLuint {
        let mut state = self.state();
        let name = state.next_name;
        state.next_name += 1;
        state.programs.insert(name, false);
        state.calls.push(("CreateProgram", format!("-> {}", name)));
        name
    }

    unsafe fn DeleteShader(&self, shader: GLuint) {
        let mut state = self.state();
        state.calls.push(("DeleteShader", format!("shader={:?}", shader)));
        state.shaders.remove(&shader);
    }

    unsafe fn DeleteProgram(&self, program: GLuint) {
        let mut state = self.state();
        state.calls.push(("DeleteProgram", format!("program={:?}", program)));
        state.programs.remove(&program);
    }

    unsafe fn IsShader(&self, shader: GLuint) -> GLboolean {
        self.state().shaders.contains_key(&shader) as GLboolean
    }

    unsafe fn IsProgram(&self, program: GLuint) -> GLboolean {
        self.state().programs.contains_key(&program) as GLboolean
    }

    unsafe fn ShaderSource(
        &self,
        shader: GLuint,
        count: GLsizei,
        string: *const *const GLchar,
        length: *const GLint,
    ) {
        let mut source = String::new();
        for i in 0..count.max(0) as usize {
            let len = (!length.is_null()).then(|| length.add(i).read());
            source.push_str(&read_c_str(string.add(i).read(), len));
        }
        let mut state = self.state();
        state
            .calls
            .push(("ShaderSource", format!("shader={:?} count={:?}", shader, count)));
        if let Some(shader) = state.shaders.get_mut(&shader) {
            shader.source = source;
        }
    }

    /// Compilation fails if the source contains `#error`.
    unsafe fn CompileShader(&self, shader: GLuint) {
        let mut state = self.state();
        state.calls.push(("CompileShader", format!("shader={:?}", shader)));
        if let Some(shader) = state.shaders.get_mut(&shader) {
            shader.compiled = !shader.source.contains("#error");
            shader.info_log = if shader.compiled {
                String::new()
            } else {
                "0:1(1): error: #error directive\n".to_string()
            };
        }
    }

    unsafe fn GetShaderiv(&self, shader: GLuint, pname: GLenum, params: *mut GLint) {
        let mut state = self.state();
        state
            .calls
            .push(("GetShaderiv", format!("shader={:?} pname={:?}", shader, pname)));
        let value = state.shaders.get(&shader).map(|shader| match pname {
            gl21::COMPILE_STATUS => shader.compiled as GLint,
            gl21::SHADER_TYPE => shader.type_ as GLint,
            gl21::INFO_LOG_LENGTH => match shader.info_log.len() {
                0 => 0,
                n => n as GLint + 1,
            },
            gl21::SHADER_SOURCE_LENGTH => shader.source.len() as GLint + 1,
            _ => 0,
        });
        match value {
            Some(value) => params.write(value),
            None => state.error = gl21::INVALID_VALUE,
        }
    }

    unsafe fn GetShaderInfoLog(
        &self,
        shader: GLuint,
        buf_size: GLsizei,
        length: *mut GLsizei,
        info_log: *mut GLchar,
    ) {
        let log = self
            .state()
            .shaders
            .get(&shader)
            .map(|s| s.info_log.clone())
            .unwrap_or_default();
        write_log(&log, buf_size, length, info_log);
    }

    unsafe fn LinkProgram(&self, program: GLuint) {
        let mut state = self.state();
        state.calls.push(("LinkProgram", format!("program={:?}", program)));
        if let Some(linked) = state.programs.get_mut(&program) {
            *linked = true;
        }
    }

    unsafe fn GetProgramiv(&self, program: GLuint, pname: GLenum, params: *mut GLint) {
        let mut state = self.state();
        state
            .calls
            .push(("GetProgramiv", format!("program={:?} pname={:?}", program, pname)));
        match state.programs.get(&program).copied() {
            Some(linked) if pname == gl21::LINK_STATUS => params.write(linked as GLint),
            Some(_) => params.write(0),
            None => state.error = gl21::INVALID_VALUE,
        }
    }

    unsafe fn GetProgramInfoLog(
        &self,
        _program: GLuint,
        buf_size: GLsizei,
        length: *mut GLsizei,
        info_log: *mut GLchar,
    ) {
        write_log("", buf_size, length, info_log);
    }

    unsafe fn UseProgram(&self, program: GLuint) {
        let mut state = self.state();
        state.calls.push(("UseProgram", format!("program={:?}", program)));
        state.integers.insert(gl21::CURRENT_PROGRAM, program as GLint);
    }

    unsafe fn EnableVertexAttribArray(&self, index: GLuint) {
        let mut state = self.state();
        state
            .calls
            .push(("EnableVertexAttribArray", format!("index={:?}", index)));
        state.attribs.entry(index).or_default().enabled = true;
    }

    unsafe fn DisableVertexAttribArray(&self, index: GLuint) {
        let mut state = self.state();
        state
            .calls
            .push(("DisableVertexAttribArray", format!("index={:?}", index)));
        state.attribs.entry(index).or_default().enabled = false;
    }

    unsafe fn VertexAttribPointer(
        &self,
        index: GLuint,
        size: GLint,
        type_: GLenum,
        normalized: GLboolean,
        stride: GLsizei,
        pointer: *const c_void,
    ) {
        let mut state = self.state();
        state.calls.push((
            "VertexAttribPointer",
            format!(
                "index={:?} size={:?} type_={:?} normalized={:?} stride={:?}",
                index, size, type_, normalized, stride
            ),
        ));
        let attrib = state.attribs.entry(index).or_default();
        attrib.size = size;
        attrib.type_ = type_;
        attrib.stride = stride;
        attrib.pointer = pointer;
    }

    unsafe fn GetVertexAttribiv(&self, index: GLuint, pname: GLenum, params: *mut GLint) {
        let mut state = self.state();
        state
            .calls
            .push(("GetVertexAttribiv", format!("index={:?} pname={:?}", index, pname)));
        let attrib = state.attribs.get(&index).copied().unwrap_or_default();
        match pname {
            gl21::VERTEX_ATTRIB_ARRAY_ENABLED => params.write(attrib.enabled as GLint),
            gl21::VERTEX_ATTRIB_ARRAY_SIZE => params.write(attrib.size),
            gl21::VERTEX_ATTRIB_ARRAY_TYPE => params.write(attrib.type_ as GLint),
            gl21::VERTEX_ATTRIB_ARRAY_STRIDE => params.write(attrib.stride),
            _ => params.write(0),
        }
    }

    unsafe fn DrawArrays(&self, mode: GLenum, first: GLint, count: GLsizei) {
        let mut state = self.state();
        state.calls.push((
            "DrawArrays",
            format!("mode={:?} first={:?} count={:?}", mode, first, count),
        ));
        let elements = first.max(0) as usize + count.max(0) as usize;
        let arrays = Self::capture_arrays(&state, elements);
        state.draws.push(DrawCall {
            mode,
            count,
            arrays,
        });
    }

    unsafe fn DrawElements(&self, mode: GLenum, count: GLsizei, type_: GLenum, indices: *const c_void) {
        let mut state = self.state();
        state.calls.push((
            "DrawElements",
            format!("mode={:?} count={:?} type_={:?}", mode, count, type_),
        ));
        let mut max = None;
        for i in 0..count.max(0) as usize {
            let index = match type_ {
                gl21::UNSIGNED_BYTE => u32::from((indices as *const u8).add(i).read()),
                gl21::UNSIGNED_SHORT => u32::from((indices as *const u16).add(i).read_unaligned()),
                _ => (indices as *const u32).add(i).read_unaligned(),
            };
            max = max.max(Some(index));
        }
        let elements = max.map_or(0, |max| max as usize + 1);
        let arrays = Self::capture_arrays(&state, elements);
        state.draws.push(DrawCall {
            mode,
            count,
            arrays,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique() {
        let gl = HeadlessGL::new();
        let mut names = [0; 3];
        unsafe {
            gl.GenTextures(3, names.as_mut_ptr());
            assert_ne!(gl.CreateShader(gl21::VERTEX_SHADER), names[2]);
        }
        assert_eq!(names, [1, 2, 3]);
        assert_eq!(gl.calls_named("GenTextures"), vec!["n=3 names=[1, 2, 3]"]);
    }

    #[test]
    fn default_methods_are_recorded() {
        let gl = HeadlessGL::new();
        unsafe { gl.Viewport(0, 0, 640, 480) };
        assert_eq!(gl.calls_named("Viewport"), vec!["x=0 y=0 width=640 height=480 "]);
        assert_eq!(gl.call_names(), vec!["Viewport"]);
    }

    #[test]
    fn compile_status_follows_source() {
        let gl = HeadlessGL::new();
        let source = b"#error nope\n\0";
        unsafe {
            let shader = gl.CreateShader(gl21::FRAGMENT_SHADER);
            let ptr = source.as_ptr() as *const GLchar;
            gl.ShaderSource(shader, 1, &ptr, std::ptr::null());
            gl.CompileShader(shader);
            let mut status = 1;
            gl.GetShaderiv(shader, gl21::COMPILE_STATUS, &mut status);
            assert_eq!(status, 0);
            assert_eq!(gl.shader_source(shader).unwrap(), "#error nope\n");
        }
    }

    #[test]
    fn draw_captures_float_arrays() {
        let gl = HeadlessGL::new();
        let data: [GLfloat; 4] = [1.0, 2.0, 3.0, 4.0];
        unsafe {
            gl.VertexAttribPointer(1, 2, gl21::FLOAT, 0, 0, data.as_ptr() as *const _);
            gl.EnableVertexAttribArray(1);
            gl.DrawArrays(gl21::POINTS, 1, 1);
        }
        let draws = gl.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].arrays[&1].data, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn error_is_drained() {
        let gl = HeadlessGL::new();
        gl.set_error(gl21::OUT_OF_MEMORY);
        unsafe {
            assert_eq!(gl.GetError(), gl21::OUT_OF_MEMORY);
            assert_eq!(gl.GetError(), gl21::NO_ERROR);
        }
    }
}
