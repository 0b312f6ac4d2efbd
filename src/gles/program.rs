/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Shader and program objects.

use super::gles20_raw as gles20;
use super::gles20_raw::types::*;
use super::object_names::ObjectLocalName;
use super::shader_parser::{self, TranslateOptions};

pub struct ShaderData {
    shader_type: GLenum,
    original_src: Vec<u8>,
    /// NUL-terminated, ready for the host.
    parsed_src: Vec<u8>,
    info_log: Vec<u8>,
    pub delete_status: bool,
    /// Program this shader is attached to, or 0.
    pub attached_program: ObjectLocalName,
}

impl ShaderData {
    pub fn new(shader_type: GLenum) -> Self {
        ShaderData {
            shader_type,
            original_src: Vec::new(),
            parsed_src: vec![0],
            info_log: Vec::new(),
            delete_status: false,
            attached_program: 0,
        }
    }

    pub fn shader_type(&self) -> GLenum {
        self.shader_type
    }

    /// Replace the source. `fragments` are concatenated as-is.
    pub fn set_src(&mut self, fragments: &[&[u8]], options: &TranslateOptions) {
        self.original_src = fragments.concat();
        self.parsed_src = shader_parser::translate(&self.original_src, options);
        self.parsed_src.push(0);
    }

    /// The source as the guest gave it.
    pub fn original_src(&self) -> &[u8] {
        &self.original_src
    }

    /// The translated source, NUL-terminated.
    pub fn parsed_src(&self) -> &[u8] {
        &self.parsed_src
    }

    pub fn info_log(&self) -> &[u8] {
        &self.info_log
    }

    pub fn set_info_log(&mut self, log: Vec<u8>) {
        self.info_log = log;
    }
}

pub struct ProgramData {
    attached_vertex_shader: ObjectLocalName,
    attached_fragment_shader: ObjectLocalName,
    link_status: bool,
    info_log: Vec<u8>,
    pub in_use: bool,
    pub delete_status: bool,
}

impl Default for ProgramData {
    fn default() -> Self {
        ProgramData {
            attached_vertex_shader: 0,
            attached_fragment_shader: 0,
            link_status: false,
            info_log: Vec::new(),
            in_use: false,
            delete_status: false,
        }
    }
}

impl ProgramData {
    pub fn attached_vertex_shader(&self) -> ObjectLocalName {
        self.attached_vertex_shader
    }

    pub fn attached_fragment_shader(&self) -> ObjectLocalName {
        self.attached_fragment_shader
    }

    pub fn attached_shader(&self, shader_type: GLenum) -> ObjectLocalName {
        match shader_type {
            gles20::VERTEX_SHADER => self.attached_vertex_shader,
            gles20::FRAGMENT_SHADER => self.attached_fragment_shader,
            _ => 0,
        }
    }

    /// Returns `false` if a shader of that type is already attached.
    pub fn attach_shader(&mut self, shader: ObjectLocalName, shader_type: GLenum) -> bool {
        let slot = match shader_type {
            gles20::VERTEX_SHADER => &mut self.attached_vertex_shader,
            gles20::FRAGMENT_SHADER => &mut self.attached_fragment_shader,
            _ => return false,
        };
        if *slot != 0 {
            return false;
        }
        *slot = shader;
        true
    }

    pub fn is_attached(&self, shader: ObjectLocalName) -> bool {
        shader != 0
            && (self.attached_vertex_shader == shader || self.attached_fragment_shader == shader)
    }

    pub fn detach_shader(&mut self, shader: ObjectLocalName) -> bool {
        if shader != 0 && self.attached_vertex_shader == shader {
            self.attached_vertex_shader = 0;
            true
        } else if shader != 0 && self.attached_fragment_shader == shader {
            self.attached_fragment_shader = 0;
            true
        } else {
            false
        }
    }

    pub fn link_status(&self) -> bool {
        self.link_status
    }

    pub fn set_link_status(&mut self, status: bool) {
        self.link_status = status;
    }

    pub fn info_log(&self) -> &[u8] {
        &self.info_log
    }

    pub fn set_info_log(&mut self, log: Vec<u8>) {
        self.info_log = log;
    }
}
