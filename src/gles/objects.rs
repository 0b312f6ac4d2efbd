/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Per-object data kept alongside names in a share group.

use super::framebuffer::{AttachPoint, FramebufferData};
use super::gles20_raw as gles20;
use super::gles20_raw::types::*;
use super::object_names::ObjectLocalName;
use super::pointer::GLESBuffer;
use super::program::{ProgramData, ShaderData};
use std::sync::Arc;

/// Handle of an EGLImage, as known to the EGL layer. 0 means none.
pub type EglImageHandle = u32;

/// Called with the image handle when an object stops using an EGLImage.
pub type EglImageDetach = Arc<dyn Fn(EglImageHandle) + Send + Sync>;

/// What the EGL layer hands out when an image is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EglImage {
    pub image_id: EglImageHandle,
    pub global_tex_name: GLuint,
    pub width: GLsizei,
    pub height: GLsizei,
    pub internal_format: GLint,
    pub border: GLint,
}

/// Data attached to an object name.
pub enum ObjectData {
    Texture(TextureData),
    Buffer(GLESBuffer),
    Framebuffer(FramebufferData),
    Renderbuffer(RenderbufferData),
    Shader(ShaderData),
    Program(ProgramData),
}

macro_rules! accessors {
    ($($variant:ident($ty:ty) => $get:ident, $get_mut:ident;)*) => {
        impl ObjectData {
            $(
                pub fn $get(&self) -> Option<&$ty> {
                    match self {
                        ObjectData::$variant(data) => Some(data),
                        _ => None,
                    }
                }
                pub fn $get_mut(&mut self) -> Option<&mut $ty> {
                    match self {
                        ObjectData::$variant(data) => Some(data),
                        _ => None,
                    }
                }
            )*
        }
    }
}

accessors! {
    Texture(TextureData) => texture, texture_mut;
    Buffer(GLESBuffer) => buffer, buffer_mut;
    Framebuffer(FramebufferData) => framebuffer, framebuffer_mut;
    Renderbuffer(RenderbufferData) => renderbuffer, renderbuffer_mut;
    Shader(ShaderData) => shader, shader_mut;
    Program(ProgramData) => program, program_mut;
}

pub struct TextureData {
    pub width: GLsizei,
    pub height: GLsizei,
    pub border: GLint,
    pub internal_format: GLint,
    /// 0 until first bound, then fixed.
    pub target: GLenum,
    pub was_bound: bool,
    pub source_egl_image: EglImageHandle,
    pub egl_image_detach: Option<EglImageDetach>,
    /// Host texture the name pointed to before an EGLImage replaced it.
    pub old_global: GLuint,
}

impl Default for TextureData {
    fn default() -> Self {
        TextureData {
            width: 0,
            height: 0,
            border: 0,
            internal_format: gles20::RGBA as GLint,
            target: 0,
            was_bound: false,
            source_egl_image: 0,
            egl_image_detach: None,
            old_global: 0,
        }
    }
}

impl TextureData {
    /// Stop using the EGLImage, if there is one. Safe to call repeatedly: the
    /// callback runs once per attachment.
    pub fn detach_egl_image(&mut self) {
        if self.source_egl_image != 0 {
            if let Some(detach) = &self.egl_image_detach {
                detach(self.source_egl_image);
            }
            self.source_egl_image = 0;
        }
    }
}

impl Drop for TextureData {
    fn drop(&mut self) {
        self.detach_egl_image();
    }
}

#[derive(Default)]
pub struct RenderbufferData {
    pub source_egl_image: EglImageHandle,
    pub egl_image_detach: Option<EglImageDetach>,
    /// Framebuffer (local name) this renderbuffer is attached to, or 0.
    pub attached_fb: ObjectLocalName,
    pub attached_point: Option<AttachPoint>,
    pub egl_image_global_tex_name: GLuint,
}

impl RenderbufferData {
    pub fn detach_egl_image(&mut self) {
        if self.source_egl_image != 0 {
            if let Some(detach) = &self.egl_image_detach {
                detach(self.source_egl_image);
            }
            self.source_egl_image = 0;
            self.egl_image_global_tex_name = 0;
        }
    }
}

impl Drop for RenderbufferData {
    fn drop(&mut self) {
        self.detach_egl_image();
    }
}
