/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Framebuffer attachment tracking.
//!
//! The translator records what is attached to each framebuffer because it
//! needs to answer attachment queries with local names, unlink renderbuffers
//! when they are detached, and give the host a color attachment when the
//! guest didn't provide one (GLES allows depth-only framebuffers, desktop GL
//! 2.1 with `GL_EXT_framebuffer_object` doesn't).

use super::gl21compat_raw as gl21;
use super::gles20_raw as gles20;
use super::gles20_raw::types::*;
use super::object_names::{NamedObjectType, ObjectLocalName, ShareGroup};
use super::objects::ObjectData;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AttachPoint {
    Color0,
    Depth,
    Stencil,
}

impl AttachPoint {
    pub const ALL: [AttachPoint; 3] = [AttachPoint::Color0, AttachPoint::Depth, AttachPoint::Stencil];

    pub fn from_gl(attachment: GLenum) -> Option<Self> {
        match attachment {
            gles20::COLOR_ATTACHMENT0 => Some(AttachPoint::Color0),
            gles20::DEPTH_ATTACHMENT => Some(AttachPoint::Depth),
            gles20::STENCIL_ATTACHMENT => Some(AttachPoint::Stencil),
            _ => None,
        }
    }

    pub fn to_gl(self) -> GLenum {
        match self {
            AttachPoint::Color0 => gles20::COLOR_ATTACHMENT0,
            AttachPoint::Depth => gles20::DEPTH_ATTACHMENT,
            AttachPoint::Stencil => gles20::STENCIL_ATTACHMENT,
        }
    }
}

/// What is attached at one point. `name` is a local name, except for `owned`
/// attachments, which the translator created on the host itself and which
/// therefore only have a host name.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Attachment {
    pub target: GLenum,
    pub name: ObjectLocalName,
    pub owned: bool,
}

pub struct FramebufferData {
    name: ObjectLocalName,
    attachments: [Attachment; 3],
    dirty: bool,
}

impl FramebufferData {
    pub fn new(name: ObjectLocalName) -> Self {
        FramebufferData {
            name,
            attachments: Default::default(),
            dirty: false,
        }
    }

    pub fn attachment(&self, point: AttachPoint) -> Attachment {
        self.attachments[point as usize]
    }

    /// Clear an attachment point and return what was there. The caller must
    /// pass the result to [ShareGroup::release_attachment].
    pub(super) fn take_attachment(&mut self, point: AttachPoint) -> Attachment {
        std::mem::take(&mut self.attachments[point as usize])
    }
}

impl ShareGroup {
    fn framebuffer_mut(&mut self, fb: ObjectLocalName) -> Option<&mut FramebufferData> {
        self.get_object_data_mut(NamedObjectType::Framebuffer, fb)
            .and_then(ObjectData::framebuffer_mut)
    }

    /// Record an attachment on framebuffer `fb`. A `name` of 0 detaches.
    pub fn set_framebuffer_attachment(
        &mut self,
        fb: ObjectLocalName,
        attachment: GLenum,
        target: GLenum,
        name: ObjectLocalName,
        owned: bool,
    ) {
        let Some(point) = AttachPoint::from_gl(attachment) else {
            return;
        };
        let new = Attachment {
            target,
            name,
            owned,
        };
        let old = {
            let Some(fb_data) = self.framebuffer_mut(fb) else {
                return;
            };
            if name == 0 {
                fb_data.take_attachment(point)
            } else if fb_data.attachment(point) == new {
                return;
            } else {
                let old = fb_data.take_attachment(point);
                fb_data.attachments[point as usize] = new;
                fb_data.dirty = true;
                old
            }
        };
        self.release_attachment(old);

        if name != 0 && target == gles20::RENDERBUFFER && !owned {
            if let Some(rb) = self
                .get_object_data_mut(NamedObjectType::Renderbuffer, name)
                .and_then(ObjectData::renderbuffer_mut)
            {
                rb.attached_fb = fb;
                rb.attached_point = Some(point);
            }
        }
    }

    /// Undo the side effects of an attachment that has been removed from its
    /// framebuffer.
    pub(super) fn release_attachment(&mut self, old: Attachment) {
        if old.target == gles20::RENDERBUFFER && !old.owned {
            if let Some(rb) = self
                .get_object_data_mut(NamedObjectType::Renderbuffer, old.name)
                .and_then(ObjectData::renderbuffer_mut)
            {
                rb.attached_fb = 0;
                rb.attached_point = None;
            }
        }
        if old.owned {
            let host_name = old.name as GLuint;
            match old.target {
                gles20::RENDERBUFFER => unsafe { self.host().DeleteRenderbuffersEXT(1, &host_name) },
                gles20::TEXTURE_2D => unsafe { self.host().DeleteTextures(1, &host_name) },
                _ => (),
            }
        }
    }

    /// Get framebuffer `fb` (currently bound on the host) ready for drawing.
    pub fn validate_framebuffer(&mut self, fb: ObjectLocalName) {
        let Some(fb_data) = self
            .get_object_data(NamedObjectType::Framebuffer, fb)
            .and_then(ObjectData::framebuffer)
        else {
            return;
        };
        let needs_color = fb_data.attachment(AttachPoint::Color0).name == 0;
        let fb_name = fb_data.name;

        if needs_color {
            if let Some(tex) = self.make_dummy_color_attachment() {
                self.set_framebuffer_attachment(
                    fb,
                    gles20::COLOR_ATTACHMENT0,
                    gles20::TEXTURE_2D,
                    tex as ObjectLocalName,
                    true,
                );
            }
        }

        let Some(fb_data) = self.framebuffer_mut(fb) else {
            return;
        };
        if fb_data.dirty {
            fb_data.dirty = false;
            // Some drivers only notice attachment changes on rebind.
            let global = self.get_global_name(NamedObjectType::Framebuffer, fb_name);
            let host = self.host();
            unsafe {
                host.BindFramebufferEXT(gl21::FRAMEBUFFER_EXT, 0);
                host.BindFramebufferEXT(gl21::FRAMEBUFFER_EXT, global);
            }
        }
    }

    /// Create and attach an RGBA texture matching the size of the bound
    /// framebuffer's depth or stencil attachment. Returns the texture's host
    /// name, or `None` if there is nothing to match.
    fn make_dummy_color_attachment(&mut self) -> Option<GLuint> {
        let host = self.host();
        let mut object_type = gl21::NONE as GLint;
        let mut object_name = 0;
        unsafe {
            for attachment in [gl21::DEPTH_ATTACHMENT_EXT, gl21::STENCIL_ATTACHMENT_EXT] {
                host.GetFramebufferAttachmentParameterivEXT(
                    gl21::FRAMEBUFFER_EXT,
                    attachment,
                    gl21::FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE_EXT,
                    &mut object_type,
                );
                if object_type != gl21::NONE as GLint {
                    host.GetFramebufferAttachmentParameterivEXT(
                        gl21::FRAMEBUFFER_EXT,
                        attachment,
                        gl21::FRAMEBUFFER_ATTACHMENT_OBJECT_NAME_EXT,
                        &mut object_name,
                    );
                    break;
                }
            }
        }
        if object_type == gl21::NONE as GLint {
            return None;
        }

        let (mut width, mut height) = (0, 0);
        let mut prev = 0;
        unsafe {
            if object_type == gl21::RENDERBUFFER_EXT as GLint {
                host.GetIntegerv(gl21::RENDERBUFFER_BINDING_EXT, &mut prev);
                host.BindRenderbufferEXT(gl21::RENDERBUFFER_EXT, object_name as GLuint);
                host.GetRenderbufferParameterivEXT(
                    gl21::RENDERBUFFER_EXT,
                    gl21::RENDERBUFFER_WIDTH_EXT,
                    &mut width,
                );
                host.GetRenderbufferParameterivEXT(
                    gl21::RENDERBUFFER_EXT,
                    gl21::RENDERBUFFER_HEIGHT_EXT,
                    &mut height,
                );
                host.BindRenderbufferEXT(gl21::RENDERBUFFER_EXT, prev as GLuint);
            } else if object_type == gl21::TEXTURE as GLint {
                host.GetIntegerv(gl21::TEXTURE_BINDING_2D, &mut prev);
                host.BindTexture(gl21::TEXTURE_2D, object_name as GLuint);
                host.GetTexLevelParameteriv(gl21::TEXTURE_2D, 0, gl21::TEXTURE_WIDTH, &mut width);
                host.GetTexLevelParameteriv(gl21::TEXTURE_2D, 0, gl21::TEXTURE_HEIGHT, &mut height);
                host.BindTexture(gl21::TEXTURE_2D, prev as GLuint);
            }
        }

        let tex = self.gen_global_name(NamedObjectType::Texture);
        let host = self.host();
        unsafe {
            host.GetIntegerv(gl21::TEXTURE_BINDING_2D, &mut prev);
            host.BindTexture(gl21::TEXTURE_2D, tex);
            host.TexParameteri(gl21::TEXTURE_2D, gl21::TEXTURE_MIN_FILTER, gl21::NEAREST as GLint);
            host.TexParameteri(gl21::TEXTURE_2D, gl21::TEXTURE_MAG_FILTER, gl21::NEAREST as GLint);
            host.TexParameteri(gl21::TEXTURE_2D, gl21::TEXTURE_WRAP_S, gl21::CLAMP_TO_EDGE as GLint);
            host.TexParameteri(gl21::TEXTURE_2D, gl21::TEXTURE_WRAP_T, gl21::CLAMP_TO_EDGE as GLint);
            host.TexImage2D(
                gl21::TEXTURE_2D,
                0,
                gl21::RGBA as GLint,
                width,
                height,
                0,
                gl21::RGBA,
                gl21::UNSIGNED_BYTE,
                std::ptr::null(),
            );
            host.FramebufferTexture2DEXT(
                gl21::FRAMEBUFFER_EXT,
                gl21::COLOR_ATTACHMENT0_EXT,
                gl21::TEXTURE_2D,
                tex,
                0,
            );
            host.BindTexture(gl21::TEXTURE_2D, prev as GLuint);
        }
        Some(tex)
    }
}
