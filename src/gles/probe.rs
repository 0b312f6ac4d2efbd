/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! `--probe`: report what the host driver looks like to the translator.
//!
//! Implemented using the sdl2 crate, which is only needed to get a real
//! desktop GL 2.1 context without an EGL layer.

use super::context::{host_string, Caps};
use super::dispatch::{GLDispatch, HostGL};
use super::exports::*;
use super::gl21compat_raw as gl21;
use super::gles20_raw as gles20;
use super::objects::{EglImage, EglImageHandle};
use super::translator::{make_current, EGLiface, GLESiface};
use sdl2::video::GLProfile;
use std::ffi::c_void;
use std::sync::Arc;

struct ProbeEGL {
    host: Arc<dyn GLDispatch>,
}

impl EGLiface for ProbeEGL {
    fn get_gl_library(&self) -> Result<Arc<dyn GLDispatch>, String> {
        Ok(self.host.clone())
    }
    fn attach_egl_image(&self, _image: EglImageHandle) -> Option<EglImage> {
        None
    }
    fn detach_egl_image(&self, _image: EglImageHandle) {}
}

const PROBE_SHADER: &str = "\
precision mediump float;
varying vec2 v_texcoord;
uniform sampler2D u_texture;
void main() {
    gl_FragColor = texture2D(u_texture, v_texcoord);
}
";

pub fn probe() -> Result<(), String> {
    let sdl_ctx = sdl2::init()?;
    let video_ctx = sdl_ctx.video()?;
    let attr = video_ctx.gl_attr();
    attr.set_context_version(2, 1);
    attr.set_context_profile(GLProfile::Compatibility);
    let window = video_ctx
        .window("anbox_gles probe", 64, 64)
        .opengl()
        .hidden()
        .build()
        .map_err(|e| e.to_string())?;
    let gl_ctx = window.gl_create_context()?;
    window.gl_make_current(&gl_ctx)?;

    let host: Arc<dyn GLDispatch> = Arc::new(HostGL::load_with(|s| {
        video_ctx.gl_get_proc_address(s) as *const c_void
    })?);

    echo!("Host driver:");
    for (label, name) in [
        ("Vendor", gl21::VENDOR),
        ("Renderer", gl21::RENDERER),
        ("Version", gl21::VERSION),
        ("GLSL version", gl21::SHADING_LANGUAGE_VERSION),
    ] {
        echo!(
            "- {}: {}",
            label,
            host_string(&*host, name).as_deref().unwrap_or("(none)")
        );
    }
    echo!("{:#?}", Caps::query(&*host));
    echo!();

    let iface = GLESiface::init_gles(Arc::new(ProbeEGL { host }))?;
    let ctx = iface.create_gles_context();
    make_current(Some(ctx.clone()));
    iface.init_context(&ctx, Some(iface.share_groups().create_share_group(0)));

    let (compiled, info_log) = unsafe { compile_probe_shader() };
    echo!(
        "Translated test shader {} by the host driver.",
        if compiled { "accepted" } else { "rejected" }
    );
    if !info_log.is_empty() {
        echo!("{}", info_log);
    }

    for (label, name) in [
        ("Vendor", gles20::VENDOR),
        ("Renderer", gles20::RENDERER),
        ("Version", gles20::VERSION),
        ("Extensions", gles20::EXTENSIONS),
    ] {
        let string = unsafe { glGetString(name) };
        if !string.is_null() {
            let string = unsafe { std::ffi::CStr::from_ptr(string as *const _) };
            echo!("Guest {}: {}", label, string.to_string_lossy());
        }
    }

    make_current(None);
    iface.delete_gles_context(ctx);
    Ok(())
}

unsafe fn compile_probe_shader() -> (bool, String) {
    let shader = glCreateShader(gles20::FRAGMENT_SHADER);
    let source = PROBE_SHADER.as_ptr() as *const gles20::types::GLchar;
    let length = PROBE_SHADER.len() as gles20::types::GLint;
    glShaderSource(shader, 1, &source, &length);
    glCompileShader(shader);

    let mut status = 0;
    glGetShaderiv(shader, gles20::COMPILE_STATUS, &mut status);
    let mut log_length = 0;
    glGetShaderiv(shader, gles20::INFO_LOG_LENGTH, &mut log_length);
    let mut info_log = vec![0u8; log_length.max(1) as usize];
    let mut written = 0;
    glGetShaderInfoLog(
        shader,
        info_log.len() as _,
        &mut written,
        info_log.as_mut_ptr() as *mut _,
    );
    info_log.truncate(written.max(0) as usize);
    glDeleteShader(shader);

    (
        status != 0,
        String::from_utf8_lossy(&info_log).into_owned(),
    )
}
