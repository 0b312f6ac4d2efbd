/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
use anbox_gles::gles::dispatch::GLDispatch;
use anbox_gles::gles::exports::*;
use anbox_gles::gles::gles20_raw as gles20;
use anbox_gles::gles::headless::HeadlessGL;
use anbox_gles::gles::objects::{EglImage, EglImageHandle};
use anbox_gles::gles::translator::{make_current, EGLiface, GLESiface};
use std::env;
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::Arc;

// adapted from `assert_cmd` crate
fn target_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .map(|mut path| {
            path.pop();
            if path.ends_with("deps") {
                path.pop();
            }
            path
        })
        .unwrap()
}

// https://stackoverflow.com/a/35907071/2241008
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn run_binary(args: &[&str]) -> Output {
    let binary_name = "anbox_gles";
    let binary_path = target_dir().join(format!("{}{}", binary_name, env::consts::EXE_SUFFIX));

    let output = Command::new(binary_path)
        .args(args)
        .env_remove("GOOGLE_GLES_FORCE_GLSL_VERSION")
        .output()
        .expect("failed to execute anbox_gles process");

    std::io::stdout().write_all(&output.stdout).unwrap();
    std::io::stderr().write_all(&output.stderr).unwrap();
    output
}

#[test]
fn translate_shader_file() -> Result<(), Box<dyn Error>> {
    let shader_path = env::temp_dir().join(format!("anbox_gles_test_{}.frag", std::process::id()));
    std::fs::write(
        &shader_path,
        "#version 100\n\
         precision mediump float;\n\
         void main() { gl_FragColor = vec4(1.0); }\n",
    )?;

    let output = run_binary(&["--force-glsl-version=130", shader_path.to_str().unwrap()]);
    std::fs::remove_file(&shader_path)?;

    assert!(output.status.success());
    let stdout = output.stdout.as_slice();
    assert_eq!(find_subsequence(stdout, b"#version 130\n"), Some(0));
    assert_ne!(find_subsequence(stdout, b"#line 1\n"), None);
    assert_ne!(find_subsequence(stdout, b"gl_FragColor = vec4(1.0);"), None);
    assert_eq!(find_subsequence(stdout, b"#version 100"), None);

    Ok(())
}

#[test]
fn help_and_bad_arguments() {
    let output = run_binary(&["--help"]);
    assert!(output.status.success());
    assert_ne!(
        find_subsequence(output.stderr.as_slice(), b"--force-glsl-version="),
        None
    );

    let output = run_binary(&["--no-such-option"]);
    assert!(!output.status.success());

    let output = run_binary(&["--force-glsl-version=zero"]);
    assert!(!output.status.success());
}

struct TestEGL {
    gl: Arc<HeadlessGL>,
}

impl EGLiface for TestEGL {
    fn get_gl_library(&self) -> Result<Arc<dyn GLDispatch>, String> {
        Ok(self.gl.clone())
    }
    fn attach_egl_image(&self, _image: EglImageHandle) -> Option<EglImage> {
        None
    }
    fn detach_egl_image(&self, _image: EglImageHandle) {}
}

/// The C ABI as a guest application uses it, on a context made current the
/// way an EGL layer does.
#[test]
fn guest_calls_through_c_abi() {
    let gl = Arc::new(HeadlessGL::new());
    let iface = GLESiface::init_gles(Arc::new(TestEGL { gl: gl.clone() })).unwrap();
    let ctx = iface.create_gles_context();
    make_current(Some(ctx.clone()));
    iface.init_context(&ctx, Some(iface.share_groups().create_share_group(1)));

    unsafe {
        let mut textures = [0; 2];
        glGenTextures(2, textures.as_mut_ptr());
        assert_ne!(textures[0], 0);
        assert_ne!(textures[0], textures[1]);

        glBindTexture(gles20::TEXTURE_2D, textures[0]);
        let mut binding = 0;
        glGetIntegerv(gles20::TEXTURE_BINDING_2D, &mut binding);
        assert_eq!(binding, textures[0] as i32);
        assert_eq!(glGetError(), gles20::NO_ERROR);

        // A texture's target can't change once it has been bound.
        glBindTexture(gles20::TEXTURE_CUBE_MAP, textures[0]);
        assert_eq!(glGetError(), gles20::INVALID_OPERATION);
        assert_eq!(glGetError(), gles20::NO_ERROR);

        let shader = glCreateShader(gles20::FRAGMENT_SHADER);
        assert_ne!(shader, 0);
        let source = "precision mediump float;\nvoid main() { gl_FragColor = vec4(0.0); }\n";
        let string = source.as_ptr() as *const gles20::types::GLchar;
        let length = source.len() as gles20::types::GLint;
        glShaderSource(shader, 1, &string, &length);
        glCompileShader(shader);
        let mut status = 0;
        glGetShaderiv(shader, gles20::COMPILE_STATUS, &mut status);
        assert_eq!(status, gles20::TRUE as i32);

        // The guest sees its own source, the host the translated one.
        let mut source_length = 0;
        glGetShaderiv(shader, gles20::SHADER_SOURCE_LENGTH, &mut source_length);
        assert_eq!(source_length as usize, source.len() + 1);
        let host_shader: u32 = gl
            .calls_named("CreateShader")
            .last()
            .and_then(|call| call.rsplit("-> ").next())
            .and_then(|name| name.parse().ok())
            .unwrap();
        let host_source = gl.shader_source(host_shader).unwrap();
        assert!(host_source.starts_with("#version 120\n"));
        assert!(host_source.contains("gl_FragColor = vec4(0.0);"));

        assert_eq!(glIsShader(shader), gles20::TRUE);
        glDeleteShader(shader);
        assert_eq!(glIsShader(shader), gles20::FALSE);
        assert_eq!(glGetError(), gles20::NO_ERROR);
    }

    make_current(None);
    iface.delete_gles_context(ctx);

    // Without a current context calls are ignored, but state queries still
    // answer.
    unsafe {
        let mut texture = 0;
        glGenTextures(1, &mut texture);
        assert_eq!(texture, 0);
        let mut max_attribs = 0;
        glGetIntegerv(gles20::MAX_VERTEX_ATTRIBS, &mut max_attribs);
        assert_eq!(max_attribs, 16);
        assert_eq!(glGetError(), gles20::NO_ERROR);
    }
}
