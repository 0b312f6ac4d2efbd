/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Parameter validation for the GLES 2.0 entry points.
//!
//! Each function here answers whether a value is acceptable for one parameter
//! of one (or a few) entry points. They have no side effects; the entry points
//! decide which error a failure maps to and in what order checks are made.
//! Capability-dependent checks take the host's [Caps].

use super::context::Caps;
use super::gles20_raw as gles20;
use super::gles20_raw::types::*;

pub const BUFFER_TARGETS: &[GLenum] = &[gles20::ARRAY_BUFFER, gles20::ELEMENT_ARRAY_BUFFER];

pub const BUFFER_USAGES: &[GLenum] = &[gles20::STREAM_DRAW, gles20::STATIC_DRAW, gles20::DYNAMIC_DRAW];

pub const DRAW_MODES: &[GLenum] = &[
    gles20::POINTS,
    gles20::LINES,
    gles20::LINE_STRIP,
    gles20::LINE_LOOP,
    gles20::TRIANGLES,
    gles20::TRIANGLE_STRIP,
    gles20::TRIANGLE_FAN,
];

pub const CUBE_MAP_FACES: &[GLenum] = &[
    gles20::TEXTURE_CUBE_MAP_POSITIVE_X,
    gles20::TEXTURE_CUBE_MAP_NEGATIVE_X,
    gles20::TEXTURE_CUBE_MAP_POSITIVE_Y,
    gles20::TEXTURE_CUBE_MAP_NEGATIVE_Y,
    gles20::TEXTURE_CUBE_MAP_POSITIVE_Z,
    gles20::TEXTURE_CUBE_MAP_NEGATIVE_Z,
];

/// Capabilities accepted by `glIsEnabled`.
pub const CAPABILITIES: &[GLenum] = &[
    gles20::BLEND,
    gles20::CULL_FACE,
    gles20::DEPTH_TEST,
    gles20::DITHER,
    gles20::POLYGON_OFFSET_FILL,
    gles20::SAMPLE_ALPHA_TO_COVERAGE,
    gles20::SAMPLE_COVERAGE,
    gles20::SCISSOR_TEST,
    gles20::STENCIL_TEST,
];

/// Blend factors valid as both source and destination.
const BLEND_FACTORS: &[GLenum] = &[
    gles20::ZERO,
    gles20::ONE,
    gles20::SRC_COLOR,
    gles20::ONE_MINUS_SRC_COLOR,
    gles20::DST_COLOR,
    gles20::ONE_MINUS_DST_COLOR,
    gles20::SRC_ALPHA,
    gles20::ONE_MINUS_SRC_ALPHA,
    gles20::DST_ALPHA,
    gles20::ONE_MINUS_DST_ALPHA,
    gles20::CONSTANT_COLOR,
    gles20::ONE_MINUS_CONSTANT_COLOR,
    gles20::CONSTANT_ALPHA,
    gles20::ONE_MINUS_CONSTANT_ALPHA,
];

const RENDERBUFFER_PARAMS: &[GLenum] = &[
    gles20::RENDERBUFFER_WIDTH,
    gles20::RENDERBUFFER_HEIGHT,
    gles20::RENDERBUFFER_INTERNAL_FORMAT,
    gles20::RENDERBUFFER_RED_SIZE,
    gles20::RENDERBUFFER_GREEN_SIZE,
    gles20::RENDERBUFFER_BLUE_SIZE,
    gles20::RENDERBUFFER_ALPHA_SIZE,
    gles20::RENDERBUFFER_DEPTH_SIZE,
    gles20::RENDERBUFFER_STENCIL_SIZE,
];

const PROGRAM_PARAMS: &[GLenum] = &[
    gles20::DELETE_STATUS,
    gles20::LINK_STATUS,
    gles20::VALIDATE_STATUS,
    gles20::INFO_LOG_LENGTH,
    gles20::ATTACHED_SHADERS,
    gles20::ACTIVE_ATTRIBUTES,
    gles20::ACTIVE_ATTRIBUTE_MAX_LENGTH,
    gles20::ACTIVE_UNIFORMS,
    gles20::ACTIVE_UNIFORM_MAX_LENGTH,
];

const PRECISION_TYPES: &[GLenum] = &[
    gles20::LOW_FLOAT,
    gles20::MEDIUM_FLOAT,
    gles20::HIGH_FLOAT,
    gles20::LOW_INT,
    gles20::MEDIUM_INT,
    gles20::HIGH_INT,
];

/// `GL_TEXTUREi` within the host's combined unit count.
pub fn texture_unit(caps: &Caps, texture: GLenum) -> bool {
    texture >= gles20::TEXTURE0
        && texture < gles20::TEXTURE0 + caps.max_combined_texture_image_units as GLenum
}

pub fn buffer_target(target: GLenum) -> bool {
    BUFFER_TARGETS.contains(&target)
}

pub fn buffer_usage(usage: GLenum) -> bool {
    BUFFER_USAGES.contains(&usage)
}

pub fn buffer_param(pname: GLenum) -> bool {
    [gles20::BUFFER_SIZE, gles20::BUFFER_USAGE].contains(&pname)
}

pub fn draw_mode(mode: GLenum) -> bool {
    DRAW_MODES.contains(&mode)
}

pub fn draw_type(type_: GLenum) -> bool {
    [gles20::UNSIGNED_BYTE, gles20::UNSIGNED_SHORT, gles20::UNSIGNED_INT].contains(&type_)
}

/// Targets that textures are bound to.
pub fn texture_target(target: GLenum) -> bool {
    [gles20::TEXTURE_2D, gles20::TEXTURE_CUBE_MAP].contains(&target)
}

/// Targets that image data is specified for: 2D and the six cube faces.
pub fn texture_target_ex(target: GLenum) -> bool {
    target == gles20::TEXTURE_2D || is_cube_map_face(target)
}

pub fn is_cube_map_face(target: GLenum) -> bool {
    CUBE_MAP_FACES.contains(&target)
}

pub fn texture_param(pname: GLenum) -> bool {
    [
        gles20::TEXTURE_MIN_FILTER,
        gles20::TEXTURE_MAG_FILTER,
        gles20::TEXTURE_WRAP_S,
        gles20::TEXTURE_WRAP_T,
        gles20::TEXTURE_MAX_ANISOTROPY_EXT,
    ]
    .contains(&pname)
}

/// Width and height both powers of two (or zero) no larger than `max`.
pub fn texture_dimensions(width: GLsizei, height: GLsizei, max: GLint) -> bool {
    let valid = |x: GLsizei| x >= 0 && x <= max && (x & x.wrapping_sub(1)) == 0;
    valid(width) && valid(height)
}

pub fn pixel_type(caps: &Caps, type_: GLenum) -> bool {
    match type_ {
        gles20::UNSIGNED_BYTE
        | gles20::UNSIGNED_SHORT_5_6_5
        | gles20::UNSIGNED_SHORT_4_4_4_4
        | gles20::UNSIGNED_SHORT_5_5_5_1
        | gles20::FLOAT
        | gles20::UNSIGNED_SHORT
        | gles20::UNSIGNED_INT => true,
        gles20::UNSIGNED_INT_24_8_OES => caps.packed_depth_stencil,
        gles20::HALF_FLOAT_OES => caps.half_float_pixel,
        _ => false,
    }
}

pub fn pixel_format(caps: &Caps, format: GLenum) -> bool {
    match format {
        gles20::ALPHA
        | gles20::RGB
        | gles20::RGBA
        | gles20::LUMINANCE
        | gles20::LUMINANCE_ALPHA
        | gles20::DEPTH_COMPONENT => true,
        gles20::BGRA_EXT => caps.bgra,
        gles20::DEPTH_STENCIL_OES => caps.packed_depth_stencil,
        _ => false,
    }
}

/// Whether a format and type go together. Packed types only make sense with
/// the matching channel count.
pub fn pixel_op(format: GLenum, type_: GLenum) -> bool {
    match type_ {
        gles20::UNSIGNED_SHORT_4_4_4_4 | gles20::UNSIGNED_SHORT_5_5_5_1 => format == gles20::RGBA,
        gles20::UNSIGNED_SHORT_5_6_5 => format == gles20::RGB,
        _ => true,
    }
}

pub fn read_pixel_format(format: GLenum) -> bool {
    [gles20::ALPHA, gles20::LUMINANCE_ALPHA, gles20::RGB, gles20::RGBA].contains(&format)
}

pub fn blend_equation_mode(mode: GLenum) -> bool {
    [gles20::FUNC_ADD, gles20::FUNC_SUBTRACT, gles20::FUNC_REVERSE_SUBTRACT].contains(&mode)
}

pub fn blend_src(factor: GLenum) -> bool {
    factor == gles20::SRC_ALPHA_SATURATE || BLEND_FACTORS.contains(&factor)
}

pub fn blend_dst(factor: GLenum) -> bool {
    BLEND_FACTORS.contains(&factor)
}

pub fn framebuffer_target(target: GLenum) -> bool {
    target == gles20::FRAMEBUFFER
}

pub fn framebuffer_attachment(attachment: GLenum) -> bool {
    [
        gles20::COLOR_ATTACHMENT0,
        gles20::DEPTH_ATTACHMENT,
        gles20::STENCIL_ATTACHMENT,
    ]
    .contains(&attachment)
}

pub fn framebuffer_attachment_param(pname: GLenum) -> bool {
    [
        gles20::FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE,
        gles20::FRAMEBUFFER_ATTACHMENT_OBJECT_NAME,
        gles20::FRAMEBUFFER_ATTACHMENT_TEXTURE_LEVEL,
        gles20::FRAMEBUFFER_ATTACHMENT_TEXTURE_CUBE_MAP_FACE,
    ]
    .contains(&pname)
}

pub fn renderbuffer_target(target: GLenum) -> bool {
    target == gles20::RENDERBUFFER
}

pub fn renderbuffer_param(pname: GLenum) -> bool {
    RENDERBUFFER_PARAMS.contains(&pname)
}

pub fn hint(target: GLenum, mode: GLenum) -> bool {
    [gles20::FASTEST, gles20::NICEST, gles20::DONT_CARE].contains(&mode)
        && [
            gles20::GENERATE_MIPMAP_HINT,
            gles20::FRAGMENT_SHADER_DERIVATIVE_HINT_OES,
        ]
        .contains(&target)
}

pub fn capability(cap: GLenum) -> bool {
    CAPABILITIES.contains(&cap)
}

pub fn pixel_store_param(pname: GLenum) -> bool {
    [gles20::PACK_ALIGNMENT, gles20::UNPACK_ALIGNMENT].contains(&pname)
}

pub fn shader_type(type_: GLenum) -> bool {
    [gles20::VERTEX_SHADER, gles20::FRAGMENT_SHADER].contains(&type_)
}

pub fn precision_type(type_: GLenum) -> bool {
    PRECISION_TYPES.contains(&type_)
}

pub fn program_param(pname: GLenum) -> bool {
    PROGRAM_PARAMS.contains(&pname)
}

/// Generic vertex attribute index within the host's limit.
pub fn array_index(caps: &Caps, index: GLuint) -> bool {
    index < caps.max_vertex_attribs as GLuint
}

/// Attribute names may not use the reserved `gl_` prefix.
pub fn attrib_name(name: &[u8]) -> bool {
    !name.starts_with(b"gl_")
}

/// `glBindAttribLocation` checks against the constant GLES minimum rather
/// than the host limit.
pub fn attrib_index(index: GLuint) -> bool {
    index < gles20::MAX_VERTEX_ATTRIBS
}

pub fn stencil_face(face: GLenum) -> bool {
    [gles20::FRONT, gles20::BACK, gles20::FRONT_AND_BACK].contains(&face)
}
