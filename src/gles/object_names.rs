/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! Guest ("local") to host ("global") object name mapping.
//!
//! Every GL object a guest creates has a local name, the number the guest
//! sees, and a global name, the number the host driver knows it by. Local
//! names are scoped to a [ShareGroup], so two unrelated guest contexts can both
//! have a texture 1 without clashing on the host.
//!
//! The [ShareGroup] itself has no lock. It is always used through a
//! [ShareGroupPtr], and that mutex is the lock every entry point holds while it
//! touches object state.

use super::dispatch::GLDispatch;
use super::objects::ObjectData;
use super::gl21compat_raw::types::GLuint;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Local names are wider than GL names so that internal objects (like the
/// default textures) can live outside the range a guest can ask for.
pub type ObjectLocalName = u64;

/// The kinds of object that have separate name spaces. Programs and shaders
/// share one, as in GLES.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NamedObjectType {
    VertexBuffer,
    Texture,
    Renderbuffer,
    Framebuffer,
    Shader,
}

impl NamedObjectType {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        self as usize
    }
}

/// Name for an object the translator creates itself rather than the guest.
/// `n` identifies which one; only the default textures use this currently.
pub const fn internal_name(n: u32) -> ObjectLocalName {
    0x1_0000_0000 + n as ObjectLocalName
}

/// Name space for one [NamedObjectType].
#[derive(Debug)]
struct NameSpace {
    next_name: ObjectLocalName,
    local_to_global: HashMap<ObjectLocalName, GLuint>,
}

impl NameSpace {
    fn new() -> Self {
        NameSpace {
            next_name: 0,
            local_to_global: HashMap::new(),
        }
    }

    fn unused_local_name(&mut self) -> ObjectLocalName {
        loop {
            self.next_name += 1;
            if self.next_name != 0 && !self.local_to_global.contains_key(&self.next_name) {
                return self.next_name;
            }
        }
    }

    fn local_name(&self, global_name: GLuint) -> ObjectLocalName {
        self.local_to_global
            .iter()
            .find(|&(_, &global)| global == global_name)
            .map_or(0, |(&local, _)| local)
    }
}

/// A set of objects shared between contexts. See the module documentation.
pub struct ShareGroup {
    host: Arc<dyn GLDispatch>,
    name_spaces: [NameSpace; NamedObjectType::COUNT],
    objects: HashMap<(NamedObjectType, ObjectLocalName), ObjectData>,
    /// Buffers only exist on the translator's side, so their "global" names
    /// are just a counter that is never zero.
    next_buffer_global: GLuint,
}

pub type ShareGroupPtr = Arc<Mutex<ShareGroup>>;

impl Drop for ShareGroup {
    /// The last context using the group is gone, so its host objects go too.
    /// Buffers never reached the host, and a texture bound to an EGLImage
    /// names the image's texture, which isn't ours to delete.
    fn drop(&mut self) {
        for (index, ty) in [
            NamedObjectType::Texture,
            NamedObjectType::Renderbuffer,
            NamedObjectType::Framebuffer,
            NamedObjectType::Shader,
        ]
        .into_iter()
        .map(|ty| (ty.index(), ty))
        {
            for (&local, &global) in &self.name_spaces[index].local_to_global {
                if global == 0 {
                    continue;
                }
                let data = self.objects.get(&(ty, local));
                unsafe {
                    match (ty, data) {
                        (NamedObjectType::Texture, Some(ObjectData::Texture(texture)))
                            if texture.source_egl_image != 0 => {}
                        (NamedObjectType::Texture, _) => self.host.DeleteTextures(1, &global),
                        (NamedObjectType::Renderbuffer, _) => {
                            self.host.DeleteRenderbuffersEXT(1, &global)
                        }
                        (NamedObjectType::Framebuffer, _) => {
                            self.host.DeleteFramebuffersEXT(1, &global)
                        }
                        (_, Some(ObjectData::Program(_))) => self.host.DeleteProgram(global),
                        _ => self.host.DeleteShader(global),
                    }
                }
            }
        }
        log_dbg!("Share group destroyed");
    }
}

/// Lock a share group. A guest thread that panicked while holding the lock
/// must not take every other context in the group down with it.
pub fn lock_share_group(group: &ShareGroupPtr) -> MutexGuard<'_, ShareGroup> {
    group.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ShareGroup {
    pub fn new(host: Arc<dyn GLDispatch>) -> Self {
        ShareGroup {
            host,
            name_spaces: std::array::from_fn(|_| NameSpace::new()),
            objects: HashMap::new(),
            next_buffer_global: 0,
        }
    }

    /// Make a new host object of the given type and return its name.
    /// Shaders and programs are never created this way, since the host's
    /// create functions need arguments; they get `0` and a later
    /// [Self::replace_global_name].
    pub fn gen_global_name(&mut self, ty: NamedObjectType) -> GLuint {
        let mut name: GLuint = 0;
        match ty {
            NamedObjectType::VertexBuffer => {
                self.next_buffer_global += 1;
                name = self.next_buffer_global;
            }
            NamedObjectType::Texture => unsafe { self.host.GenTextures(1, &mut name) },
            NamedObjectType::Renderbuffer => unsafe {
                self.host.GenRenderbuffersEXT(1, &mut name)
            },
            NamedObjectType::Framebuffer => unsafe {
                self.host.GenFramebuffersEXT(1, &mut name)
            },
            NamedObjectType::Shader => (),
        }
        name
    }

    /// Register a local name and pair it with a new global name.
    ///
    /// If `local_name` is 0 or `gen_local` is set, an unused local name is
    /// picked. Otherwise `local_name` is registered as-is, unless it is
    /// already in use, in which case nothing changes. Returns the local name.
    pub fn gen_name(
        &mut self,
        ty: NamedObjectType,
        local_name: ObjectLocalName,
        gen_local: bool,
    ) -> ObjectLocalName {
        let local_name = if gen_local || local_name == 0 {
            self.name_spaces[ty.index()].unused_local_name()
        } else if self.name_spaces[ty.index()]
            .local_to_global
            .contains_key(&local_name)
        {
            return local_name;
        } else {
            local_name
        };
        let global_name = self.gen_global_name(ty);
        self.name_spaces[ty.index()]
            .local_to_global
            .insert(local_name, global_name);
        log_dbg!(
            "Generated {:?} name {} (host name {})",
            ty,
            local_name,
            global_name
        );
        local_name
    }

    /// Forget a local name and its data. The host object is not deleted here;
    /// the entry point doing the deletion is responsible for that.
    pub fn delete_name(&mut self, ty: NamedObjectType, local_name: ObjectLocalName) {
        self.name_spaces[ty.index()]
            .local_to_global
            .remove(&local_name);
        if let Some(ObjectData::Framebuffer(mut fb)) = self.objects.remove(&(ty, local_name)) {
            for point in super::framebuffer::AttachPoint::ALL {
                let detached = fb.take_attachment(point);
                self.release_attachment(detached);
            }
        }
    }

    /// Returns 0 if the name isn't registered.
    pub fn get_global_name(&self, ty: NamedObjectType, local_name: ObjectLocalName) -> GLuint {
        self.name_spaces[ty.index()]
            .local_to_global
            .get(&local_name)
            .copied()
            .unwrap_or(0)
    }

    /// Reverse lookup. Returns 0 if no local name maps to `global_name`.
    pub fn get_local_name(&self, ty: NamedObjectType, global_name: GLuint) -> ObjectLocalName {
        self.name_spaces[ty.index()].local_name(global_name)
    }

    /// Point an existing local name at a different host object. Does nothing
    /// if the local name isn't registered.
    pub fn replace_global_name(
        &mut self,
        ty: NamedObjectType,
        local_name: ObjectLocalName,
        global_name: GLuint,
    ) {
        if let Some(global) = self.name_spaces[ty.index()]
            .local_to_global
            .get_mut(&local_name)
        {
            *global = global_name;
        }
    }

    pub fn is_object(&self, ty: NamedObjectType, local_name: ObjectLocalName) -> bool {
        self.name_spaces[ty.index()]
            .local_to_global
            .contains_key(&local_name)
    }

    /// Attach data to an object, replacing whatever it had.
    pub fn set_object_data(
        &mut self,
        ty: NamedObjectType,
        local_name: ObjectLocalName,
        data: ObjectData,
    ) {
        self.objects.insert((ty, local_name), data);
    }

    pub fn get_object_data(
        &self,
        ty: NamedObjectType,
        local_name: ObjectLocalName,
    ) -> Option<&ObjectData> {
        self.objects.get(&(ty, local_name))
    }

    pub fn get_object_data_mut(
        &mut self,
        ty: NamedObjectType,
        local_name: ObjectLocalName,
    ) -> Option<&mut ObjectData> {
        self.objects.get_mut(&(ty, local_name))
    }

    pub(super) fn host(&self) -> &dyn GLDispatch {
        &*self.host
    }
}

/// Maps caller-chosen keys (usually the address of an EGL context) to share
/// groups, so that contexts created "sharing with" another can find its group.
pub struct ObjectNameManager {
    host: Arc<dyn GLDispatch>,
    groups: Mutex<HashMap<usize, ShareGroupPtr>>,
}

impl ObjectNameManager {
    pub fn new(host: Arc<dyn GLDispatch>) -> Self {
        ObjectNameManager {
            host,
            groups: Mutex::new(HashMap::new()),
        }
    }

    fn groups(&self) -> MutexGuard<'_, HashMap<usize, ShareGroupPtr>> {
        self.groups.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the group for `key`, creating an empty one if there is none.
    pub fn create_share_group(&self, key: usize) -> ShareGroupPtr {
        self.groups()
            .entry(key)
            .or_insert_with(|| {
                log_dbg!("New share group for {:#x}", key);
                Arc::new(Mutex::new(ShareGroup::new(self.host.clone())))
            })
            .clone()
    }

    pub fn get_share_group(&self, key: usize) -> Option<ShareGroupPtr> {
        self.groups().get(&key).cloned()
    }

    /// Make `key` refer to the same group as `existing_key`. Returns `None`
    /// if `existing_key` has no group. An existing group for `key` is kept.
    pub fn attach_share_group(&self, key: usize, existing_key: usize) -> Option<ShareGroupPtr> {
        let mut groups = self.groups();
        let group = groups.get(&existing_key)?.clone();
        Some(groups.entry(key).or_insert(group).clone())
    }

    /// Drop this manager's reference. The group itself lives on while any
    /// context still holds it.
    pub fn delete_share_group(&self, key: usize) {
        self.groups().remove(&key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gles::headless::HeadlessGL;
    use crate::gles::gles20_raw as gles20;
    use crate::gles::objects::TextureData;
    use crate::gles::program::{ProgramData, ShaderData};

    fn group() -> ShareGroup {
        ShareGroup::new(Arc::new(HeadlessGL::new()))
    }

    #[test]
    fn generated_names_are_unique_and_nonzero() {
        let mut group = group();
        let mut names = Vec::new();
        for _ in 0..50 {
            names.push(group.gen_name(NamedObjectType::Texture, 0, true));
        }
        assert!(!names.contains(&0));
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());
        for &name in &names {
            assert_ne!(group.get_global_name(NamedObjectType::Texture, name), 0);
        }
    }

    #[test]
    fn generation_skips_names_the_guest_already_took() {
        let mut group = group();
        assert_eq!(group.gen_name(NamedObjectType::Texture, 1, false), 1);
        assert_eq!(group.gen_name(NamedObjectType::Texture, 2, false), 2);
        assert_eq!(group.gen_name(NamedObjectType::Texture, 0, true), 3);
    }

    #[test]
    fn registering_a_used_name_changes_nothing() {
        let mut group = group();
        group.gen_name(NamedObjectType::Texture, 7, false);
        let global = group.get_global_name(NamedObjectType::Texture, 7);
        group.gen_name(NamedObjectType::Texture, 7, false);
        assert_eq!(group.get_global_name(NamedObjectType::Texture, 7), global);
    }

    #[test]
    fn name_spaces_are_per_type() {
        let mut group = group();
        group.gen_name(NamedObjectType::Texture, 5, false);
        assert!(group.is_object(NamedObjectType::Texture, 5));
        assert!(!group.is_object(NamedObjectType::Renderbuffer, 5));
        assert_eq!(group.get_global_name(NamedObjectType::Renderbuffer, 5), 0);
    }

    #[test]
    fn shaders_have_no_global_name_until_replaced() {
        let mut group = group();
        let name = group.gen_name(NamedObjectType::Shader, 0, true);
        assert_eq!(group.get_global_name(NamedObjectType::Shader, name), 0);
        group.replace_global_name(NamedObjectType::Shader, name, 42);
        assert_eq!(group.get_global_name(NamedObjectType::Shader, name), 42);
        assert_eq!(group.get_local_name(NamedObjectType::Shader, 42), name);
    }

    #[test]
    fn delete_removes_name_and_data() {
        let mut group = group();
        let name = group.gen_name(NamedObjectType::Texture, 0, true);
        group.set_object_data(
            NamedObjectType::Texture,
            name,
            ObjectData::Texture(TextureData::default()),
        );
        group.delete_name(NamedObjectType::Texture, name);
        assert!(!group.is_object(NamedObjectType::Texture, name));
        assert!(group
            .get_object_data(NamedObjectType::Texture, name)
            .is_none());
        // Deleting again is harmless.
        group.delete_name(NamedObjectType::Texture, name);
    }

    #[test]
    fn replace_ignores_unknown_names() {
        let mut group = group();
        group.replace_global_name(NamedObjectType::Texture, 9, 100);
        assert!(!group.is_object(NamedObjectType::Texture, 9));
    }

    #[test]
    fn manager_shares_and_detaches_groups() {
        let manager = ObjectNameManager::new(Arc::new(HeadlessGL::new()));
        let a = manager.create_share_group(1);
        assert!(Arc::ptr_eq(&a, &manager.create_share_group(1)));
        assert!(manager.attach_share_group(2, 3).is_none());
        let b = manager.attach_share_group(2, 1).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        manager.delete_share_group(1);
        assert!(manager.get_share_group(1).is_none());
        assert!(manager.get_share_group(2).is_some());
        // The context's own reference keeps the group alive.
        let name = lock_share_group(&a).gen_name(NamedObjectType::Texture, 0, true);
        assert!(lock_share_group(&b).is_object(NamedObjectType::Texture, name));
    }

    #[test]
    fn dropping_the_group_deletes_host_objects() {
        let gl = Arc::new(HeadlessGL::new());
        let mut group = ShareGroup::new(gl.clone());
        let texture = group.gen_name(NamedObjectType::Texture, 5, false);
        let framebuffer = group.gen_name(NamedObjectType::Framebuffer, 3, false);
        let renderbuffer = group.gen_name(NamedObjectType::Renderbuffer, 4, false);
        let buffer = group.gen_name(NamedObjectType::VertexBuffer, 2, false);
        let shader = group.gen_name(NamedObjectType::Shader, 0, true);
        group.replace_global_name(NamedObjectType::Shader, shader, 40);
        group.set_object_data(
            NamedObjectType::Shader,
            shader,
            ObjectData::Shader(ShaderData::new(gles20::VERTEX_SHADER)),
        );
        let program = group.gen_name(NamedObjectType::Shader, 0, true);
        group.replace_global_name(NamedObjectType::Shader, program, 41);
        group.set_object_data(
            NamedObjectType::Shader,
            program,
            ObjectData::Program(ProgramData::default()),
        );
        // A shader that never got a host object.
        group.gen_name(NamedObjectType::Shader, 0, true);

        let texture_global = group.get_global_name(NamedObjectType::Texture, texture);
        let framebuffer_global = group.get_global_name(NamedObjectType::Framebuffer, framebuffer);
        let renderbuffer_global =
            group.get_global_name(NamedObjectType::Renderbuffer, renderbuffer);
        assert_ne!(group.get_global_name(NamedObjectType::VertexBuffer, buffer), 0);
        gl.clear_calls();
        drop(group);

        assert_eq!(
            gl.calls_named("DeleteTextures"),
            [format!("n=1 names=[{}]", texture_global)]
        );
        assert_eq!(
            gl.calls_named("DeleteFramebuffersEXT"),
            [format!("n=1 names=[{}]", framebuffer_global)]
        );
        assert_eq!(
            gl.calls_named("DeleteRenderbuffersEXT"),
            [format!("n=1 names=[{}]", renderbuffer_global)]
        );
        assert_eq!(gl.calls_named("DeleteShader"), ["shader=40"]);
        assert_eq!(gl.calls_named("DeleteProgram"), ["program=41"]);
    }

    #[test]
    fn egl_image_textures_are_not_deleted_with_the_group() {
        let gl = Arc::new(HeadlessGL::new());
        let mut group = ShareGroup::new(gl.clone());
        let texture = group.gen_name(NamedObjectType::Texture, 0, true);
        group.replace_global_name(NamedObjectType::Texture, texture, 99);
        let mut data = TextureData::default();
        data.source_egl_image = 1;
        group.set_object_data(NamedObjectType::Texture, texture, ObjectData::Texture(data));
        gl.clear_calls();
        drop(group);
        assert!(gl.calls_named("DeleteTextures").is_empty());
    }

    #[test]
    fn group_outlives_manager_until_last_context() {
        let gl = Arc::new(HeadlessGL::new());
        let manager = ObjectNameManager::new(gl.clone());
        let group = manager.create_share_group(1);
        lock_share_group(&group).gen_name(NamedObjectType::Texture, 5, false);
        manager.delete_share_group(1);
        assert!(gl.calls_named("DeleteTextures").is_empty());
        drop(group);
        assert_eq!(gl.calls_named("DeleteTextures").len(), 1);
    }
}
