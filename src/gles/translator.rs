/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */
//! The interface between the translator and the EGL layer above it.
//!
//! The EGL layer implements [EGLiface] and hands it to
//! [GLESiface::init_gles], which gives back the object it creates, shares and
//! destroys contexts through. Making a context current is per thread
//! ([make_current]), and the exported `gl*` functions act on whatever context
//! is current on the calling thread.

use super::context::GLESv2Context;
use super::dispatch::GLDispatch;
use super::gles20_raw as gles20;
use super::object_names::{ObjectNameManager, ShareGroupPtr};
use super::objects::{EglImage, EglImageHandle};
use crate::options::{process_options, Options};
use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// What the translator needs from the EGL layer.
pub trait EGLiface: Send + Sync {
    /// The host GL implementation. A real EGL layer builds this with
    /// [super::dispatch::HostGL::load_with] from its symbol resolver.
    fn get_gl_library(&self) -> Result<Arc<dyn GLDispatch>, String>;

    /// Start using an EGLImage. [None] if `image` isn't a valid image.
    fn attach_egl_image(&self, image: EglImageHandle) -> Option<EglImage>;

    /// Stop using an EGLImage previously attached.
    fn detach_egl_image(&self, image: EglImageHandle);
}

pub type ContextPtr = Arc<Mutex<GLESv2Context>>;

/// The translator as seen by the EGL layer.
pub struct GLESiface {
    egl: Arc<dyn EGLiface>,
    host: Arc<dyn GLDispatch>,
    share_groups: ObjectNameManager,
    options: Options,
}

/// The first interface created, used for calls that must work without a
/// current context.
static DEFAULT_IFACE: OnceLock<Arc<GLESiface>> = OnceLock::new();

impl GLESiface {
    /// Load the host GL library through `egl` and set up the translator.
    pub fn init_gles(egl: Arc<dyn EGLiface>) -> Result<Arc<GLESiface>, String> {
        let host = egl
            .get_gl_library()
            .map_err(|e| format!("Couldn't load the host GL library: {}", e))?;
        let iface = Arc::new(GLESiface {
            egl,
            host: host.clone(),
            share_groups: ObjectNameManager::new(host),
            options: process_options().clone(),
        });
        if DEFAULT_IFACE.set(iface.clone()).is_ok() {
            log_dbg!("GLES translator initialized");
        }
        Ok(iface)
    }

    pub fn share_groups(&self) -> &ObjectNameManager {
        &self.share_groups
    }

    pub fn host(&self) -> &Arc<dyn GLDispatch> {
        &self.host
    }

    fn new_context(&self) -> GLESv2Context {
        GLESv2Context::new(self.host.clone(), Some(self.egl.clone()), &self.options)
    }

    pub fn create_gles_context(&self) -> ContextPtr {
        let ctx = Arc::new(Mutex::new(self.new_context()));
        log_dbg!("Created context {:?}", Arc::as_ptr(&ctx));
        ctx
    }

    /// Finish setting up a context the first time it is made current. This
    /// creates the default textures, so `ctx` must be current on this thread
    /// with the host context ready. Later calls do nothing.
    pub fn init_context(&self, ctx: &ContextPtr, share_group: Option<ShareGroupPtr>) {
        let mut ctx = lock_context(ctx);
        if ctx.init(share_group) {
            unsafe {
                ctx.BindTexture(gles20::TEXTURE_2D, 0);
                ctx.BindTexture(gles20::TEXTURE_CUBE_MAP, 0);
            }
        }
    }

    /// Destroy a context. If it is current on this thread, nothing is current
    /// afterwards.
    pub fn delete_gles_context(&self, ctx: ContextPtr) {
        CURRENT.with(|current| {
            let mut current = current.borrow_mut();
            if current.as_ref().is_some_and(|c| Arc::ptr_eq(c, &ctx)) {
                *current = None;
            }
        });
        log_dbg!("Deleting context {:?}", Arc::as_ptr(&ctx));
    }

    pub fn set_share_group(&self, ctx: &ContextPtr, share_group: Option<ShareGroupPtr>) {
        lock_context(ctx).set_share_group(share_group);
    }

    pub fn flush(&self) {
        unsafe { self.host.Flush() }
    }

    pub fn finish(&self) {
        unsafe { self.host.Finish() }
    }

    /// Extension entry points, by name. Null for anything unknown.
    pub fn get_proc_address(&self, name: &str) -> *const c_void {
        let address = proc_table().get(name).copied().unwrap_or(0);
        log_dbg!("get_proc_address({:?}) => {:#x}", name, address);
        address as *const c_void
    }
}

/// Filled on first use and never changed afterwards.
fn proc_table() -> &'static HashMap<&'static str, usize> {
    static PROC_TABLE: OnceLock<HashMap<&'static str, usize>> = OnceLock::new();
    PROC_TABLE.get_or_init(|| {
        HashMap::from([
            (
                "glEGLImageTargetTexture2DOES",
                super::exports::glEGLImageTargetTexture2DOES as *const () as usize,
            ),
            (
                "glEGLImageTargetRenderbufferStorageOES",
                super::exports::glEGLImageTargetRenderbufferStorageOES as *const () as usize,
            ),
        ])
    })
}

fn lock_context(ctx: &ContextPtr) -> std::sync::MutexGuard<'_, GLESv2Context> {
    ctx.lock().unwrap_or_else(PoisonError::into_inner)
}

thread_local! {
    static CURRENT: RefCell<Option<ContextPtr>> = const { RefCell::new(None) };
}

/// Make `ctx` current on this thread, replacing whatever was.
pub fn make_current(ctx: Option<ContextPtr>) {
    CURRENT.with(|current| *current.borrow_mut() = ctx);
}

pub fn current() -> Option<ContextPtr> {
    CURRENT.with(|current| current.borrow().clone())
}

/// Run `f` on this thread's current context. [None] if there isn't one.
pub fn with_current<R>(f: impl FnOnce(&mut GLESv2Context) -> R) -> Option<R> {
    let ctx = current()?;
    let mut ctx = lock_context(&ctx);
    Some(f(&mut ctx))
}

/// Like [with_current], but with no current context, `f` gets a fresh
/// context with no share group. Queries like `glGetIntegerv` must work even
/// then. [None] if the translator was never initialized.
pub fn with_current_or_throwaway<R>(f: impl FnOnce(&mut GLESv2Context) -> R) -> Option<R> {
    if let Some(ctx) = current() {
        let mut ctx = lock_context(&ctx);
        return Some(f(&mut ctx));
    }
    let iface = DEFAULT_IFACE.get()?;
    let mut ctx = iface.new_context();
    ctx.init(None);
    Some(f(&mut ctx))
}
