//! Rendering under memory pressure.
//!
//! The global allocator here refuses large requests while a limit is set,
//! so this file holds a single test: a concurrently running test would see
//! its own allocations fail.

use taskrt::log::Level;
use taskrt::{Error, ErrorKind, Verbosity};

use std::alloc::{GlobalAlloc, Layout, System};
use std::fmt;
use std::ptr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

struct Limited;

static LIMIT: AtomicUsize = AtomicUsize::new(usize::MAX);

unsafe impl GlobalAlloc for Limited {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.size() > LIMIT.load(Ordering::SeqCst) {
            return ptr::null_mut();
        }

        // Safety: forwarded unchanged to the system allocator.
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // Safety: `ptr` was handed out by `System.alloc` with this layout.
        unsafe { System.dealloc(ptr, layout) }
    }
}

#[global_allocator]
static GLOBAL: Limited = Limited;

struct Counted {
    text: String,
    drops: Arc<AtomicUsize>,
}

impl fmt::Display for Counted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Drop for Counted {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

fn wide_chain(nodes: usize, drops: &Arc<AtomicUsize>) -> Error {
    let layer = |i: usize| Counted {
        text: format!("layer {i} ").repeat(12),
        drops: drops.clone(),
    };

    let mut error = Error::leaf(ErrorKind::Task, layer(0));
    for i in 1..nodes {
        error = error.context(layer(i));
    }

    error
}

#[test]
fn test_render_degrades_when_allocation_fails() {
    let drops = Arc::new(AtomicUsize::new(0));
    let wide = wide_chain(6, &drops);
    let logged = wide_chain(6, &drops);
    let short = Error::msg("short").context("still short");

    LIMIT.store(300, Ordering::SeqCst);

    let wide_text = wide.try_render(Verbosity::CHAIN);
    let short_text = short.try_render(Verbosity::CHAIN);
    logged.log_and_free(Level::Error, Verbosity::CHAIN);

    LIMIT.store(usize::MAX, Ordering::SeqCst);

    assert!(wide_text.is_none(), "A render that cannot grow must give up");
    assert_eq!(short_text.as_deref(), Some("still short\n  caused by: short"));
    assert_eq!(drops.load(Ordering::SeqCst), 6, "log_and_free must still release the chain");

    drop(wide);
    assert_eq!(drops.load(Ordering::SeqCst), 12);
}
