// Background fetch and decode of card and viewer images
// Worker threads pull URLs off a bounded queue, fetch the bytes and decode
// them to RGBA; results come back over a channel drained on the GTK main
// loop. Requests for a URL already in flight attach a waiter instead of
// fetching twice, and decoded textures are LRU-cached per size class.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::num::NonZeroUsize;
use std::rc::Rc;
use std::time::Duration;

use gdk4::{MemoryFormat, MemoryTexture, Texture};
use glib::prelude::*;
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, GenericImageView, ImageFormat};
use lru::LruCache;
use once_cell::sync::Lazy;
use tracing::{debug, warn};

const LOADER_THREADS: usize = 4;
const LOADER_QUEUE: usize = 128;
const CACHE_ENTRIES: usize = 512;
const RESULT_POLL_MS: u64 = 16;
/// Fetches larger than this are dropped rather than decoded.
const MAX_FETCH_BYTES: usize = 32 * 1024 * 1024;

static FETCH_CLIENT: Lazy<reqwest::blocking::Client> = Lazy::new(|| {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .expect("image fetch client")
});

/// Decode size class: cards get a bounded preview, the viewer gets the
/// full image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadKind {
    Preview,
    Full,
}

impl LoadKind {
    fn max_edge(self) -> u32 {
        match self {
            LoadKind::Preview => 640,
            LoadKind::Full => 4096,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LoadKey {
    url: String,
    kind: LoadKind,
}

struct FetchRequest {
    key: LoadKey,
}

struct FetchResult {
    key: LoadKey,
    rgba: Option<(Vec<u8>, u32, u32)>,
}

type TextureCallback = Box<dyn FnOnce(Option<&Texture>)>;

struct LoaderState {
    pending: HashSet<LoadKey>,
    waiters: HashMap<LoadKey, Vec<TextureCallback>>,
    cache: LruCache<LoadKey, Texture>,
}

/// Main-thread facade over the worker pool. One instance per UI thread.
pub struct TextureLoader {
    request_tx: flume::Sender<FetchRequest>,
    result_rx: flume::Receiver<FetchResult>,
    state: RefCell<LoaderState>,
}

thread_local! {
    static TEXTURE_LOADER: Rc<TextureLoader> = TextureLoader::new();
}

pub fn texture_loader() -> Rc<TextureLoader> {
    TEXTURE_LOADER.with(Rc::clone)
}

impl TextureLoader {
    fn new() -> Rc<Self> {
        let (request_tx, request_rx) = flume::bounded::<FetchRequest>(LOADER_QUEUE);
        let (result_tx, result_rx) = flume::unbounded::<FetchResult>();

        for _ in 0..LOADER_THREADS {
            let rx = request_rx.clone();
            let tx = result_tx.clone();
            std::thread::spawn(move || {
                while let Ok(request) = rx.recv() {
                    let rgba = fetch_and_decode(&request.key);
                    let _ = tx.send(FetchResult {
                        key: request.key,
                        rgba,
                    });
                }
            });
        }

        let loader = Rc::new(Self {
            request_tx,
            result_rx,
            state: RefCell::new(LoaderState {
                pending: HashSet::new(),
                waiters: HashMap::new(),
                cache: LruCache::new(NonZeroUsize::new(CACHE_ENTRIES).expect("cache capacity")),
            }),
        });

        let loader_weak = Rc::downgrade(&loader);
        glib::timeout_add_local(Duration::from_millis(RESULT_POLL_MS), move || {
            if let Some(loader) = loader_weak.upgrade() {
                loader.process_results();
                glib::ControlFlow::Continue
            } else {
                glib::ControlFlow::Break
            }
        });

        loader
    }

    /// Requests a texture; the callback runs later on the main loop, with
    /// `None` when the fetch or decode failed. Cached textures are still
    /// delivered asynchronously so callers never re-enter mid-layout.
    pub fn request<F>(&self, url: &str, kind: LoadKind, callback: F)
    where
        F: FnOnce(Option<&Texture>) + 'static,
    {
        let key = LoadKey {
            url: url.to_string(),
            kind,
        };

        let mut state = self.state.borrow_mut();
        if let Some(texture) = state.cache.get(&key).cloned() {
            drop(state);
            glib::idle_add_local_once(move || callback(Some(&texture)));
            return;
        }

        state.waiters.entry(key.clone()).or_default().push(Box::new(callback));
        if !state.pending.contains(&key) {
            match self.request_tx.try_send(FetchRequest { key: key.clone() }) {
                Ok(()) => {
                    state.pending.insert(key);
                }
                Err(_) => {
                    // Queue saturated; a later scroll tick will retry.
                    debug!(url, "Image fetch queue full, dropping request");
                    state.waiters.remove(&key);
                }
            }
        }
    }

    fn process_results(&self) {
        loop {
            let result = match self.result_rx.try_recv() {
                Ok(result) => result,
                Err(_) => break,
            };

            let (waiters, texture) = {
                let mut state = self.state.borrow_mut();
                state.pending.remove(&result.key);
                let waiters = state.waiters.remove(&result.key).unwrap_or_default();
                let texture = result
                    .rgba
                    .and_then(|(rgba, w, h)| texture_from_rgba(rgba, w, h));
                if let Some(texture) = &texture {
                    state.cache.put(result.key.clone(), texture.clone());
                }
                (waiters, texture)
            };

            // State borrow released: waiters may issue fresh requests.
            for callback in waiters {
                callback(texture.as_ref());
            }
        }
    }
}

fn fetch_and_decode(key: &LoadKey) -> Option<(Vec<u8>, u32, u32)> {
    let resp = match FETCH_CLIENT.get(&key.url).send() {
        Ok(resp) => resp,
        Err(err) => {
            warn!(url = %key.url, error = %err, "Image fetch failed");
            return None;
        }
    };
    if !resp.status().is_success() {
        warn!(url = %key.url, status = %resp.status(), "Image fetch rejected");
        return None;
    }
    let bytes = resp.bytes().ok()?;
    if bytes.len() > MAX_FETCH_BYTES {
        warn!(url = %key.url, len = bytes.len(), "Image too large, skipping");
        return None;
    }
    decode_rgba(&bytes, key.kind.max_edge())
}

/// Decodes fetched bytes to RGBA, downscaling to `max_edge` on the longest
/// side. Animated GIFs decode to their first frame.
fn decode_rgba(bytes: &[u8], max_edge: u32) -> Option<(Vec<u8>, u32, u32)> {
    let format = image::guess_format(bytes).ok();

    let decoded = if format == Some(ImageFormat::Gif) {
        let decoder = GifDecoder::new(Cursor::new(bytes)).ok()?;
        let frame = decoder.into_frames().next()?.ok()?;
        DynamicImage::ImageRgba8(frame.into_buffer())
    } else {
        match format {
            Some(format) => image::load_from_memory_with_format(bytes, format).ok()?,
            None => image::load_from_memory(bytes).ok()?,
        }
    };

    let decoded = if decoded.width().max(decoded.height()) > max_edge {
        decoded.thumbnail(max_edge, max_edge)
    } else {
        decoded
    };

    let (width, height) = decoded.dimensions();
    Some((decoded.into_rgba8().into_raw(), width, height))
}

fn texture_from_rgba(rgba: Vec<u8>, width: u32, height: u32) -> Option<Texture> {
    if width == 0 || height == 0 {
        return None;
    }
    let expected = (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(4);
    if rgba.len() < expected {
        return None;
    }
    let bytes = glib::Bytes::from_owned(rgba);
    let texture = MemoryTexture::new(
        width as i32,
        height as i32,
        MemoryFormat::R8g8b8a8,
        &bytes,
        (width * 4) as usize,
    );
    Some(texture.upcast())
}
