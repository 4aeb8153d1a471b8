//! Gallery image discovery.
//!
//! [`images_in`] is the helper page templates call to fill a gallery: it walks
//! a static prefix through the [`StaticStorage`] abstraction, keeps image
//! files, and returns their public URLs as a JSON array ready to drop into the
//! page.
//!
//! A directory that cannot be listed, whether missing or failing, contributes
//! nothing. A gallery for an unknown prefix therefore renders empty rather than
//! failing the whole page.

use maud::PreEscaped;

use crate::storage::{child_path, StaticStorage};

/// File name endings recognised as images, compared against the lowercased name.
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg"];

/// Whether `name` ends with one of [`IMAGE_EXTENSIONS`], ignoring case.
pub fn is_image_file(name: &str) -> bool {
    let lower = name.to_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Sorted public URLs of every image at any depth under `prefix`.
///
/// Leading and trailing slashes of `prefix` are ignored, so `/images/x/` and
/// `images/x` are the same gallery.
pub fn image_urls<S: StaticStorage + ?Sized>(storage: &S, prefix: &str) -> Vec<String> {
    let prefix = prefix.trim_matches('/');
    let mut urls = collect(storage, prefix);
    urls.sort();
    urls
}

/// Image URLs under `prefix` as a JSON array, marked safe for direct embedding.
///
/// `<`, `>` and `&` are emitted as JSON unicode escapes (`\u003c` and so on), so the
/// array can sit inside a `<script>` element and still parse to the same strings.
pub fn images_in<S: StaticStorage + ?Sized>(storage: &S, prefix: &str) -> PreEscaped<String> {
    PreEscaped(to_embeddable_json(&image_urls(storage, prefix)))
}

fn collect<S: StaticStorage + ?Sized>(storage: &S, dir: &str) -> Vec<String> {
    let listing = match storage.list_children(dir) {
        Ok(listing) => listing,
        Err(_) => return Vec::new(),
    };

    let here = listing
        .files
        .iter()
        .filter(|name| is_image_file(name))
        .map(|name| storage.url(&child_path(dir, name)));

    let nested = listing
        .directories
        .iter()
        .flat_map(|name| collect(storage, &child_path(dir, name)));

    here.chain(nested).collect()
}

fn to_embeddable_json(urls: &[String]) -> String {
    serde_json::Value::from(urls.to_vec())
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}
