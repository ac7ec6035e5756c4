use scraper::{Html, Selector};

use gallery_logging::gallery_warn;

use crate::types::{CatalogBlock, GalleryScan};

#[derive(Debug, Clone)]
pub struct ExtractSettings {
    /// Class marking the single gallery region element.
    pub gallery_class: String,
    /// Class a block opener must carry, next to a non-empty `id`.
    pub block_class: String,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            gallery_class: "gallery".to_string(),
            block_class: "item".to_string(),
        }
    }
}

/// Scans the catalog markup for the gallery region and its item blocks.
///
/// Block extents are tracked with an explicit `<div>`/`</div>` depth counter
/// starting at 1 on a qualifying opener; the block ends at the closer that
/// returns the depth to 0. Openers without a qualifying class or id only
/// move the counter. A missing region or an empty region yields no blocks
/// and is not an error. A block whose depth never returns to 0 before the
/// input runs out is discarded.
pub fn scan_gallery(markup: &str, settings: &ExtractSettings) -> GalleryScan {
    // ASCII-lowercased shadow of the markup; same byte offsets, so marker
    // positions found here index into the original text.
    let lower = markup.to_ascii_lowercase();

    let Some(region) = find_region(markup, &lower, settings) else {
        return GalleryScan {
            blocks: Vec::new(),
            region: None,
        };
    };

    let mut blocks = Vec::new();
    let mut cursor = region.start;
    while let Some((pos, is_open)) = next_div_marker(&lower, cursor, region.end) {
        let Some(tag_end) = tag_close(&lower, pos, region.end) else {
            break;
        };
        if !is_open {
            cursor = tag_end;
            continue;
        }
        let opener = &markup[pos..tag_end];
        let id = opener_attr(opener, "id").unwrap_or_default();
        if id.is_empty() || !opener_has_class(opener, &settings.block_class) {
            cursor = tag_end;
            continue;
        }
        match balanced_extent(&lower, tag_end, region.end) {
            Some((_, block_end)) => {
                let raw = &markup[pos..block_end];
                blocks.push(CatalogBlock {
                    id,
                    raw: raw.to_string(),
                    image_source: first_image_source(raw),
                });
                cursor = block_end;
            }
            None => {
                gallery_warn!("catalog block '{id}' never closes; partial block discarded");
                break;
            }
        }
    }

    GalleryScan {
        blocks,
        region: Some(region),
    }
}

/// Locates the inner content range of the first element whose class list
/// contains the gallery class. An unterminated region runs to end of input.
fn find_region(
    markup: &str,
    lower: &str,
    settings: &ExtractSettings,
) -> Option<std::ops::Range<usize>> {
    let mut cursor = 0;
    while let Some((pos, is_open)) = next_div_marker(lower, cursor, lower.len()) {
        let tag_end = tag_close(lower, pos, lower.len())?;
        if is_open && opener_has_class(&markup[pos..tag_end], &settings.gallery_class) {
            let inner_end = match balanced_extent(lower, tag_end, lower.len()) {
                Some((closer_start, _)) => closer_start,
                None => lower.len(),
            };
            return Some(tag_end..inner_end);
        }
        cursor = tag_end;
    }
    None
}

/// Finds the matching closer for an opener whose `>` sits at `from`.
/// Returns the closing tag's start and one-past-end positions.
fn balanced_extent(lower: &str, from: usize, bound: usize) -> Option<(usize, usize)> {
    let mut depth = 1usize;
    let mut cursor = from;
    while let Some((pos, is_open)) = next_div_marker(lower, cursor, bound) {
        let tag_end = tag_close(lower, pos, bound)?;
        if is_open {
            depth += 1;
        } else {
            depth -= 1;
            if depth == 0 {
                return Some((pos, tag_end));
            }
        }
        cursor = tag_end;
    }
    None
}

/// Next `<div` or `</div` marker in `lower[from..bound]`; true means opener.
fn next_div_marker(lower: &str, from: usize, bound: usize) -> Option<(usize, bool)> {
    let bytes = lower.as_bytes();
    let mut i = from;
    while i < bound {
        if bytes[i] == b'<' {
            let rest = &lower[i..bound];
            if rest.starts_with("</div") && marker_boundary(bytes, i + 5) {
                return Some((i, false));
            }
            if rest.starts_with("<div") && marker_boundary(bytes, i + 4) {
                return Some((i, true));
            }
        }
        i += 1;
    }
    None
}

// Keeps `<divider>` and friends from counting as div markers.
fn marker_boundary(bytes: &[u8], idx: usize) -> bool {
    match bytes.get(idx) {
        None => true,
        Some(b) => b.is_ascii_whitespace() || *b == b'>' || *b == b'/',
    }
}

fn tag_close(lower: &str, pos: usize, bound: usize) -> Option<usize> {
    lower[pos..bound].find('>').map(|i| pos + i + 1)
}

/// Reads an attribute off an opener tag by parsing it as an HTML fragment.
fn opener_attr(opener: &str, name: &str) -> Option<String> {
    let fragment = Html::parse_fragment(opener);
    let selector = Selector::parse("div").ok()?;
    let element = fragment.select(&selector).next()?;
    element.value().attr(name).map(|v| v.trim().to_string())
}

fn opener_has_class(opener: &str, class: &str) -> bool {
    opener_attr(opener, "class")
        .map(|value| {
            value
                .split_whitespace()
                .any(|token| token.eq_ignore_ascii_case(class))
        })
        .unwrap_or(false)
}

/// First `<img src>` inside the block, or empty.
fn first_image_source(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    let Ok(selector) = Selector::parse("img") else {
        return String::new();
    };
    fragment
        .select(&selector)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|src| src.trim().to_string())
        .unwrap_or_default()
}
