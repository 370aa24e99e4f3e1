//! Responsive email markup generation.
//!
//! Rendering is a pure function of the ordered published assets and the
//! source image dimensions: no I/O, no network, byte-identical output for
//! identical input. Each slice becomes a block sized in percentage units
//! derived from its region's share of the source image, so the composite
//! stays proportional across viewport widths.

use crate::map::Region;
use crate::publish::PublishedAsset;

/// Escape HTML special characters in user-controlled text.
pub fn html_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

/// Percentage of the total width a region occupies, to 2 decimal places.
pub fn width_percent(region: &Region, total_width: u32) -> f64 {
    if total_width == 0 {
        return 0.0;
    }
    let pct = region.width() as f64 / f64::from(total_width) * 100.0;
    (pct * 100.0).round() / 100.0
}

/// Percentage of the total height a region occupies, to 2 decimal places.
pub fn height_percent(region: &Region, total_height: u32) -> f64 {
    if total_height == 0 {
        return 0.0;
    }
    let pct = region.height() as f64 / f64::from(total_height) * 100.0;
    (pct * 100.0).round() / 100.0
}

/// Render the responsive email document reassembling the published slices.
///
/// Slices with a link target are wrapped in an anchor; slices without one
/// render as plain image blocks. Images carry an `aspect-ratio` hint so an
/// unreachable URL still reserves a correctly proportioned placeholder,
/// with alt text taken from the region label.
pub fn render_email_html(assets: &[PublishedAsset], total_width: u32, total_height: u32) -> String {
    let mut blocks = String::new();
    for (i, asset) in assets.iter().enumerate() {
        blocks.push_str(&render_slice_block(asset, total_width, i));
        blocks.push('\n');
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0, user-scalable=yes">
<meta http-equiv="X-UA-Compatible" content="IE=edge">
<title>Responsive Email Template</title>
<style>
* {{ margin: 0; padding: 0; box-sizing: border-box; }}
body {{
  margin: 0; padding: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Arial, sans-serif;
  background-color: #f5f5f5; -webkit-text-size-adjust: 100%; -ms-text-size-adjust: 100%;
}}
.email-container {{ width: 100%; max-width: 600px; margin: 0 auto; background: #fff; font-size: 0; }}
.image-section {{ display: inline-block; vertical-align: top; text-decoration: none; border: 0; outline: none; }}
.image-section img {{ width: 100%; height: auto; display: block; border: 0; outline: none; -ms-interpolation-mode: bicubic; }}
@media (max-width: 599px) {{
  .email-container {{ width: 100% !important; max-width: 100% !important; margin: 0 !important; }}
}}
@media (min-width: 600px) {{ .email-container {{ width: 600px !important; max-width: 600px !important; }} }}
@media (prefers-color-scheme: dark) {{ body {{ background-color: #1a1a1a; }} .email-container {{ background-color: #2d2d2d; }} }}
</style>
</head>
<body>
  <div class="email-container" data-source-size="{total_width}x{total_height}">
{blocks}  </div>
</body>
</html>
"#
    )
}

/// Render one slice as an inline block sized by its width share.
fn render_slice_block(asset: &PublishedAsset, total_width: u32, position: usize) -> String {
    let region = &asset.region;
    let wpct = width_percent(region, total_width);

    let src = html_escape(&asset.url);
    let alt = html_escape(
        region
            .alt
            .as_deref()
            .unwrap_or(&format!("Slice {}", region.index + 1)),
    );
    let title_attr = match &region.title {
        Some(title) => format!(r#" title="{}""#, html_escape(title)),
        None => String::new(),
    };
    // Defer offscreen slices, but never the first one.
    let loading_attr = if position > 0 { r#" loading="lazy""# } else { "" };

    let img = format!(
        r#"<img src="{src}" alt="{alt}"{title_attr}{loading_attr} style="width:100%;height:auto;display:block;border:0;aspect-ratio:{aw} / {ah};">"#,
        aw = region.width(),
        ah = region.height(),
    );

    match &region.href {
        Some(href) => format!(
            r#"    <a href="{href}" class="image-section" target="_blank" rel="noopener noreferrer" style="display:inline-block;width:{wpct:.2}%;vertical-align:top;">{img}</a>"#,
            href = html_escape(href),
        ),
        None => format!(
            r#"    <div class="image-section" style="display:inline-block;width:{wpct:.2}%;vertical-align:top;">{img}</div>"#
        ),
    }
}
