//! SVG wrapper around a page PNG.
//!
//! The page stays a raster; the SVG only gives it physical A4 dimensions.

use crate::assets::png_data_uri;
use crate::paper::PaperConfig;

/// Wrap PNG bytes in an SVG document sized to the paper in millimetres.
pub fn wrap_png(png: &[u8], paper: &PaperConfig) -> String {
    let (w, h) = (paper.width_mm, paper.height_mm);
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" "#,
            r#"width="{w}mm" height="{h}mm" viewBox="0 0 {w} {h}">"#,
            "\n",
            r#"  <image x="0" y="0" width="{w}" height="{h}" xlink:href="{href}" />"#,
            "\n</svg>\n"
        ),
        w = w,
        h = h,
        href = png_data_uri(png),
    )
}
