use crate::error::ChartError;
use crate::models::ChartSpec;
use crate::viz::raster;
use crate::{refs, schema};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Output formats, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FigureFormat {
    Svg,
    Png,
    Pdf,
}

impl FigureFormat {
    pub fn from_path(path: &Path) -> Result<Self, ChartError> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "pdf" => Ok(Self::Pdf),
            _ => Err(ChartError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Load a chart description: resolve `$ref`s, validate, apply defaults.
pub fn load_chart<P: AsRef<Path>>(path: P) -> Result<ChartSpec> {
    let path = path.as_ref();
    let doc = refs::load_json(path).with_context(|| format!("loading {}", path.display()))?;
    parse_chart(&doc).with_context(|| format!("in {}", path.display()))
}

/// Validate an already-resolved JSON document and deserialize it.
pub fn parse_chart(doc: &serde_json::Value) -> Result<ChartSpec> {
    schema::validate(doc)?;
    let spec: ChartSpec = serde_json::from_value(doc.clone()).context("decoding chart")?;
    log::info!("loaded chart with {} bar(s)", spec.bars.len());
    Ok(spec)
}

/// Write a rendered SVG document to `path` as SVG, PNG or PDF.
/// The format is checked before anything is written.
pub fn save_figure<P: AsRef<Path>>(svg: &str, path: P) -> Result<()> {
    let path = path.as_ref();
    let bytes = match FigureFormat::from_path(path)? {
        FigureFormat::Svg => svg.as_bytes().to_vec(),
        FigureFormat::Png => raster::svg_to_png(svg)?,
        FigureFormat::Pdf => raster::svg_to_pdf(svg)?,
    };
    let mut f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    f.write_all(&bytes)?;
    log::info!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4" viewBox="0 0 4 4"><rect width="4" height="4" fill="red"/></svg>"#;

    #[test]
    fn format_from_extension() {
        assert_eq!(FigureFormat::from_path(Path::new("a.svg")).unwrap(), FigureFormat::Svg);
        assert_eq!(FigureFormat::from_path(Path::new("a.PNG")).unwrap(), FigureFormat::Png);
        assert_eq!(FigureFormat::from_path(Path::new("dir/a.pdf")).unwrap(), FigureFormat::Pdf);
        assert!(matches!(
            FigureFormat::from_path(Path::new("a.jpg")),
            Err(ChartError::UnsupportedFormat(_))
        ));
        assert!(FigureFormat::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn save_each_format() {
        let dir = tempdir().unwrap();
        for (name, magic) in [
            ("x.svg", &b"<svg"[..]),
            ("x.png", &b"\x89PNG"[..]),
            ("x.pdf", &b"%PDF-"[..]),
        ] {
            let p = dir.path().join(name);
            save_figure(SVG, &p).unwrap();
            let bytes = std::fs::read(&p).unwrap();
            assert!(bytes.starts_with(magic), "{name}");
        }
    }

    #[test]
    fn unsupported_extension_writes_nothing() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("x.gif");
        let err = save_figure(SVG, &p).unwrap_err();
        assert!(err.downcast_ref::<ChartError>().is_some());
        assert!(!p.exists());
    }

    #[test]
    fn load_applies_defaults() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("chart.json");
        std::fs::write(
            &p,
            r#"{"bars": {"Total": {"labels": ["A"], "values": [1], "colors": ["Red"]}}}"#,
        )
        .unwrap();
        let spec = load_chart(&p).unwrap();
        assert_eq!(spec.fmt, "%.2f");
        assert_eq!(spec.fig.fontfamily, "sans-serif");
        assert!(spec.bars["Total"].label_offset.is_empty());
    }

    #[test]
    fn load_reports_schema_violations() {
        let dir = tempdir().unwrap();
        let p = dir.path().join("chart.json");
        std::fs::write(&p, r#"{"bars": {}}"#).unwrap();
        let err = load_chart(&p).unwrap_err();
        assert!(err.downcast_ref::<schema::SchemaError>().is_some(), "{err:#}");
    }
}
