use crate::core::flags::Extension;
use crate::core::hardware::FeatureDetector;
use crate::cpuid::CpuidSource;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionStatus {
    pub name: &'static str,
    /// Where the CPU reports it, e.g. `leaf1.ecx[28]`.
    pub source: String,
    /// Raw cached bit.
    pub set: bool,
    /// Usable. Differs from `set` only for AVX when the OS has not enabled YMM state.
    pub supported: bool,
}

/// Serializable view of a detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub brand: String,
    pub max_basic_leaf: u32,
    pub max_extended_leaf: u32,
    pub primary_mask: u16,
    pub secondary_mask: u16,
    pub extensions: Vec<ExtensionStatus>,
}

impl Report {
    /// Snapshot `detector`. The brand is trimmed with the detector's own trim set.
    pub fn collect<S: CpuidSource>(detector: &FeatureDetector<S>) -> Self {
        let snapshot = detector.snapshot();
        let extensions = Extension::ALL
            .iter()
            .map(|&ext| {
                let src = ext.source();
                let leaf = if ext.is_primary() { "leaf1" } else { "ext1" };
                ExtensionStatus {
                    name: ext.name(),
                    source: format!("{}.{}[{}]", leaf, src.register.name(), src.bit),
                    set: snapshot.contains(ext),
                    supported: detector.has(ext),
                }
            })
            .collect();

        Self {
            brand: detector.brand_string(),
            max_basic_leaf: snapshot.max_basic_leaf(),
            max_extended_leaf: snapshot.max_extended_leaf(),
            primary_mask: snapshot.primary().bits(),
            secondary_mask: snapshot.secondary().bits(),
            extensions,
        }
    }

    pub fn supported_names(&self) -> Vec<&'static str> {
        self.extensions.iter().filter(|e| e.supported).map(|e| e.name).collect()
    }

    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        tracing::debug!(path = %path.display(), "wrote report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpuid::sim::SimCpuid;
    use tempfile::NamedTempFile;

    fn sample() -> FeatureDetector<SimCpuid> {
        // SSE3 + AVX bit + OSXSAVE, MMX; SSE4a; XCR0 without YMM.
        let sim = SimCpuid::new(1 << 0 | 1 << 28 | 1 << 27, 1 << 23, 1 << 6, 0)
            .with_xcr0(0x2)
            .with_brand(" Test CPU ");
        FeatureDetector::with_source(sim)
    }

    #[test]
    fn test_collect() {
        let report = Report::collect(&sample());
        assert_eq!(report.brand, "Test CPU");
        assert_eq!(report.extensions.len(), Extension::ALL.len());
        assert_eq!(report.primary_mask, 0x0001 | 0x0008 | 0x0100);
        assert_eq!(report.secondary_mask, 0x0008);
        assert_eq!(report.supported_names(), vec!["MMX", "SSE3", "SSE4a"]);

        let avx = report.extensions.iter().find(|e| e.name == "AVX").unwrap();
        assert!(avx.set);
        assert!(!avx.supported);
        assert_eq!(avx.source, "leaf1.ecx[28]");

        let sse4a = report.extensions.iter().find(|e| e.name == "SSE4a").unwrap();
        assert_eq!(sse4a.source, "ext1.ecx[6]");
    }

    #[test]
    fn test_write_json() -> Result<(), Box<dyn std::error::Error>> {
        let report = Report::collect(&sample());
        let temp_file = NamedTempFile::new()?;
        report.write_json(temp_file.path())?;

        let text = std::fs::read_to_string(temp_file.path())?;
        let value: serde_json::Value = serde_json::from_str(&text)?;
        assert_eq!(value["brand"], "Test CPU");
        assert_eq!(value["extensions"].as_array().map(|a| a.len()), Some(14));
        for ext in Extension::ALL {
            assert!(text.contains(&format!("\"{}\"", ext.name())), "missing {}", ext);
        }
        Ok(())
    }

    #[test]
    fn test_collect_uses_detector_trim() {
        let report = Report::collect(&sample().with_trim(&[' ', 'U']));
        assert_eq!(report.brand, "Test CP");
    }

    #[test]
    fn test_write_json_bad_path() {
        let report = Report::collect(&sample());
        let err = report.write_json(Path::new("/nonexistent-dir/report.json")).unwrap_err();
        assert!(matches!(err, ReportError::Io(_)));
    }
}
