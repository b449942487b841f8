//! Startup detection of optional rendering tools.

use std::time::Duration;

use press_config::Config;
use press_exec::probe;

/// Deadline for `--version` probes.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Which backends and diagram methods may be used.
///
/// Built once at startup and shared read-only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct BackendCapabilities {
    /// HTML/CSS PDF engine (`weasyprint`).
    pub html_pdf_engine: bool,
    /// genpdf with loadable fonts.
    pub direct_pdf: bool,
    pub pandoc: bool,
    /// docx-rs.
    pub direct_docx: bool,
    /// Mermaid CLI (`mmdc`).
    pub diagram_cli: bool,
    /// mermaid.ink.
    pub diagram_service_primary: bool,
    /// Kroki.
    pub diagram_service_secondary: bool,
}

impl BackendCapabilities {
    /// Probe configured tools.
    ///
    /// External commands count only when enabled and `--version` succeeds.
    /// Remote services count when enabled; they are not contacted here.
    /// `fonts_loaded` reports whether the direct PDF fonts could be read.
    #[must_use]
    pub fn detect(config: &Config, fonts_loaded: bool) -> Self {
        let probe_enabled =
            |enabled: bool, program: &str| enabled && probe(program, "--version", PROBE_TIMEOUT);

        let capabilities = Self {
            html_pdf_engine: probe_enabled(config.pdf.html_engine_enabled, &config.pdf.html_engine),
            direct_pdf: config.pdf.direct_enabled && fonts_loaded,
            pandoc: probe_enabled(config.docx.pandoc_enabled, &config.docx.pandoc),
            direct_docx: config.docx.direct_enabled,
            diagram_cli: probe_enabled(config.diagrams.cli_enabled, &config.diagrams.mmdc),
            diagram_service_primary: config.diagrams.mermaid_ink_enabled,
            diagram_service_secondary: config.diagrams.kroki_enabled,
        };
        tracing::info!(?capabilities, "Detected rendering capabilities");
        capabilities
    }

    /// Capability flags as `(name, enabled)` pairs in a fixed order.
    #[must_use]
    pub fn flags(&self) -> [(&'static str, bool); 7] {
        [
            ("html_pdf_engine", self.html_pdf_engine),
            ("direct_pdf", self.direct_pdf),
            ("pandoc", self.pandoc),
            ("direct_docx", self.direct_docx),
            ("diagram_cli", self.diagram_cli),
            ("diagram_service_primary", self.diagram_service_primary),
            ("diagram_service_secondary", self.diagram_service_secondary),
        ]
    }

    #[must_use]
    pub fn any_pdf(&self) -> bool {
        self.html_pdf_engine || self.direct_pdf
    }

    #[must_use]
    pub fn any_docx(&self) -> bool {
        self.pandoc || self.direct_docx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn offline_config() -> Config {
        let mut config = Config::default();
        config.pdf.html_engine = "press-missing-weasyprint".to_owned();
        config.docx.pandoc = "press-missing-pandoc".to_owned();
        config.diagrams.mmdc = "press-missing-mmdc".to_owned();
        config.diagrams.mermaid_ink_enabled = false;
        config.diagrams.kroki_enabled = true;
        config
    }

    #[test]
    fn test_missing_tools_are_not_capable() {
        let caps = BackendCapabilities::detect(&offline_config(), false);
        assert_eq!(
            caps,
            BackendCapabilities {
                direct_docx: true,
                diagram_service_secondary: true,
                ..BackendCapabilities::default()
            }
        );
        assert!(!caps.any_pdf());
        assert!(caps.any_docx());
    }

    #[test]
    fn test_direct_pdf_needs_fonts_and_flag() {
        let mut config = offline_config();
        assert!(BackendCapabilities::detect(&config, true).direct_pdf);
        config.pdf.direct_enabled = false;
        assert!(!BackendCapabilities::detect(&config, true).direct_pdf);
    }

    #[cfg(unix)]
    #[test]
    fn test_disabled_tool_is_not_probed() {
        let mut config = offline_config();
        // `true` would pass the probe if it were run.
        config.docx.pandoc = "true".to_owned();
        config.docx.pandoc_enabled = false;
        assert!(!BackendCapabilities::detect(&config, false).pandoc);
        config.docx.pandoc_enabled = true;
        assert!(BackendCapabilities::detect(&config, false).pandoc);
    }

    #[test]
    fn test_flags_order() {
        let names: Vec<_> = BackendCapabilities::default()
            .flags()
            .iter()
            .map(|(n, _)| *n)
            .collect();
        assert_eq!(names[0], "html_pdf_engine");
        assert_eq!(names[6], "diagram_service_secondary");
    }
}
