pub mod error;
pub mod figure;
pub mod layout;
pub mod parser;
pub mod renderer;
pub mod store;
pub mod text;

use std::path::Path;

use tracing::info;

pub use error::Error;
pub use layout::{Layout, LayoutError, LayoutOptions, Spacing};
pub use store::RelationshipStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Boxes and connectors for the terminal
    #[default]
    Ascii,
    /// Plotly figure JSON
    Json,
    /// `var graphJSON = ...;` for embedding in a web page
    Script,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    pub format: OutputFormat,
    /// Column limit for ascii output.
    pub max_width: Option<usize>,
    pub layout: LayoutOptions,
}

pub fn render(input: &str) -> Result<String, Error> {
    render_with_options(input, &RenderOptions::default())
}

pub fn render_with_options(input: &str, options: &RenderOptions) -> Result<String, Error> {
    let store = parser::parse_relationships(input)?;
    render_store(&store, options)
}

pub fn render_store(store: &RelationshipStore, options: &RenderOptions) -> Result<String, Error> {
    let computed = layout::compute_with_options(store, &options.layout)?;
    match options.format {
        OutputFormat::Ascii => match options.max_width {
            Some(w) => renderer::render_with_max_width(&computed, w),
            None => Ok(renderer::render(&computed)),
        },
        OutputFormat::Json => figure::to_json(&figure::build(&computed)),
        OutputFormat::Script => figure::to_script(&figure::build(&computed)),
    }
}

/// Lay out `store` and write the figure script to `path`.
pub fn export(
    store: &RelationshipStore,
    options: &LayoutOptions,
    path: impl AsRef<Path>,
) -> Result<(), Error> {
    let computed = layout::compute_with_options(store, options)?;
    let script = figure::to_script(&figure::build(&computed))?;
    save(path, &script)
}

/// Write rendered output verbatim.
pub fn save(path: impl AsRef<Path>, contents: &str) -> Result<(), Error> {
    let path = path.as_ref();
    std::fs::write(path, contents).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), bytes = contents.len(), "output written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_ascii_by_default() {
        let output = render("A --parent--> B\n").unwrap();
        assert!(output.contains("│ B: parent │"), "got:\n{output}");
        assert!(output.contains("│ B │"), "got:\n{output}");
    }

    #[test]
    fn render_empty_input_is_empty() {
        assert_eq!(render("").unwrap(), "");
    }

    #[test]
    fn render_syntax_error() {
        let err = render("A => B\n").unwrap_err();
        assert!(err.to_string().contains("syntax error"), "got: {err}");
    }

    #[test]
    fn render_script_format() {
        let options = RenderOptions {
            format: OutputFormat::Script,
            ..RenderOptions::default()
        };
        let output = render_with_options("A --parent--> B\n", &options).unwrap();
        assert!(output.starts_with("var graphJSON = {"));
        assert!(output.ends_with("};"));
    }

    #[test]
    fn render_unknown_root() {
        let options = RenderOptions {
            layout: LayoutOptions {
                root: Some("Z".to_string()),
                ..LayoutOptions::default()
            },
            ..RenderOptions::default()
        };
        let err = render_with_options("A --parent--> B\n", &options).unwrap_err();
        assert_eq!(err.to_string(), "unknown root `Z`");
    }

    #[test]
    fn save_reports_path_on_failure() {
        let path = std::env::temp_dir()
            .join("kin-missing-dir")
            .join("nested")
            .join("out.js");
        let err = save(&path, "x").unwrap_err();
        assert!(err.to_string().contains("out.js"), "got: {err}");
    }
}
