//! `img2fig render` command implementation.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use img2fig_config::{CliSettings, Config};
use img2fig_renderer::{MarkdownRenderer, RewriteConfig};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (default: stdin; `-` also reads stdin).
    input: Option<PathBuf>,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover img2fig.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Image attribute used as the caption: "title" or "alt" (overrides config).
    #[arg(long)]
    source_attr: Option<String>,

    /// Keep the caption attribute on the image.
    #[arg(long)]
    keep_attr: bool,

    /// Leave uncaptioned images as plain images.
    #[arg(long)]
    no_force_convert: bool,

    /// Treat empty captions as real captions.
    #[arg(long)]
    keep_empty: bool,

    /// Disable `{: ...}` attribute lists.
    #[arg(long)]
    no_attr_list: bool,

    /// Disable GitHub Flavored Markdown.
    #[arg(long)]
    no_gfm: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or reading/writing fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;
        if let Some(path) = &config.config_path {
            output.info(&format!("Config: {}", path.display()));
        }

        let renderer = build_renderer(&config)?;
        let markdown = read_input(self.input.as_deref())?;
        let result = renderer.render(&markdown);

        write_output(self.output.as_deref(), &result.html)?;

        output.success(&format!(
            "Rendered {} figure(s) and {} plain image(s)",
            result.figures, result.images
        ));
        Ok(())
    }

    /// Translate flags into config overrides. Absent flags leave config values alone.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            source_attr: self.source_attr.clone(),
            remove_attr: self.keep_attr.then_some(false),
            force_convert: self.no_force_convert.then_some(false),
            empty_as_none: self.keep_empty.then_some(false),
            attr_list: self.no_attr_list.then_some(false),
            gfm: self.no_gfm.then_some(false),
        }
    }
}

/// Build a renderer from the loaded configuration.
pub(crate) fn build_renderer(config: &Config) -> Result<MarkdownRenderer, CliError> {
    let figure = &config.figure;
    let rewrite = RewriteConfig::from_options(
        &figure.source_attr,
        figure.remove_attr,
        figure.force_convert,
        figure.empty_as_none,
    )?;

    let mut renderer = MarkdownRenderer::new()
        .with_figures(rewrite)
        .with_gfm(config.markdown.gfm);
    if config.markdown.attr_list {
        renderer = renderer.with_attr_list();
    }
    Ok(renderer)
}

/// Read markdown from a file, or stdin for `None` and `-`.
fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) if path != Path::new("-") => {
            tracing::debug!(path = %path.display(), "Reading markdown file");
            std::fs::read_to_string(path).map_err(|source| CliError::Input {
                path: path.display().to_string(),
                source,
            })
        }
        _ => {
            let mut buf = String::new();
            std::io::stdin().lock().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Write HTML to a file, or stdout for `None`.
fn write_output(path: Option<&Path>, html: &str) -> Result<(), CliError> {
    match path {
        Some(path) => std::fs::write(path, html)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: RenderArgs,
    }

    fn parse(args: &[&str]) -> RenderArgs {
        TestCli::try_parse_from(std::iter::once("render").chain(args.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_no_flags_leave_config_alone() {
        let settings = parse(&[]).cli_settings();
        assert!(settings.source_attr.is_none());
        assert!(settings.remove_attr.is_none());
        assert!(settings.force_convert.is_none());
        assert!(settings.empty_as_none.is_none());
        assert!(settings.attr_list.is_none());
        assert!(settings.gfm.is_none());
    }

    #[test]
    fn test_flags_become_overrides() {
        let args = parse(&[
            "doc.md",
            "--source-attr",
            "alt",
            "--keep-attr",
            "--no-force-convert",
            "--keep-empty",
            "--no-attr-list",
            "--no-gfm",
        ]);
        assert_eq!(args.input, Some(PathBuf::from("doc.md")));

        let settings = args.cli_settings();
        assert_eq!(settings.source_attr.as_deref(), Some("alt"));
        assert_eq!(settings.remove_attr, Some(false));
        assert_eq!(settings.force_convert, Some(false));
        assert_eq!(settings.empty_as_none, Some(false));
        assert_eq!(settings.attr_list, Some(false));
        assert_eq!(settings.gfm, Some(false));
    }

    #[test]
    fn test_output_and_config_paths() {
        let args = parse(&["-", "-o", "out.html", "-c", "img2fig.toml", "-v"]);
        assert_eq!(args.input, Some(PathBuf::from("-")));
        assert_eq!(args.output, Some(PathBuf::from("out.html")));
        assert_eq!(args.config, Some(PathBuf::from("img2fig.toml")));
        assert!(args.verbose);
    }

    #[test]
    fn test_build_renderer_defaults() {
        let renderer = build_renderer(&Config::default()).unwrap();
        let result = renderer.render("![a cat](cat.png \"A cat\"){: .framed}\n");
        assert_eq!(
            result.html,
            "<p><figure class=\"framed\"><img src=\"cat.png\" alt=\"a cat\"><figcaption>A cat</figcaption></figure></p>\n"
        );
        assert!(renderer.pipeline().has_attr_list());
    }

    #[test]
    fn test_build_renderer_without_attr_list() {
        let mut config = Config::default();
        config.markdown.attr_list = false;

        let renderer = build_renderer(&config).unwrap();
        assert!(!renderer.pipeline().has_attr_list());
    }

    #[test]
    fn test_build_renderer_alt_source() {
        let mut config = Config::default();
        config.figure.source_attr = "alt".to_owned();

        let result = build_renderer(&config).unwrap().render("![A cat](cat.png)");
        assert!(result.html.contains("<figcaption>A cat</figcaption>"));
    }

    #[test]
    fn test_build_renderer_rejects_unknown_source() {
        let mut config = Config::default();
        config.figure.source_attr = "caption".to_owned();

        let err = build_renderer(&config).err().unwrap();
        assert!(matches!(err, CliError::Rewrite(_)));
        assert_eq!(
            err.to_string(),
            "Invalid source_attr 'caption': expected \"title\" or \"alt\""
        );
    }

    #[test]
    fn test_read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# Doc\n").unwrap();

        assert_eq!(read_input(Some(&path)).unwrap(), "# Doc\n");
    }

    #[test]
    fn test_read_input_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.md");

        let err = read_input(Some(&path)).unwrap_err();
        assert!(matches!(err, CliError::Input { .. }));
        assert!(err.to_string().contains("missing.md"));
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");

        write_output(Some(&path), "<p>x</p>\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>x</p>\n");
    }
}
