use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use pecha_engine::config::{ImageFormat, PechaConfig};
use pecha_engine::resolver::PageSelection;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pecha", version, about = "Tibetan canon page scraper")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch page images and text from the online viewer
    Scrape(ScrapeArgs),
    /// Summarize a dataset written by `scrape`
    Analyze {
        /// Dataset directory
        #[arg(short, long, default_value = "tibetan_data")]
        dir: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ImageFormatArg {
    Png,
    Jpeg,
}

impl From<ImageFormatArg> for ImageFormat {
    fn from(arg: ImageFormatArg) -> Self {
        match arg {
            ImageFormatArg::Png => ImageFormat::Png,
            ImageFormatArg::Jpeg => ImageFormat::Jpeg,
        }
    }
}

#[derive(ClapArgs, Debug)]
pub struct ScrapeArgs {
    /// Output directory (default: tibetan_data)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Catalog to open, e.g. degekangyur or degetengyur
    #[arg(long)]
    pub kdb: Option<String>,

    /// Text within the catalog, e.g. d1
    #[arg(long)]
    pub sutra: Option<String>,

    #[arg(long, value_enum)]
    pub image_format: Option<ImageFormatArg>,

    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub jpeg_quality: Option<u8>,

    #[arg(long, default_value_t = 1)]
    pub start_vol: u32,

    #[arg(long, default_value_t = 1)]
    pub end_vol: u32,

    #[arg(long, default_value_t = 1)]
    pub start_page: u32,

    #[arg(long, default_value_t = 5)]
    pub end_page: u32,

    /// Stop after this many pages
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// Explicit pages such as 1-1a 1-1b; overrides the range options
    #[arg(long, num_args = 1..)]
    pub pages: Option<Vec<String>>,

    /// Show the browser window
    #[arg(long)]
    pub no_headless: bool,

    /// YAML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ScrapeArgs {
    /// Command-line values win over the configuration file.
    pub fn apply(&self, config: &mut PechaConfig) {
        if let Some(output) = &self.output {
            config.output.directory = output.clone();
        }
        if let Some(kdb) = &self.kdb {
            config.site.kdb = kdb.clone();
        }
        if let Some(sutra) = &self.sutra {
            config.site.sutra = sutra.clone();
        }
        if let Some(format) = self.image_format {
            config.output.image_format = format.into();
        }
        if let Some(quality) = self.jpeg_quality {
            config.output.jpeg_quality = quality;
        }
    }

    pub fn selection(&self) -> PageSelection {
        PageSelection {
            pages: self.pages.clone(),
            start_vol: self.start_vol,
            end_vol: self.end_vol,
            start_page: self.start_page,
            end_page: self.end_page,
            max_pages: self.max_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pecha_engine::ResolveError;
    use pecha_engine::resolver::resolve;

    fn scrape(argv: &[&str]) -> ScrapeArgs {
        let args = Args::try_parse_from(std::iter::once("pecha").chain(argv.iter().copied()))
            .unwrap();
        match args.command {
            Command::Scrape(scrape) => scrape,
            other => panic!("expected scrape, got {:?}", other),
        }
    }

    #[test]
    fn test_default_range() {
        let args = scrape(&["scrape"]);
        let pages = resolve(&args.selection()).unwrap();
        assert_eq!(pages.len(), 10);
        assert!(!args.no_headless);
    }

    #[test]
    fn test_repeated_pages_flag() {
        let args = scrape(&["scrape", "--pages", "1-1b", "1-1b"]);
        let pages = resolve(&args.selection()).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].to_string(), "1-1b");
    }

    #[test]
    fn test_malformed_page_is_rejected() {
        let args = scrape(&["scrape", "--pages", "1-1"]);
        assert!(matches!(
            resolve(&args.selection()),
            Err(ResolveError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_range_flags() {
        let args = scrape(&["scrape", "--start-page", "1", "--end-page", "2", "--max-pages", "3"]);
        let pages: Vec<String> = resolve(&args.selection())
            .unwrap()
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(pages, vec!["1-1a", "1-1b", "1-2a"]);
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let args = scrape(&[
            "scrape",
            "-o",
            "out",
            "--kdb",
            "degetengyur",
            "--sutra",
            "D1109",
            "--image-format",
            "jpeg",
            "--jpeg-quality",
            "80",
        ]);
        let mut config = PechaConfig::default();
        args.apply(&mut config);

        assert_eq!(config.output.directory, PathBuf::from("out"));
        assert_eq!(config.site.kdb, "degetengyur");
        assert_eq!(config.site.sutra, "D1109");
        assert_eq!(config.output.image_format, ImageFormat::Jpeg);
        assert_eq!(config.output.jpeg_quality, 80);
    }

    #[test]
    fn test_missing_flags_keep_config_values() {
        let args = scrape(&["scrape"]);
        let mut config = PechaConfig::default();
        config.site.sutra = "d7".into();
        args.apply(&mut config);
        assert_eq!(config.site.sutra, "d7");
        assert_eq!(config.output.directory, PathBuf::from("tibetan_data"));
    }

    #[test]
    fn test_jpeg_quality_out_of_range() {
        let result = Args::try_parse_from(["pecha", "scrape", "--jpeg-quality", "0"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_analyze_default_dir() {
        let args = Args::try_parse_from(["pecha", "analyze"]).unwrap();
        match args.command {
            Command::Analyze { dir } => assert_eq!(dir, PathBuf::from("tibetan_data")),
            other => panic!("expected analyze, got {:?}", other),
        }
    }
}
